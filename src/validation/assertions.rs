//! Built-in WSDL 2.0 assertions

use std::collections::HashSet;
use std::fmt;

use url::Url;

use super::{FnAssertion, ValidationContext};
use crate::error::Result;
use crate::locations::{is_absolute_uri, is_dereferenceable_scheme};
use crate::model::{
    ComponentKind, ComponentRef, Description, Direction, Interface, MessageContentModel,
    ReferenceStatus, SchemaKind, WsdlComponent, MEP_IN_ONLY, MEP_IN_OUT, MEP_ROBUST_IN_ONLY,
};
use crate::namespaces::QName;
use crate::reporter::{ErrorLocator, Severity};

/// Every built-in assertion with the kind it targets
pub fn builtin() -> Vec<(ComponentKind, FnAssertion)> {
    use ComponentKind as K;
    vec![
        (K::Description, FnAssertion::new("Description-1001", description_1001)),
        (K::Description, FnAssertion::new("Description-1006", description_1006)),
        (K::Description, FnAssertion::new("Import-1069", import_1069)),
        (K::Description, FnAssertion::new("Import-1070", import_1070)),
        (K::Description, FnAssertion::new("Include-1068", include_1068)),
        (K::Description, FnAssertion::new("Interface-1010", interface_1010)),
        (K::Description, FnAssertion::new("Binding-1049", binding_1049)),
        (K::Description, FnAssertion::new("Service-1060", service_1060)),
        (K::Interface, FnAssertion::new("Interface-1009", interface_1009)),
        (K::Interface, FnAssertion::new("Interface-1011", interface_1011)),
        (K::Interface, FnAssertion::new("InterfaceOperation-1035", interface_operation_1035)),
        (K::Interface, FnAssertion::new("InterfaceFault-1017", interface_fault_1017)),
        (K::InterfaceOperation, FnAssertion::new("MessageLabel-1034", message_label_1034)),
        (K::BindingOperation, FnAssertion::new("BindingOperation-1051", binding_operation_1051)),
        (K::Endpoint, FnAssertion::new("Endpoint-1062", endpoint_1062)),
        (K::Interface, FnAssertion::new("QName-resolution-1064", qname_resolution_1064)),
        (K::InterfaceFault, FnAssertion::new("QName-resolution-1064", qname_resolution_1064)),
        (K::InterfaceMessageReference, FnAssertion::new("QName-resolution-1064", qname_resolution_1064)),
        (K::InterfaceFaultReference, FnAssertion::new("QName-resolution-1064", qname_resolution_1064)),
        (K::Binding, FnAssertion::new("QName-resolution-1064", qname_resolution_1064)),
        (K::BindingFault, FnAssertion::new("QName-resolution-1064", qname_resolution_1064)),
        (K::Service, FnAssertion::new("QName-resolution-1064", qname_resolution_1064)),
        (K::Endpoint, FnAssertion::new("QName-resolution-1064", qname_resolution_1064)),
    ]
}

fn error(ctx: &mut ValidationContext<'_>, location: &ErrorLocator, id: &str, args: &[&dyn fmt::Display]) -> Result<()> {
    ctx.report(location, id, args, Severity::Error)
}

/// The target namespace should be dereferenceable
///
/// Any failure along the way becomes a warning, never an error.
pub fn description_1001(target: ComponentRef<'_>, _desc: &Description, ctx: &mut ValidationContext<'_>) -> Result<()> {
    let ComponentRef::Description(desc) = target else {
        return Ok(());
    };
    let Some(tns) = desc.target_namespace.as_deref() else {
        return Ok(());
    };

    let failure = match Url::parse(tns) {
        Err(e) => Some(e.to_string()),
        Ok(url) => {
            let url = ctx.resolver.resolve_or_same(&url);
            if !is_dereferenceable_scheme(&url) {
                Some(format!("the scheme '{}' cannot be dereferenced", url.scheme()))
            } else {
                ctx.loader.load(&url).err().map(|e| e.to_string())
            }
        }
    };

    match failure {
        Some(reason) => ctx.report(&desc.info.location, "Description-1001", &[&tns, &reason], Severity::Warning),
        None => Ok(()),
    }
}

/// The target namespace must be an absolute IRI
pub fn description_1006(target: ComponentRef<'_>, _desc: &Description, ctx: &mut ValidationContext<'_>) -> Result<()> {
    let ComponentRef::Description(desc) = target else {
        return Ok(());
    };
    match desc.target_namespace.as_deref() {
        Some(tns) if !is_absolute_uri(tns) => error(ctx, &desc.info.location, "Description-1006", &[&tns]),
        _ => Ok(()),
    }
}

/// An import must not import the importing document's namespace
pub fn import_1069(target: ComponentRef<'_>, _desc: &Description, ctx: &mut ValidationContext<'_>) -> Result<()> {
    let ComponentRef::Description(desc) = target else {
        return Ok(());
    };
    for import in desc.imports.iter().filter(|i| i.status != ReferenceStatus::Skipped) {
        if let Some(ns) = &import.namespace {
            if import.importing_namespace.as_ref() == Some(ns) {
                error(ctx, &import.locator, "Import-1069", &[ns])?;
            }
        }
    }
    Ok(())
}

/// The import namespace must match the imported document
pub fn import_1070(target: ComponentRef<'_>, _desc: &Description, ctx: &mut ValidationContext<'_>) -> Result<()> {
    let ComponentRef::Description(desc) = target else {
        return Ok(());
    };
    for import in desc.imports.iter().filter(|i| i.status == ReferenceStatus::Merged) {
        if import.namespace != import.imported_namespace {
            let ns = import.namespace.as_deref().unwrap_or("");
            let actual = import.imported_namespace.as_deref().unwrap_or("");
            let location = import.resolved.as_deref().unwrap_or("");
            error(ctx, &import.locator, "Import-1070", &[&ns, &actual, &location])?;
        }
    }
    Ok(())
}

/// An included document must share the including document's namespace
pub fn include_1068(target: ComponentRef<'_>, _desc: &Description, ctx: &mut ValidationContext<'_>) -> Result<()> {
    let ComponentRef::Description(desc) = target else {
        return Ok(());
    };
    for include in desc.includes.iter().filter(|i| i.status == ReferenceStatus::Merged) {
        if include.included_namespace != include.including_namespace {
            let location = include.resolved.as_deref().unwrap_or("");
            let included = include.included_namespace.as_deref().unwrap_or("");
            let including = include.including_namespace.as_deref().unwrap_or("");
            error(ctx, &include.locator, "Include-1068", &[&location, &included, &including])?;
        }
    }
    Ok(())
}

/// Report every named item whose name was already seen
fn duplicates<'a, T: WsdlComponent + 'a>(
    ctx: &mut ValidationContext<'_>,
    id: &str,
    items: impl IntoIterator<Item = &'a T>,
    name: impl Fn(&T) -> Option<&QName>,
    extra: Option<&dyn fmt::Display>,
) -> Result<()> {
    let mut seen: HashSet<&QName> = HashSet::new();
    for item in items {
        let Some(n) = name(item) else {
            continue;
        };
        if !seen.insert(n) {
            let location = &item.info().location;
            match extra {
                Some(extra) => error(ctx, location, id, &[n, extra])?,
                None => error(ctx, location, id, &[n])?,
            }
        }
    }
    Ok(())
}

/// Interface names are unique; anonymous interfaces are exempt
pub fn interface_1010(target: ComponentRef<'_>, _desc: &Description, ctx: &mut ValidationContext<'_>) -> Result<()> {
    let ComponentRef::Description(desc) = target else {
        return Ok(());
    };
    duplicates(ctx, "Interface-1010", &desc.interfaces, |i| i.name.as_ref(), None)
}

/// Binding names are unique
pub fn binding_1049(target: ComponentRef<'_>, _desc: &Description, ctx: &mut ValidationContext<'_>) -> Result<()> {
    let ComponentRef::Description(desc) = target else {
        return Ok(());
    };
    duplicates(ctx, "Binding-1049", &desc.bindings, |b| b.name.as_ref(), None)
}

/// Service names are unique
pub fn service_1060(target: ComponentRef<'_>, _desc: &Description, ctx: &mut ValidationContext<'_>) -> Result<()> {
    let ComponentRef::Description(desc) = target else {
        return Ok(());
    };
    duplicates(ctx, "Service-1060", &desc.services, |s| s.name.as_ref(), None)
}

/// An interface must not be among its own extended interfaces
pub fn interface_1009(target: ComponentRef<'_>, desc: &Description, ctx: &mut ValidationContext<'_>) -> Result<()> {
    let ComponentRef::Interface(interface) = target else {
        return Ok(());
    };
    let Some(name) = &interface.name else {
        return Ok(());
    };
    if interface.extended_interface_names(desc).contains(name) {
        error(ctx, &interface.info.location, "Interface-1009", &[name])?;
    }
    Ok(())
}

/// The `extends` list has no duplicates
pub fn interface_1011(target: ComponentRef<'_>, _desc: &Description, ctx: &mut ValidationContext<'_>) -> Result<()> {
    let ComponentRef::Interface(interface) = target else {
        return Ok(());
    };
    let mut seen = HashSet::new();
    for extended in &interface.extends {
        if !seen.insert(extended) {
            let name = interface.display_name();
            error(ctx, &interface.info.location, "Interface-1011", &[&name, extended])?;
        }
    }
    Ok(())
}

/// Operation names are unique within an interface
pub fn interface_operation_1035(
    target: ComponentRef<'_>,
    _desc: &Description,
    ctx: &mut ValidationContext<'_>,
) -> Result<()> {
    let ComponentRef::Interface(interface) = target else {
        return Ok(());
    };
    let name = interface.display_name();
    duplicates(ctx, "InterfaceOperation-1035", &interface.operations, |o| o.name.as_ref(), Some(&name as &dyn fmt::Display))
}

/// Fault names are unique within an interface
pub fn interface_fault_1017(target: ComponentRef<'_>, _desc: &Description, ctx: &mut ValidationContext<'_>) -> Result<()> {
    let ComponentRef::Interface(interface) = target else {
        return Ok(());
    };
    let name = interface.display_name();
    duplicates(ctx, "InterfaceFault-1017", &interface.faults, |f| f.name.as_ref(), Some(&name as &dyn fmt::Display))
}

const LABELS_IN: &[&str] = &["In"];
const LABELS_OUT: &[&str] = &["Out"];
const LABELS_NONE: &[&str] = &[];

/// Message labels a pattern defines, by direction
fn pattern_labels(pattern: &str) -> Option<(&'static [&'static str], &'static [&'static str])> {
    match pattern {
        MEP_IN_ONLY | MEP_ROBUST_IN_ONLY => Some((LABELS_IN, LABELS_NONE)),
        MEP_IN_OUT => Some((LABELS_IN, LABELS_OUT)),
        _ => None,
    }
}

/// Message labels must belong to the operation's pattern
pub fn message_label_1034(target: ComponentRef<'_>, _desc: &Description, ctx: &mut ValidationContext<'_>) -> Result<()> {
    let ComponentRef::InterfaceOperation(op) = target else {
        return Ok(());
    };
    let pattern = op.effective_pattern();
    let Some((inputs, outputs)) = pattern_labels(pattern) else {
        return Ok(());
    };
    let op_name = op.display_name();

    for message in &op.messages {
        let Some(label) = message.message_label.as_deref() else {
            continue;
        };
        let allowed = match message.direction {
            Direction::In => inputs,
            Direction::Out => outputs,
        };
        if !allowed.iter().any(|l| *l == label) {
            error(ctx, &message.info.location, "MessageLabel-1034", &[&label, &pattern, &op_name])?;
        }
    }
    for fault in &op.fault_references {
        let Some(label) = fault.message_label.as_deref() else {
            continue;
        };
        if !inputs.iter().chain(outputs).any(|l| *l == label) {
            error(ctx, &fault.info.location, "MessageLabel-1034", &[&label, &pattern, &op_name])?;
        }
    }
    Ok(())
}

/// A binding operation must refer to an operation of the bound interface
pub fn binding_operation_1051(target: ComponentRef<'_>, desc: &Description, ctx: &mut ValidationContext<'_>) -> Result<()> {
    let ComponentRef::BindingOperation(op) = target else {
        return Ok(());
    };
    let Some(operation_ref) = &op.operation_ref else {
        return Ok(());
    };
    let Some(ComponentRef::Binding(binding)) = desc.parent_of(target) else {
        return Ok(());
    };
    let Some(interface) = binding.resolved_interface(desc) else {
        return Ok(());
    };
    if interface.find_operation(desc, operation_ref).is_none() {
        let iface = interface.display_name();
        error(ctx, &op.info.location, "BindingOperation-1051", &[operation_ref, &iface])?;
    }
    Ok(())
}

/// An endpoint's binding must bind the service's interface
pub fn endpoint_1062(target: ComponentRef<'_>, desc: &Description, ctx: &mut ValidationContext<'_>) -> Result<()> {
    let ComponentRef::Endpoint(endpoint) = target else {
        return Ok(());
    };
    let Some(binding) = endpoint.resolved_binding(desc) else {
        return Ok(());
    };
    let Some(ComponentRef::Service(service)) = desc.parent_of(target) else {
        return Ok(());
    };
    if let (Some(bound), Some(offered)) = (&binding.interface, &service.interface) {
        if bound != offered {
            let name = endpoint.display_name();
            let binding_name = binding.display_name();
            error(ctx, &endpoint.info.location, "Endpoint-1062", &[&name, &binding_name, bound, offered])?;
        }
    }
    Ok(())
}

fn unresolved(ctx: &mut ValidationContext<'_>, location: &ErrorLocator, what: &str, qname: &QName) -> Result<()> {
    error(ctx, location, "QName-resolution-1064", &[&what, qname])
}

/// The interface that owns a fault reference, through its operation
fn owning_interface<'d>(target: ComponentRef<'_>, desc: &'d Description) -> Option<&'d Interface> {
    let parent = target.as_component().parent_id()?;
    let operation = desc.component(parent)?;
    let interface = desc.component(operation.as_component().parent_id()?)?;
    match interface {
        ComponentRef::Interface(interface) => Some(interface),
        _ => None,
    }
}

/// Namespaces of imported schemas that could not be loaded
fn unloaded_namespaces(desc: &Description) -> HashSet<Option<&str>> {
    desc.schemas
        .iter()
        .filter(|s| matches!(s.kind, SchemaKind::Imported { loaded: false, .. }))
        .map(|s| s.namespace.as_deref())
        .collect()
}

fn check_element(
    ctx: &mut ValidationContext<'_>,
    desc: &Description,
    location: &ErrorLocator,
    model: &MessageContentModel,
) -> Result<()> {
    let Some(element) = model.element() else {
        return Ok(());
    };
    if desc.element_declaration(element).is_some() {
        return Ok(());
    }
    if desc.element_declaration_any(element).is_some() {
        return error(ctx, location, "Schema-1066", &[element]);
    }
    if unloaded_namespaces(desc).contains(&element.namespace.as_deref()) {
        return Ok(());
    }
    unresolved(ctx, location, "element", element)
}

/// Every QName reference resolves within the description
pub fn qname_resolution_1064(target: ComponentRef<'_>, desc: &Description, ctx: &mut ValidationContext<'_>) -> Result<()> {
    match target {
        ComponentRef::Interface(interface) => {
            for extended in &interface.extends {
                if desc.interface(extended).is_none() {
                    unresolved(ctx, &interface.info.location, "interface", extended)?;
                }
            }
        }
        ComponentRef::InterfaceFault(fault) => {
            check_element(ctx, desc, &fault.info.location, &fault.content_model)?;
        }
        ComponentRef::InterfaceMessageReference(message) => {
            check_element(ctx, desc, &message.info.location, &message.content_model)?;
        }
        ComponentRef::InterfaceFaultReference(fault) => {
            if let (Some(fault_ref), Some(interface)) = (&fault.fault_ref, owning_interface(target, desc)) {
                if interface.find_fault(desc, fault_ref).is_none() {
                    unresolved(ctx, &fault.info.location, "fault", fault_ref)?;
                }
            }
        }
        ComponentRef::Binding(binding) => {
            if let Some(interface) = &binding.interface {
                if desc.interface(interface).is_none() {
                    unresolved(ctx, &binding.info.location, "interface", interface)?;
                }
            }
        }
        ComponentRef::BindingFault(fault) => {
            let binding = desc.parent_of(target);
            if let (Some(fault_ref), Some(ComponentRef::Binding(binding))) = (&fault.fault_ref, binding) {
                if let Some(interface) = binding.resolved_interface(desc) {
                    if interface.find_fault(desc, fault_ref).is_none() {
                        unresolved(ctx, &fault.info.location, "fault", fault_ref)?;
                    }
                }
            }
        }
        ComponentRef::Service(service) => {
            if let Some(interface) = &service.interface {
                if desc.interface(interface).is_none() {
                    unresolved(ctx, &service.info.location, "interface", interface)?;
                }
            }
        }
        ComponentRef::Endpoint(endpoint) => {
            if let Some(binding) = &endpoint.binding {
                if desc.binding(binding).is_none() {
                    unresolved(ctx, &endpoint.info.location, "binding", binding)?;
                }
            }
        }
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loaders::Loader;
    use crate::model::{ComponentInfo, IdAllocator};
    use crate::reporter::ErrorReporter;
    use crate::resolver::NoopResolver;
    use crate::validation::ValidationEngine;

    fn run(desc: &mut Description) -> ErrorReporter {
        let mut reporter = ErrorReporter::new();
        reporter.set_continue_on_error(true);
        let loader = Loader::new().with_allow_remote(false);
        let mut ctx = ValidationContext {
            reporter: &mut reporter,
            resolver: &NoopResolver,
            loader: &loader,
            verbose: false,
        };
        ValidationEngine::with_builtin_assertions()
            .validate(desc, &mut ctx)
            .unwrap();
        reporter
    }

    fn description(ids: &mut IdAllocator) -> Description {
        let info = ComponentInfo::new(ids.next_id(), None, ErrorLocator::default());
        Description::new(info, Some("urn:x".to_string()))
    }

    fn interface(ids: &mut IdAllocator, parent: &Description, name: &str, extends: &[&str]) -> Interface {
        let info = ComponentInfo::new(ids.next_id(), Some(parent.info.id), ErrorLocator::path(name));
        let mut interface = Interface::new(info, Some(QName::namespaced("urn:x", name)));
        interface.extends = extends.iter().map(|e| QName::namespaced("urn:x", *e)).collect();
        interface
    }

    #[test]
    fn test_cycle_detected() {
        let mut ids = IdAllocator::new();
        let mut desc = description(&mut ids);
        let i1 = interface(&mut ids, &desc, "I1", &["I2"]);
        let i2 = interface(&mut ids, &desc, "I2", &["I1"]);
        desc.interfaces.extend([i1, i2]);

        let reporter = run(&mut desc);
        assert_eq!(reporter.reports_with_id("Interface-1009").count(), 2);
    }

    #[test]
    fn test_self_extension_and_duplicates() {
        let mut ids = IdAllocator::new();
        let mut desc = description(&mut ids);
        let i = interface(&mut ids, &desc, "I", &["I", "I"]);
        desc.interfaces.push(i);

        let reporter = run(&mut desc);
        assert_eq!(reporter.reports_with_id("Interface-1009").count(), 1);
        assert_eq!(reporter.reports_with_id("Interface-1011").count(), 1);
    }

    #[test]
    fn test_duplicate_names_once_per_extra() {
        let mut ids = IdAllocator::new();
        let mut desc = description(&mut ids);
        for _ in 0..3 {
            let i = interface(&mut ids, &desc, "Dup", &[]);
            desc.interfaces.push(i);
        }
        let anonymous = Interface::new(
            ComponentInfo::new(ids.next_id(), Some(desc.info.id), ErrorLocator::default()),
            None,
        );
        desc.interfaces.push(anonymous);
        let anonymous = Interface::new(
            ComponentInfo::new(ids.next_id(), Some(desc.info.id), ErrorLocator::default()),
            None,
        );
        desc.interfaces.push(anonymous);

        let reporter = run(&mut desc);
        assert_eq!(reporter.reports_with_id("Interface-1010").count(), 2);
    }

    #[test]
    fn test_unresolved_extends() {
        let mut ids = IdAllocator::new();
        let mut desc = description(&mut ids);
        let i = interface(&mut ids, &desc, "I", &["Missing"]);
        desc.interfaces.push(i);

        let reporter = run(&mut desc);
        assert_eq!(reporter.reports_with_id("QName-resolution-1064").count(), 1);
    }

    #[test]
    fn test_namespace_not_dereferenceable_is_warning() {
        let mut ids = IdAllocator::new();
        let mut desc = description(&mut ids);

        let reporter = run(&mut desc);
        let report = reporter.reports_with_id("Description-1001").next().unwrap();
        assert_eq!(report.severity, Severity::Warning);
        assert!(!reporter.has_errors());
    }

    #[test]
    fn test_relative_namespace() {
        let mut ids = IdAllocator::new();
        let mut desc = description(&mut ids);
        desc.target_namespace = Some("not/absolute".to_string());

        let reporter = run(&mut desc);
        assert_eq!(reporter.reports_with_id("Description-1006").count(), 1);
        assert_eq!(
            reporter.reports_with_id("Description-1001").next().map(|r| r.severity),
            Some(Severity::Warning)
        );
    }
}
