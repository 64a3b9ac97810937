//! Extension registry
//!
//! The registry maps
//!
//! - `(component kind, namespace)` to a [`ComponentExtensionFactory`]
//!   that builds a typed property facade for that namespace,
//! - `(component kind, attribute QName)` to an [`XmlAttrFactory`],
//! - `(component kind, element QName)` to an [`ExtensionDeserializer`].
//!
//! Registration overwrites: the last registration for a key wins. A
//! registry is filled through `&mut self` and then shared read-only
//! behind an `Arc`. Anything not registered degrades gracefully: unknown
//! attributes keep their raw text, unknown elements are not modeled.

pub mod attrs;
pub mod elements;
pub mod http;
pub mod rpc;
pub mod soap;
pub mod wsdlx;

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::debug;

use crate::documents::Element;
use crate::error::{Error, FaultCode, Result, WsdlError};
use crate::model::{ComponentKind, WsdlComponent};
use crate::namespaces::QName;
use crate::reporter::{ErrorInfo, ErrorReporter, Severity};

pub use attrs::{AttrValue, XmlAttr, XmlAttrFactory};
pub use elements::{
    ComponentExtensionFactory, ComponentExtensions, ExtensionDeserializer, ExtensionElement,
};

/// Extension attributes, elements and contexts of one component
#[derive(Debug, Default)]
pub struct ExtensionData {
    /// Attributes built by a registered factory
    pub attributes: Vec<XmlAttr>,
    /// Foreign attributes without a registered factory, kept verbatim
    pub unknown_attributes: Vec<XmlAttr>,
    /// Deserialized extension elements in document order
    pub elements: Vec<Box<dyn ExtensionElement>>,
    /// Extension contexts keyed by namespace
    pub contexts: IndexMap<String, Box<dyn ComponentExtensions>>,
}

impl ExtensionData {
    /// Find a registered attribute
    pub fn attribute(&self, qname: &QName) -> Option<&XmlAttr> {
        self.attributes.iter().find(|a| a.qname() == qname)
    }

    /// Content of a registered, valid attribute
    pub fn value(&self, namespace: &str, local_name: &str) -> Option<&AttrValue> {
        self.attributes
            .iter()
            .find(|a| a.qname().is(namespace, local_name))
            .and_then(XmlAttr::content)
    }

    /// Boolean content of an attribute
    pub fn bool_value(&self, namespace: &str, local_name: &str) -> Option<bool> {
        self.value(namespace, local_name).and_then(AttrValue::as_bool)
    }

    /// String-like content of an attribute
    pub fn str_value(&self, namespace: &str, local_name: &str) -> Option<String> {
        self.value(namespace, local_name)
            .and_then(AttrValue::as_str)
            .map(str::to_string)
    }

    /// Extension elements with the given name
    pub fn elements_named<'a>(&'a self, qname: &'a QName) -> impl Iterator<Item = &'a dyn ExtensionElement> + 'a {
        self.elements
            .iter()
            .filter(move |e| e.element_type() == qname)
            .map(|e| e.as_ref())
    }

    /// Extension elements of a concrete type
    pub fn elements_of<T: ExtensionElement>(&self) -> impl Iterator<Item = &T> {
        self.elements
            .iter()
            .filter_map(|e| e.as_any().downcast_ref::<T>())
    }

    /// The context registered for a namespace
    pub fn context(&self, namespace: &str) -> Option<&dyn ComponentExtensions> {
        self.contexts.get(namespace).map(|c| c.as_ref())
    }

    /// The context for a namespace, downcast to its concrete type
    pub fn context_as<T: ComponentExtensions>(&self, namespace: &str) -> Option<&T> {
        self.context(namespace)
            .and_then(|c| c.as_any().downcast_ref::<T>())
    }

    /// Check if nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
            && self.unknown_attributes.is_empty()
            && self.elements.is_empty()
            && self.contexts.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
struct ElementTypeInfo {
    type_id: TypeId,
    type_name: &'static str,
}

/// Table of extension factories and deserializers
#[derive(Default)]
pub struct ExtensionRegistry {
    contexts: HashMap<(ComponentKind, String), Arc<dyn ComponentExtensionFactory>>,
    attributes: HashMap<(ComponentKind, QName), Arc<dyn XmlAttrFactory>>,
    deserializers: HashMap<(ComponentKind, QName), Arc<dyn ExtensionDeserializer>>,
    element_types: HashMap<(ComponentKind, QName), ElementTypeInfo>,
    registrar_reports: Vec<ErrorInfo>,
}

impl fmt::Debug for ExtensionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionRegistry")
            .field("contexts", &self.contexts.len())
            .field("attributes", &self.attributes.len())
            .field("deserializers", &self.deserializers.len())
            .field("element_types", &self.element_types.len())
            .field("registrar_reports", &self.registrar_reports.len())
            .finish()
    }
}

impl ExtensionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the WSDLX, RPC, SOAP and HTTP extensions
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        wsdlx::register(&mut registry);
        rpc::register(&mut registry);
        soap::register(&mut registry);
        http::register(&mut registry);
        registry
    }

    /// Create a registry with the built-ins and the named registrars
    ///
    /// Unknown names and registrars that fail or panic are reported as
    /// `CONFIGURATION_ERROR` errors and skipped; the remaining registrars
    /// still run. The registry keeps a copy of those reports, see
    /// [`registrar_reports`](Self::registrar_reports).
    pub fn populated(table: &RegistrarTable, names: &[String], reporter: &mut ErrorReporter) -> Self {
        let mut registry = Self::with_builtins();
        let first = reporter.reports().len();

        for name in names {
            let Some(ctor) = table.get(name) else {
                let cause = WsdlError::configuration(format!("no registrar named '{}'", name));
                report_configuration(reporter, "WSDL011", name, "", cause);
                continue;
            };

            let outcome = panic::catch_unwind(AssertUnwindSafe(|| -> Result<()> {
                let registrar = ctor()?;
                registrar.register(&mut registry)
            }));

            match outcome {
                Ok(Ok(())) => debug!("Registered extension registrar '{}'", name),
                Ok(Err(e)) => {
                    let text = e.to_string();
                    report_configuration(reporter, "WSDL010", name, &text, e);
                }
                Err(payload) => {
                    let text = panic_message(payload.as_ref());
                    let cause = WsdlError::configuration(text.clone());
                    report_configuration(reporter, "WSDL010", name, &text, cause);
                }
            }
        }
        registry.registrar_reports = reporter.reports().iter().skip(first).cloned().collect();
        registry
    }

    /// Failures reported while the named registrars ran
    pub fn registrar_reports(&self) -> &[ErrorInfo] {
        &self.registrar_reports
    }

    /// Register the context factory for a namespace on a component kind
    pub fn register_component_extension(
        &mut self,
        kind: ComponentKind,
        namespace: impl Into<String>,
        factory: impl ComponentExtensionFactory + 'static,
    ) {
        self.contexts
            .insert((kind, namespace.into()), Arc::new(factory));
    }

    /// Register the factory for an extension attribute
    pub fn register_ext_attribute_type(
        &mut self,
        kind: ComponentKind,
        qname: QName,
        factory: impl XmlAttrFactory + 'static,
    ) {
        self.attributes.insert((kind, qname), Arc::new(factory));
    }

    /// Register the deserializer for an extension element
    pub fn register_deserializer(
        &mut self,
        kind: ComponentKind,
        qname: QName,
        deserializer: impl ExtensionDeserializer + 'static,
    ) {
        self.deserializers
            .insert((kind, qname), Arc::new(deserializer));
    }

    /// Declare the concrete type deserialized for an extension element
    pub fn register_ext_element_type<T: ExtensionElement>(&mut self, kind: ComponentKind, qname: QName) {
        self.element_types.insert(
            (kind, qname),
            ElementTypeInfo {
                type_id: TypeId::of::<T>(),
                type_name: std::any::type_name::<T>(),
            },
        );
    }

    /// The context factory for a namespace on a component kind
    pub fn query_component_extension(
        &self,
        kind: ComponentKind,
        namespace: &str,
    ) -> Option<&dyn ComponentExtensionFactory> {
        self.contexts
            .get(&(kind, namespace.to_string()))
            .map(|f| f.as_ref())
    }

    /// The attribute factory for an extension attribute
    pub fn query_ext_attribute_type(&self, kind: ComponentKind, qname: &QName) -> Option<&dyn XmlAttrFactory> {
        self.attributes
            .get(&(kind, qname.clone()))
            .map(|f| f.as_ref())
    }

    /// The deserializer for an extension element
    pub fn query_deserializer(&self, kind: ComponentKind, qname: &QName) -> Option<&dyn ExtensionDeserializer> {
        self.deserializers
            .get(&(kind, qname.clone()))
            .map(|d| d.as_ref())
    }

    /// Name of the concrete type declared for an extension element
    pub fn query_ext_element_type(&self, kind: ComponentKind, qname: &QName) -> Option<&'static str> {
        self.element_types
            .get(&(kind, qname.clone()))
            .map(|t| t.type_name)
    }

    /// Check a deserialized element against its declared type
    ///
    /// Elements without a declared type always match.
    pub fn element_type_matches(&self, kind: ComponentKind, element: &dyn ExtensionElement) -> bool {
        match self.element_types.get(&(kind, element.element_type().clone())) {
            Some(info) => element.as_any().type_id() == info.type_id,
            None => true,
        }
    }

    /// Namespaces with a context factory for a component kind, sorted
    pub fn component_namespaces(&self, kind: ComponentKind) -> Vec<&str> {
        let mut namespaces: Vec<&str> = self
            .contexts
            .keys()
            .filter(|(k, _)| *k == kind)
            .map(|(_, ns)| ns.as_str())
            .collect();
        namespaces.sort_unstable();
        namespaces
    }

    /// Element names with a deserializer for a component kind
    pub fn allowable_ext_elements(&self, kind: ComponentKind) -> Vec<&QName> {
        let mut names: Vec<&QName> = self
            .deserializers
            .keys()
            .filter(|(k, _)| *k == kind)
            .map(|(_, q)| q)
            .collect();
        names.sort();
        names
    }

    /// Build the wrapper for a foreign attribute
    ///
    /// Falls back to [`XmlAttr::unknown`] when no factory is registered.
    pub fn create_ext_attribute(&self, kind: ComponentKind, owner: &Element, qname: &QName, value: &str) -> XmlAttr {
        match self.query_ext_attribute_type(kind, qname) {
            Some(factory) => factory.create(owner, qname, value),
            None => XmlAttr::unknown(qname.clone(), value),
        }
    }

    /// Build the context of every registered namespace for a component kind
    pub fn create_contexts(&self, kind: ComponentKind, data: &ExtensionData) -> IndexMap<String, Box<dyn ComponentExtensions>> {
        self.component_namespaces(kind)
            .into_iter()
            .filter_map(|ns| {
                self.query_component_extension(kind, ns)
                    .map(|f| (ns.to_string(), f.create(kind, data)))
            })
            .collect()
    }

    /// The extension context of a built component
    ///
    /// `None` means no extension data for that namespace, never an error.
    pub fn get_extension_context<'c>(
        &self,
        component: &'c dyn WsdlComponent,
        namespace: &str,
    ) -> Option<&'c dyn ComponentExtensions> {
        component.extension_context(namespace)
    }
}

fn report_configuration(
    reporter: &mut ErrorReporter,
    id: &str,
    name: &str,
    detail: &str,
    cause: impl Into<Error>,
) {
    let result = reporter.report_error_with_cause(
        None,
        id,
        &[&name, &detail],
        Severity::Error,
        FaultCode::ConfigurationError,
        cause,
    );
    if let Err(e) = result {
        debug!("Continuing after registrar failure: {}", e);
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Registers a group of extensions
pub trait ExtensionRegistrar: Send + Sync {
    /// Add this group's factories and deserializers to `registry`
    fn register(&self, registry: &mut ExtensionRegistry) -> Result<()>;
}

type RegistrarCtor = Arc<dyn Fn() -> Result<Box<dyn ExtensionRegistrar>> + Send + Sync>;

/// Registrar constructors addressed by name
#[derive(Clone, Default)]
pub struct RegistrarTable {
    entries: HashMap<String, RegistrarCtor>,
}

impl fmt::Debug for RegistrarTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.entries.keys().collect();
        names.sort();
        f.debug_struct("RegistrarTable").field("names", &names).finish()
    }
}

impl RegistrarTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a constructor under a name
    pub fn add<F>(&mut self, name: impl Into<String>, ctor: F)
    where
        F: Fn() -> Result<Box<dyn ExtensionRegistrar>> + Send + Sync + 'static,
    {
        self.entries.insert(name.into(), Arc::new(ctor));
    }

    /// Builder form of [`RegistrarTable::add`]
    pub fn with<F>(mut self, name: impl Into<String>, ctor: F) -> Self
    where
        F: Fn() -> Result<Box<dyn ExtensionRegistrar>> + Send + Sync + 'static,
    {
        self.add(name, ctor);
        self
    }

    /// Look a constructor up
    pub fn get(&self, name: &str) -> Option<&(dyn Fn() -> Result<Box<dyn ExtensionRegistrar>> + Send + Sync)> {
        self.entries.get(name).map(|c| c.as_ref())
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if there are no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
