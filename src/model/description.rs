//! The root `description` component

use serde::Serialize;

use super::{
    impl_component, Binding, ComponentId, ComponentInfo, ComponentKind, ComponentRef,
    ElementDeclaration, Interface, Schema, Service, TypeDefinition,
};
use crate::extensions::ExtensionData;
use crate::model::types::is_builtin_type;
use crate::namespaces::{NamespaceContext, QName};
use crate::reporter::ErrorLocator;

/// What happened to an `<import>` or `<include>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceStatus {
    /// The referenced document was read and flattened into the description
    Merged,
    /// The same (namespace, location) pair was already merged
    Skipped,
    /// The referenced document could not be loaded or parsed
    Failed,
    /// No `location` was given, so nothing was loaded
    NoLocation,
}

/// Provenance of an `<import>`
#[derive(Debug, Clone, Serialize)]
pub struct ImportRecord {
    /// The `namespace` attribute
    pub namespace: Option<String>,
    /// The `location` attribute as written
    pub location: Option<String>,
    /// The location after base resolution and the resolver chain
    pub resolved: Option<String>,
    /// Target namespace of the imported document, once read
    pub imported_namespace: Option<String>,
    /// Target namespace of the importing document
    pub importing_namespace: Option<String>,
    /// Where the `<import>` element is
    pub locator: ErrorLocator,
    /// Outcome
    pub status: ReferenceStatus,
}

/// Provenance of an `<include>`
#[derive(Debug, Clone, Serialize)]
pub struct IncludeRecord {
    /// The `location` attribute as written
    pub location: Option<String>,
    /// The location after base resolution and the resolver chain
    pub resolved: Option<String>,
    /// Target namespace of the included document, once read
    pub included_namespace: Option<String>,
    /// Target namespace of the including document
    pub including_namespace: Option<String>,
    /// Where the `<include>` element is
    pub locator: ErrorLocator,
    /// Outcome
    pub status: ReferenceStatus,
}

/// The flattened component model of one or more composed documents
#[derive(Debug)]
pub struct Description {
    /// Shared component data
    pub info: ComponentInfo,
    /// Extensions
    pub ext: ExtensionData,
    /// `targetNamespace`; `None` for the anonymous namespace
    pub target_namespace: Option<String>,
    /// URI of the root document, when read from a location
    pub document_uri: Option<String>,
    /// Prefix bindings declared on the root element
    pub namespaces: NamespaceContext,
    /// Interfaces of every composed document
    pub interfaces: Vec<Interface>,
    /// Bindings of every composed document
    pub bindings: Vec<Binding>,
    /// Services of every composed document
    pub services: Vec<Service>,
    /// Inlined and imported schemas
    pub schemas: Vec<Schema>,
    /// Every `<import>` encountered
    pub imports: Vec<ImportRecord>,
    /// Every `<include>` encountered
    pub includes: Vec<IncludeRecord>,
}

impl_component!(Description, ComponentKind::Description, |s| {
    format!(
        "description {}",
        s.target_namespace.as_deref().unwrap_or("(no namespace)")
    )
});

impl Description {
    /// Create an empty description
    pub fn new(info: ComponentInfo, target_namespace: Option<String>) -> Self {
        Self {
            info,
            ext: ExtensionData::default(),
            target_namespace,
            document_uri: None,
            namespaces: NamespaceContext::new(),
            interfaces: Vec::new(),
            bindings: Vec::new(),
            services: Vec::new(),
            schemas: Vec::new(),
            imports: Vec::new(),
            includes: Vec::new(),
        }
    }

    /// Find the first interface with a name
    pub fn interface(&self, name: &QName) -> Option<&Interface> {
        self.interfaces.iter().find(|i| i.name.as_ref() == Some(name))
    }

    /// Find the first binding with a name
    pub fn binding(&self, name: &QName) -> Option<&Binding> {
        self.bindings.iter().find(|b| b.name.as_ref() == Some(name))
    }

    /// Find the first service with a name
    pub fn service(&self, name: &QName) -> Option<&Service> {
        self.services.iter().find(|s| s.name.as_ref() == Some(name))
    }

    /// Find an element declaration through referenceable schemas
    pub fn element_declaration(&self, name: &QName) -> Option<&ElementDeclaration> {
        self.schemas
            .iter()
            .filter(|s| s.referenceable)
            .find_map(|s| s.element_declaration(name))
    }

    /// Find an element declaration in any schema, referenceable or not
    pub fn element_declaration_any(&self, name: &QName) -> Option<&ElementDeclaration> {
        self.schemas.iter().find_map(|s| s.element_declaration(name))
    }

    /// Find a type definition through referenceable schemas or the built-ins
    pub fn type_definition(&self, name: &QName) -> Option<TypeDefinition> {
        if is_builtin_type(name) {
            return TypeDefinition::builtin(name);
        }
        self.schemas
            .iter()
            .filter(|s| s.referenceable)
            .find_map(|s| s.type_definition(name))
            .cloned()
    }

    /// Every component of the description, depth first, starting with itself
    pub fn components(&self) -> Vec<ComponentRef<'_>> {
        ComponentRef::Description(self).descendants_and_self()
    }

    /// Look a component up by id
    pub fn component(&self, id: ComponentId) -> Option<ComponentRef<'_>> {
        self.components().into_iter().find(|c| c.id() == id)
    }

    /// The parent of a component
    pub fn parent_of(&self, component: ComponentRef<'_>) -> Option<ComponentRef<'_>> {
        component
            .as_component()
            .parent_id()
            .and_then(|id| self.component(id))
    }

    /// Count of all components including the description
    pub fn component_count(&self) -> usize {
        self.components().len()
    }

    /// Move the components of a nested description into this one
    ///
    /// Top-level components are re-parented to this description. The
    /// nested description's own import and include records are kept so
    /// their assertions still run.
    pub fn merge(&mut self, other: Description) {
        let parent = Some(self.info.id);

        for mut interface in other.interfaces {
            interface.info.parent = parent;
            self.interfaces.push(interface);
        }
        for mut binding in other.bindings {
            binding.info.parent = parent;
            self.bindings.push(binding);
        }
        for mut service in other.services {
            service.info.parent = parent;
            self.services.push(service);
        }
        self.schemas.extend(other.schemas);
        self.imports.extend(other.imports);
        self.includes.extend(other.includes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{IdAllocator, InterfaceOperation, WsdlComponent};

    fn info(ids: &mut IdAllocator, parent: Option<ComponentId>) -> ComponentInfo {
        ComponentInfo::new(ids.next_id(), parent, ErrorLocator::default())
    }

    fn sample(ids: &mut IdAllocator, tns: &str, iface: &str) -> Description {
        let mut desc = Description::new(info(ids, None), Some(tns.to_string()));
        let desc_id = desc.id();
        let mut i = Interface::new(info(ids, Some(desc_id)), Some(QName::namespaced(tns, iface)));
        let op = InterfaceOperation::new(info(ids, Some(i.id())), Some(QName::namespaced(tns, "op")));
        i.operations.push(op);
        desc.interfaces.push(i);
        desc
    }

    #[test]
    fn test_lookup_and_traversal() {
        let mut ids = IdAllocator::new();
        let desc = sample(&mut ids, "urn:x", "I");

        let name = QName::namespaced("urn:x", "I");
        assert!(desc.interface(&name).is_some());
        assert!(desc.interface(&QName::namespaced("urn:x", "J")).is_none());
        assert_eq!(desc.component_count(), 3);

        let kinds: Vec<ComponentKind> = desc.components().iter().map(|c| c.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                ComponentKind::Description,
                ComponentKind::Interface,
                ComponentKind::InterfaceOperation
            ]
        );
    }

    #[test]
    fn test_parent_linkage() {
        let mut ids = IdAllocator::new();
        let desc = sample(&mut ids, "urn:x", "I");
        let op = &desc.interfaces[0].operations[0];

        let parent = desc.parent_of(ComponentRef::InterfaceOperation(op)).unwrap();
        assert_eq!(parent.kind(), ComponentKind::Interface);
        let root = desc.parent_of(parent).unwrap();
        assert_eq!(root.kind(), ComponentKind::Description);
        assert!(desc.parent_of(root).is_none());
    }

    #[test]
    fn test_merge_reparents() {
        let mut ids = IdAllocator::new();
        let mut desc = sample(&mut ids, "urn:x", "I");
        let other = sample(&mut ids, "urn:y", "J");

        desc.merge(other);
        assert_eq!(desc.interfaces.len(), 2);
        assert_eq!(desc.interfaces[1].info.parent, Some(desc.id()));
        assert!(desc.interface(&QName::namespaced("urn:y", "J")).is_some());
    }
}
