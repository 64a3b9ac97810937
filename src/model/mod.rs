//! WSDL 2.0 component model
//!
//! The model is a plain ownership tree: a [`Description`] owns its
//! interfaces, bindings and services, which own their operations and so
//! on. Cross references (an endpoint's binding, a binding's interface,
//! an interface's extended interfaces) are qualified names resolved
//! through the description, and each component knows its parent only
//! by [`ComponentId`].

pub mod binding;
pub mod description;
pub mod interface;
pub mod service;
pub mod types;

use std::fmt;

use serde::Serialize;

use crate::extensions::{ComponentExtensions, ExtensionData};
use crate::reporter::ErrorLocator;

pub use binding::{
    Binding, BindingFault, BindingFaultReference, BindingMessageReference, BindingOperation,
};
pub use description::{Description, ImportRecord, IncludeRecord, ReferenceStatus};
pub use interface::{
    Direction, Interface, InterfaceFault, InterfaceFaultReference, InterfaceMessageReference,
    InterfaceOperation, MessageContentModel, MEP_IN_ONLY, MEP_IN_OUT, MEP_ROBUST_IN_ONLY,
};
pub use service::{Endpoint, Service};
pub use types::{ElementDeclaration, Schema, SchemaKind, TypeDefinition, TypeDefinitionKind};

/// Identity of a component within one read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ComponentId(pub u32);

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hands out component ids
#[derive(Debug, Default)]
pub struct IdAllocator {
    next: u32,
}

impl IdAllocator {
    /// Create an allocator starting at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next id
    pub fn next_id(&mut self) -> ComponentId {
        let id = ComponentId(self.next);
        self.next += 1;
        id
    }
}

/// The kinds of WSDL 2.0 components
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ComponentKind {
    /// `description`
    Description,
    /// `interface`
    Interface,
    /// `interface/operation`
    InterfaceOperation,
    /// `interface/fault`
    InterfaceFault,
    /// `interface/operation/input|output`
    InterfaceMessageReference,
    /// `interface/operation/infault|outfault`
    InterfaceFaultReference,
    /// `binding`
    Binding,
    /// `binding/operation`
    BindingOperation,
    /// `binding/fault`
    BindingFault,
    /// `binding/operation/input|output`
    BindingMessageReference,
    /// `binding/operation/infault|outfault`
    BindingFaultReference,
    /// `service`
    Service,
    /// `service/endpoint`
    Endpoint,
}

impl ComponentKind {
    /// Every kind, in document order of first appearance
    pub const ALL: [ComponentKind; 13] = [
        ComponentKind::Description,
        ComponentKind::Interface,
        ComponentKind::InterfaceOperation,
        ComponentKind::InterfaceFault,
        ComponentKind::InterfaceMessageReference,
        ComponentKind::InterfaceFaultReference,
        ComponentKind::Binding,
        ComponentKind::BindingOperation,
        ComponentKind::BindingFault,
        ComponentKind::BindingMessageReference,
        ComponentKind::BindingFaultReference,
        ComponentKind::Service,
        ComponentKind::Endpoint,
    ];

    /// Component name as used in the WSDL 2.0 recommendation
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentKind::Description => "Description",
            ComponentKind::Interface => "Interface",
            ComponentKind::InterfaceOperation => "InterfaceOperation",
            ComponentKind::InterfaceFault => "InterfaceFault",
            ComponentKind::InterfaceMessageReference => "InterfaceMessageReference",
            ComponentKind::InterfaceFaultReference => "InterfaceFaultReference",
            ComponentKind::Binding => "Binding",
            ComponentKind::BindingOperation => "BindingOperation",
            ComponentKind::BindingFault => "BindingFault",
            ComponentKind::BindingMessageReference => "BindingMessageReference",
            ComponentKind::BindingFaultReference => "BindingFaultReference",
            ComponentKind::Service => "Service",
            ComponentKind::Endpoint => "Endpoint",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `<documentation>` element
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Documentation {
    /// Text content
    pub content: String,
    /// `xml:lang`, when given
    pub lang: Option<String>,
}

/// Data shared by every component
#[derive(Debug, Clone)]
pub struct ComponentInfo {
    /// Identity of this component
    pub id: ComponentId,
    /// Identity of the parent component, `None` for a description
    pub parent: Option<ComponentId>,
    /// Where the component was declared
    pub location: ErrorLocator,
    /// Documentation elements
    pub documentation: Vec<Documentation>,
}

impl ComponentInfo {
    /// Create info for a component
    pub fn new(id: ComponentId, parent: Option<ComponentId>, location: ErrorLocator) -> Self {
        Self {
            id,
            parent,
            location,
            documentation: Vec::new(),
        }
    }
}

/// Capabilities every component offers
pub trait WsdlComponent: fmt::Debug {
    /// The component kind
    fn kind(&self) -> ComponentKind;

    /// Shared component data
    fn info(&self) -> &ComponentInfo;

    /// Extension attributes, elements and contexts
    fn extensions(&self) -> &ExtensionData;

    /// Human readable name used in messages
    fn display_name(&self) -> String;

    /// Identity of this component
    fn id(&self) -> ComponentId {
        self.info().id
    }

    /// Identity of the parent component
    fn parent_id(&self) -> Option<ComponentId> {
        self.info().parent
    }

    /// Extension context registered for a namespace
    fn extension_context(&self, namespace: &str) -> Option<&dyn ComponentExtensions> {
        self.extensions().context(namespace)
    }
}

macro_rules! impl_component {
    ($ty:ty, $kind:expr, |$s:ident| $name:expr) => {
        impl crate::model::WsdlComponent for $ty {
            fn kind(&self) -> crate::model::ComponentKind {
                $kind
            }

            fn info(&self) -> &crate::model::ComponentInfo {
                &self.info
            }

            fn extensions(&self) -> &crate::extensions::ExtensionData {
                &self.ext
            }

            fn display_name(&self) -> String {
                let $s = self;
                $name
            }
        }
    };
}
pub(crate) use impl_component;

/// A borrowed component of any kind
#[derive(Debug, Clone, Copy)]
pub enum ComponentRef<'a> {
    /// A description
    Description(&'a Description),
    /// An interface
    Interface(&'a Interface),
    /// An interface operation
    InterfaceOperation(&'a InterfaceOperation),
    /// An interface fault
    InterfaceFault(&'a InterfaceFault),
    /// An interface message reference
    InterfaceMessageReference(&'a InterfaceMessageReference),
    /// An interface fault reference
    InterfaceFaultReference(&'a InterfaceFaultReference),
    /// A binding
    Binding(&'a Binding),
    /// A binding operation
    BindingOperation(&'a BindingOperation),
    /// A binding fault
    BindingFault(&'a BindingFault),
    /// A binding message reference
    BindingMessageReference(&'a BindingMessageReference),
    /// A binding fault reference
    BindingFaultReference(&'a BindingFaultReference),
    /// A service
    Service(&'a Service),
    /// An endpoint
    Endpoint(&'a Endpoint),
}

impl<'a> ComponentRef<'a> {
    /// View as the common component capabilities
    pub fn as_component(&self) -> &'a dyn WsdlComponent {
        match *self {
            ComponentRef::Description(c) => c,
            ComponentRef::Interface(c) => c,
            ComponentRef::InterfaceOperation(c) => c,
            ComponentRef::InterfaceFault(c) => c,
            ComponentRef::InterfaceMessageReference(c) => c,
            ComponentRef::InterfaceFaultReference(c) => c,
            ComponentRef::Binding(c) => c,
            ComponentRef::BindingOperation(c) => c,
            ComponentRef::BindingFault(c) => c,
            ComponentRef::BindingMessageReference(c) => c,
            ComponentRef::BindingFaultReference(c) => c,
            ComponentRef::Service(c) => c,
            ComponentRef::Endpoint(c) => c,
        }
    }

    /// The component kind
    pub fn kind(&self) -> ComponentKind {
        self.as_component().kind()
    }

    /// Identity of the component
    pub fn id(&self) -> ComponentId {
        self.as_component().id()
    }

    /// Where the component was declared
    pub fn location(&self) -> &'a ErrorLocator {
        &self.as_component().info().location
    }

    /// The direct children of this component
    pub fn children(&self) -> Vec<ComponentRef<'a>> {
        match *self {
            ComponentRef::Description(d) => d
                .interfaces
                .iter()
                .map(ComponentRef::Interface)
                .chain(d.bindings.iter().map(ComponentRef::Binding))
                .chain(d.services.iter().map(ComponentRef::Service))
                .collect(),
            ComponentRef::Interface(i) => i
                .operations
                .iter()
                .map(ComponentRef::InterfaceOperation)
                .chain(i.faults.iter().map(ComponentRef::InterfaceFault))
                .collect(),
            ComponentRef::InterfaceOperation(o) => o
                .messages
                .iter()
                .map(ComponentRef::InterfaceMessageReference)
                .chain(o.fault_references.iter().map(ComponentRef::InterfaceFaultReference))
                .collect(),
            ComponentRef::Binding(b) => b
                .operations
                .iter()
                .map(ComponentRef::BindingOperation)
                .chain(b.faults.iter().map(ComponentRef::BindingFault))
                .collect(),
            ComponentRef::BindingOperation(o) => o
                .messages
                .iter()
                .map(ComponentRef::BindingMessageReference)
                .chain(o.fault_references.iter().map(ComponentRef::BindingFaultReference))
                .collect(),
            ComponentRef::Service(s) => s.endpoints.iter().map(ComponentRef::Endpoint).collect(),
            _ => Vec::new(),
        }
    }

    /// This component and all of its descendants, depth first
    pub fn descendants_and_self(&self) -> Vec<ComponentRef<'a>> {
        let mut out = Vec::new();
        let mut stack = vec![*self];
        while let Some(c) = stack.pop() {
            out.push(c);
            let mut children = c.children();
            children.reverse();
            stack.extend(children);
        }
        out
    }
}
