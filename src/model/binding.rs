//! Binding components

use super::{impl_component, ComponentInfo, ComponentKind, Description, Direction, Interface};
use crate::extensions::ExtensionData;
use crate::namespaces::QName;

/// A `binding` component
#[derive(Debug)]
pub struct Binding {
    /// Shared component data
    pub info: ComponentInfo,
    /// Extensions
    pub ext: ExtensionData,
    /// `{name}`
    pub name: Option<QName>,
    /// The bound interface, if the binding is interface specific
    pub interface: Option<QName>,
    /// `{type}` URI, e.g. the SOAP or HTTP binding namespace
    pub binding_type: Option<String>,
    /// Binding operations
    pub operations: Vec<BindingOperation>,
    /// Binding faults
    pub faults: Vec<BindingFault>,
}

impl_component!(Binding, ComponentKind::Binding, |s| s
    .name
    .as_ref()
    .map(|n| n.to_string())
    .unwrap_or_else(|| "(unnamed binding)".to_string()));

impl Binding {
    /// Create an empty binding
    pub fn new(info: ComponentInfo, name: Option<QName>) -> Self {
        Self {
            info,
            ext: ExtensionData::default(),
            name,
            interface: None,
            binding_type: None,
            operations: Vec::new(),
            faults: Vec::new(),
        }
    }

    /// The bound interface resolved through the description
    pub fn resolved_interface<'d>(&self, desc: &'d Description) -> Option<&'d Interface> {
        self.interface.as_ref().and_then(|q| desc.interface(q))
    }
}

/// A `binding/operation` component
#[derive(Debug)]
pub struct BindingOperation {
    /// Shared component data
    pub info: ComponentInfo,
    /// Extensions
    pub ext: ExtensionData,
    /// `ref` to an interface operation
    pub operation_ref: Option<QName>,
    /// `input` and `output` references
    pub messages: Vec<BindingMessageReference>,
    /// `infault` and `outfault` references
    pub fault_references: Vec<BindingFaultReference>,
}

impl_component!(BindingOperation, ComponentKind::BindingOperation, |s| s
    .operation_ref
    .as_ref()
    .map(|n| n.to_string())
    .unwrap_or_else(|| "(binding operation without ref)".to_string()));

impl BindingOperation {
    /// Create an empty binding operation
    pub fn new(info: ComponentInfo, operation_ref: Option<QName>) -> Self {
        Self {
            info,
            ext: ExtensionData::default(),
            operation_ref,
            messages: Vec::new(),
            fault_references: Vec::new(),
        }
    }
}

/// A `binding/fault` component
#[derive(Debug)]
pub struct BindingFault {
    /// Shared component data
    pub info: ComponentInfo,
    /// Extensions
    pub ext: ExtensionData,
    /// `ref` to an interface fault
    pub fault_ref: Option<QName>,
}

impl_component!(BindingFault, ComponentKind::BindingFault, |s| s
    .fault_ref
    .as_ref()
    .map(|n| n.to_string())
    .unwrap_or_else(|| "(binding fault without ref)".to_string()));

/// An `input`/`output` of a binding operation
#[derive(Debug)]
pub struct BindingMessageReference {
    /// Shared component data
    pub info: ComponentInfo,
    /// Extensions
    pub ext: ExtensionData,
    /// `messageLabel`, when written
    pub message_label: Option<String>,
    /// `{direction}`
    pub direction: Direction,
}

impl_component!(BindingMessageReference, ComponentKind::BindingMessageReference, |s| {
    format!(
        "{} message {}",
        s.direction,
        s.message_label.as_deref().unwrap_or("(unlabelled)")
    )
});

/// An `infault`/`outfault` of a binding operation
#[derive(Debug)]
pub struct BindingFaultReference {
    /// Shared component data
    pub info: ComponentInfo,
    /// Extensions
    pub ext: ExtensionData,
    /// `ref` to an interface fault
    pub fault_ref: Option<QName>,
    /// `messageLabel`, when written
    pub message_label: Option<String>,
    /// `{direction}`
    pub direction: Direction,
}

impl_component!(BindingFaultReference, ComponentKind::BindingFaultReference, |s| {
    format!(
        "{} fault {}",
        s.direction,
        s.fault_ref
            .as_ref()
            .map(|q| q.to_string())
            .unwrap_or_else(|| "(no ref)".to_string())
    )
});
