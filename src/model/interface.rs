//! Interface components

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use super::{impl_component, ComponentInfo, ComponentKind, Description};
use crate::extensions::ExtensionData;
use crate::namespaces::QName;

/// In-only message exchange pattern
pub const MEP_IN_ONLY: &str = "http://www.w3.org/ns/wsdl/in-only";

/// Robust in-only message exchange pattern
pub const MEP_ROBUST_IN_ONLY: &str = "http://www.w3.org/ns/wsdl/robust-in-only";

/// In-out message exchange pattern (the default)
pub const MEP_IN_OUT: &str = "http://www.w3.org/ns/wsdl/in-out";

/// Direction of a message or fault reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// `input` / `infault`
    In,
    /// `output` / `outfault`
    Out,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::In => "in",
            Direction::Out => "out",
        })
    }
}

/// The `{message content model}` of a message reference or fault
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum MessageContentModel {
    /// `#any`
    Any,
    /// `#none`
    None,
    /// `#other`, also the value when `element` is absent
    Other,
    /// A global element declaration
    Element(QName),
}

impl MessageContentModel {
    /// The referenced element declaration, if any
    pub fn element(&self) -> Option<&QName> {
        match self {
            MessageContentModel::Element(q) => Some(q),
            _ => None,
        }
    }
}

/// An `interface` component
#[derive(Debug)]
pub struct Interface {
    /// Shared component data
    pub info: ComponentInfo,
    /// Extensions
    pub ext: ExtensionData,
    /// `{name}`; absent for anonymous interfaces
    pub name: Option<QName>,
    /// Directly extended interfaces, as written
    pub extends: Vec<QName>,
    /// `styleDefault` URIs
    pub style_default: Vec<String>,
    /// Operations declared by this interface
    pub operations: Vec<InterfaceOperation>,
    /// Faults declared by this interface
    pub faults: Vec<InterfaceFault>,
}

impl_component!(Interface, ComponentKind::Interface, |s| match &s.name {
    Some(n) => n.to_string(),
    None => "(anonymous interface)".to_string(),
});

impl Interface {
    /// Create an empty interface
    pub fn new(info: ComponentInfo, name: Option<QName>) -> Self {
        Self {
            info,
            ext: ExtensionData::default(),
            name,
            extends: Vec::new(),
            style_default: Vec::new(),
            operations: Vec::new(),
            faults: Vec::new(),
        }
    }

    /// Find a directly declared operation by name
    pub fn operation(&self, name: &QName) -> Option<&InterfaceOperation> {
        self.operations
            .iter()
            .find(|o| o.name.as_ref() == Some(name))
    }

    /// Find a directly declared fault by name
    pub fn fault(&self, name: &QName) -> Option<&InterfaceFault> {
        self.faults.iter().find(|f| f.name.as_ref() == Some(name))
    }

    /// Names of every interface reachable through `extends`
    ///
    /// Interfaces are compared by name, so two proxies for the same
    /// logical interface count once. A visited set bounds the walk when
    /// the graph has a cycle; names that do not resolve are included but
    /// not followed.
    pub fn extended_interface_names(&self, desc: &Description) -> BTreeSet<QName> {
        let mut visited: BTreeSet<QName> = BTreeSet::new();
        let mut pending: Vec<&QName> = self.extends.iter().collect();

        while let Some(name) = pending.pop() {
            if !visited.insert(name.clone()) {
                continue;
            }
            if let Some(iface) = desc.interface(name) {
                pending.extend(iface.extends.iter());
            }
        }
        visited
    }

    /// Every resolvable interface reachable through `extends`
    pub fn extended_interfaces<'d>(&self, desc: &'d Description) -> Vec<&'d Interface> {
        self.extended_interface_names(desc)
            .iter()
            .filter_map(|n| desc.interface(n))
            .collect()
    }

    /// Find an operation declared here or inherited through `extends`
    pub fn find_operation<'a>(
        &'a self,
        desc: &'a Description,
        name: &QName,
    ) -> Option<&'a InterfaceOperation> {
        self.operation(name).or_else(|| {
            self.extended_interfaces(desc)
                .into_iter()
                .find_map(|i| i.operation(name))
        })
    }

    /// Find a fault declared here or inherited through `extends`
    pub fn find_fault<'a>(&'a self, desc: &'a Description, name: &QName) -> Option<&'a InterfaceFault> {
        self.fault(name).or_else(|| {
            self.extended_interfaces(desc)
                .into_iter()
                .find_map(|i| i.fault(name))
        })
    }
}

/// An `interface/operation` component
#[derive(Debug)]
pub struct InterfaceOperation {
    /// Shared component data
    pub info: ComponentInfo,
    /// Extensions (`wsdlx:safe`, `rpc:signature`, ...)
    pub ext: ExtensionData,
    /// `{name}`, qualified by the target namespace
    pub name: Option<QName>,
    /// `{message exchange pattern}` as written
    pub pattern: Option<String>,
    /// `{style}` URIs
    pub style: Vec<String>,
    /// `input` and `output` references in document order
    pub messages: Vec<InterfaceMessageReference>,
    /// `infault` and `outfault` references in document order
    pub fault_references: Vec<InterfaceFaultReference>,
}

impl_component!(InterfaceOperation, ComponentKind::InterfaceOperation, |s| s
    .name
    .as_ref()
    .map(|n| n.to_string())
    .unwrap_or_else(|| "(unnamed operation)".to_string()));

impl InterfaceOperation {
    /// Create an empty operation
    pub fn new(info: ComponentInfo, name: Option<QName>) -> Self {
        Self {
            info,
            ext: ExtensionData::default(),
            name,
            pattern: None,
            style: Vec::new(),
            messages: Vec::new(),
            fault_references: Vec::new(),
        }
    }

    /// The message exchange pattern, defaulting to in-out
    pub fn effective_pattern(&self) -> &str {
        self.pattern.as_deref().unwrap_or(MEP_IN_OUT)
    }

    /// Message references in the given direction
    pub fn messages_in(&self, direction: Direction) -> impl Iterator<Item = &InterfaceMessageReference> {
        self.messages.iter().filter(move |m| m.direction == direction)
    }
}

/// An `interface/fault` component
#[derive(Debug)]
pub struct InterfaceFault {
    /// Shared component data
    pub info: ComponentInfo,
    /// Extensions
    pub ext: ExtensionData,
    /// `{name}`, qualified by the target namespace
    pub name: Option<QName>,
    /// `{message content model}`
    pub content_model: MessageContentModel,
}

impl_component!(InterfaceFault, ComponentKind::InterfaceFault, |s| s
    .name
    .as_ref()
    .map(|n| n.to_string())
    .unwrap_or_else(|| "(unnamed fault)".to_string()));

/// An `input`/`output` of an interface operation
#[derive(Debug)]
pub struct InterfaceMessageReference {
    /// Shared component data
    pub info: ComponentInfo,
    /// Extensions
    pub ext: ExtensionData,
    /// `{message label}`
    pub message_label: Option<String>,
    /// `{direction}`
    pub direction: Direction,
    /// `{message content model}`
    pub content_model: MessageContentModel,
}

impl_component!(InterfaceMessageReference, ComponentKind::InterfaceMessageReference, |s| {
    format!(
        "{} message {}",
        s.direction,
        s.message_label.as_deref().unwrap_or("(unlabelled)")
    )
});

/// An `infault`/`outfault` of an interface operation
#[derive(Debug)]
pub struct InterfaceFaultReference {
    /// Shared component data
    pub info: ComponentInfo,
    /// Extensions
    pub ext: ExtensionData,
    /// `ref` to an interface fault
    pub fault_ref: Option<QName>,
    /// `{message label}`
    pub message_label: Option<String>,
    /// `{direction}`
    pub direction: Direction,
}

impl_component!(InterfaceFaultReference, ComponentKind::InterfaceFaultReference, |s| {
    format!(
        "{} fault {}",
        s.direction,
        s.fault_ref
            .as_ref()
            .map(|q| q.to_string())
            .unwrap_or_else(|| "(no ref)".to_string())
    )
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_model_serializes() {
        let model = MessageContentModel::Element(QName::namespaced("urn:x", "request"));
        let value = serde_json::to_value(&model).unwrap();
        assert_eq!(value["Element"]["local_name"], "request");
        assert_eq!(value["Element"]["namespace"], "urn:x");

        assert_eq!(serde_json::to_value(MessageContentModel::Any).unwrap(), "Any");
    }
}
