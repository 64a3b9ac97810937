//! Extension elements and component extension contexts

use std::any::Any;
use std::fmt;

use crate::documents::Element;
use crate::error::Result;
use crate::model::ComponentKind;
use crate::namespaces::{QName, WSDL_NAMESPACE};

use super::ExtensionRegistry;

/// A deserialized foreign-namespace child of a WSDL element
pub trait ExtensionElement: fmt::Debug + Send + Sync + Any {
    /// Qualified name of the element
    fn element_type(&self) -> &QName;

    /// The `wsdl:required` attribute, when given
    fn required(&self) -> Option<bool>;

    /// Downcast support
    fn as_any(&self) -> &dyn Any;
}

/// Turns an XML subtree into an [`ExtensionElement`]
pub trait ExtensionDeserializer: Send + Sync {
    /// Deserialize `element` found under a component of `kind`
    fn deserialize(
        &self,
        kind: ComponentKind,
        element: &Element,
        registry: &ExtensionRegistry,
    ) -> Result<Box<dyn ExtensionElement>>;
}

impl<F> ExtensionDeserializer for F
where
    F: Fn(ComponentKind, &Element, &ExtensionRegistry) -> Result<Box<dyn ExtensionElement>>
        + Send
        + Sync,
{
    fn deserialize(
        &self,
        kind: ComponentKind,
        element: &Element,
        registry: &ExtensionRegistry,
    ) -> Result<Box<dyn ExtensionElement>> {
        self(kind, element, registry)
    }
}

/// Typed property facade for one extension namespace on one component
pub trait ComponentExtensions: fmt::Debug + Send + Sync + Any {
    /// The extension namespace
    fn namespace(&self) -> &str;

    /// Downcast support
    fn as_any(&self) -> &dyn Any;

    /// Property names and values, for display
    fn properties(&self) -> Vec<(String, String)>;
}

/// Builds the extension context of a namespace for a component
pub trait ComponentExtensionFactory: Send + Sync {
    /// Create the context from the component's extension data
    fn create(&self, kind: ComponentKind, data: &super::ExtensionData) -> Box<dyn ComponentExtensions>;
}

impl<F> ComponentExtensionFactory for F
where
    F: Fn(ComponentKind, &super::ExtensionData) -> Box<dyn ComponentExtensions> + Send + Sync,
{
    fn create(&self, kind: ComponentKind, data: &super::ExtensionData) -> Box<dyn ComponentExtensions> {
        self(kind, data)
    }
}

/// Read the `wsdl:required` attribute of an extension element
pub fn required_attribute(element: &Element) -> Option<bool> {
    element
        .get_attribute_qname(&QName::namespaced(WSDL_NAMESPACE, "required"))
        .and_then(|v| match v.trim() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        })
}

/// Push a property when a value is present
pub(crate) fn push_property<T: fmt::Display>(
    out: &mut Vec<(String, String)>,
    name: &str,
    value: Option<T>,
) {
    if let Some(v) = value {
        out.push((name.to_string(), v.to_string()));
    }
}
