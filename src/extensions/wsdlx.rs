//! WSDL extensions namespace: `wsdlx:safe`

use std::any::Any;

use super::attrs::boolean_attr;
use super::elements::ComponentExtensions;
use super::{ExtensionData, ExtensionRegistry};
use crate::model::ComponentKind;
use crate::namespaces::{QName, WSDLX_NAMESPACE};

/// `{safe}` of an interface operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WsdlxOperationExtensions {
    safe: Option<bool>,
}

impl WsdlxOperationExtensions {
    /// `{safe}`; an absent or invalid attribute means not safe
    pub fn is_safe(&self) -> bool {
        self.safe.unwrap_or(false)
    }

    /// The attribute value when it was present and valid
    pub fn safe(&self) -> Option<bool> {
        self.safe
    }
}

impl ComponentExtensions for WsdlxOperationExtensions {
    fn namespace(&self) -> &str {
        WSDLX_NAMESPACE
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn properties(&self) -> Vec<(String, String)> {
        vec![("safe".to_string(), self.is_safe().to_string())]
    }
}

/// Register `wsdlx:safe` on interface operations
pub fn register(registry: &mut ExtensionRegistry) {
    registry.register_ext_attribute_type(
        ComponentKind::InterfaceOperation,
        QName::namespaced(WSDLX_NAMESPACE, "safe"),
        boolean_attr,
    );
    registry.register_component_extension(
        ComponentKind::InterfaceOperation,
        WSDLX_NAMESPACE,
        |_: ComponentKind, data: &ExtensionData| -> Box<dyn ComponentExtensions> {
            Box::new(WsdlxOperationExtensions {
                safe: data.bool_value(WSDLX_NAMESPACE, "safe"),
            })
        },
    );
}
