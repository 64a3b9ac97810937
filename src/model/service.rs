//! Service components

use super::{impl_component, Binding, ComponentInfo, ComponentKind, Description, Interface};
use crate::extensions::ExtensionData;
use crate::namespaces::QName;

/// A `service` component
#[derive(Debug)]
pub struct Service {
    /// Shared component data
    pub info: ComponentInfo,
    /// Extensions
    pub ext: ExtensionData,
    /// `{name}`
    pub name: Option<QName>,
    /// The interface offered by every endpoint
    pub interface: Option<QName>,
    /// Endpoints
    pub endpoints: Vec<Endpoint>,
}

impl_component!(Service, ComponentKind::Service, |s| s
    .name
    .as_ref()
    .map(|n| n.to_string())
    .unwrap_or_else(|| "(unnamed service)".to_string()));

impl Service {
    /// Create an empty service
    pub fn new(info: ComponentInfo, name: Option<QName>) -> Self {
        Self {
            info,
            ext: ExtensionData::default(),
            name,
            interface: None,
            endpoints: Vec::new(),
        }
    }

    /// The service interface resolved through the description
    pub fn resolved_interface<'d>(&self, desc: &'d Description) -> Option<&'d Interface> {
        self.interface.as_ref().and_then(|q| desc.interface(q))
    }

    /// Find an endpoint by its local name
    pub fn endpoint(&self, name: &str) -> Option<&Endpoint> {
        self.endpoints.iter().find(|e| e.name.as_deref() == Some(name))
    }
}

/// A `service/endpoint` component
#[derive(Debug)]
pub struct Endpoint {
    /// Shared component data
    pub info: ComponentInfo,
    /// Extensions
    pub ext: ExtensionData,
    /// `{name}`, an NCName
    pub name: Option<String>,
    /// The binding used by this endpoint
    pub binding: Option<QName>,
    /// `{address}`
    pub address: Option<String>,
}

impl_component!(Endpoint, ComponentKind::Endpoint, |s| s
    .name
    .clone()
    .unwrap_or_else(|| "(unnamed endpoint)".to_string()));

impl Endpoint {
    /// The binding resolved through the description
    pub fn resolved_binding<'d>(&self, desc: &'d Description) -> Option<&'d Binding> {
        self.binding.as_ref().and_then(|q| desc.binding(q))
    }
}
