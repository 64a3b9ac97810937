//! XML namespace handling
//!
//! This module provides qualified names (QNames), in-scope namespace
//! prefix mappings and the namespaces a WSDL 2.0 reader needs to know.

use crate::error::{Error, FaultCode, Result, WsdlError};
use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

/// XML Namespace URI
pub type NamespaceUri = String;

/// Namespace prefix
pub type Prefix = String;

/// WSDL 2.0 namespace
pub const WSDL_NAMESPACE: &str = "http://www.w3.org/ns/wsdl";

/// WSDL 2.0 extensions namespace (`wsdlx:safe`)
pub const WSDLX_NAMESPACE: &str = "http://www.w3.org/ns/wsdl-extensions";

/// WSDL 2.0 RPC style namespace
pub const RPC_NAMESPACE: &str = "http://www.w3.org/ns/wsdl/rpc";

/// WSDL 2.0 SOAP binding namespace
pub const SOAP_NAMESPACE: &str = "http://www.w3.org/ns/wsdl/soap";

/// WSDL 2.0 HTTP binding namespace
pub const HTTP_NAMESPACE: &str = "http://www.w3.org/ns/wsdl/http";

/// XML Schema namespace
pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

/// XML namespace
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// XMLNS namespace
pub const XMLNS_NAMESPACE: &str = "http://www.w3.org/2000/xmlns/";

/// Qualified name (QName) - combination of namespace and local name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct QName {
    /// Namespace URI (None for no namespace)
    pub namespace: Option<NamespaceUri>,
    /// Local name
    pub local_name: String,
}

impl QName {
    /// Create a new QName
    pub fn new(namespace: Option<impl Into<String>>, local_name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.map(|s| s.into()).filter(|s: &String| !s.is_empty()),
            local_name: local_name.into(),
        }
    }

    /// Create a QName without a namespace
    pub fn local(local_name: impl Into<String>) -> Self {
        Self {
            namespace: None,
            local_name: local_name.into(),
        }
    }

    /// Create a QName with a namespace
    pub fn namespaced(namespace: impl Into<String>, local_name: impl Into<String>) -> Self {
        Self::new(Some(namespace), local_name)
    }

    /// Create a QName in the WSDL 2.0 namespace
    pub fn wsdl(local_name: impl Into<String>) -> Self {
        Self::namespaced(WSDL_NAMESPACE, local_name)
    }

    /// Namespace as a string slice, empty when absent
    pub fn namespace_str(&self) -> &str {
        self.namespace.as_deref().unwrap_or("")
    }

    /// Check namespace and local name at once
    pub fn is(&self, namespace: &str, local_name: &str) -> bool {
        self.namespace_str() == namespace && self.local_name == local_name
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{{{}}}{}", ns, self.local_name),
            None => f.write_str(&self.local_name),
        }
    }
}

/// Namespace context for resolving prefixes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespaceContext {
    /// Mapping from prefix to namespace URI, in declaration order
    prefixes: IndexMap<Prefix, NamespaceUri>,
    /// Default namespace (no prefix)
    default_namespace: Option<NamespaceUri>,
}

impl NamespaceContext {
    /// Create a new empty namespace context
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a namespace prefix mapping
    pub fn add_prefix(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) {
        self.prefixes.insert(prefix.into(), namespace.into());
    }

    /// Set the default namespace
    pub fn set_default_namespace(&mut self, namespace: impl Into<String>) {
        let namespace = namespace.into();
        self.default_namespace = if namespace.is_empty() { None } else { Some(namespace) };
    }

    /// Get the namespace for a prefix
    pub fn get_namespace(&self, prefix: &str) -> Option<&str> {
        match prefix {
            "xml" => Some(XML_NAMESPACE),
            "xmlns" => Some(XMLNS_NAMESPACE),
            _ => self.prefixes.get(prefix).map(|s| s.as_str()),
        }
    }

    /// Get the default namespace
    pub fn get_default_namespace(&self) -> Option<&str> {
        self.default_namespace.as_deref()
    }

    /// Find the first declared prefix bound to a namespace
    pub fn get_prefix(&self, namespace: &str) -> Option<&str> {
        self.prefixes
            .iter()
            .find(|(_, ns)| ns.as_str() == namespace)
            .map(|(p, _)| p.as_str())
    }

    /// Iterate over the prefix bindings
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.prefixes.iter().map(|(p, ns)| (p.as_str(), ns.as_str()))
    }

    /// Add every binding of `other` that is not already declared here
    pub fn inherit(&mut self, other: &NamespaceContext) {
        for (prefix, ns) in &other.prefixes {
            self.prefixes
                .entry(prefix.clone())
                .or_insert_with(|| ns.clone());
        }
        if self.default_namespace.is_none() {
            self.default_namespace = other.default_namespace.clone();
        }
    }

    /// Resolve a prefixed name to a QName
    ///
    /// Unprefixed names take the default namespace, as `xs:QName` values do.
    pub fn resolve(&self, prefixed_name: &str) -> Result<QName> {
        let prefixed_name = prefixed_name.trim();
        if let Some((prefix, local)) = prefixed_name.split_once(':') {
            let namespace = self.get_namespace(prefix).ok_or_else(|| {
                Error::Wsdl(WsdlError::new(
                    FaultCode::UnboundPrefix,
                    format!("Unknown prefix '{}' in '{}'", prefix, prefixed_name),
                ))
            })?;
            Ok(QName::namespaced(namespace, local))
        } else {
            Ok(QName::new(self.default_namespace.clone(), prefixed_name))
        }
    }

    /// Render a QName using the bindings in scope
    pub fn prefixed(&self, qname: &QName) -> Result<String> {
        match &qname.namespace {
            None => Ok(qname.local_name.clone()),
            Some(ns) if self.default_namespace.as_deref() == Some(ns.as_str()) => {
                Ok(qname.local_name.clone())
            }
            Some(ns) => match self.get_prefix(ns) {
                Some(prefix) => Ok(format!("{}:{}", prefix, qname.local_name)),
                None => Err(Error::Wsdl(WsdlError::new(
                    FaultCode::NoPrefixSpecified,
                    format!("No prefix is bound to namespace '{}'", ns),
                ))),
            },
        }
    }
}
