//! RPC style: `rpc:signature`

use std::any::Any;
use std::fmt;

use super::attrs::{AttrValue, XmlAttr};
use super::elements::ComponentExtensions;
use super::{ExtensionData, ExtensionRegistry};
use crate::documents::Element;
use crate::model::ComponentKind;
use crate::namespaces::{QName, RPC_NAMESPACE};

/// The RPC style URI
pub const RPC_STYLE: &str = "http://www.w3.org/ns/wsdl/style/rpc";

/// Direction token of an RPC argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RpcDirection {
    /// `#in`
    In,
    /// `#out`
    Out,
    /// `#inout`
    InOut,
    /// `#return`
    Return,
}

impl RpcDirection {
    /// Parse a direction token
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "#in" => Some(RpcDirection::In),
            "#out" => Some(RpcDirection::Out),
            "#inout" => Some(RpcDirection::InOut),
            "#return" => Some(RpcDirection::Return),
            _ => None,
        }
    }

    /// The token as written
    pub fn as_str(&self) -> &'static str {
        match self {
            RpcDirection::In => "#in",
            RpcDirection::Out => "#out",
            RpcDirection::InOut => "#inout",
            RpcDirection::Return => "#return",
        }
    }
}

impl fmt::Display for RpcDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `(QName, direction)` pair of a signature
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RpcArgument {
    /// Local element name of the argument
    pub name: QName,
    /// Direction
    pub direction: RpcDirection,
}

impl fmt::Display for RpcArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.direction)
    }
}

/// Parse a signature value into arguments
///
/// The value is a list of QName and direction token pairs; an odd
/// number of items, an unknown token or an unresolvable QName make the
/// whole value invalid.
pub fn parse_signature(owner: &Element, value: &str) -> Option<Vec<RpcArgument>> {
    let items: Vec<&str> = value.split_whitespace().collect();
    if items.len() % 2 != 0 {
        return None;
    }
    items
        .chunks(2)
        .map(|pair| {
            let name = if crate::names::is_valid_qname(pair[0]) {
                owner.resolve_qname(pair[0]).ok()?
            } else {
                return None;
            };
            let direction = RpcDirection::parse(pair[1])?;
            Some(RpcArgument { name, direction })
        })
        .collect()
}

/// `rpc:signature` attribute factory
pub fn signature_attr(owner: &Element, qname: &QName, value: &str) -> XmlAttr {
    XmlAttr::new(
        qname.clone(),
        value,
        parse_signature(owner, value).map(AttrValue::Signature),
    )
}

/// `{rpc signature}` of an interface operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcOperationExtensions {
    signature: Option<Vec<RpcArgument>>,
}

impl RpcOperationExtensions {
    /// The signature, when present and valid
    pub fn signature(&self) -> Option<&[RpcArgument]> {
        self.signature.as_deref()
    }
}

impl ComponentExtensions for RpcOperationExtensions {
    fn namespace(&self) -> &str {
        RPC_NAMESPACE
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn properties(&self) -> Vec<(String, String)> {
        match &self.signature {
            Some(args) => vec![(
                "rpc signature".to_string(),
                args.iter().map(|a| a.to_string()).collect::<Vec<_>>().join(", "),
            )],
            None => Vec::new(),
        }
    }
}

/// Register `rpc:signature` on interface operations
pub fn register(registry: &mut ExtensionRegistry) {
    registry.register_ext_attribute_type(
        ComponentKind::InterfaceOperation,
        QName::namespaced(RPC_NAMESPACE, "signature"),
        signature_attr,
    );
    registry.register_component_extension(
        ComponentKind::InterfaceOperation,
        RPC_NAMESPACE,
        |_: ComponentKind, data: &ExtensionData| -> Box<dyn ComponentExtensions> {
            let signature = match data.value(RPC_NAMESPACE, "signature") {
                Some(AttrValue::Signature(args)) => Some(args.clone()),
                _ => None,
            };
            Box::new(RpcOperationExtensions { signature })
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::Document;

    #[test]
    fn test_parse_signature() {
        let doc = Document::from_string(r#"<op xmlns:t="urn:t"/>"#).unwrap();
        let args = parse_signature(doc.root(), "t:a #in t:b #return").unwrap();
        assert_eq!(args.len(), 2);
        assert_eq!(args[0].name, QName::namespaced("urn:t", "a"));
        assert_eq!(args[1].direction, RpcDirection::Return);

        assert!(parse_signature(doc.root(), "t:a").is_none());
        assert!(parse_signature(doc.root(), "t:a #sideways").is_none());
        assert!(parse_signature(doc.root(), "x:a #in").is_none());
        assert_eq!(parse_signature(doc.root(), "").map(|a| a.len()), Some(0));
    }
}
