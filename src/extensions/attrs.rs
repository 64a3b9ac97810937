//! Extension attribute wrappers
//!
//! A wrapper parses the lexical form of an attribute into a typed value
//! when it is built. A lexically invalid value does not fail: the wrapper
//! is marked invalid, [`XmlAttr::content`] returns `None` and
//! [`XmlAttr::to_external_form`] still returns the original text.

use std::fmt;

use crate::documents::Element;
use crate::namespaces::QName;

use super::rpc::RpcArgument;

/// The `#any` token accepted by several extension attributes
pub const TOKEN_ANY: &str = "#any";

/// Typed content of an extension attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    /// `xs:boolean`
    Boolean(bool),
    /// `xs:string`
    String(String),
    /// `xs:anyURI`
    Uri(String),
    /// `xs:QName`
    QName(QName),
    /// A whitespace separated list of `xs:QName`
    QNameList(Vec<QName>),
    /// The `#any` token
    Any,
    /// `xs:int`
    Int(i64),
    /// A token from a fixed set
    Token(String),
    /// An `rpc:signature`
    Signature(Vec<RpcArgument>),
}

impl AttrValue {
    /// Boolean content
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// String-like content (string, URI or token)
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::String(s) | AttrValue::Uri(s) | AttrValue::Token(s) => Some(s),
            _ => None,
        }
    }

    /// QName content
    pub fn as_qname(&self) -> Option<&QName> {
        match self {
            AttrValue::QName(q) => Some(q),
            _ => None,
        }
    }

    /// QName list content
    pub fn as_qname_list(&self) -> Option<&[QName]> {
        match self {
            AttrValue::QNameList(list) => Some(list),
            _ => None,
        }
    }

    /// Integer content
    pub fn as_int(&self) -> Option<i64> {
        match self {
            AttrValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Check for the `#any` token
    pub fn is_any(&self) -> bool {
        matches!(self, AttrValue::Any)
    }
}

/// An extension attribute on a WSDL element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttr {
    qname: QName,
    lexical: String,
    content: Option<AttrValue>,
    known: bool,
}

impl XmlAttr {
    /// Wrap a parsed value; `None` marks the attribute invalid
    pub fn new(qname: QName, lexical: impl Into<String>, content: Option<AttrValue>) -> Self {
        Self {
            qname,
            lexical: lexical.into(),
            content,
            known: true,
        }
    }

    /// Wrap an attribute no factory is registered for
    ///
    /// The raw text is kept as string content so nothing is lost.
    pub fn unknown(qname: QName, lexical: impl Into<String>) -> Self {
        let lexical = lexical.into();
        Self {
            qname,
            content: Some(AttrValue::String(lexical.clone())),
            lexical,
            known: false,
        }
    }

    /// Qualified name of the attribute
    pub fn qname(&self) -> &QName {
        &self.qname
    }

    /// Whether the lexical form parsed
    pub fn is_valid(&self) -> bool {
        self.content.is_some()
    }

    /// Whether a registered factory built this wrapper
    pub fn is_known(&self) -> bool {
        self.known
    }

    /// Typed content, `None` if the lexical form was invalid
    pub fn content(&self) -> Option<&AttrValue> {
        self.content.as_ref()
    }

    /// The attribute value exactly as written
    pub fn to_external_form(&self) -> &str {
        &self.lexical
    }
}

impl fmt::Display for XmlAttr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}=\"{}\"", self.qname, self.lexical)
    }
}

/// Builds an attribute wrapper from the owner element and raw value
pub trait XmlAttrFactory: Send + Sync {
    /// Create the wrapper; never fails
    fn create(&self, owner: &Element, qname: &QName, value: &str) -> XmlAttr;
}

impl<F> XmlAttrFactory for F
where
    F: Fn(&Element, &QName, &str) -> XmlAttr + Send + Sync,
{
    fn create(&self, owner: &Element, qname: &QName, value: &str) -> XmlAttr {
        self(owner, qname, value)
    }
}

fn parse_boolean(value: &str) -> Option<bool> {
    match value.trim() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

/// `xs:boolean` attribute
pub fn boolean_attr(_owner: &Element, qname: &QName, value: &str) -> XmlAttr {
    XmlAttr::new(qname.clone(), value, parse_boolean(value).map(AttrValue::Boolean))
}

/// `xs:string` attribute
pub fn string_attr(_owner: &Element, qname: &QName, value: &str) -> XmlAttr {
    XmlAttr::new(qname.clone(), value, Some(AttrValue::String(value.to_string())))
}

/// `xs:anyURI` attribute; whitespace inside the value makes it invalid
pub fn uri_attr(_owner: &Element, qname: &QName, value: &str) -> XmlAttr {
    let trimmed = value.trim();
    let content = if trimmed.chars().any(char::is_whitespace) {
        None
    } else {
        Some(AttrValue::Uri(trimmed.to_string()))
    };
    XmlAttr::new(qname.clone(), value, content)
}

/// `xs:QName` attribute resolved against the owner's prefix bindings
pub fn qname_attr(owner: &Element, qname: &QName, value: &str) -> XmlAttr {
    let content = resolve(owner, value).map(AttrValue::QName);
    XmlAttr::new(qname.clone(), value, content)
}

/// `xs:QName` or `#any`
pub fn qname_or_any_attr(owner: &Element, qname: &QName, value: &str) -> XmlAttr {
    let content = if value.trim() == TOKEN_ANY {
        Some(AttrValue::Any)
    } else {
        resolve(owner, value).map(AttrValue::QName)
    };
    XmlAttr::new(qname.clone(), value, content)
}

/// A list of `xs:QName` or `#any`
pub fn qname_list_or_any_attr(owner: &Element, qname: &QName, value: &str) -> XmlAttr {
    let content = if value.trim() == TOKEN_ANY {
        Some(AttrValue::Any)
    } else {
        value
            .split_whitespace()
            .map(|item| resolve(owner, item))
            .collect::<Option<Vec<_>>>()
            .map(AttrValue::QNameList)
    };
    XmlAttr::new(qname.clone(), value, content)
}

/// `xs:int` or `#any`
pub fn int_or_any_attr(_owner: &Element, qname: &QName, value: &str) -> XmlAttr {
    let trimmed = value.trim();
    let content = if trimmed == TOKEN_ANY {
        Some(AttrValue::Any)
    } else {
        trimmed.parse::<i64>().ok().map(AttrValue::Int)
    };
    XmlAttr::new(qname.clone(), value, content)
}

/// A factory accepting one of a fixed set of tokens
pub fn token_attr(allowed: &'static [&'static str]) -> impl XmlAttrFactory {
    move |_owner: &Element, qname: &QName, value: &str| {
        let trimmed = value.trim();
        let content = allowed
            .contains(&trimmed)
            .then(|| AttrValue::Token(trimmed.to_string()));
        XmlAttr::new(qname.clone(), value, content)
    }
}

fn resolve(owner: &Element, value: &str) -> Option<QName> {
    let value = value.trim();
    if !crate::names::is_valid_qname(value) {
        return None;
    }
    owner.resolve_qname(value).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::Document;

    fn owner() -> Element {
        Document::from_string(r#"<op xmlns:tns="urn:x"/>"#)
            .unwrap()
            .root
    }

    #[test]
    fn test_boolean_soft_failure() {
        let name = QName::namespaced("urn:ext", "safe");
        let good = boolean_attr(&owner(), &name, "true");
        assert!(good.is_valid());
        assert_eq!(good.content().and_then(AttrValue::as_bool), Some(true));

        let bad = boolean_attr(&owner(), &name, "not-a-boolean");
        assert!(!bad.is_valid());
        assert!(bad.content().is_none());
        assert_eq!(bad.to_external_form(), "not-a-boolean");
    }

    #[test]
    fn test_qname_resolution() {
        let name = QName::namespaced("urn:ext", "code");
        let attr = qname_or_any_attr(&owner(), &name, "tns:Sender");
        assert_eq!(
            attr.content().and_then(AttrValue::as_qname),
            Some(&QName::namespaced("urn:x", "Sender"))
        );
        assert!(qname_or_any_attr(&owner(), &name, "#any").content().unwrap().is_any());
        assert!(!qname_attr(&owner(), &name, "nope:Sender").is_valid());
    }

    #[test]
    fn test_lists_and_ints() {
        let name = QName::namespaced("urn:ext", "subcodes");
        let list = qname_list_or_any_attr(&owner(), &name, "tns:a  tns:b");
        assert_eq!(list.content().and_then(AttrValue::as_qname_list).map(|l| l.len()), Some(2));
        assert!(!qname_list_or_any_attr(&owner(), &name, "tns:a bad:b").is_valid());

        assert_eq!(int_or_any_attr(&owner(), &name, "404").content().and_then(AttrValue::as_int), Some(404));
        assert!(!int_or_any_attr(&owner(), &name, "four").is_valid());
    }

    #[test]
    fn test_tokens_and_unknown() {
        let name = QName::namespaced("urn:ext", "scheme");
        let factory = token_attr(&["basic", "digest"]);
        assert!(factory.create(&owner(), &name, "basic").is_valid());
        assert!(!factory.create(&owner(), &name, "oauth").is_valid());

        let unknown = XmlAttr::unknown(name, "anything at all");
        assert!(!unknown.is_known());
        assert_eq!(unknown.to_external_form(), "anything at all");
    }
}
