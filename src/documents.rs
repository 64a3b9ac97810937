//! XML element abstraction
//!
//! The reader works on an owned, namespace-resolved element tree. Each
//! element remembers its in-scope prefix bindings (needed to resolve
//! `xs:QName` attribute values), its source position and an XPath-like
//! path used as the location of reported errors.

use crate::error::Result;
use crate::limits::Limits;
use crate::namespaces::{NamespaceContext, QName};
use std::fmt;

/// Line/column of an element start tag (1-based)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextPosition {
    /// Line number
    pub line: u32,
    /// Column number
    pub column: u32,
}

impl fmt::Display for TextPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// An attribute of an element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Attribute qualified name
    pub qname: QName,
    /// Raw attribute value
    pub value: String,
}

/// XML Element in the document tree
#[derive(Debug, Clone)]
pub struct Element {
    /// Element qualified name
    pub qname: QName,
    /// Element attributes, in document order
    pub attributes: Vec<Attribute>,
    /// Text content (if any)
    pub text: Option<String>,
    /// Child elements
    pub children: Vec<Element>,
    /// Namespace bindings in scope at this element
    pub namespaces: NamespaceContext,
    /// Position of the start tag
    pub position: TextPosition,
    /// XPath-like location, e.g. `/wsdl:description[1]/wsdl:interface[2]`
    pub path: String,
}

impl Element {
    /// Create a new detached element
    pub fn new(qname: QName) -> Self {
        let path = format!("/{}[1]", qname.local_name);
        Self {
            qname,
            attributes: Vec::new(),
            text: None,
            children: Vec::new(),
            namespaces: NamespaceContext::new(),
            position: TextPosition::default(),
            path,
        }
    }

    /// Get the local name of the element
    pub fn local_name(&self) -> &str {
        &self.qname.local_name
    }

    /// Get the namespace of the element
    pub fn namespace(&self) -> Option<&str> {
        self.qname.namespace.as_deref()
    }

    /// Check the element's namespace and local name
    pub fn is(&self, namespace: &str, local_name: &str) -> bool {
        self.qname.is(namespace, local_name)
    }

    /// Get an unqualified attribute value by local name
    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.qname.namespace.is_none() && a.qname.local_name == name)
            .map(|a| a.value.as_str())
    }

    /// Get an attribute value by qualified name
    pub fn get_attribute_qname(&self, qname: &QName) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| &a.qname == qname)
            .map(|a| a.value.as_str())
    }

    /// Add an attribute
    pub fn add_attribute(&mut self, qname: QName, value: impl Into<String>) {
        self.attributes.push(Attribute {
            qname,
            value: value.into(),
        });
    }

    /// Add a child element
    pub fn add_child(&mut self, child: Element) {
        self.children.push(child);
    }

    /// Set text content
    pub fn set_text(&mut self, text: String) {
        self.text = Some(text);
    }

    /// Find child elements by namespace and local name
    pub fn find_children<'a>(
        &'a self,
        namespace: &'a str,
        local_name: &'a str,
    ) -> impl Iterator<Item = &'a Element> + 'a {
        self.children
            .iter()
            .filter(move |e| e.is(namespace, local_name))
    }

    /// First child with the given namespace and local name
    pub fn find_child(&self, namespace: &str, local_name: &str) -> Option<&Element> {
        self.children.iter().find(|e| e.is(namespace, local_name))
    }

    /// All descendants, depth first, excluding this element
    pub fn descendants(&self) -> Vec<&Element> {
        let mut out = Vec::new();
        let mut stack: Vec<&Element> = self.children.iter().rev().collect();
        while let Some(e) = stack.pop() {
            out.push(e);
            stack.extend(e.children.iter().rev());
        }
        out
    }

    /// Look up the namespace bound to a prefix at this element
    pub fn lookup_namespace(&self, prefix: &str) -> Option<&str> {
        self.namespaces.get_namespace(prefix)
    }

    /// Resolve a lexical `xs:QName` value against this element's bindings
    pub fn resolve_qname(&self, prefixed: &str) -> Result<QName> {
        self.namespaces.resolve(prefixed)
    }

    /// The location string used in error reports
    pub fn location(&self) -> &str {
        &self.path
    }
}

/// XML Document representation
#[derive(Debug, Clone)]
pub struct Document {
    /// Root element of the document
    pub root: Element,
}

impl Document {
    /// Parse an XML document from a string
    pub fn from_string(xml: &str) -> Result<Self> {
        Self::parse(xml, &Limits::default())
    }

    /// Parse an XML document, enforcing size and depth limits
    pub fn parse(xml: &str, limits: &Limits) -> Result<Self> {
        limits.check_document_size(xml.len())?;

        let doc = roxmltree::Document::parse(xml)?;
        let root = doc.root_element();
        let root = build_element(&doc, root, "", 1, 1, limits)?;

        Ok(Document { root })
    }

    /// Get the root element
    pub fn root(&self) -> &Element {
        &self.root
    }
}

fn build_element(
    doc: &roxmltree::Document<'_>,
    node: roxmltree::Node<'_, '_>,
    parent_path: &str,
    index: usize,
    depth: usize,
    limits: &Limits,
) -> Result<Element> {
    limits.check_element_depth(depth)?;

    let tag = node.tag_name();
    let qname = QName::new(tag.namespace(), tag.name());

    let mut namespaces = NamespaceContext::new();
    for ns in node.namespaces() {
        match ns.name() {
            Some(prefix) => namespaces.add_prefix(prefix, ns.uri()),
            None => namespaces.set_default_namespace(ns.uri()),
        }
    }

    let step = match tag.namespace().and_then(|uri| node.lookup_prefix(uri)) {
        Some(prefix) if !prefix.is_empty() => format!("{}:{}", prefix, tag.name()),
        _ => tag.name().to_string(),
    };
    let path = format!("{}/{}[{}]", parent_path, step, index);

    let pos = doc.text_pos_at(node.range().start);

    let mut element = Element {
        qname,
        attributes: Vec::new(),
        text: None,
        children: Vec::new(),
        namespaces,
        position: TextPosition {
            line: pos.row,
            column: pos.col,
        },
        path: String::new(),
    };

    for attr in node.attributes() {
        element.add_attribute(QName::new(attr.namespace(), attr.name()), attr.value());
    }

    let text: String = node
        .children()
        .filter(|c| c.is_text())
        .filter_map(|c| c.text())
        .collect();
    if !text.trim().is_empty() {
        element.set_text(text.trim().to_string());
    }

    // Positional index among siblings sharing the same expanded name.
    let mut seen: Vec<(QName, usize)> = Vec::new();
    for child in node.children().filter(|c| c.is_element()) {
        let child_tag = child.tag_name();
        let child_qname = QName::new(child_tag.namespace(), child_tag.name());
        let position = match seen.iter_mut().find(|(q, _)| *q == child_qname) {
            Some((_, n)) => {
                *n += 1;
                *n
            }
            None => {
                seen.push((child_qname, 1));
                1
            }
        };
        element.add_child(build_element(doc, child, &path, position, depth + 1, limits)?);
    }

    element.path = path;
    Ok(element)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespaces::WSDL_NAMESPACE;

    #[test]
    fn test_parse_simple_xml() {
        let xml = r#"<root><child>text</child></root>"#;
        let doc = Document::from_string(xml).unwrap();

        let root = doc.root();
        assert_eq!(root.local_name(), "root");
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[0].local_name(), "child");
        assert_eq!(root.children[0].text.as_deref(), Some("text"));
    }

    #[test]
    fn test_parse_with_attributes() {
        let xml = r#"<root attr1="value1" xmlns:x="urn:x" x:attr2="value2"><child/></root>"#;
        let doc = Document::from_string(xml).unwrap();

        let root = doc.root();
        assert_eq!(root.get_attribute("attr1"), Some("value1"));
        assert_eq!(root.get_attribute("attr2"), None);
        assert_eq!(
            root.get_attribute_qname(&QName::namespaced("urn:x", "attr2")),
            Some("value2")
        );
        assert_eq!(root.attributes.len(), 2);
    }

    #[test]
    fn test_namespaces_in_scope() {
        let xml = r#"<description xmlns="http://www.w3.org/ns/wsdl" xmlns:tns="urn:x">
            <interface name="I" extends="tns:Base"/>
        </description>"#;
        let doc = Document::from_string(xml).unwrap();

        let iface = doc.root().find_child(WSDL_NAMESPACE, "interface").unwrap();
        assert_eq!(iface.lookup_namespace("tns"), Some("urn:x"));
        assert_eq!(
            iface.resolve_qname("tns:Base").unwrap(),
            QName::namespaced("urn:x", "Base")
        );
        assert_eq!(doc.root().find_children(WSDL_NAMESPACE, "interface").count(), 1);
        assert_eq!(doc.root().find_children(WSDL_NAMESPACE, "binding").count(), 0);
    }

    #[test]
    fn test_paths_and_positions() {
        let xml = "<w:description xmlns:w=\"http://www.w3.org/ns/wsdl\">\n  <w:interface/>\n  <w:interface/>\n</w:description>";
        let doc = Document::from_string(xml).unwrap();

        let second = &doc.root().children[1];
        assert_eq!(second.path, "/w:description[1]/w:interface[2]");
        assert_eq!(second.position.line, 3);
    }

    #[test]
    fn test_depth_limit() {
        let mut xml = String::new();
        for _ in 0..10 {
            xml.push_str("<a>");
        }
        for _ in 0..10 {
            xml.push_str("</a>");
        }
        let limits = Limits {
            max_element_depth: 5,
            ..Limits::default()
        };
        assert!(Document::parse(&xml, &limits).is_err());
    }

    #[test]
    fn test_malformed_xml() {
        assert!(Document::from_string("<root><unclosed></root>").is_err());
    }
}
