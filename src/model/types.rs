//! Schemas from `<types>`
//!
//! Only the parts of a schema the WSDL layer needs are modeled: the
//! global element declarations and type definitions that message
//! references may point at. Full XML Schema semantics are out of scope.

use std::sync::Arc;

use crate::documents::Element;
use crate::namespaces::{QName, XSD_NAMESPACE};
use crate::reporter::ErrorLocator;

/// Built-in XML Schema datatypes, which always resolve
pub const BUILTIN_TYPES: &[&str] = &[
    "anyType",
    "anySimpleType",
    "string",
    "normalizedString",
    "token",
    "language",
    "Name",
    "NCName",
    "ID",
    "IDREF",
    "IDREFS",
    "ENTITY",
    "ENTITIES",
    "NMTOKEN",
    "NMTOKENS",
    "boolean",
    "decimal",
    "integer",
    "nonPositiveInteger",
    "negativeInteger",
    "long",
    "int",
    "short",
    "byte",
    "nonNegativeInteger",
    "unsignedLong",
    "unsignedInt",
    "unsignedShort",
    "unsignedByte",
    "positiveInteger",
    "float",
    "double",
    "duration",
    "dateTime",
    "time",
    "date",
    "gYearMonth",
    "gYear",
    "gMonthDay",
    "gDay",
    "gMonth",
    "hexBinary",
    "base64Binary",
    "anyURI",
    "QName",
    "NOTATION",
];

/// Check if a name is a built-in XML Schema type
pub fn is_builtin_type(name: &QName) -> bool {
    name.namespace.as_deref() == Some(XSD_NAMESPACE)
        && BUILTIN_TYPES.contains(&name.local_name.as_str())
}

/// A global element declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementDeclaration {
    /// Qualified name
    pub name: QName,
    /// The `type` attribute, when given
    pub type_name: Option<QName>,
}

/// Whether a type definition is simple or complex
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeDefinitionKind {
    /// `xs:simpleType` or a built-in datatype
    Simple,
    /// `xs:complexType`
    Complex,
}

/// A global type definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDefinition {
    /// Qualified name
    pub name: QName,
    /// Simple or complex
    pub kind: TypeDefinitionKind,
}

impl TypeDefinition {
    /// The definition of a built-in datatype
    pub fn builtin(name: &QName) -> Option<Self> {
        if !is_builtin_type(name) {
            return None;
        }
        let kind = if name.local_name == "anyType" {
            TypeDefinitionKind::Complex
        } else {
            TypeDefinitionKind::Simple
        };
        Some(Self {
            name: name.clone(),
            kind,
        })
    }
}

/// How a schema entered the description
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaKind {
    /// An `xs:schema` written inline
    Inlined {
        /// Found inside an extension element rather than directly under `<types>`
        nested: bool,
    },
    /// An `xs:import` under `<types>`
    Imported {
        /// The `namespace` attribute of the import
        import_namespace: Option<String>,
        /// The `schemaLocation` attribute, resolved
        schema_location: Option<String>,
        /// Whether the schema document could be loaded
        loaded: bool,
    },
}

/// A schema available to the description
#[derive(Debug, Clone)]
pub struct Schema {
    /// Inlined or imported
    pub kind: SchemaKind,
    /// The schema's own `targetNamespace`
    pub namespace: Option<String>,
    /// Global element declarations
    pub element_declarations: Vec<ElementDeclaration>,
    /// Global type definitions
    pub type_definitions: Vec<TypeDefinition>,
    /// Whether QName lookups may resolve through this schema
    pub referenceable: bool,
    /// The `xs:schema` or `xs:import` element in the WSDL document
    pub element: Option<Arc<Element>>,
    /// The schema definition, i.e. the root of an imported schema document
    pub definition: Option<Arc<Element>>,
    /// Where the schema was declared
    pub location: ErrorLocator,
}

impl Schema {
    /// Build an inlined schema from its `xs:schema` element
    pub fn inlined(element: &Element, nested: bool, location: ErrorLocator) -> Self {
        let element = Arc::new(element.clone());
        let mut schema = Self {
            kind: SchemaKind::Inlined { nested },
            namespace: element.get_attribute("targetNamespace").map(str::to_string),
            element_declarations: Vec::new(),
            type_definitions: Vec::new(),
            referenceable: true,
            element: Some(element.clone()),
            definition: Some(element.clone()),
            location,
        };
        schema.collect_declarations(&element);
        schema
    }

    /// Build an imported schema; `definition` is the loaded schema root
    pub fn imported(
        element: &Element,
        schema_location: Option<String>,
        definition: Option<Element>,
        location: ErrorLocator,
    ) -> Self {
        let import_namespace = element.get_attribute("namespace").map(str::to_string);
        let definition = definition.map(Arc::new);
        let namespace = match &definition {
            Some(def) => def.get_attribute("targetNamespace").map(str::to_string),
            None => import_namespace.clone(),
        };
        let mut schema = Self {
            kind: SchemaKind::Imported {
                import_namespace,
                schema_location,
                loaded: definition.is_some(),
            },
            namespace,
            element_declarations: Vec::new(),
            type_definitions: Vec::new(),
            referenceable: true,
            element: Some(Arc::new(element.clone())),
            definition: definition.clone(),
            location,
        };
        if let Some(def) = definition {
            schema.collect_declarations(&def);
        }
        schema
    }

    /// Check if the schema was written inside an extension element
    pub fn is_nested(&self) -> bool {
        matches!(self.kind, SchemaKind::Inlined { nested: true })
    }

    /// Find a global element declaration
    pub fn element_declaration(&self, name: &QName) -> Option<&ElementDeclaration> {
        self.element_declarations.iter().find(|d| &d.name == name)
    }

    /// Find a global type definition
    pub fn type_definition(&self, name: &QName) -> Option<&TypeDefinition> {
        self.type_definitions.iter().find(|d| &d.name == name)
    }

    fn collect_declarations(&mut self, schema: &Element) {
        let tns = schema.get_attribute("targetNamespace");
        for child in &schema.children {
            if child.namespace() != Some(XSD_NAMESPACE) {
                continue;
            }
            let Some(name) = child.get_attribute("name") else {
                continue;
            };
            let qname = QName::new(tns, name);
            match child.local_name() {
                "element" => {
                    let type_name = child
                        .get_attribute("type")
                        .and_then(|t| child.resolve_qname(t).ok());
                    self.element_declarations.push(ElementDeclaration {
                        name: qname,
                        type_name,
                    });
                }
                "simpleType" => self.type_definitions.push(TypeDefinition {
                    name: qname,
                    kind: TypeDefinitionKind::Simple,
                }),
                "complexType" => self.type_definitions.push(TypeDefinition {
                    name: qname,
                    kind: TypeDefinitionKind::Complex,
                }),
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::Document;

    const SCHEMA: &str = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
        xmlns:tns="urn:y" targetNamespace="urn:y">
      <xs:element name="order" type="tns:OrderType"/>
      <xs:complexType name="OrderType"/>
      <xs:simpleType name="Code"><xs:restriction base="xs:string"/></xs:simpleType>
      <xs:element ref="tns:order"/>
    </xs:schema>"#;

    #[test]
    fn test_inlined_collects_globals() {
        let doc = Document::from_string(SCHEMA).unwrap();
        let schema = Schema::inlined(doc.root(), false, ErrorLocator::default());

        assert_eq!(schema.namespace.as_deref(), Some("urn:y"));
        assert_eq!(schema.element_declarations.len(), 1);
        let order = schema
            .element_declaration(&QName::namespaced("urn:y", "order"))
            .unwrap();
        assert_eq!(order.type_name, Some(QName::namespaced("urn:y", "OrderType")));
        assert_eq!(schema.type_definitions.len(), 2);
        assert!(schema.referenceable);
        assert!(!schema.is_nested());
    }

    #[test]
    fn test_imported_without_definition() {
        let doc = Document::from_string(
            r#"<xs:import xmlns:xs="http://www.w3.org/2001/XMLSchema" namespace="urn:z"/>"#,
        )
        .unwrap();
        let schema = Schema::imported(doc.root(), None, None, ErrorLocator::default());
        assert_eq!(schema.namespace.as_deref(), Some("urn:z"));
        assert!(matches!(schema.kind, SchemaKind::Imported { loaded: false, .. }));
        assert!(schema.element_declarations.is_empty());
    }

    #[test]
    fn test_builtins() {
        assert!(is_builtin_type(&QName::namespaced(XSD_NAMESPACE, "string")));
        assert!(!is_builtin_type(&QName::namespaced("urn:y", "string")));
        let any = TypeDefinition::builtin(&QName::namespaced(XSD_NAMESPACE, "anyType")).unwrap();
        assert_eq!(any.kind, TypeDefinitionKind::Complex);
    }
}
