//! SOAP binding extensions (`wsoap`)

use std::any::Any;

use super::attrs::{qname_list_or_any_attr, qname_or_any_attr, string_attr, uri_attr, AttrValue};
use super::elements::{push_property, required_attribute, ComponentExtensions, ExtensionElement};
use super::{ExtensionData, ExtensionRegistry};
use crate::documents::Element;
use crate::error::{Error, Result, WsdlError};
use crate::model::ComponentKind;
use crate::namespaces::{QName, SOAP_NAMESPACE};

/// Default `{soap version}`
pub const DEFAULT_SOAP_VERSION: &str = "1.2";

/// SOAP 1.2 HTTP underlying protocol
pub const SOAP_HTTP_PROTOCOL: &str = "http://www.w3.org/2003/05/soap/bindings/HTTP/";

/// A `wsoap:module` element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoapModule {
    qname: QName,
    /// `ref`, the module URI
    pub reference: Option<String>,
    /// `required`, default false
    pub required: Option<bool>,
}

impl ExtensionElement for SoapModule {
    fn element_type(&self) -> &QName {
        &self.qname
    }

    fn required(&self) -> Option<bool> {
        self.required
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A `wsoap:header` element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoapHeaderBlock {
    qname: QName,
    /// The global element declaration of the header
    pub element: QName,
    /// `mustUnderstand`, default false
    pub must_understand: bool,
    /// `required`
    pub required: Option<bool>,
}

impl ExtensionElement for SoapHeaderBlock {
    fn element_type(&self) -> &QName {
        &self.qname
    }

    fn required(&self) -> Option<bool> {
        self.required
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn local_bool(element: &Element, name: &str) -> Option<bool> {
    element.get_attribute(name).and_then(|v| match v.trim() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    })
}

/// Deserialize `wsoap:module`
pub fn deserialize_module(
    _kind: ComponentKind,
    element: &Element,
    _registry: &ExtensionRegistry,
) -> Result<Box<dyn ExtensionElement>> {
    Ok(Box::new(SoapModule {
        qname: element.qname.clone(),
        reference: element.get_attribute("ref").map(|r| r.trim().to_string()),
        required: local_bool(element, "required").or_else(|| required_attribute(element)),
    }))
}

/// Deserialize `wsoap:header`; the `element` attribute is required
pub fn deserialize_header(
    _kind: ComponentKind,
    element: &Element,
    _registry: &ExtensionRegistry,
) -> Result<Box<dyn ExtensionElement>> {
    let value = element.get_attribute("element").ok_or_else(|| {
        Error::Wsdl(WsdlError::invalid("wsoap:header requires an element attribute"))
    })?;
    let header = element.resolve_qname(value)?;
    Ok(Box::new(SoapHeaderBlock {
        qname: element.qname.clone(),
        element: header,
        must_understand: local_bool(element, "mustUnderstand").unwrap_or(false),
        required: local_bool(element, "required").or_else(|| required_attribute(element)),
    }))
}

/// `{soap fault code}` and `{soap fault subcodes}` values
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SoapFaultCodes {
    /// `#any`
    Any,
    /// Explicit QNames
    Codes(Vec<QName>),
}

impl std::fmt::Display for SoapFaultCodes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SoapFaultCodes::Any => f.write_str("#any"),
            SoapFaultCodes::Codes(codes) => {
                let names: Vec<String> = codes.iter().map(|q| q.to_string()).collect();
                f.write_str(&names.join(" "))
            }
        }
    }
}

fn fault_codes(value: Option<&AttrValue>) -> SoapFaultCodes {
    match value {
        Some(AttrValue::QName(q)) => SoapFaultCodes::Codes(vec![q.clone()]),
        Some(AttrValue::QNameList(list)) => SoapFaultCodes::Codes(list.clone()),
        _ => SoapFaultCodes::Any,
    }
}

fn modules(data: &ExtensionData) -> Vec<SoapModule> {
    data.elements_of::<SoapModule>().cloned().collect()
}

fn headers(data: &ExtensionData) -> Vec<SoapHeaderBlock> {
    data.elements_of::<SoapHeaderBlock>().cloned().collect()
}

fn module_refs(modules: &[SoapModule]) -> Option<String> {
    if modules.is_empty() {
        return None;
    }
    let refs: Vec<&str> = modules
        .iter()
        .filter_map(|m| m.reference.as_deref())
        .collect();
    Some(refs.join(" "))
}

/// SOAP properties of a binding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoapBindingExtensions {
    /// `{soap version}`
    pub version: String,
    /// `{soap underlying protocol}`
    pub protocol: Option<String>,
    /// `{soap mep default}`
    pub mep_default: Option<String>,
    /// `{soap modules}`
    pub modules: Vec<SoapModule>,
}

/// SOAP properties of a binding operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoapBindingOperationExtensions {
    /// `{soap mep}`
    pub mep: Option<String>,
    /// `{soap action}`
    pub action: Option<String>,
    /// `{soap modules}`
    pub modules: Vec<SoapModule>,
}

/// SOAP properties of a binding fault
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoapBindingFaultExtensions {
    /// `{soap fault code}`
    pub code: SoapFaultCodes,
    /// `{soap fault subcodes}`
    pub subcodes: SoapFaultCodes,
    /// `{soap modules}`
    pub modules: Vec<SoapModule>,
    /// `{soap header blocks}`
    pub headers: Vec<SoapHeaderBlock>,
}

/// SOAP properties of a binding message or fault reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoapReferenceExtensions {
    /// `{soap modules}`
    pub modules: Vec<SoapModule>,
    /// `{soap header blocks}`; always empty on fault references
    pub headers: Vec<SoapHeaderBlock>,
}

macro_rules! soap_context {
    ($ty:ty, |$s:ident, $out:ident| $body:block) => {
        impl ComponentExtensions for $ty {
            fn namespace(&self) -> &str {
                SOAP_NAMESPACE
            }

            fn as_any(&self) -> &dyn Any {
                self
            }

            fn properties(&self) -> Vec<(String, String)> {
                let $s = self;
                let mut $out = Vec::new();
                $body
                $out
            }
        }
    };
}

soap_context!(SoapBindingExtensions, |s, out| {
    push_property(&mut out, "soap version", Some(&s.version));
    push_property(&mut out, "soap underlying protocol", s.protocol.as_ref());
    push_property(&mut out, "soap mep default", s.mep_default.as_ref());
    push_property(&mut out, "soap modules", module_refs(&s.modules));
});

soap_context!(SoapBindingOperationExtensions, |s, out| {
    push_property(&mut out, "soap mep", s.mep.as_ref());
    push_property(&mut out, "soap action", s.action.as_ref());
    push_property(&mut out, "soap modules", module_refs(&s.modules));
});

soap_context!(SoapBindingFaultExtensions, |s, out| {
    push_property(&mut out, "soap fault code", Some(&s.code));
    push_property(&mut out, "soap fault subcodes", Some(&s.subcodes));
    push_property(&mut out, "soap modules", module_refs(&s.modules));
});

soap_context!(SoapReferenceExtensions, |s, out| {
    push_property(&mut out, "soap modules", module_refs(&s.modules));
    if !s.headers.is_empty() {
        push_property(&mut out, "soap header blocks", Some(s.headers.len()));
    }
});

fn create_context(kind: ComponentKind, data: &ExtensionData) -> Box<dyn ComponentExtensions> {
    match kind {
        ComponentKind::Binding => Box::new(SoapBindingExtensions {
            version: data
                .str_value(SOAP_NAMESPACE, "version")
                .unwrap_or_else(|| DEFAULT_SOAP_VERSION.to_string()),
            protocol: data.str_value(SOAP_NAMESPACE, "protocol"),
            mep_default: data.str_value(SOAP_NAMESPACE, "mepDefault"),
            modules: modules(data),
        }),
        ComponentKind::BindingOperation => Box::new(SoapBindingOperationExtensions {
            mep: data.str_value(SOAP_NAMESPACE, "mep"),
            action: data.str_value(SOAP_NAMESPACE, "action"),
            modules: modules(data),
        }),
        ComponentKind::BindingFault => Box::new(SoapBindingFaultExtensions {
            code: fault_codes(data.value(SOAP_NAMESPACE, "code")),
            subcodes: fault_codes(data.value(SOAP_NAMESPACE, "subcodes")),
            modules: modules(data),
            headers: headers(data),
        }),
        _ => Box::new(SoapReferenceExtensions {
            modules: modules(data),
            headers: headers(data),
        }),
    }
}

/// Register the SOAP binding extensions
pub fn register(registry: &mut ExtensionRegistry) {
    let attr = |local: &str| QName::namespaced(SOAP_NAMESPACE, local);

    registry.register_ext_attribute_type(ComponentKind::Binding, attr("version"), string_attr);
    registry.register_ext_attribute_type(ComponentKind::Binding, attr("protocol"), uri_attr);
    registry.register_ext_attribute_type(ComponentKind::Binding, attr("mepDefault"), uri_attr);
    registry.register_ext_attribute_type(ComponentKind::BindingOperation, attr("mep"), uri_attr);
    registry.register_ext_attribute_type(ComponentKind::BindingOperation, attr("action"), uri_attr);
    registry.register_ext_attribute_type(ComponentKind::BindingFault, attr("code"), qname_or_any_attr);
    registry.register_ext_attribute_type(ComponentKind::BindingFault, attr("subcodes"), qname_list_or_any_attr);

    let module = attr("module");
    let header = attr("header");
    for kind in [
        ComponentKind::Binding,
        ComponentKind::BindingOperation,
        ComponentKind::BindingFault,
        ComponentKind::BindingMessageReference,
        ComponentKind::BindingFaultReference,
    ] {
        registry.register_deserializer(kind, module.clone(), deserialize_module);
        registry.register_ext_element_type::<SoapModule>(kind, module.clone());
        registry.register_component_extension(kind, SOAP_NAMESPACE, create_context);
    }
    for kind in [ComponentKind::BindingFault, ComponentKind::BindingMessageReference] {
        registry.register_deserializer(kind, header.clone(), deserialize_header);
        registry.register_ext_element_type::<SoapHeaderBlock>(kind, header.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::Document;

    #[test]
    fn test_module_and_header() {
        let registry = ExtensionRegistry::with_builtins();
        let doc = Document::from_string(
            r#"<wsoap:header xmlns:wsoap="http://www.w3.org/ns/wsdl/soap" xmlns:t="urn:t"
                 element="t:Auth" mustUnderstand="true"/>"#,
        )
        .unwrap();
        let header = deserialize_header(ComponentKind::BindingMessageReference, doc.root(), &registry)
            .unwrap();
        let header = header.as_any().downcast_ref::<SoapHeaderBlock>().unwrap();
        assert_eq!(header.element, QName::namespaced("urn:t", "Auth"));
        assert!(header.must_understand);

        let doc = Document::from_string(
            r#"<wsoap:header xmlns:wsoap="http://www.w3.org/ns/wsdl/soap"/>"#,
        )
        .unwrap();
        assert!(deserialize_header(ComponentKind::BindingFault, doc.root(), &registry).is_err());
    }

    #[test]
    fn test_binding_context_defaults() {
        let data = ExtensionData::default();
        let ctx = create_context(ComponentKind::Binding, &data);
        let binding = ctx.as_any().downcast_ref::<SoapBindingExtensions>().unwrap();
        assert_eq!(binding.version, DEFAULT_SOAP_VERSION);
        assert!(binding.modules.is_empty());

        let fault = create_context(ComponentKind::BindingFault, &data);
        let fault = fault.as_any().downcast_ref::<SoapBindingFaultExtensions>().unwrap();
        assert_eq!(fault.code, SoapFaultCodes::Any);
    }
}
