//! HTTP binding extensions (`whttp`)

use std::any::Any;

use super::attrs::{boolean_attr, int_or_any_attr, string_attr, token_attr, AttrValue};
use super::elements::{push_property, required_attribute, ComponentExtensions, ExtensionElement};
use super::{ExtensionData, ExtensionRegistry};
use crate::documents::Element;
use crate::error::{Error, Result, WsdlError};
use crate::model::ComponentKind;
use crate::namespaces::{QName, HTTP_NAMESPACE};

/// Default `{http query parameter separator default}`
pub const DEFAULT_QUERY_PARAMETER_SEPARATOR: &str = "&";

/// Accepted `whttp:authenticationScheme` tokens
pub const AUTHENTICATION_SCHEMES: &[&str] = &["basic", "digest"];

/// A `whttp:header` element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpHeader {
    qname: QName,
    /// `name` of the HTTP header field
    pub name: String,
    /// `type`, a simple type definition
    pub type_name: QName,
    /// `required`
    pub required: Option<bool>,
}

impl ExtensionElement for HttpHeader {
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

/// Deserialize `whttp:header`; `name` and `type` are required
pub fn deserialize_header(
    _kind: ComponentKind,
    element: &Element,
    _registry: &ExtensionRegistry,
) -> Result<Box<dyn ExtensionElement>> {
    let missing = |attr: &str| {
        Error::Wsdl(WsdlError::invalid(format!(
            "whttp:header requires a {} attribute",
            attr
        )))
    };
    let name = element.get_attribute("name").ok_or_else(|| missing("name"))?;
    let type_name = element.get_attribute("type").ok_or_else(|| missing("type"))?;
    let type_name = element.resolve_qname(type_name)?;
    let required = element
        .get_attribute("required")
        .and_then(|v| match v.trim() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        })
        .or_else(|| required_attribute(element));

    Ok(Box::new(HttpHeader {
        qname: element.qname.clone(),
        name: name.trim().to_string(),
        type_name,
        required,
    }))
}

/// `{http error status code}` of a binding fault
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpErrorCode {
    /// `#any`, also used when the attribute is absent
    Any,
    /// An explicit status code
    Code(i64),
}

impl std::fmt::Display for HttpErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HttpErrorCode::Any => f.write_str("#any"),
            HttpErrorCode::Code(c) => write!(f, "{}", c),
        }
    }
}

/// HTTP properties of a binding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpBindingExtensions {
    /// `{http method default}`
    pub method_default: Option<String>,
    /// `{http query parameter separator default}`
    pub query_parameter_separator_default: String,
    /// `{http cookies}`
    pub cookies: bool,
    /// `{http content encoding default}`
    pub content_encoding_default: Option<String>,
}

/// HTTP properties of a binding operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpBindingOperationExtensions {
    /// `{http location}`
    pub location: Option<String>,
    /// `{http method}`
    pub method: Option<String>,
    /// `{http input serialization}`
    pub input_serialization: Option<String>,
    /// `{http output serialization}`
    pub output_serialization: Option<String>,
    /// `{http fault serialization}`
    pub fault_serialization: Option<String>,
    /// `{http query parameter separator}`
    pub query_parameter_separator: Option<String>,
    /// `{http content encoding default}`
    pub content_encoding_default: Option<String>,
    /// `{http location ignore uncited}`
    pub ignore_uncited: bool,
}

/// HTTP properties of a binding fault
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpBindingFaultExtensions {
    /// `{http error status code}`
    pub code: HttpErrorCode,
    /// `{http content encoding}`
    pub content_encoding: Option<String>,
    /// `{http headers}`
    pub headers: Vec<HttpHeader>,
}

/// HTTP properties of a binding message reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpBindingMessageReferenceExtensions {
    /// `{http content encoding}`
    pub content_encoding: Option<String>,
    /// `{http headers}`
    pub headers: Vec<HttpHeader>,
}

/// HTTP properties of an endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpEndpointExtensions {
    /// `{http authentication scheme}`
    pub authentication_scheme: Option<String>,
    /// `{http authentication realm}`
    pub authentication_realm: Option<String>,
}

macro_rules! http_context {
    ($ty:ty, |$s:ident, $out:ident| $body:block) => {
        impl ComponentExtensions for $ty {
            fn namespace(&self) -> &str {
                HTTP_NAMESPACE
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

http_context!(HttpBindingExtensions, |s, out| {
    push_property(&mut out, "http method default", s.method_default.as_ref());
    push_property(
        &mut out,
        "http query parameter separator default",
        Some(&s.query_parameter_separator_default),
    );
    push_property(&mut out, "http cookies", Some(s.cookies));
    push_property(&mut out, "http content encoding default", s.content_encoding_default.as_ref());
});

http_context!(HttpBindingOperationExtensions, |s, out| {
    push_property(&mut out, "http location", s.location.as_ref());
    push_property(&mut out, "http method", s.method.as_ref());
    push_property(&mut out, "http input serialization", s.input_serialization.as_ref());
    push_property(&mut out, "http output serialization", s.output_serialization.as_ref());
    push_property(&mut out, "http fault serialization", s.fault_serialization.as_ref());
    push_property(&mut out, "http query parameter separator", s.query_parameter_separator.as_ref());
    push_property(&mut out, "http content encoding default", s.content_encoding_default.as_ref());
    push_property(&mut out, "http location ignore uncited", Some(s.ignore_uncited));
});

http_context!(HttpBindingFaultExtensions, |s, out| {
    push_property(&mut out, "http error status code", Some(s.code));
    push_property(&mut out, "http content encoding", s.content_encoding.as_ref());
    if !s.headers.is_empty() {
        push_property(&mut out, "http headers", Some(s.headers.len()));
    }
});

http_context!(HttpBindingMessageReferenceExtensions, |s, out| {
    push_property(&mut out, "http content encoding", s.content_encoding.as_ref());
    if !s.headers.is_empty() {
        push_property(&mut out, "http headers", Some(s.headers.len()));
    }
});

http_context!(HttpEndpointExtensions, |s, out| {
    push_property(&mut out, "http authentication scheme", s.authentication_scheme.as_ref());
    push_property(&mut out, "http authentication realm", s.authentication_realm.as_ref());
});

fn headers(data: &ExtensionData) -> Vec<HttpHeader> {
    data.elements_of::<HttpHeader>().cloned().collect()
}

fn create_context(kind: ComponentKind, data: &ExtensionData) -> Box<dyn ComponentExtensions> {
    let s = |local: &str| data.str_value(HTTP_NAMESPACE, local);

    match kind {
        ComponentKind::Binding => Box::new(HttpBindingExtensions {
            method_default: s("methodDefault"),
            query_parameter_separator_default: s("queryParameterSeparatorDefault")
                .unwrap_or_else(|| DEFAULT_QUERY_PARAMETER_SEPARATOR.to_string()),
            cookies: data.bool_value(HTTP_NAMESPACE, "cookies").unwrap_or(false),
            content_encoding_default: s("contentEncodingDefault"),
        }),
        ComponentKind::BindingOperation => Box::new(HttpBindingOperationExtensions {
            location: s("location"),
            method: s("method"),
            input_serialization: s("inputSerialization"),
            output_serialization: s("outputSerialization"),
            fault_serialization: s("faultSerialization"),
            query_parameter_separator: s("queryParameterSeparator"),
            content_encoding_default: s("contentEncodingDefault"),
            ignore_uncited: data.bool_value(HTTP_NAMESPACE, "ignoreUncited").unwrap_or(false),
        }),
        ComponentKind::BindingFault => Box::new(HttpBindingFaultExtensions {
            code: match data.value(HTTP_NAMESPACE, "code") {
                Some(AttrValue::Int(c)) => HttpErrorCode::Code(*c),
                _ => HttpErrorCode::Any,
            },
            content_encoding: s("contentEncoding"),
            headers: headers(data),
        }),
        ComponentKind::Endpoint => Box::new(HttpEndpointExtensions {
            authentication_scheme: s("authenticationScheme"),
            authentication_realm: s("authenticationRealm"),
        }),
        _ => Box::new(HttpBindingMessageReferenceExtensions {
            content_encoding: s("contentEncoding"),
            headers: headers(data),
        }),
    }
}

/// Register the HTTP binding extensions
pub fn register(registry: &mut ExtensionRegistry) {
    let attr = |local: &str| QName::namespaced(HTTP_NAMESPACE, local);

    for local in ["methodDefault", "queryParameterSeparatorDefault", "contentEncodingDefault"] {
        registry.register_ext_attribute_type(ComponentKind::Binding, attr(local), string_attr);
    }
    registry.register_ext_attribute_type(ComponentKind::Binding, attr("cookies"), boolean_attr);

    for local in [
        "location",
        "method",
        "inputSerialization",
        "outputSerialization",
        "faultSerialization",
        "queryParameterSeparator",
        "contentEncodingDefault",
    ] {
        registry.register_ext_attribute_type(ComponentKind::BindingOperation, attr(local), string_attr);
    }
    registry.register_ext_attribute_type(ComponentKind::BindingOperation, attr("ignoreUncited"), boolean_attr);

    registry.register_ext_attribute_type(ComponentKind::BindingFault, attr("code"), int_or_any_attr);
    registry.register_ext_attribute_type(ComponentKind::BindingFault, attr("contentEncoding"), string_attr);
    registry.register_ext_attribute_type(
        ComponentKind::BindingMessageReference,
        attr("contentEncoding"),
        string_attr,
    );

    registry.register_ext_attribute_type(
        ComponentKind::Endpoint,
        attr("authenticationScheme"),
        token_attr(AUTHENTICATION_SCHEMES),
    );
    registry.register_ext_attribute_type(ComponentKind::Endpoint, attr("authenticationRealm"), string_attr);

    let header = attr("header");
    for kind in [ComponentKind::BindingFault, ComponentKind::BindingMessageReference] {
        registry.register_deserializer(kind, header.clone(), deserialize_header);
        registry.register_ext_element_type::<HttpHeader>(kind, header.clone());
    }

    for kind in [
        ComponentKind::Binding,
        ComponentKind::BindingOperation,
        ComponentKind::BindingFault,
        ComponentKind::BindingMessageReference,
        ComponentKind::Endpoint,
    ] {
        registry.register_component_extension(kind, HTTP_NAMESPACE, create_context);
    }
}
