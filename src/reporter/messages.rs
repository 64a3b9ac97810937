//! Message catalogs
//!
//! Error ids map to templates with `{0}`, `{1}`, ... argument slots.
//! Locales fall back from `de_DE` to `de` to the English catalog.

use once_cell::sync::Lazy;
use std::collections::HashMap;

type Catalog = HashMap<&'static str, &'static str>;

static EN: Lazy<Catalog> = Lazy::new(|| {
    HashMap::from([
        // Configuration
        ("WSDL010", "The extension registrar \"{0}\" could not be registered: {1}"),
        ("WSDL011", "The extension registrar \"{0}\" is not known."),
        ("WSDL012", "The factory \"{0}\" is not known."),
        // Reader
        ("WSDL501", "Expected a \"{0}\" element, but found a \"{1}\" element instead."),
        ("WSDL502", "Could not load the document \"{0}\": {1}"),
        ("WSDL503", "The element \"{0}\" has unexpected attributes: {1}."),
        ("WSDL504", "The element \"{0}\" is not allowed in \"{1}\"."),
        ("WSDL505", "Could not resolve the qualified name \"{0}\": {1}"),
        ("WSDL506", "The value \"{0}\" is not valid for attribute \"{1}\" of element \"{2}\"."),
        ("WSDL507", "The element \"{0}\" is missing the required attribute \"{1}\"."),
        ("WSDL509", "The import and include nesting exceeds the maximum depth of {0}."),
        ("WSDL510", "Could not load the schema \"{0}\": {1}"),
        ("WSDL511", "The document \"{0}\" is not well-formed XML: {1}"),
        ("WSDL512", "The extension element \"{0}\" could not be deserialized: {1}"),
        ("WSDL513", "The \"{0}\" element requires a \"{1}\" attribute."),
        // Assertions
        ("Description-1001", "The target namespace \"{0}\" could not be dereferenced: {1}"),
        ("Description-1006", "The target namespace \"{0}\" is not an absolute IRI."),
        ("Import-1069", "The imported namespace \"{0}\" must differ from the target namespace of the importing description."),
        ("Import-1070", "The import namespace \"{0}\" does not match the target namespace \"{1}\" of the imported document \"{2}\"."),
        ("Include-1068", "The included document \"{0}\" has target namespace \"{1}\" but the including description has \"{2}\"."),
        ("Interface-1009", "The interface \"{0}\" appears in its own set of extended interfaces."),
        ("Interface-1010", "The interface name \"{0}\" is used by more than one interface in this description."),
        ("Interface-1011", "The extends list of interface \"{0}\" names \"{1}\" more than once."),
        ("InterfaceOperation-1035", "The operation name \"{0}\" is used more than once in interface \"{1}\"."),
        ("InterfaceFault-1017", "The fault name \"{0}\" is used more than once in interface \"{1}\"."),
        ("MessageLabel-1034", "The message label \"{0}\" is not defined by the pattern \"{1}\" of operation \"{2}\"."),
        ("Binding-1049", "The binding name \"{0}\" is used by more than one binding in this description."),
        ("BindingOperation-1051", "The binding operation \"{0}\" does not refer to an operation of interface \"{1}\"."),
        ("Service-1060", "The service name \"{0}\" is used by more than one service in this description."),
        ("Endpoint-1062", "The endpoint \"{0}\" uses binding \"{1}\" which binds interface \"{2}\", not the service interface \"{3}\"."),
        ("QName-resolution-1064", "The {0} reference \"{1}\" does not resolve to a component in this description."),
        ("Schema-1066", "The element declaration \"{0}\" is only available from a schema that is not referenceable."),
        ("Validation.Infrastructure", "The assertion \"{0}\" failed unexpectedly on {1}: {2}"),
    ])
});

static DE: Lazy<Catalog> = Lazy::new(|| {
    HashMap::from([
        ("WSDL501", "Erwartet wurde ein \"{0}\"-Element, gefunden wurde \"{1}\"."),
        ("WSDL502", "Das Dokument \"{0}\" konnte nicht geladen werden: {1}"),
        ("WSDL503", "Das Element \"{0}\" hat unerwartete Attribute: {1}."),
        ("Interface-1009", "Das Interface \"{0}\" erweitert sich selbst."),
        ("Interface-1010", "Der Interface-Name \"{0}\" wird mehrfach verwendet."),
    ])
});

fn catalog_for(locale: &str) -> Option<&'static Catalog> {
    match locale {
        "en" => Some(&EN),
        "de" => Some(&DE),
        _ => None,
    }
}

/// Look up the template for an id, walking the locale fallback chain
pub fn template(locale: &str, id: &str) -> Option<&'static str> {
    let mut candidates = vec![locale];
    if let Some((language, _)) = locale.split_once(['_', '-']) {
        candidates.push(language);
    }
    candidates.push("en");

    candidates
        .into_iter()
        .filter_map(catalog_for)
        .find_map(|catalog| catalog.get(id).copied())
}

/// Substitute `{n}` slots; slots without an argument are left as they are
pub fn format_template(template: &str, args: &[String]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                let slot = &after[..close];
                match slot.parse::<usize>().ok().and_then(|i| args.get(i)) {
                    Some(arg) => out.push_str(arg),
                    None => {
                        out.push('{');
                        out.push_str(slot);
                        out.push('}');
                    }
                }
                rest = &after[close + 1..];
            }
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_template() {
        let args = vec!["a".to_string(), "b".to_string()];
        assert_eq!(format_template("x {0} y {1} z", &args), "x a y b z");
        assert_eq!(format_template("{1}{0}", &args), "ba");
    }

    #[test]
    fn test_missing_slots_do_not_fail() {
        let args = vec!["a".to_string()];
        assert_eq!(format_template("{0} and {1}", &args), "a and {1}");
        assert_eq!(format_template("open { brace", &args), "open { brace");
        assert_eq!(format_template("{name}", &args), "{name}");
    }

    #[test]
    fn test_locale_fallback() {
        assert!(template("de_DE", "Interface-1009").unwrap().starts_with("Das"));
        assert!(template("de", "Interface-1011").unwrap().starts_with("The"));
        assert!(template("fr", "WSDL501").unwrap().starts_with("Expected"));
        assert!(template("en", "NOPE-1").is_none());
    }
}
