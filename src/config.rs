//! Reader configuration
//!
//! Features and properties are addressed by string name so that callers
//! can drive them from configuration files. Names that are not known
//! fail with `CONFIGURATION_ERROR`.

use std::collections::BTreeMap;

use crate::error::{Error, Result, WsdlError};
use crate::namespaces::XSD_NAMESPACE;

/// Trace every reader and validator step
pub const FEATURE_VERBOSE: &str = "features/verbose";

/// Run the validation engine after a read
pub const FEATURE_VALIDATION: &str = "features/validation";

/// Keep going after ERROR level reports
pub const FEATURE_CONTINUE_ON_ERROR: &str = "features/continue_on_error";

/// Identifier of the XML parser API behind the element abstraction
pub const PROPERTY_XML_PARSER_API: &str = "property/xml_parser_api";

/// Identifier of the type system used in `<types>`
pub const PROPERTY_TYPE_SYSTEM_API: &str = "property/type_system_api";

/// The only XML parser API supported
pub const XML_PARSER_API_ROXMLTREE: &str = "roxmltree";

/// Setting name for the factory implementation
pub const SETTING_FACTORY: &str = "wsdl2.factory";

/// Setting name for the extension registrar list (comma separated)
pub const SETTING_EXTENSION_REGISTRARS: &str = "wsdl2.extension_registrars";

/// Feature flags and properties of a reader
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderConfig {
    /// Trace every step at debug level
    pub verbose: bool,
    /// Run assertions after reading
    pub validation: bool,
    /// Record ERROR reports instead of failing
    pub continue_on_error: bool,
    xml_parser_api: String,
    type_system_api: String,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            validation: true,
            continue_on_error: false,
            xml_parser_api: XML_PARSER_API_ROXMLTREE.to_string(),
            type_system_api: XSD_NAMESPACE.to_string(),
        }
    }
}

impl ReaderConfig {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a feature by name
    pub fn set_feature(&mut self, name: &str, value: bool) -> Result<()> {
        match name {
            FEATURE_VERBOSE => self.verbose = value,
            FEATURE_VALIDATION => self.validation = value,
            FEATURE_CONTINUE_ON_ERROR => self.continue_on_error = value,
            _ => return Err(unrecognized("feature", name)),
        }
        Ok(())
    }

    /// Get a feature by name
    pub fn feature(&self, name: &str) -> Result<bool> {
        match name {
            FEATURE_VERBOSE => Ok(self.verbose),
            FEATURE_VALIDATION => Ok(self.validation),
            FEATURE_CONTINUE_ON_ERROR => Ok(self.continue_on_error),
            _ => Err(unrecognized("feature", name)),
        }
    }

    /// Set a property by name
    pub fn set_property(&mut self, name: &str, value: &str) -> Result<()> {
        match name {
            PROPERTY_XML_PARSER_API => {
                if value != XML_PARSER_API_ROXMLTREE {
                    return Err(unsupported(name, value));
                }
                self.xml_parser_api = value.to_string();
            }
            PROPERTY_TYPE_SYSTEM_API => {
                if value != XSD_NAMESPACE {
                    return Err(unsupported(name, value));
                }
                self.type_system_api = value.to_string();
            }
            _ => return Err(unrecognized("property", name)),
        }
        Ok(())
    }

    /// Get a property by name
    pub fn property(&self, name: &str) -> Result<&str> {
        match name {
            PROPERTY_XML_PARSER_API => Ok(&self.xml_parser_api),
            PROPERTY_TYPE_SYSTEM_API => Ok(&self.type_system_api),
            _ => Err(unrecognized("property", name)),
        }
    }

    /// Apply every `features/...` and `property/...` entry of a properties set
    pub fn apply(&mut self, properties: &Properties) -> Result<()> {
        for (key, value) in properties.iter() {
            if key.starts_with("features/") {
                let flag = parse_bool(value).ok_or_else(|| {
                    Error::Wsdl(WsdlError::configuration(format!(
                        "Feature '{}' expects true or false, got '{}'",
                        key, value
                    )))
                })?;
                self.set_feature(key, flag)?;
            } else if key.starts_with("property/") {
                self.set_property(key, value)?;
            }
        }
        Ok(())
    }
}

fn unrecognized(kind: &str, name: &str) -> Error {
    Error::Wsdl(WsdlError::configuration(format!(
        "The {} name '{}' is not recognized",
        kind, name
    )))
}

fn unsupported(name: &str, value: &str) -> Error {
    Error::Wsdl(WsdlError::configuration(format!(
        "The value '{}' of property '{}' is not supported",
        value, name
    )))
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

/// A `key=value` per line properties set
///
/// Lines starting with `#` or `!` are comments. The key ends at the
/// first `=` not escaped with a backslash; backslash escapes are removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    entries: BTreeMap<String, String>,
}

impl Properties {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse properties text; malformed lines without `=` are skipped
    pub fn parse(content: &str) -> Self {
        let mut props = Self::new();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }

            let mut key = String::new();
            let mut chars = line.chars();
            let mut found = false;
            while let Some(c) = chars.next() {
                match c {
                    '\\' => {
                        if let Some(escaped) = chars.next() {
                            key.push(escaped);
                        }
                    }
                    '=' => {
                        found = true;
                        break;
                    }
                    _ => key.push(c),
                }
            }
            if !found {
                continue;
            }
            let value: String = chars.collect();
            props.set(key.trim(), value.trim());
        }
        props
    }

    /// Set a value
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Get a value
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|s| s.as_str())
    }

    /// Iterate over entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if there are no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resolve a setting through the fallback chain
///
/// The environment lookup wins, then the packaged properties, then the
/// default. Empty values count as absent.
pub fn resolve_setting<E>(
    name: &str,
    env: E,
    packaged: Option<&Properties>,
    default: &str,
) -> String
where
    E: Fn(&str) -> Option<String>,
{
    env(name)
        .filter(|v| !v.trim().is_empty())
        .or_else(|| {
            packaged
                .and_then(|p| p.get(name))
                .filter(|v| !v.trim().is_empty())
                .map(str::to_string)
        })
        .unwrap_or_else(|| default.to_string())
}

/// Split a comma separated list setting
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
