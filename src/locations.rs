//! Resource location resolution
//!
//! Import, include and schema locations are URI references that resolve
//! against the URI of the document that contains them.

use crate::error::{Error, Result};
use std::path::Path;
use url::Url;

/// Turn a user supplied location (URL or file path) into an absolute URL
pub fn to_url(location: &str) -> Result<Url> {
    if let Ok(url) = Url::parse(location) {
        // A Windows drive letter parses as a one-letter scheme.
        if url.scheme().len() > 1 {
            return Ok(url);
        }
    }

    let path = Path::new(location);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    Url::from_file_path(&absolute)
        .map_err(|_| Error::Resource(format!("Cannot convert '{}' to a URL", location)))
}

/// Resolve a URI reference against an optional base URI
///
/// Without a base the reference must itself be absolute.
pub fn resolve_reference(base: Option<&Url>, reference: &str) -> Result<Url> {
    let reference = reference.trim();
    match base {
        Some(base) => Ok(base.join(reference)?),
        None => Ok(Url::parse(reference)?),
    }
}

/// Check if a string is an absolute IRI (has a scheme)
pub fn is_absolute_uri(value: &str) -> bool {
    Url::parse(value).is_ok()
}

/// Check if a URL uses a scheme the loader can dereference
pub fn is_dereferenceable_scheme(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https" | "ftp" | "file")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_url_from_url() {
        let url = to_url("http://example.com/service.wsdl").unwrap();
        assert_eq!(url.scheme(), "http");
    }

    #[test]
    fn test_to_url_from_path() {
        let url = to_url("/tmp/service.wsdl").unwrap();
        assert_eq!(url.scheme(), "file");
        assert!(url.path().ends_with("/tmp/service.wsdl"));
    }

    #[test]
    fn test_resolve_relative_reference() {
        let base = Url::parse("file:///wsdl/main/a.wsdl").unwrap();
        let resolved = resolve_reference(Some(&base), "../shared/b.wsdl").unwrap();
        assert_eq!(resolved.as_str(), "file:///wsdl/shared/b.wsdl");
    }

    #[test]
    fn test_resolve_without_base() {
        assert!(resolve_reference(None, "b.wsdl").is_err());
        assert!(resolve_reference(None, "urn:b").is_ok());
    }

    #[test]
    fn test_absolute_uri() {
        assert!(is_absolute_uri("urn:x"));
        assert!(is_absolute_uri("http://example.com/ns"));
        assert!(!is_absolute_uri("relative/ns"));
    }
}
