//! URI catalog support for import and schema location resolution
//!
//! A catalog is a `key=value` per line file mapping logical URIs to the
//! physical URIs documents are fetched from. Relative values resolve
//! against the catalog's own location.
//!
//! # Example
//!
//! ```text
//! # shared definitions
//! http\://example.com/shared.wsdl=wsdl/shared.wsdl
//! urn:example:types.xsd=xsd/types.xsd
//! ```
//!
//! A key ending in `/` rewrites every URI that starts with it.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use url::Url;

use crate::config::Properties;
use crate::error::{Error, Result};

/// URI catalog for resolving document locations
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    /// Exact URI mappings (logical -> physical)
    exact: BTreeMap<String, Url>,
    /// Prefix rewrites (logical prefix -> physical prefix)
    prefixes: BTreeMap<String, Url>,
}

impl Catalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a catalog from a file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Resource(format!("Failed to read catalog '{}': {}", path.display(), e))
        })?;

        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()?.join(path)
        };
        let base = Url::from_file_path(&absolute).map_err(|_| {
            Error::Resource(format!("Cannot convert '{}' to a URL", path.display()))
        })?;

        Self::parse(&content, Some(&base))
    }

    /// Parse catalog content, resolving relative targets against `base`
    pub fn parse(content: &str, base: Option<&Url>) -> Result<Self> {
        let properties = Properties::parse(content);
        let mut catalog = Self::new();

        for (key, value) in properties.iter() {
            let target = match base {
                Some(base) => base.join(value)?,
                None => Url::parse(value)?,
            };
            catalog.add(key, target);
        }

        Ok(catalog)
    }

    /// Add a mapping; keys ending in `/` act as prefix rewrites
    pub fn add(&mut self, logical: impl Into<String>, physical: Url) {
        let logical = logical.into();
        if logical.ends_with('/') {
            self.prefixes.insert(logical, physical);
        } else {
            self.exact.insert(logical, physical);
        }
    }

    /// Resolve a URI using the catalog
    ///
    /// Exact mappings win; otherwise the longest matching prefix rewrite
    /// is applied.
    pub fn resolve(&self, uri: &Url) -> Option<Url> {
        if let Some(target) = self.exact.get(uri.as_str()) {
            return Some(target.clone());
        }

        let (prefix, target) = self
            .prefixes
            .iter()
            .filter(|(prefix, _)| uri.as_str().starts_with(prefix.as_str()))
            .max_by_key(|(prefix, _)| prefix.len())?;

        target.join(&uri.as_str()[prefix.len()..]).ok()
    }

    /// Check if this catalog is empty (has no mappings)
    pub fn is_empty(&self) -> bool {
        self.exact.is_empty() && self.prefixes.is_empty()
    }

    /// Get the number of mappings
    pub fn len(&self) -> usize {
        self.exact.len() + self.prefixes.len()
    }

    /// Merge another catalog into this one; existing mappings win
    pub fn merge(&mut self, other: &Catalog) {
        for (k, v) in &other.exact {
            self.exact.entry(k.clone()).or_insert_with(|| v.clone());
        }
        for (k, v) in &other.prefixes {
            self.prefixes.entry(k.clone()).or_insert_with(|| v.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_simple_catalog() {
        let content = r"# comment
http\://example.com/shared.wsdl=wsdl/shared.wsdl
urn:example:types.xsd = xsd/types.xsd
";
        let base = Url::parse("file:///catalogs/catalog.properties").unwrap();
        let catalog = Catalog::parse(content, Some(&base)).unwrap();

        assert_eq!(catalog.len(), 2);

        let resolved = catalog
            .resolve(&Url::parse("http://example.com/shared.wsdl").unwrap())
            .unwrap();
        assert_eq!(resolved.as_str(), "file:///catalogs/wsdl/shared.wsdl");

        let resolved = catalog
            .resolve(&Url::parse("urn:example:types.xsd").unwrap())
            .unwrap();
        assert_eq!(resolved.as_str(), "file:///catalogs/xsd/types.xsd");

        assert!(catalog
            .resolve(&Url::parse("urn:example:missing").unwrap())
            .is_none());
    }

    #[test]
    fn test_prefix_rewrite() {
        let mut catalog = Catalog::new();
        catalog.add(
            "http://example.com/",
            Url::parse("file:///mirror/").unwrap(),
        );
        catalog.add(
            "http://example.com/deep/",
            Url::parse("file:///deep-mirror/").unwrap(),
        );

        let resolved = catalog
            .resolve(&Url::parse("http://example.com/a/b.wsdl").unwrap())
            .unwrap();
        assert_eq!(resolved.as_str(), "file:///mirror/a/b.wsdl");

        let resolved = catalog
            .resolve(&Url::parse("http://example.com/deep/c.wsdl").unwrap())
            .unwrap();
        assert_eq!(resolved.as_str(), "file:///deep-mirror/c.wsdl");
    }

    #[test]
    fn test_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let catalog_path = temp_dir.path().join("catalog.properties");
        std::fs::write(&catalog_path, "urn:a=a.wsdl\n").unwrap();

        let catalog = Catalog::from_file(&catalog_path).unwrap();
        let resolved = catalog.resolve(&Url::parse("urn:a").unwrap()).unwrap();
        assert_eq!(resolved.scheme(), "file");
        assert!(resolved.path().ends_with("/a.wsdl"));
    }

    #[test]
    fn test_merge_keeps_existing() {
        let mut first = Catalog::new();
        first.add("urn:a", Url::parse("file:///one").unwrap());
        let mut second = Catalog::new();
        second.add("urn:a", Url::parse("file:///two").unwrap());
        second.add("urn:b", Url::parse("file:///three").unwrap());

        first.merge(&second);
        assert_eq!(first.len(), 2);
        assert_eq!(
            first.resolve(&Url::parse("urn:a").unwrap()).unwrap().as_str(),
            "file:///one"
        );
    }
}
