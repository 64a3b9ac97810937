//! URI resolution collaborators
//!
//! A resolver maps a logical URI to the physical URI it should be fetched
//! from, or returns `None` to let the URI pass through unchanged.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use url::Url;

use crate::catalog::Catalog;
use crate::error::Result;

/// Maps logical URIs to physical URIs
pub trait UriResolver: fmt::Debug + Send + Sync {
    /// Resolve a URI, `None` meaning "use it as is"
    fn resolve(&self, uri: &Url) -> Option<Url>;

    /// Resolve a URI, falling back to the URI itself
    fn resolve_or_same(&self, uri: &Url) -> Url {
        self.resolve(uri).unwrap_or_else(|| uri.clone())
    }
}

/// Resolver that never rewrites anything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopResolver;

impl UriResolver for NoopResolver {
    fn resolve(&self, _uri: &Url) -> Option<Url> {
        None
    }
}

/// Resolver backed by a `key=value` catalog
#[derive(Debug, Clone, Default)]
pub struct CatalogResolver {
    catalog: Catalog,
}

impl CatalogResolver {
    /// Wrap an existing catalog
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }

    /// Load the catalog from a file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(Catalog::from_file(path)?))
    }

    /// The underlying catalog
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }
}

impl UriResolver for CatalogResolver {
    fn resolve(&self, uri: &Url) -> Option<Url> {
        self.catalog.resolve(uri)
    }
}

/// Tries each resolver in turn; the first `Some` wins
#[derive(Debug, Clone, Default)]
pub struct ChainResolver {
    resolvers: Vec<Arc<dyn UriResolver>>,
}

impl ChainResolver {
    /// Create an empty chain
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a resolver to the chain
    pub fn with(mut self, resolver: Arc<dyn UriResolver>) -> Self {
        self.resolvers.push(resolver);
        self
    }

    /// Append a resolver to the chain
    pub fn push(&mut self, resolver: Arc<dyn UriResolver>) {
        self.resolvers.push(resolver);
    }

    /// Number of resolvers in the chain
    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    /// Check if the chain is empty
    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }
}

impl UriResolver for ChainResolver {
    fn resolve(&self, uri: &Url) -> Option<Url> {
        self.resolvers.iter().find_map(|r| r.resolve(uri))
    }
}
