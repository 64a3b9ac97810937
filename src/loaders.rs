//! Resource loading utilities
//!
//! This module fetches WSDL and schema documents by URL. `file:` URLs are
//! read from disk, documents can be registered in memory under any URI,
//! and `http`/`https` are available with the `remote` feature.

use crate::error::{Error, Result};
use crate::limits::Limits;
use std::collections::HashMap;
use std::fs;
use url::Url;

/// Resource loader for WSDL and schema documents
#[derive(Debug, Clone)]
pub struct Loader {
    /// Resource limits
    limits: Limits,
    /// Whether to allow remote resources
    allow_remote: bool,
    /// Documents served from memory, keyed by URI
    memory: HashMap<String, String>,
}

impl Loader {
    /// Create a new loader with default settings
    pub fn new() -> Self {
        Self {
            limits: Limits::default(),
            allow_remote: true,
            memory: HashMap::new(),
        }
    }

    /// Set the limits
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Set whether to allow remote resources
    pub fn with_allow_remote(mut self, allow: bool) -> Self {
        self.allow_remote = allow;
        self
    }

    /// Serve `content` for `uri` without touching the file system or network
    pub fn with_document(mut self, uri: impl Into<String>, content: impl Into<String>) -> Self {
        self.add_document(uri, content);
        self
    }

    /// Register an in-memory document
    pub fn add_document(&mut self, uri: impl Into<String>, content: impl Into<String>) {
        self.memory.insert(uri.into(), content.into());
    }

    /// The limits in effect
    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Load a resource as a string
    pub fn load(&self, url: &Url) -> Result<String> {
        if let Some(content) = self.memory.get(url.as_str()) {
            return Ok(content.clone());
        }

        let content = match url.scheme() {
            "file" => {
                let path = url
                    .to_file_path()
                    .map_err(|_| Error::Resource(format!("Invalid file URL '{}'", url)))?;
                fs::read_to_string(&path).map_err(|e| {
                    Error::Resource(format!("Failed to read file '{}': {}", path.display(), e))
                })?
            }
            "http" | "https" => {
                if !self.allow_remote {
                    return Err(Error::Resource(
                        "Remote resources are not allowed".to_string(),
                    ));
                }
                self.load_remote(url)?
            }
            other => {
                return Err(Error::Resource(format!(
                    "Unsupported URL scheme '{}' in '{}'",
                    other, url
                )))
            }
        };

        self.limits.check_document_size(content.len())?;

        Ok(content)
    }

    #[cfg(feature = "remote")]
    fn load_remote(&self, url: &Url) -> Result<String> {
        let response = reqwest::blocking::get(url.clone())
            .and_then(|r| r.error_for_status())
            .map_err(|e| Error::Resource(format!("Failed to fetch '{}': {}", url, e)))?;
        response
            .text()
            .map_err(|e| Error::Resource(format!("Failed to read '{}': {}", url, e)))
    }

    #[cfg(not(feature = "remote"))]
    fn load_remote(&self, url: &Url) -> Result<String> {
        Err(Error::Resource(format!(
            "Remote loading of '{}' requires the `remote` feature",
            url
        )))
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}
