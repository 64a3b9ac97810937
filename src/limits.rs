//! Resource limits for a read
//!
//! A description may pull in any number of documents through imports,
//! includes and schema imports. These limits bound the size of each
//! document, its element nesting and how deep import chains may go.

use crate::error::{Error, Result};

/// Bounds applied to every document of a read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Largest accepted document, in bytes
    pub max_document_size: usize,

    /// Deepest accepted element nesting within one document
    pub max_element_depth: usize,

    /// Longest accepted chain of nested imports and includes
    pub max_import_depth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_document_size: 64 * 1024 * 1024,
            max_element_depth: 512,
            max_import_depth: 64,
        }
    }
}

fn within(what: &str, value: usize, max: usize) -> Result<()> {
    if value > max {
        return Err(Error::LimitExceeded(format!("{} {} exceeds maximum {}", what, value, max)));
    }
    Ok(())
}

impl Limits {
    /// Default limits
    pub fn new() -> Self {
        Self::default()
    }

    /// Tighter limits for untrusted input
    pub fn strict() -> Self {
        Self {
            max_document_size: 4 * 1024 * 1024,
            max_element_depth: 64,
            max_import_depth: 8,
        }
    }

    /// Replace the import depth
    pub fn with_import_depth(mut self, depth: usize) -> Self {
        self.max_import_depth = depth;
        self
    }

    /// Check the size of a document
    pub fn check_document_size(&self, size: usize) -> Result<()> {
        within("Document size (bytes)", size, self.max_document_size)
    }

    /// Check the nesting depth of an element
    pub fn check_element_depth(&self, depth: usize) -> Result<()> {
        within("Element depth", depth, self.max_element_depth)
    }

    /// Check the depth of a nested import or include
    pub fn check_import_depth(&self, depth: usize) -> Result<()> {
        within("Import depth", depth, self.max_import_depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits() {
        let limits = Limits::default();
        assert!(limits.check_element_depth(512).is_ok());
        assert!(limits.check_element_depth(513).is_err());
        assert!(limits.check_import_depth(64).is_ok());
    }

    #[test]
    fn test_strict_limits() {
        let limits = Limits::strict();
        assert!(limits.check_document_size(5 * 1024 * 1024).is_err());
        assert!(limits.check_import_depth(9).is_err());

        let err = limits.check_element_depth(65).unwrap_err();
        assert!(err.to_string().contains("65"));
    }

    #[test]
    fn test_import_depth_override() {
        let limits = Limits::new().with_import_depth(1);
        assert!(limits.check_import_depth(1).is_ok());
        assert!(limits.check_import_depth(2).is_err());
    }
}
