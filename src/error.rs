//! Error types for wsdl2-rs
//!
//! This module defines the typed failure raised by the reader, the
//! registry and the validation engine, together with the crate-wide
//! error enum used by the lower level utilities.

use std::fmt;
use thiserror::Error;

/// Result type alias using the wsdl2 Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for wsdl2 operations
#[derive(Error, Debug)]
pub enum Error {
    /// A WSDL failure carrying a fault code
    #[error(transparent)]
    Wsdl(#[from] WsdlError),

    /// Resource loading error
    #[error("resource error: {0}")]
    Resource(String),

    /// Namespace error
    #[error("namespace error: {0}")]
    Namespace(String),

    /// Limit exceeded error
    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// XML parsing error
    #[error("XML error: {0}")]
    Xml(#[from] roxmltree::Error),

    /// URL parsing error
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}

impl Error {
    /// The fault code this error maps to when surfaced as a `WsdlError`
    pub fn fault_code(&self) -> FaultCode {
        match self {
            Error::Wsdl(e) => e.fault_code,
            Error::Xml(_) | Error::LimitExceeded(_) => FaultCode::ParserError,
            Error::Namespace(_) => FaultCode::UnboundPrefix,
            Error::Resource(_) | Error::Io(_) | Error::Url(_) => FaultCode::OtherError,
        }
    }

    /// Convert into a `WsdlError`, keeping the original error as its cause
    pub fn into_wsdl(self) -> WsdlError {
        match self {
            Error::Wsdl(e) => e,
            other => {
                let code = other.fault_code();
                WsdlError::new(code, other.to_string()).with_source(other)
            }
        }
    }
}

/// Fault codes carried by a `WsdlError`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultCode {
    /// The document violates the WSDL grammar or an assertion
    InvalidWsdl,
    /// The underlying XML could not be parsed
    ParserError,
    /// Bad factory, property or registrar setup
    ConfigurationError,
    /// A prefix used in a qualified name is not bound
    UnboundPrefix,
    /// A qualified name needed a prefix and none was specified
    NoPrefixSpecified,
    /// Anything else
    OtherError,
}

impl FaultCode {
    /// Stable string form of the fault code
    pub fn as_str(&self) -> &'static str {
        match self {
            FaultCode::InvalidWsdl => "INVALID_WSDL",
            FaultCode::ParserError => "PARSER_ERROR",
            FaultCode::ConfigurationError => "CONFIGURATION_ERROR",
            FaultCode::UnboundPrefix => "UNBOUND_PREFIX",
            FaultCode::NoPrefixSpecified => "NO_PREFIX_SPECIFIED",
            FaultCode::OtherError => "OTHER_ERROR",
        }
    }
}

impl fmt::Display for FaultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The typed failure raised while reading or validating a description
#[derive(Debug)]
pub struct WsdlError {
    /// Fault code
    pub fault_code: FaultCode,
    /// Formatted message
    pub message: String,
    /// XPath-like location of the offending node
    pub location: Option<String>,
    /// Wrapped cause
    pub source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl WsdlError {
    /// Create a new error
    pub fn new(fault_code: FaultCode, message: impl Into<String>) -> Self {
        Self {
            fault_code,
            message: message.into(),
            location: None,
            source: None,
        }
    }

    /// Shorthand for an `INVALID_WSDL` error
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::new(FaultCode::InvalidWsdl, message)
    }

    /// Shorthand for a `CONFIGURATION_ERROR` error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(FaultCode::ConfigurationError, message)
    }

    /// Set the location
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Set the cause
    pub fn with_source(
        mut self,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

impl fmt::Display for WsdlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WSDLException: faultCode={}: {}", self.fault_code, self.message)?;

        if let Some(ref loc) = self.location {
            write!(f, "\n\nLocation: {}", loc)?;
        }

        Ok(())
    }
}

impl std::error::Error for WsdlError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_wsdl_error_display() {
        let err = WsdlError::invalid("Unexpected attribute 'foo'")
            .with_location("/wsdl:description[1]/wsdl:interface[1]");

        let msg = format!("{}", err);
        assert!(msg.contains("faultCode=INVALID_WSDL"));
        assert!(msg.contains("Unexpected attribute 'foo'"));
        assert!(msg.contains("Location:"));
    }

    #[test]
    fn test_wsdl_error_source() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = WsdlError::new(FaultCode::OtherError, "could not load").with_source(io);
        assert!(err.source().is_some());
    }

    #[test]
    fn test_error_conversion() {
        let err: Error = WsdlError::configuration("bad").into();
        assert_eq!(err.fault_code(), FaultCode::ConfigurationError);

        let err = Error::Resource("missing".into()).into_wsdl();
        assert_eq!(err.fault_code, FaultCode::OtherError);
        assert!(err.message.contains("missing"));
    }
}
