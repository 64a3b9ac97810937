//! # wsdl2-rs
//!
//! A reader, resolver and validator for WSDL 2.0 descriptions.
//!
//! ## Features
//!
//! - Reads a WSDL 2.0 document and everything it imports or includes into
//!   one flattened [`Description`](model::Description)
//! - Cycle-safe import/include processing; each document is merged once
//! - Typed extension attributes and elements for WSDLX, RPC, SOAP and HTTP
//!   through a pluggable [`ExtensionRegistry`](extensions::ExtensionRegistry)
//! - Validation of the WSDL 2.0 component model with assertion ids
//! - Fail-fast or continue-on-error reporting through [`ErrorReporter`](reporter::ErrorReporter)
//! - URI catalogs and resource limits
//!
//! ## Example
//!
//! ```rust,ignore
//! use wsdl2::Reader;
//!
//! let mut reader = Reader::new();
//! reader.set_feature(wsdl2::config::FEATURE_CONTINUE_ON_ERROR, true)?;
//!
//! let desc = reader.read_wsdl("service.wsdl")?;
//! for interface in &desc.interfaces {
//!     println!("{}", interface.display_name());
//! }
//! for report in reader.error_reporter().reports() {
//!     println!("{}: {}", report.severity, report.message);
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Foundation
pub mod error;
pub mod limits;

// Names and namespaces
pub mod names;
pub mod namespaces;

// Locating and loading documents
pub mod catalog;
pub mod documents;
pub mod loaders;
pub mod locations;
pub mod resolver;

// Reading and validating
pub mod config;
pub mod extensions;
pub mod factory;
pub mod model;
pub mod reader;
pub mod reporter;
pub mod validation;

// Re-exports for convenience
pub use config::ReaderConfig;
pub use error::{Error, FaultCode, Result, WsdlError};
pub use extensions::ExtensionRegistry;
pub use factory::ReaderFactory;
pub use model::{Description, WsdlComponent};
pub use reader::Reader;
pub use reporter::{ErrorHandler, ErrorInfo, ErrorReporter, Severity};
pub use validation::ValidationEngine;

/// Version of the wsdl2-rs library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
