//! Error reporting
//!
//! The reporter turns an error id plus arguments into a localized message,
//! hands it to the configured [`ErrorHandler`] and records it. Warnings
//! never fail. Fatal errors always fail with a [`WsdlError`]; plain errors
//! fail unless continue-on-error is on, in which case they are only
//! recorded and the caller keeps going with a best-effort model.

pub mod messages;

use std::fmt;

use serde::Serialize;
use tracing::{error, warn};

use crate::documents::Element;
use crate::error::{Error, FaultCode, Result, WsdlError};

/// Severity of a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    /// Worth knowing, never aborts
    Warning,
    /// A violation; aborts unless continue-on-error is on
    Error,
    /// Always aborts
    FatalError,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
            Severity::FatalError => "FATAL_ERROR",
        })
    }
}

/// Where in which document a report applies
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ErrorLocator {
    /// URI of the document
    pub document: Option<String>,
    /// XPath-like path of the node
    pub path: Option<String>,
    /// Line number (1-based, 0 when unknown)
    pub line: u32,
    /// Column number (1-based, 0 when unknown)
    pub column: u32,
}

impl ErrorLocator {
    /// Locate an element of a document
    pub fn element(document: Option<&str>, element: &Element) -> Self {
        Self {
            document: document.map(str::to_string),
            path: Some(element.path.clone()),
            line: element.position.line,
            column: element.position.column,
        }
    }

    /// Locate a whole document
    pub fn document(document: impl Into<String>) -> Self {
        Self {
            document: Some(document.into()),
            ..Self::default()
        }
    }

    /// Locate a component by a descriptive path only
    pub fn path(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }
}

impl fmt::Display for ErrorLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut sep = "";
        if let Some(ref doc) = self.document {
            write!(f, "{}", doc)?;
            sep = " ";
        }
        if self.line > 0 {
            write!(f, "{}({}:{})", sep, self.line, self.column)?;
            sep = " ";
        }
        if let Some(ref path) = self.path {
            write!(f, "{}{}", sep, path)?;
        }
        Ok(())
    }
}

/// A single recorded report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorInfo {
    /// Error or assertion id
    pub id: String,
    /// Severity
    pub severity: Severity,
    /// Fault code used when the report becomes a failure
    #[serde(serialize_with = "serialize_fault_code")]
    pub fault_code: FaultCode,
    /// Formatted message
    pub message: String,
    /// Location, when known
    pub location: Option<ErrorLocator>,
    /// Text of the underlying cause
    pub cause: Option<String>,
}

fn serialize_fault_code<S: serde::Serializer>(
    code: &FaultCode,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(code.as_str())
}

impl ErrorInfo {
    fn to_wsdl_error(&self) -> WsdlError {
        let message = format!("{}: {}", self.id, self.message);
        let mut err = WsdlError::new(self.fault_code, message);
        if let Some(ref loc) = self.location {
            err = err.with_location(loc.to_string());
        }
        err
    }
}

impl fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.severity, self.id, self.message)?;
        if let Some(ref loc) = self.location {
            write!(f, " [{}]", loc)?;
        }
        Ok(())
    }
}

/// Receives every report
///
/// Returning an error aborts the read with that error, whatever the
/// severity of the report.
pub trait ErrorHandler: fmt::Debug + Send {
    /// A warning was reported
    fn warning(&mut self, info: &ErrorInfo) -> Result<()>;

    /// An error was reported
    fn error(&mut self, info: &ErrorInfo) -> Result<()>;

    /// A fatal error was reported
    fn fatal_error(&mut self, info: &ErrorInfo) -> Result<()>;
}

/// Handler that forwards reports to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingErrorHandler;

impl ErrorHandler for TracingErrorHandler {
    fn warning(&mut self, info: &ErrorInfo) -> Result<()> {
        warn!(id = %info.id, location = ?info.location, "{}", info.message);
        Ok(())
    }

    fn error(&mut self, info: &ErrorInfo) -> Result<()> {
        error!(id = %info.id, location = ?info.location, "{}", info.message);
        Ok(())
    }

    fn fatal_error(&mut self, info: &ErrorInfo) -> Result<()> {
        error!(id = %info.id, location = ?info.location, fatal = true, "{}", info.message);
        Ok(())
    }
}

/// Formats, dispatches and records reports
#[derive(Debug)]
pub struct ErrorReporter {
    handler: Box<dyn ErrorHandler>,
    locale: String,
    continue_on_error: bool,
    reports: Vec<ErrorInfo>,
    raised: usize,
}

impl Default for ErrorReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorReporter {
    /// Create a reporter with the tracing handler and English messages
    pub fn new() -> Self {
        Self {
            handler: Box::new(TracingErrorHandler),
            locale: "en".to_string(),
            continue_on_error: false,
            reports: Vec::new(),
            raised: 0,
        }
    }

    /// Replace the error handler
    pub fn set_error_handler(&mut self, handler: Box<dyn ErrorHandler>) {
        self.handler = handler;
    }

    /// Use another locale for messages
    pub fn set_locale(&mut self, locale: impl Into<String>) {
        self.locale = locale.into();
    }

    /// Record ERROR reports instead of failing on them
    pub fn set_continue_on_error(&mut self, continue_on_error: bool) {
        self.continue_on_error = continue_on_error;
    }

    /// Whether ERROR reports are only recorded
    pub fn continue_on_error(&self) -> bool {
        self.continue_on_error
    }

    /// Format a message without reporting it
    ///
    /// Unknown ids fall back to the id followed by the arguments.
    pub fn formatted_message(&self, id: &str, args: &[&dyn fmt::Display]) -> String {
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        match messages::template(&self.locale, id) {
            Some(template) => messages::format_template(template, &args),
            None if args.is_empty() => id.to_string(),
            None => format!("{} {}", id, args.join(", ")),
        }
    }

    /// Report a catalogued message as an `INVALID_WSDL` condition
    pub fn report_error(
        &mut self,
        location: Option<ErrorLocator>,
        id: &str,
        args: &[&dyn fmt::Display],
        severity: Severity,
    ) -> Result<()> {
        let message = self.formatted_message(id, args);
        let info = ErrorInfo {
            id: id.to_string(),
            severity,
            fault_code: FaultCode::InvalidWsdl,
            message,
            location,
            cause: None,
        };
        self.dispatch(info, None)
    }

    /// Report a literal message
    pub fn report_message(
        &mut self,
        location: Option<ErrorLocator>,
        id: &str,
        message: impl Into<String>,
        severity: Severity,
    ) -> Result<()> {
        let info = ErrorInfo {
            id: id.to_string(),
            severity,
            fault_code: FaultCode::InvalidWsdl,
            message: message.into(),
            location,
            cause: None,
        };
        self.dispatch(info, None)
    }

    /// Report with an explicit fault code and underlying cause
    pub fn report_error_with_cause(
        &mut self,
        location: Option<ErrorLocator>,
        id: &str,
        args: &[&dyn fmt::Display],
        severity: Severity,
        fault_code: FaultCode,
        cause: impl Into<Error>,
    ) -> Result<()> {
        let cause = cause.into();
        let message = self.formatted_message(id, args);
        let info = ErrorInfo {
            id: id.to_string(),
            severity,
            fault_code,
            message,
            location,
            cause: Some(cause.to_string()),
        };
        self.dispatch(info, Some(cause))
    }

    /// Record and hand a report to the handler
    ///
    /// A failure raised for the report carries `cause` as its source.
    fn dispatch(&mut self, info: ErrorInfo, cause: Option<Error>) -> Result<()> {
        self.reports.push(info.clone());

        let outcome = self.handle(&info, cause);
        if outcome.is_err() {
            self.raised += 1;
        }
        outcome
    }

    fn handle(&mut self, info: &ErrorInfo, cause: Option<Error>) -> Result<()> {
        match info.severity {
            Severity::Warning => self.handler.warning(info)?,
            Severity::Error => self.handler.error(info)?,
            Severity::FatalError => self.handler.fatal_error(info)?,
        }

        match info.severity {
            Severity::Warning => Ok(()),
            Severity::Error if self.continue_on_error => Ok(()),
            _ => {
                let err = info.to_wsdl_error();
                Err(Error::Wsdl(match cause {
                    Some(cause) => err.with_source(cause),
                    None => err,
                }))
            }
        }
    }

    /// Every report recorded so far
    pub fn reports(&self) -> &[ErrorInfo] {
        &self.reports
    }

    /// Reports at ERROR or FATAL_ERROR severity
    pub fn errors(&self) -> impl Iterator<Item = &ErrorInfo> {
        self.reports.iter().filter(|r| r.severity >= Severity::Error)
    }

    /// Reports at WARNING severity
    pub fn warnings(&self) -> impl Iterator<Item = &ErrorInfo> {
        self.reports.iter().filter(|r| r.severity == Severity::Warning)
    }

    /// Reports with the given id
    pub fn reports_with_id<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a ErrorInfo> + 'a {
        self.reports.iter().filter(move |r| r.id == id)
    }

    /// Check if any ERROR or FATAL_ERROR was recorded
    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    /// Number of reports that failed, either by severity or because the
    /// handler aborted
    pub fn raised(&self) -> usize {
        self.raised
    }

    /// Forget the recorded reports
    pub fn clear(&mut self) {
        self.reports.clear();
        self.raised = 0;
    }

    /// Take the recorded reports, leaving none behind
    pub fn take_reports(&mut self) -> Vec<ErrorInfo> {
        std::mem::take(&mut self.reports)
    }
}
