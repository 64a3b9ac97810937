//! Validation engine
//!
//! Assertions are registered against the component kind they check. The
//! engine walks every component of a description and runs the matching
//! assertions. Violations are reported through the [`ErrorReporter`] at
//! the severity each assertion chooses; an assertion only fails the run
//! when the reporter turns a report into an error. An assertion that
//! panics or returns an error of its own is reported as
//! `Validation.Infrastructure` and the run goes on.

pub mod assertions;

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tracing::debug;

use crate::error::Result;
use crate::extensions::panic_message;
use crate::loaders::Loader;
use crate::model::{ComponentKind, ComponentRef, Description, SchemaKind};
use crate::reporter::{ErrorLocator, ErrorReporter, Severity};
use crate::resolver::UriResolver;

/// Id used for assertions that fail unexpectedly
pub const INFRASTRUCTURE_ID: &str = "Validation.Infrastructure";

/// Collaborators available to assertions
pub struct ValidationContext<'a> {
    /// Where violations go
    pub reporter: &'a mut ErrorReporter,
    /// Resolver for dereferencing namespaces and locations
    pub resolver: &'a dyn UriResolver,
    /// Loader for dereferencing namespaces and locations
    pub loader: &'a Loader,
    /// Trace every assertion run
    pub verbose: bool,
}

impl ValidationContext<'_> {
    /// Report a violation at a component's location
    pub fn report(
        &mut self,
        location: &ErrorLocator,
        id: &str,
        args: &[&dyn fmt::Display],
        severity: Severity,
    ) -> Result<()> {
        self.reporter
            .report_error(Some(location.clone()), id, args, severity)
    }
}

/// One independently checkable rule
pub trait Assertion: Send + Sync {
    /// Stable id, e.g. `Interface-1009`
    fn id(&self) -> &str;

    /// Check one component
    fn validate(
        &self,
        target: ComponentRef<'_>,
        desc: &Description,
        ctx: &mut ValidationContext<'_>,
    ) -> Result<()>;
}

/// Signature of assertions written as plain functions
pub type AssertionFn =
    fn(ComponentRef<'_>, &Description, &mut ValidationContext<'_>) -> Result<()>;

/// An assertion backed by a function
#[derive(Clone, Copy)]
pub struct FnAssertion {
    id: &'static str,
    check: AssertionFn,
}

impl FnAssertion {
    /// Wrap a function under an id
    pub const fn new(id: &'static str, check: AssertionFn) -> Self {
        Self { id, check }
    }
}

impl Assertion for FnAssertion {
    fn id(&self) -> &str {
        self.id
    }

    fn validate(
        &self,
        target: ComponentRef<'_>,
        desc: &Description,
        ctx: &mut ValidationContext<'_>,
    ) -> Result<()> {
        (self.check)(target, desc, ctx)
    }
}

/// An assertion paired with the component kind it applies to
#[derive(Clone)]
pub struct AssertionInfo {
    /// The assertion
    pub assertion: Arc<dyn Assertion>,
    /// Kind of component it checks
    pub target: ComponentKind,
}

impl fmt::Debug for AssertionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssertionInfo")
            .field("id", &self.assertion.id())
            .field("target", &self.target)
            .finish()
    }
}

/// Runs assertions over a description
#[derive(Debug, Clone, Default)]
pub struct ValidationEngine {
    table: Vec<AssertionInfo>,
}

impl ValidationEngine {
    /// Create an engine without assertions
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with every built-in assertion
    pub fn with_builtin_assertions() -> Self {
        let mut engine = Self::new();
        for (target, assertion) in assertions::builtin() {
            engine.register(target, Arc::new(assertion));
        }
        engine
    }

    /// Add an assertion for a component kind
    pub fn register(&mut self, target: ComponentKind, assertion: Arc<dyn Assertion>) {
        self.table.push(AssertionInfo { assertion, target });
    }

    /// Assertions registered for a component kind
    pub fn assertions_for(&self, target: ComponentKind) -> impl Iterator<Item = &AssertionInfo> {
        self.table.iter().filter(move |a| a.target == target)
    }

    /// Every registered assertion
    pub fn assertions(&self) -> &[AssertionInfo] {
        &self.table
    }

    /// Validate a description
    ///
    /// Schema referenceability is fixed first, then every component is
    /// checked. Returns an error only when the reporter aborts.
    pub fn validate(&self, desc: &mut Description, ctx: &mut ValidationContext<'_>) -> Result<()> {
        mark_referenceable(desc);

        let desc: &Description = desc;
        for component in desc.components() {
            self.validate_component(component, desc, ctx)?;
        }
        Ok(())
    }

    /// Run the assertions of one component
    pub fn validate_component(
        &self,
        component: ComponentRef<'_>,
        desc: &Description,
        ctx: &mut ValidationContext<'_>,
    ) -> Result<()> {
        for info in self.assertions_for(component.kind()) {
            let assertion = info.assertion.as_ref();
            if ctx.verbose {
                debug!(
                    "Checking {} on {}",
                    assertion.id(),
                    component.as_component().display_name()
                );
            }

            let raised = ctx.reporter.raised();
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                assertion.validate(component, desc, ctx)
            }));

            let reason = match outcome {
                Ok(Ok(())) => continue,
                // the reporter aborted the run
                Ok(Err(e)) if ctx.reporter.raised() > raised => return Err(e),
                Ok(Err(e)) => e.to_string(),
                Err(payload) => panic_message(payload.as_ref()),
            };
            let name = component.as_component().display_name();
            ctx.report(
                component.location(),
                INFRASTRUCTURE_ID,
                &[&assertion.id(), &name, &reason],
                Severity::Error,
            )?;
        }
        Ok(())
    }
}

/// Fix the referenceable flag of every schema
///
/// Inlined schemas directly under `<types>` are referenceable when they
/// have a target namespace; nested ones never are. Imported schemas are
/// referenceable when the import namespace equals the schema's own
/// target namespace.
pub fn mark_referenceable(desc: &mut Description) {
    for schema in &mut desc.schemas {
        schema.referenceable = match &schema.kind {
            SchemaKind::Inlined { nested: false } => schema.namespace.is_some(),
            SchemaKind::Inlined { nested: true } => false,
            SchemaKind::Imported {
                import_namespace, ..
            } => import_namespace.is_some() && *import_namespace == schema.namespace,
        };
    }
}
