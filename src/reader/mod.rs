//! WSDL 2.0 reader
//!
//! The reader walks a `<description>` element tree and builds the
//! flattened [`Description`]. Imports and includes are read recursively
//! and merged into the including description; every `(namespace,
//! resolved location)` pair is merged at most once per top-level read,
//! which also terminates cyclic import graphs. Foreign attributes and
//! elements go through the [`ExtensionRegistry`]. Once the tree is built
//! the [`ValidationEngine`] runs if the validation feature is on.
//!
//! Errors go through the [`ErrorReporter`]. In the default fail-fast mode
//! the first ERROR aborts the read with a [`WsdlError`]; with
//! continue-on-error the reader records it and keeps building a
//! best-effort model.

mod builders;
mod types;

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};
use url::Url;

use crate::config::ReaderConfig;
use crate::documents::{Document, Element};
use crate::error::{Error, FaultCode, Result, WsdlError};
use crate::extensions::{ExtensionData, ExtensionRegistry};
use crate::loaders::Loader;
use crate::locations::{resolve_reference, to_url};
use crate::model::{
    ComponentKind, Description, IdAllocator, ImportRecord, IncludeRecord, ReferenceStatus,
};
use crate::namespaces::{QName, WSDL_NAMESPACE, XML_NAMESPACE, XMLNS_NAMESPACE};
use crate::reporter::{ErrorHandler, ErrorLocator, ErrorReporter, Severity};
use crate::resolver::{NoopResolver, UriResolver};
use crate::validation::{ValidationContext, ValidationEngine};

/// Reads WSDL 2.0 documents into [`Description`]s
///
/// A reader is not meant to be shared between threads while reading;
/// use one reader per concurrent read. The extension registry and the
/// resolver are shared through `Arc` and may be used by many readers.
pub struct Reader {
    config: ReaderConfig,
    registry: Arc<ExtensionRegistry>,
    resolver: Arc<dyn UriResolver>,
    loader: Loader,
    reporter: ErrorReporter,
    engine: ValidationEngine,
}

impl fmt::Debug for Reader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reader")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .field("resolver", &self.resolver)
            .finish()
    }
}

impl Default for Reader {
    fn default() -> Self {
        Self::new()
    }
}

impl Reader {
    /// Create a reader with default configuration and the built-in extensions
    pub fn new() -> Self {
        Self::with_registry(Arc::new(ExtensionRegistry::with_builtins()))
    }

    /// Create a reader sharing an existing registry
    pub fn with_registry(registry: Arc<ExtensionRegistry>) -> Self {
        Self {
            config: ReaderConfig::default(),
            registry,
            resolver: Arc::new(NoopResolver),
            loader: Loader::new(),
            reporter: ErrorReporter::new(),
            engine: ValidationEngine::with_builtin_assertions(),
        }
    }

    /// Replace the configuration
    pub fn with_config(mut self, config: ReaderConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the URI resolver
    pub fn with_resolver(mut self, resolver: Arc<dyn UriResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Replace the document loader
    pub fn with_loader(mut self, loader: Loader) -> Self {
        self.loader = loader;
        self
    }

    /// Replace the validation engine
    pub fn with_validation_engine(mut self, engine: ValidationEngine) -> Self {
        self.engine = engine;
        self
    }

    /// Set a feature by name
    pub fn set_feature(&mut self, name: &str, value: bool) -> Result<()> {
        self.config.set_feature(name, value)
    }

    /// Get a feature by name
    pub fn feature(&self, name: &str) -> Result<bool> {
        self.config.feature(name)
    }

    /// Set a property by name
    pub fn set_property(&mut self, name: &str, value: &str) -> Result<()> {
        self.config.set_property(name, value)
    }

    /// Get a property by name
    pub fn property(&self, name: &str) -> Result<&str> {
        self.config.property(name)
    }

    /// The configuration
    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Mutable access to the configuration
    pub fn config_mut(&mut self) -> &mut ReaderConfig {
        &mut self.config
    }

    /// The extension registry
    pub fn extension_registry(&self) -> &Arc<ExtensionRegistry> {
        &self.registry
    }

    /// Swap the extension registry
    pub fn set_extension_registry(&mut self, registry: Arc<ExtensionRegistry>) {
        self.registry = registry;
    }

    /// Swap the URI resolver
    pub fn set_uri_resolver(&mut self, resolver: Arc<dyn UriResolver>) {
        self.resolver = resolver;
    }

    /// Install an error handler
    pub fn set_error_handler(&mut self, handler: Box<dyn ErrorHandler>) {
        self.reporter.set_error_handler(handler);
    }

    /// The error reporter, holding the reports of the last read
    pub fn error_reporter(&self) -> &ErrorReporter {
        &self.reporter
    }

    /// Mutable access to the error reporter
    pub fn error_reporter_mut(&mut self) -> &mut ErrorReporter {
        &mut self.reporter
    }

    /// The document loader
    pub fn loader_mut(&mut self) -> &mut Loader {
        &mut self.loader
    }

    /// Read a description from a URL or file path
    pub fn read_wsdl(&mut self, location: &str) -> std::result::Result<Description, WsdlError> {
        self.begin();
        let outcome = self.load_root(location).and_then(|(root, url)| self.read_root(&root, Some(url)));
        outcome.map_err(Error::into_wsdl)
    }

    /// Read a description from XML text
    ///
    /// `base` is used to resolve relative import and include locations.
    pub fn read_wsdl_from_str(
        &mut self,
        xml: &str,
        base: Option<&str>,
    ) -> std::result::Result<Description, WsdlError> {
        self.begin();
        let outcome = (|| -> Result<Description> {
            let base = base.map(to_url).transpose()?;
            let document = match Document::parse(xml, self.loader.limits()) {
                Ok(document) => document,
                Err(e) => {
                    let name = base.as_ref().map(Url::to_string).unwrap_or_default();
                    return Err(self.parse_failure(&name, e));
                }
            };
            self.read_root(document.root(), base)
        })();
        outcome.map_err(Error::into_wsdl)
    }

    /// Read a description from an already parsed `<description>` element
    pub fn read_description(
        &mut self,
        root: &Element,
        base: Option<&Url>,
    ) -> std::result::Result<Description, WsdlError> {
        self.begin();
        self.read_root(root, base.cloned()).map_err(Error::into_wsdl)
    }

    fn begin(&mut self) {
        self.reporter.clear();
        self.reporter
            .set_continue_on_error(self.config.continue_on_error);
    }

    fn load_root(&mut self, location: &str) -> Result<(Element, Url)> {
        let url = to_url(location)?;
        let url = self.resolver.resolve_or_same(&url);

        let content = match self.loader.load(&url) {
            Ok(content) => content,
            Err(e) => {
                let reason = e.to_string();
                let locator = Some(ErrorLocator::document(url.as_str()));
                return Err(self.fatal(locator, "WSDL502", &[&url, &reason], FaultCode::OtherError, e));
            }
        };

        match Document::parse(&content, self.loader.limits()) {
            Ok(document) => Ok((document.root, url)),
            Err(e) => Err(self.parse_failure(url.as_str(), e)),
        }
    }

    fn parse_failure(&mut self, document: &str, e: Error) -> Error {
        let locator = (!document.is_empty()).then(|| ErrorLocator::document(document));
        let reason = e.to_string();
        self.fatal(locator, "WSDL511", &[&document, &reason], FaultCode::ParserError, e)
    }

    /// Report a fatal failure of the top-level document
    ///
    /// Returns the error that aborts the read, with `cause` as its source.
    fn fatal(
        &mut self,
        locator: Option<ErrorLocator>,
        id: &str,
        args: &[&dyn fmt::Display],
        fault_code: FaultCode,
        cause: Error,
    ) -> Error {
        let message = cause.to_string();
        match self.reporter.report_error_with_cause(
            locator,
            id,
            args,
            Severity::FatalError,
            fault_code,
            cause,
        ) {
            Err(reported) => reported,
            Ok(()) => Error::Wsdl(WsdlError::new(fault_code, message)),
        }
    }

    fn read_root(&mut self, root: &Element, base: Option<Url>) -> Result<Description> {
        let mut session = Session {
            config: &self.config,
            registry: &self.registry,
            resolver: self.resolver.as_ref(),
            loader: &self.loader,
            reporter: &mut self.reporter,
            ids: IdAllocator::new(),
            merged: HashSet::new(),
            depth: 0,
        };

        let doc = DocInfo {
            uri: base,
            target_namespace: root.get_attribute("targetNamespace").map(str::to_string),
        };
        if !root.is(WSDL_NAMESPACE, "description") {
            let expected = QName::wsdl("description");
            let locator = session.locator(&doc, root);
            session.reporter.report_error(
                Some(locator),
                "WSDL501",
                &[&expected, &root.qname],
                Severity::FatalError,
            )?;
            return Err(Error::Wsdl(WsdlError::invalid(format!(
                "Unexpected root element {}",
                root.qname
            ))));
        }
        if let Some(uri) = &doc.uri {
            session
                .merged
                .insert((doc.target_namespace.clone(), uri.to_string()));
        }

        let mut description = session.build_description(root, &doc)?;
        description.document_uri = doc.uri.as_ref().map(Url::to_string);

        if self.config.validation {
            let mut context = ValidationContext {
                reporter: &mut self.reporter,
                resolver: self.resolver.as_ref(),
                loader: &self.loader,
                verbose: self.config.verbose,
            };
            self.engine.validate(&mut description, &mut context)?;
        } else if self.config.verbose {
            debug!("Validation disabled, skipping assertions");
        }

        info!(
            target_namespace = description.target_namespace.as_deref().unwrap_or(""),
            components = description.component_count(),
            reports = self.reporter.reports().len(),
            "Read WSDL description"
        );
        Ok(description)
    }
}

/// The document currently being read
#[derive(Debug, Clone)]
pub(crate) struct DocInfo {
    uri: Option<Url>,
    target_namespace: Option<String>,
}

impl DocInfo {
    fn uri_str(&self) -> Option<&str> {
        self.uri.as_ref().map(Url::as_str)
    }
}

/// State of one top-level read
pub(crate) struct Session<'r> {
    config: &'r ReaderConfig,
    registry: &'r ExtensionRegistry,
    resolver: &'r dyn UriResolver,
    loader: &'r Loader,
    reporter: &'r mut ErrorReporter,
    ids: IdAllocator,
    merged: HashSet<(Option<String>, String)>,
    depth: usize,
}

enum Nested {
    Import,
    Include,
}

impl Session<'_> {
    fn locator(&self, doc: &DocInfo, element: &Element) -> ErrorLocator {
        ErrorLocator::element(doc.uri_str(), element)
    }

    fn trace(&self, message: fmt::Arguments<'_>) {
        if self.config.verbose {
            debug!("{}", message);
        }
    }

    fn report(
        &mut self,
        doc: &DocInfo,
        element: &Element,
        id: &str,
        args: &[&dyn fmt::Display],
        severity: Severity,
    ) -> Result<()> {
        let locator = self.locator(doc, element);
        self.reporter.report_error(Some(locator), id, args, severity)
    }

    /// Sort the attributes of a WSDL element
    ///
    /// Unqualified attributes must be in `allowed`; WSDL-qualified ones
    /// are never allowed. Foreign attributes become extension attributes
    /// when `ext` is given and are ignored otherwise.
    fn check_attributes(
        &mut self,
        doc: &DocInfo,
        element: &Element,
        allowed: &[&str],
        kind: Option<ComponentKind>,
        mut ext: Option<&mut ExtensionData>,
    ) -> Result<()> {
        let mut unexpected = Vec::new();

        for attr in &element.attributes {
            match attr.qname.namespace.as_deref() {
                None if allowed.contains(&attr.qname.local_name.as_str()) => {}
                None | Some(WSDL_NAMESPACE) => unexpected.push(attr.qname.to_string()),
                Some(XML_NAMESPACE) | Some(XMLNS_NAMESPACE) => {}
                Some(_) => match (kind, ext.as_deref_mut()) {
                    (Some(kind), Some(ext)) => {
                        let wrapper =
                            self.registry
                                .create_ext_attribute(kind, element, &attr.qname, &attr.value);
                        if wrapper.is_known() {
                            ext.attributes.push(wrapper);
                        } else {
                            self.trace(format_args!(
                                "No factory for extension attribute {} on {}",
                                attr.qname, element.qname
                            ));
                            ext.unknown_attributes.push(wrapper);
                        }
                    }
                    _ => self.trace(format_args!(
                        "Ignoring foreign attribute {} on {}",
                        attr.qname, element.qname
                    )),
                },
            }
        }

        if !unexpected.is_empty() {
            let list = unexpected.join(", ");
            self.report(doc, element, "WSDL503", &[&element.qname, &list], Severity::Error)?;
        }
        Ok(())
    }

    /// Deserialize a foreign child element through the registry
    fn extension_element(
        &mut self,
        doc: &DocInfo,
        kind: ComponentKind,
        element: &Element,
        ext: &mut ExtensionData,
    ) -> Result<()> {
        let registry = self.registry;
        let Some(deserializer) = registry.query_deserializer(kind, &element.qname) else {
            self.trace(format_args!(
                "No deserializer for extension element {} in {}",
                element.qname, kind
            ));
            return Ok(());
        };

        match deserializer.deserialize(kind, element, registry) {
            Ok(extension) if registry.element_type_matches(kind, extension.as_ref()) => {
                ext.elements.push(extension);
                Ok(())
            }
            Ok(_) => {
                let expected = registry
                    .query_ext_element_type(kind, &element.qname)
                    .unwrap_or("?");
                let reason = format!("deserializer did not produce a {}", expected);
                self.report(doc, element, "WSDL512", &[&element.qname, &reason], Severity::Error)
            }
            Err(e) => {
                let locator = self.locator(doc, element);
                let reason = e.to_string();
                self.reporter.report_error_with_cause(
                    Some(locator),
                    "WSDL512",
                    &[&element.qname, &reason],
                    Severity::Error,
                    FaultCode::InvalidWsdl,
                    e,
                )
            }
        }
    }

    /// Build the extension contexts of a finished component
    fn finish_extensions(&self, kind: ComponentKind, ext: &mut ExtensionData) {
        ext.contexts = self.registry.create_contexts(kind, ext);
    }

    fn process_import(&mut self, doc: &DocInfo, element: &Element, desc: &mut Description) -> Result<()> {
        self.check_attributes(doc, element, &["namespace", "location"], None, None)?;

        let namespace = element.get_attribute("namespace").map(str::to_string);
        if namespace.is_none() {
            self.report(doc, element, "WSDL507", &[&element.qname, &"namespace"], Severity::Error)?;
        }

        let mut record = ImportRecord {
            namespace: namespace.clone(),
            location: element.get_attribute("location").map(str::to_string),
            resolved: None,
            imported_namespace: None,
            importing_namespace: doc.target_namespace.clone(),
            locator: self.locator(doc, element),
            status: ReferenceStatus::NoLocation,
        };

        if let Some(location) = record.location.clone() {
            let (status, resolved, nested) =
                self.read_nested(doc, element, &location, namespace, Nested::Import)?;
            record.status = status;
            record.resolved = resolved;
            if let Some(nested) = nested {
                record.imported_namespace = nested.target_namespace.clone();
                desc.merge(nested);
            }
        }
        desc.imports.push(record);
        Ok(())
    }

    fn process_include(&mut self, doc: &DocInfo, element: &Element, desc: &mut Description) -> Result<()> {
        self.check_attributes(doc, element, &["location"], None, None)?;

        let mut record = IncludeRecord {
            location: element.get_attribute("location").map(str::to_string),
            resolved: None,
            included_namespace: None,
            including_namespace: doc.target_namespace.clone(),
            locator: self.locator(doc, element),
            status: ReferenceStatus::NoLocation,
        };

        match record.location.clone() {
            Some(location) => {
                let key_namespace = doc.target_namespace.clone();
                let (status, resolved, nested) =
                    self.read_nested(doc, element, &location, key_namespace, Nested::Include)?;
                record.status = status;
                record.resolved = resolved;
                if let Some(nested) = nested {
                    record.included_namespace = nested.target_namespace.clone();
                    desc.merge(nested);
                }
            }
            None => {
                self.report(doc, element, "WSDL507", &[&element.qname, &"location"], Severity::Error)?;
            }
        }
        desc.includes.push(record);
        Ok(())
    }

    /// Resolve, load and build an imported or included document
    fn read_nested(
        &mut self,
        doc: &DocInfo,
        element: &Element,
        location: &str,
        key_namespace: Option<String>,
        nested: Nested,
    ) -> Result<(ReferenceStatus, Option<String>, Option<Description>)> {
        let what = match nested {
            Nested::Import => "import",
            Nested::Include => "include",
        };

        let url = match resolve_reference(doc.uri.as_ref(), location) {
            Ok(url) => self.resolver.resolve_or_same(&url),
            Err(e) => {
                self.report(doc, element, "WSDL502", &[&location, &e], Severity::Warning)?;
                return Ok((ReferenceStatus::Failed, None, None));
            }
        };
        let resolved = Some(url.to_string());

        let key = (key_namespace, url.to_string());
        if self.merged.contains(&key) {
            self.trace(format_args!("Skipping {} of {}, already merged", what, url));
            return Ok((ReferenceStatus::Skipped, resolved, None));
        }
        self.merged.insert(key);

        if self.loader.limits().check_import_depth(self.depth + 1).is_err() {
            let max = self.loader.limits().max_import_depth;
            self.report(doc, element, "WSDL509", &[&max], Severity::Error)?;
            return Ok((ReferenceStatus::Failed, resolved, None));
        }

        let content = match self.loader.load(&url) {
            Ok(content) => content,
            Err(e) => {
                self.report(doc, element, "WSDL502", &[&url, &e], Severity::Warning)?;
                return Ok((ReferenceStatus::Failed, resolved, None));
            }
        };

        let document = match Document::parse(&content, self.loader.limits()) {
            Ok(document) => document,
            Err(e) => {
                let locator = self.locator(doc, element);
                let reason = e.to_string();
                self.reporter.report_error_with_cause(
                    Some(locator),
                    "WSDL511",
                    &[&url, &reason],
                    Severity::Error,
                    FaultCode::ParserError,
                    e,
                )?;
                return Ok((ReferenceStatus::Failed, resolved, None));
            }
        };

        let root = document.root();
        if !root.is(WSDL_NAMESPACE, "description") {
            let expected = QName::wsdl("description");
            self.report(doc, element, "WSDL501", &[&expected, &root.qname], Severity::Error)?;
            return Ok((ReferenceStatus::Failed, resolved, None));
        }

        self.trace(format_args!("Reading {} of {}", what, url));
        let nested_doc = DocInfo {
            uri: Some(url),
            target_namespace: root.get_attribute("targetNamespace").map(str::to_string),
        };

        self.depth += 1;
        let built = self.build_description(root, &nested_doc);
        self.depth -= 1;

        Ok((ReferenceStatus::Merged, resolved, Some(built?)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FEATURE_CONTINUE_ON_ERROR, FEATURE_VALIDATION};
    use crate::extensions::wsdlx::WsdlxOperationExtensions;
    use crate::model::{Direction, MessageContentModel, WsdlComponent};
    use crate::namespaces::WSDLX_NAMESPACE;

    const MINIMAL: &str = r##"<description xmlns="http://www.w3.org/ns/wsdl"
        targetNamespace="urn:x" xmlns:tns="urn:x">
      <interface name="I">
        <operation name="op" pattern="http://www.w3.org/ns/wsdl/in-out">
          <input messageLabel="In" element="#any"/>
          <output messageLabel="Out" element="#none"/>
        </operation>
      </interface>
    </description>"##;

    #[test]
    fn test_minimal_round_trip() {
        let mut reader = Reader::new();
        let desc = reader.read_wsdl_from_str(MINIMAL, None).unwrap();

        assert_eq!(desc.target_namespace.as_deref(), Some("urn:x"));
        assert_eq!(desc.interfaces.len(), 1);
        let iface = &desc.interfaces[0];
        assert_eq!(iface.name, Some(QName::namespaced("urn:x", "I")));
        assert_eq!(iface.operations.len(), 1);
        let op = &iface.operations[0];
        assert_eq!(op.name, Some(QName::namespaced("urn:x", "op")));
        assert_eq!(op.messages.len(), 2);
        assert_eq!(op.messages[0].direction, Direction::In);
        assert_eq!(op.messages[0].content_model, MessageContentModel::Any);
        assert_eq!(op.messages[1].content_model, MessageContentModel::None);
        assert_eq!(op.parent_id(), Some(iface.id()));
        assert!(!reader.error_reporter().has_errors());
    }

    #[test]
    fn test_wrong_root_is_fatal() {
        let mut reader = Reader::new();
        let err = reader
            .read_wsdl_from_str(r#"<definitions xmlns="http://schemas.xmlsoap.org/wsdl/"/>"#, None)
            .unwrap_err();
        assert_eq!(err.fault_code, FaultCode::InvalidWsdl);
        assert_eq!(reader.error_reporter().reports_with_id("WSDL501").count(), 1);
    }

    #[test]
    fn test_malformed_xml_is_parser_error() {
        let mut reader = Reader::new();
        let err = reader.read_wsdl_from_str("<description", None).unwrap_err();
        assert_eq!(err.fault_code, FaultCode::ParserError);
    }

    #[test]
    fn test_safe_soft_failure() {
        let xml = r#"<description xmlns="http://www.w3.org/ns/wsdl"
            xmlns:wsdlx="http://www.w3.org/ns/wsdl-extensions" targetNamespace="urn:x">
          <interface name="I">
            <operation name="a" wsdlx:safe="true"/>
            <operation name="b" wsdlx:safe="not-a-boolean"/>
          </interface>
        </description>"#;
        let mut reader = Reader::new();
        let desc = reader.read_wsdl_from_str(xml, None).unwrap();
        let ops = &desc.interfaces[0].operations;
        let safe = QName::namespaced(WSDLX_NAMESPACE, "safe");

        let a = ops[0].ext.context_as::<WsdlxOperationExtensions>(WSDLX_NAMESPACE).unwrap();
        assert!(a.is_safe());

        let attr = ops[1].ext.attribute(&safe).unwrap();
        assert!(!attr.is_valid());
        assert!(attr.content().is_none());
        assert_eq!(attr.to_external_form(), "not-a-boolean");
        assert!(!reader.error_reporter().has_errors());
    }

    #[test]
    fn test_continue_on_error() {
        let xml = r#"<description xmlns="http://www.w3.org/ns/wsdl" targetNamespace="urn:x">
          <interface name="I" colour="blue"/>
          <interface name="J"/>
        </description>"#;

        let mut reader = Reader::new();
        assert!(reader.read_wsdl_from_str(xml, None).is_err());

        reader.set_feature(FEATURE_CONTINUE_ON_ERROR, true).unwrap();
        reader.set_feature(FEATURE_VALIDATION, false).unwrap();
        let desc = reader.read_wsdl_from_str(xml, None).unwrap();
        assert_eq!(desc.interfaces.len(), 2);
        let report = reader.error_reporter().reports_with_id("WSDL503").next().unwrap();
        assert!(report.message.contains("colour"));
    }
}
