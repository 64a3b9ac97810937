//! Embedding API tests
//!
//! Readers configured with custom loaders, resolvers, validation engines
//! and registries, the way an application embedding the crate sets them up.

use std::sync::Arc;

use pretty_assertions::assert_eq;

use wsdl2::catalog::Catalog;
use wsdl2::config::FEATURE_CONTINUE_ON_ERROR;
use wsdl2::documents::Document;
use wsdl2::error::{Error, Result};
use wsdl2::extensions::soap::{SoapBindingExtensions, SoapModule};
use wsdl2::loaders::Loader;
use wsdl2::model::{ComponentKind, ComponentRef, Direction};
use wsdl2::namespaces::{QName, SOAP_NAMESPACE};
use wsdl2::reporter::ErrorLocator;
use wsdl2::resolver::CatalogResolver;
use wsdl2::validation::{FnAssertion, ValidationContext, INFRASTRUCTURE_ID};
use wsdl2::{Description, Reader, ReaderConfig, ReaderFactory, Severity, ValidationEngine, WsdlComponent};

const ROOT: &str = r##"<description xmlns="http://www.w3.org/ns/wsdl"
    targetNamespace="urn:root" xmlns:tns="urn:root" xmlns:b="urn:b"
    xmlns:wsoap="http://www.w3.org/ns/wsdl/soap">
  <import namespace="urn:b" location="b.wsdl"/>
  <interface name="Root">
    <operation name="ping" pattern="http://www.w3.org/ns/wsdl/in-out">
      <input messageLabel="In" element="#any"/>
      <output messageLabel="Out" element="#none"/>
    </operation>
  </interface>
  <binding name="RootBinding" interface="tns:Root" type="http://www.w3.org/ns/wsdl/soap"
      wsoap:version="1.1">
    <wsoap:module ref="urn:example:module" required="true"/>
    <operation ref="tns:ping"/>
  </binding>
</description>"##;

const IMPORTED: &str = r#"<description xmlns="http://www.w3.org/ns/wsdl" targetNamespace="urn:b">
  <interface name="Imported"/>
</description>"#;

fn empty_interfaces(target: ComponentRef<'_>, _desc: &Description, ctx: &mut ValidationContext<'_>) -> Result<()> {
    if let ComponentRef::Interface(interface) = target {
        if interface.operations.is_empty() {
            let name = interface.display_name();
            ctx.report(&interface.info.location, "Custom-Empty", &[&name], Severity::Warning)?;
        }
    }
    Ok(())
}

fn always_panics(_: ComponentRef<'_>, _: &Description, _: &mut ValidationContext<'_>) -> Result<()> {
    panic!("broken assertion")
}

fn always_fails(_: ComponentRef<'_>, _: &Description, _: &mut ValidationContext<'_>) -> Result<()> {
    Err(Error::Resource("assertion bug".to_string()))
}

fn memory_reader() -> Reader {
    let loader = Loader::new()
        .with_document("http://example.com/root.wsdl", ROOT)
        .with_document("http://example.com/b.wsdl", IMPORTED);
    Reader::new().with_loader(loader)
}

#[test]
fn test_in_memory_import() {
    let mut reader = memory_reader();
    let desc = reader.read_wsdl("http://example.com/root.wsdl").unwrap();

    let names: Vec<String> = desc.interfaces.iter().map(|i| i.display_name()).collect();
    assert_eq!(names.len(), 2);
    assert!(names.iter().any(|n| n.contains("Imported")));
    assert!(!reader.error_reporter().has_errors());
}

#[test]
fn test_catalog_resolver_redirects_imports() {
    let root = ROOT.replace("location=\"b.wsdl\"", "location=\"urn:logical:b\"");
    let mut catalog = Catalog::new();
    catalog.add("urn:logical:b", url::Url::parse("http://example.com/b.wsdl").unwrap());

    let mut reader = Reader::new()
        .with_loader(Loader::new().with_document("http://example.com/b.wsdl", IMPORTED))
        .with_resolver(Arc::new(CatalogResolver::new(catalog)));
    let desc = reader.read_wsdl_from_str(&root, Some("http://example.com/root.wsdl")).unwrap();

    assert_eq!(desc.interfaces.len(), 2);
    assert_eq!(desc.imports[0].resolved.as_deref(), Some("http://example.com/b.wsdl"));
}

#[test]
fn test_loader_added_after_construction() {
    let mut reader = Reader::new();
    reader.loader_mut().add_document("http://example.com/root.wsdl", ROOT);
    reader.loader_mut().add_document("http://example.com/b.wsdl", IMPORTED);

    let desc = reader.read_wsdl("http://example.com/root.wsdl").unwrap();
    assert_eq!(desc.interfaces.len(), 2);
}

#[test]
fn test_read_parsed_element() {
    let document = Document::from_string(IMPORTED).unwrap();
    let mut reader = Reader::new();
    let desc = reader.read_description(document.root(), None).unwrap();

    assert_eq!(desc.target_namespace.as_deref(), Some("urn:b"));
    assert_eq!(desc.interfaces.len(), 1);
}

#[test]
fn test_soap_extensions_through_registry() {
    let mut reader = memory_reader();
    let desc = reader.read_wsdl("http://example.com/root.wsdl").unwrap();
    let binding = &desc.bindings[0];

    let registry = reader.extension_registry();
    let module = QName::namespaced(SOAP_NAMESPACE, "module");
    assert!(registry.allowable_ext_elements(ComponentKind::Binding).contains(&&module));

    let context = registry.get_extension_context(binding, SOAP_NAMESPACE).unwrap();
    let soap = context.as_any().downcast_ref::<SoapBindingExtensions>().unwrap();
    assert_eq!(soap.version, "1.1");
    assert_eq!(soap.modules.len(), 1);

    assert_eq!(binding.ext.elements_named(&module).count(), 1);
    let parsed: Vec<&SoapModule> = binding.ext.elements_of::<SoapModule>().collect();
    assert_eq!(parsed[0].reference.as_deref(), Some("urn:example:module"));
    assert_eq!(parsed[0].required, Some(true));

    let root = desc.interface(&QName::namespaced("urn:root", "Root")).unwrap();
    let op = &root.operations[0];
    assert_eq!(op.messages_in(Direction::In).count(), 1);
    assert_eq!(op.messages_in(Direction::Out).count(), 1);
}

#[test]
fn test_custom_assertion() {
    let mut engine = ValidationEngine::new();
    engine.register(
        ComponentKind::Interface,
        Arc::new(FnAssertion::new("Custom-Empty", empty_interfaces)),
    );

    let mut reader = memory_reader().with_validation_engine(engine);
    reader.read_wsdl("http://example.com/root.wsdl").unwrap();

    let reports = reader.error_reporter().reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].id, "Custom-Empty");
    assert!(reports[0].message.contains("Custom-Empty"));
}

#[test]
fn test_panicking_assertion_is_reported() {
    let mut engine = ValidationEngine::with_builtin_assertions();
    engine.register(
        ComponentKind::Binding,
        Arc::new(FnAssertion::new("Custom-Panic", always_panics)),
    );

    let mut reader = memory_reader().with_validation_engine(engine);
    reader.set_feature(FEATURE_CONTINUE_ON_ERROR, true).unwrap();
    let desc = reader.read_wsdl("http://example.com/root.wsdl").unwrap();

    assert_eq!(desc.bindings.len(), 1);
    let report = reader.error_reporter().reports_with_id(INFRASTRUCTURE_ID).next().unwrap();
    assert_eq!(report.severity, Severity::Error);
    assert!(report.message.contains("Custom-Panic"));
    assert!(report.message.contains("broken assertion"));
}

#[test]
fn test_failing_assertion_is_reported() {
    let mut engine = ValidationEngine::with_builtin_assertions();
    engine.register(
        ComponentKind::Interface,
        Arc::new(FnAssertion::new("Custom-Fails", always_fails)),
    );

    let mut reader = memory_reader().with_validation_engine(engine);
    reader.set_feature(FEATURE_CONTINUE_ON_ERROR, true).unwrap();
    let desc = reader.read_wsdl("http://example.com/root.wsdl").unwrap();

    assert_eq!(desc.interfaces.len(), 2);
    let reports: Vec<_> = reader.error_reporter().reports_with_id(INFRASTRUCTURE_ID).collect();
    assert_eq!(reports.len(), 2);
    assert!(reports[0].message.contains("Custom-Fails"));
    assert!(reports[0].message.contains("assertion bug"));
}

#[test]
fn test_failing_assertion_stops_fail_fast_read() {
    let mut engine = ValidationEngine::new();
    engine.register(
        ComponentKind::Binding,
        Arc::new(FnAssertion::new("Custom-Fails", always_fails)),
    );

    let mut reader = memory_reader().with_validation_engine(engine);
    let err = reader.read_wsdl("http://example.com/root.wsdl").unwrap_err();

    assert_eq!(err.fault_code, wsdl2::FaultCode::InvalidWsdl);
    assert!(err.message.contains(INFRASTRUCTURE_ID));
    assert_eq!(reader.error_reporter().reports_with_id(INFRASTRUCTURE_ID).count(), 1);
}

#[test]
fn test_configuration_without_validation() {
    let mut config = ReaderConfig::new();
    config.validation = false;

    let mut reader = Reader::new().with_config(config);
    let xml = r#"<description xmlns="http://www.w3.org/ns/wsdl" targetNamespace="urn:x" xmlns:tns="urn:x">
      <interface name="I" extends="tns:I"/>
    </description>"#;
    reader.read_wsdl_from_str(xml, None).unwrap();
    assert!(reader.error_reporter().reports().is_empty());

    reader.config_mut().validation = true;
    reader.config_mut().continue_on_error = true;
    reader.read_wsdl_from_str(xml, None).unwrap();
    assert_eq!(reader.error_reporter().reports_with_id("Interface-1009").count(), 1);

    let taken = reader.error_reporter_mut().take_reports();
    assert!(!taken.is_empty());
    assert!(reader.error_reporter().reports().is_empty());
}

#[test]
fn test_factory_reader() {
    let factory = ReaderFactory::new_instance("default")
        .unwrap()
        .with_registrar_names(["unregistered"]);
    let reader = factory.new_reader();

    let report = reader.error_reporter().reports_with_id("WSDL011").next().unwrap();
    assert_eq!(report.severity, Severity::Error);
    assert!(report.message.contains("unregistered"));

    let registered = reader.extension_registry().registrar_reports();
    assert_eq!(registered.len(), 1);
    assert_eq!(registered[0].id, "WSDL011");

    let desc = factory.new_description(None);
    assert_eq!(desc.component_count(), 1);
    assert_eq!(desc.info.location, ErrorLocator::default());
}

#[test]
fn test_registrar_failures_outlive_reads() {
    let factory = ReaderFactory::new_instance("default")
        .unwrap()
        .with_registrar_names(["unregistered"]);
    let mut reader = factory.new_reader();

    reader.read_wsdl_from_str(IMPORTED, None).unwrap();
    assert_eq!(reader.error_reporter().reports_with_id("WSDL011").count(), 0);

    let registered = reader.extension_registry().registrar_reports();
    assert_eq!(registered.len(), 1);
    assert!(registered[0].message.contains("unregistered"));
}

#[test]
fn test_factory_from_env_defaults() {
    let factory = ReaderFactory::from_env().unwrap();
    assert!(factory.registrar_names().is_empty());
}
