//! Name-addressed reader factory
//!
//! A factory is chosen by name, either directly or through the
//! `wsdl2.factory` setting. It hands out readers, empty descriptions and
//! extension registries populated from the registrar table.

use std::sync::Arc;

use tracing::debug;

use crate::config::{resolve_setting, split_list, Properties, SETTING_EXTENSION_REGISTRARS, SETTING_FACTORY};
use crate::error::{FaultCode, WsdlError};
use crate::extensions::{ExtensionRegistry, RegistrarTable};
use crate::model::{ComponentInfo, Description, IdAllocator};
use crate::reader::Reader;
use crate::reporter::{ErrorLocator, ErrorReporter};

/// Name of the only built-in factory
pub const DEFAULT_FACTORY: &str = "default";

/// Creates readers and their collaborators
#[derive(Debug, Default)]
pub struct ReaderFactory {
    registrars: RegistrarTable,
    registrar_names: Vec<String>,
}

impl ReaderFactory {
    /// Look a factory up by name
    pub fn new_instance(name: &str) -> Result<Self, WsdlError> {
        match name.trim() {
            DEFAULT_FACTORY => Ok(Self::default()),
            other => {
                let reporter = ErrorReporter::new();
                let message = reporter.formatted_message("WSDL012", &[&other]);
                Err(WsdlError::new(FaultCode::ConfigurationError, message))
            }
        }
    }

    /// Look the factory up through the environment, then packaged properties
    ///
    /// The registrar list is resolved through the same chain.
    pub fn from_settings<E>(env: E, packaged: Option<&Properties>) -> Result<Self, WsdlError>
    where
        E: Fn(&str) -> Option<String>,
    {
        let name = resolve_setting(SETTING_FACTORY, &env, packaged, DEFAULT_FACTORY);
        let registrars = resolve_setting(SETTING_EXTENSION_REGISTRARS, &env, packaged, "");
        debug!("Using factory '{}' with registrars '{}'", name, registrars);

        let mut factory = Self::new_instance(&name)?;
        factory.registrar_names = split_list(&registrars);
        Ok(factory)
    }

    /// Look the factory up from process environment variables
    pub fn from_env() -> Result<Self, WsdlError> {
        Self::from_settings(|name| std::env::var(name).ok(), None)
    }

    /// Replace the registrar table
    pub fn with_registrars(mut self, registrars: RegistrarTable) -> Self {
        self.registrars = registrars;
        self
    }

    /// Replace the names of registrars applied to new registries
    pub fn with_registrar_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.registrar_names = names.into_iter().map(Into::into).collect();
        self
    }

    /// Names of registrars applied to new registries
    pub fn registrar_names(&self) -> &[String] {
        &self.registrar_names
    }

    /// Create a reader sharing a freshly populated registry
    ///
    /// Registrar failures are recorded on the reader's error reporter,
    /// which a read clears, and kept by the registry for as long as it
    /// lives.
    pub fn new_reader(&self) -> Reader {
        let mut reader = Reader::new();
        let registry = self.new_extension_registry(reader.error_reporter_mut());
        reader.set_extension_registry(Arc::new(registry));
        reader
    }

    /// Create an empty description
    pub fn new_description(&self, target_namespace: Option<String>) -> Description {
        let mut ids = IdAllocator::new();
        let info = ComponentInfo::new(ids.next_id(), None, ErrorLocator::default());
        Description::new(info, target_namespace)
    }

    /// Create a registry with the built-ins and every named registrar
    pub fn new_extension_registry(&self, reporter: &mut ErrorReporter) -> ExtensionRegistry {
        ExtensionRegistry::populated(&self.registrars, &self.registrar_names, reporter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::extensions::attrs::string_attr;
    use crate::extensions::ExtensionRegistrar;
    use crate::model::ComponentKind;
    use crate::namespaces::QName;
    use std::collections::HashMap;

    #[derive(Debug)]
    struct Nothing;

    impl ExtensionRegistrar for Nothing {
        fn register(&self, registry: &mut ExtensionRegistry) -> Result<()> {
            registry.register_ext_attribute_type(
                ComponentKind::Binding,
                QName::namespaced("urn:nothing", "flag"),
                string_attr,
            );
            Ok(())
        }
    }

    #[test]
    fn test_default_factory() {
        let factory = ReaderFactory::new_instance("default").unwrap();
        assert!(factory.registrar_names().is_empty());
        let desc = factory.new_description(Some("urn:a".to_string()));
        assert_eq!(desc.target_namespace.as_deref(), Some("urn:a"));
    }

    #[test]
    fn test_unknown_factory() {
        let err = ReaderFactory::new_instance("com.example.Other").unwrap_err();
        assert_eq!(err.fault_code, FaultCode::ConfigurationError);
        assert!(err.message.contains("com.example.Other"));
    }

    #[test]
    fn test_settings_chain() {
        let env: HashMap<&str, &str> = HashMap::from([(SETTING_EXTENSION_REGISTRARS, "nothing, missing")]);
        let packaged = Properties::parse("wsdl2.factory=default\n");
        let factory = ReaderFactory::from_settings(
            |name: &str| env.get(name).map(|v| v.to_string()),
            Some(&packaged),
        )
        .unwrap()
        .with_registrars(RegistrarTable::new().with("nothing", || -> Result<Box<dyn ExtensionRegistrar>> {
            Ok(Box::new(Nothing))
        }));
        assert_eq!(factory.registrar_names(), ["nothing", "missing"]);

        let mut reporter = ErrorReporter::new();
        let registry = factory.new_extension_registry(&mut reporter);
        assert!(registry
            .query_ext_attribute_type(ComponentKind::Binding, &QName::namespaced("urn:nothing", "flag"))
            .is_some());
        assert_eq!(reporter.reports_with_id("WSDL011").count(), 1);
    }

    #[test]
    fn test_bad_factory_setting() {
        let err = ReaderFactory::from_settings(|_: &str| Some("other".to_string()), None).unwrap_err();
        assert_eq!(err.fault_code, FaultCode::ConfigurationError);
    }
}
