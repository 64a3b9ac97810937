//! `<types>` processing
//!
//! Inlined `xs:schema` elements and `xs:import` elements directly under
//! `<types>` become schemas of the description. An `xs:schema` found
//! anywhere inside a foreign element under `<types>` is kept as a nested
//! schema so validation can mark it not referenceable.

use super::{DocInfo, Session};
use crate::documents::{Document, Element};
use crate::error::{Error, Result};
use crate::locations::resolve_reference;
use crate::model::{Description, Schema};
use crate::namespaces::{WSDL_NAMESPACE, XSD_NAMESPACE};
use crate::reporter::Severity;

impl Session<'_> {
    pub(super) fn process_types(&mut self, doc: &DocInfo, element: &Element, desc: &mut Description) -> Result<()> {
        self.check_attributes(doc, element, &[], None, None)?;

        for child in &element.children {
            match child.namespace() {
                Some(WSDL_NAMESPACE) if child.local_name() == "documentation" => {}
                Some(WSDL_NAMESPACE) => {
                    self.report(doc, child, "WSDL504", &[&child.qname, &element.qname], Severity::Error)?;
                }
                Some(XSD_NAMESPACE) => match child.local_name() {
                    "schema" => {
                        self.trace(format_args!("Inlined schema at {}", child.path));
                        desc.schemas.push(Schema::inlined(child, false, self.locator(doc, child)));
                    }
                    "import" => {
                        let schema = self.import_schema(doc, child)?;
                        desc.schemas.push(schema);
                    }
                    _ => {
                        self.report(doc, child, "WSDL504", &[&child.qname, &element.qname], Severity::Error)?;
                    }
                },
                _ => {
                    for nested in child
                        .descendants()
                        .into_iter()
                        .filter(|e| e.is(XSD_NAMESPACE, "schema"))
                    {
                        self.trace(format_args!("Nested schema at {}", nested.path));
                        desc.schemas.push(Schema::inlined(nested, true, self.locator(doc, nested)));
                    }
                }
            }
        }
        Ok(())
    }

    fn import_schema(&mut self, doc: &DocInfo, element: &Element) -> Result<Schema> {
        let locator = self.locator(doc, element);
        let Some(location) = element.get_attribute("schemaLocation") else {
            return Ok(Schema::imported(element, None, None, locator));
        };

        let url = match resolve_reference(doc.uri.as_ref(), location) {
            Ok(url) => self.resolver.resolve_or_same(&url),
            Err(e) => {
                self.report(doc, element, "WSDL510", &[&location, &e], Severity::Warning)?;
                return Ok(Schema::imported(element, Some(location.to_string()), None, locator));
            }
        };

        let loaded = self
            .loader
            .load(&url)
            .and_then(|content| Document::parse(&content, self.loader.limits()))
            .and_then(|document| {
                if document.root.is(XSD_NAMESPACE, "schema") {
                    Ok(document.root)
                } else {
                    Err(Error::Resource(format!(
                        "expected an xs:schema root, found {}",
                        document.root.qname
                    )))
                }
            });

        match loaded {
            Ok(definition) => Ok(Schema::imported(element, Some(url.to_string()), Some(definition), locator)),
            Err(e) => {
                self.report(doc, element, "WSDL510", &[&url, &e], Severity::Warning)?;
                Ok(Schema::imported(element, Some(url.to_string()), None, locator))
            }
        }
    }
}
