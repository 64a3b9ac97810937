//! Builders for the WSDL elements

use super::{DocInfo, Session};
use crate::documents::Element;
use crate::error::Result;
use crate::extensions::ExtensionData;
use crate::model::{
    Binding, BindingFault, BindingFaultReference, BindingMessageReference, BindingOperation,
    ComponentId, ComponentInfo, ComponentKind, Description, Direction, Documentation, Endpoint,
    Interface, InterfaceFault, InterfaceFaultReference, InterfaceMessageReference,
    InterfaceOperation, MessageContentModel, Service,
};
use crate::names::is_valid_ncname;
use crate::namespaces::{QName, WSDL_NAMESPACE, XML_NAMESPACE};
use crate::reporter::Severity;

/// A child of a WSDL element, split by namespace
enum Child<'e> {
    Wsdl(&'e Element, &'e str),
    Foreign(&'e Element),
}

fn classify(element: &Element) -> Child<'_> {
    if element.namespace() == Some(WSDL_NAMESPACE) {
        Child::Wsdl(element, element.local_name())
    } else {
        Child::Foreign(element)
    }
}

fn documentation(element: &Element) -> Documentation {
    Documentation {
        content: element.text.clone().unwrap_or_default(),
        lang: element
            .get_attribute_qname(&QName::namespaced(XML_NAMESPACE, "lang"))
            .map(str::to_string),
    }
}

fn direction_of(local_name: &str) -> Direction {
    match local_name {
        "input" | "infault" => Direction::In,
        _ => Direction::Out,
    }
}

impl Session<'_> {
    fn new_info(&mut self, doc: &DocInfo, element: &Element, parent: Option<ComponentId>) -> ComponentInfo {
        ComponentInfo::new(self.ids.next_id(), parent, self.locator(doc, element))
    }

    fn unexpected_child(&mut self, doc: &DocInfo, child: &Element, parent: &Element) -> Result<()> {
        self.report(doc, child, "WSDL504", &[&child.qname, &parent.qname], Severity::Error)
    }

    fn missing_attribute(&mut self, doc: &DocInfo, element: &Element, attribute: &str) -> Result<()> {
        self.report(doc, element, "WSDL507", &[&element.qname, &attribute], Severity::Error)
    }

    /// `name` qualified by the target namespace
    fn component_name(&mut self, doc: &DocInfo, element: &Element, required: bool) -> Result<Option<QName>> {
        match self.ncname_attr(doc, element, "name", required)? {
            Some(name) => Ok(Some(QName::new(doc.target_namespace.clone(), name))),
            None => Ok(None),
        }
    }

    fn ncname_attr(
        &mut self,
        doc: &DocInfo,
        element: &Element,
        attribute: &str,
        required: bool,
    ) -> Result<Option<String>> {
        match element.get_attribute(attribute) {
            Some(value) if is_valid_ncname(value.trim()) => Ok(Some(value.trim().to_string())),
            Some(value) => {
                self.report(
                    doc,
                    element,
                    "WSDL506",
                    &[&value, &attribute, &element.qname],
                    Severity::Error,
                )?;
                Ok(None)
            }
            None => {
                if required {
                    self.missing_attribute(doc, element, attribute)?;
                }
                Ok(None)
            }
        }
    }

    fn qname_attr(
        &mut self,
        doc: &DocInfo,
        element: &Element,
        attribute: &str,
        required: bool,
    ) -> Result<Option<QName>> {
        match element.get_attribute(attribute) {
            Some(value) => self.resolve_qname(doc, element, value),
            None => {
                if required {
                    self.missing_attribute(doc, element, attribute)?;
                }
                Ok(None)
            }
        }
    }

    fn qname_list_attr(&mut self, doc: &DocInfo, element: &Element, attribute: &str) -> Result<Vec<QName>> {
        let mut out = Vec::new();
        if let Some(value) = element.get_attribute(attribute) {
            for item in value.split_whitespace() {
                if let Some(qname) = self.resolve_qname(doc, element, item)? {
                    out.push(qname);
                }
            }
        }
        Ok(out)
    }

    fn resolve_qname(&mut self, doc: &DocInfo, element: &Element, value: &str) -> Result<Option<QName>> {
        match element.resolve_qname(value) {
            Ok(qname) => Ok(Some(qname)),
            Err(e) => {
                self.report(doc, element, "WSDL505", &[&value, &e], Severity::Error)?;
                Ok(None)
            }
        }
    }

    fn uri_list(element: &Element, attribute: &str) -> Vec<String> {
        element
            .get_attribute(attribute)
            .map(|v| v.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default()
    }

    fn content_model(&mut self, doc: &DocInfo, element: &Element) -> Result<MessageContentModel> {
        let model = match element.get_attribute("element").map(str::trim) {
            None | Some("#other") => MessageContentModel::Other,
            Some("#any") => MessageContentModel::Any,
            Some("#none") => MessageContentModel::None,
            Some(value) => match self.resolve_qname(doc, element, value)? {
                Some(qname) => MessageContentModel::Element(qname),
                None => MessageContentModel::Other,
            },
        };
        Ok(model)
    }

    pub(super) fn build_description(&mut self, element: &Element, doc: &DocInfo) -> Result<Description> {
        let info = self.new_info(doc, element, None);
        let mut desc = Description::new(info, doc.target_namespace.clone());
        desc.namespaces = element.namespaces.clone();
        let id = desc.info.id;

        let kind = ComponentKind::Description;
        self.check_attributes(doc, element, &["targetNamespace"], Some(kind), Some(&mut desc.ext))?;

        for child in &element.children {
            match classify(child) {
                Child::Wsdl(child, local) => {
                    self.trace(format_args!("Reading {} at {}", child.qname, child.path));
                    match local {
                        "documentation" => desc.info.documentation.push(documentation(child)),
                        "import" => self.process_import(doc, child, &mut desc)?,
                        "include" => self.process_include(doc, child, &mut desc)?,
                        "types" => self.process_types(doc, child, &mut desc)?,
                        "interface" => {
                            let interface = self.build_interface(doc, child, id)?;
                            desc.interfaces.push(interface);
                        }
                        "binding" => {
                            let binding = self.build_binding(doc, child, id)?;
                            desc.bindings.push(binding);
                        }
                        "service" => {
                            let service = self.build_service(doc, child, id)?;
                            desc.services.push(service);
                        }
                        _ => self.unexpected_child(doc, child, element)?,
                    }
                }
                Child::Foreign(child) => self.extension_element(doc, kind, child, &mut desc.ext)?,
            }
        }

        self.finish_extensions(kind, &mut desc.ext);
        Ok(desc)
    }

    fn build_interface(&mut self, doc: &DocInfo, element: &Element, parent: ComponentId) -> Result<Interface> {
        let kind = ComponentKind::Interface;
        let info = self.new_info(doc, element, Some(parent));
        let name = self.component_name(doc, element, false)?;
        let mut interface = Interface::new(info, name);
        let id = interface.info.id;

        self.check_attributes(
            doc,
            element,
            &["name", "extends", "styleDefault"],
            Some(kind),
            Some(&mut interface.ext),
        )?;
        interface.extends = self.qname_list_attr(doc, element, "extends")?;
        interface.style_default = Self::uri_list(element, "styleDefault");

        for child in &element.children {
            match classify(child) {
                Child::Wsdl(child, "documentation") => {
                    interface.info.documentation.push(documentation(child))
                }
                Child::Wsdl(child, "operation") => {
                    let op = self.build_interface_operation(doc, child, id)?;
                    interface.operations.push(op);
                }
                Child::Wsdl(child, "fault") => {
                    let fault = self.build_interface_fault(doc, child, id)?;
                    interface.faults.push(fault);
                }
                Child::Wsdl(child, _) => self.unexpected_child(doc, child, element)?,
                Child::Foreign(child) => self.extension_element(doc, kind, child, &mut interface.ext)?,
            }
        }

        self.finish_extensions(kind, &mut interface.ext);
        Ok(interface)
    }

    fn build_interface_operation(
        &mut self,
        doc: &DocInfo,
        element: &Element,
        parent: ComponentId,
    ) -> Result<InterfaceOperation> {
        let kind = ComponentKind::InterfaceOperation;
        let info = self.new_info(doc, element, Some(parent));
        let name = self.component_name(doc, element, true)?;
        let mut op = InterfaceOperation::new(info, name);
        let id = op.info.id;

        self.check_attributes(doc, element, &["name", "pattern", "style"], Some(kind), Some(&mut op.ext))?;
        op.pattern = element.get_attribute("pattern").map(|p| p.trim().to_string());
        op.style = Self::uri_list(element, "style");

        for child in &element.children {
            match classify(child) {
                Child::Wsdl(child, "documentation") => op.info.documentation.push(documentation(child)),
                Child::Wsdl(child, local @ ("input" | "output")) => {
                    let message = self.build_interface_message_reference(doc, child, id, direction_of(local))?;
                    op.messages.push(message);
                }
                Child::Wsdl(child, local @ ("infault" | "outfault")) => {
                    let fault = self.build_interface_fault_reference(doc, child, id, direction_of(local))?;
                    op.fault_references.push(fault);
                }
                Child::Wsdl(child, _) => self.unexpected_child(doc, child, element)?,
                Child::Foreign(child) => self.extension_element(doc, kind, child, &mut op.ext)?,
            }
        }

        self.finish_extensions(kind, &mut op.ext);
        Ok(op)
    }

    fn build_interface_message_reference(
        &mut self,
        doc: &DocInfo,
        element: &Element,
        parent: ComponentId,
        direction: Direction,
    ) -> Result<InterfaceMessageReference> {
        let kind = ComponentKind::InterfaceMessageReference;
        let info = self.new_info(doc, element, Some(parent));
        let mut ext = ExtensionData::default();
        self.check_attributes(doc, element, &["messageLabel", "element"], Some(kind), Some(&mut ext))?;

        let message_label = self.ncname_attr(doc, element, "messageLabel", false)?;
        let content_model = self.content_model(doc, element)?;
        let mut message = InterfaceMessageReference {
            info,
            ext,
            message_label,
            direction,
            content_model,
        };

        self.leaf_children(doc, element, kind, &mut message.info, &mut message.ext)?;
        Ok(message)
    }

    fn build_interface_fault_reference(
        &mut self,
        doc: &DocInfo,
        element: &Element,
        parent: ComponentId,
        direction: Direction,
    ) -> Result<InterfaceFaultReference> {
        let kind = ComponentKind::InterfaceFaultReference;
        let info = self.new_info(doc, element, Some(parent));
        let mut ext = ExtensionData::default();
        self.check_attributes(doc, element, &["ref", "messageLabel"], Some(kind), Some(&mut ext))?;

        let fault_ref = self.qname_attr(doc, element, "ref", true)?;
        let message_label = self.ncname_attr(doc, element, "messageLabel", false)?;
        let mut fault = InterfaceFaultReference {
            info,
            ext,
            fault_ref,
            message_label,
            direction,
        };

        self.leaf_children(doc, element, kind, &mut fault.info, &mut fault.ext)?;
        Ok(fault)
    }

    fn build_interface_fault(
        &mut self,
        doc: &DocInfo,
        element: &Element,
        parent: ComponentId,
    ) -> Result<InterfaceFault> {
        let kind = ComponentKind::InterfaceFault;
        let info = self.new_info(doc, element, Some(parent));
        let mut ext = ExtensionData::default();
        self.check_attributes(doc, element, &["name", "element"], Some(kind), Some(&mut ext))?;

        let name = self.component_name(doc, element, true)?;
        let content_model = self.content_model(doc, element)?;
        let mut fault = InterfaceFault {
            info,
            ext,
            name,
            content_model,
        };

        self.leaf_children(doc, element, kind, &mut fault.info, &mut fault.ext)?;
        Ok(fault)
    }

    fn build_binding(&mut self, doc: &DocInfo, element: &Element, parent: ComponentId) -> Result<Binding> {
        let kind = ComponentKind::Binding;
        let info = self.new_info(doc, element, Some(parent));
        let name = self.component_name(doc, element, true)?;
        let mut binding = Binding::new(info, name);
        let id = binding.info.id;

        self.check_attributes(doc, element, &["name", "interface", "type"], Some(kind), Some(&mut binding.ext))?;
        binding.interface = self.qname_attr(doc, element, "interface", false)?;
        binding.binding_type = element.get_attribute("type").map(|t| t.trim().to_string());
        if binding.binding_type.is_none() {
            self.missing_attribute(doc, element, "type")?;
        }

        for child in &element.children {
            match classify(child) {
                Child::Wsdl(child, "documentation") => binding.info.documentation.push(documentation(child)),
                Child::Wsdl(child, "operation") => {
                    let op = self.build_binding_operation(doc, child, id)?;
                    binding.operations.push(op);
                }
                Child::Wsdl(child, "fault") => {
                    let fault = self.build_binding_fault(doc, child, id)?;
                    binding.faults.push(fault);
                }
                Child::Wsdl(child, _) => self.unexpected_child(doc, child, element)?,
                Child::Foreign(child) => self.extension_element(doc, kind, child, &mut binding.ext)?,
            }
        }

        if (!binding.operations.is_empty() || !binding.faults.is_empty()) && binding.interface.is_none() {
            self.report(doc, element, "WSDL513", &[&element.qname, &"interface"], Severity::Error)?;
        }

        self.finish_extensions(kind, &mut binding.ext);
        Ok(binding)
    }

    fn build_binding_operation(
        &mut self,
        doc: &DocInfo,
        element: &Element,
        parent: ComponentId,
    ) -> Result<BindingOperation> {
        let kind = ComponentKind::BindingOperation;
        let info = self.new_info(doc, element, Some(parent));
        let mut ext = ExtensionData::default();
        self.check_attributes(doc, element, &["ref"], Some(kind), Some(&mut ext))?;

        let operation_ref = self.qname_attr(doc, element, "ref", true)?;
        let mut op = BindingOperation::new(info, operation_ref);
        op.ext = ext;
        let id = op.info.id;

        for child in &element.children {
            match classify(child) {
                Child::Wsdl(child, "documentation") => op.info.documentation.push(documentation(child)),
                Child::Wsdl(child, local @ ("input" | "output")) => {
                    let message = self.build_binding_message_reference(doc, child, id, direction_of(local))?;
                    op.messages.push(message);
                }
                Child::Wsdl(child, local @ ("infault" | "outfault")) => {
                    let fault = self.build_binding_fault_reference(doc, child, id, direction_of(local))?;
                    op.fault_references.push(fault);
                }
                Child::Wsdl(child, _) => self.unexpected_child(doc, child, element)?,
                Child::Foreign(child) => self.extension_element(doc, kind, child, &mut op.ext)?,
            }
        }

        self.finish_extensions(kind, &mut op.ext);
        Ok(op)
    }

    fn build_binding_message_reference(
        &mut self,
        doc: &DocInfo,
        element: &Element,
        parent: ComponentId,
        direction: Direction,
    ) -> Result<BindingMessageReference> {
        let kind = ComponentKind::BindingMessageReference;
        let info = self.new_info(doc, element, Some(parent));
        let mut ext = ExtensionData::default();
        self.check_attributes(doc, element, &["messageLabel"], Some(kind), Some(&mut ext))?;

        let message_label = self.ncname_attr(doc, element, "messageLabel", false)?;
        let mut message = BindingMessageReference {
            info,
            ext,
            message_label,
            direction,
        };

        self.leaf_children(doc, element, kind, &mut message.info, &mut message.ext)?;
        Ok(message)
    }

    fn build_binding_fault_reference(
        &mut self,
        doc: &DocInfo,
        element: &Element,
        parent: ComponentId,
        direction: Direction,
    ) -> Result<BindingFaultReference> {
        let kind = ComponentKind::BindingFaultReference;
        let info = self.new_info(doc, element, Some(parent));
        let mut ext = ExtensionData::default();
        self.check_attributes(doc, element, &["ref", "messageLabel"], Some(kind), Some(&mut ext))?;

        let fault_ref = self.qname_attr(doc, element, "ref", true)?;
        let message_label = self.ncname_attr(doc, element, "messageLabel", false)?;
        let mut fault = BindingFaultReference {
            info,
            ext,
            fault_ref,
            message_label,
            direction,
        };

        self.leaf_children(doc, element, kind, &mut fault.info, &mut fault.ext)?;
        Ok(fault)
    }

    fn build_binding_fault(&mut self, doc: &DocInfo, element: &Element, parent: ComponentId) -> Result<BindingFault> {
        let kind = ComponentKind::BindingFault;
        let info = self.new_info(doc, element, Some(parent));
        let mut ext = ExtensionData::default();
        self.check_attributes(doc, element, &["ref"], Some(kind), Some(&mut ext))?;

        let fault_ref = self.qname_attr(doc, element, "ref", true)?;
        let mut fault = BindingFault { info, ext, fault_ref };

        self.leaf_children(doc, element, kind, &mut fault.info, &mut fault.ext)?;
        Ok(fault)
    }

    fn build_service(&mut self, doc: &DocInfo, element: &Element, parent: ComponentId) -> Result<Service> {
        let kind = ComponentKind::Service;
        let info = self.new_info(doc, element, Some(parent));
        let name = self.component_name(doc, element, true)?;
        let mut service = Service::new(info, name);
        let id = service.info.id;

        self.check_attributes(doc, element, &["name", "interface"], Some(kind), Some(&mut service.ext))?;
        service.interface = self.qname_attr(doc, element, "interface", true)?;

        for child in &element.children {
            match classify(child) {
                Child::Wsdl(child, "documentation") => service.info.documentation.push(documentation(child)),
                Child::Wsdl(child, "endpoint") => {
                    let endpoint = self.build_endpoint(doc, child, id)?;
                    service.endpoints.push(endpoint);
                }
                Child::Wsdl(child, _) => self.unexpected_child(doc, child, element)?,
                Child::Foreign(child) => self.extension_element(doc, kind, child, &mut service.ext)?,
            }
        }

        self.finish_extensions(kind, &mut service.ext);
        Ok(service)
    }

    fn build_endpoint(&mut self, doc: &DocInfo, element: &Element, parent: ComponentId) -> Result<Endpoint> {
        let kind = ComponentKind::Endpoint;
        let info = self.new_info(doc, element, Some(parent));
        let mut ext = ExtensionData::default();
        self.check_attributes(doc, element, &["name", "binding", "address"], Some(kind), Some(&mut ext))?;

        let name = self.ncname_attr(doc, element, "name", true)?;
        let binding = self.qname_attr(doc, element, "binding", true)?;
        let address = element.get_attribute("address").map(|a| a.trim().to_string());
        let mut endpoint = Endpoint {
            info,
            ext,
            name,
            binding,
            address,
        };

        self.leaf_children(doc, element, kind, &mut endpoint.info, &mut endpoint.ext)?;
        Ok(endpoint)
    }

    /// Children of components that only allow documentation and extensions
    fn leaf_children(
        &mut self,
        doc: &DocInfo,
        element: &Element,
        kind: ComponentKind,
        info: &mut ComponentInfo,
        ext: &mut ExtensionData,
    ) -> Result<()> {
        for child in &element.children {
            match classify(child) {
                Child::Wsdl(child, "documentation") => info.documentation.push(documentation(child)),
                Child::Wsdl(child, _) => self.unexpected_child(doc, child, element)?,
                Child::Foreign(child) => self.extension_element(doc, kind, child, ext)?,
            }
        }
        self.finish_extensions(kind, ext);
        Ok(())
    }
}
