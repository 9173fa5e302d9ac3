//! Reduction of a merged WSDL document to `class`/`service`/`function` elements.
//!
//! Any [`SchemaTransform`] producing the same element shapes can replace
//! [`WsdlTransform`]:
//!
//! ```xml
//! <model>
//!   <class name="Order">
//!     <extends>Document</extends>
//!     <entry name="lines" type="OrderLine[]"/>
//!   </class>
//!   <service name="Shop" port="ShopPort" location="http://shop/soap">
//!     <function name="place">
//!       <parameters><entry name="order" type="Order"/></parameters>
//!       <returns><entry name="id" type="int"/></returns>
//!       <exceptions><entry name="rejected" type="Rejected"/></exceptions>
//!     </function>
//!   </service>
//! </model>
//! ```

use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, warn};
use wsdlc_wsdl::xml::{local_part, Element, WSDL_NAMESPACE, XSD_NAMESPACE};

#[derive(Debug, Error)]
pub enum Error {
    #[error("Root element {0} is not a WSDL definitions element")]
    NotWsdl(String),

    #[error("{0}")]
    Custom(String),
}

pub trait SchemaTransform {
    fn transform(&self, document: &Element) -> Result<Element, Error>;
}

impl<F> SchemaTransform for F
where
    F: Fn(&Element) -> Result<Element, Error>,
{
    fn transform(&self, document: &Element) -> Result<Element, Error> {
        self(document)
    }
}

/// Default rule set for SOAP 1.1/1.2 WSDL 1.1 documents.
#[derive(Debug, Default, Clone, Copy)]
pub struct WsdlTransform;

const ANY_TYPE: &str = "anyType";
const SIMPLE_CONTENT_ENTRY: &str = "value";

impl SchemaTransform for WsdlTransform {
    fn transform(&self, document: &Element) -> Result<Element, Error> {
        if !document.is(WSDL_NAMESPACE, "definitions") {
            return Err(Error::NotWsdl(document.name.clone()));
        }

        let definitions = Definitions::new(document);
        let mut model = Element::new("model");

        for schema in document.descendants("schema") {
            if schema.namespace.as_deref() != Some(XSD_NAMESPACE) {
                continue;
            }

            for class in schema_classes(schema) {
                model.children.push(class.into());
            }
        }

        for service in document.children_named("service") {
            model.children.push(definitions.service(service).into());
        }

        Ok(model)
    }
}

/// Top-level WSDL definitions looked up by local name.
struct Definitions<'a> {
    messages: HashMap<&'a str, &'a Element>,
    port_types: HashMap<&'a str, &'a Element>,
    bindings: HashMap<&'a str, &'a Element>,
}

impl<'a> Definitions<'a> {
    fn new(document: &'a Element) -> Self {
        Self {
            messages: named_children(document, "message"),
            port_types: named_children(document, "portType"),
            bindings: named_children(document, "binding"),
        }
    }

    fn service(&self, service: &Element) -> Element {
        let name = service.attribute("name").unwrap_or_default();
        let mut result = Element::new("service").with_attribute("name", name);

        if let Some(port) = service.child("port") {
            if let Some(port_name) = port.attribute("name") {
                result.set_attribute("port", port_name);
            }

            if let Some(location) = port.child("address").and_then(|address| address.attribute("location")) {
                result.set_attribute("location", location);
            }
        }

        for port in service.children_named("port") {
            let operations = match self.port_operations(port) {
                Some(operations) => operations,
                None => continue,
            };

            for operation in operations {
                result.children.push(self.function(operation).into());
            }
        }

        debug!(service = name, "transformed service");
        result
    }

    fn port_operations(&self, port: &Element) -> Option<Vec<&'a Element>> {
        let binding_name = local_part(port.attribute("binding").unwrap_or_default());

        let binding = match self.bindings.get(binding_name).copied() {
            Some(binding) => binding,
            None => {
                warn!(binding = binding_name, "skipping port with unknown binding");
                return None;
            }
        };

        let port_type_name = local_part(binding.attribute("type").unwrap_or_default());

        match self.port_types.get(port_type_name).copied() {
            Some(port_type) => Some(port_type.children_named("operation").collect()),
            None => {
                warn!(port_type = port_type_name, "skipping binding with unknown port type");
                None
            }
        }
    }

    fn function(&self, operation: &Element) -> Element {
        let mut function =
            Element::new("function").with_attribute("name", operation.attribute("name").unwrap_or_default());

        if let Some(input) = operation.child("input") {
            function.children.push(self.message_entries("parameters", input).into());
        }

        if let Some(output) = operation.child("output") {
            function.children.push(self.message_entries("returns", output).into());
        }

        let faults: Vec<_> = operation.children_named("fault").collect();
        if !faults.is_empty() {
            let mut exceptions = Element::new("exceptions");
            for fault in faults {
                exceptions.children.push(self.fault_entry(fault).into());
            }
            function.children.push(exceptions.into());
        }

        function
    }

    fn message(&self, reference: &Element) -> Option<&'a Element> {
        let name = local_part(reference.attribute("message").unwrap_or_default());
        let message = self.messages.get(name).copied();

        if message.is_none() {
            warn!(message = name, "unknown message");
        }

        message
    }

    fn message_entries(&self, wrapper: &str, reference: &Element) -> Element {
        let mut entries = Element::new(wrapper);

        if let Some(message) = self.message(reference) {
            for part in message.children_named("part") {
                entries.children.push(entry(part.attribute("name").unwrap_or_default(), part_type(part)).into());
            }
        }

        entries
    }

    fn fault_entry(&self, fault: &Element) -> Element {
        let name = fault.attribute("name").unwrap_or_default();

        let ty = self
            .message(fault)
            .and_then(|message| {
                message
                    .child("part")
                    .map(part_type)
                    .or_else(|| message.attribute("name"))
            })
            .unwrap_or(name);

        entry(name, ty)
    }
}

fn named_children<'a>(document: &'a Element, local_name: &'static str) -> HashMap<&'a str, &'a Element> {
    document
        .children_named(local_name)
        .filter_map(|child| child.attribute("name").map(|name| (name, child)))
        .collect()
}

fn entry(name: &str, ty: &str) -> Element {
    Element::new("entry")
        .with_attribute("name", name)
        .with_attribute("type", ty)
}

fn part_type(part: &Element) -> &str {
    local_part(
        part.attribute("element")
            .or_else(|| part.attribute("type"))
            .unwrap_or(ANY_TYPE),
    )
}

fn schema_classes(schema: &Element) -> Vec<Element> {
    let mut classes = Vec::new();

    for child in schema.child_elements() {
        let name = match child.attribute("name") {
            Some(name) => name,
            None => continue,
        };

        match child.local_name() {
            "complexType" => classes.push(class(name, child)),

            "element" => {
                if let Some(complex_type) = child.child("complexType") {
                    classes.push(class(name, complex_type));
                }
            }

            _ => (),
        }
    }

    classes
}

fn class(name: &str, complex_type: &Element) -> Element {
    let mut class = Element::new("class").with_attribute("name", name);
    let mut entries = Vec::new();

    for content in complex_type.child_elements() {
        match content.local_name() {
            "complexContent" => {
                for derivation in content.child_elements() {
                    if derivation.local_name() == "extension" {
                        if let Some(base) = derivation.attribute("base") {
                            class.children.push(Element::new("extends").with_text(local_part(base)).into());
                        }
                    }
                    collect_entries(derivation, &mut entries);
                }
            }

            "simpleContent" => {
                for derivation in content.child_elements() {
                    let base = derivation.attribute("base").map(local_part).unwrap_or(ANY_TYPE);
                    entries.push(entry(SIMPLE_CONTENT_ENTRY, base));
                    collect_entries(derivation, &mut entries);
                }
            }

            _ => collect_entries(content, &mut entries),
        }
    }

    class.children.extend(entries.into_iter().map(Into::into));
    class
}

/// Collects `element` and `attribute` declarations of a model group, flattening
/// nested groups.
fn collect_entries(group: &Element, entries: &mut Vec<Element>) {
    match group.local_name() {
        "element" => entries.push(element_entry(group)),
        "attribute" => entries.push(attribute_entry(group)),
        "sequence" | "all" | "choice" | "group" => {
            for child in group.child_elements() {
                collect_entries(child, entries);
            }
        }
        _ => {
            for child in group.child_elements() {
                if matches!(child.local_name(), "attribute" | "sequence" | "all" | "choice" | "group") {
                    collect_entries(child, entries);
                }
            }
        }
    }
}

fn declared_type(declaration: &Element) -> &str {
    declaration
        .attribute("type")
        .or_else(|| declaration.attribute("ref"))
        .or_else(|| {
            declaration
                .child("simpleType")
                .and_then(|simple| simple.child("restriction"))
                .and_then(|restriction| restriction.attribute("base"))
        })
        .map(local_part)
        .unwrap_or(ANY_TYPE)
}

fn element_entry(element: &Element) -> Element {
    let name = element
        .attribute("name")
        .or_else(|| element.attribute("ref").map(local_part))
        .unwrap_or_default();

    let mut ty = declared_type(element).to_owned();
    if is_repeated(element.attribute("maxOccurs")) {
        ty.push_str("[]");
    }

    entry(name, &ty)
}

fn attribute_entry(attribute: &Element) -> Element {
    let name = attribute
        .attribute("name")
        .or_else(|| attribute.attribute("ref").map(local_part))
        .unwrap_or_default();

    entry(name, declared_type(attribute))
}

fn is_repeated(max_occurs: Option<&str>) -> bool {
    match max_occurs {
        Some("unbounded") => true,
        Some(value) => value.trim().parse::<u64>().map(|max| max > 1).unwrap_or(false),
        None => false,
    }
}
