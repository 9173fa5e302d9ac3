//! Owned, namespace-aware XML element tree.
//!
//! Documents are read once with `quick-xml` into [`Element`]s so that imports can
//! be spliced in place and later stages can walk the tree freely.

use quick_xml::{
    events::{BytesEnd, BytesStart, BytesText, Event},
    Reader, Writer,
};
use std::io::{BufRead, Cursor};

use super::error;

pub const WSDL_NAMESPACE: &str = "http://schemas.xmlsoap.org/wsdl/";
pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    /// Qualified name as written in the source, prefix included.
    pub name: String,
    /// Resolved namespace URI, if the prefix was bound.
    pub namespace: Option<String>,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

pub fn split_namespaced_name(prefixed_name: &str) -> (Option<&str>, &str) {
    match prefixed_name.split_once(':') {
        Some((prefix, name)) => (Some(prefix), name),
        None => (None, prefixed_name),
    }
}

/// Local part of a `prefix:name` reference such as `tns:Order`.
pub fn local_part(prefixed_name: &str) -> &str {
    split_namespaced_name(prefixed_name).1
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

impl Element {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_attribute<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.set_attribute(key, value);
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    pub fn with_text<S: Into<String>>(mut self, text: S) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    pub fn local_name(&self) -> &str {
        split_namespaced_name(&self.name).1
    }

    pub fn is(&self, namespace: &str, local_name: &str) -> bool {
        self.namespace.as_deref() == Some(namespace) && self.local_name() == local_name
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn set_attribute<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        let key = key.into();
        let value = value.into();

        match self.attributes.iter_mut().find(|(existing, _)| *existing == key) {
            Some(entry) => entry.1 = value,
            None => self.attributes.push((key, value)),
        }
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    /// Direct children with the given local name.
    pub fn children_named<'a>(&'a self, local_name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.child_elements()
            .filter(move |child| child.local_name() == local_name)
    }

    pub fn child(&self, local_name: &str) -> Option<&Element> {
        self.child_elements()
            .find(|child| child.local_name() == local_name)
    }

    /// All descendants (not including `self`) with the given local name, in
    /// document order.
    pub fn descendants(&self, local_name: &str) -> Vec<&Element> {
        let mut found = Vec::new();
        self.collect_descendants(local_name, &mut found);
        found
    }

    fn collect_descendants<'a>(&'a self, local_name: &str, found: &mut Vec<&'a Element>) {
        for child in self.child_elements() {
            if child.local_name() == local_name {
                found.push(child);
            }
            child.collect_descendants(local_name, found);
        }
    }

    pub fn descendant(&self, local_name: &str) -> Option<&Element> {
        self.child_elements().find_map(|child| {
            if child.local_name() == local_name {
                Some(child)
            } else {
                child.descendant(local_name)
            }
        })
    }

    /// First value of `attribute` on `self` or any descendant, in document order.
    pub fn find_attribute(&self, attribute: &str) -> Option<&str> {
        self.attribute(attribute).or_else(|| {
            self.child_elements()
                .find_map(|child| child.find_attribute(attribute))
        })
    }

    /// Concatenated text content of this element and its descendants.
    pub fn text(&self) -> String {
        let mut text = String::new();
        self.collect_text(&mut text);
        text
    }

    fn collect_text(&self, text: &mut String) {
        for child in &self.children {
            match child {
                Node::Element(element) => element.collect_text(text),
                Node::Text(value) => text.push_str(value),
            }
        }
    }

    pub fn to_xml_string(&self) -> Result<String, error::Error> {
        let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
        self.write(&mut writer)?;

        String::from_utf8(writer.into_inner().into_inner())
            .map_err(|err| error::Error::XmlParseError(quick_xml::Error::Utf8(err.utf8_error())))
    }

    fn write<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<(), error::Error> {
        let mut start = BytesStart::owned_name(self.name.as_bytes());
        for (key, value) in &self.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }

        if self.children.is_empty() {
            writer.write_event(Event::Empty(start))?;
            return Ok(());
        }

        writer.write_event(Event::Start(start))?;
        for child in &self.children {
            match child {
                Node::Element(element) => element.write(writer)?,
                Node::Text(text) => {
                    writer.write_event(Event::Text(BytesText::from_plain_str(text)))?
                }
            }
        }
        writer.write_event(Event::End(BytesEnd::borrowed(self.name.as_bytes())))?;

        Ok(())
    }
}

pub fn parse_str(source: &str) -> Result<Element, error::Error> {
    parse(Reader::from_str(source))
}

pub fn parse_bytes(source: &[u8]) -> Result<Element, error::Error> {
    parse(Reader::from_reader(source))
}

/// Reads a whole document into an element tree.
///
/// Parsing is permissive: mismatched end tags are accepted, DOCTYPE and
/// processing instructions are ignored and text with unknown entity references
/// is kept raw.
pub fn parse<B: BufRead>(mut reader: Reader<B>) -> Result<Element, error::Error> {
    reader.trim_text(true);
    reader.check_end_names(false);

    let mut stack: Vec<Element> = Vec::new();
    let mut root = None;
    let mut buffer = Vec::new();
    let mut namespace_buffer = Vec::new();

    loop {
        let (namespace, event) =
            reader.read_namespaced_event(&mut buffer, &mut namespace_buffer)?;
        let namespace = match namespace {
            Some(namespace) => Some(reader.decode(namespace)?.to_owned()),
            None => None,
        };

        match event {
            Event::Start(start) => {
                let element = start_element(&reader, &start, namespace)?;
                stack.push(element);
            }

            Event::Empty(start) => {
                let element = start_element(&reader, &start, namespace)?;
                attach(&mut stack, &mut root, element);
            }

            Event::End(..) => {
                if let Some(element) = stack.pop() {
                    attach(&mut stack, &mut root, element);
                }
            }

            Event::Text(text) => {
                let value = text
                    .unescape_and_decode(&reader)
                    .or_else(|_| reader.decode(text.escaped()).map(ToOwned::to_owned))?;

                if let Some(parent) = stack.last_mut() {
                    parent.children.push(Node::Text(value));
                }
            }

            Event::CData(data) => {
                let value = reader.decode(data.escaped())?.to_owned();

                if let Some(parent) = stack.last_mut() {
                    parent.children.push(Node::Text(value));
                }
            }

            Event::Eof => break,

            _ => (),
        }

        buffer.clear();
    }

    // Unclosed elements are folded into their parents.
    while let Some(element) = stack.pop() {
        attach(&mut stack, &mut root, element);
    }

    root.ok_or(error::Error::EmptyDocument)
}

fn start_element<B: BufRead>(
    reader: &Reader<B>,
    start: &BytesStart<'_>,
    namespace: Option<String>,
) -> Result<Element, error::Error> {
    let mut element = Element::new(reader.decode(start.name())?);
    element.namespace = namespace;

    for attribute in start.attributes().with_checks(false) {
        let attribute = attribute?;
        let key = reader.decode(attribute.key)?.to_owned();
        let value = attribute
            .unescape_and_decode_value(reader)
            .or_else(|_| reader.decode(attribute.value.as_ref()).map(ToOwned::to_owned))?;

        element.attributes.push((key, value));
    }

    Ok(element)
}

fn attach(stack: &mut Vec<Element>, root: &mut Option<Element>, element: Element) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(Node::Element(element)),
        None => {
            if root.is_none() {
                *root = Some(element);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOCUMENT: &str = r#"<?xml version="1.0"?>
<wsdl:definitions xmlns:wsdl="http://schemas.xmlsoap.org/wsdl/"
                  xmlns:xsd="http://www.w3.org/2001/XMLSchema"
                  targetNamespace="urn:calc">
  <wsdl:types>
    <xsd:schema targetNamespace="urn:calc">
      <xsd:complexType name="Sum">
        <xsd:sequence>
          <xsd:element name="a" type="xsd:int"/>
          <xsd:element name="b" type="xsd:int"/>
        </xsd:sequence>
      </xsd:complexType>
    </xsd:schema>
  </wsdl:types>
  <wsdl:documentation>Adds &amp; subtracts</wsdl:documentation>
</wsdl:definitions>"#;

    #[test]
    fn resolves_element_namespaces() {
        let root = parse_str(DOCUMENT).unwrap();

        assert!(root.is(WSDL_NAMESPACE, "definitions"));
        assert_eq!(root.attribute("targetNamespace"), Some("urn:calc"));

        let schema = root.descendant("schema").unwrap();
        assert!(schema.is(XSD_NAMESPACE, "schema"));
        assert_eq!(schema.name, "xsd:schema");
    }

    #[test]
    fn keeps_document_order() {
        let root = parse_str(DOCUMENT).unwrap();
        let names: Vec<_> = root
            .descendants("element")
            .into_iter()
            .filter_map(|element| element.attribute("name"))
            .collect();

        assert_eq!(names, ["a", "b"]);
    }

    #[test]
    fn unescapes_text() {
        let root = parse_str(DOCUMENT).unwrap();
        assert_eq!(root.child("documentation").unwrap().text(), "Adds & subtracts");
    }

    #[test]
    fn tolerates_unclosed_elements() {
        let root = parse_str("<a><b name=\"x\"><c/></a>").unwrap();
        assert_eq!(root.local_name(), "a");
        assert_eq!(root.descendant("c").map(Element::local_name), Some("c"));
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(matches!(parse_str(""), Err(error::Error::EmptyDocument)));
    }

    #[test]
    fn writes_back_to_xml() {
        let element = Element::new("model")
            .with_child(Element::new("class").with_attribute("name", "Order"))
            .with_child(Element::new("extends").with_text("Base"));

        let xml = element.to_xml_string().unwrap();
        let reparsed = parse_str(&xml).unwrap();

        assert_eq!(reparsed, element);
    }
}
