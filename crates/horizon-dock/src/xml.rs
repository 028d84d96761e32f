//! A small XML element model for layout persistence.
//!
//! Persisted layouts are plain element trees with attributes; text content
//! is never used. Attributes keep their insertion order so that saved
//! documents are stable and diffable.
//!
//! # Example
//!
//! ```
//! use horizon_dock::XmlElement;
//!
//! let mut root = XmlElement::new("TOOL");
//! let mut node = XmlElement::new("COMPONENT_INFO");
//! node.set_attribute("NAME", "Listing");
//! root.add_child(node);
//!
//! let text = root.to_xml_string();
//! let parsed = XmlElement::parse(&text).unwrap();
//! assert_eq!(parsed.child("COMPONENT_INFO").and_then(|c| c.attribute("NAME")), Some("Listing"));
//! ```

use std::fmt;
use std::io::Write;
use std::str::FromStr;

use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};

use crate::error::{DockingError, Result};

/// An XML element: a name, ordered attributes and child elements.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct XmlElement {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<XmlElement>,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    // ========================================================================
    // Attributes
    // ========================================================================

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Set an attribute, replacing any previous value in place.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl ToString) {
        let name = name.into();
        let value = value.to_string();
        match self.attributes.iter_mut().find(|(key, _)| *key == name) {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((name, value)),
        }
    }

    /// Builder form of [`set_attribute`](Self::set_attribute).
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.set_attribute(name, value);
        self
    }

    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        let index = self.attributes.iter().position(|(key, _)| key == name)?;
        Some(self.attributes.remove(index).1)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Parse a required attribute.
    pub fn parse_attribute<T: FromStr>(&self, name: &str) -> Result<T> {
        let value = self.attribute(name).ok_or_else(|| {
            DockingError::invalid_layout(format!("<{}> is missing attribute {name}", self.name))
        })?;
        value.parse().map_err(|_| {
            DockingError::invalid_layout(format!(
                "<{}> has invalid {name} value '{value}'",
                self.name
            ))
        })
    }

    /// Parse an optional attribute, using `default` when it is absent.
    pub fn parse_attribute_or<T: FromStr>(&self, name: &str, default: T) -> Result<T> {
        if self.has_attribute(name) {
            self.parse_attribute(name)
        } else {
            Ok(default)
        }
    }

    // ========================================================================
    // Children
    // ========================================================================

    pub fn children(&self) -> &[XmlElement] {
        &self.children
    }

    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut XmlElement> {
        self.children.iter_mut().find(|c| c.name == name)
    }

    pub fn children_by_name<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |c| c.name == name)
    }

    pub fn add_child(&mut self, child: XmlElement) {
        self.children.push(child);
    }

    /// Remove every child with the given name, returning how many went.
    pub fn remove_children(&mut self, name: &str) -> usize {
        let before = self.children.len();
        self.children.retain(|c| c.name != name);
        before - self.children.len()
    }

    /// Replace any children named like `child` with `child`.
    pub fn replace_child(&mut self, child: XmlElement) {
        self.remove_children(&child.name);
        self.children.push(child);
    }

    // ========================================================================
    // Serialization
    // ========================================================================

    /// Compact XML text.
    pub fn to_xml_string(&self) -> String {
        let mut writer = Writer::new(Vec::new());
        self.write_to(&mut writer);
        String::from_utf8(writer.into_inner()).unwrap_or_default()
    }

    /// Indented XML text.
    pub fn to_xml_string_pretty(&self) -> String {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        self.write_to(&mut writer);
        String::from_utf8(writer.into_inner()).unwrap_or_default()
    }

    fn write_to<W: Write>(&self, writer: &mut Writer<W>) {
        let mut start = BytesStart::new(self.name.as_str());
        for (key, value) in &self.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }

        if self.children.is_empty() {
            let _ = writer.write_event(Event::Empty(start));
        } else {
            let _ = writer.write_event(Event::Start(start));
            for child in &self.children {
                child.write_to(writer);
            }
            let _ = writer.write_event(Event::End(BytesEnd::new(self.name.as_str())));
        }
    }

    /// Parse XML text into its root element.
    pub fn parse(text: &str) -> Result<Self> {
        let mut reader = Reader::from_str(text);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<XmlElement> = Vec::new();
        loop {
            match reader.read_event().map_err(DockingError::xml)? {
                Event::Eof => break,
                Event::Start(start) => stack.push(element_from(&start)?),
                Event::Empty(empty) => {
                    let element = element_from(&empty)?;
                    match stack.last_mut() {
                        Some(parent) => parent.add_child(element),
                        None => return Ok(element),
                    }
                }
                Event::End(_) => {
                    let Some(element) = stack.pop() else {
                        return Err(DockingError::xml("unbalanced end tag"));
                    };
                    match stack.last_mut() {
                        Some(parent) => parent.add_child(element),
                        None => return Ok(element),
                    }
                }
                // Declarations, comments and text carry nothing we persist.
                _ => {}
            }
        }
        Err(DockingError::xml("document has no root element"))
    }
}

fn element_from(start: &BytesStart<'_>) -> Result<XmlElement> {
    let name = String::from_utf8_lossy(start.name().as_ref()).to_string();
    let mut element = XmlElement::new(name);
    for attr in start.attributes() {
        let attr = attr.map_err(DockingError::xml)?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        let value = attr.unescape_value().map_err(DockingError::xml)?.to_string();
        element.attributes.push((key, value));
    }
    Ok(element)
}

impl fmt::Display for XmlElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_xml_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_order_and_replace() {
        let mut element = XmlElement::new("ROOT_NODE")
            .with_attribute("X", 10)
            .with_attribute("Y", 20);
        element.set_attribute("X", 15);

        let attrs: Vec<_> = element.attributes().collect();
        assert_eq!(attrs, vec![("X", "15"), ("Y", "20")]);
        assert_eq!(element.remove_attribute("X"), Some("15".to_string()));
        assert!(!element.has_attribute("X"));
    }

    #[test]
    fn test_parse_nested() {
        let text = r#"<?xml version="1.0"?>
            <TOOL>
              <ROOT_NODE X="0" Y="0">
                <COMPONENT_NODE TOP_INFO="0">
                  <COMPONENT_INFO OWNER="A" NAME="B" TITLE="x &amp; y" />
                </COMPONENT_NODE>
              </ROOT_NODE>
              <!-- comment -->
            </TOOL>"#;
        let tool = XmlElement::parse(text).unwrap();
        let info = tool
            .child("ROOT_NODE")
            .and_then(|r| r.child("COMPONENT_NODE"))
            .and_then(|c| c.child("COMPONENT_INFO"))
            .unwrap();
        assert_eq!(info.attribute("TITLE"), Some("x & y"));
    }

    #[test]
    fn test_escaping_survives_write() {
        let element = XmlElement::new("COMPONENT_INFO").with_attribute("TITLE", "<\"a\" & 'b'>");
        let parsed = XmlElement::parse(&element.to_xml_string_pretty()).unwrap();
        assert_eq!(parsed, element);
    }

    #[test]
    fn test_typed_attributes() {
        let element = XmlElement::new("SPLIT_NODE")
            .with_attribute("DIVIDER_LOCATION", 0.25)
            .with_attribute("ORIENTATION", "sideways");
        assert_eq!(element.parse_attribute::<f32>("DIVIDER_LOCATION").unwrap(), 0.25);
        assert_eq!(element.parse_attribute_or::<i32>("WIDTH", 7).unwrap(), 7);
        assert!(matches!(
            element.parse_attribute::<i32>("ORIENTATION"),
            Err(DockingError::InvalidLayout(_))
        ));
        assert!(element.parse_attribute::<i32>("MISSING").is_err());
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(XmlElement::parse(""), Err(DockingError::Xml(_))));
        assert!(XmlElement::parse("<A><B></A>").is_err());
    }

    #[test]
    fn test_replace_child() {
        let mut tool = XmlElement::new("TOOL");
        tool.add_child(XmlElement::new("ROOT_NODE").with_attribute("X", 1));
        tool.add_child(XmlElement::new("OTHER"));
        tool.replace_child(XmlElement::new("ROOT_NODE").with_attribute("X", 2));

        assert_eq!(tool.children_by_name("ROOT_NODE").count(), 1);
        assert_eq!(tool.child("ROOT_NODE").and_then(|r| r.attribute("X")), Some("2"));
    }
}
