//! Element start tags with attributes kept in source form

use crate::error::{DecodeError, EncodeError};
use crate::xml::{local_name, lossy, prefix, DEFAULT_PREFIX};
use quick_xml::escape::{escape, unescape};
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::Writer;
use std::io::Write;

/// Start tag of an element: qualified name plus attributes in source order.
///
/// A tag read from input keeps the bytes between its name and the closing
/// `>` (attribute spacing, quote style, line breaks) and is written back with
/// them until an attribute is changed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct XmlTag {
    /// Qualified name as written (e.g. `w:p`)
    pub name: String,
    /// Attributes as (qualified name, escaped value) pairs
    attributes: Vec<(String, String)>,
    /// Source text following the name; dropped on attribute edits
    source: Option<String>,
    /// Whether the element was written as `<x/>`
    pub self_closing: bool,
}

impl XmlTag {
    /// Create a self-closing tag with no attributes
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            source: None,
            self_closing: true,
        }
    }

    /// Capture a tag from a quick-xml start event
    pub fn from_start(start: &BytesStart, self_closing: bool) -> Result<Self, DecodeError> {
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr?;
            attributes.push((lossy(attr.key.as_ref()), lossy(&attr.value)));
        }
        Ok(Self {
            name: lossy(start.name().as_ref()),
            attributes,
            source: Some(lossy(start.attributes_raw())),
            self_closing,
        })
    }

    /// Local element name (without prefix)
    pub fn local_name(&self) -> &str {
        local_name(&self.name)
    }

    /// Qualify a local name with this tag's prefix (`w` when unprefixed)
    pub fn qualify(&self, local: &str) -> String {
        format!("{}:{}", prefix(&self.name).unwrap_or(DEFAULT_PREFIX), local)
    }

    /// Attributes as (qualified name, escaped value) pairs, in source order
    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    /// Unescaped value of the first attribute with the given local name
    pub fn attr(&self, local: &str) -> Option<String> {
        self.attributes
            .iter()
            .find(|(key, _)| local_name(key) == local)
            .map(|(_, value)| match unescape(value) {
                Ok(text) => text.into_owned(),
                Err(_) => value.clone(),
            })
    }

    /// Set an attribute, replacing an existing one with the same local name in place
    pub fn set_attr(&mut self, name: &str, value: &str) {
        let escaped = escape(value).into_owned();
        self.source = None;
        let local = local_name(name);
        match self.attributes.iter_mut().find(|(key, _)| local_name(key) == local) {
            Some(slot) => slot.1 = escaped,
            None => self.attributes.push((name.to_string(), escaped)),
        }
    }

    /// Remove an attribute by local name
    pub fn remove_attr(&mut self, local: &str) -> Option<String> {
        let pos = self
            .attributes
            .iter()
            .position(|(key, _)| local_name(key) == local)?;
        self.source = None;
        Some(self.attributes.remove(pos).1)
    }

    fn to_event(&self) -> BytesStart<'static> {
        let mut content = self.name.clone();
        match &self.source {
            Some(source) => content.push_str(source),
            None => {
                for (key, value) in &self.attributes {
                    let quote = if value.contains('"') { '\'' } else { '"' };
                    content.push(' ');
                    content.push_str(key);
                    content.push('=');
                    content.push(quote);
                    content.push_str(value);
                    content.push(quote);
                }
            }
        }
        BytesStart::from_content(content, self.name.len())
    }

    /// Write the start tag; `empty` selects the `<x/>` form
    pub fn write_start<W: Write>(&self, writer: &mut Writer<W>, empty: bool) -> Result<(), EncodeError> {
        if empty {
            writer.write_event(Event::Empty(self.to_event()))?;
        } else {
            writer.write_event(Event::Start(self.to_event()))?;
        }
        Ok(())
    }

    /// Write the matching end tag
    pub fn write_end<W: Write>(&self, writer: &mut Writer<W>) -> Result<(), EncodeError> {
        writer.write_event(Event::End(BytesEnd::new(self.name.as_str())))?;
        Ok(())
    }
}
