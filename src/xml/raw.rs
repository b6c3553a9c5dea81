//! Raw XML node types for round-trip preservation

use quick_xml::events::{BytesCData, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::io::{BufRead, Write};

use crate::error::{DecodeError, EncodeError};
use crate::xml::{local_name, next_child, Child, XmlTag};

/// Raw XML node for preserving unknown content during round-trip.
///
/// Textual variants hold the source form (still escaped) so that writing
/// them back reproduces the input exactly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RawXmlNode {
    /// Element node
    Element(RawXmlElement),
    /// Character data, escaped as in the source
    Text(String),
    /// `<![CDATA[...]]>` content
    CData(String),
    /// Comment body
    Comment(String),
    /// Processing instruction body (`<?...?>`)
    Instruction(String),
    /// XML declaration body (`<?xml ...?>`)
    Declaration(String),
    /// Document type declaration body
    DocType(String),
}

/// Raw XML element with attributes and children
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawXmlElement {
    /// Start tag (name, attributes, self-closing flag)
    pub tag: XmlTag,
    /// Child nodes
    pub children: Vec<RawXmlNode>,
}

impl RawXmlElement {
    /// Create a new empty element
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            tag: XmlTag::new(name),
            children: Vec::new(),
        }
    }

    /// Read a complete element whose start tag has already been consumed
    pub fn decode<R: BufRead>(reader: &mut Reader<R>, tag: XmlTag) -> Result<Self, DecodeError> {
        let mut element = Self {
            tag,
            children: Vec::new(),
        };
        if element.tag.self_closing {
            return Ok(element);
        }

        let mut buf = Vec::new();
        let name = element.tag.name.clone();
        while let Some(child) = next_child(reader, &mut buf, &name)? {
            match child {
                Child::Element(tag) => {
                    let nested = Self::decode(reader, tag)?;
                    element.children.push(RawXmlNode::Element(nested));
                }
                Child::Node(node) => element.children.push(node),
            }
        }

        Ok(element)
    }

    /// Qualified element name
    pub fn name(&self) -> &str {
        &self.tag.name
    }

    /// Local element name
    pub fn local_name(&self) -> &str {
        self.tag.local_name()
    }

    /// Unescaped attribute value by local name
    pub fn attr(&self, local: &str) -> Option<String> {
        self.tag.attr(local)
    }

    /// Set an attribute (qualified name), keeping position if it already exists
    pub fn set_attr(&mut self, name: &str, value: &str) {
        self.tag.set_attr(name, value);
    }

    /// Child elements, skipping text and comments
    pub fn elements(&self) -> impl Iterator<Item = &RawXmlElement> {
        self.children.iter().filter_map(RawXmlNode::as_element)
    }

    /// First child element with the given local name
    pub fn find(&self, local: &str) -> Option<&RawXmlElement> {
        self.elements().find(|e| e.local_name() == local)
    }

    /// First descendant element (depth-first) with the given local name
    pub fn find_descendant(&self, local: &str) -> Option<&RawXmlElement> {
        for child in self.elements() {
            if child.local_name() == local {
                return Some(child);
            }
            if let Some(found) = child.find_descendant(local) {
                return Some(found);
            }
        }
        None
    }

    /// Write element to XML writer
    pub fn write_to<W: Write>(&self, writer: &mut Writer<W>) -> Result<(), EncodeError> {
        if self.children.is_empty() && self.tag.self_closing {
            return self.tag.write_start(writer, true);
        }
        self.tag.write_start(writer, false)?;
        for child in &self.children {
            child.write_to(writer)?;
        }
        self.tag.write_end(writer)
    }

    /// Add an attribute
    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.tag.set_attr(name, value);
        self
    }

    /// Add a child element
    pub fn with_child(mut self, child: RawXmlElement) -> Self {
        self.children.push(RawXmlNode::Element(child));
        self
    }
}

impl RawXmlNode {
    /// Element view of this node
    pub fn as_element(&self) -> Option<&RawXmlElement> {
        match self {
            RawXmlNode::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Local name when this node is an element
    pub fn element_name(&self) -> Option<&str> {
        self.as_element().map(|e| local_name(e.name()))
    }

    /// Write node to XML writer
    pub fn write_to<W: Write>(&self, writer: &mut Writer<W>) -> Result<(), EncodeError> {
        match self {
            RawXmlNode::Element(e) => return e.write_to(writer),
            RawXmlNode::Text(t) => {
                writer.write_event(Event::Text(BytesText::from_escaped(t.as_str())))?;
            }
            RawXmlNode::CData(c) => {
                writer.write_event(Event::CData(BytesCData::new(c.as_str())))?;
            }
            RawXmlNode::Comment(c) => {
                writer.write_event(Event::Comment(BytesText::from_escaped(c.as_str())))?;
            }
            RawXmlNode::DocType(d) => {
                writer.write_event(Event::DocType(BytesText::from_escaped(d.as_str())))?;
            }
            RawXmlNode::Instruction(body) | RawXmlNode::Declaration(body) => {
                let out = writer.get_mut();
                out.write_all(b"<?")?;
                out.write_all(body.as_bytes())?;
                out.write_all(b"?>")?;
            }
        }
        Ok(())
    }
}
