//! Run element (w:r) - a contiguous run of text with uniform formatting

use crate::document::{decode_container, encode_container, Item};
use crate::error::{DecodeError, EncodeError};
use crate::xml::{next_child, parse_on_off, Child, RawXmlElement, RawXmlNode, XmlTag, DEFAULT_PREFIX};
use quick_xml::escape::{partial_escape, unescape};
use quick_xml::{Reader, Writer};
use std::io::{BufRead, Write};

/// Run element (w:r)
#[derive(Clone, Debug, PartialEq)]
pub struct Run {
    pub tag: XmlTag,
    /// Run properties
    pub params: Option<RunParams>,
    params_slot: usize,
    /// Run content (text, tabs, breaks, drawings, ...)
    pub children: Vec<Item>,
}

/// Run properties (w:rPr).
///
/// Kept as the decoded element; accessors read the common toggles and values
/// without normalizing anything, so unknown formatting survives edits.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunParams(RawXmlElement);

/// Text element (w:t)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Text {
    pub tag: XmlTag,
    /// Content in source order: escaped text, CDATA, comments, instructions
    nodes: Vec<RawXmlNode>,
}

impl Run {
    pub const TAG: &'static str = "r";

    /// Parse run from reader (after w:r start tag)
    pub fn decode<R: BufRead>(reader: &mut Reader<R>, tag: XmlTag) -> Result<Self, DecodeError> {
        let (children, params) = decode_container(reader, &tag, Some("rPr"))?;
        let (params_slot, params) = match params {
            Some((slot, element)) => (slot, Some(RunParams::from_element(element))),
            None => (0, None),
        };
        Ok(Run {
            tag,
            params,
            params_slot,
            children,
        })
    }

    /// Write to XML writer
    pub fn encode<W: Write>(&self, writer: &mut Writer<W>) -> Result<(), EncodeError> {
        match &self.params {
            Some(params) => {
                let write = |w: &mut Writer<W>| params.element().write_to(w);
                let write_params: &dyn Fn(&mut Writer<W>) -> Result<(), EncodeError> = &write;
                encode_container(writer, &self.tag, &self.children, Some((self.params_slot, write_params)))
            }
            None => encode_container(writer, &self.tag, &self.children, None),
        }
    }

    /// Get text content
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|c| match c {
                Item::Text(t) => Some(t.text()),
                _ => None,
            })
            .collect()
    }

    pub fn bold(&self) -> bool {
        self.params.as_ref().is_some_and(RunParams::bold)
    }

    pub fn italic(&self) -> bool {
        self.params.as_ref().is_some_and(RunParams::italic)
    }
}

impl RunParams {
    /// Create an empty `w:rPr`
    pub fn new() -> Self {
        let mut element = RawXmlElement::new(format!("{}:rPr", DEFAULT_PREFIX));
        element.tag.self_closing = false;
        Self(element)
    }

    pub fn from_element(element: RawXmlElement) -> Self {
        Self(element)
    }

    pub fn element(&self) -> &RawXmlElement {
        &self.0
    }

    fn toggle(&self, local: &str) -> bool {
        self.0
            .find(local)
            .is_some_and(|e| parse_on_off(e.attr("val").as_deref()))
    }

    fn val(&self, local: &str) -> Option<String> {
        self.0.find(local)?.attr("val")
    }

    /// Character style id (w:rStyle)
    pub fn style(&self) -> Option<String> {
        self.val("rStyle")
    }

    pub fn bold(&self) -> bool {
        self.toggle("b")
    }

    pub fn italic(&self) -> bool {
        self.toggle("i")
    }

    /// Underline type (`single`, `double`, ...)
    pub fn underline(&self) -> Option<String> {
        self.val("u")
    }

    /// Font size in half-points
    pub fn size(&self) -> Option<u32> {
        self.val("sz")?.parse().ok()
    }

    /// Color as RGB hex or `auto`
    pub fn color(&self) -> Option<String> {
        self.val("color")
    }

    /// Turn bold on or off, editing an existing `w:b` in place
    pub fn set_bold(&mut self, on: bool) {
        let name = self.0.tag.qualify("b");
        let position = self.0.children.iter().position(|c| c.element_name() == Some("b"));
        let mut element = RawXmlElement::new(name);
        if !on {
            let val = self.0.tag.qualify("val");
            element.set_attr(&val, "0");
        }
        match position {
            Some(index) => self.0.children[index] = RawXmlNode::Element(element),
            None => {
                // w:rStyle and w:rFonts precede w:b
                let index = self
                    .0
                    .children
                    .iter()
                    .rposition(|c| matches!(c.element_name(), Some("rStyle" | "rFonts")))
                    .map_or(0, |i| i + 1);
                self.0.children.insert(index, RawXmlNode::Element(element));
            }
        }
    }
}

impl Default for RunParams {
    fn default() -> Self {
        Self::new()
    }
}

impl Text {
    pub const TAG: &'static str = "t";

    /// Parse text element (after w:t start tag). Child elements are rejected.
    pub fn decode<R: BufRead>(reader: &mut Reader<R>, tag: XmlTag) -> Result<Self, DecodeError> {
        let mut nodes = Vec::new();
        if !tag.self_closing {
            let mut buf = Vec::new();
            while let Some(child) = next_child(reader, &mut buf, &tag.name)? {
                match child {
                    Child::Node(node) => nodes.push(node),
                    Child::Element(inner) => {
                        return Err(DecodeError::MalformedElement(format!(
                            "<{}> inside <{}>",
                            inner.name, tag.name
                        )));
                    }
                }
            }
        }
        Ok(Text { tag, nodes })
    }

    /// Write to XML writer
    pub fn encode<W: Write>(&self, writer: &mut Writer<W>) -> Result<(), EncodeError> {
        if self.tag.self_closing && self.nodes.is_empty() {
            return self.tag.write_start(writer, true);
        }
        self.tag.write_start(writer, false)?;
        for node in &self.nodes {
            node.write_to(writer)?;
        }
        self.tag.write_end(writer)
    }

    /// Unescaped character data; comments and instructions contribute nothing
    pub fn text(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            match node {
                RawXmlNode::Text(raw) => match unescape(raw) {
                    Ok(text) => out.push_str(&text),
                    Err(_) => out.push_str(raw),
                },
                RawXmlNode::CData(data) => out.push_str(data),
                _ => {}
            }
        }
        out
    }

    /// Replace the whole content with `text`. Leading or trailing whitespace
    /// turns on `xml:space="preserve"`; an existing attribute is never removed.
    pub fn set_text(&mut self, text: &str) {
        self.nodes.clear();
        if !text.is_empty() {
            self.nodes.push(RawXmlNode::Text(partial_escape(text).into_owned()));
            self.tag.self_closing = false;
        }
        let padded = text.starts_with(char::is_whitespace) || text.ends_with(char::is_whitespace);
        if padded && self.tag.attr("space").is_none() {
            self.tag.set_attr("xml:space", "preserve");
        }
    }
}
