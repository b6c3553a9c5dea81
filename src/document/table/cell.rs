//! Table cell elements (w:tc)

use crate::document::{decode_container, encode_container, Item, Paragraph};
use crate::error::{DecodeError, EncodeError};
use crate::xml::{RawXmlElement, RawXmlNode, XmlTag};
use quick_xml::{Reader, Writer};
use std::io::{BufRead, Write};

/// Table cell (w:tc)
#[derive(Clone, Debug, PartialEq)]
pub struct TableCell {
    pub tag: XmlTag,
    /// Cell properties, paragraphs, nested tables, ...
    pub children: Vec<Item>,
}

impl TableCell {
    pub const TAG: &'static str = "tc";

    /// Parse from reader
    pub fn decode<R: BufRead>(reader: &mut Reader<R>, tag: XmlTag) -> Result<Self, DecodeError> {
        let (children, _) = decode_container(reader, &tag, None)?;
        Ok(TableCell { tag, children })
    }

    /// Write to XML writer
    pub fn encode<W: Write>(&self, writer: &mut Writer<W>) -> Result<(), EncodeError> {
        encode_container(writer, &self.tag, &self.children, None)
    }

    /// Cell properties (w:tcPr)
    pub fn properties(&self) -> Option<&RawXmlElement> {
        self.children.iter().find_map(|c| match c {
            Item::Raw(RawXmlNode::Element(e)) if e.local_name() == "tcPr" => Some(e),
            _ => None,
        })
    }

    /// Horizontal span in grid columns (w:gridSpan)
    pub fn grid_span(&self) -> Option<u32> {
        self.properties()?.find("gridSpan")?.attr("val")?.parse().ok()
    }

    /// Cell width (w:tcW/@w:w), as written
    pub fn width(&self) -> Option<String> {
        self.properties()?.find("tcW")?.attr("w")
    }

    /// Direct child paragraphs
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.children.iter().filter_map(Item::as_paragraph)
    }

    /// Cell text, paragraphs joined with newlines
    pub fn text(&self) -> String {
        self.paragraphs().map(Paragraph::text).collect::<Vec<_>>().join("\n")
    }
}
