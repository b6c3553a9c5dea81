//! Table row elements (w:tr)

use crate::document::{decode_container, encode_container, Item};
use crate::error::{DecodeError, EncodeError};
use crate::xml::{RawXmlElement, RawXmlNode, XmlTag};
use quick_xml::{Reader, Writer};
use std::io::{BufRead, Write};

use super::cell::TableCell;

/// Table row (w:tr)
#[derive(Clone, Debug, PartialEq)]
pub struct TableRow {
    pub tag: XmlTag,
    /// Row properties, cells and anything else in source order
    pub children: Vec<Item>,
}

impl TableRow {
    pub const TAG: &'static str = "tr";

    /// Parse from reader
    pub fn decode<R: BufRead>(reader: &mut Reader<R>, tag: XmlTag) -> Result<Self, DecodeError> {
        let (children, _) = decode_container(reader, &tag, None)?;
        Ok(TableRow { tag, children })
    }

    /// Write to XML writer
    pub fn encode<W: Write>(&self, writer: &mut Writer<W>) -> Result<(), EncodeError> {
        encode_container(writer, &self.tag, &self.children, None)
    }

    /// Row properties (w:trPr)
    pub fn properties(&self) -> Option<&RawXmlElement> {
        self.children.iter().find_map(|c| match c {
            Item::Raw(RawXmlNode::Element(e)) if e.local_name() == "trPr" => Some(e),
            _ => None,
        })
    }

    /// Iterate over cells
    pub fn cells(&self) -> impl Iterator<Item = &TableCell> {
        self.children.iter().filter_map(|c| match c {
            Item::TableCell(cell) => Some(cell),
            _ => None,
        })
    }

    /// Iterate over cells mutably
    pub fn cells_mut(&mut self) -> impl Iterator<Item = &mut TableCell> {
        self.children.iter_mut().filter_map(|c| match c {
            Item::TableCell(cell) => Some(cell),
            _ => None,
        })
    }

    /// Get cell by index
    pub fn cell(&self, index: usize) -> Option<&TableCell> {
        self.cells().nth(index)
    }
}
