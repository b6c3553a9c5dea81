//! Table elements (w:tbl, w:tr, w:tc)

mod cell;
mod row;

pub use cell::TableCell;
pub use row::TableRow;

use crate::document::{decode_container, encode_container, Item};
use crate::error::{DecodeError, EncodeError};
use crate::xml::{RawXmlElement, RawXmlNode, XmlTag};
use quick_xml::{Reader, Writer};
use std::io::{BufRead, Write};

/// Table element (w:tbl)
///
/// `w:tblPr` and `w:tblGrid` stay raw children in their original position;
/// rows are [`Item::TableRow`].
#[derive(Clone, Debug, PartialEq)]
pub struct Table {
    pub tag: XmlTag,
    pub children: Vec<Item>,
}

impl Table {
    pub const TAG: &'static str = "tbl";

    /// Parse from reader (after w:tbl start tag)
    pub fn decode<R: BufRead>(reader: &mut Reader<R>, tag: XmlTag) -> Result<Self, DecodeError> {
        let (children, _) = decode_container(reader, &tag, None)?;
        Ok(Table { tag, children })
    }

    /// Write to XML writer
    pub fn encode<W: Write>(&self, writer: &mut Writer<W>) -> Result<(), EncodeError> {
        encode_container(writer, &self.tag, &self.children, None)
    }

    /// Table properties (w:tblPr)
    pub fn properties(&self) -> Option<&RawXmlElement> {
        self.raw_child("tblPr")
    }

    /// Column widths from w:tblGrid, as written
    pub fn grid(&self) -> Vec<Option<String>> {
        self.raw_child("tblGrid")
            .map(|grid| {
                grid.elements()
                    .filter(|e| e.local_name() == "gridCol")
                    .map(|e| e.attr("w"))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn raw_child(&self, local: &str) -> Option<&RawXmlElement> {
        self.children.iter().find_map(|c| match c {
            Item::Raw(RawXmlNode::Element(e)) if e.local_name() == local => Some(e),
            _ => None,
        })
    }

    /// Iterate over rows
    pub fn rows(&self) -> impl Iterator<Item = &TableRow> {
        self.children.iter().filter_map(|c| match c {
            Item::TableRow(r) => Some(r),
            _ => None,
        })
    }

    /// Iterate over rows mutably
    pub fn rows_mut(&mut self) -> impl Iterator<Item = &mut TableRow> {
        self.children.iter_mut().filter_map(|c| match c {
            Item::TableRow(r) => Some(r),
            _ => None,
        })
    }

    /// Get row by index
    pub fn row(&self, index: usize) -> Option<&TableRow> {
        self.rows().nth(index)
    }

    /// Get row count
    pub fn row_count(&self) -> usize {
        self.rows().count()
    }

    /// Get column count (based on first row)
    pub fn column_count(&self) -> usize {
        self.rows().next().map(|r| r.cells().count()).unwrap_or(0)
    }

    /// Get cell at position
    pub fn cell(&self, row: usize, col: usize) -> Option<&TableCell> {
        self.row(row)?.cells().nth(col)
    }

    /// Get all text from the table, one line per row, cells separated by tabs
    pub fn text(&self) -> String {
        self.rows()
            .map(|row| row.cells().map(TableCell::text).collect::<Vec<_>>().join("\t"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
