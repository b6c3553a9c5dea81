//! Drawing element (w:drawing)
//!
//! The DrawingML subtree is opaque to the model and kept verbatim. Only a
//! few read-only accessors look into it.

use crate::error::{DecodeError, EncodeError};
use crate::xml::{RawXmlElement, XmlTag};
use quick_xml::{Reader, Writer};
use std::io::{BufRead, Write};

/// Inline or anchored drawing inside a run
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Drawing {
    pub element: RawXmlElement,
}

impl Drawing {
    pub const TAG: &'static str = "drawing";

    pub fn decode<R: BufRead>(reader: &mut Reader<R>, tag: XmlTag) -> Result<Self, DecodeError> {
        Ok(Self {
            element: RawXmlElement::decode(reader, tag)?,
        })
    }

    pub fn encode<W: Write>(&self, writer: &mut Writer<W>) -> Result<(), EncodeError> {
        self.element.write_to(writer)
    }

    /// Size in EMUs from `wp:extent` (cx, cy)
    pub fn extent(&self) -> Option<(i64, i64)> {
        let extent = self.element.find_descendant("extent")?;
        let cx = extent.attr("cx")?.parse().ok()?;
        let cy = extent.attr("cy")?.parse().ok()?;
        Some((cx, cy))
    }

    /// Alternative text (`wp:docPr/@descr`)
    pub fn description(&self) -> Option<String> {
        self.element.find_descendant("docPr")?.attr("descr")
    }

    /// Relationship id of the embedded picture (`a:blip/@r:embed`)
    pub fn embed_id(&self) -> Option<String> {
        self.element.find_descendant("blip")?.attr("embed")
    }
}
