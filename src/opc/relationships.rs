//! Relationships handling for OPC packages
//!
//! Parses `.rels` parts, keeping relationships in document order.

use crate::error::{Error, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Collection of relationships
#[derive(Clone, Debug, Default)]
pub struct Relationships {
    items: Vec<Relationship>,
}

/// A single relationship
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Relationship {
    /// Relationship ID (e.g., "rId1")
    pub id: String,
    /// Relationship type URI
    pub rel_type: String,
    /// Target path (relative or absolute)
    pub target: String,
    /// Target mode
    pub target_mode: TargetMode,
}

/// Target mode for relationships
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TargetMode {
    /// Internal target (part within the package)
    #[default]
    Internal,
    /// External target (hyperlink, etc.)
    External,
}

impl Relationships {
    /// Create empty relationships
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from the bytes of a `.rels` part
    pub fn from_bytes(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        let mut rels = Self::new();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Empty(e) | Event::Start(e) => {
                    if e.name().local_name().as_ref() == b"Relationship" {
                        rels.items.push(parse_relationship(&e)?);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(rels)
    }

    /// Get a relationship by ID
    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.items.iter().find(|r| r.id == id)
    }

    /// Get a relationship by type (returns first match)
    pub fn by_type(&self, rel_type: &str) -> Option<&Relationship> {
        self.items.iter().find(|r| r.rel_type == rel_type)
    }

    /// Internal relationships of any of the given types, in document order
    pub fn internal_of_types<'a>(&'a self, types: &'a [&'a str]) -> impl Iterator<Item = &'a Relationship> {
        self.items.iter().filter(move |r| {
            r.target_mode == TargetMode::Internal && types.iter().any(|t| *t == r.rel_type)
        })
    }

    /// Iterate over all relationships
    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.items.iter()
    }

    /// Number of relationships
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Parse a single Relationship element
fn parse_relationship(element: &BytesStart) -> Result<Relationship> {
    let mut id = None;
    let mut rel_type = None;
    let mut target = None;
    let mut target_mode = TargetMode::Internal;

    for attr in element.attributes() {
        let attr = attr?;
        let value = attr.unescape_value()?.into_owned();

        match attr.key.local_name().as_ref() {
            b"Id" => id = Some(value),
            b"Type" => rel_type = Some(value),
            b"Target" => target = Some(value),
            b"TargetMode" => {
                if value == "External" {
                    target_mode = TargetMode::External;
                }
            }
            _ => {}
        }
    }

    let missing = |attr: &str| Error::MissingAttribute {
        element: "Relationship".into(),
        attr: attr.into(),
    };
    Ok(Relationship {
        id: id.ok_or_else(|| missing("Id"))?,
        rel_type: rel_type.ok_or_else(|| missing("Type"))?,
        target: target.ok_or_else(|| missing("Target"))?,
        target_mode,
    })
}

// Well-known relationship types
pub mod rel_types {
    pub const OFFICE_DOCUMENT: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
    pub const HEADER: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/header";
    pub const FOOTER: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/footer";
}

#[cfg(test)]
mod tests {
    use super::*;

    const XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId9" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/footer" Target="footer1.xml"/>
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="https://example.com/?a=1&amp;b=2" TargetMode="External"/>
  <Relationship Id="rId8" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/header" Target="header1.xml"/>
</Relationships>"#;

    #[test]
    fn test_parse_relationships() {
        let rels = Relationships::from_bytes(XML.as_bytes()).unwrap();

        assert_eq!(rels.len(), 3);
        let link = rels.get("rId2").unwrap();
        assert_eq!(link.target, "https://example.com/?a=1&b=2");
        assert_eq!(link.target_mode, TargetMode::External);
        assert_eq!(rels.by_type(rel_types::HEADER).unwrap().id, "rId8");
    }

    #[test]
    fn test_internal_of_types_keeps_order() {
        let rels = Relationships::from_bytes(XML.as_bytes()).unwrap();
        let targets: Vec<_> = rels
            .internal_of_types(&[rel_types::HEADER, rel_types::FOOTER])
            .map(|r| r.target.as_str())
            .collect();
        assert_eq!(targets, ["footer1.xml", "header1.xml"]);
    }

    #[test]
    fn test_missing_target() {
        let xml = br#"<Relationships><Relationship Id="rId1" Type="t"/></Relationships>"#;
        assert!(matches!(
            Relationships::from_bytes(xml),
            Err(Error::MissingAttribute { .. })
        ));
    }
}
