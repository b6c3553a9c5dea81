//! Content Types handling for OPC packages
//!
//! Parses `[Content_Types].xml`. The part itself is never rewritten: the
//! package keeps its original bytes.

use crate::error::{Error, Result};
use crate::opc::PartUri;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;

/// Content types definition for an OPC package
#[derive(Clone, Debug, Default)]
pub struct ContentTypes {
    /// Default extension mappings (extension -> content type)
    defaults: HashMap<String, String>,
    /// Override mappings (part URI -> content type)
    overrides: HashMap<PartUri, String>,
}

impl ContentTypes {
    /// Parse from the bytes of `[Content_Types].xml`
    pub fn from_bytes(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        let mut ct = Self::default();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Empty(e) | Event::Start(e) => match e.name().local_name().as_ref() {
                    b"Default" => {
                        let ext = get_attr(&e, "Extension")?;
                        let content_type = get_attr(&e, "ContentType")?;
                        ct.defaults.insert(ext.to_lowercase(), content_type);
                    }
                    b"Override" => {
                        let part_name = get_attr(&e, "PartName")?;
                        let content_type = get_attr(&e, "ContentType")?;
                        let uri = PartUri::new(&part_name)?;
                        ct.overrides.insert(uri, content_type);
                    }
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(ct)
    }

    /// Get the content type for a part
    pub fn get(&self, uri: &PartUri) -> Option<&str> {
        if let Some(ct) = self.overrides.get(uri) {
            return Some(ct);
        }

        uri.extension()
            .and_then(|ext| self.defaults.get(&ext.to_lowercase()))
            .map(|s| s.as_str())
    }

    /// Parts declared with an override matching `pred`
    pub fn find_override(&self, pred: impl Fn(&str) -> bool) -> Option<&PartUri> {
        let mut matches: Vec<&PartUri> = self
            .overrides
            .iter()
            .filter(|(_, ct)| pred(ct))
            .map(|(uri, _)| uri)
            .collect();
        matches.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        matches.into_iter().next()
    }
}

/// Get an attribute value from an XML element
fn get_attr(element: &BytesStart, name: &str) -> Result<String> {
    for attr in element.attributes() {
        let attr = attr?;
        if attr.key.local_name().as_ref() == name.as_bytes() {
            return Ok(attr.unescape_value()?.into_owned());
        }
    }
    Err(Error::MissingAttribute {
        element: String::from_utf8_lossy(element.name().as_ref()).to_string(),
        attr: name.to_string(),
    })
}

/// Main document part of a word-processing package (regular, template,
/// macro-enabled)
pub fn is_main_document(content_type: &str) -> bool {
    matches!(
        content_type,
        MAIN_DOCUMENT | MAIN_TEMPLATE | MAIN_DOCUMENT_MACRO | MAIN_TEMPLATE_MACRO
    )
}

pub const MAIN_DOCUMENT: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";
pub const MAIN_TEMPLATE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.template.main+xml";
pub const MAIN_DOCUMENT_MACRO: &str = "application/vnd.ms-word.document.macroEnabled.main+xml";
pub const MAIN_TEMPLATE_MACRO: &str = "application/vnd.ms-word.template.macroEnabledTemplate.main+xml";
