//! XML utilities and raw element preservation for round-trip support

mod raw;
mod tag;

pub use raw::{RawXmlElement, RawXmlNode};
pub use tag::XmlTag;

use crate::error::DecodeError;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::BufRead;

/// Prefix used for elements created by this crate (not read from a file)
pub const DEFAULT_PREFIX: &str = "w";

/// Strip the namespace prefix from a qualified name (`w:p` -> `p`)
pub fn local_name(name: &str) -> &str {
    name.rsplit_once(':').map(|(_, local)| local).unwrap_or(name)
}

/// Namespace prefix of a qualified name, if any
pub fn prefix(name: &str) -> Option<&str> {
    name.split_once(':').map(|(prefix, _)| prefix)
}

/// Parse a boolean value from OOXML (handles "1", "true", "on", or missing val)
pub fn parse_on_off(value: Option<&str>) -> bool {
    match value {
        None => true,
        Some(v) => matches!(v, "1" | "true" | "on"),
    }
}

/// One child event of an element being decoded
#[derive(Debug)]
pub enum Child {
    /// Start (or self-closing) tag of a child element
    Element(XmlTag),
    /// Text, comment and other non-element content, kept verbatim
    Node(RawXmlNode),
}

/// Read the next child of the element named `parent`.
///
/// Returns `Ok(None)` once the parent's end tag has been consumed. Running out
/// of input first is an error: a partial element is never accepted.
pub fn next_child<R: BufRead>(
    reader: &mut Reader<R>,
    buf: &mut Vec<u8>,
    parent: &str,
) -> Result<Option<Child>, DecodeError> {
    buf.clear();
    let child = match reader.read_event_into(buf)? {
        Event::Start(e) => Child::Element(XmlTag::from_start(&e, false)?),
        Event::Empty(e) => Child::Element(XmlTag::from_start(&e, true)?),
        Event::End(e) => {
            if e.name().as_ref() == parent.as_bytes() {
                return Ok(None);
            }
            return Err(DecodeError::MalformedElement(format!(
                "expected </{}>, found </{}>",
                parent,
                String::from_utf8_lossy(e.name().as_ref())
            )));
        }
        Event::Text(t) => Child::Node(RawXmlNode::Text(lossy(&t))),
        Event::CData(c) => Child::Node(RawXmlNode::CData(lossy(&c))),
        Event::Comment(c) => Child::Node(RawXmlNode::Comment(lossy(&c))),
        Event::PI(p) => Child::Node(RawXmlNode::Instruction(lossy(&p))),
        Event::Decl(d) => Child::Node(RawXmlNode::Declaration(lossy(&d))),
        Event::DocType(d) => Child::Node(RawXmlNode::DocType(lossy(&d))),
        Event::Eof => return Err(DecodeError::UnexpectedEof(parent.to_string())),
    };
    Ok(Some(child))
}

pub(crate) fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
