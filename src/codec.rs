//! Whole-part codec: document, header and footer XML to item trees and back
//!
//! A part is split into an envelope (BOM, prolog, root tag, anything around
//! the body, epilog) and the item sequence the template renderer works on.
//! Both halves are kept in source form, so a part decoded and encoded
//! without edits comes back byte for byte.

use crate::document::{decode_container, encode_container, Item};
use crate::error::{DecodeError, EncodeError};
use crate::xml::{lossy, next_child, Child, RawXmlNode, XmlTag};
use quick_xml::events::Event;
use quick_xml::{Reader, Writer};
use std::io::Write;

const BOM: &[u8] = b"\xEF\xBB\xBF";

/// A decoded XML part
#[derive(Clone, Debug, PartialEq)]
pub struct DocumentPart {
    bom: bool,
    /// Declaration, comments and whitespace before the root element
    pub prolog: Vec<RawXmlNode>,
    /// Root element start tag (`w:document`, `w:hdr`, `w:ftr`, ...)
    pub root: XmlTag,
    /// Root children preceding the body (e.g. `w:background`)
    pub before: Vec<Item>,
    /// Body start tag; `None` for parts whose items sit directly under the root
    pub body: Option<XmlTag>,
    /// Top-level items
    pub items: Vec<Item>,
    /// Root children following the body
    pub after: Vec<Item>,
    /// Whitespace and comments after the root element
    pub epilog: Vec<RawXmlNode>,
}

impl DocumentPart {
    /// Local name of the root element
    pub fn root_name(&self) -> &str {
        self.root.local_name()
    }

    /// Plain text of all items, one line per top-level paragraph or table
    pub fn plain_text(&self) -> String {
        self.items
            .iter()
            .filter(|item| !matches!(item, Item::Raw(_)))
            .map(Item::plain_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Decode a document, header or footer part.
///
/// `w:document` must contain a `w:body`; any other root is treated as a
/// story container whose children are the items.
pub fn decode_document(bytes: &[u8]) -> Result<DocumentPart, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::MissingSource);
    }
    let bom = bytes.starts_with(BOM);
    let xml = if bom { &bytes[BOM.len()..] } else { bytes };

    let mut reader = Reader::from_reader(xml);
    // end tags are matched by the item decoders
    reader.config_mut().check_end_names = false;
    let mut buf = Vec::new();

    let mut prolog = Vec::new();
    let root = loop {
        buf.clear();
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => break XmlTag::from_start(&e, false)?,
            Event::Empty(e) => break XmlTag::from_start(&e, true)?,
            Event::Eof => return Err(DecodeError::UnexpectedEof("document".to_string())),
            Event::End(e) => {
                return Err(DecodeError::MalformedElement(format!(
                    "end tag </{}> before the root element",
                    String::from_utf8_lossy(e.name().as_ref())
                )))
            }
            other => prolog.push(prolog_node(other)?),
        }
    };

    let mut before = Vec::new();
    let mut body = None;
    let mut items = Vec::new();
    let mut after = Vec::new();

    if root.local_name() == "document" {
        if !root.self_closing {
            while let Some(child) = next_child(&mut reader, &mut buf, &root.name)? {
                match child {
                    Child::Element(tag) if body.is_none() && tag.local_name() == "body" => {
                        items = decode_container(&mut reader, &tag, None)?.0;
                        body = Some(tag);
                    }
                    Child::Element(tag) => {
                        let item = Item::decode(&mut reader, tag)?;
                        let around = if body.is_none() { &mut before } else { &mut after };
                        around.push(item);
                    }
                    Child::Node(node) => {
                        let around = if body.is_none() { &mut before } else { &mut after };
                        around.push(Item::Raw(node));
                    }
                }
            }
        }
        if body.is_none() {
            return Err(DecodeError::MalformedElement(format!("<{}> has no body", root.name)));
        }
    } else {
        items = decode_container(&mut reader, &root, None)?.0;
    }

    let mut epilog = Vec::new();
    loop {
        buf.clear();
        match reader.read_event_into(&mut buf)? {
            Event::Eof => break,
            Event::Start(e) | Event::Empty(e) => {
                return Err(DecodeError::MalformedElement(format!(
                    "element <{}> after the root element",
                    String::from_utf8_lossy(e.name().as_ref())
                )))
            }
            Event::End(e) => {
                return Err(DecodeError::MalformedElement(format!(
                    "unmatched end tag </{}>",
                    String::from_utf8_lossy(e.name().as_ref())
                )))
            }
            other => epilog.push(prolog_node(other)?),
        }
    }

    log::debug!(
        "decoded <{}>: {} items, {} bytes",
        root.name,
        items.len(),
        bytes.len()
    );

    Ok(DocumentPart {
        bom,
        prolog,
        root,
        before,
        body,
        items,
        after,
        epilog,
    })
}

/// Non-element content outside the root element
fn prolog_node(event: Event<'_>) -> Result<RawXmlNode, DecodeError> {
    let node = match event {
        Event::Text(t) => RawXmlNode::Text(lossy(&t)),
        Event::CData(c) => RawXmlNode::CData(lossy(&c)),
        Event::Comment(c) => RawXmlNode::Comment(lossy(&c)),
        Event::PI(p) => RawXmlNode::Instruction(lossy(&p)),
        Event::Decl(d) => RawXmlNode::Declaration(lossy(&d)),
        Event::DocType(d) => RawXmlNode::DocType(lossy(&d)),
        Event::Start(_) | Event::Empty(_) | Event::End(_) | Event::Eof => {
            return Err(DecodeError::MalformedElement("unexpected markup outside the root".into()))
        }
    };
    Ok(node)
}

/// Encode a part to bytes
pub fn encode_document(part: &DocumentPart) -> Result<Vec<u8>, EncodeError> {
    let mut out = Vec::new();
    encode_document_to(part, &mut out)?;
    log::debug!("encoded <{}>: {} bytes", part.root.name, out.len());
    Ok(out)
}

/// Encode a part into any writer
pub fn encode_document_to<W: Write>(part: &DocumentPart, out: W) -> Result<(), EncodeError> {
    let mut writer = Writer::new(out);
    if part.bom {
        writer.get_mut().write_all(BOM)?;
    }
    for node in &part.prolog {
        node.write_to(&mut writer)?;
    }

    match &part.body {
        Some(body) => {
            part.root.write_start(&mut writer, false)?;
            for item in &part.before {
                item.encode(&mut writer)?;
            }
            encode_container(&mut writer, body, &part.items, None)?;
            for item in &part.after {
                item.encode(&mut writer)?;
            }
            part.root.write_end(&mut writer)?;
        }
        None => encode_container(&mut writer, &part.root, &part.items, None)?,
    }

    for node in &part.epilog {
        node.write_to(&mut writer)?;
    }
    writer.get_mut().flush()?;
    Ok(())
}
