//! Document model: a closed set of item kinds decoded from WordprocessingML
//!
//! Every node of a document part is an [`Item`]. Kinds the model understands
//! (paragraphs, runs, text, hyperlinks, tables, rows, cells, drawings) get
//! their own variant; everything else is kept as [`Item::Raw`] and written
//! back untouched. Whitespace and comments between elements are raw items
//! too, which is what keeps `encode(decode(x)) == x`.

mod drawing;
mod paragraph;
mod run;
mod table;
mod values;

pub use drawing::Drawing;
pub use paragraph::{Hyperlink, Paragraph, ParagraphFacet, ParagraphParams};
pub use run::{Run, RunParams, Text};
pub use table::{Table, TableCell, TableRow};
pub use values::{Indentation, IntValue, SpacingValue, StringValue, TabStop, TabStops};

use crate::error::{DecodeError, EncodeError};
use crate::xml::{next_child, Child, RawXmlElement, RawXmlNode, XmlTag};
use quick_xml::{Reader, Writer};
use std::io::{BufRead, Write};

/// Discriminator for [`Item`] variants
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ItemKind {
    Paragraph,
    Run,
    Text,
    Hyperlink,
    Table,
    TableRow,
    TableCell,
    Drawing,
    Raw,
}

/// A node in the document tree
#[derive(Clone, Debug, PartialEq)]
pub enum Item {
    /// Paragraph (w:p)
    Paragraph(Paragraph),
    /// Run (w:r)
    Run(Run),
    /// Run text (w:t)
    Text(Text),
    /// Hyperlink (w:hyperlink)
    Hyperlink(Hyperlink),
    /// Table (w:tbl)
    Table(Table),
    /// Table row (w:tr)
    TableRow(TableRow),
    /// Table cell (w:tc)
    TableCell(TableCell),
    /// Drawing (w:drawing)
    Drawing(Drawing),
    /// Anything else, preserved verbatim
    Raw(RawXmlNode),
}

impl Item {
    /// Decode the element whose start tag was just read
    pub fn decode<R: BufRead>(reader: &mut Reader<R>, tag: XmlTag) -> Result<Self, DecodeError> {
        let local = tag.local_name().to_string();
        let item = match local.as_str() {
            Paragraph::TAG => Item::Paragraph(Paragraph::decode(reader, tag)?),
            Run::TAG => Item::Run(Run::decode(reader, tag)?),
            Text::TAG => Item::Text(Text::decode(reader, tag)?),
            Hyperlink::TAG => Item::Hyperlink(Hyperlink::decode(reader, tag)?),
            Table::TAG => Item::Table(Table::decode(reader, tag)?),
            TableRow::TAG => Item::TableRow(TableRow::decode(reader, tag)?),
            TableCell::TAG => Item::TableCell(TableCell::decode(reader, tag)?),
            Drawing::TAG => Item::Drawing(Drawing::decode(reader, tag)?),
            _ => Item::Raw(RawXmlNode::Element(RawXmlElement::decode(reader, tag)?)),
        };
        Ok(item)
    }

    /// Write this item (and its subtree) to XML
    pub fn encode<W: Write>(&self, writer: &mut Writer<W>) -> Result<(), EncodeError> {
        match self {
            Item::Paragraph(p) => p.encode(writer),
            Item::Run(r) => r.encode(writer),
            Item::Text(t) => t.encode(writer),
            Item::Hyperlink(h) => h.encode(writer),
            Item::Table(t) => t.encode(writer),
            Item::TableRow(r) => r.encode(writer),
            Item::TableCell(c) => c.encode(writer),
            Item::Drawing(d) => d.encode(writer),
            Item::Raw(node) => node.write_to(writer),
        }
    }

    /// Local element name of this item; empty for non-element raw nodes
    pub fn tag(&self) -> &str {
        match self {
            Item::Paragraph(_) => Paragraph::TAG,
            Item::Run(_) => Run::TAG,
            Item::Text(_) => Text::TAG,
            Item::Hyperlink(_) => Hyperlink::TAG,
            Item::Table(_) => Table::TAG,
            Item::TableRow(_) => TableRow::TAG,
            Item::TableCell(_) => TableCell::TAG,
            Item::Drawing(_) => Drawing::TAG,
            Item::Raw(node) => node.element_name().unwrap_or(""),
        }
    }

    pub fn kind(&self) -> ItemKind {
        match self {
            Item::Paragraph(_) => ItemKind::Paragraph,
            Item::Run(_) => ItemKind::Run,
            Item::Text(_) => ItemKind::Text,
            Item::Hyperlink(_) => ItemKind::Hyperlink,
            Item::Table(_) => ItemKind::Table,
            Item::TableRow(_) => ItemKind::TableRow,
            Item::TableCell(_) => ItemKind::TableCell,
            Item::Drawing(_) => ItemKind::Drawing,
            Item::Raw(_) => ItemKind::Raw,
        }
    }

    /// Text of all `w:t` descendants, in document order
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    pub(crate) fn collect_text(&self, out: &mut String) {
        match self {
            Item::Text(t) => out.push_str(&t.text()),
            _ => {
                for child in self.children() {
                    child.collect_text(out);
                }
            }
        }
    }

    /// Child items of container kinds; empty for leaves
    pub fn children(&self) -> &[Item] {
        match self {
            Item::Paragraph(p) => &p.children,
            Item::Run(r) => &r.children,
            Item::Hyperlink(h) => &h.children,
            Item::Table(t) => &t.children,
            Item::TableRow(r) => &r.children,
            Item::TableCell(c) => &c.children,
            Item::Text(_) | Item::Drawing(_) | Item::Raw(_) => &[],
        }
    }

    /// Mutable child list of container kinds
    pub fn children_mut(&mut self) -> Option<&mut Vec<Item>> {
        match self {
            Item::Paragraph(p) => Some(&mut p.children),
            Item::Run(r) => Some(&mut r.children),
            Item::Hyperlink(h) => Some(&mut h.children),
            Item::Table(t) => Some(&mut t.children),
            Item::TableRow(r) => Some(&mut r.children),
            Item::TableCell(c) => Some(&mut c.children),
            Item::Text(_) | Item::Drawing(_) | Item::Raw(_) => None,
        }
    }

    /// All paragraphs in this subtree (the item itself if it is one), in document order
    pub fn paragraphs(&self) -> Vec<&Paragraph> {
        let mut out = Vec::new();
        collect_paragraphs(std::slice::from_ref(self), &mut out);
        out
    }

    /// Mutable variant of [`Item::paragraphs`]
    pub fn paragraphs_mut(&mut self) -> Vec<&mut Paragraph> {
        let mut out = Vec::new();
        collect_paragraphs_mut(std::slice::from_mut(self), &mut out);
        out
    }

    pub fn as_paragraph(&self) -> Option<&Paragraph> {
        match self {
            Item::Paragraph(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Item::Table(t) => Some(t),
            _ => None,
        }
    }

    /// Whether this is whitespace-only character data between elements
    pub fn is_whitespace(&self) -> bool {
        matches!(self, Item::Raw(RawXmlNode::Text(t)) if t.trim().is_empty())
    }
}

impl From<Paragraph> for Item {
    fn from(p: Paragraph) -> Self {
        Item::Paragraph(p)
    }
}

impl From<Run> for Item {
    fn from(r: Run) -> Self {
        Item::Run(r)
    }
}

impl From<Table> for Item {
    fn from(t: Table) -> Self {
        Item::Table(t)
    }
}

fn collect_paragraphs<'a>(items: &'a [Item], out: &mut Vec<&'a Paragraph>) {
    for item in items {
        match item {
            Item::Paragraph(p) => out.push(p),
            other => collect_paragraphs(other.children(), out),
        }
    }
}

fn collect_paragraphs_mut<'a>(items: &'a mut [Item], out: &mut Vec<&'a mut Paragraph>) {
    for item in items {
        match item {
            Item::Paragraph(p) => out.push(p),
            other => {
                if let Some(children) = other.children_mut() {
                    collect_paragraphs_mut(children, out);
                }
            }
        }
    }
}

pub(crate) fn collect_texts_mut<'a>(items: &'a mut [Item], out: &mut Vec<&'a mut Text>) {
    for item in items {
        match item {
            Item::Text(t) => out.push(t),
            other => {
                if let Some(children) = other.children_mut() {
                    collect_texts_mut(children, out);
                }
            }
        }
    }
}

/// Decode container children up to the end of `tag`.
///
/// When `params` names a properties element (`pPr`, `rPr`), its first
/// occurrence is returned separately together with the number of children
/// that preceded it, so the encoder can put it back in the same place.
pub(crate) fn decode_container<R: BufRead>(
    reader: &mut Reader<R>,
    tag: &XmlTag,
    params: Option<&str>,
) -> Result<(Vec<Item>, Option<(usize, RawXmlElement)>), DecodeError> {
    let mut items = Vec::new();
    let mut found = None;
    if tag.self_closing {
        return Ok((items, found));
    }

    let mut buf = Vec::new();
    while let Some(child) = next_child(reader, &mut buf, &tag.name)? {
        match child {
            Child::Element(child_tag)
                if found.is_none() && Some(child_tag.local_name()) == params =>
            {
                let element = RawXmlElement::decode(reader, child_tag)?;
                found = Some((items.len(), element));
            }
            Child::Element(child_tag) => items.push(Item::decode(reader, child_tag)?),
            Child::Node(node) => items.push(Item::Raw(node)),
        }
    }

    Ok((items, found))
}

/// Write a container: start tag, children (with the params writer invoked at
/// `slot`), end tag. An element read as `<x/>` stays that way while empty.
pub(crate) fn encode_container<W: Write>(
    writer: &mut Writer<W>,
    tag: &XmlTag,
    children: &[Item],
    params: Option<(usize, &dyn Fn(&mut Writer<W>) -> Result<(), EncodeError>)>,
) -> Result<(), EncodeError> {
    if tag.self_closing && children.is_empty() && params.is_none() {
        return tag.write_start(writer, true);
    }

    tag.write_start(writer, false)?;
    for (index, child) in children.iter().enumerate() {
        if let Some((slot, write_params)) = params {
            if slot == index {
                write_params(writer)?;
            }
        }
        child.encode(writer)?;
    }
    if let Some((slot, write_params)) = params {
        if slot >= children.len() {
            write_params(writer)?;
        }
    }
    tag.write_end(writer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn decode_one(xml: &str) -> Item {
        let mut reader = Reader::from_str(xml);
        let mut buf = Vec::new();
        let Some(Child::Element(tag)) = next_child(&mut reader, &mut buf, "").unwrap() else {
            panic!("expected an element");
        };
        Item::decode(&mut reader, tag).unwrap()
    }

    fn encode_one(item: &Item) -> String {
        let mut writer = Writer::new(Vec::new());
        item.encode(&mut writer).unwrap();
        String::from_utf8(writer.into_inner()).unwrap()
    }

    const TABLE: &str = concat!(
        r#"<w:tbl><w:tblPr><w:tblW w:w="0" w:type="auto"/></w:tblPr>"#,
        r#"<w:tblGrid><w:gridCol w:w="4675"/><w:gridCol w:w="4675"/></w:tblGrid>"#,
        r#"<w:tr w:rsidR="00A1"><w:tc><w:tcPr><w:tcW w:w="4675" w:type="dxa"/></w:tcPr>"#,
        r#"<w:p><w:r><w:t>a</w:t></w:r></w:p></w:tc>"#,
        r#"<w:tc><w:p><w:hyperlink r:id="rId4"><w:r><w:t>b</w:t></w:r></w:hyperlink></w:p></w:tc></w:tr>"#,
        r#"</w:tbl>"#
    );

    #[test]
    fn test_kinds_and_tags() {
        let table = decode_one(TABLE);
        assert_eq!(table.kind(), ItemKind::Table);
        assert_eq!(table.tag(), "tbl");

        let kinds: Vec<_> = table.children().iter().map(Item::kind).collect();
        assert_eq!(kinds, [ItemKind::Raw, ItemKind::Raw, ItemKind::TableRow]);
        assert_eq!(table.children()[0].tag(), "tblPr");

        let row = &table.children()[2];
        assert_eq!(row.children()[0].kind(), ItemKind::TableCell);
    }

    #[test]
    fn test_plain_text_in_order() {
        let table = decode_one(TABLE);
        assert_eq!(table.plain_text(), "ab");
        assert_eq!(table.paragraphs().len(), 2);
        assert_eq!(Item::Raw(RawXmlNode::Text(" ".into())).plain_text(), "");
    }

    #[test]
    fn test_roundtrip_table() {
        assert_eq!(encode_one(&decode_one(TABLE)), TABLE);
    }

    #[test]
    fn test_clone_is_independent() {
        let original = decode_one(TABLE);
        let mut copy = original.clone();

        for p in copy.paragraphs_mut() {
            p.replace_text_ranges(&[(0..1, "changed".to_string())]);
        }
        copy.children_mut().unwrap().remove(0);

        assert_eq!(copy.plain_text(), "changedchanged");
        assert_eq!(original.plain_text(), "ab");
        assert_eq!(encode_one(&original), TABLE);
    }

    #[test]
    fn test_unknown_element_is_raw() {
        let xml = r#"<w:sdt><w:sdtContent><w:p><w:r><w:t>x</w:t></w:r></w:p></w:sdtContent></w:sdt>"#;
        let item = decode_one(xml);
        assert_eq!(item.kind(), ItemKind::Raw);
        assert_eq!(item.tag(), "sdt");
        assert_eq!(encode_one(&item), xml);
    }
}
