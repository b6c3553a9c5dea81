//! Paragraph element (w:p)

use crate::document::run::{Run, RunParams};
use crate::document::values::{Indentation, IntValue, SpacingValue, StringValue, TabStops};
use crate::document::{collect_texts_mut, decode_container, encode_container, Item};
use crate::error::{DecodeError, EncodeError};
use crate::xml::{RawXmlElement, RawXmlNode, XmlTag};
use quick_xml::{Reader, Writer};
use std::io::{BufRead, Write};
use std::ops::Range;

/// Schema order of `w:pPr` children, used to place newly added facets
const PPR_ORDER: &[&str] = &[
    "pStyle",
    "keepNext",
    "keepLines",
    "pageBreakBefore",
    "framePr",
    "widowControl",
    "numPr",
    "suppressLineNumbers",
    "pBdr",
    "shd",
    "tabs",
    "suppressAutoHyphens",
    "kinsoku",
    "wordWrap",
    "overflowPunct",
    "topLinePunct",
    "autoSpaceDE",
    "autoSpaceDN",
    "bidi",
    "adjustRightInd",
    "snapToGrid",
    "spacing",
    "ind",
    "contextualSpacing",
    "mirrorIndents",
    "suppressOverlap",
    "jc",
    "textDirection",
    "textAlignment",
    "textboxTightWrap",
    "outlineLvl",
    "divId",
    "cnfStyle",
    "rPr",
    "sectPr",
    "pPrChange",
];

fn schema_rank(local: &str) -> usize {
    PPR_ORDER
        .iter()
        .position(|name| *name == local)
        .unwrap_or(PPR_ORDER.len())
}

/// Paragraph element (w:p)
#[derive(Clone, Debug, PartialEq)]
pub struct Paragraph {
    /// Start tag; its attributes (rsids, paraId, ...) are carried verbatim
    pub tag: XmlTag,
    /// Paragraph properties
    pub params: Option<ParagraphParams>,
    /// Number of children that preceded `w:pPr` in the source
    params_slot: usize,
    /// Paragraph content (runs, hyperlinks, bookmarks, ...)
    pub children: Vec<Item>,
}

/// One child of `w:pPr`
#[derive(Clone, Debug, PartialEq)]
pub enum ParagraphFacet {
    /// Style id (w:pStyle)
    Style(StringValue),
    /// Tab stops (w:tabs)
    Tabs(TabStops),
    /// Spacing (w:spacing)
    Spacing(SpacingValue),
    /// Justification (w:jc)
    Justification(StringValue),
    /// Right-to-left paragraph (w:bidi)
    Bidi(IntValue),
    /// Size (w:sz)
    Size(StringValue),
    /// Run properties of the paragraph mark (w:rPr)
    MarkRunParams(RunParams),
    /// Indentation (w:ind)
    Indentation(Indentation),
    /// Anything else, including whitespace between facets
    Other(RawXmlNode),
}

/// Paragraph properties (w:pPr), kept as an ordered facet list
#[derive(Clone, Debug, PartialEq)]
pub struct ParagraphParams {
    tag: XmlTag,
    facets: Vec<ParagraphFacet>,
}

/// Hyperlink element (w:hyperlink)
#[derive(Clone, Debug, PartialEq)]
pub struct Hyperlink {
    pub tag: XmlTag,
    pub children: Vec<Item>,
}

impl Paragraph {
    pub const TAG: &'static str = "p";

    /// Parse paragraph from reader (after w:p start tag)
    pub fn decode<R: BufRead>(reader: &mut Reader<R>, tag: XmlTag) -> Result<Self, DecodeError> {
        let (children, params) = decode_container(reader, &tag, Some("pPr"))?;
        let (params_slot, params) = match params {
            Some((slot, element)) => (slot, Some(ParagraphParams::from_element(element))),
            None => (0, None),
        };
        Ok(Paragraph {
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
                let write = |w: &mut Writer<W>| params.encode(w);
                let write_params: &dyn Fn(&mut Writer<W>) -> Result<(), EncodeError> = &write;
                encode_container(writer, &self.tag, &self.children, Some((self.params_slot, write_params)))
            }
            None => encode_container(writer, &self.tag, &self.children, None),
        }
    }

    /// Get all text in this paragraph
    pub fn text(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            child.collect_text(&mut out);
        }
        out
    }

    /// Get all runs, including those inside hyperlinks
    pub fn runs(&self) -> Vec<&Run> {
        let mut runs = Vec::new();
        for child in &self.children {
            match child {
                Item::Run(r) => runs.push(r),
                Item::Hyperlink(h) => runs.extend(h.children.iter().filter_map(|c| match c {
                    Item::Run(r) => Some(r),
                    _ => None,
                })),
                _ => {}
            }
        }
        runs
    }

    /// Get style ID
    pub fn style(&self) -> Option<String> {
        self.params.as_ref()?.style()?.value()
    }

    /// Set style
    pub fn set_style(&mut self, style: &str) {
        self.params_mut().set_style(style);
    }

    /// Properties, created empty on first use
    pub fn params_mut(&mut self) -> &mut ParagraphParams {
        let prefix = self.tag.qualify("pPr");
        self.params.get_or_insert_with(|| ParagraphParams::new(&prefix))
    }

    /// Replace byte ranges of [`Paragraph::text`] with new text.
    ///
    /// Ranges are mapped onto the `w:t` elements that hold them. A range that
    /// spans several runs is written into the first run and removed from the
    /// others, so the replacement takes the formatting of the run where the
    /// range starts. Text elements outside every range are not touched.
    /// Ranges must not overlap.
    pub fn replace_text_ranges(&mut self, edits: &[(Range<usize>, String)]) {
        if edits.is_empty() {
            return;
        }

        let mut slots = Vec::new();
        collect_texts_mut(&mut self.children, &mut slots);
        let mut texts: Vec<String> = slots.iter().map(|t| t.text()).collect();

        let mut starts = Vec::with_capacity(texts.len());
        let mut offset = 0;
        for text in &texts {
            starts.push(offset);
            offset += text.len();
        }
        let lens: Vec<usize> = texts.iter().map(String::len).collect();
        let locate = |pos: usize| (0..lens.len()).find(|&i| pos >= starts[i] && pos < starts[i] + lens[i]);

        let mut ordered: Vec<&(Range<usize>, String)> = edits.iter().collect();
        ordered.sort_by_key(|(range, _)| range.start);

        let mut touched = vec![false; texts.len()];
        for (range, replacement) in ordered.into_iter().rev() {
            if range.is_empty() {
                continue;
            }
            let (Some(first), Some(last)) = (locate(range.start), locate(range.end - 1)) else {
                continue;
            };
            let from = range.start - starts[first];
            let to = range.end - starts[last];
            if first == last {
                texts[first].replace_range(from..to, replacement);
            } else {
                texts[first].replace_range(from.., replacement);
                for text in &mut texts[first + 1..last] {
                    text.clear();
                }
                texts[last].replace_range(..to, "");
                for flag in &mut touched[first + 1..=last] {
                    *flag = true;
                }
            }
            touched[first] = true;
        }

        for ((slot, text), touched) in slots.into_iter().zip(texts).zip(touched) {
            if touched {
                slot.set_text(&text);
            }
        }
    }
}

impl ParagraphFacet {
    fn from_node(node: RawXmlNode) -> Self {
        let RawXmlNode::Element(element) = node else {
            return ParagraphFacet::Other(node);
        };
        let local = element.local_name().to_string();
        match local.as_str() {
            "pStyle" => ParagraphFacet::Style(StringValue::from_element(element)),
            "tabs" => ParagraphFacet::Tabs(TabStops::from_element(element)),
            "spacing" => ParagraphFacet::Spacing(SpacingValue::from_element(element)),
            "jc" => ParagraphFacet::Justification(StringValue::from_element(element)),
            "bidi" => ParagraphFacet::Bidi(IntValue::from_element(element)),
            "sz" => ParagraphFacet::Size(StringValue::from_element(element)),
            "rPr" => ParagraphFacet::MarkRunParams(RunParams::from_element(element)),
            "ind" => ParagraphFacet::Indentation(Indentation::from_element(element)),
            _ => ParagraphFacet::Other(RawXmlNode::Element(element)),
        }
    }

    fn element(&self) -> Option<&RawXmlElement> {
        match self {
            ParagraphFacet::Style(v) | ParagraphFacet::Justification(v) | ParagraphFacet::Size(v) => {
                Some(v.element())
            }
            ParagraphFacet::Tabs(v) => Some(v.element()),
            ParagraphFacet::Spacing(v) => Some(v.element()),
            ParagraphFacet::Bidi(v) => Some(v.element()),
            ParagraphFacet::MarkRunParams(v) => Some(v.element()),
            ParagraphFacet::Indentation(v) => Some(v.element()),
            ParagraphFacet::Other(node) => node.as_element(),
        }
    }

    /// Local name of the facet element (`None` for text and comments)
    pub fn local_name(&self) -> Option<&str> {
        self.element().map(RawXmlElement::local_name)
    }

    fn encode<W: Write>(&self, writer: &mut Writer<W>) -> Result<(), EncodeError> {
        match self {
            ParagraphFacet::Other(node) => node.write_to(writer),
            facet => match facet.element() {
                Some(element) => element.write_to(writer),
                None => Ok(()),
            },
        }
    }
}

impl ParagraphParams {
    /// Create an empty `w:pPr` with the given qualified name
    pub fn new(name: &str) -> Self {
        let mut tag = XmlTag::new(name);
        tag.self_closing = false;
        Self {
            tag,
            facets: Vec::new(),
        }
    }

    /// Classify the children of a decoded `w:pPr`
    pub fn from_element(element: RawXmlElement) -> Self {
        Self {
            tag: element.tag,
            facets: element.children.into_iter().map(ParagraphFacet::from_node).collect(),
        }
    }

    /// Facets in document order
    pub fn facets(&self) -> &[ParagraphFacet] {
        &self.facets
    }

    pub fn style(&self) -> Option<&StringValue> {
        self.facets.iter().find_map(|f| match f {
            ParagraphFacet::Style(v) => Some(v),
            _ => None,
        })
    }

    pub fn tabs(&self) -> Option<&TabStops> {
        self.facets.iter().find_map(|f| match f {
            ParagraphFacet::Tabs(v) => Some(v),
            _ => None,
        })
    }

    pub fn spacing(&self) -> Option<&SpacingValue> {
        self.facets.iter().find_map(|f| match f {
            ParagraphFacet::Spacing(v) => Some(v),
            _ => None,
        })
    }

    pub fn justification(&self) -> Option<&StringValue> {
        self.facets.iter().find_map(|f| match f {
            ParagraphFacet::Justification(v) => Some(v),
            _ => None,
        })
    }

    pub fn bidi(&self) -> Option<&IntValue> {
        self.facets.iter().find_map(|f| match f {
            ParagraphFacet::Bidi(v) => Some(v),
            _ => None,
        })
    }

    pub fn size(&self) -> Option<&StringValue> {
        self.facets.iter().find_map(|f| match f {
            ParagraphFacet::Size(v) => Some(v),
            _ => None,
        })
    }

    pub fn mark_run_params(&self) -> Option<&RunParams> {
        self.facets.iter().find_map(|f| match f {
            ParagraphFacet::MarkRunParams(v) => Some(v),
            _ => None,
        })
    }

    pub fn indentation(&self) -> Option<&Indentation> {
        self.facets.iter().find_map(|f| match f {
            ParagraphFacet::Indentation(v) => Some(v),
            _ => None,
        })
    }

    pub fn set_style(&mut self, style: &str) {
        self.set_facet(ParagraphFacet::Style(StringValue::new("pStyle", style)));
    }

    pub fn set_justification(&mut self, jc: &str) {
        self.set_facet(ParagraphFacet::Justification(StringValue::new("jc", jc)));
    }

    pub fn set_spacing(&mut self, spacing: SpacingValue) {
        self.set_facet(ParagraphFacet::Spacing(spacing));
    }

    pub fn set_indentation(&mut self, ind: Indentation) {
        self.set_facet(ParagraphFacet::Indentation(ind));
    }

    pub fn set_tabs(&mut self, tabs: TabStops) {
        self.set_facet(ParagraphFacet::Tabs(tabs));
    }

    pub fn set_bidi(&mut self, on: bool) {
        self.set_facet(ParagraphFacet::Bidi(IntValue::new("bidi", i64::from(on))));
    }

    /// Replace the facet with the same element name in place, or insert it
    /// at its schema position.
    pub fn set_facet(&mut self, facet: ParagraphFacet) {
        let Some(local) = facet.local_name().map(str::to_string) else {
            self.facets.push(facet);
            return;
        };
        if let Some(existing) = self
            .facets
            .iter_mut()
            .find(|f| f.local_name() == Some(local.as_str()))
        {
            *existing = facet;
            return;
        }
        let rank = schema_rank(&local);
        let position = self
            .facets
            .iter()
            .position(|f| f.local_name().is_some_and(|name| schema_rank(name) > rank))
            .unwrap_or(self.facets.len());
        self.facets.insert(position, facet);
    }

    /// Remove a facet by element name
    pub fn remove_facet(&mut self, local: &str) -> Option<ParagraphFacet> {
        let position = self.facets.iter().position(|f| f.local_name() == Some(local))?;
        Some(self.facets.remove(position))
    }

    /// Write to XML writer
    pub fn encode<W: Write>(&self, writer: &mut Writer<W>) -> Result<(), EncodeError> {
        let empty = self.tag.self_closing && self.facets.is_empty();
        self.tag.write_start(writer, empty)?;
        if empty {
            return Ok(());
        }
        for facet in &self.facets {
            facet.encode(writer)?;
        }
        self.tag.write_end(writer)
    }
}

impl Hyperlink {
    pub const TAG: &'static str = "hyperlink";

    /// Parse from reader
    pub fn decode<R: BufRead>(reader: &mut Reader<R>, tag: XmlTag) -> Result<Self, DecodeError> {
        let (children, _) = decode_container(reader, &tag, None)?;
        Ok(Self { tag, children })
    }

    /// Write to XML writer
    pub fn encode<W: Write>(&self, writer: &mut Writer<W>) -> Result<(), EncodeError> {
        encode_container(writer, &self.tag, &self.children, None)
    }

    /// Relationship ID (for external links)
    pub fn r_id(&self) -> Option<String> {
        self.tag.attr("id")
    }

    /// Anchor (for internal links)
    pub fn anchor(&self) -> Option<String> {
        self.tag.attr("anchor")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::{next_child, Child};
    use pretty_assertions::assert_eq;

    fn decode(xml: &str) -> Paragraph {
        let mut reader = Reader::from_str(xml);
        let mut buf = Vec::new();
        let Some(Child::Element(tag)) = next_child(&mut reader, &mut buf, "").unwrap() else {
            panic!("expected an element");
        };
        Paragraph::decode(&mut reader, tag).unwrap()
    }

    fn encode(p: &Paragraph) -> String {
        let mut writer = Writer::new(Vec::new());
        p.encode(&mut writer).unwrap();
        String::from_utf8(writer.into_inner()).unwrap()
    }

    const STYLED: &str = concat!(
        r#"<w:p w:rsidR="00D1" w:rsidRDefault="00D1" w14:paraId="0F1E">"#,
        r#"<w:pPr><w:pStyle w:val="Heading1"/><w:keepNext/>"#,
        r#"<w:tabs><w:tab w:val="left" w:pos="720"/><w:tab w:val="right" w:pos="9350"/></w:tabs>"#,
        r#"<w:spacing w:before="240" w:after="60" w:line="276" w:lineRule="auto"/>"#,
        r#"<w:ind w:left="2136" w:right="1209" w:hanging="882" w:firstLine="223"/>"#,
        r#"<w:jc w:val="center"/><w:rPr><w:b/><w:sz w:val="28"/></w:rPr></w:pPr>"#,
        r#"<w:r w:rsidRPr="00AA"><w:rPr><w:b/></w:rPr><w:t>Hello</w:t></w:r>"#,
        r#"<w:bookmarkStart w:id="0" w:name="_GoBack"/><w:bookmarkEnd w:id="0"/>"#,
        r#"</w:p>"#
    );

    #[test]
    fn test_decode_params() {
        let p = decode(STYLED);
        let params = p.params.as_ref().unwrap();

        assert_eq!(p.style().as_deref(), Some("Heading1"));
        assert_eq!(params.justification().unwrap().value().as_deref(), Some("center"));
        assert_eq!(params.spacing().unwrap().line().as_deref(), Some("276"));
        assert_eq!(params.indentation().unwrap().first_line().as_deref(), Some("223"));
        assert_eq!(params.tabs().unwrap().tabs().len(), 2);
        assert!(params.mark_run_params().unwrap().bold());
        assert!(params.bidi().is_none());
        assert_eq!(p.text(), "Hello");
    }

    #[test]
    fn test_roundtrip_is_exact() {
        assert_eq!(encode(&decode(STYLED)), STYLED);
    }

    #[test]
    fn test_params_position_and_whitespace_preserved() {
        let xml = "<w:p>\n  <w:pPr>\n    <w:jc w:val=\"left\"/>\n  </w:pPr>\n  <w:r><w:t>x</w:t></w:r>\n</w:p>";
        assert_eq!(encode(&decode(xml)), xml);
    }

    #[test]
    fn test_empty_forms() {
        assert_eq!(encode(&decode("<w:p/>")), "<w:p/>");
        assert_eq!(encode(&decode("<w:p></w:p>")), "<w:p></w:p>");
    }

    #[test]
    fn test_set_facet_schema_order() {
        let mut p = decode(r#"<w:p><w:pPr><w:keepNext/><w:rPr><w:i/></w:rPr></w:pPr></w:p>"#);
        p.params_mut().set_justification("right");
        p.set_style("Title");
        p.params_mut().set_justification("both");

        assert_eq!(
            encode(&p),
            concat!(
                r#"<w:p><w:pPr><w:pStyle w:val="Title"/><w:keepNext/><w:jc w:val="both"/>"#,
                r#"<w:rPr><w:i/></w:rPr></w:pPr></w:p>"#
            )
        );
    }

    #[test]
    fn test_absent_facets_stay_absent() {
        let mut p = decode(r#"<w:p><w:r><w:t>x</w:t></w:r></w:p>"#);
        assert!(p.params.is_none());
        p.set_style("Quote");
        assert_eq!(
            encode(&p),
            r#"<w:p><w:pPr><w:pStyle w:val="Quote"/></w:pPr><w:r><w:t>x</w:t></w:r></w:p>"#
        );
    }

    #[test]
    fn test_replace_within_one_run() {
        let mut p = decode(r#"<w:p><w:r><w:t>Dear {{Name}},</w:t></w:r><w:r><w:t>tail</w:t></w:r></w:p>"#);
        p.replace_text_ranges(&[(5..13, "Ann".to_string())]);
        assert_eq!(
            encode(&p),
            r#"<w:p><w:r><w:t>Dear Ann,</w:t></w:r><w:r><w:t>tail</w:t></w:r></w:p>"#
        );
    }

    #[test]
    fn test_replace_across_runs_keeps_first_run_format() {
        let xml = concat!(
            r#"<w:p><w:r><w:rPr><w:b/></w:rPr><w:t xml:space="preserve">Total: {{</w:t></w:r>"#,
            r#"<w:r><w:t>Sum</w:t></w:r><w:r><w:rPr><w:i/></w:rPr><w:t>}} EUR</w:t></w:r></w:p>"#
        );
        let mut p = decode(xml);
        assert_eq!(p.text(), "Total: {{Sum}} EUR");

        p.replace_text_ranges(&[(7..14, "42".to_string())]);
        assert_eq!(p.text(), "Total: 42 EUR");
        assert_eq!(
            encode(&p),
            concat!(
                r#"<w:p><w:r><w:rPr><w:b/></w:rPr><w:t xml:space="preserve">Total: 42</w:t></w:r>"#,
                r#"<w:r><w:t></w:t></w:r><w:r><w:rPr><w:i/></w:rPr><w:t xml:space="preserve"> EUR</w:t></w:r></w:p>"#
            )
        );
    }

    #[test]
    fn test_replace_multiple_ranges_and_escaping() {
        let mut p = decode(r#"<w:p><w:r><w:t>{{a}} &amp; {{b}}</w:t></w:r></w:p>"#);
        assert_eq!(p.text(), "{{a}} & {{b}}");
        p.replace_text_ranges(&[(0..5, "<x>".to_string()), (8..13, "y".to_string())]);
        assert_eq!(encode(&p), r#"<w:p><w:r><w:t>&lt;x&gt; &amp; y</w:t></w:r></w:p>"#);
    }

    #[test]
    fn test_hyperlink_text_and_runs() {
        let p = decode(concat!(
            r#"<w:p><w:r><w:t>See </w:t></w:r>"#,
            r#"<w:hyperlink r:id="rId5" w:history="1"><w:r><w:t>docs</w:t></w:r></w:hyperlink></w:p>"#
        ));
        assert_eq!(p.text(), "See docs");
        assert_eq!(p.runs().len(), 2);
        let Item::Hyperlink(link) = &p.children[1] else {
            panic!("expected hyperlink");
        };
        assert_eq!(link.r_id().as_deref(), Some("rId5"));
        assert_eq!(link.anchor(), None);
    }
}
