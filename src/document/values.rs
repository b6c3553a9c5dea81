//! Value wrappers for single-element facets (`<w:jc w:val="center"/>` and friends).
//!
//! Each wrapper owns the facet element itself, so attributes the wrapper does
//! not know about stay in place and in order. Accessors read through to the
//! attribute list; setters edit it.

use crate::xml::{parse_on_off, RawXmlElement, RawXmlNode, DEFAULT_PREFIX};

fn qualified(local: &str) -> String {
    format!("{}:{}", DEFAULT_PREFIX, local)
}

/// Facet carrying a string `w:val` (style id, justification, size, ...)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StringValue(RawXmlElement);

impl StringValue {
    /// Create `<w:{local} w:val="{value}"/>`
    pub fn new(local: &str, value: &str) -> Self {
        Self(RawXmlElement::new(qualified(local)).with_attr(&qualified("val"), value))
    }

    /// Wrap an element decoded from a document
    pub fn from_element(element: RawXmlElement) -> Self {
        Self(element)
    }

    /// The `val` attribute
    pub fn value(&self) -> Option<String> {
        self.0.attr("val")
    }

    /// Replace the `val` attribute
    pub fn set_value(&mut self, value: &str) {
        let name = self.0.tag.qualify("val");
        self.0.set_attr(&name, value);
    }

    /// Underlying element
    pub fn element(&self) -> &RawXmlElement {
        &self.0
    }
}

/// Facet carrying an integer or on/off `w:val` (`<w:bidi/>`, `<w:bidi w:val="0"/>`)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IntValue(RawXmlElement);

impl IntValue {
    /// Create `<w:{local} w:val="{value}"/>`
    pub fn new(local: &str, value: i64) -> Self {
        Self(RawXmlElement::new(qualified(local)).with_attr(&qualified("val"), &value.to_string()))
    }

    pub fn from_element(element: RawXmlElement) -> Self {
        Self(element)
    }

    /// Numeric `val`; `None` when absent or not an integer
    pub fn value(&self) -> Option<i64> {
        self.0.attr("val").and_then(|v| v.parse().ok())
    }

    /// Toggle reading: a bare element means on
    pub fn is_on(&self) -> bool {
        parse_on_off(self.0.attr("val").as_deref())
    }

    pub fn set_value(&mut self, value: i64) {
        let name = self.0.tag.qualify("val");
        self.0.set_attr(&name, &value.to_string());
    }

    pub fn element(&self) -> &RawXmlElement {
        &self.0
    }
}

/// Paragraph spacing (`<w:spacing w:before=".." w:after=".." w:line=".." w:lineRule=".."/>`)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpacingValue(RawXmlElement);

impl SpacingValue {
    /// Create an empty `<w:spacing/>`
    pub fn new() -> Self {
        Self(RawXmlElement::new(qualified("spacing")))
    }

    pub fn from_element(element: RawXmlElement) -> Self {
        Self(element)
    }

    pub fn before(&self) -> Option<String> {
        self.0.attr("before")
    }

    pub fn after(&self) -> Option<String> {
        self.0.attr("after")
    }

    pub fn line(&self) -> Option<String> {
        self.0.attr("line")
    }

    pub fn line_rule(&self) -> Option<String> {
        self.0.attr("lineRule")
    }

    pub fn set_before(&mut self, value: &str) {
        self.set("before", value);
    }

    pub fn set_after(&mut self, value: &str) {
        self.set("after", value);
    }

    pub fn set_line(&mut self, value: &str, rule: &str) {
        self.set("line", value);
        self.set("lineRule", rule);
    }

    fn set(&mut self, local: &str, value: &str) {
        let name = self.0.tag.qualify(local);
        self.0.set_attr(&name, value);
    }

    pub fn element(&self) -> &RawXmlElement {
        &self.0
    }
}

impl Default for SpacingValue {
    fn default() -> Self {
        Self::new()
    }
}

/// Indentation (`<w:ind/>`). Values stay strings: they are twips in most
/// documents but may carry units, so they are never reinterpreted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Indentation(RawXmlElement);

impl Indentation {
    pub fn new() -> Self {
        Self(RawXmlElement::new(qualified("ind")))
    }

    pub fn from_element(element: RawXmlElement) -> Self {
        Self(element)
    }

    /// Left indent (`w:left`, or its bidi-neutral alias `w:start`)
    pub fn left(&self) -> Option<String> {
        self.0.attr("left").or_else(|| self.0.attr("start"))
    }

    /// Right indent (`w:right` or `w:end`)
    pub fn right(&self) -> Option<String> {
        self.0.attr("right").or_else(|| self.0.attr("end"))
    }

    pub fn hanging(&self) -> Option<String> {
        self.0.attr("hanging")
    }

    pub fn first_line(&self) -> Option<String> {
        self.0.attr("firstLine")
    }

    pub fn set_left(&mut self, value: &str) {
        let name = self.0.tag.qualify("left");
        self.0.set_attr(&name, value);
    }

    pub fn set_first_line(&mut self, value: &str) {
        let name = self.0.tag.qualify("firstLine");
        self.0.set_attr(&name, value);
    }

    pub fn element(&self) -> &RawXmlElement {
        &self.0
    }
}

impl Default for Indentation {
    fn default() -> Self {
        Self::new()
    }
}

/// A single tab stop
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TabStop {
    /// Alignment kind (`left`, `center`, `decimal`, `clear`, ...)
    pub value: String,
    /// Position in twips, as written
    pub position: String,
}

/// Tab stop list (`<w:tabs><w:tab w:val=".." w:pos=".."/>...</w:tabs>`)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TabStops(RawXmlElement);

impl TabStops {
    pub fn new() -> Self {
        let mut element = RawXmlElement::new(qualified("tabs"));
        element.tag.self_closing = false;
        Self(element)
    }

    pub fn from_element(element: RawXmlElement) -> Self {
        Self(element)
    }

    /// Tab stops in document order
    pub fn tabs(&self) -> Vec<TabStop> {
        self.0
            .elements()
            .filter(|e| e.local_name() == "tab")
            .map(|e| TabStop {
                value: e.attr("val").unwrap_or_default(),
                position: e.attr("pos").unwrap_or_default(),
            })
            .collect()
    }

    /// Append a tab stop
    pub fn push(&mut self, stop: &TabStop) {
        let tab = RawXmlElement::new(self.0.tag.qualify("tab"))
            .with_attr(&self.0.tag.qualify("val"), &stop.value)
            .with_attr(&self.0.tag.qualify("pos"), &stop.position);
        self.0.children.push(RawXmlNode::Element(tab));
    }

    pub fn element(&self) -> &RawXmlElement {
        &self.0
    }
}

impl Default for TabStops {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::XmlTag;

    fn element(name: &str, attrs: &[(&str, &str)]) -> RawXmlElement {
        let mut tag = XmlTag::new(name);
        for (k, v) in attrs {
            tag.set_attr(k, v);
        }
        RawXmlElement {
            tag,
            children: Vec::new(),
        }
    }

    #[test]
    fn test_string_value() {
        let mut jc = StringValue::from_element(element("w:jc", &[("w:val", "center")]));
        assert_eq!(jc.value().as_deref(), Some("center"));
        jc.set_value("both");
        assert_eq!(jc.value().as_deref(), Some("both"));
        assert_eq!(jc.element().tag.attributes(), vec![("w:val".to_string(), "both".to_string())]);

        let created = StringValue::new("pStyle", "Heading1");
        assert_eq!(created.element().name(), "w:pStyle");
        assert_eq!(created.value().as_deref(), Some("Heading1"));
    }

    #[test]
    fn test_int_value_toggle() {
        assert!(IntValue::from_element(element("w:bidi", &[])).is_on());
        let off = IntValue::from_element(element("w:bidi", &[("w:val", "0")]));
        assert!(!off.is_on());
        assert_eq!(off.value(), Some(0));
    }

    #[test]
    fn test_spacing_keeps_unknown_attributes() {
        let mut spacing = SpacingValue::from_element(element(
            "w:spacing",
            &[("w:before", "120"), ("w:beforeAutospacing", "1"), ("w:after", "0")],
        ));
        spacing.set_line("240", "auto");

        assert_eq!(spacing.before().as_deref(), Some("120"));
        assert_eq!(spacing.after().as_deref(), Some("0"));
        assert_eq!(spacing.line_rule().as_deref(), Some("auto"));
        let keys: Vec<_> = spacing
            .element()
            .tag
            .attributes()
            .iter()
            .map(|(k, _)| k.as_str())
            .collect();
        assert_eq!(keys, ["w:before", "w:beforeAutospacing", "w:after", "w:line", "w:lineRule"]);
    }

    #[test]
    fn test_indentation_aliases() {
        let ind = Indentation::from_element(element("w:ind", &[("w:start", "720"), ("w:hanging", "360")]));
        assert_eq!(ind.left().as_deref(), Some("720"));
        assert_eq!(ind.hanging().as_deref(), Some("360"));
        assert_eq!(ind.first_line(), None);
    }

    #[test]
    fn test_tab_stops() {
        let mut tabs = TabStops::new();
        tabs.push(&TabStop {
            value: "right".into(),
            position: "9350".into(),
        });
        assert_eq!(
            tabs.tabs(),
            vec![TabStop {
                value: "right".into(),
                position: "9350".into()
            }]
        );
    }
}
