//! Placeholder substitution and block expansion over an item tree
//!
//! Blocks are found per sibling list. For the item at position `i`, the first
//! block marker it contains decides what happens:
//!
//! - an opening marker whose `{{end}}` is inside the same paragraph or table
//!   row makes that item the block;
//! - an opening marker whose `{{end}}` is in a later sibling makes the whole
//!   sibling range the block;
//! - tables, cells and other containers whose markers balance inside them
//!   are descended into instead.
//!
//! A block is stripped of its own two markers, cloned once per list element,
//! and each clone is rendered against a scope that has the element pushed on
//! top. Cloning happens before rendering so nested blocks are expanded
//! independently inside every copy.

use crate::document::{Item, ParagraphFacet};
use crate::error::RenderError;
use crate::template::scope::{scalar_text, Lookup, Scope};
use crate::template::syntax::{scan, Delimiters, Directive};
use crate::template::{RenderOptions, RenderReport};
use serde_json::Value;

/// Render `items` in place against `data`
pub fn render_items(
    items: &mut Vec<Item>,
    data: &Value,
    options: &RenderOptions,
) -> Result<RenderReport, RenderError> {
    let mut renderer = Renderer {
        options,
        diagnostics: Vec::new(),
    };
    renderer.render_list(items, &Scope::new(data))?;
    Ok(RenderReport {
        diagnostics: renderer.diagnostics,
    })
}

/// Text left in the document in place of a failed placeholder
pub fn error_marker(err: &RenderError) -> String {
    match err {
        RenderError::UnresolvedBinding { name } => format!("[unresolved: {}]", name),
        RenderError::TypeMismatch { name, .. } => format!("[type mismatch: {}]", name),
        RenderError::UnclosedBlock { name } => format!("[unclosed block: {}]", name),
        RenderError::UnmatchedEnd => "[unmatched end]".to_string(),
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Marker {
    Open(String),
    End,
}

/// Block markers of all paragraphs in `item`, in document order
fn block_markers(item: &Item, delimiters: &Delimiters) -> Vec<Marker> {
    let mut markers = Vec::new();
    for p in item.paragraphs() {
        for token in scan(&p.text(), delimiters) {
            match token.directive {
                Directive::Range(name) => markers.push(Marker::Open(name)),
                Directive::End => markers.push(Marker::End),
                Directive::Field(_) => {}
            }
        }
    }
    markers
}

/// Replace the `ordinal`-th block marker of `item` with `replacement`
fn replace_marker(item: &mut Item, ordinal: usize, replacement: &str, delimiters: &Delimiters) {
    let mut seen = 0;
    for p in item.paragraphs_mut() {
        let spans: Vec<_> = scan(&p.text(), delimiters)
            .into_iter()
            .filter(|t| t.directive.is_block())
            .map(|t| t.span)
            .collect();
        if ordinal < seen + spans.len() {
            let span = spans[ordinal - seen].clone();
            p.replace_text_ranges(&[(span, replacement.to_string())]);
            return;
        }
        seen += spans.len();
    }
}

/// Items that can be a block on their own
fn is_unit(item: &Item) -> bool {
    matches!(item, Item::Paragraph(_) | Item::TableRow(_))
}

/// Elements that hold properties or editor bookkeeping rather than content
const NOT_CONTENT: &[&str] = &[
    "proofErr",
    "lastRenderedPageBreak",
    "trPr",
    "tblPrEx",
    "tcPr",
];

/// Whether anything in the subtree shows up in the document: non-blank text,
/// a drawing, or any element other than properties and proofing marks
fn has_content(item: &Item) -> bool {
    match item {
        Item::Text(t) => !t.text().trim().is_empty(),
        Item::Drawing(_) => true,
        Item::Raw(node) => node
            .element_name()
            .is_some_and(|name| !NOT_CONTENT.contains(&name)),
        _ => item.children().iter().any(has_content),
    }
}

/// A paragraph or row with nothing visible left once its marker is gone
fn is_blank(item: &Item) -> bool {
    if let Item::Paragraph(p) = item {
        let section_break = p.params.as_ref().is_some_and(|params| {
            params
                .facets()
                .iter()
                .any(|f| matches!(f, ParagraphFacet::Other(_)) && f.local_name() == Some("sectPr"))
        });
        if section_break {
            return false;
        }
    }
    is_unit(item) && !has_content(item)
}

struct Renderer<'o> {
    options: &'o RenderOptions,
    diagnostics: Vec<RenderError>,
}

impl Renderer<'_> {
    fn report(&mut self, err: RenderError) -> Result<(), RenderError> {
        log::warn!("template: {}", err);
        if self.options.strict {
            return Err(err);
        }
        self.diagnostics.push(err);
        Ok(())
    }

    fn render_list<'a>(&mut self, items: &mut Vec<Item>, scope: &Scope<'a>) -> Result<(), RenderError> {
        let delimiters = self.options.delimiters.clone();
        let mut i = 0;
        // leading markers of items[i] already reported and left verbatim
        let mut inert = 0;

        while i < items.len() {
            let markers = block_markers(&items[i], &delimiters);
            let unit = is_unit(&items[i]);

            match markers.get(inert).cloned() {
                Some(Marker::End) if unit => {
                    let err = RenderError::UnmatchedEnd;
                    if !self.mark(&mut items[i], inert, &err) {
                        inert += 1;
                    }
                    self.report(err)?;
                    continue;
                }
                Some(Marker::Open(name)) => match find_block_end(items, i, &markers, inert, &delimiters) {
                    Some((j, end)) if j > i || unit => {
                        i = self.expand(items, (i, inert), (j, end), &name, scope)?;
                        inert = 0;
                        continue;
                    }
                    None if unit => {
                        let err = RenderError::UnclosedBlock { name };
                        if !self.mark(&mut items[i], inert, &err) {
                            inert += 1;
                        }
                        self.report(err)?;
                        continue;
                    }
                    _ => {}
                },
                _ => {}
            }

            self.render_item(&mut items[i], scope)?;
            i += 1;
            inert = 0;
        }
        Ok(())
    }

    /// Put the error marker over a failed block marker; `false` when errors
    /// are left unmarked
    fn mark(&self, item: &mut Item, ordinal: usize, err: &RenderError) -> bool {
        if self.options.mark_errors {
            replace_marker(item, ordinal, &error_marker(err), &self.options.delimiters);
        }
        self.options.mark_errors
    }

    /// Expand the block spanning `open.0..=close.0`; returns the index of the
    /// first sibling after the expansion
    fn expand<'a>(
        &mut self,
        items: &mut Vec<Item>,
        open: (usize, usize),
        close: (usize, usize),
        name: &str,
        scope: &Scope<'a>,
    ) -> Result<usize, RenderError> {
        let delimiters = &self.options.delimiters;
        let (i, open_ordinal) = open;
        let (j, end_ordinal) = close;

        let values: &'a [Value] = match scope.lookup(name) {
            Lookup::Found(Value::Array(values)) => values,
            Lookup::Found(Value::Null) => &[],
            found => {
                let err = match found {
                    Lookup::Missing => RenderError::UnresolvedBinding { name: name.to_string() },
                    _ => RenderError::TypeMismatch {
                        name: name.to_string(),
                        expected: "list",
                    },
                };
                if self.options.mark_errors {
                    let marker = error_marker(&err);
                    replace_marker(&mut items[j], end_ordinal, "", delimiters);
                    replace_marker(&mut items[i], open_ordinal, &marker, delimiters);
                }
                self.report(err)?;
                return Ok(j + 1);
            }
        };

        let mut block: Vec<Item> = items.drain(i..=j).collect();
        let last = block.len() - 1;
        replace_marker(&mut block[last], end_ordinal, "", delimiters);
        replace_marker(&mut block[0], open_ordinal, "", delimiters);
        if j > i {
            if block.last().is_some_and(is_blank) {
                block.pop();
            }
            if block.first().is_some_and(is_blank) {
                block.remove(0);
            }
        }

        log::debug!(
            "expanding block '{}': {} item(s) x {}",
            name,
            block.len(),
            values.len()
        );

        let mut expanded = Vec::with_capacity(block.len() * values.len());
        for (index, value) in values.iter().enumerate() {
            let mut copy = block.clone();
            self.render_list(&mut copy, &scope.child(value, index))?;
            expanded.append(&mut copy);
        }

        let count = expanded.len();
        items.splice(i..i, expanded);
        Ok(i + count)
    }

    fn render_item(&mut self, item: &mut Item, scope: &Scope<'_>) -> Result<(), RenderError> {
        match item {
            Item::Paragraph(p) => {
                let mut edits = Vec::new();
                for token in scan(&p.text(), &self.options.delimiters) {
                    let Directive::Field(name) = token.directive else {
                        continue;
                    };
                    match resolve_scalar(scope, name) {
                        Ok(text) => edits.push((token.span, text)),
                        Err(err) => {
                            if self.options.mark_errors {
                                edits.push((token.span, error_marker(&err)));
                            }
                            self.report(err)?;
                        }
                    }
                }
                p.replace_text_ranges(&edits);
                Ok(())
            }
            other => match other.children_mut() {
                Some(children) => self.render_list(children, scope),
                None => Ok(()),
            },
        }
    }
}

fn resolve_scalar(scope: &Scope<'_>, name: String) -> Result<String, RenderError> {
    match scope.lookup(&name) {
        Lookup::Found(value) => scalar_text(value).ok_or(RenderError::TypeMismatch {
            name,
            expected: "scalar",
        }),
        Lookup::Counter(n) => Ok(n.to_string()),
        Lookup::Missing => Err(RenderError::UnresolvedBinding { name }),
    }
}

/// Locate the `{{end}}` matching the opening marker `markers[open]` of
/// `items[i]`: the sibling index and the marker's ordinal within it.
fn find_block_end(
    items: &[Item],
    i: usize,
    markers: &[Marker],
    open: usize,
    delimiters: &Delimiters,
) -> Option<(usize, usize)> {
    let mut depth = 0usize;
    let mut step = |marker: &Marker| {
        match marker {
            Marker::Open(_) => depth += 1,
            Marker::End => depth -= 1,
        }
        depth == 0
    };

    for (k, marker) in markers.iter().enumerate().skip(open) {
        if step(marker) {
            return Some((i, k));
        }
    }
    for (j, item) in items.iter().enumerate().skip(i + 1) {
        for (k, marker) in block_markers(item, delimiters).iter().enumerate() {
            if step(marker) {
                return Some((j, k));
            }
        }
    }
    None
}
