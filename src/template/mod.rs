//! Template rendering: bind data into a document package
//!
//! A [`Template`] wraps an opened package. The main document part and the
//! headers and footers it references are decoded on first use, rendered with
//! [`render_items`], and encoded back into the package when it is saved.
//! Parts that were never decoded are written back byte for byte.

mod render;
mod scope;
mod syntax;

pub use render::{error_marker, render_items};
pub use syntax::Delimiters;

use crate::codec::{decode_document, encode_document, DocumentPart};
use crate::error::{EncodeError, Error, RenderError, Result};
use crate::opc::{rel_types, Package, PartUri};
use log::debug;
use serde::Serialize;
use std::path::Path;

/// Rendering configuration
#[derive(Clone, Debug)]
pub struct RenderOptions {
    /// Placeholder delimiters, `{{` and `}}` by default
    pub delimiters: Delimiters,
    /// Replace failed placeholders with a visible marker such as
    /// `[unresolved: Name]`. When off they are left as written.
    pub mark_errors: bool,
    /// Fail on the first problem instead of collecting diagnostics
    pub strict: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            delimiters: Delimiters::default(),
            mark_errors: true,
            strict: false,
        }
    }
}

impl RenderOptions {
    pub fn delimiters(mut self, open: impl Into<String>, close: impl Into<String>) -> Self {
        self.delimiters = Delimiters::new(open, close);
        self
    }

    pub fn mark_errors(mut self, mark_errors: bool) -> Self {
        self.mark_errors = mark_errors;
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

/// Problems found while rendering, in document order
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderReport {
    pub diagnostics: Vec<RenderError>,
}

impl RenderReport {
    /// No binding failed
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn merge(&mut self, other: RenderReport) {
        self.diagnostics.extend(other.diagnostics);
    }
}

#[derive(Debug)]
struct TemplatePart {
    uri: PartUri,
    document: Option<DocumentPart>,
}

/// A DOCX template
///
/// # Example
///
/// ```rust,ignore
/// use linch_docx_template::Template;
/// use serde_json::json;
///
/// let mut template = Template::open("invoice.docx")?;
/// let report = template.render(&json!({"FileName": "Q3", "Items": [{"Name": "a"}]}))?;
/// assert!(report.is_clean());
/// template.save("invoice-q3.docx")?;
/// ```
#[derive(Debug)]
pub struct Template {
    package: Package,
    parts: Vec<TemplatePart>,
}

impl Template {
    /// Open a template from a file path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_package(Package::open(path)?)
    }

    /// Open a template from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_package(Package::from_bytes(bytes)?)
    }

    /// Wrap an opened package.
    ///
    /// Fails with [`Error::MissingPart`] when the package has no main
    /// document.
    pub fn from_package(package: Package) -> Result<Self> {
        let main = package.main_document_uri()?;
        let rels = package.relationships_for(&main)?;

        let mut uris = vec![main.clone()];
        for rel in rels.internal_of_types(&[rel_types::HEADER, rel_types::FOOTER]) {
            let uri = main.resolve(&rel.target)?;
            if package.part(&uri).is_some() && !uris.contains(&uri) {
                uris.push(uri);
            }
        }
        debug!("template parts: {:?}", uris.iter().map(PartUri::as_str).collect::<Vec<_>>());

        let parts = uris
            .into_iter()
            .map(|uri| TemplatePart { uri, document: None })
            .collect();
        Ok(Self { package, parts })
    }

    /// The underlying package
    pub fn package(&self) -> &Package {
        &self.package
    }

    /// Parts that take part in rendering: the main document first, then
    /// headers and footers in relationship order
    pub fn part_uris(&self) -> impl Iterator<Item = &PartUri> {
        self.parts.iter().map(|p| &p.uri)
    }

    /// A part's tree, if it has been decoded
    pub fn document(&self, uri: &PartUri) -> Option<&DocumentPart> {
        self.parts
            .iter()
            .find(|p| &p.uri == uri)
            .and_then(|p| p.document.as_ref())
    }

    /// A part's tree, decoding it on first access
    pub fn document_mut(&mut self, uri: &PartUri) -> Result<&mut DocumentPart> {
        let index = self
            .parts
            .iter()
            .position(|p| &p.uri == uri)
            .ok_or_else(|| Error::MissingPart(uri.to_string()))?;
        self.load(index)
    }

    /// The main document tree, decoding it on first access
    pub fn main_document_mut(&mut self) -> Result<&mut DocumentPart> {
        self.load(0)
    }

    /// Render every part with default options
    pub fn render<T: Serialize + ?Sized>(&mut self, data: &T) -> Result<RenderReport> {
        self.render_with(data, &RenderOptions::default())
    }

    /// Render every part.
    ///
    /// Binding problems are collected in the returned report unless
    /// `options.strict` is set, in which case the first one is returned as
    /// [`Error::Render`].
    pub fn render_with<T: Serialize + ?Sized>(
        &mut self,
        data: &T,
        options: &RenderOptions,
    ) -> Result<RenderReport> {
        let value = serde_json::to_value(data)?;
        let mut report = RenderReport::default();

        for index in 0..self.parts.len() {
            let document = self.load(index)?;
            let part_report = render_items(&mut document.items, &value, options)?;
            debug!(
                "rendered {} with {} diagnostics",
                self.parts[index].uri,
                part_report.diagnostics.len()
            );
            report.merge(part_report);
        }

        Ok(report)
    }

    /// Encode every decoded part back into the package
    pub fn flush(&mut self) -> Result<()> {
        for part in &self.parts {
            let Some(document) = &part.document else {
                continue;
            };
            let bytes = encode_document(document)?;
            debug!("encoded {} ({} bytes)", part.uri, bytes.len());
            self.package
                .write_part(&part.uri, bytes)
                .map_err(|_| EncodeError::MissingSink(part.uri.to_string()))?;
        }
        Ok(())
    }

    /// Save to a file
    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.flush()?;
        self.package.save(path)
    }

    /// Save to bytes
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        self.flush()?;
        self.package.to_bytes()
    }

    /// Flush and hand back the package
    pub fn into_package(mut self) -> Result<Package> {
        self.flush()?;
        Ok(self.package)
    }

    fn load(&mut self, index: usize) -> Result<&mut DocumentPart> {
        let part = &mut self.parts[index];
        let document = match part.document.take() {
            Some(document) => document,
            None => {
                let bytes = self
                    .package
                    .read_part(&part.uri)
                    .ok_or_else(|| Error::MissingPart(part.uri.to_string()))?;
                let document = decode_document(bytes)?;
                debug!("decoded {} ({} items)", part.uri, document.items.len());
                document
            }
        };
        Ok(part.document.insert(document))
    }
}
