//! # linch-docx-template
//!
//! DOCX templating for Rust.
//!
//! ## Features
//!
//! - Placeholders (`{{Name}}`, `{{Data.S1}}`) replaced with data from any
//!   `serde::Serialize` value
//! - Repeated table rows and paragraph ranges (`{{range Items}}` ... `{{end}}`)
//! - Byte-faithful round trip: everything not substituted is written back
//!   exactly as it was read, including unknown elements and attributes
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use linch_docx_template::Template;
//! use serde_json::json;
//!
//! let mut template = Template::open("template.docx")?;
//! let report = template.render(&json!({
//!     "FileName": "report",
//!     "Items": [{"Name": "first"}, {"Name": "second"}],
//! }))?;
//! for problem in &report.diagnostics {
//!     eprintln!("{}", problem);
//! }
//! template.save("output.docx")?;
//! ```

pub mod codec;
pub mod document;
pub mod error;
pub mod opc;
pub mod template;
pub mod xml;

pub use codec::{decode_document, encode_document, DocumentPart};
pub use document::{Item, ItemKind, Paragraph, Run, Table};
pub use error::{Error, Result};
pub use opc::{Package, Part, PartUri};
pub use template::{RenderOptions, RenderReport, Template};
