//! Error types for linch-docx-template

use thiserror::Error;

/// Failure while turning document XML into an item tree
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("no XML input to decode")]
    MissingSource,

    #[error("unexpected end of input inside <{0}>")]
    UnexpectedEof(String),

    #[error("malformed element: {0}")]
    MalformedElement(String),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("XML attribute error: {0}")]
    XmlAttr(#[from] quick_xml::events::attributes::AttrError),
}

/// Failure while writing an item tree back to XML
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("no package entry to receive encoded part {0}")]
    MissingSink(String),

    #[error("write failure: {0}")]
    WriteFailure(#[from] std::io::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),
}

/// Problem found while binding data into a template.
///
/// These are collected as diagnostics; rendering carries on past them.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RenderError {
    #[error("unresolved binding '{name}'")]
    UnresolvedBinding { name: String },

    #[error("binding '{name}' is not a {expected}")]
    TypeMismatch { name: String, expected: &'static str },

    #[error("block '{name}' has no matching end marker")]
    UnclosedBlock { name: String },

    #[error("end marker without an opening block")]
    UnmatchedEnd,
}

/// Main error type
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("XML attribute error: {0}")]
    XmlAttr(#[from] quick_xml::events::attributes::AttrError),

    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("encode error: {0}")]
    Encode(#[from] EncodeError),

    #[error("render error: {0}")]
    Render(#[from] RenderError),

    #[error("template data error: {0}")]
    Data(#[from] serde_json::Error),

    #[error("Missing required part: {0}")]
    MissingPart(String),

    #[error("Invalid part URI: {0}")]
    InvalidPartUri(String),

    #[error("Missing attribute '{attr}' on element '{element}'")]
    MissingAttribute { element: String, attr: String },
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
