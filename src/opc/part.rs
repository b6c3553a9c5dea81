//! Part representation for OPC packages

use crate::opc::PartUri;
use zip::CompressionMethod;

/// A zip entry of an OPC package
#[derive(Clone, Debug)]
pub struct Part {
    /// Part URI
    uri: PartUri,
    /// Entry name exactly as stored in the archive
    name: String,
    /// Part data
    data: Vec<u8>,
    /// Compression the entry was stored with
    compression: CompressionMethod,
    /// Whether this part has been modified
    modified: bool,
}

impl Part {
    /// Create a new part
    pub fn new(uri: PartUri, data: Vec<u8>) -> Self {
        let name = uri.zip_name().to_string();
        Self {
            uri,
            name,
            data,
            compression: CompressionMethod::Deflated,
            modified: false,
        }
    }

    /// Create a part from an archive entry
    pub(crate) fn from_entry(uri: PartUri, name: String, data: Vec<u8>, compression: CompressionMethod) -> Self {
        Self {
            uri,
            name,
            data,
            compression,
            modified: false,
        }
    }

    /// Get the part URI
    pub fn uri(&self) -> &PartUri {
        &self.uri
    }

    /// Archive entry name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Directory entries carry no data
    pub fn is_directory(&self) -> bool {
        self.name.ends_with('/')
    }

    /// Get the raw data
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Set the data
    pub fn set_data(&mut self, data: Vec<u8>) {
        self.data = data;
        self.modified = true;
    }

    pub fn compression(&self) -> CompressionMethod {
        self.compression
    }

    /// Check if the part has been modified
    pub fn is_modified(&self) -> bool {
        self.modified
    }
}
