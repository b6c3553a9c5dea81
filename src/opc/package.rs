//! OPC Package implementation
//!
//! Handles reading and writing DOCX files as ZIP packages. Entries are kept
//! in archive order with their original names and compression, so a package
//! saved without edits lists the same entries as the file it came from.

use crate::error::{Error, Result};
use crate::opc::relationships::rel_types;
use crate::opc::{is_main_document, ContentTypes, Part, PartUri, Relationships};
use log::debug;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek, Write};
use std::path::Path;
use zip::read::ZipArchive;
use zip::write::{SimpleFileOptions, ZipWriter};
use zip::CompressionMethod;

const CONTENT_TYPES: &str = "/[Content_Types].xml";
const PACKAGE_RELS: &str = "/_rels/.rels";

/// An OPC package (ZIP-based container for DOCX, DOTX, DOCM)
#[derive(Debug)]
pub struct Package {
    /// All entries, in archive order
    parts: Vec<Part>,
    /// Package-level relationships (/_rels/.rels)
    relationships: Relationships,
    /// Content types ([Content_Types].xml)
    content_types: ContentTypes,
}

impl Package {
    /// Open a package from a file path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        Self::from_reader(reader)
    }

    /// Open a package from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let cursor = Cursor::new(bytes);
        Self::from_reader(cursor)
    }

    /// Open a package from a reader
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)?;
        let mut parts = Vec::with_capacity(archive.len());

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            let name = file.name().to_string();
            let compression = file.compression();

            let mut data = Vec::new();
            if !file.is_dir() {
                file.read_to_end(&mut data)?;
            }

            let uri = PartUri::new(&name)?;
            parts.push(Part::from_entry(uri, name, data, compression));
        }

        let content_types = parts
            .iter()
            .find(|p| p.uri().as_str() == CONTENT_TYPES)
            .ok_or_else(|| Error::MissingPart("[Content_Types].xml".into()))
            .and_then(|p| ContentTypes::from_bytes(p.data()))?;

        let relationships = match parts.iter().find(|p| p.uri().as_str() == PACKAGE_RELS) {
            Some(part) => Relationships::from_bytes(part.data())?,
            None => Relationships::new(),
        };

        debug!("opened package with {} entries", parts.len());

        Ok(Self {
            parts,
            relationships,
            content_types,
        })
    }

    /// Save the package to a file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        self.write_to(file)
    }

    /// Save the package to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        let cursor = Cursor::new(&mut buf);
        self.write_to(cursor)?;
        Ok(buf)
    }

    /// Write the package to a writer
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<()> {
        let mut zip = ZipWriter::new(writer);

        for part in &self.parts {
            let method = match part.compression() {
                CompressionMethod::Stored => CompressionMethod::Stored,
                _ => CompressionMethod::Deflated,
            };
            let options = SimpleFileOptions::default().compression_method(method);

            if part.is_directory() {
                zip.add_directory(part.name(), options)?;
                continue;
            }
            zip.start_file(part.name(), options)?;
            zip.write_all(part.data())?;
        }

        zip.finish()?;
        Ok(())
    }

    /// Get a part by URI
    pub fn part(&self, uri: &PartUri) -> Option<&Part> {
        self.parts.iter().find(|p| p.uri() == uri)
    }

    /// All entries in archive order
    pub fn parts(&self) -> impl Iterator<Item = &Part> {
        self.parts.iter()
    }

    /// Raw bytes of a part
    pub fn read_part(&self, uri: &PartUri) -> Option<&[u8]> {
        self.part(uri).map(Part::data)
    }

    /// Replace the bytes of an existing part.
    ///
    /// The entry keeps its position and compression.
    pub fn write_part(&mut self, uri: &PartUri, data: Vec<u8>) -> Result<()> {
        let part = self
            .parts
            .iter_mut()
            .find(|p| p.uri() == uri)
            .ok_or_else(|| Error::MissingPart(uri.to_string()))?;
        part.set_data(data);
        Ok(())
    }

    /// Get package-level relationships
    pub fn relationships(&self) -> &Relationships {
        &self.relationships
    }

    /// Relationships of a part, read from its `_rels` entry
    pub fn relationships_for(&self, uri: &PartUri) -> Result<Relationships> {
        match self.read_part(&uri.relationships_uri()) {
            Some(data) => Relationships::from_bytes(data),
            None => Ok(Relationships::new()),
        }
    }

    /// Get content types
    pub fn content_types(&self) -> &ContentTypes {
        &self.content_types
    }

    /// URI of the main document part.
    ///
    /// Follows the officeDocument relationship; falls back to the content
    /// type overrides when the package relationships do not name one.
    pub fn main_document_uri(&self) -> Result<PartUri> {
        if let Some(rel) = self.relationships.by_type(rel_types::OFFICE_DOCUMENT) {
            let uri = PartUri::from_package_target(&rel.target)?;
            if self.part(&uri).is_some() {
                return Ok(uri);
            }
        }

        self.content_types
            .find_override(is_main_document)
            .filter(|uri| self.part(uri).is_some())
            .cloned()
            .ok_or_else(|| Error::MissingPart("main document".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

    const RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

    fn build(entries: &[(&str, &[u8], CompressionMethod)]) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, data, method) in entries {
            let options = SimpleFileOptions::default().compression_method(*method);
            if name.ends_with('/') {
                zip.add_directory(*name, options).unwrap();
            } else {
                zip.start_file(*name, options).unwrap();
                zip.write_all(data).unwrap();
            }
        }
        zip.finish().unwrap().into_inner()
    }

    fn sample() -> Vec<u8> {
        build(&[
            ("[Content_Types].xml", CONTENT_TYPES_XML.as_bytes(), CompressionMethod::Deflated),
            ("_rels/.rels", RELS_XML.as_bytes(), CompressionMethod::Deflated),
            ("word/", b"", CompressionMethod::Stored),
            ("word/document.xml", b"<w:document/>", CompressionMethod::Deflated),
            ("word/media/image1.png", b"\x89PNG", CompressionMethod::Stored),
        ])
    }

    #[test]
    fn test_open_keeps_entry_order() {
        let pkg = Package::from_bytes(&sample()).unwrap();
        let names: Vec<_> = pkg.parts().map(Part::name).collect();
        assert_eq!(
            names,
            ["[Content_Types].xml", "_rels/.rels", "word/", "word/document.xml", "word/media/image1.png"]
        );
        assert_eq!(pkg.main_document_uri().unwrap().as_str(), "/word/document.xml");
    }

    #[test]
    fn test_roundtrip_preserves_entries() {
        let pkg = Package::from_bytes(&sample()).unwrap();
        let pkg2 = Package::from_bytes(&pkg.to_bytes().unwrap()).unwrap();

        let entries = |p: &Package| -> Vec<(String, Vec<u8>, CompressionMethod)> {
            p.parts()
                .map(|part| (part.name().to_string(), part.data().to_vec(), part.compression()))
                .collect()
        };
        assert_eq!(entries(&pkg), entries(&pkg2));
    }

    #[test]
    fn test_read_write_part() {
        let mut pkg = Package::from_bytes(&sample()).unwrap();
        let uri = PartUri::new("/word/document.xml").unwrap();

        assert_eq!(pkg.read_part(&uri), Some(&b"<w:document/>"[..]));
        pkg.write_part(&uri, b"<w:document></w:document>".to_vec()).unwrap();
        assert!(pkg.part(&uri).unwrap().is_modified());

        let pkg2 = Package::from_bytes(&pkg.to_bytes().unwrap()).unwrap();
        assert_eq!(pkg2.read_part(&uri), Some(&b"<w:document></w:document>"[..]));

        let missing = PartUri::new("/word/header9.xml").unwrap();
        assert!(matches!(
            pkg.write_part(&missing, Vec::new()),
            Err(Error::MissingPart(_))
        ));
    }

    #[test]
    fn test_missing_content_types() {
        let bytes = build(&[("word/document.xml", b"<w:document/>", CompressionMethod::Deflated)]);
        assert!(matches!(Package::from_bytes(&bytes), Err(Error::MissingPart(_))));
    }

    #[test]
    fn test_main_document_from_content_types() {
        let bytes = build(&[
            ("[Content_Types].xml", CONTENT_TYPES_XML.as_bytes(), CompressionMethod::Deflated),
            ("word/document.xml", b"<w:document/>", CompressionMethod::Deflated),
        ]);
        let pkg = Package::from_bytes(&bytes).unwrap();
        assert!(pkg.relationships().is_empty());
        assert_eq!(pkg.main_document_uri().unwrap().as_str(), "/word/document.xml");
    }

    #[test]
    fn test_relationships_for_part_without_rels() {
        let pkg = Package::from_bytes(&sample()).unwrap();
        let uri = PartUri::new("/word/document.xml").unwrap();
        assert!(pkg.relationships_for(&uri).unwrap().is_empty());
    }
}
