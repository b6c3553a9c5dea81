//! Part URI handling for OPC packages

use crate::error::{Error, Result};
use std::fmt;

/// Represents a URI to a part within an OPC package.
///
/// Part URIs are always absolute paths starting with '/'.
/// Example: `/word/document.xml`
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PartUri {
    path: String,
}

impl PartUri {
    /// Create a new PartUri from a string.
    ///
    /// The path will be normalized (leading '/' ensured, no trailing '/').
    pub fn new(path: &str) -> Result<Self> {
        let path = path.trim();

        if path.is_empty() || path == "/" {
            return Err(Error::InvalidPartUri("empty path".into()));
        }

        let normalized = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{}", path)
        };

        let normalized = normalized.trim_end_matches('/').to_string();

        if normalized.contains("//") {
            return Err(Error::InvalidPartUri(format!(
                "invalid path '{}': contains double slashes",
                path
            )));
        }

        Ok(Self { path: normalized })
    }

    /// Resolve a relationship target of the package itself (`/_rels/.rels`)
    pub fn from_package_target(target: &str) -> Result<Self> {
        resolve_in("", target)
    }

    /// Get the path as a string slice
    pub fn as_str(&self) -> &str {
        &self.path
    }

    /// Path as a zip entry name (no leading '/')
    pub fn zip_name(&self) -> &str {
        &self.path[1..]
    }

    /// Get the file name portion
    pub fn file_name(&self) -> Option<&str> {
        self.path.rsplit('/').next()
    }

    /// Get the file extension
    pub fn extension(&self) -> Option<&str> {
        let name = self.file_name()?;
        let (_, ext) = name.rsplit_once('.')?;
        (!ext.is_empty()).then_some(ext)
    }

    /// Get the parent directory URI
    pub fn parent(&self) -> Option<PartUri> {
        let pos = self.path.rfind('/')?;
        if pos == 0 {
            None
        } else {
            Some(PartUri {
                path: self.path[..pos].to_string(),
            })
        }
    }

    /// Get the relationships URI for this part.
    ///
    /// For `/word/document.xml`, returns `/word/_rels/document.xml.rels`
    pub fn relationships_uri(&self) -> PartUri {
        let file_name = self.file_name().unwrap_or("");
        let parent = self.parent().map(|p| p.path).unwrap_or_default();

        PartUri {
            path: format!("{}/_rels/{}.rels", parent, file_name),
        }
    }

    /// Resolve a relative path against this URI.
    ///
    /// For `/word/document.xml` and `../media/image1.png`, returns `/media/image1.png`
    pub fn resolve(&self, relative: &str) -> Result<PartUri> {
        let base_dir = self.parent().map(|p| p.path).unwrap_or_default();
        resolve_in(&base_dir, relative)
    }
}

fn resolve_in(base_dir: &str, relative: &str) -> Result<PartUri> {
    if relative.starts_with('/') {
        return PartUri::new(relative);
    }

    let mut parts: Vec<&str> = base_dir.split('/').filter(|s| !s.is_empty()).collect();
    for segment in relative.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                parts.pop();
            }
            s => parts.push(s),
        }
    }

    PartUri::new(&format!("/{}", parts.join("/")))
}

impl fmt::Display for PartUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path)
    }
}

impl std::str::FromStr for PartUri {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        PartUri::new(s)
    }
}
