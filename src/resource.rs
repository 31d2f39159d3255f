//! Raw resource artifacts: where localized content comes from before parsing.
//!
//! A [`Resource`] is immutable once located. The locator binds a
//! [`FormatType`] to it after validation; parsing never happens here.

use std::fmt::Display;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use encoding_rs_io::DecodeReaderBytesBuilder;

use crate::{error::Error, formats::FormatType};

/// Where a resource's bytes live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceOrigin {
    /// A named byte blob registered with the process (the analogue of an
    /// assembly-embedded resource).
    Embedded { name: String, bytes: Arc<[u8]> },
    /// A file on disk, read on demand.
    File(PathBuf),
}

/// A readable named artifact plus, once located, its resolved format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    origin: ResourceOrigin,
    format: Option<FormatType>,
}

impl Resource {
    /// Creates an embedded resource from a name and its full content bytes.
    pub fn embedded(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Resource {
            origin: ResourceOrigin::Embedded {
                name: name.into(),
                bytes: bytes.into(),
            },
            format: None,
        }
    }

    /// Creates a file-backed resource. Content is read lazily.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Resource {
            origin: ResourceOrigin::File(path.into()),
            format: None,
        }
    }

    pub fn origin(&self) -> &ResourceOrigin {
        &self.origin
    }

    /// The format bound by the locator, if this resource was accepted.
    pub fn format(&self) -> Option<FormatType> {
        self.format
    }

    /// Returns a copy of this resource with the given format bound.
    pub(crate) fn with_format(&self, format: FormatType) -> Self {
        Resource {
            origin: self.origin.clone(),
            format: Some(format),
        }
    }

    /// Resource identity for diagnostics: the embedded name or the file path.
    pub fn identity(&self) -> String {
        match &self.origin {
            ResourceOrigin::Embedded { name, .. } => name.clone(),
            ResourceOrigin::File(path) => path.display().to_string(),
        }
    }

    /// The name the locator's validators see: embedded name or file name.
    pub fn validation_name(&self) -> String {
        match &self.origin {
            ResourceOrigin::Embedded { name, .. } => name.clone(),
            ResourceOrigin::File(path) => path
                .file_name()
                .and_then(|n| n.to_str())
                .map(str::to_string)
                .unwrap_or_else(|| path.display().to_string()),
        }
    }

    pub fn file_path(&self) -> Option<&Path> {
        match &self.origin {
            ResourceOrigin::File(path) => Some(path),
            ResourceOrigin::Embedded { .. } => None,
        }
    }

    /// Reads the full text content, decoding through a BOM-aware reader so
    /// UTF-8/UTF-16 files produced by various editors all come out as UTF-8.
    pub fn read_to_string(&self) -> Result<String, Error> {
        match &self.origin {
            ResourceOrigin::Embedded { bytes, .. } => decode_bytes(bytes),
            ResourceOrigin::File(path) => {
                let file = std::fs::File::open(path).map_err(Error::Io)?;
                let mut reader = DecodeReaderBytesBuilder::new()
                    .bom_sniffing(true)
                    .build(file);
                let mut text = String::new();
                reader.read_to_string(&mut text).map_err(Error::Io)?;
                Ok(text)
            }
        }
    }
}

// Shows identity and bound format, used in warnings for skipped resources.
impl Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.format {
            Some(format) => write!(f, "{} ({})", self.identity(), format),
            None => write!(f, "{}", self.identity()),
        }
    }
}

fn decode_bytes(bytes: &[u8]) -> Result<String, Error> {
    let mut reader = DecodeReaderBytesBuilder::new()
        .bom_sniffing(true)
        .build(std::io::Cursor::new(bytes));
    let mut text = String::new();
    reader.read_to_string(&mut text).map_err(Error::Io)?;
    Ok(text)
}
