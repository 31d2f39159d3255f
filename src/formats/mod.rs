//! Supported resource formats.
//!
//! Formats are a small closed set selected by the [`FormatType`] tag; each
//! variant implements the same two operations: a lightweight well-formedness
//! check and a full parse into [`Localization`] trees.

pub mod json;
pub mod xml;

use std::{
    fmt::{Display, Formatter},
    str::FromStr,
    sync::Arc,
};

use crate::{error::Error, resource::Resource, types::Localization};

/// Cap on offending keys named in an unrecognized-field diagnostic.
pub(crate) const MAX_REPORTED_FIELDS: usize = 8;

/// Builds the size-bounded diagnostic for configuration-shaped input the
/// schema does not recognize. Shared by both formats so typo reports read
/// the same everywhere.
pub(crate) fn unrecognized_fields(resource: &Resource, fields: &[String]) -> Error {
    let mut sorted: Vec<&str> = fields.iter().map(String::as_str).collect();
    sorted.sort_unstable();
    let listed = &sorted[..sorted.len().min(MAX_REPORTED_FIELDS)];
    let suffix = if fields.len() > MAX_REPORTED_FIELDS {
        format!(" (and {} more)", fields.len() - MAX_REPORTED_FIELDS)
    } else {
        String::new()
    };
    Error::invalid_resource(
        resource.identity(),
        format!("unrecognized fields: [{}]{}", listed.join(", "), suffix),
    )
}

/// The resource formats this crate understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatType {
    /// JSON documents (strict schema, unknown fields rejected).
    Json,
    /// XML documents (`<localization>` elements).
    Xml,
}

impl Display for FormatType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FormatType::Json => write!(f, "json"),
            FormatType::Xml => write!(f, "xml"),
        }
    }
}

impl FromStr for FormatType {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        match s.as_str() {
            "json" => Ok(FormatType::Json),
            "xml" => Ok(FormatType::Xml),
            other => Err(Error::UnknownFormat(other.to_string())),
        }
    }
}

impl FormatType {
    /// The typical file extension for this format, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            FormatType::Json => "json",
            FormatType::Xml => "xml",
        }
    }

    /// Parses raw text into zero or more [`Localization`] trees, setting each
    /// root's resource back-reference to `resource`.
    ///
    /// Empty input yields an empty vec for every format. Whitespace-only
    /// input is format-specific: JSON treats it as absent content, XML treats
    /// it as a structural error (see each format module).
    pub fn parse(
        &self,
        resource: &Arc<Resource>,
        raw: &str,
    ) -> Result<Vec<Localization>, Error> {
        match self {
            FormatType::Json => json::parse(resource, raw),
            FormatType::Xml => xml::parse(resource, raw),
        }
    }

    /// Attempts a lightweight structural parse, discarding all content.
    /// Used by content-based validators to accept or reject a resource.
    pub fn check_syntax(&self, raw: &str) -> Result<(), Error> {
        match self {
            FormatType::Json => json::check_syntax(raw),
            FormatType::Xml => xml::check_syntax(raw),
        }
    }
}
