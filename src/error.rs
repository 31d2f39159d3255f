//! All error types for the locresolve crate.
//!
//! These are returned from all fallible operations (validation, parsing,
//! resolution, cache builds).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("XML parse error: {0}")]
    XmlParse(#[from] quick_xml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid resource `{resource}`: {message}")]
    InvalidResource { resource: String, message: String },

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unknown format `{0}`")]
    UnknownFormat(String),
}

impl Error {
    /// Creates a parse-stage error tagged with the offending resource.
    pub fn invalid_resource(resource: impl Into<String>, message: impl Into<String>) -> Self {
        Error::InvalidResource {
            resource: resource.into(),
            message: message.into(),
        }
    }

    /// Creates a new validation error
    pub fn validation_error(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }

    /// Creates a new configuration error
    pub fn configuration_error(message: impl Into<String>) -> Self {
        Error::Configuration(message.into())
    }

    /// True for errors produced by malformed resource content, as opposed to
    /// I/O, configuration, or caller mistakes. Content validators reject a
    /// resource only on these; everything else propagates.
    pub fn is_content_error(&self) -> bool {
        matches!(
            self,
            Error::Parse(_) | Error::XmlParse(_) | Error::InvalidResource { .. }
        )
    }
}
