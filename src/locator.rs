//! Binding validators to parsers and classifying discovered resources.
//!
//! A [`Resolver`] pairs one validator with one format. The locator tries
//! resolvers in registration order, so when several formats could accept the
//! same name, registration order decides format priority.

use std::path::Path;
use std::sync::Arc;

use crate::{
    error::Error,
    formats::FormatType,
    resource::{Resource, ResourceOrigin},
};

/// How a resolver decides whether a raw resource is acceptable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validator {
    /// Accepts by file extension, case-insensitively. Never opens content.
    Extension(String),
    /// Accepts by attempting a lightweight structural parse of the content,
    /// regardless of name. Only malformed-syntax failures reject; anything
    /// else (I/O, for instance) propagates.
    WellFormed(FormatType),
}

impl Validator {
    /// Extension validator for `.{ext}` names.
    pub fn extension(ext: impl Into<String>) -> Self {
        let ext = ext.into();
        let ext = ext.strip_prefix('.').map(str::to_string).unwrap_or(ext);
        Validator::Extension(ext)
    }

    fn accepts_name(&self, name: &str) -> bool {
        match self {
            Validator::Extension(ext) => {
                let suffix = format!(".{}", ext.to_ascii_lowercase());
                name.to_ascii_lowercase().ends_with(&suffix)
            }
            // Content validators do not look at names at all.
            Validator::WellFormed(_) => true,
        }
    }
}

/// A (validator, parser) pair bound to one resource format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolver {
    pub validator: Validator,
    pub format: FormatType,
}

impl Resolver {
    pub fn new(validator: Validator, format: FormatType) -> Self {
        Resolver { validator, format }
    }
}

/// Classifies candidate resources against an ordered resolver list.
#[derive(Debug, Clone)]
pub struct ResourceLocator {
    resolvers: Vec<Resolver>,
}

impl ResourceLocator {
    pub fn new(resolvers: Vec<Resolver>) -> Self {
        ResourceLocator { resolvers }
    }

    /// The stock resolver set: extension-validated JSON, then XML.
    pub fn default_resolvers() -> Self {
        ResourceLocator::new(vec![
            Resolver::new(Validator::extension("json"), FormatType::Json),
            Resolver::new(Validator::extension("xml"), FormatType::Xml),
        ])
    }

    /// Runs resolvers against an embedded resource. First acceptance wins.
    /// `None` means no resolver accepted it; that is not an error.
    pub fn valid_embedded_resource(
        &self,
        name: &str,
        bytes: &[u8],
    ) -> Result<Option<FormatType>, Error> {
        // Content checks need a decoded resource; build one lazily so pure
        // extension matching never touches the bytes.
        let mut decoded: Option<String> = None;
        for resolver in &self.resolvers {
            match &resolver.validator {
                Validator::Extension(_) => {
                    if resolver.validator.accepts_name(name) {
                        return Ok(Some(resolver.format));
                    }
                }
                Validator::WellFormed(format) => {
                    if decoded.is_none() {
                        let resource = Resource::embedded(name, bytes);
                        decoded = Some(resource.read_to_string()?);
                    }
                    if syntax_accepts(*format, decoded.as_deref().unwrap_or_default()) {
                        return Ok(Some(resolver.format));
                    }
                }
            }
        }
        Ok(None)
    }

    /// Runs resolvers against a file resource. First acceptance wins.
    pub fn valid_file_resource(&self, path: &Path) -> Result<Option<FormatType>, Error> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        let mut content: Option<String> = None;
        for resolver in &self.resolvers {
            match &resolver.validator {
                Validator::Extension(_) => {
                    if resolver.validator.accepts_name(&name) {
                        return Ok(Some(resolver.format));
                    }
                }
                Validator::WellFormed(format) => {
                    if content.is_none() {
                        // An unreadable file is an I/O failure, not a
                        // validation rejection; it propagates.
                        content = Some(Resource::file(path).read_to_string()?);
                    }
                    if syntax_accepts(*format, content.as_deref().unwrap_or_default()) {
                        return Ok(Some(resolver.format));
                    }
                }
            }
        }
        Ok(None)
    }

    /// Classifies a batch of discovered resources, binding the winning
    /// format to each. Resources no resolver accepts are silently excluded
    /// from the result.
    pub fn classify(&self, resources: Vec<Resource>) -> Result<Vec<Arc<Resource>>, Error> {
        let mut classified = Vec::with_capacity(resources.len());
        for resource in resources {
            let format = match resource.origin() {
                ResourceOrigin::File(path) => self.valid_file_resource(path)?,
                ResourceOrigin::Embedded { name, bytes } => {
                    self.valid_embedded_resource(name, bytes)?
                }
            };
            match format {
                Some(format) => classified.push(Arc::new(resource.with_format(format))),
                None => {
                    tracing::debug!(resource = %resource.identity(),
                        "no resolver accepted resource, excluding");
                }
            }
        }
        Ok(classified)
    }
}

// Reading the content can fail with I/O errors, which propagate from the
// callers above; by the time the text is in memory every check_syntax
// failure is a content rejection.
fn syntax_accepts(format: FormatType, content: &str) -> bool {
    format.check_syntax(content).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_validator_accepts_by_name_only() {
        let locator = ResourceLocator::default_resolvers();
        // Content is irrelevant for extension validation.
        assert_eq!(
            locator
                .valid_embedded_resource("a.json", b"this is not json")
                .unwrap(),
            Some(FormatType::Json)
        );
        assert_eq!(
            locator.valid_embedded_resource("a.XML", b"").unwrap(),
            Some(FormatType::Xml)
        );
        assert_eq!(
            locator.valid_embedded_resource("a.yaml", b"{}").unwrap(),
            None
        );
    }

    #[test]
    fn test_extension_validator_rejects_wrong_extension() {
        let locator = ResourceLocator::new(vec![Resolver::new(
            Validator::extension(".json"),
            FormatType::Json,
        )]);
        assert_eq!(
            locator.valid_embedded_resource("a.json", b"{}").unwrap(),
            Some(FormatType::Json)
        );
        assert_eq!(locator.valid_embedded_resource("a.xml", b"{}").unwrap(), None);
    }

    #[test]
    fn test_well_formed_validator_judges_content_not_name() {
        let locator = ResourceLocator::new(vec![Resolver::new(
            Validator::WellFormed(FormatType::Json),
            FormatType::Json,
        )]);
        // Valid JSON under any name is accepted.
        assert_eq!(
            locator
                .valid_embedded_resource("странное.dat", br#"{"a": "b"}"#)
                .unwrap(),
            Some(FormatType::Json)
        );
        // Malformed content is rejected, silently.
        assert_eq!(
            locator
                .valid_embedded_resource("notes.json", b"{ broken")
                .unwrap(),
            None
        );
    }

    #[test]
    fn test_first_accepting_resolver_wins() {
        let locator = ResourceLocator::new(vec![
            Resolver::new(Validator::WellFormed(FormatType::Xml), FormatType::Xml),
            Resolver::new(Validator::WellFormed(FormatType::Json), FormatType::Json),
        ]);
        // `<a/>` is valid XML and invalid JSON; registration order decides.
        assert_eq!(
            locator.valid_embedded_resource("r", b"<a/>").unwrap(),
            Some(FormatType::Xml)
        );
        assert_eq!(
            locator.valid_embedded_resource("r", b"[1]").unwrap(),
            Some(FormatType::Json)
        );
    }

    #[test]
    fn test_classify_binds_formats_and_drops_unmatched() {
        let locator = ResourceLocator::default_resolvers();
        let resources = vec![
            Resource::embedded("strings.en.json", &b"{}"[..]),
            Resource::embedded("notes.txt", &b"hello"[..]),
            Resource::embedded("strings.fr.xml", &b"<localizations/>"[..]),
        ];
        let classified = locator.classify(resources).unwrap();
        assert_eq!(classified.len(), 2);
        assert_eq!(classified[0].format(), Some(FormatType::Json));
        assert_eq!(classified[1].format(), Some(FormatType::Xml));
    }

    #[test]
    fn test_missing_file_propagates_io_error_for_content_validation() {
        let locator = ResourceLocator::new(vec![Resolver::new(
            Validator::WellFormed(FormatType::Json),
            FormatType::Json,
        )]);
        match locator.valid_file_resource(Path::new("/no/such/file.json")) {
            Err(Error::Io(_)) => {}
            other => panic!("expected Io error, got {:?}", other),
        }
    }
}
