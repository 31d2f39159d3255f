//! Configuration surface for the resolution pipeline.

use std::path::PathBuf;

use crate::error::Error;

/// Options recognized by [`crate::Localizer`] and the resolution pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalizeOptions {
    /// Orders all-entries enumeration alphabetically by path.
    pub alphabetical_sorting: bool,
    /// Regex patterns selecting embedded resource names. Empty means no
    /// embedded resources are consulted.
    pub embedded_resource_patterns: Vec<String>,
    /// Directory scanned for file resources, if any.
    pub file_resources_directory: Option<PathBuf>,
    /// Enables ancestor-culture fallback when building lookup tables.
    pub include_parent_cultures: bool,
    /// When set, a malformed resource aborts the build instead of being
    /// skipped with a warning.
    pub throw_errors: bool,
    /// Selects the eager, never-recomputing cache provider instead of the
    /// lazy, invalidatable one.
    pub static_cache: bool,
}

impl Default for LocalizeOptions {
    fn default() -> Self {
        LocalizeOptions {
            alphabetical_sorting: true,
            embedded_resource_patterns: Vec::new(),
            file_resources_directory: None,
            include_parent_cultures: false,
            throw_errors: false,
            static_cache: false,
        }
    }
}

impl LocalizeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks the option set is usable: collection arguments are clean and
    /// a configured directory actually exists. Does not require a source to
    /// be configured; the builder checks that once providers are known.
    pub fn validate(&self) -> Result<(), Error> {
        validate_collection("embedded resource patterns", &self.embedded_resource_patterns)?;
        if let Some(dir) = &self.file_resources_directory {
            if !dir.is_dir() {
                return Err(Error::configuration_error(format!(
                    "file resources directory does not exist: {}",
                    dir.display()
                )));
            }
        }
        Ok(())
    }
}

/// Validates a caller-supplied collection argument: empty-or-whitespace and
/// duplicate entries are fatal, with every offending value enumerated. This
/// is caller misconfiguration, never data variability, so it is not gated by
/// `throw_errors`.
pub fn validate_collection(label: &str, values: &[String]) -> Result<(), Error> {
    let mut blank = Vec::new();
    let mut duplicates = Vec::new();
    let mut seen: Vec<&str> = Vec::new();

    for value in values {
        if value.trim().is_empty() {
            blank.push(format!("{:?}", value));
            continue;
        }
        if seen.contains(&value.as_str()) {
            if !duplicates.contains(value) {
                duplicates.push(value.clone());
            }
        } else {
            seen.push(value);
        }
    }

    let mut problems = Vec::new();
    if !blank.is_empty() {
        problems.push(format!(
            "empty or whitespace entries: [{}]",
            blank.join(", ")
        ));
    }
    if !duplicates.is_empty() {
        problems.push(format!("duplicate entries: [{}]", duplicates.join(", ")));
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(Error::validation_error(format!(
            "{label} contains invalid values: {}",
            problems.join("; ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = LocalizeOptions::default();
        assert!(options.alphabetical_sorting);
        assert!(options.embedded_resource_patterns.is_empty());
        assert!(options.file_resources_directory.is_none());
        assert!(!options.include_parent_cultures);
        assert!(!options.throw_errors);
        assert!(!options.static_cache);
    }

    #[test]
    fn test_validate_collection_accepts_clean_input() {
        let values = vec!["App\\.Resources\\..*".to_string(), "Lib\\..*".to_string()];
        assert!(validate_collection("patterns", &values).is_ok());
    }

    #[test]
    fn test_validate_collection_enumerates_blank_entries() {
        let values = vec!["ok".to_string(), "".to_string(), "   ".to_string()];
        let err = validate_collection("patterns", &values).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("patterns"));
        assert!(message.contains("\"\""));
        assert!(message.contains("\"   \""));
    }

    #[test]
    fn test_validate_collection_enumerates_duplicates() {
        let values = vec!["a".to_string(), "b".to_string(), "a".to_string()];
        let err = validate_collection("resource list", &values).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("duplicate entries: [a]"));
    }

    #[test]
    fn test_validate_collection_reports_both_problem_kinds() {
        let values = vec!["a".to_string(), " ".to_string(), "a".to_string()];
        let err = validate_collection("patterns", &values).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("empty or whitespace"));
        assert!(message.contains("duplicate"));
    }

    #[test]
    fn test_options_validate_rejects_missing_directory() {
        let options = LocalizeOptions {
            file_resources_directory: Some(PathBuf::from("/definitely/not/here")),
            ..LocalizeOptions::default()
        };
        match options.validate() {
            Err(Error::Configuration(message)) => {
                assert!(message.contains("/definitely/not/here"));
            }
            other => panic!("expected Configuration error, got {:?}", other),
        }
    }
}
