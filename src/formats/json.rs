//! JSON-flavored resource format.
//!
//! A document is either a single culture object or an array of them:
//!
//! ```json
//! [
//!   {
//!     "name": "en-US",
//!     "priority": 100,
//!     "entries": { "Title": "Home" },
//!     "nodes": [
//!       { "name": "Account", "entries": { "SignIn": "Sign in" }, "nodes": [] }
//!     ]
//!   }
//! ]
//! ```
//!
//! The schema is strict: any field not recognized above is collected during
//! deserialization and reported as an error after the parse, so a typo like
//! `"prioritty"` fails loudly instead of being silently dropped.
//!
//! Whitespace-only input (and a literal `null` document) is treated the same
//! as empty input: no localizations. This is this format's documented policy;
//! the XML format differs, see [`crate::formats::xml`].

use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use crate::{
    culture,
    error::Error,
    resource::Resource,
    types::{Localization, LocalizationNode},
};

use super::unrecognized_fields;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Document {
    Many(Vec<CultureDoc>),
    One(CultureDoc),
}

#[derive(Debug, Deserialize)]
struct CultureDoc {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    priority: Option<i32>,
    #[serde(default)]
    entries: serde_json::Map<String, Value>,
    #[serde(default)]
    nodes: Vec<NodeDoc>,
    #[serde(flatten)]
    unknown: serde_json::Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct NodeDoc {
    name: String,
    #[serde(default)]
    entries: serde_json::Map<String, Value>,
    #[serde(default)]
    nodes: Vec<NodeDoc>,
    #[serde(flatten)]
    unknown: serde_json::Map<String, Value>,
}

/// Parses a JSON resource into zero or more localizations.
pub fn parse(resource: &Arc<Resource>, raw: &str) -> Result<Vec<Localization>, Error> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }

    let document: Document = serde_json::from_str(trimmed)
        .map_err(|err| Error::invalid_resource(resource.identity(), format!("invalid JSON: {err}")))?;
    let docs = match document {
        Document::Many(docs) => docs,
        Document::One(doc) => vec![doc],
    };

    let mut localizations = Vec::with_capacity(docs.len());
    for doc in docs {
        let mut unknown = Vec::new();
        collect_unknown("", &doc.unknown, &mut unknown);

        if let Some(name) = &doc.name {
            if !culture::is_well_formed(name) {
                tracing::debug!(culture = %name, resource = %resource.identity(),
                    "culture name does not look like a language identifier");
            }
        }

        let mut localization = Localization::new(doc.name, doc.priority);
        fill_node(
            &mut localization.root,
            "",
            doc.entries,
            doc.nodes,
            &mut unknown,
            resource,
        )?;

        if !unknown.is_empty() {
            return Err(unrecognized_fields(resource.as_ref(), &unknown));
        }

        localization.resource = Some(Arc::clone(resource));
        localizations.push(localization);
    }
    Ok(localizations)
}

/// Lightweight well-formedness check; content is discarded.
pub fn check_syntax(raw: &str) -> Result<(), Error> {
    if raw.trim().is_empty() {
        return Ok(());
    }
    serde_json::from_str::<serde::de::IgnoredAny>(raw)?;
    Ok(())
}

fn fill_node(
    node: &mut LocalizationNode,
    path: &str,
    entries: serde_json::Map<String, Value>,
    children: Vec<NodeDoc>,
    unknown: &mut Vec<String>,
    resource: &Arc<Resource>,
) -> Result<(), Error> {
    for (key, value) in entries {
        let Value::String(value) = value else {
            return Err(Error::invalid_resource(
                resource.identity(),
                format!("entry `{}` must be a string value", joined(path, &key)),
            ));
        };
        if !node.try_insert_entry(key.clone(), value) {
            return Err(Error::invalid_resource(
                resource.identity(),
                format!(
                    "entry `{}` collides case-insensitively with an existing key",
                    joined(path, &key)
                ),
            ));
        }
    }

    for child_doc in children {
        let child_path = joined(path, &child_doc.name);
        collect_unknown(&child_path, &child_doc.unknown, unknown);
        let mut child = LocalizationNode::new(child_doc.name.clone());
        fill_node(
            &mut child,
            &child_path,
            child_doc.entries,
            child_doc.nodes,
            unknown,
            resource,
        )?;
        node.nodes.push(child);
    }
    Ok(())
}

fn joined(path: &str, segment: &str) -> String {
    if path.is_empty() {
        segment.to_string()
    } else {
        format!("{}.{}", path, segment)
    }
}

fn collect_unknown(path: &str, fields: &serde_json::Map<String, Value>, out: &mut Vec<String>) {
    for key in fields.keys() {
        out.push(joined(path, key));
    }
}
