//! Core, format-agnostic types for locresolve.
//! Parsers decode into these; the merge engine flattens them into lookup tables.

use std::collections::HashMap;
use std::fmt::Display;
use std::sync::Arc;

use crate::resource::Resource;

/// Case-folds a lookup segment, entry key, or culture name.
///
/// All lookup comparisons in the crate go through this one function so that
/// "Home.Welcome" and "home.welcome" address the same entry.
pub(crate) fn fold(s: &str) -> String {
    s.to_lowercase()
}

/// One node of a localization tree: a named segment carrying entries and
/// ordered child nodes.
///
/// Entry keys are unique case-insensitively within a node; child order is
/// preserved because it is the declared document order, but lookups by name
/// are case-insensitive and order-independent.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LocalizationNode {
    /// Segment label. Empty for the synthetic root of a [`Localization`].
    pub name: String,
    entries: Vec<(String, String)>,
    /// Ordered child nodes, in declared document order.
    pub nodes: Vec<LocalizationNode>,
}

impl LocalizationNode {
    pub fn new(name: impl Into<String>) -> Self {
        LocalizationNode {
            name: name.into(),
            entries: Vec::new(),
            nodes: Vec::new(),
        }
    }

    /// Inserts an entry, refusing keys that collide case-insensitively with
    /// an existing one. Returns `false` on collision; the caller decides how
    /// to report it (parsers turn this into a resource-tagged error).
    pub fn try_insert_entry(&mut self, key: impl Into<String>, value: impl Into<String>) -> bool {
        let key = key.into();
        let folded = fold(&key);
        if self.entries.iter().any(|(k, _)| fold(k) == folded) {
            return false;
        }
        self.entries.push((key, value.into()));
        true
    }

    /// Case-insensitive entry lookup.
    pub fn entry(&self, key: &str) -> Option<&str> {
        let folded = fold(key);
        self.entries
            .iter()
            .find(|(k, _)| fold(k) == folded)
            .map(|(_, v)| v.as_str())
    }

    /// Case-insensitive child lookup.
    pub fn node(&self, name: &str) -> Option<&LocalizationNode> {
        let folded = fold(name);
        self.nodes.iter().find(|n| fold(&n.name) == folded)
    }

    /// Entries in insertion order. Order is not significant for lookups.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.nodes.is_empty()
    }
}

/// A parsed localization tree for one culture, sourced from one resource.
///
/// The `priority` field is set at parse time and never changes afterwards;
/// an absent priority sorts before any defined one (lowest precedence tier).
#[derive(Debug, Clone)]
pub struct Localization {
    /// Culture identifier (e.g. "en-US"). `None` means culture-agnostic,
    /// which the merge engine treats as the invariant culture.
    pub culture_name: Option<String>,
    /// Optional override priority among resources contributing to the same
    /// culture; higher wins.
    pub priority: Option<i32>,
    /// Synthetic root; its `name` is empty and does not contribute to paths.
    pub root: LocalizationNode,
    /// Back-reference to the originating resource. Shared, since a single
    /// resource may declare several cultures.
    pub resource: Option<Arc<Resource>>,
}

impl Localization {
    pub fn new(culture_name: Option<String>, priority: Option<i32>) -> Self {
        Localization {
            culture_name,
            priority,
            root: LocalizationNode::default(),
            resource: None,
        }
    }

    /// The culture this localization contributes to, with `None` mapped to
    /// the invariant culture.
    pub fn effective_culture(&self) -> &str {
        self.culture_name.as_deref().unwrap_or("")
    }

    /// Identity of the originating resource, for diagnostics.
    pub fn resource_identity(&self) -> Option<String> {
        self.resource.as_ref().map(|r| r.identity())
    }
}

impl Display for Localization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Localization {{ culture: {:?}, priority: {:?} }}",
            self.culture_name, self.priority
        )
    }
}

/// One resolved value in a [`LookupTable`], with provenance for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedValue {
    /// Fully-qualified dotted path, in original declared casing.
    pub path: String,
    pub value: String,
    /// Culture actually used after fallback. `None` for culture-agnostic
    /// sources.
    pub culture: Option<String>,
    /// Identity of the resource the value came from.
    pub resource: Option<String>,
}

/// Result of probing a [`LookupTable`] for a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome<'a> {
    Found(&'a ResolvedValue),
    /// The path is absent; `searched` lists every culture/path location that
    /// was consulted, for "not found" reporting.
    NotFound { searched: Vec<String> },
}

impl LookupOutcome<'_> {
    pub fn is_found(&self) -> bool {
        matches!(self, LookupOutcome::Found(_))
    }
}

/// The flattened, fallback-resolved, priority-merged map for one requested
/// culture. Immutable once built; cache providers own and share it.
#[derive(Debug, Clone, Default)]
pub struct LookupTable {
    culture: String,
    searched_cultures: Vec<String>,
    entries: HashMap<String, ResolvedValue>,
}

impl LookupTable {
    pub(crate) fn new(
        culture: String,
        searched_cultures: Vec<String>,
        entries: HashMap<String, ResolvedValue>,
    ) -> Self {
        LookupTable {
            culture,
            searched_cultures,
            entries,
        }
    }

    /// The culture this table was resolved for.
    pub fn culture(&self) -> &str {
        &self.culture
    }

    /// The fallback chain consulted while building this table, most specific
    /// first.
    pub fn searched_cultures(&self) -> &[String] {
        &self.searched_cultures
    }

    /// Probes for a dotted path, case-insensitively. A miss is not an error;
    /// it returns the searched-location trail for the caller to format.
    pub fn lookup(&self, path: &str) -> LookupOutcome<'_> {
        match self.entries.get(&fold(path)) {
            Some(resolved) => LookupOutcome::Found(resolved),
            None => LookupOutcome::NotFound {
                searched: self
                    .searched_cultures
                    .iter()
                    .map(|culture| {
                        if culture.is_empty() {
                            format!("invariant:{}", path)
                        } else {
                            format!("{}:{}", culture, path)
                        }
                    })
                    .collect(),
            },
        }
    }

    /// Shorthand returning just the value for a path, if present.
    pub fn get(&self, path: &str) -> Option<&str> {
        self.entries.get(&fold(path)).map(|r| r.value.as_str())
    }

    /// All resolved values. When `alphabetical` is set the result is ordered
    /// by path, case-insensitively; otherwise the order is unspecified.
    pub fn all(&self, alphabetical: bool) -> Vec<&ResolvedValue> {
        let mut values: Vec<&ResolvedValue> = self.entries.values().collect();
        if alphabetical {
            values.sort_by(|a, b| fold(&a.path).cmp(&fold(&b.path)));
        }
        values
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
