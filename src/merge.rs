//! Merging parsed localizations into lookup tables.
//!
//! The pipeline: build the requested culture's fallback chain, select the
//! localizations whose culture appears in the chain, order them with the
//! precedence comparator, flatten each tree into dotted paths, and merge so
//! that later (higher-precedence) values overwrite earlier ones.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use crate::{
    culture,
    types::{Localization, LocalizationNode, LookupTable, ResolvedValue, fold},
};

/// The precedence comparator.
///
/// Sorts ascending by precedence so that, after a stable sort, a later
/// position means "wins on collision":
/// - a missing entry sorts before any present entry;
/// - a present entry without a priority sorts before any with one;
/// - entries with priorities order ascending by priority;
/// - everything else compares equal, so a stable sort preserves input order.
pub fn precedence_cmp(a: Option<&Localization>, b: Option<&Localization>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => match (a.priority, b.priority) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(pa), Some(pb)) => pa.cmp(&pb),
        },
    }
}

/// Resolves one requested culture into a complete lookup table.
///
/// Selection is by exact, case-insensitive culture match against the fallback
/// chain; culture-agnostic localizations count as the invariant culture. Zero
/// selected localizations produce an empty table, never an error.
pub fn resolve(
    culture_name: &str,
    available: &[Arc<Localization>],
    include_parent_cultures: bool,
) -> LookupTable {
    let chain = culture::ancestor_chain(culture_name, include_parent_cultures);

    let mut selected: Vec<&Arc<Localization>> = available
        .iter()
        .filter(|loc| {
            chain
                .iter()
                .any(|member| culture::matches(loc.effective_culture(), member))
        })
        .collect();

    // Ancestors must lose to more specific cultures regardless of priority,
    // so order by chain position first (root-most earliest), then by the
    // precedence comparator within one culture. Both sorts are stable.
    let chain_position = |loc: &Localization| -> usize {
        chain
            .iter()
            .rposition(|member| culture::matches(loc.effective_culture(), member))
            .unwrap_or(0)
    };
    selected.sort_by(|a, b| {
        let by_culture = chain_position(b.as_ref()).cmp(&chain_position(a.as_ref()));
        by_culture.then_with(|| precedence_cmp(Some(a.as_ref()), Some(b.as_ref())))
    });

    let mut entries: HashMap<String, ResolvedValue> = HashMap::new();
    for localization in &selected {
        flatten_into(&localization.root, "", localization.as_ref(), &mut entries);
    }

    LookupTable::new(culture::normalize(culture_name), chain, entries)
}

// Depth-first in declared order; later localizations in merge order simply
// overwrite colliding paths.
fn flatten_into(
    node: &LocalizationNode,
    path: &str,
    source: &Localization,
    entries: &mut HashMap<String, ResolvedValue>,
) {
    for (key, value) in node.entries() {
        let full_path = joined(path, key);
        entries.insert(
            fold(&full_path),
            ResolvedValue {
                path: full_path,
                value: value.to_string(),
                culture: source.culture_name.clone(),
                resource: source.resource_identity(),
            },
        );
    }
    for child in &node.nodes {
        let child_path = joined(path, &child.name);
        flatten_into(child, &child_path, source, entries);
    }
}

fn joined(path: &str, segment: &str) -> String {
    if path.is_empty() {
        segment.to_string()
    } else {
        format!("{}.{}", path, segment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::Resource;
    use crate::types::LookupOutcome;
    use proptest::prelude::*;

    fn loc(culture: Option<&str>, priority: Option<i32>) -> Localization {
        Localization::new(culture.map(str::to_string), priority)
    }

    fn loc_with_entry(
        culture: Option<&str>,
        priority: Option<i32>,
        key: &str,
        value: &str,
    ) -> Arc<Localization> {
        let mut localization = loc(culture, priority);
        assert!(localization.root.try_insert_entry(key, value));
        localization.resource = Some(Arc::new(Resource::embedded(
            format!("{}#{:?}", culture.unwrap_or("invariant"), priority),
            &b""[..],
        )));
        Arc::new(localization)
    }

    #[test]
    fn test_comparator_null_before_present() {
        let present = loc(Some("en"), None);
        assert_eq!(precedence_cmp(None, Some(&present)), Ordering::Less);
        assert_eq!(precedence_cmp(Some(&present), None), Ordering::Greater);
        assert_eq!(precedence_cmp(None, None), Ordering::Equal);
    }

    #[test]
    fn test_comparator_absent_priority_before_defined() {
        let absent = loc(Some("en"), None);
        let defined = loc(Some("en"), Some(1));
        assert_eq!(
            precedence_cmp(Some(&absent), Some(&defined)),
            Ordering::Less
        );
        assert_eq!(
            precedence_cmp(Some(&defined), Some(&absent)),
            Ordering::Greater
        );
    }

    #[test]
    fn test_comparator_defined_priorities_ascend() {
        let low = loc(Some("en"), Some(10));
        let high = loc(Some("en"), Some(100));
        assert_eq!(precedence_cmp(Some(&low), Some(&high)), Ordering::Less);
        assert_eq!(
            precedence_cmp(Some(&high), Some(&high)),
            Ordering::Equal
        );
    }

    #[test]
    fn test_comparator_spec_example_ordering() {
        // Labels track original positions; priorities are
        // [null, 100, null, 10, null] and the sorted label order must be
        // 1,2,3,4,5.
        let input = vec![
            ("1", None),
            ("5", Some(100)),
            ("2", None),
            ("4", Some(10)),
            ("3", None),
        ];
        let localizations: Vec<(String, Localization)> = input
            .into_iter()
            .map(|(label, priority)| (label.to_string(), loc(Some("en"), priority)))
            .collect();
        let mut sorted = localizations.iter().collect::<Vec<_>>();
        sorted.sort_by(|a, b| precedence_cmp(Some(&a.1), Some(&b.1)));
        let labels: Vec<&str> = sorted.iter().map(|(label, _)| label.as_str()).collect();
        assert_eq!(labels, vec!["1", "2", "3", "4", "5"]);
    }

    proptest! {
        #[test]
        fn prop_comparator_sorts_nulls_then_absent_then_ascending(
            priorities in proptest::collection::vec(
                proptest::option::of(proptest::option::of(0i32..1000)),
                0..24,
            )
        ) {
            let localizations: Vec<Option<Localization>> = priorities
                .iter()
                .map(|slot| slot.map(|priority| loc(Some("en"), priority)))
                .collect();
            let mut sorted: Vec<(usize, &Option<Localization>)> =
                localizations.iter().enumerate().collect();
            sorted.sort_by(|a, b| precedence_cmp(a.1.as_ref(), b.1.as_ref()));

            // Phase 1: all None entries, in original order. Phase 2: present
            // without priority, in original order. Phase 3: ascending
            // priorities, original order on ties.
            let mut phase = 0;
            let mut last_index_in_phase = 0usize;
            let mut last_priority = i32::MIN;
            for (index, entry) in sorted {
                let entry_phase = match entry {
                    None => 0,
                    Some(l) if l.priority.is_none() => 1,
                    Some(_) => 2,
                };
                prop_assert!(entry_phase >= phase);
                if entry_phase != phase {
                    phase = entry_phase;
                    last_index_in_phase = 0;
                    last_priority = i32::MIN;
                }
                if phase < 2 {
                    prop_assert!(index >= last_index_in_phase);
                    last_index_in_phase = index;
                } else {
                    let priority = entry.as_ref().unwrap().priority.unwrap();
                    prop_assert!(priority >= last_priority);
                    if priority == last_priority {
                        prop_assert!(index >= last_index_in_phase);
                    }
                    last_priority = priority;
                    last_index_in_phase = index;
                }
            }
        }
    }

    #[test]
    fn test_resolve_parent_culture_fallback() {
        let available = vec![
            loc_with_entry(None, None, "AppName", "Demo"),
            loc_with_entry(Some("en"), None, "Greeting", "Hello"),
            loc_with_entry(Some("en-US"), None, "Greeting", "Howdy"),
        ];
        let table = resolve("en-US", &available, true);

        // Key defined only on the invariant culture is still resolvable.
        assert_eq!(table.get("AppName"), Some("Demo"));
        // Key defined on both "en" and "en-US" resolves to the "en-US" value.
        assert_eq!(table.get("Greeting"), Some("Howdy"));

        match table.lookup("Greeting") {
            LookupOutcome::Found(resolved) => {
                assert_eq!(resolved.culture.as_deref(), Some("en-US"));
            }
            LookupOutcome::NotFound { .. } => panic!("expected a hit"),
        }
    }

    #[test]
    fn test_resolve_without_parent_fallback() {
        let available = vec![
            loc_with_entry(None, None, "AppName", "Demo"),
            loc_with_entry(Some("en-US"), None, "Greeting", "Howdy"),
        ];
        let table = resolve("en-US", &available, false);
        assert_eq!(table.get("Greeting"), Some("Howdy"));
        assert_eq!(table.get("AppName"), None);
        assert_eq!(table.searched_cultures(), ["en-US"]);
    }

    #[test]
    fn test_resolve_priority_override_within_culture() {
        let available = vec![
            loc_with_entry(Some("en"), Some(10), "Title", "From priority 10"),
            loc_with_entry(Some("en"), Some(100), "Title", "From priority 100"),
        ];
        let table = resolve("en", &available, false);
        assert_eq!(table.get("Title"), Some("From priority 100"));
    }

    #[test]
    fn test_resolve_defined_priority_beats_absent() {
        let available = vec![
            loc_with_entry(Some("en"), Some(1), "Title", "Prioritized"),
            loc_with_entry(Some("en"), None, "Title", "Unprioritized"),
        ];
        let table = resolve("en", &available, false);
        assert_eq!(table.get("Title"), Some("Prioritized"));
    }

    #[test]
    fn test_resolve_specific_culture_beats_ancestor_priority() {
        // A high-priority parent-culture resource still loses to the
        // requested culture.
        let available = vec![
            loc_with_entry(Some("en"), Some(1000), "Greeting", "Hello"),
            loc_with_entry(Some("en-US"), None, "Greeting", "Howdy"),
        ];
        let table = resolve("en-US", &available, true);
        assert_eq!(table.get("Greeting"), Some("Howdy"));
    }

    #[test]
    fn test_resolve_stable_order_for_equal_precedence() {
        // Same culture, both without priority: input order decides, later
        // input wins on collision.
        let available = vec![
            loc_with_entry(Some("en"), None, "Title", "First"),
            loc_with_entry(Some("en"), None, "Title", "Second"),
        ];
        let table = resolve("en", &available, false);
        assert_eq!(table.get("Title"), Some("Second"));
    }

    #[test]
    fn test_resolve_no_matching_localizations_is_empty() {
        let available = vec![loc_with_entry(Some("fr"), None, "Greeting", "Bonjour")];
        let table = resolve("de-DE", &available, true);
        assert!(table.is_empty());
        assert_eq!(table.culture(), "de-DE");
    }

    #[test]
    fn test_resolve_culture_match_is_exact_not_prefix() {
        // "en" must not match a request for "en-US" when fallback is off.
        let available = vec![loc_with_entry(Some("en"), None, "Greeting", "Hello")];
        let table = resolve("en-US", &available, false);
        assert!(table.is_empty());
    }

    #[test]
    fn test_flatten_nested_paths() {
        let mut localization = loc(Some("en"), None);
        let mut home = LocalizationNode::new("Home");
        let mut inner = LocalizationNode::new("Hero");
        assert!(inner.try_insert_entry("Caption", "Welcome"));
        home.nodes.push(inner);
        assert!(home.try_insert_entry("Title", "Home page"));
        localization.root.nodes.push(home);

        let table = resolve("en", &[Arc::new(localization)], false);
        assert_eq!(table.get("Home.Title"), Some("Home page"));
        assert_eq!(table.get("home.hero.caption"), Some("Welcome"));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_resolve_records_provenance() {
        let available = vec![loc_with_entry(Some("en"), Some(5), "Title", "Hello")];
        let table = resolve("en", &available, false);
        match table.lookup("Title") {
            LookupOutcome::Found(resolved) => {
                assert_eq!(resolved.path, "Title");
                assert_eq!(resolved.culture.as_deref(), Some("en"));
                assert_eq!(resolved.resource.as_deref(), Some("en#Some(5)"));
            }
            LookupOutcome::NotFound { .. } => panic!("expected a hit"),
        }
    }
}
