//! Culture name handling: normalization, parent chains, and matching.
//!
//! A culture is a language/region identifier such as `"en-US"` whose parent
//! is `"en"`, bottoming out at the invariant culture `""`. Names that parse
//! as BCP 47 identifiers are recognized as well-formed; everything else is
//! still usable as an opaque label, matched case-insensitively.

use lazy_static::lazy_static;
use regex::Regex;
use unic_langid::LanguageIdentifier;

lazy_static! {
    // Shape of a plausible culture name: language subtag plus optional
    // script/region/variant subtags.
    static ref CULTURE_SHAPE: Regex =
        Regex::new(r"^[A-Za-z]{2,8}(-[A-Za-z0-9]{1,8})*$").unwrap();
}

/// Normalizes a culture name for display: trimmed, underscores replaced by
/// hyphens. Case is preserved; comparisons fold separately.
pub fn normalize(name: &str) -> String {
    name.trim().replace('_', "-")
}

/// True when the name parses as a BCP 47 language identifier, or matches the
/// general subtag shape for labels `unic_langid` does not know.
pub fn is_well_formed(name: &str) -> bool {
    if name.is_empty() {
        return true; // invariant culture
    }
    name.parse::<LanguageIdentifier>().is_ok() || CULTURE_SHAPE.is_match(name)
}

/// The parent of a culture: `"en-US"` → `"en"`, `"en"` → `""` (invariant),
/// and the invariant culture has no parent.
pub fn parent(name: &str) -> Option<String> {
    if name.is_empty() {
        return None;
    }
    match name.rfind('-') {
        Some(idx) => Some(name[..idx].to_string()),
        None => Some(String::new()),
    }
}

/// The fallback chain for a requested culture, most specific first.
///
/// With `include_parents` the chain walks `requested → parent → … → ""`;
/// without it the chain is just the requested culture.
pub fn ancestor_chain(name: &str, include_parents: bool) -> Vec<String> {
    let name = normalize(name);
    if !include_parents {
        return vec![name];
    }
    let mut chain = vec![name];
    while let Some(next) = parent(chain.last().expect("chain is non-empty")) {
        chain.push(next);
    }
    chain
}

/// Exact, case-insensitive culture comparison. No partial or wildcard
/// matching: `"en"` does not match `"en-US"`.
pub fn matches(a: &str, b: &str) -> bool {
    normalize(a).to_lowercase() == normalize(b).to_lowercase()
}
