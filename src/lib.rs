#![forbid(unsafe_code)]
//! Localized-text resolution for Rust.
//!
//! Discovers localization resources (embedded blobs or files), parses JSON
//! and XML documents into culture-tagged trees, merges them along a culture
//! fallback chain with priority-based precedence, and serves the flattened
//! result through a static or dynamic cache.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use locresolve::{Localizer, LocalizeOptions};
//!
//! let localizer = Localizer::builder()
//!     .options(LocalizeOptions {
//!         include_parent_cultures: true,
//!         ..LocalizeOptions::default()
//!     })
//!     .file_resources_directory("./resources")
//!     .build()?;
//!
//! let greeting = localizer.localize("en-US", "Home.Greeting")?;
//! println!("{}", greeting.value);
//! # Ok::<(), locresolve::Error>(())
//! ```
//!
//! # Resolution model
//!
//! - **Cultures** form a fallback chain: `en-US` → `en` → the invariant
//!   culture `""`. More specific cultures win on colliding paths.
//! - **Priorities** order resources within one culture: no priority loses to
//!   any defined priority, and higher priorities win.
//! - **Paths** are dotted and case-insensitive: `Home.Hero.Caption`.
//! - **Caching** is per requested culture: the static provider resolves
//!   everything eagerly and never recomputes; the dynamic provider builds
//!   lazily, deduplicates concurrent builds, and supports invalidation.

pub mod cache;
pub mod culture;
pub mod error;
pub mod formats;
pub mod locator;
pub mod localizer;
pub mod merge;
pub mod options;
pub mod provider;
pub mod resource;
pub mod types;

// Re-export most used types for easy consumption
pub use crate::{
    cache::{CacheProvider, DynamicCache, StaticCache, TableSource},
    error::Error,
    formats::FormatType,
    localizer::{LocalizedValue, Localizer, LocalizerBuilder},
    locator::{Resolver, ResourceLocator, Validator},
    options::LocalizeOptions,
    provider::{EmbeddedResourceProvider, FileResourceProvider, ResourceProvider},
    resource::{Resource, ResourceOrigin},
    types::{Localization, LocalizationNode, LookupOutcome, LookupTable, ResolvedValue},
};
