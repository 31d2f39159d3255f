//! The top-level orchestrator tying discovery, parsing, merging, and
//! caching together.

use std::sync::Arc;

use crate::{
    cache::{CacheProvider, DynamicCache, StaticCache, TableSource},
    culture,
    error::Error,
    locator::ResourceLocator,
    merge,
    options::LocalizeOptions,
    provider::{EmbeddedResourceProvider, FileResourceProvider, ResourceProvider},
    resource::Resource,
    types::{Localization, LookupOutcome, LookupTable},
};

/// One resolved lookup, whether or not the path was found.
///
/// A miss is not an error: `value` falls back to the requested path and
/// `searched_locations` records every culture-qualified location checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalizedValue {
    /// The dotted path that was requested.
    pub name: String,
    /// The resolved text, or the requested path itself on a miss.
    pub value: String,
    /// Whether the path resolved to an actual entry.
    pub found: bool,
    /// Culture-qualified locations checked, populated on a miss.
    pub searched_locations: Vec<String>,
    /// Effective culture of the winning entry, when found.
    pub culture: Option<String>,
    /// Identity of the resource the winning entry came from, when known.
    pub resource: Option<String>,
}

/// Resolves localized text for requested cultures.
///
/// Construction parses and classifies every discovered resource; lookups
/// afterwards only consult the configured cache provider.
///
/// # Example
///
/// ```rust,no_run
/// use locresolve::{Localizer, LocalizeOptions};
///
/// let localizer = Localizer::builder()
///     .options(LocalizeOptions {
///         include_parent_cultures: true,
///         ..LocalizeOptions::default()
///     })
///     .file_resources_directory("./resources")
///     .build()?;
///
/// let greeting = localizer.localize("en-US", "Home.Greeting")?;
/// println!("{} (found: {})", greeting.value, greeting.found);
/// # Ok::<(), locresolve::Error>(())
/// ```
pub struct Localizer {
    options: LocalizeOptions,
    cache: Box<dyn CacheProvider>,
}

impl Localizer {
    /// Creates a new [`LocalizerBuilder`] with no resource sources.
    pub fn builder() -> LocalizerBuilder {
        LocalizerBuilder::new()
    }

    /// Resolves one dotted path for a culture.
    ///
    /// Returns an error only for infrastructure failures (a failed dynamic
    /// table build, an ill-formed culture name); a missing path resolves to
    /// a not-found [`LocalizedValue`].
    pub fn localize(&self, culture_name: &str, name: &str) -> Result<LocalizedValue, Error> {
        let table = self.lookup_table(culture_name)?;
        Ok(match table.lookup(name) {
            LookupOutcome::Found(resolved) => LocalizedValue {
                name: name.to_string(),
                value: resolved.value.clone(),
                found: true,
                searched_locations: Vec::new(),
                culture: resolved.culture.clone(),
                resource: resolved.resource.clone(),
            },
            LookupOutcome::NotFound { searched } => LocalizedValue {
                name: name.to_string(),
                value: name.to_string(),
                found: false,
                searched_locations: searched,
                culture: None,
                resource: None,
            },
        })
    }

    /// Every entry resolvable for a culture, ordered alphabetically by path
    /// when `alphabetical_sorting` is set and in merge order otherwise.
    pub fn all_values(&self, culture_name: &str) -> Result<Vec<LocalizedValue>, Error> {
        let table = self.lookup_table(culture_name)?;
        Ok(table
            .all(self.options.alphabetical_sorting)
            .into_iter()
            .map(|resolved| LocalizedValue {
                name: resolved.path.clone(),
                value: resolved.value.clone(),
                found: true,
                searched_locations: Vec::new(),
                culture: resolved.culture.clone(),
                resource: resolved.resource.clone(),
            })
            .collect())
    }

    /// The complete lookup table for a culture, from cache or built on
    /// demand per the configured cache strategy.
    pub fn lookup_table(&self, culture_name: &str) -> Result<Arc<LookupTable>, Error> {
        let normalized = culture::normalize(culture_name);
        if !culture::is_well_formed(&normalized) {
            return Err(Error::validation_error(format!(
                "culture name is not well-formed: {:?}",
                culture_name
            )));
        }
        self.cache.lookup_table(&normalized)
    }

    /// Drops the cached table for one culture. A no-op under the static
    /// cache strategy.
    pub fn invalidate(&self, culture_name: &str) {
        self.cache.invalidate(culture_name);
    }

    /// Drops every cached table. A no-op under the static cache strategy.
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }
}

/// Builder for creating a [`Localizer`] with a fluent interface.
///
/// Sources come from the options (`file_resources_directory`,
/// `embedded_resource_patterns` plus registered blobs) and from any extra
/// [`ResourceProvider`]s added explicitly. At least one source must be
/// configured or `build` fails with a configuration error.
pub struct LocalizerBuilder {
    options: LocalizeOptions,
    locator: ResourceLocator,
    providers: Vec<Box<dyn ResourceProvider>>,
    embedded: Vec<(String, Arc<[u8]>)>,
}

impl LocalizerBuilder {
    pub fn new() -> Self {
        LocalizerBuilder {
            options: LocalizeOptions::default(),
            locator: ResourceLocator::default_resolvers(),
            providers: Vec::new(),
            embedded: Vec::new(),
        }
    }

    /// Replaces the whole option set.
    pub fn options(mut self, options: LocalizeOptions) -> Self {
        self.options = options;
        self
    }

    /// Sets the directory scanned for file resources.
    pub fn file_resources_directory(mut self, directory: impl Into<std::path::PathBuf>) -> Self {
        self.options.file_resources_directory = Some(directory.into());
        self
    }

    /// Adds a regex pattern selecting embedded resource names.
    pub fn embedded_resource_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.options.embedded_resource_patterns.push(pattern.into());
        self
    }

    /// Registers an embedded resource blob, matched against the configured
    /// patterns at build time.
    pub fn embedded_resource(
        mut self,
        name: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Self {
        self.embedded.push((name.into(), bytes.into()));
        self
    }

    /// Adds an extra resource provider, consulted after the built-in ones.
    pub fn provider(mut self, provider: Box<dyn ResourceProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    /// Replaces the resolver set used to classify discovered resources.
    pub fn locator(mut self, locator: ResourceLocator) -> Self {
        self.locator = locator;
        self
    }

    /// Discovers, classifies, and parses every resource, then wraps the
    /// result in the configured cache provider.
    pub fn build(self) -> Result<Localizer, Error> {
        self.options.validate()?;

        let mut providers: Vec<Box<dyn ResourceProvider>> = Vec::new();
        if !self.options.embedded_resource_patterns.is_empty() {
            let mut embedded =
                EmbeddedResourceProvider::new(&self.options.embedded_resource_patterns)?;
            for (name, bytes) in self.embedded {
                embedded.register(name, bytes);
            }
            providers.push(Box::new(embedded));
        }
        if let Some(directory) = &self.options.file_resources_directory {
            providers.push(Box::new(FileResourceProvider::new(directory)?));
        }
        providers.extend(self.providers);

        if providers.is_empty() {
            return Err(Error::configuration_error(
                "no resource source configured: set embedded resource patterns, \
                 a file resources directory, or add a provider",
            ));
        }

        let mut discovered = Vec::new();
        for provider in &providers {
            discovered.extend(provider.resources()?);
        }
        let classified = self.locator.classify(discovered)?;
        let localizations = parse_resources(&classified, self.options.throw_errors)?;

        let pipeline = Pipeline {
            localizations,
            include_parent_cultures: self.options.include_parent_cultures,
        };
        let cache: Box<dyn CacheProvider> = if self.options.static_cache {
            Box::new(StaticCache::new(pipeline)?)
        } else {
            Box::new(DynamicCache::new(pipeline))
        };

        Ok(Localizer {
            options: self.options,
            cache,
        })
    }
}

impl Default for LocalizerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Parses every classified resource. Content failures are gated by
/// `throw_errors`: when unset the resource is skipped with a warning,
/// everything else always propagates.
fn parse_resources(
    resources: &[Arc<Resource>],
    throw_errors: bool,
) -> Result<Vec<Arc<Localization>>, Error> {
    let mut localizations = Vec::new();
    for resource in resources {
        let format = match resource.format() {
            Some(format) => format,
            // classify always binds a format; an unbound resource here
            // means a provider bypassed classification.
            None => {
                return Err(Error::invalid_resource(
                    resource.identity(),
                    "resource has no bound format",
                ));
            }
        };
        let raw = resource.read_to_string()?;
        match format.parse(resource, &raw) {
            Ok(parsed) => localizations.extend(parsed.into_iter().map(Arc::new)),
            Err(err) if err.is_content_error() && !throw_errors => {
                tracing::warn!(resource = %resource, error = %err, "skipping malformed resource");
            }
            Err(err) => return Err(err),
        }
    }
    Ok(localizations)
}

/// The parsed-resource set behind the cache providers.
struct Pipeline {
    localizations: Vec<Arc<Localization>>,
    include_parent_cultures: bool,
}

impl TableSource for Pipeline {
    fn build(&self, culture_name: &str) -> Result<LookupTable, Error> {
        Ok(merge::resolve(
            culture_name,
            &self.localizations,
            self.include_parent_cultures,
        ))
    }

    fn known_cultures(&self) -> Vec<String> {
        let mut cultures: Vec<String> = Vec::new();
        for localization in &self.localizations {
            let culture = localization.effective_culture().to_string();
            if !cultures
                .iter()
                .any(|known| culture::matches(known, &culture))
            {
                cultures.push(culture);
            }
        }
        cultures
    }
}
