//! Alias → atlas map with `"default"` fallback.

use std::collections::HashMap;

/// Alias used when the requested one is missing, and for empty aliases.
pub const DEFAULT_ALIAS: &str = "default";

fn normalize(alias: &str) -> &str {
    if alias.is_empty() { DEFAULT_ALIAS } else { alias }
}

/// Loaded atlases keyed by alias. At most one per alias.
#[derive(Debug)]
pub struct FontRegistry<A> {
    atlases: HashMap<String, A>,
}

impl<A> Default for FontRegistry<A> {
    fn default() -> Self {
        Self {
            atlases: HashMap::new(),
        }
    }
}

impl<A> FontRegistry<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `atlas` under `alias`, returning the atlas it replaced.
    pub fn insert(&mut self, alias: &str, atlas: A) -> Option<A> {
        self.atlases.insert(normalize(alias).to_owned(), atlas)
    }

    /// Exact lookup, no fallback.
    pub fn get(&self, alias: &str) -> Option<&A> {
        self.atlases.get(normalize(alias))
    }

    /// Lookup with fallback to [`DEFAULT_ALIAS`].
    pub fn resolve(&self, alias: &str) -> Option<&A> {
        let alias = normalize(alias);
        if let Some(atlas) = self.atlases.get(alias) {
            return Some(atlas);
        }
        let fallback = self.atlases.get(DEFAULT_ALIAS);
        if alias == DEFAULT_ALIAS || fallback.is_none() {
            log::warn!("fonts: no atlas for '{alias}' and no default loaded");
        } else {
            log::warn!("fonts: no atlas for '{alias}', using '{DEFAULT_ALIAS}'");
        }
        fallback
    }

    pub fn contains(&self, alias: &str) -> bool {
        self.atlases.contains_key(normalize(alias))
    }

    pub fn len(&self) -> usize {
        self.atlases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atlases.is_empty()
    }

    /// Loaded aliases in unspecified order.
    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.atlases.keys().map(String::as_str)
    }
}
