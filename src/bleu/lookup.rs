//! Block realizations
//!
//! Scoring never sees raw blocks, only their text. A [`TranslationLookup`]
//! resolves a block key to its admissible realizations: a reference block may
//! have several equally acceptable renderings, a candidate block normally has
//! exactly one.

use crate::errors::{EqBleuError, Result};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::hash::Hash;

/// Text realizations of one block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Realizations {
    /// A single rendering
    Single(String),
    /// Any one of several renderings is acceptable
    Alternatives(Vec<String>),
}

impl Realizations {
    /// All admissible renderings
    pub fn alternatives(&self) -> &[String] {
        match self {
            Realizations::Single(text) => std::slice::from_ref(text),
            Realizations::Alternatives(texts) => texts,
        }
    }

    /// The rendering used when the block is on the candidate side
    pub fn primary(&self) -> Option<&str> {
        self.alternatives().first().map(String::as_str)
    }

    /// Consume into the list of renderings
    pub fn into_alternatives(self) -> Vec<String> {
        match self {
            Realizations::Single(text) => vec![text],
            Realizations::Alternatives(texts) => texts,
        }
    }

    /// Consume into the primary rendering
    pub fn into_primary(self) -> Option<String> {
        self.into_alternatives().into_iter().next()
    }

    /// Number of renderings
    pub fn len(&self) -> usize {
        self.alternatives().len()
    }

    /// Check if there is no rendering at all
    pub fn is_empty(&self) -> bool {
        self.alternatives().is_empty()
    }
}

impl From<&str> for Realizations {
    fn from(text: &str) -> Self {
        Realizations::Single(text.to_string())
    }
}

impl From<String> for Realizations {
    fn from(text: String) -> Self {
        Realizations::Single(text)
    }
}

impl From<Vec<String>> for Realizations {
    fn from(texts: Vec<String>) -> Self {
        Realizations::Alternatives(texts)
    }
}

impl<const N: usize> From<[&str; N]> for Realizations {
    fn from(texts: [&str; N]) -> Self {
        Realizations::Alternatives(texts.iter().map(|t| t.to_string()).collect())
    }
}

// ============================================================================
// Lookup Trait
// ============================================================================

/// Resolves block keys to their text realizations
pub trait TranslationLookup<K> {
    /// Realizations of `key`, or [`EqBleuError::NotFound`]
    fn lookup(&self, key: &K) -> Result<Realizations>;
}

impl<K, L: TranslationLookup<K> + ?Sized> TranslationLookup<K> for &L {
    fn lookup(&self, key: &K) -> Result<Realizations> {
        (**self).lookup(key)
    }
}

/// Map-backed lookup table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
#[serde(bound(
    serialize = "K: Serialize",
    deserialize = "K: Deserialize<'de> + Eq + Hash"
))]
pub struct TranslationTable<K: Eq + Hash> {
    entries: FxHashMap<K, Realizations>,
}

impl<K: Eq + Hash> Default for TranslationTable<K> {
    fn default() -> Self {
        Self {
            entries: FxHashMap::default(),
        }
    }
}

impl<K: Eq + Hash> TranslationTable<K> {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the realizations of a key
    pub fn insert(&mut self, key: K, realizations: impl Into<Realizations>) {
        self.entries.insert(key, realizations.into());
    }

    /// Borrow the realizations of a key
    pub fn get(&self, key: &K) -> Option<&Realizations> {
        self.entries.get(key)
    }

    /// Number of keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Eq + Hash + serde::de::DeserializeOwned> TranslationTable<K> {
    /// Parse a table from JSON (an object of key → string or list of strings)
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl<K: Eq + Hash, R: Into<Realizations>> FromIterator<(K, R)> for TranslationTable<K> {
    fn from_iter<I: IntoIterator<Item = (K, R)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (key, realizations) in iter {
            table.insert(key, realizations);
        }
        table
    }
}

impl<K: Eq + Hash + Debug> TranslationLookup<K> for TranslationTable<K> {
    fn lookup(&self, key: &K) -> Result<Realizations> {
        self.entries
            .get(key)
            .cloned()
            .ok_or_else(|| EqBleuError::not_found(format!("{key:?}")))
    }
}

/// Closure-backed lookup; `None` maps to [`EqBleuError::NotFound`]
#[derive(Debug, Clone, Copy)]
pub struct FnLookup<F>(F);

impl<F> FnLookup<F> {
    /// Wrap a resolver closure
    pub fn new(resolve: F) -> Self {
        Self(resolve)
    }
}

impl<K: Debug, F: Fn(&K) -> Option<Realizations>> TranslationLookup<K> for FnLookup<F> {
    fn lookup(&self, key: &K) -> Result<Realizations> {
        (self.0)(key).ok_or_else(|| EqBleuError::not_found(format!("{key:?}")))
    }
}
