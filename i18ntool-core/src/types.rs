//! Domain types: translation units, unit collections, and validated newtypes.
//!
//! `source` and `target` strings hold XLIFF inline content exactly as it
//! appears between the element tags (entities stay escaped, inline `<x/>`
//! placeholders stay in place), so copying one into the other is lossless.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::xliff::UnitMarkup;

// ---------------------------------------------------------------------------
// Translation units
// ---------------------------------------------------------------------------

/// One translatable string entry keyed by a stable id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationUnit {
    pub id: String,
    /// Canonical (source-language) text.
    pub source: String,
    /// `None` means "not yet translated"; `Some("")` is a set, empty translation.
    pub target: Option<String>,
    /// Pass-through layout captured by the XLIFF parser (attributes, notes,
    /// context groups, whitespace). `None` for units built in code.
    pub(crate) markup: Option<UnitMarkup>,
}

impl TranslationUnit {
    /// A unit with no target and no captured markup.
    pub fn new(id: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: None,
            markup: None,
        }
    }

    /// Builder-style setter for the target text.
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// `true` if this unit came from a parsed document.
    pub fn has_markup(&self) -> bool {
        self.markup.is_some()
    }
}

/// Insertion-ordered mapping from unit id to unit, scoped to one file.
///
/// Ids are unique. Removing a unit keeps the relative order of the others.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitCollection {
    units: IndexMap<String, TranslationUnit>,
}

impl UnitCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.units.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&TranslationUnit> {
        self.units.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut TranslationUnit> {
        self.units.get_mut(id)
    }

    /// Insert `unit`, returning the unit previously stored under the same id.
    ///
    /// A replaced unit keeps its position; a new id is appended at the end.
    pub fn insert(&mut self, unit: TranslationUnit) -> Option<TranslationUnit> {
        self.units.insert(unit.id.clone(), unit)
    }

    /// Remove a unit by id, preserving the order of the remaining units.
    pub fn remove(&mut self, id: &str) -> Option<TranslationUnit> {
        self.units.shift_remove(id)
    }

    /// Keep only the units for which `keep` returns `true`, in order.
    pub fn retain(&mut self, mut keep: impl FnMut(&mut TranslationUnit) -> bool) {
        self.units.retain(|_, unit| keep(unit));
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.units.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TranslationUnit> {
        self.units.values()
    }
}

impl FromIterator<TranslationUnit> for UnitCollection {
    fn from_iter<I: IntoIterator<Item = TranslationUnit>>(iter: I) -> Self {
        let mut collection = Self::new();
        for unit in iter {
            collection.insert(unit);
        }
        collection
    }
}

/// Counts produced by one [`crate::merge::merge`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeResult {
    /// Units that received the source text as a placeholder target.
    pub added: usize,
    /// Units deleted because their id is no longer in the source.
    pub removed: usize,
}

impl MergeResult {
    pub fn is_noop(&self) -> bool {
        self.added == 0 && self.removed == 0
    }
}

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A language code such as `de_DE` or `en-GB`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LanguageCode(pub String);

impl LanguageCode {
    /// Parse a comma-separated list (`de_DE,en-GB`). Empty entries are skipped.
    pub fn parse_list(list: &str) -> Result<Vec<Self>, ConfigError> {
        let codes = list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::parse)
            .collect::<Result<Vec<Self>, _>>()?;
        if codes.is_empty() {
            return Err(ConfigError::InvalidValue {
                option: "languages",
                value: list.to_owned(),
                reason: "expected a list of language codes like de_DE,en-GB",
            });
        }
        Ok(codes)
    }
}

impl FromStr for LanguageCode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let valid = s.len() >= 2
            && s
                .chars()
                .all(|c| c.is_ascii_alphabetic() || c == '-' || c == '_');
        if valid {
            Ok(Self(s.to_owned()))
        } else {
            Err(ConfigError::InvalidValue {
                option: "languages",
                value: s.to_owned(),
                reason: "the format must be similar to de_DE,en-GB etc.",
            })
        }
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for LanguageCode {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// A remote resource named as `Name:Slug` on the command line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSpec {
    pub name: String,
    pub slug: String,
}

impl ResourceSpec {
    pub fn new(name: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slug: slug.into(),
        }
    }
}

/// `true` if `s` is non-empty and only contains `[A-Za-z0-9_-]`.
pub fn is_valid_slug(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

impl FromStr for ResourceSpec {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((name, slug)) if is_valid_slug(name) && is_valid_slug(slug) => {
                Ok(Self::new(name, slug))
            }
            _ => Err(ConfigError::InvalidValue {
                option: "resource",
                value: s.to_owned(),
                reason: "expected 'Name:Slug' using only alphanumerics, '_' and '-'",
            }),
        }
    }
}

impl fmt::Display for ResourceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.slug)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
