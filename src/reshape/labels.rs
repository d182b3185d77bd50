// src/reshape/labels.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Column holding the all-ages aggregate.
pub const AGGREGATE_LABEL: &str = "all";

/// Maps legacy age-bucket spellings onto their canonical column names.
///
/// Labels not in the table pass through untouched.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
#[serde(transparent)]
pub struct LabelCanonicalizer {
    aliases: BTreeMap<String, String>,
}

impl Default for LabelCanonicalizer {
    fn default() -> Self {
        Self::from_pairs([("0-4", "00-04"), ("5-14", "05-14")])
    }
}

impl LabelCanonicalizer {
    /// A table with no aliases at all.
    pub fn identity() -> Self {
        Self {
            aliases: BTreeMap::new(),
        }
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            aliases: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn with_alias(mut self, legacy: impl Into<String>, canonical: impl Into<String>) -> Self {
        self.aliases.insert(legacy.into(), canonical.into());
        self
    }

    pub fn canonical<'a>(&'a self, label: &'a str) -> &'a str {
        self.aliases.get(label).map_or(label, String::as_str)
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}
