// src/taxonomy.rs
//! Keyword taxonomy and the label matcher.
//!
//! The taxonomy is an *ordered* list of keyword groups. Matching is
//! first-hit-wins over (group, keyword, synonym) in declaration order, so the
//! order of `groups` and of each group's `keywords` is part of the contract.
//! Never back this with a map.
//!
//! The built-in table lives in `taxonomy.toml` at the crate root and is
//! embedded at compile time; a config file may replace it wholesale.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::category::{Category, SubType};

static BUILTIN: Lazy<Arc<Taxonomy>> = Lazy::new(|| {
    let raw = include_str!("../taxonomy.toml");
    Arc::new(Taxonomy::from_toml_str(raw).expect("valid built-in taxonomy"))
});

/// One row of the taxonomy: keywords that map to `(category, sub_type)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordGroup {
    pub category: Category,
    pub sub_type: SubType,
    pub keywords: Vec<String>,
}

impl KeywordGroup {
    pub fn new<I, S>(category: Category, sub_type: SubType, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            category,
            sub_type,
            keywords: keywords.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Taxonomy {
    groups: Vec<KeywordGroup>,
}

impl Taxonomy {
    /// Build from groups. Keywords are lower-cased and trimmed; empty ones are
    /// dropped since an empty keyword would match every label.
    pub fn new(groups: Vec<KeywordGroup>) -> Self {
        let groups = groups
            .into_iter()
            .map(|g| KeywordGroup {
                keywords: g
                    .keywords
                    .iter()
                    .map(|k| k.trim().to_lowercase())
                    .filter(|k| !k.is_empty())
                    .collect(),
                ..g
            })
            .collect();
        Self { groups }
    }

    /// Shared handle to the embedded default table (built once per process).
    pub fn builtin() -> Arc<Taxonomy> {
        BUILTIN.clone()
    }

    /// Parse a `[[groups]]` TOML document.
    pub fn from_toml_str(toml_str: &str) -> anyhow::Result<Self> {
        #[derive(Deserialize)]
        struct Root {
            #[serde(default)]
            groups: Vec<KeywordGroup>,
        }
        let root: Root = toml::from_str(toml_str)?;
        Ok(Self::new(root.groups))
    }

    pub fn groups(&self) -> &[KeywordGroup] {
        &self.groups
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Resolve one prediction label to at most one `(category, sub_type)`.
    pub fn match_label(&self, label: &str) -> Option<(Category, SubType)> {
        let synonyms = split_synonyms(label);
        if synonyms.is_empty() {
            return None;
        }

        for group in &self.groups {
            for kw in &group.keywords {
                if synonyms.iter().any(|s| is_match(s, kw)) {
                    return Some((group.category, group.sub_type));
                }
            }
        }
        None
    }
}

/// Split a model label like `"water bottle, bottle"` into lower-cased,
/// trimmed, non-empty synonyms (order preserved).
pub fn split_synonyms(label: &str) -> Vec<String> {
    label
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

// Bidirectional substring match. Equality is covered by `contains`.
#[inline]
fn is_match(synonym: &str, keyword: &str) -> bool {
    synonym.contains(keyword) || keyword.contains(synonym)
}
