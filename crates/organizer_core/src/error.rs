use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

use crate::tag::Tag;

/// Fatal configuration problems. Raised while loading, before any document is read.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config {origin}: {message}")]
    Parse { origin: String, message: String },

    #[error("unsupported config format `{0}` (expected .yaml, .yml or .toml)")]
    UnsupportedFormat(String),

    #[error("`default_folder` must not be empty")]
    EmptyDefaultFolder,

    #[error("`category_rules` must declare at least one category")]
    EmptyCategoryRules,

    #[error("{section}: `{raw}` normalizes to an empty tag")]
    EmptyTag { section: &'static str, raw: String },

    #[error("{section}: folder name `{name}` is not a single path segment")]
    InvalidFolder { section: &'static str, name: String },

    #[error("category_rules: `{0}` is declared more than once")]
    DuplicateCategory(String),

    #[error("subcategory_rules: `{0}` is not a declared category")]
    UnknownSubcategoryParent(String),

    #[error("tag_consolidation: alias cycle {}", .0.join(" -> "))]
    AliasCycle(Vec<String>),
}

/// Non-fatal rule problems detected while classifying one document.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleWarning {
    /// A parent implication led back onto its own chain; that edge was skipped.
    #[error("inheritance cycle skipped: {}", format_chain(chain))]
    InheritanceCycle { chain: Vec<Tag> },
}

fn format_chain(chain: &[Tag]) -> String {
    chain
        .iter()
        .map(Tag::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}
