//! Tag normalization, consolidation and folder placement for tagged vault documents.
//!
//! Pure decision logic. Nothing here touches the vault; callers hand in raw tags and
//! get back a [`ClassificationResult`]:
//! - [`normalize`]: canonical lowercase tag tokens
//! - [`consolidate`]: alias substitution plus parent-tag inheritance
//! - [`resolve`]: one destination folder chain, first-declared rule wins

pub mod classify;
pub mod config;
pub mod consolidate;
pub mod error;
pub mod resolve;
pub mod rules;
pub mod tag;

pub use classify::{classify, ClassificationResult};
pub use config::{CleanupConfig, OneOrMany, OrderedMap, RuleConfig, SubcategoryTree};
pub use consolidate::{consolidate, Consolidation};
pub use error::{ConfigError, RuleWarning};
pub use resolve::{resolve, Destination, Placement};
pub use rules::{folder_name, CategoryRule, RuleSet, SubfolderRule};
pub use tag::{normalize, normalize_all, Tag};
