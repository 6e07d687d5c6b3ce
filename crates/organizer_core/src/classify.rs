use serde::Serialize;
use std::collections::BTreeSet;

use crate::consolidate::consolidate;
use crate::error::RuleWarning;
use crate::resolve::{resolve, Destination};
use crate::rules::RuleSet;
use crate::tag::{normalize_all, Tag};

/// Everything the mover, index writer and frontmatter updater need for one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassificationResult {
    pub tags: BTreeSet<Tag>,
    pub destination: Destination,
    pub category: Option<Tag>,
    pub matched: bool,
    pub warnings: Vec<RuleWarning>,
}

impl ClassificationResult {
    pub fn tag_strings(&self) -> Vec<String> {
        self.tags.iter().map(Tag::to_string).collect()
    }
}

/// normalize -> consolidate -> resolve. Depends only on the tags, never on where
/// the document currently lives.
pub fn classify<I, S>(raw_tags: I, rules: &RuleSet) -> ClassificationResult
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let consolidation = consolidate(normalize_all(raw_tags), rules);
    let placement = resolve(&consolidation.tags, rules);
    ClassificationResult {
        tags: consolidation.tags,
        destination: placement.destination,
        category: placement.category,
        matched: placement.matched,
        warnings: consolidation.warnings,
    }
}
