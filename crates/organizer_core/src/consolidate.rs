use std::collections::BTreeSet;

use crate::error::RuleWarning;
use crate::rules::RuleSet;
use crate::tag::Tag;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Consolidation {
    pub tags: BTreeSet<Tag>,
    pub warnings: Vec<RuleWarning>,
}

/// Replace aliases with their canonical tag, then add every implied parent.
///
/// Inheritance is walked depth-first. An edge pointing back onto the current chain is
/// skipped and reported; the rest of the set is still consolidated.
pub fn consolidate<I>(tags: I, rules: &RuleSet) -> Consolidation
where
    I: IntoIterator<Item = Tag>,
{
    let substituted: BTreeSet<Tag> = tags
        .into_iter()
        .map(|tag| rules.canonical(&tag).clone())
        .collect();

    let mut out = Consolidation {
        tags: substituted.clone(),
        warnings: Vec::new(),
    };
    let mut expanded: BTreeSet<Tag> = BTreeSet::new();
    for tag in &substituted {
        let mut chain = vec![tag.clone()];
        inherit(tag, rules, &mut chain, &mut expanded, &mut out);
    }
    out
}

fn inherit(
    tag: &Tag,
    rules: &RuleSet,
    chain: &mut Vec<Tag>,
    expanded: &mut BTreeSet<Tag>,
    out: &mut Consolidation,
) {
    if !expanded.insert(tag.clone()) {
        return;
    }
    let Some(parents) = rules.parents(tag) else {
        return;
    };
    for parent in parents {
        if chain.contains(parent) {
            let mut cycle = chain.clone();
            cycle.push(parent.clone());
            tracing::warn!(chain = ?cycle, "inheritance cycle, implication skipped");
            out.warnings.push(RuleWarning::InheritanceCycle { chain: cycle });
            continue;
        }
        out.tags.insert(parent.clone());
        chain.push(parent.clone());
        inherit(parent, rules, chain, expanded, out);
        chain.pop();
    }
}
