use serde::Serialize;
use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::rules::RuleSet;
use crate::tag::Tag;

/// Vault-relative destination: one top-level folder plus an optional subfolder chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Destination {
    pub folder: String,
    pub subfolders: Vec<String>,
}

impl Destination {
    pub fn bare(folder: impl Into<String>) -> Self {
        Self {
            folder: folder.into(),
            subfolders: Vec::new(),
        }
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.folder.as_str()).chain(self.subfolders.iter().map(String::as_str))
    }

    /// `/`-joined form, e.g. `2_Locations/Wilderness`.
    pub fn relative_path(&self) -> String {
        self.segments().collect::<Vec<_>>().join("/")
    }

    pub fn to_path_buf(&self) -> PathBuf {
        self.segments().collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Placement {
    pub destination: Destination,
    pub category: Option<Tag>,
    pub matched: bool,
}

/// Pick exactly one destination for a consolidated tag set.
///
/// The first category in declaration order whose tag is present wins. Within
/// it, each nesting level takes the first declared subfolder that matches (its own
/// tags or any descendant's), stopping at the first level where nothing matches.
/// No tags or no matching category lands in the default folder with `matched = false`.
pub fn resolve(tags: &BTreeSet<Tag>, rules: &RuleSet) -> Placement {
    let Some(category) = rules.categories().iter().find(|c| tags.contains(&c.tag)) else {
        return Placement {
            destination: Destination::bare(rules.default_folder()),
            category: None,
            matched: false,
        };
    };

    let mut subfolders: Vec<String> = Vec::new();
    let mut level = category.subfolders.as_slice();
    while let Some(node) = level.iter().find(|node| node.matches(tags)) {
        subfolders.push(node.name.clone());
        level = node.children.as_slice();
    }

    Placement {
        destination: Destination {
            folder: category.folder.clone(),
            subfolders,
        },
        category: Some(category.tag.clone()),
        matched: true,
    }
}
