//! Per-tag index documents, regenerated from scratch every run.

use organizer_core::Tag;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Component, Path};

use crate::error::VaultError;

/// A document as listed in an index. Ordered by vault-relative path.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct DocumentRef {
    pub rel_path: String,
    pub stem: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagIndex {
    entries: BTreeMap<Tag, BTreeSet<DocumentRef>>,
}

impl TagIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<'a, I>(&mut self, tags: I, doc: &DocumentRef)
    where
        I: IntoIterator<Item = &'a Tag>,
    {
        for tag in tags {
            self.entries
                .entry(tag.clone())
                .or_default()
                .insert(doc.clone());
        }
    }

    pub fn get(&self, tag: &str) -> Option<&BTreeSet<DocumentRef>> {
        self.entries.get(tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Tag, &BTreeSet<DocumentRef>)> {
        self.entries.iter()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IndexSummary {
    pub written: Vec<String>,
    pub unchanged: usize,
    pub removed: Vec<String>,
}

/// `_<tag>.md`, with nested-tag `/` flattened to `_`.
pub fn index_file_name(tag: &Tag) -> String {
    format!("_{}.md", tag.as_str().replace('/', "_"))
}

pub fn render_index(tag: &Tag, docs: &BTreeSet<DocumentRef>) -> String {
    let mut out = format!("# Index for #{tag}\n");
    for doc in docs {
        out.push_str(&format!("- [[{}]]\n", doc.stem));
    }
    out
}

/// The index folder is emptied of stale `.md` files, so it must be exactly one
/// folder name below the vault root.
pub(crate) fn check_index_folder(index_folder: &str) -> Result<(), VaultError> {
    let mut components = Path::new(index_folder).components();
    let single = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );
    if !single || index_folder.trim().is_empty() {
        return Err(VaultError::InvalidIndexFolder(index_folder.to_string()));
    }
    Ok(())
}

/// Write one index file per tag into `<vault_root>/<index_folder>` and delete index
/// files for tags that no longer exist. Files whose content is already current are
/// left untouched.
pub fn write_indexes(
    vault_root: &Path,
    index_folder: &str,
    index: &TagIndex,
    dry_run: bool,
) -> Result<IndexSummary, VaultError> {
    check_index_folder(index_folder)?;
    let dir = vault_root.join(index_folder);
    let io_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source: std::io::Error| VaultError::Io { path, source }
    };

    let mut summary = IndexSummary::default();
    let mut expected: BTreeSet<String> = BTreeSet::new();

    if !dry_run {
        fs::create_dir_all(&dir).map_err(io_err(&dir))?;
    }

    for (tag, docs) in index.iter() {
        let name = index_file_name(tag);
        let path = dir.join(&name);
        let content = render_index(tag, docs);
        expected.insert(name.clone());

        let current = fs::read_to_string(&path).ok();
        if current.as_deref() == Some(content.as_str()) {
            summary.unchanged += 1;
            continue;
        }
        if !dry_run {
            fs::write(&path, content).map_err(io_err(&path))?;
        }
        tracing::debug!(tag = %tag, "updated index");
        summary.written.push(name);
    }

    if dir.is_dir() {
        let mut stale: Vec<String> = Vec::new();
        for entry in fs::read_dir(&dir).map_err(io_err(&dir))? {
            let entry = entry.map_err(io_err(&dir))?;
            let name = entry.file_name().to_string_lossy().to_string();
            let is_md = Path::new(&name)
                .extension()
                .is_some_and(|e| e.eq_ignore_ascii_case("md"));
            if is_md && entry.path().is_file() && !expected.contains(&name) {
                stale.push(name);
            }
        }
        stale.sort();
        for name in stale {
            let path = dir.join(&name);
            if !dry_run {
                fs::remove_file(&path).map_err(io_err(&path))?;
            }
            tracing::debug!(file = %name, "removed obsolete index");
            summary.removed.push(name);
        }
    }

    Ok(summary)
}
