//! One full, sequential organize pass over a vault.

use organizer_core::{classify, ClassificationResult, RuleConfig, RuleSet};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::cleanup::{StubDetector, StubKind};
use crate::document::{rel_path, Document};
use crate::error::{MoveError, VaultError};
use crate::frontmatter::Frontmatter;
use crate::index::{check_index_folder, write_indexes, DocumentRef, IndexSummary, TagIndex};
use crate::mover::{move_document, same_folder, target_path};
use crate::walker::collect_markdown_files;

#[derive(Debug, Clone)]
pub struct OrganizeOptions {
    pub dry_run: bool,
    pub cleanup: Option<StubDetector>,
    pub index_folder: String,
    pub write_indexes: bool,
}

impl OrganizeOptions {
    pub fn from_config(config: &RuleConfig) -> Self {
        Self {
            dry_run: false,
            cleanup: StubDetector::from_config(&config.cleanup),
            index_folder: config.index_folder.clone(),
            write_indexes: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Action {
    InPlace,
    Moved,
    MoveSkipped { reason: String },
    RemovedStub { stub: StubKind },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentOutcome {
    pub source: String,
    /// Where the document ends up (equal to `source` unless it moved).
    pub path: String,
    pub destination: String,
    pub tags: Vec<String>,
    pub matched: bool,
    pub retagged: bool,
    pub action: Action,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub path: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub vault_root: PathBuf,
    pub dry_run: bool,
    pub scanned: usize,
    pub moved: usize,
    pub retagged: usize,
    pub defaulted: usize,
    pub move_skipped: usize,
    pub stubs_removed: usize,
    pub documents: Vec<DocumentOutcome>,
    pub warnings: Vec<String>,
    pub failures: Vec<Failure>,
    pub indexes: Option<IndexSummary>,
}

impl RunReport {
    fn record(&mut self, outcome: DocumentOutcome) {
        match &outcome.action {
            Action::Moved => self.moved += 1,
            Action::MoveSkipped { .. } => self.move_skipped += 1,
            Action::RemovedStub { .. } => self.stubs_removed += 1,
            Action::InPlace => {}
        }
        if outcome.retagged {
            self.retagged += 1;
        }
        if !outcome.matched && !matches!(outcome.action, Action::RemovedStub { .. }) {
            self.defaulted += 1;
        }
        self.documents.push(outcome);
    }
}

/// Organize every markdown document under `vault_root`.
///
/// Documents are collected up front, then each is read, classified, moved,
/// retagged and indexed before the next one starts. A failure on one document is
/// recorded in the report and the pass continues.
pub fn organize_vault(
    vault_root: &Path,
    rules: &RuleSet,
    options: &OrganizeOptions,
) -> Result<RunReport, VaultError> {
    check_index_folder(&options.index_folder)?;
    tracing::info!(vault = %vault_root.display(), dry_run = options.dry_run, "scanning vault");
    let files = collect_markdown_files(vault_root, &options.index_folder)?;

    let mut report = RunReport {
        vault_root: vault_root.to_path_buf(),
        dry_run: options.dry_run,
        scanned: files.len(),
        ..RunReport::default()
    };
    let mut index = TagIndex::new();
    let mut plan = DryRunPlan::default();

    for path in &files {
        let mut state = PassState {
            index: &mut index,
            warnings: &mut report.warnings,
            plan: &mut plan,
        };
        let processed = process_document(vault_root, path, rules, options, &mut state);
        match processed {
            Ok(outcome) => report.record(outcome),
            Err(err) => {
                let rel = rel_path(vault_root, path);
                tracing::warn!(path = %rel, error = %err, "document failed");
                report.failures.push(Failure {
                    path: rel,
                    error: err.to_string(),
                });
            }
        }
    }

    if options.write_indexes {
        report.indexes = Some(write_indexes(
            vault_root,
            &options.index_folder,
            &index,
            options.dry_run,
        )?);
    }

    tracing::info!(
        scanned = report.scanned,
        moved = report.moved,
        retagged = report.retagged,
        defaulted = report.defaulted,
        stubs_removed = report.stubs_removed,
        failures = report.failures.len(),
        "vault organization complete"
    );
    Ok(report)
}

/// Paths claimed and vacated so far by a dry run, so later documents see the vault
/// the way a real run would have left it.
#[derive(Debug, Default)]
struct DryRunPlan {
    claimed: BTreeSet<PathBuf>,
    vacated: BTreeSet<PathBuf>,
}

impl DryRunPlan {
    fn occupied(&self, target: &Path) -> bool {
        self.claimed.contains(target) || (target.exists() && !self.vacated.contains(target))
    }

    fn record_move(&mut self, from: &Path, to: &Path) {
        self.claimed.remove(from);
        self.vacated.insert(from.to_path_buf());
        self.vacated.remove(to);
        self.claimed.insert(to.to_path_buf());
    }
}

struct PassState<'a> {
    index: &'a mut TagIndex,
    warnings: &'a mut Vec<String>,
    plan: &'a mut DryRunPlan,
}

fn process_document(
    vault_root: &Path,
    path: &Path,
    rules: &RuleSet,
    options: &OrganizeOptions,
    state: &mut PassState<'_>,
) -> Result<DocumentOutcome, VaultError> {
    let doc = Document::read(vault_root, path)?;

    if let Some(stub) = options.cleanup.as_ref().and_then(|d| d.detect(&doc.stem, &doc.body)) {
        if options.dry_run {
            state.plan.vacated.insert(path.to_path_buf());
        } else {
            fs::remove_file(path).map_err(|source| VaultError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        }
        tracing::debug!(path = %doc.rel_path, ?stub, "removed stub");
        return Ok(DocumentOutcome {
            source: doc.rel_path.clone(),
            path: doc.rel_path,
            destination: String::new(),
            tags: Vec::new(),
            matched: false,
            retagged: false,
            action: Action::RemovedStub { stub },
        });
    }

    if let Frontmatter::Malformed(reason) = &doc.frontmatter {
        tracing::warn!(path = %doc.rel_path, %reason, "malformed frontmatter, tags treated as empty");
        state
            .warnings
            .push(format!("{}: malformed frontmatter: {reason}", doc.rel_path));
    }

    let raw = doc.raw_tags();
    let result = classify(&raw.values, rules);
    for warning in &result.warnings {
        state.warnings.push(format!("{}: {warning}", doc.rel_path));
    }
    let final_tags = result.tag_strings();
    let retag = if raw.needs_update(&final_tags) {
        doc.render_with_tags(&final_tags)?
    } else {
        None
    };

    // Move before rewriting so a failed move leaves the file as it was.
    let (action, final_path) = place(vault_root, path, &doc, &result, options, state)?;

    let retagged = retag.is_some();
    if let Some(content) = retag {
        if !options.dry_run {
            fs::write(&final_path, content).map_err(|source| VaultError::Io {
                path: final_path.clone(),
                source,
            })?;
        }
        tracing::debug!(path = %doc.rel_path, tags = ?final_tags, "updated tags");
    }

    let final_rel = rel_path(vault_root, &final_path);
    state.index.insert(
        &result.tags,
        &DocumentRef {
            rel_path: final_rel.clone(),
            stem: doc.stem.clone(),
        },
    );

    Ok(DocumentOutcome {
        source: doc.rel_path,
        path: final_rel,
        destination: result.destination.relative_path(),
        tags: final_tags,
        matched: result.matched,
        retagged,
        action,
    })
}

fn place(
    vault_root: &Path,
    path: &Path,
    doc: &Document,
    result: &ClassificationResult,
    options: &OrganizeOptions,
    state: &mut PassState<'_>,
) -> Result<(Action, PathBuf), VaultError> {
    if same_folder(doc.parent_folder(), &result.destination) {
        return Ok((Action::InPlace, path.to_path_buf()));
    }

    tracing::debug!(
        path = %doc.rel_path,
        destination = %result.destination.relative_path(),
        "moving document"
    );

    let moved = if options.dry_run {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let target = target_path(vault_root, &result.destination, &file_name);
        if state.plan.occupied(&target) {
            Err(MoveError::AlreadyExists(target))
        } else {
            state.plan.record_move(path, &target);
            Ok(target)
        }
    } else {
        move_document(vault_root, path, &result.destination)
    };

    match moved {
        Ok(to) => Ok((Action::Moved, to)),
        Err(err @ MoveError::AlreadyExists(_)) => {
            let reason = err.to_string();
            tracing::warn!(path = %doc.rel_path, %reason, "skipped move");
            state.warnings.push(format!("{}: {reason}", doc.rel_path));
            Ok((Action::MoveSkipped { reason }, path.to_path_buf()))
        }
        Err(err) => Err(err.into()),
    }
}
