//! Library side of the `vault-organize` binary: config loading, the command
//! implementations and their key=value renderings.

use std::path::{Path, PathBuf};

use organizer_core::{classify, ClassificationResult, RuleConfig, RuleSet, SubfolderRule};
use organizer_vault::{organize_vault, Document, OrganizeOptions, RunReport};
use serde::Serialize;

pub mod logging;

pub const DEFAULT_CONFIG: &str = "config.yaml";

#[derive(Debug, Clone)]
pub struct LoadedRules {
    pub config_path: PathBuf,
    pub config: RuleConfig,
    pub rules: RuleSet,
}

/// Load and validate the rule configuration. Any problem is fatal.
pub fn load_rules(config_path: &Path) -> Result<LoadedRules, String> {
    let config = RuleConfig::load(config_path).map_err(|err| err.to_string())?;
    let rules = RuleSet::from_config(&config)
        .map_err(|err| format!("invalid config {}: {}", config_path.display(), err))?;
    Ok(LoadedRules {
        config_path: config_path.to_path_buf(),
        config,
        rules,
    })
}

/// `--vault` wins over `vault_root`; a relative `vault_root` is taken relative to the
/// directory holding the config file.
pub fn resolve_vault_root(loaded: &LoadedRules, vault: Option<&Path>) -> Result<PathBuf, String> {
    if let Some(vault) = vault {
        return Ok(vault.to_path_buf());
    }
    let root = loaded.config.vault_root.as_ref().ok_or_else(|| {
        format!(
            "no vault given: pass --vault or set vault_root in {}",
            loaded.config_path.display()
        )
    })?;
    if root.is_absolute() {
        return Ok(root.clone());
    }
    let base = loaded
        .config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    Ok(base.join(root))
}

#[derive(Debug, Clone, Default)]
pub struct OrganizeInput {
    pub config: PathBuf,
    pub vault: Option<PathBuf>,
    pub dry_run: bool,
    pub no_cleanup: bool,
    pub no_indexes: bool,
}

pub fn run_organize(input: &OrganizeInput) -> Result<RunReport, String> {
    let loaded = load_rules(&input.config)?;
    let root = resolve_vault_root(&loaded, input.vault.as_deref())?;

    let mut options = OrganizeOptions::from_config(&loaded.config);
    options.dry_run = input.dry_run;
    if input.no_cleanup {
        options.cleanup = None;
    }
    options.write_indexes = !input.no_indexes;

    organize_vault(&root, &loaded.rules, &options).map_err(|err| err.to_string())
}

#[derive(Debug, Clone)]
pub enum ClassifyInput {
    Tags(Vec<String>),
    File(PathBuf),
}

/// Classify without touching the vault.
pub fn run_classify(config: &Path, input: &ClassifyInput) -> Result<ClassificationResult, String> {
    let loaded = load_rules(config)?;
    match input {
        ClassifyInput::Tags(tags) => Ok(classify(tags, &loaded.rules)),
        ClassifyInput::File(path) => {
            let root = path.parent().unwrap_or_else(|| Path::new("."));
            let doc = Document::read(root, path).map_err(|err| err.to_string())?;
            Ok(classify(&doc.raw_tags().values, &loaded.rules))
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CategorySummary {
    pub tag: String,
    pub folder: String,
    pub subfolders: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConfigSummary {
    pub config: PathBuf,
    pub default_folder: String,
    pub categories: Vec<CategorySummary>,
    pub aliases: usize,
    pub inheritance_edges: usize,
    pub index_folder: String,
    pub cleanup_enabled: bool,
}

pub fn run_check_config(config: &Path) -> Result<ConfigSummary, String> {
    let loaded = load_rules(config)?;
    let categories = loaded
        .rules
        .categories()
        .iter()
        .map(|c| {
            let mut subfolders = Vec::new();
            collect_subfolder_paths(&c.folder, &c.subfolders, &mut subfolders);
            CategorySummary {
                tag: c.tag.to_string(),
                folder: c.folder.clone(),
                subfolders,
            }
        })
        .collect();
    Ok(ConfigSummary {
        config: loaded.config_path.clone(),
        default_folder: loaded.rules.default_folder().to_string(),
        categories,
        aliases: loaded.rules.aliases().len(),
        inheritance_edges: loaded.rules.inheritance().values().map(|p| p.len()).sum(),
        index_folder: loaded.config.index_folder.clone(),
        cleanup_enabled: loaded.config.cleanup.enabled,
    })
}

fn collect_subfolder_paths(prefix: &str, nodes: &[SubfolderRule], out: &mut Vec<String>) {
    for node in nodes {
        let path = format!("{prefix}/{}", node.name);
        out.push(path.clone());
        collect_subfolder_paths(&path, &node.children, out);
    }
}

pub fn report_lines(report: &RunReport) -> Vec<String> {
    let mut lines = vec![
        format!("vault_root={}", report.vault_root.display()),
        format!("dry_run={}", report.dry_run),
        format!("scanned={}", report.scanned),
        format!("moved={}", report.moved),
        format!("retagged={}", report.retagged),
        format!("defaulted={}", report.defaulted),
        format!("move_skipped={}", report.move_skipped),
        format!("stubs_removed={}", report.stubs_removed),
    ];
    if let Some(indexes) = &report.indexes {
        lines.push(format!("indexes_written={}", indexes.written.len()));
        lines.push(format!("indexes_unchanged={}", indexes.unchanged));
        lines.push(format!("indexes_removed={}", indexes.removed.len()));
    }
    lines.push(format!("failures={}", report.failures.len()));
    for failure in &report.failures {
        lines.push(format!("failure={}: {}", failure.path, failure.error));
    }
    for warning in &report.warnings {
        lines.push(format!("warning={warning}"));
    }
    lines
}

pub fn classification_lines(result: &ClassificationResult) -> Vec<String> {
    let mut lines = vec![
        format!("tags={}", result.tag_strings().join(",")),
        format!("destination={}", result.destination.relative_path()),
        format!(
            "category={}",
            result.category.as_ref().map(|c| c.as_str()).unwrap_or("")
        ),
        format!("matched={}", result.matched),
    ];
    for warning in &result.warnings {
        lines.push(format!("warning={warning}"));
    }
    lines
}

pub fn config_lines(summary: &ConfigSummary) -> Vec<String> {
    let mut lines = vec![
        format!("config={}", summary.config.display()),
        format!("default_folder={}", summary.default_folder),
        format!("categories={}", summary.categories.len()),
    ];
    for category in &summary.categories {
        lines.push(format!("category={} -> {}", category.tag, category.folder));
        for sub in &category.subfolders {
            lines.push(format!("subfolder={sub}"));
        }
    }
    lines.push(format!("aliases={}", summary.aliases));
    lines.push(format!("inheritance_edges={}", summary.inheritance_edges));
    lines.push(format!("index_folder={}", summary.index_folder));
    lines.push(format!("cleanup_enabled={}", summary.cleanup_enabled));
    lines
}
