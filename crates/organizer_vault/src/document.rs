use serde_yaml::{Mapping, Value};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::VaultError;
use crate::frontmatter::{render_document, split_frontmatter, Frontmatter};

pub const TAGS_KEY: &str = "tags";

/// Shape of the `tags` value as found on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagShape {
    Absent,
    /// A YAML list; `clean` is false when some items were not scalars.
    List { clean: bool },
    /// A single string such as `people, lore`.
    Text,
    /// Anything else (a mapping, or the whole frontmatter is malformed).
    Malformed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTags {
    pub values: Vec<String>,
    pub shape: TagShape,
}

impl RawTags {
    /// Whether writing `final_tags` back would change the document.
    pub fn needs_update(&self, final_tags: &[String]) -> bool {
        match self.shape {
            TagShape::Malformed => false,
            TagShape::Absent => !final_tags.is_empty(),
            TagShape::Text => true,
            TagShape::List { clean } => {
                let raw: BTreeSet<&str> = self.values.iter().map(String::as_str).collect();
                let wanted: BTreeSet<&str> = final_tags.iter().map(String::as_str).collect();
                !clean || raw != wanted
            }
        }
    }
}

/// Read the raw `tags` entry. Non-string scalars are stringified, nested values dropped.
pub fn raw_tags(frontmatter: &Frontmatter) -> RawTags {
    let value = match frontmatter {
        Frontmatter::Absent => None,
        Frontmatter::Parsed(map) => map.get(TAGS_KEY),
        Frontmatter::Malformed(_) => {
            return RawTags {
                values: Vec::new(),
                shape: TagShape::Malformed,
            }
        }
    };

    match value {
        None | Some(Value::Null) => RawTags {
            values: Vec::new(),
            shape: TagShape::Absent,
        },
        Some(Value::Sequence(items)) => {
            let values: Vec<String> = items.iter().filter_map(scalar_string).collect();
            RawTags {
                shape: TagShape::List {
                    clean: values.len() == items.len(),
                },
                values,
            }
        }
        Some(Value::String(text)) => RawTags {
            values: text
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            shape: TagShape::Text,
        },
        Some(_) => RawTags {
            values: Vec::new(),
            shape: TagShape::Malformed,
        },
    }
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// One markdown file of the vault, read once per pass.
#[derive(Debug, Clone)]
pub struct Document {
    pub path: PathBuf,
    /// `/`-separated path relative to the vault root.
    pub rel_path: String,
    pub stem: String,
    pub frontmatter: Frontmatter,
    pub body: String,
    bom: bool,
}

impl Document {
    /// Content that is not valid UTF-8 is decoded lossily and its frontmatter marked
    /// malformed, so the document is still placed but never rewritten.
    pub fn read(vault_root: &Path, path: &Path) -> Result<Self, VaultError> {
        let bytes = fs::read(path).map_err(|source| VaultError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        match String::from_utf8(bytes) {
            Ok(content) => Ok(Self::parse(vault_root, path, &content)),
            Err(err) => {
                let reason = format!("not valid UTF-8: {}", err.utf8_error());
                let content = String::from_utf8_lossy(err.as_bytes()).into_owned();
                let mut doc = Self::parse(vault_root, path, &content);
                doc.frontmatter = Frontmatter::Malformed(reason);
                Ok(doc)
            }
        }
    }

    pub fn parse(vault_root: &Path, path: &Path, content: &str) -> Self {
        let split = split_frontmatter(content);
        Self {
            path: path.to_path_buf(),
            rel_path: rel_path(vault_root, path),
            stem: path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or_default()
                .to_string(),
            frontmatter: split.frontmatter,
            body: split.body.to_string(),
            bom: split.bom,
        }
    }

    pub fn raw_tags(&self) -> RawTags {
        raw_tags(&self.frontmatter)
    }

    /// Vault-relative folder holding the document (`""` at the root).
    pub fn parent_folder(&self) -> &str {
        match self.rel_path.rfind('/') {
            Some(idx) => &self.rel_path[..idx],
            None => "",
        }
    }

    /// Render the document with `tags` replacing the tag list, every other key kept
    /// in place. `None` for malformed frontmatter, which is never rewritten.
    pub fn render_with_tags(&self, tags: &[String]) -> Result<Option<String>, VaultError> {
        let (mut map, separate) = match &self.frontmatter {
            Frontmatter::Parsed(map) => (map.clone(), false),
            Frontmatter::Absent => (Mapping::new(), true),
            Frontmatter::Malformed(_) => return Ok(None),
        };
        let list = tags.iter().map(|t| Value::String(t.clone())).collect();
        map.insert(Value::String(TAGS_KEY.to_string()), Value::Sequence(list));
        render_document(&map, &self.body, self.bom, separate)
            .map(Some)
            .map_err(|e| VaultError::Frontmatter {
                path: self.path.clone(),
                message: e.to_string(),
            })
    }
}

pub fn rel_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}
