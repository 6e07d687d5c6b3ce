//! Serde model of the rule configuration file.
//!
//! Declaration order of `category_rules` and `subcategory_rules` decides tie-breaks,
//! so every mapping here is read into [`OrderedMap`] instead of a hash or btree map.

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use std::fmt;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

pub const DEFAULT_INDEX_FOLDER: &str = "_indexes";

/// Mapping entries in the order they were declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderedMap<V>(Vec<(String, V)>);

impl<V> OrderedMap<V> {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for OrderedMap<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedMapVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedMapVisitor<V> {
            type Value = OrderedMap<V>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a mapping")
            }

            fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(OrderedMap::default())
            }

            fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(OrderedMap::default())
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries: Vec<(String, V)> =
                    Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, value)) = access.next_entry::<String, V>()? {
                    if entries.iter().any(|(k, _)| *k == key) {
                        return Err(de::Error::custom(format!("duplicate key `{key}`")));
                    }
                    entries.push((key, value));
                }
                Ok(OrderedMap(entries))
            }
        }

        deserializer.deserialize_map(OrderedMapVisitor(PhantomData))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        match self {
            OneOrMany::One(value) => std::slice::from_ref(value).iter(),
            OneOrMany::Many(values) => values.iter(),
        }
    }
}

/// One category's subfolder declaration.
///
/// At category level a bare string declares a subfolder named after itself. Inside a
/// named subfolder, bare strings are that subfolder's tags and mappings nest further.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum SubcategoryTree {
    Tag(String),
    List(Vec<SubcategoryTree>),
    Nested(OrderedMap<Option<SubcategoryTree>>),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CleanupConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_redirect_markers")]
    pub redirect_markers: Vec<String>,
    #[serde(default = "default_template_prefixes")]
    pub template_prefixes: Vec<String>,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            redirect_markers: default_redirect_markers(),
            template_prefixes: default_template_prefixes(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_redirect_markers() -> Vec<String> {
    vec!["#redirect".to_string()]
}

fn default_template_prefixes() -> Vec<String> {
    vec!["template:".to_string(), "template_".to_string()]
}

/// Accept an explicit `null` (e.g. a bare `tag_consolidation:` line) as the default.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

fn default_index_folder() -> String {
    DEFAULT_INDEX_FOLDER.to_string()
}

/// Top-level configuration file (`config.yaml` or `config.toml`).
#[derive(Debug, Clone, Deserialize)]
pub struct RuleConfig {
    #[serde(default)]
    pub vault_root: Option<PathBuf>,
    pub default_folder: String,
    pub category_rules: OrderedMap<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub subcategory_rules: OrderedMap<SubcategoryTree>,
    #[serde(default, deserialize_with = "nullable")]
    pub tag_consolidation: OrderedMap<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub tag_inheritance: OrderedMap<OneOrMany<String>>,
    #[serde(default = "default_index_folder")]
    pub index_folder: String,
    #[serde(default)]
    pub cleanup: CleanupConfig,
}

impl RuleConfig {
    /// Load a configuration file, picking the format from its extension.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let origin = path.display().to_string();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        match ext.as_str() {
            "yaml" | "yml" => parse_yaml(&content, &origin),
            "toml" => parse_toml(&content, &origin),
            _ => Err(ConfigError::UnsupportedFormat(origin)),
        }
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        parse_yaml(content, "<yaml>")
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        parse_toml(content, "<toml>")
    }
}

fn parse_yaml(content: &str, origin: &str) -> Result<RuleConfig, ConfigError> {
    serde_yaml::from_str(content).map_err(|e| ConfigError::Parse {
        origin: origin.to_string(),
        message: e.to_string(),
    })
}

fn parse_toml(content: &str, origin: &str) -> Result<RuleConfig, ConfigError> {
    toml::from_str(content).map_err(|e| ConfigError::Parse {
        origin: origin.to_string(),
        message: e.to_string(),
    })
}
