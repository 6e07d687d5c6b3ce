//! Immutable, normalized rule set built once per run from a [`RuleConfig`].

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::config::{OrderedMap, RuleConfig, SubcategoryTree};
use crate::error::ConfigError;
use crate::tag::{normalize, Tag};

/// A top-level category in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryRule {
    pub tag: Tag,
    pub folder: String,
    pub subfolders: Vec<SubfolderRule>,
}

/// A nested folder scoped to one category. `tags` always contains the
/// normalized subfolder key itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubfolderRule {
    pub name: String,
    pub tags: BTreeSet<Tag>,
    pub children: Vec<SubfolderRule>,
}

impl SubfolderRule {
    /// True when this node or any descendant carries one of `tags`.
    pub fn matches(&self, tags: &BTreeSet<Tag>) -> bool {
        self.tags.iter().any(|t| tags.contains(t))
            || self.children.iter().any(|child| child.matches(tags))
    }

    fn collect_tags<'a>(&'a self, out: &mut BTreeSet<&'a Tag>) {
        out.extend(self.tags.iter());
        for child in &self.children {
            child.collect_tags(out);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSet {
    default_folder: String,
    categories: Vec<CategoryRule>,
    aliases: BTreeMap<Tag, Tag>,
    inheritance: BTreeMap<Tag, BTreeSet<Tag>>,
}

impl RuleSet {
    pub fn from_config(config: &RuleConfig) -> Result<Self, ConfigError> {
        let default_folder = config.default_folder.trim().to_string();
        if default_folder.is_empty() {
            return Err(ConfigError::EmptyDefaultFolder);
        }
        check_folder("default_folder", &default_folder)?;
        check_folder("index_folder", &config.index_folder)?;
        if config.category_rules.is_empty() {
            return Err(ConfigError::EmptyCategoryRules);
        }

        let aliases = build_aliases(&config.tag_consolidation)?;
        let canonical = |tag: Tag| aliases.get(&tag).cloned().unwrap_or(tag);

        let mut categories: Vec<CategoryRule> = Vec::with_capacity(config.category_rules.len());
        for (raw, folder) in config.category_rules.iter() {
            let tag = canonical(tag_of("category_rules", raw)?);
            if categories.iter().any(|c| c.tag == tag) {
                return Err(ConfigError::DuplicateCategory(tag.into_string()));
            }
            let folder = folder.trim().to_string();
            check_folder("category_rules", &folder)?;
            categories.push(CategoryRule {
                tag,
                folder,
                subfolders: Vec::new(),
            });
        }

        for (raw, tree) in config.subcategory_rules.iter() {
            let tag = canonical(tag_of("subcategory_rules", raw)?);
            let Some(category) = categories.iter_mut().find(|c| c.tag == tag) else {
                return Err(ConfigError::UnknownSubcategoryParent(raw.to_string()));
            };
            build_category_level(tree, &canonical, &mut category.subfolders)?;
        }

        let mut inheritance: BTreeMap<Tag, BTreeSet<Tag>> = BTreeMap::new();
        for category in &categories {
            let mut subtree: BTreeSet<&Tag> = BTreeSet::new();
            for node in &category.subfolders {
                node.collect_tags(&mut subtree);
            }
            for tag in subtree {
                if *tag != category.tag {
                    inheritance
                        .entry(tag.clone())
                        .or_default()
                        .insert(category.tag.clone());
                }
            }
        }
        for (raw, parents) in config.tag_inheritance.iter() {
            let child = canonical(tag_of("tag_inheritance", raw)?);
            for parent in parents.iter() {
                let parent = canonical(tag_of("tag_inheritance", parent)?);
                if parent != child {
                    inheritance.entry(child.clone()).or_default().insert(parent);
                }
            }
        }

        Ok(Self {
            default_folder,
            categories,
            aliases,
            inheritance,
        })
    }

    pub fn default_folder(&self) -> &str {
        &self.default_folder
    }

    /// Categories in declaration order.
    pub fn categories(&self) -> &[CategoryRule] {
        &self.categories
    }

    pub fn category(&self, tag: &Tag) -> Option<&CategoryRule> {
        self.categories.iter().find(|c| &c.tag == tag)
    }

    /// Terminal canonical tag for an alias, or the tag itself.
    pub fn canonical<'a>(&'a self, tag: &'a Tag) -> &'a Tag {
        self.aliases.get(tag).unwrap_or(tag)
    }

    pub fn aliases(&self) -> &BTreeMap<Tag, Tag> {
        &self.aliases
    }

    /// Direct parent implications of `tag`.
    pub fn parents(&self, tag: &Tag) -> Option<&BTreeSet<Tag>> {
        self.inheritance.get(tag)
    }

    pub fn inheritance(&self) -> &BTreeMap<Tag, BTreeSet<Tag>> {
        &self.inheritance
    }
}

fn tag_of(section: &'static str, raw: &str) -> Result<Tag, ConfigError> {
    normalize(raw).ok_or_else(|| ConfigError::EmptyTag {
        section,
        raw: raw.to_string(),
    })
}

fn check_folder(section: &'static str, name: &str) -> Result<(), ConfigError> {
    let bad = name.trim().is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\');
    if bad {
        return Err(ConfigError::InvalidFolder {
            section,
            name: name.to_string(),
        });
    }
    Ok(())
}

/// `capitalize`: first character uppercased, the rest lowercased.
pub fn folder_name(key: &str) -> String {
    let key = key.trim();
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Flatten alias chains to their terminal tag so one lookup is always enough.
fn build_aliases(table: &OrderedMap<String>) -> Result<BTreeMap<Tag, Tag>, ConfigError> {
    let mut direct: BTreeMap<Tag, Tag> = BTreeMap::new();
    for (alias, target) in table.iter() {
        let alias = tag_of("tag_consolidation", alias)?;
        let target = tag_of("tag_consolidation", target)?;
        if alias != target {
            direct.insert(alias, target);
        }
    }

    let mut resolved: BTreeMap<Tag, Tag> = BTreeMap::new();
    for alias in direct.keys() {
        let mut chain: Vec<&Tag> = vec![alias];
        let mut current = &direct[alias];
        while let Some(next) = direct.get(current) {
            if chain.contains(&current) {
                let mut names: Vec<String> = chain.iter().map(|t| t.to_string()).collect();
                names.push(current.to_string());
                return Err(ConfigError::AliasCycle(names));
            }
            chain.push(current);
            current = next;
        }
        resolved.insert(alias.clone(), current.clone());
    }
    Ok(resolved)
}

fn build_category_level(
    tree: &SubcategoryTree,
    canonical: &dyn Fn(Tag) -> Tag,
    out: &mut Vec<SubfolderRule>,
) -> Result<(), ConfigError> {
    match tree {
        SubcategoryTree::Tag(key) => out.push(subfolder(key, None, canonical)?),
        SubcategoryTree::List(items) => {
            for item in items {
                build_category_level(item, canonical, out)?;
            }
        }
        SubcategoryTree::Nested(map) => {
            for (key, body) in map.iter() {
                out.push(subfolder(key, body.as_ref(), canonical)?);
            }
        }
    }
    Ok(())
}

fn subfolder(
    key: &str,
    body: Option<&SubcategoryTree>,
    canonical: &dyn Fn(Tag) -> Tag,
) -> Result<SubfolderRule, ConfigError> {
    let name = folder_name(key);
    check_folder("subcategory_rules", &name)?;
    let mut node = SubfolderRule {
        name,
        tags: BTreeSet::from([canonical(tag_of("subcategory_rules", key)?)]),
        children: Vec::new(),
    };
    if let Some(body) = body {
        fill_subfolder(body, canonical, &mut node)?;
    }
    Ok(node)
}

fn fill_subfolder(
    tree: &SubcategoryTree,
    canonical: &dyn Fn(Tag) -> Tag,
    node: &mut SubfolderRule,
) -> Result<(), ConfigError> {
    match tree {
        SubcategoryTree::Tag(raw) => {
            node.tags
                .insert(canonical(tag_of("subcategory_rules", raw)?));
        }
        SubcategoryTree::List(items) => {
            for item in items {
                fill_subfolder(item, canonical, node)?;
            }
        }
        SubcategoryTree::Nested(map) => {
            for (key, body) in map.iter() {
                node.children.push(subfolder(key, body.as_ref(), canonical)?);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(s: &str) -> Tag {
        normalize(s).unwrap()
    }

    fn rules(yaml: &str) -> Result<RuleSet, ConfigError> {
        RuleSet::from_config(&RuleConfig::from_yaml_str(yaml).unwrap())
    }

    const BASE: &str = r#"
default_folder: Uncategorized
category_rules:
  people: 1_People
  locations: 2_Locations
subcategory_rules:
  locations:
    - cities
    - wilderness:
        - forests
        - seas
        - deep woods:
            - taiga
"#;

    #[test]
    fn builds_categories_in_order() {
        let rs = rules(BASE).unwrap();
        let folders: Vec<&str> = rs.categories().iter().map(|c| c.folder.as_str()).collect();
        assert_eq!(folders, vec!["1_People", "2_Locations"]);
        assert_eq!(rs.default_folder(), "Uncategorized");
    }

    #[test]
    fn builds_subfolder_tree() {
        let rs = rules(BASE).unwrap();
        let locations = rs.category(&tag("locations")).unwrap();
        let names: Vec<&str> = locations.subfolders.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Cities", "Wilderness"]);

        let wilderness = &locations.subfolders[1];
        assert!(wilderness.tags.contains("wilderness"));
        assert!(wilderness.tags.contains("forests"));
        assert!(wilderness.tags.contains("seas"));
        assert_eq!(wilderness.children[0].name, "Deep woods");
        assert!(wilderness.children[0].tags.contains("deep-woods"));
        assert!(wilderness.children[0].tags.contains("taiga"));
    }

    #[test]
    fn inheritance_is_derived_from_subtrees() {
        let rs = rules(BASE).unwrap();
        for child in ["forests", "seas", "wilderness", "taiga", "cities", "deep-woods"] {
            let parents = rs.parents(&tag(child)).unwrap();
            assert_eq!(parents, &BTreeSet::from([tag("locations")]), "{child}");
        }
        assert!(rs.parents(&tag("locations")).is_none());
        assert!(rs.parents(&tag("people")).is_none());
    }

    #[test]
    fn explicit_inheritance_is_added() {
        let yaml = format!("{BASE}tag_inheritance:\n  hero: [people]\n");
        let rs = rules(&yaml).unwrap();
        assert_eq!(
            rs.parents(&tag("hero")).unwrap(),
            &BTreeSet::from([tag("people")])
        );
    }

    #[test]
    fn alias_chains_are_flattened() {
        let yaml = "default_folder: U\ncategory_rules:\n  people: P\ntag_consolidation:\n  persons: person\n  person: people\n";
        let rs = rules(yaml).unwrap();
        assert_eq!(rs.canonical(&tag("persons")), &tag("people"));
        assert_eq!(rs.canonical(&tag("person")), &tag("people"));
        assert_eq!(rs.canonical(&tag("people")), &tag("people"));
    }

    #[test]
    fn alias_cycle_is_fatal() {
        let yaml = "default_folder: U\ncategory_rules:\n  a: A\ntag_consolidation:\n  x: y\n  y: z\n  z: x\n";
        let err = rules(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::AliasCycle(_)), "{err}");
    }

    #[test]
    fn self_alias_is_ignored() {
        let yaml = "default_folder: U\ncategory_rules:\n  a: A\ntag_consolidation:\n  People: people\n";
        let rs = rules(yaml).unwrap();
        assert!(rs.aliases().is_empty());
    }

    #[test]
    fn empty_category_rules_is_fatal() {
        let err = rules("default_folder: U\ncategory_rules: {}\n").unwrap_err();
        assert!(matches!(err, ConfigError::EmptyCategoryRules));
    }

    #[test]
    fn empty_default_folder_is_fatal() {
        let err = rules("default_folder: ' '\ncategory_rules:\n  a: A\n").unwrap_err();
        assert!(matches!(err, ConfigError::EmptyDefaultFolder));
    }

    #[test]
    fn duplicate_category_after_normalization_is_fatal() {
        let err = rules("default_folder: U\ncategory_rules:\n  People: A\n  people: B\n").unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateCategory(ref t) if t == "people"));
    }

    #[test]
    fn unknown_subcategory_parent_is_fatal() {
        let yaml = "default_folder: U\ncategory_rules:\n  a: A\nsubcategory_rules:\n  b: [x]\n";
        let err = rules(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownSubcategoryParent(ref t) if t == "b"));
    }

    #[test]
    fn folder_with_separator_is_rejected() {
        let err = rules("default_folder: U\ncategory_rules:\n  a: A/B\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidFolder { .. }));
    }

    #[test]
    fn index_folder_must_be_one_segment() {
        for bad in ["''", "'.'", "'..'", "a/b", "'   '"] {
            let yaml = format!("default_folder: U\ncategory_rules:\n  a: A\nindex_folder: {bad}\n");
            let err = rules(&yaml).unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidFolder { section: "index_folder", .. }),
                "{bad}: {err}"
            );
        }
        let yaml = "default_folder: U\ncategory_rules:\n  a: A\nindex_folder: _idx\n";
        assert!(rules(yaml).is_ok());
    }

    #[test]
    fn empty_tag_key_is_rejected() {
        let err = rules("default_folder: U\ncategory_rules:\n  '###': A\n").unwrap_err();
        assert!(matches!(err, ConfigError::EmptyTag { section: "category_rules", .. }));
    }

    #[test]
    fn folder_name_capitalizes() {
        assert_eq!(folder_name("wilderness"), "Wilderness");
        assert_eq!(folder_name("OLD town"), "Old town");
        assert_eq!(folder_name(""), "");
    }
}
