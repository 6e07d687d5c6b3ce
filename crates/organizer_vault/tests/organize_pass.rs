use std::fs;
use std::path::Path;

use organizer_core::{RuleConfig, RuleSet};
use organizer_vault::{organize_vault, Action, OrganizeOptions, RunReport, VaultError};

const CONFIG: &str = r#"
default_folder: Uncategorized
category_rules:
  people: 1_People
  locations: 2_Locations
  lore: 6_Lore
subcategory_rules:
  locations:
    wilderness: [forests, seas]
tag_consolidation:
  person: people
"#;

fn setup() -> (RuleConfig, RuleSet) {
    let config = RuleConfig::from_yaml_str(CONFIG).expect("parse config");
    let rules = RuleSet::from_config(&config).expect("build rules");
    (config, rules)
}

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().expect("parent")).expect("create dirs");
    fs::write(path, content).expect("write note");
}

fn read(root: &Path, rel: &str) -> String {
    fs::read_to_string(root.join(rel)).unwrap_or_else(|e| panic!("read {rel}: {e}"))
}

fn run(root: &Path, dry_run: bool) -> RunReport {
    let (config, rules) = setup();
    let mut options = OrganizeOptions::from_config(&config);
    options.dry_run = dry_run;
    organize_vault(root, &rules, &options).expect("organize")
}

fn seed(root: &Path) {
    write(
        root,
        "Oakwood.md",
        "---\ntitle: Oakwood\ntags:\n  - Forests\n---\n# Oakwood\nA forest.\n",
    );
    write(root, "Aldric.md", "---\ntags: [person]\naliases: [Al]\n---\nBody\n");
    write(root, "Loose note.md", "No frontmatter at all.\n");
    write(root, "Old Name.md", "#REDIRECT [[Aldric]]\n");
    write(root, "Template_Infobox.md", "{{infobox}}\n");
    write(root, ".obsidian/ignored.md", "---\ntags: [people]\n---\n");
}

#[test]
fn full_pass_moves_retags_indexes_and_cleans() {
    let vault = tempfile::tempdir().expect("tempdir");
    let root = vault.path();
    seed(root);

    let report = run(root, false);
    assert_eq!(report.scanned, 5);
    assert_eq!(report.stubs_removed, 2);
    assert_eq!(report.moved, 3);
    assert_eq!(report.retagged, 2);
    assert_eq!(report.defaulted, 1);
    assert!(report.failures.is_empty(), "{:?}", report.failures);

    assert_eq!(
        read(root, "2_Locations/Wilderness/Oakwood.md"),
        "---\ntitle: Oakwood\ntags:\n- forests\n- locations\n---\n# Oakwood\nA forest.\n"
    );
    assert_eq!(
        read(root, "1_People/Aldric.md"),
        "---\ntags:\n- people\naliases:\n- Al\n---\nBody\n"
    );
    assert_eq!(read(root, "Uncategorized/Loose note.md"), "No frontmatter at all.\n");
    assert!(!root.join("Old Name.md").exists());
    assert!(!root.join("Template_Infobox.md").exists());
    assert!(root.join(".obsidian/ignored.md").exists());

    assert_eq!(
        read(root, "_indexes/_locations.md"),
        "# Index for #locations\n- [[Oakwood]]\n"
    );
    assert_eq!(read(root, "_indexes/_people.md"), "# Index for #people\n- [[Aldric]]\n");
    assert!(!root.join("_indexes/_person.md").exists());
}

#[test]
fn second_pass_is_a_no_op() {
    let vault = tempfile::tempdir().expect("tempdir");
    let root = vault.path();
    seed(root);
    run(root, false);

    let again = run(root, false);
    assert_eq!(again.scanned, 3);
    assert_eq!(again.moved, 0);
    assert_eq!(again.retagged, 0);
    assert_eq!(again.stubs_removed, 0);
    assert!(again
        .documents
        .iter()
        .all(|d| d.action == Action::InPlace));
    let indexes = again.indexes.expect("indexes");
    assert!(indexes.written.is_empty());
    assert!(indexes.removed.is_empty());
}

#[test]
fn placement_ignores_current_location() {
    let vault = tempfile::tempdir().expect("tempdir");
    let root = vault.path();
    write(root, "6_Lore/Misfiled.md", "---\ntags: [people]\n---\n");
    write(root, "1_people/Lowercase.md", "---\ntags: [people]\n---\n");

    let report = run(root, false);
    assert!(root.join("1_People/Misfiled.md").exists());
    let lower = report
        .documents
        .iter()
        .find(|d| d.source == "1_people/Lowercase.md")
        .expect("outcome");
    assert_eq!(lower.action, Action::InPlace);
}

#[test]
fn existing_target_is_never_overwritten() {
    let vault = tempfile::tempdir().expect("tempdir");
    let root = vault.path();
    write(root, "1_People/Aldric.md", "---\ntags: [people]\n---\noriginal\n");
    write(root, "inbox/Aldric.md", "---\ntags: [people]\n---\nduplicate\n");

    let report = run(root, false);
    assert_eq!(report.move_skipped, 1);
    assert_eq!(report.warnings.len(), 1);
    assert!(read(root, "1_People/Aldric.md").contains("original"));
    assert!(read(root, "inbox/Aldric.md").contains("duplicate"));

    let skipped = report
        .documents
        .iter()
        .find(|d| d.source == "inbox/Aldric.md")
        .expect("outcome");
    assert!(matches!(skipped.action, Action::MoveSkipped { .. }));
    assert_eq!(skipped.path, "inbox/Aldric.md");
}

#[test]
fn malformed_frontmatter_is_moved_but_not_rewritten() {
    let vault = tempfile::tempdir().expect("tempdir");
    let root = vault.path();
    let content = "---\ntags: [people\n---\nBody\n";
    write(root, "Broken.md", content);

    let report = run(root, false);
    assert_eq!(report.retagged, 0);
    assert_eq!(report.defaulted, 1);
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(read(root, "Uncategorized/Broken.md"), content);
}

#[test]
fn dry_run_changes_nothing() {
    let vault = tempfile::tempdir().expect("tempdir");
    let root = vault.path();
    seed(root);

    let report = run(root, true);
    assert!(report.dry_run);
    assert_eq!(report.moved, 3);
    assert_eq!(report.stubs_removed, 2);
    assert!(root.join("Oakwood.md").exists());
    assert!(root.join("Old Name.md").exists());
    assert!(!root.join("_indexes").exists());
    assert!(read(root, "Oakwood.md").contains("- Forests"));

    let oak = report
        .documents
        .iter()
        .find(|d| d.source == "Oakwood.md")
        .expect("outcome");
    assert_eq!(oak.path, "2_Locations/Wilderness/Oakwood.md");
    assert_eq!(oak.tags, vec!["forests", "locations"]);
}

#[test]
fn cleanup_can_be_disabled() {
    let vault = tempfile::tempdir().expect("tempdir");
    let root = vault.path();
    write(root, "Old Name.md", "#REDIRECT [[Aldric]]\n");

    let (config, rules) = setup();
    let mut options = OrganizeOptions::from_config(&config);
    options.cleanup = None;
    let report = organize_vault(root, &rules, &options).expect("organize");
    assert_eq!(report.stubs_removed, 0);
    assert!(root.join("Uncategorized/Old Name.md").exists());
}

#[test]
fn invalid_utf8_is_placed_but_never_rewritten() {
    let vault = tempfile::tempdir().expect("tempdir");
    let root = vault.path();
    let bytes: &[u8] = b"---\ntags: [people]\n---\ncaf\xe9\n";
    fs::write(root.join("Latin1.md"), bytes).expect("write note");

    let report = run(root, false);
    assert!(report.failures.is_empty(), "{:?}", report.failures);
    assert_eq!(report.moved, 1);
    assert_eq!(report.defaulted, 1);
    assert_eq!(report.retagged, 0);
    assert_eq!(report.warnings.len(), 1);
    assert!(!root.join("Latin1.md").exists());
    assert_eq!(
        fs::read(root.join("Uncategorized/Latin1.md")).expect("read moved note"),
        bytes
    );
}

#[test]
fn one_failing_document_does_not_stop_the_pass() {
    let vault = tempfile::tempdir().expect("tempdir");
    let root = vault.path();
    // A plain file where the people folder should be makes that move fail.
    write(root, "1_People", "not a folder");
    write(root, "inbox/Aldric.md", "---\ntags: [person]\n---\nBody\n");
    write(root, "Oakwood.md", "---\ntags: [forests]\n---\n");

    let report = run(root, false);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].path, "inbox/Aldric.md");
    assert_eq!(report.moved, 1);
    assert_eq!(report.retagged, 1);

    assert_eq!(
        read(root, "inbox/Aldric.md"),
        "---\ntags: [person]\n---\nBody\n"
    );
    assert_eq!(
        read(root, "2_Locations/Wilderness/Oakwood.md"),
        "---\ntags:\n- forests\n- locations\n---\n"
    );
    assert_eq!(
        read(root, "_indexes/_forests.md"),
        "# Index for #forests\n- [[Oakwood]]\n"
    );
    assert!(!root.join("_indexes/_people.md").exists());
}

#[test]
fn dry_run_predicts_the_real_run() {
    let seed = |root: &Path| {
        write(root, "a/Aldric.md", "---\ntags: [people]\n---\n");
        write(root, "b/Aldric.md", "---\ntags: [people]\n---\n");
        write(root, "1_People/Note.md", "---\ntags: [locations]\n---\n");
        write(root, "inbox/Note.md", "---\ntags: [people]\n---\n");
    };
    let actions = |report: &RunReport| -> Vec<(String, String)> {
        report
            .documents
            .iter()
            .map(|d| {
                let kind = match d.action {
                    Action::InPlace => "in_place",
                    Action::Moved => "moved",
                    Action::MoveSkipped { .. } => "move_skipped",
                    Action::RemovedStub { .. } => "removed_stub",
                };
                (d.source.clone(), kind.to_string())
            })
            .collect()
    };

    let dry_vault = tempfile::tempdir().expect("tempdir");
    seed(dry_vault.path());
    let dry = run(dry_vault.path(), true);

    let real_vault = tempfile::tempdir().expect("tempdir");
    seed(real_vault.path());
    let real = run(real_vault.path(), false);

    assert_eq!(actions(&dry), actions(&real));
    assert_eq!(dry.moved, 3);
    assert_eq!(dry.move_skipped, 1);
    let skipped = dry
        .documents
        .iter()
        .find(|d| d.source == "b/Aldric.md")
        .expect("outcome");
    assert!(matches!(skipped.action, Action::MoveSkipped { .. }));
}

#[test]
fn invalid_index_folder_aborts_before_touching_notes() {
    let vault = tempfile::tempdir().expect("tempdir");
    let root = vault.path();
    write(root, "1_People/Aldric.md", "---\ntags: [people]\n---\n");
    write(root, "Aldric.md", "---\ntags: [people]\n---\n");

    let (config, rules) = setup();
    for bad in ["", ".", ".."] {
        let mut options = OrganizeOptions::from_config(&config);
        options.index_folder = bad.to_string();
        let err = organize_vault(root, &rules, &options).unwrap_err();
        assert!(matches!(err, VaultError::InvalidIndexFolder(_)), "{bad}: {err}");
    }
    assert!(root.join("Aldric.md").exists());
    assert!(root.join("1_People/Aldric.md").exists());
}
