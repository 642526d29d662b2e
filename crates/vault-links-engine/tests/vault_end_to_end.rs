use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use vault_links_engine::{Preset, RemapTable, WriteMode, process_vault};

fn vault_with(files: &[(&str, &str)]) -> TempDir {
    let vault = tempfile::tempdir().unwrap();
    for (relative_path, content) in files {
        let path = vault.path().join(relative_path);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }
    vault
}

fn read(vault: &TempDir, relative_path: &str) -> String {
    fs::read_to_string(vault.path().join(relative_path)).unwrap()
}

fn run(vault: &Path, preset: Preset, remap: &RemapTable) -> vault_links_engine::RunSummary {
    process_vault(vault, &preset.pipeline(remap), WriteMode::Write).unwrap()
}

#[test]
fn full_pipeline_fixes_bracket_links_and_over_encoding() {
    let vault = vault_with(&[(
        "Overview.md",
        "# Overview\nLogin goes through [[Auth]].\nDetails: [Auth](Auth%2520System.md)",
    )]);

    let summary = run(vault.path(), Preset::Full, &RemapTable::new());

    assert_eq!(summary.modified.len(), 1);
    insta::assert_snapshot!(read(&vault, "Overview.md"), @r"
# Overview
Login goes through [Auth](Auth.md).
Details: [Auth](Auth%20System.md)
");
}

#[test]
fn convert_leaves_hidden_folders_and_clean_documents_alone() {
    let vault = vault_with(&[
        ("Index.md", "- [[Database Layer]]\n- [[API Design|API]]"),
        ("Clean.md", "[Index](Index.md)"),
        (".obsidian/templates/Template.md", "[[Placeholder]]"),
    ]);

    let summary = run(vault.path(), Preset::Convert, &RemapTable::new());

    assert_eq!(summary.total(), 2);
    assert_eq!(summary.modified.len(), 1);
    assert_eq!(summary.modified[0].report.bracket_links, 2);
    assert_eq!(
        read(&vault, "Index.md"),
        "- [Database Layer](Database%20Layer.md)\n- [API](API%20Design.md)"
    );
    assert_eq!(
        read(&vault, ".obsidian/templates/Template.md"),
        "[[Placeholder]]"
    );
}

#[test]
fn second_run_changes_nothing() {
    let vault = vault_with(&[
        ("a.md", "[[My%20Doc]] and [b](B C.md)"),
        ("nested/c.md", "[d](D%252520E.md) [[F|f]]"),
    ]);

    for preset in [Preset::Convert, Preset::Full, Preset::Normalize, Preset::Repair] {
        run(vault.path(), preset, &RemapTable::new());
        let again = run(vault.path(), preset, &RemapTable::new());
        assert!(!again.has_changes(), "{preset} was not stable");
    }

    assert_eq!(read(&vault, "a.md"), "[My%20Doc](My%20Doc.md) and [b](B%20C.md)");
    assert_eq!(read(&vault, "nested/c.md"), "[d](D%20E.md) [f](F.md)");
}

#[test]
fn migrate_points_links_at_reorganised_documents() {
    let vault = vault_with(&[
        ("README.md", "[Auth](Authentication%20System.md)"),
        (
            "04-testing/Testing Strategy.md",
            "[Auth](Authentication System.md) [JWT](JWT%20Token%20Manager)",
        ),
    ]);
    let remap = RemapTable::from_pairs([
        ("Authentication System", "02-backend/auth/Authentication System"),
        ("JWT Token Manager", "02-backend/auth/JWT Token Manager"),
    ])
    .unwrap();

    let summary = run(vault.path(), Preset::Migrate, &remap);

    assert_eq!(summary.modified.len(), 2);
    assert_eq!(
        read(&vault, "README.md"),
        "[Auth](02-backend/auth/Authentication%20System.md)"
    );
    assert_eq!(
        read(&vault, "04-testing/Testing Strategy.md"),
        "[Auth](../02-backend/auth/Authentication%20System.md) \
         [JWT](../02-backend/auth/JWT%20Token%20Manager.md)"
    );
}
