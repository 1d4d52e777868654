use siteforge::core::manifest::{
    Manifest, ManifestError, INDEX_FILE, LICENSE_FILE, README_FILE,
};

fn full_manifest() -> Manifest {
    let mut manifest = Manifest::new();
    manifest.insert(README_FILE, "# demo site");
    manifest.insert(LICENSE_FILE, "MIT License");
    manifest.insert(INDEX_FILE, "<html></html>");
    manifest.insert("about.html", "<p>about</p>");
    manifest.insert("assets/app.css", "body {}");
    manifest
}

#[test]
fn validate_accepts_complete_manifest() {
    assert!(full_manifest().validate().is_ok());
}

#[test]
fn validate_accepts_degenerate_three_file_manifest() {
    let mut manifest = Manifest::new();
    manifest.insert(README_FILE, "# demo");
    manifest.insert(LICENSE_FILE, "MIT License");
    manifest.insert(INDEX_FILE, "<html></html>");
    assert!(manifest.validate().is_ok());
    assert_eq!(manifest.len(), 3);
}

#[test]
fn validate_reports_each_missing_mandatory_file() {
    for missing in [README_FILE, LICENSE_FILE, INDEX_FILE] {
        let mut manifest = full_manifest();
        manifest.remove(missing);
        assert_eq!(
            manifest.validate(),
            Err(ManifestError::MissingMandatoryFile {
                name: missing.to_string()
            }),
        );
    }
}

#[test]
fn mandatory_detection_is_case_insensitive_on_file_name_only() {
    let mut manifest = Manifest::new();
    manifest.insert("readme.md", "# demo");
    manifest.insert("license", "MIT License");
    manifest.insert("INDEX.HTML", "<html></html>");
    assert!(manifest.validate().is_ok());

    // A nested key never satisfies a mandatory file.
    let mut nested = Manifest::new();
    nested.insert("docs/README.md", "# demo");
    nested.insert(LICENSE_FILE, "MIT License");
    nested.insert(INDEX_FILE, "<html></html>");
    assert_eq!(
        nested.validate(),
        Err(ManifestError::MissingMandatoryFile {
            name: README_FILE.to_string()
        }),
    );
}

#[test]
fn derive_index_is_byte_identical_across_calls() {
    let manifest = full_manifest();
    let first = manifest.derive_index();
    let second = manifest.derive_index();
    assert_eq!(first, second);

    // Insertion order does not matter: the key set determines the output.
    let mut reordered = Manifest::new();
    reordered.insert("assets/app.css", "body {}");
    reordered.insert("about.html", "<p>about</p>");
    reordered.insert(INDEX_FILE, "<html></html>");
    reordered.insert(LICENSE_FILE, "MIT License");
    reordered.insert(README_FILE, "# demo site");
    assert_eq!(reordered.derive_index(), first);
}

#[test]
fn derive_index_links_every_other_key() {
    let manifest = full_manifest();
    let index = manifest.derive_index();
    for key in manifest.keys() {
        if key == INDEX_FILE {
            continue;
        }
        assert!(index.contains(&format!("href=\"{key}\"")), "missing link for {key}");
    }
    assert!(!index.contains(&format!("href=\"{INDEX_FILE}\"")));
}

#[test]
fn derive_index_content_changes_with_key_set() {
    let mut manifest = full_manifest();
    let before = manifest.derive_index();
    manifest.insert("contact.html", "<p>contact</p>");
    let after = manifest.derive_index();
    assert_ne!(before, after);
    assert!(after.contains("contact.html"));
}

#[test]
fn insert_normalizes_keys_and_rejects_empties() {
    let mut manifest = Manifest::new();
    assert!(manifest.insert("./pages/a.html", "x"));
    assert!(manifest.contains("pages/a.html"));
    assert!(!manifest.insert("   ", "x"));
    assert!(!manifest.insert("././", "x"));
}

#[test]
fn insert_replaces_existing_key() {
    let mut manifest = Manifest::new();
    manifest.insert("a.txt", "one");
    manifest.insert("a.txt", "two");
    assert_eq!(manifest.get("a.txt"), Some("two"));
    assert_eq!(manifest.len(), 1);
}
