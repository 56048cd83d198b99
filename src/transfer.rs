//! YAML export/import of text entries.
//!
//! Each scope round-trips to a human-editable `{scope}.yml` holding one
//! record per key with a map of locale → value. Contract: `export`
//! followed by `import` with `force` reproduces the database content for
//! the exported scope exactly.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::store::TextStore;

/// Scopes the transfer tooling will accept.
pub const KNOWN_SCOPES: [&str; 3] = ["global", "site", "admin"];

/// One exported record: a key and its per-locale values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextFileEntry {
    pub key: String,
    pub texts: BTreeMap<String, String>,
}

/// Counters reported by an import run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportStats {
    pub inserted: usize,
    pub updated: usize,
}

/// Validate scope names against the known scope set.
pub fn validate_scopes(scopes: &[&str]) -> Result<()> {
    for scope in scopes {
        if !KNOWN_SCOPES.contains(scope) {
            return Err(Error::InvalidArgument(format!(
                "Scope \"{}\" is not found! Available scopes is {}",
                scope,
                KNOWN_SCOPES.join(", ")
            )));
        }
    }
    Ok(())
}

/// Export texts from the store to `{scope}.yml` files under `dir`.
///
/// Existing file entries are merged in unless `clear` is set; `force`
/// gives the database precedence over the file on conflicts, otherwise
/// the file wins.
pub fn export(
    store: &TextStore,
    dir: &Path,
    scopes: &[&str],
    force: bool,
    clear: bool,
) -> Result<()> {
    validate_scopes(scopes)?;
    fs::create_dir_all(dir)?;

    for scope in scopes {
        let db_entries = entries_from_db(store, scope)?;
        let file_entries = if clear {
            BTreeMap::new()
        } else {
            entries_from_file(&dir.join(format!("{}.yml", scope)))?
        };

        let merged = if force {
            merge(file_entries, db_entries)
        } else {
            merge(db_entries, file_entries)
        };

        let records: Vec<&TextFileEntry> = merged.values().collect();
        let yaml = serde_yaml::to_string(&records)?;
        let path = dir.join(format!("{}.yml", scope));
        fs::write(&path, yaml)?;

        info!(scope, path = %path.display(), keys = merged.len(), "exported texts");
    }

    Ok(())
}

/// Import texts from `{scope}.yml` files under `dir` into the store.
///
/// Missing rows are inserted; existing rows are updated only with `force`;
/// `clear` wipes the scope before importing; `langs` restricts which
/// locales are taken from each record.
pub fn import(
    store: &TextStore,
    dir: &Path,
    scopes: &[&str],
    langs: Option<&[&str]>,
    force: bool,
    clear: bool,
) -> Result<ImportStats> {
    validate_scopes(scopes)?;

    let mut stats = ImportStats::default();
    for scope in scopes {
        let path = dir.join(format!("{}.yml", scope));
        if !path.is_file() {
            warn!(scope, path = %path.display(), "scope file not readable, skipping");
            continue;
        }

        let entries = entries_from_file(&path)?;
        if entries.is_empty() {
            warn!(scope, path = %path.display(), "scope file is empty, skipping");
            continue;
        }

        if clear {
            store.clear_scope(scope)?;
        }

        for entry in entries.values() {
            for (lang, value) in &entry.texts {
                if let Some(langs) = langs {
                    if !langs.contains(&lang.as_str()) {
                        continue;
                    }
                }

                if !store.exists(&entry.key, lang, scope)? {
                    store.insert_row(&entry.key, lang, scope, value)?;
                    stats.inserted += 1;
                } else if force {
                    store.update_value(&entry.key, lang, scope, value)?;
                    stats.updated += 1;
                }
            }
        }

        info!(
            scope,
            inserted = stats.inserted,
            updated = stats.updated,
            "imported texts"
        );
    }

    Ok(stats)
}

fn entries_from_db(store: &TextStore, scope: &str) -> Result<BTreeMap<String, TextFileEntry>> {
    let mut entries: BTreeMap<String, TextFileEntry> = BTreeMap::new();
    for row in store.rows_for_scope(scope)? {
        entries
            .entry(row.key.clone())
            .or_insert_with(|| TextFileEntry {
                key: row.key.clone(),
                texts: BTreeMap::new(),
            })
            .texts
            .insert(row.lang, row.value);
    }
    Ok(entries)
}

fn entries_from_file(path: &Path) -> Result<BTreeMap<String, TextFileEntry>> {
    if !path.is_file() {
        return Ok(BTreeMap::new());
    }

    let contents = fs::read_to_string(path)?;
    if contents.trim().is_empty() {
        return Ok(BTreeMap::new());
    }

    let records: Vec<TextFileEntry> = serde_yaml::from_str(&contents)?;
    Ok(records
        .into_iter()
        .map(|entry| (entry.key.clone(), entry))
        .collect())
}

/// Merge per-key records; `overlay` locale values win over `base`.
fn merge(
    base: BTreeMap<String, TextFileEntry>,
    overlay: BTreeMap<String, TextFileEntry>,
) -> BTreeMap<String, TextFileEntry> {
    let mut merged = base;
    for (key, entry) in overlay {
        merged
            .entry(key)
            .and_modify(|existing| {
                existing.texts.extend(entry.texts.clone());
            })
            .or_insert(entry);
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    // ==================== Helper Functions ====================

    fn create_test_store() -> (TextStore, TempDir) {
        let temp_dir = TempDir::new().expect("temp dir");
        let db_path = temp_dir.path().join("texts.db");
        let store = TextStore::open(db_path.to_str().unwrap(), "texts").expect("store");
        (store, temp_dir)
    }

    // ==================== Scope Validation Tests ====================

    #[test]
    fn test_validate_known_scopes() {
        assert!(validate_scopes(&["global", "site", "admin"]).is_ok());
    }

    #[test]
    fn test_validate_unknown_scope_fails() {
        let result = validate_scopes(&["backend"]);
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    // ==================== Export Tests ====================

    #[test]
    fn test_export_writes_scope_file() {
        let (store, temp_dir) = create_test_store();
        store
            .insert_row("hello", "en", "site", "Hello")
            .expect("insert");
        store
            .insert_row("hello", "ka", "site", "გამარჯობა")
            .expect("insert");

        let out = temp_dir.path().join("multilang");
        export(&store, &out, &["site"], false, false).expect("export");

        let entries = entries_from_file(&out.join("site.yml")).expect("parse");
        let entry = &entries["hello"];
        assert_eq!(entry.texts["en"], "Hello");
        assert_eq!(entry.texts["ka"], "გამარჯობა");
    }

    #[test]
    fn test_export_groups_langs_per_key() {
        let (store, temp_dir) = create_test_store();
        store.insert_row("a", "en", "global", "A").expect("insert");
        store.insert_row("a", "ka", "global", "B").expect("insert");
        store.insert_row("b", "en", "global", "C").expect("insert");

        let out = temp_dir.path().join("multilang");
        export(&store, &out, &["global"], false, false).expect("export");

        let entries = entries_from_file(&out.join("global.yml")).expect("parse");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries["a"].texts.len(), 2);
    }

    #[test]
    fn test_export_without_force_keeps_file_values() {
        let (store, temp_dir) = create_test_store();
        store
            .insert_row("greeting", "en", "global", "From DB")
            .expect("insert");

        let out = temp_dir.path().join("multilang");
        fs::create_dir_all(&out).expect("mkdir");
        fs::write(
            out.join("global.yml"),
            "- key: greeting\n  texts:\n    en: From file\n",
        )
        .expect("write");

        export(&store, &out, &["global"], false, false).expect("export");
        let entries = entries_from_file(&out.join("global.yml")).expect("parse");
        assert_eq!(entries["greeting"].texts["en"], "From file");
    }

    #[test]
    fn test_export_force_overwrites_file_values() {
        let (store, temp_dir) = create_test_store();
        store
            .insert_row("greeting", "en", "global", "From DB")
            .expect("insert");

        let out = temp_dir.path().join("multilang");
        fs::create_dir_all(&out).expect("mkdir");
        fs::write(
            out.join("global.yml"),
            "- key: greeting\n  texts:\n    en: From file\n    ka: Only in file\n",
        )
        .expect("write");

        export(&store, &out, &["global"], true, false).expect("export");
        let entries = entries_from_file(&out.join("global.yml")).expect("parse");
        assert_eq!(entries["greeting"].texts["en"], "From DB");
        // Non-conflicting file values survive a force export
        assert_eq!(entries["greeting"].texts["ka"], "Only in file");
    }

    #[test]
    fn test_export_clear_drops_file_values() {
        let (store, temp_dir) = create_test_store();
        store
            .insert_row("greeting", "en", "global", "From DB")
            .expect("insert");

        let out = temp_dir.path().join("multilang");
        fs::create_dir_all(&out).expect("mkdir");
        fs::write(
            out.join("global.yml"),
            "- key: stale\n  texts:\n    en: Stale\n",
        )
        .expect("write");

        export(&store, &out, &["global"], false, true).expect("export");
        let entries = entries_from_file(&out.join("global.yml")).expect("parse");
        assert!(!entries.contains_key("stale"));
        assert!(entries.contains_key("greeting"));
    }

    // ==================== Import Tests ====================

    #[test]
    fn test_import_inserts_rows() {
        let (store, temp_dir) = create_test_store();
        let dir = temp_dir.path().join("multilang");
        fs::create_dir_all(&dir).expect("mkdir");
        fs::write(
            dir.join("global.yml"),
            "- key: hello\n  texts:\n    en: Hello\n    ka: გამარჯობა\n",
        )
        .expect("write");

        let stats = import(&store, &dir, &["global"], None, false, false).expect("import");
        assert_eq!(stats.inserted, 2);
        assert_eq!(stats.updated, 0);
        assert!(store.exists("hello", "en", "global").expect("exists"));
        assert!(store.exists("hello", "ka", "global").expect("exists"));
    }

    #[test]
    fn test_import_without_force_keeps_existing() {
        let (store, temp_dir) = create_test_store();
        store
            .insert_row("hello", "en", "global", "Existing")
            .expect("insert");

        let dir = temp_dir.path().join("multilang");
        fs::create_dir_all(&dir).expect("mkdir");
        fs::write(
            dir.join("global.yml"),
            "- key: hello\n  texts:\n    en: Imported\n",
        )
        .expect("write");

        let stats = import(&store, &dir, &["global"], None, false, false).expect("import");
        assert_eq!(stats.inserted, 0);
        assert_eq!(stats.updated, 0);

        let snapshot = store.load("en", None).expect("load");
        assert_eq!(snapshot.get("hello").map(String::as_str), Some("Existing"));
    }

    #[test]
    fn test_import_force_updates_existing() {
        let (store, temp_dir) = create_test_store();
        store
            .insert_row("hello", "en", "global", "Existing")
            .expect("insert");

        let dir = temp_dir.path().join("multilang");
        fs::create_dir_all(&dir).expect("mkdir");
        fs::write(
            dir.join("global.yml"),
            "- key: hello\n  texts:\n    en: Imported\n",
        )
        .expect("write");

        let stats = import(&store, &dir, &["global"], None, true, false).expect("import");
        assert_eq!(stats.updated, 1);

        let snapshot = store.load("en", None).expect("load");
        assert_eq!(snapshot.get("hello").map(String::as_str), Some("Imported"));
    }

    #[test]
    fn test_import_lang_filter() {
        let (store, temp_dir) = create_test_store();
        let dir = temp_dir.path().join("multilang");
        fs::create_dir_all(&dir).expect("mkdir");
        fs::write(
            dir.join("global.yml"),
            "- key: hello\n  texts:\n    en: Hello\n    ka: გამარჯობა\n",
        )
        .expect("write");

        let stats = import(&store, &dir, &["global"], Some(&["en"]), false, false)
            .expect("import");
        assert_eq!(stats.inserted, 1);
        assert!(store.exists("hello", "en", "global").expect("exists"));
        assert!(!store.exists("hello", "ka", "global").expect("exists"));
    }

    #[test]
    fn test_import_clear_wipes_scope_first() {
        let (store, temp_dir) = create_test_store();
        store
            .insert_row("stale", "en", "global", "Stale")
            .expect("insert");

        let dir = temp_dir.path().join("multilang");
        fs::create_dir_all(&dir).expect("mkdir");
        fs::write(
            dir.join("global.yml"),
            "- key: fresh\n  texts:\n    en: Fresh\n",
        )
        .expect("write");

        import(&store, &dir, &["global"], None, false, true).expect("import");
        assert!(!store.exists("stale", "en", "global").expect("exists"));
        assert!(store.exists("fresh", "en", "global").expect("exists"));
    }

    #[test]
    fn test_import_missing_file_is_skipped() {
        let (store, temp_dir) = create_test_store();
        let dir = temp_dir.path().join("empty");
        fs::create_dir_all(&dir).expect("mkdir");

        let stats = import(&store, &dir, &["global"], None, false, false).expect("import");
        assert_eq!(stats, ImportStats::default());
    }

    // ==================== Round-Trip Tests ====================

    #[test]
    fn test_export_then_import_force_reproduces_scope() {
        let (store, temp_dir) = create_test_store();
        store
            .insert_row("a", "en", "site", "Value A")
            .expect("insert");
        store
            .insert_row("a", "ka", "site", "Value A ka")
            .expect("insert");
        store
            .insert_row("b", "en", "site", "Value B")
            .expect("insert");

        let dir = temp_dir.path().join("multilang");
        export(&store, &dir, &["site"], false, false).expect("export");

        let before: Vec<(String, String, String)> = store
            .rows_for_scope("site")
            .expect("rows")
            .into_iter()
            .map(|r| (r.key, r.lang, r.value))
            .collect();

        store.clear_scope("site").expect("clear");
        import(&store, &dir, &["site"], None, true, false).expect("import");

        let after: Vec<(String, String, String)> = store
            .rows_for_scope("site")
            .expect("rows")
            .into_iter()
            .map(|r| (r.key, r.lang, r.value))
            .collect();

        assert_eq!(before, after);
    }
}
