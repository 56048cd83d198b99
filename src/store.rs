//! Persistence adapter for text entries.
//!
//! Rows live in a relational table named by config (default `texts`) with
//! a `(key, lang, scope)` uniqueness constraint. Persistence errors are
//! never swallowed here; they propagate to the caller, which decides about
//! retries.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use crate::cache::{cache_key, Snapshot};
use crate::error::Result;

/// A single text entry row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRow {
    pub key: String,
    pub lang: String,
    pub scope: String,
    pub value: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Durable store of text entries.
#[derive(Clone)]
pub struct TextStore {
    conn: Arc<Mutex<Connection>>,
    table: String,
}

impl TextStore {
    /// Open (or create) the texts database at the given path.
    pub fn open(database_path: &str, table: &str) -> Result<Self> {
        let conn = Connection::open(database_path)?;
        Self::from_connection(conn, table)
    }

    /// Open an in-memory store. Useful for short-lived tooling runs.
    pub fn open_in_memory(table: &str) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn, table)
    }

    fn from_connection(conn: Connection, table: &str) -> Result<Self> {
        conn.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS {} (
                    \"key\" TEXT NOT NULL,
                    lang TEXT NOT NULL,
                    scope TEXT NOT NULL DEFAULT 'global',
                    value TEXT NOT NULL,
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL,
                    PRIMARY KEY (\"key\", lang, scope)
                )",
                table
            ),
            [],
        )?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            table: table.to_string(),
        })
    }

    /// Name of the texts table.
    pub fn table_name(&self) -> &str {
        &self.table
    }

    /// Cache key for a (lang, scope) pair against this store's table.
    pub fn cache_name(&self, lang: &str, scope: Option<&str>) -> String {
        cache_key(&self.table, lang, scope)
    }

    /// Load the key → value snapshot for one locale.
    ///
    /// A non-"global" scope returns the union of "global" entries and
    /// entries with the given scope; rows are fetched global-first so a
    /// scoped entry deterministically wins over a global one with the same
    /// key. Without a scope (or with "global") only "global" entries are
    /// returned.
    pub fn load(&self, lang: &str, scope: Option<&str>) -> Result<Snapshot> {
        let conn = self.conn.lock().unwrap();

        let mut texts = Snapshot::new();
        match scope {
            Some(scope) if scope != "global" => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT \"key\", value FROM {}
                     WHERE lang = ?1 AND scope IN ('global', ?2)
                     ORDER BY (scope = 'global') DESC",
                    self.table
                ))?;
                let rows = stmt.query_map(params![lang, scope], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
                })?;
                for row in rows {
                    let (key, value) = row?;
                    texts.insert(key, value);
                }
            }
            _ => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT \"key\", value FROM {} WHERE lang = ?1 AND scope = 'global'",
                    self.table
                ))?;
                let rows = stmt.query_map(params![lang], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
                })?;
                for row in rows {
                    let (key, value) = row?;
                    texts.insert(key, value);
                }
            }
        }

        Ok(texts)
    }

    /// Load full rows for administrative listing, keyed lang → key → row.
    ///
    /// Both filters are optional; a scope filter unions with "global".
    pub fn load_all(
        &self,
        lang: Option<&str>,
        scope: Option<&str>,
    ) -> Result<BTreeMap<String, BTreeMap<String, TextRow>>> {
        let conn = self.conn.lock().unwrap();

        let mut sql = format!(
            "SELECT \"key\", lang, scope, value, created_at, updated_at FROM {}",
            self.table
        );
        let mut clauses = Vec::new();
        let mut args: Vec<&str> = Vec::new();
        if let Some(lang) = lang {
            args.push(lang);
            clauses.push(format!("lang = ?{}", args.len()));
        }
        if let Some(scope) = scope {
            args.push(scope);
            clauses.push(format!("scope IN ('global', ?{})", args.len()));
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(args), |row| {
            Ok(TextRow {
                key: row.get(0)?,
                lang: row.get(1)?,
                scope: row.get(2)?,
                value: row.get(3)?,
                created_at: row.get(4)?,
                updated_at: row.get(5)?,
            })
        })?;

        let mut all: BTreeMap<String, BTreeMap<String, TextRow>> = BTreeMap::new();
        for row in rows {
            let row = row?;
            all.entry(row.lang.clone())
                .or_default()
                .insert(row.key.clone(), row);
        }

        Ok(all)
    }

    /// Persist missing keys for every configured locale.
    ///
    /// Returns `false` when the input is empty, `true` once inserts were
    /// attempted. Each insert is a single atomic `INSERT OR IGNORE` keyed
    /// on the `(key, lang, scope)` uniqueness constraint, so concurrent or
    /// repeated calls never overwrite existing rows and never race between
    /// an existence check and an insert.
    pub fn save(
        &self,
        new_texts: &BTreeMap<String, String>,
        scope: Option<&str>,
        locale_codes: &[&str],
    ) -> Result<bool> {
        if new_texts.is_empty() {
            return Ok(false);
        }

        let scope = scope.unwrap_or("global");
        let now = Utc::now().to_rfc3339();

        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "INSERT OR IGNORE INTO {} (\"key\", lang, scope, value, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
            self.table
        ))?;

        for (key, value) in new_texts {
            for lang in locale_codes {
                stmt.execute(params![key, lang, scope, value, now])?;
            }
        }

        debug!(
            keys = new_texts.len(),
            locales = locale_codes.len(),
            scope, "saved missing texts"
        );

        Ok(true)
    }

    /// Whether a row exists for the exact (key, lang, scope) triple.
    pub fn exists(&self, key: &str, lang: &str, scope: &str) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let found: Option<i64> = conn
            .query_row(
                &format!(
                    "SELECT 1 FROM {} WHERE \"key\" = ?1 AND lang = ?2 AND scope = ?3",
                    self.table
                ),
                params![key, lang, scope],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// All rows for one scope, ordered by key then lang. Used by export.
    pub fn rows_for_scope(&self, scope: &str) -> Result<Vec<TextRow>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT \"key\", lang, scope, value, created_at, updated_at FROM {}
             WHERE scope = ?1 ORDER BY \"key\", lang",
            self.table
        ))?;
        let rows = stmt.query_map(params![scope], |row| {
            Ok(TextRow {
                key: row.get(0)?,
                lang: row.get(1)?,
                scope: row.get(2)?,
                value: row.get(3)?,
                created_at: row.get(4)?,
                updated_at: row.get(5)?,
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Into::into)
    }

    /// Insert one row with fresh timestamps. Used by import.
    pub fn insert_row(&self, key: &str, lang: &str, scope: &str, value: &str) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        let conn = self.conn.lock().unwrap();
        conn.execute(
            &format!(
                "INSERT INTO {} (\"key\", lang, scope, value, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
                self.table
            ),
            params![key, lang, scope, value, now],
        )?;
        Ok(())
    }

    /// Update the value of an existing row. Used by `import --force`.
    pub fn update_value(&self, key: &str, lang: &str, scope: &str, value: &str) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        let conn = self.conn.lock().unwrap();
        conn.execute(
            &format!(
                "UPDATE {} SET value = ?4, updated_at = ?5
                 WHERE \"key\" = ?1 AND lang = ?2 AND scope = ?3",
                self.table
            ),
            params![key, lang, scope, value, now],
        )?;
        Ok(())
    }

    /// Delete every row of one scope. Used by `import --clear`.
    pub fn clear_scope(&self, scope: &str) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let deleted = conn.execute(
            &format!("DELETE FROM {} WHERE scope = ?1", self.table),
            params![scope],
        )?;
        Ok(deleted)
    }
}
