use std::cell::Cell;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use rusqlite::types::ValueRef;
use rusqlite::{params_from_iter, Connection, OpenFlags, Row};
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::paths::resolve_db_path;
use crate::query::Query;

/// One result row keyed by column name.
pub type Record = Map<String, Value>;

/// Relational and flag columns that are dropped rather than kept as null.
const COLUMNS_TO_OMIT_IF_NULL: [&str; 9] = [
    "area",
    "area_title",
    "checklist",
    "heading",
    "heading_title",
    "project",
    "project_title",
    "trashed",
    "tags",
];

const COLUMNS_TO_TRANSFORM_TO_BOOL: [&str; 3] = ["checklist", "tags", "trashed"];

/// Read-only handle on a Things database file.
///
/// No connection is held between calls: each query opens the file
/// read-only, runs, and closes it again.
#[derive(Debug)]
pub struct Database {
    path: PathBuf,
    print_sql: bool,
    executed: Cell<usize>,
}

impl Database {
    /// Resolve the path (explicit, `THINGSDB`, default) without touching the store.
    pub fn open(path: Option<&Path>) -> Self {
        Self::at(resolve_db_path(path))
    }

    /// Use exactly `path`, skipping resolution.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            print_sql: false,
            executed: Cell::new(0),
        }
    }

    /// Echo every statement to stderr before it runs.
    pub fn print_sql(mut self, enabled: bool) -> Self {
        self.print_sql = enabled;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of statements executed so far.
    pub fn executed(&self) -> usize {
        self.executed.get()
    }

    fn storage_error(&self, source: rusqlite::Error) -> Error {
        Error::Storage {
            path: self.path.clone(),
            source,
        }
    }

    fn connect(&self) -> rusqlite::Result<Connection> {
        Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
    }

    fn trace(&self, query: &Query) {
        let n = self.executed.get() + 1;
        self.executed.set(n);
        log::debug!("query {n}: {} bound parameters", query.params.len());
        if self.print_sql {
            eprintln!("/* Query {n} */");
            if !query.params.is_empty() {
                eprintln!("/* Parameters: {:?} */", query.params);
            }
            eprintln!();
            eprintln!("{}", prettify_sql(&query.sql));
            eprintln!();
        }
    }

    /// Run `query` and convert each row with `f`.
    fn query_map<T>(
        &self,
        query: &Query,
        f: impl Fn(&Row<'_>, &[String]) -> rusqlite::Result<T>,
    ) -> Result<Vec<T>> {
        self.trace(query);
        let run = || -> rusqlite::Result<Vec<T>> {
            let conn = self.connect()?;
            let mut stmt = conn.prepare(&query.sql)?;
            let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
            let rows = stmt.query_map(params_from_iter(query.params.iter()), |row| f(row, &columns))?;
            rows.collect()
        };
        run().map_err(|e| self.storage_error(e))
    }

    /// Rows as records, with the omit-if-null and boolean rules applied.
    pub fn records(&self, query: &Query) -> Result<Vec<Record>> {
        self.query_map(query, row_to_record)
    }

    /// First column of each row as text. Null values are skipped.
    pub fn strings(&self, query: &Query) -> Result<Vec<String>> {
        let values = self.query_map(query, |row, _| row.get::<_, Option<String>>(0))?;
        Ok(values.into_iter().flatten().collect())
    }

    /// Number of distinct uuids `query` would return.
    pub fn count(&self, query: &Query) -> Result<usize> {
        let counts = self.query_map(&query.count(), |row, _| row.get::<_, i64>(0))?;
        Ok(counts.first().copied().unwrap_or(0).max(0) as usize)
    }

    /// Modification time of the database file.
    pub fn last_modified(&self) -> Result<DateTime<Local>> {
        let modified = std::fs::metadata(&self.path)?.modified()?;
        Ok(DateTime::<Local>::from(modified))
    }

    pub fn was_modified_today(&self) -> Result<bool> {
        Ok(self.last_modified()?.date_naive() >= Local::now().date_naive())
    }
}

/// Convert one row into a record keyed by `columns`.
///
/// Null columns in the omit set are dropped. Columns in the boolean set
/// become `true` when truthy and are dropped otherwise.
pub fn row_to_record(row: &Row<'_>, columns: &[String]) -> rusqlite::Result<Record> {
    let mut record = Record::new();
    for (i, name) in columns.iter().enumerate() {
        let value = json_value(row.get_ref(i)?);
        let omit_if_null = COLUMNS_TO_OMIT_IF_NULL.contains(&name.as_str());
        if COLUMNS_TO_TRANSFORM_TO_BOOL.contains(&name.as_str()) {
            if is_truthy(&value) {
                record.insert(name.clone(), Value::Bool(true));
            } else if !omit_if_null {
                record.insert(name.clone(), value);
            }
            continue;
        }
        if value.is_null() && omit_if_null {
            continue;
        }
        record.insert(name.clone(), value);
    }
    Ok(record)
}

fn json_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => Value::from(f),
        ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::String(String::from_utf8_lossy(b).into_owned()),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Strip indentation and blank lines so statements read well in a terminal.
pub fn prettify_sql(sql: &str) -> String {
    let lines: Vec<&str> = sql.lines().filter(|l| !l.trim().is_empty()).collect();
    let indent = lines
        .iter()
        .map(|l| l.len() - l.trim_start_matches([' ', '\t']).len())
        .min()
        .unwrap_or(0);
    lines
        .iter()
        .map(|l| l[indent..].trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture;

    #[test]
    fn record_drops_null_relations_and_boolifies_flags() {
        let conn = Connection::open_in_memory().unwrap();
        let mut stmt = conn
            .prepare(
                "SELECT 'U' AS uuid, NULL AS area, NULL AS notes, 1 AS tags, \
                 0 AS checklist, NULL AS trashed, 'P' AS project",
            )
            .unwrap();
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let record = stmt
            .query_row([], |row| row_to_record(row, &columns))
            .unwrap();

        assert_eq!(record["uuid"], "U");
        assert!(!record.contains_key("area"));
        assert!(record.contains_key("notes"));
        assert!(record["notes"].is_null());
        assert_eq!(record["tags"], Value::Bool(true));
        assert!(!record.contains_key("checklist"));
        assert!(!record.contains_key("trashed"));
        assert_eq!(record["project"], "P");
    }

    #[test]
    fn strings_and_count() {
        let fx = fixture::Fixture::new();
        let db = Database::at(fx.path());
        let titles = db.strings(&crate::query::tag_titles_query()).unwrap();
        assert_eq!(titles, vec!["Errand", "Important", "Waiting"]);
        assert_eq!(db.count(&crate::query::tags_query(None)).unwrap(), 3);
        assert_eq!(db.executed(), 2);
    }

    #[test]
    fn missing_file_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::at(dir.path().join("missing.sqlite"));
        let err = db.records(&crate::query::tags_query(None)).unwrap_err();
        assert!(matches!(err, Error::Storage { .. }));
        assert!(err.is_fatal());
    }

    #[test]
    fn store_is_opened_read_only() {
        let fx = fixture::Fixture::new();
        let db = Database::at(fx.path());
        let err = db
            .records(&Query::new("DELETE FROM TMTag"))
            .unwrap_err();
        assert!(matches!(err, Error::Storage { .. }));
        assert_eq!(db.strings(&crate::query::tag_titles_query()).unwrap().len(), 3);
    }

    #[test]
    fn modification_time() {
        let fx = fixture::Fixture::new();
        let db = Database::at(fx.path());
        assert!(db.was_modified_today().unwrap());
    }

    #[test]
    fn prettify_removes_indentation_and_blank_lines() {
        let sql = "\n            SELECT\n                title\n\n            FROM TMTag\n            ";
        assert_eq!(prettify_sql(sql), "SELECT\n    title\nFROM TMTag");
    }
}
