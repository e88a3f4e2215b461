//! File-backed relational store (SQLite).
//!
//! [`Store`] is the single store handle of a run. It is created by the caller and passed to
//! every operation that reads or writes tables.

use std::path::Path;

use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{params_from_iter, Connection, OptionalExtension};

use crate::error::{PipelineError, PipelineResult};
use crate::types::{DataSet, DataType, Field, Schema, Value};

/// Prefix of the table a replacement is staged in before it is swapped in.
const STAGING_PREFIX: &str = "__staging_";

/// Handle to a SQLite database.
#[derive(Debug)]
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open (or create) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> PipelineResult<Self> {
        Ok(Self {
            conn: Connection::open(path)?,
        })
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> PipelineResult<Self> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
        })
    }

    /// Borrow the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Whether a table named `table` exists.
    pub fn table_exists(&self, table: &str) -> PipelineResult<bool> {
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
                [table],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Column names of `table`, in declaration order. Empty if the table does not exist.
    pub fn table_columns(&self, table: &str) -> PipelineResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM pragma_table_info(?1) ORDER BY cid")?;
        let names = stmt
            .query_map([table], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }

    /// Number of rows in `table`.
    pub fn row_count(&self, table: &str) -> PipelineResult<usize> {
        let n: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", quote_ident(table)),
            [],
            |row| row.get(0),
        )?;
        Ok(usize::try_from(n).unwrap_or_default())
    }

    /// Run a read query and materialize its result.
    ///
    /// SQLite is dynamically typed, so column types are taken from the returned values:
    /// integer-only columns become [`DataType::Int64`], columns with any real become
    /// [`DataType::Float64`], anything with text (or only nulls) becomes [`DataType::Utf8`].
    pub fn query(&self, sql: &str) -> PipelineResult<DataSet> {
        let mut stmt = self.conn.prepare(sql)?;
        let names: Vec<String> = stmt.column_names().into_iter().map(str::to_owned).collect();
        let width = names.len();

        let mut rows: Vec<Vec<Value>> = Vec::new();
        let mut cursor = stmt.query([])?;
        while let Some(row) = cursor.next()? {
            let mut out = Vec::with_capacity(width);
            for idx in 0..width {
                out.push(match row.get_ref(idx)? {
                    ValueRef::Null => Value::Null,
                    ValueRef::Integer(v) => Value::Int64(v),
                    ValueRef::Real(v) => Value::Float64(v),
                    ValueRef::Text(t) | ValueRef::Blob(t) => {
                        Value::Utf8(String::from_utf8_lossy(t).into_owned())
                    }
                });
            }
            rows.push(out);
        }

        let fields = names
            .into_iter()
            .enumerate()
            .map(|(idx, name)| Field::new(name, unify_column(&rows, idx)))
            .collect::<Vec<_>>();
        for row in &mut rows {
            for (value, field) in row.iter_mut().zip(&fields) {
                coerce(value, field.data_type);
            }
        }

        Ok(DataSet::new(Schema::new(fields), rows))
    }

    /// Drop `table` (if present) and recreate it with the contents of `dataset`.
    ///
    /// The new contents are written to a staging table and swapped in within one transaction:
    /// readers see either the old table or the complete new one.
    pub fn replace_table(&mut self, table: &str, dataset: &DataSet) -> PipelineResult<()> {
        if dataset.schema.fields.is_empty() {
            return Err(PipelineError::schema(format!(
                "cannot create table '{table}' without columns"
            )));
        }

        let staging = quote_ident(&format!("{STAGING_PREFIX}{table}"));
        let target = quote_ident(table);
        let columns = dataset
            .schema
            .fields
            .iter()
            .map(|f| format!("{} {}", quote_ident(&f.name), sql_type(f.data_type)))
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = (1..=dataset.schema.fields.len())
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");

        let tx = self.conn.transaction()?;
        tx.execute_batch(&format!(
            "DROP TABLE IF EXISTS {staging}; CREATE TABLE {staging} ({columns});"
        ))?;
        {
            let mut insert = tx.prepare(&format!("INSERT INTO {staging} VALUES ({placeholders})"))?;
            for row in &dataset.rows {
                insert.execute(params_from_iter(row.iter().map(to_sql)))?;
            }
        }
        tx.execute_batch(&format!(
            "DROP TABLE IF EXISTS {target}; ALTER TABLE {staging} RENAME TO {target};"
        ))?;
        tx.commit()?;
        Ok(())
    }
}

/// Double-quote an identifier, doubling embedded quotes.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn sql_type(data_type: DataType) -> &'static str {
    match data_type {
        DataType::Int64 | DataType::Bool => "INTEGER",
        DataType::Float64 => "REAL",
        DataType::Utf8 => "TEXT",
    }
}

fn to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Int64(v) => SqlValue::Integer(*v),
        Value::Float64(v) => SqlValue::Real(*v),
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Utf8(s) => SqlValue::Text(s.clone()),
    }
}

fn unify_column(rows: &[Vec<Value>], idx: usize) -> DataType {
    let mut out: Option<DataType> = None;
    for value in rows.iter().filter_map(|r| r.get(idx)) {
        out = match (out, value) {
            (_, Value::Null) => out,
            (_, Value::Utf8(_)) | (Some(DataType::Utf8), _) => return DataType::Utf8,
            (None | Some(DataType::Int64), Value::Int64(_) | Value::Bool(_)) => {
                Some(DataType::Int64)
            }
            (_, Value::Int64(_) | Value::Float64(_) | Value::Bool(_)) => Some(DataType::Float64),
        };
    }
    out.unwrap_or(DataType::Utf8)
}

fn coerce(value: &mut Value, data_type: DataType) {
    let converted = match (&*value, data_type) {
        (Value::Int64(v), DataType::Float64) => Value::Float64(*v as f64),
        (Value::Int64(v), DataType::Utf8) => Value::Utf8(v.to_string()),
        (Value::Float64(v), DataType::Utf8) => Value::Utf8(v.to_string()),
        _ => return,
    };
    *value = converted;
}

#[cfg(test)]
mod tests {
    use super::{quote_ident, Store};
    use crate::types::{DataSet, DataType, Field, Schema, Value};

    fn people(names: &[&str]) -> DataSet {
        DataSet::new(
            Schema::new(vec![
                Field::new("Customer ID", DataType::Utf8),
                Field::new("score", DataType::Float64),
                Field::new("active", DataType::Bool),
            ]),
            names
                .iter()
                .enumerate()
                .map(|(i, n)| {
                    vec![
                        Value::Utf8((*n).to_string()),
                        Value::Float64(i as f64 + 0.5),
                        Value::Bool(i % 2 == 0),
                    ]
                })
                .collect(),
        )
    }

    #[test]
    fn replace_table_discards_previous_contents() {
        let mut store = Store::open_in_memory().unwrap();
        store.replace_table("people", &people(&["a", "b", "c"])).unwrap();
        store.replace_table("people", &people(&["z"])).unwrap();

        assert_eq!(store.row_count("people").unwrap(), 1);
        assert_eq!(
            store.table_columns("people").unwrap(),
            vec!["Customer ID", "score", "active"]
        );
        assert!(!store.table_exists("__staging_people").unwrap());
    }

    #[test]
    fn query_types_columns_from_values() {
        let mut store = Store::open_in_memory().unwrap();
        store.replace_table("people", &people(&["a", "b"])).unwrap();

        let ds = store
            .query(r#"SELECT "Customer ID", score, active, NULL AS empty_col FROM people"#)
            .unwrap();
        let types: Vec<DataType> = ds.schema.fields.iter().map(|f| f.data_type).collect();
        assert_eq!(
            types,
            vec![DataType::Utf8, DataType::Float64, DataType::Int64, DataType::Utf8]
        );
        assert_eq!(ds.rows[0][2], Value::Int64(1));
        assert_eq!(ds.rows[1][3], Value::Null);
    }

    #[test]
    fn mixed_integer_and_real_columns_widen_to_float() {
        let store = Store::open_in_memory().unwrap();
        let ds = store.query("SELECT 1 AS n UNION ALL SELECT 2.5").unwrap();
        assert_eq!(ds.schema.fields[0].data_type, DataType::Float64);
        assert_eq!(ds.rows[0][0], Value::Float64(1.0));
    }

    #[test]
    fn missing_table_is_a_storage_error() {
        let store = Store::open_in_memory().unwrap();
        assert!(!store.table_exists("orders").unwrap());
        assert!(store.table_columns("orders").unwrap().is_empty());
        let err = store.query("SELECT * FROM orders").unwrap_err();
        assert!(err.to_string().starts_with("storage error"));
    }

    #[test]
    fn identifiers_are_quoted() {
        assert_eq!(quote_ident("Sub-Category"), "\"Sub-Category\"");
        assert_eq!(quote_ident("a\"b"), "\"a\"\"b\"");
    }

    #[test]
    fn tables_without_columns_are_rejected() {
        let mut store = Store::open_in_memory().unwrap();
        let empty = DataSet::new(Schema::new(vec![]), vec![]);
        assert!(store.replace_table("empty", &empty).is_err());
    }
}
