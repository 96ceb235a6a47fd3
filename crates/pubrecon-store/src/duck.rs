//! DuckDB-backed [`Store`].

use std::path::Path;

use anyhow::{Context, Result};
use duckdb::{Connection, params_from_iter};

use crate::error::StoreError;
use crate::query::{self, Conditions, Fields, Value};
use crate::schema::{ColumnKind, Table, create_schema_sql};
use crate::store::{Row, Store};

/// A single serial DuckDB session; every statement auto-commits.
pub struct DuckStore {
    conn: Connection,
}

impl DuckStore {
    /// Open (or create) a database file and make sure the schema exists.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn =
            Connection::open_in_memory().context("Failed to open DuckDB in-memory connection")?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Create sequences and tables that do not exist yet.
    pub fn init_schema(&self) -> Result<()> {
        self.conn
            .execute_batch(&create_schema_sql())
            .context("Failed to create schema")
    }

    pub(crate) fn connection(&self) -> &Connection {
        &self.conn
    }
}

fn read_row(table: Table, row: &duckdb::Row<'_>) -> duckdb::Result<Row> {
    let mut values = Vec::with_capacity(table.columns().len());
    for (i, column) in table.columns().iter().enumerate() {
        let value = match column.kind() {
            ColumnKind::Int => Value::from(row.get::<_, Option<i64>>(i)?),
            ColumnKind::Text => Value::from(row.get::<_, Option<String>>(i)?),
        };
        values.push(value);
    }
    Ok(Row::new(table, values))
}

impl Store for DuckStore {
    fn find(&self, table: Table, conditions: &Conditions) -> Result<Vec<Row>, StoreError> {
        let stmt = query::select(table, conditions)?;
        log::trace!("{}", stmt.sql);
        let mut prepared = self.conn.prepare(&stmt.sql)?;
        let rows = prepared.query_map(params_from_iter(stmt.params), |row| read_row(table, row))?;
        Ok(rows.collect::<duckdb::Result<Vec<_>>>()?)
    }

    fn insert(&self, table: Table, fields: &Fields) -> Result<i64, StoreError> {
        let stmt = query::insert(table, fields)?;
        log::trace!("{}", stmt.sql);
        let id = self
            .conn
            .query_row(&stmt.sql, params_from_iter(stmt.params), |row| row.get::<_, i64>(0))?;
        Ok(id)
    }

    fn delete(&self, table: Table, conditions: &Conditions) -> Result<usize, StoreError> {
        let stmt = query::delete(table, conditions)?;
        log::trace!("{}", stmt.sql);
        Ok(self.conn.execute(&stmt.sql, params_from_iter(stmt.params))?)
    }

    fn count(&self, table: Table, conditions: &Conditions) -> Result<usize, StoreError> {
        let stmt = query::count(table, conditions)?;
        let n = self
            .conn
            .query_row(&stmt.sql, params_from_iter(stmt.params), |row| row.get::<_, i64>(0))?;
        Ok(usize::try_from(n).unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Column;

    #[test]
    fn insert_find_delete() {
        let store = DuckStore::open_in_memory().unwrap();
        let a = store
            .insert(Table::Journal, &Fields::new().set(Column::JournalName, "JAMA"))
            .unwrap();
        let b = store
            .insert(Table::Journal, &Fields::new().set(Column::JournalName, "NEJM"))
            .unwrap();
        assert_ne!(a, b);

        let rows = store
            .find(Table::Journal, &Conditions::new().eq(Column::JournalName, "NEJM"))
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id(), b);

        let removed = store
            .delete(Table::Journal, &Conditions::new().eq(Column::JournalId, a))
            .unwrap();
        assert_eq!(removed, 1);
        assert_eq!(store.count(Table::Journal, &Conditions::new()).unwrap(), 1);
    }

    #[test]
    fn schema_bootstrap_is_idempotent() {
        let store = DuckStore::open_in_memory().unwrap();
        store.init_schema().unwrap();
        store.init_schema().unwrap();
        for table in Table::ALL {
            assert_eq!(store.count(table, &Conditions::new()).unwrap(), 0);
        }
    }

    #[test]
    fn nullable_columns_round_trip() {
        let store = DuckStore::open_in_memory().unwrap();
        let id = store
            .insert(
                Table::Publication,
                &Fields::new()
                    .set(Column::PublicationJournal, 1i64)
                    .set(Column::Title, "Study of X")
                    .set(Column::Doi, None::<String>),
            )
            .unwrap();
        let rows = store
            .find(Table::Publication, &Conditions::new().eq(Column::Doi, None::<String>))
            .unwrap();
        assert_eq!(rows[0].id(), id);
        assert_eq!(rows[0].text(Column::Title), Some("Study of X"));
        assert_eq!(rows[0].get(Column::DatePublished), &Value::Null);
    }
}
