//! The persistence seam: table + conditions access used by the applier.

use crate::error::StoreError;
use crate::query::{Conditions, Fields, Value};
use crate::schema::{Column, Table};

static NULL: Value = Value::Null;

/// One row of a table, values in [`Table::columns`] order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    table: Table,
    values: Vec<Value>,
}

impl Row {
    pub fn new(table: Table, values: Vec<Value>) -> Self {
        Self { table, values }
    }

    pub fn get(&self, column: Column) -> &Value {
        self.table
            .columns()
            .iter()
            .position(|c| *c == column)
            .and_then(|i| self.values.get(i))
            .unwrap_or(&NULL)
    }

    pub fn int(&self, column: Column) -> Option<i64> {
        self.get(column).as_int()
    }

    pub fn text(&self, column: Column) -> Option<&str> {
        self.get(column).as_text()
    }

    /// Primary key; ids are never NULL in stored rows.
    pub fn id(&self) -> i64 {
        self.int(self.table.id_column()).unwrap_or_default()
    }
}

/// Table-level CRUD.
///
/// Each call is its own unit of work: there is no surrounding transaction,
/// so a failure never undoes earlier calls.
pub trait Store {
    fn find(&self, table: Table, conditions: &Conditions) -> Result<Vec<Row>, StoreError>;

    /// Insert a row and return its generated id.
    fn insert(&self, table: Table, fields: &Fields) -> Result<i64, StoreError>;

    /// Delete matching rows and return how many were removed.
    fn delete(&self, table: Table, conditions: &Conditions) -> Result<usize, StoreError>;

    fn count(&self, table: Table, conditions: &Conditions) -> Result<usize, StoreError>;

    fn exists(&self, table: Table, conditions: &Conditions) -> Result<bool, StoreError> {
        Ok(self.count(table, conditions)? > 0)
    }

    /// Id of the first row matching `lookup`, inserting `lookup` overlaid
    /// with `extra` when there is none. The flag is `true` on insert.
    fn get_or_create(
        &self,
        table: Table,
        lookup: &Fields,
        extra: &Fields,
    ) -> Result<(i64, bool), StoreError> {
        if let Some(row) = self.find(table, &Conditions::from(lookup))?.first() {
            return Ok((row.id(), false));
        }
        let id = self.insert(table, &lookup.merged(extra))?;
        Ok((id, true))
    }
}
