use std::fmt;

use crate::schema::{Column, Table};

/// Error from the persistence layer.
#[derive(Debug)]
pub enum StoreError {
    /// Column used against a table it does not belong to
    ColumnMismatch { table: Table, column: Column },
    /// Value of the wrong storage class for its column
    TypeMismatch { column: Column },
    /// DELETE without conditions
    UnboundedDelete(Table),
    /// INSERT without any fields
    EmptyInsert(Table),
    /// Error reported by the database engine
    Database(duckdb::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ColumnMismatch { table, column } => {
                write!(f, "column {column} does not belong to table {table}")
            }
            Self::TypeMismatch { column } => write!(f, "value has wrong type for column {column}"),
            Self::UnboundedDelete(table) => {
                write!(f, "refusing to delete from {table} without conditions")
            }
            Self::EmptyInsert(table) => write!(f, "insert into {table} has no fields"),
            Self::Database(e) => write!(f, "database error: {e}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Database(e) => Some(e),
            _ => None,
        }
    }
}

impl From<duckdb::Error> for StoreError {
    fn from(e: duckdb::Error) -> Self {
        Self::Database(e)
    }
}
