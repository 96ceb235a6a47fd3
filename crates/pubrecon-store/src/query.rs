//! Parameterized statement builder.
//!
//! Identifiers come from [`Table`]/[`Column`]; every value is bound as a
//! `?` parameter.

use duckdb::types::{ToSql, ToSqlOutput};

use crate::error::StoreError;
use crate::schema::{Column, ColumnKind, Table};

/// A bindable column value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Null,
    Int(i64),
    Text(String),
}

impl Value {
    fn fits(&self, kind: ColumnKind) -> bool {
        matches!(
            (self, kind),
            (Value::Null, _) | (Value::Int(_), ColumnKind::Int) | (Value::Text(_), ColumnKind::Text)
        )
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> duckdb::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::Owned(match self {
            Value::Null => duckdb::types::Value::Null,
            Value::Int(i) => duckdb::types::Value::BigInt(*i),
            Value::Text(s) => duckdb::types::Value::Text(s.clone()),
        }))
    }
}

/// Column/value pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fields(Vec<(Column, Value)>);

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, column: Column, value: impl Into<Value>) -> Self {
        let value = value.into();
        match self.0.iter_mut().find(|(c, _)| *c == column) {
            Some(slot) => slot.1 = value,
            None => self.0.push((column, value)),
        }
        self
    }

    /// `self` overlaid with `other`; `other` wins on conflicts.
    pub fn merged(&self, other: &Fields) -> Fields {
        other
            .0
            .iter()
            .fold(self.clone(), |acc, (c, v)| acc.set(*c, v.clone()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Column, Value)> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Equality conditions joined with `AND`; `Null` means `IS NULL`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conditions(Fields);

impl Conditions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(self, column: Column, value: impl Into<Value>) -> Self {
        Self(self.0.set(column, value))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&Fields> for Conditions {
    fn from(fields: &Fields) -> Self {
        Self(fields.clone())
    }
}

/// SQL text plus its bound parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
}

fn check(table: Table, column: Column, value: &Value) -> Result<(), StoreError> {
    if column.table() != table {
        return Err(StoreError::ColumnMismatch { table, column });
    }
    if !value.fits(column.kind()) {
        return Err(StoreError::TypeMismatch { column });
    }
    Ok(())
}

fn where_clause(table: Table, conditions: &Conditions) -> Result<(String, Vec<Value>), StoreError> {
    let mut clauses = Vec::new();
    let mut params = Vec::new();
    for (column, value) in conditions.0.iter() {
        check(table, *column, value)?;
        if *value == Value::Null {
            clauses.push(format!("{} IS NULL", column.name()));
        } else {
            clauses.push(format!("{} = ?", column.name()));
            params.push(value.clone());
        }
    }
    if clauses.is_empty() {
        Ok((String::new(), params))
    } else {
        Ok((format!(" WHERE {}", clauses.join(" AND ")), params))
    }
}

fn column_list(table: Table) -> String {
    table
        .columns()
        .iter()
        .map(|c| c.name())
        .collect::<Vec<_>>()
        .join(", ")
}

/// `SELECT <all columns> ... ORDER BY id`
pub fn select(table: Table, conditions: &Conditions) -> Result<Statement, StoreError> {
    let (filter, params) = where_clause(table, conditions)?;
    Ok(Statement {
        sql: format!(
            "SELECT {} FROM {}{filter} ORDER BY {}",
            column_list(table),
            table.name(),
            table.id_column().name()
        ),
        params,
    })
}

/// `INSERT ... RETURNING id`
pub fn insert(table: Table, fields: &Fields) -> Result<Statement, StoreError> {
    if fields.is_empty() {
        return Err(StoreError::EmptyInsert(table));
    }
    let mut names = Vec::new();
    let mut params = Vec::new();
    for (column, value) in fields.iter() {
        check(table, *column, value)?;
        names.push(column.name());
        params.push(value.clone());
    }
    let placeholders = vec!["?"; names.len()].join(", ");
    Ok(Statement {
        sql: format!(
            "INSERT INTO {} ({}) VALUES ({placeholders}) RETURNING {}",
            table.name(),
            names.join(", "),
            table.id_column().name()
        ),
        params,
    })
}

/// `DELETE`; refuses an empty condition set.
pub fn delete(table: Table, conditions: &Conditions) -> Result<Statement, StoreError> {
    if conditions.is_empty() {
        return Err(StoreError::UnboundedDelete(table));
    }
    let (filter, params) = where_clause(table, conditions)?;
    Ok(Statement {
        sql: format!("DELETE FROM {}{filter}", table.name()),
        params,
    })
}

pub fn count(table: Table, conditions: &Conditions) -> Result<Statement, StoreError> {
    let (filter, params) = where_clause(table, conditions)?;
    Ok(Statement {
        sql: format!("SELECT count(*) FROM {}{filter}", table.name()),
        params,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_binds_values() {
        let stmt = select(
            Table::Publication,
            &Conditions::new()
                .eq(Column::PublicationJournal, 3i64)
                .eq(Column::Title, "Robert'); DROP TABLE resident;--"),
        )
        .unwrap();
        assert_eq!(
            stmt.sql,
            "SELECT id, journal_id, title, doi, date_published FROM publication \
             WHERE journal_id = ? AND title = ? ORDER BY id"
        );
        assert_eq!(stmt.params.len(), 2);
        assert_eq!(stmt.params[1].as_text(), Some("Robert'); DROP TABLE resident;--"));
    }

    #[test]
    fn null_condition_becomes_is_null() {
        let stmt = count(
            Table::Resident,
            &Conditions::new()
                .eq(Column::FirstName, "Jane")
                .eq(Column::MiddleName, None::<String>),
        )
        .unwrap();
        assert_eq!(
            stmt.sql,
            "SELECT count(*) FROM resident WHERE first_name = ? AND middle_name IS NULL"
        );
        assert_eq!(stmt.params, vec![Value::from("Jane")]);
    }

    #[test]
    fn insert_returns_id() {
        let stmt = insert(
            Table::Journal,
            &Fields::new().set(Column::JournalName, "JAMA"),
        )
        .unwrap();
        assert_eq!(stmt.sql, "INSERT INTO journal (name) VALUES (?) RETURNING id");
    }

    #[test]
    fn rejects_foreign_column() {
        let err = select(Table::Journal, &Conditions::new().eq(Column::Title, "x")).unwrap_err();
        assert!(matches!(
            err,
            StoreError::ColumnMismatch {
                table: Table::Journal,
                column: Column::Title
            }
        ));
    }

    #[test]
    fn rejects_wrong_type() {
        let err = insert(Table::Journal, &Fields::new().set(Column::JournalName, 5i64)).unwrap_err();
        assert!(matches!(err, StoreError::TypeMismatch { .. }));
    }

    #[test]
    fn refuses_unbounded_delete() {
        assert!(matches!(
            delete(Table::AuthorPublication, &Conditions::new()),
            Err(StoreError::UnboundedDelete(Table::AuthorPublication))
        ));
    }

    #[test]
    fn merged_fields_later_wins() {
        let base = Fields::new()
            .set(Column::Title, "A")
            .set(Column::PublicationJournal, 1i64);
        let merged = base.merged(&Fields::new().set(Column::Title, "B").set(Column::Doi, "10.1/x"));
        let cols: Vec<_> = merged.iter().map(|(c, v)| (*c, v.clone())).collect();
        assert_eq!(
            cols,
            vec![
                (Column::Title, Value::from("B")),
                (Column::PublicationJournal, Value::Int(1)),
                (Column::Doi, Value::from("10.1/x")),
            ]
        );
    }
}
