//! Resident rows: loading for the matcher and CSV import.

use std::path::Path;

use anyhow::{Context, Result, bail};
use pubrecon_core::ResidentRecord;

use crate::duck::DuckStore;
use crate::error::StoreError;
use crate::query::{Conditions, Fields};
use crate::schema::{Column, Table};
use crate::store::{Row, Store};

fn to_record(row: &Row) -> Option<ResidentRecord> {
    Some(ResidentRecord {
        id: row.id(),
        first_name: row.text(Column::FirstName)?.to_string(),
        middle_name: row
            .text(Column::MiddleName)
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(String::from),
        last_name: row.text(Column::LastName)?.to_string(),
        match_year: i32::try_from(row.int(Column::MatchYear)?).ok()?,
        grad_year: i32::try_from(row.int(Column::GradYear)?).ok()?,
    })
}

/// All residents, ordered by id.
pub fn load_residents(store: &impl Store) -> Result<Vec<ResidentRecord>, StoreError> {
    let rows = store.find(Table::Resident, &Conditions::new())?;
    Ok(rows.iter().filter_map(to_record).collect())
}

/// Fields identifying a resident for duplicate detection.
fn identity(first: &str, middle: Option<&str>, last: &str) -> Fields {
    Fields::new()
        .set(Column::FirstName, first)
        .set(Column::MiddleName, middle)
        .set(Column::LastName, last)
}

/// Insert a resident unless one with the same names exists. Returns the id
/// and whether a row was inserted.
pub fn add_resident(
    store: &impl Store,
    first: &str,
    middle: Option<&str>,
    last: &str,
    match_year: i32,
    grad_year: i32,
) -> Result<(i64, bool), StoreError> {
    store.get_or_create(
        Table::Resident,
        &identity(first, middle, last),
        &Fields::new()
            .set(Column::MatchYear, match_year)
            .set(Column::GradYear, grad_year),
    )
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub rows: usize,
    pub inserted: usize,
    pub existing: usize,
    pub invalid: usize,
}

fn parse_year(raw: &str) -> Option<i32> {
    // spreadsheets export years like "2,015"
    raw.trim().replace(',', "").parse().ok()
}

const CSV_COLUMNS: [&str; 5] = ["first_name", "middle_name", "last_name", "match_year", "grad_year"];

/// Import residents from a CSV with a header row naming
/// `first_name, middle_name, last_name, match_year, grad_year`.
pub fn import_residents_csv(store: &DuckStore, path: &Path) -> Result<ImportSummary> {
    if !path.is_file() {
        bail!("Residents CSV not found: {}", path.display());
    }
    let escaped = path.display().to_string().replace('\'', "''");
    let sql = format!(
        "SELECT {} FROM read_csv('{escaped}', header = true, all_varchar = true)",
        CSV_COLUMNS.join(", ")
    );

    let records: Vec<[Option<String>; 5]> = {
        let mut stmt = store
            .connection()
            .prepare(&sql)
            .with_context(|| format!("Failed to read residents CSV: {}", path.display()))?;
        let rows = stmt.query_map([], |row| {
            Ok([
                row.get::<_, Option<String>>(0)?,
                row.get::<_, Option<String>>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, Option<String>>(4)?,
            ])
        })?;
        rows.collect::<duckdb::Result<_>>()
            .with_context(|| format!("Malformed residents CSV: {}", path.display()))?
    };

    let mut summary = ImportSummary {
        rows: records.len(),
        ..ImportSummary::default()
    };
    for (line, [first, middle, last, match_year, grad_year]) in records.iter().enumerate() {
        let text = |v: &Option<String>| {
            v.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
        };
        let parsed = (
            text(first),
            text(last),
            match_year.as_deref().and_then(parse_year),
            grad_year.as_deref().and_then(parse_year),
        );
        let (Some(first), Some(last), Some(match_year), Some(grad_year)) = parsed else {
            log::warn!("Residents CSV row {}: missing name or year, skipped", line + 2);
            summary.invalid += 1;
            continue;
        };
        let middle = text(middle);

        let (_, inserted) =
            add_resident(store, &first, middle.as_deref(), &last, match_year, grad_year)
                .with_context(|| format!("Failed to insert resident {first} {last}"))?;
        if inserted {
            summary.inserted += 1;
        } else {
            summary.existing += 1;
        }
    }

    log::info!(
        "Imported residents: {} inserted, {} already present, {} invalid",
        summary.inserted,
        summary.existing,
        summary.invalid
    );
    Ok(summary)
}
