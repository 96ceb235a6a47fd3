use std::path::Path;

use pubrecon_store::{
    Column, Conditions, DuckStore, Fields, Store, Table, import_residents_csv, load_residents,
    status,
};
use tempfile::TempDir;

fn write_csv(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn import_residents_from_csv() {
    let dir = TempDir::new().unwrap();
    let csv = write_csv(
        dir.path(),
        "residents.csv",
        "first_name,middle_name,last_name,match_year,grad_year\n\
         Jane,,Doe,2014,2020\n\
         John,Q,Roe,\"2,015\",2021\n\
         ,,Nameless,2015,2021\n",
    );
    let store = DuckStore::open(&dir.path().join("db").join("pubrecon.duckdb")).unwrap();

    let summary = import_residents_csv(&store, &csv).unwrap();
    assert_eq!(summary.rows, 3);
    assert_eq!(summary.inserted, 2);
    assert_eq!(summary.invalid, 1);

    // re-import creates no duplicates
    let again = import_residents_csv(&store, &csv).unwrap();
    assert_eq!(again.inserted, 0);
    assert_eq!(again.existing, 2);

    let residents = load_residents(&store).unwrap();
    assert_eq!(residents.len(), 2);
    assert_eq!(residents[0].display_name(), "Jane Doe");
    assert_eq!(residents[0].middle_name, None);
    assert_eq!(residents[1].middle_name.as_deref(), Some("Q"));
    assert_eq!(residents[1].match_year, 2015);
}

#[test]
fn missing_csv_is_an_error() {
    let dir = TempDir::new().unwrap();
    let store = DuckStore::open_in_memory().unwrap();
    assert!(import_residents_csv(&store, &dir.path().join("absent.csv")).is_err());
}

#[test]
fn database_file_persists_between_sessions() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("pubrecon.duckdb");
    let first = {
        let store = DuckStore::open(&path).unwrap();
        store
            .insert(Table::Journal, &Fields::new().set(Column::JournalName, "JAMA"))
            .unwrap()
    };
    let store = DuckStore::open(&path).unwrap();
    assert!(store
        .exists(Table::Journal, &Conditions::new().eq(Column::JournalName, "JAMA"))
        .unwrap());

    // sequence continues after reopen
    let id = store
        .insert(Table::Journal, &Fields::new().set(Column::JournalName, "NEJM"))
        .unwrap();
    assert_ne!(id, first);
}

#[test]
fn get_or_create_returns_existing_row() {
    let store = DuckStore::open_in_memory().unwrap();
    let lookup = Fields::new().set(Column::JournalName, "Lancet");
    let (a, created) = store.get_or_create(Table::Journal, &lookup, &Fields::new()).unwrap();
    assert!(created);
    let (b, created) = store.get_or_create(Table::Journal, &lookup, &Fields::new()).unwrap();
    assert!(!created);
    assert_eq!(a, b);

    let s = status(&store).unwrap();
    assert!(s.tables.contains(&(Table::Journal, 1)));
    assert_eq!(s.orphans, 0);
}
