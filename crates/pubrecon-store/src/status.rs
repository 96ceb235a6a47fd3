//! Row counts for `pubrecon status`.

use crate::error::StoreError;
use crate::links::orphan_publications;
use crate::query::Conditions;
use crate::schema::Table;
use crate::store::Store;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreStatus {
    pub tables: Vec<(Table, usize)>,
    /// Publications with no links; anything but 0 means cleanup was skipped
    pub orphans: usize,
}

pub fn status(store: &impl Store) -> Result<StoreStatus, StoreError> {
    let tables = Table::ALL
        .iter()
        .map(|t| Ok((*t, store.count(*t, &Conditions::new())?)))
        .collect::<Result<Vec<_>, StoreError>>()?;
    let orphans = orphan_publications(store)?.len();
    Ok(StoreStatus { tables, orphans })
}
