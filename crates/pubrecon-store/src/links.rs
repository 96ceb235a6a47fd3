//! Author/publication links and orphan cleanup.
//!
//! A publication with no remaining links is removed immediately after the
//! link deletion that orphaned it.

use std::collections::HashSet;

use crate::error::StoreError;
use crate::query::{Conditions, Fields};
use crate::schema::{Column, Table};
use crate::store::Store;

/// Publication ids linked to `author_id`, in link order.
pub fn linked_publications(store: &impl Store, author_id: i64) -> Result<Vec<i64>, StoreError> {
    let rows = store.find(
        Table::AuthorPublication,
        &Conditions::new().eq(Column::LinkAuthor, author_id),
    )?;
    Ok(rows
        .iter()
        .filter_map(|r| r.int(Column::LinkPublication))
        .collect())
}

/// Get-or-create the link, recording the authorship position on insert.
pub fn link(
    store: &impl Store,
    author_id: i64,
    publication_id: i64,
    order_of_authorship: Option<&str>,
) -> Result<(i64, bool), StoreError> {
    store.get_or_create(
        Table::AuthorPublication,
        &Fields::new()
            .set(Column::LinkAuthor, author_id)
            .set(Column::LinkPublication, publication_id),
        &Fields::new().set(Column::OrderOfAuthorship, order_of_authorship),
    )
}

/// Outcome of [`unlink`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Unlinked {
    pub links_removed: usize,
    pub publication_removed: bool,
}

/// Remove one author's link to a publication, then the publication itself
/// if that left it orphaned.
pub fn unlink(
    store: &impl Store,
    author_id: i64,
    publication_id: i64,
) -> Result<Unlinked, StoreError> {
    let links_removed = store.delete(
        Table::AuthorPublication,
        &Conditions::new()
            .eq(Column::LinkAuthor, author_id)
            .eq(Column::LinkPublication, publication_id),
    )?;
    let publication_removed = remove_if_orphan(store, publication_id)?;
    Ok(Unlinked {
        links_removed,
        publication_removed,
    })
}

/// Delete the publication if no link references it. Returns whether it was deleted.
pub fn remove_if_orphan(store: &impl Store, publication_id: i64) -> Result<bool, StoreError> {
    let still_linked = store.exists(
        Table::AuthorPublication,
        &Conditions::new().eq(Column::LinkPublication, publication_id),
    )?;
    if still_linked {
        return Ok(false);
    }
    let removed = store.delete(
        Table::Publication,
        &Conditions::new().eq(Column::PublicationId, publication_id),
    )?;
    if removed > 0 {
        log::debug!("Removed orphan publication {publication_id}");
    }
    Ok(removed > 0)
}

/// Ids of publications with no links.
pub fn orphan_publications(store: &impl Store) -> Result<Vec<i64>, StoreError> {
    let linked: HashSet<i64> = store
        .find(Table::AuthorPublication, &Conditions::new())?
        .iter()
        .filter_map(|r| r.int(Column::LinkPublication))
        .collect();
    Ok(store
        .find(Table::Publication, &Conditions::new())?
        .iter()
        .map(|r| r.id())
        .filter(|id| !linked.contains(id))
        .collect())
}
