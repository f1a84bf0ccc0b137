//! Derivation pipeline: filter, then sort
//!
//! The derived view is cached as a list of store positions and rebuilt
//! eagerly whenever rows, filters or the sort change.

use super::filter::FilterState;
use super::row::RowStore;
use super::sort::{SortDirection, SortState};
use super::value::compare_values;

/// Compute the derived view as positions into `store.rows()`.
///
/// Rows failing any filter are dropped. The survivors keep store order
/// unless a sort is active, in which case they are stably sorted by the
/// sort column's value; ties keep their filtered order.
pub fn derive_positions(store: &RowStore, filters: &FilterState, sort: &SortState) -> Vec<usize> {
    let rows = store.rows();
    let mut positions: Vec<usize> = rows
        .iter()
        .enumerate()
        .filter(|(_, row)| filters.accepts(row))
        .map(|(pos, _)| pos)
        .collect();

    if let (Some(key), Some(direction)) = (sort.column(), sort.direction()) {
        positions.sort_by(|&a, &b| {
            let ordering = compare_values(rows[a].get(key), rows[b].get(key));
            match direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            }
        });
    }

    positions
}
