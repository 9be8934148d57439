#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure generation engine that derives the next generation on a toroidal grid.
//!
//! The engine reads one generation and writes the following one into a
//! caller-owned buffer. It never allocates, so the world can recycle the same
//! physical buffers for every generation.

use agelife_core::{CellAge, CellCoord, GridGeometry, RuleSet};

const NEIGHBOR_OFFSETS: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Computes the generation following `previous` and writes it into `next`.
///
/// A cell lives on when `rules` says so for its age in `previous` and its live
/// neighbour count. Survivors and newborns age by one, up to `max_age`; every
/// other cell is written as dead. Both buffers must hold
/// [`GridGeometry::cell_count`] cells.
pub fn advance(
    previous: &[CellAge],
    next: &mut [CellAge],
    geometry: GridGeometry,
    rules: RuleSet,
    max_age: CellAge,
) {
    debug_assert_eq!(previous.len(), geometry.cell_count());
    debug_assert_eq!(next.len(), geometry.cell_count());

    let columns = geometry.columns() as usize;
    let rows = geometry.rows() as usize;
    let mut index = 0;

    for row in 0..rows {
        for column in 0..columns {
            let neighbors = count_live_neighbors(previous, columns, rows, row, column);
            let age = previous[index];
            next[index] = if rules.keeps_alive(age, neighbors) {
                age.aged(max_age)
            } else {
                CellAge::DEAD
            };
            index += 1;
        }
    }
}

/// Counts the living cells among the eight wrapped neighbours of `cell`.
///
/// Returns zero when `cell` lies outside the grid.
#[must_use]
pub fn live_neighbors(cells: &[CellAge], geometry: GridGeometry, cell: CellCoord) -> u8 {
    if geometry.index(cell).is_none() {
        return 0;
    }
    count_live_neighbors(
        cells,
        geometry.columns() as usize,
        geometry.rows() as usize,
        cell.row() as usize,
        cell.column() as usize,
    )
}

fn count_live_neighbors(
    cells: &[CellAge],
    columns: usize,
    rows: usize,
    row: usize,
    column: usize,
) -> u8 {
    let mut live = 0;
    for (row_delta, column_delta) in NEIGHBOR_OFFSETS {
        let neighbor_row = wrap(row, row_delta, rows);
        let neighbor_column = wrap(column, column_delta, columns);
        if cells[neighbor_row * columns + neighbor_column].is_alive() {
            live += 1;
        }
    }
    live
}

fn wrap(value: usize, delta: i8, len: usize) -> usize {
    match delta {
        -1 if value == 0 => len - 1,
        -1 => value - 1,
        1 if value + 1 >= len => 0,
        1 => value + 1,
        _ => value,
    }
}
