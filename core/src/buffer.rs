//! Whole-buffer operations on generations of cell ages.
//!
//! These helpers know nothing about rules; they only move and compare ages.

use crate::{BufferError, CellAge};

/// Kills every cell in the buffer.
pub fn clear(buffer: &mut [CellAge]) {
    buffer.fill(CellAge::DEAD);
}

/// Overwrites `destination` with `source`.
///
/// Buffers of different lengths are rejected and `destination` is left untouched.
pub fn copy(source: &[CellAge], destination: &mut [CellAge]) -> Result<(), BufferError> {
    if source.len() != destination.len() {
        return Err(BufferError::LengthMismatch {
            source_len: source.len(),
            destination_len: destination.len(),
        });
    }
    destination.copy_from_slice(source);
    Ok(())
}

/// Reports whether two buffers hold identical ages, cell for cell.
#[must_use]
pub fn equal(first: &[CellAge], second: &[CellAge]) -> bool {
    first.len() == second.len() && first.iter().zip(second).all(|(a, b)| a == b)
}

/// Number of living cells in the buffer.
#[must_use]
pub fn live_count(buffer: &[CellAge]) -> usize {
    buffer.iter().filter(|age| age.is_alive()).count()
}
