//! Storage for the three rotating generation buffers and the memory buffer.

use agelife_core::{buffer, BufferError, CellAge};

/// Owns every buffer of the world. All buffers share one length for the
/// lifetime of the store.
///
/// The generation buffers live in three fixed slots. Advancing relabels the
/// slots instead of moving data: the slot that held generation `n - 2` is
/// reused for generation `n + 1`.
#[derive(Debug)]
pub(crate) struct BufferStore {
    slots: [Vec<CellAge>; 3],
    current: usize,
    previous: usize,
    second_previous: usize,
    memory: Vec<CellAge>,
}

impl BufferStore {
    pub(crate) fn new(len: usize) -> Self {
        Self {
            slots: [
                vec![CellAge::DEAD; len],
                vec![CellAge::DEAD; len],
                vec![CellAge::DEAD; len],
            ],
            current: 0,
            previous: 1,
            second_previous: 2,
            memory: vec![CellAge::DEAD; len],
        }
    }

    pub(crate) fn current(&self) -> &[CellAge] {
        &self.slots[self.current]
    }

    pub(crate) fn current_mut(&mut self) -> &mut [CellAge] {
        &mut self.slots[self.current]
    }

    pub(crate) fn previous(&self) -> &[CellAge] {
        &self.slots[self.previous]
    }

    pub(crate) fn second_previous(&self) -> &[CellAge] {
        &self.slots[self.second_previous]
    }

    pub(crate) fn memory(&self) -> &[CellAge] {
        &self.memory
    }

    /// Relabels the slots so that current becomes previous, previous becomes
    /// second previous, and the old second previous becomes the slot to overwrite.
    pub(crate) fn rotate(&mut self) {
        let recycled = self.second_previous;
        self.second_previous = self.previous;
        self.previous = self.current;
        self.current = recycled;
    }

    /// Borrows the previous generation for reading and the current slot for writing.
    pub(crate) fn advance_slots(&mut self) -> (&[CellAge], &mut [CellAge]) {
        let (read, write) = (self.previous, self.current);
        debug_assert_ne!(read, write, "generation slots must never alias");
        if read < write {
            let (head, tail) = self.slots.split_at_mut(write);
            (head[read].as_slice(), tail[0].as_mut_slice())
        } else {
            let (head, tail) = self.slots.split_at_mut(read);
            (tail[0].as_slice(), head[write].as_mut_slice())
        }
    }

    pub(crate) fn clear_history(&mut self) {
        buffer::clear(&mut self.slots[self.previous]);
        buffer::clear(&mut self.slots[self.second_previous]);
    }

    pub(crate) fn remember(&mut self) -> Result<(), BufferError> {
        buffer::copy(&self.slots[self.current], &mut self.memory)
    }

    pub(crate) fn recall(&mut self) -> Result<(), BufferError> {
        buffer::copy(&self.memory, &mut self.slots[self.current])
    }

    pub(crate) fn install(&mut self, cells: &[CellAge]) -> Result<(), BufferError> {
        buffer::copy(cells, self.current_mut())
    }
}
