use super::normalize;

/// Growable memory addressed by a single pointer
///
/// Moving off either end grows the tape with a zero cell, so the pointer is
/// always within `0..len` and the tape is never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Tape {
    cells: Vec<u8>,
    pointer: usize,
}

impl Default for Tape {
    fn default() -> Self {
        Self::new()
    }
}

impl Tape {
    pub fn new() -> Self {
        Self {
            cells: vec![0],
            pointer: 0,
        }
    }

    /// Build a tape from existing cells, the pointer is clamped onto the last cell
    pub fn from_cells(mut cells: Vec<u8>, pointer: usize) -> Self {
        if cells.is_empty() {
            cells.push(0);
        }
        let pointer = pointer.min(cells.len() - 1);
        Self { cells, pointer }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always false, a tape holds at least one cell
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn pointer(&self) -> usize {
        self.pointer
    }

    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    pub fn cell_at(&self, index: usize) -> Option<u8> {
        self.cells.get(index).copied()
    }

    /// The value under the pointer
    pub fn get(&self) -> u8 {
        self.cells[self.pointer]
    }

    /// Store any integer into the active cell, reduced modulo 256
    pub fn set(&mut self, value: i64) {
        self.cells[self.pointer] = normalize(value);
    }

    pub fn add(&mut self, by: i64) {
        self.set(self.get() as i64 + by);
    }

    /// Returns true when a cell had to be prepended, shifting every cell one index right
    pub fn move_left(&mut self) -> bool {
        if self.pointer == 0 {
            self.cells.insert(0, 0);
            true
        } else {
            self.pointer -= 1;
            false
        }
    }

    pub fn move_right(&mut self) {
        self.pointer += 1;
        if self.pointer == self.cells.len() {
            self.cells.push(0);
        }
    }

    /// Insert a zero cell at the pointer, shifting the active cell (and everything after it) right.
    /// Returns the index that was inserted.
    pub fn insert_at_pointer(&mut self) -> usize {
        self.cells.insert(self.pointer, 0);
        self.pointer
    }

    /// Remove the active cell, shifting everything after it left.
    /// Removing the only cell leaves a single zero cell behind.
    /// Returns the index that was removed.
    pub fn remove_at_pointer(&mut self) -> usize {
        let index = self.pointer;
        if self.cells.len() == 1 {
            self.cells[0] = 0;
            return index;
        }

        self.cells.remove(index);
        if self.pointer == self.cells.len() {
            self.pointer -= 1;
        }
        index
    }
}
