use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Where the cursor and viewport were when a directory was last shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SavedPosition {
    pub index: usize,
    pub offset: usize,
}

/// Last cursor position per directory.
///
/// Positions are flat indices, so they stay meaningful when the grid is
/// reshaped by a resize.
#[derive(Debug, Default)]
pub struct PositionMemory {
    positions: HashMap<PathBuf, SavedPosition>,
}

impl PositionMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn save(&mut self, dir: &Path, index: usize, offset: usize) {
        self.positions
            .insert(dir.to_path_buf(), SavedPosition { index, offset });
    }

    pub fn get(&self, dir: &Path) -> Option<SavedPosition> {
        self.positions.get(dir).copied()
    }

    pub fn clear(&mut self) {
        self.positions.clear();
    }

    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
