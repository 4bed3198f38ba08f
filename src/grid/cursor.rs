use super::layout::GridLayout;

/// A cursor movement over the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    Up,
    Down,
    Left,
    Right,
    Top,
    Bottom,
    Leftmost,
    Rightmost,
    PageUp,
    PageDown,
    Home,
    End,
}

impl Motion {
    /// Apply the motion to `index`, returning the new flat index.
    ///
    /// Out-of-range input is clamped first. An empty grid always yields 0.
    pub fn apply(self, index: usize, grid: &GridLayout) -> usize {
        let n = grid.file_count();
        if n == 0 || grid.rows == 0 || grid.columns == 0 {
            return 0;
        }
        let index = index.min(n - 1);
        let rows = grid.rows;
        let columns = grid.columns;
        let (mut c, mut r) = grid.position(index);
        // Last occupied row of the final column.
        let last_row = grid.last_column_len() - 1;
        let past_end = |c: usize, r: usize| c == columns - 1 && (columns - 1) * rows + r >= n;

        match self {
            Motion::Up => {
                if r > 0 {
                    r -= 1;
                } else if c > 0 {
                    r = rows - 1;
                    c -= 1;
                } else {
                    c = columns - 1;
                    r = last_row;
                }
            }
            Motion::Down => {
                r += 1;
                if r >= rows {
                    r = 0;
                    c += 1;
                }
                if c >= columns {
                    c = 0;
                }
                if past_end(c, r) {
                    c = 0;
                    r = 0;
                }
            }
            Motion::Left => {
                c = if c == 0 { columns - 1 } else { c - 1 };
                if past_end(c, r) {
                    r = last_row;
                }
            }
            Motion::Right => {
                c = if c + 1 >= columns { 0 } else { c + 1 };
                if past_end(c, r) {
                    r = last_row;
                }
            }
            Motion::Top => r = 0,
            Motion::Bottom => {
                r = rows - 1;
                if past_end(c, r) {
                    r = last_row;
                }
            }
            Motion::Leftmost => c = 0,
            Motion::Rightmost => {
                c = columns - 1;
                if past_end(c, r) {
                    r = last_row;
                }
            }
            Motion::PageUp => return index.saturating_sub(page(grid)),
            Motion::PageDown => return (index + page(grid)).min(n - 1),
            Motion::Home => return 0,
            Motion::End => return n - 1,
        }

        c * rows + r
    }
}

fn page(grid: &GridLayout) -> usize {
    (grid.columns * grid.rows).saturating_sub(1).max(1)
}
