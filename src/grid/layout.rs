/// Knobs for the grid layout algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutLimits {
    /// Upper bound on the column count.
    pub max_columns: usize,
    /// Listings longer than this use `long_list_columns` as the starting estimate.
    pub long_list_limit: usize,
    pub long_list_columns: usize,
    /// Rendered width of the separator placed between columns.
    pub separator_width: usize,
}

impl Default for LayoutLimits {
    fn default() -> Self {
        Self {
            max_columns: 15,
            long_list_limit: 100,
            long_list_columns: 4,
            separator_width: 4,
        }
    }
}

/// A converged column-major grid for a listing of `file_count` entries.
///
/// Entries fill a column top to bottom before moving to the next one, so
/// flat index `i` sits at column `i / rows`, row `i % rows`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GridLayout {
    pub columns: usize,
    pub rows: usize,
    /// Widest entry in each column, used to pad cells.
    pub column_widths: Vec<usize>,
    file_count: usize,
}

impl GridLayout {
    /// Lay out entries with the given display widths inside a `width` x `height` viewport.
    ///
    /// Names wider than the viewport are not truncated here; they end up in a
    /// single column and the renderer clips them.
    pub fn compute(widths: &[usize], width: usize, height: usize, limits: &LayoutLimits) -> Self {
        let file_count = widths.len();
        if file_count == 0 {
            return Self::default();
        }

        let third = height / 3;
        let mut columns = file_count / third.max(1);
        if file_count > limits.long_list_limit {
            columns = limits.long_list_columns;
        }
        columns = columns.min(limits.max_columns).max(1);

        // Every pass either returns or drops one column, so this many passes is always enough.
        let max_passes = columns + 1;
        let mut passes = 0;
        loop {
            passes += 1;
            let mut rows = file_count.div_ceil(columns);

            // Compact vertical whitespace, keeping room for every entry and
            // never going below a third of the viewport. From ceil(n/columns)
            // the capacity guard stops it before the first decrement; it only
            // shrinks a higher starting estimate.
            while rows * columns > file_count
                && rows > third
                && (rows - 1) * columns >= file_count
            {
                rows -= 1;
            }

            // The last column must hold at least one entry.
            while rows * columns - file_count >= rows && columns > 1 {
                columns -= 1;
            }

            if columns == 1 && rows > file_count {
                rows = file_count;
            }

            let column_widths = column_widths(widths, columns, rows);
            let total = column_widths.iter().sum::<usize>()
                + limits.separator_width * (columns - 1);

            if total > width && columns > 1 && passes < max_passes {
                columns -= 1;
                continue;
            }
            if passes >= max_passes && total > width && columns > 1 {
                log::warn!(
                    "grid layout stopped after {} passes with {} columns ({} > {})",
                    passes,
                    columns,
                    total,
                    width
                );
            }

            return Self {
                columns,
                rows,
                column_widths,
                file_count,
            };
        }
    }

    pub fn file_count(&self) -> usize {
        self.file_count
    }

    pub fn is_empty(&self) -> bool {
        self.file_count == 0
    }

    /// Column and row of a flat index.
    pub fn position(&self, index: usize) -> (usize, usize) {
        if self.rows == 0 {
            return (0, 0);
        }
        (index / self.rows, index % self.rows)
    }

    /// Flat index of a cell, or `None` for an empty cell.
    pub fn index_at(&self, column: usize, row: usize) -> Option<usize> {
        if column >= self.columns || row >= self.rows {
            return None;
        }
        let index = column * self.rows + row;
        (index < self.file_count).then_some(index)
    }

    /// Number of entries in the final column.
    pub fn last_column_len(&self) -> usize {
        if self.is_empty() {
            return 0;
        }
        self.file_count - (self.columns - 1) * self.rows
    }

    /// Rendered width of one full row including separators.
    pub fn total_width(&self, separator_width: usize) -> usize {
        if self.columns == 0 {
            return 0;
        }
        self.column_widths.iter().sum::<usize>() + separator_width * (self.columns - 1)
    }
}

fn column_widths(widths: &[usize], columns: usize, rows: usize) -> Vec<usize> {
    (0..columns)
        .map(|c| {
            let start = (c * rows).min(widths.len());
            let end = ((c + 1) * rows).min(widths.len());
            widths[start..end].iter().copied().max().unwrap_or(0)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(n: usize, name_width: usize, width: usize, height: usize) -> GridLayout {
        GridLayout::compute(&vec![name_width; n], width, height, &LayoutLimits::default())
    }

    #[test]
    fn empty_listing_has_no_grid() {
        let grid = layout(0, 10, 80, 24);
        assert_eq!((grid.columns, grid.rows), (0, 0));
        assert!(grid.is_empty());
        assert_eq!(grid.last_column_len(), 0);
    }

    #[test]
    fn single_file_is_one_cell() {
        for (w, h) in [(1, 1), (80, 24), (200, 3), (5, 100)] {
            let grid = layout(1, 12, w, h);
            assert_eq!((grid.columns, grid.rows), (1, 1), "viewport {}x{}", w, h);
        }
    }

    #[test]
    fn seven_files_in_nine_rows() {
        let grid = layout(7, 6, 80, 9);
        assert_eq!((grid.columns, grid.rows), (2, 4));
        assert_eq!(grid.last_column_len(), 3);
    }

    #[test]
    fn long_list_uses_fixed_columns() {
        let grid = layout(200, 5, 200, 30);
        assert_eq!(grid.columns, 4);
        assert_eq!(grid.rows, 50);
    }

    #[test]
    fn long_list_limit_is_configurable() {
        let limits = LayoutLimits {
            long_list_limit: 10,
            long_list_columns: 2,
            ..LayoutLimits::default()
        };
        let grid = GridLayout::compute(&[3; 11], 200, 90, &limits);
        assert_eq!(grid.columns, 2);
        assert_eq!(grid.rows, 6);
    }

    #[test]
    fn max_columns_caps_estimate() {
        let limits = LayoutLimits {
            max_columns: 3,
            ..LayoutLimits::default()
        };
        let grid = GridLayout::compute(&[2; 90], 500, 6, &limits);
        assert_eq!(grid.columns, 3);
        assert_eq!(grid.rows, 30);
    }

    #[test]
    fn few_files_fit_in_one_column() {
        let grid = layout(5, 8, 80, 24);
        assert_eq!((grid.columns, grid.rows), (1, 5));
    }

    #[test]
    fn width_overflow_drops_columns() {
        // 12 entries, height 6 -> estimate 6 columns of width 10: 6*10 + 5*4 = 80.
        let grid = layout(12, 10, 80, 6);
        assert_eq!(grid.columns, 6);
        let narrow = layout(12, 10, 79, 6);
        assert!(narrow.columns < 6);
        assert!(narrow.total_width(4) <= 79);
    }

    #[test]
    fn name_wider_than_viewport_collapses_to_one_column() {
        let grid = layout(10, 120, 80, 9);
        assert_eq!(grid.columns, 1);
        assert_eq!(grid.rows, 10);
    }

    #[test]
    fn column_widths_follow_their_entries() {
        let widths = [3, 9, 4, 2, 2, 7];
        let grid = GridLayout::compute(&widths, 80, 6, &LayoutLimits::default());
        assert_eq!((grid.columns, grid.rows), (3, 2));
        assert_eq!(grid.column_widths, vec![9, 4, 7]);
        assert_eq!(grid.total_width(4), 9 + 4 + 7 + 8);
    }

    #[test]
    fn position_and_index_agree() {
        let grid = layout(7, 6, 80, 9);
        assert_eq!(grid.position(5), (1, 1));
        assert_eq!(grid.index_at(1, 1), Some(5));
        assert_eq!(grid.index_at(1, 3), None);
        assert_eq!(grid.index_at(2, 0), None);
    }

    #[test]
    fn converged_grid_has_no_empty_last_column() {
        for n in 1..=160 {
            for height in [1, 2, 3, 5, 9, 24, 50] {
                for width in [1, 20, 80, 200] {
                    let grid = layout(n, 7, width, height);
                    assert!(grid.columns >= 1 && grid.rows >= 1);
                    assert!(
                        (grid.columns - 1) * grid.rows < n && n <= grid.columns * grid.rows,
                        "n={} {}x{} gave {}x{}",
                        n,
                        width,
                        height,
                        grid.columns,
                        grid.rows
                    );
                    if grid.columns > 1 {
                        assert!(grid.total_width(4) <= width);
                    }
                }
            }
        }
    }

    #[test]
    fn flat_index_round_trips_through_cells() {
        for n in 1..=60 {
            let grid = layout(n, 4, 80, 12);
            for i in 0..n {
                let (c, r) = grid.position(i);
                assert_eq!(c * grid.rows + r, i);
                assert_eq!(grid.index_at(c, r), Some(i));
            }
        }
    }
}
