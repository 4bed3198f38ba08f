/// Recompute the first visible row so that `cursor_row` stays on screen.
///
/// `height` is the number of visible rows; a zero height is treated as one.
/// When every row fits, the offset is always 0.
pub fn update_offset(cursor_row: usize, offset: usize, height: usize, total_rows: usize) -> usize {
    let height = height.max(1);
    if total_rows <= height {
        return 0;
    }

    let mut offset = offset;
    if cursor_row >= offset + height {
        offset = cursor_row + 1 - height;
    }
    if cursor_row < offset {
        offset = cursor_row;
    }
    offset.min(total_rows - height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scrolls_down_just_enough() {
        assert_eq!(update_offset(10, 0, 5, 20), 6);
    }

    #[test]
    fn scrolls_up_to_reveal() {
        assert_eq!(update_offset(2, 6, 5, 20), 2);
    }

    #[test]
    fn keeps_offset_while_visible() {
        assert_eq!(update_offset(8, 6, 5, 20), 6);
    }

    #[test]
    fn clamps_to_last_page() {
        assert_eq!(update_offset(19, 18, 5, 20), 15);
    }

    #[test]
    fn everything_fits() {
        assert_eq!(update_offset(3, 2, 10, 4), 0);
    }

    #[test]
    fn zero_height_behaves_like_one_row() {
        assert_eq!(update_offset(7, 0, 0, 20), 7);
    }

    #[test]
    fn cursor_is_always_visible() {
        for total in 1..30 {
            for height in 1..12 {
                for offset in 0..30 {
                    for row in 0..total {
                        let new = update_offset(row, offset, height, total);
                        assert!(new <= row && row < new + height);
                        if total > height {
                            assert!(new <= total - height);
                        } else {
                            assert_eq!(new, 0);
                        }
                    }
                }
            }
        }
    }
}
