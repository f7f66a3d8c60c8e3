//! Pixel positions of multi-tile parts, indexed by shape id.
//!
//! Each row describes one shape: column 0 is the image width, column 1 the
//! image height, then one `(x, y)` pair per part.

/// Number of shape rows.
pub const SHAPE_ROWS: usize = 16;
/// Numbers per row.
pub const ROW_LEN: usize = 34;
/// Height of one isometric tile in pixels.
pub const TILE_ISO_YLEN: i32 = 23;

/// Multi-part position table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiPositionTable {
    rows: Vec<[i32; ROW_LEN]>,
}

impl Default for MultiPositionTable {
    fn default() -> Self {
        Self {
            rows: vec![[0; ROW_LEN]; SHAPE_ROWS],
        }
    }
}

impl MultiPositionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set one value; out-of-range coordinates are ignored.
    pub fn set(&mut self, shape: usize, column: usize, value: i32) {
        if let Some(cell) = self.rows.get_mut(shape).and_then(|row| row.get_mut(column)) {
            *cell = value;
        }
    }

    /// Row of a shape and the column pair of one of its parts.
    fn part(&self, shape: i32, part: i32) -> Option<(&[i32; ROW_LEN], usize)> {
        let row = self.rows.get(usize::try_from(shape).ok()?)?;
        let column = 2 + usize::try_from(part).ok()? * 2;
        (column + 1 < ROW_LEN).then_some((row, column))
    }

    /// Horizontal pixel offset of a part. 0 for unknown shapes and parts.
    pub fn x_offset(&self, shape: i32, part: i32) -> i32 {
        self.part(shape, part).map_or(0, |(row, column)| row[column])
    }

    /// Vertical pixel offset of a part: image height minus one tile minus
    /// the part's y position. 0 for unknown shapes and parts.
    pub fn y_offset(&self, shape: i32, part: i32) -> i32 {
        self.part(shape, part)
            .map_or(0, |(row, column)| row[1] - TILE_ISO_YLEN - row[column + 1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_y_offset_formula() {
        let mut table = MultiPositionTable::new();
        table.set(2, 1, 70);
        table.set(2, 3, 0);
        table.set(2, 5, 12);

        assert_eq!(table.y_offset(2, 0), 70 - 23);
        assert_eq!(table.y_offset(2, 1), 70 - 23 - 12);
    }

    #[test]
    fn test_out_of_range_reads_zero() {
        let mut table = MultiPositionTable::new();
        table.set(0, 1, 70);
        assert_eq!(table.x_offset(99, 0), 0);
        assert_eq!(table.y_offset(-1, 0), 0);
        assert_eq!(table.y_offset(16, 0), 0);
        assert_eq!(table.y_offset(0, 16), 0);
        assert_eq!(table.y_offset(0, -1), 0);
        assert_eq!(table.y_offset(0, 15), 70 - 23);
    }
}
