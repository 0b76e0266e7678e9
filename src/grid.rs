/// Boolean occupancy grid: `true` marks a blocked tile.
///
/// Cells are stored row-major. Coordinates outside the grid read as free,
/// so callers never have to bounds-check before querying.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OccupancyGrid {
    pub width: usize,
    pub height: usize,
    cells: Vec<bool>,
}

impl OccupancyGrid {
    /// Create an all-free grid.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![false; width * height],
        }
    }

    /// Build a grid from text rows where `#` is blocked and anything else is free.
    /// Short rows are padded with free cells up to the widest row.
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Self {
        let width = rows
            .iter()
            .map(|r| r.as_ref().chars().count())
            .max()
            .unwrap_or(0);
        let mut grid = Self::new(width, rows.len());
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.as_ref().chars().enumerate() {
                if ch == '#' {
                    grid.set(x as i32, y as i32, true);
                }
            }
        }
        grid
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        Some(y as usize * self.width + x as usize)
    }

    /// Whether the tile is blocked. Out-of-bounds tiles are free.
    pub fn is_blocked(&self, x: i32, y: i32) -> bool {
        self.index(x, y).map(|i| self.cells[i]).unwrap_or(false)
    }

    /// Set a tile's state. Out-of-bounds writes are ignored.
    pub fn set(&mut self, x: i32, y: i32, blocked: bool) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = blocked;
        }
    }

    pub fn blocked_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// OR another grid of identical dimensions into this one.
    pub(crate) fn merge_from(&mut self, other: &OccupancyGrid) {
        debug_assert_eq!((self.width, self.height), (other.width, other.height));
        for (cell, &src) in self.cells.iter_mut().zip(other.cells.iter()) {
            *cell |= src;
        }
    }
}
