//! Tile grid storage - rectangular or ragged
//!
//! A [`TileGrid`] maps `(row, col)` to [`Tile`]. Each row carries its own
//! starting column and length, so ragged shapes such as triangular maps are
//! a configuration rather than a special case; a rectangular grid is simply
//! every row spanning the same interval.
//!
//! [`TileMap`] is a value map that shares a grid's exact shape, used to hold
//! per-tile results (visibility flags, reveal ticks) without re-deriving the
//! shape.

use thiserror::Error;

use shadowline_types::Tile;

/// Errors from grid construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("unknown tile character {ch:?} in row {row}")]
    UnknownTile { ch: char, row: usize },
    #[error("row {row} has a gap; each row must cover one contiguous column interval")]
    GapInRow { row: usize },
}

#[derive(Debug, Clone, PartialEq)]
struct RowSpan<T> {
    start_col: i32,
    cells: Vec<T>,
}

impl<T> RowSpan<T> {
    /// Inclusive column interval, or `None` for an empty row.
    fn span(&self) -> Option<(i32, i32)> {
        if self.cells.is_empty() {
            None
        } else {
            Some((self.start_col, self.start_col + self.cells.len() as i32 - 1))
        }
    }

    fn get(&self, col: i32) -> Option<&T> {
        let idx = usize::try_from(col.checked_sub(self.start_col)?).ok()?;
        self.cells.get(idx)
    }

    fn get_mut(&mut self, col: i32) -> Option<&mut T> {
        let idx = usize::try_from(col.checked_sub(self.start_col)?).ok()?;
        self.cells.get_mut(idx)
    }
}

/// A 2-D grid of tiles with per-row column intervals.
#[derive(Debug, Clone, PartialEq)]
pub struct TileGrid {
    rows: Vec<RowSpan<Tile>>,
}

impl TileGrid {
    /// A rectangular grid with every cell set to `fill`.
    pub fn rectangular(height: usize, width: usize, fill: Tile) -> Self {
        let rows = (0..height)
            .map(|_| RowSpan {
                start_col: 0,
                cells: vec![fill; width],
            })
            .collect();
        TileGrid { rows }
    }

    /// A triangular grid of the given height: row `n` spans columns
    /// `[height-1-n, height-1+n]`, widening by one tile on each side per row.
    pub fn triangular(height: usize, fill: Tile) -> Self {
        let h = height as i32;
        let rows = (0..h)
            .map(|n| RowSpan {
                start_col: h - 1 - n,
                cells: vec![fill; (2 * n + 1) as usize],
            })
            .collect();
        TileGrid { rows }
    }

    /// Build a grid from explicit `(start_col, tiles)` rows.
    pub fn from_rows(rows: Vec<(i32, Vec<Tile>)>) -> Self {
        TileGrid {
            rows: rows
                .into_iter()
                .map(|(start_col, cells)| RowSpan { start_col, cells })
                .collect(),
        }
    }

    /// Parse a grid from newline-separated text.
    ///
    /// Leading blanks set a row's starting column; `'#'`, `'·'`/`'.'` and
    /// `'@'` parse as tiles; trailing blanks are ignored. A blank inside a
    /// row is an error, since rows are contiguous intervals.
    ///
    /// ```
    /// use shadowline_core::grid::TileGrid;
    /// use shadowline_types::Tile;
    ///
    /// let grid = TileGrid::from_text("  ·\n ·#·\n··@··").unwrap();
    /// assert_eq!(grid.get(0, 2), Some(Tile::Floor));
    /// assert_eq!(grid.get(1, 2), Some(Tile::Wall));
    /// assert_eq!(grid.get(2, 2), Some(Tile::Occupant));
    /// assert_eq!(grid.get(0, 0), None);
    /// ```
    pub fn from_text(text: &str) -> Result<Self, GridError> {
        let mut rows = Vec::new();
        for (row, line) in text.lines().enumerate() {
            let line = line.trim_end_matches(is_blank);
            let mut start_col = 0i32;
            let mut cells = Vec::new();
            for ch in line.chars() {
                if is_blank(ch) {
                    if cells.is_empty() {
                        start_col += 1;
                    } else {
                        return Err(GridError::GapInRow { row });
                    }
                } else {
                    let tile = Tile::from_char(ch).ok_or(GridError::UnknownTile { ch, row })?;
                    cells.push(tile);
                }
            }
            rows.push(RowSpan { start_col, cells });
        }
        Ok(TileGrid { rows })
    }

    /// Number of rows, including empty ones.
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// True when the grid holds no tiles at all.
    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(|r| r.cells.is_empty())
    }

    /// The inclusive column interval of `row`, or `None` if the row does not
    /// exist or is empty.
    pub fn row_span(&self, row: i32) -> Option<(i32, i32)> {
        self.rows.get(usize::try_from(row).ok()?)?.span()
    }

    /// Tile at `(row, col)`, or `None` out of bounds.
    pub fn get(&self, row: i32, col: i32) -> Option<Tile> {
        let span = self.rows.get(usize::try_from(row).ok()?)?;
        span.get(col).copied()
    }

    /// Replace the tile at `(row, col)`. Returns `false` out of bounds.
    pub fn set(&mut self, row: i32, col: i32, tile: Tile) -> bool {
        let Ok(idx) = usize::try_from(row) else {
            return false;
        };
        let Some(span) = self.rows.get_mut(idx) else {
            return false;
        };
        match span.get_mut(col) {
            Some(cell) => {
                *cell = tile;
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, row: i32, col: i32) -> bool {
        self.get(row, col).is_some()
    }

    /// Wall predicate with the out-of-bounds policy the boundary tracer
    /// expects: anything outside the grid is not a wall.
    pub fn is_wall(&self, row: i32, col: i32) -> bool {
        matches!(self.get(row, col), Some(Tile::Wall))
    }

    /// The first `'@'` tile in row-major order, if any.
    pub fn find_occupant(&self) -> Option<(i32, i32)> {
        self.iter().find_map(|(row, col, tile)| {
            (tile == Tile::Occupant).then_some((row, col))
        })
    }

    /// Iterate all tiles as `(row, col, tile)`.
    pub fn iter(&self) -> impl Iterator<Item = (i32, i32, Tile)> + '_ {
        self.rows.iter().enumerate().flat_map(|(r, span)| {
            span.cells
                .iter()
                .enumerate()
                .map(move |(i, tile)| (r as i32, span.start_col + i as i32, *tile))
        })
    }

    /// Enumerate every west edge: positions where a non-wall (or
    /// out-of-grid) cell sits immediately west of a wall. Each such position
    /// is the canonical starting point of exactly one boundary loop.
    pub fn west_edges(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.rows.iter().enumerate().flat_map(move |(r, span)| {
            let row = r as i32;
            let (start, end) = span.span().unwrap_or((0, -1));
            // Start one column before the row so a wall at the row's western
            // boundary gets an edge too.
            ((start - 1)..end).filter_map(move |col| {
                (!self.is_wall(row, col) && self.is_wall(row, col + 1)).then_some((row, col + 1))
            })
        })
    }
}

/// A value map sharing a [`TileGrid`]'s shape.
#[derive(Debug, Clone, PartialEq)]
pub struct TileMap<T> {
    rows: Vec<RowSpan<T>>,
}

impl<T: Clone> TileMap<T> {
    /// A map with `value` at every position of `grid`.
    pub fn filled(grid: &TileGrid, value: T) -> Self {
        TileMap {
            rows: grid
                .rows
                .iter()
                .map(|span| RowSpan {
                    start_col: span.start_col,
                    cells: vec![value.clone(); span.cells.len()],
                })
                .collect(),
        }
    }
}

impl<T> TileMap<T> {
    pub fn get(&self, row: i32, col: i32) -> Option<&T> {
        let span = self.rows.get(usize::try_from(row).ok()?)?;
        span.get(col)
    }

    pub fn get_mut(&mut self, row: i32, col: i32) -> Option<&mut T> {
        let idx = usize::try_from(row).ok()?;
        self.rows.get_mut(idx)?.get_mut(col)
    }

    /// Replace the value at `(row, col)`. Returns `false` out of bounds.
    pub fn set(&mut self, row: i32, col: i32, value: T) -> bool {
        match self.get_mut(row, col) {
            Some(cell) => {
                *cell = value;
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (i32, i32, &T)> {
        self.rows.iter().enumerate().flat_map(|(r, span)| {
            span.cells
                .iter()
                .enumerate()
                .map(move |(i, value)| (r as i32, span.start_col + i as i32, value))
        })
    }
}

fn is_blank(ch: char) -> bool {
    // Regular space, or the non-breaking space pasted maps often carry.
    ch == ' ' || ch == '\u{a0}'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rectangular_bounds() {
        let grid = TileGrid::rectangular(3, 5, Tile::Floor);
        assert_eq!(grid.height(), 3);
        assert_eq!(grid.row_span(1), Some((0, 4)));
        assert_eq!(grid.get(2, 4), Some(Tile::Floor));
        assert_eq!(grid.get(3, 0), None);
        assert_eq!(grid.get(0, 5), None);
        assert_eq!(grid.get(-1, 0), None);
        assert_eq!(grid.get(0, -1), None);
    }

    #[test]
    fn triangular_spans_widen_per_row() {
        let grid = TileGrid::triangular(4, Tile::Floor);
        assert_eq!(grid.row_span(0), Some((3, 3)));
        assert_eq!(grid.row_span(1), Some((2, 4)));
        assert_eq!(grid.row_span(3), Some((0, 6)));
        assert!(grid.contains(2, 1));
        assert!(!grid.contains(0, 2));
    }

    #[test]
    fn set_and_get() {
        let mut grid = TileGrid::rectangular(2, 2, Tile::Floor);
        assert!(grid.set(1, 1, Tile::Wall));
        assert_eq!(grid.get(1, 1), Some(Tile::Wall));
        assert!(!grid.set(2, 0, Tile::Wall));
    }

    #[test]
    fn from_text_ragged() {
        let grid = TileGrid::from_text("  @\n ···\n##···").unwrap();
        assert_eq!(grid.row_span(0), Some((2, 2)));
        assert_eq!(grid.row_span(1), Some((1, 3)));
        assert_eq!(grid.row_span(2), Some((0, 4)));
        assert_eq!(grid.find_occupant(), Some((0, 2)));
        assert!(grid.is_wall(2, 0));
        assert!(!grid.is_wall(2, 2));
        assert!(!grid.is_wall(-1, 0));
    }

    #[test]
    fn from_text_rejects_gaps_and_unknown_chars() {
        assert_eq!(
            TileGrid::from_text("·· ··"),
            Err(GridError::GapInRow { row: 0 })
        );
        assert_eq!(
            TileGrid::from_text("·x·"),
            Err(GridError::UnknownTile { ch: 'x', row: 0 })
        );
    }

    #[test]
    fn west_edges_include_grid_boundary() {
        // Wall at the western end of the row still yields an edge.
        let grid = TileGrid::from_text("#·#").unwrap();
        let edges: Vec<_> = grid.west_edges().collect();
        assert_eq!(edges, vec![(0, 0), (0, 2)]);
    }

    #[test]
    fn west_edges_one_per_wall_run() {
        let grid = TileGrid::from_text("·##·#").unwrap();
        let edges: Vec<_> = grid.west_edges().collect();
        assert_eq!(edges, vec![(0, 1), (0, 4)]);
    }

    #[test]
    fn tile_map_shares_shape() {
        let grid = TileGrid::triangular(3, Tile::Floor);
        let mut map = TileMap::filled(&grid, false);
        assert!(map.set(0, 2, true));
        assert_eq!(map.get(0, 2), Some(&true));
        assert_eq!(map.get(0, 0), None);
        assert!(!map.set(0, 0, true));
    }

    #[test]
    fn empty_grid() {
        let grid = TileGrid::from_rows(vec![]);
        assert!(grid.is_empty());
        let grid = TileGrid::from_text("").unwrap();
        assert!(grid.is_empty());
    }
}
