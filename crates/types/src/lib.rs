//! Shared data types for the shadowline engine.
//!
//! Everything here is a pure data structure with no I/O and no dependency on
//! the algorithms, so the same types can back the visibility engine, the
//! trace variant, and the boundary tracer.
//!
//! # Coordinate conventions
//!
//! Grid coordinates are `(row, col)` with rows growing downward and columns
//! growing rightward. The scan engine works in sector-local `(depth, col)`
//! coordinates and maps them onto the grid through a [`Quadrant`].
//!
//! Boundary paths use [`HalfCoord`] fixed-point coordinates so that bevel
//! midpoints (half a tile along an edge) stay exact and hashable.
//!
//! # Examples
//!
//! ```
//! use shadowline_types::{Edge, Slope, Tile};
//!
//! // Tiles parse from the characters used by map fixtures.
//! assert_eq!(Tile::from_char('#'), Some(Tile::Wall));
//! assert_eq!(Tile::Floor.as_char(), '·');
//!
//! // Slopes compare exactly, without reduction.
//! assert_eq!(Slope::new(1, 2), Slope::new(2, 4));
//! assert!(Slope::new(1, 3) < Slope::new(1, 2));
//!
//! // Edges rotate clockwise around a tile.
//! assert_eq!(Edge::North.rotated_cw(), Edge::East);
//! ```

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// One cell of a tile grid.
///
/// `Occupant` marks the viewer's own cell. It is always visible and never
/// blocks sight, and it is deliberately *neither* a wall nor a floor for the
/// scan's transition tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tile {
    Wall,
    Floor,
    Occupant,
}

impl Tile {
    /// Parse a tile from its map character.
    ///
    /// Accepts `'#'` (wall), `'·'` or `'.'` (floor), and `'@'` (occupant).
    pub fn from_char(ch: char) -> Option<Self> {
        match ch {
            '#' => Some(Tile::Wall),
            '·' | '.' => Some(Tile::Floor),
            '@' => Some(Tile::Occupant),
            _ => None,
        }
    }

    /// The canonical map character for this tile.
    pub fn as_char(self) -> char {
        match self {
            Tile::Wall => '#',
            Tile::Floor => '·',
            Tile::Occupant => '@',
        }
    }

    pub fn is_wall(self) -> bool {
        self == Tile::Wall
    }

    pub fn is_floor(self) -> bool {
        self == Tile::Floor
    }
}

/// Which side of a tile a boundary position sits on.
///
/// The contour walk travels clockwise around a wall cluster, so each edge
/// implies a travel direction: `North` edges travel east, `East` edges travel
/// south, and so on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Edge {
    North,
    South,
    East,
    West,
}

impl Edge {
    /// Rotate clockwise around the tile: North → East → South → West → North.
    ///
    /// This is the edge an exterior corner turns onto.
    pub fn rotated_cw(self) -> Self {
        match self {
            Edge::North => Edge::East,
            Edge::East => Edge::South,
            Edge::South => Edge::West,
            Edge::West => Edge::North,
        }
    }

    /// Parse an edge from its name or single-letter form (case-insensitive).
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "north" | "n" => Some(Edge::North),
            "south" | "s" => Some(Edge::South),
            "east" | "e" => Some(Edge::East),
            "west" | "w" => Some(Edge::West),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Edge::North => "north",
            Edge::South => "south",
            Edge::East => "east",
            Edge::West => "west",
        }
    }

    /// Offset from the tile center to this edge's midpoint, in tile units.
    pub fn offset(self) -> (f64, f64) {
        match self {
            Edge::North => (-0.5, 0.0),
            Edge::South => (0.5, 0.0),
            Edge::East => (0.0, 0.5),
            Edge::West => (0.0, -0.5),
        }
    }
}

/// One of the four 90°-reflected copies of the scan axes.
///
/// The scan itself always walks "down and outward" in sector-local
/// `(depth, col)` coordinates; a quadrant maps that pair onto absolute grid
/// offsets. Bit 0 of the quadrant index negates the major axis and bit 1
/// swaps the axes, covering all four cardinal directions from one scan body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quadrant {
    /// Depth grows toward larger rows.
    Down,
    /// Depth grows toward smaller rows.
    Up,
    /// Depth grows toward larger columns.
    Right,
    /// Depth grows toward smaller columns.
    Left,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [Quadrant::Down, Quadrant::Up, Quadrant::Right, Quadrant::Left];

    pub fn index(self) -> u8 {
        match self {
            Quadrant::Down => 0,
            Quadrant::Up => 1,
            Quadrant::Right => 2,
            Quadrant::Left => 3,
        }
    }

    fn flips_major(self) -> bool {
        matches!(self, Quadrant::Up | Quadrant::Left)
    }

    fn swaps_axes(self) -> bool {
        matches!(self, Quadrant::Right | Quadrant::Left)
    }

    /// Map a sector-local `(depth, col)` pair to a `(row, col)` grid offset.
    pub fn offset(self, depth: i32, col: i32) -> (i32, i32) {
        let mut major = depth;
        let mut minor = col;
        if self.flips_major() {
            major = -major;
        }
        if self.swaps_axes() {
            std::mem::swap(&mut major, &mut minor);
        }
        (major, minor)
    }

    /// Float variant of [`Quadrant::offset`] for fractional sector-boundary
    /// endpoints, which may land between columns.
    pub fn offset_f64(self, depth: f64, col: f64) -> (f64, f64) {
        let mut major = depth;
        let mut minor = col;
        if self.flips_major() {
            major = -major;
        }
        if self.swaps_axes() {
            std::mem::swap(&mut major, &mut minor);
        }
        (major, minor)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Quadrant::Down => "down",
            Quadrant::Up => "up",
            Quadrant::Right => "right",
            Quadrant::Left => "left",
        }
    }
}

/// An exact rational slope `num/den` with `den > 0`.
///
/// Slopes bound visibility sectors as they diverge from the viewer, and the
/// scan's tie-break rules depend on *exact* equality, so comparison is done
/// by cross-multiplication in `i64` and never through floating point.
/// Fractions are not kept reduced; `1/2` and `2/4` compare equal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Slope {
    pub num: i32,
    pub den: i32,
}

impl Slope {
    /// A new slope. `den` must be positive; every denominator the engine
    /// produces is a doubled depth, so this holds by construction.
    pub fn new(num: i32, den: i32) -> Self {
        debug_assert!(den > 0, "slope denominator must be positive");
        Slope { num, den }
    }

    /// The slope of the ray through the near corner of column `col` at the
    /// given depth: `(2·col − 1) / (2·depth)`.
    pub fn through(depth: i32, col: i32) -> Self {
        Slope::new(2 * col - 1, 2 * depth)
    }

    /// Floating approximation, for display and logs only.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }
}

impl PartialEq for Slope {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Slope {}

impl PartialOrd for Slope {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Slope {
    fn cmp(&self, other: &Self) -> Ordering {
        // Both denominators are positive, so cross-multiplication preserves
        // the ordering.
        let lhs = i64::from(self.num) * i64::from(other.den);
        let rhs = i64::from(other.num) * i64::from(self.den);
        lhs.cmp(&rhs)
    }
}

impl fmt::Display for Slope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

/// A coordinate in half-tile steps.
///
/// Contour bevels place vertices halfway along a tile edge; storing doubled
/// integers keeps those positions exact, comparable, and hashable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HalfCoord(i32);

impl HalfCoord {
    pub fn from_tiles(tiles: i32) -> Self {
        HalfCoord(tiles * 2)
    }

    pub fn from_half_steps(half_steps: i32) -> Self {
        HalfCoord(half_steps)
    }

    pub fn half_steps(self) -> i32 {
        self.0
    }

    /// True when the coordinate lands on a whole tile.
    pub fn is_whole(self) -> bool {
        self.0 % 2 == 0
    }

    /// The whole-tile value, if this is not a half step.
    pub fn tiles(self) -> Option<i32> {
        self.is_whole().then(|| self.0 / 2)
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.0) * 0.5
    }
}

/// An edge-oriented position on a wall boundary, at whole-tile resolution.
///
/// This is the contour walk's state: the wall tile `(row, col)` plus which
/// of its edges the walk is currently on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: i32,
    pub col: i32,
    pub edge: Edge,
}

impl Position {
    pub fn new(row: i32, col: i32, edge: Edge) -> Self {
        Position { row, col, edge }
    }
}

/// A vertex of a traced boundary path.
///
/// Most points sit on whole tiles; half-straight bevel steps sit halfway
/// along an edge, which is why the coordinates are [`HalfCoord`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PathPoint {
    pub row: HalfCoord,
    pub col: HalfCoord,
    pub edge: Edge,
}

impl PathPoint {
    pub fn whole(row: i32, col: i32, edge: Edge) -> Self {
        PathPoint {
            row: HalfCoord::from_tiles(row),
            col: HalfCoord::from_tiles(col),
            edge,
        }
    }

    /// True when both coordinates land on whole tiles (no bevel midpoint).
    pub fn is_whole(self) -> bool {
        self.row.is_whole() && self.col.is_whole()
    }

    /// The geometric vertex in tile units: the tile center pushed half a
    /// tile toward the edge. Renderers scale this however they like.
    pub fn vertex(self) -> (f64, f64) {
        let (dr, dc) = self.edge.offset();
        (self.row.as_f64() + dr, self.col.as_f64() + dc)
    }
}

impl From<Position> for PathPoint {
    fn from(pos: Position) -> Self {
        PathPoint::whole(pos.row, pos.col, pos.edge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tile_char_roundtrip() {
        for tile in [Tile::Wall, Tile::Floor, Tile::Occupant] {
            assert_eq!(Tile::from_char(tile.as_char()), Some(tile));
        }
        assert_eq!(Tile::from_char('.'), Some(Tile::Floor));
        assert_eq!(Tile::from_char('x'), None);
    }

    #[test]
    fn occupant_is_neither_wall_nor_floor() {
        assert!(!Tile::Occupant.is_wall());
        assert!(!Tile::Occupant.is_floor());
    }

    #[test]
    fn edge_rotation_cycle() {
        let mut edge = Edge::North;
        for expected in [Edge::East, Edge::South, Edge::West, Edge::North] {
            edge = edge.rotated_cw();
            assert_eq!(edge, expected);
        }
    }

    #[test]
    fn quadrant_offsets_cover_four_directions() {
        // Depth 1, col 0 is the tile directly "ahead" in each quadrant.
        assert_eq!(Quadrant::Down.offset(1, 0), (1, 0));
        assert_eq!(Quadrant::Up.offset(1, 0), (-1, 0));
        assert_eq!(Quadrant::Right.offset(1, 0), (0, 1));
        assert_eq!(Quadrant::Left.offset(1, 0), (0, -1));
    }

    #[test]
    fn quadrant_offsets_keep_minor_axis() {
        assert_eq!(Quadrant::Down.offset(2, -1), (2, -1));
        assert_eq!(Quadrant::Up.offset(2, -1), (-2, -1));
        assert_eq!(Quadrant::Right.offset(2, -1), (-1, 2));
        assert_eq!(Quadrant::Left.offset(2, -1), (-1, -2));
    }

    #[test]
    fn slope_compares_by_cross_multiplication() {
        assert_eq!(Slope::new(1, 2), Slope::new(2, 4));
        assert!(Slope::new(-1, 1) < Slope::new(1, 1));
        assert!(Slope::new(1, 3) < Slope::new(1, 2));
        assert!(Slope::new(-1, 2) > Slope::new(-1, 1));
    }

    #[test]
    fn slope_through_near_corner() {
        // Column 1 at depth 2: (2·1 − 1) / (2·2) = 1/4.
        assert_eq!(Slope::through(2, 1), Slope::new(1, 4));
        // Column 0 gives a negative numerator.
        assert_eq!(Slope::through(3, 0), Slope::new(-1, 6));
    }

    #[test]
    fn half_coord_whole_and_half() {
        let whole = HalfCoord::from_tiles(3);
        assert!(whole.is_whole());
        assert_eq!(whole.tiles(), Some(3));
        assert_eq!(whole.as_f64(), 3.0);

        let half = HalfCoord::from_half_steps(7);
        assert!(!half.is_whole());
        assert_eq!(half.tiles(), None);
        assert_eq!(half.as_f64(), 3.5);
    }

    #[test]
    fn path_point_vertex_offsets_toward_edge() {
        let p = PathPoint::whole(2, 3, Edge::West);
        assert_eq!(p.vertex(), (2.0, 2.5));
        let p = PathPoint::whole(2, 3, Edge::North);
        assert_eq!(p.vertex(), (1.5, 3.0));
    }
}
