//! Wall contour tracing with beveled corners
//!
//! Given a wall predicate and the set of west edges (non-wall immediately
//! west of a wall), walk clockwise around each connected wall cluster and
//! emit its outline as a closed path. Where two walls touch only at a
//! corner, a half-straight step plus an interior corner bevels the outline
//! so it never cuts through the diagonal gap.
//!
//! Junction types, looking along the clockwise travel direction:
//!
//! ```text
//! straight:   -> ## ->        exterior:  -> #      interior:     ^
//!                                           |                    |
//!                                           v                 -> #
//! ```
//!
//! Starting every loop from a west edge and remembering the west edges a
//! walk passes guarantees each cluster's outline (and each interior hole)
//! is traced exactly once. The tracer assumes the predicate and the edge
//! enumeration agree; an inconsistent pair is a caller contract violation.

use std::collections::HashSet;

use arrayvec::ArrayVec;
use log::{debug, trace};

use shadowline_types::{Edge, HalfCoord, PathPoint, Position};

use crate::grid::TileGrid;

/// A closed, clockwise outline of one wall cluster.
///
/// The first and last point coincide. Bevel midpoints are the only points
/// with half-tile coordinates.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BoundaryPath {
    points: Vec<PathPoint>,
}

impl BoundaryPath {
    pub fn points(&self) -> &[PathPoint] {
        &self.points
    }

    pub fn is_closed(&self) -> bool {
        self.points.first() == self.points.last()
    }

    /// Number of bevels: each contributes exactly one half-coordinate point.
    pub fn bevel_count(&self) -> usize {
        self.points.iter().filter(|p| !p.is_whole()).count()
    }
}

/// Advance one tile along the current edge's clockwise travel direction.
fn straight(pos: Position) -> Position {
    let Position { row, col, edge } = pos;
    match edge {
        Edge::North => Position::new(row, col + 1, edge),
        Edge::South => Position::new(row, col - 1, edge),
        Edge::East => Position::new(row + 1, col, edge),
        Edge::West => Position::new(row - 1, col, edge),
    }
}

/// Turn outward around the current tile's corner.
fn exterior(pos: Position) -> Position {
    Position::new(pos.row, pos.col, pos.edge.rotated_cw())
}

/// Cross the diagonal onto the corner-touching wall tile.
fn interior(pos: Position) -> Position {
    let Position { row, col, edge } = pos;
    match edge {
        Edge::North => Position::new(row - 1, col + 1, Edge::West),
        Edge::South => Position::new(row + 1, col - 1, Edge::East),
        Edge::East => Position::new(row + 1, col + 1, Edge::North),
        Edge::West => Position::new(row - 1, col - 1, Edge::South),
    }
}

/// The bevel midpoint: half a tile along the travel direction, where an
/// interior corner is about to cut across.
fn half_straight(pos: Position) -> PathPoint {
    let row = HalfCoord::from_tiles(pos.row);
    let col = HalfCoord::from_tiles(pos.col);
    let (row, col) = match pos.edge {
        Edge::North => (row, HalfCoord::from_half_steps(col.half_steps() + 1)),
        Edge::South => (row, HalfCoord::from_half_steps(col.half_steps() - 1)),
        Edge::East => (HalfCoord::from_half_steps(row.half_steps() + 1), col),
        Edge::West => (HalfCoord::from_half_steps(row.half_steps() - 1), col),
    };
    PathPoint {
        row,
        col,
        edge: pos.edge,
    }
}

/// The next one or two path points going clockwise, and the new walk
/// position.
fn next_beveled<W>(pos: Position, is_wall: &W) -> (ArrayVec<PathPoint, 2>, Position)
where
    W: Fn(i32, i32) -> bool,
{
    let mut points = ArrayVec::new();
    let ahead = straight(pos);
    if !is_wall(ahead.row, ahead.col) {
        let next = exterior(pos);
        points.push(next.into());
        return (points, next);
    }
    let diagonal = interior(pos);
    if !is_wall(diagonal.row, diagonal.col) {
        points.push(ahead.into());
        return (points, ahead);
    }
    // Both ahead and the inward diagonal are walls: bevel across the corner
    // instead of cutting through it.
    points.push(half_straight(pos));
    points.push(diagonal.into());
    (points, diagonal)
}

/// Walk one closed loop from `start`, marking the west edges it passes.
fn trace_loop<W>(start: Position, visited: &mut HashSet<Position>, is_wall: &W) -> BoundaryPath
where
    W: Fn(i32, i32) -> bool,
{
    let mut points = vec![PathPoint::from(start)];
    visited.insert(start);
    let mut pos = start;
    loop {
        let (steps, next) = next_beveled(pos, is_wall);
        points.extend(steps);
        pos = next;
        if pos == start {
            break;
        }
        if pos.edge == Edge::West {
            visited.insert(pos);
        }
    }
    trace!(
        "traced loop from ({}, {}) with {} points",
        start.row,
        start.col,
        points.len()
    );
    BoundaryPath { points }
}

/// Trace the outline of every connected wall region.
///
/// `is_wall` is the caller's wall predicate (out-of-grid policy included);
/// `west_edges` enumerates every `(row, col)` wall tile with a non-wall (or
/// out-of-grid) tile immediately to its west. Path order is unspecified;
/// each path is clockwise and closed. A cluster with an interior hole
/// yields two paths, the hull and the hole.
pub fn trace_boundaries<W, I>(is_wall: W, west_edges: I) -> Vec<BoundaryPath>
where
    W: Fn(i32, i32) -> bool,
    I: IntoIterator<Item = (i32, i32)>,
{
    let mut visited: HashSet<Position> = HashSet::new();
    let mut paths = Vec::new();
    for (row, col) in west_edges {
        let start = Position::new(row, col, Edge::West);
        if visited.contains(&start) {
            continue;
        }
        paths.push(trace_loop(start, &mut visited, &is_wall));
    }
    debug!("trace_boundaries produced {} paths", paths.len());
    paths
}

/// [`trace_boundaries`] over a grid's own walls and west edges.
pub fn trace_grid_boundaries(grid: &TileGrid) -> Vec<BoundaryPath> {
    let west_edges: Vec<_> = grid.west_edges().collect();
    trace_boundaries(|row, col| grid.is_wall(row, col), west_edges)
}
