//! Symmetric recursive shadowcasting
//!
//! The scan walks outward from the viewer one depth at a time, keeping a
//! sector of exact rational slopes `[start, end]`. Walls narrow the sector
//! or split it into child sectors; floor tiles are revealed only when the
//! symmetry test passes, which is what makes visibility reciprocal: if A can
//! see B then B can see A over the same walls.
//!
//! The scan body exists once, generic over a [`ScanSink`] visitor that
//! receives reveals and decision events. [`compute_visibility`] drives it
//! over all four quadrants with a plain boolean sink; the trace variant in
//! [`crate::trace`] and the shadow-edge recorder reuse the same body with
//! richer sinks.
//!
//! # Example
//!
//! ```
//! use shadowline_core::fov::compute_visibility;
//! use shadowline_core::grid::TileGrid;
//!
//! let grid = TileGrid::from_text(concat!(
//!     "·····\n",
//!     "·····\n",
//!     "··@··\n",
//!     "##···\n",
//!     "·····",
//! ))
//! .unwrap();
//! let fov = compute_visibility(&grid, 2, 2, None).unwrap();
//! assert!(fov.is_visible(2, 2));
//! assert!(fov.is_visible(3, 0)); // the wall itself is lit
//! assert!(!fov.is_visible(4, 0)); // the floor behind it is not
//! ```

use log::{debug, trace};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use shadowline_types::{Quadrant, Slope, Tile};

use crate::grid::{TileGrid, TileMap};

/// Caller contract violations. Algorithmic edge conditions (degenerate
/// sectors, out-of-grid queries) are policy, not errors, and never surface
/// here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FovError {
    #[error("grid has no tiles")]
    EmptyGrid,
    #[error("viewer position ({row}, {col}) is outside the grid")]
    ViewerOutOfBounds { row: i32, col: i32 },
}

/// One step of the recursive scan: a depth and the slopes bounding the
/// sector at that depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sector {
    pub depth: i32,
    pub start: Slope,
    pub end: Slope,
}

impl Sector {
    /// The root sector: depth 1, spanning the full quadrant.
    pub fn initial() -> Self {
        Sector {
            depth: 1,
            start: Slope::new(-1, 1),
            end: Slope::new(1, 1),
        }
    }

    /// First column the sector covers at its depth:
    /// `⌊0.5 + depth·start⌋`, computed exactly.
    pub fn min_col(&self) -> i32 {
        let num = 2 * i64::from(self.depth) * i64::from(self.start.num) + i64::from(self.start.den);
        num.div_euclid(2 * i64::from(self.start.den)) as i32
    }

    /// Last column the sector covers at its depth:
    /// `⌈−0.5 + depth·end⌉`, computed exactly.
    pub fn max_col(&self) -> i32 {
        let num = 2 * i64::from(self.depth) * i64::from(self.end.num) - i64::from(self.end.den);
        let den = 2 * i64::from(self.end.den);
        (-((-num).div_euclid(den))) as i32
    }

    /// The tie-break rule: a floor tile is revealed only when its center
    /// lies on or inside both boundary slopes. Evaluated on sector-local
    /// columns, independent of quadrant.
    pub fn is_symmetric(&self, col: i32) -> bool {
        let col = i64::from(col);
        let depth = i64::from(self.depth);
        col * i64::from(self.start.den) >= depth * i64::from(self.start.num)
            && col * i64::from(self.end.den) <= depth * i64::from(self.end.num)
    }
}

/// Where in the scan a decision event was emitted.
///
/// Sinks that only care about reveals ignore these; the trace log records
/// them all, and the shadow-edge recorder derives boundary vertices from
/// the sector state they carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionSite {
    /// A sector was entered at its depth.
    SectorEnter,
    /// A column is about to be tested for wall/symmetry.
    ColumnTest,
    /// The tested column was revealed.
    Reveal,
    /// A wall→floor transition narrowed the sector's start slope.
    StartNarrowed,
    /// A floor→wall transition; a child sector is about to be scanned.
    ChildSector,
    /// The child sector's scan returned.
    ChildReturned,
    /// The sector stayed open past its last column and continues one depth
    /// further.
    SectorContinued,
    /// The sector's scan finished.
    SectorExit,
}

/// Visitor for the generic scan body.
pub(crate) trait ScanSink {
    /// The tile at absolute `(row, col)` is visible.
    fn reveal(&mut self, row: i32, col: i32);

    /// A decision point was reached. `sector` carries the current (possibly
    /// already narrowed) slopes.
    fn decision(&mut self, _site: DecisionSite, _sector: &Sector, _col: Option<i32>) {}
}

/// The scan driver for one quadrant.
pub(crate) struct Scanner<'a, S: ScanSink> {
    grid: &'a TileGrid,
    viewer_row: i32,
    viewer_col: i32,
    quadrant: Quadrant,
    range: Option<i32>,
    sink: &'a mut S,
}

impl<'a, S: ScanSink> Scanner<'a, S> {
    pub(crate) fn new(
        grid: &'a TileGrid,
        viewer_row: i32,
        viewer_col: i32,
        quadrant: Quadrant,
        range: Option<i32>,
        sink: &'a mut S,
    ) -> Self {
        Scanner {
            grid,
            viewer_row,
            viewer_col,
            quadrant,
            range,
            sink,
        }
    }

    /// Sector-local to absolute coordinates, `None` outside the grid.
    fn transform(&self, depth: i32, col: i32) -> Option<(i32, i32)> {
        let (dr, dc) = self.quadrant.offset(depth, col);
        let row = self.viewer_row + dr;
        let c = self.viewer_col + dc;
        self.grid.contains(row, c).then_some((row, c))
    }

    /// Out of bounds counts as a wall so sectors terminate at the grid edge.
    fn is_wall(&self, depth: i32, col: i32) -> bool {
        match self.transform(depth, col) {
            Some((row, c)) => self.grid.get(row, c).is_some_and(Tile::is_wall),
            None => true,
        }
    }

    /// Out of bounds is not floor, so open sectors stop at the grid edge.
    fn is_floor(&self, depth: i32, col: i32) -> bool {
        match self.transform(depth, col) {
            Some((row, c)) => self.grid.get(row, c).is_some_and(Tile::is_floor),
            None => false,
        }
    }

    /// Out of bounds is silently skipped.
    fn reveal(&mut self, depth: i32, col: i32) {
        if let Some((row, c)) = self.transform(depth, col) {
            self.sink.reveal(row, c);
        }
    }

    pub(crate) fn scan(&mut self, mut sector: Sector) {
        // Degenerate sectors never scan.
        if sector.start > sector.end {
            return;
        }
        if self.range.is_some_and(|range| sector.depth > range) {
            return;
        }
        trace!(
            "scan quadrant={} depth={} start={} end={}",
            self.quadrant.as_str(),
            sector.depth,
            sector.start,
            sector.end
        );
        self.sink.decision(DecisionSite::SectorEnter, &sector, None);

        let min_col = sector.min_col();
        let max_col = sector.max_col();
        for col in min_col..=max_col {
            self.sink.decision(DecisionSite::ColumnTest, &sector, Some(col));
            if self.is_wall(sector.depth, col) || sector.is_symmetric(col) {
                self.sink.decision(DecisionSite::Reveal, &sector, Some(col));
                self.reveal(sector.depth, col);
            }
            if col == min_col {
                continue;
            }
            let prev = col - 1;
            if self.is_wall(sector.depth, prev) && self.is_floor(sector.depth, col) {
                sector.start = Slope::through(sector.depth, col);
                self.sink
                    .decision(DecisionSite::StartNarrowed, &sector, Some(col));
            }
            if self.is_floor(sector.depth, prev) && self.is_wall(sector.depth, col) {
                let child = Sector {
                    depth: sector.depth + 1,
                    start: sector.start,
                    end: Slope::through(sector.depth, col),
                };
                self.sink
                    .decision(DecisionSite::ChildSector, &sector, Some(col));
                self.scan(child);
                self.sink
                    .decision(DecisionSite::ChildReturned, &sector, Some(col));
            }
        }

        // A sector not closed off by a wall continues at the next depth.
        if self.is_floor(sector.depth, max_col) {
            self.sink
                .decision(DecisionSite::SectorContinued, &sector, None);
            self.scan(Sector {
                depth: sector.depth + 1,
                ..sector
            });
        }
        self.sink.decision(DecisionSite::SectorExit, &sector, None);
    }
}

/// The visible-tile set produced by one visibility computation.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibilitySet {
    map: TileMap<bool>,
}

impl VisibilitySet {
    fn new(grid: &TileGrid) -> Self {
        VisibilitySet {
            map: TileMap::filled(grid, false),
        }
    }

    pub(crate) fn mark(&mut self, row: i32, col: i32) {
        self.map.set(row, col, true);
    }

    /// Whether `(row, col)` is visible. Out-of-grid positions are not.
    pub fn is_visible(&self, row: i32, col: i32) -> bool {
        self.map.get(row, col).copied().unwrap_or(false)
    }

    pub fn count(&self) -> usize {
        self.map.iter().filter(|(_, _, v)| **v).count()
    }

    pub fn iter_visible(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.map
            .iter()
            .filter_map(|(row, col, v)| v.then_some((row, col)))
    }
}

impl ScanSink for VisibilitySet {
    fn reveal(&mut self, row: i32, col: i32) {
        self.mark(row, col);
    }
}

/// A fractional endpoint of a sector-boundary ray, in tile units relative to
/// the grid. Endpoints may legitimately project outside the grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShadowPoint {
    pub row: f64,
    pub col: f64,
}

/// One shadow-boundary polyline.
pub type ShadowSegment = Vec<ShadowPoint>;

/// Records shadow-boundary polylines alongside the visibility flags.
struct EdgeSink {
    set: VisibilitySet,
    viewer_row: i32,
    viewer_col: i32,
    quadrant: Quadrant,
    segments: Vec<ShadowSegment>,
    current: ShadowSegment,
}

impl EdgeSink {
    fn new(grid: &TileGrid, viewer_row: i32, viewer_col: i32) -> Self {
        EdgeSink {
            set: VisibilitySet::new(grid),
            viewer_row,
            viewer_col,
            quadrant: Quadrant::Down,
            segments: Vec::new(),
            current: Vec::new(),
        }
    }

    /// The endpoint of `slope` at `depth`, unbounded: the point may fall
    /// outside the grid. The trivial ±1/1 quadrant boundaries are skipped.
    fn push_vertex(&mut self, depth: i32, slope: Slope) {
        if slope.den == 1 && slope.num.abs() == 1 {
            return;
        }
        let col = f64::from(depth) * slope.as_f64();
        let (dr, dc) = self.quadrant.offset_f64(f64::from(depth), col);
        self.current.push(ShadowPoint {
            row: f64::from(self.viewer_row) + dr,
            col: f64::from(self.viewer_col) + dc,
        });
    }

    /// End the current polyline; one-point fragments draw nothing and are
    /// dropped.
    fn break_segment(&mut self) {
        if self.current.len() >= 2 {
            self.segments.push(std::mem::take(&mut self.current));
        } else {
            self.current.clear();
        }
    }
}

impl ScanSink for EdgeSink {
    fn reveal(&mut self, row: i32, col: i32) {
        self.set.mark(row, col);
    }

    fn decision(&mut self, site: DecisionSite, sector: &Sector, col: Option<i32>) {
        match site {
            DecisionSite::SectorEnter => {
                self.push_vertex(sector.depth, sector.start);
                self.break_segment();
            }
            DecisionSite::ChildSector | DecisionSite::SectorContinued => {
                self.push_vertex(sector.depth, sector.start);
            }
            DecisionSite::ChildReturned => {
                if let Some(col) = col {
                    self.push_vertex(sector.depth, Slope::through(sector.depth, col));
                }
                self.break_segment();
            }
            DecisionSite::SectorExit => {
                self.push_vertex(sector.depth, sector.end);
            }
            _ => {}
        }
    }
}

pub(crate) fn validate(grid: &TileGrid, viewer_row: i32, viewer_col: i32) -> Result<(), FovError> {
    if grid.is_empty() {
        return Err(FovError::EmptyGrid);
    }
    if !grid.contains(viewer_row, viewer_col) {
        return Err(FovError::ViewerOutOfBounds {
            row: viewer_row,
            col: viewer_col,
        });
    }
    Ok(())
}

/// Compute the set of tiles visible from `(viewer_row, viewer_col)`.
///
/// The viewer's own tile is always visible. `range` caps the scan depth;
/// `None` scans to the grid edge. The grid and viewer are read-only inputs;
/// the returned set is an independent snapshot.
pub fn compute_visibility(
    grid: &TileGrid,
    viewer_row: i32,
    viewer_col: i32,
    range: Option<i32>,
) -> Result<VisibilitySet, FovError> {
    validate(grid, viewer_row, viewer_col)?;
    debug!(
        "compute_visibility viewer=({}, {}) range={:?}",
        viewer_row, viewer_col, range
    );

    let mut set = VisibilitySet::new(grid);
    set.mark(viewer_row, viewer_col);
    for quadrant in Quadrant::ALL {
        let mut scanner = Scanner::new(grid, viewer_row, viewer_col, quadrant, range, &mut set);
        scanner.scan(Sector::initial());
    }
    Ok(set)
}

/// Like [`compute_visibility`], additionally returning the shadow-boundary
/// polylines: the endpoints of each sector boundary as the scan narrows and
/// splits, suitable for drawing the umbra outline.
pub fn compute_visibility_with_edges(
    grid: &TileGrid,
    viewer_row: i32,
    viewer_col: i32,
    range: Option<i32>,
) -> Result<(VisibilitySet, Vec<ShadowSegment>), FovError> {
    validate(grid, viewer_row, viewer_col)?;
    debug!(
        "compute_visibility_with_edges viewer=({}, {}) range={:?}",
        viewer_row, viewer_col, range
    );

    let mut sink = EdgeSink::new(grid, viewer_row, viewer_col);
    sink.set.mark(viewer_row, viewer_col);
    for quadrant in Quadrant::ALL {
        sink.quadrant = quadrant;
        let mut scanner = Scanner::new(grid, viewer_row, viewer_col, quadrant, range, &mut sink);
        scanner.scan(Sector::initial());
        sink.break_segment();
    }
    let EdgeSink { set, segments, .. } = sink;
    Ok((set, segments))
}
