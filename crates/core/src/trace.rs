//! Instrumented single-quadrant scan
//!
//! Same control flow as the standard engine, but every decision point
//! appends a log entry and revealed tiles get the tick of the entry that
//! revealed them. The log is fully deterministic: identical inputs produce
//! an identical, identically-ordered log, so an external tool can replay the
//! scan step by step without re-running it.
//!
//! Slopes are logged as floating approximations for display; the scan
//! itself still compares exact rationals.

use log::debug;
use serde::{Deserialize, Serialize};

use shadowline_types::Quadrant;

use crate::fov::{DecisionSite, FovError, ScanSink, Scanner, Sector};
use crate::grid::{TileGrid, TileMap};

/// One step of the instrumented scan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TraceEntry {
    /// Position of this entry in the run; the viewer holds tick 0, the
    /// first entry tick 1.
    pub tick: u32,
    pub site: DecisionSite,
    pub depth: i32,
    /// Current start slope, as a display approximation.
    pub start: f64,
    /// Current end slope, as a display approximation.
    pub end: f64,
    /// Column under test, if the site concerns one.
    pub col: Option<i32>,
}

/// The result of an instrumented scan: per-tile reveal ticks plus the
/// decision log.
#[derive(Debug, Clone, PartialEq)]
pub struct FovTrace {
    ticks: TileMap<Option<u32>>,
    log: Vec<TraceEntry>,
}

impl FovTrace {
    /// The tick at which `(row, col)` was revealed, or `None` if it never
    /// was (or lies outside the grid).
    pub fn revealed_at(&self, row: i32, col: i32) -> Option<u32> {
        self.ticks.get(row, col).copied().flatten()
    }

    pub fn log(&self) -> &[TraceEntry] {
        &self.log
    }

    /// One past the largest tick in the run: ticks range over
    /// `0..tick_count()`.
    pub fn tick_count(&self) -> u32 {
        self.log.len() as u32 + 1
    }

    /// Tiles revealed at or before `tick`, for playback.
    pub fn visible_at(&self, row: i32, col: i32, tick: u32) -> bool {
        self.revealed_at(row, col).is_some_and(|t| t <= tick)
    }
}

struct TraceSink {
    ticks: TileMap<Option<u32>>,
    log: Vec<TraceEntry>,
}

impl ScanSink for TraceSink {
    fn reveal(&mut self, row: i32, col: i32) {
        // The Reveal entry was just logged; its tick becomes the tile's
        // reveal tick. First reveal wins: ticks are never reassigned.
        let tick = self.log.len() as u32;
        if let Some(slot) = self.ticks.get_mut(row, col) {
            if slot.is_none() {
                *slot = Some(tick);
            }
        }
    }

    fn decision(&mut self, site: DecisionSite, sector: &Sector, col: Option<i32>) {
        self.log.push(TraceEntry {
            tick: self.log.len() as u32 + 1,
            site,
            depth: sector.depth,
            start: sector.start.as_f64(),
            end: sector.end.as_f64(),
            col,
        });
    }
}

/// Run the instrumented scan over the `Down` quadrant.
///
/// The viewer's tile gets tick 0. Only one quadrant is traced; the standard
/// engine covers all four.
pub fn trace_visibility(
    grid: &TileGrid,
    viewer_row: i32,
    viewer_col: i32,
    range: Option<i32>,
) -> Result<FovTrace, FovError> {
    trace_quadrant(grid, viewer_row, viewer_col, Quadrant::Down, range)
}

/// Like [`trace_visibility`] with an explicit quadrant.
pub fn trace_quadrant(
    grid: &TileGrid,
    viewer_row: i32,
    viewer_col: i32,
    quadrant: Quadrant,
    range: Option<i32>,
) -> Result<FovTrace, FovError> {
    crate::fov::validate(grid, viewer_row, viewer_col)?;
    debug!(
        "trace_visibility viewer=({}, {}) quadrant={} range={:?}",
        viewer_row,
        viewer_col,
        quadrant.as_str(),
        range
    );

    let mut sink = TraceSink {
        ticks: TileMap::filled(grid, None),
        log: Vec::new(),
    };
    sink.ticks.set(viewer_row, viewer_col, Some(0));
    let mut scanner = Scanner::new(grid, viewer_row, viewer_col, quadrant, range, &mut sink);
    scanner.scan(Sector::initial());

    let TraceSink { ticks, log } = sink;
    Ok(FovTrace { ticks, log })
}

#[cfg(test)]
mod tests {
    use super::*;
    use shadowline_types::Tile;

    fn fixture() -> TileGrid {
        let mut grid = TileGrid::triangular(5, Tile::Floor);
        grid.set(0, 4, Tile::Occupant);
        grid.set(2, 3, Tile::Wall);
        grid.set(2, 4, Tile::Wall);
        grid
    }

    #[test]
    fn viewer_holds_tick_zero() {
        let trace = trace_visibility(&fixture(), 0, 4, Some(4)).unwrap();
        assert_eq!(trace.revealed_at(0, 4), Some(0));
    }

    #[test]
    fn log_opens_with_the_root_sector() {
        let trace = trace_visibility(&fixture(), 0, 4, Some(4)).unwrap();
        let first = trace.log()[0];
        assert_eq!(first.tick, 1);
        assert_eq!(first.site, DecisionSite::SectorEnter);
        assert_eq!(first.depth, 1);
        assert_eq!(first.start, -1.0);
        assert_eq!(first.end, 1.0);
        assert_eq!(first.col, None);
    }

    #[test]
    fn ticks_match_log_positions() {
        let trace = trace_visibility(&fixture(), 0, 4, Some(4)).unwrap();
        for (i, entry) in trace.log().iter().enumerate() {
            assert_eq!(entry.tick, i as u32 + 1);
        }
        assert_eq!(trace.tick_count(), trace.log().len() as u32 + 1);
    }

    #[test]
    fn reveal_entries_carry_the_revealed_tile_tick() {
        let trace = trace_visibility(&fixture(), 0, 4, Some(4)).unwrap();
        // The first column the root sector tests is (1, 3); it is floor and
        // symmetric, so the reveal happens within the first few entries.
        let tick = trace.revealed_at(1, 3).expect("tile should be revealed");
        let entry = trace.log()[(tick - 1) as usize];
        assert_eq!(entry.site, DecisionSite::Reveal);
        assert_eq!(entry.depth, 1);
        assert_eq!(entry.col, Some(-1));
    }

    #[test]
    fn playback_accumulates_monotonically() {
        let trace = trace_visibility(&fixture(), 0, 4, Some(4)).unwrap();
        let mut seen = 0usize;
        for tick in 0..trace.tick_count() {
            let now = (0..5)
                .flat_map(|r| (0..9).map(move |c| (r, c)))
                .filter(|&(r, c)| trace.visible_at(r, c, tick))
                .count();
            assert!(now >= seen, "visible count regressed at tick {}", tick);
            seen = now;
        }
    }

    #[test]
    fn validation_matches_standard_engine() {
        let grid = TileGrid::from_rows(vec![]);
        assert_eq!(trace_visibility(&grid, 0, 0, None), Err(FovError::EmptyGrid));
        let grid = TileGrid::rectangular(2, 2, Tile::Floor);
        assert_eq!(
            trace_visibility(&grid, 5, 0, None),
            Err(FovError::ViewerOutOfBounds { row: 5, col: 0 })
        );
    }

    #[test]
    fn log_serializes_as_snake_case_json() {
        let trace = trace_visibility(&fixture(), 0, 4, Some(1)).unwrap();
        let json = serde_json::to_string(trace.log()).unwrap();
        assert!(json.contains("\"sector_enter\""));
        assert!(json.contains("\"column_test\""));
    }
}
