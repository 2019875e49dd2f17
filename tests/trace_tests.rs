//! Trace tests - tick ordering and playback over the instrumented scan

use shadowline::core::grid::TileGrid;
use shadowline::core::{compute_visibility, trace_quadrant, trace_visibility, DecisionSite};
use shadowline::types::{Quadrant, Tile};

/// The triangular demo map: an occupant at the apex with a short wall two
/// rows below it.
fn demo_grid() -> TileGrid {
    let mut grid = TileGrid::triangular(5, Tile::Floor);
    grid.set(0, 4, Tile::Occupant);
    grid.set(2, 3, Tile::Wall);
    grid.set(2, 4, Tile::Wall);
    grid
}

#[test]
fn test_viewer_holds_tick_zero() {
    let grid = demo_grid();
    let trace = trace_visibility(&grid, 0, 4, None).unwrap();
    assert_eq!(trace.revealed_at(0, 4), Some(0));
}

#[test]
fn test_log_ticks_are_consecutive_from_one() {
    let grid = demo_grid();
    let trace = trace_visibility(&grid, 0, 4, None).unwrap();
    assert!(!trace.log().is_empty());
    for (i, entry) in trace.log().iter().enumerate() {
        assert_eq!(entry.tick, i as u32 + 1);
    }
    assert_eq!(trace.tick_count(), trace.log().len() as u32 + 1);
}

#[test]
fn test_reveal_ticks_are_unique() {
    let grid = demo_grid();
    let trace = trace_visibility(&grid, 0, 4, None).unwrap();
    let mut ticks: Vec<u32> = grid
        .iter()
        .filter_map(|(row, col, _)| trace.revealed_at(row, col))
        .collect();
    ticks.sort_unstable();
    let before = ticks.len();
    ticks.dedup();
    assert_eq!(ticks.len(), before, "two tiles share a reveal tick");
    assert!(ticks.iter().all(|&t| t < trace.tick_count()));
}

#[test]
fn test_playback_grows_monotonically() {
    let grid = demo_grid();
    let trace = trace_visibility(&grid, 0, 4, None).unwrap();
    let mut previous = 0usize;
    for tick in 0..trace.tick_count() {
        let visible = grid
            .iter()
            .filter(|&(row, col, _)| trace.visible_at(row, col, tick))
            .count();
        assert!(visible >= previous, "playback lost a tile at tick {}", tick);
        previous = visible;
    }
}

#[test]
fn test_trace_agrees_with_plain_visibility() {
    // The traced scan covers one quadrant, so it must reveal exactly the
    // tiles the full computation reveals through that quadrant.
    let grid = demo_grid();
    let trace = trace_visibility(&grid, 0, 4, None).unwrap();
    let fov = compute_visibility(&grid, 0, 4, None).unwrap();
    for (row, col, _) in grid.iter() {
        if trace.revealed_at(row, col).is_some() {
            assert!(fov.is_visible(row, col), "({}, {}) traced but not visible", row, col);
        }
    }
}

#[test]
fn test_trace_is_deterministic() {
    let grid = demo_grid();
    let first = trace_visibility(&grid, 0, 4, None).unwrap();
    let second = trace_visibility(&grid, 0, 4, None).unwrap();
    assert_eq!(first, second);
    let a = serde_json::to_string(first.log()).unwrap();
    let b = serde_json::to_string(second.log()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_log_reflects_the_walls() {
    let open = TileGrid::triangular(5, Tile::Floor);
    let trace_open = trace_visibility(&open, 0, 4, None).unwrap();
    let trace_walled = trace_visibility(&demo_grid(), 0, 4, None).unwrap();
    assert_ne!(trace_open.log(), trace_walled.log());
    assert!(trace_walled
        .log()
        .iter()
        .any(|e| e.site == DecisionSite::ChildSector));
    assert!(!trace_open
        .log()
        .iter()
        .any(|e| e.site == DecisionSite::ChildSector));
}

#[test]
fn test_wall_shadows_the_traced_quadrant() {
    let grid = demo_grid();
    let trace = trace_visibility(&grid, 0, 4, None).unwrap();
    // The walls themselves are revealed...
    assert!(trace.revealed_at(2, 3).is_some());
    assert!(trace.revealed_at(2, 4).is_some());
    // ...and the tile straight behind the wall pair is not.
    assert_eq!(trace.revealed_at(3, 4), None);
}

#[test]
fn test_quadrants_trace_independently() {
    let grid = TileGrid::rectangular(7, 7, Tile::Floor);
    let down = trace_quadrant(&grid, 3, 3, Quadrant::Down, None).unwrap();
    let up = trace_quadrant(&grid, 3, 3, Quadrant::Up, None).unwrap();
    assert!(down.revealed_at(6, 3).is_some());
    assert_eq!(down.revealed_at(0, 3), None);
    assert!(up.revealed_at(0, 3).is_some());
    assert_eq!(up.revealed_at(6, 3), None);
    // Same geometry, mirrored: the logs have identical shape.
    assert_eq!(down.log().len(), up.log().len());
}

#[test]
fn test_range_caps_the_trace() {
    let grid = TileGrid::rectangular(9, 9, Tile::Floor);
    let trace = trace_visibility(&grid, 0, 4, Some(3)).unwrap();
    assert!(trace.revealed_at(3, 4).is_some());
    assert_eq!(trace.revealed_at(4, 4), None);
}
