//! Grid visibility and boundary extraction - pure, deterministic, and testable
//!
//! This crate contains the shadowcasting scan, its traced variant, and the
//! wall contour tracer. It has **zero dependencies** on rendering or I/O,
//! making it:
//!
//! - **Deterministic**: Same grid and viewer produce identical results
//! - **Exact**: Sector slopes are rational; no float comparisons anywhere
//! - **Portable**: Can run in any environment (terminal, GUI, headless)
//!
//! # Module Structure
//!
//! - [`grid`]: Tile storage with per-row spans, rectangular or ragged
//! - [`fov`]: Symmetric recursive shadowcasting across four quadrants
//! - [`trace`]: Instrumented single-quadrant scan with per-step ticks
//! - [`outline`]: Clockwise wall contour tracing with beveled corners
//!
//! # Visibility Rules
//!
//! The scan follows symmetric shadowcasting conventions:
//!
//! - **Symmetry**: A floor tile is visible exactly when the viewer's tile
//!   center is within the tile's sector, so visibility is reciprocal
//!   between floor tiles
//! - **Walls**: A wall is visible whenever any part of it is in the sector
//! - **Exact slopes**: Sector boundaries pass through tile corners at
//!   `(2·col − 1) / (2·depth)`; ties are broken by exact rational
//!   comparison, never by float rounding
//! - **Range**: An optional depth cap truncates the scan symmetrically in
//!   all four quadrants
//!
//! # Example
//!
//! ```
//! use shadowline_core::compute_visibility;
//! use shadowline_core::grid::TileGrid;
//!
//! let grid = TileGrid::from_text(
//!     "·····\n\
//!      ·###·\n\
//!      ·····",
//! )
//! .unwrap();
//!
//! let visible = compute_visibility(&grid, 0, 2, None).unwrap();
//! assert!(visible.is_visible(1, 2)); // the wall itself
//! assert!(!visible.is_visible(2, 2)); // shadowed behind it
//! ```
pub mod fov;
pub mod grid;
pub mod outline;
pub mod trace;

pub use shadowline_types as types;

// Re-export the main entry points for convenience
pub use fov::{
    compute_visibility, compute_visibility_with_edges, DecisionSite, FovError, Sector,
    ShadowPoint, ShadowSegment, VisibilitySet,
};
pub use grid::{GridError, TileGrid, TileMap};
pub use outline::{trace_boundaries, trace_grid_boundaries, BoundaryPath};
pub use trace::{trace_quadrant, trace_visibility, FovTrace, TraceEntry};
