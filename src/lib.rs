//! Shadowline (workspace facade crate).
//!
//! This package keeps the `shadowline::{core,types}` public API stable while
//! the implementation lives in dedicated crates under `crates/`.

pub use shadowline_core as core;
pub use shadowline_types as types;
