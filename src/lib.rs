//! Vascular tree synthesis (Constrained Constructive Optimization) and
//! invasion-percolation network generation over 2D perfusion regions.
//!
//! The crate is organized leaf-first:
//! - [`geometry`], [`heuristic`] — shared 2D primitives.
//! - [`domain`] — bounded perfusion regions.
//! - [`tree`], [`cco`] — the vascular tree and its growth driver.
//! - [`lattice`], [`graph`], [`solver`] — the invasion-percolation network,
//!   its graph post-processing, and its pressure/flow solver.
//! - [`config`] — tunable parameters for both engines.
//! - [`error`] — the recoverable-failure taxonomy.

pub mod cco;
pub mod config;
pub mod domain;
pub mod error;
pub mod geometry;
pub mod graph;
mod heap;
pub mod heuristic;
pub mod lattice;
pub mod solver;
pub mod tree;

pub use cco::CcoGenerator;
pub use config::{CcoConfig, NetworkConfig, ThresholdFormula};
pub use domain::{CircularDomain, RectangularDomain, VascularDomain};
pub use error::{CoreError, Result};
pub use geometry::{Line, LineSegment, Vec2};
pub use lattice::{CellId, Edge, Network};
pub use tree::{Handle, Tree, VesselRecord};
