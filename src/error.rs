//! Error taxonomy for recoverable failures. Programmer errors (bifurcating a
//! detached vessel, rescaling with a broken invariant) are `assert!`/
//! `debug_assert!` and are not represented here — see spec.md §7.

use thiserror::Error;

use crate::geometry::Vec2;

/// Recoverable failures the core surfaces to a caller.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Every candidate vessel rejected a terminal for degeneracy or
    /// intersection. The caller may draw a new terminal and retry.
    #[error("no valid bifurcation candidate for terminal {terminal:?} after trying {tried} vessels")]
    NoCandidate { terminal: Vec2, tried: usize },

    /// The pressure/flow linear system was singular (disconnected graph,
    /// empty network).
    #[error("singular pressure/flow system: {reason}")]
    SingularSystem { reason: String },

    /// Attempted to solve or traverse a network with no reached cells.
    #[error("network has no reached cells")]
    EmptyNetwork,

    /// `NetworkConfig::leaky` was requested; the original has a branch with
    /// no body for this, so it is treated as explicitly unimplemented.
    #[error("leaky pressure solver mode is not implemented")]
    LeakySolverUnsupported,
}

pub type Result<T> = std::result::Result<T, CoreError>;
