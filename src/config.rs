//! Tunable parameters for the CCO generator and IP network (spec.md §4.E,
//! §4.F, §9). The original pins these as literal constants scattered
//! through the algorithm; pulling them into serde-serializable config
//! structs lets a caller reproduce a run from a saved configuration
//! without touching the algorithm's code.

use serde::{Deserialize, Serialize};

/// Resolves spec.md §9's "terminal-sampling threshold formula" open
/// question: the source uses both `sqrt(area / (k*pi))` and
/// `sqrt(area / k)` in different places. `Disc` is the default; `Linear`
/// is kept as the documented alternative rather than silently discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThresholdFormula {
    /// `sqrt(area / (k * pi))` — treats the threshold as the radius of a
    /// disc of area `area/k`.
    Disc,
    /// `sqrt(area / k)` — the plain areal-density variant.
    Linear,
}

impl ThresholdFormula {
    pub fn threshold(self, area: f64, k: usize) -> f64 {
        let k = k as f64;
        match self {
            ThresholdFormula::Disc => (area / (k * std::f64::consts::PI)).sqrt(),
            ThresholdFormula::Linear => (area / k).sqrt(),
        }
    }
}

/// Configuration for [`crate::cco::CcoGenerator`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CcoConfig {
    /// Root vessel radius at the origin.
    pub root_radius: f64,
    /// Consecutive terminal-sampling rejections before the threshold
    /// shrinks (spec.md §4.E: 50).
    pub retry_limit: u32,
    /// Multiplicative threshold shrink factor applied after `retry_limit`
    /// consecutive rejections (spec.md §4.E: 0.9).
    pub decay_factor: f64,
    /// Which terminal-sampling threshold formula to use.
    pub threshold_formula: ThresholdFormula,
    /// Subdivisions for the triangular point-sample heuristic used by
    /// both terminal-density threshold area sampling and geometric
    /// optimization (spec.md §4.C: `INTERVALS=10`).
    pub optimise_intervals: usize,
}

impl Default for CcoConfig {
    fn default() -> Self {
        CcoConfig { root_radius: 1.0, retry_limit: 50, decay_factor: 0.9, threshold_formula: ThresholdFormula::Disc, optimise_intervals: 10 }
    }
}

/// Configuration for [`crate::lattice::Network::grow`] and
/// [`crate::solver::solve`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Fraction of lattice cells the growth process fills, in `[0, 1]`.
    pub occupancy: f64,
    /// Requests the unimplemented "leaky" pressure-solver variant
    /// (spec.md §9) — always rejected with
    /// [`crate::error::CoreError::LeakySolverUnsupported`].
    pub leaky: bool,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        NetworkConfig { occupancy: 0.5, leaky: false }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disc_and_linear_formulas_differ_by_a_factor_of_sqrt_pi() {
        let area = 100.0;
        let k = 4;
        let disc = ThresholdFormula::Disc.threshold(area, k);
        let linear = ThresholdFormula::Linear.threshold(area, k);
        assert!((linear / disc - std::f64::consts::PI.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn defaults_match_documented_constants() {
        let cco = CcoConfig::default();
        assert_eq!(cco.retry_limit, 50);
        assert!((cco.decay_factor - 0.9).abs() < 1e-12);
        assert_eq!(cco.optimise_intervals, 10);

        let net = NetworkConfig::default();
        assert!(!net.leaky);
    }
}
