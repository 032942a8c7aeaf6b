//! Steady-state Kirchhoff/Ohmic pressure-flow solver (spec.md §4.H).
//!
//! No direct `original_source` counterpart exists for this module (the
//! retrieved Python sources stop at network construction and graph
//! post-processing); it is built directly from spec.md §4.H's equations,
//! using the teacher's "hand-rolled dense numerics, no linear-algebra
//! crate" habit (see `spec_clean.rs`'s hand-written `MinHeap` for the same
//! instinct applied to data structures).

use std::collections::HashMap;

use crate::error::{CoreError, Result};
use crate::graph::{bottom_right, top_left};
use crate::lattice::{CellId, Edge, Network};

/// One solved edge flow, oriented along the edge's canonical `a -> b`
/// direction (positive means flow from `a` to `b`).
#[derive(Debug, Clone, Copy)]
pub struct EdgeFlow {
    pub edge: Edge,
    pub flow: f64,
}

/// One solved cell pressure.
#[derive(Debug, Clone, Copy)]
pub struct CellPressure {
    pub cell: CellId,
    pub pressure: f64,
}

/// The solved pressure/flow state of a network.
#[derive(Debug, Clone)]
pub struct Solution {
    pub edge_flows: Vec<EdgeFlow>,
    pub cell_pressures: Vec<CellPressure>,
}

/// Assemble and solve the Kirchhoff (flow conservation) + Ohmic (unit
/// per-edge resistance) + gauge (`p_sink = 0`) linear system for `net`,
/// with `top_left`/`bottom_right` as source/sink.
///
/// `leaky` mirrors a branch the original left unimplemented (spec.md §9);
/// requesting it always errors.
pub fn solve(net: &Network, leaky: bool) -> Result<Solution> {
    if leaky {
        return Err(CoreError::LeakySolverUnsupported);
    }
    let reached = net.reached_cells();
    if reached.is_empty() {
        return Err(CoreError::EmptyNetwork);
    }
    let edges = net.edges().to_vec();
    let source = top_left(net);
    let sink = bottom_right(net);

    let cell_index: HashMap<CellId, usize> = reached.iter().enumerate().map(|(i, c)| (*c, i)).collect();
    let num_edges = edges.len();
    let num_cells = reached.len();
    let q = |k: usize| k;
    let p = |i: usize| num_edges + i;
    let m = num_edges + num_cells;

    let mut a = vec![vec![0.0_f64; m + 1]; m];
    let mut row = 0;

    for &v in &reached {
        if v == source {
            continue;
        }
        for (k, e) in edges.iter().enumerate() {
            if e.b == v {
                a[row][q(k)] += 1.0;
            } else if e.a == v {
                a[row][q(k)] -= 1.0;
            }
        }
        a[row][m] = if v == sink { 1.0 } else { 0.0 };
        row += 1;
    }

    for (k, e) in edges.iter().enumerate() {
        a[row][p(cell_index[&e.a])] += 1.0;
        a[row][p(cell_index[&e.b])] -= 1.0;
        a[row][q(k)] -= 1.0;
        a[row][m] = 0.0;
        row += 1;
    }

    a[row][p(cell_index[&sink])] = 1.0;
    a[row][m] = 0.0;
    row += 1;
    debug_assert_eq!(row, m);

    let x = gaussian_eliminate(a, m)?;

    let edge_flows = edges.iter().enumerate().map(|(k, &edge)| EdgeFlow { edge, flow: x[q(k)] }).collect();
    let cell_pressures = reached.iter().enumerate().map(|(i, &cell)| CellPressure { cell, pressure: x[p(i)] }).collect();
    Ok(Solution { edge_flows, cell_pressures })
}

/// Solve `a` (an `m x (m+1)` augmented matrix) by Gaussian elimination
/// with partial pivoting.
fn gaussian_eliminate(mut a: Vec<Vec<f64>>, m: usize) -> Result<Vec<f64>> {
    for col in 0..m {
        let pivot_row = (col..m).max_by(|&r1, &r2| a[r1][col].abs().partial_cmp(&a[r2][col].abs()).unwrap()).unwrap();
        if a[pivot_row][col].abs() < 1e-12 {
            return Err(CoreError::SingularSystem { reason: format!("zero pivot at column {col}") });
        }
        a.swap(col, pivot_row);

        for r in (col + 1)..m {
            let factor = a[r][col] / a[col][col];
            if factor == 0.0 {
                continue;
            }
            for c in col..=m {
                a[r][c] -= factor * a[col][c];
            }
        }
    }

    let mut x = vec![0.0; m];
    for row in (0..m).rev() {
        let mut sum = a[row][m];
        for c in (row + 1)..m {
            sum -= a[row][c] * x[c];
        }
        x[row] = sum / a[row][row];
    }
    Ok(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lattice::CellId;

    #[test]
    fn three_edge_path_matches_hand_solved_scenario() {
        // A 2x2 lattice with A=(0,0) as top_left and D=(1,1) as
        // bottom_right, chained A-B-C-D through the other two cells —
        // spec.md's concrete scenario 5.
        let a = CellId::new(0, 0);
        let b = CellId::new(0, 1);
        let c = CellId::new(1, 0);
        let d = CellId::new(1, 1);
        let net = Network::from_fixture(2, 2, &[a, b, c, d], vec![Edge::new(a, b), Edge::new(b, c), Edge::new(c, d)]);

        let solution = solve(&net, false).expect("solvable path network");
        for ef in &solution.edge_flows {
            assert!((ef.flow - 1.0).abs() < 1e-9, "expected unit flow, got {}", ef.flow);
        }
        let pressure_at = |cell: CellId| solution.cell_pressures.iter().find(|cp| cp.cell == cell).unwrap().pressure;
        assert!((pressure_at(d) - 0.0).abs() < 1e-9);
        assert!((pressure_at(c) - 1.0).abs() < 1e-9);
        assert!((pressure_at(b) - 2.0).abs() < 1e-9);
        assert!((pressure_at(a) - 3.0).abs() < 1e-9);
    }

    #[test]
    fn leaky_flag_is_rejected() {
        use rand::rngs::SmallRng;
        use rand::SeedableRng;
        let mut rng = SmallRng::seed_from_u64(2);
        let net = Network::grow(4, 4, 0.3, &mut rng);
        assert!(matches!(solve(&net, true), Err(CoreError::LeakySolverUnsupported)));
    }
}
