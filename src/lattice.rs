//! 2D lattice and invasion-percolation growth (spec.md §4.F).
//!
//! Ported from `original_source/InvasionPercolationNetwork.py`. The
//! original's `_get_cell_neighbours` bounds-checks the east/west neighbor
//! against `self.x - 1` twice and never against `self.y - 1`, which breaks
//! on non-square lattices; this port uses the correct axis for each check.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::heap::MinHeap;

/// A cell's position on the lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellId {
    pub i: usize,
    pub j: usize,
}

impl CellId {
    pub fn new(i: usize, j: usize) -> Self {
        CellId { i, j }
    }
}

/// An undirected link between two reached, 4-adjacent cells. `a` and `b`
/// are ordered so every edge has a single canonical representation,
/// matching spec.md §4.H's orientation convention for the pressure solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub a: CellId,
    pub b: CellId,
}

impl Edge {
    pub(crate) fn new(mut a: CellId, mut b: CellId) -> Self {
        if (b.i, b.j) < (a.i, a.j) {
            std::mem::swap(&mut a, &mut b);
        }
        Edge { a, b }
    }

    pub fn touches(&self, c: CellId) -> bool {
        self.a == c || self.b == c
    }

    pub fn other(&self, c: CellId) -> CellId {
        if self.a == c {
            self.b
        } else {
            debug_assert_eq!(self.b, c);
            self.a
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct CellState {
    capacity: f64,
    discovered_t: Option<u64>,
    reached_t: Option<u64>,
}

/// An `X x Y` lattice of cells with random capacities, grown by invasion
/// percolation from a seed cell.
#[derive(Debug, Clone)]
pub struct Network {
    x: usize,
    y: usize,
    n: usize,
    cells: Vec<CellState>,
    edges: Vec<Edge>,
}

impl Network {
    /// Grow a network over an `x * y` lattice, filling `round(x*y*occupancy)`
    /// cells beyond the seed.
    ///
    /// # Panics
    /// Panics if `occupancy` is outside `[0, 1]`, or if `x == 0 || y == 0`.
    pub fn grow(x: usize, y: usize, occupancy: f64, rng: &mut impl Rng) -> Self {
        assert!((0.0..=1.0).contains(&occupancy), "occupancy must be in [0, 1]");
        assert!(x > 0 && y > 0, "lattice dimensions must be nonzero");
        let n = (x as f64 * y as f64 * occupancy).round() as usize;

        let cells = (0..x * y).map(|_| CellState { capacity: rng.gen_range(0.0..1.0), discovered_t: None, reached_t: None }).collect();
        let mut net = Network { x, y, n, cells, edges: Vec::new() };
        net.run_growth();
        net
    }

    fn index(&self, c: CellId) -> usize {
        c.i * self.y + c.j
    }

    pub fn width(&self) -> usize {
        self.x
    }

    pub fn height(&self) -> usize {
        self.y
    }

    pub fn target_reached(&self) -> usize {
        self.n
    }

    pub fn capacity(&self, c: CellId) -> f64 {
        self.cells[self.index(c)].capacity
    }

    pub fn is_reached(&self, c: CellId) -> bool {
        self.cells[self.index(c)].reached_t.is_some()
    }

    pub fn is_discovered(&self, c: CellId) -> bool {
        self.cells[self.index(c)].discovered_t.is_some()
    }

    pub fn reached_cells(&self) -> Vec<CellId> {
        self.all_cells().filter(|&c| self.is_reached(c)).collect()
    }

    pub fn all_cells(&self) -> impl Iterator<Item = CellId> + '_ {
        let y = self.y;
        (0..self.x).flat_map(move |i| (0..y).map(move |j| CellId::new(i, j)))
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// The 4-connected neighbors of `c` that lie on the lattice.
    pub fn neighbours(&self, c: CellId) -> Vec<CellId> {
        let mut out = Vec::with_capacity(4);
        if c.i > 0 {
            out.push(CellId::new(c.i - 1, c.j));
        }
        if c.i + 1 < self.x {
            out.push(CellId::new(c.i + 1, c.j));
        }
        if c.j > 0 {
            out.push(CellId::new(c.i, c.j - 1));
        }
        if c.j + 1 < self.y {
            out.push(CellId::new(c.i, c.j + 1));
        }
        out
    }

    /// Mark each not-yet-discovered cell in `cs` as discovered at time `t`
    /// and enqueue it exactly once.
    fn discover_and_enqueue(&mut self, cs: &[CellId], t: u64, queue: &mut MinHeap<CellId>) {
        for &c in cs {
            if !self.is_discovered(c) {
                let idx = self.index(c);
                self.cells[idx].discovered_t = Some(t);
                queue.push(self.capacity(c), c);
            }
        }
    }

    fn run_growth(&mut self) {
        let seed = CellId::new(self.x / 2, self.y / 2);
        {
            let idx = self.index(seed);
            self.cells[idx].reached_t = Some(0);
            self.cells[idx].discovered_t = Some(0);
        }
        let mut queue: MinHeap<CellId> = MinHeap::with_capacity(self.x * self.y);
        let seed_neighbours = self.neighbours(seed);
        self.discover_and_enqueue(&seed_neighbours, 0, &mut queue);

        for t in 1..=self.n as u64 {
            let (_, c) = queue.pop().expect("discovered queue exhausted before reaching target occupancy");
            debug_assert!(self.is_discovered(c));
            debug_assert!(!self.is_reached(c));
            {
                let idx = self.index(c);
                self.cells[idx].reached_t = Some(t);
            }

            let neighbours = self.neighbours(c);
            self.discover_and_enqueue(&neighbours, t, &mut queue);
            for &nb in &neighbours {
                if self.is_reached(nb) {
                    self.edges.push(Edge::new(c, nb));
                }
            }
        }
    }
}

#[cfg(test)]
impl Network {
    /// Build a network directly from explicit reached cells and edges,
    /// bypassing growth — used by graph/solver tests that need a fixed,
    /// hand-checkable topology rather than a randomly grown one.
    pub(crate) fn from_fixture(x: usize, y: usize, reached: &[CellId], edges: Vec<Edge>) -> Self {
        let mut cells = vec![CellState { capacity: 0.0, discovered_t: None, reached_t: None }; x * y];
        for (t, &c) in reached.iter().enumerate() {
            let idx = c.i * y + c.j;
            cells[idx].discovered_t = Some(t as u64);
            cells[idx].reached_t = Some(t as u64);
        }
        Network { x, y, n: reached.len().saturating_sub(1), cells, edges }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn grows_exactly_n_plus_one_reached_cells() {
        let mut rng = SmallRng::seed_from_u64(7);
        let net = Network::grow(10, 10, 0.5, &mut rng);
        assert_eq!(net.reached_cells().len(), 50 + 1);
    }

    #[test]
    fn every_edge_connects_reached_4_neighbours() {
        let mut rng = SmallRng::seed_from_u64(11);
        let net = Network::grow(8, 8, 0.4, &mut rng);
        for e in net.edges() {
            assert!(net.is_reached(e.a));
            assert!(net.is_reached(e.b));
            assert!(net.neighbours(e.a).contains(&e.b));
        }
    }

    #[test]
    fn non_square_lattice_respects_both_axis_bounds() {
        let mut rng = SmallRng::seed_from_u64(3);
        let net = Network::grow(3, 9, 0.3, &mut rng);
        for c in net.all_cells() {
            for n in net.neighbours(c) {
                assert!(n.i < 3 && n.j < 9);
            }
        }
    }

    #[test]
    fn zero_occupancy_reaches_only_the_seed() {
        let mut rng = SmallRng::seed_from_u64(1);
        let net = Network::grow(6, 6, 0.0, &mut rng);
        assert_eq!(net.reached_cells().len(), 1);
        assert!(net.edges().is_empty());
    }
}
