//! Arena-backed binary vascular tree (spec.md §3, §4.C, §9 "cyclic
//! parent/child references").
//!
//! Ported from `original_source/BloodVessel.py` (`BaseBloodVessel`,
//! `Origin`, `BloodVessel`). Rather than a tree of boxed/Rc nodes with
//! parent back-pointers, the tree lives in a single arena addressed by
//! integer handles — this gives O(1) upward rescale traversal without
//! reference cycles, and makes `copy_subtree` a single arena clone (spec.md
//! §9).

use serde::{Deserialize, Serialize};

use crate::geometry::{LineSegment, Vec2};

/// Murray's law exponent.
const GAMMA: f64 = 3.0;

/// An index into a [`Tree`]'s arena. Stable across mutation of *other*
/// vessels, invalidated only for a handle whose node was freed.
pub type Handle = usize;

#[derive(Debug, Clone)]
enum Node {
    Origin { radius: f64, point: Vec2, child: Option<Handle> },
    Vessel {
        parent: Handle,
        /// `s` in spec.md §3: this vessel's radius as a multiple of its
        /// parent's radius.
        scale: f64,
        distal: Vec2,
        /// Cached resistance coefficient of this vessel's distal subtree;
        /// 0.0 for a terminal.
        k: f64,
        children: Option<(Handle, Handle)>,
    },
}

/// A binary vascular tree rooted at a fixed origin.
#[derive(Debug, Clone)]
pub struct Tree {
    arena: Vec<Option<Node>>,
    free: Vec<Handle>,
    origin: Handle,
}

impl Tree {
    /// Construct a new tree with just an anchored origin and no root
    /// vessel yet. Call [`Tree::seed`] to attach the first vessel.
    pub fn new(root_radius: f64, inflow_point: Vec2) -> Self {
        let mut arena = Vec::with_capacity(64);
        arena.push(Some(Node::Origin { radius: root_radius, point: inflow_point, child: None }));
        Tree { arena, free: Vec::new(), origin: 0 }
    }

    fn alloc(&mut self, node: Node) -> Handle {
        if let Some(h) = self.free.pop() {
            self.arena[h] = Some(node);
            h
        } else {
            self.arena.push(Some(node));
            self.arena.len() - 1
        }
    }

    fn free_handle(&mut self, h: Handle) {
        self.arena[h] = None;
        self.free.push(h);
    }

    fn node(&self, h: Handle) -> &Node {
        self.arena[h].as_ref().expect("handle refers to a freed vessel")
    }

    fn node_mut(&mut self, h: Handle) -> &mut Node {
        self.arena[h].as_mut().expect("handle refers to a freed vessel")
    }

    pub fn origin(&self) -> Handle {
        self.origin
    }

    pub fn origin_radius(&self) -> f64 {
        match self.node(self.origin) {
            Node::Origin { radius, .. } => *radius,
            _ => unreachable!(),
        }
    }

    /// The origin's root vessel, if the tree has been seeded.
    pub fn root(&self) -> Option<Handle> {
        match self.node(self.origin) {
            Node::Origin { child, .. } => *child,
            _ => unreachable!(),
        }
    }

    /// Attach the single root vessel to the origin. Must be called exactly
    /// once, before any other mutation.
    pub fn seed(&mut self, distal: Vec2) -> Handle {
        assert!(self.root().is_none(), "origin already has a root vessel");
        let h = self.alloc(Node::Vessel { parent: self.origin, scale: 1.0, distal, k: 0.0, children: None });
        match self.node_mut(self.origin) {
            Node::Origin { child, .. } => *child = Some(h),
            _ => unreachable!(),
        }
        h
    }

    fn is_origin(&self, h: Handle) -> bool {
        h == self.origin
    }

    pub fn is_terminal(&self, h: Handle) -> bool {
        match self.node(h) {
            Node::Vessel { children, .. } => children.is_none(),
            Node::Origin { .. } => false,
        }
    }

    pub fn parent(&self, h: Handle) -> Option<Handle> {
        match self.node(h) {
            Node::Vessel { parent, .. } => Some(*parent),
            Node::Origin { .. } => None,
        }
    }

    pub fn children(&self, h: Handle) -> Option<(Handle, Handle)> {
        match self.node(h) {
            Node::Vessel { children, .. } => *children,
            Node::Origin { .. } => None,
        }
    }

    pub fn scale(&self, h: Handle) -> f64 {
        match self.node(h) {
            Node::Vessel { scale, .. } => *scale,
            Node::Origin { .. } => 1.0,
        }
    }

    pub fn k(&self, h: Handle) -> f64 {
        match self.node(h) {
            Node::Vessel { k, .. } => *k,
            Node::Origin { .. } => 0.0,
        }
    }

    pub fn distal_point(&self, h: Handle) -> Vec2 {
        match self.node(h) {
            Node::Vessel { distal, .. } => *distal,
            Node::Origin { point, .. } => *point,
        }
    }

    fn set_distal_point(&mut self, h: Handle, p: Vec2) {
        match self.node_mut(h) {
            Node::Vessel { distal, .. } => *distal = p,
            Node::Origin { .. } => panic!("cannot move the origin's inflow point"),
        }
    }

    pub fn proximal_point(&self, h: Handle) -> Vec2 {
        let parent = self.parent(h).expect("vessel not attached to a parent");
        self.distal_point(parent)
    }

    /// Absolute radius: parent's radius scaled down recursively to the
    /// origin.
    pub fn radius(&self, h: Handle) -> f64 {
        match self.node(h) {
            Node::Origin { radius, .. } => *radius,
            Node::Vessel { parent, scale, .. } => self.radius(*parent) * scale,
        }
    }

    pub fn length(&self, h: Handle) -> f64 {
        self.line_segment(h).length()
    }

    pub fn line_segment(&self, h: Handle) -> LineSegment {
        LineSegment::new(self.proximal_point(h), self.distal_point(h))
    }

    /// Number of terminal descendants reachable from `h` (1 if `h` is
    /// itself a terminal).
    pub fn num_terminals(&self, h: Handle) -> u64 {
        match self.children(h) {
            Some((a, b)) => self.num_terminals(a) + self.num_terminals(b),
            None => 1,
        }
    }

    /// Pre-order enumeration of every vessel reachable from the origin's
    /// root (the origin itself is excluded, matching
    /// `Origin.descendants` in the original).
    pub fn descendants(&self) -> Vec<Handle> {
        let mut out = Vec::new();
        if let Some(root) = self.root() {
            self.collect_descendants(root, &mut out);
        }
        out
    }

    fn collect_descendants(&self, h: Handle, out: &mut Vec<Handle>) {
        out.push(h);
        if let Some((a, b)) = self.children(h) {
            self.collect_descendants(a, out);
            self.collect_descendants(b, out);
        }
    }

    /// Total cost (summed vessel volume) of the whole tree.
    pub fn cost(&self) -> f64 {
        match self.root() {
            Some(root) => self.cost_from_radius(root, self.origin_radius()),
            None => 0.0,
        }
    }

    fn cost_from_radius(&self, h: Handle, incoming_radius: f64) -> f64 {
        let r = incoming_radius * self.scale(h);
        let own = std::f64::consts::PI * r * r * self.length(h);
        match self.children(h) {
            Some((a, b)) => own + self.cost_from_radius(a, r) + self.cost_from_radius(b, r),
            None => own,
        }
    }

    /// Per-vessel volume terms (this vessel's own segment only, not its
    /// subtree), in descendant-enumeration order. Supplements spec.md's
    /// aggregate `cost` with the per-vessel breakdown
    /// `CCODataVisualiser.py`/`CCOHeatMapDrawer.py` consume in the original.
    pub fn cost_breakdown(&self) -> Vec<(Handle, f64)> {
        self.descendants().into_iter().map(|h| (h, std::f64::consts::PI * self.radius(h).powi(2) * self.length(h))).collect()
    }

    /// Insert a new bifurcation splitting `h`'s former parent edge,
    /// attaching a fresh terminal at `terminal_point`. `h` keeps its
    /// original scale (it becomes the new parent's "child 0"); the fresh
    /// terminal becomes "child 1" with scale 1.0. Returns the new parent
    /// and new terminal handles.
    ///
    /// # Panics
    /// Panics if `h` is the origin or otherwise unattached.
    pub fn bifurcate(&mut self, h: Handle, terminal_point: Vec2, bifurcation_point: Option<Vec2>) -> (Handle, Handle) {
        assert!(!self.is_origin(h), "cannot bifurcate the origin");
        let old_parent = self.parent(h).expect("vessel not attached");
        let bifurcation_point = bifurcation_point.unwrap_or_else(|| {
            let mid = self.proximal_point(h) + self.distal_point(h);
            mid * 0.5
        });

        let new_parent = self.alloc(Node::Vessel { parent: old_parent, scale: 1.0, distal: bifurcation_point, k: 0.0, children: None });
        self.relink_child(old_parent, h, new_parent);

        match self.node_mut(h) {
            Node::Vessel { parent, .. } => *parent = new_parent,
            Node::Origin { .. } => unreachable!(),
        }

        let new_terminal = self.alloc(Node::Vessel { parent: new_parent, scale: 1.0, distal: terminal_point, k: 0.0, children: None });

        match self.node_mut(new_parent) {
            Node::Vessel { children, .. } => *children = Some((h, new_terminal)),
            Node::Origin { .. } => unreachable!(),
        }

        self.rescale(new_parent);
        (new_parent, new_terminal)
    }

    /// Replace `old`'s link to `target` with a link to `replacement`
    /// (used when splicing a bifurcation in or out).
    fn relink_child(&mut self, old: Handle, target: Handle, replacement: Handle) {
        match self.node_mut(old) {
            Node::Origin { child, .. } => {
                debug_assert_eq!(*child, Some(target));
                *child = Some(replacement);
            }
            Node::Vessel { children, .. } => {
                let (a, b) = children.expect("parent has no children to relink");
                if a == target {
                    *children = Some((replacement, b));
                } else {
                    debug_assert_eq!(b, target);
                    *children = Some((a, replacement));
                }
            }
        }
    }

    /// Inverse of [`Tree::bifurcate`]: removes `h`'s parent bifurcation,
    /// splicing `h` back into the grandparent's child slot at its
    /// pre-bifurcation scale, and frees the sibling subtree the
    /// bifurcation introduced.
    pub fn remove_bifurcation(&mut self, h: Handle) {
        let p = self.parent(h).expect("vessel not attached");
        assert!(!self.is_origin(p), "h is the root vessel; there is no bifurcation to remove");
        let (a, b) = self.children(p).expect("parent has no children");
        let sibling = if a == h { b } else { debug_assert_eq!(b, h); a };

        let grandparent = self.parent(p).expect("bifurcation vessel not attached");
        let restored_scale = self.scale(p);

        self.free_subtree(sibling);
        self.relink_child(grandparent, p, h);

        match self.node_mut(h) {
            Node::Vessel { parent, scale, .. } => {
                *parent = grandparent;
                *scale = restored_scale;
            }
            Node::Origin { .. } => unreachable!(),
        }
        self.free_handle(p);
        self.rescale(grandparent);
    }

    fn free_subtree(&mut self, h: Handle) {
        if let Some((a, b)) = self.children(h) {
            self.free_subtree(a);
            self.free_subtree(b);
        }
        self.free_handle(h);
    }

    /// Recompute scale factors bottom-up from `v` to the origin
    /// (spec.md §4.C rescaling rule). `v` must be an internal (two-child)
    /// vessel; the origin's rescale is a no-op.
    pub fn rescale(&mut self, v: Handle) {
        if self.is_origin(v) {
            return;
        }
        let (a, b) = self.children(v).expect("rescale requires an internal vessel");

        let res_a = self.k(a) + self.length(a);
        let res_b = self.k(b) + self.length(b);
        let nt_a = self.num_terminals(a) as f64;
        let nt_b = self.num_terminals(b) as f64;

        let s_ratio = ((nt_b * res_b) / (nt_a * res_a)).powf(1.0 / GAMMA);
        let s_a = (1.0 + s_ratio.powf(GAMMA)).powf(-1.0 / GAMMA);
        let s_b = (1.0 + s_ratio.powf(-GAMMA)).powf(-1.0 / GAMMA);
        let k_new = 1.0 / (s_a.powi(4) / res_a + s_b.powi(4) / res_b);

        debug_assert!((1.0 - s_a.powf(GAMMA) - s_b.powf(GAMMA)).abs() < 1e-13, "Murray's law violated");
        debug_assert!(
            (res_a * nt_a * s_a.powi(-4) - res_b * nt_b * s_b.powi(-4)).abs() < 1e-10,
            "parallel-pressure balance violated"
        );

        match self.node_mut(a) {
            Node::Vessel { scale, .. } => *scale = s_a,
            Node::Origin { .. } => unreachable!(),
        }
        match self.node_mut(b) {
            Node::Vessel { scale, .. } => *scale = s_b,
            Node::Origin { .. } => unreachable!(),
        }
        match self.node_mut(v) {
            Node::Vessel { k, .. } => *k = k_new,
            Node::Origin { .. } => unreachable!(),
        }

        let parent = self.parent(v).unwrap();
        self.rescale(parent);
    }

    /// Search for the best position of `v`'s parent's distal point (the
    /// bifurcation point), minimizing total tree cost (spec.md §4.C).
    /// `v` must be "child 0" of its parent (the pre-existing vessel side
    /// of a bifurcation, not the freshly attached terminal).
    pub fn geometrically_optimise(&mut self, v: Handle, intervals: usize) {
        let va = self.parent(v).expect("vessel not attached");
        assert!(!self.is_origin(va), "cannot optimise the bifurcation above the root vessel");
        let (vb, vc) = self.children(va).expect("parent has no children");
        debug_assert_eq!(vb, v, "v must be child 0 of its parent");

        let xa = self.proximal_point(va);
        let xb = self.distal_point(vb);
        let xc = self.distal_point(vc);
        let samples = crate::heuristic::point_sample_triangle(xa, xb, xc, intervals);

        let mut best_cost = self.cost();
        let mut best_point = self.distal_point(va);

        for p in samples {
            self.set_distal_point(va, p);
            if self.length(va) == 0.0 || self.length(vb) == 0.0 || self.length(vc) == 0.0 {
                continue;
            }
            self.rescale(va);
            let c = self.cost();
            if c < best_cost {
                best_cost = c;
                best_point = p;
            }
        }
        self.set_distal_point(va, best_point);
        self.rescale(va);
    }

    /// A deep, independently-owned copy of the whole tree (spec.md §4.C
    /// `copy_subtree`/`copy_whole_tree`: since a `Tree` is always exactly
    /// the reachable set from its origin, cloning from the origin or from
    /// any attached vessel produces the same result).
    pub fn copy_subtree(&self) -> Tree {
        self.clone()
    }

    /// See [`Tree::copy_subtree`].
    pub fn copy_whole_tree(&self) -> Tree {
        self.clone()
    }

    /// Structural equality: same origin radius/point, and recursively
    /// identical descendant radii and distal points (spec.md P5).
    pub fn structurally_equals(&self, other: &Tree) -> bool {
        if self.origin_radius() != other.origin_radius() || self.distal_point(self.origin) != other.distal_point(other.origin) {
            return false;
        }
        match (self.root(), other.root()) {
            (None, None) => true,
            (Some(a), Some(b)) => self.subtree_equals(a, other, b),
            _ => false,
        }
    }

    fn subtree_equals(&self, a: Handle, other: &Tree, b: Handle) -> bool {
        if self.radius(a) != other.radius(b) || self.distal_point(a) != other.distal_point(b) {
            return false;
        }
        match (self.children(a), other.children(b)) {
            (None, None) => true,
            (Some((a0, a1)), Some((b0, b1))) => self.subtree_equals(a0, other, b0) && self.subtree_equals(a1, other, b1),
            _ => false,
        }
    }
}

/// One row of the persisted tree format (spec.md §6). This is pure data —
/// producing the tab-separated file itself is the external writer's job
/// (spec.md §1 Non-goals).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VesselRecord {
    pub id: String,
    pub proximal_point: Vec2,
    pub distal_point: Vec2,
    pub length: f64,
    pub radius: f64,
    pub scaling_factor: f64,
    pub resistance_constant: f64,
    pub resistance: f64,
    pub pressure_drop: f64,
    pub parent: Option<String>,
    pub number_of_terminals: u64,
    pub left_child: Option<String>,
    pub right_child: Option<String>,
}

impl Tree {
    /// Enumerate every vessel as a [`VesselRecord`], assigning ids
    /// `v0..v{n-1}` in descendant-enumeration (pre-order) order, matching
    /// spec.md §6's persisted format. `total_flow` distributes a single
    /// unit of inflow proportional to each vessel's downstream terminal
    /// count to derive a per-vessel pressure drop (`resistance * flow`);
    /// the original's Poiseuille-style resistance network implies this
    /// split but does not spell out the column's formula directly.
    pub fn to_records(&self, total_flow: f64) -> Vec<VesselRecord> {
        let order = self.descendants();
        let index_of: std::collections::HashMap<Handle, usize> = order.iter().enumerate().map(|(i, h)| (*h, i)).collect();
        let id_of = |h: Handle| format!("v{}", index_of[&h]);
        let total_terminals = self.root().map(|r| self.num_terminals(r) as f64).unwrap_or(1.0).max(1.0);

        order
            .iter()
            .map(|&h| {
                let radius = self.radius(h);
                let resistance_constant = self.length(h);
                let resistance = resistance_constant / radius.powi(4);
                let n = self.num_terminals(h) as f64;
                let flow = total_flow * (n / total_terminals);
                let (left_child, right_child) = match self.children(h) {
                    Some((a, b)) => (Some(id_of(a)), Some(id_of(b))),
                    None => (None, None),
                };
                let parent = self.parent(h).filter(|&p| !self.is_origin(p)).map(id_of);
                VesselRecord {
                    id: id_of(h),
                    proximal_point: self.proximal_point(h),
                    distal_point: self.distal_point(h),
                    length: self.length(h),
                    radius,
                    scaling_factor: self.scale(h),
                    resistance_constant,
                    resistance,
                    pressure_drop: resistance * flow,
                    parent,
                    number_of_terminals: self.num_terminals(h),
                    left_child,
                    right_child,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_tree() -> (Tree, Handle) {
        let mut t = Tree::new(1.0, Vec2::new(0.0, 0.0));
        let root = t.seed(Vec2::new(10.0, 0.0));
        (t, root)
    }

    #[test]
    fn seed_creates_single_terminal_vessel() {
        let (t, root) = seeded_tree();
        assert!(t.is_terminal(root));
        assert_eq!(t.num_terminals(root), 1);
        assert_eq!(t.descendants(), vec![root]);
    }

    #[test]
    fn bifurcation_produces_three_vessels_with_midpoint_default() {
        let (mut t, root) = seeded_tree();
        let (p, term) = t.bifurcate(root, Vec2::new(5.0, 5.0), None);
        assert_eq!(t.descendants().len(), 3);
        assert_eq!(t.children(p), Some((root, term)));
        // default bifurcation point is the midpoint of the original segment
        assert!((t.distal_point(p).x - 5.0).abs() < 1e-12);
        assert!((t.distal_point(p).y - 0.0).abs() < 1e-12);
        // root's proximal point now tracks the new bifurcation vessel's distal point
        assert!((t.proximal_point(root) - t.distal_point(p)).magnitude() < 1e-12);
    }

    #[test]
    fn murrays_law_holds_after_bifurcation() {
        let (mut t, root) = seeded_tree();
        let (p, _term) = t.bifurcate(root, Vec2::new(5.0, 5.0), None);
        let (a, b) = t.children(p).unwrap();
        let err = (t.scale(a).powf(3.0) + t.scale(b).powf(3.0) - 1.0).abs();
        assert!(err < 1e-13, "murray's law violated: {err}");
    }

    #[test]
    fn geometric_optimisation_moves_bifurcation_off_midpoint() {
        let (mut t, root) = seeded_tree();
        let (p, _term) = t.bifurcate(root, Vec2::new(5.0, 5.0), None);
        let before = t.distal_point(p);
        t.geometrically_optimise(root, 10);
        let after = t.distal_point(p);
        assert!((before.x - after.x).abs() > 1e-6 || (before.y - after.y).abs() > 1e-6);
        // proximal and terminal distal points are untouched
        assert!((t.proximal_point(root).x - 0.0).abs() < 1e-12);
    }

    #[test]
    fn bifurcate_then_remove_roundtrips_to_structural_equality() {
        let (mut t, root) = seeded_tree();
        let before = t.copy_subtree();
        t.bifurcate(root, Vec2::new(5.0, 5.0), None);
        // remove_bifurcation is called on the original vessel (child 0),
        // splicing it back into its grandparent and restoring its scale.
        t.remove_bifurcation(root);
        assert!(t.structurally_equals(&before));
    }

    #[test]
    fn copy_subtree_is_independent() {
        let (mut t, root) = seeded_tree();
        let copy = t.copy_subtree();
        t.bifurcate(root, Vec2::new(1.0, 1.0), None);
        assert!(t.descendants().len() > copy.descendants().len());
    }

    #[test]
    fn to_records_assigns_ids_in_descendant_order() {
        let (mut t, root) = seeded_tree();
        t.bifurcate(root, Vec2::new(5.0, 5.0), None);
        let records = t.to_records(1.0);
        assert_eq!(records[0].id, "v0");
        assert!(records[0].parent.is_none(), "root vessel's parent (the origin) has no id");
        assert_eq!(records[0].left_child.as_deref(), Some("v1"));
        assert_eq!(records[0].right_child.as_deref(), Some("v2"));
    }
}
