//! End-to-end scenarios 1 and 6 (the other four live as unit tests next to
//! the module they exercise: scenario 2 in `cco.rs`, scenario 3/4 in
//! `graph.rs`, scenario 5 in `solver.rs`).

use vasculo_core::geometry::Vec2;
use vasculo_core::tree::Tree;

#[test]
fn single_bifurcation_geometry() {
    let mut tree = Tree::new(1.0, Vec2::new(0.0, 0.0));
    let root = tree.seed(Vec2::new(10.0, 0.0));

    let (parent, terminal) = tree.bifurcate(root, Vec2::new(5.0, 5.0), None);
    assert_eq!(tree.descendants().len(), 3);

    let midpoint_distal = tree.distal_point(parent);
    assert!((midpoint_distal - Vec2::new(5.0, 0.0)).magnitude() < 1e-12);

    let terminal_distal_before = tree.distal_point(terminal);
    let root_distal_before = tree.distal_point(root);

    tree.geometrically_optimise(root, 10);

    assert!((tree.distal_point(parent) - midpoint_distal).magnitude() > 1e-9, "geometric optimization should move the bifurcation off the midpoint");
    assert!((tree.proximal_point(root) - tree.distal_point(parent)).magnitude() < 1e-12, "root's proximal point always tracks its parent's (new) distal point");
    assert!((tree.distal_point(root) - root_distal_before).magnitude() < 1e-12, "a bifurcation moving does not relocate its children's distal points");
    assert!((tree.distal_point(terminal) - terminal_distal_before).magnitude() < 1e-12, "a bifurcation moving does not relocate its children's distal points");

    for h in tree.descendants() {
        if let Some((a, b)) = tree.children(h) {
            let err = (tree.scale(a).powf(3.0) + tree.scale(b).powf(3.0) - 1.0).abs();
            assert!(err < 1e-13, "murray's law violated: {err}");
        }
    }
}
