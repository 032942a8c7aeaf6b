use rand::rngs::SmallRng;
use rand::SeedableRng;
use vasculo_core::graph;
use vasculo_core::Network;

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 5 {
        eprintln!("usage: grow_network <x> <y> <occupancy> <seed>");
        std::process::exit(1);
    }
    let x: usize = args[1].parse().expect("x");
    let y: usize = args[2].parse().expect("y");
    let occupancy: f64 = args[3].parse().expect("occupancy");
    let seed: u64 = args[4].parse().expect("seed");

    let mut rng = SmallRng::seed_from_u64(seed);
    let net = Network::grow(x, y, occupancy, &mut rng);

    let path = graph::shortest_path_edges(&net);
    let (surviving_nodes, surviving_edges) = graph::remove_dead_ends(&net);
    println!(
        "reached={} edges={} shortest_path_len={} surviving_nodes={} surviving_edges={}",
        net.reached_cells().len(),
        net.edges().len(),
        path.len(),
        surviving_nodes.len(),
        surviving_edges.len(),
    );

    match vasculo_core::solver::solve(&net, false) {
        Ok(solution) => {
            let total_flow: f64 = solution.edge_flows.iter().map(|ef| ef.flow.abs()).sum();
            println!("solved edges={} total_abs_flow={:.4}", solution.edge_flows.len(), total_flow);
        }
        Err(e) => eprintln!("solver error: {e}"),
    }
}
