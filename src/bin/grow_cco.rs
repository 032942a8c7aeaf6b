use rand::rngs::SmallRng;
use rand::SeedableRng;
use vasculo_core::{CcoConfig, CcoGenerator, CircularDomain, Vec2};

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 4 {
        eprintln!("usage: grow_cco <radius> <terminals> <seed>");
        std::process::exit(1);
    }
    let radius: f64 = args[1].parse().expect("radius");
    let terminals: usize = args[2].parse().expect("terminals");
    let seed: u64 = args[3].parse().expect("seed");

    let mut rng = SmallRng::seed_from_u64(seed);
    let domain = CircularDomain::new(radius);
    let config = CcoConfig::default();
    let mut gen = CcoGenerator::new(config, Vec2::new(radius, 0.0), domain, &mut rng);

    for i in 0..terminals {
        if let Err(e) = gen.step(&mut rng) {
            eprintln!("terminal {i}: {e}");
            std::process::exit(1);
        }
    }

    let tree = gen.tree();
    let num_terminals = tree.descendants().iter().filter(|&&h| tree.is_terminal(h)).count();
    println!(
        "terminals={num_terminals} cost={:.4} root_radius={:.4}",
        tree.cost(),
        tree.origin_radius()
    );
    for (iteration, rank) in &gen.winner_ranks {
        println!("iteration={iteration} winner_rank={rank}");
    }
}
