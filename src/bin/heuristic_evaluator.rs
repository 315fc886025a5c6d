use clap::Parser;
use log::warn;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use rush_hour_solver::heuristics::Heuristic;
use rush_hour_solver::solver::{Algorithm, Strategy};
use rush_hour_solver::utils::{load_puzzle, scramble};
use std::path::PathBuf;
use std::process;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Number of scrambled boards to evaluate
    #[clap(short, long, default_value_t = 20)]
    boards: usize,

    /// Random slides applied to the puzzle for each board
    #[clap(short, long, default_value_t = 30)]
    steps: usize,

    /// Seed of the first board; board i uses seed + i
    #[clap(long, default_value_t = 0)]
    seed: u64,

    /// Path to the puzzle file to scramble
    puzzle_file: PathBuf,
}

#[derive(Default)]
struct Tally {
    nodes: u64,
    length: usize,
    solved: usize,
    failed: usize,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let puzzle = match load_puzzle(&args.puzzle_file) {
        Ok(board) => board,
        Err(e) => {
            eprintln!("Failed to load puzzle from {}: {}", args.puzzle_file.display(), e);
            process::exit(1);
        }
    };

    let mut strategies: Vec<Box<dyn Strategy>> = vec![Algorithm::Ucs.build(Heuristic::Distance)];
    for algorithm in [Algorithm::Gbfs, Algorithm::Astar, Algorithm::Idastar] {
        for heuristic in [Heuristic::Distance, Heuristic::Blocking] {
            strategies.push(algorithm.build(heuristic));
        }
    }
    let mut tallies: Vec<Tally> = strategies.iter().map(|_| Tally::default()).collect();

    println!(
        "Starting heuristic evaluation for {} boards ({} scramble steps each)...",
        args.boards, args.steps
    );

    for board_idx in 0..args.boards {
        let current_seed = args.seed + board_idx as u64;
        let mut rng = SmallRng::seed_from_u64(current_seed);
        let board = scramble(&puzzle, args.steps, &mut rng);

        println!("\nEvaluating Board {} (Seed: {})", board_idx, current_seed);

        for (strategy, tally) in strategies.iter().zip(tallies.iter_mut()) {
            let outcome = strategy.search(&board);
            tally.nodes += outcome.stats.nodes_expanded;
            match outcome.solution {
                Some(solution) => {
                    if let Err(e) = solution.verify(&board) {
                        warn!("{} produced an invalid solution: {}", strategy.name(), e);
                    }
                    println!(
                        "  Strategy: {:<45} Nodes: {:<8} Length: {}",
                        strategy.name(),
                        outcome.stats.nodes_expanded,
                        solution.len()
                    );
                    tally.length += solution.len();
                    tally.solved += 1;
                }
                None => {
                    println!(
                        "  Strategy: {:<45} Nodes: {:<8} No solution",
                        strategy.name(),
                        outcome.stats.nodes_expanded
                    );
                    tally.failed += 1;
                }
            }
        }
    }

    println!("\n--- Evaluation Complete ---");
    println!("Number of boards evaluated: {}", args.boards);
    println!("\n--- Averages ---");

    let mut rows: Vec<(String, f64, f64, usize)> = strategies
        .iter()
        .zip(&tallies)
        .filter(|(_, tally)| tally.solved + tally.failed > 0)
        .map(|(strategy, tally)| {
            let runs = (tally.solved + tally.failed) as f64;
            let avg_length = if tally.solved > 0 {
                tally.length as f64 / tally.solved as f64
            } else {
                0.0
            };
            (strategy.name(), tally.nodes as f64 / runs, avg_length, tally.failed)
        })
        .collect();

    // Fewest nodes first
    rows.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

    for (name, avg_nodes, avg_length, failed) in rows {
        println!(
            "Strategy {:<45}: Average Nodes = {:>10.1}, Average Length = {:>6.2}, Unsolved = {}",
            name, avg_nodes, avg_length, failed
        );
    }
}
