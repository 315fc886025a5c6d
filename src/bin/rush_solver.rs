use clap::Parser;
use log::warn;
use rush_hour_solver::engine::Board;
use rush_hour_solver::heuristics::Heuristic;
use rush_hour_solver::solver::{Algorithm, SearchOutcome, Strategy};
use rush_hour_solver::utils::load_puzzle;
use std::path::PathBuf;
use std::process;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Search strategy
    #[clap(short, long, value_enum, default_value_t = Algorithm::Astar)]
    algorithm: Algorithm,

    /// Heuristic for informed strategies (ignored by ucs)
    #[clap(long, value_enum, default_value_t = Heuristic::Distance)]
    heuristic: Heuristic,

    /// Run every strategy/heuristic pair and print a comparison table
    #[clap(short, long)]
    compare: bool,

    /// Disable ANSI colours in board output
    #[clap(long)]
    no_color: bool,

    /// Path to the puzzle file
    puzzle_file: PathBuf,
}

fn print_solution(initial: &Board, strategy: &dyn Strategy, outcome: &SearchOutcome, color: bool) {
    let Some(solution) = &outcome.solution else {
        println!("No solution found.");
        println!(
            "Nodes expanded: {}, time: {:.2} ms\n",
            outcome.stats.nodes_expanded,
            outcome.stats.elapsed.as_secs_f64() * 1000.0
        );
        return;
    };

    if let Err(e) = solution.verify(initial) {
        eprintln!("Solution failed verification: {}", e);
        process::exit(2);
    }

    println!("Solution found ({} moves):\n", solution.len());
    for (i, (mv, state)) in solution.moves.iter().zip(&solution.states[1..]).enumerate() {
        let g = i + 1;
        match strategy.heuristic() {
            Some(heuristic) => {
                let h = heuristic.evaluate(state);
                println!("Move {}: {}  (g={}, h={}, f={})", g, mv, g, h, g as u32 + h);
            }
            None => println!("Move {}: {}  (g={})", g, mv, g),
        }
        println!("{}\n", state.render(Some(mv.piece), color));
    }
    println!("Nodes expanded: {}", outcome.stats.nodes_expanded);
    println!("Time: {:.2} ms", outcome.stats.elapsed.as_secs_f64() * 1000.0);
    if strategy.guarantees_optimal() {
        println!("Solution length: {}\n", solution.len());
    } else {
        println!("Solution length: {} (not guaranteed shortest)\n", solution.len());
    }
}

fn compare_all(initial: &Board) {
    let mut strategies: Vec<Box<dyn Strategy>> = vec![Algorithm::Ucs.build(Heuristic::Distance)];
    for algorithm in [Algorithm::Gbfs, Algorithm::Astar, Algorithm::Idastar] {
        for heuristic in [Heuristic::Distance, Heuristic::Blocking] {
            strategies.push(algorithm.build(heuristic));
        }
    }

    println!(
        "{:<45} {:>10} {:>12} {:>8} {:>9}",
        "Strategy", "Nodes", "Time (ms)", "Length", "Shortest"
    );
    // UCS runs first and sets the reference length.
    let mut shortest: Option<usize> = None;
    for strategy in &strategies {
        let outcome = strategy.search(initial);
        let length = outcome.solution.as_ref().map(|s| s.len());
        if strategy.heuristic().is_none() {
            shortest = length;
        }
        let matches_shortest = match (length, shortest) {
            (Some(len), Some(best)) => if len == best { "yes" } else { "no" },
            _ => "-",
        };
        println!(
            "{:<45} {:>10} {:>12.2} {:>8} {:>9}",
            strategy.name(),
            outcome.stats.nodes_expanded,
            outcome.stats.elapsed.as_secs_f64() * 1000.0,
            length.map_or_else(|| "-".to_string(), |len| len.to_string()),
            matches_shortest
        );
    }
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let board = match load_puzzle(&args.puzzle_file) {
        Ok(board) => board,
        Err(e) => {
            eprintln!("Failed to load puzzle from {}: {}", args.puzzle_file.display(), e);
            process::exit(1);
        }
    };
    let color = !args.no_color;

    println!("Loaded puzzle from {}\n", args.puzzle_file.display());
    println!("Initial board state:\n{}\n", board.render(None, color));

    if args.compare {
        compare_all(&board);
        return;
    }

    if !args.algorithm.is_informed() && args.heuristic != Heuristic::Distance {
        warn!("--heuristic {} is ignored by ucs", args.heuristic);
    }
    let strategy = args.algorithm.build(args.heuristic);
    println!("Searching with {}...\n", strategy.name());
    let outcome = strategy.search(&board);
    print_solution(&board, strategy.as_ref(), &outcome, color);
}
