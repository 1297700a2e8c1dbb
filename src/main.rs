use std::env;
use std::fs;

use npuzzle_solver::{parse_board, Solver};

// Format:
// the board dimension n first,
// then n*n cell values in row-major order,
// whitespace-separated, 0 marking the blank.
const EXAMPLES: &[(&str, &str)] = &[
    ("four-move", "3\n 0 1 3\n 4 2 5\n 7 8 6"),
    ("reference", "3\n 8 1 3\n 4 0 2\n 7 6 5"),
    ("impossible", "3\n 1 2 3\n 4 5 6\n 8 7 0"),
];

fn main() {
    env_logger::init();

    let files: Vec<String> = env::args().skip(1).collect();
    if files.is_empty() {
        for (name, input) in EXAMPLES {
            report(name, input);
        }
        return;
    }

    for filename in &files {
        match fs::read_to_string(filename) {
            Ok(input) => report(filename, &input),
            Err(err) => eprintln!("{}: {}", filename, err),
        }
    }
}

fn report(name: &str, input: &str) {
    let board = match parse_board(input) {
        Ok(board) => board,
        Err(err) => {
            eprintln!("{}: {}", name, err);
            return;
        }
    };

    println!("----");
    println!("Puzzle {}:", name);
    println!("{}", board);
    println!("----");

    let solver = Solver::new(board);

    if let Some(solution) = solver.solution() {
        println!("Found a solution in {} moves:", solver.moves());
        println!(
            "Expanded {} board positions (generated {} total).",
            solver.expanded(),
            solver.generated()
        );

        for board in solution {
            println!("{}", board);
            println!();
        }
    } else {
        println!("No solution possible");
    }
}
