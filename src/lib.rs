pub mod board;
pub mod solver;

pub use board::{parse_board, Board, InvalidBoard};
pub use solver::Solver;
