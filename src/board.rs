use std::fmt::{self, Display, Write};
use std::str::{FromStr, SplitWhitespace};

use itertools::Itertools;
use rand::Rng;
use smallvec::SmallVec;
use thiserror::Error;

pub const BLANK: u8 = 0;

// Cells are stored as u8, so the largest tile n*n - 1 must fit in one byte.
const MIN_DIMENSION: usize = 2;
const MAX_DIMENSION: usize = 16;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidBoard {
    #[error("dimension {0} is below the minimum of 2")]
    TooSmall(usize),
    #[error("dimension {0} exceeds the maximum of 16")]
    TooLarge(usize),
    #[error("rows do not form a square grid")]
    NotSquare,
    #[error("cells are not a permutation of 0..n*n")]
    NotAPermutation,
    #[error("cannot parse board: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    n: usize,
    cells: Vec<u8>,
}

impl Board {
    pub fn from_grid(grid: &[Vec<u8>]) -> Result<Board, InvalidBoard> {
        let n = grid.len();
        if grid.iter().any(|row| row.len() != n) {
            return Err(InvalidBoard::NotSquare);
        }

        Board::from_cells(n, grid.iter().flatten().copied().collect())
    }

    /// The solved board for a given dimension: tiles ascending in row-major
    /// order with the blank in the last cell.
    pub fn goal(n: usize) -> Result<Board, InvalidBoard> {
        check_dimension(n)?;
        let last = (n * n - 1) as u8;
        let cells = (1..=last).chain(std::iter::once(BLANK)).collect();

        Ok(Board { n, cells })
    }

    fn from_cells(n: usize, cells: Vec<u8>) -> Result<Board, InvalidBoard> {
        check_dimension(n)?;
        let is_permutation = cells.len() == n * n
            && cells
                .iter()
                .sorted()
                .enumerate()
                .all(|(ix, &c)| usize::from(c) == ix);
        if !is_permutation {
            return Err(InvalidBoard::NotAPermutation);
        }

        Ok(Board { n, cells })
    }

    pub fn dimension(&self) -> usize {
        self.n
    }

    /// Number of tiles out of their goal position (the blank is not a tile).
    pub fn hamming(&self) -> u32 {
        self.cells
            .iter()
            .zip(1u32..)
            .filter(|&(&c, place)| c != BLANK && u32::from(c) != place)
            .count() as u32
    }

    /// Sum over all tiles of the grid distance to the tile's goal position.
    pub fn manhattan(&self) -> u32 {
        self.cells
            .iter()
            .enumerate()
            .filter(|&(_, &c)| c != BLANK)
            .map(|(ix, &c)| self.index_distance(ix, usize::from(c) - 1))
            .sum()
    }

    pub fn is_goal(&self) -> bool {
        let tiles = &self.cells[..self.cells.len() - 1];
        tiles.iter().zip(1u32..).all(|(&c, place)| u32::from(c) == place)
    }

    /// A board equal to this one except two tiles swapped, the pair chosen
    /// uniformly at random among distinct non-blank positions. Swapping one
    /// pair flips solvability, which is what the solver's second search
    /// relies on.
    pub fn twin(&self) -> Board {
        let mut rng = rand::thread_rng();
        loop {
            let a = rng.gen_range(0..self.cells.len());
            let b = rng.gen_range(0..self.cells.len());
            if a != b && self.cells[a] != BLANK && self.cells[b] != BLANK {
                return self.with_swap(a, b);
            }
        }
    }

    /// One board per legal blank move, in fixed right/left/down/up order.
    pub fn neighbors(&self) -> SmallVec<[Board; 4]> {
        let blank = self.blank_index();
        let (row, col) = (blank / self.n, blank % self.n);

        let mut out = SmallVec::new();
        if col + 1 < self.n {
            out.push(self.with_swap(blank, blank + 1));
        }
        if col > 0 {
            out.push(self.with_swap(blank, blank - 1));
        }
        if row + 1 < self.n {
            out.push(self.with_swap(blank, blank + self.n));
        }
        if row > 0 {
            out.push(self.with_swap(blank, blank - self.n));
        }

        out
    }

    fn blank_index(&self) -> usize {
        let mut result = 0;
        for (ix, &c) in self.cells.iter().enumerate() {
            if c == BLANK {
                result = ix;
                break;
            }
        }

        result
    }

    // The only derivation path: copy the cells and apply exactly one swap.
    // Boards are never mutated once handed out.
    fn with_swap(&self, a: usize, b: usize) -> Board {
        let mut cells = self.cells.clone();
        cells.swap(a, b);

        Board { n: self.n, cells }
    }

    fn index_distance(&self, from: usize, to: usize) -> u32 {
        let rows = (from / self.n) as i32 - (to / self.n) as i32;
        let cols = (from % self.n) as i32 - (to % self.n) as i32;

        rows.unsigned_abs() + cols.unsigned_abs()
    }
}

impl Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for row in self.cells.chunks(self.n) {
            if !first {
                f.write_char('\n')?;
            } else {
                first = false;
            }

            write!(f, "{:2}", row.iter().format(" "))?;
        }

        Ok(())
    }
}

// Format: the board dimension n, then n*n cell values in row-major order,
// all whitespace-separated; 0 marks the blank.
pub fn parse_board(input: &str) -> Result<Board, InvalidBoard> {
    let mut tokens = input.split_whitespace();

    let n: usize = next_number(&mut tokens)?;
    check_dimension(n)?;

    let mut cells = Vec::with_capacity(n * n);
    for _ in 0..n * n {
        cells.push(next_number(&mut tokens)?);
    }
    if tokens.next().is_some() {
        return Err(InvalidBoard::Parse("trailing input after last cell".into()));
    }

    Board::from_cells(n, cells)
}

fn next_number<T: FromStr>(tokens: &mut SplitWhitespace) -> Result<T, InvalidBoard> {
    let token = tokens
        .next()
        .ok_or_else(|| InvalidBoard::Parse("unexpected end of input".into()))?;

    token
        .parse()
        .map_err(|_| InvalidBoard::Parse(format!("bad number {:?}", token)))
}

fn check_dimension(n: usize) -> Result<(), InvalidBoard> {
    if n < MIN_DIMENSION {
        return Err(InvalidBoard::TooSmall(n));
    }
    if n > MAX_DIMENSION {
        return Err(InvalidBoard::TooLarge(n));
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use pretty_assertions::{assert_eq, assert_ne};

    use super::*;

    fn board(grid: &[&[u8]]) -> Board {
        let rows: Vec<Vec<u8>> = grid.iter().map(|row| row.to_vec()).collect();
        Board::from_grid(&rows).unwrap()
    }

    #[test]
    fn equality_follows_cells() {
        let a = board(&[&[8, 1, 3], &[4, 0, 2], &[7, 6, 5]]);
        let b = board(&[&[8, 1, 3], &[4, 0, 2], &[7, 6, 5]]);

        assert_eq!(a, a.clone());
        assert_eq!(a, b);
        assert_ne!(a, board(&[&[1, 8, 3], &[4, 0, 2], &[7, 6, 5]]));
    }

    #[test]
    fn heuristics_on_reference_board() {
        let b = board(&[&[8, 1, 3], &[4, 0, 2], &[7, 6, 5]]);

        assert_eq!(b.hamming(), 5);
        assert_eq!(b.manhattan(), 10);
    }

    #[test]
    fn manhattan_is_zero_exactly_at_goal() {
        let goal = Board::goal(3).unwrap();
        assert!(goal.is_goal());
        assert_eq!(goal.manhattan(), 0);
        assert_eq!(goal.hamming(), 0);

        let off = board(&[&[1, 2, 3], &[4, 5, 6], &[7, 0, 8]]);
        assert!(!off.is_goal());
        assert!(off.manhattan() > 0);
    }

    #[test]
    fn goal_layout() {
        let goal = Board::goal(2).unwrap();

        assert_eq!(goal, board(&[&[1, 2], &[3, 0]]));
        assert_eq!(goal.dimension(), 2);
    }

    #[test]
    fn neighbors_move_the_blank_one_step() {
        let center = board(&[&[1, 2, 3], &[4, 0, 5], &[6, 7, 8]]);
        let neighbors = center.neighbors();
        assert_eq!(neighbors.len(), 4);

        for neighbor in &neighbors {
            let moved: Vec<usize> = center
                .cells
                .iter()
                .zip(&neighbor.cells)
                .positions(|(a, b)| a != b)
                .collect();

            assert_eq!(moved.len(), 2);
            assert!(moved.iter().any(|&ix| neighbor.cells[ix] == BLANK));

            let delta = neighbor.manhattan() as i32 - center.manhattan() as i32;
            assert_eq!(delta.abs(), 1);
        }
    }

    #[test]
    fn neighbor_count_depends_on_blank_position() {
        // corner, edge, center
        assert_eq!(Board::goal(3).unwrap().neighbors().len(), 2);
        assert_eq!(board(&[&[1, 0, 2], &[3, 4, 5], &[6, 7, 8]]).neighbors().len(), 3);
        assert_eq!(board(&[&[1, 2, 3], &[4, 0, 5], &[6, 7, 8]]).neighbors().len(), 4);
    }

    #[test]
    fn neighbor_order_is_fixed() {
        let center = board(&[&[1, 2, 3], &[4, 0, 5], &[6, 7, 8]]);
        let expected = vec![
            board(&[&[1, 2, 3], &[4, 5, 0], &[6, 7, 8]]),
            board(&[&[1, 2, 3], &[0, 4, 5], &[6, 7, 8]]),
            board(&[&[1, 2, 3], &[4, 7, 5], &[6, 0, 8]]),
            board(&[&[1, 0, 3], &[4, 2, 5], &[6, 7, 8]]),
        ];

        assert_eq!(center.neighbors().to_vec(), expected);
    }

    #[test]
    fn twin_swaps_one_pair_of_tiles() {
        let b = board(&[&[8, 1, 3], &[4, 0, 2], &[7, 6, 5]]);

        for _ in 0..100 {
            let twin = b.twin();
            let moved: Vec<usize> = b
                .cells
                .iter()
                .zip(&twin.cells)
                .positions(|(a, b)| a != b)
                .collect();

            assert_eq!(moved.len(), 2);
            assert!(moved
                .iter()
                .all(|&ix| b.cells[ix] != BLANK && twin.cells[ix] != BLANK));
        }
    }

    #[test]
    fn construction_rejects_malformed_grids() {
        assert_eq!(
            Board::from_grid(&[vec![1, 2], vec![3, 0], vec![5, 4]]),
            Err(InvalidBoard::NotSquare)
        );
        assert_eq!(
            Board::from_grid(&[vec![1, 1], vec![2, 0]]),
            Err(InvalidBoard::NotAPermutation)
        );
        // no blank at all
        assert_eq!(
            Board::from_grid(&[vec![1, 2], vec![3, 4]]),
            Err(InvalidBoard::NotAPermutation)
        );
        assert_eq!(Board::from_grid(&[vec![0]]), Err(InvalidBoard::TooSmall(1)));
        assert_eq!(Board::goal(17), Err(InvalidBoard::TooLarge(17)));
    }

    #[test]
    fn parse_reads_dimension_then_cells() {
        let parsed = parse_board("3\n 8 1 3\n 4 0 2\n 7 6 5\n").unwrap();

        assert_eq!(parsed, board(&[&[8, 1, 3], &[4, 0, 2], &[7, 6, 5]]));
    }

    #[test]
    fn parse_rejects_bad_input() {
        assert!(matches!(parse_board(""), Err(InvalidBoard::Parse(_))));
        assert!(matches!(parse_board("x"), Err(InvalidBoard::Parse(_))));
        assert!(matches!(parse_board("3 1 2 3"), Err(InvalidBoard::Parse(_))));
        assert!(matches!(parse_board("2 1 2 3 0 9"), Err(InvalidBoard::Parse(_))));
        assert_eq!(parse_board("2 1 2 3 3"), Err(InvalidBoard::NotAPermutation));
    }

    #[test]
    fn display_pads_cells() {
        let goal = Board::goal(2).unwrap();

        assert_eq!(goal.to_string(), " 1  2\n 3  0");
    }
}
