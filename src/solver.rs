use std::cmp::Ordering;
use std::collections::BinaryHeap;

use log::debug;

use crate::board::Board;

// A board on the search tree: the number of moves taken to reach it and the
// arena index of the node it was expanded from. The Manhattan distance is
// computed once here and cached.
struct SearchNode {
    board: Board,
    moves: u32,
    parent: Option<usize>,
    manhattan: u32,
}

impl SearchNode {
    fn new(board: Board, moves: u32, parent: Option<usize>) -> SearchNode {
        let manhattan = board.manhattan();
        SearchNode {
            board,
            moves,
            parent,
            manhattan,
        }
    }

    fn priority(&self) -> u32 {
        self.moves + self.manhattan
    }
}

// Heap entry; the reversed ordering turns std's max-heap into the min-queue
// the search wants. Ties prefer the most recently created node.
#[derive(PartialEq, Eq)]
struct Ranked {
    priority: u32,
    node: usize,
}

impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| self.node.cmp(&other.node))
    }
}

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// One of the two interleaved A* instances. Nodes live in an arena and refer
// to their parents by index, so path reconstruction is an index walk and the
// whole search tree is freed in one go.
struct Search {
    arena: Vec<SearchNode>,
    frontier: BinaryHeap<Ranked>,
}

impl Search {
    fn seeded(start: Board) -> Search {
        let mut search = Search {
            arena: Vec::new(),
            frontier: BinaryHeap::new(),
        };
        search.insert(SearchNode::new(start, 0, None));

        search
    }

    fn insert(&mut self, node: SearchNode) {
        let priority = node.priority();
        self.arena.push(node);
        self.frontier.push(Ranked {
            priority,
            node: self.arena.len() - 1,
        });
    }

    fn pop(&mut self) -> Option<usize> {
        self.frontier.pop().map(|entry| entry.node)
    }

    // Queue every neighbor of the popped node except the one that undoes the
    // move which produced it (its board equals the grandparent's board).
    fn expand(&mut self, popped: usize) {
        let moves = self.arena[popped].moves + 1;
        let grandparent = self.arena[popped].parent;

        for neighbor in self.arena[popped].board.neighbors() {
            if let Some(back) = grandparent {
                if self.arena[back].board == neighbor {
                    continue;
                }
            }
            self.insert(SearchNode::new(neighbor, moves, Some(popped)));
        }
    }

    fn path_to(&self, goal: usize) -> Vec<Board> {
        let mut boards = Vec::with_capacity(self.arena[goal].moves as usize + 1);
        let mut cursor = Some(goal);
        while let Some(ix) = cursor {
            boards.push(self.arena[ix].board.clone());
            cursor = self.arena[ix].parent;
        }
        boards.reverse();

        boards
    }
}

pub struct Solver {
    solution: Option<Vec<Board>>,
    expanded: usize,
    generated: usize,
}

impl Solver {
    /// Runs the search to completion: the initial board and its twin race in
    /// lock-step, one expansion round each, until one of them pops its goal.
    /// Exactly one can, since swapping a tile pair flips solvability — so a
    /// goal on the twin side means the initial board is unsolvable.
    pub fn new(initial: Board) -> Solver {
        let twin = initial.twin();
        let mut primary = Search::seeded(initial);
        let mut shadow = Search::seeded(twin);

        let mut rounds = 0usize;
        // Each expansion requeues at least one neighbor, so neither frontier
        // can drain before its search pops a goal.
        let solution = loop {
            let ours = match primary.pop() {
                Some(ix) => ix,
                None => break None,
            };
            let theirs = match shadow.pop() {
                Some(ix) => ix,
                None => break None,
            };

            if primary.arena[ours].board.is_goal() {
                break Some(primary.path_to(ours));
            }
            if shadow.arena[theirs].board.is_goal() {
                break None;
            }

            rounds += 1;
            primary.expand(ours);
            shadow.expand(theirs);
        };

        let expanded = 2 * rounds;
        let generated = primary.arena.len() + shadow.arena.len();
        debug!(
            "dual search: {} after {} rounds, {} nodes expanded, {} generated",
            if solution.is_some() { "solvable" } else { "unsolvable" },
            rounds,
            expanded,
            generated,
        );

        Solver {
            solution,
            expanded,
            generated,
        }
    }

    pub fn is_solvable(&self) -> bool {
        self.solution.is_some()
    }

    /// Minimum number of moves to solve the initial board; -1 when unsolvable.
    pub fn moves(&self) -> i32 {
        match &self.solution {
            Some(boards) => boards.len() as i32 - 1,
            None => -1,
        }
    }

    /// The board sequence from the initial board to the goal, inclusive, or
    /// `None` when the puzzle has no solution.
    pub fn solution(&self) -> Option<&[Board]> {
        self.solution.as_deref()
    }

    pub fn expanded(&self) -> usize {
        self.expanded
    }

    pub fn generated(&self) -> usize {
        self.generated
    }
}
