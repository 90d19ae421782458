//! In-process 4x4 sliding-tile board that answers the same queries as the
//! real game page, for offline runs.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use slidebot_core::{Direction, DriverError, DriverResult, Extractor, GameSelectors, PageDriver};
use std::time::Duration;

const SIZE: usize = 4;

type Board = [[u32; SIZE]; SIZE];

/// Slide one line toward index 0, merging equal neighbours once.
/// Returns the new line and the points scored.
fn merge_line(line: [u32; SIZE]) -> ([u32; SIZE], u64) {
    let tiles: Vec<u32> = line.into_iter().filter(|v| *v != 0).collect();
    let mut out = [0; SIZE];
    let mut score = 0;
    let mut write = 0;
    let mut i = 0;
    while i < tiles.len() {
        if i + 1 < tiles.len() && tiles[i] == tiles[i + 1] {
            out[write] = tiles[i] * 2;
            score += u64::from(out[write]);
            i += 2;
        } else {
            out[write] = tiles[i];
            i += 1;
        }
        write += 1;
    }
    (out, score)
}

/// Board coordinates (row, col) of the `i`th cell of `line`, walking in the
/// direction tiles slide toward
fn cell(direction: Direction, line: usize, i: usize) -> (usize, usize) {
    match direction {
        Direction::Left => (line, i),
        Direction::Right => (line, SIZE - 1 - i),
        Direction::Up => (i, line),
        Direction::Down => (SIZE - 1 - i, line),
    }
}

fn slide(board: &Board, direction: Direction) -> (Board, u64) {
    let mut next = *board;
    let mut score = 0;
    for line in 0..SIZE {
        let cells: [(usize, usize); SIZE] = std::array::from_fn(|i| cell(direction, line, i));
        let (merged, points) = merge_line(cells.map(|(r, c)| board[r][c]));
        for ((r, c), value) in cells.into_iter().zip(merged) {
            next[r][c] = value;
        }
        score += points;
    }
    (next, score)
}

/// A simulated game standing in for the browser page
pub struct SimulatedPage {
    board: Board,
    score: u64,
    rng: StdRng,
    selectors: GameSelectors,
    settle: bool,
}

impl SimulatedPage {
    /// Fresh board with two spawned tiles
    pub fn new(seed: u64, selectors: GameSelectors) -> Self {
        let mut page = Self::from_board([[0; SIZE]; SIZE], seed, selectors);
        page.spawn();
        page.spawn();
        page
    }

    fn from_board(board: Board, seed: u64, selectors: GameSelectors) -> Self {
        Self {
            board,
            score: 0,
            rng: StdRng::seed_from_u64(seed),
            selectors,
            settle: true,
        }
    }

    /// Skip real sleeps in `wait`
    pub fn without_delays(mut self) -> Self {
        self.settle = false;
        self
    }

    fn spawn(&mut self) {
        let empty: Vec<(usize, usize)> = (0..SIZE)
            .flat_map(|r| (0..SIZE).map(move |c| (r, c)))
            .filter(|&(r, c)| self.board[r][c] == 0)
            .collect();
        if let Some(&(r, c)) = empty.choose(&mut self.rng) {
            self.board[r][c] = if self.rng.gen_bool(0.9) { 2 } else { 4 };
        }
    }

    fn can_move(&self) -> bool {
        Direction::ALL
            .iter()
            .any(|d| slide(&self.board, *d).0 != self.board)
    }

    fn render(&self) -> String {
        let mut out = format!("Score: {}\n", self.score);
        for row in &self.board {
            let cells: Vec<String> = row
                .iter()
                .map(|v| match v {
                    0 => format!("{:>5}", "."),
                    v => format!("{:>5}", v),
                })
                .collect();
            out.push_str(&cells.join(""));
            out.push('\n');
        }
        out
    }

    fn unknown(selector: &str) -> DriverError {
        DriverError::Query {
            selector: selector.to_string(),
            reason: "no such element on the simulated page".to_string(),
        }
    }
}

impl PageDriver for SimulatedPage {
    fn send_key(&mut self, key: &str) -> DriverResult<()> {
        let direction = Direction::from_key(key).ok_or_else(|| DriverError::Input {
            key: key.to_string(),
            reason: "not a direction key".to_string(),
        })?;
        let (next, points) = slide(&self.board, direction);
        if next != self.board {
            self.board = next;
            self.score += points;
            self.spawn();
        }
        Ok(())
    }

    fn screenshot(&mut self) -> DriverResult<Vec<u8>> {
        Ok(self.render().into_bytes())
    }

    fn query_text(&mut self, selector: &str) -> DriverResult<String> {
        if selector != self.selectors.score {
            return Err(Self::unknown(selector));
        }
        Ok(self.score.to_string())
    }

    fn query_count(&mut self, selector: &str) -> DriverResult<usize> {
        if selector != self.selectors.game_over {
            return Err(Self::unknown(selector));
        }
        Ok(usize::from(!self.can_move()))
    }

    fn query_all(&mut self, selector: &str, extractor: Extractor) -> DriverResult<Vec<String>> {
        if selector != self.selectors.tiles {
            return Err(Self::unknown(selector));
        }
        let mut tiles = Vec::new();
        for (r, row) in self.board.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                if *value == 0 {
                    continue;
                }
                tiles.push(match &extractor {
                    Extractor::ClassName => {
                        format!("tile tile-{} tile-position-{}-{}", value, c + 1, r + 1)
                    }
                    Extractor::InnerText => value.to_string(),
                    Extractor::Attribute(_) => String::new(),
                });
            }
        }
        Ok(tiles)
    }

    fn wait(&mut self, duration: Duration) {
        if self.settle {
            std::thread::sleep(duration);
        }
    }

    fn close(&mut self) -> DriverResult<()> {
        Ok(())
    }
}
