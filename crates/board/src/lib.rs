//! Go rules engine: a square NxN board with a one-cell sentinel border,
//! capture/suicide/ko detection, and Tromp-Taylor area scoring.
//!
//! This crate performs no I/O and holds no timer state; it is driven
//! entirely by `Board::make`.

mod coord;

pub use coord::parse_coordinate;

/// A point's occupant. `Border` fills the one-cell sentinel ring so that
/// neighbor lookups never need a bounds check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Color {
    Empty = 0,
    White = 1,
    Black = 2,
    Border = 3,
}

impl Color {
    fn opponent(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
            other => other,
        }
    }
}

/// Ko-rule variant, re-exported here so callers don't need to depend on
/// `cgos-core` just to construct a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KoRule {
    Positional,
    Simple,
}

/// Outcome of `Board::make`. Mirrors the reference server's integer result
/// codes (`-4`..`-1`, `0`, `>0`) one-to-one; `code()` recovers that integer
/// for callers that need the literal wire/testable-property value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveResult {
    /// Legal move; `captured` stones were removed (0 for a quiet move).
    Legal { captured: u32 },
    /// Move would leave the placed group with no liberties.
    Suicide,
    /// Move reproduces a board position the ko rule forbids.
    Ko,
    /// Target point is already occupied.
    Occupied,
    /// Move text doesn't parse as `pass` or a board coordinate.
    Malformed,
}

impl MoveResult {
    pub fn code(self) -> i32 {
        match self {
            MoveResult::Legal { captured } => captured as i32,
            MoveResult::Suicide => -1,
            MoveResult::Ko => -2,
            MoveResult::Occupied => -3,
            MoveResult::Malformed => -4,
        }
    }

    pub fn is_legal(self) -> bool {
        matches!(self, MoveResult::Legal { .. })
    }
}

const NEIGHBOR_OFFSETS: [isize; 4] = [-1, 1, 0, 0]; // row offsets filled in at runtime via stride

/// Board state plus ko history. `size` is the playable N; the stored grid
/// is `(size + 1) x (size + 2)` to carry the sentinel border.
#[derive(Debug, Clone)]
pub struct Board {
    cells: Vec<Color>,
    size: usize,
    stride: usize, // size + 1
    ply: usize,
    history: Vec<Vec<Color>>,
    moves: Vec<String>,
    ko_rule: KoRule,
    dirs: [isize; 4],
}

impl Board {
    pub fn new(size: usize, ko_rule: KoRule) -> Self {
        let stride = size + 1;
        let mut cells = vec![Color::Empty; stride * (size + 2)];
        for y in 0..(size + 2) {
            for x in 0..stride {
                if y < 1 || y > size || x == 0 {
                    cells[y * stride + x] = Color::Border;
                }
            }
        }
        let dirs = [-1, 1, stride as isize, -(stride as isize)];
        let history = vec![cells.clone()];
        Board {
            cells,
            size,
            stride,
            ply: 0,
            history,
            moves: Vec::new(),
            ko_rule,
            dirs,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Ply count; even = black to move, odd = white to move.
    pub fn ply(&self) -> usize {
        self.ply
    }

    pub fn side_to_move(&self) -> Color {
        if self.ply % 2 == 0 {
            Color::Black
        } else {
            Color::White
        }
    }

    pub fn moves(&self) -> &[String] {
        &self.moves
    }

    fn index_of(&self, x: usize, y: usize) -> usize {
        y * self.stride + x
    }

    /// Applies a move for the side to move. `mv` is `pass`/`PASS`
    /// (case-insensitive) or a coordinate like `q16`.
    pub fn make(&mut self, mv: &str) -> MoveResult {
        if mv.trim().eq_ignore_ascii_case("pass") {
            self.moves.push("PASS".to_string());
            self.ply += 1;
            self.history.push(self.cells.clone());
            return MoveResult::Legal { captured: 0 };
        }

        let (x, y) = match parse_coordinate(mv, self.size) {
            Some(xy) => xy,
            None => return MoveResult::Malformed,
        };
        let ix = self.index_of(x, y);
        if self.cells[ix] != Color::Empty {
            return MoveResult::Occupied;
        }

        let friendly = self.side_to_move();
        let enemy = friendly.opponent();

        let mut trial = self.cells.clone();
        trial[ix] = friendly;

        let mut captured = 0u32;
        for &d in &self.dirs {
            let p = (ix as isize + d) as usize;
            if trial[p] == enemy {
                captured += Self::capture_group(&mut trial, p, enemy, &self.dirs);
            }
        }

        if captured == 0 && Self::capture_group(&mut trial, ix, friendly, &self.dirs) > 0 {
            return MoveResult::Suicide;
        }

        let violates_ko = match self.ko_rule {
            KoRule::Positional => self.history.iter().any(|snapshot| snapshot == &trial),
            KoRule::Simple => self
                .ply
                .checked_sub(1)
                .map(|prev| self.history[prev] == trial)
                .unwrap_or(false),
        };
        if violates_ko {
            return MoveResult::Ko;
        }

        self.cells = trial;
        self.moves.push(mv.trim().to_uppercase());
        self.ply += 1;
        self.history.push(self.cells.clone());
        MoveResult::Legal { captured }
    }

    /// Flood-fills the group containing `target` (color `group_color`);
    /// if it has no liberties, removes it from `board` and returns its
    /// size. Returns 0 (and leaves `board` untouched) if the group is
    /// alive.
    fn capture_group(
        board: &mut [Color],
        target: usize,
        group_color: Color,
        dirs: &[isize; 4],
    ) -> u32 {
        let mut stones = vec![target];
        let mut seen = std::collections::HashSet::new();
        seen.insert(target);
        let mut frontier = vec![target];

        while !frontier.is_empty() {
            let mut next = Vec::new();
            for &ix in &frontier {
                for &d in dirs {
                    let p = (ix as isize + d) as usize;
                    if board[p] == Color::Empty {
                        return 0; // group has a liberty, nothing captured
                    }
                    if board[p] == group_color && seen.insert(p) {
                        next.push(p);
                        stones.push(p);
                    }
                }
            }
            frontier = next;
        }

        for &ix in &stones {
            board[ix] = Color::Empty;
        }
        stones.len() as u32
    }

    /// True when the last two accepted moves were both `PASS`.
    pub fn twopass(&self) -> bool {
        if self.ply < 2 {
            return false;
        }
        self.moves[self.ply - 1] == "PASS" && self.moves[self.ply - 2] == "PASS"
    }

    /// Tromp-Taylor area score: black area minus white area, no komi
    /// applied (the caller subtracts komi to get the signed game result).
    pub fn score(&self) -> i32 {
        let mut owner = self.cells.clone();
        let mut resolved = vec![false; owner.len()];

        for y in 1..=self.size {
            for x in 1..=self.size {
                let i = self.index_of(x, y);
                if owner[i] != Color::Empty || resolved[i] {
                    continue;
                }
                let mut region = vec![i];
                let mut seen = std::collections::HashSet::new();
                seen.insert(i);
                let mut frontier = vec![i];
                let mut touches: u8 = 0;

                while !frontier.is_empty() {
                    let mut next = Vec::new();
                    for &ix in &frontier {
                        for &d in &self.dirs {
                            let p = (ix as isize + d) as usize;
                            match owner[p] {
                                Color::Empty if seen.insert(p) => {
                                    next.push(p);
                                    region.push(p);
                                }
                                Color::Black => touches |= 0b10,
                                Color::White => touches |= 0b01,
                                _ => {}
                            }
                        }
                    }
                    frontier = next;
                }

                let claim = match touches {
                    0b10 => Some(Color::Black),
                    0b01 => Some(Color::White),
                    _ => None,
                };
                if let Some(color) = claim {
                    for &ix in &region {
                        owner[ix] = color;
                        resolved[ix] = true;
                    }
                } else {
                    for &ix in &region {
                        resolved[ix] = true;
                    }
                }
            }
        }

        let mut score = 0i32;
        for y in 1..=self.size {
            for x in 1..=self.size {
                match owner[self.index_of(x, y)] {
                    Color::Black => score += 1,
                    Color::White => score -= 1,
                    _ => {}
                }
            }
        }
        score
    }

    /// Render the current position, one character per point (`.`/`O`/`X`),
    /// newest row first removed — row 1 (bottom in Go notation) printed
    /// last, matching the reference engine's `to_string`.
    pub fn to_ascii(&self) -> String {
        let mut out = String::new();
        for y in 1..=self.size {
            for x in 1..=self.size {
                let c = match self.cells[self.index_of(x, y)] {
                    Color::Empty => '.',
                    Color::White => 'O',
                    Color::Black => 'X',
                    Color::Border => '#',
                };
                out.push(c);
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pass_advances_ply_without_mutating_board() {
        let mut b = Board::new(9, KoRule::Positional);
        assert_eq!(b.make("pass").code(), 0);
        assert_eq!(b.ply(), 1);
        assert_eq!(b.make("PASS").code(), 0);
        assert!(b.twopass());
    }

    #[test]
    fn malformed_move_rejected() {
        let mut b = Board::new(9, KoRule::Positional);
        assert_eq!(b.make("z99").code(), -4);
        assert_eq!(b.make("").code(), -4);
        assert_eq!(b.make("i5").code(), -4); // 'i' is skipped in the column alphabet
    }

    #[test]
    fn occupied_point_rejected() {
        let mut b = Board::new(9, KoRule::Positional);
        assert!(b.make("e5").is_legal());
        assert_eq!(b.make("e5").code(), -3);
    }

    #[test]
    fn simple_capture() {
        let mut c = Board::new(9, KoRule::Positional);
        c.make("e5"); // B
        c.make("e4"); // W — the stone that will be captured
        c.make("d4"); // B
        c.make("a1"); // W elsewhere
        c.make("f4"); // B
        c.make("a2"); // W elsewhere
        let result = c.make("e3"); // B completes the capture of W e4
        assert!(matches!(result, MoveResult::Legal { captured: 1 }));
    }

    #[test]
    fn suicide_rejected_without_capturing() {
        let mut b = Board::new(9, KoRule::Positional);
        b.make("a2"); // B
        b.make("e5"); // W elsewhere
        b.make("b1"); // B — a2 and b1 now flank the a1 corner point
        // White a1 has zero liberties (neighbors a2, b1 both black, the
        // rest border) and captures nothing, since a2/b1 each have other
        // liberties of their own.
        let result = b.make("a1");
        assert_eq!(result, MoveResult::Suicide);
        assert_eq!(result.code(), -1);
    }

    #[test]
    fn ko_rejects_immediate_recapture() {
        // Textbook one-stone ko: black captures a lone white stone at d5,
        // and white's immediate recapture at d5 would reproduce the exact
        // board position from just before the capture.
        let setup = |ko_rule: KoRule| {
            let mut b = Board::new(9, ko_rule);
            b.make("c5"); // B
            b.make("e4"); // W
            b.make("d4"); // B
            b.make("e6"); // W
            b.make("d6"); // B
            b.make("f5"); // W
            b.make("pass"); // B (turn padding)
            b.make("d5"); // W — placed with its one liberty at e5
            b.make("e5"); // B — captures the lone white stone at d5
            b
        };

        let mut positional = setup(KoRule::Positional);
        assert_eq!(positional.make("d5"), MoveResult::Ko);

        let mut simple = setup(KoRule::Simple);
        assert_eq!(simple.make("d5"), MoveResult::Ko);
    }

    #[test]
    fn score_of_empty_board_is_zero() {
        let mut b = Board::new(9, KoRule::Positional);
        b.make("pass");
        b.make("pass");
        assert!(b.twopass());
        assert_eq!(b.score(), 0);
    }

    #[test]
    fn score_counts_stone_and_surrounded_territory() {
        let mut b = Board::new(3, KoRule::Positional);
        b.make("b2"); // single black stone in the center of a 3x3 board
        // The entire ring of 8 remaining points is one connected empty
        // region touching only black, so it's all claimed for black.
        assert_eq!(b.score(), 9);
    }
}
