//! In-progress game state: board, clocks, and the move list accumulated
//! as a game is played.

use crate::timer::Clock;
use cgos_board::{Board, Color, MoveResult};
use cgos_core::{GameId, Millis};

/// One accepted move, as recorded in the live move list: text, the
/// mover's clock-remaining-ms immediately after the move, and optional
/// best-effort-parsed analysis JSON.
#[derive(Debug, Clone)]
pub struct RecordedMove {
    pub text: String,
    pub remaining_after_ms: Millis,
    pub analysis: Option<serde_json::Value>,
}

/// A live game: everything needed to answer `setup`/`genmove`/`play`
/// prompts and, on termination, to build the archive record and SGF.
#[derive(Debug, Clone)]
pub struct GameContext {
    pub gid: GameId,
    pub size: usize,
    pub komi: f64,
    pub clock_budget_ms: Millis,
    pub white: String,
    pub white_rating: String,
    pub black: String,
    pub black_rating: String,
    pub created_ms: Millis,
    pub board: Board,
    pub clock: Clock,
    pub moves: Vec<RecordedMove>,
}

impl GameContext {
    pub fn new(
        gid: GameId,
        size: usize,
        komi: f64,
        clock_budget_ms: Millis,
        ko_rule: cgos_board::KoRule,
        white: String,
        white_rating: String,
        black: String,
        black_rating: String,
        now: Millis,
    ) -> Self {
        Self {
            gid,
            size,
            komi,
            clock_budget_ms,
            white,
            white_rating,
            black,
            black_rating,
            created_ms: now,
            board: Board::new(size, ko_rule),
            clock: Clock::new(clock_budget_ms, now),
            moves: Vec::new(),
        }
    }

    /// The player currently expected to move.
    pub fn side_to_move(&self) -> Color {
        self.board.side_to_move()
    }

    /// The session name for `color`.
    pub fn name_of(&self, color: Color) -> &str {
        match color {
            Color::White => &self.white,
            Color::Black => &self.black,
            other => panic!("no player for {other:?}"),
        }
    }

    pub fn is_participant(&self, name: &str) -> bool {
        self.white == name || self.black == name
    }

    pub fn color_of(&self, name: &str) -> Option<Color> {
        if self.white == name {
            Some(Color::White)
        } else if self.black == name {
            Some(Color::Black)
        } else {
            None
        }
    }

    /// Applies an accepted move to both the board and the move list,
    /// after the caller has already debited the clock.
    pub fn record_move(&mut self, result: &MoveResult, text: &str, remaining_after_ms: Millis, analysis: Option<serde_json::Value>) {
        debug_assert!(result.is_legal());
        self.moves.push(RecordedMove { text: text.to_string(), remaining_after_ms, analysis });
    }

    pub fn ply(&self) -> usize {
        self.board.ply()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> GameContext {
        GameContext::new(
            GameId(1),
            9,
            7.5,
            60_000,
            cgos_board::KoRule::Positional,
            "alice".into(),
            "1800".into(),
            "bob".into(),
            "1750".into(),
            0,
        )
    }

    #[test]
    fn new_game_starts_with_black_to_move_and_full_clocks() {
        let g = ctx();
        assert_eq!(g.side_to_move(), Color::Black);
        assert_eq!(g.clock.white_remaining_ms, 60_000);
        assert_eq!(g.clock.black_remaining_ms, 60_000);
        assert!(g.moves.is_empty());
    }

    #[test]
    fn color_of_resolves_participants_only() {
        let g = ctx();
        assert_eq!(g.color_of("alice"), Some(Color::White));
        assert_eq!(g.color_of("bob"), Some(Color::Black));
        assert_eq!(g.color_of("carol"), None);
    }

    #[test]
    fn record_move_appends_to_the_move_list() {
        let mut g = ctx();
        let result = g.board.make("e5");
        assert!(result.is_legal());
        g.record_move(&result, "e5", 58_000, None);
        assert_eq!(g.moves.len(), 1);
        assert_eq!(g.moves[0].text, "e5");
        assert_eq!(g.moves[0].remaining_after_ms, 58_000);
    }
}
