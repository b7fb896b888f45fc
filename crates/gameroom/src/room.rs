//! The live `Game` runtime: creation, per-move handling, and
//! termination. This module is pure
//! state transformation over [`GameContext`] — it returns the outbound
//! messages and persistence artifacts the caller (the dispatcher in
//! `cgos-server`) must actually send and write; it owns no socket and no
//! database handle itself.

use crate::context::GameContext;
use cgos_board::{Color, KoRule, MoveResult};
use cgos_core::{GameId, Millis};
use cgos_records::{ArchiveRecord, ArchivedMove, SgfColor, SgfGame, SgfMove};

use crate::protocol::ServerMessage;

fn color_letter(color: Color) -> char {
    match color {
        Color::White => 'w',
        Color::Black => 'b',
        other => panic!("no letter for {other:?}"),
    }
}

/// Everything the creation sequence (§4.3 steps 1-6) produces.
pub struct GameCreated {
    pub gid: GameId,
    pub game: GameContext,
    pub setup_for_players: ServerMessage,
    pub match_for_viewers: ServerMessage,
    pub genmove_for_mover: ServerMessage,
}

/// Allocates a new game and assembles its creation messages. `gid` is
/// supplied by the caller (the persistent counter lives in the database
/// layer); optional `resume_moves` replays prior moves for the admin
/// "resume from game" path.
pub fn create_game(
    gid: GameId,
    board_size: usize,
    komi: f64,
    clock_budget_ms: Millis,
    ko_rule: KoRule,
    white: String,
    white_rating: String,
    black: String,
    black_rating: String,
    resume_moves: &[String],
    now: Millis,
) -> GameCreated {
    let mut game = GameContext::new(
        gid,
        board_size,
        komi,
        clock_budget_ms,
        ko_rule,
        white.clone(),
        white_rating.clone(),
        black.clone(),
        black_rating.clone(),
        now,
    );
    for mv in resume_moves {
        let result = game.board.make(mv);
        game.record_move(&result, mv, clock_budget_ms, None);
    }

    let setup_for_players = ServerMessage::Setup {
        gid,
        size: board_size,
        komi,
        clock_budget_ms,
        white: white.clone(),
        white_rating: white_rating.clone(),
        black: black.clone(),
        black_rating: black_rating.clone(),
        moves: game.moves.iter().map(|m| (m.text.clone(), m.remaining_after_ms)).collect(),
    };
    let match_for_viewers = ServerMessage::Match {
        gid,
        date: None,
        time: None,
        size: board_size,
        komi,
        white,
        white_rating,
        black,
        black_rating,
        result: None,
    };
    let mover = game.side_to_move();
    let genmove_for_mover = ServerMessage::Genmove {
        color: color_letter(mover),
        ms_remaining: game.clock.remaining(mover),
    };

    GameCreated { gid, game, setup_for_players, match_for_viewers, genmove_for_mover }
}

/// Outcome of a single move submitted by the side to move.
pub enum MoveEffect {
    /// The move was accepted and the game continues; `genmove_for_next`
    /// is the prompt for the side now on move.
    Accepted { play_for_opponent: ServerMessage, update_for_viewers: ServerMessage, genmove_for_next: ServerMessage },
    /// The game ended: by score (two passes), resignation, illegal move,
    /// or clock expiry.
    Terminated { result: String, reason: Option<String> },
}

/// Handles one reply from the side to move (§4.3 "Per move"). `text` is
/// `"resign"` or a coordinate/pass; `analysis` has already been
/// best-effort parsed by the caller. Returns `None` only when the
/// session had already been displaced from this game (caller checks gid
/// membership before calling, per the spec's silent-ignore rule).
pub fn accept_move(
    game: &mut GameContext,
    now: Millis,
    leeway_ms: Millis,
    text: &str,
    analysis: Option<serde_json::Value>,
) -> MoveEffect {
    let mover = game.side_to_move();
    let opponent = if mover == Color::White { Color::Black } else { Color::White };

    let (remaining_after, flagged) = game.clock.debit_mover(mover, now, leeway_ms);
    if flagged {
        let result = match mover {
            Color::Black => "W+Time".to_string(),
            Color::White => "B+Time".to_string(),
            _ => unreachable!(),
        };
        return MoveEffect::Terminated { result, reason: None };
    }

    if text.trim().eq_ignore_ascii_case("resign") {
        let result = match mover {
            Color::Black => "W+Resign".to_string(),
            Color::White => "B+Resign".to_string(),
            _ => unreachable!(),
        };
        return MoveEffect::Terminated { result, reason: None };
    }

    let move_result = game.board.make(text);
    if !move_result.is_legal() {
        let winner = match mover {
            Color::Black => "W",
            Color::White => "B",
            _ => unreachable!(),
        };
        let reason = match move_result {
            MoveResult::Suicide => "suicide",
            MoveResult::Ko => "ko",
            MoveResult::Occupied => "occupied point",
            MoveResult::Malformed => "malformed move",
            MoveResult::Legal { .. } => unreachable!(),
        };
        return MoveEffect::Terminated { result: format!("{winner}+Illegal {reason}"), reason: Some(reason.to_string()) };
    }

    game.record_move(&move_result, text, remaining_after, analysis.clone());

    if game.board.twopass() {
        let signed = game.board.score() as f64 - game.komi;
        let result = if signed > 0.0 {
            format!("B+{signed}")
        } else if signed < 0.0 {
            format!("W+{}", -signed)
        } else {
            "Draw".to_string()
        };
        return MoveEffect::Terminated { result, reason: None };
    }

    game.clock.restart(now);
    let play_for_opponent = ServerMessage::Play { color: color_letter(mover), mv: text.to_string(), ms_remaining: remaining_after };
    let update_for_viewers = ServerMessage::Update { gid: game.gid, mv: text.to_string(), ms_remaining: remaining_after };
    let genmove_for_next = ServerMessage::Genmove { color: color_letter(opponent), ms_remaining: game.clock.remaining(opponent) };

    MoveEffect::Accepted { play_for_opponent, update_for_viewers, genmove_for_next }
}

/// Builds the archive record and SGF body for a terminated game. The
/// caller is responsible for the seven-step termination sequence's I/O
/// (notify players/viewers, insert rows, write the SGF file, remove from
/// the live map); this just assembles the artifacts.
pub fn finalize(game: &GameContext, result: &str, timestamp: &str) -> (ArchiveRecord, SgfGame) {
    let archive = ArchiveRecord {
        timestamp: timestamp.to_string(),
        board_size: game.size,
        komi: game.komi,
        white: game.white.clone(),
        white_rating: game.white_rating.clone(),
        black: game.black.clone(),
        black_rating: game.black_rating.clone(),
        clock_budget_ms: game.clock_budget_ms,
        moves: game
            .moves
            .iter()
            .map(|m| ArchivedMove {
                text: m.text.clone(),
                remaining_ms: m.remaining_after_ms,
                analysis: m.analysis.as_ref().map(|v| v.to_string()),
            })
            .collect(),
        result: result.to_string(),
    };

    let mut sgf = SgfGame::new(
        game.size,
        game.komi,
        game.white.clone(),
        game.black.clone(),
        (game.clock_budget_ms / 1000) as u64,
    );
    sgf.result = Some(result.to_string());
    let mut mover = Color::Black;
    for mv in &game.moves {
        let sgf_color = if mover == Color::Black { SgfColor::Black } else { SgfColor::White };
        let mut sgf_move = if mv.text.eq_ignore_ascii_case("pass") {
            SgfMove::pass(sgf_color, Some(mv.remaining_after_ms))
        } else if let Some((x, y)) = cgos_board::parse_coordinate(&mv.text, game.size) {
            SgfMove::play(sgf_color, x as u32, y as u32, Some(mv.remaining_after_ms))
        } else {
            SgfMove::pass(sgf_color, Some(mv.remaining_after_ms))
        };
        if let Some(analysis) = &mv.analysis {
            sgf_move = sgf_move.with_analysis(analysis.to_string());
        }
        sgf.push(sgf_move);
        mover = if mover == Color::Black { Color::White } else { Color::Black };
    }

    (archive, sgf)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_game() -> GameContext {
        create_game(
            GameId(1),
            9,
            7.5,
            60_000,
            KoRule::Positional,
            "alice".into(),
            "1800".into(),
            "bob".into(),
            "1750".into(),
            &[],
            0,
        )
        .game
    }

    #[test]
    fn creation_prompts_the_side_to_move() {
        let created = create_game(
            GameId(5),
            9,
            7.5,
            60_000,
            KoRule::Positional,
            "alice".into(),
            "1800".into(),
            "bob".into(),
            "1750".into(),
            &[],
            0,
        );
        match created.genmove_for_mover {
            ServerMessage::Genmove { color, ms_remaining } => {
                assert_eq!(color, 'b');
                assert_eq!(ms_remaining, 60_000);
            }
            _ => panic!("expected Genmove"),
        }
    }

    #[test]
    fn a_legal_move_debits_the_clock_and_prompts_the_opponent() {
        let mut game = new_game();
        let effect = accept_move(&mut game, 5_000, 2_000, "e5", None);
        match effect {
            MoveEffect::Accepted { genmove_for_next, .. } => match genmove_for_next {
                ServerMessage::Genmove { color, ms_remaining } => {
                    assert_eq!(color, 'w');
                    assert_eq!(ms_remaining, 60_000);
                }
                _ => panic!(),
            },
            _ => panic!("expected Accepted"),
        }
        assert_eq!(game.moves.len(), 1);
        assert_eq!(game.moves[0].remaining_after_ms, 60_000 - 3_000);
    }

    #[test]
    fn clock_expiry_terminates_with_time_loss() {
        let mut game = new_game();
        let effect = accept_move(&mut game, 70_000, 2_000, "e5", None);
        match effect {
            MoveEffect::Terminated { result, .. } => assert_eq!(result, "W+Time"),
            _ => panic!("expected Terminated"),
        }
    }

    #[test]
    fn resign_terminates_in_the_opponents_favor() {
        let mut game = new_game();
        let effect = accept_move(&mut game, 1_000, 0, "resign", None);
        match effect {
            MoveEffect::Terminated { result, .. } => assert_eq!(result, "W+Resign"),
            _ => panic!("expected Terminated"),
        }
    }

    #[test]
    fn an_illegal_move_forfeits_to_the_opponent() {
        let mut game = new_game();
        let _ = accept_move(&mut game, 1_000, 0, "e5", None);
        let effect = accept_move(&mut game, 2_000, 0, "e5", None);
        match effect {
            MoveEffect::Terminated { result, .. } => assert!(result.starts_with("B+Illegal")),
            _ => panic!("expected Terminated"),
        }
    }

    #[test]
    fn two_passes_score_the_board() {
        let mut game = new_game();
        let _ = accept_move(&mut game, 1_000, 0, "pass", None);
        let effect = accept_move(&mut game, 2_000, 0, "pass", None);
        match effect {
            MoveEffect::Terminated { result, .. } => assert_eq!(result, format!("W+{}", 7.5)),
            _ => panic!("expected Terminated"),
        }
    }

    #[test]
    fn finalize_builds_matching_archive_and_sgf() {
        let mut game = new_game();
        let _ = accept_move(&mut game, 1_000, 0, "e5", None);
        let (archive, sgf) = finalize(&game, "B+12", "2026-01-01 00:00:00");
        assert!(archive.to_dta().contains("e5"));
        assert_eq!(sgf.moves.len(), 1);
    }
}
