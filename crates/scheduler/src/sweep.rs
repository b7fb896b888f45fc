//! Live-game timeout sweep and round-length estimation.
//!
//! For every live game, the worst case is that neither side moves
//! again, so the time left is each side's remaining clock minus however
//! long the current mover has already been thinking.

use cgos_core::Millis;
use cgos_session::GameContext;

/// A live game's flag status at sweep time, paired with the context so
/// the caller can route it straight into `cgos_session::accept_move`
/// if it wants to charge the clock the same way a real move would.
pub struct FlaggedGame<'a> {
    pub gid: cgos_core::GameId,
    pub game: &'a GameContext,
}

/// Returns the live games whose mover has no time left as of `now`,
/// given the configured leeway. Pure read: does not mutate any clock.
pub fn sweep_timeouts<'a>(games: impl IntoIterator<Item = (cgos_core::GameId, &'a GameContext)>, now: Millis, leeway_ms: Millis) -> Vec<FlaggedGame<'a>> {
    games
        .into_iter()
        .filter_map(|(gid, game)| {
            let mover = game.side_to_move();
            let (_post, flagged) = game.clock.clone().debit_mover(mover, now, leeway_ms);
            if flagged {
                Some(FlaggedGame { gid, game })
            } else {
                None
            }
        })
        .collect()
}

/// Worst-case seconds until any live game could conceivably still be
/// running: the maximum, over all live games, of each side's remaining
/// clock minus the time already spent on the in-flight move.
pub fn estimate_round_time_left_secs<'a>(games: impl IntoIterator<Item = &'a GameContext>, now: Millis) -> i64 {
    let mut worst_ms: i64 = 0;
    for game in games {
        let elapsed_on_current_move = (now - game.clock.last_move_start_ms).max(0);
        let white_left = game.clock.white_remaining_ms - elapsed_on_current_move;
        let black_left = game.clock.black_remaining_ms - elapsed_on_current_move;
        let game_worst = white_left.max(black_left).max(0);
        if game_worst > worst_ms {
            worst_ms = game_worst;
        }
    }
    worst_ms / 1000
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgos_board::KoRule;

    fn game_at(budget_ms: i64, now: Millis) -> GameContext {
        GameContext::new(cgos_core::GameId(1), 9, 7.5, budget_ms, KoRule::Positional, "alice".into(), "1800".into(), "bob".into(), "1800".into(), now)
    }

    #[test]
    fn sweep_finds_a_game_whose_mover_ran_out_of_time() {
        let game = game_at(1_000, 0);
        let games = vec![(cgos_core::GameId(1), &game)];
        let flagged = sweep_timeouts(games, 5_000, 0);
        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].gid, cgos_core::GameId(1));
    }

    #[test]
    fn sweep_ignores_a_game_still_within_budget() {
        let game = game_at(1_000_000, 0);
        let games = vec![(cgos_core::GameId(1), &game)];
        let flagged = sweep_timeouts(games, 5_000, 0);
        assert!(flagged.is_empty());
    }

    #[test]
    fn round_time_left_is_the_worst_case_across_live_games() {
        let short = game_at(10_000, 0);
        let long = game_at(600_000, 0);
        let games = vec![&short, &long];
        let secs = estimate_round_time_left_secs(games, 3_000);
        assert_eq!(secs, 597);
    }

    #[test]
    fn round_time_left_is_zero_with_no_live_games() {
        let games: Vec<&GameContext> = vec![];
        assert_eq!(estimate_round_time_left_secs(games, 1_000), 0);
    }
}
