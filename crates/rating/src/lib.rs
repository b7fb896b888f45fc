//! Elo rating and K-factor bookkeeping for the tournament ladder. A
//! rating batch runs once per round over every game finished since the
//! last batch, adjusting both players' rating and K-factor together.

/// A player's rating state as stored in the live-state database.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rating {
    pub elo: f64,
    pub k: f64,
}

/// The result of a finished game, from white's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    WhiteWin,
    BlackWin,
    Draw,
}

impl Outcome {
    fn white_score(self) -> f64 {
        match self {
            Outcome::WhiteWin => 1.0,
            Outcome::BlackWin => 0.0,
            Outcome::Draw => 0.5,
        }
    }
}

/// Win probability for a player rated `me` against an opponent rated `you`.
pub fn expectation(me: f64, you: f64) -> f64 {
    let x = (you - me) / 400.0;
    1.0 / (1.0 + 10f64.powf(x))
}

/// Elo update for one player given their opponent's rating, their own
/// result (1.0 win, 0.0 loss, 0.5 draw), and the effective K-factor for
/// this particular game.
pub fn new_rating(current: f64, opponent: f64, result: f64, k: f64) -> f64 {
    current + k * (result - expectation(current, opponent))
}

/// Rate one finished game, producing both players' updated rating and
/// K-factor. `min_k`/`max_k` bound the K range; a player's own K decays
/// toward `min_k` as they play more games, and an opponent with a lower
/// (more established) K dampens how much this game can move your own
/// rating and K.
pub fn rate_game(white: Rating, black: Rating, outcome: Outcome, min_k: f64, max_k: f64) -> (Rating, Rating) {
    let k_range = max_k - min_k;
    let wk = white.k.max(min_k);
    let bk = black.k.max(min_k);

    // Each player's K-strength: 0.0 at max_k (brand new), 1.0 at min_k
    // (fully established). A game's effect on you is scaled by your
    // opponent's strength, not your own.
    let wks = 1.0 - (wk - min_k) / k_range;
    let bks = 1.0 - (bk - min_k) / k_range;

    let white_effective_k = wk * bks;
    let black_effective_k = bk * wks;

    let white_result = outcome.white_score();
    let black_result = 1.0 - white_result;

    let new_white_elo = new_rating(white.elo, black.elo, white_result, white_effective_k);
    let new_black_elo = new_rating(black.elo, white.elo, black_result, black_effective_k);

    let white_decay = if wk <= 32.0 { 0.02 } else { 0.04 };
    let black_decay = if bk <= 32.0 { 0.02 } else { 0.04 };
    let new_white_k = (wk * (1.0 - white_decay * bks)).max(min_k);
    let new_black_k = (bk * (1.0 - black_decay * wks)).max(min_k);

    (
        Rating { elo: new_white_elo, k: new_white_k },
        Rating { elo: new_black_elo, k: new_black_k },
    )
}

/// Pin a rating to its anchor value after a batch update: anchors keep a
/// fixed rating and sit at the most-established K-factor, so the rest of
/// the ladder is measured against a stable reference point.
pub fn pin_to_anchor(anchor_elo: f64, min_k: f64) -> Rating {
    Rating { elo: anchor_elo, k: min_k }
}

/// Format a rating for display: the integer rating, floored at zero, with
/// a trailing `?` while the K-factor is still above the provisional
/// threshold of 16.
pub fn format_rating(elo: f64, k: f64) -> String {
    let mut text = if elo < 0.0 {
        "0".to_string()
    } else {
        format!("{:.0}", elo)
    };
    if k > 16.0 {
        text.push('?');
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expectation_is_half_for_equal_ratings() {
        assert!((expectation(1800.0, 1800.0) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn expectation_favors_the_higher_rated_player() {
        assert!(expectation(2000.0, 1800.0) > 0.5);
        assert!(expectation(1800.0, 2000.0) < 0.5);
    }

    #[test]
    fn established_player_barely_moves_against_a_newcomer() {
        let white = Rating { elo: 1800.0, k: 16.0 };
        let black = Rating { elo: 1800.0, k: 116.0 };
        let (w, b) = rate_game(white, black, Outcome::WhiteWin, 16.0, 116.0);
        assert!((w.elo - 1800.0).abs() < 1e-9);
        assert_eq!(w.k, 16.0);
        assert!((b.elo - 1742.0).abs() < 1e-9);
        assert!((b.k - 111.36).abs() < 1e-6);
    }

    #[test]
    fn two_brand_new_players_do_not_move_on_one_game() {
        let fresh = Rating { elo: 1800.0, k: 116.0 };
        let (w, b) = rate_game(fresh, fresh, Outcome::WhiteWin, 16.0, 116.0);
        assert!((w.elo - 1800.0).abs() < 1e-9);
        assert!((b.elo - 1800.0).abs() < 1e-9);
        assert_eq!(w.k, 116.0);
        assert_eq!(b.k, 116.0);
    }

    #[test]
    fn k_factor_never_drops_below_the_minimum() {
        let near_floor = Rating { elo: 1800.0, k: 16.0 };
        let strong_opponent = Rating { elo: 2200.0, k: 16.0 };
        let (w, _) = rate_game(near_floor, strong_opponent, Outcome::BlackWin, 16.0, 116.0);
        assert!(w.k >= 16.0);
    }

    #[test]
    fn formatting_marks_provisional_ratings_and_floors_negatives() {
        assert_eq!(format_rating(1800.4, 16.0), "1800");
        assert_eq!(format_rating(1800.0, 50.0), "1800?");
        assert_eq!(format_rating(-30.0, 16.0), "0");
    }
}
