//! Round-boundary orchestration: the scheduler's periodic tick, the
//! `info` broadcast throttle, the rating batch, and the badwords reload.
//!
//! A first delay after startup, then a fixed tick interval, checking
//! the kill-file each time around.

use cgos_core::{Config, Millis};
use cgos_rating::{rate_game, Outcome, Rating};
use std::time::Duration;
use tokio::time::{interval_at, Instant, Interval};

/// Drives the scheduler's tick cadence: a longer first delay after
/// startup (letting early connections settle) followed by a steady
/// interval thereafter.
pub struct RoundTicker {
    interval: Interval,
}

impl RoundTicker {
    pub fn new(cfg: &Config) -> Self {
        let start = Instant::now() + Duration::from_secs(cfg.round_first_delay_secs);
        let interval = interval_at(start, Duration::from_secs(cfg.round_tick_interval_secs));
        Self { interval }
    }

    pub async fn tick(&mut self) -> Instant {
        self.interval.tick().await
    }
}

/// Rate-limits `info` broadcasts to at most one per configured interval.
pub struct InfoThrottle {
    min_interval_ms: Millis,
    last_broadcast_ms: Option<Millis>,
}

impl InfoThrottle {
    pub fn new(min_interval_ms: Millis) -> Self {
        Self { min_interval_ms, last_broadcast_ms: None }
    }

    /// Whether an `info` broadcast is due at `now`. Does not itself mark
    /// the broadcast as sent; call [`InfoThrottle::mark_sent`] after.
    pub fn due(&self, now: Millis) -> bool {
        match self.last_broadcast_ms {
            None => true,
            Some(last) => now - last >= self.min_interval_ms,
        }
    }

    pub fn mark_sent(&mut self, now: Millis) {
        self.last_broadcast_ms = Some(now);
    }
}

/// One finished game, ready for the rating batch.
pub struct FinishedGame {
    pub white: Rating,
    pub black: Rating,
    pub outcome: Outcome,
    pub white_is_anchor: bool,
    pub black_is_anchor: bool,
}

/// Result of rating one finished game: both players' updated rating and
/// K-factor, with anchors pinned back to their fixed value afterward.
pub struct RatedGame {
    pub white: Rating,
    pub black: Rating,
}

/// Runs the rating batch over every game finished since the last round:
/// each game updates both players' Elo and K together, then anchors are
/// re-pinned so they never drift.
pub fn run_rating_batch(games: &[FinishedGame], min_k: f64, max_k: f64) -> Vec<RatedGame> {
    log::debug!("rating batch over {} finished game(s)", games.len());
    games
        .iter()
        .map(|g| {
            let (mut white, mut black) = rate_game(g.white, g.black, g.outcome, min_k, max_k);
            if g.white_is_anchor {
                white = cgos_rating::pin_to_anchor(g.white.elo, min_k);
            }
            if g.black_is_anchor {
                black = cgos_rating::pin_to_anchor(g.black.elo, min_k);
            }
            RatedGame { white, black }
        })
        .collect()
}

/// Reloads the reloadable badwords list from disk. A missing file is not
/// an error: it just means no names are currently disallowed.
pub fn reload_badwords(path: &std::path::Path) -> std::io::Result<Vec<String>> {
    match std::fs::read_to_string(path) {
        Ok(contents) => {
            let words: Vec<String> = contents.lines().map(|l| l.trim().to_string()).filter(|l| !l.is_empty()).collect();
            log::debug!("reloaded {} badword(s) from {}", words.len(), path.display());
            Ok(words)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(e),
    }
}

/// Whether the scheduler should stop after the current round: either a
/// Ctrl-C was already observed, or the kill-file has appeared.
pub fn should_stop(cfg: &Config) -> bool {
    if cgos_core::interrupted() {
        return true;
    }
    if cgos_core::kill_file_present(&cfg.kill_file) {
        log::warn!("kill-file {} present, stopping after this round", cfg.kill_file.display());
        return true;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn info_throttle_fires_once_per_interval() {
        let mut throttle = InfoThrottle::new(60_000);
        assert!(throttle.due(0));
        throttle.mark_sent(0);
        assert!(!throttle.due(30_000));
        assert!(throttle.due(60_000));
    }

    #[test]
    fn rating_batch_pins_anchors_after_rating() {
        let games = vec![FinishedGame {
            white: Rating { elo: 2000.0, k: 16.0 },
            black: Rating { elo: 1800.0, k: 116.0 },
            outcome: Outcome::BlackWin,
            white_is_anchor: true,
            black_is_anchor: false,
        }];
        let rated = run_rating_batch(&games, 16.0, 116.0);
        assert_eq!(rated[0].white.elo, 2000.0, "anchor rating never moves");
        assert_eq!(rated[0].white.k, 16.0);
        assert!(rated[0].black.elo > 1800.0, "black gained rating from the upset win");
    }

    #[test]
    fn reload_badwords_tolerates_a_missing_file() {
        let words = reload_badwords(std::path::Path::new("/nonexistent/badwords.txt")).unwrap();
        assert!(words.is_empty());
    }
}
