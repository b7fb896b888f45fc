//! Round scheduler for the CGOS tournament server: pairing new games
//! from the waiting pool, sweeping live games for clock timeouts,
//! running the rating batch, and throttling `info` broadcasts at round
//! boundaries. Built against `cgos-session`'s clock and game-runtime
//! shapes.
mod pairing;
mod round;
mod sweep;

pub use pairing::{assign_colors, compute_range, jittered_order, pair_up, Candidate, SKIP};
pub use round::{reload_badwords, run_rating_batch, should_stop, FinishedGame, InfoThrottle, RatedGame, RoundTicker};
pub use sweep::{estimate_round_time_left_secs, sweep_timeouts, FlaggedGame};
