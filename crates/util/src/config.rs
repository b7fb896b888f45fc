/// Ko-rule variant the board engine enforces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KoRule {
    /// The resulting board must not equal any prior snapshot.
    Positional,
    /// The resulting board must not equal the immediately-prior snapshot.
    Simple,
}

/// Whether the scheduler pairs players automatically or only the admin
/// console creates games.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    #[default]
    Auto,
    Admin,
}

/// Read-only, process-lifetime configuration record. Populated once at
/// startup from CLI flags and threaded by reference/`Arc` through the
/// server, scheduler, session, and database layers.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "server", derive(clap::Parser))]
#[cfg_attr(feature = "server", command(name = "cgosd", version, about))]
pub struct Config {
    /// Name announced in `match`/snapshot lines and the admin console banner.
    #[cfg_attr(feature = "server", arg(long, default_value = "CGOS"))]
    pub server_name: String,
    /// TCP port every client (player, viewer, admin) connects to.
    #[cfg_attr(feature = "server", arg(long, default_value_t = 6867))]
    pub port: u16,
    /// Board size N (square board, N x N points).
    #[cfg_attr(feature = "server", arg(long, default_value_t = 19))]
    pub board_size: usize,
    /// Komi added to white's score before computing the signed result.
    #[cfg_attr(feature = "server", arg(long, default_value_t = 7.5))]
    pub komi: f64,
    /// Per-player clock budget in milliseconds.
    #[cfg_attr(feature = "server", arg(long, default_value_t = 900_000))]
    pub clock_budget_ms: i64,
    /// Grace period (Δ) subtracted from measured elapsed time per move.
    #[cfg_attr(feature = "server", arg(long, default_value_t = 2_000))]
    pub leeway_ms: i64,
    /// Default rating assigned to a brand-new player record.
    #[cfg_attr(feature = "server", arg(long, default_value_t = 1800.0))]
    pub default_rating: f64,
    /// Lower bound of the K-factor range.
    #[cfg_attr(feature = "server", arg(long, default_value_t = 16.0))]
    pub min_k: f64,
    /// Upper bound of the K-factor range; new players start here.
    #[cfg_attr(feature = "server", arg(long, default_value_t = 116.0))]
    pub max_k: f64,
    /// Below this many days since a player's first game, they are
    /// "provisional" for informational display purposes.
    #[cfg_attr(feature = "server", arg(long, default_value_t = 30.0))]
    pub provisional_age_days: f64,
    /// Above this many days, a player's rating is considered "established".
    #[cfg_attr(feature = "server", arg(long, default_value_t = 90.0))]
    pub established_age_days: f64,
    /// Ko-rule variant.
    #[cfg_attr(feature = "server", arg(skip = KoRule::Positional))]
    pub ko_rule: KoRule,
    /// Whether stored passwords are hashed (argon2) or compared byte-for-byte.
    #[cfg_attr(feature = "server", arg(long, default_value_t = true))]
    pub hash_password: bool,
    /// Fraction of anchor-vs-anchor pairings the scheduler actually keeps.
    #[cfg_attr(feature = "server", arg(long, default_value_t = 0.10))]
    pub anchor_match_rate: f64,
    /// Every this many moves, write an in-progress SGF snapshot (0 disables).
    #[cfg_attr(feature = "server", arg(long, default_value_t = 10))]
    pub move_interval_between_save: usize,
    /// Path polled at round boundaries; its presence triggers clean shutdown.
    #[cfg_attr(feature = "server", arg(long, default_value = "cgos.kill"))]
    pub kill_file: std::path::PathBuf,
    /// SQLite-or-equivalent live-state database (players, games, anchors,
    /// clients, game id counter).
    #[cfg_attr(feature = "server", arg(long, default_value = "cgos_state.db"))]
    pub database_state_file: std::path::PathBuf,
    /// Completed-game archive database; `None` disables archival writes.
    #[cfg_attr(feature = "server", arg(long))]
    pub game_archive_database: Option<std::path::PathBuf>,
    /// Destination of the atomically-rewritten web snapshot file.
    #[cfg_attr(feature = "server", arg(long, default_value = "cgos_web.dat"))]
    pub web_data_file: std::path::PathBuf,
    /// Root directory the SGF tree and info message live under.
    #[cfg_attr(feature = "server", arg(long, default_value = "html"))]
    pub html_dir: std::path::PathBuf,
    /// Subdirectory of `html_dir` that SGF files are written under, dated
    /// `YYYY/MM/DD/<gid>.sgf`.
    #[cfg_attr(feature = "server", arg(long, default_value = "sgf"))]
    pub sgf_dir: std::path::PathBuf,
    /// gzip the SGF output.
    #[cfg_attr(feature = "server", arg(long, default_value_t = false))]
    pub compress_sgf: bool,
    /// Reloadable list of disallowed player names.
    #[cfg_attr(feature = "server", arg(long, default_value = "badusers.txt"))]
    pub bad_users_file: std::path::PathBuf,
    /// `Auto`: scheduler pairs players every round. `Admin`: only the admin
    /// console's `match` command creates games.
    #[cfg_attr(feature = "server", arg(skip = MatchMode::Auto))]
    pub match_mode: MatchMode,
    /// Seconds after startup before the scheduler's first tick.
    #[cfg_attr(feature = "server", arg(skip = 45))]
    pub round_first_delay_secs: u64,
    /// Seconds between scheduler ticks thereafter.
    #[cfg_attr(feature = "server", arg(skip = 15))]
    pub round_tick_interval_secs: u64,
    /// Minimum seconds between `info` broadcasts.
    #[cfg_attr(feature = "server", arg(skip = 60))]
    pub info_broadcast_interval_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_name: "CGOS".into(),
            port: 6867,
            board_size: 19,
            komi: 7.5,
            clock_budget_ms: 900_000,
            leeway_ms: 2_000,
            default_rating: 1800.0,
            min_k: 16.0,
            max_k: 116.0,
            provisional_age_days: 30.0,
            established_age_days: 90.0,
            ko_rule: KoRule::Positional,
            hash_password: true,
            anchor_match_rate: 0.10,
            move_interval_between_save: 10,
            kill_file: "cgos.kill".into(),
            database_state_file: "cgos_state.db".into(),
            game_archive_database: None,
            web_data_file: "cgos_web.dat".into(),
            html_dir: "html".into(),
            sgf_dir: "sgf".into(),
            compress_sgf: false,
            bad_users_file: "badusers.txt".into(),
            match_mode: MatchMode::Auto,
            round_first_delay_secs: 45,
            round_tick_interval_secs: 15,
            info_broadcast_interval_secs: 60,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_sane() {
        let cfg = Config::default();
        assert_eq!(cfg.board_size, 19);
        assert!(cfg.min_k < cfg.max_k);
        assert_eq!(cfg.match_mode, MatchMode::Auto);
    }
}
