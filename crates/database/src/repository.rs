//! Repository traits on `Arc<Client>` for the live-state and archive
//! stores.
use crate::schema::{ANCHORS, CLIENTS, GAMES, PLAYERS, RECENT_GAMES};
use std::sync::Arc;
use tokio_postgres::Client;

pub type PgErr = tokio_postgres::Error;

#[derive(Debug, Clone)]
pub struct PlayerRecord {
    pub name: String,
    pub pass_hash: Option<String>,
    pub games: i64,
    pub rating: f64,
    pub k: f64,
}

#[derive(Debug, Clone)]
pub struct RecentGameRow {
    pub gid: i64,
    pub white: String,
    pub white_rating: String,
    pub black: String,
    pub black_rating: String,
    pub date: String,
    pub white_time_used_ms: i64,
    pub black_time_used_ms: i64,
    pub result: String,
}

/// Players, anchors, per-connection handshake counters, and the
/// recent-games cache feeding the snapshot's 4-hour window.
#[allow(async_fn_in_trait)]
pub trait LiveStateRepository {
    async fn get_player(&self, name: &str) -> Result<Option<PlayerRecord>, PgErr>;
    async fn create_player(&self, name: &str, pass_hash: Option<&str>, rating: f64, k: f64) -> Result<(), PgErr>;
    async fn update_rating(&self, name: &str, rating: f64, k: f64) -> Result<(), PgErr>;
    async fn touch_last_game(&self, name: &str) -> Result<(), PgErr>;
    async fn get_anchors(&self) -> Result<Vec<(String, f64)>, PgErr>;
    async fn active_players_since(&self, cutoff: &str) -> Result<Vec<(String, i64, f64, f64, String)>, PgErr>;

    /// Handshake bookkeeping (open question 1): increments the connection
    /// counter for this user-agent token, inserting it on first sight.
    async fn record_client(&self, token: &str) -> Result<(), PgErr>;

    async fn insert_recent_game(&self, row: &RecentGameRow) -> Result<(), PgErr>;
    async fn recent_games_since(&self, cutoff: &str) -> Result<Vec<RecentGameRow>, PgErr>;
    async fn prune_recent_games_before(&self, cutoff: &str) -> Result<(), PgErr>;
}

impl LiveStateRepository for Arc<Client> {
    async fn get_player(&self, name: &str) -> Result<Option<PlayerRecord>, PgErr> {
        self.query_opt(
            const_format::concatcp!(
                "SELECT name, pass_hash, games, rating, k FROM ",
                PLAYERS,
                " WHERE name = $1"
            ),
            &[&name],
        )
        .await
        .map(|opt| {
            opt.map(|row| PlayerRecord {
                name: row.get(0),
                pass_hash: row.get(1),
                games: row.get(2),
                rating: row.get(3),
                k: row.get(4),
            })
        })
    }

    async fn create_player(&self, name: &str, pass_hash: Option<&str>, rating: f64, k: f64) -> Result<(), PgErr> {
        self.execute(
            const_format::concatcp!(
                "INSERT INTO ",
                PLAYERS,
                " (name, pass_hash, games, rating, k) VALUES ($1, $2, 0, $3, $4)"
            ),
            &[&name, &pass_hash, &rating, &k],
        )
        .await
        .map(|_| ())
    }

    async fn update_rating(&self, name: &str, rating: f64, k: f64) -> Result<(), PgErr> {
        self.execute(
            const_format::concatcp!(
                "UPDATE ",
                PLAYERS,
                " SET rating = $2, k = $3, games = games + 1, last_game = now() WHERE name = $1"
            ),
            &[&name, &rating, &k],
        )
        .await
        .map(|_| ())
    }

    async fn touch_last_game(&self, name: &str) -> Result<(), PgErr> {
        self.execute(
            const_format::concatcp!("UPDATE ", PLAYERS, " SET last_game = now() WHERE name = $1"),
            &[&name],
        )
        .await
        .map(|_| ())
    }

    async fn get_anchors(&self) -> Result<Vec<(String, f64)>, PgErr> {
        self.query(const_format::concatcp!("SELECT name, rating FROM ", ANCHORS), &[])
            .await
            .map(|rows| rows.iter().map(|row| (row.get(0), row.get(1))).collect())
    }

    async fn active_players_since(&self, cutoff: &str) -> Result<Vec<(String, i64, f64, f64, String)>, PgErr> {
        self.query(
            const_format::concatcp!(
                "SELECT name, games, rating, k, last_game::text FROM ",
                PLAYERS,
                " WHERE last_game >= $1::timestamptz"
            ),
            &[&cutoff],
        )
        .await
        .map(|rows| {
            rows.iter()
                .map(|row| (row.get(0), row.get(1), row.get(2), row.get(3), row.get(4)))
                .collect()
        })
    }

    async fn record_client(&self, token: &str) -> Result<(), PgErr> {
        self.execute(
            const_format::concatcp!(
                "INSERT INTO ",
                CLIENTS,
                " (name, count) VALUES ($1, 1)
                 ON CONFLICT (name) DO UPDATE SET count = ",
                CLIENTS,
                ".count + 1"
            ),
            &[&token],
        )
        .await
        .map(|_| ())
    }

    async fn insert_recent_game(&self, row: &RecentGameRow) -> Result<(), PgErr> {
        self.execute(
            const_format::concatcp!(
                "INSERT INTO ",
                RECENT_GAMES,
                " (gid, w, wr, b, br, dte, wtu_ms, btu_ms, res)
                 VALUES ($1, $2, $3, $4, $5, $6::timestamptz, $7, $8, $9)
                 ON CONFLICT (gid) DO NOTHING"
            ),
            &[
                &row.gid,
                &row.white,
                &row.white_rating,
                &row.black,
                &row.black_rating,
                &row.date,
                &row.white_time_used_ms,
                &row.black_time_used_ms,
                &row.result,
            ],
        )
        .await
        .map(|_| ())
    }

    async fn recent_games_since(&self, cutoff: &str) -> Result<Vec<RecentGameRow>, PgErr> {
        self.query(
            const_format::concatcp!(
                "SELECT gid, w, wr, b, br, dte::text, wtu_ms, btu_ms, res FROM ",
                RECENT_GAMES,
                " WHERE dte >= $1::timestamptz ORDER BY gid"
            ),
            &[&cutoff],
        )
        .await
        .map(|rows| {
            rows.iter()
                .map(|row| RecentGameRow {
                    gid: row.get(0),
                    white: row.get(1),
                    white_rating: row.get(2),
                    black: row.get(3),
                    black_rating: row.get(4),
                    date: row.get(5),
                    white_time_used_ms: row.get(6),
                    black_time_used_ms: row.get(7),
                    result: row.get(8),
                })
                .collect()
        })
    }

    async fn prune_recent_games_before(&self, cutoff: &str) -> Result<(), PgErr> {
        self.execute(
            const_format::concatcp!("DELETE FROM ", RECENT_GAMES, " WHERE dte < $1::timestamptz"),
            &[&cutoff],
        )
        .await
        .map(|_| ())
    }
}

/// The completed-game archive: `games(gid, dta, analysis)`.
#[allow(async_fn_in_trait)]
pub trait ArchiveRepository {
    async fn insert_game(&self, gid: i64, dta: &str, analysis: &str) -> Result<(), PgErr>;
    async fn get_game(&self, gid: i64) -> Result<Option<(String, String)>, PgErr>;
}

impl ArchiveRepository for Arc<Client> {
    async fn insert_game(&self, gid: i64, dta: &str, analysis: &str) -> Result<(), PgErr> {
        self.execute(
            const_format::concatcp!(
                "INSERT INTO ",
                GAMES,
                " (gid, dta, analysis) VALUES ($1, $2, $3)
                 ON CONFLICT (gid) DO UPDATE SET dta = EXCLUDED.dta, analysis = EXCLUDED.analysis"
            ),
            &[&gid, &dta, &analysis],
        )
        .await
        .map(|_| ())
    }

    async fn get_game(&self, gid: i64) -> Result<Option<(String, String)>, PgErr> {
        self.query_opt(
            const_format::concatcp!("SELECT dta, analysis FROM ", GAMES, " WHERE gid = $1"),
            &[&gid],
        )
        .await
        .map(|opt| opt.map(|row| (row.get(0), row.get(1))))
    }
}
