//! Table-name constants and `CREATE TABLE`/index DDL for the live-state and
//! archive stores.

/// Live-state store: registered players, their rating/K bookkeeping.
pub const PLAYERS: &str = "players";
/// Live-state store: anchor players whose rating is pinned.
pub const ANCHORS: &str = "anchors";
/// Live-state store: per-handshake-token connection counters (open
/// question 1: upsert keyed on the handshake user-agent token).
pub const CLIENTS: &str = "clients";
/// Live-state store: denormalized recent-game columns feeding the
/// snapshot file's 4-hour window, written alongside the archive insert.
pub const RECENT_GAMES: &str = "recent_games";
/// Archive store: one row per completed game, `dta`/`analysis` columns.
pub const GAMES: &str = "games";

/// Table metadata: name plus the DDL to create it and its indices.
/// Deliberately narrower than a bulk-COPY-oriented schema trait: these
/// tables are small and never need binary COPY ingestion, so plain
/// `execute`/`query`/`query_opt` calls suffice (see DESIGN.md).
pub trait Schema {
    fn name() -> &'static str;
    fn creates() -> &'static str;
    fn indices() -> &'static str;
}

pub struct PlayersTable;
impl Schema for PlayersTable {
    fn name() -> &'static str {
        PLAYERS
    }
    fn creates() -> &'static str {
        const_format::concatcp!(
            "CREATE TABLE IF NOT EXISTS ",
            PLAYERS,
            " (
                name        TEXT PRIMARY KEY,
                pass_hash   TEXT,
                games       BIGINT NOT NULL DEFAULT 0,
                rating      DOUBLE PRECISION NOT NULL,
                k           DOUBLE PRECISION NOT NULL,
                last_game   TIMESTAMPTZ
            );"
        )
    }
    fn indices() -> &'static str {
        const_format::concatcp!(
            "CREATE INDEX IF NOT EXISTS idx_",
            PLAYERS,
            "_last_game ON ",
            PLAYERS,
            " (last_game);"
        )
    }
}

pub struct AnchorsTable;
impl Schema for AnchorsTable {
    fn name() -> &'static str {
        ANCHORS
    }
    fn creates() -> &'static str {
        const_format::concatcp!(
            "CREATE TABLE IF NOT EXISTS ",
            ANCHORS,
            " (
                name   TEXT PRIMARY KEY,
                rating DOUBLE PRECISION NOT NULL
            );"
        )
    }
    fn indices() -> &'static str {
        ""
    }
}

pub struct ClientsTable;
impl Schema for ClientsTable {
    fn name() -> &'static str {
        CLIENTS
    }
    fn creates() -> &'static str {
        const_format::concatcp!(
            "CREATE TABLE IF NOT EXISTS ",
            CLIENTS,
            " (
                name  TEXT PRIMARY KEY,
                count BIGINT NOT NULL DEFAULT 0
            );"
        )
    }
    fn indices() -> &'static str {
        ""
    }
}

pub struct RecentGamesTable;
impl Schema for RecentGamesTable {
    fn name() -> &'static str {
        RECENT_GAMES
    }
    fn creates() -> &'static str {
        const_format::concatcp!(
            "CREATE TABLE IF NOT EXISTS ",
            RECENT_GAMES,
            " (
                gid    BIGINT PRIMARY KEY,
                w      TEXT NOT NULL,
                wr     TEXT NOT NULL,
                b      TEXT NOT NULL,
                br     TEXT NOT NULL,
                dte    TIMESTAMPTZ NOT NULL,
                wtu_ms BIGINT NOT NULL,
                btu_ms BIGINT NOT NULL,
                res    TEXT NOT NULL
            );"
        )
    }
    fn indices() -> &'static str {
        const_format::concatcp!(
            "CREATE INDEX IF NOT EXISTS idx_",
            RECENT_GAMES,
            "_dte ON ",
            RECENT_GAMES,
            " (dte);"
        )
    }
}

pub struct GamesTable;
impl Schema for GamesTable {
    fn name() -> &'static str {
        GAMES
    }
    fn creates() -> &'static str {
        const_format::concatcp!(
            "CREATE TABLE IF NOT EXISTS ",
            GAMES,
            " (
                gid      BIGINT PRIMARY KEY,
                dta      TEXT NOT NULL,
                analysis TEXT NOT NULL
            );"
        )
    }
    fn indices() -> &'static str {
        ""
    }
}

/// DDL for every live-state table, run once at startup.
pub fn live_state_schema() -> String {
    [
        PlayersTable::creates(),
        PlayersTable::indices(),
        AnchorsTable::creates(),
        AnchorsTable::indices(),
        ClientsTable::creates(),
        ClientsTable::indices(),
        RecentGamesTable::creates(),
        RecentGamesTable::indices(),
    ]
    .join("\n")
}

/// DDL for the archive table, run once at startup against the archive
/// connection (when `game_archive_database` is configured).
pub fn archive_schema() -> String {
    [GamesTable::creates(), GamesTable::indices()].join("\n")
}
