//! Live-state and archive persistence.
//!
//! Two logical PostgreSQL connections: the live-state store (players,
//! anchors, handshake clients, recent-games cache) and the completed-game
//! archive. Both are plain `Arc<Client>` handles with repository traits
//! implemented directly on them rather than a bulk-COPY pipeline, which
//! this domain's small tables never need.
mod repository;
mod schema;

pub use repository::{ArchiveRepository, LiveStateRepository, PlayerRecord, PgErr, RecentGameRow};
pub use schema::{archive_schema, live_state_schema, Schema, ANCHORS, CLIENTS, GAMES, PLAYERS, RECENT_GAMES};

use std::sync::Arc;
use tokio_postgres::Client;

/// Connect to a PostgreSQL database at `url`, spawn its connection driver,
/// and apply the live-state schema.
pub async fn connect_live_state(url: &str) -> Arc<Client> {
    let client = connect(url).await;
    client
        .batch_execute(&live_state_schema())
        .await
        .expect("apply live-state schema");
    client
}

/// Connect to the completed-game archive database at `url` and apply its
/// schema.
pub async fn connect_archive(url: &str) -> Arc<Client> {
    let client = connect(url).await;
    client
        .batch_execute(&archive_schema())
        .await
        .expect("apply archive schema");
    client
}

async fn connect(url: &str) -> Arc<Client> {
    log::info!("connecting to database");
    let (client, connection) = tokio_postgres::connect(url, tokio_postgres::NoTls)
        .await
        .expect("database connection failed");
    tokio::spawn(connection);
    Arc::new(client)
}
