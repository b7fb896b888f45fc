//! Shared dispatcher state: the board engine, session map, game map,
//! viewer map, and databases are all logically owned by one dispatch
//! context. Grounded on `crates/gameroom/src/room.rs`'s `Room` — a
//! single imperative shell owning the live state, with the session/game
//! machinery as its functional core.

use cgos_core::{Config, GameId, Millis};
use cgos_scheduler::InfoThrottle;
use cgos_session::{GameContext, ServerMessage, Session, Table};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc::{Sender, UnboundedSender};
use tokio_postgres::Client;

use cgos_session::{Event, SessionId};

/// Everything the dispatch loop owns exclusively; no other task ever
/// mutates these maps directly.
pub struct Dispatcher {
    pub cfg: Config,
    pub sessions: HashMap<SessionId, Session>,
    pub games: HashMap<GameId, GameContext>,
    pub table: Table,
    /// Outbox senders registered at accept time, claimed by the matching
    /// [`Session`] once its handshake `Event::Connected` arrives.
    pub pending_outbox: HashMap<SessionId, Sender<ServerMessage>>,
    /// Online players currently in state `waiting`, keyed by name — the
    /// scheduler's pairing pool.
    pub waiting: HashMap<String, SessionId>,
    pub badwords: Vec<String>,
    /// Anchor name -> fixed rating, refreshed at each round boundary.
    pub anchors: HashMap<String, f64>,
    /// Games finished since the last rating batch, awaiting the next
    /// round tick.
    pub pending_ratings: Vec<crate::round::PendingRating>,
    pub info_throttle: InfoThrottle,
    pub next_session_id: u64,
    pub next_gid: i64,
    pub live_db: Arc<Client>,
    pub archive_db: Option<Arc<Client>>,
    pub events_tx: UnboundedSender<Event>,
}

impl Dispatcher {
    pub fn new(cfg: Config, live_db: Arc<Client>, archive_db: Option<Arc<Client>>, events_tx: UnboundedSender<Event>) -> Self {
        let info_broadcast_interval_ms = (cfg.info_broadcast_interval_secs * 1000) as Millis;
        Self {
            cfg,
            sessions: HashMap::new(),
            games: HashMap::new(),
            table: Table::new(),
            pending_outbox: HashMap::new(),
            waiting: HashMap::new(),
            badwords: Vec::new(),
            anchors: HashMap::new(),
            pending_ratings: Vec::new(),
            info_throttle: InfoThrottle::new(info_broadcast_interval_ms),
            next_session_id: 1,
            next_gid: 1,
            live_db,
            archive_db,
            events_tx,
        }
    }

    pub fn allocate_session_id(&mut self) -> SessionId {
        let id = SessionId(self.next_session_id);
        self.next_session_id += 1;
        id
    }

    pub fn allocate_gid(&mut self) -> GameId {
        let gid = GameId(self.next_gid);
        self.next_gid += 1;
        gid
    }

    /// Drops a session from every live map: the session table, its
    /// viewer/observer registration, and (if mid-game) nothing else —
    /// the `Game` itself survives a player's disconnect so they can
    /// rejoin later under the same name.
    pub fn drop_session(&mut self, id: SessionId) {
        if let Some(session) = self.sessions.remove(&id) {
            if let Some(name) = &session.name {
                self.waiting.remove(name);
            }
        }
        self.table.remove(id);
        self.pending_outbox.remove(&id);
    }

    pub fn live_game_count(&self) -> usize {
        self.games.len()
    }
}
