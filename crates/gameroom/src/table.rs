//! Viewer observer registry: which viewer sessions are watching which
//! games, and the match-list shown to a viewer on connect.

use crate::event::SessionId;
use crate::protocol::ServerMessage;
use cgos_core::GameId;
use std::collections::{HashMap, HashSet};
use tokio::sync::mpsc::Sender;

/// Registry of connected viewer sessions and what each one observes.
#[derive(Debug, Default)]
pub struct Table {
    outboxes: HashMap<SessionId, Sender<ServerMessage>>,
    observing: HashMap<SessionId, HashSet<GameId>>,
    watchers: HashMap<GameId, HashSet<SessionId>>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, session: SessionId, outbox: Sender<ServerMessage>) {
        self.outboxes.insert(session, outbox);
        self.observing.entry(session).or_default();
    }

    pub fn remove(&mut self, session: SessionId) {
        self.outboxes.remove(&session);
        if let Some(gids) = self.observing.remove(&session) {
            for gid in gids {
                if let Some(set) = self.watchers.get_mut(&gid) {
                    set.remove(&session);
                }
            }
        }
    }

    pub fn observe(&mut self, session: SessionId, gid: GameId) {
        self.observing.entry(session).or_default().insert(gid);
        self.watchers.entry(gid).or_default().insert(session);
    }

    /// Drops `gid` from the watcher index once its game has terminated;
    /// viewers keep their own `observing` entry (harmless, games are
    /// rarely re-observed by id after they close).
    pub fn retire(&mut self, gid: GameId) {
        self.watchers.remove(&gid);
    }

    /// Sends `message` to every viewer observing `gid`. Returns the
    /// sessions whose outbound queue was full (the dispatcher flips
    /// these to "dying").
    pub fn broadcast(&self, gid: GameId, message: ServerMessage) -> Vec<SessionId> {
        let mut saturated = Vec::new();
        let Some(watchers) = self.watchers.get(&gid) else { return saturated };
        for session in watchers {
            if let Some(tx) = self.outboxes.get(session) {
                if tx.try_send(message.clone()).is_err() {
                    saturated.push(*session);
                }
            }
        }
        saturated
    }

    /// Sends `message` to every connected viewer, regardless of what
    /// they're observing (used for the `match` announcement when a game
    /// is created, and for `info` broadcasts).
    pub fn broadcast_all(&self, message: ServerMessage) -> Vec<SessionId> {
        let mut saturated = Vec::new();
        for (session, tx) in &self.outboxes {
            if tx.try_send(message.clone()).is_err() {
                saturated.push(*session);
            }
        }
        saturated
    }

    pub fn viewer_count(&self) -> usize {
        self.outboxes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::channel;

    #[test]
    fn broadcast_only_reaches_registered_watchers_of_that_gid() {
        let mut table = Table::new();
        let (tx_a, mut rx_a) = channel(8);
        let (tx_b, mut rx_b) = channel(8);
        table.register(SessionId(1), tx_a);
        table.register(SessionId(2), tx_b);
        table.observe(SessionId(1), GameId(7));

        let saturated = table.broadcast(GameId(7), ServerMessage::Info("hi".into()));

        assert!(saturated.is_empty());
        assert!(rx_a.try_recv().is_ok());
        assert!(rx_b.try_recv().is_err());
    }

    #[test]
    fn remove_drops_the_session_from_its_watched_games() {
        let mut table = Table::new();
        let (tx, _rx) = channel(8);
        table.register(SessionId(1), tx);
        table.observe(SessionId(1), GameId(7));
        table.remove(SessionId(1));
        assert_eq!(table.viewer_count(), 0);
        assert!(table.broadcast(GameId(7), ServerMessage::Info("hi".into())).is_empty());
    }

    #[test]
    fn broadcast_reports_saturated_sessions() {
        let mut table = Table::new();
        let (tx, rx) = channel(1);
        table.register(SessionId(9), tx);
        table.observe(SessionId(9), GameId(1));
        let _ = table.broadcast(GameId(1), ServerMessage::Info("fills the queue".into()));
        let saturated = table.broadcast(GameId(1), ServerMessage::Info("overflow".into()));
        assert_eq!(saturated, vec![SessionId(9)]);
        drop(rx);
    }
}
