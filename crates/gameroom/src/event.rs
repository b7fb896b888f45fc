//! Internal events flowing from a per-connection [`crate::actor::Actor`] to
//! the central dispatcher. Outbound traffic runs the other way, as a plain
//! `ServerMessage` pushed onto the session's own `UnboundedSender`, so only
//! the actor-to-dispatcher direction needs an enum here.

use std::fmt;

/// Identifies one live TCP connection for as long as it stays open.
/// Assigned by the dispatcher when a connection is accepted; never reused
/// within a process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What an [`crate::actor::Actor`] reports to the dispatcher about its
/// connection.
#[derive(Debug, Clone)]
pub enum Event {
    /// The handshake line (`e1 ...` or `v1 ...`) has been read.
    Connected { session: SessionId, viewer: bool, analyze: bool, user_agent: String },
    /// Any subsequent raw line, handed to the dispatcher for interpretation
    /// against the session's current state.
    Line { session: SessionId, text: String },
    /// The socket closed, or a write failed past the point of recovery.
    Disconnected { session: SessionId },
}

impl Event {
    pub fn session(&self) -> SessionId {
        match self {
            Event::Connected { session, .. } => *session,
            Event::Line { session, .. } => *session,
            Event::Disconnected { session } => *session,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_id_displays_with_a_hash_prefix() {
        assert_eq!(SessionId(3).to_string(), "#3");
    }

    #[test]
    fn event_session_extracts_regardless_of_variant() {
        let e = Event::Line { session: SessionId(5), text: "pass".into() };
        assert_eq!(e.session(), SessionId(5));
    }
}
