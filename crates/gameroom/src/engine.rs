//! Per-connection dialog state machine. `SessionPhase` names a
//! connection's current position in the prompt/reply dance; `Session`
//! is the live record the dispatcher keeps per connection. The orchestration that
//! *drives* the transitions (name lookup, password check, displacement,
//! rejoin) lives in `crate::room`, since it needs the dispatcher's shared
//! session/game maps; this module holds the pure, independently-testable
//! parts: the phase enum and name validation.

use crate::event::SessionId;
use crate::protocol::ServerMessage;
use cgos_core::GameId;
use tokio::sync::mpsc::Sender;

/// Where a connection currently sits in the prompt/reply dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionPhase {
    Protocol,
    Username,
    Password,
    Waiting,
    Ok,
    Genmove,
    GameOver,
    /// The special `admin` name enters a distinct command dialog
    /// instead of the player states above.
    Admin,
    /// A viewer never leaves this phase once past the handshake.
    Viewing,
}

/// The live per-connection record.
#[derive(Debug)]
pub struct Session {
    pub id: SessionId,
    pub outbox: Sender<ServerMessage>,
    pub phase: SessionPhase,
    pub viewer: bool,
    pub use_analyze: bool,
    pub name: Option<String>,
    pub rating: f64,
    pub k: f64,
    pub gid: GameId,
    /// Flipped when the outbound queue saturates (§5); the dispatcher
    /// drops such a session from the live maps on its next event.
    pub dying: bool,
}

impl Session {
    pub fn new(id: SessionId, outbox: Sender<ServerMessage>, viewer: bool, use_analyze: bool) -> Self {
        Self {
            id,
            outbox,
            phase: if viewer { SessionPhase::Viewing } else { SessionPhase::Protocol },
            viewer,
            use_analyze,
            name: None,
            rating: 0.0,
            k: 0.0,
            gid: GameId::NONE,
            dying: false,
        }
    }

    /// Best-effort send; a full outbound queue flips the session to
    /// "dying" rather than blocking the dispatcher.
    pub fn send(&mut self, message: ServerMessage) {
        if self.outbox.try_send(message).is_err() {
            self.dying = true;
        }
    }

    pub fn is_in_game(&self) -> bool {
        !self.gid.is_none()
    }
}

/// Name-validation errors, each with the exact reason string to embed in
/// an `Error: <reason>` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameError {
    Length,
    FirstCharNotAlphabetic,
    IllegalCharacter,
    Badword,
}

impl NameError {
    pub fn reason(&self) -> &'static str {
        match self {
            NameError::Length => "name must be 3-18 characters",
            NameError::FirstCharNotAlphabetic => "name must start with a letter",
            NameError::IllegalCharacter => "name contains an illegal character",
            NameError::Badword => "name is not allowed",
        }
    }
}

/// Validates a proposed player name per §4.2: ASCII, 3-18 chars,
/// `[A-Za-z0-9._-]`, first character alphabetic, not on the badwords
/// list. Collision with an online name is handled separately by the
/// displacement rule, not here.
pub fn validate_name(name: &str, badwords: &[String]) -> Result<(), NameError> {
    if !(3..=18).contains(&name.len()) || !name.is_ascii() {
        return Err(NameError::Length);
    }
    let first = name.chars().next().unwrap();
    if !first.is_ascii_alphabetic() {
        return Err(NameError::FirstCharNotAlphabetic);
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')) {
        return Err(NameError::IllegalCharacter);
    }
    if badwords.iter().any(|bad| bad.eq_ignore_ascii_case(name)) {
        return Err(NameError::Badword);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_a_well_formed_name() {
        assert_eq!(validate_name("gnugo_3.8", &[]), Ok(()));
    }

    #[test]
    fn rejects_names_outside_the_length_window() {
        assert_eq!(validate_name("ab", &[]), Err(NameError::Length));
        assert_eq!(validate_name(&"a".repeat(19), &[]), Err(NameError::Length));
    }

    #[test]
    fn rejects_a_leading_digit() {
        assert_eq!(validate_name("1bot", &[]), Err(NameError::FirstCharNotAlphabetic));
    }

    #[test]
    fn rejects_illegal_characters() {
        assert_eq!(validate_name("bad name!", &[]), Err(NameError::IllegalCharacter));
    }

    #[test]
    fn rejects_badwords_case_insensitively() {
        let badwords = vec!["admin2".to_string()];
        assert_eq!(validate_name("Admin2", &badwords), Err(NameError::Badword));
    }
}
