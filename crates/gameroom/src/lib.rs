//! Per-connection protocol state machine, game runtime, and viewer
//! broadcast for the CGOS tournament server.
//!
//! ## Architecture
//!
//! - [`protocol`] — wire message encode/decode, the LF-terminated line
//!   grammar of §6.
//! - [`actor`] — the per-connection reader/writer task pair, framing raw
//!   lines in and `ServerMessage`s out over a bounded channel.
//! - [`event`] — the `Event` enum an actor reports to the dispatcher, and
//!   the `SessionId` that names a connection.
//! - [`engine`] — the per-connection dialog phase (`SessionPhase`) and
//!   the live `Session` record.
//! - [`context`] — `GameContext`, the board/clock/move-list state of one
//!   live game.
//! - [`timer`] — clock-debit arithmetic shared by `context` and `room`.
//! - [`table`] — the viewer observer registry.
//! - [`room`] — the game runtime: creation, per-move handling, and the
//!   artifacts a termination needs to persist.
mod actor;
mod context;
mod engine;
mod event;
mod protocol;
mod room;
mod table;
mod timer;

pub use actor::Actor;
pub use context::{GameContext, RecordedMove};
pub use engine::{validate_name, NameError, Session, SessionPhase};
pub use event::{Event, SessionId};
pub use protocol::{parse_handshake, parse_observe, parse_password_line, parse_play_reply, Handshake, PlayReply, ServerMessage};
pub use room::{accept_move, create_game, finalize, GameCreated, MoveEffect};
pub use table::Table;
pub use timer::Clock;
