//! Per-connection reader/writer task pair. Each accepted socket gets an
//! inbound loop that
//! framing-parses one line at a time and reports it to the dispatcher as
//! an [`Event`], and an outbound loop draining a bounded channel of
//! [`ServerMessage`] onto the socket. Neither loop touches the session,
//! game, or viewer maps directly; all of that is the dispatcher's job.

use crate::event::{Event, SessionId};
use crate::protocol::{parse_handshake, ServerMessage};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::mpsc::{self, Sender, UnboundedSender};

/// Bound on the outbound per-connection queue. Saturation flips the
/// connection to "dying". The dispatcher uses `Sender::try_send`, so a
/// full queue is reported back immediately rather than blocking.
pub const OUTBOX_CAPACITY: usize = 256;

pub struct Actor;

impl Actor {
    /// Splits `socket`, spawns its reader and writer tasks, and returns
    /// the sender the dispatcher uses to push `ServerMessage`s to this
    /// connection. The reader reports every line (including the
    /// handshake) to `dispatcher` as an [`Event`].
    pub fn spawn(id: SessionId, socket: TcpStream, dispatcher: UnboundedSender<Event>) -> Sender<ServerMessage> {
        let (read_half, write_half) = socket.into_split();
        let (outbox_tx, outbox_rx) = mpsc::channel(OUTBOX_CAPACITY);

        tokio::spawn(Self::run_writer(id, write_half, outbox_rx));
        tokio::spawn(Self::run_reader(id, read_half, dispatcher));

        outbox_tx
    }

    async fn run_reader(id: SessionId, socket: tokio::net::tcp::OwnedReadHalf, dispatcher: UnboundedSender<Event>) {
        let mut lines = BufReader::new(socket).lines();
        let mut handshake_seen = false;
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    log::debug!("[session {} <-] {}", id, line);
                    if !handshake_seen {
                        handshake_seen = true;
                        if let Some(handshake) = parse_handshake(&line) {
                            let _ = dispatcher.send(Event::Connected {
                                session: id,
                                viewer: handshake.viewer,
                                analyze: handshake.analyze,
                                user_agent: handshake.user_agent,
                            });
                            continue;
                        }
                        // malformed handshake: still forward so the dispatcher
                        // can close the connection with a protocol error.
                    }
                    let _ = dispatcher.send(Event::Line { session: id, text: line });
                }
                Ok(None) => break,
                Err(err) => {
                    log::debug!("[session {}] read error: {}", id, err);
                    break;
                }
            }
        }
        let _ = dispatcher.send(Event::Disconnected { session: id });
    }

    async fn run_writer(
        id: SessionId,
        mut socket: tokio::net::tcp::OwnedWriteHalf,
        mut outbox: mpsc::Receiver<ServerMessage>,
    ) {
        while let Some(message) = outbox.recv().await {
            let line = format!("{}\n", message);
            log::debug!("[session {} ->] {}", id, message);
            if socket.write_all(line.as_bytes()).await.is_err() {
                log::debug!("[session {}] write error, closing", id);
                break;
            }
        }
    }
}
