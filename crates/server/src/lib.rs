//! The CGOS tournament server: a TCP accept loop, a single dispatch task
//! owning all live state, and the periodic scheduler tick.
//!
//! ## Submodules
//!
//! - [`auth`] — password hashing/verification (argon2 or plain, by config).
//! - [`state`] — the [`Dispatcher`], the single owner of every live map.
//! - [`dispatch`] — per-event handlers implementing the session state
//!   machine and game runtime.
//! - [`admin`] — the `admin` username's command console.
//! - [`round`] — game termination and the round-boundary scheduler tick.
//! - [`snapshot`] — SGF output and the atomically-rewritten web snapshot.

pub mod admin;
pub mod auth;
pub mod dispatch;
pub mod round;
pub mod snapshot;
pub mod state;

pub use state::Dispatcher;

use cgos_core::Config;
use cgos_session::{Actor, Event};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

/// Starts the server and runs until a kill-file appears or Ctrl-C is
/// received. The accept loop, event processing, and scheduler tick all
/// run as branches of one `select!` loop on a single task, so a newly
/// accepted connection's outbox is always registered in
/// `pending_outbox` before its `Event::Connected` can possibly be
/// processed — both happen on this same task, never concurrently.
pub async fn run(cfg: Config) -> std::io::Result<()> {
    let live_db = cgos_database::connect_live_state(&cfg.database_state_file.to_string_lossy()).await;
    let archive_db = match &cfg.game_archive_database {
        Some(path) => Some(cgos_database::connect_archive(&path.to_string_lossy()).await),
        None => None,
    };

    let listener = TcpListener::bind(("0.0.0.0", cfg.port)).await?;
    log::info!("listening on port {}", cfg.port);

    let (events_tx, mut events_rx) = mpsc::unbounded_channel::<Event>();
    let mut ticker = cgos_scheduler::RoundTicker::new(&cfg);
    let mut state = Dispatcher::new(cfg, live_db, archive_db, events_tx.clone());

    round::reload_reloadables(&mut state).await;

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                match accepted {
                    Ok((socket, addr)) => {
                        let id = state.allocate_session_id();
                        let outbox = Actor::spawn(id, socket, events_tx.clone());
                        state.pending_outbox.insert(id, outbox);
                        log::debug!("[session {id}] accepted from {addr}");
                    }
                    Err(e) => log::warn!("accept failed: {e}"),
                }
            }
            Some(event) = events_rx.recv() => {
                dispatch::handle_event(&mut state, event).await;
            }
            _ = ticker.tick() => {
                round::run_round(&mut state).await;
                if cgos_scheduler::should_stop(&state.cfg) {
                    log::info!("stopping after round boundary");
                    break;
                }
            }
        }
    }

    Ok(())
}
