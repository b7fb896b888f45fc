//! Shared types, configuration, and ambient runtime utilities for the CGOS
//! tournament server workspace.
#![allow(dead_code)]

mod config;
mod ids;

pub use config::Config;
pub use config::KoRule;
pub use config::MatchMode;
pub use ids::GameId;

/// Milliseconds since the Unix epoch, used for clock bookkeeping and the
/// `last_game`/`dte`/`tme` timestamp columns.
pub type Millis = i64;

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn now_millis() -> Millis {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("system clock before epoch")
        .as_millis() as Millis
}

/// Clamp a possibly-negative remaining-time value to zero before it is
/// persisted, broadcast, or printed.
pub fn clamp_remaining(ms: i64) -> i64 {
    ms.max(0)
}

// ============================================================================
// RUNTIME UTILITIES
// ============================================================================

/// Initialize dual logging (terminal + file) with timestamped log files.
/// Creates a `logs/` directory and writes DEBUG level to file, INFO to
/// terminal, matching the reference workspace's own logging setup.
#[cfg(feature = "server")]
pub fn init_logging() {
    std::fs::create_dir_all("logs").expect("create logs directory");
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = now_millis();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{}.log", time)).expect("create log file"),
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config,
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).expect("initialize logger");
}

/// Global interrupt flag. Set by a kill-file sighting at a round boundary
/// or by Ctrl-C; polled by the scheduler and the accept loop.
#[cfg(feature = "server")]
static INTERRUPTED: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(false);

#[cfg(feature = "server")]
pub fn request_shutdown() {
    INTERRUPTED.store(true, std::sync::atomic::Ordering::Relaxed);
}

/// True once a shutdown has been requested, by Ctrl-C or by the scheduler
/// observing the kill-file at a round boundary.
#[cfg(feature = "server")]
pub fn interrupted() -> bool {
    INTERRUPTED.load(std::sync::atomic::Ordering::Relaxed)
}
#[cfg(not(feature = "server"))]
pub fn interrupted() -> bool {
    false
}

/// Register a Ctrl-C handler that requests graceful shutdown: the current
/// round finishes, archival and the rating batch run, then the process
/// exits. Mirrors the reference workspace's own interrupt-handling shape,
/// but requests a graceful stop rather than an immediate `process::exit`,
/// since this server holds live TCP connections and in-flight games.
#[cfg(feature = "server")]
pub fn install_interrupt_handler() {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("interrupt received, shutting down after the current round");
            request_shutdown();
        }
    });
}

/// Poll for the presence of the configured kill-file. Called by the
/// scheduler only at round boundaries.
pub fn kill_file_present(path: &std::path::Path) -> bool {
    path.exists()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_remaining_floors_at_zero() {
        assert_eq!(clamp_remaining(-500), 0);
        assert_eq!(clamp_remaining(0), 0);
        assert_eq!(clamp_remaining(42), 42);
    }

    #[test]
    fn now_millis_is_monotonic_enough() {
        let a = now_millis();
        let b = now_millis();
        assert!(b >= a);
    }
}
