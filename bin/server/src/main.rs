//! CGOS tournament server binary: parses [`cgos_core::Config`] from CLI
//! flags, installs logging and the interrupt handler, then hands off to
//! [`cgos_server::run`].

use clap::Parser;
use cgos_core::Config;

#[tokio::main]
async fn main() {
    cgos_core::init_logging();
    cgos_core::install_interrupt_handler();

    let cfg = Config::parse();
    log::info!("starting {} on port {}", cfg.server_name, cfg.port);

    if let Err(e) = cgos_server::run(cfg).await {
        log::error!("server exited with error: {e}");
        std::process::exit(1);
    }
}
