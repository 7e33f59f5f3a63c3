mod config;
mod discord;
mod event;
mod game_info;
mod match_info;
mod paths;
mod presence;
mod process_monitor;
mod translator;
mod watcher;

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::discord::DiscordClient;
use crate::event::{DaemonEvent, ProcessSignal};
use crate::game_info::GameInfo;
use crate::presence::StateMachine;

#[tokio::main]
async fn main() {
    // ── Configuration ─────────────────────────────────────────────────────────
    let config_path = paths::config_file_path();
    let config = config::load_or_default(&config_path).unwrap_or_else(|e| {
        eprintln!("[config] Error (using defaults): {e:#}");
        config::Config::default()
    });
    let config = Arc::new(config);

    // ── Static game metadata ──────────────────────────────────────────────────
    let game_info = match GameInfo::load() {
        Ok(info) => info,
        Err(e) => {
            eprintln!("Failed to load bundled game metadata: {e:#}");
            std::process::exit(1);
        }
    };

    // ── Channels ──────────────────────────────────────────────────────────────
    let (signal_tx, signal_rx) = mpsc::channel::<ProcessSignal>(8);
    let (fs_tx, fs_rx) = mpsc::channel::<notify::Event>(32);
    let (event_tx, event_rx) = mpsc::channel::<DaemonEvent>(32);

    // ── Background tasks ──────────────────────────────────────────────────────
    tokio::spawn(process_monitor::run(Arc::clone(&config), signal_tx));
    tokio::spawn(watcher::run(signal_rx, fs_tx, event_tx.clone()));
    tokio::spawn(translator::run(fs_rx, Arc::clone(&config), event_tx.clone()));

    // Log out cleanly on Ctrl+C.
    {
        let tx = event_tx.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                let _ = tx.send(DaemonEvent::Shutdown).await;
            }
        });
    }

    println!("wows-presence-daemon v{} started", env!("CARGO_PKG_VERSION"));
    println!("Waiting for {}...", config.process_name);

    // ── Event loop ────────────────────────────────────────────────────────────
    let machine = StateMachine::new(DiscordClient::new(), game_info, config.discord_app_id);
    machine.run(event_rx).await;
}
