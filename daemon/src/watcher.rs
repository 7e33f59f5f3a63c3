use std::path::PathBuf;

use notify::{Config as NotifyConfig, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::event::{DaemonEvent, ProcessSignal};

/// Directory watcher controller: owns the single filesystem watch and the
/// bridge from notify's callback thread into the tokio world.
///
/// Raw filesystem events are forwarded on `fs_tx` for the battle translator;
/// game started/stopped edges are forwarded on the merged daemon event
/// channel only after the watch is attached/detached, so a battle event can
/// never arrive ahead of its `GameStarted`.
///
/// Failing to create the watcher or to attach it to a confirmed replays
/// directory is fatal: the daemon exits with a diagnostic. Detach failures
/// are logged and swallowed.
pub async fn run(
    mut signal_rx: mpsc::Receiver<ProcessSignal>,
    fs_tx: mpsc::Sender<notify::Event>,
    event_tx: mpsc::Sender<DaemonEvent>,
) {
    let mut watcher = match RecommendedWatcher::new(
        move |res: notify::Result<notify::Event>| {
            if let Ok(event) = res {
                let _ = fs_tx.blocking_send(event);
            }
        },
        NotifyConfig::default(),
    ) {
        Ok(w) => w,
        Err(e) => {
            eprintln!("[watcher] Failed to create filesystem watcher: {e}");
            std::process::exit(1);
        }
    };

    // Invariant: at most one directory is watched at any instant.
    let mut watched: Option<PathBuf> = None;

    while let Some(signal) = signal_rx.recv().await {
        match signal {
            ProcessSignal::Found(dir) => {
                // A new Found fully replaces any prior watch.
                if let Some(prev) = watched.take() {
                    if let Err(e) = watcher.unwatch(&prev) {
                        eprintln!("[watcher] Failed to unwatch {}: {e}", prev.display());
                    }
                }
                if let Err(e) = watcher.watch(&dir, RecursiveMode::NonRecursive) {
                    eprintln!("[watcher] Failed to watch {}: {e}", dir.display());
                    std::process::exit(1);
                }
                eprintln!("[watcher] Watching {}", dir.display());
                watched = Some(dir);
                if event_tx.send(DaemonEvent::GameStarted).await.is_err() {
                    break;
                }
            }
            ProcessSignal::Lost => {
                if let Some(prev) = watched.take() {
                    // Best effort: the process is gone, a stale watch is harmless.
                    if let Err(e) = watcher.unwatch(&prev) {
                        eprintln!("[watcher] Failed to unwatch {}: {e}", prev.display());
                    }
                }
                if event_tx.send(DaemonEvent::GameStopped).await.is_err() {
                    break;
                }
            }
        }
    }
}
