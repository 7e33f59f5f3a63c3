use std::path::PathBuf;
use std::sync::Arc;
use sysinfo::{ProcessesToUpdate, System};
use tokio::sync::mpsc;
use tokio::time::{interval, Duration};

use crate::config::Config;
use crate::event::ProcessSignal;

/// Subdirectory of the game's working directory where the client writes
/// the match-state file.
const REPLAYS_DIR_NAME: &str = "replays";

/// Polls the OS process list at the configured interval and emits
/// [`ProcessSignal::Found`] / [`ProcessSignal::Lost`] on edge transitions
/// only. The working directory is resolved at the moment of detection,
/// never cached from a prior sighting, since the game may have relaunched
/// from a different install.
pub async fn run(config: Arc<Config>, tx: mpsc::Sender<ProcessSignal>) {
    let mut sys = System::new();
    let mut running = false;
    let mut ticker = interval(Duration::from_secs(config.poll_interval_secs.max(1)));
    let target = config.process_name.to_lowercase();

    loop {
        ticker.tick().await;

        sys.refresh_processes(ProcessesToUpdate::All, true);

        let cwd = sys
            .processes()
            .values()
            .find(|p| p.name().to_string_lossy().to_lowercase() == target)
            .and_then(|p| p.cwd().map(|c| c.to_path_buf()));

        if let Some(signal) = transition(running, cwd) {
            match &signal {
                ProcessSignal::Found(dir) => {
                    running = true;
                    eprintln!(
                        "[monitor] Process {} found, replays directory {}",
                        config.process_name,
                        dir.display()
                    );
                }
                ProcessSignal::Lost => {
                    running = false;
                    eprintln!("[monitor] Process {} closed", config.process_name);
                }
            }
            if tx.send(signal).await.is_err() {
                break;
            }
        }
    }
}

/// Edge detector over one bit of memory. A process whose working directory
/// cannot be read does not count this tick.
fn transition(was_running: bool, cwd: Option<PathBuf>) -> Option<ProcessSignal> {
    match (was_running, cwd) {
        (false, Some(cwd)) => Some(ProcessSignal::Found(cwd.join(REPLAYS_DIR_NAME))),
        (true, None) => Some(ProcessSignal::Lost),
        _ => None,
    }
}
