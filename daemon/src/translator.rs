use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use notify::EventKind;
use tokio::sync::mpsc;

use crate::config::Config;
use crate::event::DaemonEvent;
use crate::match_info::{self, MatchInfo};

/// Semantic reading of a raw filesystem event against the tracked
/// match-state filename.
#[derive(Debug, PartialEq, Eq)]
pub enum FileSignal {
    /// The tracked file was created or modified at this path.
    Written(PathBuf),
    /// The tracked file was removed.
    Removed,
}

/// Classifies a raw notify event. Events that touch no path with the
/// tracked filename, and event kinds other than create/modify/remove,
/// are noise.
pub fn classify(event: &notify::Event, file_name: &str) -> Option<FileSignal> {
    let path = event
        .paths
        .iter()
        .find(|p| p.file_name() == Some(OsStr::new(file_name)))?;

    match event.kind {
        EventKind::Create(_) | EventKind::Modify(_) => Some(FileSignal::Written(path.clone())),
        EventKind::Remove(_) => Some(FileSignal::Removed),
        _ => None,
    }
}

/// Battle event translator: pumps raw filesystem events into semantic
/// battle started/ended events on the merged daemon channel.
///
/// A write that fails to read or decode is dropped with a log line; the
/// game writes the file non-atomically, so partial reads are expected.
/// Removal unconditionally means the battle is over.
pub async fn run(
    mut fs_rx: mpsc::Receiver<notify::Event>,
    config: Arc<Config>,
    event_tx: mpsc::Sender<DaemonEvent>,
) {
    while let Some(event) = fs_rx.recv().await {
        let signal = match classify(&event, &config.match_file_name) {
            Some(s) => s,
            None => continue,
        };

        let daemon_event = match signal {
            FileSignal::Written(path) => match read_match_info(&path) {
                Ok(info) => DaemonEvent::BattleStarted {
                    info: Box::new(info),
                    started_at: Utc::now(),
                },
                Err(e) => {
                    eprintln!("[battle] Ignoring match-state file event: {e:#}");
                    continue;
                }
            },
            FileSignal::Removed => DaemonEvent::BattleEnded,
        };

        if event_tx.send(daemon_event).await.is_err() {
            break;
        }
    }
}

fn read_match_info(path: &Path) -> Result<MatchInfo> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    match_info::decode(&bytes)
        .with_context(|| format!("Failed to decode {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, CreateKind, ModifyKind, RemoveKind};

    const TRACKED: &str = "tempArenaInfo.json";

    fn event(kind: EventKind, path: &str) -> notify::Event {
        notify::Event::new(kind).add_path(PathBuf::from(path))
    }

    #[test]
    fn modify_on_tracked_file_is_written() {
        let e = event(
            EventKind::Modify(ModifyKind::Any),
            "/replays/tempArenaInfo.json",
        );
        assert_eq!(
            classify(&e, TRACKED),
            Some(FileSignal::Written(PathBuf::from(
                "/replays/tempArenaInfo.json"
            )))
        );
    }

    #[test]
    fn create_on_tracked_file_is_written() {
        let e = event(EventKind::Create(CreateKind::File), "/replays/tempArenaInfo.json");
        assert!(matches!(classify(&e, TRACKED), Some(FileSignal::Written(_))));
    }

    #[test]
    fn remove_on_tracked_file_is_removed() {
        let e = event(EventKind::Remove(RemoveKind::File), "/replays/tempArenaInfo.json");
        assert_eq!(classify(&e, TRACKED), Some(FileSignal::Removed));
    }

    #[test]
    fn other_filenames_are_ignored() {
        let e = event(
            EventKind::Modify(ModifyKind::Any),
            "/replays/20231123_211426_PASD509-Somers_17_NA_fault_line.wowsreplay",
        );
        assert_eq!(classify(&e, TRACKED), None);
    }

    #[test]
    fn access_events_are_ignored() {
        let e = event(
            EventKind::Access(AccessKind::Any),
            "/replays/tempArenaInfo.json",
        );
        assert_eq!(classify(&e, TRACKED), None);
    }

    #[test]
    fn events_with_no_paths_are_ignored() {
        let e = notify::Event::new(EventKind::Modify(ModifyKind::Any));
        assert_eq!(classify(&e, TRACKED), None);
    }
}
