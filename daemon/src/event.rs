use std::path::PathBuf;

use chrono::{DateTime, Utc};

use crate::match_info::MatchInfo;

/// Edge-triggered output of the process poller, consumed by the watcher
/// controller. `Found` and `Lost` strictly alternate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessSignal {
    /// The game process appeared; carries the replays directory derived
    /// from the process working directory at the moment of detection.
    Found(PathBuf),
    /// The previously detected game process exited.
    Lost,
}

/// Merged event stream consumed by the presence state machine. All
/// producers (watcher controller, battle translator, Ctrl+C task) feed
/// one bounded channel so transitions are evaluated strictly in order.
#[derive(Debug)]
pub enum DaemonEvent {
    /// The game process was detected and its replays directory is being watched.
    GameStarted,
    /// The game process exited.
    GameStopped,
    /// The match-state file was written and decoded successfully.
    BattleStarted {
        info: Box<MatchInfo>,
        started_at: DateTime<Utc>,
    },
    /// The match-state file was removed; the battle is over.
    BattleEnded,
    /// Ctrl+C received; log out and exit.
    Shutdown,
}
