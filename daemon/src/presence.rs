use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::mpsc;

use crate::event::DaemonEvent;
use crate::game_info::GameInfo;
use crate::match_info::MatchInfo;

/// Display padding added to the battle end timestamp shown remotely. The
/// file-delete signal can race slightly around the true match end; this is
/// presentation only, never a scheduling delay.
const END_GRACE_SECS: i64 = 30;

/// Everything the remote service needs to render one activity.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityPayload {
    pub state: String,
    pub details: Option<String>,
    pub large_image: String,
    pub large_text: String,
    pub small_image: Option<String>,
    pub small_text: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl ActivityPayload {
    fn idle(now: DateTime<Utc>) -> Self {
        Self {
            state: "Idle".to_string(),
            details: None,
            large_image: "idle".to_string(),
            large_text: "Idle".to_string(),
            small_image: None,
            small_text: None,
            start: Some(now),
            end: None,
        }
    }
}

/// Remote presence session. Every call may fail independently; failures
/// never affect the locally tracked state.
#[async_trait]
pub trait PresenceClient {
    async fn login(&mut self, app_id: i64) -> Result<()>;
    async fn logout(&mut self);
    async fn set_activity(&mut self, activity: &ActivityPayload) -> Result<()>;
}

/// Local activity state. Exactly one value live at a time, owned solely by
/// the state machine task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresenceState {
    LoggedOut,
    Idle,
    InBattle { ends_at: DateTime<Utc> },
}

/// The coordination core: single consumer of the merged event channel,
/// sole owner of [`PresenceState`] and the session flag.
///
/// The session flag is kept separate from the activity state on purpose:
/// a failed remote publish leaves the remote display stale while local
/// state keeps advancing, and the next natural event resynchronizes it.
pub struct StateMachine<C> {
    client: C,
    game_info: GameInfo,
    app_id: i64,
    state: PresenceState,
    logged_in: bool,
}

impl<C: PresenceClient> StateMachine<C> {
    pub fn new(client: C, game_info: GameInfo, app_id: i64) -> Self {
        Self {
            client,
            game_info,
            app_id,
            state: PresenceState::LoggedOut,
            logged_in: false,
        }
    }

    pub fn state(&self) -> &PresenceState {
        &self.state
    }

    /// Consumes the merged event stream until it closes or `Shutdown`
    /// arrives. Events are applied strictly one at a time in arrival order.
    pub async fn run(mut self, mut rx: mpsc::Receiver<DaemonEvent>) {
        while let Some(event) = rx.recv().await {
            if matches!(event, DaemonEvent::Shutdown) {
                eprintln!("[presence] Shutting down");
                self.on_game_stopped().await;
                break;
            }
            self.handle(event).await;
        }
    }

    /// Applies a single event. Publish failures are logged and the local
    /// state still advances, so later events are evaluated against the
    /// correct logical state even while the remote display is stale.
    pub async fn handle(&mut self, event: DaemonEvent) {
        match event {
            DaemonEvent::GameStarted => self.on_game_started().await,
            DaemonEvent::GameStopped | DaemonEvent::Shutdown => self.on_game_stopped().await,
            DaemonEvent::BattleStarted { info, started_at } => {
                self.on_battle_started(&info, started_at).await
            }
            DaemonEvent::BattleEnded => self.on_battle_ended().await,
        }
    }

    async fn on_game_started(&mut self) {
        if self.logged_in {
            // Found strictly follows Lost; an overlapping Found is a no-op.
            return;
        }
        if let Err(e) = self.client.login(self.app_id).await {
            eprintln!("[presence] Discord login failed: {e:#}");
            return;
        }
        self.logged_in = true;
        self.state = PresenceState::Idle;
        eprintln!("[presence] Setting rich presence");
        self.publish(&ActivityPayload::idle(Utc::now())).await;
    }

    async fn on_game_stopped(&mut self) {
        if self.logged_in {
            self.client.logout().await;
            self.logged_in = false;
            eprintln!("[presence] Removing rich presence");
        }
        self.state = PresenceState::LoggedOut;
    }

    async fn on_battle_started(&mut self, info: &MatchInfo, started_at: DateTime<Utc>) {
        match self.state {
            PresenceState::Idle => {}
            // Repeated write of the same battle file; already published.
            PresenceState::InBattle { .. } => return,
            // No session to update.
            PresenceState::LoggedOut => return,
        }

        let ends_at = battle_end(started_at, info.duration);
        let activity = self.battle_activity(info, started_at, ends_at);
        eprintln!(
            "[presence] Battle started ({}, {})",
            activity.details.as_deref().unwrap_or(""),
            activity.state
        );
        self.state = PresenceState::InBattle { ends_at };
        self.publish(&activity).await;
    }

    async fn on_battle_ended(&mut self) {
        if !matches!(self.state, PresenceState::InBattle { .. }) {
            // Late or duplicate removal; nothing to end.
            return;
        }
        eprintln!("[presence] Battle ended");
        self.state = PresenceState::Idle;
        self.publish(&ActivityPayload::idle(Utc::now())).await;
    }

    fn battle_activity(
        &self,
        info: &MatchInfo,
        started_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
    ) -> ActivityPayload {
        let map_name = self.game_info.resolve_map(&info.map_name);
        let mode_title = self.game_info.resolve_mode_title(&info.game_logic);

        // An unrecognized ship id must never take the daemon down; show the
        // raw vehicle token and skip the species imagery.
        let (vehicle, small_image, small_text) =
            match self.game_info.resolve_ship(&info.player_vehicle) {
                Some(ship) => (
                    format!("{} {}", ship.tier, ship.name),
                    Some(ship.species.to_lowercase()),
                    Some(ship.species),
                ),
                None => (info.player_vehicle.clone(), None, None),
            };

        ActivityPayload {
            state: format!("Playing {vehicle}"),
            details: Some(format!("on {map_name}")),
            large_image: info.game_type.to_lowercase(),
            large_text: mode_title,
            small_image,
            small_text,
            start: Some(started_at),
            end: Some(ends_at),
        }
    }

    async fn publish(&mut self, activity: &ActivityPayload) {
        if !self.logged_in {
            return;
        }
        if let Err(e) = self.client.set_activity(activity).await {
            eprintln!("[presence] Failed to set activity: {e:#}");
        }
    }
}

/// Padded end timestamp for the remote display. The duration comes straight
/// from a game-written file, so an absurd value must degrade to a clamped
/// timestamp rather than overflow.
fn battle_end(started_at: DateTime<Utc>, duration: i64) -> DateTime<Utc> {
    Duration::try_seconds(duration.saturating_add(END_GRACE_SECS))
        .and_then(|padded| started_at.checked_add_signed(padded))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
