use std::time::{Duration, SystemTime};

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use discord_sdk::{
    activity::{ActivityBuilder, Assets},
    wheel::{UserState, Wheel},
    Discord, Subscriptions,
};

use crate::presence::{ActivityPayload, PresenceClient};

/// Timeout for the Discord IPC handshake.
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// Discord implementation of [`PresenceClient`] over the local IPC socket.
/// The connection exists only between a successful login and the next
/// logout; calls without a connection fail upward to the state machine.
pub struct DiscordClient {
    conn: Option<Discord>,
}

impl DiscordClient {
    pub fn new() -> Self {
        Self { conn: None }
    }
}

impl Default for DiscordClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PresenceClient for DiscordClient {
    async fn login(&mut self, app_id: i64) -> Result<()> {
        if self.conn.is_some() {
            return Ok(());
        }

        let (wheel, handler) = Wheel::new(Box::new(|err| {
            eprintln!("[discord] Connection error: {err:?}");
        }));
        let mut user_spoke = wheel.user();

        let discord = Discord::new(app_id, Subscriptions::ACTIVITY, Box::new(handler))
            .context("Failed to open Discord IPC connection")?;

        match tokio::time::timeout(HANDSHAKE_TIMEOUT, user_spoke.0.changed()).await {
            Ok(Ok(())) => match &*user_spoke.0.borrow() {
                UserState::Connected(user) => {
                    eprintln!("[discord] Connected as {}", user.username);
                }
                UserState::Disconnected(err) => {
                    bail!("Discord disconnected during handshake: {err:?}")
                }
            },
            Ok(Err(_)) => bail!("Discord connection closed during handshake"),
            Err(_) => bail!("Discord handshake timed out"),
        }

        self.conn = Some(discord);
        Ok(())
    }

    async fn logout(&mut self) {
        if let Some(discord) = self.conn.take() {
            discord.disconnect().await;
            eprintln!("[discord] Disconnected");
        }
    }

    async fn set_activity(&mut self, activity: &ActivityPayload) -> Result<()> {
        let discord = match &self.conn {
            Some(d) => d,
            None => bail!("Not connected to Discord"),
        };

        let mut assets = Assets::default().large(
            activity.large_image.clone(),
            Some(activity.large_text.clone()),
        );
        if let (Some(image), Some(text)) = (&activity.small_image, &activity.small_text) {
            assets = assets.small(image.clone(), Some(text.clone()));
        }

        let mut builder = ActivityBuilder::new()
            .state(activity.state.clone())
            .assets(assets);
        if let Some(details) = &activity.details {
            builder = builder.details(details.clone());
        }
        builder = builder.timestamps(
            activity.start.map(SystemTime::from),
            activity.end.map(SystemTime::from),
        );

        discord
            .update_activity(builder)
            .await
            .context("Failed to update Discord activity")?;
        Ok(())
    }
}
