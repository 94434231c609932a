use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::engine::Engine;
use crate::models::event::GatewayEvent;
use crate::notify::Notifier;
use crate::platform::PlatformGateway;

const QUEUE_DEPTH: usize = 256;

/// One queue and task per guild: events for a guild are processed strictly
/// in arrival order (which keeps snapshot refreshes serialized), while
/// distinct guilds run concurrently with no coordination between them.
pub struct Workers<G, N> {
    engine: Arc<Engine<G, N>>,
    senders: DashMap<String, mpsc::Sender<GatewayEvent>>,
}

impl<G, N> Workers<G, N>
where
    G: PlatformGateway + 'static,
    N: Notifier + 'static,
{
    pub fn new(engine: Arc<Engine<G, N>>) -> Self {
        Self {
            engine,
            senders: DashMap::new(),
        }
    }

    fn spawn_worker(&self, guild_id: &str) -> mpsc::Sender<GatewayEvent> {
        let (tx, mut rx) = mpsc::channel(QUEUE_DEPTH);
        let engine = Arc::clone(&self.engine);
        let guild = guild_id.to_string();
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                if let Err(e) = engine.handle_event(event).await {
                    tracing::error!(guild_id = %guild, "event processing failed: {e}");
                }
            }
        });
        tx
    }

    /// Queues an event on its guild's worker, creating the worker on first
    /// sight of the guild.
    pub async fn dispatch(&self, event: GatewayEvent) {
        let guild_id = event.guild_id().to_string();
        let tx = self
            .senders
            .entry(guild_id.clone())
            .or_insert_with(|| self.spawn_worker(&guild_id))
            .clone();

        if tx.send(event).await.is_err() {
            // worker task is gone; drop the stale sender so the next event
            // starts a fresh one
            self.senders.remove(&guild_id);
            tracing::error!(guild_id = %guild_id, "guild worker died, event dropped");
        }
    }
}
