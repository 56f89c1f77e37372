//! Wiring of the hub, the game loop and the store.

use std::sync::Arc;

use axum::Router;
use bounce_shared::time::now_millis;
use tokio::task::JoinHandle;

use crate::{
    cancel::{CancelSender, cancel_channel},
    config::Config,
    domain::{KeyValueStore, World},
    game::{CONTROL_QUEUE_CAPACITY, Game, game_channel},
    hub::Hub,
    infrastructure::store::InMemoryStore,
    ui::{router, state::AppState},
};

/// A running server core: the hub dispatcher and the game loop, each on its own task.
pub struct App {
    state: Arc<AppState>,
    cancel: CancelSender,
    tasks: Vec<JoinHandle<()>>,
}

impl App {
    /// Build every component and spawn the background tasks.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(config: Config) -> Self {
        let (cancel, cancel_rx) = cancel_channel();

        // 1. Hub ↔ Game のチャネル
        let (channel, events) = game_channel(CONTROL_QUEUE_CAPACITY);

        // 2. Connection Hub
        let (hub, dispatcher) = Hub::new(Arc::new(channel), cancel_rx.clone());

        // 3. Simulation Loop
        let world = World::new(config.world_rules.clone(), config.world_map.clone());
        let game = Arc::new(Game::new(
            world,
            Arc::new(hub.clone()),
            config.tick_period(),
        ));

        // 4. Key-value store
        let store: Arc<dyn KeyValueStore> = Arc::new(InMemoryStore::new());

        let tasks = vec![tokio::spawn(dispatcher.run()), {
            let game = game.clone();
            tokio::spawn(async move { game.run(events, cancel_rx).await })
        }];

        let state = Arc::new(AppState {
            hub,
            game,
            config: Arc::new(config),
            store,
            started_at: now_millis(),
        });
        tracing::info!("Game core started");

        Self {
            state,
            cancel,
            tasks,
        }
    }

    pub fn state(&self) -> Arc<AppState> {
        self.state.clone()
    }

    pub fn router(&self) -> Router {
        router(self.state())
    }

    /// Stop the game loop and the hub, closing every connection.
    pub async fn shutdown(self) {
        self.cancel.send_replace(true);
        for task in self.tasks {
            if let Err(e) = task.await {
                tracing::error!("Background task failed: {}", e);
            }
        }
        tracing::info!("Game core stopped");
    }
}
