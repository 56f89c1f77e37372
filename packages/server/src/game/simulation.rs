//! Fixed-tick game loop.

use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use tokio::{sync::RwLock, time::MissedTickBehavior};

use super::channel::{ControlEvent, GameCommand, GameEvents};
use crate::{
    cancel::{CancelReceiver, cancelled},
    domain::{
        ClientId, ConnStatus, GameError, ResponseStatus, World, WorldError, world::ControlInput,
    },
    hub::{ClientGateway, ClientRequest, Responder},
    infrastructure::dto::websocket::{
        ControlNotify, ObjectSnapshot, PlayerSnapshot, ServerMsg, WorldDump,
    },
};

/// Request type of a login request
pub const LOGIN_REQUEST: &str = "login";

pub struct Game {
    world: RwLock<World>,
    gateway: Arc<dyn ClientGateway>,
    tick_period: Duration,
    frame: AtomicU64,
}

impl Game {
    pub fn new(world: World, gateway: Arc<dyn ClientGateway>, tick_period: Duration) -> Self {
        Self {
            world: RwLock::new(world),
            gateway,
            tick_period,
            frame: AtomicU64::new(0),
        }
    }

    /// Number of ticks advanced so far
    pub fn frame(&self) -> u64 {
        self.frame.load(Ordering::Relaxed)
    }

    /// Run the loop until `cancel` fires.
    ///
    /// Ticks take priority over commands and controls, so a flood of
    /// inbound traffic cannot delay world updates.
    pub async fn run(&self, mut events: GameEvents, mut cancel: CancelReceiver) {
        let mut ticker = tokio::time::interval(self.tick_period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tracing::info!("Game loop started ({:?} per tick)", self.tick_period);

        loop {
            tokio::select! {
                biased;
                _ = cancelled(&mut cancel) => {
                    tracing::info!("Game loop stopped at frame {}", self.frame());
                    return;
                }
                _ = ticker.tick() => self.advance().await,
                Some(command) = events.commands.recv() => self.handle_command(command).await,
                Some(ControlEvent { client_id, control }) = events.controls.recv() => {
                    self.apply_control(&client_id, &control).await;
                }
            }
        }
    }

    /// Step the world once and broadcast the new state to players in game.
    pub async fn advance(&self) {
        let (players, objects) = {
            let mut world = self.world.write().await;
            world.step();
            (snapshot_players(&world), snapshot_objects(&world))
        };
        let frame = self.frame.fetch_add(1, Ordering::Relaxed) + 1;
        let msg = ServerMsg::update(frame, players, objects);
        self.gateway.broadcast(&msg, &[ConnStatus::InGame]).await;
    }

    /// Serve one client request. Every request is answered exactly once.
    pub async fn request(&self, request: ClientRequest) -> Result<(), GameError> {
        let ClientRequest {
            client_id,
            request_type,
            request_body,
            responder,
            ..
        } = request;

        match request_type.as_str() {
            LOGIN_REQUEST => self.login(client_id, &request_body, responder).await,
            other => {
                let error = GameError::UnknownRequest(other.to_string());
                responder
                    .respond_text(ResponseStatus::BadRequest, error.to_string())
                    .await;
                Err(error)
            }
        }
    }

    /// Remove the player of a connection that went away.
    pub async fn logout(&self, client_id: &ClientId) -> Result<(), WorldError> {
        let player = self.world.write().await.remove_player(client_id)?;
        tracing::info!("Player '{}' left the game", player.name);
        Ok(())
    }

    pub async fn apply_control(&self, client_id: &ClientId, control: &ControlNotify) {
        let input = match ControlInput::try_from(control) {
            Ok(input) => input,
            Err(e) => {
                tracing::warn!("Invalid control from '{}': {}", client_id, e);
                return;
            }
        };
        if let Err(e) = self.world.write().await.apply_control(client_id, input) {
            tracing::debug!("Control from '{}' ignored: {}", client_id, e);
        }
    }

    pub async fn players_snapshot(&self) -> Vec<PlayerSnapshot> {
        snapshot_players(&*self.world.read().await)
    }

    pub async fn objects_snapshot(&self) -> Vec<ObjectSnapshot> {
        snapshot_objects(&*self.world.read().await)
    }

    pub async fn dump(&self) -> WorldDump {
        WorldDump::from(&*self.world.read().await)
    }

    async fn handle_command(&self, command: GameCommand) {
        match command {
            GameCommand::Request(request) => {
                if let Err(e) = self.request(request).await {
                    tracing::warn!("Request failed: {}", e);
                }
            }
            GameCommand::Logout(client_id) => {
                if let Err(e) = self.logout(&client_id).await {
                    tracing::debug!("Logout of '{}': {}", client_id, e);
                }
            }
        }
    }

    async fn login(
        &self,
        client_id: ClientId,
        body: &str,
        responder: Responder,
    ) -> Result<(), GameError> {
        let result = self.world.write().await.login(&client_id, body);
        if let Err(e) = result {
            tracing::warn!("Login of '{}' rejected: {}", client_id, e);
            responder.respond_text(e.status(), e.to_string()).await;
            return Err(e.into());
        }

        let connected = self
            .gateway
            .change_status(&client_id, ConnStatus::InGame)
            .await;
        if !connected {
            // 接続が先に閉じた場合、ログアウトは既に処理済み
            if let Err(e) = self.world.write().await.remove_player(&client_id) {
                tracing::error!("Failed to remove player of '{}': {}", client_id, e);
            }
            let error = GameError::Disconnected(client_id.to_string());
            responder
                .respond_text(ResponseStatus::ServerError, error.to_string())
                .await;
            return Err(error);
        }

        let dump = self.dump().await;
        responder
            .respond_json(ResponseStatus::Accepted, &dump)
            .await;
        tracing::info!("Client '{}' joined the game", client_id);
        Ok(())
    }
}

fn snapshot_players(world: &World) -> Vec<PlayerSnapshot> {
    world.players().iter().map(Into::into).collect()
}

fn snapshot_objects(world: &World) -> Vec<ObjectSnapshot> {
    world.objects().iter().map(Into::into).collect()
}
