//! Channel set that connects the hub to the game loop.

use async_trait::async_trait;
use tokio::sync::mpsc::{self, error::TrySendError};

use crate::{
    domain::ClientId,
    hub::{ClientRequest, HubListener},
    infrastructure::dto::websocket::ControlNotify,
};

/// Capacity of the control queue. Controls beyond it are dropped.
pub const CONTROL_QUEUE_CAPACITY: usize = 256;

#[derive(Debug)]
pub enum GameCommand {
    Request(ClientRequest),
    Logout(ClientId),
}

#[derive(Debug, Clone)]
pub struct ControlEvent {
    pub client_id: ClientId,
    pub control: ControlNotify,
}

/// Hub side of the channel set
pub struct GameChannel {
    commands: mpsc::UnboundedSender<GameCommand>,
    controls: mpsc::Sender<ControlEvent>,
}

/// Game loop side of the channel set
pub struct GameEvents {
    pub(crate) commands: mpsc::UnboundedReceiver<GameCommand>,
    pub(crate) controls: mpsc::Receiver<ControlEvent>,
}

pub fn game_channel(control_capacity: usize) -> (GameChannel, GameEvents) {
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (control_tx, control_rx) = mpsc::channel(control_capacity);
    (
        GameChannel {
            commands: command_tx,
            controls: control_tx,
        },
        GameEvents {
            commands: command_rx,
            controls: control_rx,
        },
    )
}

#[async_trait]
impl HubListener for GameChannel {
    async fn on_request(&self, request: ClientRequest) {
        if self.commands.send(GameCommand::Request(request)).is_err() {
            tracing::warn!("Game loop is not running, request dropped");
        }
    }

    async fn on_logout(&self, client_id: &ClientId) {
        if self
            .commands
            .send(GameCommand::Logout(client_id.clone()))
            .is_err()
        {
            tracing::warn!("Game loop is not running, logout of '{}' dropped", client_id);
        }
    }

    async fn on_control(&self, client_id: &ClientId, control: ControlNotify) {
        let event = ControlEvent {
            client_id: client_id.clone(),
            control,
        };
        match self.controls.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                tracing::debug!("Control queue full, dropped control of '{}'", event.client_id);
            }
            Err(TrySendError::Closed(_)) => {
                tracing::warn!("Game loop is not running, control dropped");
            }
        }
    }
}
