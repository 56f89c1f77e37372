//! Simulation Loop
//!
//! Owns the [`World`](crate::domain::World), advances it at a fixed tick and
//! serves the requests the hub forwards through the [`GameChannel`].

mod channel;
mod simulation;

pub use channel::{
    CONTROL_QUEUE_CAPACITY, ControlEvent, GameChannel, GameCommand, GameEvents, game_channel,
};
pub use simulation::{Game, LOGIN_REQUEST};
