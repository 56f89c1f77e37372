//! Domain layer: value objects, errors, the world model and the seams to
//! the outside (transport, key-value store).

pub mod error;
pub mod login;
pub mod store;
pub mod transport;
pub mod value_object;
pub mod world;

pub use error::{
    ConnectionError, GameError, HubError, LoginError, StoreError, TransportError,
    ValueObjectError, WorldError,
};
pub use login::LoginRequest;
pub use store::{KeyValueStore, MAIN_BUCKETS, parse_key_path};
pub use transport::{Frame, FrameSink, FrameStream};
pub use value_object::{ClientId, ConnStatus, ResponseStatus};
pub use world::World;
