pub mod config;
pub mod dig;
pub mod error;
pub mod floor;
pub mod logic;
pub mod oxygen;
pub mod pile;
pub mod serde_duration;
pub mod session;
pub mod sfx;
pub mod shop;

pub use error::{ConfigError, GameError};
pub use session::{GameSession, SessionEvent};
