pub mod config;
pub mod errors;

pub use config::{API_KEY_VAR, Config, PLAYLIST_ID_VAR};
pub use errors::{ConfigError, Result};
