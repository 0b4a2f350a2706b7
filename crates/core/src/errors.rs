use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("missing API credential: set {var}")]
    MissingCredential { var: &'static str },

    #[error("missing playlist id: set {var}")]
    MissingPlaylistId { var: &'static str },
}
