use std::process::ExitStatus;
use std::time::Duration;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, FetchError>;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid video id {id:?}")]
    InvalidVideoId { id: String },

    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("download timed out after {0:?}")]
    Timeout(Duration),

    #[error("yt-dlp exited with {status}\nstderr:\n{stderr}")]
    ExitStatus { status: ExitStatus, stderr: String },

    #[error("io error while {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}
