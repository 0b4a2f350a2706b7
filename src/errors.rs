use thiserror::Error;

use plget_core::ConfigError;

pub type Result<T> = std::result::Result<T, PlaylistError>;

#[derive(Debug, Error)]
pub enum PlaylistError {
    #[error("failed to parse listing base URL {url}")]
    BaseUrl { url: String },

    #[error("failed building reqwest client: {0}")]
    BuildClient(#[source] reqwest::Error),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP request failed while {context}: {source}")]
    Request {
        context: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to read response body while {context}: {source}")]
    ResponseBody {
        context: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to decode JSON while {context}: {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{context} returned {status}\nresponse text:\n{body}")]
    HttpStatus {
        context: String,
        status: reqwest::StatusCode,
        body: String,
    },
}
