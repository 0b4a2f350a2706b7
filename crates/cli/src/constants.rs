/// pause inserted between two consecutive downloads.
pub const DEFAULT_PAUSE_MS: u64 = 1000;

/// upper bound for a single video download.
pub const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 60;

/// upper bound for a single playlist listing request.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// yt-dlp format selector.
pub const DEFAULT_FORMAT: &str = "best";

/// tracing targets forwarded to the cli logger.
pub const LOG_TARGET_PREFIX: &str = "plget";
