use std::path::PathBuf;

use clap::Args;

use crate::constants::*;
use crate::logger::LogLevel;

#[derive(Debug, Clone, Args)]
pub struct AppArgs {
    /// Logging verbosity
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Do not load a .env file from the working directory
    #[arg(long)]
    pub no_dotenv: bool,
}

#[derive(Debug, Clone, Args)]
pub struct ListArgs {
    /// Page size requested from the listing api (endpoint default if omitted)
    #[arg(long)]
    pub max_results: Option<u32>,

    /// Timeout for each listing request, in seconds
    #[arg(long, default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)]
    pub request_timeout_secs: u64,

    #[command(flatten)]
    pub app_args: AppArgs,
}

#[derive(Debug, Clone, Args)]
pub struct DownloadArgs {
    /// Output directory for downloaded files
    #[arg(short, long, env = "PLGET_OUTPUT_DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Pause between two downloads, in milliseconds
    #[arg(long, default_value_t = DEFAULT_PAUSE_MS)]
    pub pause_ms: u64,

    /// Timeout for each video download, in seconds
    #[arg(long, default_value_t = DEFAULT_DOWNLOAD_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Path to the yt-dlp executable (looked up on PATH if omitted)
    #[arg(long, env = "PLGET_YT_DLP")]
    pub yt_dlp: Option<PathBuf>,

    /// yt-dlp format selector
    #[arg(short, long, default_value = DEFAULT_FORMAT)]
    pub format: String,

    #[command(flatten)]
    pub list: ListArgs,
}
