mod errors;

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
pub use errors::{FetchError, Result};
use regex::Regex;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;
use tracing::{debug, info};

pub const WATCH_URL: &str = "https://www.youtube.com/watch?v=";
pub const OUTPUT_EXT: &str = "mp4";

const DEFAULT_BINARY: &str = "yt-dlp";
const DEFAULT_FORMAT: &str = "best";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

static VIDEO_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("video id regex must compile"));

/// turns a video id into a saved media file.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// downloads one video and returns the path it was written to.
    async fn fetch(&self, video_id: &str) -> Result<PathBuf>;
}

/// canonical watch page for a video id.
pub fn watch_url(video_id: &str) -> String {
    format!("{WATCH_URL}{video_id}")
}

/// rejects ids that cannot be used verbatim as a file name.
pub fn validate_video_id(video_id: &str) -> Result<()> {
    if VIDEO_ID_RE.is_match(video_id) {
        return Ok(());
    }

    Err(FetchError::InvalidVideoId {
        id: video_id.to_string(),
    })
}

/// fetcher backed by the `yt-dlp` executable.
///
/// the media is streamed from the child's stdout straight into
/// `<output_dir>/<video_id>.mp4`.
#[derive(Debug, Clone)]
pub struct YtDlpFetcher {
    binary: PathBuf,
    output_dir: PathBuf,
    format: String,
    timeout: Duration,
}

impl Default for YtDlpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl YtDlpFetcher {
    /// looks `yt-dlp` up on `PATH`, falling back to the bare program name.
    pub fn new() -> Self {
        let binary = which::which(DEFAULT_BINARY).unwrap_or_else(|_| PathBuf::from(DEFAULT_BINARY));

        Self {
            binary,
            output_dir: PathBuf::from("."),
            format: DEFAULT_FORMAT.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = binary.into();
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    /// bounds a whole download attempt, process start to file close.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn output_path(&self, video_id: &str) -> PathBuf {
        self.output_dir.join(format!("{video_id}.{OUTPUT_EXT}"))
    }

    async fn stream_to_file(&self, url: &str, output: &Path) -> Result<u64> {
        let program = self.binary.display().to_string();
        let mut child = Command::new(&self.binary)
            .args([
                "-f",
                self.format.as_str(),
                "-o",
                "-",
                "--quiet",
                "--no-warnings",
                "--no-playlist",
            ])
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| FetchError::Spawn {
                program: program.clone(),
                source,
            })?;

        let mut stdout = child.stdout.take().ok_or_else(|| FetchError::Io {
            context: format!("capturing stdout of {program}"),
            source: std::io::Error::other("stdout was not piped"),
        })?;
        let stderr = child.stderr.take();

        let mut file = File::create(output)
            .await
            .map_err(|source| FetchError::Io {
                context: format!("creating output file {}", output.display()),
                source,
            })?;

        // stderr is drained alongside stdout so a chatty child cannot block on a full pipe
        let read_stderr = async {
            let mut text = String::new();
            if let Some(mut stderr) = stderr {
                let _ = stderr.read_to_string(&mut text).await;
            }
            text
        };

        let (copied, stderr_text) =
            tokio::join!(tokio::io::copy(&mut stdout, &mut file), read_stderr);

        let bytes = copied.map_err(|source| FetchError::Io {
            context: format!("writing output file {}", output.display()),
            source,
        })?;

        file.flush().await.map_err(|source| FetchError::Io {
            context: format!("flushing output file {}", output.display()),
            source,
        })?;
        drop(file);

        let status = child.wait().await.map_err(|source| FetchError::Io {
            context: format!("waiting for {program}"),
            source,
        })?;

        if !status.success() {
            return Err(FetchError::ExitStatus {
                status,
                stderr: stderr_text.trim().to_string(),
            });
        }

        Ok(bytes)
    }
}

#[async_trait]
impl Fetcher for YtDlpFetcher {
    async fn fetch(&self, video_id: &str) -> Result<PathBuf> {
        validate_video_id(video_id)?;
        ensure_dir(&self.output_dir).await?;

        let url = watch_url(video_id);
        let output = self.output_path(video_id);
        info!(video_id, url = %url, "downloading video");

        let attempt = tokio::time::timeout(self.timeout, self.stream_to_file(&url, &output));
        let result = match attempt.await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout(self.timeout)),
        };

        match result {
            Ok(bytes) => {
                debug!(video_id, bytes, output = %output.display(), "saved video");
                Ok(output)
            }
            Err(err) => {
                remove_partial(&output).await;
                Err(err)
            }
        }
    }
}

async fn ensure_dir(dir: &Path) -> Result<()> {
    if dir.as_os_str().is_empty() {
        return Ok(());
    }

    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| FetchError::Io {
            context: format!("creating output directory {}", dir.display()),
            source,
        })
}

async fn remove_partial(output: &Path) {
    match tokio::fs::remove_file(output).await {
        Ok(()) => debug!(output = %output.display(), "removed partial download"),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => debug!(output = %output.display(), %err, "failed to remove partial download"),
    }
}
