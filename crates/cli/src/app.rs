use std::process::ExitCode;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;

use plget::prelude::*;
use plget_core::Config;
use plget_downloader::{FetchError, Fetcher, YtDlpFetcher};

use crate::args::*;
use crate::logger::*;
use crate::utils::*;

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub download_args: DownloadArgs,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the video ids of the configured playlist
    List(ListArgs),
    /// Download every video of the configured playlist
    Download(DownloadArgs),
}

impl Cli {
    pub fn app_args(&self) -> &AppArgs {
        match &self.command {
            Some(Commands::List(args)) => &args.app_args,
            Some(Commands::Download(args)) => &args.list.app_args,
            None => &self.download_args.list.app_args,
        }
    }
}

/// outcome of one pass over the playlist.
#[derive(Debug, Default)]
pub struct DownloadReport {
    pub succeeded: Vec<String>,
    pub failed: Vec<(String, FetchError)>,
}

#[derive(Debug)]
pub struct App {
    cli: Cli,
    logger: Arc<CliLogger>,
}

impl App {
    pub fn new(cli: Cli) -> Self {
        let logger = Arc::new(CliLogger::new(cli.app_args().log_level));
        Self { cli, logger }
    }

    pub fn logger(&self) -> Arc<CliLogger> {
        Arc::clone(&self.logger)
    }

    /// runs the selected command; only configuration and listing failures
    /// turn into a failing exit code.
    pub async fn run(&self) -> ExitCode {
        if !self.cli.app_args().no_dotenv {
            self.load_dotenv();
        }

        let result = match &self.cli.command {
            Some(Commands::List(args)) => self.list(args).await,
            Some(Commands::Download(args)) => self.download(args).await.map(|_| ()),
            None => self.download(&self.cli.download_args).await.map(|_| ()),
        };

        match result {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                self.logger.failed(format!("{err}"));
                ExitCode::FAILURE
            }
        }
    }

    fn load_dotenv(&self) {
        match dotenvy::dotenv() {
            Ok(path) => self
                .logger
                .debug("config", format!("loaded {}", path.display())),
            Err(err) => self.logger.debug("config", format!("no .env loaded: {err}")),
        }
    }

    async fn playlist(&self, args: &ListArgs) -> Result<Vec<String>> {
        let logger = &self.logger;

        logger.loading("loading configuration");
        let config = Config::from_env()?;
        logger.debug("config", format!("{config:?}"));

        let client = PlaylistBuilder::new(&config.api_key)
            .timeout(Duration::from_secs(args.request_timeout_secs))
            .max_results(args.max_results)
            .build()?;

        let video_ids = logger
            .while_loading(
                format!("listing playlist {}", config.playlist_id.yellow()),
                client.enumerate(&config.playlist_id),
            )
            .await?;

        for (i, video_id) in video_ids.iter().enumerate() {
            logger.debug("playlist", format!("video {}: {video_id}", i + 1));
        }
        logger.debug("playlist", format!("{} video id(s) in total", video_ids.len()));

        logger.success(format!(
            "found {} video(s) in {}",
            video_ids.len().yellow(),
            config.playlist_id.yellow()
        ));
        Ok(video_ids)
    }

    pub async fn list(&self, args: &ListArgs) -> Result<()> {
        let video_ids = self.playlist(args).await?;

        for (i, video_id) in video_ids.iter().enumerate() {
            self.logger
                .success(format!("video {}: {}", i + 1, video_id.yellow()));
        }

        Ok(())
    }

    pub async fn download(&self, args: &DownloadArgs) -> Result<DownloadReport> {
        let video_ids = self.playlist(&args.list).await?;

        let mut fetcher = YtDlpFetcher::new()
            .output_dir(&args.output_dir)
            .format(&args.format)
            .timeout(Duration::from_secs(args.timeout_secs));
        if let Some(binary) = &args.yt_dlp {
            fetcher = fetcher.binary(binary);
        }

        Ok(download_all(
            &fetcher,
            &video_ids,
            Duration::from_millis(args.pause_ms),
            &self.logger,
        )
        .await)
    }
}

/// downloads `video_ids` one after another, in order.
///
/// a failed video is reported and skipped; it never stops the remaining ones.
pub async fn download_all<F>(
    fetcher: &F,
    video_ids: &[String],
    pause: Duration,
    logger: &CliLogger,
) -> DownloadReport
where
    F: Fetcher + ?Sized,
{
    let started = Instant::now();
    let total = video_ids.len();
    let mut report = DownloadReport::default();

    for (i, video_id) in video_ids.iter().enumerate() {
        if i > 0 && !pause.is_zero() {
            tokio::time::sleep(pause).await;
        }

        let result = logger
            .while_loading(
                format!("[{}/{total}] downloading {}", i + 1, video_id.yellow()),
                fetcher.fetch(video_id),
            )
            .await;

        match result {
            Ok(path) => {
                let size = tokio::fs::metadata(&path)
                    .await
                    .map(|meta| format_bytes(meta.len()))
                    .unwrap_or_else(|_| "unknown size".to_string());
                logger.video_saved(i + 1, total, &path, &size);
                report.succeeded.push(video_id.clone());
            }
            Err(err) => {
                logger.video_failed(i + 1, total, video_id, &err);
                report.failed.push((video_id.clone(), err));
            }
        }
    }

    let summary = format!(
        "finished in {}: {} downloaded, {} failed",
        format_duration(started.elapsed()),
        report.succeeded.len().green(),
        report.failed.len().red()
    );
    if report.failed.is_empty() {
        logger.success(summary);
    } else {
        logger.warn(summary);
    }
    report
}
