use std::fmt::{self, Display};
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::ValueEnum;
use crossterm::terminal::{Clear, ClearType};
use crossterm::{cursor, execute};
use owo_colors::OwoColorize;
use tracing::field::{Field, Visit};
use tracing::level_filters::LevelFilter;
use tracing::{Event, Subscriber};
use tracing_subscriber::Registry;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;

use crate::constants::LOG_TARGET_PREFIX;

const SPINNER_FRAMES: [&str; 10] = [
    "⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum LogLevel {
    Error,
    #[value(alias = "warning")]
    Warn,
    Info,
    Debug,
}

#[derive(Debug)]
enum Sink {
    Terminal,
    Memory(Mutex<Vec<(LogLevel, String)>>),
}

/// single-line spinner drawn on stdout while a listing or download runs.
#[derive(Debug, Default)]
struct Spinner {
    step: AtomicUsize,
    visible: AtomicBool,
}

impl Spinner {
    fn draw(&self, message: &str) {
        let step = self.step.fetch_add(1, Ordering::Relaxed);
        let frame = SPINNER_FRAMES[step % SPINNER_FRAMES.len()];
        let mut stdout = std::io::stdout();

        self.visible.store(true, Ordering::Relaxed);
        let _ = execute!(stdout, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine));
        let _ = write!(stdout, "{} {message}", frame.yellow());
        let _ = stdout.flush();
    }

    fn clear(&self) {
        if !self.visible.swap(false, Ordering::Relaxed) {
            return;
        }

        let mut stdout = std::io::stdout();
        let _ = execute!(stdout, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine));
        let _ = stdout.flush();
    }
}

#[derive(Debug)]
pub struct CliLogger {
    pub level: LogLevel,
    sink: Sink,
    spinner: Spinner,
}

impl CliLogger {
    pub fn new(level: LogLevel) -> Self {
        Self {
            level,
            sink: Sink::Terminal,
            spinner: Spinner::default(),
        }
    }

    /// keeps every emitted line in memory instead of printing it.
    pub fn in_memory(level: LogLevel) -> Self {
        Self {
            level,
            sink: Sink::Memory(Mutex::new(Vec::new())),
            spinner: Spinner::default(),
        }
    }

    /// lines kept by an in-memory logger, oldest first.
    pub fn lines(&self) -> Vec<(LogLevel, String)> {
        match &self.sink {
            Sink::Memory(lines) => lines.lock().map(|l| l.clone()).unwrap_or_default(),
            Sink::Terminal => Vec::new(),
        }
    }

    fn animated(&self) -> bool {
        matches!(self.sink, Sink::Terminal) && self.level >= LogLevel::Info
    }

    fn emit(&self, level: LogLevel, icon: impl Display, message: &str) {
        if level > self.level {
            return;
        }

        match &self.sink {
            Sink::Terminal => {
                self.spinner.clear();
                if level == LogLevel::Error {
                    eprintln!("{icon} {message}");
                } else {
                    println!("{icon} {message}");
                }
            }
            Sink::Memory(lines) => {
                if let Ok(mut lines) = lines.lock() {
                    lines.push((level, message.to_string()));
                }
            }
        }
    }

    pub fn success(&self, message: impl AsRef<str>) {
        self.emit(LogLevel::Info, "✓".green(), message.as_ref());
    }

    pub fn warn(&self, message: impl AsRef<str>) {
        self.emit(LogLevel::Warn, "!".yellow(), message.as_ref());
    }

    /// errors always go to stderr.
    pub fn failed(&self, message: impl AsRef<str>) {
        self.emit(LogLevel::Error, "✗".red(), message.as_ref());
    }

    pub fn debug(&self, context: impl AsRef<str>, message: impl AsRef<str>) {
        let line = format!(
            "{:>15} {}",
            context.as_ref().bold().bright_purple(),
            message.as_ref()
        );
        self.emit(LogLevel::Debug, "λ".cyan(), &line);
    }

    pub fn video_saved(&self, position: usize, total: usize, path: &Path, size: &str) {
        self.success(format!(
            "[{position}/{total}] saved {} ({size})",
            path.display().yellow()
        ));
    }

    pub fn video_failed(&self, position: usize, total: usize, video_id: &str, err: &dyn Display) {
        self.failed(format!(
            "[{position}/{total}] failed to download {video_id}: {err}"
        ));
    }

    pub fn loading(&self, message: impl AsRef<str>) {
        if self.animated() {
            self.spinner.draw(message.as_ref());
        }
    }

    pub async fn while_loading<F, T>(&self, message: impl Into<String>, future: F) -> T
    where
        F: Future<Output = T>,
    {
        if !self.animated() {
            return future.await;
        }

        let message = message.into();
        let mut ticker = tokio::time::interval(Duration::from_millis(120));
        let mut future = std::pin::pin!(future);

        loop {
            tokio::select! {
                result = &mut future => {
                    self.spinner.clear();
                    return result;
                }
                _ = ticker.tick() => self.spinner.draw(&message),
            }
        }
    }
}

/// flattens an event into `message key=value ...`.
#[derive(Default)]
struct FieldCollector {
    message: String,
    fields: Vec<String>,
}

impl FieldCollector {
    fn push(&mut self, field: &Field, value: String) {
        if field.name() == "message" {
            self.message = value;
        } else {
            self.fields.push(format!("{}={value}", field.name()));
        }
    }

    fn into_line(self) -> String {
        if self.fields.is_empty() {
            return self.message;
        }
        format!("{} {}", self.message, self.fields.join(" "))
    }
}

impl Visit for FieldCollector {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.push(field, value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.push(field, format!("{value:?}"));
    }
}

/// forwards events of the plget crates to the cli logger as debug lines.
struct LoggerLayer {
    logger: Arc<CliLogger>,
}

impl<S: Subscriber> Layer<S> for LoggerLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = FieldCollector::default();
        event.record(&mut fields);
        self.logger.debug(event.metadata().target(), fields.into_line());
    }
}

fn logger_layer<S>(logger: Arc<CliLogger>) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let level = if logger.level == LogLevel::Debug {
        LevelFilter::DEBUG
    } else {
        LevelFilter::OFF
    };

    LoggerLayer { logger }.with_filter(Targets::new().with_target(LOG_TARGET_PREFIX, level))
}

pub fn init_tracing(logger: Arc<CliLogger>) {
    let subscriber = Registry::default().with(logger_layer(Arc::clone(&logger)));

    if let Err(err) = subscriber.try_init() {
        logger.debug(
            "logger",
            format!("failed to initialize tracing subscriber: {err}"),
        );
    }
}
