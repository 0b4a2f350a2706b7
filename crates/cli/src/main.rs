use std::process::ExitCode;

use clap::Parser;

use crate::app::*;
use crate::logger::*;

mod app;
mod args;
mod constants;
mod logger;
mod utils;

#[tokio::main]
async fn main() -> ExitCode {
    let app = App::new(Cli::parse());
    init_tracing(app.logger());
    app.run().await
}
