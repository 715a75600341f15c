// aws-federated-headless-login - headless IAM Identity Center device sign-in

mod browser;
mod cli;
mod config;
mod env;
mod error;
mod extractor;
mod models;
mod signal;
mod status;
mod store;

use clap::Parser;

#[tokio::main]
async fn main() {
    // Parse CLI arguments first to get verbose flag
    let args = cli::Cli::parse();

    // stdout carries the status line, so logs go to stderr
    let log_level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(log_level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    signal::spawn_pipe_listener();

    let code = match cli::execute(args).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    };

    std::process::exit(code);
}
