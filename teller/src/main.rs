mod browse;
mod cli;
mod client;
mod commands;
mod error;
mod output;
mod session;
mod term;
mod transfers;

use clap::Parser;
use cli::Command;
use tokio_util::sync::CancellationToken;
use tracing::info;

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    // Initialize tracing
    let filter = cli
        .log_level
        .parse::<tracing_subscriber::filter::LevelFilter>()
        .unwrap_or(tracing_subscriber::filter::LevelFilter::INFO);

    tracing_subscriber::fmt()
        .with_max_level(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let _ = dotenvy::dotenv(); // load .env if present

    // Shared cancellation token + signal handlers.
    let cancel = setup_signal_handlers();

    let result = match cli.command {
        Command::Login(args) => commands::login(args, cli.api_url).await,
        Command::Logout => commands::logout().await,
        Command::Whoami => commands::whoami(cli.api_url).await,
        Command::Register(args) => commands::register(args, cli.api_url).await,
        Command::Users(args) => commands::users(args, cli.api_url).await,
        Command::Browse(args) => browse::run_browser(args, cli.api_url, cancel).await,
        Command::History(args) => transfers::run_history(args, cli.api_url, cancel).await,
        Command::Totals(args) => transfers::run_totals(args, cli.api_url, cancel).await,
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "command failed");
        std::process::exit(1);
    }
}

/// Register SIGINT and SIGTERM handlers that trigger the returned token.
fn setup_signal_handlers() -> CancellationToken {
    let cancel = CancellationToken::new();

    let cancel_clone = cancel.clone();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        info!("received SIGINT, shutting down");
        cancel_clone.cancel();
    });

    #[cfg(unix)]
    {
        let cancel_clone = cancel.clone();
        tokio::spawn(async move {
            let mut sig = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("failed to register SIGTERM handler");
            sig.recv().await;
            info!("received SIGTERM, shutting down");
            cancel_clone.cancel();
        });
    }

    cancel
}
