//! `breathpace` - guided breathing sessions in the terminal

use clap::Parser;
use tokio_util::sync::CancellationToken;

use breathpace::cli::args::Cli;
use breathpace::cli::commands;
use breathpace::error::ExitCode;
use breathpace::observability::init_logging;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if !cli.quiet {
        init_logging(cli.log_format, cli.verbose, cli.color);
    }

    // First signal stops the session; a second one forces exit.
    let shutdown = CancellationToken::new();
    let token = shutdown.clone();
    tokio::spawn(async move {
        wait_for_signal().await;
        token.cancel();

        eprintln!("\nStopping session... (press Ctrl+C again to force)");

        wait_for_signal().await;
        std::process::exit(ExitCode::INTERRUPTED);
    });

    let result = commands::dispatch(cli, shutdown).await;

    match result {
        Ok(()) => std::process::exit(ExitCode::SUCCESS),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}

/// Resolves on Ctrl+C, or on SIGTERM where supported.
async fn wait_for_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = sigterm.recv() => {}
            }
            return;
        }
    }
    let _ = tokio::signal::ctrl_c().await;
}
