use anyhow::Result;
use clap::Parser;
use daily_prep::cli::{handle_command, Cli};
use daily_prep::config::ProcessEnv;
use std::process::ExitCode;
use tracing::{error, info};

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_span_list(false),
            )
            .init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

async fn run() -> Result<bool> {
    let cli = Cli::parse();
    handle_command(cli, &ProcessEnv).await
}

#[tokio::main]
async fn main() -> ExitCode {
    // .env is optional; real environment variables win
    dotenvy::dotenv().ok();
    init_logging();

    match run().await {
        Ok(true) => {
            info!("Run finished");
            ExitCode::SUCCESS
        }
        Ok(false) => {
            error!("Run finished without delivering its email");
            ExitCode::FAILURE
        }
        Err(e) => {
            error!("Run failed: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
