use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gamechanger::{config::AppConfig, console, state::AppState};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Load .env file if present (before any env var reads)
    if let Err(e) = dotenvy::dotenv() {
        // Not an error if .env doesn't exist, only log if it's a different issue
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    // Logs go to stderr; stdout is the stage display
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gamechanger=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting Game Changer scorekeeper...");

    let config = AppConfig::from_env();
    let state = match AppState::from_config(config) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("Failed to open data store: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = console::run(state).await {
        tracing::error!("Console failed: {}", e);
        std::process::exit(1);
    }
}
