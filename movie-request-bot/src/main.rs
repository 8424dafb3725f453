use anyhow::Context as _;
use chat_flow::{AccessGuard, FlowRunner};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use movie_request_bot::{
    RadarrClient, Settings, TmdbClient, create_flow_runner, create_session_storage,
    telegram::{Poller, TelegramClient},
};

const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let settings = Settings::from_env().context("invalid configuration")?;

    let catalog = Arc::new(TmdbClient::new(
        settings.tmdb_api_key.clone(),
        settings.tmdb_base_url.clone(),
    )?);
    let acquisition = Arc::new(RadarrClient::new(
        settings.radarr_api_key.clone(),
        settings.radarr_url.clone(),
        settings.radarr_root_folder.clone(),
        settings.radarr_quality_profile_id,
    )?);
    let guard = AccessGuard::allow_only(settings.allowed_user_id.clone());
    info!(allowed_user_id = %guard.allowed_identity(), "Access restricted to a single user");

    let runner = create_flow_runner(catalog, acquisition, guard, create_session_storage())?;
    spawn_session_sweeper(runner.clone(), settings.session_ttl)?;

    let telegram = Arc::new(TelegramClient::new(
        &settings.telegram_api_url,
        &settings.bot_token,
    )?);
    let poller = Poller::new(telegram, runner);

    info!(radarr_url = %settings.radarr_url, "Movie request bot started");

    tokio::select! {
        _ = poller.run() => {}
        signal = tokio::signal::ctrl_c() => {
            signal.context("failed to listen for shutdown signal")?;
            info!("Shutdown signal received");
        }
    }

    Ok(())
}

fn init_tracing() {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "movie_request_bot=debug,chat_flow=debug".into());

    match log_format.as_str() {
        "pretty" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_target(true)
                        .with_level(true),
                )
                .init();
        }
    }
}

/// Periodically drop sessions nobody has touched within `ttl`.
fn spawn_session_sweeper(runner: FlowRunner, ttl: Duration) -> anyhow::Result<()> {
    let ttl = chrono::Duration::from_std(ttl).context("session ttl out of range")?;

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            match runner.purge_idle_sessions(ttl).await {
                Ok(0) => {}
                Ok(purged) => debug!(purged, "Purged idle sessions"),
                Err(e) => error!("Failed to purge idle sessions: {}", e),
            }
        }
    });

    Ok(())
}
