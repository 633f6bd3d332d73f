use cosmodeck_backend::config;
use cosmodeck_backend::module::fallbacks;
use cosmodeck_backend::module::loader::{Backoff, Fetcher, HttpFetcher, Loader, OfflineFetcher};
use cosmodeck_backend::module::scheduled::ScreenManager;
use cosmodeck_backend::module::screens::{ScreenContext, Screens};
use cosmodeck_backend::module::sim::{Clock, FastRandom, RandomSource, SystemClock};
use cosmodeck_backend::module::sources::{Sources, resolve_nasa_key};
use cosmodeck_backend::service::{self, AppState};

use anyhow::{Context, Result};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = config::read_config()?;

    // Initialize logging
    let _logging_guard = cosmodeck_backend::logging::init_logging(
        &config.log_dir,
        "cosmodeck-backend",
        &config.log_level,
    )?;

    tracing::info!("Cosmodeck Backend starting...");
    tracing::info!("Server will listen on {}", config.server_address());

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let random: Arc<dyn RandomSource> = Arc::new(FastRandom::new());

    let fallback_table = fallbacks::build_table(
        clock.clone(),
        random.clone(),
        config.fallback_overrides.as_deref(),
    )?;

    let fetcher: Arc<dyn Fetcher> = if config.offline {
        tracing::warn!("Offline mode: every resource is served from its fallback");
        Arc::new(OfflineFetcher)
    } else {
        Arc::new(HttpFetcher::new()?)
    };

    let loader = Loader::new(fetcher, Arc::new(fallback_table))
        .with_backoff(Backoff {
            base: config.loader.backoff(),
            jitter: config.loader.jitter(),
        })
        .with_random(random.clone());

    let nasa_api_key = resolve_nasa_key(config.nasa_api_key.as_deref());
    if nasa_api_key == cosmodeck_backend::module::sources::DEMO_KEY {
        tracing::warn!("Using NASA DEMO_KEY, expect tight rate limits");
    }
    let sources = Sources::new(nasa_api_key)
        .with_timeout(config.loader.timeout())
        .with_retries(config.loader.retries);

    let screens = Arc::new(Screens::build(&ScreenContext {
        loader: Arc::new(loader),
        sources,
        clock,
        random,
        polling: config.polling.clone(),
    }));

    // Activate configured screens
    let mut screen_manager = ScreenManager::new(screens.clone(), config.active_screens.clone());
    screen_manager.start_all().await?;

    let app = service::router(AppState::new(screens));
    let listener = tokio::net::TcpListener::bind(config.server_address())
        .await
        .with_context(|| format!("Failed to bind {}", config.server_address()))?;

    tracing::info!("HTTP server starting on {}", config.server_address());

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
            tracing::info!("Shutdown signal received");
        })
        .await?;

    screen_manager.shutdown().await;
    Ok(())
}
