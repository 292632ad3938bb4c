// Card dealer entry point.
//
// Startup sequence:
// 1. Initialize tracing (stdout)
// 2. Load config
// 3. Load the card dataset (fatal if missing or empty)
// 4. Open the game database
// 5. Build the router
// 6. Serve until Ctrl+C

use std::sync::Arc;

use anyhow::Context;
use deckhand_core::config;
use deckhand_core::db::Database;
use deckhand_core::deck;
use deckhand_core::games::GameStore;
use deckhand_server::routes::create_router;
use deckhand_server::state::AppState;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing
    init_tracing()?;
    info!("Deckhand starting up");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: bind={}, cards={}, database={}",
        config.bind,
        config.cards_path.display(),
        config.database_url
    );

    // 3. Load the card dataset
    let deck = deck::load_deck(&config.cards_path).context("failed to load card dataset")?;
    info!(
        "Loaded {} cards across {} suits",
        deck.card_count(),
        deck.suit_count()
    );

    // 4. Open the game database
    let db_path = config.database.as_open_arg();
    let db = Database::open(&db_path).context("failed to open database")?;
    info!("Database opened at {db_path}");

    // 5. Build the router
    if !config.frontend_dir.is_dir() {
        warn!(
            "Frontend directory {} not found; / will return 404",
            config.frontend_dir.display()
        );
    }
    let store = GameStore::new(Arc::new(deck), db);
    let app = create_router(AppState::new(store, config.frontend_dir.clone()));

    // 6. Serve
    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    info!("Listening on http://{}", config.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Deckhand shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl+C: {e}");
        std::future::pending::<()>().await;
    }
    info!("Received Ctrl+C, shutting down...");
}

fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("deckhand=info,tower_http=info,warn")),
        )
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
