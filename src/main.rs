use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use techingo::{api, clues::ClueConfig, state::AppState, types::GameConfig, ws};

const DEFAULT_PORT: u16 = 6574;

#[tokio::main]
async fn main() {
    // Load .env file if present (before any env var reads)
    if let Err(e) = dotenvy::dotenv() {
        // Not an error if .env doesn't exist, only log if it's a different issue
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "techingo=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Techingo...");

    let game_config = GameConfig::from_env();
    tracing::info!(
        "Reveal interval {}s, {} points per mark, {} bonus for bingo",
        game_config.reveal_interval_secs,
        game_config.mark_points,
        game_config.win_bonus
    );

    // Initialize clue providers
    let clue_manager = match ClueConfig::from_env().build_manager() {
        Ok(manager) => {
            tracing::info!(
                "Clue providers initialized: {:?}",
                manager.provider_names()
            );
            Some(manager)
        }
        Err(e) => {
            tracing::warn!(
                "Failed to initialize clue providers: {}. Games need explicit clue lists.",
                e
            );
            None
        }
    };

    let state = Arc::new(AppState::with_config(game_config, clue_manager));

    let app = Router::new()
        .route("/ws", get(ws::ws_handler))
        .merge(api::routes())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on http://{}", addr);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
    }
}
