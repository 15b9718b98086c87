//! Session-wide commands: create, start, reset and snapshots.
//! Auth is out of scope, so any connection may send these.

use super::handlers::error_message;
use crate::protocol::{PublicGame, ServerMessage};
use crate::state::{AppState, GameError, StartResult};
use crate::types::{ClueDraft, PlayerId};
use std::sync::Arc;

pub async fn handle_create_game(
    state: &Arc<AppState>,
    topic: String,
    grid_size: usize,
    clues: Option<Vec<ClueDraft>>,
) -> Option<ServerMessage> {
    let result = match clues {
        Some(clues) => state.create_game(clues, &topic, grid_size).await,
        None => state.generate_game(&topic, grid_size).await,
    };

    match result {
        Ok(game) => Some(ServerMessage::GameCreated {
            game: PublicGame::from(&game),
        }),
        Err(e) => {
            tracing::warn!("Failed to create game on '{}': {}", topic, e);
            Some(error_message(&e))
        }
    }
}

pub async fn handle_start_game(state: &Arc<AppState>) -> Option<ServerMessage> {
    match state.start_game().await {
        // Everyone, including the caller, gets the broadcast
        Ok(StartResult::Started { .. }) => None,
        Ok(StartResult::AlreadyStarted) => state
            .public_snapshot()
            .await
            .map(|game| ServerMessage::GameState { game }),
        Err(e) => Some(error_message(&e)),
    }
}

pub async fn handle_reset_game(state: &Arc<AppState>) -> Option<ServerMessage> {
    tracing::info!("Resetting game");
    state.discard_game().await;
    None
}

pub async fn handle_get_state(
    state: &Arc<AppState>,
    player_id: Option<PlayerId>,
) -> Option<ServerMessage> {
    if let Some(player_id) = player_id {
        return Some(match state.player_view(&player_id).await {
            Some(player) => ServerMessage::PlayerState { player },
            None => error_message(&GameError::PlayerNotFound),
        });
    }

    Some(match state.public_snapshot().await {
        Some(game) => ServerMessage::GameState { game },
        None => error_message(&GameError::NoActiveGame),
    })
}
