//! WebSocket message dispatch
//!
//! This module provides the main entry point for handling client messages.
//! Session-wide commands live in `admin`, per-player commands in `player`.

use crate::protocol::{ClientMessage, ServerMessage};
use crate::state::{AppState, GameError};
use std::sync::Arc;

use super::{admin, player};

/// Convert a rejected command into an error message for the caller only
pub(super) fn error_message(err: &GameError) -> ServerMessage {
    ServerMessage::Error {
        code: err.code().to_string(),
        msg: err.to_string(),
    }
}

/// Handle client messages and return optional response
pub async fn handle_message(msg: ClientMessage, state: &Arc<AppState>) -> Option<ServerMessage> {
    match msg {
        // Session commands
        ClientMessage::CreateGame {
            topic,
            grid_size,
            clues,
        } => admin::handle_create_game(state, topic, grid_size, clues).await,

        ClientMessage::StartGame => admin::handle_start_game(state).await,

        ClientMessage::ResetGame => admin::handle_reset_game(state).await,

        ClientMessage::GetState { player_id } => {
            admin::handle_get_state(state, player_id).await
        }

        // Player commands
        ClientMessage::JoinGame { name, code } => {
            player::handle_join_game(state, name, code).await
        }

        ClientMessage::MarkCell { player_id, cell_id } => {
            player::handle_mark_cell(state, player_id, cell_id).await
        }

        ClientMessage::ClaimBingo { player_id } => {
            player::handle_claim_bingo(state, player_id).await
        }

        ClientMessage::LeaveGame { player_id } => {
            player::handle_leave_game(state, player_id).await
        }
    }
}
