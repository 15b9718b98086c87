//! Player message handlers
//!
//! Handlers for joining, marking, claiming and leaving.

use super::handlers::error_message;
use crate::protocol::ServerMessage;
use crate::state::{AppState, ClaimResult, GameError, MarkResult};
use crate::types::{CellId, PlayerId};
use std::sync::Arc;

pub async fn handle_join_game(
    state: &Arc<AppState>,
    name: String,
    code: String,
) -> Option<ServerMessage> {
    match state.join_game_with_view(&name, &code).await {
        Ok((_, player)) => Some(ServerMessage::Joined { player }),
        Err(e) => Some(error_message(&e)),
    }
}

pub async fn handle_mark_cell(
    state: &Arc<AppState>,
    player_id: PlayerId,
    cell_id: CellId,
) -> Option<ServerMessage> {
    match state.mark_cell(&player_id, cell_id).await {
        // Send the refreshed ticket back; the score change is broadcast
        MarkResult::Marked { .. } => state
            .player_view(&player_id)
            .await
            .map(|player| ServerMessage::PlayerState { player }),
        MarkResult::Ignored {
            reason,
            can_claim_bingo,
        } => Some(ServerMessage::MarkIgnored {
            cell_id,
            reason,
            can_claim_bingo,
        }),
        MarkResult::UnknownPlayer => Some(error_message(&GameError::PlayerNotFound)),
        MarkResult::NotInProgress => Some(ServerMessage::Error {
            code: "GAME_NOT_IN_PROGRESS".to_string(),
            msg: "Cells can only be marked while the game is running".to_string(),
        }),
        MarkResult::NoActiveGame => Some(error_message(&GameError::NoActiveGame)),
    }
}

pub async fn handle_claim_bingo(
    state: &Arc<AppState>,
    player_id: PlayerId,
) -> Option<ServerMessage> {
    let reason = match state.claim_bingo(&player_id).await {
        // GameFinished is broadcast to everyone
        ClaimResult::Won { .. } => return None,
        ClaimResult::NotEligible => "No winning pattern on your ticket yet",
        ClaimResult::UnknownPlayer => "You are not part of this game",
        ClaimResult::AlreadyFinished => "The game is already over",
        ClaimResult::NoActiveGame => return Some(error_message(&GameError::NoActiveGame)),
    };
    Some(ServerMessage::ClaimRejected {
        reason: reason.to_string(),
    })
}

pub async fn handle_leave_game(
    state: &Arc<AppState>,
    player_id: PlayerId,
) -> Option<ServerMessage> {
    // The session goes away with its last player
    match state.leave_game(&player_id).await {
        Ok(_) => None,
        Err(e) => Some(error_message(&e)),
    }
}
