use super::*;
use crate::bingo::{has_winning_pattern, winning_patterns};
use crate::protocol::{FinishReason, PlayerSummary, PublicGame};

/// Check a mark against the ticket and the revealed clues, without mutating anything
fn check_mark(game: &Game, cell: Option<&Cell>) -> Result<(), MarkRejection> {
    let cell = cell.ok_or(MarkRejection::UnknownCell)?;
    if cell.is_free_space {
        return Err(MarkRejection::FreeSpace);
    }
    if cell.marked {
        return Err(MarkRejection::AlreadyMarked);
    }
    match cell.clue_id {
        Some(clue_id) if game.is_revealed(clue_id) => Ok(()),
        _ => Err(MarkRejection::NotRevealed),
    }
}

impl AppState {
    /// Mark a cell on a player's ticket. Eligibility to claim is refreshed
    /// on every attempt, whether or not the mark itself lands.
    pub async fn mark_cell(&self, player_id: &str, cell_id: CellId) -> MarkResult {
        let mut slot = self.game.write().await;
        let Some(game) = slot.as_mut() else {
            return MarkResult::NoActiveGame;
        };
        if game.status != GameStatus::InProgress {
            return MarkResult::NotInProgress;
        }

        let Some(player) = game.player(player_id) else {
            return MarkResult::UnknownPlayer;
        };
        let verdict = check_mark(game, player.ticket.cell(cell_id));
        let mark_points = game.config.mark_points;

        let Some(player) = game.player_mut(player_id) else {
            return MarkResult::UnknownPlayer;
        };
        if verdict.is_ok() {
            if let Some(cell) = player.ticket.cell_mut(cell_id) {
                cell.marked = true;
            }
            player.score = player.score.saturating_add(mark_points);
        }
        player.can_claim_bingo = has_winning_pattern(&player.ticket);

        let score = player.score;
        let can_claim_bingo = player.can_claim_bingo;

        match verdict {
            Ok(()) => {
                game.version += 1;
                tracing::debug!(
                    "Player {} marked cell {} (score {}, can claim: {})",
                    player_id,
                    cell_id,
                    score,
                    can_claim_bingo
                );
                self.broadcast_to_all(ServerMessage::CellMarked {
                    player_id: player_id.to_string(),
                    cell_id,
                    score,
                });
                MarkResult::Marked {
                    score,
                    can_claim_bingo,
                }
            }
            Err(reason) => {
                tracing::debug!(
                    "Ignored mark of cell {} by {}: {:?}",
                    cell_id,
                    player_id,
                    reason
                );
                MarkResult::Ignored {
                    reason,
                    can_claim_bingo,
                }
            }
        }
    }

    /// Claim a win. Only a player whose ticket currently holds a winning
    /// pattern can end the game; any other claim changes nothing.
    pub async fn claim_bingo(&self, player_id: &str) -> ClaimResult {
        let mut slot = self.game.write().await;
        let Some(game) = slot.as_mut() else {
            return ClaimResult::NoActiveGame;
        };
        if game.status == GameStatus::Finished {
            return ClaimResult::AlreadyFinished;
        }

        let win_bonus = game.config.win_bonus;
        let Some(player) = game.player_mut(player_id) else {
            return ClaimResult::UnknownPlayer;
        };
        if !player.can_claim_bingo {
            tracing::debug!("Rejected bingo claim from {}", player.name);
            return ClaimResult::NotEligible;
        }

        player.score = player.score.saturating_add(win_bonus);
        let winner = player.clone();
        let patterns = winning_patterns(&winner.ticket);

        game.status = GameStatus::Finished;
        game.time_until_next_clue = 0;
        game.winner = Some(winner.clone());
        game.version += 1;
        self.cancel_scheduler();

        tracing::info!(
            "Game {} won by {} with {} points ({:?})",
            game.game_code,
            winner.name,
            winner.score,
            patterns
        );
        self.broadcast_to_all(ServerMessage::GameFinished {
            reason: FinishReason::Bingo,
            winner: Some(PlayerSummary::from(&winner)),
            patterns: patterns.clone(),
            game: PublicGame::from(&*game),
        });

        ClaimResult::Won { winner, patterns }
    }
}
