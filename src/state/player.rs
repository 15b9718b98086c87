use super::*;
use crate::bingo::generate_ticket;
use crate::protocol::{PlayerSummary, PlayerView};
use rand::Rng;

/// Upper-case base-36 alphabet for join codes
const CODE_CHARS: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const CODE_LENGTH: usize = 6;

/// Generate a random join code (6 upper-case base-36 characters)
pub fn generate_game_code() -> String {
    let mut rng = rand::rng();
    (0..CODE_LENGTH)
        .map(|_| CODE_CHARS[rng.random_range(0..CODE_CHARS.len())] as char)
        .collect()
}

/// Codes are typed by humans: ignore surrounding whitespace and case
fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

impl AppState {
    /// Join the current session. Works in any lifecycle stage while a session exists.
    pub async fn join_game(&self, name: &str, code: &str) -> Result<Player, GameError> {
        self.join_game_with_view(name, code)
            .await
            .map(|(player, _)| player)
    }

    /// Join and render the joiner's private view from the same snapshot
    pub async fn join_game_with_view(
        &self,
        name: &str,
        code: &str,
    ) -> Result<(Player, PlayerView), GameError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(GameError::InvalidName);
        }

        let mut slot = self.game.write().await;
        let game = slot.as_mut().ok_or(GameError::NoActiveGame)?;

        if normalize_code(code) != game.game_code {
            tracing::debug!("Rejected join for '{}': wrong code", name);
            return Err(GameError::InvalidCode);
        }

        let player = Player {
            id: ulid::Ulid::new().to_string(),
            name: name.to_string(),
            score: 0,
            ticket: generate_ticket(&game.clues, game.grid_size, &mut rand::rng()),
            can_claim_bingo: false,
        };
        game.players.push(player.clone());
        game.version += 1;

        tracing::info!(
            "Player {} ({}) joined game {} ({} players)",
            player.name,
            player.id,
            game.game_code,
            game.players.len()
        );
        self.broadcast_to_all(ServerMessage::PlayerJoined {
            player: PlayerSummary::from(&player),
        });

        let view = PlayerView::new(game, &player);
        Ok((player, view))
    }

    /// Remove a player from the roster. Tearing down an emptied session is
    /// the caller's decision, see [`LeaveOutcome::roster_empty`].
    pub async fn remove_player(&self, player_id: &str) -> Result<LeaveOutcome, GameError> {
        let mut slot = self.game.write().await;
        self.remove_locked(&mut slot, player_id)
    }

    /// Remove a player and, if that empties the roster, discard the session
    /// in the same critical section. Nothing can join an emptied session
    /// that is about to go away.
    pub async fn leave_game(&self, player_id: &str) -> Result<LeaveOutcome, GameError> {
        let mut slot = self.game.write().await;
        let outcome = self.remove_locked(&mut slot, player_id)?;
        if outcome.roster_empty() {
            tracing::info!("Last player left, discarding game");
            self.discard_locked(&mut slot);
        }
        Ok(outcome)
    }

    fn remove_locked(
        &self,
        slot: &mut Option<Game>,
        player_id: &str,
    ) -> Result<LeaveOutcome, GameError> {
        let game = slot.as_mut().ok_or(GameError::NoActiveGame)?;

        let position = game
            .players
            .iter()
            .position(|p| p.id == player_id)
            .ok_or(GameError::PlayerNotFound)?;
        let player = game.players.remove(position);
        game.version += 1;

        tracing::info!(
            "Player {} ({}) left game {}",
            player.name,
            player.id,
            game.game_code
        );
        self.broadcast_to_all(ServerMessage::PlayerLeft {
            player_id: player.id.clone(),
            remaining: game.players.len(),
        });

        Ok(LeaveOutcome {
            player,
            remaining: game.players.len(),
        })
    }

    /// Get a player
    pub async fn get_player(&self, player_id: &str) -> Option<Player> {
        self.game
            .read()
            .await
            .as_ref()
            .and_then(|g| g.player(player_id).cloned())
    }

    /// Private view of a player's own ticket
    pub async fn player_view(&self, player_id: &str) -> Option<PlayerView> {
        let game = self.game.read().await;
        let game = game.as_ref()?;
        let player = game.player(player_id)?;
        Some(PlayerView::new(game, player))
    }
}
