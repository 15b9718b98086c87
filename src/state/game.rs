use super::*;
use crate::bingo::required_cells;
use crate::clues::sanitize_clues;
use crate::protocol::{FinishReason, PlayerSummary, PublicGame, RevealedClue};
use crate::scheduler::ClueScheduler;

/// Append the next clue in pool order. Returns None when the pool is exhausted.
fn advance_clue(game: &mut Game) -> Option<(Clue, usize)> {
    if !game.has_more_clues() {
        return None;
    }
    let index = game.current_clue_index.map_or(0, |i| i + 1);
    let clue = game.clues[index].clone();
    game.current_clue_index = Some(index);
    game.revealed_clues.push(clue.clone());
    game.time_until_next_clue = game.config.reveal_interval_secs;
    game.version += 1;
    Some((clue, index))
}

fn clue_revealed_message(game: &Game, clue: &Clue, index: usize) -> ServerMessage {
    ServerMessage::ClueRevealed {
        clue: RevealedClue::from(clue),
        index,
        total: game.clues.len(),
        time_until_next_clue: game.time_until_next_clue,
    }
}

impl AppState {
    /// Validate topic and grid size before any clue work happens
    fn validate_setup(topic: &str, grid_size: usize) -> Result<(), GameError> {
        if topic.trim().is_empty() {
            return Err(GameError::InvalidTopic);
        }
        if !(MIN_GRID_SIZE..=MAX_GRID_SIZE).contains(&grid_size) {
            return Err(GameError::UnsupportedGridSize(grid_size));
        }
        Ok(())
    }

    /// Create a new session in the lobby from a ready clue pool.
    /// Any previous session is torn down first.
    pub async fn create_game(
        &self,
        clues: Vec<ClueDraft>,
        topic: &str,
        grid_size: usize,
    ) -> Result<Game, GameError> {
        Self::validate_setup(topic, grid_size)?;

        // Repeated answers or texts would put the same clue on a ticket twice
        let clues = sanitize_clues(clues);
        let required = required_cells(grid_size);
        if clues.len() < required {
            return Err(GameError::InsufficientClues {
                required,
                got: clues.len(),
            });
        }

        let clues: Vec<Clue> = clues
            .into_iter()
            .enumerate()
            .map(|(i, draft)| Clue {
                id: i as ClueId,
                answer: draft.answer,
                text: draft.text,
            })
            .collect();

        let game = Game {
            game_code: generate_game_code(),
            topic: topic.trim().to_string(),
            grid_size,
            status: GameStatus::Lobby,
            players: Vec::new(),
            clues,
            revealed_clues: Vec::new(),
            current_clue_index: None,
            time_until_next_clue: self.config.reveal_interval_secs,
            winner: None,
            config: self.config.clone(),
            version: 1,
            timer_epoch: 0,
        };

        let mut slot = self.game.write().await;
        self.cancel_scheduler();
        *slot = Some(game.clone());
        drop(slot);

        tracing::info!(
            "Created game {} on '{}' ({}x{}, {} clues)",
            game.game_code,
            game.topic,
            grid_size,
            grid_size,
            game.clues.len()
        );
        self.broadcast_to_all(ServerMessage::GameState {
            game: PublicGame::from(&game),
        });
        Ok(game)
    }

    /// Generate a clue pool for the topic and create the session from it.
    /// No session is created if generation fails or comes back short.
    pub async fn generate_game(&self, topic: &str, grid_size: usize) -> Result<Game, GameError> {
        Self::validate_setup(topic, grid_size)?;

        let manager = self
            .clues
            .as_ref()
            .ok_or(GameError::ClueGenerationUnavailable)?;
        let (provider, clues) = manager
            .generate(topic.trim(), required_cells(grid_size))
            .await?;

        tracing::info!("Clue pool for '{}' provided by {}", topic.trim(), provider);
        self.create_game(clues, topic, grid_size).await
    }

    /// Get current game
    pub async fn get_game(&self) -> Option<Game> {
        self.game.read().await.clone()
    }

    /// Public view of the session, safe to send to anyone
    pub async fn public_snapshot(&self) -> Option<PublicGame> {
        self.game.read().await.as_ref().map(PublicGame::from)
    }

    /// Move from the lobby into play: reveal the first clue right away and start both timers.
    pub async fn start_game(&self) -> Result<StartResult, GameError> {
        let mut slot = self.game.write().await;
        let game = slot.as_mut().ok_or(GameError::NoActiveGame)?;

        if game.status != GameStatus::Lobby {
            tracing::debug!("Ignoring start: game is {:?}", game.status);
            return Ok(StartResult::AlreadyStarted);
        }

        let (first_clue, index) =
            advance_clue(game).ok_or(GameError::InsufficientClues {
                required: required_cells(game.grid_size),
                got: 0,
            })?;

        game.status = GameStatus::InProgress;
        let epoch = self.next_epoch();
        game.timer_epoch = epoch;

        self.install_scheduler(ClueScheduler::spawn(
            self.clone(),
            epoch,
            game.config.reveal_interval(),
        ));

        tracing::info!(
            "Game {} started with {} players",
            game.game_code,
            game.players.len()
        );
        self.broadcast_to_all(ServerMessage::GameState {
            game: PublicGame::from(&*game),
        });
        self.broadcast_to_all(clue_revealed_message(game, &first_clue, index));

        Ok(StartResult::Started { first_clue })
    }

    /// Reveal-cadence tick. Reveals the next clue, or finishes the game once
    /// the pool is exhausted.
    pub async fn reveal_next_clue(&self, epoch: u64) -> RevealOutcome {
        let mut slot = self.game.write().await;
        let Some(game) = slot.as_mut() else {
            return RevealOutcome::Stale;
        };
        if game.timer_epoch != epoch || game.status != GameStatus::InProgress {
            return RevealOutcome::Stale;
        }

        match advance_clue(game) {
            Some((clue, index)) => {
                tracing::debug!("Revealed clue {}/{}", index + 1, game.clues.len());
                self.broadcast_to_all(clue_revealed_message(game, &clue, index));
                RevealOutcome::Revealed { clue, index }
            }
            None => {
                let winner = self.finish_exhausted(game);
                RevealOutcome::Finished { winner }
            }
        }
    }

    /// Display countdown tick, floors at zero. No state transition, and
    /// `version` is left alone: the countdown is display-only.
    pub async fn tick_countdown(&self, epoch: u64) -> CountdownOutcome {
        let mut slot = self.game.write().await;
        let Some(game) = slot.as_mut() else {
            return CountdownOutcome::Stale;
        };
        if game.timer_epoch != epoch || game.status != GameStatus::InProgress {
            return CountdownOutcome::Stale;
        }

        game.time_until_next_clue = game.time_until_next_clue.saturating_sub(1);
        self.broadcast_to_all(ServerMessage::Countdown {
            time_until_next_clue: game.time_until_next_clue,
        });
        CountdownOutcome::Ticked(game.time_until_next_clue)
    }

    /// Finish because no clues remain. The leader (earliest joiner on ties) wins.
    fn finish_exhausted(&self, game: &mut Game) -> Option<Player> {
        game.status = GameStatus::Finished;
        game.time_until_next_clue = 0;
        game.winner = game.leading_player().cloned();
        game.version += 1;

        tracing::info!(
            "Game {} finished: clues exhausted, winner {:?}",
            game.game_code,
            game.winner.as_ref().map(|w| &w.name)
        );
        self.broadcast_to_all(ServerMessage::GameFinished {
            reason: FinishReason::CluesExhausted,
            winner: game.winner.as_ref().map(PlayerSummary::from),
            patterns: Vec::new(),
            game: PublicGame::from(&*game),
        });

        // Last step, no await follows: this may run on the reveal timer itself
        self.cancel_scheduler();
        game.winner.clone()
    }

    /// Tear the session down: cancel timers and drop all state. Safe to call repeatedly.
    pub async fn discard_game(&self) {
        let mut slot = self.game.write().await;
        self.discard_locked(&mut slot);
    }

    /// Discard while already holding the write lock
    pub(super) fn discard_locked(&self, slot: &mut Option<Game>) {
        self.cancel_scheduler();
        if let Some(game) = slot.take() {
            tracing::info!("Discarded game {}", game.game_code);
            self.broadcast_to_all(ServerMessage::GameDiscarded);
        }
    }
}
