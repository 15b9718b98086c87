mod game;
mod mark;
mod player;

use crate::bingo::Pattern;
use crate::clues::{ClueError, ClueManager};
use crate::protocol::ServerMessage;
use crate::scheduler::ClueScheduler;
use crate::types::*;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{broadcast, RwLock};

pub use player::generate_game_code;

/// Grid sizes a session can be created with
pub const MIN_GRID_SIZE: usize = 3;
pub const MAX_GRID_SIZE: usize = 7;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub game: Arc<RwLock<Option<Game>>>,
    pub config: GameConfig,
    /// Clue generation collaborator (None = clues must be supplied by the admin)
    pub clues: Option<Arc<ClueManager>>,
    /// Broadcast channel for sending messages to all connected clients
    pub broadcast: broadcast::Sender<ServerMessage>,
    scheduler: Arc<Mutex<Option<ClueScheduler>>>,
    epochs: Arc<AtomicU64>,
}

/// Validation rejections surfaced to the caller. State is unchanged when one is returned.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("No active game")]
    NoActiveGame,

    #[error("Invalid game code")]
    InvalidCode,

    #[error("Topic must not be empty")]
    InvalidTopic,

    #[error("Player name must not be empty")]
    InvalidName,

    #[error("Grid size {0} is not supported (expected 3 to 7)")]
    UnsupportedGridSize(usize),

    #[error("Not enough clues for this grid: need {required}, got {got}")]
    InsufficientClues { required: usize, got: usize },

    #[error("Player not found")]
    PlayerNotFound,

    #[error("Clue generation unavailable: no providers configured")]
    ClueGenerationUnavailable,

    #[error("Clue generation failed: {0}")]
    ClueGeneration(#[from] ClueError),
}

impl GameError {
    /// Stable code for protocol error messages
    pub fn code(&self) -> &'static str {
        match self {
            GameError::NoActiveGame => "NO_ACTIVE_GAME",
            GameError::InvalidCode => "INVALID_CODE",
            GameError::InvalidTopic => "INVALID_TOPIC",
            GameError::InvalidName => "INVALID_NAME",
            GameError::UnsupportedGridSize(_) => "UNSUPPORTED_GRID_SIZE",
            GameError::InsufficientClues { .. } => "INSUFFICIENT_CLUES",
            GameError::PlayerNotFound => "PLAYER_NOT_FOUND",
            GameError::ClueGenerationUnavailable | GameError::ClueGeneration(_) => {
                "CLUE_GENERATION_FAILED"
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StartResult {
    Started { first_clue: Clue },
    /// The game already left the lobby; timers and progress are untouched
    AlreadyStarted,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RevealOutcome {
    Revealed { clue: Clue, index: usize },
    /// Pool exhausted: the session moved to Finished
    Finished { winner: Option<Player> },
    /// The timer belongs to a session that is gone, finished, or restarted
    Stale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownOutcome {
    Ticked(u32),
    Stale,
}

/// Why a mark attempt changed nothing
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MarkRejection {
    UnknownCell,
    AlreadyMarked,
    FreeSpace,
    NotRevealed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MarkResult {
    Marked { score: u32, can_claim_bingo: bool },
    Ignored {
        reason: MarkRejection,
        can_claim_bingo: bool,
    },
    UnknownPlayer,
    NotInProgress,
    NoActiveGame,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClaimResult {
    Won {
        winner: Player,
        patterns: Vec<Pattern>,
    },
    NotEligible,
    UnknownPlayer,
    AlreadyFinished,
    NoActiveGame,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LeaveOutcome {
    pub player: Player,
    pub remaining: usize,
}

impl LeaveOutcome {
    /// The departing player was the last one in the roster
    pub fn roster_empty(&self) -> bool {
        self.remaining == 0
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::with_config(GameConfig::default(), None)
    }

    pub fn with_config(config: GameConfig, clues: Option<ClueManager>) -> Self {
        let (tx, _rx) = broadcast::channel(100);
        Self {
            game: Arc::new(RwLock::new(None)),
            config,
            clues: clues.map(Arc::new),
            broadcast: tx,
            scheduler: Arc::new(Mutex::new(None)),
            epochs: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Broadcast a message to all connected clients
    pub fn broadcast_to_all(&self, msg: ServerMessage) {
        // Ignore send errors (no receivers connected is fine)
        let _ = self.broadcast.send(msg);
    }

    fn next_epoch(&self) -> u64 {
        self.epochs.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn install_scheduler(&self, scheduler: ClueScheduler) {
        let mut slot = self.scheduler.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = slot.replace(scheduler) {
            previous.cancel();
        }
    }

    /// Abort both timers if any are running. Never awaits, so it is safe to
    /// call as the last step of a timer's own tick.
    fn cancel_scheduler(&self) {
        let taken = self
            .scheduler
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(scheduler) = taken {
            tracing::debug!("Cancelling clue timers (epoch {})", scheduler.epoch());
            scheduler.cancel();
        }
    }

    /// Whether timers are currently registered
    pub fn timers_active(&self) -> bool {
        self.scheduler
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
