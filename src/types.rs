use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Opaque ID types for type safety
pub type PlayerId = String;
pub type ClueId = u32;
pub type CellId = usize;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum GameStatus {
    Lobby,
    InProgress,
    Finished,
}

/// A clue as delivered by the clue generator, before it joins a pool
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClueDraft {
    pub answer: String,
    pub text: String,
}

impl ClueDraft {
    pub fn new(answer: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            text: text.into(),
        }
    }
}

/// A clue in the session pool. `id` is assigned once when the pool is created
/// and is what tickets and reveal matching refer to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Clue {
    pub id: ClueId,
    pub answer: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cell {
    pub id: CellId,
    pub clue_id: Option<ClueId>,
    pub marked: bool,
    pub is_free_space: bool,
}

impl Cell {
    pub fn free_space(id: CellId) -> Self {
        Self {
            id,
            clue_id: None,
            marked: true,
            is_free_space: true,
        }
    }

    pub fn with_clue(id: CellId, clue_id: ClueId) -> Self {
        Self {
            id,
            clue_id: Some(clue_id),
            marked: false,
            is_free_space: false,
        }
    }
}

/// A player's bingo grid. `None` cells only appear when the ticket was built
/// from a pool that was too small.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ticket {
    pub rows: Vec<Vec<Option<Cell>>>,
}

impl Ticket {
    pub fn size(&self) -> usize {
        self.rows.len()
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.rows.iter().flatten().flatten()
    }

    pub fn cell(&self, id: CellId) -> Option<&Cell> {
        self.cells().find(|c| c.id == id)
    }

    pub fn cell_mut(&mut self, id: CellId) -> Option<&mut Cell> {
        self.rows
            .iter_mut()
            .flatten()
            .flatten()
            .find(|c| c.id == id)
    }

    pub fn is_marked(&self, row: usize, col: usize) -> bool {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .and_then(|c| c.as_ref())
            .is_some_and(|c| c.marked)
    }

    /// True when every coordinate holds a cell
    pub fn is_complete(&self) -> bool {
        self.rows.iter().flatten().all(Option::is_some)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub score: u32,
    pub ticket: Ticket,
    pub can_claim_bingo: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameConfig {
    pub reveal_interval_secs: u32,
    pub mark_points: u32,
    pub win_bonus: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            reveal_interval_secs: 10,
            mark_points: 10,
            win_bonus: 100,
        }
    }
}

impl GameConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            reveal_interval_secs: env_u32("BINGO_REVEAL_INTERVAL_SECS")
                .filter(|secs| *secs > 0)
                .unwrap_or(defaults.reveal_interval_secs),
            mark_points: env_u32("BINGO_MARK_POINTS").unwrap_or(defaults.mark_points),
            win_bonus: env_u32("BINGO_WIN_BONUS").unwrap_or(defaults.win_bonus),
        }
    }

    pub fn reveal_interval(&self) -> Duration {
        Duration::from_secs(u64::from(self.reveal_interval_secs))
    }
}

fn env_u32(key: &str) -> Option<u32> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

/// The single authoritative game session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    pub game_code: String,
    pub topic: String,
    pub grid_size: usize,
    pub status: GameStatus,
    pub players: Vec<Player>,
    pub clues: Vec<Clue>,
    pub revealed_clues: Vec<Clue>,
    /// Index of the most recently revealed clue, `None` before the first reveal
    pub current_clue_index: Option<usize>,
    pub time_until_next_clue: u32,
    pub winner: Option<Player>,
    pub config: GameConfig,
    pub version: u64,
    /// Token handed to the timers at start; timers carrying any other value are stale
    #[serde(skip)]
    pub timer_epoch: u64,
}

impl Game {
    pub fn player(&self, id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_mut(&mut self, id: &str) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    pub fn clue(&self, id: ClueId) -> Option<&Clue> {
        self.clues.iter().find(|c| c.id == id)
    }

    pub fn is_revealed(&self, id: ClueId) -> bool {
        self.revealed_clues.iter().any(|c| c.id == id)
    }

    pub fn has_more_clues(&self) -> bool {
        match self.current_clue_index {
            Some(idx) => idx + 1 < self.clues.len(),
            None => !self.clues.is_empty(),
        }
    }

    /// Highest strictly-greater score wins; ties keep the earliest joiner
    pub fn leading_player(&self) -> Option<&Player> {
        self.players.iter().fold(None, |best: Option<&Player>, p| match best {
            Some(b) if p.score <= b.score => Some(b),
            _ => Some(p),
        })
    }
}
