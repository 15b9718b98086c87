use crate::bingo::Pattern;
use crate::state::MarkRejection;
use crate::types::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Create a session. Without `clues` the pool is generated for the topic.
    CreateGame {
        topic: String,
        grid_size: usize,
        #[serde(default)]
        clues: Option<Vec<ClueDraft>>,
    },
    JoinGame {
        name: String,
        code: String,
    },
    StartGame,
    MarkCell {
        player_id: PlayerId,
        cell_id: CellId,
    },
    ClaimBingo {
        player_id: PlayerId,
    },
    LeaveGame {
        player_id: PlayerId,
    },
    /// Discard the session and return to an empty server
    ResetGame,
    /// Request a fresh snapshot; with `player_id` the caller's own ticket is included
    GetState {
        #[serde(default)]
        player_id: Option<PlayerId>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ServerMessage {
    Welcome {
        protocol: String,
        game: Option<PublicGame>,
        server_now: String,
    },
    /// Direct response to the creator, includes the join code
    GameCreated {
        game: PublicGame,
    },
    /// Direct response to a joining player with their private ticket
    Joined {
        player: PlayerView,
    },
    GameState {
        game: PublicGame,
    },
    /// Private state sent in response to get_state with a player id
    PlayerState {
        player: PlayerView,
    },
    ClueRevealed {
        clue: RevealedClue,
        index: usize,
        total: usize,
        time_until_next_clue: u32,
    },
    Countdown {
        time_until_next_clue: u32,
    },
    CellMarked {
        player_id: PlayerId,
        cell_id: CellId,
        score: u32,
    },
    /// Sent only to the player whose mark changed nothing
    MarkIgnored {
        cell_id: CellId,
        reason: MarkRejection,
        can_claim_bingo: bool,
    },
    /// Sent only to the claimant; other players never see rejected claims
    ClaimRejected {
        reason: String,
    },
    GameFinished {
        reason: FinishReason,
        winner: Option<PlayerSummary>,
        patterns: Vec<Pattern>,
        game: PublicGame,
    },
    PlayerJoined {
        player: PlayerSummary,
    },
    PlayerLeft {
        player_id: PlayerId,
        remaining: usize,
    },
    GameDiscarded,
    Error {
        code: String,
        msg: String,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Bingo,
    CluesExhausted,
}

/// Player info visible to everyone (no ticket)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerSummary {
    pub id: PlayerId,
    pub name: String,
    pub score: u32,
    pub can_claim_bingo: bool,
}

impl From<&Player> for PlayerSummary {
    fn from(p: &Player) -> Self {
        Self {
            id: p.id.clone(),
            name: p.name.clone(),
            score: p.score,
            can_claim_bingo: p.can_claim_bingo,
        }
    }
}

/// Revealed clue as shown to players: the answer stays hidden
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RevealedClue {
    pub id: ClueId,
    pub text: String,
}

impl From<&Clue> for RevealedClue {
    fn from(c: &Clue) -> Self {
        Self {
            id: c.id,
            text: c.text.clone(),
        }
    }
}

/// Session snapshot safe to broadcast. Tickets and unrevealed clues are left out.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PublicGame {
    pub game_code: String,
    pub topic: String,
    pub grid_size: usize,
    pub status: GameStatus,
    /// Join order
    pub players: Vec<PlayerSummary>,
    /// Highest score first, ties in join order
    pub leaderboard: Vec<PlayerSummary>,
    pub revealed_clues: Vec<RevealedClue>,
    pub current_clue_index: Option<usize>,
    pub total_clues: usize,
    pub time_until_next_clue: u32,
    pub winner: Option<PlayerSummary>,
    pub version: u64,
}

impl From<&Game> for PublicGame {
    fn from(g: &Game) -> Self {
        let players: Vec<PlayerSummary> = g.players.iter().map(PlayerSummary::from).collect();
        let mut leaderboard = players.clone();
        // Stable sort keeps join order among equal scores
        leaderboard.sort_by(|a, b| b.score.cmp(&a.score));

        Self {
            game_code: g.game_code.clone(),
            topic: g.topic.clone(),
            grid_size: g.grid_size,
            status: g.status,
            players,
            leaderboard,
            revealed_clues: g.revealed_clues.iter().map(RevealedClue::from).collect(),
            current_clue_index: g.current_clue_index,
            total_clues: g.clues.len(),
            time_until_next_clue: g.time_until_next_clue,
            winner: g.winner.as_ref().map(PlayerSummary::from),
            version: g.version,
        }
    }
}

/// One ticket cell as its owner sees it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CellView {
    pub id: CellId,
    /// Answer printed on the cell, `None` for the free space
    pub answer: Option<String>,
    pub marked: bool,
    pub is_free_space: bool,
    /// Whether the cell's clue has been revealed, i.e. it can be marked
    pub revealed: bool,
}

/// A player's private view: their own ticket plus standing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerView {
    pub player: PlayerSummary,
    pub game_code: String,
    /// Row-major; `None` marks a hole left by a short clue pool
    pub ticket: Vec<Vec<Option<CellView>>>,
}

impl PlayerView {
    pub fn new(game: &Game, player: &Player) -> Self {
        let ticket = player
            .ticket
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| {
                        cell.as_ref().map(|cell| CellView {
                            id: cell.id,
                            answer: cell
                                .clue_id
                                .and_then(|id| game.clue(id))
                                .map(|c| c.answer.clone()),
                            marked: cell.marked,
                            is_free_space: cell.is_free_space,
                            revealed: cell.clue_id.is_some_and(|id| game.is_revealed(id)),
                        })
                    })
                    .collect()
            })
            .collect();

        Self {
            player: PlayerSummary::from(player),
            game_code: game.game_code.clone(),
            ticket,
        }
    }
}
