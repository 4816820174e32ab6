use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Opaque ID types
pub type PlayerId = u32;
pub type PromptId = String;

/// A player whose score goes above this is busted and sits out future rounds
pub const MAX_POINTS_BEFORE_BUST: i64 = 31;

/// Id of the synthetic prompt shown when a player-count bucket is exhausted.
/// Never recorded as used.
pub const NO_PROMPT_FOUND_ID: &str = "no-prompt-found";

/// Smallest and largest number of players a round (and a prompt) can have
pub const MIN_ROUND_SIZE: u8 = 1;
pub const MAX_ROUND_SIZE: u8 = 3;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub score: i64,
    pub rounds_played: u32,
}

impl Player {
    pub fn new(id: PlayerId) -> Self {
        Self {
            id,
            name: format!("player {}", id),
            score: 0,
            rounds_played: 0,
        }
    }

    pub fn is_busted(&self) -> bool {
        self.score > MAX_POINTS_BEFORE_BUST
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Prompt {
    pub id: PromptId,
    pub text: String,
    pub players_needed: u8,
}

impl Prompt {
    /// Placeholder shown when no unused prompt is left for a round size
    pub fn no_prompt_found() -> Self {
        Self {
            id: NO_PROMPT_FOUND_ID.to_string(),
            text: "No prompts left for this many players".to_string(),
            players_needed: 0,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.id == NO_PROMPT_FOUND_ID
    }
}

/// Check that a round size / prompt player count is in range
pub fn is_valid_round_size(n: u8) -> bool {
    (MIN_ROUND_SIZE..=MAX_ROUND_SIZE).contains(&n)
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoundPhase {
    Idle,
    RoundFormed,
    PromptChosen,
}

/// The round currently on stage. Never persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Round {
    pub selected_player_ids: BTreeSet<PlayerId>,
    pub current_prompt: Option<Prompt>,
}

impl Round {
    pub fn phase(&self) -> RoundPhase {
        match (&self.current_prompt, self.selected_player_ids.is_empty()) {
            (_, true) => RoundPhase::Idle,
            (None, false) => RoundPhase::RoundFormed,
            (Some(_), false) => RoundPhase::PromptChosen,
        }
    }
}

/// One score moving from its entered position to its sorted position
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ScoreMove {
    pub from: usize,
    pub to: usize,
    pub value: f64,
}

/// Everything the display needs to animate a sort, plus what gets committed
/// once the animation is done
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SortPlan {
    pub moves: Vec<ScoreMove>,
    pub sorted: Vec<f64>,
    pub median_index: usize,
}
