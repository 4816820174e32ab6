//! State export/import for backing up a game night.
//!
//! A snapshot holds everything that is persisted: roster, prompt catalog,
//! used prompts and both id counters. The round on stage and the judge
//! scores are ephemeral and are not included.

use super::AppState;
use crate::types::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Schema version for export format compatibility
pub const EXPORT_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GameStateExport {
    pub schema_version: u32,
    /// Export timestamp (RFC 3339)
    pub exported_at: String,
    pub players: Vec<Player>,
    pub next_player_id: PlayerId,
    pub prompts: Vec<Prompt>,
    pub next_prompt_id: u64,
    #[serde(default)]
    pub used_prompts: Vec<PromptId>,
}

impl GameStateExport {
    /// Validate the export before import
    pub fn validate(&self) -> Result<(), String> {
        if self.schema_version > EXPORT_SCHEMA_VERSION {
            return Err(format!(
                "Export schema version {} is newer than supported version {}",
                self.schema_version, EXPORT_SCHEMA_VERSION
            ));
        }

        // add_player needs room to advance the counter
        if self.next_player_id == PlayerId::MAX {
            return Err(format!("nextPlayerId {} is out of range", self.next_player_id));
        }

        let mut player_ids = HashSet::new();
        for player in &self.players {
            if !player_ids.insert(player.id) {
                return Err(format!("Duplicate player id {}", player.id));
            }
            if player.id >= self.next_player_id {
                return Err(format!(
                    "Player id {} is not below nextPlayerId {}",
                    player.id, self.next_player_id
                ));
            }
        }

        let mut prompt_ids = HashSet::new();
        for prompt in &self.prompts {
            if !prompt_ids.insert(prompt.id.as_str()) {
                return Err(format!("Duplicate prompt id '{}'", prompt.id));
            }
            if !is_valid_round_size(prompt.players_needed) {
                return Err(format!(
                    "Prompt '{}' needs {} players, expected {}..={}",
                    prompt.id, prompt.players_needed, MIN_ROUND_SIZE, MAX_ROUND_SIZE
                ));
            }
        }

        Ok(())
    }
}

impl AppState {
    /// Snapshot all persisted state
    pub async fn export_state(&self) -> GameStateExport {
        GameStateExport {
            schema_version: EXPORT_SCHEMA_VERSION,
            exported_at: chrono::Utc::now().to_rfc3339(),
            players: self.players.read().await.clone(),
            next_player_id: *self.next_player_id.read().await,
            prompts: self.prompts.read().await.clone(),
            next_prompt_id: *self.next_prompt_id.read().await,
            used_prompts: self.used_prompts.read().await.clone(),
        }
    }

    /// Replace all persisted state with a validated snapshot. The stage is
    /// cleared since the old round may refer to players that no longer exist.
    pub async fn import_state(&self, export: GameStateExport) -> Result<(), String> {
        export.validate()?;
        self.bump_game_generation().await;

        {
            let mut players = self.players.write().await;
            let mut next_player_id = self.next_player_id.write().await;
            *players = export.players;
            *next_player_id = export.next_player_id;
            self.persist_players(&players);
            self.persist_next_player_id(*next_player_id);
        }
        {
            let mut prompts = self.prompts.write().await;
            let mut next_prompt_id = self.next_prompt_id.write().await;
            *prompts = export.prompts;
            *next_prompt_id = export.next_prompt_id;
            self.persist_prompts(&prompts);
            self.persist_next_prompt_id(*next_prompt_id);
        }
        {
            let mut used = self.used_prompts.write().await;
            *used = export.used_prompts;
            self.persist_used_prompts(&used);
        }
        *self.round.write().await = Round::default();

        tracing::info!(
            "Imported state exported at {} (schema v{})",
            export.exported_at,
            export.schema_version
        );
        Ok(())
    }
}
