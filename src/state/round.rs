use super::selection::select_round;
use super::AppState;
use crate::types::*;

/// Join names for the stage header: "A", "A and B", "A, B, and C"
pub fn format_round_names(names: &[String]) -> String {
    let mut names = names.to_vec();
    names.sort();

    match names.as_slice() {
        [] => String::new(),
        [only] => only.clone(),
        [first, second] => format!("{} and {}", first, second),
        [rest @ .., last] => format!("{}, and {}", rest.join(", "), last),
    }
}

impl AppState {
    pub async fn get_round(&self) -> Round {
        self.round.read().await.clone()
    }

    /// Pick `size` players for a new round, fewest-rounds-played first.
    /// Busted players sit out. Any prompt already on stage is dropped.
    pub async fn form_round(&self, size: u8) -> Result<Round, String> {
        if !is_valid_round_size(size) {
            return Err(format!(
                "Round size must be between {} and {}, got {}",
                MIN_ROUND_SIZE, MAX_ROUND_SIZE, size
            ));
        }

        let eligible: Vec<Player> = self
            .players
            .read()
            .await
            .iter()
            .filter(|p| !p.is_busted())
            .cloned()
            .collect();
        let selected = select_round(&eligible, size as usize, &mut rand::rng());

        let mut round = self.round.write().await;
        *round = Round {
            selected_player_ids: selected,
            current_prompt: None,
        };

        tracing::info!(
            "Formed round of {} (asked for {}): {:?}",
            round.selected_player_ids.len(),
            size,
            round.selected_player_ids
        );
        Ok(round.clone())
    }

    /// Put a prompt on stage for the current players. Falls back to the
    /// "no prompts found" placeholder when the bucket is exhausted. Asking
    /// again re-rolls. Does nothing without players.
    pub async fn choose_prompt(&self) -> Option<Prompt> {
        let player_count = self.round.read().await.selected_player_ids.len();
        if player_count == 0 {
            return None;
        }

        let prompt = match self.random_unused_prompt(player_count as u8).await {
            Some(prompt) => prompt,
            None => {
                tracing::warn!("No unused prompts left for {} players", player_count);
                Prompt::no_prompt_found()
            }
        };

        let mut round = self.round.write().await;
        // Players may have left while we were picking
        if round.selected_player_ids.is_empty() {
            return None;
        }
        round.current_prompt = Some(prompt.clone());

        tracing::info!("Prompt chosen: {}", prompt.id);
        Some(prompt)
    }

    /// Award `score` to every player in the round, mark the prompt used and
    /// clear the stage. Returns the updated players, or `None` if there was no
    /// prompt or no players.
    pub async fn finalize_round(&self, score: i64) -> Option<Vec<Player>> {
        let round = self.take_scorable_round().await?;
        self.score_round(round, score).await
    }

    /// Take the round off the stage if it has players and a prompt. Once
    /// taken it can never be scored twice.
    pub(super) async fn take_scorable_round(&self) -> Option<Round> {
        let mut round = self.round.write().await;
        if round.phase() != RoundPhase::PromptChosen {
            return None;
        }
        Some(std::mem::take(&mut *round))
    }

    /// Award points for a round already taken off the stage
    pub(super) async fn score_round(&self, round: Round, score: i64) -> Option<Vec<Player>> {
        let prompt = round.current_prompt?;

        let mut updated = Vec::with_capacity(round.selected_player_ids.len());
        for id in &round.selected_player_ids {
            if let Some(player) = self.add_points(*id, score).await {
                updated.push(player);
            }
        }

        self.mark_prompt_used(&prompt.id).await;

        tracing::info!(
            "Round finalized: {} points to {} players for {}",
            score,
            updated.len(),
            prompt.id
        );
        Some(updated)
    }

    /// Start a new game: no players, no used prompts, nothing on stage
    pub async fn reset_all(&self) {
        self.bump_game_generation().await;
        self.remove_all_players().await;
        self.clear_used_prompts().await;
        *self.round.write().await = Round::default();

        tracing::info!("Game reset");
    }

    /// Names of the players on stage, formatted for the header
    pub async fn round_names(&self) -> String {
        let round = self.get_round().await;
        let players = self.players.read().await;
        let names: Vec<String> = round
            .selected_player_ids
            .iter()
            .filter_map(|id| players.iter().find(|p| p.id == *id))
            .map(|p| p.name.clone())
            .collect();
        format_round_names(&names)
    }
}
