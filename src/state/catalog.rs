use super::AppState;
use crate::prompts::{default_prompts, random_prompt, sanitize_prompts};
use crate::types::*;
use std::collections::HashSet;

impl AppState {
    pub async fn get_prompts(&self) -> Vec<Prompt> {
        self.prompts.read().await.clone()
    }

    /// Reserve the next custom prompt id (`custom-N`)
    pub async fn allocate_prompt_id(&self) -> PromptId {
        let mut next_id = self.next_prompt_id.write().await;
        let id = *next_id;
        *next_id += 1;
        self.persist_next_prompt_id(*next_id);
        format!("custom-{}", id)
    }

    /// Replace the whole catalog with an edited set. Blank prompts are dropped.
    pub async fn save_prompts(&self, prompts: Vec<Prompt>) -> Vec<Prompt> {
        let prompts = sanitize_prompts(prompts);
        let mut catalog = self.prompts.write().await;
        *catalog = prompts.clone();
        self.persist_prompts(&catalog);

        tracing::info!("Saved {} prompts", prompts.len());
        prompts
    }

    /// Author a new prompt and append it to the catalog
    pub async fn add_prompt(&self, text: &str, players_needed: u8) -> Result<Prompt, String> {
        let text = text.trim();
        if text.is_empty() {
            return Err("Prompt text cannot be empty".to_string());
        }
        if !is_valid_round_size(players_needed) {
            return Err(format!(
                "Prompts need between {} and {} players",
                MIN_ROUND_SIZE, MAX_ROUND_SIZE
            ));
        }

        let prompt = Prompt {
            id: self.allocate_prompt_id().await,
            text: text.to_string(),
            players_needed,
        };

        let mut prompts = self.get_prompts().await;
        prompts.push(prompt.clone());
        self.save_prompts(prompts).await;
        Ok(prompt)
    }

    /// Change an existing prompt's text and player count. The id stays the
    /// same; blank text deletes the prompt, as saving the editor would.
    pub async fn edit_prompt(
        &self,
        id: &str,
        text: &str,
        players_needed: u8,
    ) -> Result<Option<Prompt>, String> {
        if !is_valid_round_size(players_needed) {
            return Err(format!(
                "Prompts need between {} and {} players",
                MIN_ROUND_SIZE, MAX_ROUND_SIZE
            ));
        }

        let mut prompts = self.get_prompts().await;
        let prompt = prompts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| format!("Prompt {} not found", id))?;
        prompt.text = text.trim().to_string();
        prompt.players_needed = players_needed;
        let edited = prompt.clone();

        self.save_prompts(prompts).await;
        Ok((!edited.text.is_empty()).then_some(edited))
    }

    /// Delete a prompt by id. Returns false if it was not in the catalog.
    pub async fn delete_prompt(&self, id: &str) -> bool {
        let mut prompts = self.get_prompts().await;
        let before = prompts.len();
        prompts.retain(|p| p.id != id);
        if prompts.len() == before {
            return false;
        }
        self.save_prompts(prompts).await;
        true
    }

    /// Restore the built-in catalog and restart custom id allocation
    pub async fn reset_prompts_to_defaults(&self) -> Vec<Prompt> {
        let defaults = default_prompts();
        {
            let mut catalog = self.prompts.write().await;
            *catalog = defaults.clone();
            self.persist_prompts(&catalog);
        }
        {
            let mut next_id = self.next_prompt_id.write().await;
            *next_id = defaults.len() as u64;
            self.persist_next_prompt_id(*next_id);
        }

        tracing::info!("Prompts reset to {} defaults", defaults.len());
        defaults
    }

    /// A random prompt for `players_needed` performers that has not been used
    /// this game
    pub async fn random_unused_prompt(&self, players_needed: u8) -> Option<Prompt> {
        let used: HashSet<PromptId> = self.used_prompts.read().await.iter().cloned().collect();
        let prompts = self.prompts.read().await;
        random_prompt(&prompts, players_needed, &used, &mut rand::rng())
    }

    /// Record a prompt as shown. The no-prompt placeholder is never recorded.
    pub async fn mark_prompt_used(&self, id: &str) {
        if id == NO_PROMPT_FOUND_ID {
            return;
        }
        let mut used = self.used_prompts.write().await;
        if used.iter().any(|u| u == id) {
            return;
        }
        used.push(id.to_string());
        self.persist_used_prompts(&used);
    }

    pub async fn clear_used_prompts(&self) {
        let mut used = self.used_prompts.write().await;
        used.clear();
        self.persist_used_prompts(&used);
    }

    pub async fn get_used_prompts(&self) -> Vec<PromptId> {
        self.used_prompts.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_allocate_prompt_id_is_monotonic() {
        let state = AppState::new();
        let base = default_prompts().len();

        assert_eq!(state.allocate_prompt_id().await, format!("custom-{}", base));
        assert_eq!(
            state.allocate_prompt_id().await,
            format!("custom-{}", base + 1)
        );
    }

    #[tokio::test]
    async fn test_add_prompt() {
        let state = AppState::new();
        let prompt = state.add_prompt("  Two mimes argue  ", 2).await.unwrap();

        assert!(prompt.id.starts_with("custom-"));
        assert_eq!(prompt.text, "Two mimes argue");
        assert_eq!(state.get_prompts().await.last(), Some(&prompt));

        assert!(state.add_prompt("   ", 1).await.is_err());
        assert!(state.add_prompt("Too many", 4).await.is_err());
    }

    #[tokio::test]
    async fn test_save_prompts_drops_blank() {
        let state = AppState::new();
        let prompts = vec![
            Prompt {
                id: "a".to_string(),
                text: "Keep me".to_string(),
                players_needed: 1,
            },
            Prompt {
                id: "b".to_string(),
                text: "  ".to_string(),
                players_needed: 2,
            },
        ];

        let saved = state.save_prompts(prompts).await;
        assert_eq!(saved.len(), 1);
        assert_eq!(state.get_prompts().await, saved);
    }

    #[tokio::test]
    async fn test_edit_and_delete_prompt() {
        let state = AppState::new();
        let edited = state
            .edit_prompt("uno-0", "A sommelier on a submarine", 2)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(edited.id, "uno-0");
        assert_eq!(edited.players_needed, 2);

        assert!(state.edit_prompt("missing", "x", 1).await.is_err());

        // Blank text deletes on save
        assert!(state.edit_prompt("uno-0", "", 1).await.unwrap().is_none());
        assert!(!state.get_prompts().await.iter().any(|p| p.id == "uno-0"));

        assert!(state.delete_prompt("uno-1").await);
        assert!(!state.delete_prompt("uno-1").await);
    }

    #[tokio::test]
    async fn test_reset_prompts_to_defaults() {
        let state = AppState::new();
        state.save_prompts(Vec::new()).await;
        state.allocate_prompt_id().await;

        let restored = state.reset_prompts_to_defaults().await;
        assert_eq!(restored, default_prompts());
        assert_eq!(state.get_prompts().await, default_prompts());
        assert_eq!(
            *state.next_prompt_id.read().await,
            default_prompts().len() as u64
        );
    }

    #[tokio::test]
    async fn test_used_prompts_never_repeat() {
        let state = AppState::new();
        let trio_count = state
            .get_prompts()
            .await
            .iter()
            .filter(|p| p.players_needed == 3)
            .count();

        let mut seen = HashSet::new();
        for _ in 0..trio_count {
            let prompt = state.random_unused_prompt(3).await.unwrap();
            assert!(seen.insert(prompt.id.clone()), "prompt repeated");
            state.mark_prompt_used(&prompt.id).await;
        }
        assert!(state.random_unused_prompt(3).await.is_none());

        state.clear_used_prompts().await;
        assert!(state.random_unused_prompt(3).await.is_some());
    }

    #[tokio::test]
    async fn test_placeholder_never_marked_used() {
        let state = AppState::new();
        state.mark_prompt_used(NO_PROMPT_FOUND_ID).await;
        state.mark_prompt_used("uno-2").await;
        state.mark_prompt_used("uno-2").await;

        assert_eq!(state.get_used_prompts().await, vec!["uno-2".to_string()]);
    }
}
