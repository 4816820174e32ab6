use super::AppState;
use crate::types::*;

/// Collapse a multi-line name onto one line and trim it
fn normalize_name(name: &str) -> String {
    name.lines().collect::<Vec<_>>().join(" ").trim().to_string()
}

impl AppState {
    /// Append a new player with the next unused id
    pub async fn add_player(&self) -> Player {
        let mut players = self.players.write().await;
        let mut next_id = self.next_player_id.write().await;

        let player = Player::new(*next_id);
        *next_id += 1;
        players.push(player.clone());

        self.persist_players(&players);
        self.persist_next_player_id(*next_id);

        tracing::info!("Added player {}", player.id);
        player
    }

    /// Rename a player. A blank name removes them instead.
    /// Returns the renamed player, or `None` if they were removed or unknown.
    pub async fn rename_player(&self, id: PlayerId, name: &str) -> Option<Player> {
        let name = normalize_name(name);
        if name.is_empty() {
            self.remove_player(id).await;
            return None;
        }

        let mut players = self.players.write().await;
        let player = players.iter_mut().find(|p| p.id == id)?;
        player.name = name;
        let renamed = player.clone();

        self.persist_players(&players);
        Some(renamed)
    }

    /// Remove a player. Other ids are left untouched, and the player drops out
    /// of any round in progress.
    pub async fn remove_player(&self, id: PlayerId) -> Option<Player> {
        let removed = {
            let mut players = self.players.write().await;
            let index = players.iter().position(|p| p.id == id)?;
            let removed = players.remove(index);
            self.persist_players(&players);
            removed
        };

        self.round.write().await.selected_player_ids.remove(&id);

        tracing::info!("Removed player {} ({})", id, removed.name);
        Some(removed)
    }

    /// Credit a player with one finished round worth `delta` points
    pub async fn add_points(&self, id: PlayerId, delta: i64) -> Option<Player> {
        let mut players = self.players.write().await;
        let Some(player) = players.iter_mut().find(|p| p.id == id) else {
            tracing::warn!("Cannot add points to unknown player {}", id);
            return None;
        };

        player.score += delta;
        player.rounds_played += 1;
        let updated = player.clone();

        self.persist_players(&players);
        Some(updated)
    }

    /// Empty the roster. Id allocation starts over since nothing can still
    /// refer to the old ids.
    pub async fn remove_all_players(&self) {
        let mut players = self.players.write().await;
        let mut next_id = self.next_player_id.write().await;
        players.clear();
        *next_id = 1;

        self.persist_players(&players);
        self.persist_next_player_id(*next_id);
    }

    pub async fn get_players(&self) -> Vec<Player> {
        self.players.read().await.clone()
    }

    pub async fn get_player(&self, id: PlayerId) -> Option<Player> {
        self.players.read().await.iter().find(|p| p.id == id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_add_player_defaults() {
        let state = AppState::new();
        let first = state.add_player().await;
        let second = state.add_player().await;

        assert_eq!(first.id, 1);
        assert_eq!(first.name, "player 1");
        assert_eq!(second.id, 2);
        assert_eq!(state.get_players().await.len(), 2);
    }

    #[tokio::test]
    async fn test_ids_not_reused_after_removal() {
        let state = AppState::new();
        state.add_player().await;
        let second = state.add_player().await;
        state.remove_player(second.id).await;

        let third = state.add_player().await;
        assert_eq!(third.id, 3);

        let ids: Vec<_> = state.get_players().await.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[tokio::test]
    async fn test_rename_player() {
        let state = AppState::new();
        let player = state.add_player().await;

        let renamed = state.rename_player(player.id, "  Jo\nAnn ").await.unwrap();
        assert_eq!(renamed.name, "Jo Ann");
        assert_eq!(state.get_player(player.id).await.unwrap().name, "Jo Ann");
    }

    #[tokio::test]
    async fn test_rename_to_blank_removes() {
        let state = AppState::new();
        let player = state.add_player().await;
        state.add_player().await;

        assert!(state.rename_player(player.id, " \n ").await.is_none());
        assert!(state.get_player(player.id).await.is_none());
        assert_eq!(state.get_players().await.len(), 1);
    }

    #[tokio::test]
    async fn test_rename_unknown_player() {
        let state = AppState::new();
        assert!(state.rename_player(42, "Nobody").await.is_none());
    }

    #[tokio::test]
    async fn test_remove_player_leaves_round() {
        let state = AppState::new();
        let player = state.add_player().await;
        state.form_round(1).await.unwrap();
        assert!(state
            .get_round()
            .await
            .selected_player_ids
            .contains(&player.id));

        state.remove_player(player.id).await;
        assert_eq!(state.get_round().await.phase(), RoundPhase::Idle);
    }

    #[tokio::test]
    async fn test_add_points() {
        let state = AppState::new();
        let player = state.add_player().await;

        state.add_points(player.id, 7).await;
        let updated = state.add_points(player.id, 5).await.unwrap();

        assert_eq!(updated.score, 12);
        assert_eq!(updated.rounds_played, 2);
        assert!(state.add_points(99, 3).await.is_none());
    }

    #[tokio::test]
    async fn test_remove_all_players() {
        let state = AppState::new();
        state.add_player().await;
        state.add_player().await;

        state.remove_all_players().await;
        assert!(state.get_players().await.is_empty());
        assert_eq!(state.add_player().await.id, 1);
    }
}
