mod catalog;
pub mod export;
mod judge;
mod player;
mod round;
mod selection;

pub use judge::{JudgeScores, PendingTransition, ScoreHandoff};
pub use round::format_round_names;
pub use selection::select_round;

use crate::config::{AppConfig, StorageConfig};
use crate::prompts::default_prompts;
use crate::protocol::DisplayEvent;
use crate::store::{self, FileStore, KeyValueStore, MemoryStore, StoreResult};
use crate::types::*;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex, RwLock};
use tokio::task::JoinSet;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub players: Arc<RwLock<Vec<Player>>>,
    pub next_player_id: Arc<RwLock<PlayerId>>,
    pub prompts: Arc<RwLock<Vec<Prompt>>>,
    pub next_prompt_id: Arc<RwLock<u64>>,
    /// Prompt ids shown this game, in the order they were used
    pub used_prompts: Arc<RwLock<Vec<PromptId>>>,
    pub round: Arc<RwLock<Round>>,
    pub judge: Arc<RwLock<JudgeScores>>,
    /// Bumped whenever the roster is replaced wholesale (reset, import)
    pub game_generation: Arc<RwLock<u64>>,
    /// Scheduled commits that have not been joined yet
    pub timers: Arc<Mutex<JoinSet<()>>>,
    pub store: Arc<dyn KeyValueStore>,
    pub config: AppConfig,
    /// Events committed by timers, for the display to pick up
    pub display_broadcast: broadcast::Sender<DisplayEvent>,
}

impl AppState {
    /// Fresh in-memory state with the default prompt catalog
    pub fn new() -> Self {
        Self::with_store(Arc::new(MemoryStore::new()), AppConfig::in_memory())
    }

    /// Open the store named by the config and load state from it
    pub fn from_config(config: AppConfig) -> StoreResult<Self> {
        let store: Arc<dyn KeyValueStore> = match &config.storage {
            StorageConfig::Memory => Arc::new(MemoryStore::new()),
            StorageConfig::Directory(dir) => Arc::new(FileStore::open(dir)?),
        };
        Ok(Self::with_store(store, config))
    }

    /// Load persisted state from `store`, seeding defaults for anything missing
    pub fn with_store(store: Arc<dyn KeyValueStore>, config: AppConfig) -> Self {
        let players: Vec<Player> =
            store::load_json(store.as_ref(), store::PLAYERS_KEY).unwrap_or_default();

        // Never hand out an id that is already on the roster, even if the
        // stored counter is missing or behind
        let first_free_id = players.iter().map(|p| p.id).max().unwrap_or(0) + 1;
        let next_player_id = store::load_json::<PlayerId>(store.as_ref(), store::NEXT_PLAYER_ID_KEY)
            .map_or(first_free_id, |stored| stored.max(first_free_id));

        let prompts = match store::load_json::<Vec<Prompt>>(store.as_ref(), store::PROMPTS_KEY) {
            Some(prompts) => prompts,
            None => {
                let defaults = default_prompts();
                tracing::info!("Seeding {} default prompts", defaults.len());
                store::save_json(store.as_ref(), store::PROMPTS_KEY, &defaults);
                defaults
            }
        };

        let next_prompt_id =
            match store::load_json::<u64>(store.as_ref(), store::NEXT_PROMPT_ID_KEY) {
                Some(id) => id,
                None => {
                    let id = default_prompts().len() as u64;
                    store::save_json(store.as_ref(), store::NEXT_PROMPT_ID_KEY, &id);
                    id
                }
            };

        let used_prompts: Vec<PromptId> =
            store::load_json(store.as_ref(), store::USED_PROMPTS_KEY).unwrap_or_default();

        tracing::info!(
            players = players.len(),
            prompts = prompts.len(),
            used_prompts = used_prompts.len(),
            "State loaded"
        );

        let (tx, _rx) = broadcast::channel(100);
        Self {
            players: Arc::new(RwLock::new(players)),
            next_player_id: Arc::new(RwLock::new(next_player_id)),
            prompts: Arc::new(RwLock::new(prompts)),
            next_prompt_id: Arc::new(RwLock::new(next_prompt_id)),
            used_prompts: Arc::new(RwLock::new(used_prompts)),
            round: Arc::new(RwLock::new(Round::default())),
            judge: Arc::new(RwLock::new(JudgeScores::default())),
            game_generation: Arc::new(RwLock::new(0)),
            timers: Arc::new(Mutex::new(JoinSet::new())),
            store,
            config,
            display_broadcast: tx,
        }
    }

    /// Send an event to display subscribers. Having nobody listening is fine.
    pub fn broadcast(&self, event: DisplayEvent) {
        let _ = self.display_broadcast.send(event);
    }

    /// Schedule a delayed commit. It is tracked so shutdown can wait for it.
    pub(crate) async fn spawn_timer<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut timers = self.timers.lock().await;
        // Reap finished commits so the set doesn't grow over a long game
        while timers.try_join_next().is_some() {}
        timers.spawn(task);
    }

    /// Wait until every scheduled commit has landed
    pub async fn wait_for_timers(&self) {
        loop {
            let mut timers = std::mem::take(&mut *self.timers.lock().await);
            if timers.is_empty() {
                break;
            }
            tracing::debug!("Waiting for {} pending commits", timers.len());
            while let Some(result) = timers.join_next().await {
                if let Err(e) = result {
                    tracing::error!("Timer task failed: {}", e);
                }
            }
        }
    }

    pub(crate) async fn bump_game_generation(&self) {
        *self.game_generation.write().await += 1;
    }

    fn persist_players(&self, players: &[Player]) {
        store::save_json(self.store.as_ref(), store::PLAYERS_KEY, players);
    }

    fn persist_next_player_id(&self, id: PlayerId) {
        store::save_json(self.store.as_ref(), store::NEXT_PLAYER_ID_KEY, &id);
    }

    fn persist_prompts(&self, prompts: &[Prompt]) {
        store::save_json(self.store.as_ref(), store::PROMPTS_KEY, prompts);
    }

    fn persist_next_prompt_id(&self, id: u64) {
        store::save_json(self.store.as_ref(), store::NEXT_PROMPT_ID_KEY, &id);
    }

    fn persist_used_prompts(&self, used: &[PromptId]) {
        store::save_json(self.store.as_ref(), store::USED_PROMPTS_KEY, used);
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
