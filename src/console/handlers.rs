//! Host command dispatch
//!
//! Each command maps onto one state operation. Preconditions that fail
//! quietly in the state layer (finalizing without a median, picking a prompt
//! with nobody on stage) come back as `None` so the console stays silent.

use crate::protocol::{DisplayEvent, HostCommand};
use crate::state::export::GameStateExport;
use crate::state::AppState;

fn error(code: &str, msg: impl Into<String>) -> Option<DisplayEvent> {
    Some(DisplayEvent::Error {
        code: code.to_string(),
        msg: msg.into(),
    })
}

/// Handle a host command and return the event to show, if any
pub async fn handle_command(cmd: HostCommand, state: &AppState) -> Option<DisplayEvent> {
    match cmd {
        HostCommand::AddPlayer => {
            state.add_player().await;
            Some(DisplayEvent::Players {
                players: state.get_players().await,
            })
        }

        HostCommand::RenamePlayer { id, name } => {
            if state.get_player(id).await.is_none() {
                return error("PLAYER_NOT_FOUND", format!("No player with id {}", id));
            }
            match state.rename_player(id, &name).await {
                Some(_) => Some(DisplayEvent::Players {
                    players: state.get_players().await,
                }),
                None => Some(DisplayEvent::PlayerRemoved { player_id: id }),
            }
        }

        HostCommand::RemovePlayer { id } => match state.remove_player(id).await {
            Some(_) => Some(DisplayEvent::PlayerRemoved { player_id: id }),
            None => error("PLAYER_NOT_FOUND", format!("No player with id {}", id)),
        },

        HostCommand::FormRound { size } => match state.form_round(size).await {
            Ok(round) => Some(DisplayEvent::RoundFormed {
                player_ids: round.selected_player_ids.into_iter().collect(),
                names: state.round_names().await,
            }),
            Err(e) => error("ROUND_FAILED", e),
        },

        HostCommand::ChoosePrompt => state
            .choose_prompt()
            .await
            .map(|prompt| DisplayEvent::PromptChosen { prompt }),

        HostCommand::EditScores { text } => {
            state.edit_judge_scores(&text).await;
            let judge = state.get_judge_scores().await;
            Some(DisplayEvent::JudgeScores {
                scores: judge.scores,
                median_index: judge.median_index,
            })
        }

        HostCommand::SortScores => state
            .sort_judge_scores()
            .await
            .map(|plan| DisplayEvent::SortStarted { moves: plan.moves }),

        HostCommand::FinalizeScore => {
            state
                .finalize_judging()
                .await
                .map(|handoff| DisplayEvent::ScoreFlight {
                    score: handoff.median,
                    player_ids: handoff.player_ids,
                })
        }

        HostCommand::ResetAll => {
            state.reset_all().await;
            Some(DisplayEvent::GameReset)
        }

        HostCommand::ShowPlayers => Some(DisplayEvent::Players {
            players: state.get_players().await,
        }),

        HostCommand::ShowPrompts { players_needed } => {
            let prompts = state
                .get_prompts()
                .await
                .into_iter()
                .filter(|p| players_needed.map_or(true, |n| p.players_needed == n))
                .collect();
            Some(DisplayEvent::Prompts { prompts })
        }

        HostCommand::AddPrompt {
            players_needed,
            text,
        } => match state.add_prompt(&text, players_needed).await {
            Ok(prompt) => Some(DisplayEvent::Prompts {
                prompts: vec![prompt],
            }),
            Err(e) => error("PROMPT_INVALID", e),
        },

        HostCommand::EditPrompt {
            id,
            players_needed,
            text,
        } => match state.edit_prompt(&id, &text, players_needed).await {
            Ok(Some(prompt)) => Some(DisplayEvent::Prompts {
                prompts: vec![prompt],
            }),
            Ok(None) => Some(DisplayEvent::PromptDeleted { prompt_id: id }),
            Err(e) => error("PROMPT_INVALID", e),
        },

        HostCommand::DeletePrompt { id } => {
            if state.delete_prompt(&id).await {
                Some(DisplayEvent::PromptDeleted { prompt_id: id })
            } else {
                error("PROMPT_NOT_FOUND", format!("No prompt with id {}", id))
            }
        }

        // Restoring the built-in prompts starts a new game too
        HostCommand::ResetPrompts => {
            state.reset_all().await;
            let prompts = state.reset_prompts_to_defaults().await;
            Some(DisplayEvent::Prompts { prompts })
        }

        HostCommand::Export { path } => {
            let export = state.export_state().await;
            let json = match serde_json::to_string_pretty(&export) {
                Ok(json) => json,
                Err(e) => return error("EXPORT_FAILED", e.to_string()),
            };
            match std::fs::write(&path, json) {
                Ok(()) => {
                    tracing::info!("Exported state to {}", path);
                    Some(DisplayEvent::Exported { path })
                }
                Err(e) => error("EXPORT_FAILED", format!("{}: {}", path, e)),
            }
        }

        HostCommand::Import { path } => {
            let raw = match std::fs::read_to_string(&path) {
                Ok(raw) => raw,
                Err(e) => return error("IMPORT_FAILED", format!("{}: {}", path, e)),
            };
            let export: GameStateExport = match serde_json::from_str(&raw) {
                Ok(export) => export,
                Err(e) => return error("IMPORT_FAILED", format!("Invalid snapshot: {}", e)),
            };
            let players = export.players.len();
            let prompts = export.prompts.len();
            match state.import_state(export).await {
                Ok(()) => Some(DisplayEvent::Imported { players, prompts }),
                Err(e) => error("IMPORT_FAILED", e),
            }
        }

        HostCommand::Help => Some(DisplayEvent::Help),

        // The console loop exits before dispatching this
        HostCommand::Quit => None,
    }
}
