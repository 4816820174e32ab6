use crate::types::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Commands typed by the host at the console
#[derive(Debug, Clone, PartialEq)]
pub enum HostCommand {
    AddPlayer,
    RenamePlayer { id: PlayerId, name: String },
    RemovePlayer { id: PlayerId },
    FormRound { size: u8 },
    ChoosePrompt,
    EditScores { text: String },
    SortScores,
    FinalizeScore,
    ResetAll,
    ShowPlayers,
    ShowPrompts { players_needed: Option<u8> },
    AddPrompt { players_needed: u8, text: String },
    EditPrompt {
        id: PromptId,
        players_needed: u8,
        text: String,
    },
    DeletePrompt { id: PromptId },
    ResetPrompts,
    Export { path: String },
    Import { path: String },
    Help,
    Quit,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum CommandError {
    #[error("empty command")]
    Empty,

    #[error("unknown command: {0} (try `help`)")]
    Unknown(String),

    #[error("missing argument: {0}")]
    MissingArgument(&'static str),

    #[error("invalid {what}: {value}")]
    InvalidArgument { what: &'static str, value: String },
}

fn parse_arg<T: FromStr>(value: Option<&str>, what: &'static str) -> Result<T, CommandError> {
    let value = value.ok_or(CommandError::MissingArgument(what))?;
    value.parse().map_err(|_| CommandError::InvalidArgument {
        what,
        value: value.to_string(),
    })
}

fn rest_of(line: &str, skip: usize) -> String {
    line.split_whitespace()
        .skip(skip)
        .collect::<Vec<_>>()
        .join(" ")
}

impl FromStr for HostCommand {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let verb = words.next().ok_or(CommandError::Empty)?.to_lowercase();

        let command = match verb.as_str() {
            "add" | "+" => HostCommand::AddPlayer,
            "rename" => {
                let id = parse_arg(words.next(), "player id")?;
                // An empty name removes the player
                HostCommand::RenamePlayer {
                    id,
                    name: rest_of(line, 2),
                }
            }
            "remove" | "rm" => HostCommand::RemovePlayer {
                id: parse_arg(words.next(), "player id")?,
            },
            "round" => HostCommand::FormRound {
                size: parse_arg(words.next(), "round size")?,
            },
            "1" | "2" | "3" => HostCommand::FormRound {
                size: parse_arg(Some(verb.as_str()), "round size")?,
            },
            "prompt" => HostCommand::ChoosePrompt,
            "scores" => HostCommand::EditScores {
                text: rest_of(line, 1),
            },
            "sort" => HostCommand::SortScores,
            "finalize" | "ok" => HostCommand::FinalizeScore,
            "reset" => HostCommand::ResetAll,
            "players" | "show" => HostCommand::ShowPlayers,
            "prompts" => HostCommand::ShowPrompts {
                players_needed: match words.next() {
                    Some(n) => Some(parse_arg(Some(n), "player count")?),
                    None => None,
                },
            },
            "prompt-add" => {
                let players_needed = parse_arg(words.next(), "player count")?;
                let text = rest_of(line, 2);
                if text.is_empty() {
                    return Err(CommandError::MissingArgument("prompt text"));
                }
                HostCommand::AddPrompt {
                    players_needed,
                    text,
                }
            }
            "prompt-edit" => {
                let id = words
                    .next()
                    .ok_or(CommandError::MissingArgument("prompt id"))?
                    .to_string();
                let players_needed = parse_arg(words.next(), "player count")?;
                HostCommand::EditPrompt {
                    id,
                    players_needed,
                    text: rest_of(line, 3),
                }
            }
            "prompt-del" => HostCommand::DeletePrompt {
                id: words
                    .next()
                    .ok_or(CommandError::MissingArgument("prompt id"))?
                    .to_string(),
            },
            "prompt-reset" => HostCommand::ResetPrompts,
            "export" => HostCommand::Export {
                path: words
                    .next()
                    .ok_or(CommandError::MissingArgument("path"))?
                    .to_string(),
            },
            "import" => HostCommand::Import {
                path: words
                    .next()
                    .ok_or(CommandError::MissingArgument("path"))?
                    .to_string(),
            },
            "help" | "?" => HostCommand::Help,
            "quit" | "exit" => HostCommand::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };

        Ok(command)
    }
}

/// Plain-data events for whatever is drawing the stage. Geometry is the
/// renderer's business; these only say what changed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum DisplayEvent {
    Players {
        players: Vec<Player>,
    },
    PlayerRemoved {
        player_id: PlayerId,
    },
    RoundFormed {
        player_ids: Vec<PlayerId>,
        names: String,
    },
    PromptChosen {
        prompt: Prompt,
    },
    JudgeScores {
        scores: Vec<f64>,
        median_index: Option<usize>,
    },
    SortStarted {
        moves: Vec<ScoreMove>,
    },
    ScoreFlight {
        score: f64,
        player_ids: Vec<PlayerId>,
    },
    RoundFinalized {
        points: i64,
        players: Vec<Player>,
    },
    Prompts {
        prompts: Vec<Prompt>,
    },
    PromptDeleted {
        prompt_id: PromptId,
    },
    GameReset,
    Exported {
        path: String,
    },
    Imported {
        players: usize,
        prompts: usize,
    },
    Help,
    Error {
        code: String,
        msg: String,
    },
}
