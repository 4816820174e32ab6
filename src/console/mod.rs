pub mod handlers;

use crate::protocol::{DisplayEvent, HostCommand};
use crate::state::AppState;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

pub const HELP_TEXT: &str = "\
Players:  add | rename <id> <name> | remove <id> | players
Rounds:   round <1|2|3> (or just 1, 2, 3) | prompt | reset
Judging:  scores <n n n...> | sort | finalize
Prompts:  prompts [n] | prompt-add <n> <text> | prompt-edit <id> <n> <text>
          prompt-del <id> | prompt-reset
Backup:   export <path> | import <path>
Other:    help | quit";

fn format_score(score: f64) -> String {
    if score.fract() == 0.0 {
        format!("{}", score as i64)
    } else {
        format!("{}", score)
    }
}

/// Turn a display event into the text shown on the console
pub fn render(event: &DisplayEvent) -> String {
    match event {
        DisplayEvent::Players { players } => {
            if players.is_empty() {
                return "No players yet. Type `add`.".to_string();
            }
            players
                .iter()
                .map(|p| {
                    let busted = if p.is_busted() {
                        "  BUSTED"
                    } else {
                        ""
                    };
                    format!(
                        "#{:<3} {:<20} {:>4} pts  {} rounds{}",
                        p.id, p.name, p.score, p.rounds_played, busted
                    )
                })
                .collect::<Vec<_>>()
                .join("\n")
        }
        DisplayEvent::PlayerRemoved { player_id } => format!("Removed player #{}", player_id),
        DisplayEvent::RoundFormed { player_ids, names } => {
            if player_ids.is_empty() {
                "Nobody is eligible for a round".to_string()
            } else {
                format!("Up next: {}", names)
            }
        }
        DisplayEvent::PromptChosen { prompt } => format!("Prompt: {}", prompt.text),
        DisplayEvent::JudgeScores {
            scores,
            median_index,
        } => {
            let shown: Vec<String> = scores
                .iter()
                .enumerate()
                .map(|(i, s)| {
                    if Some(i) == *median_index {
                        format!("[{}]", format_score(*s))
                    } else {
                        format_score(*s)
                    }
                })
                .collect();
            format!("Judges: {}", shown.join(" "))
        }
        DisplayEvent::SortStarted { moves } => format!("Sorting {} scores...", moves.len()),
        DisplayEvent::ScoreFlight { score, player_ids } => format!(
            "Median {} going to {} player(s)...",
            format_score(*score),
            player_ids.len()
        ),
        DisplayEvent::RoundFinalized { points, players } => {
            let names: Vec<&str> = players.iter().map(|p| p.name.as_str()).collect();
            format!("+{} to {}", points, names.join(", "))
        }
        DisplayEvent::Prompts { prompts } => {
            if prompts.is_empty() {
                return "No prompts".to_string();
            }
            prompts
                .iter()
                .map(|p| format!("{:<12} ({}) {}", p.id, p.players_needed, p.text))
                .collect::<Vec<_>>()
                .join("\n")
        }
        DisplayEvent::PromptDeleted { prompt_id } => format!("Deleted prompt {}", prompt_id),
        DisplayEvent::GameReset => "New game: roster and used prompts cleared".to_string(),
        DisplayEvent::Exported { path } => format!("Exported to {}", path),
        DisplayEvent::Imported { players, prompts } => {
            format!("Imported {} players and {} prompts", players, prompts)
        }
        DisplayEvent::Help => HELP_TEXT.to_string(),
        DisplayEvent::Error { code, msg } => format!("error [{}]: {}", code, msg),
    }
}

/// Read host commands from stdin until EOF or `quit`
pub async fn run(state: AppState) -> std::io::Result<()> {
    run_with(state, BufReader::new(tokio::io::stdin())).await
}

/// Read host commands from `input`. Returns once every scheduled commit has
/// landed, so a score still in flight is never lost on exit.
pub async fn run_with<R>(state: AppState, input: R) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    crate::broadcast::spawn_display_renderer(&state);

    let players = state.get_players().await;
    println!("{}", render(&DisplayEvent::Players { players }));
    println!("Type `help` for commands.");

    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let cmd = match line.parse::<HostCommand>() {
            Ok(HostCommand::Quit) => break,
            Ok(cmd) => cmd,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };

        tracing::debug!("Host command: {:?}", cmd);
        if let Some(event) = handlers::handle_command(cmd, &state).await {
            println!("{}", render(&event));
        }
    }

    state.wait_for_timers().await;
    tracing::info!("Console closed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Player, Prompt, MAX_POINTS_BEFORE_BUST};

    #[test]
    fn test_render_players_marks_busted() {
        let mut busted = Player::new(2);
        busted.score = MAX_POINTS_BEFORE_BUST + 1;
        let text = render(&DisplayEvent::Players {
            players: vec![Player::new(1), busted],
        });

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(!lines[0].contains("BUSTED"));
        assert!(lines[1].contains("BUSTED"));
    }

    #[test]
    fn test_render_judge_scores_brackets_median() {
        let text = render(&DisplayEvent::JudgeScores {
            scores: vec![1.0, 3.0, 5.5, 9.0],
            median_index: Some(1),
        });
        assert_eq!(text, "Judges: 1 [3] 5.5 9");
    }

    #[test]
    fn test_render_prompt_and_error() {
        let text = render(&DisplayEvent::PromptChosen {
            prompt: Prompt::no_prompt_found(),
        });
        assert!(text.starts_with("Prompt: No prompts left"));

        let text = render(&DisplayEvent::Error {
            code: "ROUND_FAILED".to_string(),
            msg: "bad size".to_string(),
        });
        assert_eq!(text, "error [ROUND_FAILED]: bad size");
    }

    #[tokio::test(start_paused = true)]
    async fn test_quit_waits_for_score_in_flight() {
        let state = AppState::new();
        let player = state.add_player().await;
        state.form_round(1).await.unwrap();
        state.choose_prompt().await.unwrap();
        state.edit_judge_scores("4 6 8").await;
        state.sort_judge_scores().await.unwrap();
        state.wait_for_timers().await;

        run_with(state.clone(), &b"finalize\nquit\n"[..])
            .await
            .unwrap();

        let player = state.get_player(player.id).await.unwrap();
        assert_eq!((player.score, player.rounds_played), (6, 1));
        assert!(!state.get_judge_scores().await.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_eof_waits_for_sort_in_flight() {
        let state = AppState::new();

        run_with(state.clone(), &b"scores 9 2 5\nsort"[..])
            .await
            .unwrap();

        let judge = state.get_judge_scores().await;
        assert_eq!(judge.scores, vec![2.0, 5.0, 9.0]);
        assert_eq!(judge.median(), Some(5.0));
    }
}
