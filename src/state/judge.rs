//! Judge score collection and the median hand-off.
//!
//! Judges' scores are typed in, sorted with a short slide animation, and the
//! median is then flown over to the round's players. Both animations are
//! modelled as pending transitions: while one is in flight the widget turns
//! away edits, sorts and finalizes, and the commit always lands exactly once
//! when the timer fires.

use super::AppState;
use crate::protocol::DisplayEvent;
use crate::types::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PendingTransition {
    /// Scores are sliding into sorted order
    Sort,
    /// The median is on its way to the players
    ScoreFlight,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JudgeScores {
    pub scores: Vec<f64>,
    /// Index into `scores` of the median, once a sort has been committed
    pub median_index: Option<usize>,
    pub pending: Option<PendingTransition>,
}

impl Default for JudgeScores {
    fn default() -> Self {
        Self {
            scores: vec![0.0],
            median_index: None,
            pending: None,
        }
    }
}

/// Parse whitespace-separated numbers, skipping anything that isn't one
pub fn parse_scores(text: &str) -> Vec<f64> {
    text.split_whitespace()
        .filter_map(|token| token.parse::<f64>().ok())
        .filter(|score| score.is_finite())
        .collect()
}

/// A median on its way to the round it was earned on
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreHandoff {
    pub median: f64,
    /// Players that will be credited when the flight lands. Empty if nothing
    /// was on stage.
    pub player_ids: Vec<PlayerId>,
}

impl JudgeScores {
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// The committed median, if a sort has finished since the last edit
    pub fn median(&self) -> Option<f64> {
        self.median_index.and_then(|i| self.scores.get(i).copied())
    }

    /// Replace the scores with whatever numbers `text` contains. Returns false
    /// (and changes nothing) if there are none or a transition is pending.
    pub fn edit(&mut self, text: &str) -> bool {
        if self.is_pending() {
            return false;
        }
        let scores = parse_scores(text);
        if scores.is_empty() {
            return false;
        }
        self.scores = scores;
        self.median_index = None;
        true
    }

    /// Start a sort. The returned plan says where each score moves and what
    /// to commit once the animation is over.
    pub fn begin_sort(&mut self) -> Option<SortPlan> {
        if self.is_pending() || self.scores.is_empty() {
            return None;
        }

        let mut indexed: Vec<(usize, f64)> = self.scores.iter().copied().enumerate().collect();
        // sort_by is stable, so equal scores keep their entered order
        indexed.sort_by(|a, b| a.1.total_cmp(&b.1));

        let moves = indexed
            .iter()
            .enumerate()
            .map(|(to, &(from, value))| ScoreMove { from, to, value })
            .collect();
        let sorted = indexed.iter().map(|&(_, value)| value).collect();
        let median_index = (indexed.len() - 1) / 2;

        self.pending = Some(PendingTransition::Sort);
        Some(SortPlan {
            moves,
            sorted,
            median_index,
        })
    }

    pub fn commit_sort(&mut self, plan: SortPlan) {
        self.scores = plan.sorted;
        self.median_index = Some(plan.median_index);
        self.pending = None;
    }

    /// Hand off the median and reset to a single zero. Nothing happens unless
    /// a median has been committed and no transition is pending.
    pub fn take_median(&mut self) -> Option<f64> {
        if self.is_pending() {
            return None;
        }
        let median = self.median()?;
        *self = Self {
            pending: Some(PendingTransition::ScoreFlight),
            ..Self::default()
        };
        Some(median)
    }

    pub fn finish_score_flight(&mut self) {
        if self.pending == Some(PendingTransition::ScoreFlight) {
            self.pending = None;
        }
    }
}

impl AppState {
    pub async fn get_judge_scores(&self) -> JudgeScores {
        self.judge.read().await.clone()
    }

    /// Replace the judges' scores from free text
    pub async fn edit_judge_scores(&self, text: &str) -> bool {
        let accepted = self.judge.write().await.edit(text);
        if !accepted {
            tracing::debug!("Ignoring score edit {:?}", text);
        }
        accepted
    }

    /// Start sorting the judges' scores. The sorted order and median are
    /// committed after the sort transition delay.
    pub async fn sort_judge_scores(&self) -> Option<SortPlan> {
        let plan = self.judge.write().await.begin_sort()?;

        let state = self.clone();
        let delay = self.config.sort_transition;
        let committed = plan.clone();
        self.spawn_timer(async move {
            tokio::time::sleep(delay).await;

            let event = {
                let mut judge = state.judge.write().await;
                judge.commit_sort(committed);
                DisplayEvent::JudgeScores {
                    scores: judge.scores.clone(),
                    median_index: judge.median_index,
                }
            };
            tracing::info!("Judge scores sorted");
            state.broadcast(event);
        })
        .await;

        Some(plan)
    }

    /// Send the median to the round on stage. The round is taken off the
    /// stage now, so the host can line up the next one during the flight;
    /// points land on these players once the score flight delay has passed.
    pub async fn finalize_judging(&self) -> Option<ScoreHandoff> {
        let median = self.judge.write().await.take_median()?;
        let points = median.round() as i64;
        let round = self.take_scorable_round().await;
        let generation = *self.game_generation.read().await;

        let handoff = ScoreHandoff {
            median,
            player_ids: round
                .as_ref()
                .map(|r| r.selected_player_ids.iter().copied().collect())
                .unwrap_or_default(),
        };

        let state = self.clone();
        let delay = self.config.score_flight;
        self.spawn_timer(async move {
            tokio::time::sleep(delay).await;

            let was_reset = *state.game_generation.read().await != generation;
            match round {
                Some(_) if was_reset => {
                    tracing::info!("Game reset during the score flight, {} points dropped", points);
                }
                Some(round) => {
                    if let Some(players) = state.score_round(round, points).await {
                        state.broadcast(DisplayEvent::RoundFinalized { points, players });
                    }
                }
                None => tracing::debug!("Score flight landed with nobody on stage"),
            }
            state.judge.write().await.finish_score_flight();

            let judge = state.get_judge_scores().await;
            state.broadcast(DisplayEvent::JudgeScores {
                scores: judge.scores,
                median_index: judge.median_index,
            });
        })
        .await;

        Some(handoff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn sorted_median(scores: &str) -> f64 {
        let mut judge = JudgeScores::default();
        assert!(judge.edit(scores));
        let plan = judge.begin_sort().unwrap();
        judge.commit_sort(plan);
        judge.median().unwrap()
    }

    #[test]
    fn test_median_examples() {
        assert_eq!(sorted_median("5 3 9 1"), 3.0);
        assert_eq!(sorted_median("7"), 7.0);
        assert_eq!(sorted_median("2 8 5"), 5.0);
    }

    #[test]
    fn test_parse_scores_skips_junk() {
        assert_eq!(parse_scores("7 eight 9.5  x 10"), vec![7.0, 9.5, 10.0]);
        assert_eq!(parse_scores("NaN inf -3"), vec![-3.0]);
        assert!(parse_scores("   ").is_empty());
    }

    #[test]
    fn test_edit_with_no_numbers_keeps_scores() {
        let mut judge = JudgeScores::default();
        judge.edit("4 6");
        assert!(!judge.edit("none here"));
        assert_eq!(judge.scores, vec![4.0, 6.0]);
    }

    #[test]
    fn test_sort_plan_tracks_positions() {
        let mut judge = JudgeScores::default();
        judge.edit("5 3 9 1");
        let plan = judge.begin_sort().unwrap();

        assert_eq!(plan.sorted, vec![1.0, 3.0, 5.0, 9.0]);
        assert_eq!(plan.median_index, 1);
        assert_eq!(
            plan.moves[0],
            ScoreMove {
                from: 3,
                to: 0,
                value: 1.0
            }
        );
        assert_eq!(
            plan.moves[3],
            ScoreMove {
                from: 2,
                to: 3,
                value: 9.0
            }
        );
    }

    #[test]
    fn test_sort_is_stable_for_ties() {
        let mut judge = JudgeScores::default();
        judge.edit("4 2 4 2");
        let plan = judge.begin_sort().unwrap();

        let froms: Vec<_> = plan.moves.iter().map(|m| m.from).collect();
        assert_eq!(froms, vec![1, 3, 0, 2]);
    }

    #[test]
    fn test_pending_sort_rejects_other_actions() {
        let mut judge = JudgeScores::default();
        judge.edit("1 2 3");
        let plan = judge.begin_sort().unwrap();

        assert!(judge.begin_sort().is_none());
        assert!(!judge.edit("9"));
        assert!(judge.take_median().is_none());

        judge.commit_sort(plan);
        assert_eq!(judge.median(), Some(2.0));
    }

    #[test]
    fn test_edit_after_sort_clears_median() {
        let mut judge = JudgeScores::default();
        judge.edit("6 2 4");
        let plan = judge.begin_sort().unwrap();
        judge.commit_sort(plan);
        assert!(judge.median().is_some());

        judge.edit("6 2 4 10");
        assert!(judge.median().is_none());
        assert!(judge.take_median().is_none());
        assert_eq!(judge.scores, vec![6.0, 2.0, 4.0, 10.0]);
    }

    #[test]
    fn test_take_median_resets() {
        let mut judge = JudgeScores::default();
        judge.edit("8 6 7");
        let plan = judge.begin_sort().unwrap();
        judge.commit_sort(plan);

        assert_eq!(judge.take_median(), Some(7.0));
        assert_eq!(judge.scores, vec![0.0]);
        assert_eq!(judge.median_index, None);
        assert_eq!(judge.pending, Some(PendingTransition::ScoreFlight));

        judge.finish_score_flight();
        assert!(!judge.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sort_commits_after_delay() {
        let state = AppState::new();
        state.edit_judge_scores("9 1 5").await;

        let plan = state.sort_judge_scores().await.unwrap();
        assert_eq!(plan.median_index, 1);
        assert!(state.get_judge_scores().await.is_pending());
        assert!(state.sort_judge_scores().await.is_none());

        tokio::time::sleep(state.config.sort_transition + Duration::from_millis(10)).await;

        let judge = state.get_judge_scores().await;
        assert!(!judge.is_pending());
        assert_eq!(judge.scores, vec![1.0, 5.0, 9.0]);
        assert_eq!(judge.median(), Some(5.0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_finalize_without_median_is_noop() {
        let state = AppState::new();
        let player = state.add_player().await;
        state.form_round(1).await.unwrap();
        state.choose_prompt().await;
        state.edit_judge_scores("4 5").await;

        assert!(state.finalize_judging().await.is_none());
        tokio::time::sleep(state.config.score_flight * 2).await;

        let player = state.get_player(player.id).await.unwrap();
        assert_eq!(player.score, 0);
        assert_eq!(player.rounds_played, 0);
        assert_eq!(state.get_judge_scores().await.scores, vec![4.0, 5.0]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_finalize_applies_rounded_median() {
        let state = AppState::new();
        let player = state.add_player().await;
        state.form_round(1).await.unwrap();
        state.choose_prompt().await;

        state.edit_judge_scores("6.5 9 6").await;
        state.sort_judge_scores().await.unwrap();
        tokio::time::sleep(state.config.sort_transition * 2).await;

        let handoff = state.finalize_judging().await.unwrap();
        assert_eq!(handoff.median, 6.5);
        assert_eq!(handoff.player_ids, vec![player.id]);
        // Nothing lands until the flight is over
        assert_eq!(state.get_player(player.id).await.unwrap().score, 0);
        assert!(state.sort_judge_scores().await.is_none());

        tokio::time::sleep(state.config.score_flight * 2).await;

        let player = state.get_player(player.id).await.unwrap();
        assert_eq!(player.score, 7);
        assert_eq!(player.rounds_played, 1);
        assert!(!state.get_judge_scores().await.is_pending());
        assert_eq!(state.get_round().await.phase(), RoundPhase::Idle);
    }
    async fn sorted_round(state: &AppState, size: u8, scores: &str) -> Round {
        state.form_round(size).await.unwrap();
        state.choose_prompt().await.unwrap();
        state.edit_judge_scores(scores).await;
        state.sort_judge_scores().await.unwrap();
        state.wait_for_timers().await;
        state.get_round().await
    }

    #[tokio::test(start_paused = true)]
    async fn test_next_round_during_flight_keeps_credit_with_judged_players() {
        let state = AppState::new();
        state.add_player().await;
        state.add_player().await;

        let judged = sorted_round(&state, 1, "5").await;
        let performed = judged.current_prompt.clone().unwrap();

        let handoff = state.finalize_judging().await.unwrap();
        assert_eq!(
            handoff.player_ids,
            judged.selected_player_ids.iter().copied().collect::<Vec<_>>()
        );
        assert_eq!(state.get_round().await.phase(), RoundPhase::Idle);

        // The host lines up the next round before the score lands
        state.form_round(2).await.unwrap();
        let next_prompt = state.choose_prompt().await.unwrap();

        tokio::time::sleep(state.config.score_flight * 2).await;

        for player in state.get_players().await {
            if judged.selected_player_ids.contains(&player.id) {
                assert_eq!((player.score, player.rounds_played), (5, 1));
            } else {
                assert_eq!((player.score, player.rounds_played), (0, 0));
            }
        }
        assert_eq!(state.get_used_prompts().await, vec![performed.id]);
        // The new round is still on stage, untouched
        let round = state.get_round().await;
        assert_eq!(round.selected_player_ids.len(), 2);
        assert_eq!(round.current_prompt, Some(next_prompt));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_during_flight_drops_points() {
        let state = AppState::new();
        state.add_player().await;
        sorted_round(&state, 1, "9").await;

        state.finalize_judging().await.unwrap();
        state.reset_all().await;
        // Fresh roster reuses id 1
        let newcomer = state.add_player().await;

        state.wait_for_timers().await;

        let newcomer = state.get_player(newcomer.id).await.unwrap();
        assert_eq!((newcomer.score, newcomer.rounds_played), (0, 0));
        assert!(state.get_used_prompts().await.is_empty());
        assert!(!state.get_judge_scores().await.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_timers_lands_pending_flight() {
        let state = AppState::new();
        let player = state.add_player().await;
        sorted_round(&state, 1, "3 4 8").await;

        state.finalize_judging().await.unwrap();
        state.wait_for_timers().await;

        let player = state.get_player(player.id).await.unwrap();
        assert_eq!((player.score, player.rounds_played), (4, 1));
        assert!(!state.get_judge_scores().await.is_pending());
    }
}
