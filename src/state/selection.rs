use crate::types::{Player, PlayerId};
use rand::Rng;
use std::collections::BTreeSet;

/// Pick up to `n` players for the next round, favouring whoever has played
/// the fewest rounds.
///
/// While the field is uneven only players below the current maximum
/// `rounds_played` are eligible. Once everyone is level the whole field is
/// eligible again. The result may be smaller than `n` when the eligible pool
/// is. `players` is expected to already exclude busted players.
pub fn select_round<R: Rng + ?Sized>(
    players: &[Player],
    n: usize,
    rng: &mut R,
) -> BTreeSet<PlayerId> {
    let Some(max_rounds) = players.iter().map(|p| p.rounds_played).max() else {
        return BTreeSet::new();
    };

    let all_level = players.iter().all(|p| p.rounds_played == max_rounds);
    let mut pool: Vec<PlayerId> = players
        .iter()
        .filter(|p| all_level || p.rounds_played < max_rounds)
        .map(|p| p.id)
        .collect();

    let mut selected = BTreeSet::new();
    while selected.len() < n && !pool.is_empty() {
        let index = rng.random_range(0..pool.len());
        selected.insert(pool.swap_remove(index));
    }
    selected
}
