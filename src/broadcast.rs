use crate::console::render;
use crate::state::AppState;
use tokio::sync::broadcast::error::RecvError;

/// Spawn a background task that prints events committed by timers (sorted
/// judge scores, finalized rounds) as they arrive
pub fn spawn_display_renderer(state: &AppState) {
    let mut rx = state.display_broadcast.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => println!("{}", render(&event)),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Display renderer skipped {} events", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
    });
}
