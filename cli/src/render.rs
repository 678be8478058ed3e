//! Text rendering of the view state.
use stats_core::{FetchOutcome, ViewState};

pub fn render(state: &ViewState) -> String {
    match state {
        ViewState::Idle => "Make API Calls\n[enter] Fetch!".to_string(),
        ViewState::Loading => "fetching...".to_string(),
        ViewState::Resolved(FetchOutcome::Success(counts)) => counts
            .iter()
            .map(|c| format!("{}: {}", c.difficulty, c.count))
            .collect::<Vec<_>>()
            .join("\n"),
        ViewState::Resolved(FetchOutcome::Failure(failure)) => {
            format!("Failed To Fetch!\n[CODE: {}]\n[enter] Retry", failure.code)
        }
    }
}
