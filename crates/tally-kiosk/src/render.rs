//! Plain-text rendering of kiosk state.

use tally_core::branding::Branding;
use tally_core::health::{PoolSeverity, PoolStatus};
use tally_core::results::{ResultsState, ResultsView};
use tally_core::vote::VoteState;
use tally_core::{ChoiceCatalog, ConnectionHealth, ConnectionSeverity, Failure};

pub const BAR_WIDTH: usize = 30;

pub fn bar(percentage: f64, width: usize) -> String {
    let filled = ((percentage.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    format!("{}{}", "#".repeat(filled), ".".repeat(width - filled))
}

pub fn results(view: &ResultsView) -> String {
    let label_width = view.rows.iter().map(|r| r.label.len()).max().unwrap_or(0);
    let mut out = String::new();
    for row in &view.rows {
        out.push_str(&format!(
            "{:<label_width$}  {}  {}\n",
            row.label,
            bar(row.percentage, BAR_WIDTH),
            row.count,
        ));
    }
    out.push_str(&format!("Total votes: {}\n", view.total));
    out
}

pub fn banner(failure: &Failure) -> String {
    format!("!! {}", failure.message)
}

pub fn board(state: &ResultsState) -> String {
    let mut out = String::new();
    if let Some(failure) = &state.banner {
        out.push_str(&banner(failure));
        out.push('\n');
    }
    match &state.view {
        Some(view) => out.push_str(&results(view)),
        None => out.push_str("Loading results...\n"),
    }
    out
}

pub fn connection(health: &ConnectionHealth) -> &'static str {
    match health.severity {
        ConnectionSeverity::Ok => "Live",
        ConnectionSeverity::Degraded => "Reconnecting...",
        ConnectionSeverity::Failed => "Connection lost, still retrying",
    }
}

pub fn pool(status: &PoolStatus) -> String {
    let marker = match status.severity {
        PoolSeverity::Normal => "ok",
        PoolSeverity::Warning => "WARN",
        PoolSeverity::Critical => "CRIT",
    };
    format!("DB pool {}/{} [{}]", status.used, status.capacity, marker)
}

pub fn menu(catalog: &ChoiceCatalog) -> String {
    catalog
        .iter()
        .map(|c| format!("  {:<8} {}\n", c.id, c.label))
        .collect()
}

pub fn vote(state: &VoteState, label: Option<&str>) -> String {
    match state {
        VoteState::Idle => "Pick a choice.".to_string(),
        VoteState::Pending => "Submitting vote...".to_string(),
        VoteState::Confirmed => match label {
            Some(label) => format!("Thanks! You voted: {}", label),
            None => "Thanks for voting!".to_string(),
        },
        VoteState::Failed(failure) => format!("{} Retry? [y/N]", failure.message),
    }
}

pub fn branding(branding: &Branding) -> String {
    format!(
        "{} (server {}, logo {})",
        branding.conference.name, branding.version, branding.conference.logo
    )
}
