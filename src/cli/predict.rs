//! `hedgebets predict`: build a bet scenario and score it.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use tabled::Tabled;

use super::output::{self, OutputMode};
use crate::domain::{BetType, OptionSlot, PredictionView, Session, SubmissionState};
use crate::gateway::{PredictionService, RosterService};
use crate::services::{BettingForm, FormGate};

/// Scenario entered on the command line
#[derive(Debug, Clone)]
pub struct PredictArgs {
    pub team: String,
    pub player: String,
    pub bet_type: BetType,
    pub action: String,
    pub line: f64,
    pub wager: Decimal,
    /// Resubmit with the suggestion of this rank after a domain error
    pub accept_suggestion: Option<usize>,
}

#[derive(Debug, Serialize, Tabled)]
struct FieldRow {
    field: String,
    value: String,
}

#[derive(Debug, Serialize, Tabled)]
struct SuggestionRow {
    rank: usize,
    player: String,
}

pub async fn run(
    session: Session,
    catalog: Arc<dyn RosterService>,
    predictor: Arc<dyn PredictionService>,
    args: PredictArgs,
    mode: OutputMode,
) -> anyhow::Result<()> {
    let FormGate::Ready(mut form) = BettingForm::mount(session, catalog, predictor) else {
        output::print_error(
            "Sign in required: set session.user_email (or HEDGE_SESSION__USER_EMAIL)",
        );
        anyhow::bail!("no signed-in user");
    };
    form.settle().await;

    fill(&mut form, &args, &args.player).await;
    if let Some(error) = form.selection().load_error(OptionSlot::Roster) {
        output::print_warn(&format!("Could not load roster for {}: {}", args.team, error));
    }

    let mut outcome = form.submit().await?;

    if let (Some(rank), SubmissionState::DomainError { .. }) =
        (args.accept_suggestion, &outcome.state)
    {
        let chosen = form.choose_suggestion(rank.saturating_sub(1))?;
        output::print_warn(&format!("Retrying with suggested player {}", chosen));
        fill(&mut form, &args, &chosen).await;
        outcome = form.submit().await?;
    }

    render(&outcome.state, mode)
}

async fn fill(form: &mut BettingForm, args: &PredictArgs, player: &str) {
    let team = args.team.to_uppercase();
    let selection = form.selection_mut();
    if selection.state().team.as_deref() != Some(team.as_str()) {
        selection.set_team(&team);
        selection.settle().await;
    }
    selection.set_player(player);
    selection.settle().await;
    selection.set_action(&args.action);
    selection.set_bet_type(Some(args.bet_type));
    selection.set_amounts(Some(args.line), Some(args.wager));
}

fn render(state: &SubmissionState, mode: OutputMode) -> anyhow::Result<()> {
    match state {
        SubmissionState::Success(_) => {
            let Some(view) = state.view() else {
                return Ok(());
            };
            match mode {
                OutputMode::Json => output::print_item(&view)?,
                OutputMode::Table => {
                    output::print_items(&view_rows(&view), mode)?;
                    if let Some(warning) = &view.warning {
                        output::print_warn(warning);
                    }
                }
            }
            Ok(())
        }
        SubmissionState::DomainError { message, suggestions } => {
            output::print_error(message);
            if !suggestions.is_empty() {
                output::print_warn("Did you mean:");
                let rows: Vec<SuggestionRow> = suggestions
                    .iter()
                    .map(|s| SuggestionRow {
                        rank: s.rank,
                        player: s.player.clone(),
                    })
                    .collect();
                output::print_items(&rows, mode)?;
            }
            anyhow::bail!("prediction rejected")
        }
        other => {
            let message = other.message().unwrap_or("Prediction did not complete");
            output::print_error(message);
            anyhow::bail!("prediction failed ({})", other.phase())
        }
    }
}

fn view_rows(view: &PredictionView) -> Vec<FieldRow> {
    let unit = view
        .unit
        .as_deref()
        .map(|u| format!(" {u}"))
        .unwrap_or_default();
    let row = |field: &str, value: String| FieldRow {
        field: field.to_string(),
        value,
    };

    vec![
        row("Scenario", view.headline.clone()),
        row("Pessimistic (10%)", format!("{}{}", view.q10, unit)),
        row("Expected (50%)", format!("{}{}", view.q50, unit)),
        row("Optimistic (90%)", format!("{}{}", view.q90, unit)),
        row("Win probability", view.win_probability.clone()),
        row("Recommendation", view.recommendation.to_string()),
        row("Expected value", view.expected_value.clone()),
        row("Confidence", view.confidence_level.clone()),
        row("Games analyzed", view.games_analyzed.to_string()),
        row("Timeframe", view.timeframe.clone()),
    ]
}
