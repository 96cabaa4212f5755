use std::sync::Arc;

use tracing::info;

use crate::domain::{Session, SubmissionPhase};
use crate::error::Result;
use crate::gateway::{PredictionService, RosterService};
use crate::services::prediction::{PredictionRequestOrchestrator, SubmissionOutcome};
use crate::services::selection::SelectionController;

/// Result of mounting the betting form for a session
pub enum FormGate {
    /// No user; show the sign-in prompt instead of the form
    SignInRequired,
    Ready(Box<BettingForm>),
}

impl FormGate {
    pub fn into_form(self) -> Option<BettingForm> {
        match self {
            FormGate::Ready(form) => Some(*form),
            FormGate::SignInRequired => None,
        }
    }
}

/// Selection and submission wired together for one signed-in user
pub struct BettingForm {
    selection: SelectionController,
    predictions: PredictionRequestOrchestrator,
}

impl BettingForm {
    /// Gate on the session and start loading teams
    pub fn mount(
        session: Session,
        catalog: Arc<dyn RosterService>,
        predictor: Arc<dyn PredictionService>,
    ) -> FormGate {
        if !session.is_signed_in() {
            return FormGate::SignInRequired;
        }

        info!(user = session.label(), "betting form mounted");
        let mut selection = SelectionController::new(catalog);
        selection.load_teams();

        FormGate::Ready(Box::new(Self {
            selection,
            predictions: PredictionRequestOrchestrator::new(predictor, session),
        }))
    }

    pub fn selection(&self) -> &SelectionController {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut SelectionController {
        &mut self.selection
    }

    pub fn predictions(&self) -> &PredictionRequestOrchestrator {
        &self.predictions
    }

    pub fn predictions_mut(&mut self) -> &mut PredictionRequestOrchestrator {
        &mut self.predictions
    }

    /// Submit the current selection and wait for its outcome.
    /// A displayed success resets the selection for the next bet.
    pub async fn submit(&mut self) -> Result<SubmissionOutcome> {
        let outcome = self
            .predictions
            .submit_and_wait(self.selection.state())
            .await?;

        if outcome.applied && outcome.state.phase() == SubmissionPhase::Success {
            self.selection.reset();
        }
        Ok(outcome)
    }

    pub fn choose_suggestion(&mut self, index: usize) -> Result<String> {
        self.predictions.choose_suggestion(index, &mut self.selection)
    }

    /// Apply every outstanding option fetch
    pub async fn settle(&mut self) {
        self.selection.settle().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        BetAction, BetType, OptionSlot, Player, PredictionResult, SelectionState, SessionUser,
        Team,
    };
    use crate::gateway::{MockPredictionService, MockRosterService};
    use rust_decimal_macros::dec;

    fn roster() -> MockRosterService {
        let mut roster = MockRosterService::new();
        roster.expect_teams().returning(|| {
            Ok(vec![Team {
                abbreviation: "KC".into(),
                full_name: "Kansas City Chiefs".into(),
            }])
        });
        roster.expect_players().returning(|_| {
            Ok(vec![Player {
                name: "Patrick Mahomes".into(),
                position: "QB".into(),
                id: None,
                jersey_number: Some(15),
            }])
        });
        roster.expect_actions().returning(|_| {
            Ok(vec![BetAction {
                value: "Passing Yards".into(),
            }])
        });
        roster
    }

    fn signed_in() -> Session {
        Session::from_provider(Some(SessionUser {
            name: Some("Tim".into()),
            email: None,
        }))
    }

    #[tokio::test]
    async fn test_anonymous_session_gets_sign_in_prompt() {
        let gate = BettingForm::mount(
            Session::Anonymous,
            Arc::new(MockRosterService::new()),
            Arc::new(MockPredictionService::new()),
        );
        assert!(matches!(gate, FormGate::SignInRequired));
    }

    #[tokio::test]
    async fn test_successful_submission_resets_selection() {
        let mut predictor = MockPredictionService::new();
        predictor.expect_predict().times(1).returning(|_| {
            let result: PredictionResult = serde_json::from_value(serde_json::json!({
                "player": {"name": "Patrick Mahomes"},
                "bet": {"action": "Passing Yards", "type": "under", "threshold": 275.5},
                "prediction": {"q10": 180.0, "q50": 251.3, "q90": 322.9},
                "analysis": {"win_probability": 0.65, "recommendation": "Good Bet",
                             "expected_value": 0.3, "confidence_level": "High"},
                "details": {"games_analyzed": 8, "current_week": 9, "current_season": 2025}
            }))
            .unwrap();
            Ok(result)
        });

        let mut form = BettingForm::mount(signed_in(), Arc::new(roster()), Arc::new(predictor))
            .into_form()
            .unwrap();
        assert!(form.selection().loading(OptionSlot::Teams));
        form.settle().await;
        assert_eq!(form.selection().options().teams.len(), 1);

        let selection = form.selection_mut();
        selection.set_team("KC");
        selection.settle().await;
        selection.set_player("Patrick Mahomes");
        selection.settle().await;
        selection.set_action("Passing Yards");
        selection.set_bet_type(Some(BetType::Under));
        selection.set_amounts(Some(275.5), Some(dec!(20)));

        let outcome = form.submit().await.unwrap();

        assert!(outcome.applied);
        assert_eq!(form.predictions().phase(), SubmissionPhase::Success);
        assert_eq!(form.selection().state(), &SelectionState::new());
        assert_eq!(form.predictions().view().unwrap().q50, "251.3");
    }
}
