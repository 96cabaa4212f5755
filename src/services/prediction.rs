//! Submission lifecycle for bet predictions
//!
//! `idle → submitting → {success, domainError, networkError}`, with
//! `validationBlocked` reached without touching the network. Overlapping
//! submissions each run to completion; only the most recent one may set the
//! displayed state.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::coordination::{GenerationToken, RaceGuard};
use crate::domain::{
    CorrectionSuggestion, PredictionResult, PredictionView, Session, SelectionState,
    SubmissionPhase, SubmissionState,
};
use crate::error::{ErrorKind, HedgeError, Result};
use crate::gateway::PredictionService;
use crate::services::selection::SelectionController;
use crate::validation::validate_selection;

const PREDICT_SLOT: &str = "predict-bet";

/// Banner text for transport failures
pub const NETWORK_ERROR_MESSAGE: &str =
    "Network error. Please check that the prediction service is reachable and try again.";

/// Banner text when the service rejects input without saying why
pub const DOMAIN_ERROR_FALLBACK: &str = "Error generating prediction. Please try again.";

#[derive(Debug)]
struct PredictionCompletion {
    token: GenerationToken,
    result: Result<PredictionResult>,
}

/// Result of one submission, whether or not it reached the screen
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionOutcome {
    pub token: GenerationToken,
    pub state: SubmissionState,
    /// False when a newer submission had already superseded this one
    pub applied: bool,
}

pub struct PredictionRequestOrchestrator {
    service: Arc<dyn PredictionService>,
    session: Session,
    state: SubmissionState,
    guard: RaceGuard<&'static str>,
    completions_tx: mpsc::UnboundedSender<PredictionCompletion>,
    completions_rx: mpsc::UnboundedReceiver<PredictionCompletion>,
    in_flight: usize,
}

impl PredictionRequestOrchestrator {
    pub fn new(service: Arc<dyn PredictionService>, session: Session) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            service,
            session,
            state: SubmissionState::Idle,
            guard: RaceGuard::new(),
            completions_tx,
            completions_rx,
            in_flight: 0,
        }
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    pub fn phase(&self) -> SubmissionPhase {
        self.state.phase()
    }

    pub fn view(&self) -> Option<PredictionView> {
        self.state.view()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Ranked corrections offered by the last domain error
    pub fn suggestions(&self) -> &[CorrectionSuggestion] {
        self.state.suggestions()
    }

    /// Validate the selection and send it to the scoring service.
    ///
    /// Nothing is sent for an anonymous session or an incomplete selection.
    /// The returned token identifies this submission's outcome.
    pub fn submit(&mut self, selection: &SelectionState) -> Result<GenerationToken> {
        if !self.session.is_signed_in() {
            return Err(HedgeError::Unauthenticated);
        }

        let request = match validate_selection(selection) {
            Ok(request) => request,
            Err(e) => {
                let message = match &e {
                    HedgeError::Validation(message) => message.clone(),
                    other => other.to_string(),
                };
                debug!(%message, "submission blocked");
                self.state = SubmissionState::ValidationBlocked {
                    missing: selection.missing_fields(),
                    message,
                };
                return Err(e);
            }
        };

        let token = self.guard.begin_request(PREDICT_SLOT);
        self.state = SubmissionState::Submitting;
        info!(
            %token,
            user = self.session.label(),
            player = %request.player,
            action = %request.action,
            bet_type = %request.bet_type,
            "submitting prediction request"
        );

        let service = Arc::clone(&self.service);
        let tx = self.completions_tx.clone();
        self.in_flight += 1;
        tokio::spawn(async move {
            let result = service.predict(&request).await;
            let _ = tx.send(PredictionCompletion { token, result });
        });

        Ok(token)
    }

    /// Submit and wait for this submission's own outcome
    pub async fn submit_and_wait(
        &mut self,
        selection: &SelectionState,
    ) -> Result<SubmissionOutcome> {
        let token = self.submit(selection)?;
        while let Some(outcome) = self.next_outcome().await {
            if outcome.token == token {
                return Ok(outcome);
            }
        }
        Err(HedgeError::Internal(format!("submission {} never settled", token)))
    }

    /// Wait for one submission to finish. Returns `None` immediately when
    /// nothing is in flight.
    pub async fn next_outcome(&mut self) -> Option<SubmissionOutcome> {
        if self.in_flight == 0 {
            return None;
        }
        let PredictionCompletion { token, result } = self.completions_rx.recv().await?;
        self.in_flight -= 1;

        let state = classify(result);
        let applied = self.guard.is_current(PREDICT_SLOT, token)
            && self.state.phase().can_transition_to(state.phase());

        if applied {
            info!(%token, phase = %state.phase(), "prediction settled");
            self.state = state.clone();
        } else {
            debug!(%token, "discarding superseded prediction");
        }

        Some(SubmissionOutcome {
            token,
            state,
            applied,
        })
    }

    /// Drain every in-flight submission
    pub async fn settle(&mut self) -> Vec<SubmissionOutcome> {
        let mut outcomes = Vec::new();
        while let Some(outcome) = self.next_outcome().await {
            outcomes.push(outcome);
        }
        outcomes
    }

    /// Dismiss a finished outcome and return to idle. Does not resubmit.
    pub fn retry(&mut self) -> Result<()> {
        let phase = self.state.phase();
        if phase == SubmissionPhase::Idle {
            return Ok(());
        }
        if !phase.can_transition_to(SubmissionPhase::Idle) {
            return Err(HedgeError::InvalidStateTransition {
                from: phase.to_string(),
                to: SubmissionPhase::Idle.to_string(),
            });
        }
        self.state = SubmissionState::Idle;
        Ok(())
    }

    /// Accept a correction: set the player to the exact suggested name and
    /// clear the error. Returns the chosen name.
    pub fn choose_suggestion(
        &mut self,
        index: usize,
        selection: &mut SelectionController,
    ) -> Result<String> {
        let player = self
            .suggestions()
            .get(index)
            .map(|s| s.player.clone())
            .ok_or_else(|| {
                HedgeError::Validation(format!("no correction suggestion at position {}", index))
            })?;

        selection.set_player(&player);
        self.state = SubmissionState::Idle;
        info!(%player, "correction suggestion chosen");
        Ok(player)
    }
}

fn classify(result: Result<PredictionResult>) -> SubmissionState {
    match result {
        Ok(prediction) => SubmissionState::Success(Box::new(prediction)),
        Err(e) if e.kind() == ErrorKind::Domain => {
            let suggestions = CorrectionSuggestion::ranked(e.suggestions().to_vec());
            let message = match e {
                HedgeError::Domain { message, .. } if !message.trim().is_empty() => message,
                HedgeError::Domain { .. } => DOMAIN_ERROR_FALLBACK.to_string(),
                other => other.to_string(),
            };
            SubmissionState::DomainError {
                message,
                suggestions,
            }
        }
        Err(e) => {
            warn!(error = %e, "prediction request failed");
            SubmissionState::NetworkError {
                message: NETWORK_ERROR_MESSAGE.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BetType, OptionSlot, SelectionField, SessionUser};
    use crate::gateway::{MockPredictionService, MockRosterService};
    use rust_decimal_macros::dec;

    const RESULT: &str = r#"{
        "player": {"name": "Josh Allen", "position": "QB", "team": "BUF"},
        "bet": {"action": "Passing Yards", "type": "over", "threshold": 250.5},
        "prediction": {"q10": 10.0, "q50": 20.0, "q90": 30.0},
        "analysis": {"win_probability": 0.4, "recommendation": "Fair Bet",
                     "expected_value": -0.05, "confidence_level": "Low"},
        "details": {"games_analyzed": 3, "current_week": 9, "current_season": 2025},
        "warning": "Only 3 games of history"
    }"#;

    fn prediction() -> PredictionResult {
        serde_json::from_str(RESULT).unwrap()
    }

    fn signed_in() -> Session {
        Session::SignedIn(SessionUser {
            name: Some("Tim".into()),
            email: Some("tim@example.com".into()),
        })
    }

    fn complete() -> SelectionState {
        SelectionState {
            team: Some("BUF".into()),
            player: Some("Josh".into()),
            bet_type: Some(BetType::Over),
            action: Some("Passing Yards".into()),
            action_amount: Some(250.5),
            bet_amount: Some(dec!(50)),
            ..Default::default()
        }
    }

    fn orchestrator(service: MockPredictionService) -> PredictionRequestOrchestrator {
        PredictionRequestOrchestrator::new(Arc::new(service), signed_in())
    }

    #[tokio::test]
    async fn test_incomplete_selection_never_reaches_service() {
        for field in SelectionField::REQUIRED {
            let mut service = MockPredictionService::new();
            service.expect_predict().times(0);
            let mut orchestrator = orchestrator(service);

            let mut selection = complete();
            match field {
                SelectionField::Team => selection.team = None,
                SelectionField::Player => selection.player = Some(String::new()),
                SelectionField::BetType => selection.bet_type = None,
                SelectionField::Action => selection.action = None,
                SelectionField::ActionAmount => selection.action_amount = None,
                SelectionField::BetAmount => selection.bet_amount = None,
            }

            let err = orchestrator.submit(&selection).unwrap_err();
            assert!(matches!(err, HedgeError::Validation(_)));
            assert_eq!(orchestrator.phase(), SubmissionPhase::ValidationBlocked);
            match orchestrator.state() {
                SubmissionState::ValidationBlocked { missing, .. } => {
                    assert_eq!(missing, &vec![field])
                }
                other => panic!("unexpected state {other:?}"),
            }
            assert!(orchestrator.next_outcome().await.is_none());
        }
    }

    #[tokio::test]
    async fn test_anonymous_session_is_rejected_locally() {
        let mut service = MockPredictionService::new();
        service.expect_predict().times(0);
        let mut orchestrator =
            PredictionRequestOrchestrator::new(Arc::new(service), Session::Anonymous);

        let err = orchestrator.submit(&complete()).unwrap_err();
        assert!(matches!(err, HedgeError::Unauthenticated));
        assert_eq!(orchestrator.phase(), SubmissionPhase::Idle);
    }

    #[tokio::test]
    async fn test_success_carries_result_and_warning() {
        let mut service = MockPredictionService::new();
        service
            .expect_predict()
            .withf(|request| request.player == "Josh" && request.bet_amount == dec!(50))
            .times(1)
            .returning(|_| Ok(prediction()));
        let mut orchestrator = orchestrator(service);

        orchestrator.submit(&complete()).unwrap();
        assert_eq!(orchestrator.phase(), SubmissionPhase::Submitting);

        let outcome = orchestrator.next_outcome().await.unwrap();
        assert!(outcome.applied);
        assert_eq!(orchestrator.phase(), SubmissionPhase::Success);
        assert_eq!(orchestrator.state().warning(), Some("Only 3 games of history"));

        let view = orchestrator.view().unwrap();
        assert_eq!(view.quantiles(), ["10.0", "20.0", "30.0"]);
        assert_eq!(view.recommendation.as_str(), "Fair Bet");
    }

    #[tokio::test]
    async fn test_domain_error_suggestion_sets_exact_player() {
        for (index, expected) in [(1, "Josh Jacobs"), (0, "Josh Allen")] {
            let mut service = MockPredictionService::new();
            service
                .expect_predict()
                .withf(|request| request.player == "Josh")
                .times(1)
                .returning(|_| {
                    Err(HedgeError::Domain {
                        message: "Player \"Josh\" not found in database".into(),
                        suggestions: vec!["Josh Allen".into(), "Josh Jacobs".into()],
                    })
                });
            let mut orchestrator = orchestrator(service);

            let mut roster = MockRosterService::new();
            roster.expect_players().returning(|_| Ok(vec![]));
            let mut selection = SelectionController::new(Arc::new(roster));
            selection.set_team("BUF");
            selection.settle().await;
            selection.set_player("Josh");
            selection.set_bet_type(Some(BetType::Over));
            selection.set_action("Passing Yards");
            selection.set_amounts(Some(250.5), Some(dec!(50)));

            orchestrator.submit(selection.state()).unwrap();
            orchestrator.settle().await;

            assert_eq!(orchestrator.phase(), SubmissionPhase::DomainError);
            let suggestions = orchestrator.suggestions();
            assert_eq!(suggestions.len(), 2);
            assert_eq!(suggestions[0].rank, 1);
            assert_eq!(suggestions[0].player, "Josh Allen");
            assert_eq!(suggestions[1].player, "Josh Jacobs");

            let chosen = orchestrator.choose_suggestion(index, &mut selection).unwrap();
            assert_eq!(chosen, expected);
            assert_eq!(selection.state().player.as_deref(), Some(expected));
            assert_eq!(selection.state().team.as_deref(), Some("BUF"));
            assert_eq!(orchestrator.phase(), SubmissionPhase::Idle);
            assert!(orchestrator.state().message().is_none());
            assert!(orchestrator.suggestions().is_empty());
            assert!(!selection.loading(OptionSlot::Actions));
        }
    }

    #[tokio::test]
    async fn test_transport_failure_shows_generic_message() {
        let mut service = MockPredictionService::new();
        service
            .expect_predict()
            .returning(|_| Err(HedgeError::Network("connection refused".into())));
        let mut orchestrator = orchestrator(service);

        let outcome = orchestrator.submit_and_wait(&complete()).await.unwrap();

        assert_eq!(outcome.state.phase(), SubmissionPhase::NetworkError);
        assert_eq!(orchestrator.state().message(), Some(NETWORK_ERROR_MESSAGE));
    }

    #[tokio::test]
    async fn test_latest_submission_wins_display() {
        let mut service = MockPredictionService::new();
        service.expect_predict().times(2).returning(|request| {
            if request.player == "Josh" {
                Err(HedgeError::Domain {
                    message: "not found".into(),
                    suggestions: vec![],
                })
            } else {
                Ok(prediction())
            }
        });
        let mut orchestrator = orchestrator(service);

        let first = orchestrator.submit(&complete()).unwrap();
        let mut corrected = complete();
        corrected.player = Some("Josh Allen".into());
        let second = orchestrator.submit(&corrected).unwrap();

        let outcomes = orchestrator.settle().await;
        assert_eq!(outcomes.len(), 2);
        for outcome in &outcomes {
            assert_eq!(outcome.applied, outcome.token == second);
            if outcome.token == first {
                assert_eq!(outcome.state.phase(), SubmissionPhase::DomainError);
            }
        }
        assert_eq!(orchestrator.phase(), SubmissionPhase::Success);
    }

    #[tokio::test]
    async fn test_retry_returns_to_idle_only_from_terminal_states() {
        let mut service = MockPredictionService::new();
        service
            .expect_predict()
            .returning(|_| Err(HedgeError::Timeout { elapsed_ms: 10_000 }));
        let mut orchestrator = orchestrator(service);

        orchestrator.submit(&complete()).unwrap();
        assert!(matches!(
            orchestrator.retry(),
            Err(HedgeError::InvalidStateTransition { .. })
        ));

        orchestrator.settle().await;
        assert_eq!(orchestrator.phase(), SubmissionPhase::NetworkError);
        orchestrator.retry().unwrap();
        assert_eq!(orchestrator.phase(), SubmissionPhase::Idle);
    }

    #[test]
    fn test_blank_domain_message_falls_back() {
        let state = classify(Err(HedgeError::Domain {
            message: " ".into(),
            suggestions: vec![],
        }));
        assert_eq!(state.message(), Some(DOMAIN_ERROR_FALLBACK));
    }
}
