use std::fmt;

use super::{CorrectionSuggestion, PredictionResult, PredictionView, SelectionField};

/// Submission lifecycle phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubmissionPhase {
    /// Nothing submitted, or the last outcome was dismissed
    Idle,
    /// Required fields missing; nothing was sent
    ValidationBlocked,
    /// Request in flight
    Submitting,
    /// Prediction received
    Success,
    /// Service rejected the input
    DomainError,
    /// Transport failure after the retry budget
    NetworkError,
}

impl SubmissionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionPhase::Idle => "IDLE",
            SubmissionPhase::ValidationBlocked => "VALIDATION_BLOCKED",
            SubmissionPhase::Submitting => "SUBMITTING",
            SubmissionPhase::Success => "SUCCESS",
            SubmissionPhase::DomainError => "DOMAIN_ERROR",
            SubmissionPhase::NetworkError => "NETWORK_ERROR",
        }
    }

    /// Check if this phase can transition to another phase
    pub fn can_transition_to(&self, target: SubmissionPhase) -> bool {
        use SubmissionPhase::*;

        match (self, target) {
            // A new submit is always allowed, including while one is in flight
            (_, Submitting) => true,
            (_, ValidationBlocked) => true,

            // Outcomes only arrive for an in-flight request
            (Submitting, Success) => true,
            (Submitting, DomainError) => true,
            (Submitting, NetworkError) => true,

            // Dismiss / retry
            (ValidationBlocked, Idle) => true,
            (Success, Idle) => true,
            (DomainError, Idle) => true,
            (NetworkError, Idle) => true,

            _ => false,
        }
    }
}

impl fmt::Display for SubmissionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Submission state together with the data each phase carries
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    ValidationBlocked {
        missing: Vec<SelectionField>,
        message: String,
    },
    Submitting,
    Success(Box<PredictionResult>),
    DomainError {
        message: String,
        suggestions: Vec<CorrectionSuggestion>,
    },
    NetworkError {
        message: String,
    },
}

impl SubmissionState {
    pub fn phase(&self) -> SubmissionPhase {
        match self {
            SubmissionState::Idle => SubmissionPhase::Idle,
            SubmissionState::ValidationBlocked { .. } => SubmissionPhase::ValidationBlocked,
            SubmissionState::Submitting => SubmissionPhase::Submitting,
            SubmissionState::Success(_) => SubmissionPhase::Success,
            SubmissionState::DomainError { .. } => SubmissionPhase::DomainError,
            SubmissionState::NetworkError { .. } => SubmissionPhase::NetworkError,
        }
    }

    pub fn result(&self) -> Option<&PredictionResult> {
        match self {
            SubmissionState::Success(result) => Some(result),
            _ => None,
        }
    }

    pub fn view(&self) -> Option<PredictionView> {
        self.result().map(PredictionView::from_result)
    }

    /// Warning carried by a successful prediction
    pub fn warning(&self) -> Option<&str> {
        self.result().and_then(|r| r.warning.as_deref())
    }

    pub fn suggestions(&self) -> &[CorrectionSuggestion] {
        match self {
            SubmissionState::DomainError { suggestions, .. } => suggestions,
            _ => &[],
        }
    }

    /// Message to show in the error banner, if any
    pub fn message(&self) -> Option<&str> {
        match self {
            SubmissionState::ValidationBlocked { message, .. }
            | SubmissionState::DomainError { message, .. }
            | SubmissionState::NetworkError { message } => Some(message),
            _ => None,
        }
    }
}
