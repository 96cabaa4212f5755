pub mod form;
pub mod mutation;
pub mod prediction;
pub mod selection;

pub use form::{BettingForm, FormGate};
pub use mutation::OptimisticMutationCoordinator;
pub use prediction::{PredictionRequestOrchestrator, SubmissionOutcome};
pub use selection::{LoadOutcome, SelectionController, SelectionOptions};
