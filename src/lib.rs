pub mod adapters;
pub mod cli;
pub mod config;
pub mod coordination;
pub mod domain;
pub mod error;
pub mod gateway;
pub mod services;
pub mod validation;

pub use adapters::{BetStoreClient, HedgeApiClient};
pub use config::AppConfig;
pub use coordination::{GenerationToken, RaceGuard};
pub use error::{ErrorKind, HedgeError, Result};
pub use gateway::{BetStore, PredictionService, RosterService};
pub use services::{
    BettingForm, FormGate, LoadOutcome, OptimisticMutationCoordinator,
    PredictionRequestOrchestrator, SelectionController, SubmissionOutcome,
};
