use async_trait::async_trait;

use crate::domain::{
    BetAction, BetId, BetPatch, BetRecord, Player, PredictRequest, PredictionResult, Team,
};
use crate::error::Result;

/// Source of the cascading option lists (teams → roster → actions)
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RosterService: Send + Sync {
    async fn teams(&self) -> Result<Vec<Team>>;

    /// Roster for a team abbreviation
    async fn players(&self, team: &str) -> Result<Vec<Player>>;

    /// Bettable stats for a position
    async fn actions(&self, position: &str) -> Result<Vec<BetAction>>;
}

/// Remote scoring service
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PredictionService: Send + Sync {
    /// Score one complete bet scenario. A semantic rejection comes back as
    /// `HedgeError::Domain` with the service's suggestions.
    async fn predict(&self, request: &PredictRequest) -> Result<PredictionResult>;
}

/// Persisted bet history
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BetStore: Send + Sync {
    async fn list_bets(&self) -> Result<Vec<BetRecord>>;

    async fn update_bet(&self, id: &BetId, patch: &BetPatch) -> Result<()>;
}
