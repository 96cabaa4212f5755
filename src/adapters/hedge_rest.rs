//! REST adapter for the roster and prediction endpoints

use async_trait::async_trait;
use reqwest::Method;
use tracing::info;

use super::transport::ServiceTransport;
use crate::config::HttpConfig;
use crate::domain::{BetAction, Player, PredictRequest, PredictionResult, Team};
use crate::error::Result;
use crate::gateway::reply::{ActionsPayload, PlayersPayload, TeamsPayload};
use crate::gateway::{PredictionService, RosterService};

const USER_AGENT: &str = concat!("hedgebets/", env!("CARGO_PKG_VERSION"));

#[derive(Clone)]
pub struct HedgeApiClient {
    transport: ServiceTransport,
}

impl HedgeApiClient {
    pub fn new(base_url: &str, policy: HttpConfig) -> Result<Self> {
        Ok(Self {
            transport: ServiceTransport::new(base_url, policy, USER_AGENT)?,
        })
    }
}

#[async_trait]
impl RosterService for HedgeApiClient {
    async fn teams(&self) -> Result<Vec<Team>> {
        let payload: TeamsPayload = self
            .transport
            .call(Method::GET, "/teams/", None, None, "Failed to load teams")
            .await?;
        Ok(payload.teams)
    }

    async fn players(&self, team: &str) -> Result<Vec<Player>> {
        let query = [("team", team.to_string())];
        let payload: PlayersPayload = self
            .transport
            .call(
                Method::GET,
                "/players/",
                Some(&query),
                None,
                "Failed to load players",
            )
            .await?;
        Ok(payload.players)
    }

    async fn actions(&self, position: &str) -> Result<Vec<BetAction>> {
        let query = [("position", position.to_string())];
        let payload: ActionsPayload = self
            .transport
            .call(
                Method::GET,
                "/actions/",
                Some(&query),
                None,
                "Failed to load actions",
            )
            .await?;
        Ok(payload.actions)
    }
}

#[async_trait]
impl PredictionService for HedgeApiClient {
    async fn predict(&self, request: &PredictRequest) -> Result<PredictionResult> {
        let body = serde_json::to_value(request)?;
        let result: PredictionResult = self
            .transport
            .call(
                Method::POST,
                "/predict-bet/",
                None,
                Some(&body),
                "Error generating prediction. Please try again.",
            )
            .await?;

        info!(
            player = %result.player.name,
            win_probability = result.analysis.win_probability,
            scenario_id = ?result.scenario_id,
            "prediction received"
        );
        Ok(result)
    }
}
