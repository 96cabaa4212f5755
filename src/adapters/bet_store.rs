//! REST adapter for the persisted bet history

use async_trait::async_trait;
use reqwest::Method;
use serde_json::json;

use super::transport::ServiceTransport;
use crate::config::HttpConfig;
use crate::domain::{BetId, BetPatch, BetRecord};
use crate::error::{HedgeError, Result};
use crate::gateway::reply::{Ack, BetsPayload};
use crate::gateway::BetStore;

const USER_AGENT: &str = concat!("hedgebets-store/", env!("CARGO_PKG_VERSION"));

#[derive(Clone)]
pub struct BetStoreClient {
    transport: ServiceTransport,
}

impl BetStoreClient {
    pub fn new(base_url: &str, policy: HttpConfig) -> Result<Self> {
        Ok(Self {
            transport: ServiceTransport::new(base_url, policy, USER_AGENT)?,
        })
    }
}

#[async_trait]
impl BetStore for BetStoreClient {
    async fn list_bets(&self) -> Result<Vec<BetRecord>> {
        let payload: BetsPayload = self
            .transport
            .call(Method::GET, "/get-bets", None, None, "Failed to fetch bets")
            .await?;
        Ok(payload.bets)
    }

    async fn update_bet(&self, id: &BetId, patch: &BetPatch) -> Result<()> {
        let status = patch
            .status
            .ok_or_else(|| HedgeError::Validation("bet update carries no status".into()))?;
        let body = json!({ "betId": id, "status": status });

        let _: Ack = self
            .transport
            .call(
                Method::PATCH,
                "/update-bet",
                None,
                Some(&body),
                "Failed to update bet",
            )
            .await?;
        Ok(())
    }
}
