//! Tagged replies at the service boundary
//!
//! Every service answers `{"success": true, ...payload}` or
//! `{"success": false, "error": ..., "suggestions": [...]}`. The flag is
//! inspected exactly once, here; everything downstream sees a `Result`.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::domain::{BetAction, BetRecord, Player, Team};
use crate::error::{HedgeError, Result};

/// Rejection body of a `success: false` reply
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct ServiceRejection {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub suggestions: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ServiceReply<T> {
    Accepted(T),
    Rejected(ServiceRejection),
}

impl<T: DeserializeOwned> ServiceReply<T> {
    /// Classify a decoded JSON body. `None` when the body carries no flag.
    pub fn from_value(value: Value) -> Result<Option<Self>> {
        let Some(success) = value.get("success").and_then(Value::as_bool) else {
            return Ok(None);
        };

        if success {
            let payload = serde_json::from_value(value).map_err(|e| {
                HedgeError::InvalidResponse(format!("unexpected payload shape: {e}"))
            })?;
            Ok(Some(ServiceReply::Accepted(payload)))
        } else {
            let rejection = serde_json::from_value(value).map_err(|e| {
                HedgeError::InvalidResponse(format!("unexpected error shape: {e}"))
            })?;
            Ok(Some(ServiceReply::Rejected(rejection)))
        }
    }

    /// Accepted payload, or a domain error built from the rejection
    pub fn into_result(self, fallback_message: &str) -> Result<T> {
        match self {
            ServiceReply::Accepted(payload) => Ok(payload),
            ServiceReply::Rejected(rejection) => Err(HedgeError::Domain {
                message: rejection
                    .error
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| fallback_message.to_string()),
                suggestions: rejection.suggestions.unwrap_or_default(),
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TeamsPayload {
    pub teams: Vec<Team>,
}

#[derive(Debug, Deserialize)]
pub struct PlayersPayload {
    pub players: Vec<Player>,
}

#[derive(Debug, Deserialize)]
pub struct ActionsPayload {
    pub actions: Vec<BetAction>,
}

#[derive(Debug, Deserialize)]
pub struct BetsPayload {
    #[serde(default)]
    pub bets: Vec<BetRecord>,
}

/// Acknowledgement with no payload
#[derive(Debug, Deserialize)]
pub struct Ack {}
