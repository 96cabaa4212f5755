use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use super::BetType;

/// Identity of a persisted bet (the store's `createdAt` when no id is given)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BetId(pub String);

impl BetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Settlement status of a bet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BetStatus {
    Pending,
    Won,
    Lost,
}

impl BetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BetStatus::Pending => "pending",
            BetStatus::Won => "won",
            BetStatus::Lost => "lost",
        }
    }
}

impl fmt::Display for BetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BetStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(BetStatus::Pending),
            "won" => Ok(BetStatus::Won),
            "lost" => Ok(BetStatus::Lost),
            other => Err(format!("Unknown bet status: {other}")),
        }
    }
}

// The store writes statuses in upper case ("PENDING").
impl<'de> Deserialize<'de> for BetStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A bet persisted by the bet store
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BetRecord {
    pub id: BetId,
    pub player: String,
    pub team: String,
    pub metric: String,
    pub bet_type: BetType,
    pub line: f64,
    pub wager: Decimal,
    pub ai_prediction: Option<String>,
    pub status: BetStatus,
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BetRecordWire {
    #[serde(default)]
    id: Option<String>,
    player: String,
    team: String,
    metric: String,
    #[serde(deserialize_with = "de_bet_type")]
    bet_type: BetType,
    line: f64,
    wager: Decimal,
    #[serde(default, deserialize_with = "de_stringish")]
    ai_prediction: Option<String>,
    status: BetStatus,
    created_at: String,
}

impl From<BetRecordWire> for BetRecord {
    fn from(wire: BetRecordWire) -> Self {
        let id = wire
            .id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| wire.created_at.clone());
        Self {
            id: BetId(id),
            player: wire.player,
            team: wire.team,
            metric: wire.metric,
            bet_type: wire.bet_type,
            line: wire.line,
            wager: wire.wager,
            ai_prediction: wire.ai_prediction,
            status: wire.status,
            created_at: wire.created_at,
        }
    }
}

impl<'de> Deserialize<'de> for BetRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        BetRecordWire::deserialize(deserializer).map(BetRecord::from)
    }
}

fn de_bet_type<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BetType, D::Error> {
    let raw = String::deserialize(deserializer)?;
    raw.parse().map_err(serde::de::Error::custom)
}

fn de_stringish<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

impl BetRecord {
    /// Display date such as "Oct 16, 2026"
    pub fn display_date(&self) -> Option<String> {
        let date = DateTime::parse_from_rfc3339(&self.created_at)
            .map(|dt| dt.with_timezone(&Utc).date_naive())
            .ok()
            .or_else(|| {
                self.created_at
                    .trim()
                    .parse::<i64>()
                    .ok()
                    .and_then(DateTime::<Utc>::from_timestamp_millis)
                    .map(|dt| dt.date_naive())
            })
            .or_else(|| NaiveDate::parse_from_str(&self.created_at, "%Y-%m-%d").ok())?;
        Some(date.format("%b %-d, %Y").to_string())
    }
}

/// Client-side change to a bet. Only `status` is mutable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct BetPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<BetStatus>,
}

impl BetPatch {
    pub fn status(status: BetStatus) -> Self {
        Self {
            status: Some(status),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none()
    }

    /// Current values of the fields this patch touches
    pub fn capture(&self, record: &BetRecord) -> BetPatch {
        BetPatch {
            status: self.status.map(|_| record.status),
        }
    }

    pub fn apply_to(&self, record: &mut BetRecord) {
        if let Some(status) = self.status {
            record.status = status;
        }
    }

    /// Move the rollback values for fields that `newer` also writes into
    /// `newer_previous`, leaving only the fields nobody else will overwrite.
    pub fn hand_over(&mut self, newer: &BetPatch, newer_previous: &mut BetPatch) {
        if newer.status.is_some() {
            if let Some(status) = self.status.take() {
                newer_previous.status = Some(status);
            }
        }
    }
}

/// Aggregate counts shown above the bet history
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct BetStats {
    pub total: usize,
    pub won: usize,
    pub lost: usize,
    pub pending: usize,
}

impl BetStats {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a BetRecord>) -> Self {
        records
            .into_iter()
            .fold(BetStats::default(), |mut stats, record| {
                stats.total += 1;
                match record.status {
                    BetStatus::Won => stats.won += 1,
                    BetStatus::Lost => stats.lost += 1,
                    BetStatus::Pending => stats.pending += 1,
                }
                stats
            })
    }

    /// Percentage of settled bets that won; `None` until one settles
    pub fn win_rate(&self) -> Option<f64> {
        let settled = self.won + self.lost;
        if settled == 0 {
            return None;
        }
        Some(self.won as f64 / settled as f64 * 100.0)
    }

    pub fn win_rate_display(&self) -> String {
        match self.win_rate() {
            Some(rate) => format!("{rate:.1}"),
            None => "0".to_string(),
        }
    }
}
