//! `hedgebets bets|set-status`: bet history and status changes.

use std::sync::Arc;

use serde::Serialize;
use tabled::Tabled;

use super::output::{self, OutputMode};
use crate::domain::{BetId, BetPatch, BetRecord, BetStats, BetStatus};
use crate::error::HedgeError;
use crate::gateway::BetStore;
use crate::services::OptimisticMutationCoordinator;

#[derive(Debug, Serialize, Tabled)]
pub struct BetRow {
    pub id: String,
    pub date: String,
    pub player: String,
    pub team: String,
    pub bet: String,
    pub wager: String,
    pub ai: String,
    pub status: String,
}

impl From<&BetRecord> for BetRow {
    fn from(record: &BetRecord) -> Self {
        Self {
            id: record.id.to_string(),
            date: record
                .display_date()
                .unwrap_or_else(|| record.created_at.clone()),
            player: record.player.clone(),
            team: record.team.clone(),
            bet: format!("{} {} {}", record.bet_type, record.line, record.metric),
            wager: format!("${}", record.wager),
            ai: record.ai_prediction.clone().unwrap_or_else(|| "-".into()),
            status: record.status.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
pub struct StatsRow {
    pub total: usize,
    pub won: usize,
    pub lost: usize,
    pub pending: usize,
    pub win_rate: String,
}

impl From<BetStats> for StatsRow {
    fn from(stats: BetStats) -> Self {
        Self {
            total: stats.total,
            won: stats.won,
            lost: stats.lost,
            pending: stats.pending,
            win_rate: format!("{}%", stats.win_rate_display()),
        }
    }
}

pub async fn list(store: Arc<dyn BetStore>, mode: OutputMode) -> anyhow::Result<()> {
    let mut coordinator = OptimisticMutationCoordinator::new(store);
    coordinator.load().await?;

    let rows: Vec<BetRow> = coordinator.records().iter().map(BetRow::from).collect();
    output::print_items(&rows, mode)?;
    output::print_items(&[StatsRow::from(coordinator.stats())], mode)
}

pub async fn set_status(
    store: Arc<dyn BetStore>,
    bet_id: &str,
    status: BetStatus,
    mode: OutputMode,
) -> anyhow::Result<()> {
    let mut coordinator = OptimisticMutationCoordinator::new(store);
    coordinator.load().await?;
    let id = BetId::new(bet_id);

    match coordinator
        .update_and_wait(&id, BetPatch::status(status))
        .await
    {
        Ok(()) => output::print_success(&format!("Bet {} marked {}", id, status)),
        Err(e @ HedgeError::Consistency { .. }) => {
            output::print_error(&e.to_string());
            return Err(e.into());
        }
        Err(e) => return Err(e.into()),
    }

    if let Some(record) = coordinator.record(&id) {
        output::print_items(&[BetRow::from(record)], mode)?;
    }
    Ok(())
}
