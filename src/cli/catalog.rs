//! `hedgebets teams|players|actions`: browse the option lists.

use serde::Serialize;
use tabled::Tabled;

use super::output::{self, OutputMode};
use crate::domain::{BetAction, Player, Team};
use crate::gateway::RosterService;

#[derive(Debug, Serialize, Tabled)]
pub struct TeamRow {
    pub abbreviation: String,
    pub name: String,
}

impl From<&Team> for TeamRow {
    fn from(team: &Team) -> Self {
        Self {
            abbreviation: team.abbreviation.clone(),
            name: team.full_name.clone(),
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
pub struct PlayerRow {
    pub name: String,
    pub position: String,
    pub jersey: String,
}

impl From<&Player> for PlayerRow {
    fn from(player: &Player) -> Self {
        Self {
            name: player.name.clone(),
            position: player.position.clone(),
            jersey: player
                .jersey_number
                .map(|n| n.to_string())
                .unwrap_or_else(|| "-".to_string()),
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
pub struct ActionRow {
    pub action: String,
}

impl From<&BetAction> for ActionRow {
    fn from(action: &BetAction) -> Self {
        Self {
            action: action.value.clone(),
        }
    }
}

pub async fn teams(catalog: &dyn RosterService, mode: OutputMode) -> anyhow::Result<()> {
    let teams = catalog.teams().await?;
    let rows: Vec<TeamRow> = teams.iter().map(TeamRow::from).collect();
    output::print_items(&rows, mode)
}

pub async fn players(
    catalog: &dyn RosterService,
    team: &str,
    mode: OutputMode,
) -> anyhow::Result<()> {
    let players = catalog.players(&team.to_uppercase()).await?;
    let rows: Vec<PlayerRow> = players.iter().map(PlayerRow::from).collect();
    output::print_items(&rows, mode)
}

pub async fn actions(
    catalog: &dyn RosterService,
    position: &str,
    mode: OutputMode,
) -> anyhow::Result<()> {
    let actions = catalog.actions(&position.to_uppercase()).await?;
    let rows: Vec<ActionRow> = actions.iter().map(ActionRow::from).collect();
    output::print_items(&rows, mode)
}
