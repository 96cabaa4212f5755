//! Hedge Your Bets CLI
//!
//! Commands:
//! - `hedgebets teams|players|actions` - Browse the option lists
//! - `hedgebets predict` - Score a bet scenario
//! - `hedgebets bets` - Show bet history and stats
//! - `hedgebets set-status` - Change a bet's status

pub mod bets;
pub mod catalog;
pub mod output;
pub mod predict;

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

use crate::adapters::{BetStoreClient, HedgeApiClient};
use crate::config::AppConfig;
use crate::domain::{BetStatus, BetType, Session, SessionUser};
use output::OutputMode;

/// Hedge Your Bets client
#[derive(Parser, Debug)]
#[command(name = "hedgebets")]
#[command(author, version, about = "Build NFL bet scenarios and track their outcomes")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config directory
    #[arg(short, long, default_value = "config", global = true)]
    pub config: String,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    /// Signed-in user's email (overrides session.user_email)
    #[arg(long, env = "HEDGE_USER", global = true)]
    pub user: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List teams
    Teams,

    /// List a team's roster
    Players {
        /// Team abbreviation, e.g. KC
        team: String,
    },

    /// List bettable stats for a position
    Actions {
        /// Position, e.g. QB
        position: String,
    },

    /// Score a bet scenario
    Predict {
        #[arg(long)]
        team: String,
        #[arg(long)]
        player: String,
        /// over or under
        #[arg(long, default_value = "over")]
        bet_type: BetType,
        /// Stat to bet on, e.g. "Passing Yards"
        #[arg(long)]
        action: String,
        /// Stat threshold
        #[arg(long)]
        line: f64,
        /// Wager in dollars
        #[arg(long)]
        wager: Decimal,
        /// Resubmit with the suggested player of this rank if the name is not found
        #[arg(long)]
        accept_suggestion: Option<usize>,
    },

    /// Show bet history and stats
    Bets,

    /// Change a bet's status (pending, won, lost)
    SetStatus { bet_id: String, status: BetStatus },
}

impl Cli {
    /// Session from config, with `--user` taking precedence
    pub fn session(&self, config: &AppConfig) -> Session {
        match &self.user {
            Some(email) if !email.trim().is_empty() => Session::SignedIn(SessionUser {
                name: config.session.user_name.clone(),
                email: Some(email.trim().to_string()),
            }),
            _ => config.session.session(),
        }
    }
}

pub async fn run(cli: Cli, config: AppConfig) -> Result<()> {
    let mode = OutputMode::from_json_flag(cli.json);
    let session = cli.session(&config);

    match cli.command {
        Commands::Teams => {
            let api = HedgeApiClient::new(&config.api.base_url, config.http.clone())?;
            catalog::teams(&api, mode).await
        }
        Commands::Players { team } => {
            let api = HedgeApiClient::new(&config.api.base_url, config.http.clone())?;
            catalog::players(&api, &team, mode).await
        }
        Commands::Actions { position } => {
            let api = HedgeApiClient::new(&config.api.base_url, config.http.clone())?;
            catalog::actions(&api, &position, mode).await
        }
        Commands::Predict {
            team,
            player,
            bet_type,
            action,
            line,
            wager,
            accept_suggestion,
        } => {
            let api = Arc::new(HedgeApiClient::new(
                &config.api.base_url,
                config.http.clone(),
            )?);
            let args = predict::PredictArgs {
                team,
                player,
                bet_type,
                action,
                line,
                wager,
                accept_suggestion,
            };
            predict::run(session, api.clone(), api, args, mode).await
        }
        Commands::Bets => {
            let store = BetStoreClient::new(&config.bet_store.base_url, config.http.clone())?;
            bets::list(Arc::new(store), mode).await
        }
        Commands::SetStatus { bet_id, status } => {
            let store = BetStoreClient::new(&config.bet_store.base_url, config.http.clone())?;
            bets::set_status(Arc::new(store), &bet_id, status, mode).await
        }
    }
}
