//! Cascading team → player → action selection
//!
//! The controller owns the form's `SelectionState` and the three option
//! lists. Every dependent fetch is issued under a generation token and runs as
//! a spawned task; its completion comes back over a channel and is applied by
//! `next_completion` only while the token is still current for its slot.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use rust_decimal::Decimal;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::coordination::{GenerationToken, RaceGuard};
use crate::domain::{BetAction, BetType, OptionSlot, Player, SelectionState, Team};
use crate::error::Result;
use crate::gateway::RosterService;

/// Option lists backing the three dependent dropdowns
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionOptions {
    pub teams: Vec<Team>,
    pub players: Vec<Player>,
    pub actions: Vec<BetAction>,
}

#[derive(Debug)]
enum LoadPayload {
    Teams(Result<Vec<Team>>),
    Roster(Result<Vec<Player>>),
    Actions(Result<Vec<BetAction>>),
}

impl LoadPayload {
    fn slot(&self) -> OptionSlot {
        match self {
            LoadPayload::Teams(_) => OptionSlot::Teams,
            LoadPayload::Roster(_) => OptionSlot::Roster,
            LoadPayload::Actions(_) => OptionSlot::Actions,
        }
    }
}

#[derive(Debug)]
struct LoadCompletion {
    token: GenerationToken,
    payload: LoadPayload,
}

/// What happened to one finished fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Current and successful; the option list was replaced
    Applied(OptionSlot),
    /// Current but failed; the list was emptied and `load_error` set
    Failed(OptionSlot),
    /// Superseded by a newer request; dropped untouched
    Discarded(OptionSlot),
}

pub struct SelectionController {
    catalog: Arc<dyn RosterService>,
    state: SelectionState,
    options: SelectionOptions,
    guard: RaceGuard<OptionSlot>,
    pending: HashMap<OptionSlot, GenerationToken>,
    load_errors: HashMap<OptionSlot, String>,
    completions_tx: mpsc::UnboundedSender<LoadCompletion>,
    completions_rx: mpsc::UnboundedReceiver<LoadCompletion>,
    in_flight: usize,
}

impl SelectionController {
    pub fn new(catalog: Arc<dyn RosterService>) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            catalog,
            state: SelectionState::new(),
            options: SelectionOptions::default(),
            guard: RaceGuard::new(),
            pending: HashMap::new(),
            load_errors: HashMap::new(),
            completions_tx,
            completions_rx,
            in_flight: 0,
        }
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn options(&self) -> &SelectionOptions {
        &self.options
    }

    /// A request for the slot is outstanding and still current
    pub fn loading(&self, slot: OptionSlot) -> bool {
        self.pending.contains_key(&slot)
    }

    pub fn load_error(&self, slot: OptionSlot) -> Option<&str> {
        self.load_errors.get(&slot).map(String::as_str)
    }

    /// Placeholder for the slot's dropdown
    pub fn placeholder(&self, slot: OptionSlot) -> &'static str {
        if self.loading(slot) {
            return "Loading...";
        }
        match slot {
            OptionSlot::Teams => "Select team",
            OptionSlot::Roster if self.state.team.is_none() => "Select team first",
            OptionSlot::Roster => "Select player",
            OptionSlot::Actions if self.state.player.is_none() => "Select player first",
            OptionSlot::Actions => "Select action",
        }
    }

    /// Fetch the team list. Issued once when the form mounts.
    pub fn load_teams(&mut self) {
        let token = self.begin(OptionSlot::Teams);
        let catalog = Arc::clone(&self.catalog);
        self.spawn_fetch(token, async move { LoadPayload::Teams(catalog.teams().await) });
    }

    /// Select a team by abbreviation. Blank input clears it.
    ///
    /// Player, action and both dependent lists are cleared before this
    /// returns, whatever fetches are still in flight.
    pub fn set_team(&mut self, team: &str) {
        let team = non_blank(team);

        self.state.team = team.clone();
        self.state.player = None;
        self.state.action = None;
        self.options.players.clear();
        self.options.actions.clear();
        self.cancel(OptionSlot::Actions);

        match team {
            Some(team) => {
                debug!(%team, "team selected, loading roster");
                let token = self.begin(OptionSlot::Roster);
                let catalog = Arc::clone(&self.catalog);
                self.spawn_fetch(token, async move {
                    LoadPayload::Roster(catalog.players(&team).await)
                });
            }
            None => self.cancel(OptionSlot::Roster),
        }
    }

    /// Select a player by exact name and load the actions for their position.
    ///
    /// A name absent from the loaded roster (e.g. a correction suggestion) is
    /// still recorded. Its actions are fetched once a roster containing it
    /// lands.
    pub fn set_player(&mut self, name: &str) {
        self.state.action = None;
        self.options.actions.clear();

        if self.state.team.is_none() {
            debug!(player = name, "ignoring player without a team");
            self.state.player = None;
            self.cancel(OptionSlot::Actions);
            return;
        }

        self.state.player = non_blank(name);

        match self.selected_position() {
            Some(position) => self.load_actions(position),
            None => self.cancel(OptionSlot::Actions),
        }
    }

    pub fn set_bet_type(&mut self, bet_type: Option<BetType>) {
        self.state.bet_type = bet_type;
    }

    pub fn set_action(&mut self, action: &str) {
        self.state.action = non_blank(action);
    }

    pub fn set_amounts(&mut self, action_amount: Option<f64>, bet_amount: Option<Decimal>) {
        self.state.action_amount = action_amount;
        self.state.bet_amount = bet_amount;
    }

    /// Back to a fresh form. The team list is kept.
    pub fn reset(&mut self) {
        self.state = SelectionState::new();
        self.options.players.clear();
        self.options.actions.clear();
        self.cancel(OptionSlot::Roster);
        self.cancel(OptionSlot::Actions);
    }

    /// Wait for one finished fetch and apply or discard it.
    ///
    /// Returns `None` immediately when nothing is in flight.
    pub async fn next_completion(&mut self) -> Option<LoadOutcome> {
        if self.in_flight == 0 {
            return None;
        }
        let completion = self.completions_rx.recv().await?;
        self.in_flight -= 1;
        Some(self.apply(completion))
    }

    /// Drain every in-flight fetch
    pub async fn settle(&mut self) -> Vec<LoadOutcome> {
        let mut outcomes = Vec::new();
        while let Some(outcome) = self.next_completion().await {
            outcomes.push(outcome);
        }
        outcomes
    }

    fn begin(&mut self, slot: OptionSlot) -> GenerationToken {
        let token = self.guard.begin_request(slot);
        self.pending.insert(slot, token);
        self.load_errors.remove(&slot);
        token
    }

    fn cancel(&mut self, slot: OptionSlot) {
        self.guard.invalidate(slot);
        self.pending.remove(&slot);
        self.load_errors.remove(&slot);
    }

    fn load_actions(&mut self, position: String) {
        debug!(%position, "player selected, loading actions");
        let token = self.begin(OptionSlot::Actions);
        let catalog = Arc::clone(&self.catalog);
        self.spawn_fetch(token, async move {
            LoadPayload::Actions(catalog.actions(&position).await)
        });
    }

    /// Position of the selected player in the loaded roster
    fn selected_position(&self) -> Option<String> {
        let name = self.state.player.as_deref()?;
        self.options
            .players
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.position.clone())
    }

    fn spawn_fetch<F>(&mut self, token: GenerationToken, fetch: F)
    where
        F: Future<Output = LoadPayload> + Send + 'static,
    {
        let tx = self.completions_tx.clone();
        self.in_flight += 1;
        tokio::spawn(async move {
            let payload = fetch.await;
            let _ = tx.send(LoadCompletion { token, payload });
        });
    }

    fn apply(&mut self, completion: LoadCompletion) -> LoadOutcome {
        let LoadCompletion { token, payload } = completion;
        let slot = payload.slot();

        if !self.guard.is_current(slot, token) {
            debug!(%slot, %token, "discarding superseded response");
            return LoadOutcome::Discarded(slot);
        }
        self.pending.remove(&slot);

        let failure = match payload {
            LoadPayload::Teams(result) => replace_or_fail(&mut self.options.teams, result),
            LoadPayload::Roster(result) => replace_or_fail(&mut self.options.players, result),
            LoadPayload::Actions(result) => replace_or_fail(&mut self.options.actions, result),
        };

        match failure {
            None => {
                debug!(%slot, %token, "options loaded");
                // A player picked before the roster arrived gets actions now
                if slot == OptionSlot::Roster && !self.loading(OptionSlot::Actions) {
                    if let Some(position) = self.selected_position() {
                        self.load_actions(position);
                    }
                }
                LoadOutcome::Applied(slot)
            }
            Some(error) => {
                warn!(%slot, %error, "failed to load options");
                self.load_errors.insert(slot, error);
                LoadOutcome::Failed(slot)
            }
        }
    }
}

fn replace_or_fail<T>(list: &mut Vec<T>, result: Result<Vec<T>>) -> Option<String> {
    match result {
        Ok(items) => {
            *list = items;
            None
        }
        Err(e) => {
            list.clear();
            Some(e.to_string())
        }
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
