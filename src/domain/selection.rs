use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sport the form is fixed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sport {
    #[default]
    Football,
}

impl Sport {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sport::Football => "football",
        }
    }
}

/// Over/under side of a prop bet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BetType {
    Over,
    Under,
}

impl BetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BetType::Over => "over",
            BetType::Under => "under",
        }
    }
}

impl fmt::Display for BetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BetType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "over" => Ok(BetType::Over),
            "under" => Ok(BetType::Under),
            other => Err(format!("Invalid bet type '{other}'. Must be over or under")),
        }
    }
}

/// Option lists that are fetched remotely, one generation counter each
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionSlot {
    Teams,
    Roster,
    Actions,
}

impl OptionSlot {
    pub fn as_str(&self) -> &'static str {
        match self {
            OptionSlot::Teams => "teams",
            OptionSlot::Roster => "roster",
            OptionSlot::Actions => "actions",
        }
    }
}

impl fmt::Display for OptionSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Required user inputs of the form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SelectionField {
    Team,
    Player,
    BetType,
    Action,
    ActionAmount,
    BetAmount,
}

impl SelectionField {
    pub const REQUIRED: [SelectionField; 6] = [
        SelectionField::Team,
        SelectionField::Player,
        SelectionField::BetType,
        SelectionField::Action,
        SelectionField::ActionAmount,
        SelectionField::BetAmount,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SelectionField::Team => "team",
            SelectionField::Player => "player",
            SelectionField::BetType => "betType",
            SelectionField::Action => "action",
            SelectionField::ActionAmount => "actionAmount",
            SelectionField::BetAmount => "betAmount",
        }
    }
}

impl fmt::Display for SelectionField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Current contents of the bet scenario form.
///
/// `player` is only meaningful while `team` is set, `action` only while
/// `player` is set. The selection controller keeps that invariant.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionState {
    pub sport: Sport,
    pub team: Option<String>,
    pub player: Option<String>,
    pub bet_type: Option<BetType>,
    pub action: Option<String>,
    pub action_amount: Option<f64>,
    pub bet_amount: Option<Decimal>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Required fields that are still empty, in form order
    pub fn missing_fields(&self) -> Vec<SelectionField> {
        SelectionField::REQUIRED
            .into_iter()
            .filter(|field| match field {
                SelectionField::Team => is_blank(self.team.as_deref()),
                SelectionField::Player => is_blank(self.player.as_deref()),
                SelectionField::BetType => self.bet_type.is_none(),
                SelectionField::Action => is_blank(self.action.as_deref()),
                SelectionField::ActionAmount => self.action_amount.is_none(),
                SelectionField::BetAmount => self.bet_amount.is_none(),
            })
            .collect()
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

/// Body of `POST /predict-bet/`, built only from a validated selection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictRequest {
    pub player: String,
    pub action: String,
    pub bet_type: BetType,
    pub action_amount: f64,
    #[serde(with = "rust_decimal::serde::float")]
    pub bet_amount: Decimal,
}
