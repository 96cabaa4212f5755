use serde::{Deserialize, Serialize};

/// A selectable team
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    #[serde(alias = "abbr")]
    pub abbreviation: String,
    #[serde(alias = "name")]
    pub full_name: String,
}

impl Team {
    /// Option label, e.g. "Kansas City Chiefs (KC)"
    pub fn label(&self) -> String {
        format!("{} ({})", self.full_name, self.abbreviation)
    }
}

/// A roster entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub position: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub jersey_number: Option<u32>,
}

impl Player {
    /// Option label, e.g. "Patrick Mahomes (QB)"
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.position)
    }
}

/// A stat the player can be bet on (e.g. "Passing Yards")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BetAction {
    pub value: String,
}
