use serde::{Deserialize, Serialize};
use std::fmt;

/// Player block of a prediction response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictedPlayer {
    pub name: String,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub team: Option<String>,
}

/// Bet block echoed back by the scoring service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictedBet {
    pub action: String,
    #[serde(rename = "type")]
    pub bet_type: String,
    pub threshold: f64,
    #[serde(default)]
    pub amount: Option<f64>,
}

/// 10th, 50th and 90th percentile of the predicted stat
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quantiles {
    pub q10: f64,
    pub q50: f64,
    pub q90: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub win_probability: f64,
    pub recommendation: String,
    pub expected_value: f64,
    pub confidence_level: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionDetails {
    pub games_analyzed: u32,
    pub current_week: u32,
    pub current_season: i32,
    #[serde(default)]
    pub stat_display_name: Option<String>,
    #[serde(default)]
    pub stat_unit: Option<String>,
}

/// Successful response of the scoring service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub player: PredictedPlayer,
    pub bet: PredictedBet,
    pub prediction: Quantiles,
    pub analysis: Analysis,
    pub details: PredictionDetails,
    #[serde(default)]
    pub scenario_id: Option<i64>,
    /// Non-fatal caveat, e.g. limited game history
    #[serde(default)]
    pub warning: Option<String>,
}

/// Client-side verdict derived from the win probability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recommendation {
    #[serde(rename = "Good Bet")]
    GoodBet,
    #[serde(rename = "Fair Bet")]
    FairBet,
    #[serde(rename = "Bad Bet")]
    BadBet,
}

impl Recommendation {
    pub const GOOD_THRESHOLD: f64 = 0.6;
    pub const FAIR_THRESHOLD: f64 = 0.4;

    /// p >= 0.6 is good, 0.4 <= p < 0.6 is fair, anything lower (or NaN) is bad
    pub fn from_win_probability(p: f64) -> Self {
        if p >= Self::GOOD_THRESHOLD {
            Recommendation::GoodBet
        } else if p >= Self::FAIR_THRESHOLD {
            Recommendation::FairBet
        } else {
            Recommendation::BadBet
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::GoodBet => "Good Bet",
            Recommendation::FairBet => "Fair Bet",
            Recommendation::BadBet => "Bad Bet",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Fixed one-decimal formatting used for every quantile
pub fn format_quantile(value: f64) -> String {
    format!("{value:.1}")
}

/// Display-ready strings for a prediction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionView {
    pub headline: String,
    pub q10: String,
    pub q50: String,
    pub q90: String,
    pub unit: Option<String>,
    pub win_probability: String,
    pub recommendation: Recommendation,
    pub expected_value: String,
    pub confidence_level: String,
    pub games_analyzed: u32,
    pub timeframe: String,
    pub warning: Option<String>,
}

impl PredictionView {
    pub fn from_result(result: &PredictionResult) -> Self {
        let stat = result
            .details
            .stat_display_name
            .as_deref()
            .unwrap_or(&result.bet.action);
        let headline = format!(
            "{} {} {} {}",
            result.player.name,
            result.bet.bet_type.to_ascii_lowercase(),
            format_quantile(result.bet.threshold),
            stat
        );

        Self {
            headline,
            q10: format_quantile(result.prediction.q10),
            q50: format_quantile(result.prediction.q50),
            q90: format_quantile(result.prediction.q90),
            unit: result.details.stat_unit.clone().filter(|u| !u.is_empty()),
            win_probability: format!("{:.1}%", result.analysis.win_probability * 100.0),
            recommendation: Recommendation::from_win_probability(result.analysis.win_probability),
            expected_value: format!("{:+.3}", result.analysis.expected_value),
            confidence_level: result.analysis.confidence_level.clone(),
            games_analyzed: result.details.games_analyzed,
            timeframe: format!(
                "Week {}, {}",
                result.details.current_week, result.details.current_season
            ),
            warning: result.warning.clone(),
        }
    }

    pub fn quantiles(&self) -> [&str; 3] {
        [&self.q10, &self.q50, &self.q90]
    }
}

/// One ranked "did you mean" entry offered after a domain error
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CorrectionSuggestion {
    /// 1-based rank in the order the service returned them
    pub rank: usize,
    pub player: String,
}

impl CorrectionSuggestion {
    pub fn ranked(names: impl IntoIterator<Item = String>) -> Vec<Self> {
        names
            .into_iter()
            .filter(|name| !name.trim().is_empty())
            .enumerate()
            .map(|(i, player)| CorrectionSuggestion { rank: i + 1, player })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "success": true,
        "scenario_id": 42,
        "player": {"name": "Patrick Mahomes", "position": "QB", "team": "KC"},
        "bet": {"action": "Passing Yards", "type": "over", "threshold": 275.5, "amount": 100.0},
        "prediction": {"q10": 10.0, "q50": 20.0, "q90": 30.0},
        "analysis": {"win_probability": 0.62, "recommendation": "Good Bet",
                     "expected_value": 0.24, "confidence_level": "Medium"},
        "details": {"games_analyzed": 8, "current_week": 9, "current_season": 2025,
                    "stat_display_name": "Passing Yards", "stat_unit": "yards"}
    }"#;

    #[test]
    fn test_recommendation_boundaries() {
        assert_eq!(Recommendation::from_win_probability(0.6), Recommendation::GoodBet);
        assert_eq!(Recommendation::from_win_probability(0.95), Recommendation::GoodBet);
        assert_eq!(Recommendation::from_win_probability(0.5999), Recommendation::FairBet);
        assert_eq!(Recommendation::from_win_probability(0.4), Recommendation::FairBet);
        assert_eq!(Recommendation::from_win_probability(0.3999), Recommendation::BadBet);
        assert_eq!(Recommendation::from_win_probability(0.05), Recommendation::BadBet);
        assert_eq!(Recommendation::from_win_probability(f64::NAN), Recommendation::BadBet);
    }

    #[test]
    fn test_quantiles_render_with_one_decimal() {
        let result: PredictionResult = serde_json::from_str(SAMPLE).unwrap();
        let view = PredictionView::from_result(&result);
        assert_eq!(view.quantiles(), ["10.0", "20.0", "30.0"]);
        assert_eq!(format_quantile(287.46), "287.5");
    }

    #[test]
    fn test_view_fields() {
        let result: PredictionResult = serde_json::from_str(SAMPLE).unwrap();
        let view = PredictionView::from_result(&result);
        assert_eq!(view.headline, "Patrick Mahomes over 275.5 Passing Yards");
        assert_eq!(view.win_probability, "62.0%");
        assert_eq!(view.recommendation, Recommendation::GoodBet);
        assert_eq!(view.expected_value, "+0.240");
        assert_eq!(view.timeframe, "Week 9, 2025");
        assert_eq!(view.unit.as_deref(), Some("yards"));
        assert!(view.warning.is_none());
    }

    #[test]
    fn test_suggestions_keep_service_order() {
        let ranked = CorrectionSuggestion::ranked(vec![
            "Josh Allen".to_string(),
            "".to_string(),
            "Josh Jacobs".to_string(),
        ]);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[1].player, "Josh Jacobs");
    }
}
