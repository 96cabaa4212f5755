/// Local checks a selection must pass before anything is sent
///
/// Validation failures never reach the network layer. Every function here
/// returns `HedgeError::Validation` with a message fit for the form banner.
use crate::domain::{PredictRequest, SelectionField, SelectionState};
use crate::error::{HedgeError, Result};
use rust_decimal::Decimal;

/// Banner text for a set of empty required fields
pub fn missing_fields_message(missing: &[SelectionField]) -> String {
    let names: Vec<&str> = missing.iter().map(SelectionField::as_str).collect();
    format!("Please fill in all fields (missing: {})", names.join(", "))
}

/// Action threshold must be a positive, finite number
pub fn validate_action_amount(amount: f64) -> Result<()> {
    if !amount.is_finite() {
        return Err(HedgeError::Validation(format!(
            "actionAmount must be a number: {}",
            amount
        )));
    }

    if amount <= 0.0 {
        return Err(HedgeError::Validation(format!(
            "actionAmount must be positive: {}",
            amount
        )));
    }

    Ok(())
}

/// Wager must be strictly positive
pub fn validate_bet_amount(amount: Decimal) -> Result<()> {
    if amount <= Decimal::ZERO {
        return Err(HedgeError::Validation(format!(
            "betAmount must be positive: {}",
            amount
        )));
    }

    Ok(())
}

/// Turn a complete selection into the request body.
///
/// Fails on the first class of problem found: empty required fields first,
/// then out-of-range amounts.
pub fn validate_selection(selection: &SelectionState) -> Result<PredictRequest> {
    let missing = selection.missing_fields();
    if !missing.is_empty() {
        return Err(HedgeError::Validation(missing_fields_message(&missing)));
    }

    // Presence is guaranteed by the check above
    let (Some(player), Some(action), Some(bet_type), Some(action_amount), Some(bet_amount)) = (
        selection.player.as_deref(),
        selection.action.as_deref(),
        selection.bet_type,
        selection.action_amount,
        selection.bet_amount,
    ) else {
        return Err(HedgeError::Internal("selection changed during validation".into()));
    };

    validate_action_amount(action_amount)?;
    validate_bet_amount(bet_amount)?;

    Ok(PredictRequest {
        player: player.trim().to_string(),
        action: action.trim().to_string(),
        bet_type,
        action_amount,
        bet_amount,
    })
}
