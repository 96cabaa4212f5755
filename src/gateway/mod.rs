pub mod reply;
mod traits;

pub use reply::{ServiceRejection, ServiceReply};
pub use traits::{BetStore, PredictionService, RosterService};

#[cfg(test)]
pub use traits::{MockBetStore, MockPredictionService, MockRosterService};
