//! Coordination primitives shared by the form components
//!
//! - Generation tokens that discard responses superseded by newer requests

pub mod race_guard;

pub use race_guard::{GenerationToken, RaceGuard};
