pub mod bet;
pub mod catalog;
pub mod prediction;
pub mod selection;
pub mod session;
pub mod state;

pub use bet::*;
pub use catalog::*;
pub use prediction::*;
pub use selection::*;
pub use session::*;
pub use state::*;
