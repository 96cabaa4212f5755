pub mod bet_store;
pub mod hedge_rest;
pub mod transport;

pub use bet_store::BetStoreClient;
pub use hedge_rest::HedgeApiClient;
pub use transport::ServiceTransport;
