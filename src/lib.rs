//! Flight Proxy - flight search backend for the Amadeus Self-Service API
//!
//! Forwards flight, airport, airline and pricing requests to the provider,
//! handling the OAuth2 client-credentials flow on the caller's behalf and
//! backfilling missing fee breakdowns in flight search results.

pub mod config;
pub mod core;
pub mod logging;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::estimate_fees;
pub use models::{CabinClass, Credentials, FlightSearchQuery};
pub use services::{ProviderClient, ProviderError, TokenClient};
