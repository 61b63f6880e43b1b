// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{AccessToken, CabinClass, Credentials, FlightSearchQuery, TokenResponse};
pub use requests::{AirlineLookupParams, AirportSearchParams, FlightSearchParams};
pub use responses::{EmbeddedError, ErrorResponse, HealthResponse};
