use serde::{Deserialize, Serialize};
use validator::Validate;

/// Query string for `GET /api/flights`
///
/// `date` is optional at the extractor level so that a missing date gets the
/// same plain-text 400 as a blank one.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FlightSearchParams {
    pub origin: String,
    pub destination: String,
    #[serde(default)]
    pub date: Option<String>,
    #[validate(range(min = 1))]
    pub adults: u32,
    pub currency: String,
    #[serde(default, rename = "nonStop", alias = "non_stop")]
    pub non_stop: bool,
    #[serde(default)]
    pub cabin: Option<String>,
}

impl FlightSearchParams {
    /// The trimmed departure date, if one was supplied
    pub fn departure_date(&self) -> Option<&str> {
        self.date
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
    }
}

/// Query string for `GET /api/airports`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AirportSearchParams {
    pub keyword: String,
}

/// Query string for `GET /api/airline`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AirlineLookupParams {
    pub code: String,
}
