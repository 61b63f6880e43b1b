use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Client credentials for the flight data provider
///
/// Built once at startup and handed to the provider client; never mutated.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub base_url: String,
}

impl Credentials {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            base_url: base_url.into(),
        }
    }

    /// Join an endpoint path onto the base URL
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Bearer token issued by the provider's OAuth2 endpoint
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub value: String,
    pub expires_in: Option<Duration>,
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &"<redacted>")
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

/// Body returned by `POST /v1/security/oauth2/token`
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: Option<String>,
    pub expires_in: Option<u64>,
}

/// Cabin class accepted by the flight offers search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CabinClass {
    Economy,
    PremiumEconomy,
    Business,
    First,
}

impl CabinClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            CabinClass::Economy => "ECONOMY",
            CabinClass::PremiumEconomy => "PREMIUM_ECONOMY",
            CabinClass::Business => "BUSINESS",
            CabinClass::First => "FIRST",
        }
    }
}

impl FromStr for CabinClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().replace(['-', ' '], "_").as_str() {
            "ECONOMY" => Ok(CabinClass::Economy),
            "PREMIUM_ECONOMY" => Ok(CabinClass::PremiumEconomy),
            "BUSINESS" => Ok(CabinClass::Business),
            "FIRST" => Ok(CabinClass::First),
            other => Err(format!(
                "unknown cabin '{}', expected one of: ECONOMY, PREMIUM_ECONOMY, BUSINESS, FIRST",
                other
            )),
        }
    }
}

impl fmt::Display for CabinClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated flight search, ready to send downstream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlightSearchQuery {
    pub origin: String,
    pub destination: String,
    pub departure_date: String,
    pub adults: u32,
    pub currency: String,
    pub non_stop: bool,
    pub cabin: Option<CabinClass>,
}

impl FlightSearchQuery {
    /// Query string pairs in the provider's parameter names
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("originLocationCode", self.origin.clone()),
            ("destinationLocationCode", self.destination.clone()),
            ("departureDate", self.departure_date.clone()),
            ("adults", self.adults.to_string()),
            ("currencyCode", self.currency.clone()),
            ("nonStop", self.non_stop.to_string()),
        ];

        if let Some(cabin) = self.cabin {
            pairs.push(("travelClass", cabin.as_str().to_string()));
        }

        pairs
    }
}
