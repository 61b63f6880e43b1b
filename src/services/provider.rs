use crate::config::{Settings, TokenSettings};
use crate::core::estimate_fees;
use crate::models::{Credentials, FlightSearchQuery};
use crate::services::{ProviderError, TokenClient};
use reqwest::{Client, Response};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

const FLIGHT_OFFERS_PATH: &str = "/v2/shopping/flight-offers";
const LOCATIONS_PATH: &str = "/v1/reference-data/locations";
const AIRLINES_PATH: &str = "/v1/reference-data/airlines";
const PRICING_PATH: &str = "/v1/shopping/flight-offers/pricing";

/// Location subtypes searched by the airport lookup
const AIRPORT_SUBTYPES: &str = "AIRPORT,CITY";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Flight data provider client
///
/// Each operation authenticates through the [`TokenClient`] and then makes
/// exactly one request to the provider, returning the body text on success:
/// - Flight offer search (with fee estimation)
/// - Airport and city search
/// - Airline lookup
/// - Flight offer pricing
pub struct ProviderClient {
    client: Client,
    credentials: Arc<Credentials>,
    tokens: TokenClient,
}

impl ProviderClient {
    /// Create a new provider client
    pub fn new(
        credentials: Credentials,
        timeout: Duration,
        token_settings: &TokenSettings,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder().timeout(timeout).build()?;
        let credentials = Arc::new(credentials);
        let tokens = TokenClient::new(client.clone(), credentials.clone(), token_settings);

        Ok(Self {
            client,
            credentials,
            tokens,
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, ProviderError> {
        let timeout = settings.provider.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
        Self::new(
            settings.credentials(),
            Duration::from_secs(timeout),
            &settings.token,
        )
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn tokens(&self) -> &TokenClient {
        &self.tokens
    }

    /// Search flight offers and backfill missing fee breakdowns
    pub async fn search_flights(&self, query: &FlightSearchQuery) -> Result<String, ProviderError> {
        let body = self
            .get(FLIGHT_OFFERS_PATH, &query.to_query_pairs())
            .await?;

        Ok(estimate_fees(&body))
    }

    /// Search airports and cities matching a keyword
    pub async fn search_airports(&self, keyword: &str) -> Result<String, ProviderError> {
        self.get(
            LOCATIONS_PATH,
            &[
                ("subType", AIRPORT_SUBTYPES.to_string()),
                ("keyword", keyword.to_string()),
            ],
        )
        .await
    }

    /// Look up an airline by its IATA or ICAO code
    pub async fn lookup_airline(&self, code: &str) -> Result<String, ProviderError> {
        self.get(AIRLINES_PATH, &[("airlineCodes", code.to_string())])
            .await
    }

    /// Confirm the price of a flight offer
    ///
    /// `offer` is forwarded untouched as the request body.
    pub async fn price_flight_offer(&self, offer: &Value) -> Result<String, ProviderError> {
        let token = self.tokens.fetch_token().await?;
        let url = self.credentials.endpoint(PRICING_PATH);

        tracing::debug!("Pricing flight offer via: {}", url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&token.value)
            .header("X-HTTP-Method-Override", "GET")
            .json(offer)
            .send()
            .await?;

        read_body(response).await
    }

    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<String, ProviderError> {
        let token = self.tokens.fetch_token().await?;
        let url = self.credentials.endpoint(path);

        tracing::debug!("Fetching from: {} ({} query params)", url, query.len());

        let response = self
            .client
            .get(&url)
            .bearer_auth(&token.value)
            .query(query)
            .send()
            .await?;

        read_body(response).await
    }
}

async fn read_body(response: Response) -> Result<String, ProviderError> {
    let status = response.status();
    let url = response.url().path().to_string();
    let body = response.text().await?;

    if !status.is_success() {
        tracing::error!("Provider request to {} failed: {} - {}", url, status, body);
        return Err(ProviderError::Api { status, body });
    }

    if body.trim().is_empty() {
        return Err(ProviderError::InvalidResponse(format!(
            "empty response body from {}",
            url
        )));
    }

    Ok(body)
}
