use crate::config::TokenSettings;
use crate::models::{AccessToken, Credentials, TokenResponse};
use crate::services::ProviderError;
use moka::future::Cache;
use moka::Expiry;
use reqwest::Client;
use std::sync::Arc;
use std::time::{Duration, Instant};

const TOKEN_PATH: &str = "/v1/security/oauth2/token";

/// OAuth2 client-credentials token client
///
/// Every call to [`TokenClient::fetch_token`] hits the token endpoint unless
/// the optional cache is switched on in [`TokenSettings`].
pub struct TokenClient {
    client: Client,
    credentials: Arc<Credentials>,
    cache: Option<Cache<String, AccessToken>>,
}

/// Expires cached tokens `margin` before the provider says they lapse
struct TokenExpiry {
    margin: Duration,
    default_ttl: Duration,
}

impl Expiry<String, AccessToken> for TokenExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        token: &AccessToken,
        _created_at: Instant,
    ) -> Option<Duration> {
        let lifetime = token.expires_in.unwrap_or(self.default_ttl);
        Some(lifetime.saturating_sub(self.margin))
    }
}

impl TokenClient {
    pub fn new(client: Client, credentials: Arc<Credentials>, settings: &TokenSettings) -> Self {
        let cache = settings.cache_enabled.then(|| {
            Cache::builder()
                .max_capacity(16)
                .expire_after(TokenExpiry {
                    margin: Duration::from_secs(settings.expiry_margin_secs),
                    default_ttl: Duration::from_secs(settings.default_ttl_secs),
                })
                .build()
        });

        Self {
            client,
            credentials,
            cache,
        }
    }

    pub fn is_caching(&self) -> bool {
        self.cache.is_some()
    }

    /// Obtain a bearer token for the configured client
    pub async fn fetch_token(&self) -> Result<AccessToken, ProviderError> {
        let Some(cache) = &self.cache else {
            return self.request_token().await;
        };

        // Concurrent misses for the same client share one token request
        cache
            .try_get_with(self.credentials.client_id.clone(), self.request_token())
            .await
            .map_err(|e| Arc::try_unwrap(e).unwrap_or_else(ProviderError::Shared))
    }

    async fn request_token(&self) -> Result<AccessToken, ProviderError> {
        let url = self.credentials.endpoint(TOKEN_PATH);

        tracing::debug!("Requesting access token from: {}", url);

        let response = self
            .client
            .post(&url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.credentials.client_id.as_str()),
                ("client_secret", self.credentials.client_secret.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read body".to_string());
            tracing::error!("Token endpoint returned {}: {}", status, body);
            return Err(ProviderError::UpstreamAuth(format!(
                "token endpoint returned {}",
                status
            )));
        }

        let body = response.text().await?;
        let parsed: TokenResponse = serde_json::from_str(&body).map_err(|e| {
            ProviderError::UpstreamAuth(format!("token response is not valid JSON: {}", e))
        })?;

        let value = parsed
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                ProviderError::UpstreamAuth("token response missing access_token".to_string())
            })?;

        Ok(AccessToken {
            value,
            expires_in: parsed.expires_in.map(Duration::from_secs),
        })
    }
}
