use actix_web::{http::header::ContentType, http::StatusCode, web, HttpResponse, Responder};
use serde_json::Value;
use std::sync::Arc;
use validator::Validate;

use crate::config::UpstreamErrorPolicy;
use crate::models::{
    AirlineLookupParams, AirportSearchParams, CabinClass, EmbeddedError, ErrorResponse,
    FlightSearchParams, FlightSearchQuery, HealthResponse,
};
use crate::services::{ProviderClient, ProviderError};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<ProviderClient>,
    pub error_policy: UpstreamErrorPolicy,
}

/// Configure all flight-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/flights", web::get().to(search_flights))
        .route("/flights/pricing", web::post().to(price_flight_offer))
        .route("/airports", web::get().to(search_airports))
        .route("/airline", web::get().to(lookup_airline));
}

/// Health check endpoint
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Flight offers search
///
/// GET /api/flights?origin=MEX&destination=JFK&date=2025-06-01&adults=1&currency=USD&nonStop=true&cabin=economy
async fn search_flights(
    state: web::Data<AppState>,
    params: web::Query<FlightSearchParams>,
) -> HttpResponse {
    let params = params.into_inner();

    let Some(departure_date) = params.departure_date().map(str::to_string) else {
        return HttpResponse::BadRequest()
            .content_type(ContentType::plaintext())
            .body("Missing required parameter: date");
    };

    if let Err(errors) = params.validate() {
        tracing::info!("Validation failed for flight search: {:?}", errors);
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let cabin = match params
        .cabin
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::parse::<CabinClass>)
        .transpose()
    {
        Ok(cabin) => cabin,
        Err(message) => {
            return HttpResponse::BadRequest().json(ErrorResponse {
                error: "Invalid cabin".to_string(),
                message,
                status_code: 400,
            });
        }
    };

    let query = FlightSearchQuery {
        origin: params.origin,
        destination: params.destination,
        departure_date,
        adults: params.adults,
        currency: params.currency,
        non_stop: params.non_stop,
        cabin,
    };

    tracing::info!(
        "Searching flights {} -> {} on {} ({} adults, cabin: {:?})",
        query.origin,
        query.destination,
        query.departure_date,
        query.adults,
        query.cabin
    );

    let result = state.provider.search_flights(&query).await;
    upstream_response(state.error_policy, "fetch flights", result)
}

/// Airport and city search
///
/// GET /api/airports?keyword=Mexico
async fn search_airports(
    state: web::Data<AppState>,
    params: web::Query<AirportSearchParams>,
) -> HttpResponse {
    tracing::info!("Searching airports for keyword: {}", params.keyword);

    let result = state.provider.search_airports(&params.keyword).await;
    upstream_response(state.error_policy, "fetch airports", result)
}

/// Airline lookup
///
/// GET /api/airline?code=AM
async fn lookup_airline(
    state: web::Data<AppState>,
    params: web::Query<AirlineLookupParams>,
) -> HttpResponse {
    tracing::info!("Looking up airline: {}", params.code);

    let result = state.provider.lookup_airline(&params.code).await;
    upstream_response(state.error_policy, "fetch airline", result)
}

/// Flight offer pricing
///
/// POST /api/flights/pricing with the provider's pricing request as the body
async fn price_flight_offer(
    state: web::Data<AppState>,
    offer: web::Json<Value>,
) -> HttpResponse {
    let result = state.provider.price_flight_offer(&offer).await;
    upstream_response(state.error_policy, "price flight offer", result)
}

/// Map a provider result onto the outward response
///
/// Successful bodies pass through untouched. Failures are logged, then either
/// embedded in a 200 or surfaced as a gateway error depending on `policy`.
fn upstream_response(
    policy: UpstreamErrorPolicy,
    action: &str,
    result: Result<String, ProviderError>,
) -> HttpResponse {
    let err = match result {
        Ok(body) => {
            return HttpResponse::Ok()
                .content_type(ContentType::json())
                .body(body);
        }
        Err(e) => e,
    };

    tracing::error!(error = ?err, "Failed to {}: {}", action, err);

    match policy {
        UpstreamErrorPolicy::Embed => HttpResponse::Ok().json(EmbeddedError {
            error: format!("Failed to {}: {}", action, err),
        }),
        UpstreamErrorPolicy::Status => {
            let status = gateway_status(&err);
            HttpResponse::build(status).json(ErrorResponse {
                error: format!("Failed to {}", action),
                message: err.to_string(),
                status_code: status.as_u16(),
            })
        }
    }
}

fn gateway_status(err: &ProviderError) -> StatusCode {
    if err.is_timeout() {
        StatusCode::GATEWAY_TIMEOUT
    } else {
        StatusCode::BAD_GATEWAY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[actix_web::test]
    async fn test_embed_policy_wraps_error_in_ok() {
        let err = ProviderError::UpstreamAuth("token endpoint returned 401 Unauthorized".into());
        let resp = upstream_response(UpstreamErrorPolicy::Embed, "fetch airports", Err(err));
        assert_eq!(resp.status(), StatusCode::OK);

        let body = to_bytes(resp.into_body()).await.unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            json["error"],
            "Failed to fetch airports: Authentication with provider failed: token endpoint returned 401 Unauthorized"
        );
    }

    #[actix_web::test]
    async fn test_status_policy_maps_to_bad_gateway() {
        let err = ProviderError::Api {
            status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            body: "boom".into(),
        };
        let resp = upstream_response(UpstreamErrorPolicy::Status, "fetch airline", Err(err));
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);

        let body = to_bytes(resp.into_body()).await.unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "Failed to fetch airline");
        assert_eq!(json["status_code"], 502);
    }

    #[actix_web::test]
    async fn test_success_passes_body_through() {
        let resp = upstream_response(UpstreamErrorPolicy::Status, "fetch airline", Ok("airline-result".into()));
        assert_eq!(resp.status(), StatusCode::OK);

        let body = to_bytes(resp.into_body()).await.unwrap();
        assert_eq!(&body[..], b"airline-result");
    }
}
