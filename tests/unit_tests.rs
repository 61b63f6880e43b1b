// Unit tests for Flight Proxy

use flight_proxy::core::{estimate_fees, ESTIMATED_FEES};
use flight_proxy::models::{CabinClass, FlightSearchParams};
use serde_json::{json, Value};
use validator::Validate;

fn search_response(offers: Vec<Value>) -> String {
    let count = offers.len();
    json!({ "meta": { "count": count }, "data": offers, "dictionaries": {} }).to_string()
}

fn offer(id: &str, price: Value) -> Value {
    json!({ "type": "flight-offer", "id": id, "price": price })
}

#[test]
fn test_fee_synthesis_matches_total_minus_base() {
    let body = search_response(vec![offer(
        "1",
        json!({ "currency": "USD", "base": "100.00", "total": "135.00", "fees": [] }),
    )]);

    let out: Value = serde_json::from_str(&estimate_fees(&body)).unwrap();
    assert_eq!(
        out["data"][0]["price"]["fees"],
        json!([{ "amount": "35.00", "type": ESTIMATED_FEES }])
    );
    assert_eq!(out["data"][0]["price"]["total"], "135.00");
    assert_eq!(out["meta"]["count"], 1);
}

#[test]
fn test_fee_estimation_only_touches_offers_that_need_it() {
    let body = search_response(vec![
        offer("1", json!({ "base": "100.00", "total": "135.00", "fees": [{ "amount": "35.00", "type": "SUPPLIER_FEE" }] })),
        offer("2", json!({ "base": "250.00", "total": "310.75" })),
        json!({ "type": "flight-offer", "id": "3" }),
    ]);

    let out: Value = serde_json::from_str(&estimate_fees(&body)).unwrap();
    assert_eq!(
        out["data"][0]["price"]["fees"],
        json!([{ "amount": "35.00", "type": "SUPPLIER_FEE" }])
    );
    assert_eq!(
        out["data"][1]["price"]["fees"],
        json!([{ "amount": "60.75", "type": ESTIMATED_FEES }])
    );
    assert!(out["data"][2].get("price").is_none());
}

#[test]
fn test_fee_estimation_unchanged_inputs() {
    let supplier_fee = search_response(vec![offer(
        "1",
        json!({ "base": "100.00", "total": "135.00", "fees": [{ "amount": "35.00", "type": "SUPPLIER_FEE" }] }),
    )]);
    assert_eq!(estimate_fees(&supplier_fee), supplier_fee);

    for body in ["", "{", "[]", r#"{"data": "nope"}"#, r#"{"errors":[{"status":400}]}"#] {
        assert_eq!(estimate_fees(body), body);
    }
}

#[test]
fn test_fee_estimation_is_idempotent() {
    let body = search_response(vec![
        offer("1", json!({ "base": "100.00", "total": "135.00", "fees": [] })),
        offer("2", json!({ "base": "99.99", "total": "120.00", "fees": [{ "amount": "0", "type": "TICKETING" }] })),
    ]);

    let once = estimate_fees(&body);
    assert_ne!(once, body);
    assert_eq!(estimate_fees(&once), once);
}

#[test]
fn test_flight_params_date_handling() {
    let params: FlightSearchParams = serde_json::from_value(json!({
        "origin": "MEX",
        "destination": "JFK",
        "date": "  2025-06-01 ",
        "adults": 1,
        "currency": "USD"
    }))
    .unwrap();

    assert_eq!(params.departure_date(), Some("2025-06-01"));
    assert!(!params.non_stop);
    assert!(params.validate().is_ok());

    let blank = FlightSearchParams {
        date: Some("   ".to_string()),
        ..params.clone()
    };
    assert_eq!(blank.departure_date(), None);

    let no_adults = FlightSearchParams { adults: 0, ..params };
    assert!(no_adults.validate().is_err());
}

#[test]
fn test_cabin_class_wire_names() {
    assert_eq!(CabinClass::PremiumEconomy.as_str(), "PREMIUM_ECONOMY");
    assert_eq!(
        serde_json::to_value(CabinClass::PremiumEconomy).unwrap(),
        json!("PREMIUM_ECONOMY")
    );
    assert_eq!("first".parse::<CabinClass>(), Ok(CabinClass::First));
}
