//! Fee synthesis for flight offer search results.
//!
//! Some provider responses list a `total` above the `base` fare without any
//! fee line items (or with only zero-valued ones). For those offers a single
//! `ESTIMATED_FEES` entry carrying `total - base` is filled in so clients can
//! render a price breakdown.

use serde_json::{json, Map, Value};
use thiserror::Error;

/// Fee type attached to synthesized fee entries
pub const ESTIMATED_FEES: &str = "ESTIMATED_FEES";

#[derive(Debug, Error)]
enum FeeError {
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("non-numeric {field}: {value}")]
    NotNumeric { field: &'static str, value: String },
}

/// Fill in missing fee breakdowns on every offer in `data[]`.
///
/// Best-effort: malformed input, or any offer whose amounts cannot be read,
/// returns `body` unchanged. When no offer needs a fee the original text is
/// returned as-is.
pub fn estimate_fees(body: &str) -> String {
    match try_estimate(body) {
        Ok(Some(rewritten)) => rewritten,
        Ok(None) => body.to_string(),
        Err(e) => {
            tracing::debug!("Skipping fee estimation: {}", e);
            body.to_string()
        }
    }
}

fn try_estimate(body: &str) -> Result<Option<String>, FeeError> {
    let mut root: Value = serde_json::from_str(body)?;

    let Some(offers) = root.get_mut("data").and_then(Value::as_array_mut) else {
        return Ok(None);
    };

    let mut changed = false;
    for offer in offers.iter_mut() {
        if let Some(price) = offer.get_mut("price").and_then(Value::as_object_mut) {
            changed |= fill_price(price)?;
        }
    }

    if !changed {
        return Ok(None);
    }

    Ok(Some(serde_json::to_string(&root)?))
}

/// Returns whether a fee entry was synthesized for this price
fn fill_price(price: &mut Map<String, Value>) -> Result<bool, FeeError> {
    let (Some(base), Some(total)) = (price.get("base"), price.get("total")) else {
        return Ok(false);
    };
    let base = parse_amount("base", base)?;
    let total = parse_amount("total", total)?;

    let needs_estimate = match price.get("fees").and_then(Value::as_array) {
        None => true,
        Some(fees) if fees.is_empty() => true,
        Some(fees) => all_zero(fees)?,
    };

    // Whole cents; a sub-cent gap would otherwise print as "0.00"
    let cents = ((total - base) * 100.0).round();
    if !needs_estimate || cents <= 0.0 {
        return Ok(false);
    }

    price.insert(
        "fees".to_string(),
        json!([{ "amount": format!("{:.2}", cents / 100.0), "type": ESTIMATED_FEES }]),
    );
    Ok(true)
}

fn all_zero(fees: &[Value]) -> Result<bool, FeeError> {
    for fee in fees {
        let amount = match fee.get("amount") {
            Some(amount) => parse_amount("fee amount", amount)?,
            None => 0.0,
        };
        if amount != 0.0 {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Provider amounts arrive as decimal strings ("135.00") or plain numbers
fn parse_amount(field: &'static str, value: &Value) -> Result<f64, FeeError> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    parsed
        .filter(|v| v.is_finite())
        .ok_or_else(|| FeeError::NotNumeric {
            field,
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offer_body(price: Value) -> String {
        json!({ "meta": { "count": 1 }, "data": [{ "id": "1", "price": price }] }).to_string()
    }

    fn fees_of(body: &str) -> Value {
        let v: Value = serde_json::from_str(body).unwrap();
        v["data"][0]["price"]["fees"].clone()
    }

    #[test]
    fn test_synthesizes_fee_when_fees_empty() {
        let body = offer_body(json!({ "base": "100.00", "total": "135.00", "fees": [] }));
        let out = estimate_fees(&body);
        assert_eq!(fees_of(&out), json!([{ "amount": "35.00", "type": "ESTIMATED_FEES" }]));
    }

    #[test]
    fn test_synthesizes_fee_when_fees_absent_and_numeric_prices() {
        let body = offer_body(json!({ "base": 80, "total": 92.5 }));
        let out = estimate_fees(&body);
        assert_eq!(fees_of(&out), json!([{ "amount": "12.50", "type": "ESTIMATED_FEES" }]));
    }

    #[test]
    fn test_replaces_all_zero_fees() {
        let body = offer_body(json!({
            "base": "200.00",
            "total": "250.10",
            "fees": [
                { "amount": "0.00", "type": "SUPPLIER" },
                { "amount": "0.00", "type": "TICKETING" }
            ]
        }));
        let out = estimate_fees(&body);
        assert_eq!(fees_of(&out), json!([{ "amount": "50.10", "type": "ESTIMATED_FEES" }]));
    }

    #[test]
    fn test_existing_fee_left_alone() {
        let body = offer_body(json!({
            "base": "100.00",
            "total": "135.00",
            "fees": [{ "amount": "35.00", "type": "SUPPLIER_FEE" }]
        }));
        assert_eq!(estimate_fees(&body), body);
    }

    #[test]
    fn test_no_fee_when_total_not_above_base() {
        let body = offer_body(json!({ "base": "100.00", "total": "100.00", "fees": [] }));
        assert_eq!(estimate_fees(&body), body);
    }

    #[test]
    fn test_no_fee_for_sub_cent_difference() {
        let body = offer_body(json!({ "base": "100.000", "total": "100.001", "fees": [] }));
        assert_eq!(estimate_fees(&body), body);
    }

    #[test]
    fn test_rewrite_keeps_other_numbers_verbatim() {
        let body = r#"{"data":[{"id":"1","score":135.10,"big":123456789012345678901234,"price":{"base":"100.00","total":"135.00","fees":[]}}]}"#;
        let out = estimate_fees(body);
        assert!(out.contains(r#""score":135.10"#), "{}", out);
        assert!(out.contains(r#""big":123456789012345678901234"#), "{}", out);
        assert!(out.contains(r#""amount":"35.00""#), "{}", out);
    }

    #[test]
    fn test_malformed_input_returned_unchanged() {
        let body = r#"{"data": [ {"price": "#;
        assert_eq!(estimate_fees(body), body);
        assert_eq!(estimate_fees("flight-result"), "flight-result");
    }

    #[test]
    fn test_unparseable_amount_returns_input() {
        let body = offer_body(json!({ "base": "abc", "total": "135.00", "fees": [] }));
        assert_eq!(estimate_fees(&body), body);
    }

    #[test]
    fn test_idempotent() {
        let body = offer_body(json!({ "base": "100.00", "total": "135.00", "fees": [] }));
        let once = estimate_fees(&body);
        let twice = estimate_fees(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_preserves_other_fields_and_order() {
        let body = r#"{"data":[{"id":"7","price":{"currency":"EUR","total":"135.00","base":"100.00","grandTotal":"135.00"}}],"dictionaries":{}}"#;
        let out = estimate_fees(body);
        assert_eq!(
            out,
            r#"{"data":[{"id":"7","price":{"currency":"EUR","total":"135.00","base":"100.00","grandTotal":"135.00","fees":[{"amount":"35.00","type":"ESTIMATED_FEES"}]}}],"dictionaries":{}}"#
        );
    }
}
