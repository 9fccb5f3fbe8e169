//! response types
//!
//! the parsed response body plus the total record count used for paging.

use reqwest::header::HeaderMap;
use serde_json::Value;

/// response header carrying the total record count
pub(crate) const X_RECORDS: &str = "x-records";

/// a normalized api response
///
/// `body` is the parsed json payload, opaque to the client. `total` is
/// the record count for query results; commands carry no total.
#[derive(Debug, Clone)]
pub struct Response {
    /// parsed response body
    pub body: Value,
    /// total record count, when the exchange was a query
    pub total: Option<u64>,
}

impl Response {
    /// shape a query response: total comes from the `X-Records` header
    /// when present, else the element count of the body (so
    /// non-paginated endpoints self-report their size)
    pub(crate) fn from_parts(headers: &HeaderMap, body: Value) -> Self {
        let total = headers
            .get(X_RECORDS)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<u64>().ok())
            .unwrap_or_else(|| element_count(&body));
        Self {
            body,
            total: Some(total),
        }
    }

    /// shape a command acknowledgement, which is not a paginated result set
    pub(crate) fn without_total(body: Value) -> Self {
        Self { body, total: None }
    }
}

fn element_count(body: &Value) -> u64 {
    match body {
        Value::Array(items) => items.len() as u64,
        Value::Object(fields) => fields.len() as u64,
        Value::Null => 0,
        _ => 1,
    }
}
