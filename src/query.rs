//! query expressions and request options
//!
//! the query value is opaque to the client: it only needs to render to
//! the wire string. this module also holds the option-key rewriting pass
//! applied to query request options.

use crate::error::Result;
use serde_json::{Map, Value};

/// a query expression for the query api
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    /// raw query text (pql), transmitted verbatim
    Raw(String),
    /// structured expression, serialized to json on build
    Expr(Value),
}

impl Query {
    /// render the wire query string
    pub fn build(&self) -> Result<String> {
        match self {
            Query::Raw(text) => Ok(text.clone()),
            Query::Expr(value) => Ok(serde_json::to_string(value)?),
        }
    }
}

impl From<&str> for Query {
    fn from(text: &str) -> Self {
        Query::Raw(text.to_string())
    }
}

impl From<String> for Query {
    fn from(text: String) -> Self {
        Query::Raw(text)
    }
}

impl From<Value> for Query {
    fn from(value: Value) -> Self {
        Query::Expr(value)
    }
}

/// request options for the query api, keyed underscore-style
pub type QueryOptions = Map<String, Value>;

/// options whose value is json-encoded into a string on the wire
const JSON_ENCODED_OPTIONS: &[&str] = &["counts_filter"];

/// rewrite option keys for the wire: underscores become hyphens, and
/// json-encoded options carry their value as a json string
pub(crate) fn rewrite_options(options: &QueryOptions) -> Result<Map<String, Value>> {
    let mut rewritten = Map::new();
    for (key, value) in options {
        let wire_key = key.replace('_', "-");
        if JSON_ENCODED_OPTIONS.contains(&key.as_str()) {
            rewritten.insert(wire_key, Value::String(serde_json::to_string(value)?));
        } else {
            rewritten.insert(wire_key, value.clone());
        }
    }
    Ok(rewritten)
}
