//! puppetdb api client
//!
//! this crate provides a small, typed client for the puppetdb query and
//! command apis. start with [`Client`] and [`ClientConfig`], then use
//! `query` for the versioned query endpoints (or raw query mode) and
//! `command` to submit write events.
//!
//! ## quick start
//!
//! ```no_run
//! use puppetdb::{Client, ClientConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::new(ClientConfig::new("http://localhost:8080"))?;
//! let response = client
//!     .query("nodes", serde_json::json!(["=", ["fact", "kernel"], "Linux"]), None)
//!     .await?;
//! println!("{} of {:?} records", response.body, response.total);
//! # Ok(())
//! # }
//! ```
//!
//! ## authentication
//!
//! plain http needs no credentials. for https, configure either a
//! bearer token (sent as `X-Authentication`), a pem bundle for mutual
//! tls, or both; see [`ClientConfig`] and [`PemBundle`].

mod client;
mod config;
mod error;
mod pagination;
mod query;
mod response;

pub use client::Client;
pub use config::{ClientConfig, PemBundle};
pub use error::{ApiResponse, Error, Result};
pub use pagination::Paginator;
pub use query::{Query, QueryOptions};
pub use response::Response;
