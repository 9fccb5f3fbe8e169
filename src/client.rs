//! main client
//!
//! query and command dispatch against the puppetdb api, with status
//! classification and response shaping.

use crate::config::ClientConfig;
use crate::error::{ApiResponse, Error, Result};
use crate::query::{rewrite_options, Query, QueryOptions};
use crate::response::Response;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::StatusCode;
use std::future::Future;
use std::sync::Arc;
use url::Url;

/// client for the puppetdb query and command api
#[derive(Clone, Debug)]
pub struct Client {
    config: Arc<ClientConfig>,
    http: reqwest::Client,
}

impl Client {
    /// create a new client
    ///
    /// validates the configuration once, then builds the instance-scoped
    /// transport: auth header, ca root, and client identity live on this
    /// client only, never on process-global state.
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let http = match &config.http_client {
            Some(prebuilt) => prebuilt.clone(),
            None => build_transport(&config)?,
        };

        Ok(Self {
            config: Arc::new(config),
            http,
        })
    }

    /// access the client configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// run a query against an endpoint
    ///
    /// an empty `endpoint` selects raw query mode: no path suffix, and
    /// the query text is transmitted verbatim. options are forwarded as
    /// extra body fields with their keys rewritten for the wire.
    pub async fn query(
        &self,
        endpoint: &str,
        query: impl Into<Query>,
        options: Option<QueryOptions>,
    ) -> Result<Response> {
        self.query_with(endpoint, query.into(), options, |url, body| async move {
            // the api accepts query parameters in a GET body, which keeps
            // large query expressions clear of url length limits
            let response = self.http.get(url).json(&body).send().await?;
            let status = response.status();
            let headers = response.headers().clone();
            let text = response.text().await?;
            Ok((status, headers, text))
        })
        .await
    }

    /// submit a command addressed to the node named in the payload
    pub async fn command(
        &self,
        name: &str,
        payload: serde_json::Value,
        version: u32,
    ) -> Result<Response> {
        self.command_with(name, payload, version, |url, body| async move {
            let response = self
                .http
                .post(url)
                .header(ACCEPT, "application/json")
                .json(&body)
                .send()
                .await?;
            let status = response.status();
            let headers = response.headers().clone();
            let text = response.text().await?;
            Ok((status, headers, text))
        })
        .await
    }
}

fn build_transport(config: &ClientConfig) -> Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    if let Some(token) = &config.token {
        headers.insert(
            "X-Authentication",
            HeaderValue::from_str(token)
                .map_err(|err| Error::Config(format!("invalid token header value: {err}")))?,
        );
    }
    headers.extend(config.extra_headers.clone());

    let mut builder = reqwest::Client::builder()
        .default_headers(headers)
        .user_agent(config.user_agent.clone())
        .timeout(config.timeout);

    // peer verification stays on; the pem bundle only adds trust material
    // and an optional client identity
    if let Some(pem) = &config.pem {
        if let Some(ca_file) = &pem.ca_file {
            let ca = reqwest::Certificate::from_pem(&std::fs::read(ca_file)?)?;
            builder = builder.add_root_certificate(ca);
        }
        if let (Some(cert), Some(key)) = (&pem.cert, &pem.key) {
            let mut identity = std::fs::read(key)?;
            identity.extend(std::fs::read(cert)?);
            builder = builder.identity(reqwest::Identity::from_pem(&identity)?);
        }
    }

    Ok(builder.build()?)
}

/// map an http status to the error taxonomy, passing successes through
fn classify(status: StatusCode, headers: HeaderMap, body: String) -> Result<(HeaderMap, String)> {
    match status.as_u16() {
        401 => Err(Error::Unauthorized(ApiResponse {
            status: 401,
            headers,
            body,
        })),
        403 => Err(Error::Forbidden(ApiResponse {
            status: 403,
            headers,
            body,
        })),
        code if status.is_client_error() || status.is_server_error() => Err(Error::Api(
            ApiResponse {
                status: code,
                headers,
                body,
            },
        )),
        _ => Ok((headers, body)),
    }
}

fn parse_query_response(status: StatusCode, headers: HeaderMap, text: String) -> Result<Response> {
    let (headers, text) = classify(status, headers, text)?;
    let body: serde_json::Value = serde_json::from_str(&text)?;
    Ok(Response::from_parts(&headers, body))
}

fn parse_command_response(
    status: StatusCode,
    headers: HeaderMap,
    text: String,
) -> Result<Response> {
    let (_headers, text) = classify(status, headers, text)?;
    // commands acknowledge with a small json body, but an empty body is
    // tolerated
    let body = if text.trim().is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_str(&text)?
    };
    Ok(Response::without_total(body))
}

impl Client {
    pub(crate) async fn query_with<F, Fut>(
        &self,
        endpoint: &str,
        query: Query,
        options: Option<QueryOptions>,
        send: F,
    ) -> Result<Response>
    where
        F: FnOnce(Url, serde_json::Value) -> Fut,
        Fut: Future<Output = Result<(StatusCode, HeaderMap, String)>>,
    {
        let url = self.config.query_url(endpoint)?;
        let mut body = serde_json::Map::new();
        body.insert(
            "query".to_string(),
            serde_json::Value::String(query.build()?),
        );
        if let Some(options) = &options {
            body.extend(rewrite_options(options)?);
        }
        let body = serde_json::Value::Object(body);

        tracing::debug!(path = url.path(), body = %body, "puppetdb query");
        let (status, headers, text) = send(url, body).await?;
        parse_query_response(status, headers, text)
    }

    pub(crate) async fn command_with<F, Fut>(
        &self,
        name: &str,
        payload: serde_json::Value,
        version: u32,
        send: F,
    ) -> Result<Response>
    where
        F: FnOnce(Url, serde_json::Value) -> Fut,
        Fut: Future<Output = Result<(StatusCode, HeaderMap, String)>>,
    {
        // the original client sends an empty certname when the payload
        // omits it, leaving rejection to the server
        let certname = payload
            .get("certname")
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default();
        let url = self.config.command_url(name, version, certname)?;

        tracing::debug!(path = url.path(), command = name, payload = %payload, "puppetdb command");
        let (status, headers, text) = send(url, payload).await?;
        parse_command_response(status, headers, text)
    }
}
