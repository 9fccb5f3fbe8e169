//! client configuration
//!
//! build a [`ClientConfig`] with server url, tls material, and optional
//! overrides, or derive one from a loose settings map with
//! [`ClientConfig::from_settings`]. pass it to [`crate::Client::new`].

use crate::error::{Error, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// paths to pem material for tls
///
/// `ca_file` is required whenever a bundle is set on an https server.
/// `cert` and `key` together enable mutual tls; without them the
/// connection is server-authenticated only and a token must be present.
#[derive(Debug, Clone, Default)]
pub struct PemBundle {
    /// client certificate path
    pub cert: Option<PathBuf>,
    /// client private key path
    pub key: Option<PathBuf>,
    /// ca bundle path used to verify the server
    pub ca_file: Option<PathBuf>,
}

/// configuration for the puppetdb client
#[derive(Clone)]
pub struct ClientConfig {
    /// original server url input
    pub(crate) raw_server_url: String,

    /// base url of the puppetdb instance (e.g., "<https://puppetdb.example.com:8081>")
    pub(crate) server_url: Url,

    /// whether the provided server url parsed successfully
    pub(crate) server_url_valid: bool,

    /// pem material for tls
    pub(crate) pem: Option<PemBundle>,

    /// bearer token sent as `X-Authentication`
    pub(crate) token: Option<String>,

    /// query api version (path segment `v{N}`)
    pub(crate) query_api_version: u32,

    /// command api version (path segment `v{M}`)
    pub(crate) command_api_version: u32,

    /// request timeout duration
    pub(crate) timeout: Duration,

    /// user agent string
    pub(crate) user_agent: String,

    /// additional headers to send with every request
    pub(crate) extra_headers: HeaderMap,

    /// prebuilt http client (all transport config comes from it)
    pub(crate) http_client: Option<reqwest::Client>,
}

impl ClientConfig {
    /// create a new client configuration
    ///
    /// # example
    ///
    /// ```
    /// use puppetdb::ClientConfig;
    ///
    /// let config = ClientConfig::new("https://puppetdb.example.com:8081")
    ///     .with_token("your-token-here");
    /// ```
    pub fn new(server_url: impl AsRef<str>) -> Self {
        let server_url_str = server_url.as_ref();

        let normalized = server_url_str.trim_end_matches('/');

        // a url without a scheme must fail validation, so no fallback here
        let (server_url, server_url_valid) = match Url::parse(normalized) {
            Ok(url) => (url, true),
            Err(_) => (Url::parse("https://invalid.invalid").unwrap(), false),
        };

        Self {
            raw_server_url: server_url_str.to_string(),
            server_url,
            server_url_valid,
            pem: None,
            token: None,
            query_api_version: 4,
            command_api_version: 1,
            timeout: Duration::from_secs(30),
            user_agent: format!("puppetdb-rs/{} (Rust)", env!("CARGO_PKG_VERSION")),
            extra_headers: HeaderMap::new(),
            http_client: None,
        }
    }

    /// derive a configuration from a loose settings map
    ///
    /// keys may be given plain (`"server"`) or symbol-style (`":server"`);
    /// lookup tries the key as given, then the symbol form, then the plain
    /// form. recognized keys: `server` (required), `pem` (map with `cert`,
    /// `key`, `ca_file`), `token`, `query_api_version`,
    /// `command_api_version`.
    pub fn from_settings(settings: &Value) -> Result<Self> {
        let settings = settings
            .as_object()
            .ok_or_else(|| Error::Config("settings must be a map".to_string()))?;

        let server = lookup(settings, "server")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::Config("settings require a server url".to_string()))?;
        let mut config = Self::new(server);

        if let Some(pem) = lookup(settings, "pem").and_then(Value::as_object) {
            config = config.with_pem(PemBundle {
                cert: lookup(pem, "cert").and_then(Value::as_str).map(PathBuf::from),
                key: lookup(pem, "key").and_then(Value::as_str).map(PathBuf::from),
                ca_file: lookup(pem, "ca_file")
                    .and_then(Value::as_str)
                    .map(PathBuf::from),
            });
        }

        if let Some(token) = lookup(settings, "token").and_then(Value::as_str) {
            config = config.with_token(token);
        }

        if let Some(version) = lookup(settings, "query_api_version").and_then(Value::as_u64) {
            config = config.with_query_api_version(version as u32);
        }

        if let Some(version) = lookup(settings, "command_api_version").and_then(Value::as_u64) {
            config = config.with_command_api_version(version as u32);
        }

        Ok(config)
    }

    /// set the pem bundle for tls
    pub fn with_pem(mut self, pem: PemBundle) -> Self {
        self.pem = Some(pem);
        self
    }

    /// set the bearer token sent as `X-Authentication`
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// set the query api version
    ///
    /// default: 4
    pub fn with_query_api_version(mut self, version: u32) -> Self {
        self.query_api_version = version;
        self
    }

    /// set the command api version
    ///
    /// default: 1
    pub fn with_command_api_version(mut self, version: u32) -> Self {
        self.command_api_version = version;
        self
    }

    /// set the request timeout
    ///
    /// default: 30 seconds
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// set a custom user agent string
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// add a header to every request
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.extra_headers.insert(name, value);
        self
    }

    /// add a set of headers to every request
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.extra_headers.extend(headers);
        self
    }

    /// inject a prebuilt http client.
    ///
    /// when set, this client is used as-is: auth headers, tls, timeouts,
    /// and user agent all come from the prebuilt client, and the
    /// corresponding `ClientConfig` fields are ignored.
    pub fn with_http_client(mut self, http_client: reqwest::Client) -> Self {
        self.http_client = Some(http_client);
        self
    }

    /// whether the configured server uses tls
    pub fn use_ssl(&self) -> bool {
        self.server_url.scheme() == "https"
    }

    /// validate the configuration
    pub(crate) fn validate(&self) -> Result<()> {
        if !self.server_url_valid {
            return Err(Error::Config(format!(
                "invalid server url: {}",
                self.raw_server_url
            )));
        }

        let scheme = self.server_url.scheme();
        if scheme != "http" && scheme != "https" {
            return Err(Error::Config(format!(
                "invalid url scheme: {}. must be http or https",
                scheme
            )));
        }

        if scheme == "https" {
            if let Some(pem) = &self.pem {
                if pem.ca_file.is_none() {
                    return Err(Error::Config(
                        "pem bundle requires a ca_file".to_string(),
                    ));
                }
                // ca-only tls is fine when a token carries authentication
                let has_identity = pem.cert.is_some() && pem.key.is_some();
                if self.token.is_none() && !has_identity {
                    return Err(Error::Config(
                        "pem bundle requires both cert and key, or a token".to_string(),
                    ));
                }
            }
        }

        Ok(())
    }

    /// build the query url for an endpoint (empty endpoint = raw query mode)
    pub(crate) fn query_url(&self, endpoint: &str) -> Result<Url> {
        let base = self.server_url.as_str().trim_end_matches('/');
        let url_str = if endpoint.is_empty() {
            format!("{}/pdb/query/v{}", base, self.query_api_version)
        } else {
            format!("{}/pdb/query/v{}/{}", base, self.query_api_version, endpoint)
        };
        Url::parse(&url_str).map_err(Error::from)
    }

    /// build the command url with its addressing parameters
    pub(crate) fn command_url(&self, command: &str, version: u32, certname: &str) -> Result<Url> {
        let base = self.server_url.as_str().trim_end_matches('/');
        let mut url = Url::parse(&format!("{}/pdb/cmd/v{}", base, self.command_api_version))?;
        url.query_pairs_mut()
            .append_pair("command", command)
            .append_pair("version", &version.to_string())
            .append_pair("certname", certname);
        Ok(url)
    }
}

/// look up a settings key tolerantly: the key as given, then a symbol
/// form, then a plain string form; nulls count as absent
fn lookup<'a>(settings: &'a serde_json::Map<String, Value>, key: &str) -> Option<&'a Value> {
    let plain = key.trim_start_matches(':');
    settings
        .get(key)
        .or_else(|| settings.get(&format!(":{plain}")))
        .or_else(|| settings.get(plain))
        .filter(|value| !value.is_null())
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("server_url", &self.server_url)
            .field("pem", &self.pem)
            .field("query_api_version", &self.query_api_version)
            .field("command_api_version", &self.command_api_version)
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .field("extra_headers", &self.extra_headers.len())
            .field("http_client", &self.http_client.is_some())
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
