use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, RANGE};
use serde_json::Value;

use crate::config::Config;
use crate::error::{HerokuToolsError, Result};

/// Root of the Heroku Platform API
pub const HEROKU_API_URL: &str = "https://api.heroku.com";

/// Accept header selecting version 3 of the Platform API
pub const HEROKU_ACCEPT: &str = "application/vnd.heroku+json; version=3";

/// API resources used by heroku-tools
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Releases,
    ConfigVars,
}

impl Endpoint {
    /// Path of the resource for `app`, relative to the API root
    pub fn path(&self, app: &str) -> String {
        match self {
            Endpoint::Releases => format!("/apps/{}/releases", app),
            Endpoint::ConfigVars => format!("/apps/{}/config-vars", app),
        }
    }
}

/// Performs one GET and decodes the JSON body.
pub trait ApiTransport: Send + Sync {
    /// # Arguments
    /// * `url` - Absolute URL
    /// * `range` - Optional value for the `Range` header
    fn get_json(&self, url: &str, range: Option<&str>) -> Result<Value>;
}

impl<T: ApiTransport + ?Sized> ApiTransport for &T {
    fn get_json(&self, url: &str, range: Option<&str>) -> Result<Value> {
        (**self).get_json(url, range)
    }
}

/// Blocking HTTP transport authenticated with an API token
pub struct HttpTransport {
    client: Client,
    token: String,
}

impl HttpTransport {
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("heroku-tools/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(HttpTransport {
            client,
            token: token.into(),
        })
    }
}

impl ApiTransport for HttpTransport {
    fn get_json(&self, url: &str, range: Option<&str>) -> Result<Value> {
        let mut request = self
            .client
            .get(url)
            .basic_auth("", Some(&self.token))
            .header(ACCEPT, HEROKU_ACCEPT);
        if let Some(range) = range {
            request = request.header(RANGE, range);
        }

        tracing::debug!(url, range = ?range, "calling Heroku API");
        let response = request.send()?;
        let status = response.status();
        let body = response.text()?;

        if !status.is_success() {
            // Heroku error bodies look like {"id": "...", "message": "..."}
            let message = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
                .unwrap_or(body);
            tracing::warn!(url, %status, "Heroku API returned non-success");
            return Err(HerokuToolsError::api(format!(
                "{} returned {}: {}",
                url, status, message
            )));
        }

        serde_json::from_str(&body)
            .map_err(|e| HerokuToolsError::api(format!("invalid JSON from {}: {}", url, e)))
    }
}

/// Heroku Platform API client
pub struct HerokuApi<T: ApiTransport> {
    transport: T,
    base_url: String,
}

impl HerokuApi<HttpTransport> {
    /// Client authenticated with the configured API token
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(HerokuApi::new(HttpTransport::new(config.api_token()?)?))
    }
}

impl<T: ApiTransport> HerokuApi<T> {
    pub fn new(transport: T) -> Self {
        HerokuApi {
            transport,
            base_url: HEROKU_API_URL.to_string(),
        }
    }

    /// Point the client at another API root (used against mock servers)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Absolute URL of `endpoint` for `app`
    pub fn url(&self, endpoint: Endpoint, app: &str) -> String {
        format!("{}{}", self.base_url, endpoint.path(app))
    }

    /// GET `endpoint` for `app` and return the decoded JSON.
    ///
    /// # Returns
    /// * `Ok(Value)` - The response body
    /// * `Err(HerokuToolsError::Api)` - On transport, HTTP status or decoding failure
    pub fn call_api(
        &self,
        endpoint: Endpoint,
        app: &str,
        range_header: Option<&str>,
    ) -> Result<Value> {
        self.transport
            .get_json(&self.url(endpoint, app), range_header)
    }
}
