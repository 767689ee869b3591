use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::{HerokuToolsError, Result};
use crate::heroku::ApiTransport;

/// Mock transport for testing without network access
///
/// Responses are keyed by absolute URL. A URL without a response fails with
/// an API error, as an unreachable server would.
pub struct MockTransport {
    responses: HashMap<String, std::result::Result<Value, String>>,
    requests: Mutex<Vec<(String, Option<String>)>>,
}

impl MockTransport {
    /// Create a new mock transport with no responses
    pub fn new() -> Self {
        MockTransport {
            responses: HashMap::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Answer GETs of `url` with `body`
    pub fn with_json(mut self, url: impl Into<String>, body: Value) -> Self {
        self.responses.insert(url.into(), Ok(body));
        self
    }

    /// Fail GETs of `url` with an API error carrying `message`
    pub fn with_error(mut self, url: impl Into<String>, message: impl Into<String>) -> Self {
        self.responses.insert(url.into(), Err(message.into()));
        self
    }

    /// Every `(url, range)` requested so far, oldest first
    pub fn requests(&self) -> Vec<(String, Option<String>)> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl ApiTransport for MockTransport {
    fn get_json(&self, url: &str, range: Option<&str>) -> Result<Value> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push((url.to_string(), range.map(str::to_string)));
        }
        match self.responses.get(url) {
            Some(Ok(body)) => Ok(body.clone()),
            Some(Err(message)) => Err(HerokuToolsError::api(message.clone())),
            None => Err(HerokuToolsError::api(format!("no response for {}", url))),
        }
    }
}
