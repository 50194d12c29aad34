//! Request helper that maps admin API responses onto [`CategoryError`]

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use url::Url;

use crate::model::MessageResponse;
use crate::CategoryError;

/// Builds and executes a single admin API request
pub struct FetchBuilder<'a> {
    client: &'a Client,
    url: Url,
    method: Method,
    headers: HeaderMap,
    query_params: Vec<(&'static str, String)>,
    body: Option<Vec<u8>>,
    timeout: Option<Duration>,
}

impl<'a> FetchBuilder<'a> {
    pub fn new(client: &'a Client, url: Url, method: Method) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Self {
            client,
            url,
            method,
            headers,
            query_params: Vec::new(),
            body: None,
            timeout: None,
        }
    }

    pub fn get(client: &'a Client, url: Url) -> Self {
        Self::new(client, url, Method::GET)
    }

    pub fn post(client: &'a Client, url: Url) -> Self {
        Self::new(client, url, Method::POST)
    }

    pub fn put(client: &'a Client, url: Url) -> Self {
        Self::new(client, url, Method::PUT)
    }

    pub fn delete(client: &'a Client, url: Url) -> Self {
        Self::new(client, url, Method::DELETE)
    }

    /// Add bearer token authentication to the request
    pub fn bearer_auth(mut self, token: &str) -> Self {
        if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", token)) {
            self.headers.insert(AUTHORIZATION, value);
        }
        self
    }

    pub fn query(mut self, params: Vec<(&'static str, String)>) -> Self {
        self.query_params = params;
        self
    }

    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self, CategoryError> {
        self.body = Some(serde_json::to_vec(body)?);
        Ok(self)
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn build(&self) -> RequestBuilder {
        let mut url = self.url.clone();
        if !self.query_params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &self.query_params {
                pairs.append_pair(key, value);
            }
        }

        let mut req = self
            .client
            .request(self.method.clone(), url)
            .headers(self.headers.clone());
        if let Some(body) = &self.body {
            req = req.body(body.clone());
        }
        if let Some(timeout) = self.timeout {
            req = req.timeout(timeout);
        }
        req
    }

    /// Execute the request and decode a JSON body
    pub async fn execute<T: DeserializeOwned>(&self) -> Result<T, CategoryError> {
        log::debug!("{} {}", self.method, self.url);
        let response = self.build().send().await?;
        let response = check_status(response).await?;

        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.contains("json"))
            .unwrap_or(false);
        let bytes = response.bytes().await?;
        if !is_json {
            return Err(CategoryError::MalformedResponse(
                "expected a JSON response".to_string(),
            ));
        }

        serde_json::from_slice(&bytes).map_err(|e| CategoryError::MalformedResponse(e.to_string()))
    }

    /// Execute a mutation and return the server's `message`
    pub async fn execute_message(&self, fallback: &str) -> Result<String, CategoryError> {
        let ack: MessageResponse = self.execute().await?;
        Ok(ack
            .message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| fallback.to_string()))
    }
}

async fn check_status(response: Response) -> Result<Response, CategoryError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<MessageResponse>(&text)
        .ok()
        .and_then(|body| body.message)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| status_text(status));

    log::warn!("admin API returned {}: {}", status, message);
    Err(CategoryError::Server { status, message })
}

fn status_text(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| status.as_str().to_string())
}
