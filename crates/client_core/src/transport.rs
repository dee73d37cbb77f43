//! Network seam between the controller and the storyboard server.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{
    cookie::{CookieStore, Jar},
    header::REFERER,
    Client,
};
use shared::error::ActionError;
use tracing::{debug, info, warn};
use url::Url;

use crate::{
    cookie::cookie_value,
    request::{ActionRequest, RequestBody},
};

pub const CSRF_HEADER: &str = "X-CSRFToken";
pub const DEFAULT_CSRF_COOKIE: &str = "csrftoken";

/// What came back from the server, after redirects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    /// Final URL of the response.
    pub location: String,
    pub body: String,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait ActionTransport: Send + Sync {
    /// Sends one request. Only connection and body-read failures are errors;
    /// every HTTP status is returned as a response.
    async fn send(&self, request: &ActionRequest) -> Result<TransportResponse, ActionError>;
}

pub struct HttpTransport {
    http: Client,
    base_url: Url,
    jar: Arc<Jar>,
    csrf_cookie: String,
    prime_page: Option<String>,
    primed: AtomicBool,
}

impl HttpTransport {
    pub fn new(base_url: &str, csrf_cookie: impl Into<String>) -> Result<Self> {
        let mut base_url =
            Url::parse(base_url).with_context(|| format!("invalid server url '{base_url}'"))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let jar = Arc::new(Jar::default());
        let http = Client::builder()
            .cookie_provider(jar.clone())
            .build()
            .context("failed to build http client")?;

        Ok(Self {
            http,
            base_url,
            jar,
            csrf_cookie: csrf_cookie.into(),
            prime_page: None,
            primed: AtomicBool::new(false),
        })
    }

    /// Loads `page` right before the first request when no CSRF cookie is
    /// present yet. Nothing touches the network until then.
    pub fn with_prime_page(mut self, page: impl Into<String>) -> Self {
        self.prime_page = Some(page.into());
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Stores a token as if the server had set the CSRF cookie.
    pub fn set_csrf_token(&self, token: &str) {
        self.jar
            .add_cookie_str(&format!("{}={token}", self.csrf_cookie), &self.base_url);
    }

    pub fn csrf_token(&self) -> Option<String> {
        let header = self.jar.cookies(&self.base_url)?;
        cookie_value(header.to_str().ok()?, &self.csrf_cookie)
    }

    /// Loads a page so the server can hand out its CSRF cookie.
    pub async fn prime(&self, path: &str) -> Result<()> {
        let url = self.resolve(path)?;
        self.http
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("failed to load {url}"))?
            .error_for_status()
            .with_context(|| format!("server rejected {url}"))?;

        if self.csrf_token().is_some() {
            info!(url = %url, "transport: csrf cookie received");
        } else {
            warn!(
                url = %url,
                cookie = %self.csrf_cookie,
                "transport: page did not set the csrf cookie"
            );
        }
        Ok(())
    }

    async fn prime_once(&self) -> Result<(), ActionError> {
        let Some(page) = &self.prime_page else {
            return Ok(());
        };
        if self.primed.swap(true, Ordering::AcqRel) || self.csrf_token().is_some() {
            return Ok(());
        }
        self.prime(page)
            .await
            .map_err(|e| ActionError::Transport(format!("failed to obtain csrf cookie: {e:#}")))
    }

    fn resolve(&self, endpoint: &str) -> Result<Url, ActionError> {
        self.base_url
            .join(endpoint.trim_start_matches('/'))
            .map_err(|e| ActionError::Transport(format!("invalid endpoint '{endpoint}': {e}")))
    }
}

#[async_trait]
impl ActionTransport for HttpTransport {
    async fn send(&self, request: &ActionRequest) -> Result<TransportResponse, ActionError> {
        let url = self.resolve(&request.endpoint)?;
        self.prime_once().await?;
        let mut builder = self
            .http
            .post(url.clone())
            .header(REFERER, self.base_url.as_str());

        match self.csrf_token() {
            Some(token) => builder = builder.header(CSRF_HEADER, token),
            None => warn!(
                cookie = %self.csrf_cookie,
                "transport: csrf cookie missing; sending without token"
            ),
        }

        builder = match &request.body {
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Form(fields) => builder.form(fields),
        };

        debug!(url = %url, "transport: POST");
        let response = builder
            .send()
            .await
            .map_err(|e| ActionError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let location = response.url().to_string();
        let body = response
            .text()
            .await
            .map_err(|e| ActionError::Transport(e.to_string()))?;
        debug!(status, location = %location, bytes = body.len(), "transport: response");

        Ok(TransportResponse {
            status,
            location,
            body,
        })
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
