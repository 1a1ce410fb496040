//! `TvdbClient` - TVDB API client implementation.

use std::fmt;
use std::time::Duration;

use reqwest::header::ACCEPT;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::instrument;
use url::Url;

use super::api::LocalTvdbApi;
use super::credentials::{
    API_KEY_LABEL, CredentialSource, Credentials, USER_KEY_LABEL, USER_NAME_LABEL,
    resolve_secret,
};
use super::error::{AuthFailure, Result, TvdbError};
use super::types::{Actor, Show};

/// Default base URL for the TVDB API.
const DEFAULT_BASE_URL: &str = "https://api.thetvdb.com";

/// Default per-request timeout for data requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout of a single login attempt.
const AUTH_TIMEOUT: Duration = Duration::from_secs(3);

/// Number of login attempts before giving up on timeouts.
const MAX_AUTH_ATTEMPTS: u32 = 3;

/// `Error` value the service uses for missing resources.
const RESOURCE_NOT_FOUND: &str = "Resource not found";

/// Body of `POST /login`.
#[derive(Serialize)]
struct LoginRequest<'a> {
    apikey: &'a str,
    userkey: &'a str,
    username: &'a str,
}

/// Body of a successful `POST /login`.
#[derive(Deserialize)]
struct LoginResponse {
    token: Option<String>,
}

/// Success envelope. `data` is absent or `null` when there is nothing to return.
#[derive(Deserialize)]
struct DataEnvelope {
    #[serde(default)]
    data: Option<Value>,
}

/// Error envelope.
#[derive(Deserialize)]
struct ErrorEnvelope {
    #[serde(rename = "Error", default)]
    error: Option<String>,
}

/// TVDB API client.
///
/// One instance is one authentication session. The first request logs in and
/// the token is reused until the client is dropped.
#[allow(clippy::module_name_repetitions)]
pub struct TvdbClient {
    /// HTTP client.
    http_client: Client,
    /// Base URL for API requests.
    base_url: Url,
    /// Login secrets.
    credentials: Credentials,
    /// Session token, set by the first successful login.
    auth_token: Option<String>,
    /// Timeout of a single login attempt.
    auth_timeout: Duration,
}

impl fmt::Debug for TvdbClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TvdbClient")
            .field("base_url", &self.base_url.as_str())
            .field("credentials", &self.credentials)
            .field("authenticated", &self.auth_token.is_some())
            .field("auth_timeout", &self.auth_timeout)
            .finish_non_exhaustive()
    }
}

/// Builder for `TvdbClient`.
#[allow(clippy::module_name_repetitions)]
pub struct TvdbClientBuilder {
    base_url: Option<Url>,
    api_key: Option<String>,
    user_key: Option<String>,
    user_name: Option<String>,
    credential_source: Option<Box<dyn CredentialSource + Send + Sync>>,
    user_agent: Option<String>,
    auth_timeout: Option<Duration>,
}

impl fmt::Debug for TvdbClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TvdbClientBuilder")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("user_key", &self.user_key.as_ref().map(|_| "<redacted>"))
            .field("user_name", &self.user_name)
            .field("credential_source", &self.credential_source.is_some())
            .field("user_agent", &self.user_agent)
            .field("auth_timeout", &self.auth_timeout)
            .finish()
    }
}

impl TvdbClientBuilder {
    /// Creates a new builder.
    const fn new() -> Self {
        Self {
            base_url: None,
            api_key: None,
            user_key: None,
            user_name: None,
            credential_source: None,
            user_agent: None,
            auth_timeout: None,
        }
    }

    /// Overrides the base URL (for wiremock in tests).
    #[must_use]
    pub fn base_url(mut self, url: Url) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Sets the API key.
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the user key.
    #[must_use]
    pub fn user_key(mut self, key: impl Into<String>) -> Self {
        self.user_key = Some(key.into());
        self
    }

    /// Sets the user name.
    #[must_use]
    pub fn user_name(mut self, name: impl Into<String>) -> Self {
        self.user_name = Some(name.into());
        self
    }

    /// Sets the source consulted for any secret not given explicitly.
    #[must_use]
    pub fn credential_source(
        mut self,
        source: impl CredentialSource + Send + Sync + 'static,
    ) -> Self {
        self.credential_source = Some(Box::new(source));
        self
    }

    /// Sets the User-Agent (default: `tvdb-api/<version>`).
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Sets the timeout of a single login attempt (default: 3s).
    #[must_use]
    pub const fn auth_timeout(mut self, timeout: Duration) -> Self {
        self.auth_timeout = Some(timeout);
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// - Any of the three secrets is neither set nor resolvable from the
    ///   credential source.
    /// - `reqwest::Client` build fails.
    pub fn build(self) -> Result<TvdbClient> {
        let source = self.credential_source.as_deref();

        let api_key = resolve_secret(self.api_key, source, API_KEY_LABEL).ok_or_else(|| {
            TvdbError::Configuration(String::from(
                "no API key was supplied or could be resolved",
            ))
        })?;
        let user_key = resolve_secret(self.user_key, source, USER_KEY_LABEL).ok_or_else(|| {
            TvdbError::Configuration(String::from(
                "no user key was supplied or could be resolved",
            ))
        })?;
        let user_name =
            resolve_secret(self.user_name, source, USER_NAME_LABEL).ok_or_else(|| {
                TvdbError::Configuration(String::from(
                    "no user name was supplied or could be resolved",
                ))
            })?;

        let base_url = if let Some(url) = self.base_url {
            url
        } else {
            Url::parse(DEFAULT_BASE_URL)?
        };

        let user_agent = self.user_agent.unwrap_or_else(|| {
            String::from(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
        });

        let http_client = Client::builder()
            .user_agent(&user_agent)
            .gzip(true)
            .build()
            .map_err(|e| TvdbError::Configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(TvdbClient {
            http_client,
            base_url,
            credentials: Credentials {
                api_key,
                user_key,
                user_name,
            },
            auth_token: None,
            auth_timeout: self.auth_timeout.unwrap_or(AUTH_TIMEOUT),
        })
    }
}

impl TvdbClient {
    /// Creates a new builder.
    #[must_use]
    pub const fn builder() -> TvdbClientBuilder {
        TvdbClientBuilder::new()
    }

    /// Returns the base URL requests are sent to.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns `true` once a login has succeeded.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.auth_token.is_some()
    }

    /// Joins `path` onto the base URL with exactly one `/` between them.
    fn expand_url(&self, path: &str) -> Result<Url> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }

    /// Adds the headers every request carries.
    fn with_headers(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request.header(ACCEPT, "application/json");
        match &self.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Sends one login request and reads its body.
    async fn attempt_login(&self, url: &Url) -> reqwest::Result<(StatusCode, String)> {
        let body = LoginRequest {
            apikey: &self.credentials.api_key,
            userkey: &self.credentials.user_key,
            username: &self.credentials.user_name,
        };
        let response = self
            .with_headers(self.http_client.post(url.clone()))
            .json(&body)
            .timeout(self.auth_timeout)
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;
        Ok((status, text))
    }

    /// Logs in to the API. Does nothing if already logged in.
    ///
    /// Timed-out attempts are retried up to three attempts in total.
    ///
    /// # Errors
    ///
    /// - [`TvdbError::Authentication`] with [`AuthFailure::TimedOut`] when
    ///   every attempt timed out.
    /// - [`TvdbError::Authentication`] with [`AuthFailure::Rejected`] on a
    ///   non-2xx status.
    /// - [`TvdbError::Authentication`] with [`AuthFailure::MissingToken`] when
    ///   the response has no token.
    /// - [`TvdbError::Http`] on any other transport failure.
    pub async fn authenticate(&mut self) -> Result<()> {
        if self.auth_token.is_some() {
            tracing::debug!("Already authenticated, skipping");
            return Ok(());
        }

        tracing::info!("Authenticating...");
        let url = self.expand_url("login")?;

        let mut attempt = 0u32;
        let (status, body) = loop {
            attempt = attempt.saturating_add(1);
            match self.attempt_login(&url).await {
                Ok(result) => break result,
                Err(e) if e.is_timeout() => {
                    if !report_login_timeout(attempt, MAX_AUTH_ATTEMPTS) {
                        return Err(TvdbError::Authentication(AuthFailure::TimedOut {
                            attempts: attempt,
                        }));
                    }
                }
                Err(e) => return Err(e.into()),
            }
        };

        if !status.is_success() {
            tracing::error!(
                status = status.as_u16(),
                "Authentication failed with status code: {}",
                status.as_u16()
            );
            return Err(TvdbError::Authentication(AuthFailure::Rejected {
                status: status.as_u16(),
            }));
        }

        let token = serde_json::from_str::<LoginResponse>(&body)
            .ok()
            .and_then(|response| response.token);
        let Some(token) = token else {
            tracing::error!("Failed to get token from login request");
            return Err(TvdbError::Authentication(AuthFailure::MissingToken));
        };

        self.auth_token = Some(token);
        tracing::info!("Authenticated successfully");
        Ok(())
    }

    /// Sends an authenticated GET and returns the `data` field of the response.
    ///
    /// `path` is relative to the base URL and may carry a query string.
    ///
    /// # Errors
    ///
    /// - [`TvdbError::InvalidArgument`] if `path` is empty (no request is made).
    /// - Any error from [`TvdbClient::authenticate`].
    /// - [`TvdbError::NotFound`] if the resource is missing or the response
    ///   has no data.
    /// - [`TvdbError::Api`] for any other unsuccessful response.
    /// - [`TvdbError::Http`] on transport failure.
    pub async fn get(&mut self, path: &str, timeout: Duration) -> Result<Value> {
        if path.is_empty() {
            return Err(TvdbError::InvalidArgument(String::from(
                "an invalid URL path was supplied",
            )));
        }

        self.authenticate().await?;

        tracing::info!("GET: {path}");
        let url = self.expand_url(path)?;
        let response = self
            .with_headers(self.http_client.get(url))
            .timeout(timeout)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        tracing::debug!(%status, body_len = body.len(), "TVDB API response");

        classify_response(path, status, &body)
    }
}

/// Logs a timed-out login attempt. Returns `true` if another attempt follows.
fn report_login_timeout(attempt: u32, max_attempts: u32) -> bool {
    let will_retry = attempt < max_attempts;
    if will_retry {
        tracing::warn!(
            attempt,
            max_attempts,
            "Authentication timed out, but will retry."
        );
    } else {
        tracing::error!(
            attempt,
            max_attempts,
            "Authentication timed out maximum number of times."
        );
    }
    will_retry
}

/// Turns a status code and body into the `data` payload or a typed error.
fn classify_response(path: &str, status: StatusCode, body: &str) -> Result<Value> {
    let api_error = || TvdbError::Api {
        status: status.as_u16(),
        body: String::from(body),
    };

    if status.is_success() {
        let envelope: DataEnvelope = serde_json::from_str(body).map_err(|_| api_error())?;
        return envelope.data.ok_or_else(|| {
            tracing::debug!(path, "Response carried no data");
            TvdbError::NotFound(String::from(path))
        });
    }

    let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) else {
        tracing::warn!(path, %status, "Could not decode error response");
        return Err(api_error());
    };

    match envelope.error.as_deref() {
        Some(RESOURCE_NOT_FOUND) => Err(TvdbError::NotFound(String::from(path))),
        Some(message) => {
            tracing::warn!(path, %status, message, "TVDB API error");
            Err(api_error())
        }
        None => {
            tracing::warn!(path, %status, "Could not get error information");
            Err(api_error())
        }
    }
}

/// Returns the elements of an array payload.
fn expect_array<'a>(data: &'a Value, path: &str) -> Result<&'a Vec<Value>> {
    data.as_array().ok_or_else(|| TvdbError::Api {
        status: StatusCode::OK.as_u16(),
        body: format!("expected an array of records for {path}, got: {data}"),
    })
}

impl LocalTvdbApi for TvdbClient {
    #[instrument(skip_all)]
    async fn search_show(&mut self, name: Option<&str>, timeout: Duration) -> Result<Vec<Show>> {
        let Some(name) = name.filter(|n| !n.is_empty()) else {
            return Ok(Vec::new());
        };

        tracing::info!("Searching for show: {name}");
        let path = format!("search/series?name={}", urlencoding::encode(name));
        let data = self.get(&path, timeout).await?;

        expect_array(&data, &path)?
            .iter()
            .map(Show::from_json)
            .collect()
    }

    #[instrument(skip_all)]
    async fn show_info(&mut self, identifier: u64, timeout: Duration) -> Result<Show> {
        tracing::info!("Fetching data for show: {identifier}");
        let data = self.get(&format!("series/{identifier}"), timeout).await?;
        Show::from_json(&data)
    }

    #[instrument(skip_all)]
    async fn actors_from_show_id(
        &mut self,
        identifier: u64,
        timeout: Duration,
    ) -> Result<Vec<Actor>> {
        tracing::info!("Fetching actors for show id: {identifier}");
        let path = format!("series/{identifier}/actors");
        let data = self.get(&path, timeout).await?;

        expect_array(&data, &path)?
            .iter()
            .map(Actor::from_json)
            .collect()
    }

    #[instrument(skip_all)]
    async fn actors_from_show(&mut self, show: &Show, timeout: Duration) -> Result<Vec<Actor>> {
        self.actors_from_show_id(show.identifier, timeout).await
    }
}
