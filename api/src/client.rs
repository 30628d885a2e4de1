use crate::ScoreboardRecord;
use crate::atrium::FixturesResponse;
use crate::scoreboard::ScoreboardExtractor;
use log::debug;
use reqwest::{Client, Url};
use std::fmt;
use std::time::Duration;

pub type ApiResult<T> = Result<T, ApiError>;

pub const ATRIUM_FIXTURES: &str =
    "https://eapi.web.prod.cloud.atriumsports.com/v1/embed/235/fixtures";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Fixtures client for the Atrium Sports embed API.
///
/// One GET per call; no retries and no response caching.
#[derive(Debug, Clone)]
pub struct AtriumApi {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl Default for AtriumApi {
    fn default() -> Self {
        Self::new(ATRIUM_FIXTURES, DEFAULT_TIMEOUT)
    }
}

#[derive(Debug)]
pub enum ApiError {
    /// Connection, TLS or timeout failure before a response arrived.
    Transport(reqwest::Error, String),
    /// Upstream answered with a non-success status.
    Upstream(u16, String),
    /// Body was not JSON, or not shaped like a fixtures feed.
    Decode(String, String),
    /// The fixtures URL could not be built.
    InvalidUrl(String),
}

impl ApiError {
    /// Short description without the URL or transport internals, safe to
    /// hand back to HTTP clients.
    pub fn public_message(&self) -> String {
        match self {
            ApiError::Transport(e, _) if e.is_timeout() => "upstream request timed out".into(),
            ApiError::Transport(..) => "upstream request failed".into(),
            ApiError::Upstream(status, _) => format!("upstream returned status {status}"),
            ApiError::Decode(..) => "upstream returned an invalid fixtures payload".into(),
            ApiError::InvalidUrl(_) => "fixtures endpoint is misconfigured".into(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Transport(e, url) => write!(f, "Network error for {url}: {e}"),
            ApiError::Upstream(status, url) => write!(f, "API error for {url}: HTTP {status}"),
            ApiError::Decode(e, url) => write!(f, "Parse error for {url}: {e}"),
            ApiError::InvalidUrl(msg) => write!(f, "Invalid fixtures URL: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Transport(e, _) => Some(e),
            _ => None,
        }
    }
}

impl AtriumApi {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .user_agent(concat!("placar/", env!("CARGO_PKG_VERSION"), " (scoreboard overlay)"))
                .build()
                .unwrap_or_default(),
            base_url: base_url.into(),
            timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Fetch the fixtures feed for one competition state id.
    pub async fn fetch_fixtures(&self, competition: &str) -> ApiResult<FixturesResponse> {
        let url = self.fixtures_url(competition)?;
        self.get(url).await
    }

    /// Fetch the feed and extract the followed team's fixture.
    ///
    /// `Ok(None)` means the feed was fine but had no usable fixture for the team.
    pub async fn fetch_scoreboard(
        &self,
        competition: &str,
        extractor: &ScoreboardExtractor,
    ) -> ApiResult<Option<ScoreboardRecord>> {
        let fixtures = self.fetch_fixtures(competition).await?;
        debug!(
            "competition {competition}: {} fixtures received",
            fixtures.fixtures().len()
        );
        Ok(extractor.extract(&fixtures))
    }

    fn fixtures_url(&self, competition: &str) -> ApiResult<Url> {
        Url::parse_with_params(&self.base_url, &[("state", competition)])
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {e}", self.base_url)))
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, url: Url) -> ApiResult<T> {
        let url_text = url.to_string();
        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e, url_text.clone()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Upstream(status.as_u16(), url_text));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(e, url_text.clone()))?;
        serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string(), url_text))
    }
}
