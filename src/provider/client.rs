use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::Value;

use super::{LeaderboardProvider, LeaderboardRequest};
use crate::error::CoreError;

pub const DEFAULT_API_HOST: &str = "live-golf-data.p.rapidapi.com";

/// Leaderboard client for the live-golf-data API on RapidAPI.
pub struct RapidApiClient {
    client: Client,
    base_url: String,
    host: String,
    api_key: String,
}

impl RapidApiClient {
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_host(api_key, DEFAULT_API_HOST)
    }

    #[must_use]
    pub fn with_host(api_key: impl Into<String>, host: impl Into<String>) -> Self {
        let host = host.into();
        Self {
            client: Client::new(),
            base_url: format!("https://{host}"),
            host,
            api_key: api_key.into(),
        }
    }

    /// Point the client somewhere else, e.g. a local mock.
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Query values are percent-encoded.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Other`] when the base URL does not parse.
    pub fn leaderboard_url(&self, request: &LeaderboardRequest) -> Result<Url, CoreError> {
        Url::parse_with_params(
            &format!("{}/leaderboard", self.base_url),
            [
                ("orgId", request.org_id.as_str()),
                ("tournId", request.tourn_id.as_str()),
                ("year", request.year.as_str()),
            ],
        )
        .map_err(|e| CoreError::Other(format!("bad leaderboard url {}: {e}", self.base_url)))
    }
}

#[async_trait]
impl LeaderboardProvider for RapidApiClient {
    async fn fetch_leaderboard(&self, request: &LeaderboardRequest) -> Result<Value, CoreError> {
        let url = self.leaderboard_url(request)?;
        log::debug!("calling {url}");

        let resp = self
            .client
            .get(url)
            .header("X-RapidAPI-Key", &self.api_key)
            .header("X-RapidAPI-Host", &self.host)
            .send()
            .await?;
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            log::error!("leaderboard request failed with {status}: {body}");
            return Err(CoreError::Network(format!(
                "leaderboard request returned {status}"
            )));
        }
        Ok(serde_json::from_str(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_carries_sorted_params() -> Result<(), CoreError> {
        let client = RapidApiClient::new("k").base_url("http://localhost:9999/");
        let request = LeaderboardRequest::new("1", "033", "2025");
        assert_eq!(
            client.leaderboard_url(&request)?.as_str(),
            "http://localhost:9999/leaderboard?orgId=1&tournId=033&year=2025"
        );
        Ok(())
    }

    #[test]
    fn url_encodes_query_values() -> Result<(), CoreError> {
        let client = RapidApiClient::new("k").base_url("http://localhost:9999");
        let request = LeaderboardRequest::new("1", "0 33", "2025&year=1999");
        let url = client.leaderboard_url(&request)?;
        assert_eq!(
            url.query(),
            Some("orgId=1&tournId=0+33&year=2025%26year%3D1999")
        );
        let years: Vec<_> = url.query_pairs().filter(|(k, _)| k == "year").collect();
        assert_eq!(years.len(), 1);
        assert_eq!(years[0].1, "2025&year=1999");
        Ok(())
    }

    #[test]
    fn unparseable_base_url_is_an_error() {
        let client = RapidApiClient::new("k").base_url("not a url");
        let request = LeaderboardRequest::default();
        assert!(matches!(
            client.leaderboard_url(&request),
            Err(CoreError::Other(_))
        ));
    }
}
