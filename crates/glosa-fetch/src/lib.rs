use std::time::Duration;

use glosa_config::network::NetworkConfig;
use glosa_types::DictionaryQuery;

/// Retrieves raw result pages. The tree side never sees a failed fetch.
#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, query: &DictionaryQuery) -> Result<String, FetchError>;
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP {0}")]
    Http(u16),

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("Empty payload")]
    EmptyPayload,
}

#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(config: &NetworkConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, query: &DictionaryQuery) -> Result<String, FetchError> {
        tracing::debug!("GET {} {:?}", query.url, query.params);
        let response = self
            .client
            .get(&query.url)
            .query(&query.params)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(FetchError::RateLimited);
        }
        if !status.is_success() {
            return Err(FetchError::Http(status.as_u16()));
        }

        let body = response.text().await?;
        if body.trim().is_empty() {
            return Err(FetchError::EmptyPayload);
        }
        Ok(body)
    }
}
