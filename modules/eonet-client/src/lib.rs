pub mod error;
pub mod types;

pub use error::{EonetError, Result};
pub use types::{
    EonetCategory, EonetEvent, EonetGeometry, EonetSource, EventStatus, EventsQuery,
    EventsResponse, FlexibleId,
};

pub const DEFAULT_BASE_URL: &str = "https://eonet.sci.gsfc.nasa.gov/api/v2.1";

pub struct EonetClient {
    client: reqwest::Client,
    base_url: String,
}

impl EonetClient {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Point the client at a different deployment (v3, a mirror, a test server).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the event list in one request. No retry, no pagination.
    pub async fn fetch_events(&self, query: &EventsQuery) -> Result<Vec<EonetEvent>> {
        let url = format!("{}/events", self.base_url);
        tracing::debug!(%url, "Fetching EONET events");

        let resp = self
            .client
            .get(&url)
            .query(&query.to_query_pairs())
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(EonetError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = resp.text().await?;
        let parsed: EventsResponse = serde_json::from_str(&body)?;
        tracing::info!(count = parsed.events.len(), "Fetched EONET events");

        Ok(parsed.events)
    }
}

impl Default for EonetClient {
    fn default() -> Self {
        Self::new()
    }
}
