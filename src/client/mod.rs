//! Remote service client for the research backend.
//!
//! One method per backend capability. Calls are single round trips with JSON
//! bodies; nothing is retried. Callers decide whether a failure is surfaced
//! or swallowed.

mod error;
pub mod types;

pub use error::ClientError;
pub use types::{
    AnalyzeResponse, HotelInfoEntry, ResultItem, ScrapeRecord, ScrapeResponse, SessionAck,
    TravelPlan,
};

use crate::config::BackendConfig;
use crate::session::SessionId;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use types::{HotelInfoResponse, SearchResponse};

/// Backend operations used by the orchestrator, coordinator and results panel.
///
/// `BackendClient` is the HTTP implementation; tests substitute in-process
/// fakes.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Run a web search for `query`. Returns hits in backend order.
    async fn run_simple_search(
        &self,
        query: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<ResultItem>, ClientError>;

    /// Scrape a single page into the session's folder.
    async fn scrape_content(
        &self,
        url: &str,
        session: &SessionId,
    ) -> Result<ScrapeResponse, ClientError>;

    /// Scrape `urls` and build an itinerary for `location`.
    async fn start_travel_plan(
        &self,
        location: &str,
        session: &SessionId,
        urls: &[String],
        cancel: &CancellationToken,
    ) -> Result<TravelPlan, ClientError>;

    /// Ask a free-form question against everything scraped for the session.
    async fn analyze_data(
        &self,
        session: &SessionId,
        query: &str,
    ) -> Result<AnalyzeResponse, ClientError>;

    /// Summarize hotel information found in the session's scraped files.
    async fn generate_hotel_info(
        &self,
        session: &SessionId,
    ) -> Result<Vec<HotelInfoEntry>, ClientError>;

    /// Create the backend-side folder for a freshly minted session.
    async fn create_session_folder(
        &self,
        location: &str,
        session: &SessionId,
    ) -> Result<SessionAck, ClientError>;
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    subject: &'a str,
}

#[derive(Serialize)]
struct ScrapeRequest<'a> {
    url: &'a str,
    #[serde(rename = "folderUUID")]
    folder_uuid: &'a str,
}

#[derive(Serialize)]
struct TravelPlanRequest<'a> {
    #[serde(rename = "locationName")]
    location_name: &'a str,
    #[serde(rename = "folderUUID")]
    folder_uuid: &'a str,
    urls: &'a [String],
}

#[derive(Serialize)]
struct AnalyzeRequest<'a> {
    #[serde(rename = "folderUUID")]
    folder_uuid: &'a str,
    query: &'a str,
}

#[derive(Serialize)]
struct HotelInfoRequest<'a> {
    uuid: &'a str,
}

#[derive(Serialize)]
struct SessionFolderRequest<'a> {
    #[serde(rename = "locationName")]
    location_name: &'a str,
    #[serde(rename = "folderUUID")]
    folder_uuid: &'a str,
}

/// HTTP client for the research backend.
///
/// Hotel-info generation lives behind its own base URL; every other
/// endpoint uses `api_url`.
#[derive(Clone)]
pub struct BackendClient {
    http_client: Client,
    api_url: String,
    hotel_api_url: String,
}

impl BackendClient {
    pub fn new(config: &BackendConfig) -> Result<Self, ClientError> {
        let http_client = Client::builder()
            .user_agent("wayfarer/0.1")
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            http_client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            hotel_api_url: config.hotel_api_url().trim_end_matches('/').to_string(),
        })
    }

    /// Create a client pointing both endpoints at one base URL (mock servers).
    pub fn with_base_url(base_url: String) -> Result<Self, ClientError> {
        Self::new(&BackendConfig {
            api_url: base_url,
            ..Default::default()
        })
    }

    async fn post_json<B, R>(
        &self,
        base_url: &str,
        path: &str,
        body: &B,
        operation: &'static str,
    ) -> Result<R, ClientError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}{}", base_url, path);
        debug!(operation, url = %url, "Sending backend request");

        let response = self.http_client.post(&url).json(body).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            warn!(operation, status = status.as_u16(), "Backend returned error status");
            return Err(ClientError::Backend {
                status: status.as_u16(),
                body: text,
            });
        }

        serde_json::from_str(&text).map_err(|e| ClientError::Decode(format!("{}: {}", operation, e)))
    }
}

/// Race `fut` against `cancel`. An already-cancelled token short-circuits
/// without polling `fut`.
async fn cancellable<T, F>(cancel: &CancellationToken, fut: F) -> Result<T, ClientError>
where
    F: Future<Output = Result<T, ClientError>>,
{
    if cancel.is_cancelled() {
        return Err(ClientError::Cancelled);
    }
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ClientError::Cancelled),
        result = fut => result,
    }
}

#[async_trait]
impl Backend for BackendClient {
    async fn run_simple_search(
        &self,
        query: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<ResultItem>, ClientError> {
        let request = SearchRequest { subject: query };
        let response: SearchResponse = cancellable(
            cancel,
            self.post_json(&self.api_url, "/run_simple_search_duck/", &request, "run_simple_search"),
        )
        .await?;
        Ok(response.into_items())
    }

    async fn scrape_content(
        &self,
        url: &str,
        session: &SessionId,
    ) -> Result<ScrapeResponse, ClientError> {
        let request = ScrapeRequest {
            url,
            folder_uuid: session.as_str(),
        };
        self.post_json(&self.api_url, "/simple_scraping/", &request, "scrape_content")
            .await
    }

    async fn start_travel_plan(
        &self,
        location: &str,
        session: &SessionId,
        urls: &[String],
        cancel: &CancellationToken,
    ) -> Result<TravelPlan, ClientError> {
        let request = TravelPlanRequest {
            location_name: location,
            folder_uuid: session.as_str(),
            urls,
        };
        let body: Value = cancellable(
            cancel,
            self.post_json(&self.api_url, "/start_travel_plan/", &request, "start_travel_plan"),
        )
        .await?;
        Ok(TravelPlan::from_response(body))
    }

    async fn analyze_data(
        &self,
        session: &SessionId,
        query: &str,
    ) -> Result<AnalyzeResponse, ClientError> {
        let request = AnalyzeRequest {
            folder_uuid: session.as_str(),
            query,
        };
        self.post_json(&self.api_url, "/analyze_data/", &request, "analyze_data")
            .await
    }

    async fn generate_hotel_info(
        &self,
        session: &SessionId,
    ) -> Result<Vec<HotelInfoEntry>, ClientError> {
        let request = HotelInfoRequest {
            uuid: session.as_str(),
        };
        let response: HotelInfoResponse = self
            .post_json(
                &self.hotel_api_url,
                "/generate_hotel_info/",
                &request,
                "generate_hotel_info",
            )
            .await?;
        Ok(response.responses)
    }

    async fn create_session_folder(
        &self,
        location: &str,
        session: &SessionId,
    ) -> Result<SessionAck, ClientError> {
        let request = SessionFolderRequest {
            location_name: location,
            folder_uuid: session.as_str(),
        };
        self.post_json(
            &self.api_url,
            "/generate_uuid_folder/",
            &request,
            "create_session_folder",
        )
        .await
    }
}

#[cfg(test)]
mod tests;
