//! Top-level coordinator - the single owner of "what is selected now".
//!
//! Wires location selection to the search orchestrator, tracks the active
//! session identifier and routes user actions (scrape, travel plan,
//! analysis, hotel info, chat) to the backend. Actions that need a session
//! are rejected with `CoordinatorError::MissingSession` until the backend
//! has created one for the current selection.

use crate::client::{Backend, ClientError, HotelInfoEntry, ScrapeResponse};
use crate::location::{
    simplify_location_name, Geocoder, LocationSelection, LocationSelector, SelectedLocation,
    SelectionSink,
};
use crate::orchestrator::{CategoryDefinition, SearchOrchestrator, SearchSnapshot};
use crate::presentation::{
    category_tabs, event_urls, AnalysisAnswer, ChatMessage, PanelSnapshot, ResultsPanel, Tab,
};
use crate::session::SessionId;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Label shown before anything has been picked
pub const DEFAULT_LOCATION_LABEL: &str = "Select a location on the map";

#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error("session identifier not available yet")]
    MissingSession,

    #[error("no event URLs available to start the travel plan")]
    NoEventUrls,

    #[error(transparent)]
    Backend(#[from] ClientError),
}

struct CoordinatorState {
    /// Simplified label used for searches and the travel plan
    display_label: String,
    location: Option<SelectedLocation>,
    /// Identifier minted for the current pick, not yet confirmed
    pending_session: Option<SessionId>,
    session: Option<SessionId>,
}

/// Everything a front-end needs to render the current view.
#[derive(Clone, Debug, Serialize)]
pub struct CoordinatorSnapshot {
    pub selected_location: String,
    pub location: Option<SelectedLocation>,
    pub session: Option<SessionId>,
    pub search: SearchSnapshot,
    pub tabs: Vec<Tab>,
    pub event_urls: Vec<String>,
    pub panel: PanelSnapshot,
}

#[derive(Clone)]
pub struct Coordinator {
    backend: Arc<dyn Backend>,
    orchestrator: SearchOrchestrator,
    selector: LocationSelector,
    panel: ResultsPanel,
    state: Arc<Mutex<CoordinatorState>>,
}

impl Coordinator {
    pub fn new(
        backend: Arc<dyn Backend>,
        geocoder: Arc<dyn Geocoder>,
        categories: Vec<CategoryDefinition>,
    ) -> Self {
        Self {
            orchestrator: SearchOrchestrator::new(Arc::clone(&backend), categories),
            selector: LocationSelector::new(Arc::clone(&backend), geocoder),
            backend,
            panel: ResultsPanel::new(),
            state: Arc::new(Mutex::new(CoordinatorState {
                display_label: DEFAULT_LOCATION_LABEL.to_string(),
                location: None,
                pending_session: None,
                session: None,
            })),
        }
    }

    pub fn orchestrator(&self) -> &SearchOrchestrator {
        &self.orchestrator
    }

    pub async fn select_from_search(&self, label: &str, lat: f64, lng: f64) -> LocationSelection {
        self.selector.select_from_search(label, lat, lng, self).await
    }

    pub async fn select_from_click(&self, lat: f64, lng: f64) -> LocationSelection {
        self.selector.select_from_click(lat, lng, self).await
    }

    pub async fn session(&self) -> Option<SessionId> {
        self.state.lock().await.session.clone()
    }

    async fn require_session(&self, action: &str) -> Result<SessionId, CoordinatorError> {
        match self.session().await {
            Some(session) => Ok(session),
            None => {
                warn!(action, "Session not available, ignoring request");
                Err(CoordinatorError::MissingSession)
            }
        }
    }

    /// Scrape one result page into the current session.
    pub async fn scrape(&self, url: &str) -> Result<ScrapeResponse, CoordinatorError> {
        let session = self.require_session("scrape").await?;
        match self.backend.scrape_content(url, &session).await {
            Ok(response) => {
                info!(url = %url, session = %session, "Scraped content");
                Ok(response)
            }
            Err(e) => {
                error!(url = %url, error = %e, "Error during scraping");
                Err(e.into())
            }
        }
    }

    /// Start a travel plan from `urls`, or from the current event links
    /// when `urls` is empty. Returns the URLs the plan was started with.
    pub async fn start_travel_plan(
        &self,
        urls: Vec<String>,
    ) -> Result<Vec<String>, CoordinatorError> {
        let session = self.require_session("start travel plan").await?;

        let urls = if urls.is_empty() {
            event_urls(&self.orchestrator.snapshot().await)
        } else {
            urls
        };
        if urls.is_empty() {
            warn!("No URLs available to start the travel plan");
            return Err(CoordinatorError::NoEventUrls);
        }

        let label = self.state.lock().await.display_label.clone();
        debug!(url_count = urls.len(), "Initiating travel plan");
        // The task reports its own outcome through orchestrator state
        let _task = self
            .orchestrator
            .initiate_travel_plan(&label, &session, urls.clone())
            .await;
        Ok(urls)
    }

    pub async fn cancel_travel_plan(&self) {
        self.orchestrator.cancel_travel_plan().await;
    }

    pub async fn analyze(&self) -> Result<Vec<AnalysisAnswer>, CoordinatorError> {
        let session = self.require_session("analyze data").await?;
        Ok(self
            .panel
            .run_analysis(self.backend.as_ref(), &session)
            .await)
    }

    pub async fn generate_hotel_info(&self) -> Result<Vec<HotelInfoEntry>, CoordinatorError> {
        let session = self.require_session("generate hotel info").await?;
        Ok(self
            .panel
            .generate_hotel_info(self.backend.as_ref(), &session)
            .await?)
    }

    /// Send one chat message. `Ok(None)` when the message was blank.
    pub async fn chat(&self, message: &str) -> Result<Option<ChatMessage>, CoordinatorError> {
        let session = self.require_session("chat").await?;
        Ok(self
            .panel
            .send_chat(self.backend.as_ref(), &session, message)
            .await)
    }

    pub async fn chat_transcript(&self) -> Vec<ChatMessage> {
        self.panel.chat().await
    }

    pub async fn snapshot(&self) -> CoordinatorSnapshot {
        let (selected_location, location, session) = {
            let state = self.state.lock().await;
            (
                state.display_label.clone(),
                state.location.clone(),
                state.session.clone(),
            )
        };
        let search = self.orchestrator.snapshot().await;
        CoordinatorSnapshot {
            selected_location,
            location,
            session,
            tabs: category_tabs(&search),
            event_urls: event_urls(&search),
            search,
            panel: self.panel.snapshot().await,
        }
    }
}

#[async_trait]
impl SelectionSink for Coordinator {
    async fn location_selected(&self, location: SelectedLocation, pending: &SessionId) {
        let simplified = simplify_location_name(&location.label);
        let display_label = if simplified.trim().is_empty() {
            format!("Coordinates: ({}, {})", location.lat, location.lng)
        } else {
            simplified.clone()
        };
        info!(label = %display_label, "Location selected");

        // Held across initiate_search so the current chain always matches
        // the stored location
        let mut state = self.state.lock().await;
        state.display_label = display_label;
        state.location = Some(location);
        state.pending_session = Some(pending.clone());
        // The previous location's session must not be used from here on
        state.session = None;

        // The chain reports its progress through orchestrator state
        let _chain = self.orchestrator.initiate_search(&simplified).await;
    }

    async fn session_ready(&self, session: SessionId) {
        let mut state = self.state.lock().await;
        if state.pending_session.as_ref() != Some(&session) {
            debug!(session = %session, "Ignoring session for a superseded selection");
            return;
        }
        info!(session = %session, "Session identifier received");
        state.session = Some(session);
    }
}
