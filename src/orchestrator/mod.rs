//! Search orchestrator - runs the per-location category chain.
//!
//! Each location selection starts one chain that searches its categories
//! strictly in order (hotels, then events, then news by default). Starting a
//! new chain cancels the previous one. The travel-plan request is tracked in
//! its own slot with its own cancellation token.
//!
//! Every state write happens under the state lock after checking the
//! writer's token. Cancellation also happens under that lock, so a
//! superseded step can never write results or flags.

use crate::client::{Backend, ResultItem, TravelPlan};
use crate::session::SessionId;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Placeholder substituted with the location label in query templates
pub const LOCATION_PLACEHOLDER: &str = "{location}";

/// One step of the search chain.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategoryDefinition {
    pub name: String,
    /// Query with `{location}` where the label goes
    pub query_template: String,
}

impl CategoryDefinition {
    pub fn new(name: impl Into<String>, query_template: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            query_template: query_template.into(),
        }
    }

    /// hotels, events, news - all with the contact-details suffix the
    /// backend's search tuning expects.
    pub fn defaults() -> Vec<Self> {
        ["hotels", "events", "news"]
            .into_iter()
            .map(|name| {
                Self::new(
                    name,
                    format!("{} {} hotel contact phone number", LOCATION_PLACEHOLDER, name),
                )
            })
            .collect()
    }

    pub fn query_for(&self, location: &str) -> String {
        self.query_template.replace(LOCATION_PLACEHOLDER, location)
    }
}

/// Results and progress flags for one category.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct CategoryState {
    pub results: Vec<ResultItem>,
    /// A request for this category is in flight
    pub loading: bool,
    /// The category's last step settled (successfully or not)
    pub completed: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CategorySnapshot {
    pub name: String,
    pub results: Vec<ResultItem>,
    pub loading: bool,
    pub completed: bool,
}

/// Point-in-time copy of orchestrator state. Categories are in chain order.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SearchSnapshot {
    /// Label the latest chain was started for
    pub location: Option<String>,
    pub categories: Vec<CategorySnapshot>,
    pub travel_plan: Option<TravelPlan>,
    pub travel_plan_loading: bool,
}

impl SearchSnapshot {
    pub fn category(&self, name: &str) -> Option<&CategorySnapshot> {
        self.categories.iter().find(|c| c.name == name)
    }
}

/// How a chain run ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChainOutcome {
    /// Every category step settled
    Completed,
    /// A newer selection (or explicit cancel) took over during this step
    Superseded { at_category: String },
}

struct SearchState {
    /// Indexed like `SearchOrchestrator::categories`
    categories: Vec<CategoryState>,
    location: Option<String>,
    chain_token: Option<CancellationToken>,
    travel_plan: Option<TravelPlan>,
    travel_plan_loading: bool,
    travel_plan_token: Option<CancellationToken>,
}

impl SearchState {
    fn clear_loading(&mut self) {
        for category in &mut self.categories {
            category.loading = false;
        }
    }
}

#[derive(Clone)]
pub struct SearchOrchestrator {
    backend: Arc<dyn Backend>,
    categories: Arc<Vec<CategoryDefinition>>,
    state: Arc<Mutex<SearchState>>,
}

impl SearchOrchestrator {
    pub fn new(backend: Arc<dyn Backend>, categories: Vec<CategoryDefinition>) -> Self {
        let state = SearchState {
            categories: vec![CategoryState::default(); categories.len()],
            location: None,
            chain_token: None,
            travel_plan: None,
            travel_plan_loading: false,
            travel_plan_token: None,
        };
        Self {
            backend,
            categories: Arc::new(categories),
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub fn categories(&self) -> &[CategoryDefinition] {
        &self.categories
    }

    /// Cancel the current chain (if any) and start a new one for `location`.
    ///
    /// Results from the previous chain stay visible until the new chain's
    /// steps overwrite them. Loading flags are reset.
    pub async fn initiate_search(&self, location: &str) -> JoinHandle<ChainOutcome> {
        let token = {
            let mut state = self.state.lock().await;
            if let Some(previous) = state.chain_token.take() {
                previous.cancel();
                state.clear_loading();
                info!("Cancelled previous search chain due to a new location selection");
            }
            let token = CancellationToken::new();
            state.chain_token = Some(token.clone());
            state.location = Some(location.to_string());
            token
        };

        let orchestrator = self.clone();
        let location = location.to_string();
        tokio::spawn(async move { orchestrator.run_chain(&location, &token).await })
    }

    /// Cancel the current chain without starting another.
    pub async fn cancel_search(&self) {
        let mut state = self.state.lock().await;
        if let Some(token) = state.chain_token.take() {
            token.cancel();
            info!("Search chain cancelled");
        }
        state.clear_loading();
    }

    async fn run_chain(&self, location: &str, token: &CancellationToken) -> ChainOutcome {
        info!(location = %location, "Starting search chain");

        for (index, category) in self.categories.iter().enumerate() {
            let superseded = || ChainOutcome::Superseded {
                at_category: category.name.clone(),
            };

            if !self.begin_step(index, token).await {
                return superseded();
            }

            let query = category.query_for(location);
            let items = match self.backend.run_simple_search(&query, token).await {
                Ok(items) => {
                    debug!(category = %category.name, count = items.len(), "Search step returned");
                    items
                }
                Err(e) if e.is_cancelled() => {
                    info!(category = %category.name, "Search request cancelled");
                    return superseded();
                }
                Err(e) => {
                    error!(category = %category.name, error = %e, "Error fetching category results");
                    Vec::new()
                }
            };

            if !self.finish_step(index, items, token).await {
                info!(category = %category.name, "Discarding results of superseded search step");
                return superseded();
            }
        }

        info!(location = %location, "Search chain completed");
        ChainOutcome::Completed
    }

    async fn begin_step(&self, index: usize, token: &CancellationToken) -> bool {
        let mut state = self.state.lock().await;
        if token.is_cancelled() {
            return false;
        }
        let category = &mut state.categories[index];
        category.loading = true;
        category.completed = false;
        true
    }

    async fn finish_step(
        &self,
        index: usize,
        items: Vec<ResultItem>,
        token: &CancellationToken,
    ) -> bool {
        let mut state = self.state.lock().await;
        if token.is_cancelled() {
            return false;
        }
        let category = &mut state.categories[index];
        category.results = items;
        category.loading = false;
        category.completed = true;
        true
    }

    /// Cancel any in-flight travel-plan request and start a new one.
    ///
    /// The returned task never fails; backend errors are logged.
    pub async fn initiate_travel_plan(
        &self,
        location: &str,
        session: &SessionId,
        urls: Vec<String>,
    ) -> JoinHandle<()> {
        let token = {
            let mut state = self.state.lock().await;
            if let Some(previous) = state.travel_plan_token.take() {
                previous.cancel();
                info!("Travel plan cancelled due to a new request");
            }
            let token = CancellationToken::new();
            state.travel_plan_token = Some(token.clone());
            state.travel_plan_loading = true;
            token
        };

        info!(location = %location, session = %session, url_count = urls.len(), "Starting travel plan");

        let orchestrator = self.clone();
        let location = location.to_string();
        let session = session.clone();
        tokio::spawn(async move {
            let result = orchestrator
                .backend
                .start_travel_plan(&location, &session, &urls, &token)
                .await;

            let mut state = orchestrator.state.lock().await;
            if token.is_cancelled() {
                info!("Travel plan request cancelled");
                return;
            }
            match result {
                Ok(plan) => {
                    info!("Travel plan received");
                    state.travel_plan = Some(plan);
                }
                Err(e) => error!(error = %e, "Error generating travel plan"),
            }
            state.travel_plan_loading = false;
            state.travel_plan_token = None;
        })
    }

    /// Cancel the in-flight travel-plan request and clear the slot.
    pub async fn cancel_travel_plan(&self) {
        let mut state = self.state.lock().await;
        if let Some(token) = state.travel_plan_token.take() {
            token.cancel();
            info!("Travel plan cancelled");
        }
        state.travel_plan_loading = false;
        state.travel_plan = None;
    }

    pub async fn snapshot(&self) -> SearchSnapshot {
        let state = self.state.lock().await;
        SearchSnapshot {
            location: state.location.clone(),
            categories: self
                .categories
                .iter()
                .zip(state.categories.iter())
                .map(|(definition, category)| CategorySnapshot {
                    name: definition.name.clone(),
                    results: category.results.clone(),
                    loading: category.loading,
                    completed: category.completed,
                })
                .collect(),
            travel_plan: state.travel_plan.clone(),
            travel_plan_loading: state.travel_plan_loading,
        }
    }
}
