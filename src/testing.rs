//! In-process backend double for unit tests.

use crate::client::{
    AnalyzeResponse, Backend, ClientError, HotelInfoEntry, ResultItem, ScrapeResponse, SessionAck,
    TravelPlan,
};
use crate::location::Geocoder;
use crate::session::SessionId;
use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Call {
    Search(String),
    Scrape { url: String, session: String },
    TravelPlan { location: String, session: String, urls: Vec<String> },
    Analyze { session: String, query: String },
    HotelInfo { session: String },
    CreateFolder { location: String, session: String },
}

pub(crate) fn item(title: &str, link: &str) -> ResultItem {
    ResultItem {
        title: title.to_string(),
        snippet: format!("{} snippet", title),
        link: link.to_string(),
    }
}

fn boom() -> ClientError {
    ClientError::Backend {
        status: 500,
        body: r#"{"detail": "boom"}"#.to_string(),
    }
}

/// Base URL of a server that accepts connections and never answers.
pub(crate) async fn silent_server() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            held.push(stream);
        }
    });
    format!("http://{}", addr)
}

/// Geocoder that never resolves a name.
pub(crate) struct NoGeocoder;

#[async_trait]
impl Geocoder for NoGeocoder {
    async fn reverse(&self, _lat: f64, _lng: f64) -> Result<Option<String>, ClientError> {
        Ok(None)
    }
}

pub(crate) struct FakeBackend {
    calls: Mutex<Vec<Call>>,
    search_hits: Mutex<Vec<(String, Vec<ResultItem>)>>,
    failing_searches: Mutex<Vec<String>>,
    search_gate: Mutex<Option<Arc<Notify>>>,
    cancelled_searches: AtomicUsize,
    answers: Mutex<HashMap<String, Option<String>>>,
    failing_questions: Mutex<Vec<String>>,
    hotel_info: Mutex<Option<Vec<HotelInfoEntry>>>,
    travel_gate: Mutex<Option<Arc<Notify>>>,
    fail_travel_plan: AtomicBool,
    fail_session_folder: AtomicBool,
}

impl FakeBackend {
    pub(crate) fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            search_hits: Mutex::new(Vec::new()),
            failing_searches: Mutex::new(Vec::new()),
            search_gate: Mutex::new(None),
            cancelled_searches: AtomicUsize::new(0),
            answers: Mutex::new(HashMap::new()),
            failing_questions: Mutex::new(Vec::new()),
            hotel_info: Mutex::new(Some(Vec::new())),
            travel_gate: Mutex::new(None),
            fail_travel_plan: AtomicBool::new(false),
            fail_session_folder: AtomicBool::new(false),
        }
    }

    /// Searches whose query contains `needle` return `items`.
    pub(crate) fn with_search(&self, needle: &str, items: Vec<ResultItem>) {
        self.search_hits
            .lock()
            .unwrap()
            .push((needle.to_string(), items));
    }

    pub(crate) fn failing_search(&self, needle: &str) {
        self.failing_searches.lock().unwrap().push(needle.to_string());
    }

    /// Every search waits for one `notify_one` on the returned gate.
    pub(crate) fn gate_searches(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.search_gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    pub(crate) fn cancelled_searches(&self) -> usize {
        self.cancelled_searches.load(Ordering::SeqCst)
    }

    pub(crate) fn with_answer(&self, question: &str, response: Option<&str>) {
        self.answers
            .lock()
            .unwrap()
            .insert(question.to_string(), response.map(str::to_string));
    }

    pub(crate) fn failing_question(&self, question: &str) {
        self.failing_questions
            .lock()
            .unwrap()
            .push(question.to_string());
    }

    pub(crate) fn with_hotel_info(&self, entries: Vec<HotelInfoEntry>) {
        *self.hotel_info.lock().unwrap() = Some(entries);
    }

    pub(crate) fn failing_hotel_info(&self) {
        *self.hotel_info.lock().unwrap() = None;
    }

    pub(crate) fn gate_travel_plans(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.travel_gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    pub(crate) fn failing_travel_plan(&self) {
        self.fail_travel_plan.store(true, Ordering::SeqCst);
    }

    pub(crate) fn failing_session_folder(&self) {
        self.fail_session_folder.store(true, Ordering::SeqCst);
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn search_queries(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Search(query) => Some(query),
                _ => None,
            })
            .collect()
    }

    /// Poll until at least `count` calls matching `filter` were recorded.
    pub(crate) async fn wait_for<F>(&self, count: usize, filter: F)
    where
        F: Fn(&Call) -> bool,
    {
        let wait = async {
            loop {
                if self.calls().iter().filter(|c| filter(c)).count() >= count {
                    return;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        };
        tokio::time::timeout(Duration::from_secs(5), wait)
            .await
            .expect("timed out waiting for backend calls");
    }

    pub(crate) async fn wait_for_searches(&self, count: usize) {
        self.wait_for(count, |c| matches!(c, Call::Search(_))).await
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    async fn pass_gate(
        gate: Option<Arc<Notify>>,
        cancel: &CancellationToken,
    ) -> Result<(), ClientError> {
        if let Some(gate) = gate {
            tokio::select! {
                _ = cancel.cancelled() => return Err(ClientError::Cancelled),
                _ = gate.notified() => {}
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn run_simple_search(
        &self,
        query: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<ResultItem>, ClientError> {
        self.record(Call::Search(query.to_string()));
        let gate = self.search_gate.lock().unwrap().clone();
        if let Err(e) = Self::pass_gate(gate, cancel).await {
            self.cancelled_searches.fetch_add(1, Ordering::SeqCst);
            return Err(e);
        }
        if self
            .failing_searches
            .lock()
            .unwrap()
            .iter()
            .any(|needle| query.contains(needle.as_str()))
        {
            return Err(boom());
        }
        let hits = self.search_hits.lock().unwrap();
        Ok(hits
            .iter()
            .find(|(needle, _)| query.contains(needle.as_str()))
            .map(|(_, items)| items.clone())
            .unwrap_or_default())
    }

    async fn scrape_content(
        &self,
        url: &str,
        session: &SessionId,
    ) -> Result<ScrapeResponse, ClientError> {
        self.record(Call::Scrape {
            url: url.to_string(),
            session: session.to_string(),
        });
        Ok(ScrapeResponse {
            content: Some(format!("content of {}", url)),
            ..Default::default()
        })
    }

    async fn start_travel_plan(
        &self,
        location: &str,
        session: &SessionId,
        urls: &[String],
        cancel: &CancellationToken,
    ) -> Result<TravelPlan, ClientError> {
        self.record(Call::TravelPlan {
            location: location.to_string(),
            session: session.to_string(),
            urls: urls.to_vec(),
        });
        let gate = self.travel_gate.lock().unwrap().clone();
        Self::pass_gate(gate, cancel).await?;
        if self.fail_travel_plan.load(Ordering::SeqCst) {
            return Err(boom());
        }
        Ok(TravelPlan(json!({ "location": location, "stops": urls })))
    }

    async fn analyze_data(
        &self,
        session: &SessionId,
        query: &str,
    ) -> Result<AnalyzeResponse, ClientError> {
        self.record(Call::Analyze {
            session: session.to_string(),
            query: query.to_string(),
        });
        if self
            .failing_questions
            .lock()
            .unwrap()
            .iter()
            .any(|q| q == query)
        {
            return Err(boom());
        }
        let response = self
            .answers
            .lock()
            .unwrap()
            .get(query)
            .cloned()
            .unwrap_or_else(|| Some("Empty Response".to_string()));
        Ok(AnalyzeResponse {
            response,
            query: Some(query.to_string()),
            context: None,
        })
    }

    async fn generate_hotel_info(
        &self,
        session: &SessionId,
    ) -> Result<Vec<HotelInfoEntry>, ClientError> {
        self.record(Call::HotelInfo {
            session: session.to_string(),
        });
        self.hotel_info.lock().unwrap().clone().ok_or_else(boom)
    }

    async fn create_session_folder(
        &self,
        location: &str,
        session: &SessionId,
    ) -> Result<SessionAck, ClientError> {
        self.record(Call::CreateFolder {
            location: location.to_string(),
            session: session.to_string(),
        });
        if self.fail_session_folder.load(Ordering::SeqCst) {
            return Err(boom());
        }
        Ok(SessionAck {
            message: Some("Folder and file created".to_string()),
            folder_uuid: Some(session.to_string()),
            file_path: None,
        })
    }
}
