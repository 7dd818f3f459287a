//! Results presentation - view models over orchestrator state plus the
//! auxiliary panel actions (analysis, hotel info, chat).

pub mod analysis;
pub mod chat;
pub mod hotel_info;
pub mod tabs;

pub use analysis::{analyze_location, AnalysisAnswer, ANALYSIS_QUESTIONS};
pub use chat::{ChatMessage, ChatTranscript, Sender};
pub use hotel_info::{filter_hotel_info, INSUFFICIENT_HOTEL_INFO};
pub use tabs::{category_tabs, event_urls, Tab, TabView};

use crate::client::{Backend, ClientError, HotelInfoEntry};
use crate::session::SessionId;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::error;

#[derive(Default)]
struct PanelState {
    analysis: Vec<AnalysisAnswer>,
    hotel_info: Vec<HotelInfoEntry>,
    hotel_info_loading: bool,
    chat: ChatTranscript,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct PanelSnapshot {
    pub analysis: Vec<AnalysisAnswer>,
    pub hotel_info: Vec<HotelInfoEntry>,
    pub hotel_info_loading: bool,
    pub chat: Vec<ChatMessage>,
}

/// State behind the analysis, hotel-info and chat panels.
///
/// Nothing here is reset on location change; the panels keep showing
/// what they last produced.
#[derive(Clone, Default)]
pub struct ResultsPanel {
    state: Arc<Mutex<PanelState>>,
}

impl ResultsPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the fixed analysis questions and replace the stored answers.
    pub async fn run_analysis(
        &self,
        backend: &dyn Backend,
        session: &SessionId,
    ) -> Vec<AnalysisAnswer> {
        let answers = analyze_location(backend, session).await;
        self.state.lock().await.analysis = answers.clone();
        answers
    }

    /// Fetch and filter hotel summaries. The loading flag is cleared on
    /// every exit path; stored entries are only replaced on success.
    pub async fn generate_hotel_info(
        &self,
        backend: &dyn Backend,
        session: &SessionId,
    ) -> Result<Vec<HotelInfoEntry>, ClientError> {
        self.state.lock().await.hotel_info_loading = true;

        let result = hotel_info::generate_hotel_info(backend, session).await;

        let mut state = self.state.lock().await;
        state.hotel_info_loading = false;
        match result {
            Ok(entries) => {
                state.hotel_info = entries.clone();
                Ok(entries)
            }
            Err(e) => {
                error!(error = %e, "Error generating hotel info");
                Err(e)
            }
        }
    }

    /// Append the user's turn and the bot's reply. Blank input is ignored
    /// and yields `None`.
    pub async fn send_chat(
        &self,
        backend: &dyn Backend,
        session: &SessionId,
        input: &str,
    ) -> Option<ChatMessage> {
        if input.trim().is_empty() {
            return None;
        }
        self.state.lock().await.chat.push_user(input);

        let reply = chat::bot_reply(backend, session, input).await;

        let mut state = self.state.lock().await;
        state.chat.push_bot(reply);
        state.chat.messages().last().cloned()
    }

    pub async fn chat(&self) -> Vec<ChatMessage> {
        self.state.lock().await.chat.messages().to_vec()
    }

    pub async fn snapshot(&self) -> PanelSnapshot {
        let state = self.state.lock().await;
        PanelSnapshot {
            analysis: state.analysis.clone(),
            hotel_info: state.hotel_info.clone(),
            hotel_info_loading: state.hotel_info_loading,
            chat: state.chat.messages().to_vec(),
        }
    }
}
