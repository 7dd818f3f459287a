use crate::client::Backend;
use crate::session::SessionId;
use serde::Serialize;
use tracing::{debug, error};

/// Questions asked, in order, when the user requests an analysis.
pub const ANALYSIS_QUESTIONS: [&str; 6] = [
    "What are the most popular hotels near this location?",
    "Are there any highly-rated hotels for families?",
    "What events are happening in this location?",
    "What are popular tourist attractions around here?",
    "Are there any recreational activities nearby?",
    "Tell me about the history of this location.",
];

/// Answer the backend's index produces when nothing relevant was scraped
pub const EMPTY_RESPONSE: &str = "Empty Response";

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AnalysisAnswer {
    pub query: String,
    pub response: String,
}

fn is_meaningful(response: &str) -> bool {
    let trimmed = response.trim();
    !trimmed.is_empty() && trimmed != EMPTY_RESPONSE
}

/// Ask every analysis question sequentially and keep the useful answers.
///
/// A failed question is logged and skipped; the rest still run.
pub async fn analyze_location(backend: &dyn Backend, session: &SessionId) -> Vec<AnalysisAnswer> {
    let mut answers = Vec::new();

    for question in ANALYSIS_QUESTIONS {
        match backend.analyze_data(session, question).await {
            Ok(response) => match response.response {
                Some(text) if is_meaningful(&text) => answers.push(AnalysisAnswer {
                    query: question.to_string(),
                    response: text,
                }),
                _ => debug!(question, "Skipping empty analysis answer"),
            },
            Err(e) => error!(question, error = %e, "Error analyzing data"),
        }
    }

    answers
}
