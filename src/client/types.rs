use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One search hit as returned by the backend's search endpoint.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultItem {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub snippet: String,
    #[serde(default)]
    pub link: String,
}

/// `POST /run_simple_search_duck/`
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    /// `null` or missing means no hits
    #[serde(default)]
    pub result_content: Option<Vec<ResultItem>>,
}

impl SearchResponse {
    pub fn into_items(self) -> Vec<ResultItem> {
        self.result_content.unwrap_or_default()
    }
}

/// Per-URL record the scraper writes alongside (or instead of) `content`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScrapeRecord {
    pub url: String,
    #[serde(default)]
    pub file: Option<String>,
    pub status: String,
}

/// `POST /simple_scraping/`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrapeResponse {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub result: Option<ScrapeRecord>,
}

impl ScrapeResponse {
    /// Text to show the user: the scraped content when present, otherwise
    /// the scraper's status for the URL.
    pub fn display_text(&self) -> String {
        match (&self.content, &self.result) {
            (Some(content), _) => content.clone(),
            (None, Some(record)) => format!("{} ({})", record.status, record.url),
            (None, None) => String::new(),
        }
    }
}

/// Backend-generated itinerary. Opaque to the client.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TravelPlan(pub Value);

impl TravelPlan {
    /// Take `travel_plan` from the response body, or the rest of the body
    /// when the key is absent or null.
    pub fn from_response(mut body: Value) -> Self {
        let plan = body
            .as_object_mut()
            .and_then(|fields| fields.remove("travel_plan"));
        match plan {
            Some(plan) if !plan.is_null() => TravelPlan(plan),
            _ => TravelPlan(body),
        }
    }
}

/// `POST /analyze_data/`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub context: Option<Value>,
}

/// One summary produced by the hotel-info service for a scraped file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HotelInfoEntry {
    #[serde(default)]
    pub filename: String,
    pub response: String,
}

/// `POST /generate_hotel_info/`
#[derive(Debug, Deserialize)]
pub struct HotelInfoResponse {
    #[serde(default)]
    pub responses: Vec<HotelInfoEntry>,
}

/// `POST /generate_uuid_folder/`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionAck {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub folder_uuid: Option<String>,
    #[serde(default)]
    pub file_path: Option<String>,
}
