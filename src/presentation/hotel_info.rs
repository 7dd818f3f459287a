use crate::client::{Backend, ClientError, HotelInfoEntry};
use crate::session::SessionId;
use tracing::info;

/// Summary the hotel-info service returns for pages without hotel details
pub const INSUFFICIENT_HOTEL_INFO: &str =
    "The content provided does not contain sufficient hotel information.";

/// Drop "insufficient information" summaries. If nothing is left, return a
/// single placeholder entry carrying the sentinel text.
pub fn filter_hotel_info(entries: Vec<HotelInfoEntry>) -> Vec<HotelInfoEntry> {
    let kept: Vec<HotelInfoEntry> = entries
        .into_iter()
        .filter(|entry| entry.response.trim() != INSUFFICIENT_HOTEL_INFO)
        .collect();

    if kept.is_empty() {
        vec![HotelInfoEntry {
            filename: String::new(),
            response: INSUFFICIENT_HOTEL_INFO.to_string(),
        }]
    } else {
        kept
    }
}

pub async fn generate_hotel_info(
    backend: &dyn Backend,
    session: &SessionId,
) -> Result<Vec<HotelInfoEntry>, ClientError> {
    let entries = backend.generate_hotel_info(session).await?;
    let total = entries.len();
    let filtered = filter_hotel_info(entries);
    info!(session = %session, total, kept = filtered.len(), "Hotel info generated");
    Ok(filtered)
}
