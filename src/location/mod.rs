//! Location selection - turns a user pick into a labelled location and a
//! fresh backend session.
//!
//! Two triggers produce a pick: a place-search result (label and
//! coordinates known up front) and a raw map click (label resolved by
//! reverse geocoding). Both report the location first and the session
//! identifier second, once the backend has created the session folder.
//! The identifier is minted before either notification and doubles as the
//! selection's ticket: a sink matches `session_ready` against the ticket
//! announced with the latest `location_selected`.

mod geocoder;

pub use geocoder::{Geocoder, NominatimGeocoder};

use crate::client::Backend;
use crate::session::SessionId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};

/// The single active location pick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SelectedLocation {
    pub label: String,
    pub lat: f64,
    pub lng: f64,
}

/// Shorten a comma-separated address to its first two components.
///
/// Addresses with fewer than three components are returned unchanged.
pub fn simplify_location_name(name: &str) -> String {
    let parts: Vec<&str> = name.split(',').collect();
    if parts.len() >= 3 {
        format!("{}, {}", parts[0].trim(), parts[1].trim())
    } else {
        name.to_string()
    }
}

/// Label used when a clicked point cannot be reverse geocoded.
pub fn fallback_label(lat: f64, lng: f64) -> String {
    format!("Lat: {}, Lng: {}", lat, lng)
}

/// Receiver of the two selection notifications.
#[async_trait]
pub trait SelectionSink: Send + Sync {
    /// `pending` is the identifier minted for this pick; it only becomes
    /// usable once `session_ready` delivers it.
    async fn location_selected(&self, location: SelectedLocation, pending: &SessionId);
    async fn session_ready(&self, session: SessionId);
}

/// What a selection produced. `session` is `None` when the backend refused
/// to create the session folder.
#[derive(Clone, Debug, PartialEq)]
pub struct LocationSelection {
    pub location: SelectedLocation,
    pub session: Option<SessionId>,
}

#[derive(Clone)]
pub struct LocationSelector {
    backend: Arc<dyn Backend>,
    geocoder: Arc<dyn Geocoder>,
}

impl LocationSelector {
    pub fn new(backend: Arc<dyn Backend>, geocoder: Arc<dyn Geocoder>) -> Self {
        Self { backend, geocoder }
    }

    /// A place-search result was picked.
    pub async fn select_from_search(
        &self,
        label: &str,
        lat: f64,
        lng: f64,
        sink: &dyn SelectionSink,
    ) -> LocationSelection {
        info!(label = %label, "Location selected through search");
        let location = SelectedLocation {
            label: label.to_string(),
            lat,
            lng,
        };
        self.complete(location, sink).await
    }

    /// The map was clicked at (`lat`, `lng`).
    pub async fn select_from_click(
        &self,
        lat: f64,
        lng: f64,
        sink: &dyn SelectionSink,
    ) -> LocationSelection {
        let label = match self.geocoder.reverse(lat, lng).await {
            Ok(Some(name)) => name,
            Ok(None) => fallback_label(lat, lng),
            Err(e) => {
                warn!(lat, lng, error = %e, "Error fetching location name");
                fallback_label(lat, lng)
            }
        };
        info!(label = %label, "Location selected through map click");
        self.complete(SelectedLocation { label, lat, lng }, sink).await
    }

    async fn complete(
        &self,
        location: SelectedLocation,
        sink: &dyn SelectionSink,
    ) -> LocationSelection {
        let session = SessionId::generate();
        sink.location_selected(location.clone(), &session).await;

        let session = match self
            .backend
            .create_session_folder(&location.label, &session)
            .await
        {
            Ok(_) => {
                info!(session = %session, "Session folder created");
                sink.session_ready(session.clone()).await;
                Some(session)
            }
            Err(e) => {
                error!(session = %session, error = %e, "Error creating session folder");
                None
            }
        };

        LocationSelection { location, session }
    }
}
