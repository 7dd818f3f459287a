// HTTP client for the research backend
pub mod client;

// Configuration loading
pub mod config;

// Selection state and action routing
pub mod coordinator;

// Location picks and reverse geocoding
pub mod location;

// Sequential category search chain and travel plan
pub mod orchestrator;

// View models and panel actions
pub mod presentation;

// Backend session identifiers
pub mod session;

// HTTP API
pub mod api;

#[cfg(test)]
mod testing;
