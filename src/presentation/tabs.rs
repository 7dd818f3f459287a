use crate::client::ResultItem;
use crate::orchestrator::{CategorySnapshot, SearchSnapshot};
use serde::Serialize;

/// Category whose result links feed the travel plan
pub const EVENTS_CATEGORY: &str = "events";

/// What a category tab shows.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "state", content = "results", rename_all = "snake_case")]
pub enum TabView {
    Loading,
    Empty,
    List(Vec<ResultItem>),
}

impl TabView {
    pub fn for_category(category: &CategorySnapshot) -> Self {
        if category.loading {
            TabView::Loading
        } else if category.results.is_empty() {
            TabView::Empty
        } else {
            TabView::List(category.results.clone())
        }
    }
}

/// One tab header plus its body.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Tab {
    pub name: String,
    pub completed: bool,
    pub view: TabView,
}

pub fn category_tabs(snapshot: &SearchSnapshot) -> Vec<Tab> {
    snapshot
        .categories
        .iter()
        .map(|category| Tab {
            name: category.name.clone(),
            completed: category.completed,
            view: TabView::for_category(category),
        })
        .collect()
}

/// Non-empty links of the events category, in result order.
pub fn event_urls(snapshot: &SearchSnapshot) -> Vec<String> {
    snapshot
        .category(EVENTS_CATEGORY)
        .map(|events| {
            events
                .results
                .iter()
                .filter(|item| !item.link.trim().is_empty())
                .map(|item| item.link.clone())
                .collect()
        })
        .unwrap_or_default()
}
