//! Shared helpers for the HTTP integration tests.

use std::cell::RefCell;

use mockito::{Matcher, Mock, ServerGuard};
use sitesearch_core::{ResultsContent, SearchConfig, WidgetView};

/// View that keeps everything the widget showed.
#[derive(Default)]
pub struct CapturingView {
    shown: RefCell<Vec<ResultsContent>>,
}

impl CapturingView {
    pub fn last(&self) -> ResultsContent {
        self.shown.borrow().last().cloned().unwrap_or_default()
    }

    pub fn html(&self) -> String {
        self.last().to_html()
    }

    /// Links of the last rendered entry list, empty if the last content was not a list.
    pub fn links(&self) -> Vec<String> {
        match self.last() {
            ResultsContent::Entries { entries } => entries.into_iter().map(|e| e.link).collect(),
            _ => Vec::new(),
        }
    }
}

impl WidgetView for CapturingView {
    fn show(&self, content: ResultsContent) {
        self.shown.borrow_mut().push(content);
    }
}

pub fn config_for(base_url: &str, types: &[&str], max_results: usize) -> SearchConfig {
    SearchConfig {
        base_url: base_url.to_string(),
        content_types: types.iter().map(|t| t.to_string()).collect(),
        max_results,
        escape_titles: false,
    }
}

/// JSON array in the REST API's shape for `(link, title)` pairs.
pub fn item_json(items: &[(&str, &str)]) -> String {
    let values: Vec<serde_json::Value> = items
        .iter()
        .enumerate()
        .map(|(i, (link, title))| {
            serde_json::json!({
                "id": i + 1,
                "link": link,
                "title": { "rendered": title },
            })
        })
        .collect();
    serde_json::Value::Array(values).to_string()
}

/// Mock `GET /{content_type}/?search={query}`, expected exactly once.
pub async fn collection_mock(
    server: &mut ServerGuard,
    content_type: &str,
    query: &str,
    status: usize,
    body: &str,
) -> Mock {
    server
        .mock("GET", format!("/{content_type}/").as_str())
        .match_query(Matcher::UrlEncoded("search".into(), query.into()))
        .with_status(status)
        .with_header("content-type", "application/json")
        .with_body(body)
        .expect(1)
        .create_async()
        .await
}
