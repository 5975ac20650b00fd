use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// REST namespace appended to the page host when no base URL is configured.
pub const DEFAULT_API_PATH: &str = "/wp-json/wp/v2";

/// Collection queried when the caller does not name any.
pub const DEFAULT_CONTENT_TYPE: &str = "posts";

/// Maximum number of entries rendered per query by default.
pub const DEFAULT_MAX_RESULTS: usize = 6;

// ---------------------------------------------------------------------------
// Search configuration — defaults merged with caller overrides
// ---------------------------------------------------------------------------

/// Resolved widget configuration. Immutable once the widget is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchConfig {
    /// API root, e.g. `https://example.com/wp-json/wp/v2`.
    pub base_url: String,
    /// Collections queried for every input, in render order.
    pub content_types: Vec<String>,
    /// Cap on rendered entries after client-side filtering.
    pub max_results: usize,
    /// Escape titles and links instead of inserting them as trusted markup.
    pub escape_titles: bool,
}

impl SearchConfig {
    /// Defaults for a page served from `host`.
    pub fn for_host(host: &str) -> Self {
        Self {
            base_url: format!("https://{host}{DEFAULT_API_PATH}"),
            content_types: vec![DEFAULT_CONTENT_TYPE.to_string()],
            max_results: DEFAULT_MAX_RESULTS,
            escape_titles: false,
        }
    }

    /// Defaults for `host` with `overrides` applied on top. Caller values win per key.
    pub fn resolve(host: &str, overrides: &SearchOverrides) -> Self {
        let mut config = Self::for_host(host);
        if let Some(url) = &overrides.base_url {
            config.base_url = url.clone();
        }
        if let Some(types) = &overrides.content_types {
            config.content_types = types.clone();
        }
        if let Some(max) = overrides.max_results {
            config.max_results = max;
        }
        if let Some(escape) = overrides.escape_titles {
            config.escape_titles = escape;
        }
        config
    }
}

/// Partial configuration supplied by the caller. `None` keeps the default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SearchOverrides {
    pub base_url: Option<String>,
    pub content_types: Option<Vec<String>>,
    pub max_results: Option<usize>,
    pub escape_titles: Option<bool>,
}

impl SearchOverrides {
    /// Layer `other` on top of `self`; keys set in `other` win.
    pub fn merge(mut self, other: SearchOverrides) -> Self {
        if other.base_url.is_some() {
            self.base_url = other.base_url;
        }
        if other.content_types.is_some() {
            self.content_types = other.content_types;
        }
        if other.max_results.is_some() {
            self.max_results = other.max_results;
        }
        if other.escape_titles.is_some() {
            self.escape_titles = other.escape_titles;
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Remote entities
// ---------------------------------------------------------------------------

/// Rendered text field of a REST entity (`{ "rendered": "..." }`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedText {
    pub rendered: String,
}

/// A single search hit returned by a collection endpoint. Read-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    pub link: String,
    pub title: RenderedText,
}

impl ContentItem {
    pub fn new(link: impl Into<String>, title_html: impl Into<String>) -> Self {
        Self {
            link: link.into(),
            title: RenderedText { rendered: title_html.into() },
        }
    }

    /// Title as markup, exactly as the API rendered it.
    pub fn title_html(&self) -> &str {
        &self.title.rendered
    }
}

// ---------------------------------------------------------------------------
// Results container content
// ---------------------------------------------------------------------------

/// Status line shown in place of a result list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusMessage {
    Searching,
    Error,
    NoResults,
}

impl StatusMessage {
    pub fn text(self) -> &'static str {
        match self {
            StatusMessage::Searching => "Searching...",
            StatusMessage::Error => "Search error!",
            StatusMessage::NoResults => "No results found.",
        }
    }
}

/// One rendered link. `title_html` already carries the highlight markers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultEntry {
    pub link: String,
    pub title_html: String,
}

/// Everything the results container can display. Each value replaces the last.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResultsContent {
    #[default]
    Cleared,
    Message { message: StatusMessage },
    Entries { entries: Vec<ResultEntry> },
}

impl ResultsContent {
    pub fn message(message: StatusMessage) -> Self {
        ResultsContent::Message { message }
    }

    /// Inner HTML for the results container.
    pub fn to_html(&self) -> String {
        match self {
            ResultsContent::Cleared => String::new(),
            ResultsContent::Message { message } => {
                format!("<div class=\"wp-search-empty\">{}</div>", message.text())
            }
            ResultsContent::Entries { entries } => entries
                .iter()
                .map(|e| {
                    format!(
                        "<div class=\"wp-search-item\"><a target=\"_blank\" href=\"{}\">{}</a></div>",
                        e.link, e.title_html
                    )
                })
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Widget state
// ---------------------------------------------------------------------------

/// Where the current query cycle stands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    Searching,
    Rendered,
    Errored,
    Cleared,
}

/// Explicit widget state, kept in sync with what the view shows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WidgetState {
    pub open: bool,
    pub query: String,
    pub phase: Phase,
    pub rendered_count: usize,
}

/// Where a page click landed, relative to the widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    Toggle,
    Panel,
    Outside,
}

impl ClickTarget {
    /// Classify a click from whether its target sits inside the toggle
    /// button and inside the results panel. The toggle wins over the panel.
    pub fn classify(on_toggle: bool, in_panel: bool) -> Self {
        if on_toggle {
            Self::Toggle
        } else if in_panel {
            Self::Panel
        } else {
            Self::Outside
        }
    }
}
