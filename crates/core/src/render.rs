//! Client-side re-filter, truncation and match highlighting.
//!
//! The remote API matches loosely (any term, any field), so results are
//! filtered again here against the literal query before rendering.

use regex::{Regex, RegexBuilder};
use tracing::debug;

use crate::types::{ContentItem, ResultEntry, ResultsContent, StatusMessage};

pub const HIGHLIGHT_OPEN: &str = "<b style=\"color: red;\">";
pub const HIGHLIGHT_CLOSE: &str = "</b>";

/// Wraps every case-insensitive occurrence of a query in the highlight marker.
///
/// The query is matched literally. An empty query highlights nothing.
pub struct Highlighter {
    pattern: Option<Regex>,
}

impl Highlighter {
    pub fn new(query: &str) -> Self {
        if query.is_empty() {
            return Self { pattern: None };
        }
        let pattern = match RegexBuilder::new(&regex::escape(query)).case_insensitive(true).build() {
            Ok(re) => Some(re),
            Err(e) => {
                debug!(query, error = %e, "Highlight pattern exceeds the regex size limit, rendering titles plain");
                None
            }
        };
        Self { pattern }
    }

    /// Highlight `text`. With `escape`, the non-marker text is HTML-escaped.
    pub fn apply(&self, text: &str, escape: bool) -> String {
        let encode = |s: &str| -> String {
            if escape {
                html_escape::encode_text(s).into_owned()
            } else {
                s.to_string()
            }
        };

        let Some(re) = &self.pattern else {
            return encode(text);
        };

        let mut out = String::with_capacity(text.len() + 32);
        let mut last = 0;
        for m in re.find_iter(text) {
            out.push_str(&encode(&text[last..m.start()]));
            out.push_str(HIGHLIGHT_OPEN);
            out.push_str(&encode(m.as_str()));
            out.push_str(HIGHLIGHT_CLOSE);
            last = m.end();
        }
        out.push_str(&encode(&text[last..]));
        out
    }
}

/// True when the item's title contains `query`, ignoring case.
pub fn title_matches(item: &ContentItem, query_lower: &str) -> bool {
    item.title_html().to_lowercase().contains(query_lower)
}

/// Filter, truncate and highlight `items` for `query`.
///
/// Order is preserved as received. Titles are trusted markup and are inserted
/// raw unless `escape` is set.
pub fn render_entries(items: &[ContentItem], query: &str, max_results: usize, escape: bool) -> Vec<ResultEntry> {
    let query_lower = query.to_lowercase();
    let highlighter = Highlighter::new(query);

    items
        .iter()
        .filter(|item| title_matches(item, &query_lower))
        .take(max_results)
        .map(|item| ResultEntry {
            link: if escape {
                html_escape::encode_double_quoted_attribute(&item.link).into_owned()
            } else {
                item.link.clone()
            },
            title_html: highlighter.apply(item.title_html(), escape),
        })
        .collect()
}

/// Results container content for a non-empty fetch: the entry list, or
/// "No results found." when nothing survives the filter.
pub fn render_content(items: &[ContentItem], query: &str, max_results: usize, escape: bool) -> ResultsContent {
    let entries = render_entries(items, query, max_results, escape);
    if entries.is_empty() {
        ResultsContent::message(StatusMessage::NoResults)
    } else {
        ResultsContent::Entries { entries }
    }
}
