//! SiteSearch — live search widget over a WordPress-style content API.
//!
//! # Modules
//!
//! - [`widget`] — The search widget state machine and query cycle
//! - [`source`] — Remote content API seam and the HTTP client
//! - [`render`] — Client-side re-filter, truncation, highlighting
//! - [`types`] — Configuration, remote entities, results content, widget state
//! - [`error`] — Fetch and config errors

pub mod error;
pub mod render;
pub mod source;
pub mod types;
pub mod widget;

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use error::ConfigError;
use types::SearchOverrides;

pub use source::{ContentSource, HttpContentSource};
pub use types::{ClickTarget, ContentItem, ResultsContent, SearchConfig, StatusMessage, WidgetState};
pub use widget::{SearchWidget, WidgetView};

// ---------------------------------------------------------------------------
// .sitesearch.toml config loading
// ---------------------------------------------------------------------------

/// File name looked up in the working directory when no config path is given.
pub const CONFIG_FILE_NAME: &str = ".sitesearch.toml";

/// Known keys in `.sitesearch.toml` for config validation.
const KNOWN_CONFIG_KEYS: &[&str] = &["base_url", "content_types", "max_results", "escape_titles"];

/// Simple Levenshtein edit distance for typo suggestions.
fn edit_distance(a: &str, b: &str) -> usize {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];
    for (i, &ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// `.sitesearch.toml` in `dir`, if present.
pub fn find_config(dir: &Path) -> Option<PathBuf> {
    let path = dir.join(CONFIG_FILE_NAME);
    path.is_file().then_some(path)
}

/// Load widget overrides from a TOML config file.
///
/// Unknown keys are not an error; they trigger a warning with a typo suggestion.
pub fn load_config_file(path: &Path) -> Result<SearchOverrides, ConfigError> {
    debug!(path = %path.display(), "Loading config");
    let content = std::fs::read_to_string(path)
        .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
    let table: toml::Table =
        content.parse().map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })?;
    parse_overrides(&table)
}

/// Extract overrides from an already-parsed TOML table.
pub fn parse_overrides(table: &toml::Table) -> Result<SearchOverrides, ConfigError> {
    for key in table.keys() {
        if KNOWN_CONFIG_KEYS.contains(&key.as_str()) {
            continue;
        }
        let suggestion = KNOWN_CONFIG_KEYS.iter().min_by_key(|k| edit_distance(key, k));
        match suggestion {
            Some(s) if edit_distance(key, s) <= 3 => {
                warn!(key = key.as_str(), suggestion = *s, "Unknown config key — did you mean '{s}'?");
            }
            _ => {
                warn!(
                    key = key.as_str(),
                    "Unknown config key (known keys: {})",
                    KNOWN_CONFIG_KEYS.join(", ")
                );
            }
        }
    }

    let mut overrides = SearchOverrides::default();

    if let Some(v) = table.get("base_url") {
        let url = v
            .as_str()
            .ok_or(ConfigError::InvalidValue { key: "base_url", expected: "a string" })?;
        overrides.base_url = Some(url.to_string());
    }

    if let Some(v) = table.get("content_types") {
        let types = v
            .as_array()
            .and_then(|array| array.iter().map(|t| t.as_str().map(str::to_string)).collect::<Option<Vec<_>>>())
            .ok_or(ConfigError::InvalidValue { key: "content_types", expected: "an array of strings" })?;
        overrides.content_types = Some(types);
    }

    if let Some(v) = table.get("max_results") {
        let max = v
            .as_integer()
            .and_then(|n| usize::try_from(n).ok())
            .ok_or(ConfigError::InvalidValue { key: "max_results", expected: "a non-negative integer" })?;
        overrides.max_results = Some(max);
    }

    if let Some(v) = table.get("escape_titles") {
        let escape = v
            .as_bool()
            .ok_or(ConfigError::InvalidValue { key: "escape_titles", expected: "a boolean" })?;
        overrides.escape_titles = Some(escape);
    }

    Ok(overrides)
}
