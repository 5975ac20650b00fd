//! SiteSearch web widget — Dioxus host for the live search overlay.

use dioxus::prelude::*;

mod search;

use search::SearchBox;
use sitesearch_core::types::SearchOverrides;

static SEARCH_CSS: Asset = asset!("/assets/search.css");

fn main() {
    dioxus::launch(App);
}

/// Overrides for the page's widget. In the browser the page origin is enough;
/// the desktop build reads `.sitesearch.toml` from the working directory.
fn initial_overrides() -> SearchOverrides {
    #[cfg(not(target_arch = "wasm32"))]
    {
        let path = std::env::current_dir().ok().and_then(|cwd| sitesearch_core::find_config(&cwd));
        if let Some(path) = path {
            match sitesearch_core::load_config_file(&path) {
                Ok(overrides) => return overrides,
                Err(e) => tracing::warn!(error = %e, "Ignoring config file"),
            }
        }
    }
    SearchOverrides::default()
}

#[component]
fn App() -> Element {
    let overrides = use_hook(initial_overrides);

    rsx! {
        document::Stylesheet { href: SEARCH_CSS }
        SearchBox { overrides }
    }
}
