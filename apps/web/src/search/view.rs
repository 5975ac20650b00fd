//! Signal-backed [`WidgetView`] — the widget writes, the component renders.

use std::rc::Rc;

use dioxus::prelude::*;
use sitesearch_core::{ResultsContent, WidgetView};

#[derive(Clone, Copy)]
pub struct SignalView {
    pub results: Signal<ResultsContent>,
    pub open: Signal<bool>,
    pub input: Signal<Option<Rc<MountedData>>>,
}

impl WidgetView for SignalView {
    fn show(&self, content: ResultsContent) {
        let mut results = self.results;
        results.set(content);
    }

    fn set_open(&self, open: bool) {
        let mut panel = self.open;
        panel.set(open);
    }

    fn focus_input(&self) {
        // Not mounted yet: nothing to focus.
        let input: Option<Rc<MountedData>> = (*self.input.peek()).clone();
        let Some(input) = input else {
            return;
        };
        spawn(async move {
            if let Err(e) = input.set_focus(true).await {
                tracing::debug!(error = ?e, "Could not focus search input");
            }
        });
    }
}

/// Host of the page the widget is embedded in.
pub fn page_host() -> String {
    #[cfg(target_arch = "wasm32")]
    {
        if let Some(host) = web_sys::window().and_then(|w| w.location().host().ok()) {
            return host;
        }
    }
    "localhost".to_string()
}
