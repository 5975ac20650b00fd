//! Document-level click listener for closing the panel on page clicks.

use sitesearch_core::types::ClickTarget;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event};

const TOGGLE_SELECTOR: &str = "#wp-search-button";
const PANEL_SELECTOR: &str = "#wp-search-body";

/// A `click` listener on the page document. Dropping it removes the listener.
pub struct DocumentClickListener {
    document: Document,
    callback: Closure<dyn FnMut(Event)>,
}

impl DocumentClickListener {
    pub fn install(on_click: impl Fn(ClickTarget) + 'static) -> Option<Self> {
        let document = web_sys::window()?.document()?;
        let callback = Closure::<dyn FnMut(Event)>::new(move |event: Event| on_click(classify(&event)));

        if let Err(e) = document.add_event_listener_with_callback("click", callback.as_ref().unchecked_ref()) {
            tracing::warn!(error = ?e, "Could not listen for page clicks");
            return None;
        }
        Some(Self { document, callback })
    }
}

impl Drop for DocumentClickListener {
    fn drop(&mut self) {
        if let Err(e) = self
            .document
            .remove_event_listener_with_callback("click", self.callback.as_ref().unchecked_ref())
        {
            tracing::debug!(error = ?e, "Could not remove page click listener");
        }
    }
}

fn classify(event: &Event) -> ClickTarget {
    let Some(target) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
        return ClickTarget::Outside;
    };
    let within = |selector: &str| matches!(target.closest(selector), Ok(Some(_)));
    ClickTarget::classify(within(TOGGLE_SELECTOR), within(PANEL_SELECTOR))
}
