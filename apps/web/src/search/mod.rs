//! Search overlay — toggle button, panel with the input, results container.

#[cfg(target_arch = "wasm32")]
mod outside;
mod view;

use std::cell::RefCell;
use std::rc::Rc;

use dioxus::prelude::*;
use sitesearch_core::types::{ClickTarget, SearchOverrides};
use sitesearch_core::{HttpContentSource, ResultsContent, SearchConfig, SearchWidget};

use view::{page_host, SignalView};

type Widget = Rc<SearchWidget<HttpContentSource, SignalView>>;

/// The whole widget. In the browser a document click listener closes the
/// panel on any click outside it and the toggle; it is removed when the
/// component unmounts. Other renderers only see clicks inside the component
/// root, which the root handler dismisses.
#[component]
pub fn SearchBox(#[props(default)] overrides: SearchOverrides) -> Element {
    let results = use_signal(ResultsContent::default);
    let open = use_signal(|| false);
    let input = use_signal(|| None);

    let widget: Widget = use_hook(move || {
        let config = SearchConfig::resolve(&page_host(), &overrides);
        tracing::info!(base_url = config.base_url.as_str(), types = ?config.content_types, "Search widget ready");
        let source = HttpContentSource::new(&config.base_url);
        Rc::new(SearchWidget::new(config, source, SignalView { results, open, input }))
    });

    let page_clicks = use_hook({
        let widget = widget.clone();
        move || Rc::new(RefCell::new(listen_for_page_clicks(widget)))
    });
    use_drop(move || {
        page_clicks.borrow_mut().take();
    });

    let html = results.read().to_html();
    let is_open = *open.read();

    let on_outside = widget.clone();
    let on_toggle = widget.clone();
    let on_panel = widget.clone();
    let on_input = widget;

    rsx! {
        div {
            class: "wp-search",
            onclick: move |_| on_outside.dismiss(ClickTarget::Outside),

            button {
                id: "wp-search-button",
                class: "wp-search-button",
                r#type: "button",
                onclick: move |evt| {
                    evt.stop_propagation();
                    on_toggle.toggle();
                },
                "Search"
            }

            div {
                id: "wp-search-body",
                class: if is_open { "wp-search-body open" } else { "wp-search-body" },
                onclick: move |evt| {
                    evt.stop_propagation();
                    on_panel.dismiss(ClickTarget::Panel);
                },

                input {
                    id: "wp-search-input",
                    class: "wp-search-input",
                    r#type: "text",
                    placeholder: "Search...",
                    onmounted: move |e: MountedEvent| {
                        let mut input = input;
                        input.set(Some(e.data()));
                    },
                    oninput: move |e: Event<FormData>| {
                        let value = e.value();
                        let widget = on_input.clone();
                        spawn(async move {
                            widget.handle_input(&value).await;
                        });
                    },
                }

                div {
                    id: "wp-search-results",
                    class: "wp-search-results",
                    // Titles are trusted, pre-sanitized markup from the content API.
                    dangerous_inner_html: "{html}",
                }
            }
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn listen_for_page_clicks(widget: Widget) -> Option<outside::DocumentClickListener> {
    outside::DocumentClickListener::install(move |target| widget.dismiss(target))
}

#[cfg(not(target_arch = "wasm32"))]
fn listen_for_page_clicks(_widget: Widget) -> Option<()> {
    None
}
