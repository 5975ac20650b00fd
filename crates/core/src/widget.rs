//! The search widget: input handling, multi-collection fan-out, rendering,
//! and panel open/close state.
//!
//! The widget owns no DOM. Everything visible goes through a [`WidgetView`],
//! and the current state is kept as an explicit [`WidgetState`] so the query
//! cycle can be driven and inspected without a page.

use std::cell::{Cell, RefCell};

use futures::future::join_all;
use tracing::{debug, warn};

use crate::render::render_content;
use crate::source::ContentSource;
use crate::types::*;

/// DOM seam. A view missing one of the page handles leaves the matching
/// method at its default, which does nothing.
pub trait WidgetView {
    /// Replace the results container content.
    fn show(&self, _content: ResultsContent) {}

    /// Add or remove the `open` class on the results panel.
    fn set_open(&self, _open: bool) {}

    /// Move keyboard focus to the search input.
    fn focus_input(&self) {}
}

/// Headless view.
impl WidgetView for () {}

pub struct SearchWidget<S, V> {
    config: SearchConfig,
    source: S,
    view: V,
    state: RefCell<WidgetState>,
    /// Bumped on every input event; results from older generations are dropped.
    generation: Cell<u64>,
}

impl<S: ContentSource, V: WidgetView> SearchWidget<S, V> {
    pub fn new(config: SearchConfig, source: S, view: V) -> Self {
        Self {
            config,
            source,
            view,
            state: RefCell::new(WidgetState::default()),
            generation: Cell::new(0),
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> WidgetState {
        self.state.borrow().clone()
    }

    fn next_generation(&self) -> u64 {
        let generation = self.generation.get() + 1;
        self.generation.set(generation);
        generation
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.get() == generation
    }

    // -----------------------------------------------------------------------
    // Input
    // -----------------------------------------------------------------------

    /// Entry point for every input-change event.
    ///
    /// Empty text clears the results container without issuing a request.
    pub async fn handle_input(&self, text: &str) {
        if text.is_empty() {
            self.clear();
        } else {
            self.run_query(text).await;
        }
    }

    /// Empty the results container and supersede any in-flight query.
    pub fn clear(&self) {
        self.next_generation();
        {
            let mut state = self.state.borrow_mut();
            state.query.clear();
            state.phase = Phase::Cleared;
            state.rendered_count = 0;
        }
        self.view.show(ResultsContent::Cleared);
    }

    // -----------------------------------------------------------------------
    // Query cycle
    // -----------------------------------------------------------------------

    /// Fetch one collection. Failures show "Search error!", are logged, and
    /// yield an empty list.
    pub async fn fetch_collection(&self, content_type: &str, query: &str) -> Vec<ContentItem> {
        self.fetch_for(self.generation.get(), content_type, query).await
    }

    async fn fetch_for(&self, generation: u64, content_type: &str, query: &str) -> Vec<ContentItem> {
        match self.source.search(content_type, query).await {
            Ok(items) => items,
            Err(e) => {
                warn!(content_type, error = %e, "Search request failed");
                if self.is_current(generation) {
                    self.state.borrow_mut().phase = Phase::Errored;
                    self.view.show(ResultsContent::message(StatusMessage::Error));
                }
                Vec::new()
            }
        }
    }

    /// Search every configured collection concurrently and render the merged hits.
    ///
    /// An empty merged list leaves whatever status message is showing in place.
    pub async fn run_query(&self, query: &str) {
        let generation = self.next_generation();
        {
            let mut state = self.state.borrow_mut();
            state.query = query.to_string();
            state.phase = Phase::Searching;
        }
        self.view.show(ResultsContent::message(StatusMessage::Searching));

        let fetches = self
            .config
            .content_types
            .iter()
            .map(|content_type| self.fetch_for(generation, content_type, query));
        let collections = join_all(fetches).await;

        if !self.is_current(generation) {
            debug!(query, "Discarding results of a superseded query");
            return;
        }

        let combined: Vec<ContentItem> = collections.into_iter().flatten().collect();
        if combined.is_empty() {
            debug!(query, "No items fetched");
            return;
        }
        self.render(&combined, query);
    }

    /// Filter, truncate and highlight `items` into the results container.
    pub fn render(&self, items: &[ContentItem], query: &str) {
        let content = render_content(items, query, self.config.max_results, self.config.escape_titles);
        let count = match &content {
            ResultsContent::Entries { entries } => entries.len(),
            _ => 0,
        };
        debug!(query, fetched = items.len(), rendered = count, "Rendering results");
        {
            let mut state = self.state.borrow_mut();
            state.phase = Phase::Rendered;
            state.rendered_count = count;
        }
        self.view.show(content);
    }

    // -----------------------------------------------------------------------
    // Panel
    // -----------------------------------------------------------------------

    /// Toggle-button click: flip the panel and focus the input.
    pub fn toggle(&self) {
        let open = {
            let mut state = self.state.borrow_mut();
            state.open = !state.open;
            state.open
        };
        self.view.set_open(open);
        self.view.focus_input();
    }

    /// Page click. Only clicks outside both the panel and the toggle close it.
    pub fn dismiss(&self, target: ClickTarget) {
        if target != ClickTarget::Outside {
            return;
        }
        self.state.borrow_mut().open = false;
        self.view.set_open(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use futures::channel::oneshot;
    use futures::executor::block_on;
    use std::collections::HashMap;
    use std::future::Future;
    use std::pin::Pin;
    use std::task::{Context, Poll};

    #[derive(Default)]
    struct RecordingView {
        shown: RefCell<Vec<ResultsContent>>,
        open: Cell<bool>,
        focused: Cell<usize>,
    }

    impl RecordingView {
        fn last(&self) -> ResultsContent {
            self.shown.borrow().last().cloned().unwrap_or_default()
        }
    }

    impl WidgetView for RecordingView {
        fn show(&self, content: ResultsContent) {
            self.shown.borrow_mut().push(content);
        }

        fn set_open(&self, open: bool) {
            self.open.set(open);
        }

        fn focus_input(&self) {
            self.focused.set(self.focused.get() + 1);
        }
    }

    /// Returns Pending once so sibling futures get polled in between.
    struct YieldOnce(bool);

    impl Future for YieldOnce {
        type Output = ();

        fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
            if self.0 {
                Poll::Ready(())
            } else {
                self.0 = true;
                cx.waker().wake_by_ref();
                Poll::Pending
            }
        }
    }

    /// Canned per-collection answers; `None` means the request fails.
    #[derive(Default)]
    struct StubSource {
        answers: HashMap<String, Option<Vec<ContentItem>>>,
        log: RefCell<Vec<String>>,
    }

    impl StubSource {
        fn with(mut self, content_type: &str, answer: Option<Vec<ContentItem>>) -> Self {
            self.answers.insert(content_type.to_string(), answer);
            self
        }
    }

    impl ContentSource for StubSource {
        async fn search(&self, content_type: &str, _query: &str) -> Result<Vec<ContentItem>, FetchError> {
            self.log.borrow_mut().push(format!("start {content_type}"));
            YieldOnce(false).await;
            self.log.borrow_mut().push(format!("end {content_type}"));
            match self.answers.get(content_type) {
                Some(Some(items)) => Ok(items.clone()),
                _ => Err(FetchError::Status { url: format!("/{content_type}/"), status: 500 }),
            }
        }
    }

    fn config(types: &[&str], max_results: usize) -> SearchConfig {
        SearchConfig {
            base_url: "https://example.test/wp-json/wp/v2".into(),
            content_types: types.iter().map(|t| t.to_string()).collect(),
            max_results,
            escape_titles: false,
        }
    }

    fn animals() -> Vec<ContentItem> {
        vec![ContentItem::new("/a", "Cats are great"), ContentItem::new("/b", "Dogs rule")]
    }

    #[test]
    fn fans_out_one_concurrent_request_per_collection() {
        let source = StubSource::default()
            .with("posts", Some(vec![ContentItem::new("/p", "Cat post")]))
            .with("pages", Some(vec![ContentItem::new("/g", "Cat page")]));
        let widget = SearchWidget::new(config(&["posts", "pages"], 6), source, RecordingView::default());

        block_on(widget.run_query("cat"));

        assert_eq!(
            *widget.source.log.borrow(),
            vec!["start posts", "start pages", "end posts", "end pages"]
        );
        match widget.view().last() {
            ResultsContent::Entries { entries } => {
                let links: Vec<&str> = entries.iter().map(|e| e.link.as_str()).collect();
                assert_eq!(links, vec!["/p", "/g"]);
            }
            other => panic!("expected entries, got {other:?}"),
        }
        assert_eq!(widget.state().phase, Phase::Rendered);
        assert_eq!(widget.state().rendered_count, 2);
    }

    #[test]
    fn every_collection_failing_shows_the_error_message() {
        let source = StubSource::default().with("posts", None).with("pages", None);
        let widget = SearchWidget::new(config(&["posts", "pages"], 6), source, RecordingView::default());

        block_on(widget.run_query("cat"));

        assert_eq!(widget.view().last(), ResultsContent::message(StatusMessage::Error));
        assert_eq!(widget.state().phase, Phase::Errored);
    }

    #[test]
    fn empty_combined_result_keeps_the_searching_message() {
        let source = StubSource::default().with("posts", Some(vec![]));
        let widget = SearchWidget::new(config(&["posts"], 6), source, RecordingView::default());

        block_on(widget.run_query("cat"));

        assert_eq!(widget.view().last(), ResultsContent::message(StatusMessage::Searching));
        assert_eq!(widget.state().phase, Phase::Searching);
    }

    #[test]
    fn one_failing_collection_does_not_block_the_others() {
        let source = StubSource::default().with("posts", None).with("pages", Some(animals()));
        let widget = SearchWidget::new(config(&["posts", "pages"], 6), source, RecordingView::default());

        block_on(widget.run_query("cat"));

        let shown = widget.view().shown.borrow().clone();
        assert_eq!(shown[0], ResultsContent::message(StatusMessage::Searching));
        assert_eq!(shown[1], ResultsContent::message(StatusMessage::Error));
        assert!(matches!(&shown[2], ResultsContent::Entries { entries } if entries.len() == 1));
    }

    #[test]
    fn fetch_collection_absorbs_failures() {
        let widget = SearchWidget::new(config(&["posts"], 6), StubSource::default(), RecordingView::default());
        let items = block_on(widget.fetch_collection("missing", "cat"));
        assert!(items.is_empty());
        assert_eq!(widget.view().last(), ResultsContent::message(StatusMessage::Error));
    }

    #[test]
    fn render_highlights_the_single_match() {
        let widget = SearchWidget::new(config(&["posts"], 6), StubSource::default(), RecordingView::default());
        widget.render(&animals(), "cat");
        assert_eq!(
            widget.view().last().to_html(),
            "<div class=\"wp-search-item\"><a target=\"_blank\" href=\"/a\">\
             <b style=\"color: red;\">Cat</b>s are great</a></div>"
        );
    }

    #[test]
    fn render_caps_at_max_results() {
        let items: Vec<ContentItem> =
            (1..=5).map(|i| ContentItem::new(format!("/{i}"), format!("Match {i}"))).collect();
        let widget = SearchWidget::new(config(&["posts"], 2), StubSource::default(), RecordingView::default());
        widget.render(&items, "match");
        assert_eq!(widget.state().rendered_count, 2);
        match widget.view().last() {
            ResultsContent::Entries { entries } => {
                assert_eq!(entries[0].link, "/1");
                assert_eq!(entries[1].link, "/2");
            }
            other => panic!("expected entries, got {other:?}"),
        }
    }

    #[test]
    fn clearing_the_input_empties_the_container_without_a_request() {
        let source = StubSource::default().with("posts", Some(animals()));
        let widget = SearchWidget::new(config(&["posts"], 6), source, RecordingView::default());

        block_on(widget.handle_input("cat"));
        block_on(widget.handle_input(""));

        assert_eq!(widget.view().last(), ResultsContent::Cleared);
        assert_eq!(widget.state().phase, Phase::Cleared);
        assert_eq!(widget.source.log.borrow().len(), 2);
    }

    #[test]
    fn toggle_then_outside_click_closes_the_panel() {
        let widget = SearchWidget::new(config(&["posts"], 6), StubSource::default(), RecordingView::default());

        widget.toggle();
        assert!(widget.state().open);
        assert!(widget.view().open.get());
        assert_eq!(widget.view().focused.get(), 1);

        widget.dismiss(ClickTarget::Toggle);
        widget.dismiss(ClickTarget::Panel);
        assert!(widget.state().open);

        widget.dismiss(ClickTarget::Outside);
        assert!(!widget.state().open);
        assert!(!widget.view().open.get());
    }

    #[test]
    fn page_click_away_from_the_widget_closes_the_open_panel() {
        let widget = SearchWidget::new(config(&["posts"], 6), StubSource::default(), RecordingView::default());
        widget.toggle();

        widget.dismiss(ClickTarget::classify(true, false));
        widget.dismiss(ClickTarget::classify(false, true));
        assert!(widget.state().open);

        widget.dismiss(ClickTarget::classify(false, false));
        assert!(!widget.state().open);
        assert!(!widget.view().open.get());
    }

    #[test]
    fn dismissing_keeps_results_and_query() {
        let source = StubSource::default().with("posts", Some(animals()));
        let widget = SearchWidget::new(config(&["posts"], 6), source, RecordingView::default());
        widget.toggle();
        block_on(widget.handle_input("dog"));

        widget.dismiss(ClickTarget::Outside);

        assert_eq!(widget.state().query, "dog");
        assert_eq!(widget.state().rendered_count, 1);
    }

    #[test]
    fn toggle_twice_restores_closed() {
        let widget = SearchWidget::new(config(&["posts"], 6), StubSource::default(), ());
        widget.toggle();
        widget.toggle();
        assert!(!widget.state().open);
    }

    /// Holds back answers for `slow_query` until the gate opens.
    struct GatedSource {
        slow_query: &'static str,
        gate: RefCell<Option<oneshot::Receiver<()>>>,
        slow_fails: bool,
    }

    impl GatedSource {
        fn new(slow_query: &'static str, gate: oneshot::Receiver<()>) -> Self {
            Self { slow_query, gate: RefCell::new(Some(gate)), slow_fails: false }
        }

        fn failing(mut self) -> Self {
            self.slow_fails = true;
            self
        }
    }

    impl ContentSource for GatedSource {
        async fn search(&self, _content_type: &str, query: &str) -> Result<Vec<ContentItem>, FetchError> {
            if query == self.slow_query {
                let gate = self.gate.borrow_mut().take();
                if let Some(gate) = gate {
                    let _ = gate.await;
                }
                if self.slow_fails {
                    return Err(FetchError::Status { url: "/posts/".into(), status: 502 });
                }
            }
            Ok(vec![ContentItem::new("/ca", "Cable news"), ContentItem::new("/cat", "Cat facts")])
        }
    }

    #[test]
    fn late_answer_for_a_superseded_query_is_discarded() {
        let (tx, rx) = oneshot::channel();
        let source = GatedSource::new("ca", rx);
        let widget = SearchWidget::new(config(&["posts"], 6), source, RecordingView::default());
        let w = &widget;

        block_on(async move {
            let slow = w.handle_input("ca");
            let fast = async move {
                w.handle_input("cat").await;
                let _ = tx.send(());
            };
            futures::join!(slow, fast);
        });

        assert_eq!(widget.state().query, "cat");
        match widget.view().last() {
            ResultsContent::Entries { entries } => {
                assert_eq!(entries.len(), 1);
                assert_eq!(entries[0].link, "/cat");
            }
            other => panic!("expected entries, got {other:?}"),
        }
    }

    #[test]
    fn clearing_the_input_supersedes_a_pending_query() {
        let (tx, rx) = oneshot::channel();
        let widget = SearchWidget::new(config(&["posts"], 6), GatedSource::new("ca", rx), RecordingView::default());
        let w = &widget;

        block_on(async move {
            let slow = w.handle_input("ca");
            let clear = async move {
                w.handle_input("").await;
                let _ = tx.send(());
            };
            futures::join!(slow, clear);
        });

        assert_eq!(widget.view().last(), ResultsContent::Cleared);
        assert_eq!(widget.state().phase, Phase::Cleared);
        assert_eq!(widget.state().rendered_count, 0);
    }

    #[test]
    fn late_failure_for_a_superseded_query_does_not_show_an_error() {
        let (tx, rx) = oneshot::channel();
        let source = GatedSource::new("ca", rx).failing();
        let widget = SearchWidget::new(config(&["posts"], 6), source, RecordingView::default());
        let w = &widget;

        block_on(async move {
            let slow = w.handle_input("ca");
            let fast = async move {
                w.handle_input("cat").await;
                let _ = tx.send(());
            };
            futures::join!(slow, fast);
        });

        assert!(!widget.view().shown.borrow().contains(&ResultsContent::message(StatusMessage::Error)));
        assert_eq!(widget.state().phase, Phase::Rendered);
        assert!(matches!(widget.view().last(), ResultsContent::Entries { entries } if entries[0].link == "/cat"));
    }
}
