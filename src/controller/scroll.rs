use crate::api::FetchGateway;
use crate::state::ListState;

use super::ListController;

/// Position of the scrollable viewport, in any consistent unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollMetrics {
    /// Offset of the viewport's top edge from the content's top.
    pub scroll_top: f64,
    /// Full content height.
    pub scroll_height: f64,
    /// Visible viewport height.
    pub client_height: f64,
}

impl ScrollMetrics {
    /// Distance left between the viewport's bottom edge and the content end.
    pub fn remaining(&self) -> f64 {
        self.scroll_height - self.scroll_top - self.client_height
    }
}

/// Whether a scroll to `metrics` should load the next page.
pub(crate) fn should_load_more(state: &ListState, metrics: &ScrollMetrics, threshold: f64) -> bool {
    !state.is_loading() && state.has_more() && metrics.remaining() <= threshold
}

impl<G: FetchGateway> ListController<G> {
    /// Handle a scroll event; returns true if the next page was requested.
    ///
    /// `loading_more` is set before the request is spawned, so later scroll
    /// events see the busy flag until this load completes.
    pub fn on_scroll(&mut self, metrics: ScrollMetrics) -> bool {
        if !should_load_more(&self.state, &metrics, self.options.scroll_threshold) {
            return false;
        }
        let next_page = self.state.current_page().saturating_add(1);
        tracing::debug!(
            next_page,
            remaining = metrics.remaining(),
            "Scroll reached threshold, loading next page"
        );
        self.load_page(next_page, true);
        self.state.notify();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Item, Page};

    fn loaded_state(has_more: bool) -> ListState {
        let mut state = ListState::new();
        state.apply_page(
            Page {
                items: (1..=20).map(|id| Item::new(id, "v")).collect(),
                total_items: 45,
                current_page: 1,
                total_pages: 3,
                has_more,
            },
            false,
        );
        state
    }

    fn at(scroll_top: f64) -> ScrollMetrics {
        ScrollMetrics {
            scroll_top,
            scroll_height: 1000.0,
            client_height: 400.0,
        }
    }

    #[test]
    fn test_remaining_distance() {
        assert_eq!(at(100.0).remaining(), 500.0);
        assert_eq!(at(600.0).remaining(), 0.0);
    }

    #[test]
    fn test_threshold_boundary() {
        let state = loaded_state(true);
        assert!(!should_load_more(&state, &at(399.0), 200.0)); // 201 left
        assert!(should_load_more(&state, &at(400.0), 200.0)); // exactly 200
        assert!(should_load_more(&state, &at(600.0), 200.0));
    }

    #[test]
    fn test_no_load_without_more_pages() {
        let state = loaded_state(false);
        assert!(!should_load_more(&state, &at(600.0), 200.0));
    }

    #[test]
    fn test_no_load_while_busy() {
        let mut state = loaded_state(true);
        state.begin_load(true);
        assert!(!should_load_more(&state, &at(600.0), 200.0));

        state.finish_load();
        state.begin_load(false);
        assert!(!should_load_more(&state, &at(600.0), 200.0));
    }

    #[test]
    fn test_short_content_triggers_load() {
        // Content shorter than the viewport: remaining is negative.
        let state = loaded_state(true);
        let metrics = ScrollMetrics {
            scroll_top: 0.0,
            scroll_height: 100.0,
            client_height: 400.0,
        };
        assert!(should_load_more(&state, &metrics, 200.0));
    }
}
