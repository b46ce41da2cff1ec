use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::api::FetchGateway;

use super::{ListController, ListEvent};

/// The pending search timer.
///
/// Each keystroke aborts the sleeping task and bumps `ticket`. A fire event
/// is honored only if its ticket is current and the timer is still armed, so
/// an abort that loses the race with the send still cancels the commit.
pub(super) struct SearchDebouncer {
    delay: Duration,
    ticket: u64,
    pending: Option<JoinHandle<()>>,
}

impl SearchDebouncer {
    pub(super) fn new(delay: Duration) -> Self {
        Self {
            delay,
            ticket: 0,
            pending: None,
        }
    }

    /// Disarm any pending timer.
    pub(super) fn cancel(&mut self) {
        self.ticket = self.ticket.wrapping_add(1);
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    /// Cancel the pending timer and arm a new one that reports to `tx`.
    fn rearm(&mut self, tx: mpsc::Sender<ListEvent>) {
        self.cancel();
        let ticket = self.ticket;
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(e) = tx.send(ListEvent::SearchDebounceElapsed { ticket }).await {
                tracing::warn!(error = %e, "Failed to send search debounce (receiver dropped)");
            }
        }));
    }

    /// Disarm and return true if `ticket` belongs to the armed timer.
    fn fire(&mut self, ticket: u64) -> bool {
        if ticket != self.ticket || self.pending.is_none() {
            return false;
        }
        self.pending = None;
        true
    }

    pub(super) fn is_armed(&self) -> bool {
        self.pending.is_some()
    }
}

impl<G: FetchGateway> ListController<G> {
    /// Record new search text and (re)start the debounce timer.
    pub fn on_search_input(&mut self, text: impl Into<String>) {
        self.state.set_query(text.into());
        self.debouncer.rearm(self.event_tx.clone());
        tracing::trace!(query = %self.state.query(), "Search input debounced");
        self.state.notify();
    }

    /// Clear the search field and commit the empty query immediately.
    pub fn clear_search(&mut self) {
        self.debouncer.cancel();
        self.state.set_query(String::new());
        self.commit_search();
        self.state.notify();
    }

    /// Whether a debounced search commit is waiting for its quiet period.
    pub fn search_pending(&self) -> bool {
        self.debouncer.is_armed()
    }

    pub(super) fn handle_debounce_elapsed(&mut self, ticket: u64) {
        if !self.debouncer.fire(ticket) {
            tracing::debug!(ticket, "Ignoring cancelled search debounce");
            return;
        }
        self.commit_search();
    }

    fn commit_search(&mut self) {
        tracing::debug!(query = %self.state.query(), "Committing search");
        self.state.reset_cursor();
        self.load_page(1, false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fire_requires_current_ticket() {
        let (tx, _rx) = mpsc::channel(4);
        let mut debouncer = SearchDebouncer::new(Duration::from_millis(300));

        debouncer.rearm(tx.clone());
        let first = debouncer.ticket;
        debouncer.rearm(tx);
        let second = debouncer.ticket;

        assert_ne!(first, second);
        assert!(!debouncer.fire(first));
        assert!(debouncer.is_armed());
        assert!(debouncer.fire(second));
        assert!(!debouncer.is_armed());
        // Firing twice is a no-op.
        assert!(!debouncer.fire(second));
    }

    #[tokio::test]
    async fn test_cancel_disarms() {
        let (tx, _rx) = mpsc::channel(4);
        let mut debouncer = SearchDebouncer::new(Duration::from_millis(300));
        debouncer.rearm(tx);
        let ticket = debouncer.ticket;

        debouncer.cancel();
        assert!(!debouncer.is_armed());
        assert!(!debouncer.fire(ticket));
    }

    #[tokio::test(start_paused = true)]
    async fn test_only_last_timer_reports() {
        let (tx, mut rx) = mpsc::channel(4);
        let mut debouncer = SearchDebouncer::new(Duration::from_millis(300));

        debouncer.rearm(tx.clone());
        tokio::time::sleep(Duration::from_millis(100)).await;
        debouncer.rearm(tx);
        let last = debouncer.ticket;

        let event = rx.recv().await.unwrap();
        match event {
            ListEvent::SearchDebounceElapsed { ticket } => assert_eq!(ticket, last),
            other => panic!("Expected SearchDebounceElapsed, got {}", other.name()),
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(rx.try_recv().is_err());
    }
}
