//! List synchronization controller.
//!
//! [`ListController`] owns the [`ListState`] and is driven from a single
//! event loop. Public methods are the user-facing operations (type, scroll,
//! toggle, drag); each applies its optimistic change synchronously, spawns
//! the gateway call on a background task, and notifies observers once.
//! Completed calls come back as [`ListEvent`]s that the loop hands to
//! [`ListController::handle_event`].
//!
//! # Module Structure
//!
//! - `paginator` - `load_page` and page completion (shared by all coordinators)
//! - `search` - debounced search commits
//! - `scroll` - infinite-scroll trigger
//! - `reorder` - drag-drop move with order persist and reconciliation
//! - `selection` - optimistic selection toggle with persist
//! - `bootstrap` - settings read followed by the first page load
//! - `ledger` - last server-confirmed selection and order, used for rollback

mod bootstrap;
mod ledger;
mod paginator;
mod reorder;
mod scroll;
mod search;
mod selection;

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures::FutureExt;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::api::{ApiError, FetchGateway, MoveHint, Page, PersistAck, Settings};
use crate::config::{Config, DEFAULT_PAGE_SIZE, DEFAULT_SCROLL_THRESHOLD, DEFAULT_SEARCH_DEBOUNCE_MS};
use crate::state::ListState;

pub use scroll::ScrollMetrics;
use ledger::SyncLedger;
use search::SearchDebouncer;

/// Capacity of the completion channel.
const EVENT_CHANNEL_CAPACITY: usize = 32;

// ============================================================================
// Options
// ============================================================================

/// Tunables for the controller, usually derived from [`Config`].
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerOptions {
    pub page_size: u32,
    pub search_debounce: Duration,
    /// Remaining scroll distance at or below which the next page loads.
    pub scroll_threshold: f64,
    /// Restore the last server-confirmed state when a selection/order persist fails.
    pub rollback_on_persist_failure: bool,
    pub no_reorder: bool,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            search_debounce: Duration::from_millis(DEFAULT_SEARCH_DEBOUNCE_MS),
            scroll_threshold: DEFAULT_SCROLL_THRESHOLD,
            rollback_on_persist_failure: true,
            no_reorder: false,
        }
    }
}

impl From<&Config> for ControllerOptions {
    fn from(config: &Config) -> Self {
        Self {
            page_size: config.page_size,
            search_debounce: Duration::from_millis(config.search_debounce_ms),
            scroll_threshold: config.scroll_threshold,
            rollback_on_persist_failure: config.rollback_on_persist_failure,
            no_reorder: config.no_reorder,
        }
    }
}

// ============================================================================
// Events
// ============================================================================

/// The background call a task was running, with what its panic report needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    SettingsLoad,
    ListLoad { generation: u64 },
    SelectionPersist { request: u64 },
    OrderPersist { request: u64 },
}

impl TaskKind {
    pub fn name(&self) -> &'static str {
        match self {
            TaskKind::SettingsLoad => "settings_load",
            TaskKind::ListLoad { .. } => "list_load",
            TaskKind::SelectionPersist { .. } => "selection_persist",
            TaskKind::OrderPersist { .. } => "order_persist",
        }
    }
}

/// Completion events from background tasks.
pub enum ListEvent {
    /// Settings read finished (bootstrap).
    SettingsLoaded(Result<Settings, ApiError>),
    /// A list query finished.
    ///
    /// Fields:
    /// - `generation`: list generation when the load was spawned (stale detection)
    /// - `page`: the page number that was requested
    /// - `append`: whether the result extends or replaces the list
    PageLoaded {
        generation: u64,
        page: u32,
        append: bool,
        result: Result<Page, ApiError>,
    },
    /// The search debounce timer survived its quiet period.
    SearchDebounceElapsed { ticket: u64 },
    /// Selection persist finished.
    ///
    /// `ids` is the sorted set that was sent; it becomes the confirmed
    /// selection on success. `id` is the toggled item.
    SelectionPersisted {
        request: u64,
        id: i64,
        ids: Vec<i64>,
        result: Result<PersistAck, ApiError>,
    },
    /// Order persist finished. `order` is the id order that was sent.
    OrderPersisted {
        request: u64,
        order: Vec<i64>,
        hint: MoveHint,
        result: Result<PersistAck, ApiError>,
    },
    /// A background task panicked before reporting.
    TaskPanicked { task: TaskKind, error: String },
}

impl ListEvent {
    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            ListEvent::SettingsLoaded(_) => "SettingsLoaded",
            ListEvent::PageLoaded { .. } => "PageLoaded",
            ListEvent::SearchDebounceElapsed { .. } => "SearchDebounceElapsed",
            ListEvent::SelectionPersisted { .. } => "SelectionPersisted",
            ListEvent::OrderPersisted { .. } => "OrderPersisted",
            ListEvent::TaskPanicked { .. } => "TaskPanicked",
        }
    }
}

// ============================================================================
// Controller
// ============================================================================

pub struct ListController<G: FetchGateway> {
    gateway: G,
    options: ControllerOptions,
    state: ListState,
    event_tx: mpsc::Sender<ListEvent>,

    /// Bumped by every replace load. Responses carrying an older generation
    /// are discarded.
    list_generation: u64,
    /// Handle of the outstanding list load, aborted when superseded.
    list_handle: Option<JoinHandle<()>>,

    debouncer: SearchDebouncer,

    /// Selection persists and the last set the server accepted.
    selection_sync: SyncLedger<Vec<i64>>,
    /// Order persists and the last id order the server accepted or served.
    order_sync: SyncLedger<Vec<i64>>,
}

impl<G: FetchGateway> ListController<G> {
    /// Create a controller and the receiver its background tasks report to.
    ///
    /// The caller's event loop must forward every received event to
    /// [`handle_event`](Self::handle_event).
    pub fn new(gateway: G, options: ControllerOptions) -> (Self, mpsc::Receiver<ListEvent>) {
        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let debouncer = SearchDebouncer::new(options.search_debounce);
        let controller = Self {
            gateway,
            options,
            state: ListState::new(),
            event_tx,
            list_generation: 0,
            list_handle: None,
            debouncer,
            selection_sync: SyncLedger::new(Vec::new()),
            order_sync: SyncLedger::new(Vec::new()),
        };
        (controller, event_rx)
    }

    pub fn state(&self) -> &ListState {
        &self.state
    }

    pub fn options(&self) -> &ControllerOptions {
        &self.options
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.state.subscribe()
    }

    /// Apply a background completion, then notify observers once.
    pub fn handle_event(&mut self, event: ListEvent) {
        tracing::trace!(event = event.name(), "Handling list event");
        match event {
            ListEvent::SettingsLoaded(result) => self.handle_settings_loaded(result),
            ListEvent::PageLoaded {
                generation,
                page,
                append,
                result,
            } => self.handle_page_loaded(generation, page, append, result),
            ListEvent::SearchDebounceElapsed { ticket } => self.handle_debounce_elapsed(ticket),
            ListEvent::SelectionPersisted {
                request,
                id,
                ids,
                result,
            } => self.handle_selection_persisted(request, id, ids, result),
            ListEvent::OrderPersisted {
                request,
                order,
                hint,
                result,
            } => self.handle_order_persisted(request, order, hint, result),
            ListEvent::TaskPanicked { task, error } => self.handle_task_panicked(task, &error),
        }
        self.state.notify();
    }

    /// Re-issue a fresh load of page 1 with the current query.
    pub fn reload(&mut self) {
        tracing::info!(query = %self.state.query(), "Reloading list");
        self.state.reset_cursor();
        self.load_page(1, false);
        self.state.notify();
    }

    /// Hide the current sync notice, if any.
    pub fn dismiss_notice(&mut self) {
        if self.state.dismiss_notice() {
            self.state.notify();
        }
    }

    /// A panicked task never sends its completion; recover as if it had
    /// failed.
    fn handle_task_panicked(&mut self, task: TaskKind, error: &str) {
        tracing::error!(task = task.name(), error, "Background task panicked");
        let reason = format!("internal error ({})", error);
        match task {
            TaskKind::SettingsLoad => self.settings_failed(&reason),
            TaskKind::ListLoad { generation } => {
                if generation != self.list_generation {
                    tracing::debug!(
                        expected = self.list_generation,
                        got = generation,
                        "Ignoring panic from a superseded list load"
                    );
                    return;
                }
                self.list_handle = None;
                self.state.finish_load();
                self.state
                    .set_error(format!("Failed to load items: {}", reason));
            }
            TaskKind::SelectionPersist { request } => self.selection_failed(request, &reason),
            TaskKind::OrderPersist { request } => self.order_failed(request, None, &reason),
        }
    }

    /// Spawn a gateway call whose outcome is delivered as a [`ListEvent`].
    ///
    /// Panics inside `request` are caught and reported as
    /// [`ListEvent::TaskPanicked`].
    fn spawn_request<F>(&self, task: TaskKind, request: F) -> JoinHandle<()>
    where
        F: Future<Output = ListEvent> + Send + 'static,
    {
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let event = match catch_task_panic(request).await {
                Ok(event) => event,
                Err(panic_msg) => ListEvent::TaskPanicked {
                    task,
                    error: panic_msg,
                },
            };
            if let Err(e) = tx.send(event).await {
                tracing::warn!(task = task.name(), error = %e, "Channel send failed (receiver dropped)");
            }
        })
    }
}

impl<G: FetchGateway> Drop for ListController<G> {
    fn drop(&mut self) {
        if let Some(handle) = self.list_handle.take() {
            handle.abort();
        }
        self.debouncer.cancel();
    }
}

/// Wrap a future so a panic becomes `Err(message)` instead of silently
/// ending the task.
async fn catch_task_panic<F, T>(future: F) -> Result<T, String>
where
    F: Future<Output = T>,
{
    AssertUnwindSafe(future)
        .catch_unwind()
        .await
        .map_err(|panic| panic_message(panic.as_ref()))
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

/// Format a persist outcome as a failure reason, or `None` on success.
fn persist_failure(result: &Result<PersistAck, ApiError>) -> Option<String> {
    match result {
        Ok(ack) if ack.success => None,
        Ok(_) => Some("server reported failure".to_string()),
        Err(e) => Some(e.to_string()),
    }
}
