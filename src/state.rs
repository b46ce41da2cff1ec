//! The local view of the remote collection.
//!
//! [`ListState`] is the single piece of mutable state shared by every list
//! coordinator. Readers (the renderer, tests) use the public getters; writes
//! are `pub(crate)` and only reachable through
//! [`ListController`](crate::controller::ListController).
//!
//! Observers call [`ListState::subscribe`] and are woken once per completed
//! controller step via a `tokio::sync::watch` revision counter.

use std::collections::{HashMap, HashSet};

use tokio::sync::watch;

use crate::api::{Item, Page};

// ============================================================================
// Sync Notices
// ============================================================================

/// Which background sync produced a [`SyncNotice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// Selection could not be saved.
    Selection,
    /// Order could not be saved.
    Order,
    /// Settings could not be read at startup.
    Settings,
}

/// Non-blocking notice that local state diverged from (or could not be
/// seeded from) the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncNotice {
    pub kind: NoticeKind,
    pub message: String,
}

// ============================================================================
// List State
// ============================================================================

pub struct ListState {
    items: Vec<Item>,
    /// May hold ids that are not loaded yet (seeded from settings).
    selected_ids: HashSet<i64>,
    current_page: u32,
    total_items: u64,
    has_more: bool,
    query: String,
    loading_initial: bool,
    loading_more: bool,
    /// Presentation only; never read by the reorder algorithm.
    active_drag_item: Option<Item>,
    error: Option<String>,
    sync_notice: Option<SyncNotice>,
    revision: watch::Sender<u64>,
}

impl Default for ListState {
    fn default() -> Self {
        Self::new()
    }
}

impl ListState {
    pub fn new() -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            items: Vec::new(),
            selected_ids: HashSet::new(),
            current_page: 1,
            total_items: 0,
            has_more: true,
            query: String::new(),
            loading_initial: false,
            loading_more: false,
            active_drag_item: None,
            error: None,
            sync_notice: None,
            revision,
        }
    }

    // ========================================================================
    // Observation
    // ========================================================================

    /// Subscribe to change notifications.
    ///
    /// The receiver sees the latest revision number; intermediate revisions
    /// may be coalesced if the observer is slow.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    /// Publish one change notification. Called once per completed step.
    pub(crate) fn notify(&self) {
        self.revision.send_modify(|rev| *rev = rev.wrapping_add(1));
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn item_ids(&self) -> Vec<i64> {
        self.items.iter().map(|item| item.id).collect()
    }

    pub fn index_of(&self, id: i64) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }

    pub fn selected_ids(&self) -> &HashSet<i64> {
        &self.selected_ids
    }

    pub fn is_selected(&self, id: i64) -> bool {
        self.selected_ids.contains(&id)
    }

    /// Selected ids in ascending order, the form sent to the server.
    pub fn sorted_selection(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = self.selected_ids.iter().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn total_items(&self) -> u64 {
        self.total_items
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn loading_initial(&self) -> bool {
        self.loading_initial
    }

    pub fn loading_more(&self) -> bool {
        self.loading_more
    }

    pub fn is_loading(&self) -> bool {
        self.loading_initial || self.loading_more
    }

    pub fn active_drag_item(&self) -> Option<&Item> {
        self.active_drag_item.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn sync_notice(&self) -> Option<&SyncNotice> {
        self.sync_notice.as_ref()
    }

    // ========================================================================
    // Pagination
    // ========================================================================

    pub(crate) fn set_query(&mut self, query: String) {
        self.query = query;
    }

    pub(crate) fn reset_cursor(&mut self) {
        self.current_page = 1;
    }

    /// Mark a load as started. Clears the error banner.
    pub(crate) fn begin_load(&mut self, append: bool) {
        if append {
            self.loading_more = true;
        } else {
            self.loading_initial = true;
            // A replace load supersedes any outstanding append.
            self.loading_more = false;
        }
        self.error = None;
    }

    pub(crate) fn finish_load(&mut self) {
        self.loading_initial = false;
        self.loading_more = false;
    }

    /// Apply a page response: replace or append items, then overwrite the
    /// cursor from the response.
    ///
    /// Incoming items are marked selected by membership in the selection set.
    /// Ids already present are skipped. Returns the number of items added.
    pub(crate) fn apply_page(&mut self, page: Page, append: bool) -> usize {
        let Page {
            items,
            total_items,
            current_page,
            has_more,
            ..
        } = page;

        if !append {
            self.items.clear();
        }

        let mut seen: HashSet<i64> = self.items.iter().map(|item| item.id).collect();
        let before = self.items.len();
        self.items.reserve(items.len());
        for mut item in items {
            if !seen.insert(item.id) {
                tracing::debug!(id = item.id, "Skipping duplicate item in page");
                continue;
            }
            item.selected = self.selected_ids.contains(&item.id);
            self.items.push(item);
        }

        self.current_page = current_page;
        self.total_items = total_items;
        self.has_more = has_more;
        self.items.len() - before
    }

    pub(crate) fn set_error(&mut self, message: String) {
        self.error = Some(message);
    }

    // ========================================================================
    // Selection
    // ========================================================================

    /// Replace the selection set and re-flag loaded items to match.
    pub(crate) fn replace_selection(&mut self, ids: impl IntoIterator<Item = i64>) {
        self.selected_ids = ids.into_iter().collect();
        for item in &mut self.items {
            item.selected = self.selected_ids.contains(&item.id);
        }
    }

    /// Flip membership of `id` and the matching item's flag together.
    /// Returns the new membership.
    pub(crate) fn toggle_selection(&mut self, id: i64) -> bool {
        let now_selected = !self.selected_ids.contains(&id);
        self.set_selected(id, now_selected);
        now_selected
    }

    pub(crate) fn set_selected(&mut self, id: i64, selected: bool) {
        if selected {
            self.selected_ids.insert(id);
        } else {
            self.selected_ids.remove(&id);
        }
        if let Some(item) = self.items.iter_mut().find(|item| item.id == id) {
            item.selected = selected;
        }
    }

    // ========================================================================
    // Ordering
    // ========================================================================

    /// Move the item `from_id` to the index currently held by `to_id`.
    ///
    /// Returns the `(from, to)` indices, or `None` (no change) if either id is
    /// not loaded or both are the same item.
    pub(crate) fn move_item(&mut self, from_id: i64, to_id: i64) -> Option<(usize, usize)> {
        let from = self.index_of(from_id)?;
        let to = self.index_of(to_id)?;
        if from == to {
            return None;
        }
        move_element(&mut self.items, from, to);
        Some((from, to))
    }

    /// Reorder loaded items to follow `order`.
    ///
    /// Items not named in `order` (loaded after the snapshot was taken) keep
    /// their relative order after the named ones.
    pub(crate) fn restore_order(&mut self, order: &[i64]) {
        let rank: HashMap<i64, usize> = order
            .iter()
            .enumerate()
            .map(|(idx, id)| (*id, idx))
            .collect();
        // Stable sort keeps unnamed items in their current relative order.
        self.items
            .sort_by_key(|item| rank.get(&item.id).copied().unwrap_or(usize::MAX));
    }

    pub(crate) fn set_active_drag(&mut self, item: Option<Item>) {
        self.active_drag_item = item;
    }

    // ========================================================================
    // Notices
    // ========================================================================

    pub(crate) fn raise_notice(&mut self, kind: NoticeKind, message: String) {
        self.sync_notice = Some(SyncNotice { kind, message });
    }

    pub(crate) fn dismiss_notice(&mut self) -> bool {
        self.sync_notice.take().is_some()
    }
}

/// Remove the element at `from` and reinsert it at `to`; everything in
/// between shifts by one. Not a swap.
pub fn move_element<T>(items: &mut Vec<T>, from: usize, to: usize) {
    if from == to || from >= items.len() || to >= items.len() {
        return;
    }
    let moved = items.remove(from);
    items.insert(to, moved);
}
