use crate::api::{ApiError, FetchGateway, MoveHint, PersistAck};
use crate::state::NoticeKind;

use super::{persist_failure, ListController, ListEvent, TaskKind};

impl<G: FetchGateway> ListController<G> {
    /// A drag gesture picked up `id`.
    pub fn drag_start(&mut self, id: i64) {
        let item = self.state.items().iter().find(|item| item.id == id).cloned();
        if item.is_none() {
            tracing::debug!(id, "Drag started on an item that is not loaded");
        }
        self.state.set_active_drag(item);
        self.state.notify();
    }

    /// The drag gesture was abandoned without a drop.
    pub fn drag_cancel(&mut self) {
        self.state.set_active_drag(None);
        self.state.notify();
    }

    /// A drag gesture ended. `source` is the dragged id, `target` the id
    /// it was dropped on; either may be unresolved.
    ///
    /// Returns true if the list was reordered. The drag item is cleared in
    /// every case.
    pub fn drag_end(&mut self, source: Option<i64>, target: Option<i64>) -> bool {
        let moved = match (source, target) {
            (Some(from_id), Some(to_id)) => self.apply_move(from_id, to_id),
            _ => false,
        };
        self.state.set_active_drag(None);
        self.state.notify();
        moved
    }

    /// Move optimistically and persist the full new order.
    fn apply_move(&mut self, from_id: i64, to_id: i64) -> bool {
        let Some((from, to)) = self.state.move_item(from_id, to_id) else {
            tracing::debug!(from_id, to_id, "Drop ignored (item missing or same position)");
            return false;
        };

        let order = self.state.item_ids();
        let hint = MoveHint { from_id, to_id };
        let request = self.order_sync.begin();
        tracing::info!(from_id, to_id, from, to, request, "Moving item");

        let gateway = self.gateway.clone();
        self.spawn_request(TaskKind::OrderPersist { request }, async move {
            let result = gateway.persist_order(&order, Some(hint)).await;
            ListEvent::OrderPersisted {
                request,
                order,
                hint,
                result,
            }
        });
        true
    }

    pub(super) fn handle_order_persisted(
        &mut self,
        request: u64,
        order: Vec<i64>,
        hint: MoveHint,
        result: Result<PersistAck, ApiError>,
    ) {
        match persist_failure(&result) {
            None => self.order_saved(request, order),
            Some(reason) => self.order_failed(request, Some(hint), &reason),
        }
    }

    fn order_saved(&mut self, request: u64, order: Vec<i64>) {
        if !self.order_sync.confirm(request, order) {
            tracing::debug!(request, "Order saved after a newer one, ignoring");
            return;
        }

        if self.order_sync.is_latest(request) {
            // The server may commit a different order than our splice.
            let page = self.state.current_page();
            tracing::debug!(request, page, "Order saved, reloading current page");
            self.load_page(page, false);
        } else if self.order_sync.latest_failed() && self.options.rollback_on_persist_failure {
            // The latest move failed and rolled back to an older order.
            self.state.restore_order(self.order_sync.confirmed());
            tracing::info!(request, "Order moved to the newly confirmed order");
        } else {
            tracing::debug!(request, "Order saved; newer move will reconcile");
        }
    }

    /// Roll back to the confirmed order if `request` is the latest, and tell
    /// the user either way. `hint` is absent when the persist task panicked.
    pub(super) fn order_failed(&mut self, request: u64, hint: Option<MoveHint>, reason: &str) {
        tracing::error!(
            from_id = hint.map(|h| h.from_id),
            to_id = hint.map(|h| h.to_id),
            request,
            error = %reason,
            "Failed to save order"
        );
        if self.order_sync.fail(request) && self.options.rollback_on_persist_failure {
            self.state.restore_order(self.order_sync.confirmed());
            tracing::info!(request, "Order rolled back");
        }
        self.state
            .raise_notice(NoticeKind::Order, format!("Order not saved: {}", reason));
    }
}
