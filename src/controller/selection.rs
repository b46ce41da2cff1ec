use crate::api::{ApiError, FetchGateway, PersistAck};
use crate::state::NoticeKind;

use super::{persist_failure, ListController, ListEvent, TaskKind};

impl<G: FetchGateway> ListController<G> {
    /// Flip the selection of `id` and persist the whole resulting set.
    pub fn toggle_selection(&mut self, id: i64) {
        let now_selected = self.state.toggle_selection(id);
        let request = self.selection_sync.begin();
        let ids = self.state.sorted_selection();
        tracing::debug!(
            id,
            selected = now_selected,
            count = ids.len(),
            request,
            "Selection toggled"
        );

        let gateway = self.gateway.clone();
        self.spawn_request(TaskKind::SelectionPersist { request }, async move {
            let result = gateway.persist_selection(&ids).await;
            ListEvent::SelectionPersisted {
                request,
                id,
                ids,
                result,
            }
        });
        self.state.notify();
    }

    pub(super) fn handle_selection_persisted(
        &mut self,
        request: u64,
        id: i64,
        ids: Vec<i64>,
        result: Result<PersistAck, ApiError>,
    ) {
        match persist_failure(&result) {
            None => self.selection_saved(request, id, ids),
            Some(reason) => self.selection_failed(request, &reason),
        }
    }

    fn selection_saved(&mut self, request: u64, id: i64, ids: Vec<i64>) {
        if !self.selection_sync.confirm(request, ids) {
            tracing::debug!(id, request, "Selection saved after a newer one, ignoring");
            return;
        }
        tracing::debug!(id, request, "Selection saved");

        // The latest request already failed and rolled back to an older set.
        if self.selection_sync.latest_failed() && self.options.rollback_on_persist_failure {
            self.state
                .replace_selection(self.selection_sync.confirmed().iter().copied());
            tracing::info!(request, "Selection moved to the newly confirmed set");
        }
    }

    /// Roll back to the confirmed set if `request` is the latest, and tell
    /// the user either way.
    pub(super) fn selection_failed(&mut self, request: u64, reason: &str) {
        tracing::error!(request, error = %reason, "Failed to save selection");

        if self.selection_sync.fail(request) && self.options.rollback_on_persist_failure {
            self.state
                .replace_selection(self.selection_sync.confirmed().iter().copied());
            tracing::info!(
                request,
                count = self.selection_sync.confirmed().len(),
                "Selection rolled back"
            );
        }
        self.state.raise_notice(
            NoticeKind::Selection,
            format!("Selection not saved: {}", reason),
        );
    }
}
