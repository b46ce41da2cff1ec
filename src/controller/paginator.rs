use crate::api::{ApiError, FetchGateway, ListQuery, Page};

use super::{ListController, ListEvent, TaskKind};

impl<G: FetchGateway> ListController<G> {
    /// Start loading `page` with the current query.
    ///
    /// The matching busy flag is set before the request is spawned. A replace
    /// load (`append == false`) bumps the list generation and aborts whatever
    /// list load was still outstanding; an append shares the current
    /// generation.
    pub(crate) fn load_page(&mut self, page: u32, append: bool) {
        self.state.begin_load(append);

        if !append {
            self.list_generation = self.list_generation.wrapping_add(1);
            if let Some(handle) = self.list_handle.take() {
                handle.abort();
                tracing::debug!("Aborted superseded list load");
            }
        }
        let generation = self.list_generation;

        let query = ListQuery {
            page,
            limit: self.options.page_size,
            search: self.state.query().to_string(),
            no_reorder: self.options.no_reorder,
        };
        tracing::debug!(
            page,
            append,
            generation,
            search = %query.search,
            "Loading page"
        );

        let gateway = self.gateway.clone();
        let task = TaskKind::ListLoad { generation };
        self.list_handle = Some(self.spawn_request(task, async move {
            let result = gateway.list_items(&query).await;
            ListEvent::PageLoaded {
                generation,
                page,
                append,
                result,
            }
        }));
    }

    pub(super) fn handle_page_loaded(
        &mut self,
        generation: u64,
        page: u32,
        append: bool,
        result: Result<Page, ApiError>,
    ) {
        if generation != self.list_generation {
            tracing::debug!(
                expected = self.list_generation,
                got = generation,
                page,
                "Ignoring stale page (generation mismatch)"
            );
            return;
        }
        self.list_handle = None;

        match result {
            Ok(response) => {
                let received = response.items.len();
                let added = self.state.apply_page(response, append);
                self.record_served_order(append, added);
                tracing::debug!(
                    page,
                    append,
                    received,
                    added,
                    loaded = self.state.items().len(),
                    total = self.state.total_items(),
                    has_more = self.state.has_more(),
                    "Page applied"
                );
            }
            Err(e) => {
                tracing::warn!(page, append, error = %e, "Failed to load items");
                self.state.set_error(format!("Failed to load items: {}", e));
            }
        }
        self.state.finish_load();
    }

    /// Fold a freshly applied page into the confirmed order: a replace load
    /// shows the server's order as is, an append extends it.
    fn record_served_order(&mut self, append: bool, added: usize) {
        let items = self.state.items();
        if append {
            let new_ids = items[items.len() - added..].iter().map(|item| item.id);
            self.order_sync.confirmed_mut().extend(new_ids);
        } else {
            self.order_sync.reseed(self.state.item_ids());
        }
    }
}
