use crate::api::{ApiError, FetchGateway, Settings};
use crate::state::NoticeKind;

use super::{ListController, ListEvent, TaskKind};

impl<G: FetchGateway> ListController<G> {
    /// Read settings, then load the first page.
    ///
    /// The first page load runs after the settings read completes whether or
    /// not it succeeded.
    pub fn bootstrap(&mut self) {
        tracing::info!("Loading settings");
        self.state.set_query(String::new());
        self.state.reset_cursor();

        let gateway = self.gateway.clone();
        self.spawn_request(TaskKind::SettingsLoad, async move {
            ListEvent::SettingsLoaded(gateway.read_settings().await)
        });
        self.state.notify();
    }

    pub(super) fn handle_settings_loaded(&mut self, result: Result<Settings, ApiError>) {
        let settings = match result {
            Ok(settings) => settings,
            Err(e) => return self.settings_failed(&e.to_string()),
        };

        let mut selected = settings.selected_ids;
        selected.sort_unstable();
        selected.dedup();
        if !selected.is_empty() {
            tracing::info!(count = selected.len(), "Restoring selection from settings");
            self.state.replace_selection(selected.iter().copied());
        }
        self.selection_sync.reseed(selected);
        if let Some(order) = &settings.custom_order {
            tracing::debug!(len = order.len(), "Server has a custom order");
        }
        self.load_page(1, false);
    }

    /// Continue without a restored selection. The banner would be cleared by
    /// the first page load, so the failure stays visible as a notice.
    pub(super) fn settings_failed(&mut self, reason: &str) {
        tracing::warn!(error = %reason, "Failed to load settings, continuing without selection");
        self.state.raise_notice(
            NoticeKind::Settings,
            format!("Failed to load settings: {}", reason),
        );
        self.load_page(1, false);
    }
}
