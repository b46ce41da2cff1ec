//! Shared test harness: an in-memory list server and an event pump.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use listsync::api::{
    ApiError, FetchGateway, Item, ListQuery, MoveHint, Page, PersistAck, Settings,
};
use listsync::controller::{ControllerOptions, ListController, ListEvent, ScrollMetrics};
use tokio::sync::mpsc;

/// Items on the fake server.
pub const TOTAL_ITEMS: i64 = 45;

#[derive(Default)]
struct Server {
    items: Vec<Item>,
    settings: Option<Settings>,

    list_calls: Vec<ListQuery>,
    selection_calls: Vec<Vec<i64>>,
    order_calls: Vec<(Vec<i64>, Option<MoveHint>)>,

    fail_list: bool,
    fail_selection: bool,
    fail_order: bool,
    reject_order: bool,
    panic_on_list: bool,
    panic_on_persist: bool,
    search_delays: HashMap<String, Duration>,
}

impl Server {
    fn page(&self, query: &ListQuery) -> Page {
        let needle = query.search.to_lowercase();
        let matching: Vec<&Item> = self
            .items
            .iter()
            .filter(|item| needle.is_empty() || item.value.to_lowercase().contains(&needle))
            .collect();
        let total = matching.len() as u64;
        let limit = query.limit.max(1) as usize;
        let start = (query.page.saturating_sub(1) as usize) * limit;
        let items = matching
            .into_iter()
            .skip(start)
            .take(limit)
            .cloned()
            .collect();
        Page {
            items,
            total_items: total,
            current_page: query.page,
            total_pages: total.div_ceil(limit as u64) as u32,
            has_more: (query.page as u64) * (limit as u64) < total,
        }
    }

    fn apply_order(&mut self, order: &[i64]) {
        let mut reordered: Vec<Item> = order
            .iter()
            .filter_map(|id| self.items.iter().find(|item| item.id == *id).cloned())
            .collect();
        reordered.extend(
            self.items
                .iter()
                .filter(|item| !order.contains(&item.id))
                .cloned(),
        );
        self.items = reordered;
    }
}

/// In-memory [`FetchGateway`] with call recording and failure switches.
#[derive(Clone)]
pub struct FakeGateway {
    server: Arc<Mutex<Server>>,
}

impl FakeGateway {
    /// A server holding items 1..=45 valued "Item N", with empty settings.
    pub fn new() -> Self {
        let server = Server {
            items: (1..=TOTAL_ITEMS)
                .map(|id| Item::new(id, format!("Item {}", id)))
                .collect(),
            settings: Some(Settings::default()),
            ..Server::default()
        };
        Self {
            server: Arc::new(Mutex::new(server)),
        }
    }

    fn with<R>(&self, f: impl FnOnce(&mut Server) -> R) -> R {
        let mut server = self.server.lock().unwrap();
        f(&mut server)
    }

    pub fn set_settings(&self, settings: Option<Settings>) {
        self.with(|s| s.settings = settings);
    }

    pub fn fail_list(&self, fail: bool) {
        self.with(|s| s.fail_list = fail);
    }

    pub fn fail_selection(&self, fail: bool) {
        self.with(|s| s.fail_selection = fail);
    }

    pub fn fail_order(&self, fail: bool) {
        self.with(|s| s.fail_order = fail);
    }

    /// Answer order persists with `{"success": false}`.
    pub fn reject_order(&self, reject: bool) {
        self.with(|s| s.reject_order = reject);
    }

    pub fn panic_on_list(&self, panic: bool) {
        self.with(|s| s.panic_on_list = panic);
    }

    /// Panic inside selection and order persists.
    pub fn panic_on_persist(&self, panic: bool) {
        self.with(|s| s.panic_on_persist = panic);
    }

    pub fn delay_search(&self, search: &str, delay: Duration) {
        self.with(|s| {
            s.search_delays.insert(search.to_string(), delay);
        });
    }

    pub fn list_calls(&self) -> Vec<ListQuery> {
        self.with(|s| s.list_calls.clone())
    }

    pub fn selection_calls(&self) -> Vec<Vec<i64>> {
        self.with(|s| s.selection_calls.clone())
    }

    pub fn order_calls(&self) -> Vec<(Vec<i64>, Option<MoveHint>)> {
        self.with(|s| s.order_calls.clone())
    }

    pub fn server_order(&self) -> Vec<i64> {
        self.with(|s| s.items.iter().map(|item| item.id).collect())
    }
}

impl FetchGateway for FakeGateway {
    async fn list_items(&self, query: &ListQuery) -> Result<Page, ApiError> {
        let (delay, should_panic) = self.with(|s| {
            s.list_calls.push(query.clone());
            (
                s.search_delays.get(&query.search).copied().unwrap_or_default(),
                s.panic_on_list,
            )
        });
        if should_panic {
            panic!("list backend exploded");
        }
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.with(|s| {
            if s.fail_list {
                Err(ApiError::HttpStatus(500))
            } else {
                Ok(s.page(query))
            }
        })
    }

    async fn persist_selection(&self, ids: &[i64]) -> Result<PersistAck, ApiError> {
        let should_panic = self.with(|s| {
            s.selection_calls.push(ids.to_vec());
            s.panic_on_persist
        });
        if should_panic {
            panic!("selection store exploded");
        }
        self.with(|s| {
            if s.fail_selection {
                Err(ApiError::HttpStatus(503))
            } else {
                Ok(PersistAck { success: true })
            }
        })
    }

    async fn persist_order(
        &self,
        order: &[i64],
        hint: Option<MoveHint>,
    ) -> Result<PersistAck, ApiError> {
        let should_panic = self.with(|s| {
            s.order_calls.push((order.to_vec(), hint));
            s.panic_on_persist
        });
        if should_panic {
            panic!("order store exploded");
        }
        self.with(|s| {
            if s.fail_order {
                return Err(ApiError::HttpStatus(500));
            }
            if s.reject_order {
                return Ok(PersistAck { success: false });
            }
            s.apply_order(order);
            Ok(PersistAck { success: true })
        })
    }

    async fn read_settings(&self) -> Result<Settings, ApiError> {
        self.with(|s| s.settings.clone().ok_or(ApiError::HttpStatus(500)))
    }
}

pub type Harness = (
    FakeGateway,
    ListController<FakeGateway>,
    mpsc::Receiver<ListEvent>,
);

pub fn harness() -> Harness {
    harness_with(ControllerOptions::default())
}

pub fn harness_with(options: ControllerOptions) -> Harness {
    let gateway = FakeGateway::new();
    let (controller, rx) = ListController::new(gateway.clone(), options);
    (gateway, controller, rx)
}

/// Apply every event that arrives before the runtime goes quiet.
///
/// Tests run with paused time, so pending timers (debounce, delayed
/// responses) are auto-advanced and delivered here too.
pub async fn settle(controller: &mut ListController<FakeGateway>, rx: &mut mpsc::Receiver<ListEvent>) {
    while let Ok(Some(event)) = tokio::time::timeout(Duration::from_secs(30), rx.recv()).await {
        controller.handle_event(event);
    }
}

/// Receive and apply exactly one event.
pub async fn pump_one(
    controller: &mut ListController<FakeGateway>,
    rx: &mut mpsc::Receiver<ListEvent>,
) -> &'static str {
    let event = rx.recv().await.expect("controller channel closed");
    let name = event.name();
    controller.handle_event(event);
    name
}

/// Bootstrap and wait for the first page.
pub async fn bootstrapped() -> Harness {
    let (gateway, mut controller, mut rx) = harness();
    controller.bootstrap();
    settle(&mut controller, &mut rx).await;
    (gateway, controller, rx)
}

/// Viewport scrolled to the very end of the content.
pub fn at_bottom() -> ScrollMetrics {
    ScrollMetrics {
        scroll_top: 600.0,
        scroll_height: 1000.0,
        client_height: 400.0,
    }
}

pub fn ids(controller: &ListController<FakeGateway>) -> Vec<i64> {
    controller.state().item_ids()
}
