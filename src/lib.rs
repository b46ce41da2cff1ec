//! listsync: client-side controller for a paginated, searchable,
//! reorderable, multi-select list backed by an HTTP API.
//!
//! - [`api`] - wire types and the [`api::FetchGateway`] trait with its HTTP implementation
//! - [`state`] - the observable list state
//! - [`controller`] - coordinators that mutate state and sync with the server
//! - [`config`] - optional TOML configuration

pub mod api;
pub mod config;
pub mod controller;
pub mod state;
pub mod util;
