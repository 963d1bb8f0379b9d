//! Thermo Gateway - CRUD API and live fan-out for temperature readings.
//!
//! This crate provides the HTTP surface, the WebSocket fan-out pipeline,
//! and the storage gateway for the Thermowatch backend.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                         THERMO GATEWAY                           │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  ┌────────────┐   ┌─────────────┐                                │
//! │  │  REST API  │   │  WebSocket  │                                │
//! │  │ /api/...   │   │    /ws      │                                │
//! │  └─────┬──────┘   └──────┬──────┘                                │
//! │        │ mutations       │ register / welcome                    │
//! │        ▼                 ▼                                       │
//! │  ┌───────────────────────────────────┐                           │
//! │  │          Change Notifier          │◄── LISTEN loop            │
//! │  │  (snapshot recompute + broadcast) │    (temperature_changes)  │
//! │  └─────────┬─────────────┬───────────┘                           │
//! │            ▼             ▼                                       │
//! │   Storage Gateway   Subscriber Registry                          │
//! │   (PostgreSQL)      (open connections)                           │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every committed mutation reaches live clients twice over: the handler
//! spawns an in-process notification, and the transaction's `pg_notify`
//! wakes the listener (which also catches writes from other processes).
//! Snapshots are full-state, so duplicate frames are harmless.

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod domain;
pub mod http;
pub mod notify;
pub mod service;
pub mod snapshot;
pub mod storage;
pub mod ws;

// Re-exports for public API
pub use domain::config::GatewayConfig;
pub use domain::error::{ApiError, ApiResult, GatewayError};
pub use domain::model::{Reading, Snapshot, Summary};
pub use notify::{ChangeListener, ChangeNotifier};
pub use service::TemperatureService;
pub use storage::{MemoryTemperatureStore, PgTemperatureStore, TemperatureStore};
pub use ws::SubscriberRegistry;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
