//! # Core Application Logic
//!
//! This module contains chatdeck's business logic.
//! It knows nothing about any specific UI technology.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • HistoryStore (data)  │
//!                    │  • Action (events)      │
//!                    │  • update() (reducer)   │
//!                    │  • round trips (tasks)  │
//!                    └───────────┬─────────────┘
//!                                │
//!            ┌───────────────────┼───────────────────┐
//!            ▼                   ▼                   ▼
//!     ┌────────────┐      ┌────────────┐      ┌────────────┐
//!     │    TUI     │      │   Tests    │      │    API     │
//!     │  Adapter   │      │ (paused    │      │  (future)  │
//!     │ (ratatui)  │      │   clock)   │      │            │
//!     └────────────┘      └────────────┘      └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`model`]: Companies, users, messages and the input mode
//! - [`store`]: The `HistoryStore`: selection, mutation and pending round trips
//! - [`action`]: The `Action` enum and `update()` reducer
//! - [`round_trip`]: Background tasks that simulate query latency
//! - [`responder`]: Reply producers (simulated only)
//! - [`notify`]: Fire-and-forget user notifications
//! - [`seed`]: Built-in dataset and seed file loading
//! - [`config`]: Layered settings

pub mod action;
pub mod config;
pub mod model;
pub mod notify;
pub mod responder;
pub mod round_trip;
pub mod seed;
pub mod store;
