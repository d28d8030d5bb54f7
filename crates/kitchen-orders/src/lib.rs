//! # Kitchen Orders
//!
//! Order entry for a small restaurant. Waiters place orders, the kitchen works through
//! them, and every screen polls the same store so all of them converge on one view.
//!
//! ## Core Components
//!
//! - **[model]**: [`Order`](model::Order), its line items and the persisted record shape.
//! - **[order_actor]**: the order store, a [`ResourceActor`](store_actor::ResourceActor)
//!   whose writes go through the [`journal`].
//! - **[clients]**: [`OrderClient`](clients::OrderClient), the lifecycle controller and the
//!   only writer of orders.
//! - **[board]**: polling views that replace their snapshot on every tick and keep the last
//!   one while the store is unreachable.
//! - **[lifecycle]**: [`OrderSystem`](lifecycle::OrderSystem) start and shutdown.
//! - **[analytics]**, **[export]**, **[console]**, **[config]**, **[clock]**: reporting,
//!   CSV export, the text front-end, startup settings and the time source.
//!
//! ## Order States
//!
//! ```text
//! pending --complete--> completed
//!    |                      |
//!    +------delete----------+--> (gone)
//! ```
//!
//! Completing twice is harmless: the second call returns the order with its first
//! completion time.

pub mod analytics;
pub mod board;
pub mod clients;
pub mod clock;
pub mod config;
pub mod console;
pub mod export;
pub mod journal;
pub mod lifecycle;
pub mod model;
pub mod order_actor;
