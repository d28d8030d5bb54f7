//! Startup and shutdown of the order system.

pub mod order_system;

pub use order_system::OrderSystem;
