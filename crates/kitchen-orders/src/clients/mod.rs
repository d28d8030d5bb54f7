//! Type-safe wrappers around [`ResourceClient`](store_actor::ResourceClient).

pub mod order_client;

pub use order_client::*;
