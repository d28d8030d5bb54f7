//! # Store Actor
//!
//! A small record store built on the actor model: one Tokio task owns every record of a
//! type and answers requests over a channel. It gives callers the contract a shared order
//! store needs:
//!
//! - **Store-assigned IDs** on create, from a generator supplied by the owner.
//! - **Atomic per-record writes**: requests are processed one at a time, so an action can
//!   read a record, decide, and write it back without any lock.
//! - **Filtered reads** through a typed [`ActorEntity::Query`].
//! - **Bounded calls**: a [`ResourceClient`] can carry a request timeout.
//!
//! ## Architecture Overview
//!
//! 1. **Entity Layer** ([`ActorEntity`]) - the record type, its payloads and hooks
//! 2. **Runtime Layer** ([`ResourceActor`]) - message processing and record ownership
//! 3. **Interface Layer** ([`ResourceClient`], [`ActorClient`]) - typed requests
//!
//! ## Context Injection
//!
//! Dependencies are passed to [`ResourceActor::run`] rather than to the constructor. The
//! order store uses this to hand its journal to the hooks that make writes durable:
//!
//! ```rust,ignore
//! let (actor, client) = ResourceActor::<Order>::new(32, OrderId::new);
//! let actor = actor.with_records(existing_orders);
//! tokio::spawn(actor.run(journal));
//! ```
//!
//! ## Shutdown
//!
//! The actor stops when the last client (and every clone) is dropped: `recv()` returns
//! `None`, the loop logs its final size and the task completes.
//!
//! ## Testing
//!
//! [`mock::MockClient`] answers requests from scripted expectations, which makes store
//! outages and timeouts easy to reproduce.

pub mod actor;
pub mod client;
pub mod client_trait;
pub mod entity;
pub mod error;
pub mod message;
pub mod mock;
pub mod tracing;

pub use actor::ResourceActor;
pub use client::ResourceClient;
pub use client_trait::ActorClient;
pub use entity::ActorEntity;
pub use error::FrameworkError;
pub use message::{ResourceRequest, Response};
