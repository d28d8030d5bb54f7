//! # ActorEntity Trait
//!
//! The `ActorEntity` trait is the contract a record type implements to be kept by a
//! [`ResourceActor`](crate::ResourceActor). It names the identifier, the creation payload,
//! the query type used for filtered reads, the custom actions the record supports, the
//! injected context and the error type.
//!
//! # Provided Methods (Hooks)
//! - [`ActorEntity::on_create`]
//! - [`ActorEntity::on_delete`]
//!
//! Both default to `Ok(())`. Override them when a record needs a side effect (for example
//! writing itself to durable storage) before the actor commits the change.

use async_trait::async_trait;
use std::fmt::{Debug, Display};
use std::hash::Hash;

/// Trait that any record type must implement to be managed by a `ResourceActor`.
///
/// # Async & Context
/// Hooks are `#[async_trait]` so they can await I/O. The `Context` type is injected into
/// every hook by [`ResourceActor::run`](crate::ResourceActor::run), which lets the owner
/// bind dependencies (a journal, another client) after the actor is constructed.
///
/// # Atomicity
/// The actor handles one request at a time. A hook that fails leaves the stored record
/// exactly as it was, so an action can read, decide and write without any lock.
#[async_trait]
pub trait ActorEntity: Clone + Send + Sync + 'static {
    /// The unique identifier for this record (e.g. `Uuid` newtype, `u64`).
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug;

    /// The data required to create a new instance.
    type Create: Send + Sync + Debug;

    /// Predicate payload for [`ResourceRequest::Query`](crate::ResourceRequest::Query).
    type Query: Send + Sync + Debug;

    /// Enum representing record-specific operations.
    type Action: Send + Sync + Debug;

    /// The result type returned by custom actions.
    type ActionResult: Send + Sync + Debug;

    /// The runtime context injected into the actor. Use `()` if nothing is needed.
    type Context: Send + Sync;

    /// The error type for this record.
    ///
    /// One error enum per record type rather than one per action: clients pattern match on
    /// a single type, at the cost of every action sharing the same set of variants.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Construct the full record from the assigned ID and the payload.
    /// Called synchronously before `on_create`.
    fn from_create_params(id: Self::Id, params: Self::Create) -> Result<Self, Self::Error>;

    /// Whether this record is selected by `query`.
    fn matches(&self, query: &Self::Query) -> bool;

    // --- Lifecycle Hooks (Async) ---

    /// Called after the record is built and before it is inserted into the store.
    async fn on_create(&mut self, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Called before the record is removed from the store.
    async fn on_delete(&self, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }

    // --- Action Handler (Async) ---

    /// Handle a custom record-specific action.
    async fn handle_action(
        &mut self,
        action: Self::Action,
        ctx: &Self::Context,
    ) -> Result<Self::ActionResult, Self::Error>;
}
