//! Custom actions for the Order actor.
//!
//! These are handled by [`ActorEntity::handle_action`](store_actor::ActorEntity::handle_action)
//! inside the actor task, so each one is an atomic read-modify-write of a single order.

use crate::model::Order;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub enum OrderAction {
    /// Moves a pending order to `completed` at the given time.
    ///
    /// Conditional: an order that is already completed is returned unchanged and keeps its
    /// original completion time.
    Complete { at: DateTime<Utc> },
}

/// Results from OrderActions - variants match 1:1 with OrderAction
#[derive(Debug, Clone)]
pub enum OrderActionResult {
    Complete {
        order: Order,
        /// False when the order had already been completed by an earlier call.
        newly_completed: bool,
    },
}
