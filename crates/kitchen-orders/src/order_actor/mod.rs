//! Order store: a [`ResourceActor<Order>`] whose writes go through the order journal.
//!
//! The actor is the only owner of the live records. Completion runs as an
//! [`OrderAction`] inside it, which is what makes concurrent `complete` calls safe.

pub mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;

use crate::model::{Order, OrderId};
use store_actor::{ResourceActor, ResourceClient};

/// Creates a new Order actor and its raw store client.
///
/// Ids are random UUIDs; the actor redraws on the (theoretical) collision.
pub fn new(buffer_size: usize) -> (ResourceActor<Order>, ResourceClient<Order>) {
    ResourceActor::new(buffer_size, OrderId::new)
}
