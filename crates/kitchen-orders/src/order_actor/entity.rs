//! Store integration for [`Order`].
//!
//! Every change is written to the [`OrderJournal`] before the actor commits it, so a failed
//! write leaves the in-memory record exactly as it was and the caller sees
//! [`OrderError::StoreUnavailable`].

use super::actions::{OrderAction, OrderActionResult};
use super::error::OrderError;
use crate::journal::OrderJournal;
use crate::model::{Order, OrderCreate, OrderFilter, OrderId, OrderStatus};
use async_trait::async_trait;
use store_actor::ActorEntity;
use tracing::debug;

#[async_trait]
impl ActorEntity for Order {
    type Id = OrderId;
    type Create = OrderCreate;
    type Query = OrderFilter;
    type Action = OrderAction;
    type ActionResult = OrderActionResult;
    type Context = OrderJournal;
    type Error = OrderError;

    /// Builds a pending order. Validation already happened in [`OrderCreate::new`].
    fn from_create_params(id: OrderId, params: OrderCreate) -> Result<Self, OrderError> {
        Ok(Order::new(id, params))
    }

    fn matches(&self, filter: &OrderFilter) -> bool {
        filter.matches(self)
    }

    async fn on_create(&mut self, journal: &OrderJournal) -> Result<(), OrderError> {
        journal.write(self).await?;
        Ok(())
    }

    async fn on_delete(&self, journal: &OrderJournal) -> Result<(), OrderError> {
        journal.remove(&self.id).await?;
        Ok(())
    }

    /// # Actions
    /// - `Complete`: pending orders are written as completed, then updated in place.
    ///   Completed orders are returned as they are, without a write.
    async fn handle_action(
        &mut self,
        action: OrderAction,
        journal: &OrderJournal,
    ) -> Result<OrderActionResult, OrderError> {
        match action {
            OrderAction::Complete { at } => {
                if !self.is_pending() {
                    debug!(id = %self.id, "Already completed");
                    return Ok(OrderActionResult::Complete {
                        order: self.clone(),
                        newly_completed: false,
                    });
                }

                // A skewed clock must not complete an order before it was created
                let mut completed = self.clone();
                completed.status = OrderStatus::Completed {
                    at: at.max(self.created_at),
                };
                journal.write(&completed).await?;
                *self = completed;

                Ok(OrderActionResult::Complete {
                    order: self.clone(),
                    newly_completed: true,
                })
            }
        }
    }
}
