//! # Order Client
//!
//! The order lifecycle controller. It is the only component that writes orders: it
//! validates input, stamps times from its [`Clock`] and turns store failures into
//! [`OrderError`]s. Reads of single orders and deletes come from [`ActorClient`].
use crate::clock::{Clock, SystemClock};
use crate::model::{LineItem, Order, OrderCreate, OrderFilter, OrderId};
use crate::order_actor::{OrderAction, OrderActionResult, OrderError};
use async_trait::async_trait;
use std::sync::Arc;
use store_actor::{ActorClient, FrameworkError, ResourceClient};
use tracing::{debug, info, instrument};

/// Client for the Order actor.
#[derive(Clone)]
pub struct OrderClient {
    inner: ResourceClient<Order>,
    clock: Arc<dyn Clock>,
}

#[async_trait]
impl ActorClient<Order> for OrderClient {
    type Error = OrderError;

    fn inner(&self) -> &ResourceClient<Order> {
        &self.inner
    }

    /// Store timeouts and a closed actor both read as `StoreUnavailable`; errors raised by
    /// the order hooks keep their own variant.
    fn map_error(e: FrameworkError) -> Self::Error {
        match e {
            FrameworkError::NotFound(id) => OrderError::NotFound(id),
            FrameworkError::EntityError(inner) => match inner.downcast::<OrderError>() {
                Ok(order_error) => *order_error,
                Err(other) => OrderError::StoreUnavailable(other.to_string()),
            },
            other => OrderError::StoreUnavailable(other.to_string()),
        }
    }
}

impl OrderClient {
    pub fn new(inner: ResourceClient<Order>) -> Self {
        Self::with_clock(inner, Arc::new(SystemClock))
    }

    pub fn with_clock(inner: ResourceClient<Order>, clock: Arc<dyn Clock>) -> Self {
        Self { inner, clock }
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Submits a new pending order for `table`.
    ///
    /// # Errors
    /// - [`OrderError::Validation`] for a blank table, no items or a blank item name; nothing
    ///   is written.
    /// - [`OrderError::StoreUnavailable`] when the record could not be stored.
    #[instrument(skip(self, items), fields(items = items.len()))]
    pub async fn create(&self, table: &str, items: Vec<LineItem>) -> Result<Order, OrderError> {
        let params = OrderCreate::new(table, items, self.clock.now())?;
        debug!("Sending request");
        let order = self.inner.create(params).await.map_err(Self::map_error)?;
        info!(id = %order.id, table = %order.table, "Order placed");
        Ok(order)
    }

    /// Marks an order as completed and returns it.
    ///
    /// Completing an order twice is not an error: the second call returns the order with
    /// its original `completed_at`.
    #[instrument(skip(self))]
    pub async fn complete(&self, id: OrderId) -> Result<Order, OrderError> {
        debug!("Sending request");
        let action = OrderAction::Complete {
            at: self.clock.now(),
        };
        match self
            .inner
            .perform_action(id, action)
            .await
            .map_err(Self::map_error)?
        {
            OrderActionResult::Complete {
                order,
                newly_completed,
            } => {
                if newly_completed {
                    info!(table = %order.table, "Order completed");
                } else {
                    debug!("Order was already completed");
                }
                Ok(order)
            }
        }
    }

    /// Orders selected by `filter`, in display order (see [`OrderFilter::arrange`]).
    #[instrument(skip(self))]
    pub async fn list(&self, filter: OrderFilter) -> Result<Vec<Order>, OrderError> {
        let mut orders = self.query(filter).await?;
        filter.arrange(&mut orders);
        Ok(orders)
    }
}
