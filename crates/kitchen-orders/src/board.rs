//! # Order Board
//!
//! A polling view over the order store. Every tick lists the orders for one filter and
//! replaces the whole published snapshot; nothing is merged or diffed. When the store
//! cannot be reached the previous snapshot stays up, marked stale, and the next tick simply
//! tries again.
//!
//! Snapshots are published on a [`watch`] channel so any number of screens can follow the
//! latest one.

use crate::clients::OrderClient;
use crate::model::{Order, OrderCounts, OrderFilter};
use crate::order_actor::OrderError;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// What a board shows at one moment.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardSnapshot {
    pub filter: OrderFilter,
    /// Orders from the last successful fetch, in display order.
    pub orders: Vec<Order>,
    /// When `orders` was fetched. `None` until the first successful tick.
    pub fetched_at: Option<DateTime<Utc>>,
    /// True while the store has been unreachable since `fetched_at`.
    pub stale: bool,
    /// Consecutive failed ticks.
    pub failed_ticks: u32,
    pub last_error: Option<String>,
    pub counts: OrderCounts,
}

impl BoardSnapshot {
    fn empty(filter: OrderFilter) -> Self {
        Self {
            filter,
            orders: Vec::new(),
            fetched_at: None,
            stale: false,
            failed_ticks: 0,
            last_error: None,
            counts: OrderCounts::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// The snapshot was replaced. `arrivals` counts pending orders not on the previous one.
    Refreshed { arrivals: usize },
    /// The store failed; the previous snapshot was kept.
    Stale { error: OrderError },
}

pub struct OrderBoard {
    client: OrderClient,
    filter: OrderFilter,
    sender: watch::Sender<BoardSnapshot>,
}

impl OrderBoard {
    pub fn new(client: OrderClient, filter: OrderFilter) -> (Self, watch::Receiver<BoardSnapshot>) {
        let (sender, receiver) = watch::channel(BoardSnapshot::empty(filter));
        (
            Self {
                client,
                filter,
                sender,
            },
            receiver,
        )
    }

    pub fn filter(&self) -> OrderFilter {
        self.filter
    }

    pub fn subscribe(&self) -> watch::Receiver<BoardSnapshot> {
        self.sender.subscribe()
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        self.sender.borrow().clone()
    }

    /// Fetches once and publishes the result.
    pub async fn tick(&self) -> TickOutcome {
        match self.client.list(self.filter).await {
            Ok(orders) => {
                let arrivals = self.count_arrivals(&orders);
                let counts = OrderCounts::tally(&orders);
                let snapshot = BoardSnapshot {
                    filter: self.filter,
                    orders,
                    fetched_at: Some(self.client.clock().now()),
                    stale: false,
                    failed_ticks: 0,
                    last_error: None,
                    counts,
                };
                self.sender.send_replace(snapshot);

                if arrivals > 0 {
                    info!(filter = %self.filter, arrivals, "New orders");
                }
                debug!(filter = %self.filter, total = counts.total(), "Board refreshed");
                TickOutcome::Refreshed { arrivals }
            }
            Err(error) => {
                self.sender.send_modify(|snapshot| {
                    snapshot.stale = true;
                    snapshot.failed_ticks += 1;
                    snapshot.last_error = Some(error.to_string());
                });
                warn!(
                    filter = %self.filter,
                    error = %error,
                    failed_ticks = self.sender.borrow().failed_ticks,
                    "Refresh failed, keeping last snapshot"
                );
                TickOutcome::Stale { error }
            }
        }
    }

    /// Pending orders in `orders` that the current snapshot does not have. The first
    /// successful fetch reports none.
    fn count_arrivals(&self, orders: &[Order]) -> usize {
        let previous = self.sender.borrow();
        if previous.fetched_at.is_none() {
            return 0;
        }
        let known: HashSet<_> = previous.orders.iter().map(|order| order.id).collect();
        orders
            .iter()
            .filter(|order| order.is_pending() && !known.contains(&order.id))
            .count()
    }

    /// Ticks every `period` until `shutdown` turns true or its sender is dropped.
    ///
    /// The first tick fires immediately. A slow fetch delays the following ticks instead
    /// of bunching them up.
    pub async fn run(self, period: Duration, mut shutdown: watch::Receiver<bool>) {
        let mut interval_timer = tokio::time::interval(period);
        interval_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(filter = %self.filter, period_ms = period.as_millis() as u64, "Board started");

        while !*shutdown.borrow_and_update() {
            tokio::select! {
                _ = interval_timer.tick() => {
                    self.tick().await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        info!(filter = %self.filter, "Board stopped");
    }
}
