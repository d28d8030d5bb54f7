use crate::model::LineItem;
use crate::order_actor::OrderError;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Store-assigned order identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub Uuid);

impl OrderId {
    /// A fresh random identifier.
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// First eight hex digits, enough to tell orders apart on a screen.
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for OrderId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// Lifecycle state. The completion time only exists on the `Completed` variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Pending,
    Completed { at: DateTime<Utc> },
}

impl OrderStatus {
    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Completed { .. } => "completed",
        }
    }
}

/// A table's food request, tracked from `pending` to `completed`.
///
/// # Store
/// This struct implements the [`ActorEntity`](store_actor::ActorEntity) trait, so the order
/// store is a [`ResourceActor<Order>`](store_actor::ResourceActor).
///
/// See [`impl ActorEntity for Order`](#impl-ActorEntity-for-Order) for:
/// - Creation parameters ([`OrderCreate`])
/// - Queries ([`OrderFilter`])
/// - The completion action ([`OrderAction`](crate::order_actor::OrderAction))
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: OrderId,
    pub table: String,
    pub items: Vec<LineItem>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Builds a pending order from validated creation parameters.
    pub fn new(id: OrderId, params: OrderCreate) -> Self {
        Self {
            id,
            table: params.table,
            items: params.items,
            status: OrderStatus::Pending,
            created_at: params.created_at,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.status, OrderStatus::Pending)
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        match self.status {
            OrderStatus::Pending => None,
            OrderStatus::Completed { at } => Some(at),
        }
    }

    /// How long the table has waited: up to `now` while pending, up to completion after.
    pub fn waiting_for(&self, now: DateTime<Utc>) -> Duration {
        let end = self.completed_at().unwrap_or(now);
        (end - self.created_at).max(Duration::zero())
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] table {} {} {} |",
            self.id.short(),
            self.table,
            self.status.label(),
            self.created_at.format("%H:%M:%S"),
        )?;
        for (i, item) in self.items.iter().enumerate() {
            let sep = if i == 0 { " " } else { ", " };
            write!(f, "{}{}", sep, item)?;
        }
        Ok(())
    }
}

/// Payload for creating a new order. Only obtainable through [`OrderCreate::new`], which
/// enforces the creation rules.
#[derive(Debug, Clone)]
pub struct OrderCreate {
    table: String,
    items: Vec<LineItem>,
    created_at: DateTime<Utc>,
}

impl OrderCreate {
    /// Validates the waiter's input.
    ///
    /// # Errors
    /// [`OrderError::Validation`] when the table is blank, there are no items, or an item
    /// fails [`LineItem::validate`] (blank name, a name that is only a note, quantity 0).
    pub fn new(
        table: &str,
        items: Vec<LineItem>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, OrderError> {
        let table = table.trim();
        if table.is_empty() {
            return Err(OrderError::Validation("table must not be empty".into()));
        }
        if items.is_empty() {
            return Err(OrderError::Validation("order has no items".into()));
        }
        let items = items
            .into_iter()
            .enumerate()
            .map(|(pos, mut item)| -> Result<LineItem, OrderError> {
                item.validate().map_err(|e| {
                    OrderError::Validation(format!("item {}: {}", pos + 1, e))
                })?;
                item.name = item.name.trim().to_string();
                item.note = item
                    .note
                    .map(|note| note.trim().to_string())
                    .filter(|note| !note.is_empty());
                Ok(item)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            table: table.to_string(),
            items,
            created_at,
        })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }
}

/// Which orders a listing shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderFilter {
    Pending,
    Completed,
    All,
}

impl OrderFilter {
    pub fn matches(&self, order: &Order) -> bool {
        match self {
            OrderFilter::Pending => order.is_pending(),
            OrderFilter::Completed => !order.is_pending(),
            OrderFilter::All => true,
        }
    }

    /// Puts a listing in display order.
    ///
    /// Pending work and the full list run oldest first (the kitchen cooks in arrival order);
    /// finished work runs most recently completed first. Ties fall back to the id so every
    /// client shows the same order.
    pub fn arrange(&self, orders: &mut [Order]) {
        match self {
            OrderFilter::Pending | OrderFilter::All => orders.sort_by(|a, b| {
                a.created_at
                    .cmp(&b.created_at)
                    .then_with(|| a.id.cmp(&b.id))
            }),
            OrderFilter::Completed => orders.sort_by(|a, b| {
                b.completed_at()
                    .cmp(&a.completed_at())
                    .then_with(|| a.id.cmp(&b.id))
            }),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OrderFilter::Pending => "pending",
            OrderFilter::Completed => "completed",
            OrderFilter::All => "all",
        }
    }
}

impl fmt::Display for OrderFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for OrderFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(OrderFilter::Pending),
            "completed" | "done" => Ok(OrderFilter::Completed),
            "all" => Ok(OrderFilter::All),
            other => Err(format!("unknown filter {:?}", other)),
        }
    }
}

/// Headline numbers for a kitchen screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderCounts {
    pub pending: usize,
    pub completed: usize,
}

impl OrderCounts {
    pub fn tally(orders: &[Order]) -> Self {
        let pending = orders.iter().filter(|o| o.is_pending()).count();
        Self {
            pending,
            completed: orders.len() - pending,
        }
    }

    pub fn total(&self) -> usize {
        self.pending + self.completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 17, h, m, 0).unwrap()
    }

    fn order(table: &str, created: DateTime<Utc>) -> Order {
        let params = OrderCreate::new(table, vec![LineItem::new("Soup")], created).unwrap();
        Order::new(OrderId::new(), params)
    }

    #[test]
    fn test_create_validation() {
        let now = at(12, 0);
        assert!(matches!(
            OrderCreate::new("  ", vec![LineItem::new("Soup")], now),
            Err(OrderError::Validation(_))
        ));
        assert!(matches!(
            OrderCreate::new("T1", vec![], now),
            Err(OrderError::Validation(_))
        ));
        assert!(matches!(
            OrderCreate::new("T1", vec![LineItem::new("Soup"), LineItem::new(" ")], now),
            Err(OrderError::Validation(msg)) if msg.contains("item 2")
        ));
        assert!(matches!(
            OrderCreate::new("T1", vec![LineItem::new("Soup").with_quantity(0)], now),
            Err(OrderError::Validation(msg)) if msg.contains("item 1")
        ));
        assert!(matches!(
            OrderCreate::new("T1", vec![LineItem::new("(chef special)")], now),
            Err(OrderError::Validation(_))
        ));
        assert_eq!(
            OrderCreate::new(" 5 ", vec![LineItem::new("Soup")], now)
                .unwrap()
                .table(),
            "5"
        );
    }

    #[test]
    fn test_new_order_is_pending_without_completion() {
        let o = order("5", at(12, 0));
        assert!(o.is_pending());
        assert_eq!(o.completed_at(), None);
        assert_eq!(o.waiting_for(at(12, 7)), Duration::minutes(7));
    }

    #[test]
    fn test_waiting_stops_at_completion() {
        let mut o = order("5", at(12, 0));
        o.status = OrderStatus::Completed { at: at(12, 20) };
        assert_eq!(o.waiting_for(at(13, 0)), Duration::minutes(20));
        assert_eq!(o.status.label(), "completed");
    }

    #[test]
    fn test_arrange_pending_oldest_first() {
        let late = order("1", at(12, 30));
        let early = order("2", at(12, 5));
        let mut list = vec![late.clone(), early.clone()];
        OrderFilter::Pending.arrange(&mut list);
        assert_eq!(list, vec![early, late]);
    }

    #[test]
    fn test_arrange_completed_newest_first() {
        let mut a = order("1", at(11, 0));
        a.status = OrderStatus::Completed { at: at(11, 30) };
        let mut b = order("2", at(11, 10));
        b.status = OrderStatus::Completed { at: at(11, 50) };
        let mut list = vec![a.clone(), b.clone()];
        OrderFilter::Completed.arrange(&mut list);
        assert_eq!(list, vec![b, a]);
    }

    #[test]
    fn test_filter_parse_and_counts() {
        assert_eq!("Pending".parse::<OrderFilter>().unwrap(), OrderFilter::Pending);
        assert_eq!("done".parse::<OrderFilter>().unwrap(), OrderFilter::Completed);
        assert!("later".parse::<OrderFilter>().is_err());

        let mut done = order("1", at(9, 0));
        done.status = OrderStatus::Completed { at: at(9, 5) };
        let counts = OrderCounts::tally(&[done, order("2", at(9, 1))]);
        assert_eq!(counts, OrderCounts { pending: 1, completed: 1 });
        assert_eq!(counts.total(), 2);
    }

    #[test]
    fn test_order_id_text_round_trip() {
        let id = OrderId::new();
        assert_eq!(id.to_string().parse::<OrderId>().unwrap(), id);
        assert_eq!(id.short().len(), 8);
        assert!("not-an-id".parse::<OrderId>().is_err());
    }
}
