//! Persisted order shape.
//!
//! Each order is stored as a flat JSON object:
//!
//! ```json
//! {
//!   "table": "5",
//!   "items": ["2x Burger", "Coke (no ice)", {"name": "Soup (of the day)"}],
//!   "status": "completed",
//!   "created_at": "2024-05-17T12:00:00Z",
//!   "completed_at": "2024-05-17T12:14:03Z"
//! }
//! ```
//!
//! An item is written in its `"2x Name (note)"` text form when that text reads back as the
//! same item, and as a `{name, quantity, note}` object otherwise. Writes always use ISO-8601
//! text and lowercase statuses. Reads also accept the older record flavour written by the
//! first version of the system: a numeric table, items as one newline-separated string, `Pending`/`Done` statuses, a `timestamp` key instead of
//! `created_at`, `"YYYY-MM-DD HH:MM:SS"` times, or numeric epoch seconds.

use crate::model::{LineItem, LineItemError, Order, OrderId, OrderStatus};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

const LEGACY_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("record for order {0} has no table")]
    MissingTable(OrderId),
    #[error("record for order {id} has a bad item: {source}")]
    BadItem {
        id: OrderId,
        #[source]
        source: LineItemError,
    },
    #[error("record for order {0} has no items")]
    NoItems(OrderId),
    #[error("record for order {0} is completed but has no completed_at")]
    MissingCompletion(OrderId),
    #[error("record for order {0} is pending but carries a completed_at")]
    UnexpectedCompletion(OrderId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoredStatus {
    #[serde(alias = "Pending")]
    Pending,
    #[serde(alias = "Done", alias = "Completed")]
    Completed,
}

/// A timestamp that writes as ISO-8601 and reads from any of the accepted encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoredTime(pub DateTime<Utc>);

impl Serialize for StoredTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_rfc3339())
    }
}

impl<'de> Deserialize<'de> for StoredTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Seconds(i64),
            Fractional(f64),
            Text(String),
        }

        let parsed = match Raw::deserialize(deserializer)? {
            Raw::Seconds(secs) => DateTime::from_timestamp(secs, 0),
            Raw::Fractional(secs) => {
                DateTime::from_timestamp(secs.trunc() as i64, (secs.fract() * 1e9) as u32)
            }
            Raw::Text(text) => parse_time_text(&text),
        };
        parsed
            .map(StoredTime)
            .ok_or_else(|| serde::de::Error::custom("unrecognised timestamp"))
    }
}

fn parse_time_text(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(time) = DateTime::parse_from_rfc3339(text) {
        return Some(time.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(text, LEGACY_TIME_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// `table` was a number in early records.
fn table_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(i64),
        Text(String),
    }
    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Number(n) => n.to_string(),
        Raw::Text(s) => s,
    }))
}

/// One entry of `items`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredItem {
    Structured(LineItem),
    Text(String),
}

impl From<&LineItem> for StoredItem {
    fn from(item: &LineItem) -> Self {
        let text = item.to_string();
        match text.parse::<LineItem>() {
            Ok(parsed) if parsed == *item => StoredItem::Text(text),
            _ => StoredItem::Structured(item.clone()),
        }
    }
}

impl StoredItem {
    fn into_line_item(self) -> Result<LineItem, LineItemError> {
        match self {
            StoredItem::Structured(item) => item.validate().map(|()| item),
            StoredItem::Text(line) => line.parse(),
        }
    }
}

/// `items` was a single newline-separated string in early records.
fn item_lines<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<StoredItem>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        List(Vec<StoredItem>),
        Text(String),
    }
    Ok(match Raw::deserialize(deserializer)? {
        Raw::List(items) => items,
        Raw::Text(text) => text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| StoredItem::Text(line.to_string()))
            .collect(),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    #[serde(default, deserialize_with = "table_text")]
    pub table: Option<String>,
    #[serde(deserialize_with = "item_lines")]
    pub items: Vec<StoredItem>,
    pub status: StoredStatus,
    #[serde(alias = "timestamp")]
    pub created_at: StoredTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<StoredTime>,
}

impl OrderRecord {
    pub fn from_order(order: &Order) -> Self {
        Self {
            table: Some(order.table.clone()),
            items: order.items.iter().map(StoredItem::from).collect(),
            status: match order.status {
                OrderStatus::Pending => StoredStatus::Pending,
                OrderStatus::Completed { .. } => StoredStatus::Completed,
            },
            created_at: StoredTime(order.created_at),
            completed_at: order.completed_at().map(StoredTime),
        }
    }

    /// Rebuilds the order, rejecting records that break the order invariants.
    pub fn into_order(self, id: OrderId) -> Result<Order, RecordError> {
        let table = self
            .table
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or(RecordError::MissingTable(id))?;
        let items = self
            .items
            .into_iter()
            .map(StoredItem::into_line_item)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| RecordError::BadItem { id, source })?;
        if items.is_empty() {
            return Err(RecordError::NoItems(id));
        }
        let status = match (self.status, self.completed_at) {
            (StoredStatus::Pending, None) => OrderStatus::Pending,
            (StoredStatus::Pending, Some(_)) => return Err(RecordError::UnexpectedCompletion(id)),
            (StoredStatus::Completed, Some(at)) => OrderStatus::Completed { at: at.0 },
            (StoredStatus::Completed, None) => return Err(RecordError::MissingCompletion(id)),
        };
        Ok(Order {
            id,
            table,
            items,
            status,
            created_at: self.created_at.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 17, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_writes_flat_record_with_iso_times() {
        let order = Order {
            id: OrderId::new(),
            table: "5".into(),
            items: vec![LineItem::new("Burger").with_quantity(2), LineItem::new("Coke")],
            status: OrderStatus::Pending,
            created_at: noon(),
        };
        let value = serde_json::to_value(OrderRecord::from_order(&order)).unwrap();
        assert_eq!(
            value,
            json!({
                "table": "5",
                "items": ["2x Burger", "Coke"],
                "status": "pending",
                "created_at": "2024-05-17T12:00:00+00:00",
            })
        );
    }

    #[test]
    fn test_reads_completed_record() {
        let id = OrderId::new();
        let record: OrderRecord = serde_json::from_value(json!({
            "table": "3",
            "items": ["Salad"],
            "status": "completed",
            "created_at": "2024-05-17T12:00:00Z",
            "completed_at": "2024-05-17T12:09:30Z",
        }))
        .unwrap();
        let order = record.into_order(id).unwrap();
        assert_eq!(order.id, id);
        assert_eq!(
            order.completed_at(),
            Some(Utc.with_ymd_and_hms(2024, 5, 17, 12, 9, 30).unwrap())
        );
    }

    #[test]
    fn test_structured_items_keep_brackets_in_names_and_notes() {
        let order = Order {
            id: OrderId::new(),
            table: "4".into(),
            items: vec![
                LineItem::new("Soup (of the day)"),
                LineItem::new("Wings").with_quantity(2).with_note("extra (hot)"),
            ],
            status: OrderStatus::Pending,
            created_at: noon(),
        };
        let record = OrderRecord::from_order(&order);
        assert_eq!(
            serde_json::to_value(&record.items).unwrap(),
            json!([{"name": "Soup (of the day)"}, "2x Wings (extra (hot))"])
        );
        let text = serde_json::to_string(&record).unwrap();
        let record: OrderRecord = serde_json::from_str(&text).unwrap();
        assert_eq!(record.into_order(order.id).unwrap(), order);
    }

    #[test]
    fn test_rejects_structured_items_that_cannot_be_created() {
        let record: OrderRecord = serde_json::from_value(json!({
            "table": "1",
            "items": [{"name": "Soup", "quantity": 0}],
            "status": "pending",
            "created_at": "2024-05-17T12:00:00Z",
        }))
        .unwrap();
        assert!(matches!(
            record.into_order(OrderId::new()),
            Err(RecordError::BadItem {
                source: LineItemError::ZeroQuantity(_),
                ..
            })
        ));
    }

    #[test]
    fn test_reads_legacy_record() {
        let record: OrderRecord = serde_json::from_value(json!({
            "type": "Dine-In",
            "table": 7,
            "items": "2x Cheeseburger\n1x Caesar Salad\n",
            "status": "Done",
            "timestamp": "2024-05-17 12:00:00",
            "completed_at": 1715948100,
        }))
        .unwrap();
        let order = record.into_order(OrderId::new()).unwrap();
        assert_eq!(order.table, "7");
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.items[0].quantity, Some(2));
        assert_eq!(order.created_at, noon());
        assert_eq!(
            order.completed_at(),
            Some(Utc.with_ymd_and_hms(2024, 5, 17, 12, 15, 0).unwrap())
        );
    }

    #[test]
    fn test_pending_legacy_record_with_null_completion() {
        let record: OrderRecord = serde_json::from_value(json!({
            "table": "2",
            "items": ["Tea"],
            "status": "Pending",
            "created_at": 1715947200.5,
            "completed_at": null,
        }))
        .unwrap();
        let order = record.into_order(OrderId::new()).unwrap();
        assert!(order.is_pending());
        assert_eq!(order.created_at.timestamp_millis(), 1715947200500);
    }

    #[test]
    fn test_rejects_inconsistent_records() {
        let id = OrderId::new();
        let takeout: OrderRecord = serde_json::from_value(json!({
            "table": null,
            "items": ["Fries"],
            "status": "pending",
            "created_at": "2024-05-17T12:00:00Z",
        }))
        .unwrap();
        assert!(matches!(takeout.into_order(id), Err(RecordError::MissingTable(_))));

        let unfinished: OrderRecord = serde_json::from_value(json!({
            "table": "1",
            "items": ["Fries"],
            "status": "completed",
            "created_at": "2024-05-17T12:00:00Z",
        }))
        .unwrap();
        assert!(matches!(
            unfinished.into_order(id),
            Err(RecordError::MissingCompletion(_))
        ));

        let bad_time = serde_json::from_value::<OrderRecord>(json!({
            "table": "1",
            "items": ["Fries"],
            "status": "pending",
            "created_at": "yesterday",
        }));
        assert!(bad_time.is_err());
    }
}
