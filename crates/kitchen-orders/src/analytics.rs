//! Service report over a set of orders: volumes, timing and what sells.

use crate::model::Order;
use chrono::{Duration, NaiveDate, Timelike};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

const PEAK_HOURS: usize = 5;
const TOP_TABLES: usize = 10;
const TOP_ITEMS: usize = 10;

/// Inclusive range of creation dates (UTC). Open ends are unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl ReportRange {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn between(from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
        }
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.from.map_or(true, |from| from <= day) && self.to.map_or(true, |to| day <= to)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub range: ReportRange,
    pub total: usize,
    pub pending: usize,
    pub completed: usize,
    /// Orders per creation day.
    pub daily: BTreeMap<NaiveDate, usize>,
    /// Orders per hour of day, index 0 is 00:00-01:00.
    pub hourly: [usize; 24],
    /// Busiest hours, most orders first.
    pub peak_hours: Vec<(u32, usize)>,
    /// Tables by number of orders, most first.
    pub busiest_tables: Vec<(String, usize)>,
    /// Dishes by portions ordered, most first.
    pub top_items: Vec<(String, u64)>,
    /// Mean time from creation to completion over completed orders.
    pub average_time_to_complete: Option<Duration>,
}

impl Report {
    pub fn build(orders: &[Order], range: &ReportRange) -> Self {
        let selected: Vec<&Order> = orders
            .iter()
            .filter(|order| range.contains(order.created_at.date_naive()))
            .collect();

        let mut daily = BTreeMap::new();
        let mut hourly = [0usize; 24];
        let mut tables: HashMap<&str, usize> = HashMap::new();
        let mut items: HashMap<&str, u64> = HashMap::new();
        let mut completion_total = Duration::zero();
        let mut completed = 0usize;

        for order in &selected {
            *daily.entry(order.created_at.date_naive()).or_insert(0) += 1;
            hourly[order.created_at.hour() as usize] += 1;
            *tables.entry(order.table.as_str()).or_insert(0) += 1;
            for item in &order.items {
                *items.entry(item.name.as_str()).or_insert(0) += u64::from(item.units());
            }
            if let Some(done) = order.completed_at() {
                completed += 1;
                completion_total += done - order.created_at;
            }
        }

        let mut peak_hours: Vec<(u32, usize)> = hourly
            .iter()
            .enumerate()
            .filter(|(_, count)| **count > 0)
            .map(|(hour, count)| (hour as u32, *count))
            .collect();
        peak_hours.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        peak_hours.truncate(PEAK_HOURS);

        Self {
            range: *range,
            total: selected.len(),
            pending: selected.len() - completed,
            completed,
            daily,
            hourly,
            peak_hours,
            busiest_tables: ranked(tables, TOP_TABLES),
            top_items: ranked(items, TOP_ITEMS),
            average_time_to_complete: (completed > 0)
                .then(|| completion_total / completed as i32),
        }
    }

    /// Share of orders completed, in percent. Zero when there are no orders.
    pub fn completion_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.completed as f64 * 100.0 / self.total as f64
        }
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        self.daily.keys().next().copied()
    }

    pub fn last_day(&self) -> Option<NaiveDate> {
        self.daily.keys().next_back().copied()
    }
}

/// Highest counts first, ties by name so reports are stable.
fn ranked<N: Ord + Copy>(counts: HashMap<&str, N>, limit: usize) -> Vec<(String, N)> {
    let mut ranked: Vec<(String, N)> = counts
        .into_iter()
        .map(|(name, count)| (name.to_string(), count))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(limit);
    ranked
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Orders: {} ({} completed, {} pending, {:.1}% completion)",
            self.total,
            self.completed,
            self.pending,
            self.completion_rate()
        )?;
        if let (Some(first), Some(last)) = (self.first_day(), self.last_day()) {
            writeln!(f, "Days: {} to {} ({} with orders)", first, last, self.daily.len())?;
        }
        if let Some(average) = self.average_time_to_complete {
            writeln!(
                f,
                "Average time to complete: {}m {:02}s",
                average.num_minutes(),
                average.num_seconds() % 60
            )?;
        }
        if !self.peak_hours.is_empty() {
            writeln!(f, "Peak hours:")?;
            for (hour, count) in &self.peak_hours {
                writeln!(f, "  {:02}:00-{:02}:00  {}", hour, (hour + 1) % 24, count)?;
            }
        }
        if !self.busiest_tables.is_empty() {
            writeln!(f, "Busiest tables:")?;
            for (table, count) in &self.busiest_tables {
                writeln!(f, "  table {}  {}", table, count)?;
            }
        }
        if !self.top_items.is_empty() {
            writeln!(f, "Top items:")?;
            for (name, units) in &self.top_items {
                writeln!(f, "  {}x {}", units, name)?;
            }
        }
        Ok(())
    }
}
