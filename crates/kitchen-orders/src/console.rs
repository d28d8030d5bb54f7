//! Line-oriented console for waiters and the kitchen.
//!
//! ```text
//! new 5: 2x Burger (no onions), Coke
//! ls pending
//! done 3f2a
//! rm 3f2a
//! report 2024-05-01 2024-05-31
//! export orders.csv 2024-05-01 2024-05-31
//! quit
//! ```
//!
//! Orders can be named by any unambiguous prefix of their id.

use crate::analytics::{Report, ReportRange};
use crate::clients::OrderClient;
use crate::export;
use crate::model::{LineItem, LineItemError, OrderFilter, OrderId};
use crate::order_actor::OrderError;
use chrono::NaiveDate;
use std::path::PathBuf;
use std::str::FromStr;
use store_actor::ActorClient;
use thiserror::Error;

pub const HELP: &str = "commands: new <table>: <items> | done <id> | rm <id> | ls [pending|completed|all] | report [from] [to] | export <file> [from] [to] | help | quit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    New { table: String, items: Vec<LineItem> },
    Done(String),
    Remove(String),
    List(OrderFilter),
    Report(ReportRange),
    Export { path: PathBuf, range: ReportRange },
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("empty command")]
    Empty,
    #[error("unknown command {0:?}")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error(transparent)]
    Item(#[from] LineItemError),
    #[error("{0}")]
    Filter(String),
    #[error("invalid date {0:?}, expected YYYY-MM-DD")]
    Date(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConsoleError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Order(#[from] OrderError),
    #[error("{count} orders start with {prefix:?}, type more of the id")]
    Ambiguous { prefix: String, count: usize },
    #[error("cannot export to {}: {message}", .path.display())]
    Export { path: PathBuf, message: String },
}

/// Text shown to the operator when a command fails. A store outage may be transient, so
/// it comes with a hint to try again.
pub fn describe_failure(error: &ConsoleError) -> String {
    match error {
        ConsoleError::Order(OrderError::StoreUnavailable(_)) => {
            format!("failed: {}, retry the command", error)
        }
        other => format!("failed: {}", other),
    }
}

impl FromStr for Command {
    type Err = ParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map(|(word, rest)| (word, rest.trim()))
            .unwrap_or((line, ""));

        match word.to_ascii_lowercase().as_str() {
            "" => Err(ParseError::Empty),
            "new" => {
                let (table, items) = rest
                    .split_once(':')
                    .ok_or(ParseError::Usage("new <table>: <items>"))?;
                Ok(Command::New {
                    table: table.trim().to_string(),
                    items: LineItem::parse_list(items)?,
                })
            }
            "done" | "complete" => single_arg(rest, "done <id>").map(Command::Done),
            "rm" | "delete" => single_arg(rest, "rm <id>").map(Command::Remove),
            "ls" | "list" => {
                if rest.is_empty() {
                    Ok(Command::List(OrderFilter::All))
                } else {
                    rest.parse().map(Command::List).map_err(ParseError::Filter)
                }
            }
            "report" => parse_range(rest, "report [from] [to]").map(Command::Report),
            "export" => {
                const USAGE: &str = "export <file> [from] [to]";
                let (path, dates) = rest
                    .split_once(char::is_whitespace)
                    .map(|(path, dates)| (path, dates.trim()))
                    .unwrap_or((rest, ""));
                if path.is_empty() {
                    return Err(ParseError::Usage(USAGE));
                }
                Ok(Command::Export {
                    path: PathBuf::from(path),
                    range: parse_range(dates, USAGE)?,
                })
            }
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            other => Err(ParseError::Unknown(other.to_string())),
        }
    }
}

fn single_arg(rest: &str, usage: &'static str) -> Result<String, ParseError> {
    match rest.split_whitespace().collect::<Vec<_>>().as_slice() {
        [arg] => Ok(arg.to_string()),
        _ => Err(ParseError::Usage(usage)),
    }
}

/// No dates for everything, one date for that day, two for an inclusive span.
fn parse_range(text: &str, usage: &'static str) -> Result<ReportRange, ParseError> {
    let dates = text
        .split_whitespace()
        .map(parse_date)
        .collect::<Result<Vec<_>, _>>()?;
    match dates.as_slice() {
        [] => Ok(ReportRange::all()),
        [day] => Ok(ReportRange::between(*day, *day)),
        [from, to] => Ok(ReportRange::between(*from, *to)),
        _ => Err(ParseError::Usage(usage)),
    }
}

fn parse_date(text: &str) -> Result<NaiveDate, ParseError> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(|_| ParseError::Date(text.to_string()))
}

/// What the console should do after a command.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Text(String),
    Quit,
}

/// Finds the order whose id is `prefix` or starts with it.
pub async fn resolve_id(client: &OrderClient, prefix: &str) -> Result<OrderId, ConsoleError> {
    if let Ok(id) = prefix.parse::<OrderId>() {
        return Ok(id);
    }
    let needle = prefix.to_ascii_lowercase().replace('-', "");
    let matches: Vec<OrderId> = client
        .list(OrderFilter::All)
        .await?
        .into_iter()
        .map(|order| order.id)
        .filter(|id| id.0.simple().to_string().starts_with(&needle))
        .collect();
    match matches.as_slice() {
        [id] => Ok(*id),
        [] => Err(OrderError::NotFound(prefix.to_string()).into()),
        _ => Err(ConsoleError::Ambiguous {
            prefix: prefix.to_string(),
            count: matches.len(),
        }),
    }
}

pub async fn execute(client: &OrderClient, command: Command) -> Result<Reply, ConsoleError> {
    let text = match command {
        Command::New { table, items } => {
            let order = client.create(&table, items).await?;
            format!("placed {}", order)
        }
        Command::Done(prefix) => {
            let id = resolve_id(client, &prefix).await?;
            let order = client.complete(id).await?;
            format!("completed {}", order)
        }
        Command::Remove(prefix) => {
            let id = resolve_id(client, &prefix).await?;
            client.delete(id).await?;
            format!("removed {}", id.short())
        }
        Command::List(filter) => {
            let orders = client.list(filter).await?;
            let now = client.clock().now();
            let mut lines = vec![format!("{} {} orders", orders.len(), filter)];
            lines.extend(orders.iter().map(|order| {
                format!("  {} ({}m)", order, order.waiting_for(now).num_minutes())
            }));
            lines.join("\n")
        }
        Command::Report(range) => {
            let orders = client.list(OrderFilter::All).await?;
            Report::build(&orders, &range).to_string()
        }
        Command::Export { path, range } => {
            let orders = client.list(OrderFilter::All).await?;
            let export_error = |message: String| ConsoleError::Export {
                path: path.clone(),
                message,
            };
            let mut buffer = Vec::new();
            let written = export::write_csv(&orders, &range, &mut buffer)
                .map_err(|e| export_error(e.to_string()))?;
            tokio::fs::write(&path, buffer)
                .await
                .map_err(|e| export_error(e.to_string()))?;
            format!("exported {} orders to {}", written, path.display())
        }
        Command::Help => HELP.to_string(),
        Command::Quit => return Ok(Reply::Quit),
    };
    Ok(Reply::Text(text))
}
