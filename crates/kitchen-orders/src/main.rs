use kitchen_orders::board::BoardSnapshot;
use kitchen_orders::config::Settings;
use kitchen_orders::console::{self, Command, Reply, HELP};
use kitchen_orders::lifecycle::OrderSystem;
use kitchen_orders::model::OrderFilter;
use store_actor::tracing::setup_tracing;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tracing::{debug, error, info, warn, Instrument};

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    let settings = Settings::load().map_err(|e| {
        error!(error = %e, "Invalid configuration");
        e.to_string()
    })?;
    let mut system = OrderSystem::start(&settings).await.map_err(|e| {
        error!(error = %e, "Order system failed to start");
        e.to_string()
    })?;

    let snapshots = system.spawn_board(OrderFilter::All);
    tokio::spawn(log_board(snapshots));

    info!(refresh_secs = settings.refresh.interval_secs, "Kitchen ready");
    println!("{}", HELP);

    let client = system.order_client.clone();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line,
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
        };
        let line = match line {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                error!(error = %e, "Cannot read input");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };
        let span = tracing::info_span!("command", line = %line.trim());
        match console::execute(&client, command).instrument(span).await {
            Ok(Reply::Text(text)) => println!("{}", text),
            Ok(Reply::Quit) => break,
            Err(e) => println!("{}", console::describe_failure(&e)),
        }
    }

    drop(client);
    system.shutdown().await?;
    Ok(())
}

/// Logs every snapshot the kitchen board publishes until the board stops.
async fn log_board(mut snapshots: watch::Receiver<BoardSnapshot>) {
    while snapshots.changed().await.is_ok() {
        let snapshot = snapshots.borrow_and_update().clone();
        if snapshot.stale {
            warn!(
                failed_ticks = snapshot.failed_ticks,
                shown = snapshot.orders.len(),
                "Kitchen board is stale"
            );
        } else {
            debug!(
                pending = snapshot.counts.pending,
                completed = snapshot.counts.completed,
                total = snapshot.counts.total(),
                "Kitchen board"
            );
        }
    }
}
