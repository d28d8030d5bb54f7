use crate::board::{BoardSnapshot, OrderBoard};
use crate::clients::OrderClient;
use crate::clock::{Clock, SystemClock};
use crate::config::{ConfigError, Settings};
use crate::journal::OrderJournal;
use crate::model::{Order, OrderFilter};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

const DEFAULT_REFRESH: Duration = Duration::from_secs(5);
const DEFAULT_CAPACITY: usize = 32;

/// The running order system: the order store actor, the controller client in front of it
/// and any polling boards.
///
/// # Lifecycle
///
/// [`OrderSystem::start`] opens the journal, reloads every stored order into the actor and
/// spawns it. [`OrderSystem::shutdown`] stops the boards, drops the last client so the
/// actor's channel closes, and waits for the actor task to finish.
///
/// ```ignore
/// let settings = Settings::load()?;
/// let mut system = OrderSystem::start(&settings).await?;
/// let kitchen = system.spawn_board(OrderFilter::Pending);
///
/// let order = system.order_client.create("5", items).await?;
/// system.order_client.complete(order.id).await?;
///
/// system.shutdown().await?;
/// ```
pub struct OrderSystem {
    /// Controller for every order write
    pub order_client: OrderClient,

    refresh_interval: Duration,
    shutdown: watch::Sender<bool>,
    actor_handle: JoinHandle<()>,
    board_handles: Vec<JoinHandle<()>>,
}

impl OrderSystem {
    /// Starts the system described by `settings`.
    ///
    /// # Errors
    /// [`ConfigError::DataDir`] when the data directory cannot be created or read.
    pub async fn start(settings: &Settings) -> Result<Self, ConfigError> {
        let dir = settings.data_dir()?;
        let data_dir_error = |source| ConfigError::DataDir {
            path: dir.to_path_buf(),
            source,
        };
        let journal = OrderJournal::open(dir).await.map_err(data_dir_error)?;
        let existing = journal.load().await.map_err(data_dir_error)?;

        Ok(Self::launch(
            journal,
            existing,
            settings.store.channel_capacity,
            Some(settings.request_timeout()),
            settings.refresh_interval(),
            Arc::new(SystemClock),
        ))
    }

    /// A system that keeps orders in memory only. Must be called inside a Tokio runtime.
    pub fn in_memory(clock: Arc<dyn Clock>) -> Self {
        Self::launch(
            OrderJournal::in_memory(),
            Vec::new(),
            DEFAULT_CAPACITY,
            None,
            DEFAULT_REFRESH,
            clock,
        )
    }

    fn launch(
        journal: OrderJournal,
        existing: Vec<Order>,
        capacity: usize,
        request_timeout: Option<Duration>,
        refresh_interval: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let (actor, store) = crate::order_actor::new(capacity);
        let actor = actor.with_records(existing.into_iter().map(|order| (order.id, order)));
        let store = match request_timeout {
            Some(limit) => store.with_timeout(limit),
            None => store,
        };
        info!(
            orders = actor.len(),
            persistent = journal.dir().is_some(),
            "Starting order system"
        );

        let actor_handle = tokio::spawn(actor.run(journal));
        let (shutdown, _) = watch::channel(false);

        Self {
            order_client: OrderClient::with_clock(store, clock),
            refresh_interval,
            shutdown,
            actor_handle,
            board_handles: Vec::new(),
        }
    }

    pub fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }

    /// Starts a board for `filter` on the configured refresh interval.
    pub fn spawn_board(&mut self, filter: OrderFilter) -> watch::Receiver<BoardSnapshot> {
        self.spawn_board_every(filter, self.refresh_interval)
    }

    pub fn spawn_board_every(
        &mut self,
        filter: OrderFilter,
        period: Duration,
    ) -> watch::Receiver<BoardSnapshot> {
        let (board, snapshots) = OrderBoard::new(self.order_client.clone(), filter);
        let handle = tokio::spawn(board.run(period, self.shutdown.subscribe()));
        self.board_handles.push(handle);
        snapshots
    }

    /// Stops the boards and the store actor.
    ///
    /// # Returns
    ///
    /// - `Ok(())` if every task finished cleanly
    /// - `Err(String)` if a task panicked
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down order system...");

        // Boards hold client clones; they must stop before the actor can see its channel close
        self.shutdown.send_replace(true);
        for handle in self.board_handles {
            if let Err(e) = handle.await {
                error!("Board task failed: {:?}", e);
                return Err(format!("Board task failed: {:?}", e));
            }
        }

        drop(self.order_client);
        if let Err(e) = self.actor_handle.await {
            error!("Actor task failed: {:?}", e);
            return Err(format!("Actor task failed: {:?}", e));
        }

        info!("Order system shutdown complete.");
        Ok(())
    }
}
