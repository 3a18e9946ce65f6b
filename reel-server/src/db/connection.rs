//! Process-wide store connection
//!
//! Lifecycle of the slot:
//! - `Uninitialized`: nobody has connected yet, or the last attempt failed
//! - `Pending`: one attempt is in flight; every caller awaits the same future
//! - `Ready`: the handle is cached and returned without reconnecting
//!
//! A failed attempt is reported to every caller that awaited it, then the
//! slot returns to `Uninitialized` so the next caller starts a fresh attempt.

use futures::future::{BoxFuture, FutureExt, Shared};
use sqlx::SqlitePool;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Connection attempt failure, shared by every caller that awaited the attempt
#[derive(Debug, Clone, Error)]
#[error("store connection failed: {0}")]
pub struct ConnectionError(pub String);

impl From<sqlx::Error> for ConnectionError {
    fn from(err: sqlx::Error) -> Self {
        ConnectionError(err.to_string())
    }
}

type ConnectFuture<H> = BoxFuture<'static, Result<H, ConnectionError>>;
type Connector<H> = Arc<dyn Fn() -> ConnectFuture<H> + Send + Sync>;

enum Slot<H> {
    Uninitialized,
    Pending {
        attempt: u64,
        init: Shared<ConnectFuture<H>>,
    },
    Ready(H),
}

/// Lazily established, memoized connection handle
///
/// Generic over the handle so the lifecycle can be exercised without a
/// database; the service uses [`StoreConnection`].
pub struct ConnectionManager<H> {
    slot: Mutex<Slot<H>>,
    connector: Connector<H>,
    attempts: AtomicU64,
}

/// Connection manager for the SQLite video store
pub type StoreConnection = ConnectionManager<SqlitePool>;

impl<H> ConnectionManager<H>
where
    H: Clone + Send + Sync + 'static,
{
    /// Create a manager that connects with `connect` on first use
    pub fn new<F, Fut>(connect: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<H, ConnectionError>> + Send + 'static,
    {
        Self {
            slot: Mutex::new(Slot::Uninitialized),
            connector: Arc::new(move || connect().boxed()),
            attempts: AtomicU64::new(0),
        }
    }

    /// Return the shared handle, connecting first if needed
    pub async fn acquire(&self) -> Result<H, ConnectionError> {
        let (attempt, init) = {
            let mut slot = self.slot.lock().await;
            let in_flight = match &*slot {
                Slot::Ready(handle) => return Ok(handle.clone()),
                Slot::Pending { attempt, init } => Some((*attempt, init.clone())),
                Slot::Uninitialized => None,
            };

            match in_flight {
                Some(pending) => pending,
                None => {
                    let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
                    debug!(attempt, "Starting store connection attempt");
                    let init = (self.connector)().shared();
                    *slot = Slot::Pending {
                        attempt,
                        init: init.clone(),
                    };
                    (attempt, init)
                }
            }
        };

        let result = init.await;

        // Only the attempt that is still current may settle the slot.
        let mut slot = self.slot.lock().await;
        if matches!(&*slot, Slot::Pending { attempt: current, .. } if *current == attempt) {
            match &result {
                Ok(handle) => {
                    info!(attempt, "Store connection ready");
                    *slot = Slot::Ready(handle.clone());
                }
                Err(e) => {
                    warn!(attempt, error = %e, "Store connection attempt failed, next caller will retry");
                    *slot = Slot::Uninitialized;
                }
            }
        }

        result
    }

    /// Whether a handle is cached
    pub async fn is_ready(&self) -> bool {
        matches!(&*self.slot.lock().await, Slot::Ready(_))
    }

    /// Number of connection attempts started so far
    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl StoreConnection {
    /// Manager for an sqlx SQLite URL; nothing is opened until first use
    pub fn sqlite(database_url: impl Into<String>, max_connections: u32) -> Self {
        let url: Arc<str> = Arc::from(database_url.into());
        Self::new(move || {
            let url = Arc::clone(&url);
            async move {
                super::connect(&url, max_connections)
                    .await
                    .map_err(ConnectionError::from)
            }
        })
    }
}
