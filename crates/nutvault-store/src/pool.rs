//! A minimal async connection pool for `tokio_postgres`, kept in-crate to
//! avoid an external pooling dependency for something this small — the
//! same call the teacher's SQL layer makes for its own (sync) SQLite pool.
//!
//! Resources are handed out from a queue guarded by a plain `Mutex`; a
//! `tokio::sync::Notify` wakes waiters instead of blocking a worker thread
//! the way a `Condvar` would, since resource acquisition happens on the
//! async path here.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::Notify;
use tokio_postgres::Client;

#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    #[error("timed out waiting for a database connection")]
    Timeout,
    #[error("database connection error: {0}")]
    Connect(#[from] tokio_postgres::Error),
}

struct Idle {
    client: Client,
}

/// Pool of live `tokio_postgres` connections to one DSN.
pub struct Pool {
    dsn: String,
    queue: Mutex<Vec<Idle>>,
    in_use: AtomicUsize,
    max_size: usize,
    default_timeout: Duration,
    waiter: Notify,
}

impl std::fmt::Debug for Pool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pool")
            .field("max_size", &self.max_size)
            .field("in_use", &self.in_use.load(Ordering::Relaxed))
            .finish()
    }
}

impl Pool {
    pub fn new(dsn: impl Into<String>, max_size: usize, default_timeout: Duration) -> Arc<Self> {
        Arc::new(Self {
            dsn: dsn.into(),
            queue: Mutex::new(Vec::new()),
            in_use: AtomicUsize::new(0),
            max_size,
            default_timeout,
            waiter: Notify::new(),
        })
    }

    pub async fn get(self: &Arc<Self>) -> Result<PooledConnection, PoolError> {
        self.get_timeout(self.default_timeout).await
    }

    pub async fn get_timeout(
        self: &Arc<Self>,
        timeout: Duration,
    ) -> Result<PooledConnection, PoolError> {
        let deadline = tokio::time::Instant::now() + timeout;

        loop {
            if let Some(idle) = self.queue.lock().expect("pool mutex poisoned").pop() {
                self.in_use.fetch_add(1, Ordering::AcqRel);
                return Ok(PooledConnection {
                    client: Some(idle.client),
                    pool: self.clone(),
                });
            }

            if self.in_use.load(Ordering::Relaxed) < self.max_size {
                self.in_use.fetch_add(1, Ordering::AcqRel);
                match self.connect().await {
                    Ok(client) => {
                        return Ok(PooledConnection {
                            client: Some(client),
                            pool: self.clone(),
                        })
                    }
                    Err(e) => {
                        self.in_use.fetch_sub(1, Ordering::AcqRel);
                        return Err(e);
                    }
                }
            }

            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            if remaining.is_zero() {
                return Err(PoolError::Timeout);
            }
            let notified = self.waiter.notified();
            if tokio::time::timeout(remaining, notified).await.is_err() {
                tracing::warn!(max_size = self.max_size, "timed out waiting for a database connection");
                return Err(PoolError::Timeout);
            }
        }
    }

    async fn connect(&self) -> Result<Client, PoolError> {
        let (client, connection) = tokio_postgres::connect(&self.dsn, tokio_postgres::NoTls).await?;
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!(error = %e, "postgres connection task terminated");
            }
        });
        Ok(client)
    }
}

/// A connection on loan from the pool. Returned to the queue on drop so a
/// panicking or early-returning caller can never leak it.
pub struct PooledConnection {
    client: Option<Client>,
    pool: Arc<Pool>,
}

impl std::ops::Deref for PooledConnection {
    type Target = Client;

    fn deref(&self) -> &Client {
        self.client.as_ref().expect("connection already returned to pool")
    }
}

impl std::ops::DerefMut for PooledConnection {
    fn deref_mut(&mut self) -> &mut Client {
        self.client.as_mut().expect("connection already returned to pool")
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        if let Some(client) = self.client.take() {
            self.pool.queue.lock().expect("pool mutex poisoned").push(Idle { client });
            self.pool.in_use.fetch_sub(1, Ordering::AcqRel);
            self.pool.waiter.notify_one();
        }
    }
}
