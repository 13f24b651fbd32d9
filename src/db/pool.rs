//! Connection manager for the relational store.
//!
//! sqlx owns the physical connections. In front of it sits a [`PoolGate`] that
//! makes the waiting room explicit: callers beyond `pool_size` queue up to the
//! configured [`QueueLimit`], everyone past that is turned away with
//! [`RepoError::Connection`].

use std::future::Future;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions};
use sqlx::pool::PoolConnection;
use sqlx::{MySql, MySqlConnection, MySqlPool};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{debug, warn};

use super::error::{RepoError, RepoResult};
use crate::config::{DbConfig, QueueLimit};

/// Admission control in front of the sqlx pool.
pub struct PoolGate {
    permits: Arc<Semaphore>,
    waiting: AtomicUsize,
    queue_limit: QueueLimit,
    wait_timeout: Duration,
}

impl PoolGate {
    pub fn new(pool_size: u32, queue_limit: QueueLimit, wait_timeout: Duration) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(pool_size as usize)),
            waiting: AtomicUsize::new(0),
            queue_limit,
            wait_timeout,
        }
    }

    /// Number of callers currently queued for a slot.
    pub fn waiting(&self) -> usize {
        self.waiting.load(Ordering::SeqCst)
    }

    pub async fn enter(&self) -> RepoResult<OwnedSemaphorePermit> {
        if let Ok(permit) = self.permits.clone().try_acquire_owned() {
            return Ok(permit);
        }

        let position = self.waiting.fetch_add(1, Ordering::SeqCst) + 1;
        let _queued = QueueSlot(&self.waiting);

        if let QueueLimit::Bounded(max) = self.queue_limit {
            if position > max {
                return Err(RepoError::Connection(format!(
                    "connection queue is full ({max} waiting)"
                )));
            }
        }

        debug!(position, "waiting for a database connection");
        match tokio::time::timeout(self.wait_timeout, self.permits.clone().acquire_owned()).await
        {
            Ok(Ok(permit)) => Ok(permit),
            Ok(Err(_)) => Err(RepoError::Connection("connection pool is closed".into())),
            Err(_) => Err(RepoError::Connection(format!(
                "no connection available within {:?}",
                self.wait_timeout
            ))),
        }
    }

    pub fn close(&self) {
        self.permits.close();
    }
}

struct QueueSlot<'a>(&'a AtomicUsize);

impl Drop for QueueSlot<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// A checked-out connection. Dropping it hands the connection and its slot back.
pub struct PooledConnection {
    conn: PoolConnection<MySql>,
    _permit: OwnedSemaphorePermit,
}

impl Deref for PooledConnection {
    type Target = MySqlConnection;

    fn deref(&self) -> &Self::Target {
        &self.conn
    }
}

impl DerefMut for PooledConnection {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.conn
    }
}

#[derive(Clone)]
pub struct ConnectionManager {
    pool: MySqlPool,
    gate: Arc<PoolGate>,
    query_timeout: Duration,
}

impl ConnectionManager {
    /// Connect eagerly; used once at process start.
    pub async fn connect(cfg: &DbConfig) -> anyhow::Result<Self> {
        let pool = pool_options(cfg)
            .connect_with(connect_options(cfg))
            .await
            .context("connect to database")?;
        Ok(Self::from_pool(pool, cfg))
    }

    /// Build without touching the network; the first query opens a connection.
    pub fn lazy(cfg: &DbConfig) -> Self {
        let pool = pool_options(cfg).connect_lazy_with(connect_options(cfg));
        Self::from_pool(pool, cfg)
    }

    fn from_pool(pool: MySqlPool, cfg: &DbConfig) -> Self {
        Self {
            pool,
            gate: Arc::new(PoolGate::new(
                cfg.pool_size,
                cfg.queue_limit,
                cfg.acquire_timeout(),
            )),
            query_timeout: cfg.query_timeout(),
        }
    }

    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    pub async fn acquire(&self) -> RepoResult<PooledConnection> {
        let permit = self.gate.enter().await?;
        let conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| RepoError::Connection(e.to_string()))?;
        Ok(PooledConnection {
            conn,
            _permit: permit,
        })
    }

    pub fn release(&self, conn: PooledConnection) {
        drop(conn);
    }

    /// Run a single statement under the per-call timeout.
    pub async fn bounded<T, F>(&self, fut: F) -> RepoResult<T>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        match tokio::time::timeout(self.query_timeout, fut).await {
            Ok(res) => res.map_err(RepoError::from),
            Err(_) => Err(RepoError::Timeout(self.query_timeout)),
        }
    }

    pub async fn health_check(&self) -> bool {
        match self.ping().await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "database health check failed");
                false
            }
        }
    }

    async fn ping(&self) -> RepoResult<()> {
        let mut conn = self.acquire().await?;
        let res = self
            .bounded(sqlx::query_scalar::<_, i64>("SELECT 1").fetch_one(&mut *conn))
            .await;
        self.release(conn);
        res.map(|_| ())
    }

    pub async fn close(&self) {
        self.gate.close();
        self.pool.close().await;
    }
}

fn pool_options(cfg: &DbConfig) -> MySqlPoolOptions {
    MySqlPoolOptions::new()
        .max_connections(cfg.pool_size)
        .acquire_timeout(cfg.acquire_timeout())
}

fn connect_options(cfg: &DbConfig) -> MySqlConnectOptions {
    MySqlConnectOptions::new()
        .host(&cfg.host)
        .port(cfg.port)
        .username(&cfg.user)
        .password(&cfg.password)
        .database(&cfg.database)
}

#[cfg(test)]
pub(crate) fn test_config() -> DbConfig {
    DbConfig {
        host: std::env::var("DB_HOST").unwrap_or_else(|_| "localhost".into()),
        user: std::env::var("DB_USER").unwrap_or_else(|_| "root".into()),
        password: std::env::var("DB_PASSWORD").unwrap_or_default(),
        database: std::env::var("DB_NAME").unwrap_or_else(|_| "fitchat_test".into()),
        port: std::env::var("DB_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3306),
        pool_size: 5,
        queue_limit: QueueLimit::Unbounded,
        acquire_timeout_secs: 2,
        query_timeout_secs: 5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn gate_admits_up_to_pool_size_without_queueing() {
        let gate = PoolGate::new(2, QueueLimit::Bounded(1), Duration::from_secs(1));
        let a = gate.enter().await.expect("first slot");
        let b = gate.enter().await.expect("second slot");
        assert_eq!(gate.waiting(), 0);
        drop((a, b));
    }

    #[tokio::test]
    async fn excess_callers_wait_then_proceed_when_a_slot_frees() {
        let gate = Arc::new(PoolGate::new(1, QueueLimit::Bounded(1), Duration::from_secs(5)));
        let held = gate.enter().await.expect("slot");

        let waiter = {
            let gate = gate.clone();
            tokio::spawn(async move { gate.enter().await.map(|_| ()) })
        };
        while gate.waiting() == 0 {
            tokio::task::yield_now().await;
        }

        drop(held);
        waiter
            .await
            .expect("task")
            .expect("queued caller gets the slot");
        assert_eq!(gate.waiting(), 0);
    }

    #[tokio::test]
    async fn callers_beyond_queue_limit_are_rejected() {
        let gate = Arc::new(PoolGate::new(1, QueueLimit::Bounded(1), Duration::from_secs(5)));
        let held = gate.enter().await.expect("slot");

        let queued = {
            let gate = gate.clone();
            tokio::spawn(async move { gate.enter().await.map(|_| ()) })
        };
        while gate.waiting() == 0 {
            tokio::task::yield_now().await;
        }

        let err = gate.enter().await.unwrap_err();
        assert!(matches!(err, RepoError::Connection(_)));
        assert_eq!(gate.waiting(), 1);

        drop(held);
        queued.await.expect("task").expect("queued caller still served");
    }

    #[tokio::test]
    async fn unbounded_queue_never_rejects() {
        let gate = Arc::new(PoolGate::new(1, QueueLimit::Unbounded, Duration::from_secs(5)));
        let held = gate.enter().await.expect("slot");

        let waiters: Vec<_> = (0..8)
            .map(|_| {
                let gate = gate.clone();
                tokio::spawn(async move { gate.enter().await.map(|_| ()) })
            })
            .collect();
        while gate.waiting() < 8 {
            tokio::task::yield_now().await;
        }

        drop(held);
        for w in waiters {
            w.await.expect("task").expect("every waiter is eventually served");
        }
    }

    #[tokio::test]
    async fn queued_caller_times_out_with_connection_error() {
        let gate = PoolGate::new(1, QueueLimit::Unbounded, Duration::from_millis(50));
        let _held = gate.enter().await.expect("slot");
        let err = gate.enter().await.unwrap_err();
        assert!(matches!(err, RepoError::Connection(_)));
        assert_eq!(gate.waiting(), 0);
    }

    #[tokio::test]
    async fn closed_gate_rejects_waiters() {
        let gate = Arc::new(PoolGate::new(1, QueueLimit::Unbounded, Duration::from_secs(5)));
        let _held = gate.enter().await.expect("slot");
        let waiter = {
            let gate = gate.clone();
            tokio::spawn(async move { gate.enter().await.map(|_| ()) })
        };
        while gate.waiting() == 0 {
            tokio::task::yield_now().await;
        }
        gate.close();
        let err = waiter.await.expect("task").unwrap_err();
        assert!(matches!(err, RepoError::Connection(_)));
    }

    #[tokio::test]
    async fn bounded_reports_timeouts() {
        let db = ConnectionManager::lazy(&DbConfig {
            query_timeout_secs: 0,
            ..test_config()
        });
        let err = db
            .bounded(async {
                tokio::time::sleep(Duration::from_millis(50)).await;
                Ok::<_, sqlx::Error>(())
            })
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Timeout(_)));
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn health_check_reaches_database() {
        let db = ConnectionManager::connect(&test_config())
            .await
            .expect("connect");
        assert!(db.health_check().await);
        db.close().await;
    }

    #[tokio::test]
    async fn health_check_swallows_unreachable_database() {
        let db = ConnectionManager::lazy(&DbConfig {
            host: "127.0.0.1".into(),
            port: 1,
            acquire_timeout_secs: 1,
            ..test_config()
        });
        assert!(!db.health_check().await);
    }
}
