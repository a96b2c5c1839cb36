//! Pooled DianaDB client.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::config::DianaConfig;
use super::connection::Connection;
use super::error::{Error, Result};
use super::model::{Model, ModelDef};
use super::protocol::Request;

/// Fixed set of connections, handed out round-robin.
struct Pool {
    connections: Vec<Mutex<Connection>>,
    next: AtomicUsize,
}

impl Pool {
    fn pick(&self) -> &Mutex<Connection> {
        let idx = self.next.fetch_add(1, Ordering::Relaxed) % self.connections.len();
        &self.connections[idx]
    }
}

pub struct DianaClient {
    config: DianaConfig,
    pool: Option<Pool>,
}

impl DianaClient {
    pub fn new(config: DianaConfig) -> Self {
        Self { config, pool: None }
    }

    pub fn config(&self) -> &DianaConfig {
        &self.config
    }

    pub fn is_connected(&self) -> bool {
        self.pool.is_some()
    }

    /// Open `pool_size` connections (at least one). The whole pool must be
    /// ready within `timeout`; each connection is also bounded by the
    /// configured connect timeout.
    pub async fn connect(&mut self, timeout: Duration) -> Result<()> {
        if self.pool.is_some() {
            return Ok(());
        }

        let size = self.config.pool_size.max(1);
        let mut opened = Vec::with_capacity(size);
        let result = tokio::time::timeout(timeout, async {
            for _ in 0..size {
                opened.push(Connection::open(&self.config, self.config.connect_timeout).await?);
            }
            Ok::<_, Error>(())
        })
        .await
        .map_err(|_| Error::Timeout(timeout))
        .and_then(|inner| inner);

        if let Err(e) = result {
            for connection in opened {
                let _ = connection.close().await;
            }
            return Err(e);
        }

        info!(address = %self.config.address(), pool_size = size, "connected to DianaDB");
        self.pool = Some(Pool {
            connections: opened.into_iter().map(Mutex::new).collect(),
            next: AtomicUsize::new(0),
        });
        Ok(())
    }

    /// Close every pooled connection. A no-op when not connected.
    pub async fn disconnect(&mut self) -> Result<()> {
        if let Some(pool) = self.pool.take() {
            for connection in pool.connections {
                if let Err(e) = connection.into_inner().close().await {
                    warn!("error closing DianaDB connection: {}", e);
                }
            }
            info!("disconnected from DianaDB");
        }
        Ok(())
    }

    pub fn model(&self, def: &'static ModelDef) -> Model<'_> {
        Model::new(self, def)
    }

    pub(crate) async fn request(&self, request: &Request) -> Result<Value> {
        let pool = self.pool.as_ref().ok_or(Error::NotConnected)?;
        let mut connection = pool.pick().lock().await;
        if connection.is_broken() {
            warn!(address = %connection.address(), "reopening broken DianaDB connection");
            let fresh = Connection::open(&self.config, self.config.connect_timeout).await?;
            let stale = std::mem::replace(&mut *connection, fresh);
            let _ = stale.close().await;
        }
        connection.request(request).await
    }
}
