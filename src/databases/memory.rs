use async_trait::async_trait;
use tokio::sync::Mutex;

use super::database::Database;
use crate::benchmark::config::UserQuery;
use crate::benchmark::data_generator::UserRecord;
use crate::error::{BenchError, Result};

/// Process-local backend. Ids are assigned sequentially on insert, so
/// descending id order is reverse insertion order.
pub struct InMemory {
    rows: Mutex<Vec<(u64, UserRecord)>>,
    next_id: Mutex<u64>,
    connected: bool,
}

#[async_trait]
impl Database for InMemory {
    fn name(&self) -> &'static str {
        "InMemory"
    }

    async fn connect(&mut self) -> Result<()> {
        self.connected = true;
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<()> {
        self.connected = false;
        Ok(())
    }

    async fn clean_database(&self) -> Result<()> {
        self.ensure_connected()?;
        self.rows.lock().await.clear();
        Ok(())
    }

    async fn insert_user(&self, user: &UserRecord) -> Result<()> {
        self.ensure_connected()?;
        let mut next_id = self.next_id.lock().await;
        *next_id += 1;
        self.rows.lock().await.push((*next_id, user.clone()));
        Ok(())
    }

    async fn query_users(&self, query: &UserQuery) -> Result<usize> {
        Ok(self.find(query).await?.len())
    }
}

impl InMemory {
    pub fn new() -> Self {
        InMemory {
            rows: Mutex::new(Vec::new()),
            next_id: Mutex::new(0),
            connected: false,
        }
    }

    /// Rows matching `query` as `(id, record)`, newest first.
    pub async fn find(&self, query: &UserQuery) -> Result<Vec<(u64, UserRecord)>> {
        self.ensure_connected()?;
        let rows = self.rows.lock().await;
        Ok(rows
            .iter()
            .rev()
            .filter(|(_, user)| user.name == query.name)
            .skip(query.skip as usize)
            .take(query.limit as usize)
            .cloned()
            .collect())
    }

    pub async fn len(&self) -> usize {
        self.rows.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn ensure_connected(&self) -> Result<()> {
        if self.connected {
            Ok(())
        } else {
            Err(BenchError::NotConnected("InMemory"))
        }
    }
}

impl Default for InMemory {
    fn default() -> Self {
        Self::new()
    }
}
