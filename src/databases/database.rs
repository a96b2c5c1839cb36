use async_trait::async_trait;

use crate::benchmark::config::UserQuery;
use crate::benchmark::data_generator::{GeneratorVariant, UserRecord};
use crate::error::Result;

#[async_trait]
pub trait Database: Send + Sync {
    fn name(&self) -> &'static str;

    /// Which record generator feeds this backend.
    fn variant(&self) -> GeneratorVariant {
        GeneratorVariant::Standard
    }

    async fn connect(&mut self) -> Result<()>;
    /// Releases the connection. Calling it when not connected is a no-op.
    async fn disconnect(&mut self) -> Result<()>;
    async fn clean_database(&self) -> Result<()>;
    async fn insert_user(&self, user: &UserRecord) -> Result<()>;
    /// Runs the query and returns how many records were materialized.
    async fn query_users(&self, query: &UserQuery) -> Result<usize>;
}
