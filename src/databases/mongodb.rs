use super::database::Database;
use crate::benchmark::config::UserQuery;
use crate::benchmark::data_generator::UserRecord;
use crate::error::{BenchError, Result};
use async_trait::async_trait;
use bson::{doc, Bson, Document};
use futures::stream::TryStreamExt;
use mongodb::options::{ClientOptions, FindOptions};
use mongodb::{Client, Collection};
use tracing::{debug, info};

pub const DEFAULT_URI: &str = "mongodb://localhost:27017";

pub struct MongoDB {
    uri: String,
    database: String,
    collection: String,
    client: Option<Client>,
}

#[async_trait]
impl Database for MongoDB {
    fn name(&self) -> &'static str {
        "MongoDB"
    }

    async fn connect(&mut self) -> Result<()> {
        let client_options = ClientOptions::parse(&self.uri).await?;
        let client = Client::with_options(client_options)?;
        // The driver connects lazily; ping so connection failures surface here.
        client
            .database(&self.database)
            .run_command(doc! { "ping": 1 }, None)
            .await?;
        info!(uri = %self.uri, "connected to MongoDB");
        self.client = Some(client);
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<()> {
        if let Some(client) = self.client.take() {
            client.shutdown().await;
            debug!("MongoDB client shut down");
        }
        Ok(())
    }

    async fn clean_database(&self) -> Result<()> {
        self.collection()?.drop(None).await?;
        Ok(())
    }

    async fn insert_user(&self, user: &UserRecord) -> Result<()> {
        let document = user_to_document(user)?;
        self.collection()?.insert_one(document, None).await?;
        Ok(())
    }

    async fn query_users(&self, query: &UserQuery) -> Result<usize> {
        let cursor = self
            .collection()?
            .find(doc! { "name": query.name.as_str() }, find_options(query))
            .await?;
        let docs: Vec<Document> = cursor.try_collect().await?;
        Ok(docs.len())
    }
}

impl MongoDB {
    pub fn new() -> Self {
        Self::with_uri(DEFAULT_URI)
    }

    pub fn with_uri(uri: impl Into<String>) -> Self {
        MongoDB {
            uri: uri.into(),
            database: "benchmark".to_string(),
            collection: "users".to_string(),
            client: None,
        }
    }

    fn collection(&self) -> Result<Collection<Document>> {
        let client = self.client.as_ref().ok_or(BenchError::NotConnected("MongoDB"))?;
        Ok(client
            .database(&self.database)
            .collection::<Document>(&self.collection))
    }
}

impl Default for MongoDB {
    fn default() -> Self {
        Self::new()
    }
}

/// Newest first, paged. Limits past `i64::MAX` saturate.
fn find_options(query: &UserQuery) -> FindOptions {
    FindOptions::builder()
        .sort(doc! { "_id": -1 })
        .skip(query.skip)
        .limit(i64::try_from(query.limit).unwrap_or(i64::MAX))
        .build()
}

fn user_to_document(user: &UserRecord) -> Result<Document> {
    let birthday = bson::DateTime::from_chrono(user.birthday.to_datetime()?);
    Ok(doc! {
        "name": user.name.as_str(),
        "sex": user.sex.as_str(),
        "birthday": Bson::DateTime(birthday),
        "tags": user.tags.clone(),
    })
}
