use async_trait::async_trait;
use serde_json::{json, Value};

use super::database::Database;
use crate::benchmark::config::UserQuery;
use crate::benchmark::data_generator::{GeneratorVariant, UserRecord};
use crate::diana::{DianaClient, DianaConfig, FieldDef, FieldType, ModelDef, SortSpec};
use crate::error::{BenchError, Result};

static USER_SCHEMA: [FieldDef; 4] = [
    FieldDef::required("name", FieldType::String),
    FieldDef::required("sex", FieldType::String),
    FieldDef::optional("birthday", FieldType::Time),
    FieldDef::optional("tags", FieldType::Array(&FieldType::String)),
];

pub static USER_MODEL: ModelDef = ModelDef {
    database: "user",
    collection: "user",
    name: "User",
    schema: &USER_SCHEMA,
};

pub struct DianaDB {
    config: DianaConfig,
    client: Option<DianaClient>,
}

#[async_trait]
impl Database for DianaDB {
    fn name(&self) -> &'static str {
        "DianaDB"
    }

    fn variant(&self) -> GeneratorVariant {
        GeneratorVariant::FixedInstants
    }

    async fn connect(&mut self) -> Result<()> {
        let mut client = DianaClient::new(self.config.clone());
        client.connect(self.config.connect_timeout).await?;
        self.client = Some(client);
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<()> {
        if let Some(mut client) = self.client.take() {
            client.disconnect().await?;
        }
        Ok(())
    }

    /// DianaDB has no drop command in its client contract; the collection is
    /// left as is.
    async fn clean_database(&self) -> Result<()> {
        self.client()?;
        Ok(())
    }

    async fn insert_user(&self, user: &UserRecord) -> Result<()> {
        let document = user_document(user);
        self.client()?.model(&USER_MODEL).insert(&document).await?;
        Ok(())
    }

    async fn query_users(&self, query: &UserQuery) -> Result<usize> {
        let documents = self
            .client()?
            .model(&USER_MODEL)
            .find(
                vec![json!({ "name": query.name })],
                Vec::new(),
                &SortSpec::new().desc("_id"),
                query.skip,
                query.limit,
            )
            .await?;
        Ok(documents.len())
    }
}

impl DianaDB {
    pub fn new() -> Self {
        Self::with_config(DianaConfig::default())
    }

    pub fn with_config(config: DianaConfig) -> Self {
        DianaDB {
            config,
            client: None,
        }
    }

    fn client(&self) -> Result<&DianaClient> {
        self.client.as_ref().ok_or(BenchError::NotConnected("DianaDB"))
    }
}

/// Document sent on insert; the birthday travels as RFC 3339 text.
pub fn user_document(user: &UserRecord) -> Value {
    json!({
        "name": user.name,
        "sex": user.sex.as_str(),
        "birthday": user.birthday.to_text(),
        "tags": user.tags,
    })
}

impl Default for DianaDB {
    fn default() -> Self {
        Self::new()
    }
}
