//! Schema-typed collections.
//!
//! A [`ModelDef`] is a static declaration of a collection and the fields its
//! documents carry. [`Model`] binds one to a connected client and checks
//! documents against the schema before they leave the process.

use chrono::DateTime;
use serde_json::{Map, Value};

use super::client::DianaClient;
use super::error::{Error, Result};
use super::protocol::Request;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Number,
    Boolean,
    /// RFC 3339 timestamp string.
    Time,
    Array(&'static FieldType),
}

impl FieldType {
    fn matches(&self, value: &Value) -> bool {
        match (self, value) {
            (FieldType::String, Value::String(_)) => true,
            (FieldType::Number, Value::Number(_)) => true,
            (FieldType::Boolean, Value::Bool(_)) => true,
            (FieldType::Time, Value::String(s)) => DateTime::parse_from_rfc3339(s).is_ok(),
            (FieldType::Array(items), Value::Array(values)) => {
                values.iter().all(|v| items.matches(v))
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    pub name: &'static str,
    pub field_type: FieldType,
    pub required: bool,
}

impl FieldDef {
    pub const fn required(name: &'static str, field_type: FieldType) -> Self {
        Self {
            name,
            field_type,
            required: true,
        }
    }

    pub const fn optional(name: &'static str, field_type: FieldType) -> Self {
        Self {
            name,
            field_type,
            required: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelDef {
    pub database: &'static str,
    pub collection: &'static str,
    pub name: &'static str,
    pub schema: &'static [FieldDef],
}

impl ModelDef {
    /// Check `document` against the schema. `_id` is always allowed since the
    /// server assigns it.
    pub fn validate(&self, document: &Value) -> Result<()> {
        let object = document
            .as_object()
            .ok_or_else(|| self.rejected("document is not an object".to_string()))?;

        for field in self.schema {
            match object.get(field.name) {
                None | Some(Value::Null) if field.required => {
                    return Err(self.rejected(format!("missing required field `{}`", field.name)));
                }
                None | Some(Value::Null) => {}
                Some(value) if !field.field_type.matches(value) => {
                    return Err(self.rejected(format!(
                        "field `{}` is not a {:?}",
                        field.name, field.field_type
                    )));
                }
                Some(_) => {}
            }
        }

        if let Some(unknown) = object
            .keys()
            .find(|key| *key != "_id" && !self.schema.iter().any(|f| f.name == key.as_str()))
        {
            return Err(self.rejected(format!("unknown field `{unknown}`")));
        }
        Ok(())
    }

    fn rejected(&self, message: String) -> Error {
        Error::Schema {
            model: self.name,
            message,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Ordered list of sort keys, sent as `{field: 1 | -1, ...}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortSpec {
    keys: Vec<(String, SortOrder)>,
}

impl SortSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn asc(mut self, field: impl Into<String>) -> Self {
        self.keys.push((field.into(), SortOrder::Ascending));
        self
    }

    pub fn desc(mut self, field: impl Into<String>) -> Self {
        self.keys.push((field.into(), SortOrder::Descending));
        self
    }

    pub fn to_document(&self) -> Map<String, Value> {
        self.keys
            .iter()
            .map(|(field, order)| {
                let direction = match order {
                    SortOrder::Ascending => 1,
                    SortOrder::Descending => -1,
                };
                (field.clone(), Value::from(direction))
            })
            .collect()
    }
}

pub struct Model<'a> {
    client: &'a DianaClient,
    def: &'static ModelDef,
}

impl<'a> Model<'a> {
    pub(crate) fn new(client: &'a DianaClient, def: &'static ModelDef) -> Self {
        Self { client, def }
    }

    pub fn def(&self) -> &'static ModelDef {
        self.def
    }

    /// Validate and insert one document; returns whatever the server reports
    /// back (usually the assigned `_id`).
    pub async fn insert(&self, document: &Value) -> Result<Value> {
        self.def.validate(document)?;
        self.client
            .request(&Request::Insert {
                database: self.def.database.to_string(),
                collection: self.def.collection.to_string(),
                document: document.clone(),
            })
            .await
    }

    /// Documents matching every filter. An empty `fields` list selects all
    /// fields.
    pub async fn find(
        &self,
        filters: Vec<Value>,
        fields: Vec<String>,
        sort: &SortSpec,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<Value>> {
        let data = self
            .client
            .request(&Request::Find {
                database: self.def.database.to_string(),
                collection: self.def.collection.to_string(),
                filters,
                fields,
                sort: sort.to_document(),
                skip,
                limit,
            })
            .await?;

        match data {
            Value::Array(documents) => Ok(documents),
            Value::Null => Ok(Vec::new()),
            other => Err(Error::Protocol(format!(
                "find returned {other} instead of an array"
            ))),
        }
    }
}
