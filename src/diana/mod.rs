//! Async client for the DianaDB document database.
//!
//! Speaks length-prefixed JSON over TCP (see [`protocol`]) through a small
//! fixed-size connection pool. Collections are accessed through statically
//! declared [`ModelDef`]s.

pub mod client;
pub mod config;
pub mod connection;
pub mod error;
pub mod model;
pub mod protocol;

pub use client::DianaClient;
pub use config::DianaConfig;
pub use error::{Error, Result};
pub use model::{FieldDef, FieldType, Model, ModelDef, SortOrder, SortSpec};
