//! Document store collaborator.
//!
//! Records are JSON documents grouped in named collections. Every document
//! returned by a store carries its identifier under `_id` as a string.

pub mod memory;
pub mod record;

use std::fmt;

use serde_json::{Map, Value};
use thiserror::Error;

pub use memory::MemoryStore;
pub use record::{Entity, Record};

pub type Document = Map<String, Value>;

pub const ID_FIELD: &str = "_id";
pub const CREATED_AT_FIELD: &str = "created_at";
pub const UPDATED_AT_FIELD: &str = "updated_at";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Rider,
    Driver,
    Ride,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Rider => "rider",
            Collection::Driver => "driver",
            Collection::Ride => "ride",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store is not initialized")]
    Unavailable,

    #[error("invalid document id: {0}")]
    InvalidId(String),

    #[error("document serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("corrupt document in {collection}: {reason}")]
    Corrupt {
        collection: Collection,
        reason: String,
    },
}

/// Field equality filter. An empty filter matches every document.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    clauses: Vec<(String, Value)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.clauses.push((field.into(), value.into()));
        self
    }

    pub fn matches(&self, document: &Document) -> bool {
        self.clauses
            .iter()
            .all(|(field, expected)| document.get(field) == Some(expected))
    }
}

/// Persistence operations the service needs from a document database.
pub trait DocumentStore: Send + Sync {
    /// Inserts a document and returns the identifier the store assigned.
    fn create(&self, collection: Collection, document: Document) -> Result<String, StoreError>;

    /// Returns the first document, in insertion order, matching `filter`.
    fn find_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Option<Document>, StoreError>;

    fn find_by_id(&self, collection: Collection, id: &str)
    -> Result<Option<Document>, StoreError>;

    fn find_all(&self, collection: Collection) -> Result<Vec<Document>, StoreError>;

    /// Merges `fields` into the document. Returns whether a document matched.
    fn update_fields(
        &self,
        collection: Collection,
        id: &str,
        fields: Document,
    ) -> Result<bool, StoreError>;

    /// Like [`DocumentStore::update_fields`], but only applies when the
    /// document also matches `guard`. Check and write happen atomically.
    fn update_where(
        &self,
        collection: Collection,
        id: &str,
        guard: &Filter,
        fields: Document,
    ) -> Result<bool, StoreError>;

    fn list_collections(&self) -> Result<Vec<String>, StoreError>;

    fn is_connected(&self) -> bool;

    fn database_name(&self) -> Option<&str>;
}

/// Builds a single-field update document.
pub fn set(field: &str, value: impl Into<Value>) -> Document {
    let mut fields = Document::new();
    fields.insert(field.to_string(), value.into());
    fields
}
