use chrono::Utc;
use dashmap::DashMap;
use serde_json::Value;
use uuid::Uuid;

use crate::store::{
    Collection, Document, DocumentStore, Filter, StoreError, CREATED_AT_FIELD, ID_FIELD,
    UPDATED_AT_FIELD,
};

struct StoredDocument {
    id: Uuid,
    body: Document,
}

impl StoredDocument {
    fn to_document(&self) -> Document {
        let mut document = self.body.clone();
        document.insert(ID_FIELD.to_string(), Value::String(self.id.to_string()));
        document
    }

    fn apply(&mut self, fields: Document) {
        for (field, value) in fields {
            if field == ID_FIELD {
                continue;
            }
            self.body.insert(field, value);
        }
        self.body.insert(UPDATED_AT_FIELD.to_string(), timestamp());
    }
}

/// In-process document store.
///
/// Each collection is a single map entry, so writes to one collection are
/// serialized by the entry lock. A store built with [`MemoryStore::detached`]
/// behaves like a database that was never initialized.
pub struct MemoryStore {
    database_name: Option<String>,
    collections: Option<DashMap<Collection, Vec<StoredDocument>>>,
}

impl MemoryStore {
    pub fn new(database_name: impl Into<String>) -> Self {
        Self {
            database_name: Some(database_name.into()),
            collections: Some(DashMap::new()),
        }
    }

    pub fn detached() -> Self {
        Self {
            database_name: None,
            collections: None,
        }
    }

    fn collections(&self) -> Result<&DashMap<Collection, Vec<StoredDocument>>, StoreError> {
        self.collections.as_ref().ok_or(StoreError::Unavailable)
    }
}

fn timestamp() -> Value {
    Value::String(Utc::now().to_rfc3339())
}

fn parse_id(id: &str) -> Result<Uuid, StoreError> {
    Uuid::parse_str(id).map_err(|_| StoreError::InvalidId(id.to_string()))
}

impl DocumentStore for MemoryStore {
    fn create(&self, collection: Collection, mut document: Document) -> Result<String, StoreError> {
        let collections = self.collections()?;
        let id = Uuid::new_v4();

        document.remove(ID_FIELD);
        let now = timestamp();
        document.insert(CREATED_AT_FIELD.to_string(), now.clone());
        document.insert(UPDATED_AT_FIELD.to_string(), now);

        collections
            .entry(collection)
            .or_default()
            .push(StoredDocument { id, body: document });

        Ok(id.to_string())
    }

    fn find_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Option<Document>, StoreError> {
        let collections = self.collections()?;
        let Some(documents) = collections.get(&collection) else {
            return Ok(None);
        };

        Ok(documents
            .iter()
            .find(|stored| filter.matches(&stored.body))
            .map(StoredDocument::to_document))
    }

    fn find_by_id(
        &self,
        collection: Collection,
        id: &str,
    ) -> Result<Option<Document>, StoreError> {
        let collections = self.collections()?;
        let id = parse_id(id)?;
        let Some(documents) = collections.get(&collection) else {
            return Ok(None);
        };

        Ok(documents
            .iter()
            .find(|stored| stored.id == id)
            .map(StoredDocument::to_document))
    }

    fn find_all(&self, collection: Collection) -> Result<Vec<Document>, StoreError> {
        let collections = self.collections()?;

        Ok(collections
            .get(&collection)
            .map(|documents| documents.iter().map(StoredDocument::to_document).collect())
            .unwrap_or_default())
    }

    fn update_fields(
        &self,
        collection: Collection,
        id: &str,
        fields: Document,
    ) -> Result<bool, StoreError> {
        self.update_where(collection, id, &Filter::new(), fields)
    }

    fn update_where(
        &self,
        collection: Collection,
        id: &str,
        guard: &Filter,
        fields: Document,
    ) -> Result<bool, StoreError> {
        let collections = self.collections()?;
        let id = parse_id(id)?;
        let Some(mut documents) = collections.get_mut(&collection) else {
            return Ok(false);
        };

        match documents
            .iter_mut()
            .find(|stored| stored.id == id && guard.matches(&stored.body))
        {
            Some(stored) => {
                stored.apply(fields);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn list_collections(&self) -> Result<Vec<String>, StoreError> {
        let collections = self.collections()?;
        let mut names: Vec<Collection> = collections
            .iter()
            .filter(|entry| !entry.value().is_empty())
            .map(|entry| *entry.key())
            .collect();
        names.sort();

        Ok(names.iter().map(|name| name.as_str().to_string()).collect())
    }

    fn is_connected(&self) -> bool {
        self.collections.is_some()
    }

    fn database_name(&self) -> Option<&str> {
        self.database_name.as_deref()
    }
}
