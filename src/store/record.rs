//! Typed access to store documents.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::store::{
    Collection, Document, DocumentStore, Filter, StoreError, CREATED_AT_FIELD, ID_FIELD,
    UPDATED_AT_FIELD,
};

/// A record type living in one collection with its own identifier type.
pub trait Entity: Serialize + DeserializeOwned {
    type Id: Clone + fmt::Debug + fmt::Display + Serialize + From<String> + AsRef<str>;

    const COLLECTION: Collection;
}

/// An entity together with the metadata the store keeps for it.
#[derive(Debug, Clone, Serialize)]
#[serde(bound(serialize = "E: Serialize"))]
pub struct Record<E: Entity> {
    #[serde(rename = "_id")]
    pub id: E::Id,
    #[serde(flatten)]
    pub body: E,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<E: Entity> Record<E> {
    pub fn from_document(mut document: Document) -> Result<Self, StoreError> {
        let id = match document.remove(ID_FIELD) {
            Some(Value::String(id)) => E::Id::from(id),
            _ => return Err(corrupt::<E>("missing string _id")),
        };
        let created_at = take_timestamp::<E>(&mut document, CREATED_AT_FIELD)?;
        let updated_at = take_timestamp::<E>(&mut document, UPDATED_AT_FIELD)?;
        let body = serde_json::from_value(Value::Object(document))?;

        Ok(Self {
            id,
            body,
            created_at,
            updated_at,
        })
    }
}

fn take_timestamp<E: Entity>(
    document: &mut Document,
    field: &str,
) -> Result<DateTime<Utc>, StoreError> {
    let raw = document
        .remove(field)
        .ok_or_else(|| corrupt::<E>(&format!("missing {field}")))?;
    serde_json::from_value(raw).map_err(|err| corrupt::<E>(&format!("bad {field}: {err}")))
}

fn corrupt<E: Entity>(reason: &str) -> StoreError {
    StoreError::Corrupt {
        collection: E::COLLECTION,
        reason: reason.to_string(),
    }
}

fn to_document<E: Entity>(entity: &E) -> Result<Document, StoreError> {
    match serde_json::to_value(entity)? {
        Value::Object(document) => Ok(document),
        _ => Err(corrupt::<E>("entity did not serialize to an object")),
    }
}

pub fn insert<E: Entity>(store: &dyn DocumentStore, entity: &E) -> Result<E::Id, StoreError> {
    let id = store.create(E::COLLECTION, to_document(entity)?)?;
    Ok(E::Id::from(id))
}

pub fn get<E: Entity>(
    store: &dyn DocumentStore,
    id: &E::Id,
) -> Result<Option<Record<E>>, StoreError> {
    store
        .find_by_id(E::COLLECTION, id.as_ref())?
        .map(Record::from_document)
        .transpose()
}

pub fn find_one<E: Entity>(
    store: &dyn DocumentStore,
    filter: &Filter,
) -> Result<Option<Record<E>>, StoreError> {
    store
        .find_one(E::COLLECTION, filter)?
        .map(Record::from_document)
        .transpose()
}

pub fn list<E: Entity>(store: &dyn DocumentStore) -> Result<Vec<Record<E>>, StoreError> {
    store
        .find_all(E::COLLECTION)?
        .into_iter()
        .map(Record::from_document)
        .collect()
}

pub fn update<E: Entity>(
    store: &dyn DocumentStore,
    id: &E::Id,
    fields: Document,
) -> Result<bool, StoreError> {
    store.update_fields(E::COLLECTION, id.as_ref(), fields)
}

pub fn update_where<E: Entity>(
    store: &dyn DocumentStore,
    id: &E::Id,
    guard: &Filter,
    fields: Document,
) -> Result<bool, StoreError> {
    store.update_where(E::COLLECTION, id.as_ref(), guard, fields)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{find_one, get, insert, list, Record};
    use crate::models::rider::Rider;
    use crate::store::{Collection, Document, DocumentStore, Filter, MemoryStore, StoreError};

    fn rider(name: &str, phone: &str) -> Rider {
        Rider {
            name: name.to_string(),
            phone: phone.to_string(),
        }
    }

    #[test]
    fn inserted_entity_reads_back_typed() {
        let store = MemoryStore::new("test");
        let id = insert(&store, &rider("Ana", "555-0100")).unwrap();

        let record = get::<Rider>(&store, &id).unwrap().unwrap();
        assert_eq!(record.id, id);
        assert_eq!(record.body, rider("Ana", "555-0100"));
        assert!(record.updated_at >= record.created_at);
    }

    #[test]
    fn find_one_filters_on_fields() {
        let store = MemoryStore::new("test");
        insert(&store, &rider("Ana", "1")).unwrap();
        let bo = insert(&store, &rider("Bo", "2")).unwrap();

        let found = find_one::<Rider>(&store, &Filter::new().eq("phone", "2"))
            .unwrap()
            .unwrap();
        assert_eq!(found.id, bo);
        assert!(
            find_one::<Rider>(&store, &Filter::new().eq("phone", "3"))
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn records_serialize_with_normalized_id() {
        let store = MemoryStore::new("test");
        let id = insert(&store, &rider("Ana", "1")).unwrap();

        let records = list::<Rider>(&store).unwrap();
        let value = serde_json::to_value(&records).unwrap();
        assert_eq!(value[0]["_id"], json!(id.as_str()));
        assert_eq!(value[0]["phone"], "1");
        assert!(value[0]["created_at"].is_string());
    }

    #[test]
    fn document_without_id_is_corrupt() {
        let document: Document = json!({ "name": "Ana", "phone": "1" })
            .as_object()
            .cloned()
            .unwrap();
        let err = Record::<Rider>::from_document(document).unwrap_err();
        assert!(matches!(
            err,
            StoreError::Corrupt {
                collection: Collection::Rider,
                ..
            }
        ));
    }

    #[test]
    fn document_with_wrong_shape_fails_to_decode() {
        let store = MemoryStore::new("test");
        let id = store
            .create(
                Collection::Rider,
                json!({ "name": 7 }).as_object().cloned().unwrap(),
            )
            .unwrap();

        let err = get::<Rider>(&store, &id.into()).unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));
    }
}
