use std::sync::{Mutex, MutexGuard};

use anyhow::anyhow;
use async_trait::async_trait;
use mongodb::bson::{self, oid::ObjectId, Document};
use serde::{de::DeserializeOwned, Serialize};

use crate::error;

use super::{Entity, Repository};

/// In-memory stand-in for a Mongo collection, storing the serialized
/// documents so filters behave the way they do against the real store.
pub struct TestRepository<T> {
    _t: std::marker::PhantomData<T>,
    pub db: Mutex<Vec<Document>>,
}

impl<T> TestRepository<T> {
    pub fn new() -> Self {
        Self {
            _t: std::marker::PhantomData,
            db: Mutex::new(Vec::new()),
        }
    }

    fn lock(&self) -> error::Result<MutexGuard<'_, Vec<Document>>> {
        self.db
            .lock()
            .map_err(|_| anyhow!("Test repository lock poisoned").into())
    }
}

impl<T> Default for TestRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn matches(document: &Document, filter: &Document) -> bool {
    filter
        .iter()
        .all(|(key, value)| document.get(key) == Some(value))
}

fn has_id(document: &Document, id: &ObjectId) -> bool {
    document.get_object_id("_id").map_or(false, |x| &x == id)
}

#[async_trait]
impl<T> Repository<T> for TestRepository<T>
where
    T: Entity + Send + Sync + Serialize + DeserializeOwned,
{
    async fn insert(&self, item: &T) -> error::Result<bool> {
        let document = bson::to_document(item)?;
        let mut db = self.lock()?;

        let contains = db.iter().any(|x| has_id(x, &item.id()));
        if !contains {
            db.push(document);
        }
        Ok(!contains)
    }

    async fn find_many(&self, filter: Document) -> error::Result<Vec<T>> {
        let db = self.lock()?;
        let result = db
            .iter()
            .filter(|x| matches(x, &filter))
            .map(|x| bson::from_document(x.clone()))
            .collect::<Result<Vec<T>, _>>()?;
        Ok(result)
    }

    async fn update_one(&self, id: &ObjectId, change: Document) -> error::Result<bool> {
        let mut db = self.lock()?;
        let Some(document) = db.iter_mut().find(|x| has_id(x, id)) else {
            return Ok(false);
        };
        document.extend(change);
        Ok(true)
    }

    async fn delete(&self, id: &ObjectId) -> error::Result<Option<T>> {
        let mut db = self.lock()?;
        let Some(pos) = db.iter().position(|x| has_id(x, id)) else {
            return Ok(None);
        };
        let document = db.remove(pos);
        Ok(Some(bson::from_document(document)?))
    }
}
