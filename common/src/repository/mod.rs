pub mod mongo_repository;
pub mod test_repository;

use std::sync::Arc;

use async_trait::async_trait;
use mongodb::bson::{oid::ObjectId, Document};

use crate::error;

pub trait Entity {
    fn id(&self) -> ObjectId;
}

/// Document store seen by the services.
///
/// `find_many` takes an equality filter: every key must match exactly.
/// `update_one` merges `change` into the stored document (`$set` semantics)
/// and reports whether a document with `id` existed.
#[async_trait]
pub trait Repository<T> {
    async fn insert(&self, item: &T) -> error::Result<bool>;
    async fn find_many(&self, filter: Document) -> error::Result<Vec<T>>;
    async fn update_one(&self, id: &ObjectId, change: Document) -> error::Result<bool>;
    async fn delete(&self, id: &ObjectId) -> error::Result<Option<T>>;
}

pub type RepositoryObject<T> = Arc<dyn Repository<T> + Send + Sync>;
