use async_trait::async_trait;
use mongodb::{bson::doc, options::IndexOptions, Client, IndexModel};
use mongodb_migrator::{migration::Migration, migrator::Env};

use common::services::ISSUES_COLLECTION;

/// Listing always filters on `project`.
pub struct ProjectIndexMigration {}

#[async_trait]
impl Migration for ProjectIndexMigration {
    async fn up(&self, env: Env) -> anyhow::Result<()> {
        let Some(db) = env.db else {
            anyhow::bail!("db is unavailable");
        };
        let index = IndexModel::builder()
            .keys(doc! {"project": 1})
            .options(
                IndexOptions::builder()
                    .name("project_1".to_string())
                    .build(),
            )
            .build();
        db.collection::<mongodb::bson::Document>(ISSUES_COLLECTION)
            .create_index(index, None)
            .await?;
        Ok(())
    }
}

pub async fn up_migrations(mongo_uri: &str, database: &str) -> anyhow::Result<()> {
    let client = Client::with_uri_str(mongo_uri).await?;
    let db = client.database(database);

    let migrations: Vec<Box<dyn Migration>> = vec![Box::new(ProjectIndexMigration {})];
    mongodb_migrator::migrator::default::DefaultMigrator::new()
        .with_conn(db.clone())
        .with_migrations_vec(migrations)
        .up()
        .await?;
    Ok(())
}
