use anyhow::Context;
use async_trait::async_trait;
use serde_json::Value;
use sqlx::{postgres::PgPoolOptions, types::Json, PgPool};

use super::{RecordStore, StoreError};

/// Stores each collection as one JSONB row of `record_collections`.
#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let db = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .context("connect to database")?;
        sqlx::migrate!("./migrations")
            .run(&db)
            .await
            .context("run migrations")?;
        Ok(Self { db })
    }
}

#[async_trait]
impl RecordStore for PgStore {
    async fn read_document(&self, name: &str) -> Result<Option<Value>, StoreError> {
        let row = sqlx::query_as::<_, (Json<Value>,)>(
            r#"
            SELECT body
              FROM record_collections
             WHERE name = $1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.db)
        .await?;
        Ok(row.map(|(Json(body),)| body))
    }

    async fn write_document(&self, name: &str, body: Value) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO record_collections (name, body, updated_at)
            VALUES ($1, $2, now())
            ON CONFLICT (name)
            DO UPDATE SET body = EXCLUDED.body, updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(name)
        .bind(Json(body))
        .execute(&self.db)
        .await?;
        Ok(())
    }

    async fn delete_document(&self, name: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM record_collections WHERE name = $1")
            .bind(name)
            .execute(&self.db)
            .await?;
        Ok(())
    }
}
