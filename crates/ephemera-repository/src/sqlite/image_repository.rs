//! SQLite image repository implementation.

use crate::{traits::ImageRepository, DatabasePoolInterface};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ephemera_core::{EphemeraResult, ImageRecord};
use sqlx::FromRow;
use std::sync::Arc;
use tracing::debug;

/// SQLite image repository.
#[derive(Clone)]
pub struct SqliteImageRepository {
    pool: Arc<dyn DatabasePoolInterface>,
}

impl SqliteImageRepository {
    /// Creates a new SQLite image repository.
    #[must_use]
    pub fn new(pool: Arc<dyn DatabasePoolInterface>) -> Self {
        Self { pool }
    }
}

/// Database row representation of an image.
#[derive(Debug, FromRow)]
struct RawImageRow {
    id: String,
    image: Vec<u8>,
    expiration: DateTime<Utc>,
}

impl From<RawImageRow> for ImageRecord {
    fn from(row: RawImageRow) -> Self {
        ImageRecord {
            payload: row.image,
            id: row.id,
            expires_at: row.expiration,
        }
    }
}

#[async_trait]
impl ImageRepository for SqliteImageRepository {
    async fn put(&self, record: &ImageRecord) -> EphemeraResult<()> {
        debug!(id = %record.id, size = record.size(), "Saving image");

        sqlx::query(
            r#"
            INSERT INTO raw_images (id, image, expiration)
            VALUES (?, ?, ?)
            ON CONFLICT (id) DO UPDATE SET
                image = excluded.image,
                expiration = excluded.expiration
            "#,
        )
        .bind(&record.id)
        .bind(&record.payload)
        .bind(record.expires_at)
        .execute(self.pool.inner())
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> EphemeraResult<Option<ImageRecord>> {
        debug!(id = %id, "Finding image by id");

        let row = sqlx::query_as::<_, RawImageRow>(
            r#"
            SELECT id, image, expiration
            FROM raw_images
            WHERE id = ?
            LIMIT 1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool.inner())
        .await?;

        Ok(row.map(ImageRecord::from))
    }

    async fn delete_by_id(&self, id: &str) -> EphemeraResult<()> {
        let result = sqlx::query("DELETE FROM raw_images WHERE id = ?")
            .bind(id)
            .execute(self.pool.inner())
            .await?;

        debug!(id = %id, deleted = result.rows_affected(), "Deleted image");
        Ok(())
    }
}
