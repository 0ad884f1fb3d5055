//! Repository layer for database operations
//!
//! Blob metadata rows and the attachment registry. Each statement is written
//! once against a plain connection so it can run either on its own or inside
//! the transaction used by `record_and_attach`.

use super::models::*;
use crate::error::Result;
use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use uuid::Uuid;

/// Repository for database operations
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Persist a blob metadata row
    pub async fn record_blob(&self, blob: &Blob) -> Result<()> {
        let mut conn = self.pool.acquire().await?;
        insert_blob(&mut conn, blob).await
    }

    /// Get a blob by ID
    pub async fn get_blob(&self, id: &str) -> Result<Option<Blob>> {
        let blob = sqlx::query_as::<_, Blob>("SELECT * FROM blobs WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(blob)
    }

    /// Delete a blob metadata row. The blob must no longer be attached.
    pub async fn delete_blob(&self, id: &str) -> Result<()> {
        sqlx::query("DELETE FROM blobs WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        tracing::debug!("Deleted blob row: {}", id);
        Ok(())
    }

    /// Attach a blob to a record under `name`, replacing any existing
    /// attachment for the same record and name.
    pub async fn attach(&self, record: &RecordRef, blob_id: &str, name: &str) -> Result<Attachment> {
        let mut conn = self.pool.acquire().await?;
        upsert_attachment(&mut conn, record, blob_id, name).await
    }

    /// Look up the blob attached to a record under `name`
    pub async fn resolve(&self, record: &RecordRef, name: &str) -> Result<Option<Blob>> {
        let mut conn = self.pool.acquire().await?;
        find_attached_blob(&mut conn, record, name).await
    }

    /// Insert a blob row and attach it in one transaction.
    ///
    /// Returns the blob that was attached under `name` before, if any. That
    /// blob is left in place for the caller to purge.
    pub async fn record_and_attach(
        &self,
        blob: &Blob,
        record: &RecordRef,
        name: &str,
    ) -> Result<Option<Blob>> {
        let mut tx = self.pool.begin().await?;

        let replaced = find_attached_blob(&mut tx, record, name).await?;
        insert_blob(&mut tx, blob).await?;
        upsert_attachment(&mut tx, record, &blob.id, name).await?;

        tx.commit().await?;

        Ok(replaced)
    }

    /// List every attachment held by a record, newest first
    pub async fn list_attachments(&self, record: &RecordRef) -> Result<Vec<Attachment>> {
        let attachments = sqlx::query_as::<_, Attachment>(
            r#"
            SELECT * FROM attachments
            WHERE record_type = ? AND record_id = ?
            ORDER BY created_at DESC
            "#,
        )
        .bind(record.record_type.as_str())
        .bind(&record.record_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(attachments)
    }
}

async fn insert_blob(conn: &mut SqliteConnection, blob: &Blob) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO blobs (id, key, filename, content_type, byte_size, checksum, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&blob.id)
    .bind(&blob.key)
    .bind(&blob.filename)
    .bind(&blob.content_type)
    .bind(blob.byte_size)
    .bind(&blob.checksum)
    .bind(blob.created_at)
    .execute(&mut *conn)
    .await?;

    tracing::debug!("Recorded blob: {} (key: {})", blob.id, blob.key);
    Ok(())
}

async fn upsert_attachment(
    conn: &mut SqliteConnection,
    record: &RecordRef,
    blob_id: &str,
    name: &str,
) -> Result<Attachment> {
    let id = Uuid::new_v4().to_string();
    let now = Utc::now();

    let attachment = sqlx::query_as::<_, Attachment>(
        r#"
        INSERT INTO attachments (id, name, record_type, record_id, blob_id, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        ON CONFLICT(record_type, record_id, name)
        DO UPDATE SET blob_id = excluded.blob_id, created_at = excluded.created_at
        RETURNING *
        "#,
    )
    .bind(&id)
    .bind(name)
    .bind(record.record_type.as_str())
    .bind(&record.record_id)
    .bind(blob_id)
    .bind(now)
    .fetch_one(&mut *conn)
    .await?;

    tracing::debug!(
        "Attached blob: {} to {} as {} ({})",
        blob_id,
        record,
        name,
        attachment.id
    );
    Ok(attachment)
}

async fn find_attached_blob(
    conn: &mut SqliteConnection,
    record: &RecordRef,
    name: &str,
) -> Result<Option<Blob>> {
    // The unique constraint allows one row per (record, name); ordering keeps
    // the answer deterministic regardless.
    let blob = sqlx::query_as::<_, Blob>(
        r#"
        SELECT blobs.* FROM blobs
        JOIN attachments ON attachments.blob_id = blobs.id
        WHERE attachments.record_type = ?
          AND attachments.record_id = ?
          AND attachments.name = ?
        ORDER BY attachments.created_at DESC
        LIMIT 1
        "#,
    )
    .bind(record.record_type.as_str())
    .bind(&record.record_id)
    .bind(name)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(blob)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::initialize_database;
    use crate::error::AppError;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn create_test_repo() -> Repository {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        initialize_database(&pool).await.unwrap();

        Repository::new(pool)
    }

    fn test_blob(key: &str) -> Blob {
        Blob {
            id: Uuid::new_v4().to_string(),
            key: key.to_string(),
            filename: "cat.png".to_string(),
            content_type: "image/png".to_string(),
            byte_size: 10,
            checksum: "00".repeat(32),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_record_and_get_blob() {
        let repo = create_test_repo().await;
        let blob = test_blob("k1");

        repo.record_blob(&blob).await.unwrap();

        let stored = repo.get_blob(&blob.id).await.unwrap().unwrap();
        assert_eq!(stored, blob);
    }

    #[tokio::test]
    async fn test_duplicate_key_rejected() {
        let repo = create_test_repo().await;

        repo.record_blob(&test_blob("same")).await.unwrap();
        let result = repo.record_blob(&test_blob("same")).await;

        assert!(matches!(result, Err(AppError::Database(_))));
    }

    #[tokio::test]
    async fn test_attach_and_resolve() {
        let repo = create_test_repo().await;
        let blob = test_blob("k1");
        let user = RecordRef::user("u1");

        repo.record_blob(&blob).await.unwrap();
        let attachment = repo.attach(&user, &blob.id, "avatar").await.unwrap();

        assert_eq!(attachment.record(), user);
        assert_eq!(attachment.blob_id, blob.id);

        let resolved = repo.resolve(&user, "avatar").await.unwrap();
        assert_eq!(resolved, Some(blob));
    }

    #[tokio::test]
    async fn test_resolve_missing() {
        let repo = create_test_repo().await;

        let resolved = repo.resolve(&RecordRef::user("nobody"), "avatar").await.unwrap();
        assert!(resolved.is_none());
    }

    #[tokio::test]
    async fn test_attach_unknown_blob_rejected() {
        let repo = create_test_repo().await;

        let result = repo.attach(&RecordRef::user("u1"), "no-such-blob", "avatar").await;
        assert!(matches!(result, Err(AppError::Database(_))));
    }

    #[tokio::test]
    async fn test_attach_replaces_existing_role() {
        let repo = create_test_repo().await;
        let user = RecordRef::user("u1");
        let first = test_blob("k1");
        let second = test_blob("k2");

        repo.record_blob(&first).await.unwrap();
        repo.record_blob(&second).await.unwrap();

        let a1 = repo.attach(&user, &first.id, "avatar").await.unwrap();
        let a2 = repo.attach(&user, &second.id, "avatar").await.unwrap();

        assert_eq!(a1.id, a2.id);
        assert_eq!(repo.list_attachments(&user).await.unwrap().len(), 1);
        assert_eq!(repo.resolve(&user, "avatar").await.unwrap(), Some(second));
    }

    #[tokio::test]
    async fn test_record_types_are_isolated() {
        let repo = create_test_repo().await;
        let user = RecordRef::user("42");
        let team = RecordRef::new(RecordType::Other("Team".into()), "42");
        let user_blob = test_blob("k-user");
        let team_blob = test_blob("k-team");

        repo.record_and_attach(&user_blob, &user, "avatar").await.unwrap();
        repo.record_and_attach(&team_blob, &team, "avatar").await.unwrap();

        assert_eq!(repo.resolve(&user, "avatar").await.unwrap(), Some(user_blob));
        assert_eq!(repo.resolve(&team, "avatar").await.unwrap(), Some(team_blob));
        assert!(repo.resolve(&user, "banner").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_record_and_attach_returns_replaced() {
        let repo = create_test_repo().await;
        let user = RecordRef::user("u1");
        let first = test_blob("k1");
        let second = test_blob("k2");

        let replaced = repo.record_and_attach(&first, &user, "avatar").await.unwrap();
        assert!(replaced.is_none());

        let replaced = repo.record_and_attach(&second, &user, "avatar").await.unwrap();
        assert_eq!(replaced, Some(first.clone()));

        repo.delete_blob(&first.id).await.unwrap();
        assert!(repo.get_blob(&first.id).await.unwrap().is_none());
        assert_eq!(repo.resolve(&user, "avatar").await.unwrap(), Some(second));
    }

    #[tokio::test]
    async fn test_record_and_attach_rolls_back() {
        let repo = create_test_repo().await;
        let user = RecordRef::user("u1");

        repo.record_blob(&test_blob("taken")).await.unwrap();

        // Duplicate key fails the insert; no attachment may survive.
        let result = repo.record_and_attach(&test_blob("taken"), &user, "avatar").await;
        assert!(result.is_err());
        assert!(repo.list_attachments(&user).await.unwrap().is_empty());
    }
}
