use sqlx::SqlitePool;

use crate::{
    error::AppResult,
    models::{ContentId, FavoriteEntry},
};

/// What `add` does when the user already saved the same title
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Append a row unconditionally
    InsertAlways,
    /// Leave the table untouched if the pair already exists
    SkipExisting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    AlreadyPresent,
}

/// Per-user favorites table
#[derive(Clone)]
pub struct FavoritesStore {
    pool: SqlitePool,
}

impl FavoritesStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Saves a title for a user
    ///
    /// Errors are storage faults only; a duplicate is reported through
    /// [`AddOutcome::AlreadyPresent`] under [`DuplicatePolicy::SkipExisting`].
    pub async fn add(
        &self,
        owner_user_id: i64,
        content_id: ContentId,
        title: &str,
        poster_path: Option<&str>,
        policy: DuplicatePolicy,
    ) -> AppResult<AddOutcome> {
        let result = match policy {
            DuplicatePolicy::InsertAlways => {
                sqlx::query(
                    "INSERT INTO favorites (user_id, movie_id, title, poster_path) VALUES (?, ?, ?, ?)",
                )
                .bind(owner_user_id)
                .bind(content_id)
                .bind(title)
                .bind(poster_path)
                .execute(&self.pool)
                .await
            }
            DuplicatePolicy::SkipExisting => {
                sqlx::query(
                    r#"
                    INSERT INTO favorites (user_id, movie_id, title, poster_path)
                    SELECT ?, ?, ?, ?
                    WHERE NOT EXISTS (
                        SELECT 1 FROM favorites WHERE user_id = ? AND movie_id = ?
                    )
                    "#,
                )
                .bind(owner_user_id)
                .bind(content_id)
                .bind(title)
                .bind(poster_path)
                .bind(owner_user_id)
                .bind(content_id)
                .execute(&self.pool)
                .await
            }
        }
        .map_err(|e| {
            tracing::error!(error = %e, user_id = owner_user_id, content_id, "Error adding favorite");
            e
        })?;

        let outcome = if result.rows_affected() == 0 {
            AddOutcome::AlreadyPresent
        } else {
            AddOutcome::Added
        };

        tracing::debug!(user_id = owner_user_id, content_id, ?outcome, "Favorite add");

        Ok(outcome)
    }

    /// Deletes every row for the pair and returns how many went away
    ///
    /// Removing something that is not there is not an error.
    pub async fn remove(&self, owner_user_id: i64, content_id: ContentId) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM favorites WHERE user_id = ? AND movie_id = ?")
            .bind(owner_user_id)
            .bind(content_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, user_id = owner_user_id, content_id, "Error removing favorite");
                e
            })?;

        Ok(result.rows_affected())
    }

    /// Lists a user's favorites in insertion order
    pub async fn list(&self, owner_user_id: i64) -> AppResult<Vec<FavoriteEntry>> {
        let entries = sqlx::query_as::<_, FavoriteEntry>(
            "SELECT id, user_id, movie_id, title, poster_path FROM favorites WHERE user_id = ? ORDER BY id",
        )
        .bind(owner_user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, user_id = owner_user_id, "Error getting favorites");
            e
        })?;

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::create_memory_pool;
    use crate::error::AppError;
    use tokio_test::{assert_err, assert_ok};

    async fn create_test_store() -> FavoritesStore {
        FavoritesStore::new(create_memory_pool().await.unwrap())
    }

    #[tokio::test]
    async fn test_add_then_list_then_remove() {
        let store = create_test_store().await;

        let outcome = store
            .add(42, 27205, "Inception", Some("/inception.jpg"), DuplicatePolicy::SkipExisting)
            .await
            .unwrap();
        assert_eq!(outcome, AddOutcome::Added);

        let favorites = store.list(42).await.unwrap();
        assert_eq!(favorites.len(), 1);
        assert_eq!(favorites[0].content_id, 27205);
        assert_eq!(favorites[0].title, "Inception");
        assert_eq!(favorites[0].poster_path.as_deref(), Some("/inception.jpg"));

        assert_ok!(store.remove(42, 27205).await);
        assert!(store.list(42).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_for_unknown_user_is_empty() {
        let store = create_test_store().await;
        assert!(store.list(7).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remove_missing_is_idempotent() {
        let store = create_test_store().await;
        assert_eq!(store.remove(42, 1).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_insert_always_keeps_duplicates() {
        let store = create_test_store().await;

        for _ in 0..2 {
            store
                .add(42, 550, "Fight Club", None, DuplicatePolicy::InsertAlways)
                .await
                .unwrap();
        }

        assert_eq!(store.list(42).await.unwrap().len(), 2);
        assert_eq!(store.remove(42, 550).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_skip_existing_reports_already_present() {
        let store = create_test_store().await;

        store
            .add(42, 550, "Fight Club", None, DuplicatePolicy::SkipExisting)
            .await
            .unwrap();
        let outcome = store
            .add(42, 550, "Fight Club", None, DuplicatePolicy::SkipExisting)
            .await
            .unwrap();

        assert_eq!(outcome, AddOutcome::AlreadyPresent);
        assert_eq!(store.list(42).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_list_preserves_insertion_order_per_user() {
        let store = create_test_store().await;

        store.add(1, 30, "C", None, DuplicatePolicy::SkipExisting).await.unwrap();
        store.add(2, 99, "Other user", None, DuplicatePolicy::SkipExisting).await.unwrap();
        store.add(1, 10, "A", None, DuplicatePolicy::SkipExisting).await.unwrap();

        let titles: Vec<String> = store.list(1).await.unwrap().into_iter().map(|f| f.title).collect();
        assert_eq!(titles, vec!["C", "A"]);
    }

    #[tokio::test]
    async fn test_closed_pool_is_a_storage_fault() {
        let pool = create_memory_pool().await.unwrap();
        let store = FavoritesStore::new(pool.clone());
        pool.close().await;

        let err = assert_err!(store.list(42).await);
        assert!(matches!(err, AppError::Storage(_)));
    }
}
