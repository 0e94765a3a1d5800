use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};

/// Creates a SQLite connection pool and applies pending migrations
///
/// Every store operation checks a connection out of this pool and returns it
/// when the operation finishes, whatever the outcome.
pub async fn create_pool(database_url: &str) -> anyhow::Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    tracing::info!(database_url = %database_url, "Favorites database ready");

    Ok(pool)
}

/// Single-connection in-memory pool for tests
///
/// An in-memory SQLite database lives as long as its connection, so the pool
/// keeps exactly one and never recycles it.
pub async fn create_memory_pool() -> anyhow::Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}
