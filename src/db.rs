use sqlx::{postgres::PgPoolOptions, PgPool};

/// Process-lifetime handle on the warehouse connection pool.
///
/// Handlers borrow a connection per statement through `&PgPool`; sqlx returns
/// it to the pool when the query future completes, whether it failed or not.
pub struct Database {
    pub pool: PgPool,
}

impl Database {
    pub async fn new(database_url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        // Fail fast on bad credentials
        sqlx::query("SELECT 1").execute(&pool).await?;

        Ok(Self { pool })
    }

    /// Waits for borrowed connections to come back, then closes the pool.
    pub async fn close(self) {
        self.pool.close().await;
        tracing::info!("Database connection pool closed");
    }
}
