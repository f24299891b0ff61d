use sea_orm::{Database, DatabaseConnection};

use crate::error::AppError;

/// Connect to Postgres using a `DATABASE_URL`-style connection string.
pub async fn connect_db(url: &str) -> Result<DatabaseConnection, AppError> {
    Database::connect(url)
        .await
        .map_err(|e| AppError::config(format!("failed to connect to database: {e}")))
}
