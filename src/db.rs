use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::fs;
use std::path::{Path, PathBuf};

pub type DbPool = SqlitePool;

/// Application state holding the database connection pool
pub struct AppState {
  pub db: DbPool,
}

/// Get the path to the database file inside the app data directory
fn db_path(data_dir: &Path) -> Result<PathBuf, Box<dyn std::error::Error>> {
  // Create directory if it doesn't exist
  fs::create_dir_all(data_dir)?;
  Ok(data_dir.join("lift-log.db"))
}

/// Initialize the database connection pool and run migrations
pub async fn initialize_db(data_dir: &Path) -> Result<DbPool, Box<dyn std::error::Error>> {
  let db_path = db_path(data_dir)?;
  let db_url = format!("sqlite://{}?mode=rwc", db_path.display());

  println!("Initializing database at: {}", db_path.display());

  // Create connection pool
  let pool = SqlitePoolOptions::new()
    .max_connections(5)
    .connect(&db_url)
    .await?;

  // Run migrations
  sqlx::migrate!("./migrations").run(&pool).await?;

  println!("Database initialized successfully");

  Ok(pool)
}
