//! SQLite database connection management.
//!
//! The store lives in a single SQLite file addressed by `DATABASE_URL`
//! (`sqlite://path/to/issues.sqlite`, `sqlite::memory:`, or a bare file
//! path). The file and its parent directories are created on demand and
//! WAL mode is enabled for every connection.

use anyhow::{bail, Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

use crate::migrate;

/// The URL scheme, if `database_url` has one. Single letters are drive
/// prefixes (`C:\...`), not schemes.
fn url_scheme(database_url: &str) -> Option<&str> {
    let (scheme, _) = database_url.split_once(':')?;
    let valid = scheme.len() > 1
        && scheme.starts_with(|c: char| c.is_ascii_alphabetic())
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    valid.then_some(scheme)
}

fn connect_options(database_url: &str) -> Result<SqliteConnectOptions> {
    let url = match url_scheme(database_url) {
        Some("sqlite") => database_url.to_string(),
        Some(_) => bail!("DATABASE_URL must be a sqlite: URL or a file path"),
        None => format!("sqlite:{}", database_url),
    };
    let options = SqliteConnectOptions::from_str(&url)
        .with_context(|| format!("Invalid DATABASE_URL: {}", database_url))?;
    Ok(options
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal))
}

/// Open a connection pool without touching the schema.
pub async fn connect(database_url: &str) -> Result<SqlitePool> {
    let options = connect_options(database_url)?;

    if !database_url.contains(":memory:") {
        let db_path: &Path = options.get_filename();
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create database directory: {}", parent.display())
            })?;
        }
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .with_context(|| format!("Failed to connect to database: {}", database_url))?;

    Ok(pool)
}

/// Open a connection pool and bring the schema up to date.
pub async fn open(database_url: &str) -> Result<SqlitePool> {
    let pool = connect(database_url).await?;
    migrate::run_migrations(&pool).await?;
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_open_creates_parent_dirs() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested/dir/issues.sqlite");
        let url = format!("sqlite://{}", path.display());

        let pool = open(&url).await.unwrap();
        pool.close().await;
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_bare_path_accepted() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bare.sqlite");

        let pool = open(path.to_str().unwrap()).await.unwrap();
        pool.close().await;
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_foreign_scheme_rejected() {
        let err = open("postgres://user:pw@localhost:5432/vectordb")
            .await
            .unwrap_err();
        assert!(
            err.to_string()
                .contains("DATABASE_URL must be a sqlite: URL or a file path"),
            "{}",
            err
        );
        assert!(!Path::new("postgres:").exists());
    }

    #[test]
    fn test_url_scheme_detection() {
        assert_eq!(url_scheme("sqlite://data/issues.sqlite"), Some("sqlite"));
        assert_eq!(url_scheme("sqlite::memory:"), Some("sqlite"));
        assert_eq!(url_scheme("postgresql://localhost/db"), Some("postgresql"));
        assert_eq!(url_scheme("data/issues.sqlite"), None);
        assert_eq!(url_scheme("C:\\data\\issues.sqlite"), None);
    }
}
