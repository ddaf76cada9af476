//! Database module for album, track, and extra persistence.
//!
//! Uses SQLx with SQLite for lightweight, embedded database storage.
//! Provides async operations for:
//! - Opening the library database and running migrations
//! - One transactional [`Session`] per command
//! - Loading entities by id (used by the query engine)
//! - Saving and removing albums, tracks, and extras
//!
//! Connections register a `REGEXP` SQL function (sqlx `regexp` feature),
//! which the query engine uses for `field::pattern` terms.
//!
//! # Example
//!
//! ```ignore
//! use tunekeeper::db::{init_db, Session};
//!
//! let pool = init_db("sqlite:library.db").await?;
//! let mut session = Session::begin(&pool).await?;
//! db::save_album(&mut session, &mut album).await?;
//! session.commit().await?;
//! ```

mod load;
mod store;

pub use load::{load_albums, load_extras, load_tracks};
pub use store::{remove_album, remove_extra, remove_track, save_album, save_extra, save_track};

use std::path::Path;
use std::str::FromStr;

use sqlx::migrate::MigrateDatabase;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqlitePool, SqlitePoolOptions};
use sqlx::{Sqlite, Transaction};
use tracing::debug;

use crate::error::Result;

/// Default database filename.
pub const DEFAULT_DB_NAME: &str = "tunekeeper.db";

/// Build a SQLite database URL from an optional path.
///
/// If no path is provided, uses [`DEFAULT_DB_NAME`] in the current directory.
pub fn db_url(path: Option<&Path>) -> String {
    match path {
        Some(p) => format!("sqlite:{}", p.display()),
        None => format!("sqlite:{}", DEFAULT_DB_NAME),
    }
}

/// Initialize the database connection pool and run migrations.
///
/// Creates the database file if it doesn't exist, enables foreign keys
/// (album deletes cascade to tracks and extras) and registers the
/// `REGEXP` function on every connection.
///
/// # Errors
///
/// Returns an error if:
/// - Database creation fails
/// - Connection cannot be established
/// - Migration fails
pub async fn init_db(db_url: &str) -> Result<SqlitePool> {
    if !Sqlite::database_exists(db_url).await.unwrap_or(false) {
        Sqlite::create_database(db_url).await?;
    }

    let options = SqliteConnectOptions::from_str(db_url)?
        .foreign_keys(true)
        .with_regexp();

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}

/// A unit of work against the library.
///
/// All reads and writes of one command go through the same transaction.
/// Nothing is visible to other connections until [`Session::commit`];
/// dropping a session without committing rolls everything back.
pub struct Session {
    tx: Transaction<'static, Sqlite>,
}

impl Session {
    /// Start a new transaction.
    pub async fn begin(pool: &SqlitePool) -> Result<Self> {
        let tx = pool.begin().await?;
        debug!(target: "db", "Session started");
        Ok(Self { tx })
    }

    /// The connection the transaction runs on.
    pub fn conn(&mut self) -> &mut SqliteConnection {
        &mut self.tx
    }

    /// Commit every change made in this session.
    pub async fn commit(self) -> Result<()> {
        self.tx.commit().await?;
        debug!(target: "db", "Session committed");
        Ok(())
    }
}
