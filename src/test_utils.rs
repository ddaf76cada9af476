//! Test utilities and fixtures for tunekeeper tests.
//!
//! This module provides a throwaway database and small album factories to
//! reduce boilerplate in tests.
//!
//! # Example
//!
//! ```ignore
//! use tunekeeper::test_utils::{sample_album, temp_db};
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let (pool, _dir) = temp_db().await;
//!     let album = sample_album("Artist", "Album", 2000, 3);
//!     // ... test logic
//! }
//! ```

use std::path::PathBuf;

use sqlx::sqlite::SqlitePool;
use tempfile::TempDir;

use crate::model::{Album, Track};

/// Creates a temporary database for testing.
///
/// The database is created in a temporary directory that is automatically
/// cleaned up when the returned `TempDir` is dropped. Migrations are run
/// automatically.
///
/// Keep the TempDir alive for the duration of your test.
pub async fn temp_db() -> (SqlitePool, TempDir) {
    let dir = tempfile::tempdir().expect("Failed to create temp directory");
    let db_path = dir.path().join("test.db");
    let db_url = format!("sqlite:{}", db_path.display());

    let pool = crate::db::init_db(&db_url)
        .await
        .expect("Failed to initialize test database");

    (pool, dir)
}

/// Directory used for a sample album: `/music/{artist}/{title}`.
pub fn sample_album_path(artist: &str, title: &str) -> PathBuf {
    PathBuf::from("/music").join(artist).join(title)
}

/// Creates an unsaved album with `num_tracks` tracks on disc 1.
///
/// Tracks are titled `Track 1`, `Track 2`, ... and live at
/// `{album path}/01.mp3`, `{album path}/02.mp3`, ...
pub fn sample_album(artist: &str, title: &str, year: i64, num_tracks: i64) -> Album {
    let path = sample_album_path(artist, title);
    let mut album = Album::new(artist, title, year, path.clone());
    for n in 1..=num_tracks {
        let track = Track::new(&album, n, format!("Track {n}"), path.join(format!("{n:02}.mp3")));
        album.add_track(track);
    }
    album
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_temp_db_creates_working_database() {
        let (pool, _dir) = temp_db().await;

        let mut session = crate::db::Session::begin(&pool).await.unwrap();
        let albums = crate::query::albums(&mut session, "album:%").await.unwrap();
        assert!(albums.is_empty());
    }

    #[test]
    fn test_sample_album_defaults() {
        let album = sample_album("Test Artist", "Test Album", 2023, 2);
        assert_eq!(album.tracks.len(), 2);
        assert_eq!(album.tracks[1].title, "Track 2");
        assert_eq!(
            album.tracks[1].path,
            PathBuf::from("/music/Test Artist/Test Album/02.mp3")
        );
        assert!(album.tracks[0].shares_album_with(&album.tracks[1]));
    }
}
