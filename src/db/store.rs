//! Saving and removing entities.
//!
//! Saving an entity that has no id inserts it and records the new id on the
//! entity; saving one that has an id updates its row. Unique-constraint
//! violations surface as [`Error::DuplicateAlbum`] or
//! [`Error::DuplicateItem`].

use sqlx::sqlite::SqliteConnection;
use sqlx::{QueryBuilder, Sqlite};
use tracing::debug;

use super::Session;
use crate::error::{Error, Result};
use crate::model::{self, Album, AlbumInfo, Extra, Track};

fn path_str(path: &std::path::Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Insert or update the album row, returning its id.
async fn write_album_info(conn: &mut SqliteConnection, info: &AlbumInfo) -> Result<i64> {
    let date = info.date.as_ref().map(model::format_date);
    let original_date = info.original_date.as_ref().map(model::format_date);

    if let Some(id) = info.id {
        let result = sqlx::query(
            r#"
            UPDATE albums SET
                artist = ?, title = ?, year = ?, date = ?, original_date = ?,
                path = ?, label = ?, mb_album_id = ?, track_total = ?, disc_total = ?
            WHERE id = ?
            "#,
        )
        .bind(&info.artist)
        .bind(&info.title)
        .bind(info.year)
        .bind(&date)
        .bind(&original_date)
        .bind(path_str(&info.path))
        .bind(&info.label)
        .bind(&info.mb_album_id)
        .bind(info.track_total)
        .bind(info.disc_total)
        .bind(id)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() > 0 {
            return Ok(id);
        }
    }

    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO albums (
            artist, title, year, date, original_date,
            path, label, mb_album_id, track_total, disc_total
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(&info.artist)
    .bind(&info.title)
    .bind(info.year)
    .bind(&date)
    .bind(&original_date)
    .bind(path_str(&info.path))
    .bind(&info.label)
    .bind(&info.mb_album_id)
    .bind(info.track_total)
    .bind(info.disc_total)
    .fetch_one(&mut *conn)
    .await?;

    debug!(target: "db", "Inserted album {} ({} - {})", id, info.artist, info.title);
    Ok(id)
}

/// Delete members of `album_id` in `table` whose id is not in `keep`.
async fn delete_dropped(
    conn: &mut SqliteConnection,
    table: &'static str,
    album_id: i64,
    keep: &[i64],
) -> Result<u64> {
    let mut qb = QueryBuilder::<Sqlite>::new(format!("DELETE FROM {table} WHERE album_id = "));
    qb.push_bind(album_id);
    if !keep.is_empty() {
        qb.push(" AND id NOT IN (");
        let mut separated = qb.separated(", ");
        for id in keep {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");
    }
    let result = qb.build().execute(&mut *conn).await?;
    Ok(result.rows_affected())
}

async fn write_track(conn: &mut SqliteConnection, album_id: i64, track: &mut Track) -> Result<()> {
    let path = path_str(&track.path);

    let id = match track.id {
        Some(id) => {
            sqlx::query(
                r#"
                UPDATE tracks SET
                    album_id = ?, title = ?, artist = ?, track_num = ?, disc = ?,
                    path = ?, mb_track_id = ?
                WHERE id = ?
                "#,
            )
            .bind(album_id)
            .bind(&track.title)
            .bind(&track.artist)
            .bind(track.track_num)
            .bind(track.disc)
            .bind(&path)
            .bind(&track.mb_track_id)
            .bind(id)
            .execute(&mut *conn)
            .await?;
            id
        }
        None => {
            sqlx::query_scalar(
                r#"
                INSERT INTO tracks (album_id, title, artist, track_num, disc, path, mb_track_id)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                RETURNING id
                "#,
            )
            .bind(album_id)
            .bind(&track.title)
            .bind(&track.artist)
            .bind(track.track_num)
            .bind(track.disc)
            .bind(&path)
            .bind(&track.mb_track_id)
            .fetch_one(&mut *conn)
            .await?
        }
    };
    track.id = Some(id);

    sqlx::query("DELETE FROM track_genres WHERE track_id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    for genre in &track.genres {
        sqlx::query("INSERT OR IGNORE INTO genres (name) VALUES (?)")
            .bind(genre)
            .execute(&mut *conn)
            .await?;
        sqlx::query("INSERT INTO track_genres (track_id, genre) VALUES (?, ?)")
            .bind(id)
            .bind(genre)
            .execute(&mut *conn)
            .await?;
    }

    Ok(())
}

async fn write_extra(conn: &mut SqliteConnection, album_id: i64, extra: &mut Extra) -> Result<()> {
    let path = path_str(&extra.path);
    let filename = extra.filename();

    let id = match extra.id {
        Some(id) => {
            sqlx::query("UPDATE extras SET album_id = ?, path = ?, filename = ? WHERE id = ?")
                .bind(album_id)
                .bind(&path)
                .bind(&filename)
                .bind(id)
                .execute(&mut *conn)
                .await?;
            id
        }
        None => {
            sqlx::query_scalar(
                "INSERT INTO extras (album_id, path, filename) VALUES (?, ?, ?) RETURNING id",
            )
            .bind(album_id)
            .bind(&path)
            .bind(&filename)
            .fetch_one(&mut *conn)
            .await?
        }
    };
    extra.id = Some(id);
    Ok(())
}

/// Save an album together with its tracks and extras.
///
/// Tracks and extras that were saved before but are no longer part of the
/// album are deleted first, so their positions and filenames are free for
/// new members.
pub async fn save_album(session: &mut Session, album: &mut Album) -> Result<()> {
    let conn = session.conn();
    let album_id = write_album_info(conn, &album.info()).await?;
    album.update(|info| info.id = Some(album_id));

    let kept_tracks: Vec<i64> = album.tracks.iter().filter_map(|t| t.id).collect();
    let kept_extras: Vec<i64> = album.extras.iter().filter_map(|e| e.id).collect();
    let dropped = delete_dropped(conn, "tracks", album_id, &kept_tracks).await?
        + delete_dropped(conn, "extras", album_id, &kept_extras).await?;

    for track in &mut album.tracks {
        write_track(conn, album_id, track).await?;
    }
    for extra in &mut album.extras {
        write_extra(conn, album_id, extra).await?;
    }

    debug!(
        target: "db",
        "Saved album {} ({} tracks, {} extras, {} dropped)",
        album_id,
        album.tracks.len(),
        album.extras.len(),
        dropped
    );
    Ok(())
}

/// Save a single track of an already saved album.
///
/// Album-level fields changed through the track are written as well.
pub async fn save_track(session: &mut Session, track: &mut Track) -> Result<()> {
    let info = track.album_handle().read().clone();
    if info.id.is_none() {
        return Err(Error::Unsaved(track.path.clone()));
    }
    let conn = session.conn();
    let album_id = write_album_info(conn, &info).await?;
    write_track(conn, album_id, track).await
}

/// Save a single extra of an already saved album.
pub async fn save_extra(session: &mut Session, extra: &mut Extra) -> Result<()> {
    let info = extra.album_handle().read().clone();
    if info.id.is_none() {
        return Err(Error::Unsaved(extra.path.clone()));
    }
    let conn = session.conn();
    let album_id = write_album_info(conn, &info).await?;
    write_extra(conn, album_id, extra).await
}

/// Remove an album; its tracks and extras go with it.
pub async fn remove_album(session: &mut Session, album: &Album) -> Result<()> {
    let Some(id) = album.id() else {
        return Ok(());
    };
    sqlx::query("DELETE FROM albums WHERE id = ?")
        .bind(id)
        .execute(session.conn())
        .await?;
    debug!(target: "db", "Removed album {}", id);
    Ok(())
}

pub async fn remove_track(session: &mut Session, track: &Track) -> Result<()> {
    let Some(id) = track.id else {
        return Ok(());
    };
    sqlx::query("DELETE FROM tracks WHERE id = ?")
        .bind(id)
        .execute(session.conn())
        .await?;
    debug!(target: "db", "Removed track {}", id);
    Ok(())
}

pub async fn remove_extra(session: &mut Session, extra: &Extra) -> Result<()> {
    let Some(id) = extra.id else {
        return Ok(());
    };
    sqlx::query("DELETE FROM extras WHERE id = ?")
        .bind(id)
        .execute(session.conn())
        .await?;
    debug!(target: "db", "Removed extra {}", id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::temp_db;

    #[tokio::test]
    async fn test_save_track_of_unsaved_album_fails() {
        let (pool, _dir) = temp_db().await;
        let mut session = Session::begin(&pool).await.unwrap();

        let album = Album::new("A", "One", 2000, "/music/one");
        let mut track = Track::new(&album, 1, "Song", "/music/one/01.mp3");
        let err = save_track(&mut session, &mut track).await.unwrap_err();
        assert!(matches!(err, Error::Unsaved(_)));
    }

    #[tokio::test]
    async fn test_save_extra_after_album() {
        let (pool, _dir) = temp_db().await;
        let mut session = Session::begin(&pool).await.unwrap();

        let mut album = Album::new("A", "One", 2000, "/music/one");
        crate::db::save_album(&mut session, &mut album).await.unwrap();

        let mut extra = Extra::new(&album, "/music/one/cover.jpg");
        save_extra(&mut session, &mut extra).await.unwrap();
        assert!(extra.id.is_some());

        let mut clash = Extra::new(&album, "/music/one/other/cover.jpg");
        let err = save_extra(&mut session, &mut clash).await.unwrap_err();
        assert!(matches!(err, Error::DuplicateItem { .. }), "{err}");
    }

    #[tokio::test]
    async fn test_genres_are_replaced_on_resave() {
        let (pool, _dir) = temp_db().await;
        let mut session = Session::begin(&pool).await.unwrap();

        let mut album = Album::new("A", "One", 2000, "/music/one");
        let mut track = Track::new(&album, 1, "Song", "/music/one/01.mp3");
        track.genres.insert("rock".to_string());
        album.add_track(track);
        crate::db::save_album(&mut session, &mut album).await.unwrap();

        album.tracks[0].genres.clear();
        album.tracks[0].genres.insert("jazz".to_string());
        crate::db::save_album(&mut session, &mut album).await.unwrap();

        let genres: Vec<String> =
            sqlx::query_scalar("SELECT genre FROM track_genres ORDER BY genre")
                .fetch_all(session.conn())
                .await
                .unwrap();
        assert_eq!(genres, vec!["jazz".to_string()]);
    }
}
