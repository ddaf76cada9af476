//! Loading entities by id.
//!
//! Loaders return entities in the order of the given ids. Every album row
//! is turned into exactly one [`AlbumRef`] per load, so tracks and extras of
//! the same album share it.

use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;

use sqlx::sqlite::SqliteConnection;
use sqlx::{QueryBuilder, Sqlite};

use super::Session;
use crate::error::Result;
use crate::model::{self, Album, AlbumInfo, AlbumRef, Extra, Track};

// ============================================================================
// Database Row Types
// ============================================================================

/// Database row for the albums table.
#[derive(Debug, sqlx::FromRow)]
struct AlbumRow {
    id: i64,
    artist: String,
    title: String,
    year: i64,
    date: Option<String>,
    original_date: Option<String>,
    path: String,
    label: Option<String>,
    mb_album_id: Option<String>,
    track_total: Option<i64>,
    disc_total: i64,
}

impl From<AlbumRow> for AlbumInfo {
    fn from(row: AlbumRow) -> Self {
        AlbumInfo {
            id: Some(row.id),
            artist: row.artist,
            title: row.title,
            year: row.year,
            date: row.date.as_deref().and_then(model::parse_date),
            original_date: row.original_date.as_deref().and_then(model::parse_date),
            path: PathBuf::from(row.path),
            label: row.label,
            mb_album_id: row.mb_album_id,
            track_total: row.track_total,
            disc_total: row.disc_total,
        }
    }
}

/// Database row for the tracks table.
#[derive(Debug, sqlx::FromRow)]
struct TrackRow {
    id: i64,
    album_id: i64,
    title: String,
    artist: String,
    track_num: i64,
    disc: i64,
    path: String,
    mb_track_id: Option<String>,
}

/// Database row for the extras table.
#[derive(Debug, sqlx::FromRow)]
struct ExtraRow {
    id: i64,
    album_id: i64,
    path: String,
}

// ============================================================================
// Helpers
// ============================================================================

/// Append `(?, ?, ...)` binding every id.
fn push_id_list(qb: &mut QueryBuilder<'_, Sqlite>, ids: &[i64]) {
    qb.push("(");
    let mut separated = qb.separated(", ");
    for id in ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(")");
}

/// Put rows back into the order of `ids`.
fn in_id_order<T>(ids: &[i64], rows: Vec<T>, id_of: impl Fn(&T) -> i64) -> Vec<T> {
    let mut by_id: HashMap<i64, T> = rows.into_iter().map(|row| (id_of(&row), row)).collect();
    ids.iter().filter_map(|id| by_id.remove(id)).collect()
}

/// Load album handles that are not in `handles` yet.
async fn load_album_handles(
    conn: &mut SqliteConnection,
    album_ids: &BTreeSet<i64>,
    handles: &mut HashMap<i64, AlbumRef>,
) -> Result<()> {
    let missing: Vec<i64> = album_ids
        .iter()
        .copied()
        .filter(|id| !handles.contains_key(id))
        .collect();
    if missing.is_empty() {
        return Ok(());
    }

    let mut qb = QueryBuilder::new(
        "SELECT id, artist, title, year, date, original_date, path, label, \
         mb_album_id, track_total, disc_total FROM albums WHERE id IN ",
    );
    push_id_list(&mut qb, &missing);
    let rows: Vec<AlbumRow> = qb.build_query_as().fetch_all(&mut *conn).await?;

    for row in rows {
        let id = row.id;
        let info = AlbumInfo::from(row);
        handles.insert(id, Album::from_info(info).handle().clone());
    }
    Ok(())
}

/// Genres keyed by track id.
async fn load_genres(
    conn: &mut SqliteConnection,
    track_ids: &[i64],
) -> Result<HashMap<i64, BTreeSet<String>>> {
    let mut qb = QueryBuilder::new("SELECT track_id, genre FROM track_genres WHERE track_id IN ");
    push_id_list(&mut qb, track_ids);
    let rows: Vec<(i64, String)> = qb.build_query_as().fetch_all(&mut *conn).await?;

    let mut genres: HashMap<i64, BTreeSet<String>> = HashMap::new();
    for (track_id, genre) in rows {
        genres.entry(track_id).or_default().insert(genre);
    }
    Ok(genres)
}

async fn load_tracks_with(
    conn: &mut SqliteConnection,
    ids: &[i64],
    handles: &mut HashMap<i64, AlbumRef>,
) -> Result<Vec<Track>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut qb = QueryBuilder::new(
        "SELECT id, album_id, title, artist, track_num, disc, path, mb_track_id \
         FROM tracks WHERE id IN ",
    );
    push_id_list(&mut qb, ids);
    let rows: Vec<TrackRow> = qb.build_query_as().fetch_all(&mut *conn).await?;
    let rows = in_id_order(ids, rows, |row| row.id);

    let album_ids: BTreeSet<i64> = rows.iter().map(|row| row.album_id).collect();
    load_album_handles(conn, &album_ids, handles).await?;
    let mut genres = load_genres(conn, ids).await?;

    Ok(rows
        .into_iter()
        .filter_map(|row| {
            let handle = handles.get(&row.album_id)?.clone();
            let mut track = Track::with_handle(handle, row.track_num, row.title, row.path);
            track.id = Some(row.id);
            track.artist = row.artist;
            track.disc = row.disc;
            track.mb_track_id = row.mb_track_id;
            track.genres = genres.remove(&row.id).unwrap_or_default();
            Some(track)
        })
        .collect())
}

async fn load_extras_with(
    conn: &mut SqliteConnection,
    ids: &[i64],
    handles: &mut HashMap<i64, AlbumRef>,
) -> Result<Vec<Extra>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut qb = QueryBuilder::new("SELECT id, album_id, path FROM extras WHERE id IN ");
    push_id_list(&mut qb, ids);
    let rows: Vec<ExtraRow> = qb.build_query_as().fetch_all(&mut *conn).await?;
    let rows = in_id_order(ids, rows, |row| row.id);

    let album_ids: BTreeSet<i64> = rows.iter().map(|row| row.album_id).collect();
    load_album_handles(conn, &album_ids, handles).await?;

    Ok(rows
        .into_iter()
        .filter_map(|row| {
            let handle = handles.get(&row.album_id)?.clone();
            let mut extra = Extra::with_handle(handle, row.path);
            extra.id = Some(row.id);
            Some(extra)
        })
        .collect())
}

// ============================================================================
// Public loaders
// ============================================================================

/// Load tracks by id, each attached to its (shared) album.
pub async fn load_tracks(session: &mut Session, ids: &[i64]) -> Result<Vec<Track>> {
    let mut handles = HashMap::new();
    load_tracks_with(session.conn(), ids, &mut handles).await
}

/// Load extras by id, each attached to its (shared) album.
pub async fn load_extras(session: &mut Session, ids: &[i64]) -> Result<Vec<Extra>> {
    let mut handles = HashMap::new();
    load_extras_with(session.conn(), ids, &mut handles).await
}

/// Load complete albums (with tracks and extras) by id.
pub async fn load_albums(session: &mut Session, ids: &[i64]) -> Result<Vec<Album>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let conn = session.conn();
    let mut handles = HashMap::new();
    let album_ids: BTreeSet<i64> = ids.iter().copied().collect();
    load_album_handles(conn, &album_ids, &mut handles).await?;

    let mut qb = QueryBuilder::new("SELECT id FROM tracks WHERE album_id IN ");
    push_id_list(&mut qb, ids);
    qb.push(" ORDER BY disc, track_num, id");
    let track_ids: Vec<i64> = qb.build_query_scalar().fetch_all(&mut *conn).await?;
    let tracks = load_tracks_with(conn, &track_ids, &mut handles).await?;

    let mut qb = QueryBuilder::new("SELECT id FROM extras WHERE album_id IN ");
    push_id_list(&mut qb, ids);
    qb.push(" ORDER BY filename, id");
    let extra_ids: Vec<i64> = qb.build_query_scalar().fetch_all(&mut *conn).await?;
    let extras = load_extras_with(conn, &extra_ids, &mut handles).await?;

    let mut albums: HashMap<i64, Album> = handles
        .into_iter()
        .map(|(id, handle)| (id, Album::from_handle(handle)))
        .collect();
    for track in tracks {
        if let Some(album) = track.album_id().and_then(|id| albums.get_mut(&id)) {
            album.add_track(track);
        }
    }
    for extra in extras {
        if let Some(album) = extra.album_id().and_then(|id| albums.get_mut(&id)) {
            album.add_extra(extra);
        }
    }

    Ok(ids.iter().filter_map(|id| albums.remove(id)).collect())
}
