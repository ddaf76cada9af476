//! Reconciling two versions of the same album.
//!
//! [`merge`] folds a `source` album into `target`. Tracks at the same
//! position are treated as the same track; which side's metadata and paths
//! survive depends on `overwrite_album_info`:
//!
//! | | `false` (keep target) | `true` (take source) |
//! |---|---|---|
//! | album fields | target wins, empty optional fields are filled | source wins where it has a value, target id kept |
//! | matched tracks | target wins, empty `mb_track_id` / genres filled | source metadata and path, missing `mb_track_id` / genres kept, target id kept |
//! | matched extras | target path kept | source path |
//!
//! Unmatched source tracks and extras are always added to `target`.
//! Divergent metadata is never an error.

use tracing::debug;

use crate::db::{self, Session};
use crate::error::Result;
use crate::matcher::{self, DEFAULT_MATCH_THRESHOLD};
use crate::model::{Album, AlbumInfo, Extra, Track};

/// Merge `source` into `target` using the default match threshold.
pub fn merge(target: &mut Album, source: Album, overwrite_album_info: bool) {
    merge_with_threshold(target, source, overwrite_album_info, DEFAULT_MATCH_THRESHOLD);
}

/// Merge `source` into `target`, pairing tracks whose match value reaches
/// `threshold`.
pub fn merge_with_threshold(
    target: &mut Album,
    source: Album,
    overwrite_album_info: bool,
    threshold: f64,
) {
    let (source_info, source_tracks, source_extras) = source.into_parts();

    target.update(|info| merge_info(info, source_info, overwrite_album_info));
    let (matched, added) = merge_tracks(target, source_tracks, overwrite_album_info, threshold);
    let extras_added = merge_extras(target, source_extras, overwrite_album_info);

    debug!(
        target: "library::merge",
        album = %target,
        matched,
        added,
        extras_added,
        "Merged album"
    );
}

fn merge_info(target: &mut AlbumInfo, source: AlbumInfo, overwrite: bool) {
    if overwrite {
        target.artist = source.artist;
        target.title = source.title;
        target.year = source.year;
        target.path = source.path;
        target.disc_total = source.disc_total;
        target.date = source.date.or(target.date);
        target.original_date = source.original_date.or(target.original_date);
        target.label = source.label.or(target.label.take());
        target.mb_album_id = source.mb_album_id.or(target.mb_album_id.take());
        target.track_total = source.track_total.or(target.track_total);
        return;
    }

    target.date = target.date.or(source.date);
    target.original_date = target.original_date.or(source.original_date);
    target.label = target.label.take().or(source.label);
    target.mb_album_id = target.mb_album_id.take().or(source.mb_album_id);
    target.track_total = target.track_total.or(source.track_total);
}

/// Returns (matched, added).
fn merge_tracks(
    target: &mut Album,
    source: Vec<Track>,
    overwrite: bool,
    threshold: f64,
) -> (usize, usize) {
    let pairs = matcher::match_indices(&target.tracks, &source, threshold, matcher::track_match_value);
    let mut source: Vec<Option<Track>> = source.into_iter().map(Some).collect();
    let (mut matched, mut added) = (0, 0);

    for pair in pairs {
        match pair {
            (Some(i), Some(j)) => {
                if let Some(from) = source[j].take() {
                    merge_track(&mut target.tracks[i], from, overwrite);
                    matched += 1;
                }
            }
            (None, Some(j)) => {
                if let Some(track) = source[j].take() {
                    target.add_track(track);
                    added += 1;
                }
            }
            _ => {}
        }
    }
    (matched, added)
}

fn merge_track(target: &mut Track, source: Track, overwrite: bool) {
    if overwrite {
        target.title = source.title;
        target.artist = source.artist;
        target.track_num = source.track_num;
        target.disc = source.disc;
        target.path = source.path;
        if !source.genres.is_empty() {
            target.genres = source.genres;
        }
        if source.mb_track_id.is_some() {
            target.mb_track_id = source.mb_track_id;
        }
        return;
    }

    if target.mb_track_id.is_none() {
        target.mb_track_id = source.mb_track_id;
    }
    if target.genres.is_empty() {
        target.genres = source.genres;
    }
}

/// Extras are matched by filename. Returns the number added.
fn merge_extras(target: &mut Album, source: Vec<Extra>, overwrite: bool) -> usize {
    let mut added = 0;
    for extra in source {
        let filename = extra.filename();
        match target.get_extra_mut(&filename) {
            Some(existing) => {
                if overwrite {
                    existing.path = extra.path;
                }
            }
            None => {
                target.add_extra(extra);
                added += 1;
            }
        }
    }
    added
}

/// Find a stored album that `candidate` would collide with.
///
/// An album collides when it has the same path, the same
/// `(artist, title, year)`, or the same MusicBrainz release id. The
/// candidate's own row (if it is saved) never counts.
pub async fn find_existing(session: &mut Session, candidate: &Album) -> Result<Option<Album>> {
    let info = candidate.info();
    let id: Option<i64> = sqlx::query_scalar(
        r#"
        SELECT id FROM albums
        WHERE (
            path = ?
            OR (artist = ? AND title = ? AND year = ?)
            OR (mb_album_id IS NOT NULL AND mb_album_id = ?)
        )
        AND (? IS NULL OR id != ?)
        ORDER BY id
        LIMIT 1
        "#,
    )
    .bind(info.path.to_string_lossy().into_owned())
    .bind(&info.artist)
    .bind(&info.title)
    .bind(info.year)
    .bind(&info.mb_album_id)
    .bind(info.id)
    .bind(info.id)
    .fetch_optional(session.conn())
    .await?;

    let Some(id) = id else {
        return Ok(None);
    };
    Ok(db::load_albums(session, &[id]).await?.pop())
}
