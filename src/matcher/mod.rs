//! Pairing of tracks between two versions of an album.
//!
//! Every candidate pair is scored, pairs are visited from the highest
//! score down, and a pair is accepted when its score reaches the threshold
//! and neither side has been used yet. Whatever is left over is paired with
//! `None`.
//!
//! The assignment is greedy and therefore not globally optimal: if one
//! high-scoring pair takes tracks that two lower-scoring pairs needed, both
//! of those tracks stay unmatched. Switching to an optimal assignment would
//! change which tracks get merged on add, so it is not done here.

use crate::model::{Album, Track};

/// Minimum score for two tracks to be considered the same track.
pub const DEFAULT_MATCH_THRESHOLD: f64 = 1.0;

/// A matched (or unmatched) pair of tracks.
pub type TrackPair<'a, 'b> = (Option<&'a Track>, Option<&'b Track>);

/// Similarity of two tracks in `[0, 1]`.
///
/// Tracks at the same position (`track_num` and `disc`) score 1, anything
/// else scores 0.
pub fn track_match_value(a: &Track, b: &Track) -> f64 {
    if a.track_num == b.track_num && a.disc == b.disc {
        1.0
    } else {
        0.0
    }
}

/// Greedily pair items of `a` with items of `b` by index.
///
/// The result holds every index of `a` exactly once on the left and every
/// index of `b` exactly once on the right: accepted matches first, in the
/// order they were accepted, then unmatched `a` items, then unmatched `b`
/// items. Ties keep the `a`-major enumeration order.
pub fn match_indices<A, B>(
    a: &[A],
    b: &[B],
    threshold: f64,
    score: impl Fn(&A, &B) -> f64,
) -> Vec<(Option<usize>, Option<usize>)> {
    let mut scored: Vec<(usize, usize, f64)> = Vec::with_capacity(a.len() * b.len());
    for (i, item_a) in a.iter().enumerate() {
        for (j, item_b) in b.iter().enumerate() {
            scored.push((i, j, score(item_a, item_b)));
        }
    }
    // Stable sort keeps enumeration order among equal scores
    scored.sort_by(|x, y| y.2.total_cmp(&x.2));

    let mut used_a = vec![false; a.len()];
    let mut used_b = vec![false; b.len()];
    let mut pairs = Vec::with_capacity(a.len() + b.len());

    for (i, j, value) in scored {
        if value >= threshold && !used_a[i] && !used_b[j] {
            used_a[i] = true;
            used_b[j] = true;
            pairs.push((Some(i), Some(j)));
        }
    }

    pairs.extend((0..a.len()).filter(|&i| !used_a[i]).map(|i| (Some(i), None)));
    pairs.extend((0..b.len()).filter(|&j| !used_b[j]).map(|j| (None, Some(j))));
    pairs
}

/// Pair two track lists with a custom similarity function.
pub fn match_tracks_by<'a, 'b>(
    a: &'a [Track],
    b: &'b [Track],
    threshold: f64,
    score: impl Fn(&Track, &Track) -> f64,
) -> Vec<TrackPair<'a, 'b>> {
    match_indices(a, b, threshold, score)
        .into_iter()
        .map(|(i, j)| (i.map(|i| &a[i]), j.map(|j| &b[j])))
        .collect()
}

/// Pair two track lists by position.
pub fn match_tracks<'a, 'b>(a: &'a [Track], b: &'b [Track], threshold: f64) -> Vec<TrackPair<'a, 'b>> {
    match_tracks_by(a, b, threshold, track_match_value)
}

/// Pair the tracks of two albums by position.
pub fn get_matching_tracks<'a, 'b>(
    album_a: &'a Album,
    album_b: &'b Album,
    threshold: f64,
) -> Vec<TrackPair<'a, 'b>> {
    match_tracks(&album_a.tracks, &album_b.tracks, threshold)
}
