//! Audio file metadata reading.
//!
//! Uses the lofty crate for format-independent metadata access.
//! Supports reading from MP3, FLAC, OGG, M4A, and WAV files.
//!
//! # Features
//! - Read track tags (title, artists, album, dates, positions, genres)
//! - Support for MusicBrainz release and recording IDs
//! - Turn a directory into an [`Album`]: audio files become tracks, every
//!   other file becomes an extra

use chrono::{Datelike, NaiveDate};
use lofty::file::TaggedFileExt;
use lofty::probe::Probe;
use lofty::tag::{Accessor, ItemKey, Tag};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::model::{self, Album, Extra, Track};

/// Extensions treated as audio files (case-insensitive).
pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "flac", "ogg", "wav", "m4a"];

/// Tags read from one audio file. Missing tags are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackTags {
    pub path: PathBuf,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album_artist: Option<String>,
    pub album: Option<String>,
    pub year: Option<i64>,
    pub date: Option<NaiveDate>,
    pub original_date: Option<NaiveDate>,
    pub track_num: Option<i64>,
    pub track_total: Option<i64>,
    pub disc: Option<i64>,
    pub disc_total: Option<i64>,
    pub genres: Vec<String>,
    pub label: Option<String>,
    pub mb_album_id: Option<String>,
    pub mb_track_id: Option<String>,
}

/// Whether `path` has an audio file extension.
pub fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| AUDIO_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Split a genre tag such as `"Hip Hop; East Coast"` into its members.
pub fn split_genres(value: &str) -> Vec<String> {
    value
        .split(';')
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .map(str::to_string)
        .collect()
}

fn tag_string(tag: &Tag, key: &ItemKey) -> Option<String> {
    tag.get_string(key)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Read the tags of one audio file.
pub fn read_track(path: &Path) -> Result<TrackTags> {
    // Probe the file to determine format and read tags
    let tagged_file = Probe::open(path)
        .map_err(|e| Error::metadata(path, e.to_string()))?
        .read()
        .map_err(|e| Error::metadata(path, e.to_string()))?;

    // Get the primary tag, or fall back to the first available tag
    let Some(tag) = tagged_file
        .primary_tag()
        .or_else(|| tagged_file.first_tag())
    else {
        return Ok(TrackTags {
            path: path.to_path_buf(),
            ..TrackTags::default()
        });
    };

    let date = tag_string(tag, &ItemKey::RecordingDate).and_then(|d| model::parse_date(&d));

    Ok(TrackTags {
        path: path.to_path_buf(),
        title: tag.title().map(|s| s.to_string()),
        artist: tag.artist().map(|s| s.to_string()),
        album_artist: tag_string(tag, &ItemKey::AlbumArtist),
        album: tag.album().map(|s| s.to_string()),
        year: tag
            .year()
            .map(i64::from)
            .or_else(|| date.map(|d| i64::from(d.year()))),
        date,
        original_date: tag_string(tag, &ItemKey::OriginalReleaseDate)
            .and_then(|d| model::parse_date(&d)),
        track_num: tag.track().map(i64::from),
        track_total: tag.track_total().map(i64::from),
        disc: tag.disk().map(i64::from),
        disc_total: tag.disk_total().map(i64::from),
        genres: tag.genre().map(|g| split_genres(&g)).unwrap_or_default(),
        label: tag_string(tag, &ItemKey::Label),
        mb_album_id: tag_string(tag, &ItemKey::MusicBrainzReleaseId),
        mb_track_id: tag_string(tag, &ItemKey::MusicBrainzRecordingId),
    })
}

/// Build an album rooted at `dir` from already-read tags.
///
/// Album fields come from the first track that carries each value.
/// Tracks without a track number are numbered by their position.
pub fn build_album(dir: &Path, tracks: Vec<TrackTags>, extras: Vec<PathBuf>) -> Result<Album> {
    if tracks.is_empty() {
        return Err(Error::metadata(dir, "no audio files found"));
    }

    fn first<T>(tracks: &[TrackTags], f: impl Fn(&TrackTags) -> Option<T>) -> Option<T> {
        tracks.iter().find_map(f)
    }

    let artist = first(&tracks, |t| t.album_artist.clone())
        .or_else(|| first(&tracks, |t| t.artist.clone()))
        .unwrap_or_else(|| "Unknown Artist".to_string());
    let title = first(&tracks, |t| t.album.clone())
        .or_else(|| dir.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "Unknown Album".to_string());
    let year = first(&tracks, |t| t.year).unwrap_or(0);

    let mut album = Album::new(artist, title, year, dir);
    album.update(|info| {
        info.date = first(&tracks, |t| t.date);
        info.original_date = first(&tracks, |t| t.original_date);
        info.label = first(&tracks, |t| t.label.clone());
        info.mb_album_id = first(&tracks, |t| t.mb_album_id.clone());
        info.track_total = first(&tracks, |t| t.track_total);
        info.disc_total = first(&tracks, |t| t.disc_total).unwrap_or(1);
    });

    for (i, tags) in tracks.into_iter().enumerate() {
        let title = tags.title.unwrap_or_else(|| {
            tags.path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default()
        });
        let track_num = tags.track_num.unwrap_or(i as i64 + 1);
        let mut track = Track::new(&album, track_num, title, tags.path);
        if let Some(artist) = tags.artist {
            track.artist = artist;
        }
        track.disc = tags.disc.unwrap_or(1);
        track.genres = tags.genres.into_iter().collect();
        track.mb_track_id = tags.mb_track_id;
        album.add_track(track);
    }

    for path in extras {
        album.add_extra(Extra::new(&album, path));
    }

    Ok(album)
}

/// Every directory under `root` (including `root`) that directly contains
/// audio files, sorted.
pub fn album_dirs(root: &Path) -> Vec<PathBuf> {
    let dirs: BTreeSet<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && is_audio_file(e.path()))
        .filter_map(|e| e.path().parent().map(Path::to_path_buf))
        .collect();
    dirs.into_iter().collect()
}

/// Read the files directly inside `dir` as one album.
///
/// Subdirectories are not descended into; use [`album_dirs`] to find
/// them. Audio files that cannot be read are skipped with a warning.
pub fn read_album(dir: &Path) -> Result<Album> {
    if !dir.is_dir() {
        return Err(Error::not_found(dir));
    }

    let mut tracks = Vec::new();
    let mut extras = Vec::new();

    for entry in WalkDir::new(dir)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if is_audio_file(path) {
            match read_track(path) {
                Ok(tags) => tracks.push(tags),
                Err(e) => warn!(target: "library::add", "Skipping {}: {}", path.display(), e),
            }
        } else {
            extras.push(path.to_path_buf());
        }
    }

    build_album(dir, tracks, extras)
}

/// Read a single audio file as a one-track album rooted at its directory.
pub fn read_single(path: &Path) -> Result<Album> {
    if !path.is_file() {
        return Err(Error::not_found(path));
    }
    let dir = path.parent().unwrap_or(Path::new("/"));
    let tags = read_track(path)?;
    build_album(dir, vec![tags], Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn tags(path: &str, num: Option<i64>) -> TrackTags {
        TrackTags {
            path: PathBuf::from(path),
            title: Some(format!("Song {path}")),
            artist: Some("Track Artist".to_string()),
            album: Some("Album".to_string()),
            track_num: num,
            ..TrackTags::default()
        }
    }

    #[test]
    fn test_read_non_audio_file_returns_error() {
        // Create a temporary text file
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        writeln!(file, "This is just some text, not music.").expect("Failed to write to temp file");

        // Should fail because it's not a valid audio file
        let result = read_track(file.path());
        assert!(matches!(result, Err(Error::Metadata { .. })));
    }

    #[test]
    fn test_read_non_existent_file_returns_error() {
        let path = Path::new("non_existent_file.mp3");
        assert!(read_track(path).is_err());
        assert!(matches!(read_single(path), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_is_audio_file() {
        assert!(is_audio_file(Path::new("/a/song.mp3")));
        assert!(is_audio_file(Path::new("/a/UPPERCASE.OGG")));
        assert!(!is_audio_file(Path::new("/a/cover.jpg")));
        assert!(!is_audio_file(Path::new("/a/noext")));
    }

    #[test]
    fn test_split_genres() {
        assert_eq!(split_genres("Hip Hop; East Coast"), vec!["Hip Hop", "East Coast"]);
        assert_eq!(split_genres(" ; rock ;"), vec!["rock"]);
        assert!(split_genres("").is_empty());
    }

    #[test]
    fn test_build_album_from_tags() {
        let mut first = tags("/m/a/01.mp3", Some(1));
        first.album_artist = Some("Album Artist".to_string());
        first.year = Some(1993);
        first.genres = vec!["hip hop".to_string()];
        let mut second = tags("/m/a/02.mp3", None);
        second.label = Some("Loud".to_string());

        let album = build_album(
            Path::new("/m/a"),
            vec![first, second],
            vec![PathBuf::from("/m/a/cover.jpg")],
        )
        .unwrap();

        let info = album.info();
        assert_eq!(info.artist, "Album Artist");
        assert_eq!(info.title, "Album");
        assert_eq!(info.year, 1993);
        assert_eq!(info.label.as_deref(), Some("Loud"));
        assert_eq!(info.path, PathBuf::from("/m/a"));
        assert_eq!(album.tracks.len(), 2);
        assert_eq!(album.tracks[0].artist, "Track Artist");
        assert_eq!(album.tracks[1].track_num, 2);
        assert!(album.tracks[0].genres.contains("hip hop"));
        assert_eq!(album.extras[0].filename(), "cover.jpg");
    }

    #[test]
    fn test_build_album_falls_back_to_directory_name() {
        let bare = TrackTags {
            path: PathBuf::from("/m/Some Dir/track.flac"),
            ..TrackTags::default()
        };
        let album = build_album(Path::new("/m/Some Dir"), vec![bare], Vec::new()).unwrap();
        assert_eq!(album.title(), "Some Dir");
        assert_eq!(album.artist(), "Unknown Artist");
        assert_eq!(album.tracks[0].title, "track");
        assert_eq!(album.tracks[0].track_num, 1);
    }

    #[test]
    fn test_build_album_without_tracks_fails() {
        assert!(build_album(Path::new("/m/empty"), Vec::new(), Vec::new()).is_err());
    }

    #[test]
    fn test_album_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let disc2 = root.join("Album").join("CD2");
        std::fs::create_dir_all(&disc2).unwrap();
        std::fs::write(root.join("Album").join("01.mp3"), "").unwrap();
        std::fs::write(root.join("Album").join("cover.jpg"), "").unwrap();
        std::fs::write(disc2.join("01.FLAC"), "").unwrap();
        std::fs::create_dir_all(root.join("Scans")).unwrap();
        std::fs::write(root.join("Scans").join("back.png"), "").unwrap();

        assert_eq!(album_dirs(root), vec![root.join("Album"), disc2]);
    }

    #[test]
    fn test_read_album_without_audio_fails() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), "x").unwrap();
        // Unreadable audio files are skipped, not fatal
        std::fs::write(dir.path().join("broken.mp3"), "not audio").unwrap();

        let err = read_album(dir.path()).unwrap_err();
        assert!(matches!(err, Error::Metadata { .. }));
    }
}
