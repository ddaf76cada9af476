use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use super::{Album, AlbumRef};

/// A track (audio file) in the music library.
///
/// Identity within the library is the position `(track_num, disc)` inside
/// the owning album. Album-level fields are not stored on the track; the
/// accessors below delegate to the album handle. Cloning a track keeps it
/// attached to the same album.
#[derive(Debug, Clone)]
pub struct Track {
    /// Database ID (None until saved)
    pub id: Option<i64>,
    album: AlbumRef,
    /// Track title
    pub title: String,
    /// Track artist (defaults to the album artist)
    pub artist: String,
    /// Position on the disc
    pub track_num: i64,
    /// Disc number
    pub disc: i64,
    /// Absolute file path (unique)
    pub path: PathBuf,
    /// Genres from the shared vocabulary
    pub genres: BTreeSet<String>,
    /// MusicBrainz recording ID
    pub mb_track_id: Option<String>,
}

impl Track {
    /// Create a track belonging to `album`.
    ///
    /// The track is not pushed onto `album.tracks`; use [`Album::add_track`].
    pub fn new(
        album: &Album,
        track_num: i64,
        title: impl Into<String>,
        path: impl Into<PathBuf>,
    ) -> Self {
        Self::with_handle(album.handle().clone(), track_num, title, path)
    }

    pub(crate) fn with_handle(
        album: AlbumRef,
        track_num: i64,
        title: impl Into<String>,
        path: impl Into<PathBuf>,
    ) -> Self {
        let artist = album.read().artist.clone();
        Self {
            id: None,
            album,
            title: title.into(),
            artist,
            track_num,
            disc: 1,
            path: path.into(),
            genres: BTreeSet::new(),
            mb_track_id: None,
        }
    }

    pub(crate) fn attach(&mut self, album: &AlbumRef) {
        self.album = Arc::clone(album);
    }

    pub fn album_handle(&self) -> &AlbumRef {
        &self.album
    }

    /// Whether both tracks belong to the same album instance.
    pub fn shares_album_with(&self, other: &Track) -> bool {
        Arc::ptr_eq(&self.album, &other.album)
    }

    pub fn album_id(&self) -> Option<i64> {
        self.album.read().id
    }

    /// Album title.
    pub fn album(&self) -> String {
        self.album.read().title.clone()
    }

    /// Set the album title for this track and all its siblings.
    pub fn set_album(&self, title: impl Into<String>) {
        self.album.write().title = title.into();
    }

    pub fn albumartist(&self) -> String {
        self.album.read().artist.clone()
    }

    pub fn set_albumartist(&self, artist: impl Into<String>) {
        self.album.write().artist = artist.into();
    }

    pub fn album_path(&self) -> PathBuf {
        self.album.read().path.clone()
    }

    pub fn year(&self) -> i64 {
        self.album.read().year
    }

    pub fn set_year(&self, year: i64) {
        self.album.write().year = year;
    }

    /// Lower-cased file extension, if any.
    pub fn extension(&self) -> Option<String> {
        self.path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
    }

    /// Genres joined for display.
    pub fn genre_list(&self) -> String {
        self.genres.iter().cloned().collect::<Vec<_>>().join("; ")
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {} - {}", self.artist, self.album(), self.title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_track_inherits_album_artist() {
        let album = Album::new("Wu-Tang Clan", "Enter the Wu-Tang", 1993, "/music/wu");
        let track = Track::new(&album, 1, "Bring da Ruckus", "/music/wu/01.flac");
        assert_eq!(track.artist, "Wu-Tang Clan");
        assert_eq!(track.disc, 1);
        assert_eq!(track.extension().as_deref(), Some("flac"));
    }

    #[test]
    fn test_album_fields_are_shared_between_siblings() {
        let mut album = Album::new("Wu-Tang Clan", "Enter the Wu-Tang", 1993, "/music/wu");
        album.add_track(Track::new(&album, 1, "Bring da Ruckus", "/music/wu/01.flac"));
        album.add_track(Track::new(&album, 2, "Shame on a Nigga", "/music/wu/02.flac"));

        album.tracks[0].set_album("Enter the Wu-Tang (36 Chambers)");
        album.tracks[1].set_year(1994);

        assert_eq!(album.tracks[1].album(), "Enter the Wu-Tang (36 Chambers)");
        assert_eq!(album.title(), "Enter the Wu-Tang (36 Chambers)");
        assert_eq!(album.tracks[0].year(), 1994);
        assert!(album.tracks[0].shares_album_with(&album.tracks[1]));
    }

    #[test]
    fn test_track_artist_is_independent_of_album_artist() {
        let album = Album::new("Various Artists", "Comp", 2001, "/music/comp");
        let mut track = Track::new(&album, 1, "Song", "/music/comp/01.mp3");
        track.artist = "Someone".to_string();
        assert_eq!(track.albumartist(), "Various Artists");
        assert_eq!(album.artist(), "Various Artists");
    }

    #[test]
    fn test_display_and_genres() {
        let album = Album::new("Artist", "Album", 2000, "/a");
        let mut track = Track::new(&album, 1, "Title", "/a/01.mp3");
        track.genres.insert("rock".to_string());
        track.genres.insert("indie".to_string());
        assert_eq!(track.to_string(), "Artist - Album - Title");
        assert_eq!(track.genre_list(), "indie; rock");
    }
}
