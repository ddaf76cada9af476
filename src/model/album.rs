use chrono::NaiveDate;
use parking_lot::RwLock;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use super::{Extra, Track};

/// Shared handle to an album's scalar fields.
///
/// Cloned into every [`Track`] and [`Extra`] that belongs to the album.
pub type AlbumRef = Arc<RwLock<AlbumInfo>>;

/// Scalar album fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumInfo {
    /// Database ID (None until saved)
    pub id: Option<i64>,
    /// Album artist
    pub artist: String,
    /// Album title
    pub title: String,
    /// Release year
    pub year: i64,
    /// Full release date
    pub date: Option<NaiveDate>,
    /// Date of the original release (for reissues)
    pub original_date: Option<NaiveDate>,
    /// Album directory (unique)
    pub path: PathBuf,
    /// Record label
    pub label: Option<String>,
    /// MusicBrainz release ID
    pub mb_album_id: Option<String>,
    /// Number of tracks on the release
    pub track_total: Option<i64>,
    /// Number of discs on the release
    pub disc_total: i64,
}

impl AlbumInfo {
    pub fn new(
        artist: impl Into<String>,
        title: impl Into<String>,
        year: i64,
        path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            id: None,
            artist: artist.into(),
            title: title.into(),
            year,
            date: None,
            original_date: None,
            path: path.into(),
            label: None,
            mb_album_id: None,
            track_total: None,
            disc_total: 1,
        }
    }
}

/// An album in the music library.
///
/// Owns its tracks and extras. Removing an album from the store removes
/// them as well.
#[derive(Debug)]
pub struct Album {
    info: AlbumRef,
    pub tracks: Vec<Track>,
    pub extras: Vec<Extra>,
}

impl Album {
    pub fn new(
        artist: impl Into<String>,
        title: impl Into<String>,
        year: i64,
        path: impl Into<PathBuf>,
    ) -> Self {
        Self::from_info(AlbumInfo::new(artist, title, year, path))
    }

    pub fn from_info(info: AlbumInfo) -> Self {
        Self::from_handle(Arc::new(RwLock::new(info)))
    }

    /// Wrap an existing handle, e.g. one already shared by loaded tracks.
    pub fn from_handle(info: AlbumRef) -> Self {
        Self {
            info,
            tracks: Vec::new(),
            extras: Vec::new(),
        }
    }

    /// The shared handle tracks and extras point at.
    pub fn handle(&self) -> &AlbumRef {
        &self.info
    }

    /// Snapshot of the scalar fields.
    pub fn info(&self) -> AlbumInfo {
        self.info.read().clone()
    }

    /// Mutate the scalar fields in place.
    pub fn update<R>(&self, f: impl FnOnce(&mut AlbumInfo) -> R) -> R {
        f(&mut self.info.write())
    }

    pub fn id(&self) -> Option<i64> {
        self.info.read().id
    }

    pub fn artist(&self) -> String {
        self.info.read().artist.clone()
    }

    pub fn title(&self) -> String {
        self.info.read().title.clone()
    }

    pub fn year(&self) -> i64 {
        self.info.read().year
    }

    pub fn path(&self) -> PathBuf {
        self.info.read().path.clone()
    }

    /// Attach a track to this album.
    pub fn add_track(&mut self, mut track: Track) {
        track.attach(&self.info);
        self.tracks.push(track);
    }

    /// Attach an extra to this album.
    pub fn add_extra(&mut self, mut extra: Extra) {
        extra.attach(&self.info);
        self.extras.push(extra);
    }

    /// Find an extra by filename.
    pub fn get_extra_mut(&mut self, filename: &str) -> Option<&mut Extra> {
        self.extras.iter_mut().find(|e| e.filename() == filename)
    }

    /// Split into scalar fields and members.
    ///
    /// The members still point at this album's handle until they are added
    /// to another album.
    pub fn into_parts(self) -> (AlbumInfo, Vec<Track>, Vec<Extra>) {
        let info = self.info.read().clone();
        (info, self.tracks, self.extras)
    }

    /// Copy the whole album graph onto a fresh handle.
    ///
    /// Changes to the copy are not visible through the original.
    pub fn deep_copy(&self) -> Album {
        let mut copy = Album::from_info(self.info());
        for track in &self.tracks {
            copy.add_track(track.clone());
        }
        for extra in &self.extras {
            copy.add_extra(extra.clone());
        }
        copy
    }
}

impl fmt::Display for Album {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let info = self.info.read();
        write!(f, "{} - {} ({})", info.artist, info.title, info.year)
    }
}
