use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use super::{Album, AlbumRef};

/// A non-audio file belonging to an album (cover art, rip log, playlist).
#[derive(Debug, Clone)]
pub struct Extra {
    /// Database ID (None until saved)
    pub id: Option<i64>,
    album: AlbumRef,
    /// Absolute file path (unique)
    pub path: PathBuf,
}

impl Extra {
    pub fn new(album: &Album, path: impl Into<PathBuf>) -> Self {
        Self::with_handle(album.handle().clone(), path)
    }

    pub(crate) fn with_handle(album: AlbumRef, path: impl Into<PathBuf>) -> Self {
        Self {
            id: None,
            album,
            path: path.into(),
        }
    }

    pub(crate) fn attach(&mut self, album: &AlbumRef) {
        self.album = Arc::clone(album);
    }

    pub fn album_handle(&self) -> &AlbumRef {
        &self.album
    }

    pub fn album_id(&self) -> Option<i64> {
        self.album.read().id
    }

    /// File name without its directory.
    pub fn filename(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

impl fmt::Display for Extra {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let album = self.album.read();
        write!(f, "{} - {} - {}", album.artist, album.title, self.filename())
    }
}
