//! Core data models for the music library.
//!
//! Defines the three persisted entities: [`Album`], [`Track`], and [`Extra`].
//!
//! # Ownership
//!
//! An album's scalar fields live behind a shared [`AlbumRef`] handle. Every
//! track and extra of the album holds a clone of that handle, so album-level
//! accessors on a [`Track`] (`album`, `albumartist`, `year`, ...) read and
//! write the one shared album. Writing `track.set_album("X")` is visible to
//! every sibling track.
//!
//! # Database Schema
//!
//! The models map to the following tables:
//! - `albums` - unique on `path` and on `(artist, title, year)`
//! - `tracks` - unique on `path` and on `(album_id, track_num, disc)`
//! - `extras` - unique on `path` and on `(album_id, filename)`
//! - `genres` / `track_genres` - shared genre vocabulary

mod album;
mod extra;
mod track;

pub use album::{Album, AlbumInfo, AlbumRef};
pub use extra::Extra;
pub use track::Track;

use chrono::NaiveDate;
use std::fmt;

/// Storage and display format for album dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a stored or user-supplied date.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()
}

/// Format a date the way it is stored and matched by queries.
pub fn format_date(date: &NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// The kind of library entity a query or command operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EntityKind {
    #[default]
    Track,
    Album,
    Extra,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Track => "track",
            EntityKind::Album => "album",
            EntityKind::Extra => "extra",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A library item returned by a query.
#[derive(Debug)]
pub enum Entity {
    Track(Track),
    Album(Album),
    Extra(Extra),
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Track(_) => EntityKind::Track,
            Entity::Album(_) => EntityKind::Album,
            Entity::Extra(_) => EntityKind::Extra,
        }
    }

    /// Filesystem path of the item.
    pub fn path(&self) -> std::path::PathBuf {
        match self {
            Entity::Track(track) => track.path.clone(),
            Entity::Album(album) => album.path(),
            Entity::Extra(extra) => extra.path.clone(),
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entity::Track(track) => track.fmt(f),
            Entity::Album(album) => album.fmt(f),
            Entity::Extra(extra) => extra.fmt(f),
        }
    }
}
