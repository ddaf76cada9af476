//! `field=value` edits of library entities.
//!
//! Field names are the ones queries use. Editing an album-level field
//! through a track changes the shared album, and therefore every sibling.
//! Paths are never editable.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;

use crate::error::{Error, Result};
use crate::metadata::split_genres;
use crate::model::{self, Album, AlbumInfo, Extra, Track};

/// One `field=value` assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldEdit {
    pub field: String,
    pub value: String,
}

impl FieldEdit {
    pub fn parse(s: &str) -> Result<Self> {
        s.parse()
    }

    /// Apply to a track; album fields are written through to its album.
    pub fn apply_to_track(&self, track: &mut Track) -> Result<()> {
        let value = self.value.as_str();
        match self.field.as_str() {
            "title" => track.title = value.to_string(),
            "artist" => track.artist = value.to_string(),
            "track_num" => track.track_num = parse_int(&self.field, value)?,
            "disc" => track.disc = parse_int(&self.field, value)?,
            "genre" => track.genres = split_genres(value).into_iter().collect(),
            "mb_track_id" => track.mb_track_id = optional(value),
            "album" => track.set_album(value),
            "albumartist" => track.set_albumartist(value),
            "year" => track.set_year(parse_int(&self.field, value)?),
            "path" => return Err(not_editable(&self.field)),
            _ => {
                let handle = track.album_handle().clone();
                let mut info = handle.write();
                return self.apply_album_field(&mut info, "track");
            }
        }
        Ok(())
    }

    /// Apply to an album.
    pub fn apply_to_album(&self, album: &Album) -> Result<()> {
        album.update(|info| self.apply_album_field(info, "album"))
    }

    /// Extras have no editable fields.
    pub fn apply_to_extra(&self, _extra: &mut Extra) -> Result<()> {
        match self.field.as_str() {
            "path" | "filename" => Err(not_editable(&self.field)),
            _ => Err(unknown_field(&self.field, "extra")),
        }
    }

    fn apply_album_field(&self, info: &mut AlbumInfo, kind: &str) -> Result<()> {
        let value = self.value.as_str();
        match self.field.as_str() {
            "album" => info.title = value.to_string(),
            "albumartist" => info.artist = value.to_string(),
            "year" => info.year = parse_int(&self.field, value)?,
            "date" => info.date = parse_optional_date(&self.field, value)?,
            "original_date" => info.original_date = parse_optional_date(&self.field, value)?,
            "label" => info.label = optional(value),
            "mb_album_id" => info.mb_album_id = optional(value),
            "track_total" => {
                info.track_total = match optional(value) {
                    Some(v) => Some(parse_int(&self.field, &v)?),
                    None => None,
                }
            }
            "disc_total" => info.disc_total = parse_int(&self.field, value)?,
            "album_path" => return Err(not_editable(&self.field)),
            _ => return Err(unknown_field(&self.field, kind)),
        }
        Ok(())
    }
}

impl FromStr for FieldEdit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (field, value) = s
            .split_once('=')
            .ok_or_else(|| Error::edit(format!("expected <field>=<value>, got '{s}'")))?;
        let field = field.trim().to_lowercase();
        if field.is_empty() {
            return Err(Error::edit(format!("missing field name in '{s}'")));
        }
        Ok(Self {
            field,
            value: value.to_string(),
        })
    }
}

impl fmt::Display for FieldEdit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.field, self.value)
    }
}

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn parse_int(field: &str, value: &str) -> Result<i64> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::edit(format!("{field} expects an integer, got '{value}'")))
}

fn parse_optional_date(field: &str, value: &str) -> Result<Option<NaiveDate>> {
    match optional(value) {
        None => Ok(None),
        Some(v) => model::parse_date(&v).map(Some).ok_or_else(|| {
            Error::edit(format!(
                "{field} expects a date ({}), got '{value}'",
                model::DATE_FORMAT
            ))
        }),
    }
}

fn not_editable(field: &str) -> Error {
    Error::edit(format!("{field} cannot be edited"))
}

fn unknown_field(field: &str, kind: &str) -> Error {
    Error::edit(format!("unknown {kind} field '{field}'"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::sample_album;

    fn edit(s: &str) -> FieldEdit {
        FieldEdit::parse(s).unwrap()
    }

    #[test]
    fn test_parse() {
        let e = edit("Title=Hello = World");
        assert_eq!(e.field, "title");
        assert_eq!(e.value, "Hello = World");
        assert_eq!(e.to_string(), "title=Hello = World");

        assert_eq!(edit("label=").value, "");
        assert!(FieldEdit::parse("title").is_err());
        assert!(FieldEdit::parse("=x").is_err());
    }

    #[test]
    fn test_track_fields() {
        let mut album = sample_album("A", "One", 2000, 1);
        let track = &mut album.tracks[0];

        edit("title=New").apply_to_track(track).unwrap();
        edit("disc=2").apply_to_track(track).unwrap();
        edit("genre=rock; pop").apply_to_track(track).unwrap();
        assert_eq!(track.title, "New");
        assert_eq!(track.disc, 2);
        assert_eq!(track.genre_list(), "pop; rock");

        edit("genre=").apply_to_track(track).unwrap();
        assert!(track.genres.is_empty());
    }

    #[test]
    fn test_album_field_through_track_reaches_siblings() {
        let mut album = sample_album("A", "One", 2000, 2);
        edit("year=1999").apply_to_track(&mut album.tracks[0]).unwrap();
        edit("album=Renamed").apply_to_track(&mut album.tracks[0]).unwrap();
        edit("albumartist=B").apply_to_track(&mut album.tracks[0]).unwrap();

        assert_eq!(album.tracks[1].year(), 1999);
        assert_eq!(album.tracks[1].albumartist(), "B");
        assert_eq!(album.tracks[1].album(), "Renamed");
        assert_eq!(album.title(), "Renamed");
    }

    #[test]
    fn test_album_fields() {
        let album = sample_album("A", "One", 2000, 0);
        edit("date=2000-05-01").apply_to_album(&album).unwrap();
        edit("label=Warp").apply_to_album(&album).unwrap();
        edit("track_total=12").apply_to_album(&album).unwrap();

        let info = album.info();
        assert_eq!(info.date, model::parse_date("2000-05-01"));
        assert_eq!(info.label.as_deref(), Some("Warp"));
        assert_eq!(info.track_total, Some(12));

        edit("label=").apply_to_album(&album).unwrap();
        assert_eq!(album.info().label, None);
    }

    #[test]
    fn test_bad_values_and_fields() {
        let mut album = sample_album("A", "One", 2000, 1);
        assert!(edit("year=soon").apply_to_album(&album).is_err());
        assert!(edit("date=May 1st").apply_to_album(&album).is_err());
        assert!(edit("bpm=120").apply_to_track(&mut album.tracks[0]).is_err());
        // Track fields do not apply to albums
        assert!(edit("title=x").apply_to_album(&album).is_err());
        assert_eq!(album.year(), 2000);
    }

    #[test]
    fn test_paths_are_not_editable() {
        let mut album = sample_album("A", "One", 2000, 1);
        album.add_extra(Extra::new(&album, "/music/A/One/cover.jpg"));

        assert!(edit("path=/x").apply_to_track(&mut album.tracks[0]).is_err());
        assert!(edit("album_path=/x").apply_to_album(&album).is_err());
        assert!(edit("path=/x").apply_to_extra(&mut album.extras[0]).is_err());
        assert_eq!(album.path(), std::path::PathBuf::from("/music/A/One"));
    }
}
