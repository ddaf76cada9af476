//! Queryable fields per entity kind.
//!
//! Each kind has a closed table mapping a query field name to the SQL
//! column it filters on. Query SQL aliases the tables as `t` (tracks),
//! `a` (albums) and `e` (extras).

use crate::model::EntityKind;

/// How a stored value is turned into text before matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Text,
    Integer,
    /// Stored as `YYYY-MM-DD` text
    Date,
}

/// Where a field's value lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    /// A single column expression
    Scalar(&'static str),
    /// The track's genre set (matches if any member matches)
    Genres,
}

/// A queryable attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub column: Column,
    pub kind: ValueKind,
}

const fn text(name: &'static str, column: &'static str) -> Field {
    Field {
        name,
        column: Column::Scalar(column),
        kind: ValueKind::Text,
    }
}

const fn integer(name: &'static str, column: &'static str) -> Field {
    Field {
        name,
        column: Column::Scalar(column),
        kind: ValueKind::Integer,
    }
}

const fn date(name: &'static str, column: &'static str) -> Field {
    Field {
        name,
        column: Column::Scalar(column),
        kind: ValueKind::Date,
    }
}

const TRACK_FIELDS: &[Field] = &[
    text("title", "t.title"),
    text("artist", "t.artist"),
    integer("track_num", "t.track_num"),
    integer("disc", "t.disc"),
    text("path", "t.path"),
    Field {
        name: "genre",
        column: Column::Genres,
        kind: ValueKind::Text,
    },
    text("mb_track_id", "t.mb_track_id"),
];

/// Album fields, reachable from every kind through the owning album.
const ALBUM_FIELDS: &[Field] = &[
    text("album", "a.title"),
    text("albumartist", "a.artist"),
    text("album_path", "a.path"),
    integer("year", "a.year"),
    date("date", "a.date"),
    date("original_date", "a.original_date"),
    text("label", "a.label"),
    text("mb_album_id", "a.mb_album_id"),
    integer("track_total", "a.track_total"),
    integer("disc_total", "a.disc_total"),
];

const EXTRA_FIELDS: &[Field] = &[text("path", "e.path"), text("filename", "e.filename")];

const TRACK_SCHEMA: &[&[Field]] = &[TRACK_FIELDS, ALBUM_FIELDS];
const EXTRA_SCHEMA: &[&[Field]] = &[EXTRA_FIELDS, ALBUM_FIELDS];

/// Field tables searched for `kind`, in lookup order.
///
/// Album queries filter through the track table, so they share the track
/// schema.
pub fn schema(kind: EntityKind) -> &'static [&'static [Field]] {
    match kind {
        EntityKind::Track | EntityKind::Album => TRACK_SCHEMA,
        EntityKind::Extra => EXTRA_SCHEMA,
    }
}

/// Look up a field by (lower-case) name.
pub fn lookup(kind: EntityKind, name: &str) -> Option<&'static Field> {
    schema(kind)
        .iter()
        .flat_map(|table| table.iter())
        .find(|field| field.name == name)
}

/// All field names queryable for `kind`.
pub fn field_names(kind: EntityKind) -> Vec<&'static str> {
    schema(kind)
        .iter()
        .flat_map(|table| table.iter())
        .map(|field| field.name)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_kind_reaches_album_fields() {
        for name in ["album", "albumartist", "album_path", "year"] {
            assert!(lookup(EntityKind::Track, name).is_some(), "{name}");
        }
        assert_eq!(
            lookup(EntityKind::Track, "album").unwrap().column,
            Column::Scalar("a.title")
        );
    }

    #[test]
    fn test_album_kind_accepts_track_fields() {
        assert!(lookup(EntityKind::Album, "title").is_some());
        assert_eq!(
            lookup(EntityKind::Album, "genre").unwrap().column,
            Column::Genres
        );
    }

    #[test]
    fn test_extra_path_is_the_extra_path() {
        assert_eq!(
            lookup(EntityKind::Extra, "path").unwrap().column,
            Column::Scalar("e.path")
        );
        assert_eq!(
            lookup(EntityKind::Track, "path").unwrap().column,
            Column::Scalar("t.path")
        );
        assert!(lookup(EntityKind::Extra, "title").is_none());
        assert!(lookup(EntityKind::Extra, "year").is_some());
    }

    #[test]
    fn test_unknown_field() {
        assert!(lookup(EntityKind::Track, "bpm").is_none());
        assert!(lookup(EntityKind::Track, "Title").is_none());
    }

    #[test]
    fn test_names_are_unique_per_kind() {
        for kind in [EntityKind::Track, EntityKind::Album, EntityKind::Extra] {
            let mut names = field_names(kind);
            let total = names.len();
            names.sort_unstable();
            names.dedup();
            assert_eq!(names.len(), total, "duplicate field for {kind}");
        }
    }
}
