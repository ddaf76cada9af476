//! Showing every field of matching items.

use tokio::runtime::Runtime;

use super::{find, open_session};
use crate::config::Config;
use crate::model::{self, AlbumInfo, Entity, EntityKind, Extra, Track};

type FieldList = Vec<(&'static str, String)>;

fn opt<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map(ToString::to_string).unwrap_or_default()
}

fn album_fields(info: &AlbumInfo) -> FieldList {
    vec![
        ("album", info.title.clone()),
        ("albumartist", info.artist.clone()),
        ("album_path", info.path.display().to_string()),
        ("year", info.year.to_string()),
        ("date", info.date.as_ref().map(model::format_date).unwrap_or_default()),
        (
            "original_date",
            info.original_date.as_ref().map(model::format_date).unwrap_or_default(),
        ),
        ("label", opt(&info.label)),
        ("mb_album_id", opt(&info.mb_album_id)),
        ("track_total", opt(&info.track_total)),
        ("disc_total", info.disc_total.to_string()),
    ]
}

fn track_fields(track: &Track) -> FieldList {
    let mut fields = vec![
        ("title", track.title.clone()),
        ("artist", track.artist.clone()),
        ("track_num", track.track_num.to_string()),
        ("disc", track.disc.to_string()),
        ("path", track.path.display().to_string()),
        ("format", track.extension().unwrap_or_default()),
        ("genre", track.genre_list()),
        ("mb_track_id", opt(&track.mb_track_id)),
    ];
    fields.extend(album_fields(&track.album_handle().read()));
    fields
}

fn extra_fields(extra: &Extra) -> FieldList {
    let mut fields = vec![
        ("path", extra.path.display().to_string()),
        ("filename", extra.filename()),
    ];
    fields.extend(album_fields(&extra.album_handle().read()));
    fields
}

/// Every field of an item, in display order.
pub(crate) fn entity_fields(entity: &Entity) -> FieldList {
    match entity {
        Entity::Track(track) => track_fields(track),
        Entity::Album(album) => {
            let mut fields = album_fields(&album.info());
            fields.push(("tracks", album.tracks.len().to_string()));
            fields.push(("extras", album.extras.len().to_string()));
            fields
        }
        Entity::Extra(extra) => extra_fields(extra),
    }
}

/// Print all fields of every item matching `text`.
pub fn cmd_info(rt: &Runtime, config: Config, text: &str, kind: EntityKind) -> anyhow::Result<()> {
    rt.block_on(async {
        let (_library, mut session) = open_session(config).await?;

        for (i, entity) in find(&mut session, text, kind).await?.iter().enumerate() {
            if i > 0 {
                println!();
            }
            for (name, value) in entity_fields(entity) {
                println!("{:>14}: {}", name, value);
            }
        }

        session.commit().await?;
        anyhow::Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::fields;
    use crate::test_utils::sample_album;

    fn names(list: &FieldList) -> Vec<&'static str> {
        list.iter().map(|(name, _)| *name).collect()
    }

    #[test]
    fn test_track_info_covers_every_queryable_field() {
        let album = sample_album("A", "One", 2000, 1);
        let shown = names(&entity_fields(&Entity::Track(album.tracks[0].clone())));
        for name in fields::field_names(EntityKind::Track) {
            assert!(shown.contains(&name), "missing {name}");
        }
        assert!(shown.contains(&"format"));
    }

    #[test]
    fn test_extra_info() {
        let album = sample_album("A", "One", 2000, 0);
        let extra = Extra::new(&album, "/music/A/One/cover.jpg");
        let shown = entity_fields(&Entity::Extra(extra));
        assert!(shown.contains(&("filename", "cover.jpg".to_string())));
        assert!(shown.contains(&("year", "2000".to_string())));
    }

    #[test]
    fn test_album_info_counts_members() {
        let album = sample_album("A", "One", 2000, 3);
        let shown = entity_fields(&Entity::Album(album));
        assert!(shown.contains(&("tracks", "3".to_string())));
        assert!(shown.contains(&("label", String::new())));
    }
}
