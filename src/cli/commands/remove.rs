//! Removing items from the library.

use tokio::runtime::Runtime;

use super::{find, open_session};
use crate::config::Config;
use crate::db;
use crate::model::{Entity, EntityKind};

/// Remove every item matching `text`. Files on disk are left alone.
pub fn cmd_remove(rt: &Runtime, config: Config, text: &str, kind: EntityKind) -> anyhow::Result<()> {
    rt.block_on(async {
        let (_library, mut session) = open_session(config).await?;

        let found = find(&mut session, text, kind).await?;
        let count = found.len();
        for entity in &found {
            match entity {
                Entity::Track(track) => db::remove_track(&mut session, track).await?,
                Entity::Album(album) => db::remove_album(&mut session, album).await?,
                Entity::Extra(extra) => db::remove_extra(&mut session, extra).await?,
            }
            println!("Removed: {}", entity);
        }

        session.commit().await?;
        println!("\nCompleted: {} {}s removed", count, kind);
        anyhow::Ok(())
    })
}
