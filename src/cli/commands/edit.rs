//! Editing fields of library items.

use tokio::runtime::Runtime;

use super::{find, open_session};
use crate::config::Config;
use crate::db;
use crate::library::FieldEdit;
use crate::model::{Entity, EntityKind};

/// Apply `field=value` edits to every item matching `text`.
///
/// Edits are validated before the library is opened. A bad value for any
/// item, or a save that would break uniqueness, aborts the whole command.
pub fn cmd_edit(
    rt: &Runtime,
    config: Config,
    text: &str,
    edits: &[String],
    kind: EntityKind,
) -> anyhow::Result<()> {
    let edits = edits
        .iter()
        .map(|e| FieldEdit::parse(e))
        .collect::<Result<Vec<_>, _>>()?;

    rt.block_on(async {
        let (_library, mut session) = open_session(config).await?;

        let found = find(&mut session, text, kind).await?;
        let count = found.len();
        for entity in found {
            match entity {
                Entity::Track(mut track) => {
                    for edit in &edits {
                        edit.apply_to_track(&mut track)?;
                    }
                    db::save_track(&mut session, &mut track).await?;
                    println!("Modified: {}", track);
                }
                Entity::Album(mut album) => {
                    for edit in &edits {
                        edit.apply_to_album(&album)?;
                    }
                    db::save_album(&mut session, &mut album).await?;
                    println!("Modified: {}", album);
                }
                Entity::Extra(mut extra) => {
                    for edit in &edits {
                        edit.apply_to_extra(&mut extra)?;
                    }
                    db::save_extra(&mut session, &mut extra).await?;
                    println!("Modified: {}", extra);
                }
            }
        }

        session.commit().await?;
        println!("\nCompleted: {} {}s modified", count, kind);
        anyhow::Ok(())
    })
}
