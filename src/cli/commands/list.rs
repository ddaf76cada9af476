//! Listing query results.

use tokio::runtime::Runtime;

use super::{find, open_session};
use crate::config::Config;
use crate::model::EntityKind;

/// Print one line per item matching `text`.
pub fn cmd_list(
    rt: &Runtime,
    config: Config,
    text: &str,
    kind: EntityKind,
    paths_only: bool,
) -> anyhow::Result<()> {
    rt.block_on(async {
        let (_library, mut session) = open_session(config).await?;

        for entity in find(&mut session, text, kind).await? {
            if paths_only {
                println!("{}", entity.path().display());
            } else {
                println!("{}", entity);
            }
        }

        session.commit().await?;
        anyhow::Ok(())
    })
}
