//! Adding albums from disk.

use std::path::PathBuf;
use tokio::runtime::Runtime;

use super::open_session;
use crate::config::Config;
use crate::library;

/// Add files or album directories; with no paths, the configured
/// `library_dir` is added.
pub fn cmd_add(rt: &Runtime, config: Config, paths: &[PathBuf]) -> anyhow::Result<()> {
    let paths: Vec<PathBuf> = match (paths.is_empty(), &config.library.library_dir) {
        (false, _) => paths.to_vec(),
        (true, Some(dir)) => vec![dir.clone()],
        (true, None) => anyhow::bail!("No paths given and no library_dir configured"),
    };

    rt.block_on(async {
        let (library, mut session) = open_session(config).await?;
        let import = library.config().import.clone();

        let mut album_count = 0;
        let mut track_count = 0;
        for path in &paths {
            let path = std::path::absolute(path)?;
            for album in library::add_path(&mut session, &path, &import).await? {
                println!("Added: {} ({} tracks)", album, album.tracks.len());
                album_count += 1;
                track_count += album.tracks.len();
            }
        }

        session.commit().await?;
        println!("\nCompleted: {} albums, {} tracks", album_count, track_count);
        anyhow::Ok(())
    })
}
