//! The music library: an opened database plus its settings.
//!
//! All operations take an explicit [`Session`]; nothing here holds global
//! state. A command typically does:
//!
//! ```ignore
//! let library = Library::open(config).await?;
//! let mut session = library.session().await?;
//! library::add_path(&mut session, path, &library.config().import).await?;
//! session.commit().await?;
//! ```

pub mod edit;
pub mod merge;

pub use edit::FieldEdit;
pub use merge::{find_existing, merge, merge_with_threshold};

use std::path::Path;

use sqlx::SqlitePool;
use tracing::info;

use crate::config::{Config, ImportConfig};
use crate::db::{self, Session};
use crate::error::{Error, Result, ResultExt};
use crate::metadata;
use crate::model::Album;

/// An opened library.
#[derive(Debug, Clone)]
pub struct Library {
    pool: SqlitePool,
    config: Config,
}

impl Library {
    /// Open (creating if needed) the database named in `config`.
    pub async fn open(config: Config) -> Result<Self> {
        let db_path = &config.library.db_path;
        if let Some(parent) = db_path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(format!("creating {}", parent.display()))?;
        }

        let pool = db::init_db(&db::db_url(Some(db_path)))
            .await
            .with_context(format!("opening library {}", db_path.display()))?;
        info!("Opened library {}", db_path.display());

        Ok(Self { pool, config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Start a session for one command.
    pub async fn session(&self) -> Result<Session> {
        Session::begin(&self.pool).await
    }
}

/// Add an album, merging it into a stored album it collides with.
///
/// Returns the album as saved. When a stored album has the same path,
/// identity or MusicBrainz id, `album` is merged into it according to
/// `import`; otherwise `album` is inserted as is.
pub async fn add_album(session: &mut Session, album: Album, import: &ImportConfig) -> Result<Album> {
    let mut album = match find_existing(session, &album).await? {
        Some(mut existing) => {
            info!(target: "library::add", "Merging {} into existing album {}", album, existing);
            merge_with_threshold(
                &mut existing,
                album,
                import.overwrite_album_info,
                import.match_threshold,
            );
            existing
        }
        None => {
            info!(target: "library::add", "Adding new album {}", album);
            album
        }
    };

    db::save_album(session, &mut album).await?;
    Ok(album)
}

/// Read `path` and add what it contains.
///
/// A file is added as a one-track album. A directory is searched for
/// album directories, each of which is added on its own; discs stored in
/// sub-directories end up merged into one album by identity.
pub async fn add_path(
    session: &mut Session,
    path: &Path,
    import: &ImportConfig,
) -> Result<Vec<Album>> {
    if !path.is_dir() {
        let album = metadata::read_single(path)?;
        let album = add_album(session, album, import)
            .await
            .with_context(format!("adding {}", path.display()))?;
        return Ok(vec![album]);
    }

    let dirs = metadata::album_dirs(path);
    if dirs.is_empty() {
        return Err(Error::metadata(path, "no audio files found"));
    }

    let mut added = Vec::with_capacity(dirs.len());
    for dir in dirs {
        let album = metadata::read_album(&dir)?;
        added.push(
            add_album(session, album, import)
                .await
                .with_context(format!("adding {}", dir.display()))?,
        );
    }
    Ok(added)
}
