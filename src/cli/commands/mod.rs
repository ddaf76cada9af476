//! CLI command definitions and dispatch.
//!
//! This module provides the command-line interface for tunekeeper.
//! Each subcommand is implemented in its own submodule for maintainability:
//! - `add`: Read albums from disk and add them to the library
//! - `list`: List items matching a query
//! - `info`: Show every field of matching items
//! - `edit`: Change fields of matching items
//! - `remove`: Remove matching items from the library
//!
//! Every command runs in one library session. The session is committed when
//! the command succeeds and rolled back on any error.

mod add;
mod edit;
mod info;
mod list;
mod remove;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tokio::runtime::Runtime;

pub use add::cmd_add;
pub use edit::cmd_edit;
pub use info::cmd_info;
pub use list::cmd_list;
pub use remove::cmd_remove;

use crate::config::{self, Config};
use crate::db::Session;
use crate::model::{Entity, EntityKind};
use crate::query;

/// tunekeeper CLI
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file to use instead of the default location
    #[arg(short, long, global = true, env = "TUNEKEEPER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Which kind of item a query selects (tracks by default)
#[derive(Args, Debug, Clone, Copy, Default)]
pub struct KindArgs {
    /// Operate on albums
    #[arg(short, long, conflicts_with = "extra")]
    pub album: bool,

    /// Operate on extras (non-audio files)
    #[arg(short, long)]
    pub extra: bool,
}

impl KindArgs {
    pub fn kind(&self) -> EntityKind {
        if self.album {
            EntityKind::Album
        } else if self.extra {
            EntityKind::Extra
        } else {
            EntityKind::Track
        }
    }
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Add album directories or single audio files to the library
    Add {
        /// Files or directories to add (default: the configured library_dir)
        paths: Vec<PathBuf>,
    },
    /// List items matching a query
    #[command(alias = "list")]
    Ls {
        /// Query terms, e.g. `artist:wu% 'year::199\d'`
        #[arg(required = true)]
        query: Vec<String>,
        #[command(flatten)]
        kind: KindArgs,
        /// Print paths only
        #[arg(short, long)]
        path: bool,
    },
    /// Show every field of items matching a query
    Info {
        /// Query terms
        #[arg(required = true)]
        query: Vec<String>,
        #[command(flatten)]
        kind: KindArgs,
    },
    /// Edit fields of items matching a query
    Edit {
        /// Query terms selecting the items to edit
        #[arg(required = true)]
        query: Vec<String>,
        /// Assignments such as `year=1993` or `genre=rock; pop`
        #[arg(short = 's', long = "set", value_name = "FIELD=VALUE", required = true)]
        edits: Vec<String>,
        #[command(flatten)]
        kind: KindArgs,
    },
    /// Remove items matching a query from the library (files are kept)
    #[command(alias = "remove")]
    Rm {
        /// Query terms
        #[arg(required = true)]
        query: Vec<String>,
        #[command(flatten)]
        kind: KindArgs,
    },
}

/// Run the specified CLI command.
pub fn run_command(cli: &Cli) -> anyhow::Result<()> {
    let config = config::load(cli.config.as_deref())?;
    let rt = Runtime::new()?;

    match &cli.command {
        Commands::Add { paths } => cmd_add(&rt, config, paths),
        Commands::Ls { query, kind, path } => cmd_list(&rt, config, &query_text(query)?, kind.kind(), *path),
        Commands::Info { query, kind } => cmd_info(&rt, config, &query_text(query)?, kind.kind()),
        Commands::Edit { query, edits, kind } => cmd_edit(&rt, config, &query_text(query)?, edits, kind.kind()),
        Commands::Rm { query, kind } => cmd_remove(&rt, config, &query_text(query)?, kind.kind()),
    }
}

// ============================================================================
// Shared helper functions
// ============================================================================

/// Rebuild one query string from command-line words.
///
/// Every command treats each word as exactly one term. Words are re-quoted
/// so a term the shell already grouped (`'album:Vol 1: Wow'`) stays one
/// term, and `"artist:a title:b"` is a single artist term.
pub(crate) fn query_text(words: &[String]) -> anyhow::Result<String> {
    Ok(shlex::try_join(words.iter().map(String::as_str))?)
}

/// Run a query, failing when nothing matches.
pub(crate) async fn find(
    session: &mut Session,
    text: &str,
    kind: EntityKind,
) -> anyhow::Result<Vec<Entity>> {
    let found = query::execute(session, text, kind).await?;
    if found.is_empty() {
        anyhow::bail!("No {}s matching: {}", kind, text);
    }
    Ok(found)
}

/// Open the configured library and start the command's session.
pub(crate) async fn open_session(config: Config) -> anyhow::Result<(crate::library::Library, Session)> {
    let library = crate::library::Library::open(config).await?;
    let session = library.session().await?;
    Ok((library, session))
}
