//! Library query engine.
//!
//! Turns free-text queries such as `artist:wu-tang 'album:Vol 1: Wow'` into
//! SQL filters over tracks, albums or extras.
//!
//! # Pipeline
//!
//! 1. [`term::tokenize`] splits the query with shell-word rules
//! 2. [`term::parse_term`] parses each word into a [`Term`]
//! 3. [`Predicate::compile`] resolves the field for the entity kind and
//!    validates the pattern
//! 4. [`execute`] ANDs all predicates and loads the matching entities
//!
//! A query that fails at any step returns no results. The failure is
//! logged at `warn` level and never reaches the caller.
//!
//! # Example
//!
//! ```ignore
//! let mut session = library.session().await?;
//! let tracks = query::tracks(&mut session, "albumartist:kanye 'year::200[45]'").await?;
//! ```

pub mod fields;
pub mod predicate;
pub mod term;

pub use predicate::{Pattern, Predicate};
pub use term::{Separator, Term};

use sqlx::{QueryBuilder, Sqlite};
use tracing::{debug, warn};

use crate::db::{self, Session};
use crate::error::Result;
use crate::model::{Album, Entity, EntityKind, Extra, Track};

/// Why a query could not be compiled.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("Unbalanced quotes in query: {query}")]
    Tokenize { query: String },

    #[error("Unquoted '#' at the start of a word in query: {query}")]
    Comment { query: String },

    #[error("Empty query")]
    Empty,

    #[error("Invalid query term '{term}': expected <field>:<value> or <field>::<value>")]
    Malformed { term: String },

    #[error("Unknown {kind} field '{field}'")]
    UnknownField { field: String, kind: EntityKind },

    #[error("Invalid regular expression '{pattern}': {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Dangling escape character at end of '{value}'")]
    DanglingEscape { value: String },
}

/// A compiled query: every predicate must hold.
#[derive(Debug, Clone)]
pub struct Query {
    kind: EntityKind,
    predicates: Vec<Predicate>,
}

impl Query {
    /// Tokenize, parse and compile `text` for `kind`.
    ///
    /// Fails on the first bad term; no term is ever silently dropped.
    pub fn parse(text: &str, kind: EntityKind) -> std::result::Result<Self, QueryError> {
        let predicates = term::tokenize(text)?
            .iter()
            .map(|token| {
                let term = term::parse_term(token)?;
                Predicate::compile(&term, kind)
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self { kind, predicates })
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// SQL selecting the ids of matching entities, in display order.
    pub fn select_ids(&self) -> QueryBuilder<'static, Sqlite> {
        let (base, order) = match self.kind {
            EntityKind::Track => (
                "SELECT t.id FROM tracks t JOIN albums a ON t.album_id = a.id",
                " ORDER BY a.artist, a.title, t.disc, t.track_num, t.id",
            ),
            EntityKind::Album => (
                "SELECT DISTINCT a.id, a.artist, a.title FROM albums a \
                 LEFT JOIN tracks t ON t.album_id = a.id",
                " ORDER BY a.artist, a.title, a.id",
            ),
            EntityKind::Extra => (
                "SELECT e.id FROM extras e JOIN albums a ON e.album_id = a.id",
                " ORDER BY a.artist, a.title, e.filename, e.id",
            ),
        };

        let mut qb = QueryBuilder::new(base);
        for (i, predicate) in self.predicates.iter().enumerate() {
            qb.push(if i == 0 { " WHERE " } else { " AND " });
            predicate.push_sql(&mut qb);
        }
        qb.push(order);
        qb
    }

    /// Run the query and return the ids of matching rows.
    pub async fn fetch_ids(&self, session: &mut Session) -> Result<Vec<i64>> {
        let ids = self
            .select_ids()
            .build_query_scalar::<i64>()
            .fetch_all(session.conn())
            .await?;
        debug!(target: "query", kind = %self.kind, matches = ids.len(), "Query executed");
        Ok(ids)
    }
}

/// Compile `text`, logging and discarding a [`QueryError`].
fn compile_or_log(text: &str, kind: EntityKind) -> Option<Query> {
    match Query::parse(text, kind) {
        Ok(query) => Some(query),
        Err(error) => {
            warn!(target: "query", query = text, %kind, %error, "Invalid query, returning no results");
            None
        }
    }
}

/// Execute a query for any entity kind.
///
/// Returns an empty list both for a bad query and for a query that matches
/// nothing. Only store errors are returned as `Err`.
pub async fn execute(session: &mut Session, text: &str, kind: EntityKind) -> Result<Vec<Entity>> {
    Ok(match kind {
        EntityKind::Track => tracks(session, text)
            .await?
            .into_iter()
            .map(Entity::Track)
            .collect(),
        EntityKind::Album => albums(session, text)
            .await?
            .into_iter()
            .map(Entity::Album)
            .collect(),
        EntityKind::Extra => extras(session, text)
            .await?
            .into_iter()
            .map(Entity::Extra)
            .collect(),
    })
}

/// Tracks matching `text`. Tracks of the same album share one album handle.
pub async fn tracks(session: &mut Session, text: &str) -> Result<Vec<Track>> {
    let Some(query) = compile_or_log(text, EntityKind::Track) else {
        return Ok(Vec::new());
    };
    let ids = query.fetch_ids(session).await?;
    db::load_tracks(session, &ids).await
}

/// Albums owning at least one row that matches `text`, with their tracks
/// and extras loaded.
pub async fn albums(session: &mut Session, text: &str) -> Result<Vec<Album>> {
    let Some(query) = compile_or_log(text, EntityKind::Album) else {
        return Ok(Vec::new());
    };
    let ids = query.fetch_ids(session).await?;
    db::load_albums(session, &ids).await
}

/// Extras matching `text`.
pub async fn extras(session: &mut Session, text: &str) -> Result<Vec<Extra>> {
    let Some(query) = compile_or_log(text, EntityKind::Extra) else {
        return Ok(Vec::new());
    };
    let ids = query.fetch_ids(session).await?;
    db::load_extras(session, &ids).await
}
