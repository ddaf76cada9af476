//! Compile parsed terms into SQL predicates.
//!
//! `:` terms become `LIKE ? ESCAPE '/'` (case-insensitive, `%` any run,
//! `_` one character). `::` terms become `REGEXP ?` with a case-insensitive
//! pattern; the pattern is compiled here first so a bad regex fails the
//! query before it reaches the store.

use regex::RegexBuilder;
use sqlx::{QueryBuilder, Sqlite};

use super::QueryError;
use super::fields::{self, Column, Field, ValueKind};
use super::term::{Separator, Term};
use crate::model::EntityKind;

/// Escape marker for `%`, `_` and itself in `:` values.
pub const ESCAPE_CHAR: char = '/';

/// Comparison applied to the attribute's text form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    /// SQL LIKE pattern, passed through verbatim
    Like(String),
    /// Regex source with the case-insensitive flag prepended
    Regex(String),
}

/// A compiled boolean condition over one attribute.
#[derive(Debug, Clone)]
pub struct Predicate {
    field: &'static Field,
    pattern: Pattern,
}

impl Predicate {
    /// Compile `term` against the schema of `kind`.
    pub fn compile(term: &Term, kind: EntityKind) -> Result<Self, QueryError> {
        let field =
            fields::lookup(kind, &term.field).ok_or_else(|| QueryError::UnknownField {
                field: term.field.clone(),
                kind,
            })?;

        let pattern = match term.separator {
            Separator::Like => {
                check_escapes(&term.value)?;
                Pattern::Like(term.value.clone())
            }
            Separator::Regex => {
                RegexBuilder::new(&term.value)
                    .case_insensitive(true)
                    .build()
                    .map_err(|source| QueryError::InvalidRegex {
                        pattern: term.value.clone(),
                        source,
                    })?;
                Pattern::Regex(format!("(?i){}", term.value))
            }
        };

        Ok(Self { field, pattern })
    }

    /// Append this predicate as a boolean SQL expression.
    pub fn push_sql(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        match self.field.column {
            Column::Scalar(column) => {
                let expr = text_expr(column, self.field.kind);
                match &self.pattern {
                    Pattern::Like(value) => {
                        qb.push(format!("{expr} LIKE "));
                        qb.push_bind(value.clone());
                        qb.push(format!(" ESCAPE '{ESCAPE_CHAR}'"));
                    }
                    Pattern::Regex(value) => {
                        qb.push(format!("({column} IS NOT NULL AND {expr} REGEXP "));
                        qb.push_bind(value.clone());
                        qb.push(")");
                    }
                }
            }
            Column::Genres => {
                qb.push("EXISTS (SELECT 1 FROM track_genres tg WHERE tg.track_id = t.id AND tg.genre ");
                match &self.pattern {
                    Pattern::Like(value) => {
                        qb.push("LIKE ");
                        qb.push_bind(value.clone());
                        qb.push(format!(" ESCAPE '{ESCAPE_CHAR}')"));
                    }
                    Pattern::Regex(value) => {
                        qb.push("REGEXP ");
                        qb.push_bind(value.clone());
                        qb.push(")");
                    }
                }
            }
        }
    }
}

/// Canonical text form of a column for matching.
fn text_expr(column: &str, kind: ValueKind) -> String {
    match kind {
        ValueKind::Text | ValueKind::Date => column.to_string(),
        ValueKind::Integer => format!("CAST({column} AS TEXT)"),
    }
}

/// Reject a value whose last character is an unpaired escape marker.
fn check_escapes(value: &str) -> Result<(), QueryError> {
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c == ESCAPE_CHAR && chars.next().is_none() {
            return Err(QueryError::DanglingEscape {
                value: value.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::term::parse_term;

    fn compile(term: &str, kind: EntityKind) -> Result<Predicate, QueryError> {
        Predicate::compile(&parse_term(term).unwrap(), kind)
    }

    fn sql_of(predicate: &Predicate) -> String {
        let mut qb = QueryBuilder::<Sqlite>::new("");
        predicate.push_sql(&mut qb);
        qb.sql().to_string()
    }

    #[test]
    fn test_like_predicate_sql() {
        let predicate = compile("title:abc%", EntityKind::Track).unwrap();
        assert_eq!(&predicate.pattern, &Pattern::Like("abc%".to_string()));
        assert_eq!(sql_of(&predicate), "t.title LIKE ? ESCAPE '/'");
    }

    #[test]
    fn test_integer_field_is_cast_to_text() {
        let predicate = compile("track_num:_", EntityKind::Track).unwrap();
        assert_eq!(sql_of(&predicate), "CAST(t.track_num AS TEXT) LIKE ? ESCAPE '/'");
    }

    #[test]
    fn test_regex_predicate_sql() {
        let predicate = compile(r"year::19[789]\d", EntityKind::Album).unwrap();
        assert_eq!(
            &predicate.pattern,
            &Pattern::Regex(r"(?i)19[789]\d".to_string())
        );
        assert_eq!(
            sql_of(&predicate),
            "(a.year IS NOT NULL AND CAST(a.year AS TEXT) REGEXP ?)"
        );
    }

    #[test]
    fn test_genre_predicate_uses_any_member() {
        let predicate = compile("genre:rock", EntityKind::Track).unwrap();
        let sql = sql_of(&predicate);
        assert!(sql.starts_with("EXISTS (SELECT 1 FROM track_genres"));
        assert!(sql.contains("tg.genre LIKE ?"));
    }

    #[test]
    fn test_unknown_field_fails() {
        let err = compile("bpm:120", EntityKind::Track).unwrap_err();
        assert!(matches!(err, QueryError::UnknownField { ref field, .. } if field == "bpm"));
        assert!(compile("title:x", EntityKind::Extra).is_err());
    }

    #[test]
    fn test_invalid_regex_fails_at_compile_time() {
        let err = compile("title::[", EntityKind::Track).unwrap_err();
        assert!(matches!(err, QueryError::InvalidRegex { .. }));
    }

    #[test]
    fn test_escapes() {
        assert!(compile("title:100/%", EntityKind::Track).is_ok());
        assert!(compile("title://", EntityKind::Track).is_ok());
        let err = compile("title:abc/", EntityKind::Track).unwrap_err();
        assert!(matches!(err, QueryError::DanglingEscape { .. }));
    }
}
