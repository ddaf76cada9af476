//! Query tokenization and term parsing.
//!
//! A query string is split into shell words, and each word is parsed as
//! `<field>:<value>` (LIKE match) or `<field>::<value>` (regex match).

use std::fmt;

use super::QueryError;

/// How a term's value is compared against the stored attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Separator {
    /// `:` - case-insensitive SQL `LIKE`
    Like,
    /// `::` - case-insensitive regular expression
    Regex,
}

impl Separator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Separator::Like => ":",
            Separator::Regex => "::",
        }
    }
}

impl fmt::Display for Separator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One parsed `field:value` unit of a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    /// Field name, lower-cased
    pub field: String,
    pub separator: Separator,
    /// Value exactly as written; escapes are interpreted downstream
    pub value: String,
}

/// Whether an unquoted `#` starts a word, which shell-word splitting would
/// treat as a comment running to the end of the line.
fn has_comment(query: &str) -> bool {
    let mut chars = query.chars();
    let mut word_start = true;
    while let Some(c) = chars.next() {
        match c {
            ' ' | '\t' | '\n' => {
                word_start = true;
                continue;
            }
            '#' if word_start => return true,
            '\\' => {
                chars.next();
            }
            '\'' => {
                for c in chars.by_ref() {
                    if c == '\'' {
                        break;
                    }
                }
            }
            '"' => {
                while let Some(c) = chars.next() {
                    match c {
                        '\\' => {
                            chars.next();
                        }
                        '"' => break,
                        _ => {}
                    }
                }
            }
            _ => {}
        }
        word_start = false;
    }
    false
}

/// Split a query string into terms using shell-word rules.
///
/// Quoting groups whitespace, so `'title:Holy cow'` is one term. A word
/// starting with an unquoted `#` is rejected rather than dropped along with
/// the rest of the query.
pub fn tokenize(query: &str) -> Result<Vec<String>, QueryError> {
    if has_comment(query) {
        return Err(QueryError::Comment {
            query: query.to_string(),
        });
    }
    let tokens = shlex::split(query).ok_or_else(|| QueryError::Tokenize {
        query: query.to_string(),
    })?;
    if tokens.is_empty() {
        return Err(QueryError::Empty);
    }
    Ok(tokens)
}

/// Parse a single term.
///
/// The field runs up to the first `:`. A second `:` directly after it makes
/// the separator `::`. The value must start with a non-whitespace character
/// and may itself contain colons (`album:Vol 1: Wow`).
pub fn parse_term(term: &str) -> Result<Term, QueryError> {
    let malformed = || QueryError::Malformed {
        term: term.to_string(),
    };

    let (field, rest) = term.trim_start().split_once(':').ok_or_else(malformed)?;
    if field.is_empty() || field.chars().any(char::is_whitespace) {
        return Err(malformed());
    }

    let (separator, value) = match rest.strip_prefix(':') {
        Some(value) => (Separator::Regex, value),
        None => (Separator::Like, rest),
    };
    if !value.chars().next().is_some_and(|c| !c.is_whitespace()) {
        return Err(malformed());
    }

    Ok(Term {
        field: field.to_lowercase(),
        separator,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_like_term() {
        let term = parse_term("artist:wu-tang clan").unwrap();
        assert_eq!(
            term,
            Term {
                field: "artist".to_string(),
                separator: Separator::Like,
                value: "wu-tang clan".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_regex_term() {
        let term = parse_term(r"year::19[789]\d").unwrap();
        assert_eq!(term.field, "year");
        assert_eq!(term.separator, Separator::Regex);
        assert_eq!(term.value, r"19[789]\d");
    }

    #[test]
    fn test_field_is_lowercased_value_is_verbatim() {
        let term = parse_term("TiTle:ABC%_/").unwrap();
        assert_eq!(term.field, "title");
        assert_eq!(term.value, "ABC%_/");
    }

    #[test]
    fn test_separator_inside_value() {
        let term = parse_term("album:Vol 1: Wow").unwrap();
        assert_eq!(term.field, "album");
        assert_eq!(term.separator, Separator::Like);
        assert_eq!(term.value, "Vol 1: Wow");
    }

    #[test]
    fn test_reject_missing_separator() {
        let err = parse_term("wu-tang").unwrap_err();
        assert!(matches!(err, QueryError::Malformed { ref term } if term == "wu-tang"));
    }

    #[test]
    fn test_reject_value_starting_with_whitespace() {
        assert!(parse_term("title: abc").is_err());
        assert!(parse_term("title:: abc").is_err());
    }

    #[test]
    fn test_reject_empty_parts() {
        assert!(parse_term(":abc").is_err());
        assert!(parse_term("title:").is_err());
        assert!(parse_term("title::").is_err());
        assert!(parse_term("my title:abc").is_err());
    }

    #[test]
    fn test_tokenize_respects_quotes() {
        let tokens = tokenize("'title:Holy cow' artist:abc \"album:Vol 1: Wow\"").unwrap();
        assert_eq!(tokens, vec!["title:Holy cow", "artist:abc", "album:Vol 1: Wow"]);
    }

    #[test]
    fn test_tokenize_rejects_comment_words() {
        assert!(matches!(
            tokenize("title:abc #bogus:x"),
            Err(QueryError::Comment { .. })
        ));
        assert!(matches!(tokenize("#title:abc"), Err(QueryError::Comment { .. })));

        let tokens = tokenize(r"title:a#b '#x:y' \#z:w").unwrap();
        assert_eq!(tokens, vec!["title:a#b", "#x:y", "#z:w"]);
    }

    #[test]
    fn test_tokenize_empty_and_unbalanced() {
        assert!(matches!(tokenize(""), Err(QueryError::Empty)));
        assert!(matches!(tokenize("   "), Err(QueryError::Empty)));
        assert!(matches!(
            tokenize("'title:unterminated"),
            Err(QueryError::Tokenize { .. })
        ));
    }
}

/// Property-based tests using proptest
#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// Field names: no whitespace and no colon
    fn field_name() -> impl Strategy<Value = String> {
        prop::string::string_regex("[A-Za-z_][A-Za-z0-9_-]{0,15}").unwrap()
    }

    /// Values: first char neither whitespace nor a colon
    fn value() -> impl Strategy<Value = String> {
        prop::string::string_regex("[A-Za-z0-9%_/.-][A-Za-z0-9 %_/:.'-]{0,30}").unwrap()
    }

    proptest! {
        /// `field:value` parses back to the lower-cased field and the exact value
        #[test]
        fn like_term_roundtrip(f in field_name(), v in value()) {
            let term = parse_term(&format!("{}:{}", f, v)).unwrap();
            prop_assert_eq!(term.field, f.to_lowercase());
            prop_assert_eq!(term.separator, Separator::Like);
            prop_assert_eq!(term.value, v);
        }

        /// `field::value` parses to a regex term with the exact value
        #[test]
        fn regex_term_roundtrip(f in field_name(), v in value()) {
            let term = parse_term(&format!("{}::{}", f, v)).unwrap();
            prop_assert_eq!(term.field, f.to_lowercase());
            prop_assert_eq!(term.separator, Separator::Regex);
            prop_assert_eq!(term.value, v);
        }

        /// Terms without any colon never parse
        #[test]
        fn no_separator_rejected(s in "[A-Za-z0-9 _%-]{1,30}") {
            prop_assert!(parse_term(&s).is_err());
        }

        /// A value that starts with whitespace never parses
        #[test]
        fn leading_whitespace_value_rejected(f in field_name(), v in "[ \t][A-Za-z0-9]{0,10}") {
            let term = format!("{}:{}", f, v);
            prop_assert!(parse_term(&term).is_err());
        }
    }
}
