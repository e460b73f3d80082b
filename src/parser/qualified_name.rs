//! Multi-part object names.
//!
//! Recognized forms, with optional whitespace around the dots:
//!
//! - `name`
//! - `schema.name`
//! - `database..name` (the empty schema means `dbo`)
//! - `database.schema.name`
//!
//! Any part may be bracket- or double-quoted.

use std::fmt;

use super::identifier_utils::{quote_identifier, quote_style, unquote_identifier, QuoteStyle};
use super::token::{Token, TokenKind};
use crate::rewriter::TokenCursor;

/// Schema assumed for `database..name` and unqualified procedure calls.
pub const DEFAULT_SCHEMA: &str = "dbo";

/// One part of a qualified name, unquoted, remembering its quoting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamePart {
    pub value: String,
    pub quote: Option<QuoteStyle>,
}

impl NamePart {
    pub fn bare(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            quote: None,
        }
    }

    pub fn from_token(token: &Token) -> Self {
        let quote = if token.kind == TokenKind::QuotedIdentifier {
            quote_style(&token.text)
        } else {
            None
        };
        Self {
            value: unquote_identifier(&token.text).into_owned(),
            quote,
        }
    }

    /// The part as it is written in SQL.
    pub fn to_sql(&self) -> String {
        quote_identifier(&self.value, self.quote)
    }

    /// `new_value` quoted the same way as this part.
    pub fn requote(&self, new_value: &str) -> String {
        quote_identifier(new_value, self.quote)
    }
}

/// A one- to three-part object name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifiedName {
    pub database: Option<NamePart>,
    pub schema: Option<NamePart>,
    pub object: NamePart,
}

impl QualifiedName {
    /// Parse a name starting at lookahead offset `offset` without moving the
    /// cursor.
    ///
    /// Returns the name and the number of lookahead positions it spans, so
    /// that `offset + span` is the offset of the first token after it.
    /// Returns `None` if there is no identifier at `offset` or the dotted
    /// form is malformed.
    pub fn peek(cursor: &TokenCursor<'_>, offset: usize) -> Option<(Self, usize)> {
        let first = identifier_at(cursor, offset)?;

        if !is_dot(cursor, offset + 1) {
            return Some((Self::single(first), 1));
        }

        // database..name
        if is_dot(cursor, offset + 2) {
            let object = identifier_at(cursor, offset + 3)?;
            return Some((
                Self {
                    database: Some(NamePart::from_token(first)),
                    schema: Some(NamePart::bare(DEFAULT_SCHEMA)),
                    object: NamePart::from_token(object),
                },
                4,
            ));
        }

        let second = identifier_at(cursor, offset + 2)?;

        // database.schema.name
        if is_dot(cursor, offset + 3) {
            let object = identifier_at(cursor, offset + 4)?;
            return Some((
                Self {
                    database: Some(NamePart::from_token(first)),
                    schema: Some(NamePart::from_token(second)),
                    object: NamePart::from_token(object),
                },
                5,
            ));
        }

        Some((
            Self {
                database: None,
                schema: Some(NamePart::from_token(first)),
                object: NamePart::from_token(second),
            },
            3,
        ))
    }

    /// Parse the name that follows the current token and consume it.
    ///
    /// On success the cursor is left on the last token of the name. Nothing
    /// is consumed when no name can be parsed.
    pub fn consume(cursor: &mut TokenCursor<'_>) -> Option<Self> {
        let (name, span) = Self::peek(cursor, 1)?;
        for _ in 0..span {
            cursor.consume();
        }
        Some(name)
    }

    fn single(token: &Token) -> Self {
        Self {
            database: None,
            schema: None,
            object: NamePart::from_token(token),
        }
    }

    /// Unquoted schema name, empty when the name is unqualified.
    pub fn schema_name(&self) -> &str {
        self.schema.as_ref().map(|s| s.value.as_str()).unwrap_or("")
    }

    /// Unquoted schema name, `dbo` when the name is unqualified.
    pub fn schema_or_default(&self) -> &str {
        self.schema
            .as_ref()
            .map(|s| s.value.as_str())
            .unwrap_or(DEFAULT_SCHEMA)
    }

    pub fn object_name(&self) -> &str {
        &self.object.value
    }

    pub fn is_single_part(&self) -> bool {
        self.database.is_none() && self.schema.is_none()
    }

    /// The name as written in SQL, each part keeping its quoting.
    pub fn to_sql(&self) -> String {
        [&self.database, &self.schema]
            .into_iter()
            .flatten()
            .chain(std::iter::once(&self.object))
            .map(NamePart::to_sql)
            .collect::<Vec<_>>()
            .join(".")
    }

    /// `schema.name` (or just `name`) as written, without any database part.
    pub fn to_schema_qualified_sql(&self) -> String {
        match &self.schema {
            Some(schema) => format!("{}.{}", schema.to_sql(), self.object.to_sql()),
            None => self.object.to_sql(),
        }
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}

fn identifier_at<'a>(cursor: &TokenCursor<'a>, offset: usize) -> Option<&'a Token> {
    cursor.peek(offset).filter(|t| t.is_identifier())
}

fn is_dot(cursor: &TokenCursor<'_>, offset: usize) -> bool {
    cursor
        .peek(offset)
        .is_some_and(|t| t.kind == TokenKind::Dot)
}
