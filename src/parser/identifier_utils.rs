//! Identifier quoting utilities for T-SQL rewriting.
//!
//! Rename actions work on unquoted names and then put back whatever quoting
//! the original token used, so `[Orders]` renamed with a prefix becomes
//! `[pfx_Orders]` while a bare `Orders` stays bare.
//!
//! # Examples
//!
//! ```ignore
//! use crate::parser::identifier_utils::*;
//!
//! assert_eq!(unquote_identifier("[MyTable]"), "MyTable");
//! assert_eq!(quote_identifier("MyTable", Some(QuoteStyle::Bracket)), "[MyTable]");
//! assert_eq!(sql_string_literal("it's"), "'it''s'");
//! ```

use std::borrow::Cow;

use super::token::{Token, TokenKind};

/// Delimiter style of a quoted identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuoteStyle {
    /// `[name]`
    Bracket,
    /// `"name"`
    DoubleQuote,
}

impl QuoteStyle {
    fn delimiters(self) -> (char, char) {
        match self {
            QuoteStyle::Bracket => ('[', ']'),
            QuoteStyle::DoubleQuote => ('"', '"'),
        }
    }
}

/// Detect the quote style of identifier text.
///
/// Returns `None` for bare identifiers and for text too short to carry both
/// delimiters.
pub fn quote_style(text: &str) -> Option<QuoteStyle> {
    if text.len() < 2 {
        return None;
    }
    if text.starts_with('[') && text.ends_with(']') {
        Some(QuoteStyle::Bracket)
    } else if text.starts_with('"') && text.ends_with('"') {
        Some(QuoteStyle::DoubleQuote)
    } else {
        None
    }
}

/// Strips one level of `[]` or `""` delimiters from an identifier and
/// undoubles the escaped closing delimiter (`[a]]b]` is `a]b`).
///
/// # Examples
///
/// ```ignore
/// assert_eq!(unquote_identifier("[MyTable]"), "MyTable");
/// assert_eq!(unquote_identifier("\"MyColumn\""), "MyColumn");
/// assert_eq!(unquote_identifier("dbo"), "dbo");
/// ```
pub fn unquote_identifier(text: &str) -> Cow<'_, str> {
    let Some(style) = quote_style(text) else {
        return Cow::Borrowed(text);
    };
    let inner = &text[1..text.len() - 1];
    let (_, close) = style.delimiters();
    let doubled: String = [close, close].iter().collect();
    if inner.contains(&doubled) {
        Cow::Owned(inner.replace(&doubled, &close.to_string()))
    } else {
        Cow::Borrowed(inner)
    }
}

/// Wraps `name` in the given delimiters, doubling any closing delimiter
/// inside it, or returns it bare.
pub fn quote_identifier(name: &str, style: Option<QuoteStyle>) -> String {
    match style {
        Some(style) => {
            let (open, close) = style.delimiters();
            let escaped = name.replace(close, &format!("{close}{close}"));
            format!("{open}{escaped}{close}")
        }
        None => name.to_string(),
    }
}

/// Build an identifier token for `name`, quoted the way `original` was.
///
/// A synthetic or otherwise unquoted `original` yields a bare identifier.
pub fn quote_if_needed(name: &str, original: &Token) -> Token {
    let style = if original.kind == TokenKind::QuotedIdentifier {
        quote_style(&original.text)
    } else {
        None
    };
    identifier_token(name, style)
}

/// Synthetic identifier token with the given quoting.
pub fn identifier_token(name: &str, style: Option<QuoteStyle>) -> Token {
    let kind = if style.is_some() {
        TokenKind::QuotedIdentifier
    } else {
        TokenKind::Identifier
    };
    Token::synthetic(kind, quote_identifier(name, style))
}

/// Format `text` as a single-quoted T-SQL string literal, doubling any
/// embedded single quotes.
pub fn sql_string_literal(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

/// Returns true if `token` is present and is a plain or quoted identifier.
pub fn is_identifier(token: Option<&Token>) -> bool {
    token.is_some_and(Token::is_identifier)
}
