//! Script tokenizing and validation
//!
//! `parse_script` turns T-SQL text into the token stream the rewrite engine
//! walks, together with any syntax errors found. The checks here are
//! structural only: the tokenizer must accept the text, brackets and
//! `BEGIN`/`CASE` blocks must balance, and built-ins must exist at the
//! configured compatibility level. Statements are not parsed.

use std::fmt;

use sqlparser::tokenizer::Tokenizer;
use tracing::debug;

use super::token::{tokens_from_source, Location, Token, TokenKind};
use super::tsql_dialect::ExtendedTsqlDialect;
use crate::config::RewriteOptions;

/// A syntax error with the 1-based position it was found at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub line: u64,
    pub column: u64,
    pub message: String,
}

impl ParseError {
    pub fn new(location: Location, message: impl Into<String>) -> Self {
        Self {
            line: location.line,
            column: location.column,
            message: message.into(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.line, self.column, self.message)
    }
}

/// Tokens of a script plus the syntax errors found in it.
#[derive(Debug, Clone, Default)]
pub struct ParsedScript {
    /// Token stream, terminated by an [`TokenKind::EndOfFile`] token.
    /// Empty when the tokenizer itself failed.
    pub tokens: Vec<Token>,
    pub errors: Vec<ParseError>,
}

impl ParsedScript {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// All tokens except the terminal end-of-file token.
    pub fn tokens_without_eof(&self) -> &[Token] {
        match self.tokens.last() {
            Some(last) if last.kind == TokenKind::EndOfFile => {
                &self.tokens[..self.tokens.len() - 1]
            }
            _ => &self.tokens,
        }
    }
}

/// Tokenize `sql` and collect syntax errors.
pub fn parse_script(sql: &str, options: &RewriteOptions) -> ParsedScript {
    let dialect = ExtendedTsqlDialect::with_compatibility(options.compatibility);

    let raw = match Tokenizer::new(&dialect, sql).tokenize_with_location() {
        Ok(raw) => raw,
        Err(e) => {
            debug!(error = %e.message, "tokenizer rejected script");
            return ParsedScript {
                tokens: Vec::new(),
                errors: vec![ParseError::new(e.location.into(), e.message)],
            };
        }
    };

    let tokens = tokens_from_source(sql, &raw);
    let mut errors = StructureChecker::new(&dialect).check(&tokens);
    errors.sort_by_key(|e| (e.line, e.column));

    ParsedScript { tokens, errors }
}

// =============================================================================
// Structural checks
// =============================================================================

struct StructureChecker<'d> {
    dialect: &'d ExtendedTsqlDialect,
    errors: Vec<ParseError>,
    open_parens: Vec<Location>,
    /// Open `BEGIN` / `CASE` blocks with the keyword text that opened them
    open_blocks: Vec<(Location, String)>,
}

impl<'d> StructureChecker<'d> {
    fn new(dialect: &'d ExtendedTsqlDialect) -> Self {
        Self {
            dialect,
            errors: Vec::new(),
            open_parens: Vec::new(),
            open_blocks: Vec::new(),
        }
    }

    fn check(mut self, tokens: &[Token]) -> Vec<ParseError> {
        let significant: Vec<&Token> = tokens
            .iter()
            .take_while(|t| t.kind != TokenKind::EndOfFile)
            .filter(|t| !t.is_whitespace() && !t.is_comment())
            .collect();

        for (i, token) in significant.iter().enumerate() {
            let location = token.location.unwrap_or(Location { line: 1, column: 1 });
            let next = significant.get(i + 1).copied();

            match token.kind {
                TokenKind::LeftParen => self.open_parens.push(location),
                TokenKind::RightParen => {
                    if self.open_parens.pop().is_none() {
                        self.incorrect_syntax_near(location, &token.text);
                    }
                }
                TokenKind::Keyword if token.is_keyword("BEGIN") => {
                    if !next.is_some_and(begins_statement_not_block) {
                        self.open_blocks.push((location, token.text.clone()));
                    }
                }
                TokenKind::Keyword if token.is_keyword("CASE") => {
                    self.open_blocks.push((location, token.text.clone()));
                }
                TokenKind::Keyword if token.is_keyword("END") => {
                    let ends_conversation = next.is_some_and(|t| t.is_word_ci("CONVERSATION"));
                    if !ends_conversation && self.open_blocks.pop().is_none() {
                        self.incorrect_syntax_near(location, &token.text);
                    }
                }
                TokenKind::BatchSeparator => self.close_batch(),
                TokenKind::Identifier if self.dialect.is_unsupported_builtin(&token.text) => {
                    if next.is_some_and(|t| t.kind == TokenKind::LeftParen) {
                        self.errors.push(ParseError::new(
                            location,
                            format!(
                                "'{}' is not a recognized built-in function name.",
                                token.text
                            ),
                        ));
                    }
                }
                _ => {}
            }
        }

        self.close_batch();
        self.errors
    }

    /// Report every construct still open at a batch boundary.
    fn close_batch(&mut self) {
        for location in std::mem::take(&mut self.open_parens) {
            self.incorrect_syntax_near(location, "(");
        }
        for (location, keyword) in std::mem::take(&mut self.open_blocks) {
            self.errors.push(ParseError::new(
                location,
                format!("Incorrect syntax near '{keyword}'. Expecting END."),
            ));
        }
    }

    fn incorrect_syntax_near(&mut self, location: Location, text: &str) {
        self.errors.push(ParseError::new(
            location,
            format!("Incorrect syntax near '{text}'."),
        ));
    }
}

/// `BEGIN TRAN`, `BEGIN DISTRIBUTED TRANSACTION`, `BEGIN DIALOG` and
/// `BEGIN CONVERSATION TIMER` are statements, not blocks closed by `END`.
fn begins_statement_not_block(next: &Token) -> bool {
    ["TRAN", "TRANSACTION", "DISTRIBUTED", "DIALOG", "CONVERSATION"]
        .iter()
        .any(|word| next.is_word_ci(word))
}
