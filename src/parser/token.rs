//! Script tokens
//!
//! Every token keeps the exact source text it was sliced from, so that
//! concatenating the token texts of a script reproduces the script byte for
//! byte. Tokens produced by rewrite actions carry no location.

use std::fmt;

use sqlparser::tokenizer::{Token as SqlToken, TokenWithSpan, Whitespace};

use super::tsql_dialect::is_reserved_keyword;

/// Lexical class of a [`Token`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Reserved T-SQL keyword (`CREATE`, `PROC`, `TABLE`, ...)
    Keyword,
    /// Bare identifier, including non-reserved words such as `RETURNS`
    Identifier,
    /// `[bracketed]` or `"double-quoted"` identifier
    QuotedIdentifier,
    /// `@local` or `@@global` variable
    Variable,
    StringLiteral,
    NumberLiteral,
    LeftParen,
    RightParen,
    Dot,
    Comma,
    Semicolon,
    /// Any other operator or punctuation
    Symbol,
    /// `GO` as the first word on its line
    BatchSeparator,
    /// `-- comment`, including its line terminator
    SingleLineComment,
    /// `/* comment */`
    MultiLineComment,
    /// Spaces, tabs and line breaks
    Whitespace,
    /// Empty terminal token
    EndOfFile,
}

/// Position of a token in its source script (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Location {
    pub line: u64,
    pub column: u64,
}

impl From<sqlparser::tokenizer::Location> for Location {
    fn from(location: sqlparser::tokenizer::Location) -> Self {
        Self {
            line: location.line,
            column: location.column,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A single lexical token of a T-SQL script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Exact source text, quotes and comment delimiters included
    pub text: String,
    /// `None` for tokens synthesized by a rewrite action
    pub location: Option<Location>,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, location: Option<Location>) -> Self {
        Self {
            kind,
            text: text.into(),
            location,
        }
    }

    /// Create a token that does not originate from the source script.
    pub fn synthetic(kind: TokenKind, text: impl Into<String>) -> Self {
        Self::new(kind, text, None)
    }

    pub fn end_of_file(location: Option<Location>) -> Self {
        Self::new(TokenKind::EndOfFile, "", location)
    }

    pub fn is_synthetic(&self) -> bool {
        self.location.is_none()
    }

    /// Whitespace in the strict sense. Comments are *not* whitespace.
    pub fn is_whitespace(&self) -> bool {
        self.kind == TokenKind::Whitespace
    }

    pub fn is_comment(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::SingleLineComment | TokenKind::MultiLineComment
        )
    }

    /// True for plain and quoted identifiers.
    pub fn is_identifier(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Identifier | TokenKind::QuotedIdentifier
        )
    }

    /// True if this is the reserved keyword `keyword` (case-insensitive).
    pub fn is_keyword(&self, keyword: &str) -> bool {
        self.kind == TokenKind::Keyword && self.text.eq_ignore_ascii_case(keyword)
    }

    /// True if this is a bare word (keyword or unquoted identifier) matching
    /// `word` case-insensitively.
    pub fn is_word_ci(&self, word: &str) -> bool {
        matches!(self.kind, TokenKind::Keyword | TokenKind::Identifier)
            && self.text.eq_ignore_ascii_case(word)
    }

    pub fn is_kind(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Concatenate token texts back into SQL.
pub fn tokens_to_sql<'a>(tokens: impl IntoIterator<Item = &'a Token>) -> String {
    tokens.into_iter().map(|t| t.text.as_str()).collect()
}

/// Classify a sqlparser token into a [`TokenKind`].
pub(crate) fn classify(token: &SqlToken) -> TokenKind {
    match token {
        SqlToken::Word(word) => match word.quote_style {
            Some(_) => TokenKind::QuotedIdentifier,
            None if word.value.starts_with('@') => TokenKind::Variable,
            None if is_reserved_keyword(&word.value) => TokenKind::Keyword,
            None => TokenKind::Identifier,
        },
        SqlToken::SingleQuotedString(_)
        | SqlToken::DoubleQuotedString(_)
        | SqlToken::NationalStringLiteral(_)
        | SqlToken::HexStringLiteral(_) => TokenKind::StringLiteral,
        SqlToken::Number(..) => TokenKind::NumberLiteral,
        SqlToken::LParen => TokenKind::LeftParen,
        SqlToken::RParen => TokenKind::RightParen,
        SqlToken::Period => TokenKind::Dot,
        SqlToken::Comma => TokenKind::Comma,
        SqlToken::SemiColon => TokenKind::Semicolon,
        SqlToken::Whitespace(Whitespace::SingleLineComment { .. }) => {
            TokenKind::SingleLineComment
        }
        SqlToken::Whitespace(Whitespace::MultiLineComment(_)) => TokenKind::MultiLineComment,
        SqlToken::Whitespace(_) => TokenKind::Whitespace,
        SqlToken::EOF => TokenKind::EndOfFile,
        _ => TokenKind::Symbol,
    }
}

// =============================================================================
// Source slicing
// =============================================================================

/// Maps tokenizer locations (line, char column) back to byte offsets.
struct SourceMap<'a> {
    source: &'a str,
    line_starts: Vec<usize>,
}

impl<'a> SourceMap<'a> {
    fn new(source: &'a str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            source
                .bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| i + 1),
        );
        Self {
            source,
            line_starts,
        }
    }

    fn offset(&self, location: Location) -> usize {
        let line_index = (location.line as usize).saturating_sub(1);
        let Some(&start) = self.line_starts.get(line_index) else {
            return self.source.len();
        };
        let column = (location.column as usize).saturating_sub(1);
        self.source[start..]
            .char_indices()
            .nth(column)
            .map(|(i, _)| start + i)
            .unwrap_or(self.source.len())
    }
}

/// Convert tokenizer output into script tokens sliced from `source`.
///
/// Each token spans from its own start to the start of the next token, so
/// the token texts always tile the source exactly. A trailing
/// [`TokenKind::EndOfFile`] token is appended.
pub(crate) fn tokens_from_source(source: &str, raw: &[TokenWithSpan]) -> Vec<Token> {
    let map = SourceMap::new(source);
    let raw: Vec<&TokenWithSpan> = raw
        .iter()
        .filter(|t| !matches!(t.token, SqlToken::EOF))
        .collect();

    let starts: Vec<usize> = raw
        .iter()
        .map(|t| map.offset(t.span.start.into()))
        .collect();

    let mut tokens = Vec::with_capacity(raw.len() + 1);
    for (i, token) in raw.iter().enumerate() {
        let start = if i == 0 { 0 } else { starts[i] };
        let end = starts.get(i + 1).copied().unwrap_or(source.len());
        let end = end.max(start);
        tokens.push(Token::new(
            classify(&token.token),
            &source[start..end],
            Some(token.span.start.into()),
        ));
    }

    mark_batch_separators(&mut tokens);

    let eof_location = raw.last().map(|t| Location::from(t.span.end));
    tokens.push(Token::end_of_file(eof_location));
    tokens
}

/// Reclassify `GO` as [`TokenKind::BatchSeparator`] where it is the first
/// token on its line, ignoring whitespace and comments.
fn mark_batch_separators(tokens: &mut [Token]) {
    let mut at_line_start = true;
    for token in tokens.iter_mut() {
        match token.kind {
            TokenKind::Whitespace | TokenKind::SingleLineComment | TokenKind::MultiLineComment => {
                if token.text.contains('\n') {
                    at_line_start = true;
                }
            }
            _ => {
                if at_line_start && token.is_word_ci("GO") {
                    token.kind = TokenKind::BatchSeparator;
                }
                at_line_start = false;
            }
        }
    }
}
