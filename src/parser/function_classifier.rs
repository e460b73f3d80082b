//! Function signature classification
//!
//! Looks ahead from the parameter list of a `CREATE FUNCTION` /
//! `ALTER FUNCTION` header to decide which kind of function it declares:
//!
//! - Scalar functions (`RETURNS <type>`)
//! - Inline table-valued functions (`RETURNS TABLE`)
//! - Multi-statement table-valued functions (`RETURNS @var TABLE`)

use crate::rewriter::TokenCursor;

use super::token::TokenKind;

/// Function type detected from a signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionType {
    Scalar,
    InlineTableValued,
    MultiStatementTableValued,
    /// The tokens do not form a recognizable signature
    Invalid,
}

impl FunctionType {
    pub fn is_valid(self) -> bool {
        self != FunctionType::Invalid
    }
}

/// Classify the function whose parameter list opens at lookahead offset
/// `open_paren_offset`.
///
/// The parameter list is skipped by bracket depth, then the `RETURNS` clause
/// decides the type. Nothing is consumed.
pub fn classify_function(cursor: &TokenCursor<'_>, open_paren_offset: usize) -> FunctionType {
    let is_kind = |offset: usize, kind: TokenKind| cursor.peek(offset).is_some_and(|t| t.kind == kind);

    if !is_kind(open_paren_offset, TokenKind::LeftParen) {
        return FunctionType::Invalid;
    }

    let mut depth = 1usize;
    let mut offset = open_paren_offset;
    loop {
        offset += 1;
        let Some(token) = cursor.peek(offset) else {
            return FunctionType::Invalid;
        };
        match token.kind {
            TokenKind::LeftParen => depth += 1,
            TokenKind::RightParen if depth <= 1 => break,
            TokenKind::RightParen => depth -= 1,
            _ => {}
        }
    }

    let returns = cursor.peek(offset + 1).is_some_and(|t| t.is_word_ci("RETURNS"));
    if !returns {
        return FunctionType::Invalid;
    }

    let return_type = cursor.peek(offset + 2);
    if return_type.is_some_and(|t| t.is_keyword("TABLE")) {
        return FunctionType::InlineTableValued;
    }

    let table_variable = return_type.is_some_and(|t| t.kind == TokenKind::Variable)
        && cursor.peek(offset + 3).is_some_and(|t| t.is_keyword("TABLE"));
    if table_variable {
        return FunctionType::MultiStatementTableValued;
    }

    FunctionType::Scalar
}
