//! Lookahead cursor handed to rewrite actions.
//!
//! The engine owns a `TokenCursor` over the script's tokens and passes it to
//! the action for every token. Actions use it to look ahead past whitespace
//! and to consume tokens they replace; consumed tokens are never offered to
//! the action again.
//!
//! ```ignore
//! // Inside an action, with the cursor on `EXEC`:
//! if is_identifier(cursor.peek(1)) {
//!     let name = cursor.consume();   // now positioned on the name
//! }
//! ```

use crate::parser::Token;

/// Position in a script's token stream with whitespace-skipping lookahead.
///
/// Only [`TokenKind::Whitespace`](crate::parser::TokenKind::Whitespace) is
/// skipped. Comments are significant tokens for lookahead purposes.
#[derive(Debug)]
pub struct TokenCursor<'a> {
    tokens: &'a [Token],
    pos: usize,
    diagnostics: Vec<String>,
}

impl<'a> TokenCursor<'a> {
    /// Create a cursor on the first token.
    ///
    /// `tokens` should not contain the end-of-file token.
    pub fn new(tokens: &'a [Token]) -> Self {
        Self::at(tokens, 0)
    }

    /// Create a cursor positioned on `tokens[pos]`.
    pub fn at(tokens: &'a [Token], pos: usize) -> Self {
        Self {
            tokens,
            pos,
            diagnostics: Vec::new(),
        }
    }

    // ========================================================================
    // Position and state
    // ========================================================================

    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    #[inline]
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Current token, or `None` once past the end.
    #[inline]
    pub fn current(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    /// Step to the next raw token (whitespace included). Used by the engine
    /// between action calls.
    #[inline]
    pub fn advance(&mut self) {
        if !self.is_at_end() {
            self.pos += 1;
        }
    }

    // ========================================================================
    // Lookahead
    // ========================================================================

    /// The `offset`-th non-whitespace token after the current position.
    ///
    /// `peek(0)` is the current token itself. Returns `None` when the script
    /// ends first.
    pub fn peek(&self, offset: usize) -> Option<&'a Token> {
        let mut index = self.pos;
        for _ in 0..offset {
            index = self.next_significant(index)?;
        }
        self.tokens.get(index)
    }

    /// Move to the next non-whitespace token and return it.
    ///
    /// Whitespace stepped over is consumed along with the token. Returns
    /// `None`, leaving the cursor at the end, when there is no such token.
    pub fn consume(&mut self) -> Option<&'a Token> {
        match self.next_significant(self.pos) {
            Some(index) => {
                self.pos = index;
                self.tokens.get(index)
            }
            None => {
                self.pos = self.tokens.len();
                None
            }
        }
    }

    fn next_significant(&self, from: usize) -> Option<usize> {
        (from + 1..self.tokens.len()).find(|&i| !self.tokens[i].is_whitespace())
    }

    // ========================================================================
    // Diagnostics
    // ========================================================================

    /// Record a non-fatal diagnostic for the caller.
    pub fn report(&mut self, diagnostic: impl Into<String>) {
        self.diagnostics.push(diagnostic.into());
    }

    pub fn diagnostics(&self) -> &[String] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<String> {
        self.diagnostics
    }
}
