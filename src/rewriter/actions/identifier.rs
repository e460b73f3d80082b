//! Identifier rename action

use std::fmt;

use crate::error::RewriteError;
use crate::parser::{quote_if_needed, unquote_identifier, Token};
use crate::rewriter::{RewriteAction, TokenCursor};

type NameMapping = dyn Fn(&str) -> String + Send + Sync;

/// Renames every plain or quoted identifier through a mapping.
///
/// The mapping sees the unquoted name; the result is re-quoted the way the
/// original token was. Keywords, variables, literals and comments are left
/// alone. Every part of a multi-part name is mapped independently, so
/// `dbo.Orders` with a `x_` prefix becomes `x_dbo.x_Orders`.
pub struct IdentifierRenameAction {
    mapping: Box<NameMapping>,
}

impl IdentifierRenameAction {
    pub fn new(mapping: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        Self {
            mapping: Box::new(mapping),
        }
    }
}

impl fmt::Debug for IdentifierRenameAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentifierRenameAction").finish_non_exhaustive()
    }
}

impl RewriteAction for IdentifierRenameAction {
    fn name(&self) -> &str {
        "identifier-rename"
    }

    fn rewrite(
        &self,
        token: &Token,
        _cursor: &mut TokenCursor<'_>,
    ) -> Result<Vec<Token>, RewriteError> {
        if !token.is_identifier() {
            return Ok(vec![token.clone()]);
        }
        let renamed = (self.mapping)(&unquote_identifier(&token.text));
        Ok(vec![quote_if_needed(&renamed, token)])
    }
}
