//! Pass-through action

use crate::error::RewriteError;
use crate::parser::Token;
use crate::rewriter::{RewriteAction, TokenCursor};

/// Emits every token unchanged. Rewriting with it reproduces the input.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityAction;

impl RewriteAction for IdentityAction {
    fn name(&self) -> &str {
        "identity"
    }

    fn rewrite(
        &self,
        token: &Token,
        _cursor: &mut TokenCursor<'_>,
    ) -> Result<Vec<Token>, RewriteError> {
        Ok(vec![token.clone()])
    }
}
