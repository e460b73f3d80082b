//! Token-stream rewrite engine
//!
//! A rewrite is a single left-to-right pass over a script's tokens. For
//! every token the engine asks a [`RewriteAction`] for its replacement (zero
//! or more tokens), and the output is the concatenated text of all
//! replacements. Actions may consume tokens after the current one through
//! the [`TokenCursor`]; consumed tokens are not offered to the action again.

pub mod actions;
mod cursor;

use tracing::debug;

use crate::config::RewriteOptions;
use crate::error::RewriteError;
use crate::parser::{parse_script, tokens_to_sql, Token};

pub use actions::{
    ConditionalCommentsAction, IdempotentCreateAction, IdentifierRenameAction, IdentityAction,
    ProcedureNameRenameAction,
};
pub use cursor::TokenCursor;

/// Rewrite policy applied to each token of a script.
pub trait RewriteAction: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Replacement tokens for `token`, the cursor's current token.
    ///
    /// Returning `vec![token.clone()]` leaves the token unchanged.
    fn rewrite(&self, token: &Token, cursor: &mut TokenCursor<'_>)
        -> Result<Vec<Token>, RewriteError>;
}

/// Result of a rewrite.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewriteResult {
    /// Rewritten script, or the unchanged input when `errors` is non-empty
    pub output: String,
    /// Parse errors of the input, formatted `line:column: message`
    pub errors: Vec<String>,
    /// Recoverable problems reported by actions, in order
    pub diagnostics: Vec<String>,
}

impl RewriteResult {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Drives rewrite actions over scripts.
#[derive(Debug, Clone, Default)]
pub struct ScriptRewriter {
    options: RewriteOptions,
}

impl ScriptRewriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: RewriteOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RewriteOptions {
        &self.options
    }

    /// Rewrite `script` with `action`.
    ///
    /// A script with parse errors is returned unchanged together with the
    /// errors; this is not an `Err`. `Err` is reserved for failures raised
    /// by the action itself.
    pub fn rewrite(
        &self,
        script: &str,
        action: &dyn RewriteAction,
    ) -> Result<RewriteResult, RewriteError> {
        if script.is_empty() {
            return Ok(RewriteResult::default());
        }

        let parsed = parse_script(script, &self.options);
        if parsed.has_errors() {
            debug!(
                action = action.name(),
                errors = parsed.errors.len(),
                "script has parse errors, returning it unchanged"
            );
            return Ok(RewriteResult {
                output: script.to_string(),
                errors: parsed.errors.iter().map(ToString::to_string).collect(),
                diagnostics: Vec::new(),
            });
        }

        let tokens = parsed.tokens_without_eof();
        let mut cursor = TokenCursor::new(tokens);
        let mut output: Vec<Token> = Vec::with_capacity(tokens.len());

        while let Some(token) = cursor.current() {
            output.extend(action.rewrite(token, &mut cursor)?);
            cursor.advance();
        }

        Ok(RewriteResult {
            output: tokens_to_sql(&output),
            errors: Vec::new(),
            diagnostics: cursor.into_diagnostics(),
        })
    }

    /// Apply `actions` in order, re-tokenizing the output of each pass.
    ///
    /// Stops at the first pass whose input has parse errors and returns that
    /// pass's result. Diagnostics from all passes are accumulated.
    pub fn rewrite_pipeline(
        &self,
        script: &str,
        actions: &[&dyn RewriteAction],
    ) -> Result<RewriteResult, RewriteError> {
        let mut current = RewriteResult {
            output: script.to_string(),
            ..Default::default()
        };

        for action in actions {
            let mut next = self.rewrite(&current.output, *action)?;
            let mut diagnostics = std::mem::take(&mut current.diagnostics);
            diagnostics.append(&mut next.diagnostics);
            next.diagnostics = diagnostics;
            if !next.is_ok() {
                return Ok(next);
            }
            current = next;
        }

        Ok(current)
    }
}
