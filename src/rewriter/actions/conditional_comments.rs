//! Conditional comment expansion
//!
//! A block comment containing `{{ }}` tags is rendered as a template and the
//! result replaces the comment. The result is normally re-tokenized and
//! spliced into the stream; an expansion that opens or closes a SQL comment
//! without the other half cannot be tokenized on its own and is emitted as
//! a single comment token instead, to pair up with markers emitted by other
//! conditional comments.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::RewriteOptions;
use crate::error::RewriteError;
use crate::parser::{parse_script, Token, TokenKind};
use crate::rewriter::{RewriteAction, TokenCursor};
use crate::templating::{Detection, Environment, MustacheTemplater, Templater};

/// Expands conditional comments against an [`Environment`].
pub struct ConditionalCommentsAction {
    templater: Arc<dyn Templater>,
    environment: Environment,
    options: RewriteOptions,
}

impl ConditionalCommentsAction {
    /// Use the default templater.
    pub fn new(environment: Environment) -> Self {
        Self::with_templater(Arc::new(MustacheTemplater::new()), environment)
    }

    pub fn with_templater(templater: Arc<dyn Templater>, environment: Environment) -> Self {
        Self {
            templater,
            environment,
            options: RewriteOptions::default(),
        }
    }

    /// Options used to re-tokenize expansions.
    pub fn with_options(mut self, options: RewriteOptions) -> Self {
        self.options = options;
        self
    }

    fn expand(&self, comment: &str) -> Result<String, RewriteError> {
        let body = strip_comment_delimiters(comment);
        self.templater
            .expand(body, &self.environment)
            .map_err(|source| RewriteError::Template {
                comment: comment.to_string(),
                source,
            })
    }

    fn splice(&self, expanded: &str, cursor: &mut TokenCursor<'_>) -> Vec<Token> {
        let parsed = parse_script(expanded, &self.options);
        let tokens = parsed.tokens_without_eof();
        if !tokens.is_empty() {
            return tokens.to_vec();
        }
        if !parsed.has_errors() {
            return Vec::new();
        }

        warn!(expansion = %expanded, "conditional comment expansion could not be tokenized, dropping it");
        cursor.report(format!("Error parsing '{expanded}' into TSQL"));
        for error in &parsed.errors {
            warn!(%error, "expansion parse error");
            cursor.report(error.to_string());
        }
        Vec::new()
    }
}

impl fmt::Debug for ConditionalCommentsAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConditionalCommentsAction")
            .field("environment", &self.environment)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl RewriteAction for ConditionalCommentsAction {
    fn name(&self) -> &str {
        "conditional-comments"
    }

    fn rewrite(
        &self,
        token: &Token,
        cursor: &mut TokenCursor<'_>,
    ) -> Result<Vec<Token>, RewriteError> {
        if token.kind != TokenKind::MultiLineComment {
            return Ok(vec![token.clone()]);
        }

        match self.templater.detect(&token.text) {
            Detection::Plain => Ok(vec![token.clone()]),
            Detection::Mismatched(message) => Err(RewriteError::ConditionalCommentDelimiters {
                comment: token.text.clone(),
                message,
            }),
            Detection::Template => {
                let expanded = self.expand(&token.text)?;
                debug!(comment = %token.text, expanded = %expanded, "expanded conditional comment");
                if has_unpaired_comment_marker(&expanded) {
                    return Ok(vec![Token::synthetic(TokenKind::MultiLineComment, expanded)]);
                }
                Ok(self.splice(&expanded, cursor))
            }
        }
    }
}

/// Drop the two-character `/*` and `*/` markers around a comment.
fn strip_comment_delimiters(comment: &str) -> &str {
    comment
        .get(2..comment.len().saturating_sub(2))
        .unwrap_or_default()
}

/// True if exactly one of `/*` and `*/` occurs in `text`.
fn has_unpaired_comment_marker(text: &str) -> bool {
    text.contains("/*") != text.contains("*/")
}
