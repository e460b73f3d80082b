//! Procedure rename action

use std::fmt;

use tracing::debug;

use crate::error::RewriteError;
use crate::parser::{identifier_token, QualifiedName, Token, TokenKind};
use crate::rewriter::{RewriteAction, TokenCursor};

type ProcedureMapping = dyn Fn(&str, &str) -> (String, String) + Send + Sync;

const TRIGGER_KEYWORDS: [&str; 4] = ["PROCEDURE", "PROC", "EXEC", "EXECUTE"];

/// Renames procedures where they are defined and where they are executed.
///
/// Fires on `PROCEDURE`, `PROC`, `EXEC` and `EXECUTE` followed by a name.
/// The mapping receives `(schema, name)` unquoted, with an unqualified name
/// reported in schema `dbo`, and returns the new pair. The name is
/// re-emitted fully qualified: `EXEC MyProc` becomes `EXEC dbo.MyProc`
/// under the identity mapping, and `Db..MyProc` becomes `Db.dbo.MyProc`.
pub struct ProcedureNameRenameAction {
    mapping: Box<ProcedureMapping>,
}

impl ProcedureNameRenameAction {
    pub fn new(mapping: impl Fn(&str, &str) -> (String, String) + Send + Sync + 'static) -> Self {
        Self {
            mapping: Box::new(mapping),
        }
    }

    fn is_trigger(token: &Token) -> bool {
        TRIGGER_KEYWORDS.iter().any(|keyword| token.is_keyword(keyword))
    }
}

impl fmt::Debug for ProcedureNameRenameAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcedureNameRenameAction")
            .finish_non_exhaustive()
    }
}

impl RewriteAction for ProcedureNameRenameAction {
    fn name(&self) -> &str {
        "procedure-rename"
    }

    fn rewrite(
        &self,
        token: &Token,
        cursor: &mut TokenCursor<'_>,
    ) -> Result<Vec<Token>, RewriteError> {
        if !Self::is_trigger(token) || !cursor.peek(1).is_some_and(Token::is_identifier) {
            return Ok(vec![token.clone()]);
        }
        let Some(name) = QualifiedName::consume(cursor) else {
            return Ok(vec![token.clone()]);
        };

        let (schema, procedure) = (self.mapping)(name.schema_or_default(), name.object_name());
        debug!(from = %name, to = %format!("{schema}.{procedure}"), "renaming procedure");

        let mut tokens = vec![
            token.clone(),
            Token::synthetic(TokenKind::Whitespace, " "),
        ];
        if let Some(database) = &name.database {
            tokens.push(identifier_token(&database.value, database.quote));
            tokens.push(Token::synthetic(TokenKind::Dot, "."));
        }
        let schema_quote = name.schema.as_ref().and_then(|s| s.quote);
        tokens.push(identifier_token(&schema, schema_quote));
        tokens.push(Token::synthetic(TokenKind::Dot, "."));
        tokens.push(identifier_token(&procedure, name.object.quote));
        Ok(tokens)
    }
}
