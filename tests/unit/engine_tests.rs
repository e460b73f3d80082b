//! Tests for the rewrite engine: pass-through, error handling, pipelines

use pretty_assertions::assert_eq;

use rust_sqlrewriter::parser::{Token, TokenKind};
use rust_sqlrewriter::{
    CompatibilityLevel, IdempotentCreateAction, IdentifierRenameAction, IdentityAction,
    LineEnding, ProcedureNameRenameAction, RewriteAction, RewriteError, RewriteOptions,
    ScriptRewriter, TokenCursor,
};

use crate::common::{rewrite, rewrite_ok};

// ============================================================================
// Identity
// ============================================================================

#[test]
fn test_identity_reproduces_script() {
    let sql = r#"
CREATE PROCEDURE [dbo].[GetOrders]
    @CustomerId INT,
    @Since DATETIME = NULL
AS
BEGIN
    SET NOCOUNT ON; -- keep rowcounts quiet
    /* multi
       line comment */
    SELECT o.Id, o.Total, N'ünïcode'
    FROM dbo.Orders o WITH (NOLOCK)
    WHERE o.CustomerId = @CustomerId
      AND (@Since IS NULL OR o.CreatedAt >= @Since);
END
GO
"#;
    assert_eq!(rewrite_ok(sql, &IdentityAction), sql);
}

#[test]
fn test_identity_keeps_crlf_line_endings() {
    let sql = "SELECT 1\r\nGO\r\nSELECT 2\r\n";
    assert_eq!(rewrite_ok(sql, &IdentityAction), sql);
}

#[test]
fn test_empty_script_yields_empty_output_for_any_action() {
    let actions: [&dyn RewriteAction; 3] = [
        &IdentityAction,
        &IdempotentCreateAction::all(),
        &IdentifierRenameAction::new(|n: &str| n.to_uppercase()),
    ];
    for action in actions {
        let result = rewrite("", action);
        assert_eq!(result.output, "");
        assert!(result.errors.is_empty());
    }
}

// ============================================================================
// Parse errors
// ============================================================================

#[test]
fn test_parse_errors_return_original_text() {
    let sql = "CREATE PROCEDURE dbo.Foo AS\nSELECT 1\nEND;";
    let result = rewrite(sql, &IdempotentCreateAction::all());
    assert_eq!(result.output, sql);
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].starts_with("3:1: "), "{}", result.errors[0]);
}

#[test]
fn test_compatibility_level_gates_iif() {
    let sql = "SELECT IIF(@a > 1, 'big', 'small')";
    let sql2008 = ScriptRewriter::with_options(RewriteOptions {
        compatibility: CompatibilityLevel::Sql100,
        line_ending: LineEnding::CrLf,
    });

    assert!(rewrite(sql, &IdentityAction).errors.is_empty());
    let result = sql2008.rewrite(sql, &IdentityAction).unwrap();
    assert_eq!(result.output, sql);
    assert_eq!(result.errors.len(), 1);
}

// ============================================================================
// Custom actions
// ============================================================================

/// Drops every comment and records how many it dropped.
struct StripComments;

impl RewriteAction for StripComments {
    fn name(&self) -> &str {
        "strip-comments"
    }

    fn rewrite(
        &self,
        token: &Token,
        cursor: &mut TokenCursor<'_>,
    ) -> Result<Vec<Token>, RewriteError> {
        if token.is_comment() {
            cursor.report(format!("dropped {}", token.text.trim()));
            return Ok(Vec::new());
        }
        Ok(vec![token.clone()])
    }
}

#[test]
fn test_custom_action_can_drop_tokens_and_report() {
    let result = rewrite("SELECT 1 /* a */-- b\n", &StripComments);
    assert_eq!(result.output, "SELECT 1 ");
    assert_eq!(result.diagnostics, vec!["dropped /* a */", "dropped -- b"]);
}

/// Replaces `TOP n` with `TOP (n)` by consuming the number.
struct ParenthesizeTop;

impl RewriteAction for ParenthesizeTop {
    fn name(&self) -> &str {
        "parenthesize-top"
    }

    fn rewrite(
        &self,
        token: &Token,
        cursor: &mut TokenCursor<'_>,
    ) -> Result<Vec<Token>, RewriteError> {
        let followed_by_number = cursor
            .peek(1)
            .is_some_and(|t| t.kind == TokenKind::NumberLiteral);
        if !token.is_keyword("TOP") || !followed_by_number {
            return Ok(vec![token.clone()]);
        }
        let Some(number) = cursor.consume() else {
            return Ok(vec![token.clone()]);
        };
        Ok(vec![
            token.clone(),
            Token::synthetic(TokenKind::Whitespace, " "),
            Token::synthetic(TokenKind::LeftParen, "("),
            number.clone(),
            Token::synthetic(TokenKind::RightParen, ")"),
        ])
    }
}

#[test]
fn test_consumed_tokens_are_not_revisited() {
    assert_eq!(
        rewrite_ok("SELECT TOP   10 * FROM t", &ParenthesizeTop),
        "SELECT TOP (10) * FROM t"
    );
}

// ============================================================================
// Pipelines
// ============================================================================

#[test]
fn test_pipeline_runs_rename_then_idempotent() {
    let rename = ProcedureNameRenameAction::new(|schema: &str, name: &str| {
        (schema.to_string(), format!("v2_{name}"))
    });
    let idempotent = IdempotentCreateAction::all().with_line_ending(LineEnding::Lf);
    let result = ScriptRewriter::new()
        .rewrite_pipeline("CREATE PROCEDURE Foo AS SELECT 1", &[&rename, &idempotent])
        .unwrap();

    assert!(result.errors.is_empty());
    assert_eq!(
        result.output,
        "IF NOT EXISTS (SELECT type_desc, type FROM sys.procedures WITH (nolock) WHERE name = 'v2_Foo' AND type = 'P')\n\
         BEGIN\n    EXEC('CREATE PROCEDURE dbo.v2_Foo AS')\nEND\nGO\n\
         ALTER PROCEDURE dbo.v2_Foo AS SELECT 1"
    );
}

#[test]
fn test_pipeline_stops_at_parse_errors() {
    let sql = "SELECT (1";
    let result = ScriptRewriter::new()
        .rewrite_pipeline(sql, &[&IdentityAction, &IdempotentCreateAction::all()])
        .unwrap();
    assert_eq!(result.output, sql);
    assert_eq!(result.errors.len(), 1);
}
