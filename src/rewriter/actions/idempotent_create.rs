//! Idempotent CREATE/ALTER action
//!
//! Rewrites DDL so that a script can be run repeatedly:
//!
//! - Procedures and views get a guard that creates a stub when the object is
//!   missing, and the statement itself becomes an `ALTER`
//! - Functions are dropped if present and the statement becomes a `CREATE`
//!   (the function kind may change between deployments)
//! - `CREATE SCHEMA` is wrapped in an existence check
//!
//! Only the `CREATE`/`ALTER` keyword is replaced (or, for schemas, the
//! header); the rest of the statement passes through unchanged.

use std::fmt;

use tracing::debug;

use crate::config::LineEnding;
use crate::error::RewriteError;
use crate::parser::{
    classify_function, quote_identifier, sql_string_literal, QualifiedName, QuoteStyle, Token,
    TokenKind,
};
use crate::rewriter::{RewriteAction, TokenCursor};

type NamePredicate = dyn Fn(&str, &str) -> bool + Send + Sync;

/// Body of the stub view created before the real `ALTER VIEW`.
const VIEW_STUB_BODY: &str = "SELECT 1 AS placeholder";

/// Makes `CREATE`/`ALTER` of procedures, functions, views and schemas
/// idempotent for names accepted by a predicate.
///
/// The predicate receives `(schema, name)` unquoted. The schema is empty for
/// unqualified names and for schemas themselves, where the schema name is
/// passed as `schema` and `name` is empty.
pub struct IdempotentCreateAction {
    predicate: Box<NamePredicate>,
    line_ending: LineEnding,
}

impl IdempotentCreateAction {
    pub fn new(predicate: impl Fn(&str, &str) -> bool + Send + Sync + 'static) -> Self {
        Self {
            predicate: Box::new(predicate),
            line_ending: LineEnding::default(),
        }
    }

    /// Rewrite every procedure, function, view and schema.
    pub fn all() -> Self {
        Self::new(|_, _| true)
    }

    /// Line terminator used in the generated guard blocks.
    pub fn with_line_ending(mut self, line_ending: LineEnding) -> Self {
        self.line_ending = line_ending;
        self
    }

    fn accepts(&self, name: &QualifiedName) -> bool {
        (self.predicate)(name.schema_name(), name.object_name())
    }

    fn procedure_guard(&self, name: &QualifiedName) -> Vec<Token> {
        let quoted = name.to_schema_qualified_sql();
        GuardBuilder::new(self.line_ending)
            .words(&["IF", "NOT", "EXISTS"])
            .space()
            .symbol(TokenKind::LeftParen, "(")
            .word("SELECT")
            .space()
            .identifier("type_desc")
            .symbol(TokenKind::Comma, ",")
            .space()
            .identifier("type")
            .space()
            .words(&["FROM"])
            .space()
            .system_object("procedures")
            .space()
            .words(&["WITH"])
            .space()
            .symbol(TokenKind::LeftParen, "(")
            .identifier("nolock")
            .symbol(TokenKind::RightParen, ")")
            .space()
            .words(&["WHERE"])
            .space()
            .identifier("name")
            .space()
            .symbol(TokenKind::Symbol, "=")
            .space()
            .literal(name.object_name())
            .space()
            .words(&["AND"])
            .space()
            .identifier("type")
            .space()
            .symbol(TokenKind::Symbol, "=")
            .space()
            .literal("P")
            .symbol(TokenKind::RightParen, ")")
            .newline()
            .word("BEGIN")
            .newline()
            .indent("    ")
            .exec(&format!("CREATE PROCEDURE {quoted} AS"))
            .newline()
            .word("END")
            .newline()
            .batch_separator()
            .word("ALTER")
            .build()
    }

    fn function_guard(&self, name: &QualifiedName) -> Vec<Token> {
        let quoted = name.to_schema_qualified_sql();
        GuardBuilder::new(self.line_ending)
            .words(&["IF", "EXISTS"])
            .space()
            .symbol(TokenKind::LeftParen, "(")
            .word("SELECT")
            .space()
            .identifier("name")
            .space()
            .words(&["FROM"])
            .space()
            .system_object("objects")
            .space()
            .words(&["WITH"])
            .space()
            .symbol(TokenKind::LeftParen, "(")
            .identifier("nolock")
            .symbol(TokenKind::RightParen, ")")
            .space()
            .words(&["WHERE"])
            .space()
            .identifier("object_id")
            .space()
            .symbol(TokenKind::Symbol, "=")
            .space()
            .identifier("OBJECT_ID")
            .symbol(TokenKind::LeftParen, "(")
            .national_literal(&quoted)
            .symbol(TokenKind::RightParen, ")")
            .space()
            .words(&["AND"])
            .space()
            .identifier("type")
            .space()
            .words(&["IN"])
            .space()
            .symbol(TokenKind::LeftParen, "(")
            .national_literal_list(&["FN", "TF", "IF", "TF"])
            .symbol(TokenKind::RightParen, ")")
            .symbol(TokenKind::RightParen, ")")
            .newline()
            .indent("  ")
            .exec(&format!("DROP FUNCTION {quoted}"))
            .newline()
            .batch_separator()
            .word("CREATE")
            .build()
    }

    fn view_guard(&self, name: &QualifiedName) -> Vec<Token> {
        let quoted = name.to_schema_qualified_sql();
        GuardBuilder::new(self.line_ending)
            .words(&["IF"])
            .space()
            .identifier("OBJECT_ID")
            .symbol(TokenKind::LeftParen, "(")
            .national_literal(&quoted)
            .symbol(TokenKind::Comma, ",")
            .space()
            .national_literal("V")
            .symbol(TokenKind::RightParen, ")")
            .space()
            .words(&["IS", "NULL"])
            .newline()
            .indent("  ")
            .exec(&format!("CREATE VIEW {quoted} AS {VIEW_STUB_BODY}"))
            .newline()
            .batch_separator()
            .word("ALTER")
            .build()
    }

    fn schema_guard(&self, schema: &str, owner: Option<&Token>) -> Vec<Token> {
        let mut statement = format!(
            "CREATE SCHEMA {}",
            quote_identifier(schema, Some(QuoteStyle::Bracket))
        );
        if let Some(owner) = owner {
            statement.push_str(" AUTHORIZATION ");
            statement.push_str(&owner.text);
        }
        GuardBuilder::new(self.line_ending)
            .words(&["IF", "NOT", "EXISTS"])
            .space()
            .symbol(TokenKind::LeftParen, "(")
            .word("SELECT")
            .space()
            .identifier("name")
            .space()
            .words(&["FROM"])
            .space()
            .system_object("schemas")
            .space()
            .words(&["WITH"])
            .space()
            .symbol(TokenKind::LeftParen, "(")
            .identifier("nolock")
            .symbol(TokenKind::RightParen, ")")
            .space()
            .words(&["WHERE"])
            .space()
            .identifier("name")
            .space()
            .symbol(TokenKind::Symbol, "=")
            .space()
            .literal(schema)
            .symbol(TokenKind::RightParen, ")")
            .newline()
            .indent("  ")
            .exec(&statement)
            .symbol(TokenKind::Semicolon, ";")
            .newline()
            .symbol(TokenKind::BatchSeparator, "GO")
            .build()
    }

    /// Consume `SCHEMA name [AUTHORIZATION owner]` and build the guard.
    fn rewrite_create_schema(&self, cursor: &mut TokenCursor<'_>, schema: &str) -> Vec<Token> {
        cursor.consume(); // SCHEMA
        cursor.consume(); // name
        let mut owner = None;
        let has_authorization = cursor.peek(1).is_some_and(|t| t.is_keyword("AUTHORIZATION"));
        if has_authorization && cursor.peek(2).is_some_and(Token::is_identifier) {
            cursor.consume();
            owner = cursor.consume();
        }
        self.schema_guard(schema, owner)
    }
}

impl fmt::Debug for IdempotentCreateAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdempotentCreateAction")
            .field("line_ending", &self.line_ending)
            .finish_non_exhaustive()
    }
}

impl RewriteAction for IdempotentCreateAction {
    fn name(&self) -> &str {
        "idempotent-create"
    }

    fn rewrite(
        &self,
        token: &Token,
        cursor: &mut TokenCursor<'_>,
    ) -> Result<Vec<Token>, RewriteError> {
        let is_create = token.is_keyword("CREATE");
        if !is_create && !token.is_keyword("ALTER") {
            return Ok(vec![token.clone()]);
        }
        let Some(object_kind) = cursor.peek(1) else {
            return Ok(vec![token.clone()]);
        };
        let Some((name, span)) = QualifiedName::peek(cursor, 2) else {
            return Ok(vec![token.clone()]);
        };

        if object_kind.is_keyword("PROCEDURE") || object_kind.is_keyword("PROC") {
            if self.accepts(&name) {
                debug!(procedure = %name, "guarding procedure");
                return Ok(self.procedure_guard(&name));
            }
        } else if object_kind.is_keyword("SCHEMA") && is_create && name.is_single_part() {
            let schema = name.object_name();
            if (self.predicate)(schema, "") {
                debug!(schema, "guarding schema");
                return Ok(self.rewrite_create_schema(cursor, schema));
            }
        } else if object_kind.is_keyword("FUNCTION") {
            let function_type = classify_function(cursor, 2 + span);
            if function_type.is_valid() && self.accepts(&name) {
                debug!(function = %name, ?function_type, "guarding function");
                return Ok(self.function_guard(&name));
            }
        } else if object_kind.is_keyword("VIEW") && self.accepts(&name) {
            debug!(view = %name, "guarding view");
            return Ok(self.view_guard(&name));
        }

        Ok(vec![token.clone()])
    }
}

// =============================================================================
// Guard construction
// =============================================================================

/// Builds the synthetic token sequence of a guard block.
struct GuardBuilder {
    tokens: Vec<Token>,
    line_ending: LineEnding,
}

impl GuardBuilder {
    fn new(line_ending: LineEnding) -> Self {
        Self {
            tokens: Vec::new(),
            line_ending,
        }
    }

    fn push(mut self, kind: TokenKind, text: impl Into<String>) -> Self {
        self.tokens.push(Token::synthetic(kind, text));
        self
    }

    fn word(self, keyword: &str) -> Self {
        self.push(TokenKind::Keyword, keyword)
    }

    /// Keywords separated by single spaces.
    fn words(mut self, keywords: &[&str]) -> Self {
        for (i, keyword) in keywords.iter().enumerate() {
            if i > 0 {
                self = self.space();
            }
            self = self.word(keyword);
        }
        self
    }

    fn identifier(self, name: &str) -> Self {
        self.push(TokenKind::Identifier, name)
    }

    /// `sys.<name>`
    fn system_object(self, name: &str) -> Self {
        self.identifier("sys")
            .symbol(TokenKind::Dot, ".")
            .identifier(name)
    }

    fn symbol(self, kind: TokenKind, text: &str) -> Self {
        self.push(kind, text)
    }

    fn space(self) -> Self {
        self.push(TokenKind::Whitespace, " ")
    }

    fn indent(self, indent: &str) -> Self {
        self.push(TokenKind::Whitespace, indent)
    }

    fn newline(self) -> Self {
        let line_ending = self.line_ending.as_str();
        self.push(TokenKind::Whitespace, line_ending)
    }

    fn literal(self, text: &str) -> Self {
        self.push(TokenKind::StringLiteral, sql_string_literal(text))
    }

    fn national_literal(self, text: &str) -> Self {
        self.push(
            TokenKind::StringLiteral,
            format!("N{}", sql_string_literal(text)),
        )
    }

    /// `N'a',N'b',...`
    fn national_literal_list(mut self, items: &[&str]) -> Self {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self = self.symbol(TokenKind::Comma, ",");
            }
            self = self.national_literal(item);
        }
        self
    }

    /// `EXEC('<statement>')`
    fn exec(self, statement: &str) -> Self {
        self.word("EXEC")
            .symbol(TokenKind::LeftParen, "(")
            .literal(statement)
            .symbol(TokenKind::RightParen, ")")
    }

    /// `GO` on its own line.
    fn batch_separator(self) -> Self {
        self.symbol(TokenKind::BatchSeparator, "GO").newline()
    }

    fn build(self) -> Vec<Token> {
        self.tokens
    }
}
