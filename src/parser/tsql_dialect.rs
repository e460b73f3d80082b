//! Extended T-SQL dialect for sqlparser-rs
//!
//! The rewriter only needs sqlparser's tokenizer, but it needs it to behave
//! like SQL Server's: bracket-quoted identifiers, `@variables`, `#temp`
//! tables and nested block comments. This module wraps `MsSqlDialect` and
//! adds the pieces of T-SQL knowledge the tokenizer does not carry itself:
//! which bare words are reserved, and which built-in functions a given
//! compatibility level understands.

use std::any::TypeId;
use std::collections::HashSet;

use once_cell::sync::Lazy;
use sqlparser::dialect::{Dialect, MsSqlDialect};

use crate::config::CompatibilityLevel;

/// SQL Server reserved keywords.
///
/// A bare word in this set is tokenized as a keyword; every other bare word
/// (including non-reserved words like `RETURNS` or `IIF`) is an identifier,
/// except a line-leading `GO`, which is a batch separator.
static RESERVED_KEYWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "ADD", "ALL", "ALTER", "AND", "ANY", "AS", "ASC", "AUTHORIZATION", "BACKUP", "BEGIN",
        "BETWEEN", "BREAK", "BROWSE", "BULK", "BY", "CASCADE", "CASE", "CHECK", "CHECKPOINT",
        "CLOSE", "CLUSTERED", "COALESCE", "COLLATE", "COLUMN", "COMMIT", "COMPUTE",
        "CONSTRAINT", "CONTAINS", "CONTAINSTABLE", "CONTINUE", "CONVERT", "CREATE", "CROSS",
        "CURRENT", "CURRENT_DATE", "CURRENT_TIME", "CURRENT_TIMESTAMP", "CURRENT_USER",
        "CURSOR", "DATABASE", "DBCC", "DEALLOCATE", "DECLARE", "DEFAULT", "DELETE", "DENY",
        "DESC", "DISK", "DISTINCT", "DISTRIBUTED", "DOUBLE", "DROP", "DUMP", "ELSE", "END",
        "ERRLVL", "ESCAPE", "EXCEPT", "EXEC", "EXECUTE", "EXISTS", "EXIT", "EXTERNAL", "FETCH",
        "FILE", "FILLFACTOR", "FOR", "FOREIGN", "FREETEXT", "FREETEXTTABLE", "FROM", "FULL",
        "FUNCTION", "GOTO", "GRANT", "GROUP", "HAVING", "HOLDLOCK", "IDENTITY",
        "IDENTITY_INSERT", "IDENTITYCOL", "IF", "IN", "INDEX", "INNER", "INSERT", "INTERSECT",
        "INTO", "IS", "JOIN", "KEY", "KILL", "LEFT", "LIKE", "LINENO", "LOAD", "MERGE",
        "NATIONAL", "NOCHECK", "NONCLUSTERED", "NOT", "NULL", "NULLIF", "OF", "OFF", "OFFSETS",
        "ON", "OPEN", "OPENDATASOURCE", "OPENQUERY", "OPENROWSET", "OPENXML", "OPTION", "OR",
        "ORDER", "OUTER", "OVER", "PERCENT", "PIVOT", "PLAN", "PRECISION", "PRIMARY", "PRINT",
        "PROC", "PROCEDURE", "PUBLIC", "RAISERROR", "READ", "READTEXT", "RECONFIGURE",
        "REFERENCES", "REPLICATION", "RESTORE", "RESTRICT", "RETURN", "REVERT", "REVOKE",
        "RIGHT", "ROLLBACK", "ROWCOUNT", "ROWGUIDCOL", "RULE", "SAVE", "SCHEMA",
        "SECURITYAUDIT", "SELECT", "SEMANTICKEYPHRASETABLE", "SEMANTICSIMILARITYDETAILSTABLE",
        "SEMANTICSIMILARITYTABLE", "SESSION_USER", "SET", "SETUSER", "SHUTDOWN", "SOME",
        "STATISTICS", "SYSTEM_USER", "TABLE", "TABLESAMPLE", "TEXTSIZE", "THEN", "TO", "TOP",
        "TRAN", "TRANSACTION", "TRIGGER", "TRUNCATE", "TRY_CONVERT", "TSEQUAL", "UNION",
        "UNIQUE", "UNPIVOT", "UPDATE", "UPDATETEXT", "USE", "USER", "VALUES", "VARYING", "VIEW",
        "WAITFOR", "WHEN", "WHERE", "WHILE", "WITH", "WITHIN", "WRITETEXT",
    ]
    .into_iter()
    .collect()
});

/// Returns true if `word` is a reserved T-SQL keyword (case-insensitive).
pub fn is_reserved_keyword(word: &str) -> bool {
    RESERVED_KEYWORDS.contains(word.to_ascii_uppercase().as_str())
}

/// Extended T-SQL dialect used to tokenize scripts.
///
/// Tokenization is delegated to `MsSqlDialect`; the wrapper adds the
/// compatibility level so that version-dependent built-ins (the ternary
/// `IIF` function, SQL Server 2012+) can be accepted or rejected.
///
/// # Example
///
/// ```
/// use sqlparser::tokenizer::Tokenizer;
/// use rust_sqlrewriter::parser::ExtendedTsqlDialect;
///
/// let dialect = ExtendedTsqlDialect::new();
/// let tokens = Tokenizer::new(&dialect, "SELECT IIF(1 = 1, 'a', 'b')").tokenize().unwrap();
/// assert!(!tokens.is_empty());
/// ```
#[derive(Debug)]
pub struct ExtendedTsqlDialect {
    /// The base MsSqlDialect to delegate to
    base: MsSqlDialect,
    compatibility: CompatibilityLevel,
}

impl Default for ExtendedTsqlDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtendedTsqlDialect {
    /// Create a dialect at the default compatibility level
    pub fn new() -> Self {
        Self::with_compatibility(CompatibilityLevel::default())
    }

    /// Create a dialect for a specific compatibility level
    pub fn with_compatibility(compatibility: CompatibilityLevel) -> Self {
        Self {
            base: MsSqlDialect {},
            compatibility,
        }
    }

    pub fn compatibility(&self) -> CompatibilityLevel {
        self.compatibility
    }

    /// Whether `name` is a built-in function this compatibility level lacks.
    ///
    /// Such a call is a syntax error in the script.
    pub fn is_unsupported_builtin(&self, name: &str) -> bool {
        name.eq_ignore_ascii_case("IIF") && !self.compatibility.supports_iif()
    }
}

impl Dialect for ExtendedTsqlDialect {
    // ==========================================================================
    // Dialect identity - report as MsSqlDialect for dialect_of!() checks
    //
    // sqlparser's tokenizer enables T-SQL behaviour (bracket identifiers,
    // N'' literals) through dialect_of!(self is MsSqlDialect).
    // ==========================================================================

    fn dialect(&self) -> TypeId {
        TypeId::of::<MsSqlDialect>()
    }

    fn is_identifier_start(&self, ch: char) -> bool {
        self.base.is_identifier_start(ch)
    }

    fn is_identifier_part(&self, ch: char) -> bool {
        self.base.is_identifier_part(ch)
    }

    fn is_delimited_identifier_start(&self, ch: char) -> bool {
        self.base.is_delimited_identifier_start(ch)
    }

    fn convert_type_before_value(&self) -> bool {
        self.base.convert_type_before_value()
    }

    fn supports_try_convert(&self) -> bool {
        self.base.supports_try_convert()
    }

    fn supports_boolean_literals(&self) -> bool {
        self.base.supports_boolean_literals()
    }
}
