//! rust-sqlrewriter: token-level rewriting of T-SQL scripts
//!
//! This library rewrites SQL Server scripts for deployment tooling without
//! parsing them into a syntax tree. A script is tokenized, each token is
//! offered to a [`RewriteAction`], and the replacement tokens are joined
//! back into text, so everything an action does not touch is reproduced
//! byte for byte.
//!
//! Built-in actions:
//!
//! - [`IdempotentCreateAction`]: guard `CREATE`/`ALTER` of procedures,
//!   functions, views and schemas so a script can be re-run
//! - [`IdentifierRenameAction`]: map every identifier through a function
//! - [`ProcedureNameRenameAction`]: rename procedure definitions and calls
//! - [`ConditionalCommentsAction`]: expand `/*{{#if X}} ... {{/if}}*/`
//!   template comments against an [`Environment`]
//!
//! ```
//! use rust_sqlrewriter::{rewrite_script, IdentifierRenameAction};
//!
//! let action = IdentifierRenameAction::new(|name: &str| format!("x_{name}"));
//! let result = rewrite_script("SELECT [a] FROM t", &action).unwrap();
//! assert_eq!(result.output, "SELECT [x_a] FROM x_t");
//! ```

pub mod config;
pub mod error;
pub mod parser;
pub mod rewriter;
pub mod script_io;
pub mod templating;

pub use config::{CompatibilityLevel, LineEnding, RewriteOptions};
pub use error::RewriteError;
pub use rewriter::{
    ConditionalCommentsAction, IdempotentCreateAction, IdentifierRenameAction, IdentityAction,
    ProcedureNameRenameAction, RewriteAction, RewriteResult, ScriptRewriter, TokenCursor,
};
pub use templating::{Environment, MustacheTemplater, Templater};

/// Rewrite `script` with `action` using default options.
pub fn rewrite_script(
    script: &str,
    action: &dyn RewriteAction,
) -> Result<RewriteResult, RewriteError> {
    ScriptRewriter::new().rewrite(script, action)
}
