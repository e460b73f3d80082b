//! Built-in rewrite actions

mod conditional_comments;
mod idempotent_create;
mod identifier;
mod identity;
mod procedure_name;

pub use conditional_comments::ConditionalCommentsAction;
pub use idempotent_create::IdempotentCreateAction;
pub use identifier::IdentifierRenameAction;
pub use identity::IdentityAction;
pub use procedure_name::ProcedureNameRenameAction;
