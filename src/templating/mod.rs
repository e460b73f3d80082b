//! Conditional-comment templating
//!
//! A block comment whose body contains `{{ ... }}` tags is a conditional
//! comment. Its body is rendered as a template against an [`Environment`]
//! and the result is spliced back into the script.
//!
//! ```ignore
//! /*{{#if DEVTEST}}
//!    , debug_column
//! {{/if}}*/
//! ```

mod environment;
mod render;
mod syntax;
mod tags;

use thiserror::Error;

pub use environment::{is_truthy, Environment};
pub use syntax::{Template, TemplatePosition};
pub use tags::{CommentConditionTag, CommentMarker, TagDefinition, TagRegistry};

const OPEN_DELIMITER: &str = "{{";
const CLOSE_DELIMITER: &str = "}}";

/// Errors raised while compiling or rendering a template.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("unknown variable '{name}' at {line}:{column}")]
    UnknownVariable {
        name: String,
        line: usize,
        column: usize,
    },

    #[error("unterminated tag at {line}:{column}: missing '}}}}'")]
    UnterminatedTag { line: usize, column: usize },

    #[error("unknown tag '{name}' at {line}:{column}")]
    UnknownTag {
        name: String,
        line: usize,
        column: usize,
    },

    #[error("tag '{tag}' expects {expected} argument(s), found {found}")]
    ArgumentCount {
        tag: String,
        expected: usize,
        found: usize,
    },

    #[error("unexpected '{tag}' at {line}:{column}")]
    UnexpectedTag {
        tag: String,
        line: usize,
        column: usize,
    },

    #[error("'{tag}' block opened at {line}:{column} is never closed")]
    UnclosedBlock {
        tag: String,
        line: usize,
        column: usize,
    },
}

/// Outcome of inspecting a comment for template delimiters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Detection {
    /// No template delimiters
    Plain,
    /// Both delimiters present
    Template,
    /// Exactly one of the delimiters present
    Mismatched(String),
}

/// Classify comment text by its template delimiters.
pub fn detect_conditional_comment(comment: &str) -> Detection {
    if comment.trim().is_empty() {
        return Detection::Plain;
    }
    match (
        comment.contains(OPEN_DELIMITER),
        comment.contains(CLOSE_DELIMITER),
    ) {
        (true, true) => Detection::Template,
        (false, false) => Detection::Plain,
        _ => Detection::Mismatched(format!(
            "Found a conditional comment with mismatched {OPEN_DELIMITER} {CLOSE_DELIMITER} tags"
        )),
    }
}

/// Template engine used by
/// [`ConditionalCommentsAction`](crate::rewriter::ConditionalCommentsAction).
pub trait Templater: Send + Sync {
    fn detect(&self, comment: &str) -> Detection {
        detect_conditional_comment(comment)
    }

    fn expand(&self, template: &str, environment: &Environment) -> Result<String, TemplateError>;
}

/// The default templater: `{{ }}` syntax with `if`/`elif`/`else` blocks,
/// placeholders and the four comment-control tags.
#[derive(Debug)]
pub struct MustacheTemplater {
    tags: TagRegistry,
}

impl Default for MustacheTemplater {
    fn default() -> Self {
        Self::new()
    }
}

impl MustacheTemplater {
    pub fn new() -> Self {
        Self {
            tags: TagRegistry::with_comment_tags(),
        }
    }

    /// Register an additional custom tag.
    pub fn with_tag(mut self, tag: impl TagDefinition + 'static) -> Self {
        self.tags.register(tag);
        self
    }
}

impl Templater for MustacheTemplater {
    fn expand(&self, template: &str, environment: &Environment) -> Result<String, TemplateError> {
        Template::compile(template, &self.tags)?.render(environment, &self.tags)
    }
}
