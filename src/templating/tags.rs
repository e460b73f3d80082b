//! Custom template tags
//!
//! Custom tags are self-closing and bodyless: `{{#name arg ...}}`. The four
//! comment-control tags let a conditional comment open or close a real SQL
//! comment depending on a condition, which is how a template comments out
//! (or restores) a region of the script.

use std::collections::HashMap;
use std::fmt;

use serde_json::Value;

use super::environment::is_truthy;

/// A self-closing tag that can be registered with a [`TagRegistry`].
pub trait TagDefinition: Send + Sync {
    fn name(&self) -> &str;

    /// Names of the required arguments, in order.
    fn parameters(&self) -> &[&'static str];

    /// Write the tag's output. `arguments` are already resolved and match
    /// [`parameters`](Self::parameters) in number.
    fn render(&self, arguments: &[&Value], out: &mut String);
}

/// SQL comment delimiter emitted by a [`CommentConditionTag`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentMarker {
    Open,
    Close,
}

impl CommentMarker {
    pub fn as_str(self) -> &'static str {
        match self {
            CommentMarker::Open => "/*",
            CommentMarker::Close => "*/",
        }
    }
}

/// Emits a comment marker when the truthiness of its `condition` argument
/// equals `emit_when`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentConditionTag {
    name: &'static str,
    marker: CommentMarker,
    emit_when: bool,
}

impl CommentConditionTag {
    pub const fn new(name: &'static str, marker: CommentMarker, emit_when: bool) -> Self {
        Self {
            name,
            marker,
            emit_when,
        }
    }

    /// `{{#comment_if c}}` emits `/*` when `c` is truthy.
    pub const fn comment_if() -> Self {
        Self::new("comment_if", CommentMarker::Open, true)
    }

    /// `{{#end_comment_if c}}` emits `*/` when `c` is truthy.
    pub const fn end_comment_if() -> Self {
        Self::new("end_comment_if", CommentMarker::Close, true)
    }

    /// `{{#uncomment_if c}}` emits `/*` when `c` is falsy.
    pub const fn uncomment_if() -> Self {
        Self::new("uncomment_if", CommentMarker::Open, false)
    }

    /// `{{#end_uncomment_if c}}` emits `*/` when `c` is falsy.
    pub const fn end_uncomment_if() -> Self {
        Self::new("end_uncomment_if", CommentMarker::Close, false)
    }

    pub const fn all() -> [Self; 4] {
        [
            Self::comment_if(),
            Self::end_comment_if(),
            Self::uncomment_if(),
            Self::end_uncomment_if(),
        ]
    }
}

impl TagDefinition for CommentConditionTag {
    fn name(&self) -> &str {
        self.name
    }

    fn parameters(&self) -> &[&'static str] {
        &["condition"]
    }

    fn render(&self, arguments: &[&Value], out: &mut String) {
        if is_truthy(arguments.first().copied()) == self.emit_when {
            out.push_str(self.marker.as_str());
        }
    }
}

/// Custom tags known to a template engine, by name.
#[derive(Default)]
pub struct TagRegistry {
    tags: HashMap<String, Box<dyn TagDefinition>>,
}

impl TagRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the four comment-control tags.
    pub fn with_comment_tags() -> Self {
        let mut registry = Self::new();
        for tag in CommentConditionTag::all() {
            registry.register(tag);
        }
        registry
    }

    /// Register a tag, replacing any tag of the same name.
    pub fn register(&mut self, tag: impl TagDefinition + 'static) {
        self.tags.insert(tag.name().to_string(), Box::new(tag));
    }

    pub fn get(&self, name: &str) -> Option<&dyn TagDefinition> {
        self.tags.get(name).map(|tag| tag.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tags.contains_key(name)
    }
}

impl fmt::Debug for TagRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.tags.keys().collect();
        names.sort();
        f.debug_struct("TagRegistry").field("tags", &names).finish()
    }
}
