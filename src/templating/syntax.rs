//! Template grammar
//!
//! ```text
//! template  := (text | tag)*
//! tag       := "{{" content "}}"
//! content   := name                          placeholder
//!            | "#if" arg                     opens a block
//!            | "#elif" arg | "#elseif" arg   next branch
//!            | "#else"                       final branch
//!            | "/if"                         closes the block
//!            | "#" name arg*                 custom self-closing tag
//! arg       := name | 'string' | "string" | number
//! ```
//!
//! Text outside tags is copied verbatim; no whitespace around tags is
//! trimmed.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Number, Value};

use super::tags::TagRegistry;
use super::TemplateError;

static TAG_CONTENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^\s*(?P<sigil>[#/]?)\s*(?P<name>[A-Za-z_@][A-Za-z0-9_.@]*)(?P<args>.*)$")
        .expect("tag content pattern is valid")
});

static ARGUMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"'[^']*'|"[^"]*"|\S+"#).expect("argument pattern is valid")
});

/// 1-based position inside a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplatePosition {
    pub line: usize,
    pub column: usize,
}

impl TemplatePosition {
    fn at(source: &str, offset: usize) -> Self {
        let before = &source[..offset];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
        Self {
            line,
            column: before[line_start..].chars().count() + 1,
        }
    }
}

/// A tag argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    Variable {
        path: String,
        position: TemplatePosition,
    },
    Literal(Value),
}

/// One `if`/`elif` branch.
#[derive(Debug, Clone, PartialEq)]
pub struct Branch {
    pub condition: Argument,
    pub body: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Text(String),
    Placeholder {
        path: String,
        position: TemplatePosition,
    },
    If {
        branches: Vec<Branch>,
        otherwise: Option<Vec<Node>>,
    },
    Tag {
        name: String,
        arguments: Vec<Argument>,
    },
}

/// A compiled template.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    pub(crate) nodes: Vec<Node>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sigil {
    None,
    Open,
    Close,
}

#[derive(Debug, Clone)]
struct TagSyntax {
    sigil: Sigil,
    name: String,
    arguments: Vec<Argument>,
    position: TemplatePosition,
}

impl TagSyntax {
    fn is(&self, sigil: Sigil, names: &[&str]) -> bool {
        self.sigil == sigil && names.contains(&self.name.as_str())
    }

    fn display(&self) -> String {
        match self.sigil {
            Sigil::None => self.name.clone(),
            Sigil::Open => format!("#{}", self.name),
            Sigil::Close => format!("/{}", self.name),
        }
    }
}

#[derive(Debug, Clone)]
enum Segment {
    Text(String),
    Tag(TagSyntax),
}

impl Template {
    /// Compile template text, validating custom tags against `registry`.
    pub fn compile(source: &str, registry: &TagRegistry) -> Result<Self, TemplateError> {
        let segments = lex(source)?;
        let mut parser = Parser {
            segments: segments.into_iter(),
            registry,
        };
        let (nodes, stop) = parser.parse_block()?;
        if let Some(tag) = stop {
            return Err(unexpected(&tag));
        }
        Ok(Self { nodes })
    }
}

// =============================================================================
// Lexing
// =============================================================================

fn lex(source: &str) -> Result<Vec<Segment>, TemplateError> {
    let mut segments = Vec::new();
    let mut rest = 0;

    while let Some(found) = source[rest..].find("{{") {
        let open = rest + found;
        if open > rest {
            segments.push(Segment::Text(source[rest..open].to_string()));
        }
        let position = TemplatePosition::at(source, open);
        let content_start = open + 2;
        let close = source[content_start..]
            .find("}}")
            .map(|i| content_start + i)
            .ok_or(TemplateError::UnterminatedTag {
                line: position.line,
                column: position.column,
            })?;
        let content = &source[content_start..close];
        segments.push(Segment::Tag(parse_tag(content, source, content_start, position)?));
        rest = close + 2;
    }

    if rest < source.len() {
        segments.push(Segment::Text(source[rest..].to_string()));
    }
    Ok(segments)
}

fn parse_tag(
    content: &str,
    source: &str,
    content_offset: usize,
    position: TemplatePosition,
) -> Result<TagSyntax, TemplateError> {
    let captures = TAG_CONTENT
        .captures(content)
        .ok_or_else(|| TemplateError::UnknownTag {
            name: content.trim().to_string(),
            line: position.line,
            column: position.column,
        })?;

    let sigil = match &captures["sigil"] {
        "#" => Sigil::Open,
        "/" => Sigil::Close,
        _ => Sigil::None,
    };

    let arguments = match captures.name("args") {
        Some(args) => ARGUMENT
            .find_iter(args.as_str())
            .map(|m| {
                let offset = content_offset + args.start() + m.start();
                parse_argument(m.as_str(), TemplatePosition::at(source, offset))
            })
            .collect(),
        None => Vec::new(),
    };

    Ok(TagSyntax {
        sigil,
        name: captures["name"].to_string(),
        arguments,
        position,
    })
}

fn parse_argument(text: &str, position: TemplatePosition) -> Argument {
    let quoted = text.len() >= 2
        && ((text.starts_with('\'') && text.ends_with('\''))
            || (text.starts_with('"') && text.ends_with('"')));
    if quoted {
        return Argument::Literal(Value::String(text[1..text.len() - 1].to_string()));
    }
    if let Ok(n) = text.parse::<i64>() {
        return Argument::Literal(Value::Number(n.into()));
    }
    if let Some(n) = text.parse::<f64>().ok().and_then(Number::from_f64) {
        return Argument::Literal(Value::Number(n));
    }
    Argument::Variable {
        path: text.to_string(),
        position,
    }
}

// =============================================================================
// Parsing
// =============================================================================

struct Parser<'r> {
    segments: std::vec::IntoIter<Segment>,
    registry: &'r TagRegistry,
}

impl Parser<'_> {
    /// Parse nodes until end of input or a branch/close tag, which is
    /// returned to the caller to handle.
    fn parse_block(&mut self) -> Result<(Vec<Node>, Option<TagSyntax>), TemplateError> {
        let mut nodes = Vec::new();

        while let Some(segment) = self.segments.next() {
            let tag = match segment {
                Segment::Text(text) => {
                    nodes.push(Node::Text(text));
                    continue;
                }
                Segment::Tag(tag) => tag,
            };

            match tag.sigil {
                Sigil::None => {
                    if !tag.arguments.is_empty() {
                        return Err(TemplateError::ArgumentCount {
                            tag: tag.name,
                            expected: 0,
                            found: tag.arguments.len(),
                        });
                    }
                    nodes.push(Node::Placeholder {
                        path: tag.name,
                        position: tag.position,
                    });
                }
                Sigil::Open if tag.name == "if" => nodes.push(self.parse_if(tag)?),
                Sigil::Open if tag.is(Sigil::Open, &["elif", "elseif", "else"]) => {
                    return Ok((nodes, Some(tag)));
                }
                Sigil::Close => return Ok((nodes, Some(tag))),
                Sigil::Open => nodes.push(self.custom_tag(tag)?),
            }
        }

        Ok((nodes, None))
    }

    fn parse_if(&mut self, open: TagSyntax) -> Result<Node, TemplateError> {
        let mut condition = single_argument(open.clone())?;
        let mut branches = Vec::new();

        loop {
            let (body, stop) = self.parse_block()?;
            let Some(stop) = stop else {
                return Err(TemplateError::UnclosedBlock {
                    tag: "if".to_string(),
                    line: open.position.line,
                    column: open.position.column,
                });
            };
            branches.push(Branch { condition, body });

            if stop.is(Sigil::Close, &["if"]) {
                return Ok(Node::If {
                    branches,
                    otherwise: None,
                });
            }
            if stop.is(Sigil::Open, &["elif", "elseif"]) {
                condition = single_argument(stop)?;
                continue;
            }
            if stop.is(Sigil::Open, &["else"]) {
                if !stop.arguments.is_empty() {
                    return Err(TemplateError::ArgumentCount {
                        tag: "else".to_string(),
                        expected: 0,
                        found: stop.arguments.len(),
                    });
                }
                let (otherwise, end) = self.parse_block()?;
                return match end {
                    Some(end) if end.is(Sigil::Close, &["if"]) => Ok(Node::If {
                        branches,
                        otherwise: Some(otherwise),
                    }),
                    Some(end) => Err(unexpected(&end)),
                    None => Err(TemplateError::UnclosedBlock {
                        tag: "if".to_string(),
                        line: open.position.line,
                        column: open.position.column,
                    }),
                };
            }
            return Err(unexpected(&stop));
        }
    }

    fn custom_tag(&self, tag: TagSyntax) -> Result<Node, TemplateError> {
        let definition = self
            .registry
            .get(&tag.name)
            .ok_or_else(|| TemplateError::UnknownTag {
                name: tag.name.clone(),
                line: tag.position.line,
                column: tag.position.column,
            })?;
        let expected = definition.parameters().len();
        if tag.arguments.len() != expected {
            return Err(TemplateError::ArgumentCount {
                tag: tag.name,
                expected,
                found: tag.arguments.len(),
            });
        }
        Ok(Node::Tag {
            name: tag.name,
            arguments: tag.arguments,
        })
    }
}

fn single_argument(tag: TagSyntax) -> Result<Argument, TemplateError> {
    let found = tag.arguments.len();
    let mut arguments = tag.arguments.into_iter();
    match (arguments.next(), found) {
        (Some(argument), 1) => Ok(argument),
        _ => Err(TemplateError::ArgumentCount {
            tag: tag.name,
            expected: 1,
            found,
        }),
    }
}

fn unexpected(tag: &TagSyntax) -> TemplateError {
    TemplateError::UnexpectedTag {
        tag: tag.display(),
        line: tag.position.line,
        column: tag.position.column,
    }
}
