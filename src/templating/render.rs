//! Template rendering

use serde_json::Value;

use super::environment::{is_truthy, Environment};
use super::syntax::{Argument, Node, Template, TemplatePosition};
use super::tags::TagRegistry;
use super::TemplateError;

impl Template {
    /// Render against `environment`.
    ///
    /// Variables are resolved as they are reached: conditions in order up to
    /// the first truthy one, then the taken branch. Variables in branches
    /// that are never evaluated need not exist.
    pub fn render(
        &self,
        environment: &Environment,
        registry: &TagRegistry,
    ) -> Result<String, TemplateError> {
        let mut out = String::new();
        render_nodes(&self.nodes, environment, registry, &mut out)?;
        Ok(out)
    }
}

fn render_nodes(
    nodes: &[Node],
    environment: &Environment,
    registry: &TagRegistry,
    out: &mut String,
) -> Result<(), TemplateError> {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Placeholder { path, position } => {
                let value = resolve_variable(path, *position, environment)?;
                push_value(value, out);
            }
            Node::If {
                branches,
                otherwise,
            } => {
                let mut taken = None;
                for branch in branches {
                    let condition = resolve(&branch.condition, environment)?;
                    if is_truthy(Some(condition)) {
                        taken = Some(&branch.body);
                        break;
                    }
                }
                if let Some(body) = taken.or(otherwise.as_ref()) {
                    render_nodes(body, environment, registry, out)?;
                }
            }
            Node::Tag { name, arguments } => {
                let tag = registry.get(name).ok_or_else(|| TemplateError::UnknownTag {
                    name: name.clone(),
                    line: 0,
                    column: 0,
                })?;
                let values = arguments
                    .iter()
                    .map(|argument| resolve(argument, environment))
                    .collect::<Result<Vec<&Value>, _>>()?;
                tag.render(&values, out);
            }
        }
    }
    Ok(())
}

fn resolve<'a>(
    argument: &'a Argument,
    environment: &'a Environment,
) -> Result<&'a Value, TemplateError> {
    match argument {
        Argument::Literal(value) => Ok(value),
        Argument::Variable { path, position } => resolve_variable(path, *position, environment),
    }
}

fn resolve_variable<'a>(
    path: &str,
    position: TemplatePosition,
    environment: &'a Environment,
) -> Result<&'a Value, TemplateError> {
    environment
        .lookup(path)
        .ok_or_else(|| TemplateError::UnknownVariable {
            name: path.to_string(),
            line: position.line,
            column: position.column,
        })
}

fn push_value(value: &Value, out: &mut String) {
    match value {
        Value::Null => {}
        Value::String(s) => out.push_str(s),
        other => out.push_str(&other.to_string()),
    }
}
