//! Canonical serializer
//!
//! Renders AST values back to MDL source. The output of every function here
//! parses back, through the matching entry point, to a value equal to the
//! input.

use crate::config::MdlConfig;
use crate::parser::{Attribute, AttributeValue, Command, Component, Parsed, Scalar, Verb};
use std::fmt;

// ============================================================================
// SERIALIZER
// ============================================================================

/// Canonical MDL renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Serializer {
    pub indent_width: usize,
}

impl Default for Serializer {
    fn default() -> Self {
        Self { indent_width: 4 }
    }
}

impl Serializer {
    pub fn new(indent_width: usize) -> Self {
        Self { indent_width }
    }

    pub fn from_config(config: &MdlConfig) -> Self {
        Self::new(config.indent_width)
    }

    fn indent_str(&self, level: usize) -> String {
        " ".repeat(self.indent_width * level)
    }

    /// `name(value)` or `name MOD (value)`, indented by `level`.
    pub fn attribute(&self, attribute: &Attribute, level: usize) -> String {
        let mut output = self.indent_str(level);
        output.push_str(&attribute.name);
        if let Some(modifier) = attribute.modifier {
            output.push(' ');
            output.push_str(modifier.as_str());
            output.push(' ');
        }
        output.push('(');
        output.push_str(&render_value(&attribute.value));
        output.push(')');
        output
    }

    /// Header line, one attribute per line without separators, `);`.
    pub fn component(&self, component: &Component, level: usize) -> String {
        let ind = self.indent_str(level);
        let mut lines = vec![format!("{}{} {} (", ind, component.type_name, component.name)];
        for attribute in &component.attributes {
            lines.push(self.attribute(attribute, level + 1));
        }
        lines.push(format!("{});", ind));
        lines.join("\n")
    }

    pub fn command(&self, command: &Command, level: usize) -> String {
        let ind = self.indent_str(level);
        let mut head = format!("{}{} {} ", ind, command.verb, command.type_name);
        if let Some(guard) = command.existence_guard {
            head.push_str(guard.as_str());
            head.push(' ');
        }
        head.push_str(&command.name);

        match command.verb {
            Verb::Drop => return format!("{};", head),
            Verb::Rename => {
                let target = command.rename_target.as_deref().unwrap_or_default();
                return format!("{} TO {};", head, target);
            }
            _ => {}
        }

        let mut lines = vec![format!("{} (", head)];
        for attribute in command.attributes.iter().flatten() {
            lines.push(format!("{},", self.attribute(attribute, level + 1)));
        }
        for component in command.subcomponents.iter().flatten() {
            lines.push(self.component(component, level + 1));
        }
        for subcommand in command.subcommands.iter().flatten() {
            lines.push(self.command(subcommand, level + 1));
        }
        lines.push(format!("{});", ind));
        lines.join("\n")
    }

    /// Render the result of any entry point so that the same entry point
    /// reads it back.
    pub fn parsed(&self, parsed: &Parsed) -> String {
        match parsed {
            Parsed::AttributeValue(value) => render_value(value),
            Parsed::Attribute(attribute) => self.attribute(attribute, 0),
            Parsed::Attributes(attributes) => attributes
                .iter()
                .map(|a| self.attribute(a, 0))
                .collect::<Vec<_>>()
                .join(",\n"),
            Parsed::Component(component) => self.component(component, 0),
            Parsed::Components(components) => components
                .iter()
                .map(|c| self.component(c, 0))
                .collect::<Vec<_>>()
                .join("\n"),
            Parsed::Command(command) => self.command(command, 0),
        }
    }
}

// ============================================================================
// VALUE RENDERING
// ============================================================================

/// Text between an attribute's parentheses.
pub fn render_value(value: &AttributeValue) -> String {
    match value {
        AttributeValue::Absent => String::new(),
        AttributeValue::List(items) => items
            .iter()
            .map(render_scalar)
            .collect::<Vec<_>>()
            .join(", "),
        scalar => scalar
            .as_scalar()
            .map(|s| render_scalar(&s))
            .unwrap_or_default(),
    }
}

pub fn render_scalar(scalar: &Scalar) -> String {
    match scalar {
        Scalar::Boolean(b) => b.to_string(),
        Scalar::Integer(i) => i.to_string(),
        Scalar::Float(f) => render_float(*f),
        Scalar::Text(s) => render_text(s),
    }
}

fn render_float(f: f64) -> String {
    let text = f.to_string();
    if f.is_finite() && !text.contains('.') {
        format!("{}.0", text)
    } else {
        text
    }
}

fn escape_text(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Quote `s`, one fragment per line: only the first fragment opens a quote
/// and only the last one closes it.
fn render_text(s: &str) -> String {
    let escaped = escape_text(s);
    let lines: Vec<&str> = escaped.split('\n').collect();
    let last = lines.len() - 1;
    lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let open = if i == 0 { "'" } else { "" };
            let close = if i == last { "'" } else { "" };
            format!("{}{}{}", open, line, close)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// ============================================================================
// CONVENIENCE FUNCTIONS
// ============================================================================

pub fn serialize_attribute(attribute: &Attribute) -> String {
    Serializer::default().attribute(attribute, 0)
}

pub fn serialize_component(component: &Component) -> String {
    Serializer::default().component(component, 0)
}

pub fn serialize_command(command: &Command) -> String {
    Serializer::default().command(command, 0)
}

pub fn serialize_parsed(parsed: &Parsed) -> String {
    Serializer::default().parsed(parsed)
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render_value(self))
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&serialize_attribute(self))
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&serialize_component(self))
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&serialize_command(self))
    }
}
