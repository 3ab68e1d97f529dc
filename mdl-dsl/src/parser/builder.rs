//! Tree builder
//!
//! Turns the pieces recognized by the grammar into [`Attribute`],
//! [`Component`] and [`Command`] values. The parser decides *what* it saw;
//! the builder decides how that maps onto the tree and guards the
//! invariants the grammar is supposed to uphold.

use super::ast::*;
use super::error::{ParseError, ParseResult};

// ============================================================================
// SCALARS
// ============================================================================

/// Fold the scalars found between parentheses into one value.
pub fn build_value(mut scalars: Vec<Scalar>) -> AttributeValue {
    match scalars.len() {
        0 => AttributeValue::Absent,
        1 => scalars.remove(0).into(),
        _ => AttributeValue::List(scalars),
    }
}

/// Integer unless the literal has a decimal point.
pub fn build_number(literal: &str) -> Result<Scalar, String> {
    if literal.contains('.') {
        match literal.parse::<f64>() {
            Ok(f) if f.is_finite() => Ok(Scalar::Float(f)),
            Ok(_) => Err(format!("decimal literal {} is out of range", literal)),
            Err(e) => Err(format!("invalid decimal literal {}: {}", literal, e)),
        }
    } else {
        literal
            .parse::<i64>()
            .map(Scalar::Integer)
            .map_err(|e| format!("invalid integer literal {}: {}", literal, e))
    }
}

/// Concatenate the fragments of a string literal that spans several lines.
pub fn build_text(fragments: &[String]) -> String {
    fragments.join("\n")
}

/// Normalize a guard phrase (`IF NOT EXISTS`, `if_not_exists`, ...).
pub fn build_guard(phrase: &str) -> ParseResult<ExistenceGuard> {
    phrase
        .parse::<ExistenceGuard>()
        .map_err(|detail| ParseError::Unreachable {
            rule: "logical_operator".to_string(),
            detail,
        })
}

// ============================================================================
// COMMAND BODIES
// ============================================================================

/// One run of same-kind items inside a command body.
#[derive(Debug, Clone, PartialEq)]
pub enum BodyGroup {
    Attributes(Vec<Attribute>),
    Components(Vec<Component>),
    Commands(Vec<Command>),
}

impl BodyGroup {
    fn rank(&self) -> u8 {
        match self {
            BodyGroup::Attributes(_) => 0,
            BodyGroup::Components(_) => 1,
            BodyGroup::Commands(_) => 2,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            BodyGroup::Attributes(_) => "attributes",
            BodyGroup::Components(_) => "components",
            BodyGroup::Commands(_) => "commands",
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            BodyGroup::Attributes(v) => v.is_empty(),
            BodyGroup::Components(v) => v.is_empty(),
            BodyGroup::Commands(v) => v.is_empty(),
        }
    }
}

/// The slots of a command body after assignment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Body {
    pub attributes: Option<Vec<Attribute>>,
    pub subcomponents: Option<Vec<Component>>,
    pub subcommands: Option<Vec<Command>>,
}

/// Assign body groups to their slots.
///
/// Groups must be non-empty and arrive in canonical order (attributes, then
/// components, then commands) with each kind at most once. Anything else
/// means the grammar produced a shape it should not have.
pub fn assign_body(rule: &str, groups: Vec<BodyGroup>) -> ParseResult<Body> {
    let mut body = Body::default();
    let mut next_rank = 0u8;

    for group in groups {
        if group.is_empty() || group.rank() < next_rank {
            return Err(ParseError::Unreachable {
                rule: rule.to_string(),
                detail: format!("unexpected {} group in command body", group.label()),
            });
        }
        next_rank = group.rank() + 1;

        match group {
            BodyGroup::Attributes(attrs) => body.attributes = Some(attrs),
            BodyGroup::Components(comps) => body.subcomponents = Some(comps),
            BodyGroup::Commands(cmds) => body.subcommands = Some(cmds),
        }
    }

    if body.attributes.is_none() && body.subcomponents.is_none() && body.subcommands.is_none() {
        body.attributes = Some(Vec::new());
    }

    Ok(body)
}

/// Header of a command as read from source.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandHead {
    pub verb: Verb,
    pub type_name: String,
    pub name: String,
    pub guard: Option<ExistenceGuard>,
}

/// Build a command with a parenthesized body.
pub fn build_block_command(head: CommandHead, groups: Vec<BodyGroup>) -> ParseResult<Command> {
    let rule = format!("{}_command", head.verb.as_str().to_lowercase());
    if !head.verb.has_body() {
        return Err(ParseError::Unreachable {
            rule,
            detail: "verb takes no body".to_string(),
        });
    }

    let body = assign_body(&rule, groups)?;
    if let Some(cmds) = &body.subcommands {
        if head.verb != Verb::Alter || cmds.iter().any(|c| !c.verb.is_alter_subcommand()) {
            return Err(ParseError::Unreachable {
                rule,
                detail: "subcommands outside an ALTER body".to_string(),
            });
        }
    }

    tracing::trace!(verb = %head.verb, type_name = %head.type_name, "built command");

    Ok(Command {
        verb: head.verb,
        type_name: head.type_name,
        name: head.name,
        existence_guard: head.guard,
        attributes: body.attributes,
        subcomponents: body.subcomponents,
        subcommands: body.subcommands,
        rename_target: None,
    })
}

/// Build a DROP or RENAME command.
pub fn build_line_command(head: CommandHead, rename_target: Option<String>) -> ParseResult<Command> {
    let rule = format!("{}_command", head.verb.as_str().to_lowercase());
    match (head.verb, &rename_target) {
        (Verb::Drop, None) | (Verb::Rename, Some(_)) => Ok(Command {
            verb: head.verb,
            type_name: head.type_name,
            name: head.name,
            existence_guard: head.guard,
            attributes: None,
            subcomponents: None,
            subcommands: None,
            rename_target,
        }),
        _ => Err(ParseError::Unreachable {
            rule,
            detail: "rename target does not match verb".to_string(),
        }),
    }
}
