//! Abstract Syntax Tree types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ============================================================================
// ATTRIBUTE VALUES
// ============================================================================

/// One literal inside an attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Scalar {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    /// Name of the literal kind, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Scalar::Boolean(_) => "Boolean",
            Scalar::Integer(_) => "Integer",
            Scalar::Float(_) => "Float",
            Scalar::Text(_) => "Text",
        }
    }

    pub fn same_kind(&self, other: &Scalar) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

/// The value carried between an attribute's parentheses.
///
/// Lists hold two or more scalars of a single kind; a list can never hold
/// another list.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum AttributeValue {
    #[default]
    Absent,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    List(Vec<Scalar>),
}

impl AttributeValue {
    pub fn is_absent(&self) -> bool {
        matches!(self, AttributeValue::Absent)
    }

    /// The value as a single scalar, if it is one.
    pub fn as_scalar(&self) -> Option<Scalar> {
        match self {
            AttributeValue::Boolean(b) => Some(Scalar::Boolean(*b)),
            AttributeValue::Integer(i) => Some(Scalar::Integer(*i)),
            AttributeValue::Float(f) => Some(Scalar::Float(*f)),
            AttributeValue::Text(s) => Some(Scalar::Text(s.clone())),
            AttributeValue::Absent | AttributeValue::List(_) => None,
        }
    }

    /// Every scalar in the value: none for `Absent`, one for a scalar, all
    /// elements of a list.
    pub fn elements(&self) -> Vec<Scalar> {
        match self {
            AttributeValue::Absent => Vec::new(),
            AttributeValue::List(items) => items.clone(),
            other => other.as_scalar().into_iter().collect(),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            AttributeValue::Absent => "Absent",
            AttributeValue::List(_) => "List",
            AttributeValue::Boolean(_) => "Boolean",
            AttributeValue::Integer(_) => "Integer",
            AttributeValue::Float(_) => "Float",
            AttributeValue::Text(_) => "Text",
        }
    }
}

impl From<Scalar> for AttributeValue {
    fn from(scalar: Scalar) -> Self {
        match scalar {
            Scalar::Boolean(b) => AttributeValue::Boolean(b),
            Scalar::Integer(i) => AttributeValue::Integer(i),
            Scalar::Float(f) => AttributeValue::Float(f),
            Scalar::Text(s) => AttributeValue::Text(s),
        }
    }
}

// ============================================================================
// KEYWORD ENUMS
// ============================================================================

/// `ADD` / `DROP` marker on an attribute inside an ALTER body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Modifier {
    Add,
    Drop,
}

impl Modifier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Modifier::Add => "ADD",
            Modifier::Drop => "DROP",
        }
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Command verbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verb {
    Create,
    Recreate,
    Drop,
    Rename,
    Alter,
    Add,
    Modify,
}

impl Verb {
    pub const ALL: [Verb; 7] = [
        Verb::Create,
        Verb::Recreate,
        Verb::Drop,
        Verb::Rename,
        Verb::Alter,
        Verb::Add,
        Verb::Modify,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Create => "CREATE",
            Verb::Recreate => "RECREATE",
            Verb::Drop => "DROP",
            Verb::Rename => "RENAME",
            Verb::Alter => "ALTER",
            Verb::Add => "ADD",
            Verb::Modify => "MODIFY",
        }
    }

    /// DROP and RENAME are single-line commands without a body.
    pub fn has_body(&self) -> bool {
        !matches!(self, Verb::Drop | Verb::Rename)
    }

    /// Verbs allowed as subcommands of an ALTER.
    pub fn is_alter_subcommand(&self) -> bool {
        matches!(self, Verb::Add | Verb::Drop | Verb::Modify | Verb::Rename)
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `IF EXISTS` / `IF NOT EXISTS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExistenceGuard {
    IfExists,
    IfNotExists,
}

impl ExistenceGuard {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExistenceGuard::IfExists => "IF EXISTS",
            ExistenceGuard::IfNotExists => "IF NOT EXISTS",
        }
    }
}

impl fmt::Display for ExistenceGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts `IF EXISTS`, `if_not_exists` and similar spellings.
impl FromStr for ExistenceGuard {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace('_', " ").to_uppercase();
        match normalized.split_whitespace().collect::<Vec<_>>().join(" ").as_str() {
            "IF EXISTS" => Ok(ExistenceGuard::IfExists),
            "IF NOT EXISTS" => Ok(ExistenceGuard::IfNotExists),
            _ => Err(format!("unknown existence guard: {}", s)),
        }
    }
}

// ============================================================================
// AST TYPES
// ============================================================================

/// `name(value)`, optionally `name ADD (value)` inside an ALTER.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub value: AttributeValue,
    pub modifier: Option<Modifier>,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: AttributeValue) -> Self {
        Self {
            name: name.into(),
            value,
            modifier: None,
        }
    }

    pub fn with_modifier(mut self, modifier: Modifier) -> Self {
        self.modifier = Some(modifier);
        self
    }

    /// Whether `other` is this attribute's value, one of its list elements,
    /// or a list whose elements all appear in this attribute's list.
    pub fn contains_value(&self, other: &AttributeValue) -> bool {
        if *other == self.value {
            return true;
        }
        match (&self.value, other) {
            (AttributeValue::List(mine), AttributeValue::List(theirs)) => {
                theirs.iter().all(|item| mine.contains(item))
            }
            (AttributeValue::List(mine), scalar) => scalar
                .as_scalar()
                .map(|s| mine.contains(&s))
                .unwrap_or(false),
            _ => false,
        }
    }
}

/// One instance of a component type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub type_name: String,
    pub name: String,
    pub attributes: Vec<Attribute>,
}

impl Component {
    pub fn new(
        type_name: impl Into<String>,
        name: impl Into<String>,
        attributes: Vec<Attribute>,
    ) -> Self {
        Self {
            type_name: type_name.into(),
            name: name.into(),
            attributes,
        }
    }

    pub fn contains_attribute(&self, attribute: &Attribute) -> bool {
        self.attributes.contains(attribute)
    }
}

/// Rejected attempt to build a command with an impossible shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandShapeError {
    #[error("{verb} commands carry no body")]
    BodylessVerb { verb: Verb },

    #[error("only ALTER commands may nest subcommands, got {verb}")]
    SubcommandsOutsideAlter { verb: Verb },

    #[error("{verb} is not allowed inside an ALTER body")]
    InvalidSubcommand { verb: Verb },
}

/// A mutation directive over a component.
///
/// `rename_target` is set only for RENAME. `attributes`, `subcomponents` and
/// `subcommands` are all `None` exactly for DROP and RENAME.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    pub verb: Verb,
    pub type_name: String,
    pub name: String,
    pub existence_guard: Option<ExistenceGuard>,
    pub attributes: Option<Vec<Attribute>>,
    pub subcomponents: Option<Vec<Component>>,
    pub subcommands: Option<Vec<Command>>,
    pub rename_target: Option<String>,
}

impl Command {
    pub fn drop(type_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            verb: Verb::Drop,
            type_name: type_name.into(),
            name: name.into(),
            existence_guard: None,
            attributes: None,
            subcomponents: None,
            subcommands: None,
            rename_target: None,
        }
    }

    pub fn rename(
        type_name: impl Into<String>,
        name: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            verb: Verb::Rename,
            rename_target: Some(target.into()),
            ..Self::drop(type_name, name)
        }
    }

    /// A command with a parenthesized body.
    ///
    /// Empty groups are stored as `None`, except that a body with no groups
    /// at all keeps an empty attribute list.
    pub fn block(
        verb: Verb,
        type_name: impl Into<String>,
        name: impl Into<String>,
        attributes: Vec<Attribute>,
        subcomponents: Vec<Component>,
        subcommands: Vec<Command>,
    ) -> Result<Self, CommandShapeError> {
        if !verb.has_body() {
            return Err(CommandShapeError::BodylessVerb { verb });
        }
        if !subcommands.is_empty() {
            if verb != Verb::Alter {
                return Err(CommandShapeError::SubcommandsOutsideAlter { verb });
            }
            if let Some(bad) = subcommands.iter().find(|c| !c.verb.is_alter_subcommand()) {
                return Err(CommandShapeError::InvalidSubcommand { verb: bad.verb });
            }
        }

        let keep_attributes = !attributes.is_empty()
            || (subcomponents.is_empty() && subcommands.is_empty());

        Ok(Self {
            verb,
            type_name: type_name.into(),
            name: name.into(),
            existence_guard: None,
            attributes: keep_attributes.then_some(attributes),
            subcomponents: (!subcomponents.is_empty()).then_some(subcomponents),
            subcommands: (!subcommands.is_empty()).then_some(subcommands),
            rename_target: None,
        })
    }

    pub fn with_guard(mut self, guard: ExistenceGuard) -> Self {
        self.existence_guard = Some(guard);
        self
    }

    pub fn contains_attribute(&self, attribute: &Attribute) -> bool {
        self.attributes
            .as_ref()
            .map(|attrs| attrs.contains(attribute))
            .unwrap_or(false)
    }

    pub fn contains_component(&self, component: &Component) -> bool {
        self.subcomponents
            .as_ref()
            .map(|comps| comps.contains(component))
            .unwrap_or(false)
    }

    pub fn contains_command(&self, command: &Command) -> bool {
        self.subcommands
            .as_ref()
            .map(|cmds| cmds.contains(command))
            .unwrap_or(false)
    }
}
