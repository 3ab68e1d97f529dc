//! Schema-driven validator
//!
//! Walks a [`Command`] tree alongside the [`SchemaModel`]. A top-level command
//! is resolved against the schema's top-level types; every nested component
//! or command is resolved against the `subcomponents` of the node above it.
//! Violations are reported in source order.

use crate::config::{MdlConfig, ValidationMode};
use crate::descriptor::{DescriptorCache, Violation};
use crate::parser::{Attribute, Command, Component};
use crate::schema::{SchemaModel, SchemaNode};
use crate::serializer::render_value;
use thiserror::Error;

// ============================================================================
// ERRORS
// ============================================================================

fn quoted_list(items: &[String]) -> String {
    items
        .iter()
        .map(|i| format!("'{}'", i))
        .collect::<Vec<_>>()
        .join(", ")
}

fn unknown_component_message(type_name: &str, parent: &Option<String>, allowed: &[String]) -> String {
    match parent {
        Some(parent) => format!(
            "Component type '{}' is not allowed under component type '{}'. Options are: {}.",
            type_name,
            parent,
            quoted_list(allowed)
        ),
        None => format!(
            "Component type '{}' does not exist. Options are: {}.",
            type_name,
            quoted_list(allowed)
        ),
    }
}

/// A document that does not satisfy the schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{}", unknown_component_message(.type_name, .parent, .allowed))]
    UnknownComponentType {
        type_name: String,
        parent: Option<String>,
        allowed: Vec<String>,
    },

    #[error(
        "Attribute name '{attribute}' is not allowed under component type '{component_type}'. Options are: {}.",
        quoted_list(.allowed)
    )]
    UnknownAttribute {
        attribute: String,
        component_type: String,
        allowed: Vec<String>,
    },

    #[error("Attribute '{attribute}' of '{component_type}' ought to be {expected}. Got {actual}.")]
    AttributeTypeMismatch {
        attribute: String,
        component_type: String,
        expected: String,
        actual: String,
    },

    #[error(
        "Attribute '{attribute}' of '{component_type}' is an enum with allowed values {}. Got {actual}.",
        quoted_list(.allowed)
    )]
    AttributeEnumViolation {
        attribute: String,
        component_type: String,
        allowed: Vec<String>,
        actual: String,
    },

    #[error("Attribute '{attribute}' of '{component_type}' is constrained to {constraint} {bound}. Got {actual}.")]
    AttributeConstraintViolation {
        attribute: String,
        component_type: String,
        constraint: String,
        bound: String,
        actual: String,
    },

    /// The schema's descriptor text could not be interpreted.
    #[error("unsupported type descriptor for attribute '{attribute}' of '{component_type}': {type_data:?} (value {value})")]
    UnsupportedDescriptor {
        attribute: String,
        component_type: String,
        type_data: String,
        value: String,
    },
}

impl ValidationError {
    /// Faults in the schema rather than in the document.
    pub fn is_internal(&self) -> bool {
        matches!(self, ValidationError::UnsupportedDescriptor { .. })
    }

    fn from_violation(violation: Violation, attribute: &str, component_type: &str) -> Self {
        let attribute = attribute.to_string();
        let component_type = component_type.to_string();
        match violation {
            Violation::TypeMismatch { expected, actual } => ValidationError::AttributeTypeMismatch {
                attribute,
                component_type,
                expected,
                actual,
            },
            Violation::EnumViolation { allowed, actual } => ValidationError::AttributeEnumViolation {
                attribute,
                component_type,
                allowed,
                actual,
            },
            Violation::ConstraintViolation {
                constraint,
                bound,
                actual,
            } => ValidationError::AttributeConstraintViolation {
                attribute,
                component_type,
                constraint: constraint.to_string(),
                bound,
                actual,
            },
        }
    }
}

/// Result type for validation.
pub type ValidationResult<T> = Result<T, ValidationError>;

// ============================================================================
// VALIDATOR
// ============================================================================

/// Signals the walk to stop early.
struct Halt;

struct Sink {
    mode: ValidationMode,
    errors: Vec<ValidationError>,
}

impl Sink {
    fn new(mode: ValidationMode) -> Self {
        Self {
            mode,
            errors: Vec::new(),
        }
    }

    fn report(&mut self, error: ValidationError) -> Result<(), Halt> {
        tracing::debug!(error = %error, "validation failure");
        self.errors.push(error);
        match self.mode {
            ValidationMode::FailFast => Err(Halt),
            ValidationMode::CollectAll => Ok(()),
        }
    }
}

enum Scope<'a> {
    Root,
    Node {
        node: &'a SchemaNode,
        type_name: &'a str,
    },
}

/// Validates commands against one schema.
///
/// Descriptors are memoized per validator, so reuse one instance across
/// documents. `&Validator` is `Sync`.
pub struct Validator<'s> {
    schema: &'s SchemaModel,
    cache: DescriptorCache,
    mode: ValidationMode,
}

impl<'s> Validator<'s> {
    pub fn new(schema: &'s SchemaModel) -> Self {
        Self {
            schema,
            cache: DescriptorCache::new(),
            mode: ValidationMode::default(),
        }
    }

    pub fn from_config(schema: &'s SchemaModel, config: &MdlConfig) -> Self {
        Self::new(schema).with_mode(config.validation_mode)
    }

    pub fn with_mode(mut self, mode: ValidationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> ValidationMode {
        self.mode
    }

    pub fn schema(&self) -> &'s SchemaModel {
        self.schema
    }

    /// Succeeds only if every attribute at every level passes; otherwise
    /// returns the first violation in source order.
    pub fn validate(&self, command: &Command) -> ValidationResult<()> {
        let mut sink = Sink::new(ValidationMode::FailFast);
        let _ = self.walk_command(command, Scope::Root, &mut sink);
        match sink.errors.into_iter().next() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    /// Every violation in the tree, in source order.
    pub fn collect_violations(&self, command: &Command) -> Vec<ValidationError> {
        let mut sink = Sink::new(ValidationMode::CollectAll);
        let _ = self.walk_command(command, Scope::Root, &mut sink);
        sink.errors
    }

    /// Validate using this validator's configured mode.
    pub fn run(&self, command: &Command) -> Result<(), Vec<ValidationError>> {
        let violations = match self.mode {
            ValidationMode::FailFast => self.validate(command).err().into_iter().collect(),
            ValidationMode::CollectAll => self.collect_violations(command),
        };
        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }

    /// Check one attribute against the schema node of its component.
    pub fn validate_attribute(
        &self,
        attribute: &Attribute,
        node: &SchemaNode,
        component_type: &str,
    ) -> ValidationResult<()> {
        let Some(attribute_schema) = node.attribute(&attribute.name) else {
            return Err(ValidationError::UnknownAttribute {
                attribute: attribute.name.clone(),
                component_type: component_type.to_string(),
                allowed: node.attribute_names(),
            });
        };
        if attribute.value.is_absent() {
            return Ok(());
        }

        let descriptor = self
            .cache
            .get_or_parse(&attribute_schema.type_data, self.schema)
            .map_err(|_| ValidationError::UnsupportedDescriptor {
                attribute: attribute.name.clone(),
                component_type: component_type.to_string(),
                type_data: attribute_schema.type_data.clone(),
                value: render_value(&attribute.value),
            })?;

        descriptor
            .check(&attribute.value)
            .map_err(|v| ValidationError::from_violation(v, &attribute.name, component_type))
    }

    fn walk_command(&self, command: &Command, scope: Scope<'_>, sink: &mut Sink) -> Result<(), Halt> {
        let node = match scope {
            Scope::Root => match self.schema.get(&command.type_name) {
                Some(node) => node,
                None => {
                    return sink.report(ValidationError::UnknownComponentType {
                        type_name: command.type_name.clone(),
                        parent: None,
                        allowed: self.schema.top_level_names(),
                    })
                }
            },
            Scope::Node { node, type_name } => match node.subcomponent(&command.type_name) {
                Some(child) => child,
                None => {
                    return sink.report(ValidationError::UnknownComponentType {
                        type_name: command.type_name.clone(),
                        parent: Some(type_name.to_string()),
                        allowed: node.subcomponent_names(),
                    })
                }
            },
        };

        for attribute in command.attributes.iter().flatten() {
            self.walk_attribute(attribute, node, &command.type_name, sink)?;
        }
        for component in command.subcomponents.iter().flatten() {
            self.walk_component(component, node, &command.type_name, sink)?;
        }
        for subcommand in command.subcommands.iter().flatten() {
            let scope = Scope::Node {
                node,
                type_name: &command.type_name,
            };
            self.walk_command(subcommand, scope, sink)?;
        }
        Ok(())
    }

    fn walk_component(
        &self,
        component: &Component,
        parent: &SchemaNode,
        parent_type: &str,
        sink: &mut Sink,
    ) -> Result<(), Halt> {
        let Some(node) = parent.subcomponent(&component.type_name) else {
            return sink.report(ValidationError::UnknownComponentType {
                type_name: component.type_name.clone(),
                parent: Some(parent_type.to_string()),
                allowed: parent.subcomponent_names(),
            });
        };

        for attribute in &component.attributes {
            self.walk_attribute(attribute, node, &component.type_name, sink)?;
        }
        Ok(())
    }

    fn walk_attribute(
        &self,
        attribute: &Attribute,
        node: &SchemaNode,
        component_type: &str,
        sink: &mut Sink,
    ) -> Result<(), Halt> {
        match self.validate_attribute(attribute, node, component_type) {
            Ok(()) => Ok(()),
            Err(error) => sink.report(error),
        }
    }
}

// ============================================================================
// CONVENIENCE FUNCTIONS
// ============================================================================

/// First violation of `command` against `schema`, if any.
pub fn validate(command: &Command, schema: &SchemaModel) -> ValidationResult<()> {
    Validator::new(schema).validate(command)
}

/// Validate with the reporting mode taken from `config`.
pub fn validate_with_config(
    command: &Command,
    schema: &SchemaModel,
    config: &MdlConfig,
) -> Result<(), Vec<ValidationError>> {
    Validator::from_config(schema, config).run(command)
}
