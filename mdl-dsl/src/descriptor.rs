//! Type-Descriptor Interpreter
//!
//! Schema attributes carry a free-text description of their type, e.g.
//!
//! ```text
//! Type : String
//! Maximum length : 40
//! Allows multiple values
//! ```
//!
//! [`TypeDescriptor::parse`] turns that text into a structured descriptor
//! once; [`TypeDescriptor::check`] then decides whether an attribute value
//! satisfies it.

use crate::parser::{AttributeValue, Scalar};
use crate::schema::SchemaModel;
use crate::serializer::{render_scalar, render_value};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::{Arc, RwLock};
use thiserror::Error;

// ============================================================================
// PATTERNS
// ============================================================================

static TYPE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bType[ \t]*:[ \t]*([A-Za-z_][A-Za-z0-9_]*)").expect("Invalid type regex"));
static ENUM_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Allowed values[ \t]*:[ \t]*(.*)").expect("Invalid enum regex"));
static MULTI_VALUE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Allows multiple values").expect("Invalid multi-value regex"));
static MAX_LEN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Maximum length[ \t]*:[ \t]*(\S+)").expect("Invalid max length regex"));
static MIN_VAL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Minimum value[ \t]*:[ \t]*(\S+)").expect("Invalid min value regex"));
static MAX_VAL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Maximum value[ \t]*:[ \t]*(\S+)").expect("Invalid max value regex"));
static GENERIC_REFERENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z][a-z]+\.").expect("Invalid reference regex"));

/// Type names that mean "a reference to some component" without naming it.
pub const GENERIC_REFERENCE_MARKERS: [&str; 3] =
    ["ComponentReference", "SubcomponentReference", "Subcomponent"];

// ============================================================================
// DESCRIPTOR TYPES
// ============================================================================

/// Descriptor text the interpreter cannot classify at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    #[error("type descriptor has no 'Type :' label: {type_data:?}")]
    MissingTypeLabel { type_data: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Primitive {
    String,
    Boolean,
    Number,
    Enum(BTreeSet<String>),
    /// `None` accepts a reference to any component type.
    ComponentReference(Option<String>),
    /// Unrecognized type name; any value passes.
    Unconstrained,
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Primitive::String => write!(f, "String"),
            Primitive::Boolean => write!(f, "Boolean"),
            Primitive::Number => write!(f, "Number"),
            Primitive::Enum(_) => write!(f, "Enum"),
            Primitive::ComponentReference(Some(target)) => write!(f, "reference to {}", target),
            Primitive::ComponentReference(None) => write!(f, "component reference"),
            Primitive::Unconstrained => write!(f, "any value"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Multiplicity {
    Single,
    Multi,
}

/// Structured form of a type-descriptor text.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDescriptor {
    /// Type name as written after `Type :`.
    pub type_name: String,
    pub primitive: Primitive,
    pub multiplicity: Multiplicity,
    pub length_max: Option<i64>,
    pub value_min: Option<f64>,
    pub value_max: Option<f64>,
}

/// How a value fails a descriptor.
#[derive(Debug, Clone, PartialEq)]
pub enum Violation {
    TypeMismatch { expected: String, actual: String },
    EnumViolation { allowed: Vec<String>, actual: String },
    ConstraintViolation {
        constraint: &'static str,
        bound: String,
        actual: String,
    },
}

fn primitive_for(type_name: &str) -> Option<Primitive> {
    match type_name {
        "String" | "LongString" | "XMLString" | "Enum" => Some(Primitive::String),
        "Boolean" => Some(Primitive::Boolean),
        "Number" => Some(Primitive::Number),
        _ => None,
    }
}

fn capture<'t>(pattern: &Regex, text: &'t str) -> Option<&'t str> {
    pattern
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim())
}

fn parse_bound<T: std::str::FromStr>(pattern: &Regex, label: &str, text: &str) -> Option<T> {
    let raw = capture(pattern, text)?;
    match raw.parse::<T>() {
        Ok(bound) => Some(bound),
        Err(_) => {
            tracing::warn!(label, raw, "ignoring unparseable bound in type descriptor");
            None
        }
    }
}

impl TypeDescriptor {
    /// Interpret descriptor text. `schema` resolves type names that refer to
    /// other component types.
    pub fn parse(type_data: &str, schema: &SchemaModel) -> Result<Self, DescriptorError> {
        let type_name = capture(&TYPE_PATTERN, type_data)
            .ok_or_else(|| DescriptorError::MissingTypeLabel {
                type_data: type_data.to_string(),
            })?
            .to_string();

        let allowed: Option<BTreeSet<String>> = capture(&ENUM_PATTERN, type_data).map(|list| {
            list.split('|')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect::<BTreeSet<String>>()
        })
        .filter(|values| !values.is_empty());
        let multiplicity = if MULTI_VALUE_PATTERN.is_match(type_data) {
            Multiplicity::Multi
        } else {
            Multiplicity::Single
        };

        let mut descriptor = TypeDescriptor {
            type_name: type_name.clone(),
            primitive: Primitive::Unconstrained,
            multiplicity,
            length_max: None,
            value_min: None,
            value_max: None,
        };

        match (primitive_for(&type_name), allowed) {
            (Some(_), Some(values)) => descriptor.primitive = Primitive::Enum(values),
            (Some(primitive), None) => {
                descriptor.primitive = primitive;
                if multiplicity == Multiplicity::Single {
                    descriptor.length_max = parse_bound(&MAX_LEN_PATTERN, "Maximum length", type_data);
                    descriptor.value_min = parse_bound(&MIN_VAL_PATTERN, "Minimum value", type_data);
                    descriptor.value_max = parse_bound(&MAX_VAL_PATTERN, "Maximum value", type_data);
                }
            }
            (None, _) if schema.is_known_type(&type_name) => {
                descriptor.primitive = Primitive::ComponentReference(Some(type_name));
            }
            (None, _) if GENERIC_REFERENCE_MARKERS.contains(&type_name.as_str()) => {
                descriptor.primitive = Primitive::ComponentReference(None);
            }
            (None, _) => {
                tracing::debug!(type_name = %descriptor.type_name, "unsupported type descriptor, accepting any value");
            }
        }

        Ok(descriptor)
    }

    pub fn is_multi(&self) -> bool {
        self.multiplicity == Multiplicity::Multi
    }

    pub fn has_bounds(&self) -> bool {
        self.length_max.is_some() || self.value_min.is_some() || self.value_max.is_some()
    }

    fn expected_shape(&self) -> String {
        match self.multiplicity {
            Multiplicity::Single => self.primitive.to_string(),
            Multiplicity::Multi => format!("one or more of {}", self.primitive),
        }
    }

    /// Check `value` against this descriptor. `Absent` always passes.
    pub fn check(&self, value: &AttributeValue) -> Result<(), Violation> {
        if value.is_absent() || self.primitive == Primitive::Unconstrained {
            return Ok(());
        }
        if self.multiplicity == Multiplicity::Single && matches!(value, AttributeValue::List(_)) {
            return Err(Violation::TypeMismatch {
                expected: self.expected_shape(),
                actual: format!("list ({})", render_value(value)),
            });
        }

        for element in value.elements() {
            self.check_element(&element)?;
        }

        if let Some(scalar) = value.as_scalar() {
            self.check_bounds(&scalar)?;
        }
        Ok(())
    }

    fn check_element(&self, element: &Scalar) -> Result<(), Violation> {
        let mismatch = || Violation::TypeMismatch {
            expected: self.expected_shape(),
            actual: format!("{} {}", element.kind_name(), render_scalar(element)),
        };

        match (&self.primitive, element) {
            (Primitive::Unconstrained, _) => Ok(()),
            (Primitive::String, Scalar::Text(_)) => Ok(()),
            (Primitive::Boolean, Scalar::Boolean(_)) => Ok(()),
            (Primitive::Number, Scalar::Integer(_) | Scalar::Float(_)) => Ok(()),
            (Primitive::Enum(allowed), _) => {
                let literal = match element {
                    Scalar::Text(s) => s.clone(),
                    other => render_scalar(other),
                };
                if allowed.contains(&literal) {
                    Ok(())
                } else {
                    Err(Violation::EnumViolation {
                        allowed: allowed.iter().cloned().collect(),
                        actual: render_scalar(element),
                    })
                }
            }
            (Primitive::ComponentReference(target), Scalar::Text(s)) => {
                let ok = match target {
                    Some(t) => s.strip_prefix(t.as_str()).map_or(false, |rest| rest.starts_with('.')),
                    None => GENERIC_REFERENCE.is_match(s),
                };
                if ok {
                    Ok(())
                } else {
                    Err(mismatch())
                }
            }
            _ => Err(mismatch()),
        }
    }

    fn check_bounds(&self, scalar: &Scalar) -> Result<(), Violation> {
        if let (Some(max), Scalar::Text(s)) = (self.length_max, scalar) {
            let len = s.chars().count() as i64;
            if len > max {
                return Err(Violation::ConstraintViolation {
                    constraint: "maximum length",
                    bound: max.to_string(),
                    actual: format!("{} (length {})", render_scalar(scalar), len),
                });
            }
        }

        let number = match scalar {
            Scalar::Integer(i) => Some(*i as f64),
            Scalar::Float(f) => Some(*f),
            _ => None,
        };
        if let Some(n) = number {
            if let Some(min) = self.value_min.filter(|min| n < *min) {
                return Err(Violation::ConstraintViolation {
                    constraint: "minimum value",
                    bound: min.to_string(),
                    actual: render_scalar(scalar),
                });
            }
            if let Some(max) = self.value_max.filter(|max| n > *max) {
                return Err(Violation::ConstraintViolation {
                    constraint: "maximum value",
                    bound: max.to_string(),
                    actual: render_scalar(scalar),
                });
            }
        }
        Ok(())
    }
}

// ============================================================================
// CACHE
// ============================================================================

/// Memoizes descriptors by their text. Safe to share between threads.
#[derive(Debug, Default)]
pub struct DescriptorCache {
    entries: RwLock<HashMap<String, Arc<TypeDescriptor>>>,
}

impl DescriptorCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_parse(
        &self,
        type_data: &str,
        schema: &SchemaModel,
    ) -> Result<Arc<TypeDescriptor>, DescriptorError> {
        if let Ok(entries) = self.entries.read() {
            if let Some(hit) = entries.get(type_data) {
                return Ok(Arc::clone(hit));
            }
        }

        tracing::trace!(type_data, "descriptor cache miss");
        let descriptor = Arc::new(TypeDescriptor::parse(type_data, schema)?);
        if let Ok(mut entries) = self.entries.write() {
            entries
                .entry(type_data.to_string())
                .or_insert_with(|| Arc::clone(&descriptor));
        }
        Ok(descriptor)
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> SchemaModel {
        SchemaModel::from_json_str(
            r#"{ "Object": { "subcomponents": { "Field": {} } }, "Picklist": {} }"#,
        )
        .unwrap_or_default()
    }

    fn parse(text: &str) -> TypeDescriptor {
        match TypeDescriptor::parse(text, &schema()) {
            Ok(d) => d,
            Err(e) => panic!("descriptor {:?} failed: {}", text, e),
        }
    }

    fn text(s: &str) -> AttributeValue {
        AttributeValue::Text(s.to_string())
    }

    #[test]
    fn test_plain_primitives() {
        assert_eq!(parse("Type : String").primitive, Primitive::String);
        assert_eq!(parse("Type : LongString").primitive, Primitive::String);
        assert_eq!(parse("Type : XMLString").primitive, Primitive::String);
        assert_eq!(parse("Type : Boolean").primitive, Primitive::Boolean);
        assert_eq!(parse("Type : Number").primitive, Primitive::Number);
        assert_eq!(parse("Type : Number").multiplicity, Multiplicity::Single);
    }

    #[test]
    fn test_enum_ignores_primitive() {
        let d = parse("Type : String\nAllowed values : red|green||blue\nAllows multiple values");
        let expected: BTreeSet<String> =
            ["red", "green", "blue"].iter().map(|s| s.to_string()).collect();
        assert_eq!(d.primitive, Primitive::Enum(expected));
        assert!(d.is_multi());
        assert!(!d.has_bounds());
    }

    #[test]
    fn test_bounds_only_on_single_values() {
        let d = parse("Type : String\nMaximum length : 10");
        assert_eq!(d.length_max, Some(10));

        let d = parse("Type : Number\nMinimum value : 1\nMaximum value : 5.5");
        assert_eq!((d.value_min, d.value_max), (Some(1.0), Some(5.5)));

        let d = parse("Type : String\nAllows multiple values\nMaximum length : 10");
        assert!(!d.has_bounds());
    }

    #[test]
    fn test_unparseable_bound_is_ignored() {
        let d = parse("Type : String\nMaximum length : lots");
        assert_eq!(d.length_max, None);
    }

    #[test]
    fn test_references() {
        assert_eq!(
            parse("Type : Picklist").primitive,
            Primitive::ComponentReference(Some("Picklist".to_string()))
        );
        assert_eq!(
            parse("Type : Field\nAllows multiple values").primitive,
            Primitive::ComponentReference(Some("Field".to_string()))
        );
        for marker in GENERIC_REFERENCE_MARKERS {
            assert_eq!(
                parse(&format!("Type : {}", marker)).primitive,
                Primitive::ComponentReference(None)
            );
        }
    }

    #[test]
    fn test_unknown_type_is_unconstrained() {
        let d = parse("Type : Mystery");
        assert_eq!(d.primitive, Primitive::Unconstrained);
        assert_eq!(d.check(&AttributeValue::Integer(3)), Ok(()));
    }

    #[test]
    fn test_missing_type_label() {
        assert!(matches!(
            TypeDescriptor::parse("Maximum length : 4", &schema()),
            Err(DescriptorError::MissingTypeLabel { .. })
        ));
    }

    #[test]
    fn test_absent_always_passes() {
        for text_ in ["Type : Boolean", "Type : String\nAllowed values : a", "Type : Picklist"] {
            assert_eq!(parse(text_).check(&AttributeValue::Absent), Ok(()));
        }
    }

    #[test]
    fn test_primitive_checks() {
        assert_eq!(parse("Type : Boolean").check(&AttributeValue::Boolean(true)), Ok(()));
        assert!(matches!(
            parse("Type : Boolean").check(&text("yes")),
            Err(Violation::TypeMismatch { .. })
        ));
        assert_eq!(parse("Type : Number").check(&AttributeValue::Float(1.5)), Ok(()));
        assert!(parse("Type : String").check(&AttributeValue::Integer(1)).is_err());
    }

    #[test]
    fn test_single_rejects_list_and_multi_accepts_scalar() {
        let list = AttributeValue::List(vec![
            Scalar::Text("a".to_string()),
            Scalar::Text("b".to_string()),
        ]);
        assert!(matches!(
            parse("Type : String").check(&list),
            Err(Violation::TypeMismatch { .. })
        ));
        let multi = parse("Type : String\nAllows multiple values");
        assert_eq!(multi.check(&list), Ok(()));
        assert_eq!(multi.check(&text("a")), Ok(()));
    }

    #[test]
    fn test_enum_checks() {
        let d = parse("Type : Enum\nAllowed values : Object|Picklist|5");
        assert_eq!(d.check(&text("Picklist")), Ok(()));
        assert_eq!(d.check(&AttributeValue::Integer(5)), Ok(()));
        assert!(matches!(d.check(&text("Docfield")), Err(Violation::EnumViolation { .. })));
    }

    #[test]
    fn test_bound_checks() {
        let d = parse("Type : String\nMaximum length : 3");
        assert_eq!(d.check(&text("abc")), Ok(()));
        assert!(matches!(
            d.check(&text("abcd")),
            Err(Violation::ConstraintViolation { constraint: "maximum length", .. })
        ));

        let d = parse("Type : Number\nMinimum value : 0\nMaximum value : 10");
        assert_eq!(d.check(&AttributeValue::Integer(10)), Ok(()));
        assert!(matches!(
            d.check(&AttributeValue::Integer(-1)),
            Err(Violation::ConstraintViolation { constraint: "minimum value", .. })
        ));
        assert!(matches!(
            d.check(&AttributeValue::Float(10.5)),
            Err(Violation::ConstraintViolation { constraint: "maximum value", .. })
        ));
    }

    #[test]
    fn test_reference_checks() {
        let specific = parse("Type : Picklist\nAllows multiple values");
        assert_eq!(specific.check(&text("Picklist.color__c")), Ok(()));
        assert!(specific.check(&text("Picklists.color__c")).is_err());
        assert!(specific
            .check(&AttributeValue::List(vec![
                Scalar::Text("Picklist.a__c".to_string()),
                Scalar::Text("Object.b__c".to_string()),
            ]))
            .is_err());

        let generic = parse("Type : ComponentReference");
        assert_eq!(generic.check(&text("Docfield.x__c")), Ok(()));
        assert!(generic.check(&text("docfield.x__c")).is_err());
        assert!(generic.check(&text("DocField.x__c")).is_err());
        assert!(generic.check(&AttributeValue::Integer(1)).is_err());

        let generic_multi = parse("Type : ComponentReference\nAllows multiple values");
        assert!(generic_multi.is_multi());
        assert_eq!(
            generic_multi.check(&AttributeValue::List(vec![
                Scalar::Text("Docfield.a__c".to_string()),
                Scalar::Text("Object.b__c".to_string()),
            ])),
            Ok(())
        );
        assert!(matches!(
            generic_multi.check(&AttributeValue::List(vec![
                Scalar::Text("Docfield.a__c".to_string()),
                Scalar::Text("not_a_reference".to_string()),
            ])),
            Err(Violation::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_labels_do_not_read_past_line_end() {
        let d = parse("Type : String\nAllowed values :\nAllows multiple values");
        assert_eq!(d.primitive, Primitive::String);
        assert!(d.is_multi());

        let d = parse("Type : Enum\nAllowed values :\nMaximum length : 4");
        assert_eq!(d.primitive, Primitive::String);
        assert_eq!(d.length_max, Some(4));

        let d = parse("Type : Number\nMinimum value :\n5");
        assert_eq!(d.value_min, None);

        assert!(matches!(
            TypeDescriptor::parse("Type :\nMaximum length : 4", &schema()),
            Err(DescriptorError::MissingTypeLabel { .. })
        ));
    }

    #[test]
    fn test_cache_memoizes() -> Result<(), DescriptorError> {
        let cache = DescriptorCache::new();
        let schema = schema();
        let first = cache.get_or_parse("Type : String", &schema)?;
        let second = cache.get_or_parse("Type : String", &schema)?;
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
        assert!(cache.get_or_parse("no label", &schema).is_err());
        assert_eq!(cache.len(), 1);
        Ok(())
    }
}
