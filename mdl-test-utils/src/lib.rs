//! MDL Test Utilities
//!
//! Shared test infrastructure for the MDL workspace:
//! - Proptest generators for trees that the grammar can express
//! - A component schema fixture and sample documents
//! - Assertions for round-trip and validation behavior

// Re-export core types for convenience
pub use mdl_dsl::{
    parse_command, parse_entry, serialize_command, serialize_parsed, Attribute, AttributeValue,
    Command, Component, EntryPoint, ExistenceGuard, Modifier, ParseError, ParseResult, Parsed,
    Scalar, SchemaModel, ValidationError, ValidationResult, Validator, Verb,
};

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for MDL trees.
    //!
    //! Every generated tree is in the shape the builder produces, so
    //! serializing it and parsing the output gives the same tree back.

    use super::*;
    use mdl_dsl::TokenKind;
    use proptest::prelude::*;

    // === Names ===

    /// Attribute and instance names: lowercase identifiers, never keywords.
    pub fn arb_identifier() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9_]{0,12}".prop_filter("must not be a keyword", |s| {
            TokenKind::keyword(s).is_none()
        })
    }

    /// Component type names such as `Object` or `Docfield`.
    pub fn arb_type_name() -> impl Strategy<Value = String> {
        "[A-Z][a-z]{1,10}"
    }

    // === Values ===

    /// Text with quotes, backslashes and line breaks mixed in.
    pub fn arb_text() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9 '\\\\\n_.:|-]{0,24}"
    }

    pub fn arb_scalar() -> impl Strategy<Value = Scalar> {
        prop_oneof![
            any::<bool>().prop_map(Scalar::Boolean),
            any::<i64>().prop_map(Scalar::Integer),
            (-1.0e9f64..1.0e9f64).prop_map(Scalar::Float),
            arb_text().prop_map(Scalar::Text),
        ]
    }

    /// A scalar of the same kind as `like`.
    fn arb_scalar_like(like: &Scalar) -> BoxedStrategy<Scalar> {
        match like {
            Scalar::Boolean(_) => any::<bool>().prop_map(Scalar::Boolean).boxed(),
            Scalar::Integer(_) => any::<i64>().prop_map(Scalar::Integer).boxed(),
            Scalar::Float(_) => (-1.0e9f64..1.0e9f64).prop_map(Scalar::Float).boxed(),
            Scalar::Text(_) => arb_text().prop_map(Scalar::Text).boxed(),
        }
    }

    /// Absent, a single scalar, or a homogeneous list of two or more.
    pub fn arb_attribute_value() -> impl Strategy<Value = AttributeValue> {
        prop_oneof![
            1 => Just(AttributeValue::Absent),
            3 => arb_scalar().prop_map(AttributeValue::from),
            2 => arb_scalar().prop_flat_map(|first| {
                let rest = proptest::collection::vec(arb_scalar_like(&first), 1..4);
                rest.prop_map(move |rest| {
                    let mut items = vec![first.clone()];
                    items.extend(rest);
                    AttributeValue::List(items)
                })
            }),
        ]
    }

    pub fn arb_attribute() -> impl Strategy<Value = Attribute> {
        (arb_identifier(), arb_attribute_value()).prop_map(|(name, value)| Attribute::new(name, value))
    }

    /// An attribute as it appears directly under ALTER, with an optional
    /// ADD or DROP modifier.
    pub fn arb_alter_attribute() -> impl Strategy<Value = Attribute> {
        let modifier = prop_oneof![
            Just(None),
            Just(Some(Modifier::Add)),
            Just(Some(Modifier::Drop)),
        ];
        (arb_attribute(), modifier).prop_map(|(attribute, modifier)| match modifier {
            Some(m) => attribute.with_modifier(m),
            None => attribute,
        })
    }

    pub fn arb_component() -> impl Strategy<Value = Component> {
        (
            arb_type_name(),
            arb_identifier(),
            proptest::collection::vec(arb_attribute(), 0..4),
        )
            .prop_map(|(type_name, name, attributes)| Component::new(type_name, name, attributes))
    }

    pub fn arb_existence_guard() -> impl Strategy<Value = Option<ExistenceGuard>> {
        prop_oneof![
            2 => Just(None),
            1 => Just(Some(ExistenceGuard::IfExists)),
            1 => Just(Some(ExistenceGuard::IfNotExists)),
        ]
    }

    // === Commands ===

    pub fn arb_drop_command() -> impl Strategy<Value = Command> {
        (arb_type_name(), arb_identifier(), arb_existence_guard()).prop_map(
            |(type_name, name, guard)| Command {
                existence_guard: guard,
                ..Command::drop(type_name, name)
            },
        )
    }

    pub fn arb_rename_command() -> impl Strategy<Value = Command> {
        (arb_type_name(), arb_identifier(), arb_identifier())
            .prop_map(|(type_name, name, target)| Command::rename(type_name, name, target))
    }

    /// CREATE, RECREATE, ADD or MODIFY with attributes and components.
    pub fn arb_block_command(verb: Verb) -> impl Strategy<Value = Command> {
        (
            arb_type_name(),
            arb_identifier(),
            arb_existence_guard(),
            proptest::collection::vec(arb_attribute(), 0..4),
            proptest::collection::vec(arb_component(), 0..3),
        )
            .prop_filter_map("block verb", move |(type_name, name, guard, attrs, comps)| {
                let command = Command::block(verb, type_name, name, attrs, comps, Vec::new()).ok()?;
                Some(Command {
                    existence_guard: guard,
                    ..command
                })
            })
    }

    /// Anything ALTER may contain as a subcommand.
    pub fn arb_alter_subcommand() -> impl Strategy<Value = Command> {
        prop_oneof![
            arb_block_command(Verb::Add),
            arb_block_command(Verb::Modify),
            arb_drop_command(),
            arb_rename_command(),
        ]
    }

    pub fn arb_alter_command() -> impl Strategy<Value = Command> {
        (
            arb_type_name(),
            arb_identifier(),
            arb_existence_guard(),
            proptest::collection::vec(arb_alter_attribute(), 0..4),
            proptest::collection::vec(arb_alter_subcommand(), 0..4),
        )
            .prop_filter_map("alter shape", |(type_name, name, guard, attrs, cmds)| {
                let command =
                    Command::block(Verb::Alter, type_name, name, attrs, Vec::new(), cmds).ok()?;
                Some(Command {
                    existence_guard: guard,
                    ..command
                })
            })
    }

    /// Any top-level command.
    pub fn arb_command() -> impl Strategy<Value = Command> {
        prop_oneof![
            arb_block_command(Verb::Create),
            arb_block_command(Verb::Recreate),
            arb_block_command(Verb::Add),
            arb_block_command(Verb::Modify),
            arb_drop_command(),
            arb_rename_command(),
            arb_alter_command(),
        ]
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built schema and documents for common testing scenarios.

    use super::*;

    /// A small vault-style component schema.
    pub const COMPONENTS_SCHEMA_JSON: &str = r#"{
        "Object": {
            "attributes": {
                "label": {"type_data": "Type : String\nMaximum length : 40", "description": "UI label"},
                "active": {"type_data": "Type : Boolean", "description": "Whether the object is active"},
                "order": {"type_data": "Type : Number\nMinimum value : 0\nMaximum value : 100", "description": ""},
                "list_column": {"type_data": "Type : String\nAllows multiple values", "description": ""},
                "data_store": {"type_data": "Type : Enum\nAllowed values : standard|raw", "description": ""},
                "picklist": {"type_data": "Type : Picklist", "description": "Default picklist"},
                "reference": {"type_data": "Type : ComponentReference", "description": ""}
            },
            "subcomponents": {
                "Field": {
                    "attributes": {
                        "label": {"type_data": "Type : String\nMaximum length : 40", "description": ""},
                        "type": {"type_data": "Type : Enum\nAllowed values : String|Number|Boolean|Picklist", "description": ""},
                        "max_length": {"type_data": "Type : Number\nMinimum value : 1\nMaximum value : 1500", "description": ""},
                        "required": {"type_data": "Type : Boolean", "description": ""},
                        "picklist": {"type_data": "Type : Picklist\nAllows multiple values", "description": ""}
                    },
                    "subcomponents": {}
                }
            }
        },
        "Picklist": {
            "attributes": {
                "label": {"type_data": "Type : String", "description": ""},
                "active": {"type_data": "Type : Boolean", "description": ""}
            },
            "subcomponents": {
                "Picklistentry": {
                    "attributes": {
                        "value": {"type_data": "Type : String\nMaximum length : 128", "description": ""},
                        "order": {"type_data": "Type : Number", "description": ""}
                    },
                    "subcomponents": {}
                }
            }
        }
    }"#;

    pub fn components_schema() -> SchemaModel {
        match SchemaModel::from_json_str(COMPONENTS_SCHEMA_JSON) {
            Ok(schema) => schema,
            Err(e) => panic!("fixture schema failed to load: {}", e),
        }
    }

    pub fn components_schema_value() -> serde_json::Value {
        match serde_json::from_str(COMPONENTS_SCHEMA_JSON) {
            Ok(value) => value,
            Err(e) => panic!("fixture schema is not JSON: {}", e),
        }
    }

    /// CREATE with attributes and nested components, valid against the
    /// fixture schema.
    pub const CREATE_OBJECT_MDL: &str = r#"
CREATE Object product__c (
    label('Product'),
    active(true),
    order(10),
    list_column('name__v', 'status__v'),
    data_store('standard'),
    picklist('Picklist.color__c'),
    reference('Object.other__c'),
    Field name__c (
        label('Name')
        type('String')
        max_length(120)
    );
    Field color__c (
        type('Picklist')
        picklist('Picklist.color__c', 'Picklist.size__c')
    );
)
"#;

    /// ALTER with modified attributes and every kind of subcommand, valid
    /// against the fixture schema.
    pub const ALTER_OBJECT_MDL: &str = r#"
ALTER Object IF EXISTS product__c (
    label('Product v2'),
    list_column ADD ('owner__v'),
    list_column DROP ('status__v'),
    ADD Field IF NOT EXISTS size__c (
        label('Size'),
        type('Number'),
        max_length(10)
    );
    MODIFY Field name__c (
        required(true)
    );
    DROP Field legacy__c;
    RENAME Field old__c TO new__c;
)
"#;

    pub const DROP_PICKLIST_MDL: &str = "DROP Picklist IF EXISTS color__c;";

    /// Three violations: an unknown attribute, an enum miss and a bound.
    pub const INVALID_OBJECT_MDL: &str = r#"
CREATE Object broken__c (
    colour('red'),
    data_store('archive'),
    Field f__c (
        max_length(0)
    );
)
"#;

    pub fn create_object_command() -> Command {
        parse_fixture(CREATE_OBJECT_MDL)
    }

    pub fn alter_object_command() -> Command {
        parse_fixture(ALTER_OBJECT_MDL)
    }

    pub fn invalid_object_command() -> Command {
        parse_fixture(INVALID_OBJECT_MDL)
    }

    fn parse_fixture(source: &str) -> Command {
        match parse_command(source) {
            Ok(command) => command,
            Err(e) => panic!("fixture failed to parse: {}", e),
        }
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertion functions for MDL-specific behavior.

    use super::*;

    /// Assert that the canonical form of `source` at `entry` is a fixed
    /// point: it parses to the same tree and prints identically.
    #[track_caller]
    pub fn assert_round_trip(entry: EntryPoint, source: &str) {
        let parsed = match parse_entry(entry, source) {
            Ok(parsed) => parsed,
            Err(e) => panic!("Expected {} to parse, got: {}", entry.rule_name(), e),
        };
        let printed = serialize_parsed(&parsed);
        match parse_entry(entry, &printed) {
            Ok(reparsed) => {
                assert_eq!(reparsed, parsed, "Tree changed after round-trip of:\n{}", printed);
                assert_eq!(serialize_parsed(&reparsed), printed, "Canonical form is not stable");
            }
            Err(e) => panic!("Canonical output failed to parse: {}\n{}", e, printed),
        }
    }

    /// Assert that a command survives serialize → parse unchanged.
    #[track_caller]
    pub fn assert_command_round_trip(command: &Command) {
        let printed = serialize_command(command);
        match parse_command(&printed) {
            Ok(reparsed) => assert_eq!(&reparsed, command, "Round-trip changed:\n{}", printed),
            Err(e) => panic!("Serialized command failed to parse: {}\n{}", e, printed),
        }
    }

    /// Assert a syntax error at the given position.
    #[track_caller]
    pub fn assert_syntax_error_at<T: std::fmt::Debug>(result: &ParseResult<T>, line: usize, column: usize) {
        match result {
            Err(ParseError::Syntax(e)) => {
                assert_eq!((e.line, e.column), (line, column), "Wrong position for: {}", e);
            }
            other => panic!("Expected syntax error, got: {:?}", other),
        }
    }

    #[track_caller]
    pub fn assert_valid(command: &Command, schema: &SchemaModel) {
        if let Err(e) = Validator::new(schema).validate(command) {
            panic!("Expected valid command, got: {}", e);
        }
    }

    #[track_caller]
    pub fn assert_unknown_attribute(result: &ValidationResult<()>, attribute: &str) {
        match result {
            Err(ValidationError::UnknownAttribute { attribute: a, .. }) => {
                assert_eq!(a, attribute, "Wrong attribute in UnknownAttribute error");
            }
            other => panic!("Expected UnknownAttribute for {}, got: {:?}", attribute, other),
        }
    }

    #[track_caller]
    pub fn assert_unknown_component_type(result: &ValidationResult<()>, type_name: &str) {
        match result {
            Err(ValidationError::UnknownComponentType { type_name: t, .. }) => {
                assert_eq!(t, type_name, "Wrong type in UnknownComponentType error");
            }
            other => panic!("Expected UnknownComponentType for {}, got: {:?}", type_name, other),
        }
    }

    #[track_caller]
    pub fn assert_type_mismatch(result: &ValidationResult<()>, attribute: &str) {
        match result {
            Err(ValidationError::AttributeTypeMismatch { attribute: a, .. }) => {
                assert_eq!(a, attribute, "Wrong attribute in type mismatch");
            }
            other => panic!("Expected AttributeTypeMismatch for {}, got: {:?}", attribute, other),
        }
    }

    #[track_caller]
    pub fn assert_enum_violation(result: &ValidationResult<()>, attribute: &str) {
        match result {
            Err(ValidationError::AttributeEnumViolation { attribute: a, .. }) => {
                assert_eq!(a, attribute, "Wrong attribute in enum violation");
            }
            other => panic!("Expected AttributeEnumViolation for {}, got: {:?}", attribute, other),
        }
    }

    #[track_caller]
    pub fn assert_constraint_violation(result: &ValidationResult<()>, attribute: &str) {
        match result {
            Err(ValidationError::AttributeConstraintViolation { attribute: a, .. }) => {
                assert_eq!(a, attribute, "Wrong attribute in constraint violation");
            }
            other => panic!(
                "Expected AttributeConstraintViolation for {}, got: {:?}",
                attribute, other
            ),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_fixture_schema_loads() {
        let schema = fixtures::components_schema();
        assert_eq!(schema.top_level_names(), vec!["Object", "Picklist"]);
        assert!(schema.is_known_type("Picklistentry"));
        assert_eq!(
            SchemaModel::from_value(fixtures::components_schema_value()).ok(),
            Some(schema)
        );
    }

    #[test]
    fn test_valid_fixtures() {
        let schema = fixtures::components_schema();
        assertions::assert_valid(&fixtures::create_object_command(), &schema);
        assertions::assert_valid(&fixtures::alter_object_command(), &schema);
    }

    #[test]
    fn test_invalid_fixture_fails_first_on_unknown_attribute() {
        let schema = fixtures::components_schema();
        let result = Validator::new(&schema).validate(&fixtures::invalid_object_command());
        assertions::assert_unknown_attribute(&result, "colour");
    }

    #[test]
    fn test_fixture_round_trips() {
        assertions::assert_round_trip(EntryPoint::MdlCommand, fixtures::CREATE_OBJECT_MDL);
        assertions::assert_round_trip(EntryPoint::AlterCommand, fixtures::ALTER_OBJECT_MDL);
        assertions::assert_round_trip(EntryPoint::DropCommand, fixtures::DROP_PICKLIST_MDL);
    }

    #[test]
    fn test_assertion_syntax_error() {
        let result = parse_command("DROP Object");
        assertions::assert_syntax_error_at(&result, 1, 12);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        #[test]
        fn prop_generated_commands_round_trip(command in generators::arb_command()) {
            assertions::assert_command_round_trip(&command);
        }

        #[test]
        fn prop_generated_identifiers_are_not_keywords(name in generators::arb_identifier()) {
            prop_assert!(mdl_dsl::TokenKind::keyword(&name).is_none());
        }
    }
}
