//! Parser implementation

use super::ast::*;
use super::builder::{self, BodyGroup, CommandHead};
use super::error::{ParseError, ParseResult, SyntaxError};
use crate::lexer::*;
use std::str::FromStr;

// ============================================================================
// ENTRY POINTS
// ============================================================================

/// Start symbols of the grammar. Each one can be parsed in isolation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryPoint {
    AttributeValue,
    Attribute,
    Attributes,
    AlterAttribute,
    Component,
    Components,
    CreateCommand,
    RecreateCommand,
    DropCommand,
    RenameCommand,
    AlterCommand,
    AddCommand,
    ModifyCommand,
    MdlCommand,
}

impl EntryPoint {
    pub const ALL: [EntryPoint; 14] = [
        EntryPoint::AttributeValue,
        EntryPoint::Attribute,
        EntryPoint::Attributes,
        EntryPoint::AlterAttribute,
        EntryPoint::Component,
        EntryPoint::Components,
        EntryPoint::CreateCommand,
        EntryPoint::RecreateCommand,
        EntryPoint::DropCommand,
        EntryPoint::RenameCommand,
        EntryPoint::AlterCommand,
        EntryPoint::AddCommand,
        EntryPoint::ModifyCommand,
        EntryPoint::MdlCommand,
    ];

    /// Grammar rule name, as used in logs and error context.
    pub fn rule_name(&self) -> &'static str {
        match self {
            EntryPoint::AttributeValue => "attribute_value",
            EntryPoint::Attribute => "attribute",
            EntryPoint::Attributes => "attributes",
            EntryPoint::AlterAttribute => "alter_attribute",
            EntryPoint::Component => "component",
            EntryPoint::Components => "components",
            EntryPoint::CreateCommand => "create_command",
            EntryPoint::RecreateCommand => "recreate_command",
            EntryPoint::DropCommand => "drop_command",
            EntryPoint::RenameCommand => "rename_command",
            EntryPoint::AlterCommand => "alter_command",
            EntryPoint::AddCommand => "add_command",
            EntryPoint::ModifyCommand => "modify_command",
            EntryPoint::MdlCommand => "mdl_command",
        }
    }

    /// The entry point for a single verb's command rule.
    pub fn for_verb(verb: Verb) -> Self {
        match verb {
            Verb::Create => EntryPoint::CreateCommand,
            Verb::Recreate => EntryPoint::RecreateCommand,
            Verb::Drop => EntryPoint::DropCommand,
            Verb::Rename => EntryPoint::RenameCommand,
            Verb::Alter => EntryPoint::AlterCommand,
            Verb::Add => EntryPoint::AddCommand,
            Verb::Modify => EntryPoint::ModifyCommand,
        }
    }

    pub fn from_rule_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.rule_name() == name)
    }
}

/// Result of parsing from an arbitrary entry point.
#[derive(Debug, Clone, PartialEq)]
pub enum Parsed {
    AttributeValue(AttributeValue),
    Attribute(Attribute),
    Attributes(Vec<Attribute>),
    Component(Component),
    Components(Vec<Component>),
    Command(Command),
}

// ============================================================================
// PARSER
// ============================================================================

/// Recursive-descent parser for MDL.
pub struct Parser {
    pub(crate) tokens: Vec<Token>,
    pub(crate) pos: usize,
}

impl Parser {
    /// Create a new parser from a vector of tokens. A missing trailing
    /// `Eof` is supplied.
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|t| &t.kind) != Some(&TokenKind::Eof) {
            let span = tokens
                .last()
                .map(|t| Span {
                    start: t.span.end,
                    end: t.span.end,
                    ..t.span
                })
                .unwrap_or_default();
            tokens.push(Token {
                kind: TokenKind::Eof,
                span,
            });
        }
        Self { tokens, pos: 0 }
    }

    /// Parse the whole token stream from `entry`.
    pub fn parse_entry(&mut self, entry: EntryPoint) -> ParseResult<Parsed> {
        self.check_lexer_errors()?;

        let parsed = match entry {
            EntryPoint::AttributeValue => Parsed::AttributeValue(self.parse_attribute_value()?),
            EntryPoint::Attribute => Parsed::Attribute(self.parse_attribute()?),
            EntryPoint::Attributes => Parsed::Attributes(self.parse_attributes()?),
            EntryPoint::AlterAttribute => Parsed::Attribute(self.parse_alter_attribute()?),
            EntryPoint::Component => Parsed::Component(self.parse_component()?),
            EntryPoint::Components => Parsed::Components(self.parse_components()?),
            EntryPoint::CreateCommand => Parsed::Command(self.parse_command_for(Verb::Create)?),
            EntryPoint::RecreateCommand => {
                Parsed::Command(self.parse_command_for(Verb::Recreate)?)
            }
            EntryPoint::DropCommand => Parsed::Command(self.parse_command_for(Verb::Drop)?),
            EntryPoint::RenameCommand => Parsed::Command(self.parse_command_for(Verb::Rename)?),
            EntryPoint::AlterCommand => Parsed::Command(self.parse_command_for(Verb::Alter)?),
            EntryPoint::AddCommand => Parsed::Command(self.parse_command_for(Verb::Add)?),
            EntryPoint::ModifyCommand => Parsed::Command(self.parse_command_for(Verb::Modify)?),
            EntryPoint::MdlCommand => Parsed::Command(self.parse_command()?),
        };

        self.expect_end()?;
        Ok(parsed)
    }

    /// Surface the first lexer error as a syntax error.
    pub(crate) fn check_lexer_errors(&self) -> ParseResult<()> {
        if let Some(token) = self
            .tokens
            .iter()
            .find(|t| matches!(t.kind, TokenKind::Error(_)))
        {
            let message = match &token.kind {
                TokenKind::Error(msg) => format!("Lexer error: {}", msg),
                _ => "Lexer error".to_string(),
            };
            return Err(SyntaxError::at(token, message).into());
        }
        Ok(())
    }

    pub(crate) fn expect_end(&self) -> ParseResult<()> {
        if self.is_at_end() {
            Ok(())
        } else {
            Err(self.error("Expected end of input"))
        }
    }

    // ------------------------------------------------------------------------
    // Attribute values
    // ------------------------------------------------------------------------

    /// Parse an attribute value: nothing, one scalar, or a comma-separated
    /// list of scalars of the same kind.
    pub(crate) fn parse_attribute_value(&mut self) -> ParseResult<AttributeValue> {
        let mut scalars: Vec<Scalar> = Vec::new();

        if !self.at_scalar() {
            return Ok(builder::build_value(scalars));
        }

        loop {
            let token = self.current().clone();
            let scalar = self.parse_scalar()?;
            if let Some(first) = scalars.first() {
                if !first.same_kind(&scalar) {
                    return Err(SyntaxError::at(
                        &token,
                        format!(
                            "Mixed list: expected {} but found {}",
                            first.kind_name(),
                            scalar.kind_name()
                        ),
                    )
                    .into());
                }
            }
            scalars.push(scalar);

            if !self.check(&TokenKind::Comma) {
                break;
            }
            self.advance();
            if !self.at_scalar() {
                return Err(self.error("Expected a value after ','"));
            }
        }

        Ok(builder::build_value(scalars))
    }

    fn at_scalar(&self) -> bool {
        matches!(
            self.current().kind,
            TokenKind::True
                | TokenKind::False
                | TokenKind::Int(_)
                | TokenKind::Decimal(_)
                | TokenKind::Str(_)
        )
    }

    fn parse_scalar(&mut self) -> ParseResult<Scalar> {
        let scalar = match &self.current().kind {
            TokenKind::True => Scalar::Boolean(true),
            TokenKind::False => Scalar::Boolean(false),
            TokenKind::Int(text) | TokenKind::Decimal(text) => {
                builder::build_number(text).map_err(|msg| self.error(&msg))?
            }
            TokenKind::Str(fragments) => Scalar::Text(builder::build_text(fragments)),
            _ => return Err(self.error("Expected a value")),
        };
        self.advance();
        Ok(scalar)
    }

    // ------------------------------------------------------------------------
    // Attributes and components
    // ------------------------------------------------------------------------

    /// `name '(' value ')'`
    pub(crate) fn parse_attribute(&mut self) -> ParseResult<Attribute> {
        let name = self.expect_identifier()?;
        let value = self.parse_parenthesized_value()?;
        Ok(Attribute::new(name, value))
    }

    /// `name ['ADD' | 'DROP'] '(' value ')'`
    pub(crate) fn parse_alter_attribute(&mut self) -> ParseResult<Attribute> {
        let name = self.expect_identifier()?;
        let modifier = match self.current().kind {
            TokenKind::Add => Some(Modifier::Add),
            TokenKind::Drop => Some(Modifier::Drop),
            _ => None,
        };
        if modifier.is_some() {
            self.advance();
        }
        let value = self.parse_parenthesized_value()?;
        Ok(Attribute {
            name,
            value,
            modifier,
        })
    }

    fn parse_parenthesized_value(&mut self) -> ParseResult<AttributeValue> {
        self.expect(TokenKind::LParen)?;
        let value = self.parse_attribute_value()?;
        self.expect(TokenKind::RParen)?;
        Ok(value)
    }

    /// One or more attributes with optional separating commas.
    pub(crate) fn parse_attributes(&mut self) -> ParseResult<Vec<Attribute>> {
        let mut attributes = vec![self.parse_attribute()?];
        self.optional_comma();
        while self.at_attribute() {
            attributes.push(self.parse_attribute()?);
            self.optional_comma();
        }
        Ok(attributes)
    }

    /// `type_name name '(' [attributes] ')' [';']`
    pub(crate) fn parse_component(&mut self) -> ParseResult<Component> {
        let type_name = self.expect_identifier()?;
        let name = self.expect_identifier()?;
        self.expect(TokenKind::LParen)?;

        let mut attributes = Vec::new();
        while self.at_attribute() {
            attributes.push(self.parse_attribute()?);
            self.optional_comma();
        }

        self.expect(TokenKind::RParen)?;
        self.optional_semicolon();
        Ok(Component::new(type_name, name, attributes))
    }

    /// One or more components separated by optional `;` or `,`.
    pub(crate) fn parse_components(&mut self) -> ParseResult<Vec<Component>> {
        let mut components = vec![self.parse_component()?];
        self.optional_comma();
        while self.at_component() {
            components.push(self.parse_component()?);
            self.optional_comma();
        }
        Ok(components)
    }

    fn at_attribute(&self) -> bool {
        matches!(self.current().kind, TokenKind::Identifier(_))
            && self.peek_kind(1) == &TokenKind::LParen
    }

    fn at_alter_attribute(&self) -> bool {
        matches!(self.current().kind, TokenKind::Identifier(_))
            && matches!(
                self.peek_kind(1),
                TokenKind::LParen | TokenKind::Add | TokenKind::Drop
            )
    }

    fn at_component(&self) -> bool {
        matches!(self.current().kind, TokenKind::Identifier(_))
            && matches!(self.peek_kind(1), TokenKind::Identifier(_))
    }

    // ------------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------------

    /// Top-level `mdl_command`: pick the rule from the leading verb.
    pub(crate) fn parse_command(&mut self) -> ParseResult<Command> {
        match verb_of(&self.current().kind) {
            Some(verb) => self.parse_command_for(verb),
            None => Err(self.error("Expected a command verb")),
        }
    }

    pub(crate) fn parse_command_for(&mut self, verb: Verb) -> ParseResult<Command> {
        match verb {
            Verb::Drop => self.parse_drop_command(),
            Verb::Rename => self.parse_rename_command(),
            Verb::Alter => self.parse_alter_command(),
            Verb::Create | Verb::Recreate | Verb::Add | Verb::Modify => {
                self.parse_block_command(verb)
            }
        }
    }

    /// `VERB [guard] type_name [guard] name`
    fn parse_head(&mut self, verb: Verb, guard_allowed: bool) -> ParseResult<CommandHead> {
        self.expect(verb_token(verb))?;

        let mut guard = if guard_allowed { self.parse_guard()? } else { None };
        let type_name = self.expect_identifier()?;
        if guard.is_none() && guard_allowed {
            guard = self.parse_guard()?;
        }
        let name = self.expect_identifier()?;

        Ok(CommandHead {
            verb,
            type_name,
            name,
            guard,
        })
    }

    fn parse_guard(&mut self) -> ParseResult<Option<ExistenceGuard>> {
        if !self.check(&TokenKind::If) {
            return Ok(None);
        }
        self.advance();

        let phrase = if self.check(&TokenKind::Not) {
            self.advance();
            "IF NOT EXISTS"
        } else {
            "IF EXISTS"
        };
        self.expect(TokenKind::Exists)?;
        builder::build_guard(phrase).map(Some)
    }

    /// `DROP type_name name [';']`
    fn parse_drop_command(&mut self) -> ParseResult<Command> {
        let head = self.parse_head(Verb::Drop, true)?;
        self.optional_semicolon();
        builder::build_line_command(head, None)
    }

    /// `RENAME type_name name TO new_name [';']`
    fn parse_rename_command(&mut self) -> ParseResult<Command> {
        let head = self.parse_head(Verb::Rename, false)?;
        self.expect(TokenKind::To)?;
        let target = self.expect_identifier()?;
        self.optional_semicolon();
        builder::build_line_command(head, Some(target))
    }

    /// CREATE, RECREATE, ADD and MODIFY: attributes, then components.
    fn parse_block_command(&mut self, verb: Verb) -> ParseResult<Command> {
        let head = self.parse_head(verb, true)?;
        self.expect(TokenKind::LParen)?;

        let mut groups = Vec::new();

        let mut attributes = Vec::new();
        while self.at_attribute() {
            attributes.push(self.parse_attribute()?);
            self.optional_comma();
        }
        if !attributes.is_empty() {
            groups.push(BodyGroup::Attributes(attributes));
        }

        let mut components = Vec::new();
        while self.at_component() {
            components.push(self.parse_component()?);
            self.optional_comma();
        }
        if !components.is_empty() {
            groups.push(BodyGroup::Components(components));
        }

        if self.at_attribute() {
            return Err(self.error("Attributes must come before components"));
        }
        if self.current().kind.is_verb() {
            return Err(self.error(&format!("{} bodies cannot contain commands", verb)));
        }

        self.expect(TokenKind::RParen)?;
        self.optional_semicolon();
        builder::build_block_command(head, groups)
    }

    /// ALTER: alter-attributes, then ADD/DROP/MODIFY/RENAME subcommands.
    fn parse_alter_command(&mut self) -> ParseResult<Command> {
        let head = self.parse_head(Verb::Alter, true)?;
        self.expect(TokenKind::LParen)?;

        let mut groups = Vec::new();

        let mut attributes = Vec::new();
        while self.at_alter_attribute() {
            attributes.push(self.parse_alter_attribute()?);
            self.optional_comma();
        }
        if !attributes.is_empty() {
            groups.push(BodyGroup::Attributes(attributes));
        }

        let mut commands = Vec::new();
        while let Some(verb) = verb_of(&self.current().kind) {
            if !verb.is_alter_subcommand() {
                return Err(self.error(&format!("{} is not allowed inside ALTER", verb)));
            }
            commands.push(self.parse_command_for(verb)?);
            self.optional_comma();
        }
        if !commands.is_empty() {
            groups.push(BodyGroup::Commands(commands));
        }

        if self.at_component() {
            return Err(self.error("ALTER bodies cannot contain components"));
        }
        if self.at_alter_attribute() {
            return Err(self.error("Attributes must come before subcommands"));
        }

        self.expect(TokenKind::RParen)?;
        self.optional_semicolon();
        builder::build_block_command(head, groups)
    }

    // ------------------------------------------------------------------------
    // Token helpers
    // ------------------------------------------------------------------------

    pub(crate) fn current(&self) -> &Token {
        &self.tokens[self.pos]
    }

    /// Kind of the token `offset` positions ahead, clamped to `Eof`.
    pub(crate) fn peek_kind(&self, offset: usize) -> &TokenKind {
        let idx = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[idx].kind
    }

    pub(crate) fn advance(&mut self) {
        if !self.is_at_end() {
            self.pos += 1;
        }
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.current().kind == TokenKind::Eof
    }

    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.current().kind) == std::mem::discriminant(kind)
    }

    pub(crate) fn expect(&mut self, kind: TokenKind) -> ParseResult<()> {
        if self.check(&kind) {
            self.advance();
            Ok(())
        } else {
            Err(self.error(&format!("Expected {}", kind)))
        }
    }

    pub(crate) fn expect_identifier(&mut self) -> ParseResult<String> {
        match &self.current().kind {
            TokenKind::Identifier(s) => {
                let s = s.clone();
                self.advance();
                Ok(s)
            }
            _ => Err(self.error("Expected identifier")),
        }
    }

    pub(crate) fn optional_comma(&mut self) {
        if self.check(&TokenKind::Comma) {
            self.advance();
        }
    }

    pub(crate) fn optional_semicolon(&mut self) {
        if self.check(&TokenKind::Semicolon) {
            self.advance();
        }
    }

    pub(crate) fn error(&self, msg: &str) -> ParseError {
        SyntaxError::at(self.current(), msg).into()
    }
}

fn verb_of(kind: &TokenKind) -> Option<Verb> {
    let verb = match kind {
        TokenKind::Create => Verb::Create,
        TokenKind::Recreate => Verb::Recreate,
        TokenKind::Drop => Verb::Drop,
        TokenKind::Rename => Verb::Rename,
        TokenKind::Alter => Verb::Alter,
        TokenKind::Add => Verb::Add,
        TokenKind::Modify => Verb::Modify,
        _ => return None,
    };
    Some(verb)
}

fn verb_token(verb: Verb) -> TokenKind {
    match verb {
        Verb::Create => TokenKind::Create,
        Verb::Recreate => TokenKind::Recreate,
        Verb::Drop => TokenKind::Drop,
        Verb::Rename => TokenKind::Rename,
        Verb::Alter => TokenKind::Alter,
        Verb::Add => TokenKind::Add,
        Verb::Modify => TokenKind::Modify,
    }
}

// ============================================================================
// CONVENIENCE FUNCTIONS
// ============================================================================

fn run<T>(source: &str, rule: fn(&mut Parser) -> ParseResult<T>) -> ParseResult<T> {
    let tokens = Lexer::new(source).tokenize();
    let mut parser = Parser::new(tokens);
    parser.check_lexer_errors()?;
    let value = rule(&mut parser)?;
    parser.expect_end()?;
    Ok(value)
}

/// Parse `source` from the given start symbol.
pub fn parse_entry(entry: EntryPoint, source: &str) -> ParseResult<Parsed> {
    tracing::debug!(entry = entry.rule_name(), len = source.len(), "parsing MDL source");
    let tokens = Lexer::new(source).tokenize();
    let mut parser = Parser::new(tokens);
    parser.parse_entry(entry)
}

pub fn parse_attribute_value(source: &str) -> ParseResult<AttributeValue> {
    run(source, Parser::parse_attribute_value)
}

pub fn parse_attribute(source: &str) -> ParseResult<Attribute> {
    run(source, Parser::parse_attribute)
}

pub fn parse_attributes(source: &str) -> ParseResult<Vec<Attribute>> {
    run(source, Parser::parse_attributes)
}

pub fn parse_alter_attribute(source: &str) -> ParseResult<Attribute> {
    run(source, Parser::parse_alter_attribute)
}

pub fn parse_component(source: &str) -> ParseResult<Component> {
    run(source, Parser::parse_component)
}

pub fn parse_components(source: &str) -> ParseResult<Vec<Component>> {
    run(source, Parser::parse_components)
}

/// Parse a complete top-level command.
pub fn parse_command(source: &str) -> ParseResult<Command> {
    run(source, Parser::parse_command)
}

impl FromStr for Attribute {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_attribute(s)
    }
}

impl FromStr for Component {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_component(s)
    }
}

impl FromStr for Command {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_command(s)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn flag(name: &str, value: bool) -> Attribute {
        Attribute::new(name, AttributeValue::Boolean(value))
    }

    fn num(name: &str, value: i64) -> Attribute {
        Attribute::new(name, AttributeValue::Integer(value))
    }

    fn subcomponent(name: &str, value: i64) -> Component {
        Component::new(
            "Mysubcomponent",
            name,
            vec![flag("my_bool_attribute", true), num("my_num_attribute", value)],
        )
    }

    const ALTER_SOURCE: &str = "ALTER Mycomponent my_comp__c (
  my_bool_attribute(true),
  my_num_attribute(5),
  my_multi_value_attribute ADD (5, 6),
  my_multi_value_attribute DROP (8),
  ADD Mysubcomponent my_subcomp__c (
    my_bool_attribute(true),
    my_num_attribute(5)
  );
  DROP Mysubcomponent my_subcomp2__c;
MODIFY Mysubcomponent my_subcomp3__c (
    my_bool_attribute(true),
    my_num_attribute(7)
  );
  RENAME Mysubcomponent my_subcomp4__c TO my_subcomp5__c;
);
";

    fn expected_alter() -> Command {
        Command {
            verb: Verb::Alter,
            type_name: "Mycomponent".to_string(),
            name: "my_comp__c".to_string(),
            existence_guard: None,
            attributes: Some(vec![
                flag("my_bool_attribute", true),
                num("my_num_attribute", 5),
                Attribute::new(
                    "my_multi_value_attribute",
                    AttributeValue::List(vec![Scalar::Integer(5), Scalar::Integer(6)]),
                )
                .with_modifier(Modifier::Add),
                Attribute::new("my_multi_value_attribute", AttributeValue::Integer(8))
                    .with_modifier(Modifier::Drop),
            ]),
            subcomponents: None,
            subcommands: Some(vec![
                Command {
                    verb: Verb::Add,
                    attributes: Some(subcomponent("my_subcomp__c", 5).attributes),
                    ..Command::drop("Mysubcomponent", "my_subcomp__c")
                },
                Command::drop("Mysubcomponent", "my_subcomp2__c"),
                Command {
                    verb: Verb::Modify,
                    attributes: Some(subcomponent("my_subcomp3__c", 7).attributes),
                    ..Command::drop("Mysubcomponent", "my_subcomp3__c")
                },
                Command::rename("Mysubcomponent", "my_subcomp4__c", "my_subcomp5__c"),
            ]),
            rename_target: None,
        }
    }

    #[test]
    fn test_scalar_attribute_values() -> ParseResult<()> {
        assert_eq!(parse_attribute_value("true")?, AttributeValue::Boolean(true));
        assert_eq!(parse_attribute_value("false")?, AttributeValue::Boolean(false));
        assert_eq!(parse_attribute_value("1")?, AttributeValue::Integer(1));
        assert_eq!(parse_attribute_value("1.1")?, AttributeValue::Float(1.1));
        assert_eq!(
            parse_attribute_value("'This is a string'")?,
            AttributeValue::Text("This is a string".to_string())
        );
        assert_eq!(parse_attribute_value("")?, AttributeValue::Absent);
        Ok(())
    }

    #[test]
    fn test_list_attribute_values() -> ParseResult<()> {
        assert_eq!(
            parse_attribute_value("'a', 'b'")?,
            AttributeValue::List(vec![
                Scalar::Text("a".to_string()),
                Scalar::Text("b".to_string())
            ])
        );
        assert_eq!(
            parse_attribute_value("5, 6")?,
            AttributeValue::List(vec![Scalar::Integer(5), Scalar::Integer(6)])
        );
        Ok(())
    }

    #[test]
    fn test_mixed_list_is_syntax_error() {
        let err = parse_attribute_value("1, 'a'");
        assert!(matches!(err, Err(ParseError::Syntax(_))));
    }

    #[test]
    fn test_list_trailing_comma_is_error() {
        assert!(parse_attribute_value("1, 2,").is_err());
    }

    #[test]
    fn test_multi_line_string_value() -> ParseResult<()> {
        assert_eq!(
            parse_attribute_value("'line one\nline two'")?,
            AttributeValue::Text("line one\nline two".to_string())
        );
        Ok(())
    }

    #[test]
    fn test_attribute() -> ParseResult<()> {
        assert_eq!(
            parse_attribute("my_bool_attribute(true)")?,
            flag("my_bool_attribute", true)
        );
        assert_eq!(
            parse_attribute("empty()")?,
            Attribute::new("empty", AttributeValue::Absent)
        );
        Ok(())
    }

    #[test]
    fn test_attributes() -> ParseResult<()> {
        let expected = vec![flag("my_bool_attribute", true), num("my_num_attribute", 5)];
        assert_eq!(
            parse_attributes("my_bool_attribute(true), my_num_attribute(5)")?,
            expected
        );
        assert_eq!(
            parse_attributes("my_bool_attribute(true), my_num_attribute(5),")?,
            expected
        );
        assert_eq!(
            parse_attributes("my_bool_attribute(true)\nmy_num_attribute(5)")?,
            expected
        );
        Ok(())
    }

    #[test]
    fn test_alter_attribute() -> ParseResult<()> {
        assert_eq!(
            parse_alter_attribute("values ADD ('x')")?,
            Attribute::new("values", AttributeValue::Text("x".to_string()))
                .with_modifier(Modifier::Add)
        );
        assert_eq!(parse_alter_attribute("plain(1)")?, num("plain", 1));
        assert!(parse_attribute("values ADD ('x')").is_err());
        Ok(())
    }

    #[test]
    fn test_component() -> ParseResult<()> {
        let source = "Mysubcomponent my_subcomp__c (
    my_bool_attribute(true),
    my_num_attribute(5)
  )";
        assert_eq!(parse_component(source)?, subcomponent("my_subcomp__c", 5));
        assert_eq!(
            parse_component(&format!("{};", source))?,
            subcomponent("my_subcomp__c", 5)
        );
        assert_eq!(
            parse_component("Field f__c ()")?,
            Component::new("Field", "f__c", vec![])
        );
        Ok(())
    }

    #[test]
    fn test_components() -> ParseResult<()> {
        let source = "  Mysubcomponent my_subcomp__c (
    my_bool_attribute(true),
    my_num_attribute(5)
  );
        Mysubcomponent my_subcomp__c (
    my_bool_attribute(true),
    my_num_attribute(5)
  )";
        let expected = vec![
            subcomponent("my_subcomp__c", 5),
            subcomponent("my_subcomp__c", 5),
        ];
        assert_eq!(parse_components(source)?, expected);
        assert_eq!(parse_components(&format!("{};", source))?, expected);
        Ok(())
    }

    #[test]
    fn test_create_command() -> ParseResult<()> {
        let source = "CREATE Mycomponent my_comp__c (
  my_bool_attribute(true),
  my_num_attribute(5),

  Mysubcomponent my_subcomp__c (
    my_bool_attribute(true),
    my_num_attribute(5)
  )
)";
        let expected = Command {
            verb: Verb::Create,
            attributes: Some(vec![flag("my_bool_attribute", true), num("my_num_attribute", 5)]),
            subcomponents: Some(vec![subcomponent("my_subcomp__c", 5)]),
            ..Command::drop("Mycomponent", "my_comp__c")
        };

        for entry in [EntryPoint::CreateCommand, EntryPoint::MdlCommand] {
            assert_eq!(
                parse_entry(entry, source)?,
                Parsed::Command(expected.clone())
            );
            assert_eq!(
                parse_entry(entry, &format!("{};", source))?,
                Parsed::Command(expected.clone())
            );
        }
        Ok(())
    }

    #[test]
    fn test_recreate_command_components_only() -> ParseResult<()> {
        let cmd = parse_command("RECREATE Mycomponent c (Field f (x(1)))")?;
        assert_eq!(cmd.verb, Verb::Recreate);
        assert_eq!(cmd.attributes, None);
        assert_eq!(
            cmd.subcomponents,
            Some(vec![Component::new("Field", "f", vec![num("x", 1)])])
        );
        Ok(())
    }

    #[test]
    fn test_empty_body_keeps_attribute_list() -> ParseResult<()> {
        let cmd = parse_command("CREATE Mycomponent c ()")?;
        assert_eq!(cmd.attributes, Some(vec![]));
        assert_eq!(cmd.subcomponents, None);
        assert_eq!(cmd.subcommands, None);
        Ok(())
    }

    #[test]
    fn test_drop_command() -> ParseResult<()> {
        let expected = Parsed::Command(Command::drop("Mycomponent", "my_comp__c"));
        assert_eq!(
            parse_entry(EntryPoint::DropCommand, "DROP Mycomponent my_comp__c")?,
            expected
        );
        assert_eq!(
            parse_entry(EntryPoint::DropCommand, "DROP Mycomponent my_comp__c;")?,
            expected
        );
        Ok(())
    }

    #[test]
    fn test_rename_command() -> ParseResult<()> {
        let expected = Command::rename("Mycomponent", "my_comp__c", "my_new_comp__c");
        assert_eq!(
            parse_command("RENAME Mycomponent my_comp__c TO my_new_comp__c")?,
            expected
        );
        assert_eq!(
            parse_command("RENAME Mycomponent my_comp__c TO my_new_comp__c;")?,
            expected
        );
        Ok(())
    }

    #[test]
    fn test_alter_command() -> ParseResult<()> {
        assert_eq!(
            parse_entry(EntryPoint::AlterCommand, ALTER_SOURCE)?,
            Parsed::Command(expected_alter())
        );
        assert_eq!(parse_command(ALTER_SOURCE)?, expected_alter());
        Ok(())
    }

    #[test]
    fn test_alter_subcommands_keep_source_order() -> ParseResult<()> {
        let cmd = parse_command(
            "ALTER Object o (RENAME Field a TO b; DROP Field c; ADD Field d (); MODIFY Field e ())",
        )?;
        let verbs: Vec<Verb> = cmd
            .subcommands
            .unwrap_or_default()
            .iter()
            .map(|c| c.verb)
            .collect();
        assert_eq!(verbs, vec![Verb::Rename, Verb::Drop, Verb::Add, Verb::Modify]);
        Ok(())
    }

    #[test]
    fn test_add_and_modify_commands() -> ParseResult<()> {
        let add = parse_entry(
            EntryPoint::AddCommand,
            "ADD Mysubcomponent my_subcomp__c (
    my_bool_attribute(true),
    my_num_attribute(5)
  );",
        )?;
        assert_eq!(
            add,
            Parsed::Command(Command {
                verb: Verb::Add,
                attributes: Some(subcomponent("my_subcomp__c", 5).attributes),
                ..Command::drop("Mysubcomponent", "my_subcomp__c")
            })
        );

        let modify = parse_entry(EntryPoint::ModifyCommand, "MODIFY Mysubcomponent s (x(7))")?;
        assert!(matches!(modify, Parsed::Command(Command { verb: Verb::Modify, .. })));
        Ok(())
    }

    #[test]
    fn test_existence_guard_positions() -> ParseResult<()> {
        let before = parse_command("CREATE IF NOT EXISTS Object o__c (x(1))")?;
        let between = parse_command("CREATE Object IF NOT EXISTS o__c (x(1))")?;
        assert_eq!(before, between);
        assert_eq!(before.existence_guard, Some(ExistenceGuard::IfNotExists));

        let drop = parse_command("DROP Object IF EXISTS o__c;")?;
        assert_eq!(drop.existence_guard, Some(ExistenceGuard::IfExists));
        Ok(())
    }

    #[test]
    fn test_entry_point_mismatch_is_error() {
        assert!(parse_entry(EntryPoint::DropCommand, "RENAME A b TO c").is_err());
        assert!(parse_entry(EntryPoint::Attribute, "Field f ()").is_err());
    }

    #[test]
    fn test_parser_supplies_missing_eof() {
        let mut empty = Parser::new(Vec::new());
        assert!(matches!(
            empty.parse_entry(EntryPoint::MdlCommand),
            Err(ParseError::Syntax(e)) if e.line == 1 && e.column == 1
        ));
        assert_eq!(
            Parser::new(Vec::new()).parse_entry(EntryPoint::AttributeValue),
            Ok(Parsed::AttributeValue(AttributeValue::Absent))
        );

        let mut tokens = Lexer::new("label(1)").tokenize();
        tokens.pop();
        let mut parser = Parser::new(tokens);
        assert_eq!(
            parser.parse_entry(EntryPoint::Attribute),
            Ok(Parsed::Attribute(Attribute::new("label", AttributeValue::Integer(1))))
        );
    }

    #[test]
    fn test_entry_point_rule_names() {
        for entry in EntryPoint::ALL {
            assert_eq!(EntryPoint::from_rule_name(entry.rule_name()), Some(entry));
        }
        assert_eq!(EntryPoint::from_rule_name("statement"), None);
    }

    #[test]
    fn test_syntax_error_position() {
        let err = parse_command("CREATE Object o (\n  x(1)\n  y(2 3)\n)");
        match err {
            Err(ParseError::Syntax(e)) => {
                assert_eq!(e.line, 3);
                assert_eq!(e.column, 7);
                assert_eq!(e.found, "3");
            }
            other => panic!("expected syntax error, got {:?}", other),
        }
    }

    #[test]
    fn test_lexer_error_surfaces_as_syntax_error() {
        let err = parse_attribute("name(#)");
        assert!(matches!(err, Err(ParseError::Syntax(ref e)) if e.message.contains("Lexer error")));
    }

    #[test]
    fn test_attribute_after_component_is_error() {
        assert!(parse_command("CREATE Object o (Field f (), x(1))").is_err());
    }

    #[test]
    fn test_commands_outside_alter_are_errors() {
        assert!(parse_command("CREATE Object o (DROP Field f)").is_err());
        assert!(parse_command("ALTER Object o (CREATE Field f ())").is_err());
        assert!(parse_command("ALTER Object o (Field f ())").is_err());
    }

    #[test]
    fn test_trailing_input_is_error() {
        assert!(parse_command("DROP A b; DROP A c;").is_err());
    }

    #[test]
    fn test_from_str() -> ParseResult<()> {
        let attr: Attribute = "active(true)".parse()?;
        assert_eq!(attr, flag("active", true));
        let comp: Component = "Field f ()".parse()?;
        assert_eq!(comp, Component::new("Field", "f", vec![]));
        let cmd: Command = "DROP Field f".parse()?;
        assert_eq!(cmd, Command::drop("Field", "f"));
        Ok(())
    }

    #[test]
    fn test_integer_overflow_is_syntax_error() {
        assert!(matches!(
            parse_attribute_value("99999999999999999999"),
            Err(ParseError::Syntax(_))
        ));
    }
}
