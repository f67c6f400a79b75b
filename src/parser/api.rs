use pest::error::{Error, ErrorVariant, InputLocation};
use pest::{Parser, Position};
use pest_derive::Parser;

use super::ast::*;
use super::util::{cook_string, is_line_terminator, parse_numeric_literal, split_regular_expression};

#[derive(Parser)]
#[grammar = "parser/js_grammar.pest"] // relative to src
pub struct JsParser;

const RESERVED_WORDS: [&str; 36] = [
    "break", "case", "catch", "class", "const", "continue", "debugger", "default", "delete", "do",
    "else", "enum", "export", "extends", "false", "finally", "for", "function", "if", "import",
    "in", "instanceof", "new", "null", "return", "super", "switch", "this", "throw", "true", "try",
    "typeof", "var", "void", "while", "with",
];

const ASSIGNMENT_OPERATORS: [&str; 16] = [
    "=", "+=", "-=", "*=", "/=", "%=", "**=", "<<=", ">>=", ">>>=", "&=", "|=", "^=", "&&=", "||=",
    "??=",
];

impl JsParser {
    /// Parses a whole script into a `Program` node.
    pub fn parse_to_ast_from_str(script: &str) -> Result<Node, Error<Rule>> {
        let mut builder = AstBuilder::new(script, &[])?;
        builder.build_program()
    }

    /// Parses a single expression fragment. Identifiers spelled like one of
    /// `metavariables` (ASCII case-insensitive) become `Metavariable` nodes.
    pub fn parse_template_from_str(
        fragment: &str,
        metavariables: &[&str],
    ) -> Result<Node, Error<Rule>> {
        let mut builder = AstBuilder::new(fragment, metavariables)?;
        let expression = builder.build_expression()?;
        if builder.token.token_type != TokenType::EndOfInput {
            return Err(builder.unexpected());
        }
        Ok(expression)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    IdentifierName,
    Numeric,
    String,
    Template,
    TemplateHead,
    TemplateMiddle,
    TemplateTail,
    RegularExpression,
    Punctuator,
    EndOfInput,
}

#[derive(Debug, Clone, Copy)]
pub struct Token {
    pub token_type: TokenType,
    pub start: usize,
    pub end: usize,
    pub newline_before: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Goal {
    Div,
    RegExp,
    TemplateTail,
}

fn error_at(script: &str, pos: usize, message: String) -> Error<Rule> {
    let position = Position::new(script, pos).unwrap_or_else(|| Position::from_start(script));
    Error::new_from_pos(ErrorVariant::CustomError { message }, position)
}

/// Lexes exactly one token starting at `pos`.
fn lex(script: &str, pos: usize, goal: Goal) -> Result<Token, Error<Rule>> {
    let rule = match goal {
        Goal::Div => Rule::input_element_div,
        Goal::RegExp => Rule::input_element_reg_exp,
        Goal::TemplateTail => Rule::input_element_template_tail,
    };
    let rest = &script[pos..];
    let mut pairs = JsParser::parse(rule, rest).map_err(|e| {
        let offset = match e.location {
            InputLocation::Pos(p) => p,
            InputLocation::Span((s, _)) => s,
        };
        error_at(script, pos + offset, "Invalid or unexpected token".to_string())
    })?;
    let element = match pairs.next() {
        Some(element) => element,
        None => return Err(error_at(script, pos, "Expected a token".to_string())),
    };
    let mut newline_before = false;
    for inner in element.into_inner() {
        let token_type = match inner.as_rule() {
            Rule::trivia => {
                newline_before = inner.as_str().contains(is_line_terminator);
                continue;
            }
            Rule::end_of_input => TokenType::EndOfInput,
            Rule::identifier_name => TokenType::IdentifierName,
            Rule::numeric_literal => TokenType::Numeric,
            Rule::string_literal => TokenType::String,
            Rule::template_no_substitution => TokenType::Template,
            Rule::template_head => TokenType::TemplateHead,
            Rule::template_middle => TokenType::TemplateMiddle,
            Rule::template_tail => TokenType::TemplateTail,
            Rule::regular_expression_literal => TokenType::RegularExpression,
            Rule::punctuator | Rule::div_punctuator => TokenType::Punctuator,
            _ => continue,
        };
        let span = inner.as_span();
        return Ok(Token {
            token_type,
            start: pos + span.start(),
            end: pos + span.end(),
            newline_before,
        });
    }
    Err(error_at(script, pos, "Expected a token".to_string()))
}

#[derive(Clone, Copy)]
struct Checkpoint {
    token: Token,
    prev_end: usize,
    next_id: u32,
}

/// Recursive-descent builder over the pest lexer. The current token is always
/// lexed with the division goal; operand positions re-lex it when needed.
struct AstBuilder<'a> {
    script: &'a str,
    token: Token,
    prev_end: usize,
    next_id: u32,
    metavariables: &'a [&'a str],
    allow_in: bool,
    in_generator: bool,
    in_async: bool,
}

impl<'a> AstBuilder<'a> {
    fn new(script: &'a str, metavariables: &'a [&'a str]) -> Result<Self, Error<Rule>> {
        let token = lex(script, 0, Goal::RegExp)?;
        Ok(AstBuilder {
            script,
            token,
            prev_end: 0,
            next_id: 0,
            metavariables,
            allow_in: true,
            in_generator: false,
            in_async: false,
        })
    }

    // ---- token plumbing ----

    fn text(&self, token: &Token) -> &'a str {
        &self.script[token.start..token.end]
    }

    fn current_text(&self) -> &'a str {
        self.text(&self.token)
    }

    fn advance(&mut self) -> Result<(), Error<Rule>> {
        self.prev_end = self.token.end;
        self.token = lex(self.script, self.token.end, Goal::Div)?;
        Ok(())
    }

    fn relex(&mut self, goal: Goal) -> Result<(), Error<Rule>> {
        let newline_before = self.token.newline_before;
        let mut token = lex(self.script, self.token.start, goal)?;
        token.newline_before = newline_before;
        self.token = token;
        Ok(())
    }

    fn peek(&self) -> Result<Token, Error<Rule>> {
        lex(self.script, self.token.end, Goal::Div)
    }

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            token: self.token,
            prev_end: self.prev_end,
            next_id: self.next_id,
        }
    }

    fn restore(&mut self, checkpoint: Checkpoint) {
        self.token = checkpoint.token;
        self.prev_end = checkpoint.prev_end;
        self.next_id = checkpoint.next_id;
    }

    fn is_punct(&self, punct: &str) -> bool {
        self.token.token_type == TokenType::Punctuator && self.current_text() == punct
    }

    fn is_word(&self, word: &str) -> bool {
        self.token.token_type == TokenType::IdentifierName && self.current_text() == word
    }

    fn token_is_punct(&self, token: &Token, punct: &str) -> bool {
        token.token_type == TokenType::Punctuator && self.text(token) == punct
    }

    fn eat(&mut self, punct: &str) -> Result<bool, Error<Rule>> {
        if self.is_punct(punct) {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn expect(&mut self, punct: &str) -> Result<(), Error<Rule>> {
        if self.is_punct(punct) {
            self.advance()
        } else {
            Err(self.unexpected())
        }
    }

    fn expect_word(&mut self, word: &str) -> Result<(), Error<Rule>> {
        if self.is_word(word) {
            self.advance()
        } else {
            Err(self.unexpected())
        }
    }

    fn unexpected(&self) -> Error<Rule> {
        let message = match self.token.token_type {
            TokenType::EndOfInput => "Unexpected end of input".to_string(),
            _ => format!("Unexpected token `{}`", self.current_text()),
        };
        error_at(self.script, self.token.start, message)
    }

    fn is_reserved(word: &str) -> bool {
        RESERVED_WORDS.contains(&word)
    }

    fn at_identifier(&self) -> bool {
        self.token.token_type == TokenType::IdentifierName
            && !Self::is_reserved(self.current_text())
            && !(self.in_generator && self.is_word("yield"))
    }

    fn consume_semicolon(&mut self) -> Result<(), Error<Rule>> {
        if self.is_punct(";") {
            return self.advance();
        }
        if self.is_punct("}")
            || self.token.token_type == TokenType::EndOfInput
            || self.token.newline_before
        {
            return Ok(());
        }
        Err(self.unexpected())
    }

    fn can_insert_semicolon(&self) -> bool {
        self.is_punct(";")
            || self.is_punct("}")
            || self.token.token_type == TokenType::EndOfInput
            || self.token.newline_before
    }

    fn with_in<T, F>(&mut self, allow_in: bool, build: F) -> Result<T, Error<Rule>>
    where
        F: FnOnce(&mut Self) -> Result<T, Error<Rule>>,
    {
        let saved = self.allow_in;
        self.allow_in = allow_in;
        let result = build(self);
        self.allow_in = saved;
        result
    }

    // ---- node plumbing ----

    fn finish(&mut self, start: usize, kind: NodeKind) -> Node {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        Node::new(id, start, self.prev_end, kind)
    }

    fn finish_at(&mut self, start: usize, end: usize, kind: NodeKind) -> Node {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        Node::new(id, start, end, kind)
    }

    fn identifier_kind(&self, name: &str) -> NodeKind {
        if self
            .metavariables
            .iter()
            .any(|m| m.eq_ignore_ascii_case(name))
        {
            NodeKind::Metavariable {
                name: name.to_string(),
            }
        } else {
            NodeKind::Identifier {
                name: name.to_string(),
            }
        }
    }

    /// Any identifier name, keywords included (property names).
    fn build_identifier_name(&mut self) -> Result<Node, Error<Rule>> {
        if self.token.token_type != TokenType::IdentifierName {
            return Err(self.unexpected());
        }
        let start = self.token.start;
        let kind = self.identifier_kind(self.current_text());
        self.advance()?;
        Ok(self.finish(start, kind))
    }

    fn build_identifier(&mut self) -> Result<Node, Error<Rule>> {
        if !self.at_identifier() {
            return Err(self.unexpected());
        }
        self.build_identifier_name()
    }

    // ---- program and statements ----

    fn build_program(&mut self) -> Result<Node, Error<Rule>> {
        let mut body = vec![];
        while self.token.token_type != TokenType::EndOfInput {
            body.push(self.build_statement_list_item()?);
        }
        let end = self.script.len();
        Ok(self.finish_at(0, end, NodeKind::Program { body }))
    }

    fn build_statement_list_item(&mut self) -> Result<Node, Error<Rule>> {
        if self.is_word("function") {
            return self.build_function_declaration(self.token.start, false);
        }
        if self.is_word("async") {
            let next = self.peek()?;
            if !next.newline_before && self.text(&next) == "function" {
                let start = self.token.start;
                self.advance()?;
                return self.build_function_declaration(start, true);
            }
        }
        if self.is_word("class") {
            let start = self.token.start;
            let data = self.build_class(true)?;
            return Ok(self.finish(start, NodeKind::ClassDeclaration(data)));
        }
        if self.is_word("const") || (self.is_word("let") && self.let_starts_declaration()?) {
            let start = self.token.start;
            let declaration = self.build_variable_declaration(start)?;
            self.consume_semicolon()?;
            return Ok(self.with_end(declaration));
        }
        self.build_statement()
    }

    fn with_end(&self, mut node: Node) -> Node {
        node.meta.end_index = self.prev_end;
        node
    }

    fn let_starts_declaration(&self) -> Result<bool, Error<Rule>> {
        let next = self.peek()?;
        Ok(match next.token_type {
            TokenType::IdentifierName => true,
            TokenType::Punctuator => {
                let text = self.text(&next);
                text == "[" || text == "{"
            }
            _ => false,
        })
    }

    fn build_statement(&mut self) -> Result<Node, Error<Rule>> {
        let start = self.token.start;
        if self.token.token_type == TokenType::Punctuator {
            match self.current_text() {
                "{" => return self.build_block(),
                ";" => {
                    self.advance()?;
                    return Ok(self.finish(start, NodeKind::EmptyStatement));
                }
                _ => {}
            }
        }
        if self.token.token_type == TokenType::IdentifierName {
            match self.current_text() {
                "var" => {
                    let declaration = self.build_variable_declaration(start)?;
                    self.consume_semicolon()?;
                    return Ok(self.with_end(declaration));
                }
                "if" => return self.build_if_statement(),
                "for" => return self.build_for_statement(),
                "while" => {
                    self.advance()?;
                    let test = self.build_parenthesized()?;
                    let body = self.build_statement()?;
                    return Ok(self.finish(
                        start,
                        NodeKind::WhileStatement {
                            test: Box::new(test),
                            body: Box::new(body),
                        },
                    ));
                }
                "do" => {
                    self.advance()?;
                    let body = self.build_statement()?;
                    self.expect_word("while")?;
                    let test = self.build_parenthesized()?;
                    self.eat(";")?;
                    return Ok(self.finish(
                        start,
                        NodeKind::DoWhileStatement {
                            body: Box::new(body),
                            test: Box::new(test),
                        },
                    ));
                }
                "continue" | "break" => {
                    let is_break = self.is_word("break");
                    self.advance()?;
                    let label = if !self.can_insert_semicolon() && self.at_identifier() {
                        Some(Box::new(self.build_identifier()?))
                    } else {
                        None
                    };
                    self.consume_semicolon()?;
                    let kind = if is_break {
                        NodeKind::BreakStatement { label }
                    } else {
                        NodeKind::ContinueStatement { label }
                    };
                    return Ok(self.finish(start, kind));
                }
                "return" => {
                    self.advance()?;
                    let argument = if self.can_insert_semicolon() {
                        None
                    } else {
                        Some(Box::new(self.build_expression()?))
                    };
                    self.consume_semicolon()?;
                    return Ok(self.finish(start, NodeKind::ReturnStatement { argument }));
                }
                "throw" => {
                    self.advance()?;
                    if self.token.newline_before {
                        return Err(error_at(
                            self.script,
                            self.token.start,
                            "Illegal newline after throw".to_string(),
                        ));
                    }
                    let argument = self.build_expression()?;
                    self.consume_semicolon()?;
                    return Ok(self.finish(
                        start,
                        NodeKind::ThrowStatement {
                            argument: Box::new(argument),
                        },
                    ));
                }
                "with" => {
                    self.advance()?;
                    let object = self.build_parenthesized()?;
                    let body = self.build_statement()?;
                    return Ok(self.finish(
                        start,
                        NodeKind::WithStatement {
                            object: Box::new(object),
                            body: Box::new(body),
                        },
                    ));
                }
                "switch" => return self.build_switch_statement(),
                "try" => return self.build_try_statement(),
                "debugger" => {
                    self.advance()?;
                    self.consume_semicolon()?;
                    return Ok(self.finish(start, NodeKind::DebuggerStatement));
                }
                "function" => return self.build_function_declaration(start, false),
                _ => {}
            }
            if self.at_identifier() {
                let next = self.peek()?;
                if self.token_is_punct(&next, ":") {
                    let label = self.build_identifier()?;
                    self.expect(":")?;
                    let body = self.build_statement()?;
                    return Ok(self.finish(
                        start,
                        NodeKind::LabeledStatement {
                            label: Box::new(label),
                            body: Box::new(body),
                        },
                    ));
                }
            }
        }
        let expression = self.build_expression()?;
        self.consume_semicolon()?;
        Ok(self.finish(
            start,
            NodeKind::ExpressionStatement {
                expression: Box::new(expression),
            },
        ))
    }

    fn build_block(&mut self) -> Result<Node, Error<Rule>> {
        let start = self.token.start;
        self.expect("{")?;
        let mut body = vec![];
        while !self.is_punct("}") {
            if self.token.token_type == TokenType::EndOfInput {
                return Err(self.unexpected());
            }
            body.push(self.build_statement_list_item()?);
        }
        self.advance()?;
        Ok(self.finish(start, NodeKind::BlockStatement { body }))
    }

    fn build_parenthesized(&mut self) -> Result<Node, Error<Rule>> {
        self.expect("(")?;
        let expression = self.with_in(true, |p| p.build_expression())?;
        self.expect(")")?;
        Ok(expression)
    }

    fn build_if_statement(&mut self) -> Result<Node, Error<Rule>> {
        let start = self.token.start;
        self.advance()?;
        let test = self.build_parenthesized()?;
        let consequent = self.build_statement()?;
        let alternate = if self.is_word("else") {
            self.advance()?;
            Some(Box::new(self.build_statement()?))
        } else {
            None
        };
        Ok(self.finish(
            start,
            NodeKind::IfStatement {
                test: Box::new(test),
                consequent: Box::new(consequent),
                alternate,
            },
        ))
    }

    fn build_switch_statement(&mut self) -> Result<Node, Error<Rule>> {
        let start = self.token.start;
        self.advance()?;
        let discriminant = self.build_parenthesized()?;
        self.expect("{")?;
        let mut cases = vec![];
        while !self.is_punct("}") {
            let case_start = self.token.start;
            let test = if self.is_word("case") {
                self.advance()?;
                Some(Box::new(self.with_in(true, |p| p.build_expression())?))
            } else {
                self.expect_word("default")?;
                None
            };
            self.expect(":")?;
            let mut consequent = vec![];
            while !(self.is_punct("}") || self.is_word("case") || self.is_word("default")) {
                if self.token.token_type == TokenType::EndOfInput {
                    return Err(self.unexpected());
                }
                consequent.push(self.build_statement_list_item()?);
            }
            cases.push(self.finish(case_start, NodeKind::SwitchCase { test, consequent }));
        }
        self.advance()?;
        Ok(self.finish(
            start,
            NodeKind::SwitchStatement {
                discriminant: Box::new(discriminant),
                cases,
            },
        ))
    }

    fn build_try_statement(&mut self) -> Result<Node, Error<Rule>> {
        let start = self.token.start;
        self.advance()?;
        let block = self.build_block()?;
        let handler = if self.is_word("catch") {
            let catch_start = self.token.start;
            self.advance()?;
            let param = if self.eat("(")? {
                let param = self.build_binding_target()?;
                self.expect(")")?;
                Some(Box::new(param))
            } else {
                None
            };
            let body = self.build_block()?;
            Some(Box::new(self.finish(
                catch_start,
                NodeKind::CatchClause {
                    param,
                    body: Box::new(body),
                },
            )))
        } else {
            None
        };
        let finalizer = if self.is_word("finally") {
            self.advance()?;
            Some(Box::new(self.build_block()?))
        } else {
            None
        };
        if handler.is_none() && finalizer.is_none() {
            return Err(self.unexpected());
        }
        Ok(self.finish(
            start,
            NodeKind::TryStatement {
                block: Box::new(block),
                handler,
                finalizer,
            },
        ))
    }

    fn build_for_statement(&mut self) -> Result<Node, Error<Rule>> {
        let start = self.token.start;
        self.advance()?;
        let is_await = if self.in_async && self.is_word("await") {
            self.advance()?;
            true
        } else {
            false
        };
        self.expect("(")?;
        let mut init = None;
        if !self.is_punct(";") {
            let init_start = self.token.start;
            let is_declaration = self.is_word("var")
                || self.is_word("const")
                || (self.is_word("let") && self.let_starts_declaration()?);
            let head = if is_declaration {
                self.with_in(false, |p| p.build_variable_declaration(init_start))?
            } else {
                self.with_in(false, |p| p.build_expression())?
            };
            if self.is_word("in") || self.is_word("of") {
                let is_of = self.is_word("of");
                self.advance()?;
                let left = if is_declaration { head } else { to_pattern(head) };
                let right = if is_of {
                    self.with_in(true, |p| p.build_assignment())?
                } else {
                    self.with_in(true, |p| p.build_expression())?
                };
                self.expect(")")?;
                let body = self.build_statement()?;
                let kind = if is_of {
                    NodeKind::ForOfStatement {
                        left: Box::new(left),
                        right: Box::new(right),
                        body: Box::new(body),
                        is_await,
                    }
                } else {
                    NodeKind::ForInStatement {
                        left: Box::new(left),
                        right: Box::new(right),
                        body: Box::new(body),
                    }
                };
                return Ok(self.finish(start, kind));
            }
            init = Some(Box::new(head));
        }
        self.expect(";")?;
        let test = if self.is_punct(";") {
            None
        } else {
            Some(Box::new(self.with_in(true, |p| p.build_expression())?))
        };
        self.expect(";")?;
        let update = if self.is_punct(")") {
            None
        } else {
            Some(Box::new(self.with_in(true, |p| p.build_expression())?))
        };
        self.expect(")")?;
        let body = self.build_statement()?;
        Ok(self.finish(
            start,
            NodeKind::ForStatement {
                init,
                test,
                update,
                body: Box::new(body),
            },
        ))
    }

    /// `var|let|const` followed by declarators; the caller handles the terminator.
    fn build_variable_declaration(&mut self, start: usize) -> Result<Node, Error<Rule>> {
        let kind = match self.current_text() {
            "var" => VariableKind::Var,
            "let" => VariableKind::Let,
            "const" => VariableKind::Const,
            _ => return Err(self.unexpected()),
        };
        self.advance()?;
        let mut declarations = vec![];
        loop {
            let declarator_start = self.token.start;
            let id = self.build_binding_target()?;
            let init = if self.eat("=")? {
                Some(Box::new(self.build_assignment()?))
            } else {
                None
            };
            declarations.push(self.finish(
                declarator_start,
                NodeKind::VariableDeclarator {
                    id: Box::new(id),
                    init,
                },
            ));
            if !self.eat(",")? {
                break;
            }
        }
        Ok(self.finish(start, NodeKind::VariableDeclaration { kind, declarations }))
    }

    // ---- binding patterns ----

    fn build_binding_target(&mut self) -> Result<Node, Error<Rule>> {
        let start = self.token.start;
        if self.is_punct("[") {
            self.advance()?;
            let mut elements = vec![];
            while !self.is_punct("]") {
                if self.is_punct(",") {
                    self.advance()?;
                    elements.push(None);
                    continue;
                }
                if self.is_punct("...") {
                    let rest_start = self.token.start;
                    self.advance()?;
                    let argument = self.build_binding_target()?;
                    elements.push(Some(self.finish(
                        rest_start,
                        NodeKind::RestElement {
                            argument: Box::new(argument),
                        },
                    )));
                } else {
                    elements.push(Some(self.build_binding_element()?));
                }
                if !self.is_punct("]") {
                    self.expect(",")?;
                }
            }
            self.advance()?;
            return Ok(self.finish(start, NodeKind::ArrayPattern { elements }));
        }
        if self.is_punct("{") {
            self.advance()?;
            let mut properties = vec![];
            while !self.is_punct("}") {
                let property_start = self.token.start;
                if self.is_punct("...") {
                    self.advance()?;
                    let argument = self.build_binding_target()?;
                    properties.push(self.finish(
                        property_start,
                        NodeKind::RestElement {
                            argument: Box::new(argument),
                        },
                    ));
                } else {
                    let (key, computed) = self.build_property_key()?;
                    let (value, shorthand) = if self.eat(":")? {
                        (self.build_binding_element()?, false)
                    } else {
                        let name = match key.identifier_name() {
                            Some(name) if !computed => name.to_string(),
                            _ => return Err(self.unexpected()),
                        };
                        let value = self.finish_at(
                            key.meta.start_index,
                            key.meta.end_index,
                            NodeKind::Identifier { name },
                        );
                        (self.build_default_value(value)?, true)
                    };
                    properties.push(self.finish(
                        property_start,
                        NodeKind::Property {
                            key: Box::new(key),
                            value: Box::new(value),
                            kind: PropertyKind::Init,
                            method: false,
                            shorthand,
                            computed,
                        },
                    ));
                }
                if !self.is_punct("}") {
                    self.expect(",")?;
                }
            }
            self.advance()?;
            return Ok(self.finish(start, NodeKind::ObjectPattern { properties }));
        }
        self.build_identifier()
    }

    fn build_binding_element(&mut self) -> Result<Node, Error<Rule>> {
        let target = self.build_binding_target()?;
        self.build_default_value(target)
    }

    fn build_default_value(&mut self, target: Node) -> Result<Node, Error<Rule>> {
        if !self.is_punct("=") {
            return Ok(target);
        }
        self.advance()?;
        let start = target.meta.start_index;
        let right = self.with_in(true, |p| p.build_assignment())?;
        Ok(self.finish(
            start,
            NodeKind::AssignmentPattern {
                left: Box::new(target),
                right: Box::new(right),
            },
        ))
    }

    fn build_formal_parameters(&mut self) -> Result<Vec<Node>, Error<Rule>> {
        self.expect("(")?;
        let mut params = vec![];
        while !self.is_punct(")") {
            if self.is_punct("...") {
                let start = self.token.start;
                self.advance()?;
                let argument = self.build_binding_target()?;
                params.push(self.finish(
                    start,
                    NodeKind::RestElement {
                        argument: Box::new(argument),
                    },
                ));
            } else {
                params.push(self.build_binding_element()?);
            }
            if !self.is_punct(")") {
                self.expect(",")?;
            }
        }
        self.advance()?;
        Ok(params)
    }

    // ---- functions and classes ----

    fn build_function_declaration(
        &mut self,
        start: usize,
        is_async: bool,
    ) -> Result<Node, Error<Rule>> {
        let data = self.build_function(is_async)?;
        Ok(self.finish(start, NodeKind::FunctionDeclaration(data)))
    }

    /// Current token is the `function` keyword.
    fn build_function(&mut self, is_async: bool) -> Result<FunctionData, Error<Rule>> {
        self.expect_word("function")?;
        let generator = self.eat("*")?;
        let id = if self.at_identifier() {
            Some(Box::new(self.build_identifier()?))
        } else {
            None
        };
        self.build_function_rest(id, generator, is_async)
    }

    fn build_function_rest(
        &mut self,
        id: Option<Box<Node>>,
        generator: bool,
        is_async: bool,
    ) -> Result<FunctionData, Error<Rule>> {
        let saved = (self.in_generator, self.in_async);
        self.in_generator = generator;
        self.in_async = is_async;
        let result = self
            .build_formal_parameters()
            .and_then(|params| Ok((params, self.build_function_body()?)));
        self.in_generator = saved.0;
        self.in_async = saved.1;
        let (params, body) = result?;
        Ok(FunctionData {
            id,
            params,
            body: Box::new(body),
            generator,
            is_async,
            expression: false,
        })
    }

    fn build_function_body(&mut self) -> Result<Node, Error<Rule>> {
        self.with_in(true, |p| p.build_block())
    }

    /// Builds a method's function value; the current token is `(`.
    fn build_method_function(
        &mut self,
        generator: bool,
        is_async: bool,
    ) -> Result<Node, Error<Rule>> {
        let start = self.token.start;
        let data = self.build_function_rest(None, generator, is_async)?;
        Ok(self.finish(start, NodeKind::FunctionExpression(data)))
    }

    /// Current token is the `class` keyword.
    fn build_class(&mut self, is_declaration: bool) -> Result<ClassData, Error<Rule>> {
        self.expect_word("class")?;
        let id = if self.at_identifier() && !self.is_word("extends") {
            Some(Box::new(self.build_identifier()?))
        } else if is_declaration {
            return Err(self.unexpected());
        } else {
            None
        };
        let super_class = if self.is_word("extends") {
            self.advance()?;
            Some(Box::new(self.build_left_hand_side()?))
        } else {
            None
        };
        let body_start = self.token.start;
        self.expect("{")?;
        let mut body = vec![];
        while !self.is_punct("}") {
            if self.eat(";")? {
                continue;
            }
            body.push(self.build_class_element()?);
        }
        self.advance()?;
        let body = self.finish(body_start, NodeKind::ClassBody { body });
        Ok(ClassData {
            id,
            super_class,
            body: Box::new(body),
        })
    }

    fn next_is_member_name(&self) -> Result<bool, Error<Rule>> {
        let next = self.peek()?;
        if next.newline_before && next.token_type == TokenType::IdentifierName {
            return Ok(true);
        }
        Ok(!(self.token_is_punct(&next, "(")
            || self.token_is_punct(&next, "=")
            || self.token_is_punct(&next, ";")
            || self.token_is_punct(&next, "}")
            || self.token_is_punct(&next, ",")
            || self.token_is_punct(&next, ":")))
    }

    fn build_class_element(&mut self) -> Result<Node, Error<Rule>> {
        let start = self.token.start;
        let is_static = if self.is_word("static") && self.next_is_member_name()? {
            self.advance()?;
            true
        } else {
            false
        };
        let is_async = if self.is_word("async")
            && self.next_is_member_name()?
            && !self.peek()?.newline_before
        {
            self.advance()?;
            true
        } else {
            false
        };
        let generator = self.eat("*")?;
        let mut kind = MethodKind::Method;
        if !is_async && !generator && (self.is_word("get") || self.is_word("set")) {
            if self.next_is_member_name()? {
                kind = if self.is_word("get") {
                    MethodKind::Get
                } else {
                    MethodKind::Set
                };
                self.advance()?;
            }
        }
        let (key, computed) = self.build_property_key()?;
        if self.is_punct("(") {
            if kind == MethodKind::Method
                && !is_static
                && !computed
                && key.identifier_name() == Some("constructor")
            {
                kind = MethodKind::Constructor;
            }
            let value = self.build_method_function(generator, is_async)?;
            return Ok(self.finish(
                start,
                NodeKind::MethodDefinition {
                    key: Box::new(key),
                    value: Box::new(value),
                    kind,
                    computed,
                    is_static,
                },
            ));
        }
        if is_async || generator || kind != MethodKind::Method {
            return Err(self.unexpected());
        }
        let value = if self.eat("=")? {
            Some(Box::new(self.with_in(true, |p| p.build_assignment())?))
        } else {
            None
        };
        self.consume_semicolon()?;
        Ok(self.finish(
            start,
            NodeKind::PropertyDefinition {
                key: Box::new(key),
                value,
                computed,
                is_static,
            },
        ))
    }

    /// Returns the key node and whether it was computed.
    fn build_property_key(&mut self) -> Result<(Node, bool), Error<Rule>> {
        let start = self.token.start;
        match self.token.token_type {
            TokenType::IdentifierName => Ok((self.build_identifier_name()?, false)),
            TokenType::String | TokenType::Numeric => Ok((self.build_literal()?, false)),
            TokenType::Punctuator if self.is_punct("[") => {
                self.advance()?;
                let key = self.with_in(true, |p| p.build_assignment())?;
                self.expect("]")?;
                Ok((key, true))
            }
            TokenType::Punctuator if self.is_punct("#") => {
                self.advance()?;
                if self.token.start != start + 1
                    || self.token.token_type != TokenType::IdentifierName
                {
                    return Err(self.unexpected());
                }
                let name = format!("#{}", self.current_text());
                self.advance()?;
                Ok((self.finish(start, NodeKind::Identifier { name }), false))
            }
            _ => Err(self.unexpected()),
        }
    }

    // ---- expressions ----

    fn build_expression(&mut self) -> Result<Node, Error<Rule>> {
        let start = self.token.start;
        let first = self.build_assignment()?;
        if !self.is_punct(",") {
            return Ok(first);
        }
        let mut expressions = vec![first];
        while self.eat(",")? {
            expressions.push(self.build_assignment()?);
        }
        Ok(self.finish(start, NodeKind::SequenceExpression { expressions }))
    }

    fn build_assignment(&mut self) -> Result<Node, Error<Rule>> {
        if self.in_generator && self.is_word("yield") {
            return self.build_yield();
        }
        if self.is_punct("(") || self.at_identifier() {
            if let Some(arrow) = self.build_arrow_function_if_present()? {
                return Ok(arrow);
            }
        }
        let start = self.token.start;
        let left = self.build_conditional()?;
        if self.token.token_type == TokenType::Punctuator
            && ASSIGNMENT_OPERATORS.contains(&self.current_text())
        {
            let operator = self.current_text().to_string();
            let left = if operator == "=" { to_pattern(left) } else { left };
            self.advance()?;
            let right = self.build_assignment()?;
            return Ok(self.finish(
                start,
                NodeKind::AssignmentExpression {
                    operator,
                    left: Box::new(left),
                    right: Box::new(right),
                },
            ));
        }
        Ok(left)
    }

    fn build_yield(&mut self) -> Result<Node, Error<Rule>> {
        let start = self.token.start;
        self.advance()?;
        let delegate = !self.token.newline_before && self.eat("*")?;
        let ends_here = self.can_insert_semicolon()
            || self.is_punct(")")
            || self.is_punct("]")
            || self.is_punct(",")
            || self.is_punct(":");
        let argument = if delegate || !ends_here {
            Some(Box::new(self.build_assignment()?))
        } else {
            None
        };
        Ok(self.finish(start, NodeKind::YieldExpression { argument, delegate }))
    }

    /// Tries `(params) =>`, `x =>`, `async (params) =>` and `async x =>`,
    /// rewinding when the head turns out to be an ordinary expression.
    fn build_arrow_function_if_present(&mut self) -> Result<Option<Node>, Error<Rule>> {
        let start = self.token.start;
        let checkpoint = self.checkpoint();
        let mut is_async = false;
        if self.is_word("async") {
            let next = self.peek()?;
            let next_is_head = next.token_type == TokenType::IdentifierName
                || self.token_is_punct(&next, "(");
            if !next.newline_before && next_is_head && self.text(&next) != "function" {
                self.advance()?;
                is_async = true;
            }
        }
        let saved = (self.in_generator, self.in_async);
        self.in_generator = false;
        self.in_async = is_async;
        let params = if self.is_punct("(") {
            self.build_formal_parameters().ok()
        } else if self.at_identifier() {
            self.build_identifier().ok().map(|id| vec![id])
        } else {
            None
        };
        let params = match params {
            Some(params) if self.is_punct("=>") && !self.token.newline_before => params,
            _ => {
                self.in_generator = saved.0;
                self.in_async = saved.1;
                self.restore(checkpoint);
                return Ok(None);
            }
        };
        let body = self.advance().and_then(|_| {
            if self.is_punct("{") {
                self.build_function_body().map(|b| (b, false))
            } else {
                self.build_assignment().map(|b| (b, true))
            }
        });
        self.in_generator = saved.0;
        self.in_async = saved.1;
        let (body, expression) = body?;
        let data = FunctionData {
            id: None,
            params,
            body: Box::new(body),
            generator: false,
            is_async,
            expression,
        };
        Ok(Some(self.finish(start, NodeKind::ArrowFunctionExpression(data))))
    }

    fn build_conditional(&mut self) -> Result<Node, Error<Rule>> {
        let start = self.token.start;
        let test = self.build_binary(1)?;
        if !self.is_punct("?") {
            return Ok(test);
        }
        self.advance()?;
        let consequent = self.with_in(true, |p| p.build_assignment())?;
        self.expect(":")?;
        let alternate = self.build_assignment()?;
        Ok(self.finish(
            start,
            NodeKind::ConditionalExpression {
                test: Box::new(test),
                consequent: Box::new(consequent),
                alternate: Box::new(alternate),
            },
        ))
    }

    fn binary_precedence(&self) -> Option<u8> {
        let text = self.current_text();
        match self.token.token_type {
            TokenType::Punctuator => Some(match text {
                "??" => 1,
                "||" => 2,
                "&&" => 3,
                "|" => 4,
                "^" => 5,
                "&" => 6,
                "==" | "!=" | "===" | "!==" => 7,
                "<" | ">" | "<=" | ">=" => 8,
                "<<" | ">>" | ">>>" => 9,
                "+" | "-" => 10,
                "*" | "/" | "%" => 11,
                "**" => 12,
                _ => return None,
            }),
            TokenType::IdentifierName => match text {
                "instanceof" => Some(8),
                "in" if self.allow_in => Some(8),
                _ => None,
            },
            _ => None,
        }
    }

    fn build_binary(&mut self, min_precedence: u8) -> Result<Node, Error<Rule>> {
        let mut left = self.build_unary()?;
        while let Some(precedence) = self.binary_precedence() {
            if precedence < min_precedence {
                break;
            }
            let operator = self.current_text().to_string();
            self.advance()?;
            let next_min = if operator == "**" {
                precedence
            } else {
                precedence + 1
            };
            let right = self.build_binary(next_min)?;
            let start = left.meta.start_index;
            let kind = if operator == "||" || operator == "&&" || operator == "??" {
                NodeKind::LogicalExpression {
                    operator,
                    left: Box::new(left),
                    right: Box::new(right),
                }
            } else {
                NodeKind::BinaryExpression {
                    operator,
                    left: Box::new(left),
                    right: Box::new(right),
                }
            };
            left = self.finish(start, kind);
        }
        Ok(left)
    }

    fn build_unary(&mut self) -> Result<Node, Error<Rule>> {
        let start = self.token.start;
        let is_unary_operator = match self.token.token_type {
            TokenType::Punctuator => matches!(self.current_text(), "!" | "~" | "+" | "-"),
            TokenType::IdentifierName => {
                matches!(self.current_text(), "typeof" | "void" | "delete")
            }
            _ => false,
        };
        if is_unary_operator {
            let operator = self.current_text().to_string();
            self.advance()?;
            let argument = self.build_unary()?;
            return Ok(self.finish(
                start,
                NodeKind::UnaryExpression {
                    operator,
                    prefix: true,
                    argument: Box::new(argument),
                },
            ));
        }
        if self.is_punct("++") || self.is_punct("--") {
            let operator = self.current_text().to_string();
            self.advance()?;
            let argument = self.build_unary()?;
            return Ok(self.finish(
                start,
                NodeKind::UpdateExpression {
                    operator,
                    prefix: true,
                    argument: Box::new(argument),
                },
            ));
        }
        if self.in_async && self.is_word("await") {
            self.advance()?;
            let argument = self.build_unary()?;
            return Ok(self.finish(
                start,
                NodeKind::AwaitExpression {
                    argument: Box::new(argument),
                },
            ));
        }
        let expression = self.build_left_hand_side()?;
        if (self.is_punct("++") || self.is_punct("--")) && !self.token.newline_before {
            let operator = self.current_text().to_string();
            self.advance()?;
            return Ok(self.finish(
                start,
                NodeKind::UpdateExpression {
                    operator,
                    prefix: false,
                    argument: Box::new(expression),
                },
            ));
        }
        Ok(expression)
    }

    /// Member accesses, calls, `new`, optional chains and tagged templates.
    fn build_left_hand_side(&mut self) -> Result<Node, Error<Rule>> {
        let start = self.token.start;
        let mut expression = if self.is_word("new") {
            self.build_new()?
        } else if self.is_word("super") {
            self.advance()?;
            self.finish(start, NodeKind::Super)
        } else {
            self.build_primary()?
        };
        let mut in_chain = false;
        loop {
            if self.is_punct(".") {
                self.advance()?;
                let property = self.build_member_name()?;
                expression = self.member(start, expression, property, false, false);
            } else if self.is_punct("?.") {
                self.advance()?;
                in_chain = true;
                if self.is_punct("(") {
                    let arguments = self.build_arguments()?;
                    expression = self.finish(
                        start,
                        NodeKind::CallExpression {
                            callee: Box::new(expression),
                            arguments,
                            optional: true,
                        },
                    );
                } else if self.is_punct("[") {
                    let property = self.build_computed_member()?;
                    expression = self.member(start, expression, property, true, true);
                } else {
                    let property = self.build_member_name()?;
                    expression = self.member(start, expression, property, false, true);
                }
            } else if self.is_punct("[") {
                let property = self.build_computed_member()?;
                expression = self.member(start, expression, property, true, false);
            } else if self.is_punct("(") {
                let arguments = self.build_arguments()?;
                expression = self.finish(
                    start,
                    NodeKind::CallExpression {
                        callee: Box::new(expression),
                        arguments,
                        optional: false,
                    },
                );
            } else if matches!(
                self.token.token_type,
                TokenType::Template | TokenType::TemplateHead
            ) {
                let quasi = self.build_template_literal()?;
                expression = self.finish(
                    start,
                    NodeKind::TaggedTemplateExpression {
                        tag: Box::new(expression),
                        quasi: Box::new(quasi),
                    },
                );
            } else {
                break;
            }
        }
        if in_chain {
            expression = self.finish(
                start,
                NodeKind::ChainExpression {
                    expression: Box::new(expression),
                },
            );
        }
        Ok(expression)
    }

    fn member(
        &mut self,
        start: usize,
        object: Node,
        property: Node,
        computed: bool,
        optional: bool,
    ) -> Node {
        self.finish(
            start,
            NodeKind::MemberExpression {
                object: Box::new(object),
                property: Box::new(property),
                computed,
                optional,
            },
        )
    }

    fn build_member_name(&mut self) -> Result<Node, Error<Rule>> {
        if self.is_punct("#") {
            return self.build_property_key().map(|(key, _)| key);
        }
        self.build_identifier_name()
    }

    fn build_computed_member(&mut self) -> Result<Node, Error<Rule>> {
        self.expect("[")?;
        let property = self.with_in(true, |p| p.build_expression())?;
        self.expect("]")?;
        Ok(property)
    }

    fn build_new(&mut self) -> Result<Node, Error<Rule>> {
        let start = self.token.start;
        let meta_start = self.token.start;
        self.expect_word("new")?;
        if self.is_punct(".") {
            let meta = self.finish(
                meta_start,
                NodeKind::Identifier {
                    name: "new".to_string(),
                },
            );
            self.advance()?;
            let property = self.build_identifier_name()?;
            return Ok(self.finish(
                start,
                NodeKind::MetaProperty {
                    meta: Box::new(meta),
                    property: Box::new(property),
                },
            ));
        }
        let callee_start = self.token.start;
        let mut callee = if self.is_word("new") {
            self.build_new()?
        } else {
            self.build_primary()?
        };
        loop {
            if self.is_punct(".") {
                self.advance()?;
                let property = self.build_member_name()?;
                callee = self.member(callee_start, callee, property, false, false);
            } else if self.is_punct("[") {
                let property = self.build_computed_member()?;
                callee = self.member(callee_start, callee, property, true, false);
            } else {
                break;
            }
        }
        let arguments = if self.is_punct("(") {
            self.build_arguments()?
        } else {
            vec![]
        };
        Ok(self.finish(
            start,
            NodeKind::NewExpression {
                callee: Box::new(callee),
                arguments,
            },
        ))
    }

    fn build_arguments(&mut self) -> Result<Vec<Node>, Error<Rule>> {
        self.expect("(")?;
        self.with_in(true, |p| {
            let mut arguments = vec![];
            while !p.is_punct(")") {
                if p.is_punct("...") {
                    let start = p.token.start;
                    p.advance()?;
                    let argument = p.build_assignment()?;
                    arguments.push(p.finish(
                        start,
                        NodeKind::SpreadElement {
                            argument: Box::new(argument),
                        },
                    ));
                } else {
                    arguments.push(p.build_assignment()?);
                }
                if !p.is_punct(")") {
                    p.expect(",")?;
                }
            }
            p.advance()?;
            Ok(arguments)
        })
    }

    fn build_primary(&mut self) -> Result<Node, Error<Rule>> {
        let start = self.token.start;
        match self.token.token_type {
            TokenType::IdentifierName => match self.current_text() {
                "this" => {
                    self.advance()?;
                    Ok(self.finish(start, NodeKind::ThisExpression))
                }
                "null" | "true" | "false" => self.build_literal(),
                "function" => {
                    let data = self.build_function(false)?;
                    Ok(self.finish(start, NodeKind::FunctionExpression(data)))
                }
                "async" => {
                    let next = self.peek()?;
                    if !next.newline_before && self.text(&next) == "function" {
                        self.advance()?;
                        let data = self.build_function(true)?;
                        Ok(self.finish(start, NodeKind::FunctionExpression(data)))
                    } else {
                        self.build_identifier()
                    }
                }
                "class" => {
                    let data = self.build_class(false)?;
                    Ok(self.finish(start, NodeKind::ClassExpression(data)))
                }
                _ => self.build_identifier(),
            },
            TokenType::Numeric | TokenType::String => self.build_literal(),
            TokenType::Template | TokenType::TemplateHead => self.build_template_literal(),
            TokenType::Punctuator => match self.current_text() {
                "(" => self.build_parenthesized(),
                "[" => self.build_array_literal(),
                "{" => self.build_object_literal(),
                "/" | "/=" => {
                    self.relex(Goal::RegExp)?;
                    self.build_literal()
                }
                _ => Err(self.unexpected()),
            },
            _ => Err(self.unexpected()),
        }
    }

    fn build_literal(&mut self) -> Result<Node, Error<Rule>> {
        let start = self.token.start;
        let raw = self.current_text();
        let value = match self.token.token_type {
            TokenType::IdentifierName => match raw {
                "null" => LiteralValue::Null,
                "true" => LiteralValue::Boolean(true),
                "false" => LiteralValue::Boolean(false),
                _ => return Err(self.unexpected()),
            },
            TokenType::String => LiteralValue::String(cook_string(&raw[1..raw.len() - 1])),
            TokenType::Numeric => match parse_numeric_literal(raw) {
                Some(value) => value,
                None => {
                    return Err(error_at(
                        self.script,
                        start,
                        format!("Invalid number `{}`", raw),
                    ))
                }
            },
            TokenType::RegularExpression => {
                let (pattern, flags) = split_regular_expression(raw);
                LiteralValue::RegExp {
                    pattern: pattern.to_string(),
                    flags: flags.to_string(),
                }
            }
            _ => return Err(self.unexpected()),
        };
        self.advance()?;
        Ok(self.finish(
            start,
            NodeKind::Literal {
                value,
                raw: raw.to_string(),
            },
        ))
    }

    fn build_template_literal(&mut self) -> Result<Node, Error<Rule>> {
        let start = self.token.start;
        let mut quasis = vec![];
        let mut expressions = vec![];
        loop {
            let token = self.token;
            let raw_text = self.current_text();
            let (tail, closing) = match token.token_type {
                TokenType::Template | TokenType::TemplateTail => (true, 1),
                TokenType::TemplateHead | TokenType::TemplateMiddle => (false, 2),
                _ => return Err(self.unexpected()),
            };
            let raw = &raw_text[1..raw_text.len() - closing];
            let element = self.finish_at(
                token.start + 1,
                token.end - closing,
                NodeKind::TemplateElement {
                    raw: raw.to_string(),
                    cooked: Some(cook_string(&raw.replace("\r\n", "\n"))),
                    tail,
                },
            );
            quasis.push(element);
            self.advance()?;
            if tail {
                break;
            }
            expressions.push(self.with_in(true, |p| p.build_expression())?);
            if !self.is_punct("}") {
                return Err(self.unexpected());
            }
            self.relex(Goal::TemplateTail)?;
        }
        Ok(self.finish(start, NodeKind::TemplateLiteral { quasis, expressions }))
    }

    fn build_array_literal(&mut self) -> Result<Node, Error<Rule>> {
        let start = self.token.start;
        self.expect("[")?;
        let elements = self.with_in(true, |p| {
            let mut elements = vec![];
            while !p.is_punct("]") {
                if p.is_punct(",") {
                    p.advance()?;
                    elements.push(None);
                    continue;
                }
                if p.is_punct("...") {
                    let spread_start = p.token.start;
                    p.advance()?;
                    let argument = p.build_assignment()?;
                    elements.push(Some(p.finish(
                        spread_start,
                        NodeKind::SpreadElement {
                            argument: Box::new(argument),
                        },
                    )));
                } else {
                    elements.push(Some(p.build_assignment()?));
                }
                if !p.is_punct("]") {
                    p.expect(",")?;
                }
            }
            p.advance()?;
            Ok(elements)
        })?;
        Ok(self.finish(start, NodeKind::ArrayExpression { elements }))
    }

    fn build_object_literal(&mut self) -> Result<Node, Error<Rule>> {
        let start = self.token.start;
        self.expect("{")?;
        let properties = self.with_in(true, |p| {
            let mut properties = vec![];
            while !p.is_punct("}") {
                properties.push(p.build_object_property()?);
                if !p.is_punct("}") {
                    p.expect(",")?;
                }
            }
            p.advance()?;
            Ok(properties)
        })?;
        Ok(self.finish(start, NodeKind::ObjectExpression { properties }))
    }

    fn build_object_property(&mut self) -> Result<Node, Error<Rule>> {
        let start = self.token.start;
        if self.is_punct("...") {
            self.advance()?;
            let argument = self.build_assignment()?;
            return Ok(self.finish(
                start,
                NodeKind::SpreadElement {
                    argument: Box::new(argument),
                },
            ));
        }
        let is_async = if self.is_word("async")
            && self.next_is_member_name()?
            && !self.peek()?.newline_before
        {
            self.advance()?;
            true
        } else {
            false
        };
        let generator = self.eat("*")?;
        let mut kind = PropertyKind::Init;
        if !is_async && !generator && (self.is_word("get") || self.is_word("set")) {
            if self.next_is_member_name()? {
                kind = if self.is_word("get") {
                    PropertyKind::Get
                } else {
                    PropertyKind::Set
                };
                self.advance()?;
            }
        }
        let (key, computed) = self.build_property_key()?;
        let (value, method, shorthand) = if kind != PropertyKind::Init {
            (self.build_method_function(false, false)?, false, false)
        } else if self.is_punct("(") {
            (self.build_method_function(generator, is_async)?, true, false)
        } else if is_async || generator {
            return Err(self.unexpected());
        } else if self.eat(":")? {
            (self.build_assignment()?, false, false)
        } else {
            let name = match (&key.kind, computed) {
                (NodeKind::Identifier { name }, false) if !Self::is_reserved(name) => name.clone(),
                (NodeKind::Metavariable { name }, false) => name.clone(),
                _ => return Err(self.unexpected()),
            };
            let kind = self.identifier_kind(&name);
            let identifier = self.finish_at(key.meta.start_index, key.meta.end_index, kind);
            (self.build_default_value(identifier)?, false, true)
        };
        Ok(self.finish(
            start,
            NodeKind::Property {
                key: Box::new(key),
                value: Box::new(value),
                kind,
                method,
                shorthand,
                computed,
            },
        ))
    }
}

/// Reinterprets an expression as an assignment target (`[a, b] = pair`).
fn to_pattern(node: Node) -> Node {
    let Node { meta, kind } = node;
    let kind = match kind {
        NodeKind::ObjectExpression { properties } => NodeKind::ObjectPattern {
            properties: properties.into_iter().map(to_pattern_property).collect(),
        },
        NodeKind::ArrayExpression { elements } => NodeKind::ArrayPattern {
            elements: elements
                .into_iter()
                .map(|element| element.map(to_pattern_element))
                .collect(),
        },
        NodeKind::AssignmentExpression {
            operator,
            left,
            right,
        } if operator == "=" => NodeKind::AssignmentPattern { left, right },
        other => other,
    };
    Node { meta, kind }
}

fn to_pattern_element(node: Node) -> Node {
    let Node { meta, kind } = node;
    match kind {
        NodeKind::SpreadElement { argument } => Node {
            meta,
            kind: NodeKind::RestElement {
                argument: Box::new(to_pattern(*argument)),
            },
        },
        kind => to_pattern(Node { meta, kind }),
    }
}

fn to_pattern_property(node: Node) -> Node {
    let Node { meta, kind } = node;
    match kind {
        NodeKind::Property {
            key,
            value,
            kind,
            method,
            shorthand,
            computed,
        } => Node {
            meta,
            kind: NodeKind::Property {
                key,
                value: Box::new(to_pattern(*value)),
                kind,
                method,
                shorthand,
                computed,
            },
        },
        kind => to_pattern_element(Node { meta, kind }),
    }
}
