pub mod ast;

use thiserror::Error;
use tracing::debug;

use std::vec;

use super::lexer::token::Token;
use super::lexer::{Span, Term};
use super::scope::ScopeChain;

use self::ast::*;

const PRECEDENCES: &[(&str, u32)] = &[
    ("+", 20),
    ("-", 20),
    ("*", 40),
];

/// Binding strength of a binary operator. Unknown operators bind loosest.
pub fn precedence(op: &str) -> u32 {
    PRECEDENCES
        .iter()
        .find(|(known, _)| *known == op)
        .map_or(0, |&(_, prec)| prec)
}

fn at(span: &Option<Span>) -> String {
    match span {
        Some(span) => format!(" at {}", span),
        None => " at end of input".to_owned(),
    }
}

#[derive(Clone, Debug, Error, PartialEq)]
#[error("{message}{}", at(.span))]
pub struct ParseError {
    pub message: String,
    pub span: Option<Span>,
}

impl ParseError {
    fn new(message: impl Into<String>, span: Option<Span>) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

pub type Result<T> = std::result::Result<T, ParseError>;

/// Single pass recursive descent parser with one token of lookahead.
///
/// Identifiers are resolved while parsing: every name has to be bound by a
/// `val`, a `def` or a def parameter visible from the current scope at the
/// point it is referenced.
pub struct Parser {
    tokens: vec::IntoIter<Term>,
    current: Option<Term>,
    scopes: ScopeChain<Vec<String>>,
    anon_index: usize,
    block_depth: usize,
}

impl Parser {
    /// Parses a whole program into its top level block.
    pub fn parse(tokens: Vec<Term>) -> Result<Ast> {
        let mut parser = Self {
            tokens: tokens.into_iter(),
            current: None,
            scopes: ScopeChain::new(),
            anon_index: 0,
            block_depth: 0,
        };

        parser.advance();
        parser.program()
    }

    fn advance(&mut self) {
        self.current = self.tokens.next();
    }

    fn token(&self) -> Option<&Token> {
        self.current.as_ref().map(|(_, token)| token)
    }

    fn span(&self) -> Option<Span> {
        self.current.as_ref().map(|(span, _)| *span)
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::new(message, self.span())
    }

    fn unexpected(&self, expecting: &str) -> ParseError {
        match &self.current {
            Some((span, token)) => ParseError::new(
                format!("unexpected token \"{}\" when expecting {}", token, expecting),
                Some(*span),
            ),
            None => ParseError::new(
                format!("unexpected end of input when expecting {}", expecting),
                None,
            ),
        }
    }

    fn expect(&mut self, expected: Token) -> Result<()> {
        if self.token() == Some(&expected) {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(&format!("\"{}\"", expected)))
        }
    }

    fn name(&mut self, what: &str) -> Result<(Span, String)> {
        match self.current.clone() {
            Some((span, Token::Ident(name))) => {
                self.advance();
                Ok((span, name))
            },
            _ => Err(self.unexpected(what)),
        }
    }

    fn scoped<T, F>(&mut self, name: String, f: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        self.scopes.push(name);
        debug!(scope = %self.scopes.path(), "enter scope");

        let result = f(self);

        debug!(scope = %self.scopes.path(), "leave scope");
        self.scopes.pop();
        result
    }

    fn program(&mut self) -> Result<Ast> {
        let mut body = Vec::new();

        loop {
            match self.token() {
                None => break,
                Some(Token::Newline) => {
                    self.advance();
                    continue;
                },
                _ => {},
            }

            body.push(self.statement()?);
            self.end_of_statement(false)?;
        }

        match body.last() {
            None => Err(ParseError::new("empty program", None)),
            Some(last) if !last.is_expr() => Err(ParseError::new(
                "top level block does not end in expression",
                None,
            )),
            Some(_) => Ok(Ast::Block { body, depth: 0 }),
        }
    }

    fn end_of_statement(&self, in_block: bool) -> Result<()> {
        match self.token() {
            None | Some(Token::Newline) => Ok(()),
            Some(Token::BlockClose) if in_block => Ok(()),
            Some(_) => Err(self.unexpected("a newline after the statement")),
        }
    }

    fn statement(&mut self) -> Result<Ast> {
        match self.token() {
            Some(Token::KwDef) => self.def(),
            Some(Token::KwVal) => self.value(),
            _ => self.expression(),
        }
    }

    // val name = expr
    fn value(&mut self) -> Result<Ast> {
        self.advance(); // eat "val"

        let (span, name) = self.name("value name")?;
        if self.scopes.is_defined_here(&name) {
            return Err(ParseError::new(format!("{} is already defined", name), Some(span)));
        }

        self.expect(Token::Assign)?;
        let expr = self.expression()?;

        self.scopes.define(name.clone(), Vec::new());
        Ok(Ast::Value {
            name,
            expr: Box::new(expr),
        })
    }

    // def name(p1, p2, ...) = expr
    fn def(&mut self) -> Result<Ast> {
        self.advance(); // eat "def"

        let (span, name) = self.name("def name")?;
        if self.scopes.is_defined_here(&name) {
            return Err(ParseError::new(format!("{} is already defined", name), Some(span)));
        }

        let (params, body) = self.scoped(name.clone(), |p| {
            let params = p.params()?;
            for param in &params {
                p.scopes.define(param.clone(), Vec::new());
            }

            p.expect(Token::Assign)?;
            let body = p.expression()?;
            Ok((params, body))
        })?;

        // Bound only after the body, so a def never sees itself.
        self.scopes.define(name.clone(), params.clone());

        Ok(Ast::Def {
            prototype: Prototype { name, params },
            body: Box::new(body),
        })
    }

    fn params(&mut self) -> Result<Vec<String>> {
        let mut params: Vec<String> = Vec::new();

        if self.token() != Some(&Token::ParenOpen) {
            return Ok(params);
        }
        self.advance(); // eat "("

        loop {
            match self.current.clone() {
                Some((span, Token::Ident(param))) => {
                    if params.contains(&param) {
                        return Err(ParseError::new(
                            format!("{} is already defined as another argument", param),
                            Some(span),
                        ));
                    }
                    params.push(param);
                    self.advance();
                },
                Some((_, Token::ParenClose)) | Some((_, Token::Comma)) => {
                    return Err(self.error("expecting an argument"));
                },
                _ => return Err(self.unexpected("an argument name")),
            }

            match self.token() {
                Some(Token::Comma) => self.advance(),
                Some(Token::ParenClose) => {
                    self.advance();
                    return Ok(params);
                },
                Some(Token::Ident(_)) => return Err(self.error("didn't expect another argument")),
                _ => return Err(self.unexpected("arguments or end of arguments, i.e. \")\"")),
            }
        }
    }

    fn expression(&mut self) -> Result<Ast> {
        let lhs = self.primary()?;
        self.binop_rhs(lhs, 0)
    }

    /// Precedence climbing: absorbs operators binding at least `min_prec`.
    fn binop_rhs(&mut self, mut lhs: Ast, min_prec: u32) -> Result<Ast> {
        loop {
            let op = match self.token() {
                Some(Token::BinOp(op)) => op.clone(),
                _ => return Ok(lhs),
            };

            let prec = precedence(&op);
            if prec < min_prec {
                return Ok(lhs);
            }

            self.advance(); // eat op
            let mut rhs = self.primary()?;

            // A tighter operator after rhs takes rhs as its own lhs. Equal
            // precedence does not, which keeps same-tier operators left
            // associative.
            let tighter = match self.token() {
                Some(Token::BinOp(next)) => prec < precedence(next),
                _ => false,
            };
            if tighter {
                rhs = self.binop_rhs(rhs, prec + 1)?;
            }

            lhs = Ast::binop(op, lhs, rhs);
        }
    }

    fn primary(&mut self) -> Result<Ast> {
        let (span, token) = match self.current.clone() {
            Some(term) => term,
            None => return Err(self.unexpected("primary")),
        };

        match token {
            Token::Number(value) => {
                self.advance();
                Ok(Ast::Number(value))
            },
            Token::BlockOpen => self.block(span),
            Token::ParenOpen => self.paren(),
            Token::Ident(name) => {
                if self.scopes.lookup(&name).is_none() {
                    return Err(ParseError::new(
                        format!("unknown identifier \"{}\" in scope {}", name, self.scopes.path()),
                        Some(span),
                    ));
                }
                self.identifier(name)
            },
            _ => Err(self.unexpected("primary")),
        }
    }

    fn paren(&mut self) -> Result<Ast> {
        self.advance(); // eat "("
        let expr = self.expression()?;
        self.expect(Token::ParenClose)?;
        Ok(expr)
    }

    fn identifier(&mut self, name: String) -> Result<Ast> {
        self.advance(); // eat name

        let args = if self.token() == Some(&Token::ParenOpen) {
            self.args()?
        } else {
            Vec::new()
        };

        Ok(Ast::Call { name, args })
    }

    fn args(&mut self) -> Result<Vec<Ast>> {
        self.advance(); // eat "("
        let mut args = Vec::new();

        loop {
            match self.token() {
                Some(Token::ParenClose) | Some(Token::Comma) => {
                    return Err(self.error("expecting an argument"));
                },
                None => return Err(self.unexpected("an argument")),
                _ => {},
            }

            args.push(self.expression()?);

            match self.token() {
                Some(Token::Comma) => self.advance(),
                Some(Token::ParenClose) => {
                    self.advance();
                    return Ok(args);
                },
                Some(Token::Number(_)) | Some(Token::Ident(_))
                | Some(Token::ParenOpen) | Some(Token::BlockOpen) => {
                    return Err(self.error("didn't expect another argument"));
                },
                _ => return Err(self.unexpected("\",\" or \")\"")),
            }
        }
    }

    fn block(&mut self, open: Span) -> Result<Ast> {
        self.advance(); // eat "{"

        let name = format!("anon{}", self.anon_index);
        self.anon_index += 1;
        self.block_depth += 1;
        let depth = self.block_depth;

        let body = self.scoped(name, |p| {
            let mut body = Vec::new();

            loop {
                match p.token() {
                    Some(Token::Newline) => {
                        p.advance();
                        continue;
                    },
                    Some(Token::BlockClose) => break,
                    None => return Err(p.unexpected("\"}\"")),
                    _ => {},
                }

                body.push(p.statement()?);
                p.end_of_statement(true)?;
            }

            p.advance(); // eat "}"
            Ok(body)
        });
        self.block_depth -= 1;
        let mut body = body?;

        match body.last() {
            None => return Err(ParseError::new("empty block", Some(open))),
            Some(last) if !last.is_expr() => {
                return Err(ParseError::new("block does not end in expression", Some(open)));
            },
            Some(_) => {},
        }

        if body.len() == 1 {
            Ok(body.remove(0))
        } else {
            Ok(Ast::Block { body, depth })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn parse(source: &str) -> Result<Ast> {
        Parser::parse(tokenize(source).unwrap())
    }

    fn top_level(source: &str) -> Vec<Ast> {
        match parse(source).unwrap() {
            Ast::Block { body, depth: 0 } => body,
            other => panic!("expected top level block, got {:?}", other),
        }
    }

    fn single(source: &str) -> Ast {
        let mut body = top_level(source);
        assert_eq!(body.len(), 1);
        body.remove(0)
    }

    fn num(value: f64) -> Ast {
        Ast::Number(value)
    }

    fn var(name: &str) -> Ast {
        Ast::Call {
            name: name.to_owned(),
            args: Vec::new(),
        }
    }

    fn message(source: &str) -> String {
        parse(source).unwrap_err().message
    }

    #[test]
    fn multiplication_binds_tighter() {
        assert_eq!(
            single("2 + 3 * 4"),
            Ast::binop("+", num(2.0), Ast::binop("*", num(3.0), num(4.0)))
        );
        assert_eq!(
            single("2 * 3 + 4"),
            Ast::binop("+", Ast::binop("*", num(2.0), num(3.0)), num(4.0))
        );
    }

    #[test]
    fn same_precedence_is_left_associative() {
        assert_eq!(
            single("2 - 3 - 4"),
            Ast::binop("-", Ast::binop("-", num(2.0), num(3.0)), num(4.0))
        );
        assert_eq!(
            single("1 + 2 * 3 - 4"),
            Ast::binop(
                "-",
                Ast::binop("+", num(1.0), Ast::binop("*", num(2.0), num(3.0))),
                num(4.0)
            )
        );
    }

    #[test]
    fn parentheses_group() {
        assert_eq!(
            single("(2 + 3) * 4"),
            Ast::binop("*", Ast::binop("+", num(2.0), num(3.0)), num(4.0))
        );
    }

    #[test]
    fn unknown_operators_bind_loosest() {
        assert_eq!(
            single("2 * 3 ^ 4"),
            Ast::binop("^", Ast::binop("*", num(2.0), num(3.0)), num(4.0))
        );
    }

    #[test]
    fn values_resolve_in_later_statements() {
        let body = top_level("val x = 5\nx");
        assert_eq!(body[1], var("x"));
    }

    #[test]
    fn unknown_identifier_is_an_error() {
        let err = parse("x").unwrap_err();
        assert_eq!(err.message, "unknown identifier \"x\" in scope global");
        assert_eq!(err.span, Some(Span::new(0, 1, 1)));
    }

    #[test]
    fn redefinition_in_same_scope_fails() {
        assert_eq!(message("val x = 5\nval x = 6\nx"), "x is already defined");
        assert_eq!(message("def f = 1\nval f = 2\nf"), "f is already defined");
    }

    #[test]
    fn shadowing_outer_scope_is_allowed() {
        let body = top_level("val x = 1\n{ val x = 2\n x }");
        assert_eq!(
            body[1],
            Ast::Block {
                body: vec![
                    Ast::Value {
                        name: "x".into(),
                        expr: Box::new(num(2.0)),
                    },
                    var("x"),
                ],
                depth: 1,
            }
        );
    }

    #[test]
    fn single_element_block_collapses() {
        assert_eq!(parse("{ 5 }").unwrap(), parse("5").unwrap());
        assert_eq!(parse("{{ 1 + 2 }}").unwrap(), parse("1 + 2").unwrap());
    }

    #[test]
    fn block_must_end_in_expression() {
        assert_eq!(message("{ val x = 1 }"), "block does not end in expression");
        assert_eq!(message("{ }"), "empty block");
        assert_eq!(message("val x = 1"), "top level block does not end in expression");
    }

    #[test]
    fn block_bindings_do_not_leak() {
        assert!(message("{ val y = 1\n y }\ny").starts_with("unknown identifier \"y\""));
    }

    #[test]
    fn unterminated_constructs_fail() {
        assert_eq!(
            message("{ 1"),
            "unexpected end of input when expecting \"}\""
        );
        assert_eq!(
            message("(1 + 2"),
            "unexpected end of input when expecting \")\""
        );
    }

    #[test]
    fn def_with_params_and_call() {
        let body = top_level("def add(a, b) = a + b\nadd(2, 3)");
        assert_eq!(
            body[0],
            Ast::Def {
                prototype: Prototype {
                    name: "add".into(),
                    params: vec!["a".into(), "b".into()],
                },
                body: Box::new(Ast::binop("+", var("a"), var("b"))),
            }
        );
        assert_eq!(
            body[1],
            Ast::Call {
                name: "add".into(),
                args: vec![num(2.0), num(3.0)],
            }
        );
    }

    #[test]
    fn call_arguments_are_full_expressions() {
        let body = top_level("def f(a) = a\nf({ val t = 2\n t * 3 } + 1)");
        match &body[1] {
            Ast::Call { args, .. } => assert_eq!(args.len(), 1),
            other => panic!("expected call, got {:?}", other),
        }
    }

    #[test]
    fn params_are_scoped_to_the_def() {
        assert!(message("def f(a) = a\na").starts_with("unknown identifier \"a\""));
    }

    #[test]
    fn def_cannot_call_itself() {
        assert_eq!(
            message("def f(a) = f(a)\nf(1)"),
            "unknown identifier \"f\" in scope global.f"
        );
    }

    #[test]
    fn no_forward_references() {
        assert!(message("def f(a) = a + y\nval y = 1\nf(2)").starts_with("unknown identifier \"y\""));
    }

    #[test]
    fn malformed_argument_lists() {
        assert_eq!(message("def f(a) = a\nf()"), "expecting an argument");
        assert_eq!(message("def f(a) = a\nf(1,)"), "expecting an argument");
        assert_eq!(message("def f(a, b) = a\nf(1 2)"), "didn't expect another argument");
        assert_eq!(message("def f(a, a) = a\nf(1, 2)"), "a is already defined as another argument");
        assert_eq!(message("def f(a b) = a\n1"), "didn't expect another argument");
        assert_eq!(message("def f(,) = 1\n1"), "expecting an argument");
    }

    #[test]
    fn statements_must_be_separated() {
        assert_eq!(
            message("1 2"),
            "unexpected token \"2.000000\" when expecting a newline after the statement"
        );
    }

    #[test]
    fn anonymous_scopes_are_numbered_in_order() {
        assert_eq!(
            message("{ 1\n 2 }\n{ 3\n z }"),
            "unknown identifier \"z\" in scope global.anon1"
        );
    }

    #[test]
    fn empty_input_is_rejected() {
        assert_eq!(message("\n\n"), "empty program");
    }
}
