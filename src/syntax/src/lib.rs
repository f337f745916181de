//! Front end of the lila language: tokens, lexer, AST, scopes and parser.

pub mod lexer;
pub mod parser;
pub mod scope;

pub mod prelude {
    pub use super::lexer::token::Token;
    pub use super::lexer::{tokenize, LexError, Lexer, Span, Term};
    pub use super::parser::ast::{Ast, Prototype};
    pub use super::parser::{ParseError, Parser};
    pub use super::scope::ScopeChain;
}
