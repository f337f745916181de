use lila_syntax::lexer::LexError;
use lila_syntax::parser::ParseError;

use rustyline::error::ReadlineError;

use thiserror::Error;

use crate::compiler::CodegenError;
use crate::jit::JitError;

/// Any failure of the pipeline, tagged with the stage it came from.
#[derive(Debug, Error)]
pub enum LilaError {
    #[error("[lexer] [error] {0}")]
    Lex(#[from] LexError),
    #[error("[parser] [error] {0}")]
    Parse(#[from] ParseError),
    #[error("[codegen] [error] {0}")]
    Codegen(#[from] CodegenError),
    #[error("[jit] [error] {0}")]
    Jit(#[from] JitError),
    #[error("[emit] [error] {0}")]
    Emit(String),
    #[error("[io] [error] {0}")]
    Io(#[from] std::io::Error),
    #[error("[io] [error] {0}")]
    Readline(#[from] ReadlineError),
}

pub type Result<T> = std::result::Result<T, LilaError>;
