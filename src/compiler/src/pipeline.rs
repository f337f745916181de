//! Lex, parse and lower a source text, then either run it through a
//! [`JitSession`] or write it out as bitcode.

use lila_syntax::lexer::{tokenize, Term};
use lila_syntax::parser::ast::Ast;
use lila_syntax::parser::Parser;

use llvm_wrap::prelude::{Context, Module};

use std::path::Path;

use tracing::{debug, info};

use crate::compiler::Compiler;
use crate::error::{LilaError, Result};
use crate::jit::JitSession;

const MODULE_NAME: &str = "lilamodule";

pub fn lex(source: &str, verbose: bool) -> Result<Vec<Term>> {
    let tokens = tokenize(source)?;
    if verbose {
        for (_, token) in &tokens {
            eprintln!("[token] \"{}\"", token);
        }
    }
    Ok(tokens)
}

pub fn parse(source: &str, verbose: bool) -> Result<Ast> {
    let ast = Parser::parse(lex(source, verbose)?)?;
    if verbose {
        eprintln!("[ast] {}", ast);
    }
    Ok(ast)
}

/// Lowers `source` into a fresh module of `context`.
pub fn compile(context: &Context, source: &str, verbose: bool) -> Result<Module> {
    let ast = parse(source, verbose)?;
    let module = Compiler::new(context, MODULE_NAME).compile(&ast)?;
    if verbose {
        eprintln!("{:?}", module);
    }
    Ok(module)
}

/// Compiles `source`, runs its entry function and removes the unit again.
///
/// A failure before the unit is added leaves `jit` untouched.
pub fn run(jit: &mut JitSession, source: &str, verbose: bool) -> Result<f64> {
    let module = compile(jit.context(), source, verbose)?;
    let handle = jit.add_module(module)?;

    let value = jit.run_entry();
    jit.remove_module(handle)?;

    let value = value?;
    debug!(value, "evaluated");
    Ok(value)
}

/// Compiles `source` and writes the module to `output` as LLVM bitcode.
pub fn emit(source: &str, output: &Path, verbose: bool) -> Result<()> {
    let context = Context::new();
    let module = compile(&context, source, verbose)?;

    module.write_bitcode(output).map_err(LilaError::Emit)?;
    info!(output = %output.display(), "wrote bitcode");
    Ok(())
}
