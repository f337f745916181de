use lila_syntax::parser::ast::{Ast, Prototype};
use lila_syntax::scope::ScopeChain;

use llvm_wrap::analysis::{verify_function, verify_module};
use llvm_wrap::prelude::*;

use thiserror::Error;
use tracing::debug;

mod standard;

pub use self::standard::PRINT_NUMBER;
pub(crate) use self::standard::builtins;

/// Name of the function wrapping the top level statements.
pub const ENTRY_FUNCTION: &str = "anonymous";

#[derive(Clone, Debug, Error, PartialEq)]
#[error("{message} (scope {scope})")]
pub struct CodegenError {
    pub message: String,
    pub scope: String,
}

pub type Result<T> = std::result::Result<T, CodegenError>;

/// What a name resolves to while lowering.
#[derive(Clone, Debug)]
enum Binding {
    Value(AnyValue),
    Function(Function),
}

/// Lowers a parsed program into an LLVM module.
///
/// Scoping is re-derived from the Block and Def structure of the tree,
/// mirroring what the parser did, but bindings map to lowered values.
pub struct Compiler<'ctx> {
    // field order matters as it's the drop order as well
    builder: Builder,
    module: Module,
    context: &'ctx Context,
    pool: CStringInternPool,

    scopes: ScopeChain<Binding>,
    anon_index: usize,
}

impl<'ctx> Compiler<'ctx> {
    pub fn new(context: &'ctx Context, module_name: &str) -> Self {
        let mut pool = CStringInternPool::new();
        let module = context.create_module(pool.intern(module_name));
        let builder = context.create_builder();

        Self {
            builder,
            module,
            context,
            pool,
            scopes: ScopeChain::new(),
            anon_index: 0,
        }
    }

    fn error(&self, message: impl Into<String>) -> CodegenError {
        CodegenError {
            message: message.into(),
            scope: self.scopes.path(),
        }
    }

    fn scoped<T, F>(&mut self, name: String, f: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        self.scopes.push(name);
        let result = f(self);
        self.scopes.pop();
        result
    }

    /// Lowers a top level block into the entry function and hands the
    /// finished module over.
    ///
    /// The entry function evaluates every statement in order, prints the value
    /// of the last one and returns it.
    pub fn compile(mut self, ast: &Ast) -> Result<Module> {
        let body = match ast {
            Ast::Block { body, .. } => body,
            _ => return Err(self.error("can't handle ast, expected a top level block")),
        };

        let print_number = self.init_std();

        let f64_type = self.context.f64_type();
        let entry = self.module.add_function(
            self.pool.intern(ENTRY_FUNCTION),
            Type::function(f64_type, &[]),
        );
        let bb = BasicBlock::append_to(&entry, self.pool.intern("entry"));
        self.builder.position_at_end(&bb);

        let mut last = None;
        for node in body {
            if let Some(value) = self.statement(node)? {
                last = Some(value);
            }
        }

        let last = match last {
            Some(last) => last,
            None => return Err(self.error("top level block does not end in expression")),
        };

        self.builder
            .build_call(&print_number, &[last.clone()], None)
            .map_err(|err| self.error(format!("could not print result: {:?}", err)))?;
        self.builder.build_ret(&last);

        verify_function(&entry).map_err(|message| {
            self.error(format!("something wrong with auto-generated entry function: {}", message))
        })?;
        verify_module(&self.module).map_err(|message| self.error(message))?;

        debug!(module = ?self.module, "lowered module");
        Ok(self.module)
    }

    /// Lowers a block element. Bindings yield no value.
    fn statement(&mut self, ast: &Ast) -> Result<Option<AnyValue>> {
        match ast {
            Ast::Value { name, expr } => {
                let value = self.codegen(expr)?;
                self.scopes.define(name.clone(), Binding::Value(value));
                Ok(None)
            },
            Ast::Def { prototype, body } => {
                let function = self.def(prototype, body)?;
                self.scopes.define(prototype.name.clone(), Binding::Function(function));
                Ok(None)
            },
            expr => self.codegen(expr).map(Some),
        }
    }

    fn codegen(&mut self, ast: &Ast) -> Result<AnyValue> {
        match ast {
            Ast::Number(num) => Ok(self.builder.build_const_fp(self.context.f64_type(), *num)),
            Ast::BinOp { op, lhs, rhs } => {
                let lhs = self.codegen(lhs)?;
                let rhs = self.codegen(rhs)?;
                match op.as_str() {
                    "+" => Ok(self.builder.build_fp_add(&lhs, &rhs, Some(self.pool.intern("addtmp")))),
                    "-" => Ok(self.builder.build_fp_sub(&lhs, &rhs, Some(self.pool.intern("subtmp")))),
                    "*" => Ok(self.builder.build_fp_mul(&lhs, &rhs, Some(self.pool.intern("multmp")))),
                    _ => Err(self.error(format!("unknown operator \"{}\"", op))),
                }
            },
            Ast::Call { name, args } => self.call(name, args),
            Ast::Block { body, .. } => self.block(body),
            Ast::Value { .. } | Ast::Def { .. } => {
                Err(self.error(format!("expected an expression, found \"{}\"", ast)))
            },
        }
    }

    fn block(&mut self, body: &[Ast]) -> Result<AnyValue> {
        let name = format!("anon{}", self.anon_index);
        self.anon_index += 1;

        self.scoped(name, |c| {
            let mut last = None;
            for node in body {
                if let Some(value) = c.statement(node)? {
                    last = Some(value);
                }
            }

            match last {
                Some(last) => Ok(last),
                None => Err(c.error("block does not end in expression")),
            }
        })
    }

    fn call(&mut self, name: &str, args: &[Ast]) -> Result<AnyValue> {
        match self.scopes.lookup(name).cloned() {
            Some(Binding::Value(value)) => {
                if args.is_empty() {
                    Ok(value)
                } else {
                    Err(self.error(format!("{} is a value and takes no arguments", name)))
                }
            },
            Some(Binding::Function(function)) => self.build_call(name, &function, args),
            None => match self.module.get_function(self.pool.intern(name)) {
                Some(function) => self.build_call(name, &function, args),
                None => Err(self.error(format!("{} not found", name))),
            },
        }
    }

    fn build_call(&mut self, name: &str, function: &Function, args: &[Ast]) -> Result<AnyValue> {
        let expected = function.param_count();
        if expected != args.len() {
            return Err(self.error(format!(
                "incorrect number of arguments for {}: expected {}, got {}",
                name,
                expected,
                args.len()
            )));
        }

        let values = args
            .iter()
            .map(|arg| self.codegen(arg))
            .collect::<Result<Vec<_>>>()?;

        let call_name = format!("call{}", name);
        self.builder
            .build_call(function, &values, Some(self.pool.intern(&call_name)))
            .map_err(|err| self.error(format!("could not call {}: {:?}", name, err)))
    }

    /// ScopePush, lower the body, then bind on success or discard the partial
    /// function on failure. The scope is popped either way.
    fn def(&mut self, prototype: &Prototype, body: &Ast) -> Result<Function> {
        let Prototype { name, params } = prototype;
        let f64_type = self.context.f64_type();

        let function = self.module.add_function(
            self.pool.intern(name),
            Type::function(f64_type, &vec![f64_type; params.len()]),
        );
        let resume = self.builder.insert_block();

        let result = self.scoped(name.clone(), |c| {
            for (mut param, param_name) in function.params().into_iter().zip(params) {
                param.set_name(c.pool.intern(param_name));
                c.scopes.define(param_name.clone(), Binding::Value(param));
            }

            let bb = BasicBlock::append_to(&function, c.pool.intern("entry"));
            c.builder.position_at_end(&bb);

            let ret = c.codegen(body)?;
            c.builder.build_ret(&ret);

            verify_function(&function).map_err(|message| {
                c.error(format!("something wrong with function \"{}\": {}", name, message))
            })
        });

        if let Some(bb) = resume {
            self.builder.position_at_end(&bb);
        }

        match result {
            Ok(()) => {
                debug!(name = %name, params = params.len(), "lowered function");
                Ok(function)
            },
            Err(err) => {
                // Nothing outside the failed def refers to it yet.
                unsafe { function.erase() };
                Err(err)
            },
        }
    }
}
