use llvm_wrap::prelude::{Function, Type};

use super::Compiler;

pub const PRINT_NUMBER: &str = "print_number";

/// Host functions every compiled module may call, with their addresses.
pub(crate) fn builtins() -> [(&'static str, usize); 1] {
    [(PRINT_NUMBER, print_number as usize)]
}

impl<'ctx> Compiler<'ctx> {
    /// Declares the builtins in the module being built.
    pub(crate) fn init_std(&mut self) -> Function {
        self.module.add_function(
            self.pool.intern(PRINT_NUMBER),
            Type::function(self.context.void_type(), &[self.context.f64_type()]),
        )
    }
}

extern "C" fn print_number(value: f64) {
    println!("{:.6}", value);
}
