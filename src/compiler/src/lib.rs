//! The lila compiler: code generation, JIT session and the drivers built on
//! top of them.

pub mod compiler;
pub mod config;
pub mod error;
pub mod jit;
pub mod logging;
pub mod pipeline;
pub mod repl;

pub mod prelude {
    pub use super::compiler::{CodegenError, Compiler, ENTRY_FUNCTION, PRINT_NUMBER};
    pub use super::config::{CompileConfig, Input, ReplConfig};
    pub use super::error::LilaError;
    pub use super::jit::{JitError, JitSession, UnitHandle};
    pub use super::repl::{Command, Repl, Step};
}
