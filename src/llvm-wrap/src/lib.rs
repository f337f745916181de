//! Safe wrappers over the parts of the LLVM C API the lila compiler uses.

pub mod analysis;
pub mod basic_block;
pub mod builder;
pub mod context;
pub mod execution_engine;
pub mod intern;
pub mod llvm_ref;
pub mod module;
pub mod support;
pub mod types;
pub mod value;

mod util;

pub mod prelude {
    pub use super::basic_block::BasicBlock;
    pub use super::builder::{Builder, BuilderError};
    pub use super::context::Context;
    pub use super::execution_engine::ExecutionEngine;
    pub use super::intern::CStringInternPool;
    pub use super::module::Module;
    pub use super::types::Type;
    pub use super::value::{AnyValue, Function};
}
