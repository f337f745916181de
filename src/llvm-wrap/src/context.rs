use llvm::core::{
    LLVMContextCreate,
    LLVMContextDispose,
    LLVMDoubleTypeInContext,
    LLVMVoidTypeInContext,
};

use std::ffi::CStr;
use std::ops::Drop;

use super::builder::Builder;
use super::llvm_ref::LlvmRef;
use super::module::Module;
use super::types::Type;

/// Owner of every type, module and builder created from it.
///
/// It has to outlive all of them, including modules handed over to an
/// execution engine.
pub struct Context {
    pub(crate) ptr: <Self as LlvmRef>::Ref,
}

impl Drop for Context {
    fn drop(&mut self) {
        unsafe {
            LLVMContextDispose(self.ptr);
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    pub fn new() -> Self {
        Self {
            ptr: unsafe { LLVMContextCreate() },
        }
    }

    pub fn create_builder(&self) -> Builder {
        Builder::new(self)
    }

    pub fn create_module(&self, name: &CStr) -> Module {
        Module::new(name, self)
    }
}

macro_rules! impl_basic_types {
    ($($name:ident => $f:ident),*$(,)?) => {
        impl Context {$(
            pub fn $name(&self) -> Type {
                unsafe {
                    Type {
                        ptr: $f(self.ptr)
                    }
                }
            }
        )*}
    };
}

impl_basic_types! {
    void_type => LLVMVoidTypeInContext,
    f64_type => LLVMDoubleTypeInContext,
}
