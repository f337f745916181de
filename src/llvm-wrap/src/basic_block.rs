use llvm::core::{LLVMAppendBasicBlockInContext, LLVMGetGlobalParent, LLVMGetModuleContext};
use llvm::prelude::LLVMBasicBlockRef;

use std::ffi::CStr;

use super::llvm_ref::LlvmRef;
use super::value::Function;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BasicBlock {
    pub(crate) ptr: LLVMBasicBlockRef,
}

impl BasicBlock {
    /// Appends a new block at the end of `function`.
    pub fn append_to(function: &Function, name: &CStr) -> Self {
        unsafe {
            let module = LLVMGetGlobalParent(function.llvm_ref());
            let context = LLVMGetModuleContext(module);

            Self {
                ptr: LLVMAppendBasicBlockInContext(context, function.llvm_ref(), name.as_ptr()),
            }
        }
    }
}
