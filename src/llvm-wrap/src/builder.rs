use libc::c_uint;

use llvm::core::{
    LLVMBuildCall,
    LLVMBuildFAdd,
    LLVMBuildFMul,
    LLVMBuildFSub,
    LLVMBuildRet,
    LLVMConstReal,
    LLVMCreateBuilderInContext,
    LLVMDisposeBuilder,
    LLVMGetInsertBlock,
    LLVMPositionBuilderAtEnd,
};

use std::ffi::CStr;
use std::ops::Drop;

use super::basic_block::BasicBlock;
use super::context::Context;
use super::llvm_ref::LlvmRef;
use super::types::Type;
use super::util::EMPTY_C_STR;
use super::value::{AnyValue, Function};

pub struct Builder {
    pub(crate) ptr: <Self as LlvmRef>::Ref,
}

#[derive(Debug, PartialEq)]
pub enum BuilderError {
    WrongArgumentsCount {
        expected: usize,
        actual: usize,
    },
}

impl Drop for Builder {
    fn drop(&mut self) {
        unsafe {
            LLVMDisposeBuilder(self.ptr);
        }
    }
}

macro_rules! impl_bin_op {
    ($($name:ident => $llvm_op:ident),*$(,)?) => {
        $(pub fn $name(&mut self, a: &AnyValue, b: &AnyValue, name: Option<&CStr>) -> AnyValue {
            AnyValue {
                ptr: unsafe {
                    $llvm_op(
                        self.ptr,
                        a.llvm_ref(),
                        b.llvm_ref(),
                        name.map_or(EMPTY_C_STR, CStr::as_ptr),
                    )
                },
            }
        })*
    };
}

impl Builder {
    pub(crate) fn new(context: &Context) -> Self {
        Self {
            ptr: unsafe { LLVMCreateBuilderInContext(context.llvm_ref()) },
        }
    }

    pub fn position_at_end(&mut self, bb: &BasicBlock) {
        unsafe {
            LLVMPositionBuilderAtEnd(self.ptr, bb.llvm_ref());
        }
    }

    /// Block new instructions are currently appended to.
    pub fn insert_block(&self) -> Option<BasicBlock> {
        let ptr = unsafe { LLVMGetInsertBlock(self.ptr) };

        if ptr.is_null() {
            None
        } else {
            Some(BasicBlock { ptr })
        }
    }

    pub fn build_const_fp(&mut self, ty: Type, value: f64) -> AnyValue {
        AnyValue {
            ptr: unsafe { LLVMConstReal(ty.llvm_ref(), value) },
        }
    }

    pub fn build_ret(&mut self, value: &AnyValue) -> AnyValue {
        AnyValue {
            ptr: unsafe { LLVMBuildRet(self.ptr, value.llvm_ref()) },
        }
    }

    /// Calls must not be named when the callee returns void.
    pub fn build_call(
        &mut self,
        f: &Function,
        args: &[AnyValue],
        name: Option<&CStr>) -> Result<AnyValue, BuilderError>
    {
        let params_count = f.param_count();

        if args.len() != params_count {
            return Err(BuilderError::WrongArgumentsCount {
                expected: params_count,
                actual: args.len(),
            });
        }

        let mut args = args.iter().map(LlvmRef::llvm_ref).collect::<Vec<_>>();
        Ok(AnyValue {
            ptr: unsafe {
                LLVMBuildCall(
                    self.ptr,
                    f.llvm_ref(),
                    args.as_mut_ptr(),
                    args.len() as c_uint,
                    name.map_or(EMPTY_C_STR, CStr::as_ptr),
                )
            },
        })
    }

    impl_bin_op!{
        build_fp_add => LLVMBuildFAdd,
        build_fp_sub => LLVMBuildFSub,
        build_fp_mul => LLVMBuildFMul,
    }
}
