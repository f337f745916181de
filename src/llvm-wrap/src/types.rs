use libc::c_uint;

use llvm::core::{LLVMFunctionType, LLVMPrintTypeToString};

use std::fmt::{self, Debug, Formatter};

use super::llvm_ref::LlvmRef;
use super::util::take_message;

#[derive(Clone, Copy)]
pub struct Type {
    pub(crate) ptr: <Self as LlvmRef>::Ref,
}

impl Debug for Type {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let dump = unsafe { take_message(LLVMPrintTypeToString(self.ptr)) };
        write!(f, "{}", dump)
    }
}

impl Type {
    /// Non variadic function type. The context is the one of `ret`.
    pub fn function(ret: Type, params: &[Type]) -> Type {
        // LLVM copies the parameter list, the slice does not need to outlive the type.
        let mut params = params.iter().map(LlvmRef::llvm_ref).collect::<Vec<_>>();

        Type {
            ptr: unsafe {
                LLVMFunctionType(ret.ptr, params.as_mut_ptr(), params.len() as c_uint, 0)
            },
        }
    }
}
