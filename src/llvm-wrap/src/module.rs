use llvm::bit_writer::LLVMWriteBitcodeToFile;
use llvm::core::{
    LLVMAddFunction,
    LLVMDisposeModule,
    LLVMGetFirstFunction,
    LLVMGetNamedFunction,
    LLVMGetNextFunction,
    LLVMModuleCreateWithNameInContext,
    LLVMPrintModuleToString,
    LLVMSetTarget,
};
use llvm::prelude::LLVMValueRef;

use std::ffi::{CStr, CString};
use std::fmt::{self, Debug, Formatter};
use std::ops::Drop;
use std::path::Path;

use super::context::Context;
use super::llvm_ref::LlvmRef;
use super::types::Type;
use super::util::take_message;
use super::value::{AnyValue, Function};

pub struct Module {
    pub(crate) ptr: <Self as LlvmRef>::Ref,
}

impl Debug for Module {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let dump = unsafe { take_message(LLVMPrintModuleToString(self.ptr)) };
        write!(f, "{}", dump)
    }
}

impl Drop for Module {
    fn drop(&mut self) {
        unsafe {
            LLVMDisposeModule(self.ptr);
        }
    }
}

/// Functions of a module in definition order.
pub struct Functions {
    next: LLVMValueRef,
}

impl Iterator for Functions {
    type Item = Function;

    fn next(&mut self) -> Option<Function> {
        if self.next.is_null() {
            return None;
        }

        let ptr = self.next;
        self.next = unsafe { LLVMGetNextFunction(ptr) };
        Some(Function {
            value: AnyValue { ptr },
        })
    }
}

impl Module {
    pub(crate) fn new(name: &CStr, context: &Context) -> Self {
        Self {
            ptr: unsafe { LLVMModuleCreateWithNameInContext(name.as_ptr(), context.llvm_ref()) },
        }
    }

    /// Adds a function with external linkage. LLVM renames it if `name` is taken.
    pub fn add_function(&mut self, name: &CStr, fn_type: Type) -> Function {
        Function {
            value: AnyValue {
                ptr: unsafe { LLVMAddFunction(self.ptr, name.as_ptr(), fn_type.ptr) },
            },
        }
    }

    pub fn get_function(&self, name: &CStr) -> Option<Function> {
        let ptr = unsafe { LLVMGetNamedFunction(self.ptr, name.as_ptr()) };

        if ptr.is_null() {
            None
        } else {
            Some(Function {
                value: AnyValue { ptr },
            })
        }
    }

    pub fn functions(&self) -> Functions {
        Functions {
            next: unsafe { LLVMGetFirstFunction(self.ptr) },
        }
    }

    pub fn set_target_triple(&mut self, triple: &CStr) {
        unsafe { LLVMSetTarget(self.ptr, triple.as_ptr()) }
    }

    pub fn write_bitcode(&self, path: &Path) -> Result<(), String> {
        let c_path = CString::new(path.to_string_lossy().into_owned())
            .map_err(|err| format!("invalid path {}: {}", path.display(), err))?;

        if unsafe { LLVMWriteBitcodeToFile(self.ptr, c_path.as_ptr()) } == 0 {
            Ok(())
        } else {
            Err(format!("could not write bitcode to {}", path.display()))
        }
    }
}
