use libc::c_void;

use llvm::execution_engine::{
    LLVMAddGlobalMapping,
    LLVMCreateExecutionEngineForModule,
    LLVMDisposeExecutionEngine,
    LLVMGetFunctionAddress,
    LLVMLinkInMCJIT,
};
use llvm::target::{
    LLVM_InitializeNativeAsmParser,
    LLVM_InitializeNativeAsmPrinter,
    LLVM_InitializeNativeTarget,
};
use llvm::target_machine::LLVMGetDefaultTargetTriple;

use std::ffi::{CStr, CString};
use std::mem;
use std::ops::Drop;
use std::ptr;
use std::sync::OnceLock;

use super::llvm_ref::LlvmRef;
use super::module::Module;
use super::util::take_message;
use super::value::AnyValue;

/// Links in MCJIT and initializes the host target. Runs once per process.
pub fn initialize_jit() -> Result<(), String> {
    static NATIVE: OnceLock<Result<(), String>> = OnceLock::new();

    NATIVE
        .get_or_init(|| unsafe {
            LLVMLinkInMCJIT();

            if LLVM_InitializeNativeTarget() != 0 {
                return Err("could not initialize the native target".to_owned());
            }
            if LLVM_InitializeNativeAsmPrinter() != 0 {
                return Err("could not initialize the native asm printer".to_owned());
            }
            if LLVM_InitializeNativeAsmParser() != 0 {
                return Err("could not initialize the native asm parser".to_owned());
            }

            Ok(())
        })
        .clone()
}

/// Target triple of the machine we are running on.
pub fn host_target_triple() -> CString {
    let triple = unsafe { take_message(LLVMGetDefaultTargetTriple()) };
    CString::new(triple).unwrap_or_default()
}

/// An MCJIT engine owning exactly one module.
pub struct ExecutionEngine {
    pub(crate) ptr: <Self as LlvmRef>::Ref,
}

impl Drop for ExecutionEngine {
    fn drop(&mut self) {
        unsafe {
            LLVMDisposeExecutionEngine(self.ptr);
        }
    }
}

impl ExecutionEngine {
    pub fn new(module: Module) -> Result<Self, String> {
        let mut ee = ptr::null_mut();
        let mut err = ptr::null_mut();

        let failed = unsafe {
            LLVMCreateExecutionEngineForModule(&mut ee, module.llvm_ref(), &mut err) != 0
        };

        // The engine takes the module even when its creation fails, so it
        // must never be disposed from here.
        mem::forget(module);

        if failed {
            Err(unsafe { take_message(err) })
        } else {
            Ok(Self { ptr: ee })
        }
    }

    /// Address of a function, compiling the module on first use.
    pub fn function_address(&self, name: &CStr) -> Option<usize> {
        match unsafe { LLVMGetFunctionAddress(self.ptr, name.as_ptr()) } {
            0 => None,
            addr => Some(addr as usize),
        }
    }

    /// Resolves `value` to `addr` instead of searching for it.
    ///
    /// Must happen before the first `function_address` call, since that
    /// finalizes the code.
    pub unsafe fn add_global_mapping(&mut self, value: &AnyValue, addr: usize) {
        LLVMAddGlobalMapping(self.ptr, value.llvm_ref(), addr as *mut c_void);
    }
}
