use llvm::core::{
    LLVMCountParams,
    LLVMDeleteFunction,
    LLVMGetParams,
    LLVMGetValueName,
    LLVMIsDeclaration,
    LLVMPrintValueToString,
    LLVMSetValueName,
};

use std::ffi::CStr;
use std::fmt::{self, Debug, Formatter};

use super::llvm_ref::LlvmRef;
use super::util::take_message;

// TODO: distinguish float values in the type system so that integer ops on
// them cannot be built.

#[derive(Clone, PartialEq, Eq)]
pub struct AnyValue {
    pub(crate) ptr: <Self as LlvmRef>::Ref,
}

#[derive(Clone, PartialEq, Eq)]
pub struct Function {
    pub(crate) value: AnyValue,
}

impl Debug for AnyValue {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let dump = unsafe { take_message(LLVMPrintValueToString(self.ptr)) };
        write!(f, "{}", dump)
    }
}

impl Debug for Function {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{:?}", self.as_value())
    }
}

impl AnyValue {
    pub fn set_name(&mut self, name: &CStr) {
        unsafe { LLVMSetValueName(self.ptr, name.as_ptr()) }
    }

    pub fn name(&self) -> String {
        unsafe {
            CStr::from_ptr(LLVMGetValueName(self.ptr))
                .to_string_lossy()
                .into_owned()
        }
    }
}

impl Function {
    pub fn as_value(&self) -> &AnyValue {
        &self.value
    }

    pub fn name(&self) -> String {
        self.value.name()
    }

    /// A function without a body, to be resolved when linking or jitting.
    pub fn is_declaration(&self) -> bool {
        unsafe { LLVMIsDeclaration(self.llvm_ref()) != 0 }
    }

    pub fn param_count(&self) -> usize {
        unsafe { LLVMCountParams(self.llvm_ref()) as usize }
    }

    pub fn params(&self) -> Vec<AnyValue> {
        let count = self.param_count();
        let mut storage = Vec::with_capacity(count);

        unsafe {
            LLVMGetParams(self.llvm_ref(), storage.as_mut_ptr());
            storage.set_len(count);
        }

        storage
            .into_iter()
            .map(|ptr| AnyValue { ptr })
            .collect()
    }

    /// Removes the function from its module and frees it.
    ///
    /// Every other handle to this function dangles afterwards.
    pub unsafe fn erase(self) {
        LLVMDeleteFunction(self.llvm_ref());
    }
}
