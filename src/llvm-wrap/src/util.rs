use libc::c_char;

use llvm::core::LLVMDisposeMessage;

use std::ffi::CStr;

pub(crate) const EMPTY_C_STR: *const c_char = b"\0".as_ptr() as *const c_char;

/// Copies a message allocated by LLVM and releases the original.
pub(crate) unsafe fn take_message(message: *mut c_char) -> String {
    if message.is_null() {
        return String::new();
    }

    let text = CStr::from_ptr(message).to_string_lossy().into_owned();
    LLVMDisposeMessage(message);
    text
}
