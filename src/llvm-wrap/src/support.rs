//! Symbol table of the host process, used as the fallback when resolving
//! symbols of jitted code.

use libc::c_void;

use llvm::support::{LLVMAddSymbol, LLVMLoadLibraryPermanently, LLVMSearchForAddressOfSymbol};

use std::ffi::CStr;
use std::ptr;

/// Makes the exported symbols of the running executable searchable.
pub fn load_process_symbols() -> Result<(), String> {
    if unsafe { LLVMLoadLibraryPermanently(ptr::null()) } != 0 {
        Err("could not load the symbols of the host process".to_owned())
    } else {
        Ok(())
    }
}

/// Registers `addr` under `name`, taking precedence over any library symbol.
///
/// `addr` has to stay valid for as long as jitted code may use it.
pub unsafe fn add_symbol(name: &CStr, addr: usize) {
    LLVMAddSymbol(name.as_ptr(), addr as *mut c_void);
}

pub fn search_symbol(name: &CStr) -> Option<usize> {
    let addr = unsafe { LLVMSearchForAddressOfSymbol(name.as_ptr()) };

    if addr.is_null() {
        None
    } else {
        Some(addr as usize)
    }
}
