use llvm::analysis::{
    LLVMVerifierFailureAction,
    LLVMVerifyFunction,
    LLVMVerifyModule,
};
use llvm::core::LLVMGetGlobalParent;

use std::ptr;

use super::llvm_ref::LlvmRef;
use super::module::Module;
use super::util::take_message;
use super::value::Function;

const RETURN_STATUS: LLVMVerifierFailureAction = LLVMVerifierFailureAction::LLVMReturnStatusAction;

/// Checks the structural well-formedness of a single function.
///
/// The function verifier only reports a status, so on failure the message is
/// taken from verifying the enclosing module.
pub fn verify_function(f: &Function) -> Result<(), String> {
    let broken = unsafe { LLVMVerifyFunction(f.llvm_ref(), RETURN_STATUS) != 0 };

    if !broken {
        return Ok(());
    }

    let message = unsafe {
        let mut message = ptr::null_mut();
        LLVMVerifyModule(LLVMGetGlobalParent(f.llvm_ref()), RETURN_STATUS, &mut message);
        take_message(message)
    };
    Err(own_failures(&message, &f.name()))
}

/// Drops the reports about other functions still missing their terminator,
/// as happens for enclosing functions that are under construction.
fn own_failures(message: &str, function: &str) -> String {
    let own = format!("Basic Block in function '{}' ", function);
    let mut kept = Vec::new();
    let mut lines = message.lines();

    while let Some(line) = lines.next() {
        if line.starts_with("Basic Block in function '") && !line.starts_with(&own) {
            lines.next(); // the block label
            continue;
        }
        kept.push(line);
    }

    let kept = kept.join("\n");
    if kept.trim().is_empty() {
        message.trim_end().to_owned()
    } else {
        kept.trim_end().to_owned()
    }
}

pub fn verify_module(m: &Module) -> Result<(), String> {
    let mut message = ptr::null_mut();

    unsafe {
        let broken = LLVMVerifyModule(m.llvm_ref(), RETURN_STATUS, &mut message) != 0;
        let message = take_message(message);

        if broken {
            Err(message.trim_end().to_owned())
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unfinished_functions_are_not_reported() {
        let message = "Basic Block in function 'anonymous' does not have terminator!\n\
                       label %entry\n\
                       Referring to an instruction in another function!\n  \
                       %addtmp = fadd double %b, %callg\n";

        assert_eq!(
            own_failures(message, "h"),
            "Referring to an instruction in another function!\n  %addtmp = fadd double %b, %callg"
        );
    }

    #[test]
    fn own_missing_terminator_is_kept() {
        let message = "Basic Block in function 'h' does not have terminator!\nlabel %entry\n";
        assert_eq!(
            own_failures(message, "h"),
            "Basic Block in function 'h' does not have terminator!\nlabel %entry"
        );
    }
}
