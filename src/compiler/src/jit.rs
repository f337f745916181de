//! Stack of jitted compilation units.
//!
//! Each unit gets its own MCJIT engine. A symbol resolves to the newest unit
//! defining it, then to the host process, so later definitions shadow earlier
//! ones until they are removed again.

use llvm_wrap::execution_engine::{host_target_triple, initialize_jit};
use llvm_wrap::prelude::*;
use llvm_wrap::support;

use std::collections::HashSet;
use std::ffi::CString;
use std::fmt::{self, Display, Formatter};
use std::mem;

use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::compiler::{builtins, ENTRY_FUNCTION};

/// Opaque reference to a unit added to a [`JitSession`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UnitHandle(u64);

impl Display for UnitHandle {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "unit#{}", self.0)
    }
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum JitError {
    #[error("could not set up the host target: {0}")]
    Target(String),
    #[error("could not create execution engine: {0}")]
    EngineCreation(String),
    #[error("unresolved symbol \"{0}\"")]
    UnresolvedSymbol(String),
    #[error("no unit with handle {0}")]
    UnknownHandle(UnitHandle),
    #[error("symbol \"{0}\" not found")]
    SymbolNotFound(String),
}

pub type Result<T> = std::result::Result<T, JitError>;

struct Unit {
    handle: UnitHandle,
    engine: ExecutionEngine,
    symbols: HashSet<String>,
}

/// Name under which a symbol is registered and looked up. MCJIT applies the
/// platform mangling itself on both sides.
fn symbol_name(name: &str) -> Option<CString> {
    CString::new(name).ok()
}

pub struct JitSession {
    // field order matters as it's the drop order as well
    units: Vec<Unit>,
    context: Context,

    triple: CString,
    next_handle: u64,
}

impl JitSession {
    pub fn new() -> Result<Self> {
        initialize_jit().map_err(JitError::Target)?;
        support::load_process_symbols().map_err(JitError::Target)?;

        let session = Self {
            units: Vec::new(),
            context: Context::new(),
            triple: host_target_triple(),
            next_handle: 0,
        };
        session.init_std();

        debug!(triple = ?session.triple, "jit session ready");
        Ok(session)
    }

    fn init_std(&self) {
        for (name, addr) in builtins().iter() {
            if let Some(symbol) = symbol_name(name) {
                unsafe { support::add_symbol(&symbol, *addr) };
            }
        }
    }

    /// Context every module handed to this session must be built in.
    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Compiles `module` for the host and pushes it as the newest unit.
    ///
    /// Every declaration must resolve against the existing units or the host
    /// process, otherwise the module is dropped and the session is left as it
    /// was.
    pub fn add_module(&mut self, mut module: Module) -> Result<UnitHandle> {
        module.set_target_triple(&self.triple);

        let mut symbols = HashSet::new();
        let mut imports = Vec::new();

        for function in module.functions() {
            let name = function.name();
            if function.is_declaration() {
                match self.find_symbol(&name) {
                    Some(addr) => imports.push((function, addr)),
                    None => {
                        warn!(symbol = %name, "unresolved symbol");
                        return Err(JitError::UnresolvedSymbol(name));
                    },
                }
            } else {
                symbols.insert(name);
            }
        }

        let mut engine = ExecutionEngine::new(module).map_err(JitError::EngineCreation)?;
        for (function, addr) in &imports {
            unsafe { engine.add_global_mapping(function.as_value(), *addr) };
        }

        let handle = UnitHandle(self.next_handle);
        self.next_handle += 1;

        debug!(%handle, ?symbols, imports = imports.len(), "added unit");
        self.units.push(Unit {
            handle,
            engine,
            symbols,
        });

        Ok(handle)
    }

    /// Drops the unit and everything it defined. Symbols it shadowed become
    /// visible again.
    pub fn remove_module(&mut self, handle: UnitHandle) -> Result<()> {
        let index = self
            .units
            .iter()
            .position(|unit| unit.handle == handle)
            .ok_or(JitError::UnknownHandle(handle))?;

        let unit = self.units.remove(index);
        debug!(%handle, symbols = ?unit.symbols, "removed unit");
        Ok(())
    }

    fn find_unit_symbol(&self, name: &str) -> Option<usize> {
        let symbol = symbol_name(name)?;

        self.units
            .iter()
            .rev()
            .filter(|unit| unit.symbols.contains(name))
            .find_map(|unit| {
                let addr = unit.engine.function_address(&symbol)?;
                trace!(symbol = %name, unit = %unit.handle, "resolved symbol");
                Some(addr)
            })
    }

    /// Address of `name` in the newest unit defining it, falling back to the
    /// host process.
    pub fn find_symbol(&self, name: &str) -> Option<usize> {
        self.find_unit_symbol(name).or_else(|| {
            let addr = support::search_symbol(&symbol_name(name)?);
            trace!(symbol = %name, found = addr.is_some(), "searched host process");
            addr
        })
    }

    /// Calls `name` with no arguments.
    ///
    /// The symbol has to be a function of type `double ()`.
    pub unsafe fn invoke(&self, name: &str) -> Result<f64> {
        let addr = self
            .find_symbol(name)
            .ok_or_else(|| JitError::SymbolNotFound(name.to_owned()))?;

        let function: extern "C" fn() -> f64 = mem::transmute(addr);
        Ok(function())
    }

    /// Runs the entry function of the newest unit that has one.
    pub fn run_entry(&self) -> Result<f64> {
        if self.find_unit_symbol(ENTRY_FUNCTION).is_none() {
            return Err(JitError::SymbolNotFound(ENTRY_FUNCTION.to_owned()));
        }

        // Entry functions are always generated as `double ()`.
        unsafe { self.invoke(ENTRY_FUNCTION) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_handle_is_rejected() {
        let mut jit = JitSession::new().unwrap();
        assert_eq!(
            jit.remove_module(UnitHandle(42)),
            Err(JitError::UnknownHandle(UnitHandle(42)))
        );
    }

    #[test]
    fn builtins_resolve_through_the_host() {
        let jit = JitSession::new().unwrap();
        assert!(jit.find_symbol("print_number").is_some());
        assert!(jit.find_symbol("lila_surely_not_a_symbol").is_none());
    }

    #[test]
    fn empty_session_has_no_entry() {
        let jit = JitSession::new().unwrap();
        assert!(jit.is_empty());
        assert_eq!(
            jit.run_entry(),
            Err(JitError::SymbolNotFound(ENTRY_FUNCTION.to_owned()))
        );
    }
}
