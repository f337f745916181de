use std::collections::HashMap;

pub const ROOT_SCOPE: &str = "global";

#[derive(Debug)]
struct Scope<T> {
    name: String,
    bindings: HashMap<String, T>,
}

/// Lexical scopes as an arena plus a stack of indices into it.
///
/// Popped scopes stay in the arena but are unreachable from the stack, so a
/// binding never outlives the node that introduced its scope. The root scope
/// is never popped.
#[derive(Debug)]
pub struct ScopeChain<T> {
    arena: Vec<Scope<T>>,
    stack: Vec<usize>,
}

impl<T> Default for ScopeChain<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ScopeChain<T> {
    pub fn new() -> Self {
        let mut chain = Self {
            arena: Vec::new(),
            stack: Vec::new(),
        };
        chain.push(ROOT_SCOPE);
        chain
    }

    pub fn push(&mut self, name: impl Into<String>) {
        self.stack.push(self.arena.len());
        self.arena.push(Scope {
            name: name.into(),
            bindings: HashMap::new(),
        });
    }

    pub fn pop(&mut self) {
        if self.stack.len() > 1 {
            self.stack.pop();
        }
    }

    /// Number of scopes pushed on top of the root.
    pub fn depth(&self) -> usize {
        self.stack.len() - 1
    }

    fn current(&self) -> &Scope<T> {
        &self.arena[self.stack[self.stack.len() - 1]]
    }

    fn current_mut(&mut self) -> &mut Scope<T> {
        let index = self.stack[self.stack.len() - 1];
        &mut self.arena[index]
    }

    pub fn is_defined_here(&self, name: &str) -> bool {
        self.current().bindings.contains_key(name)
    }

    /// Binds `name` in the innermost scope, returning the previous binding of
    /// that scope if there was one.
    pub fn define(&mut self, name: impl Into<String>, value: T) -> Option<T> {
        self.current_mut().bindings.insert(name.into(), value)
    }

    /// Innermost binding of `name` visible from the current scope.
    pub fn lookup(&self, name: &str) -> Option<&T> {
        self.stack
            .iter()
            .rev()
            .find_map(|&index| self.arena[index].bindings.get(name))
    }

    pub fn path(&self) -> String {
        self.stack
            .iter()
            .map(|&index| self.arena[index].name.as_str())
            .collect::<Vec<_>>()
            .join(".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_walks_outwards_and_shadows() {
        let mut scopes = ScopeChain::new();
        scopes.define("x", 1);
        scopes.define("y", 2);

        scopes.push("f");
        scopes.define("x", 10);

        assert_eq!(scopes.lookup("x"), Some(&10));
        assert_eq!(scopes.lookup("y"), Some(&2));
        assert_eq!(scopes.path(), "global.f");

        scopes.pop();
        assert_eq!(scopes.lookup("x"), Some(&1));
        assert_eq!(scopes.path(), "global");
    }

    #[test]
    fn popped_bindings_do_not_leak_into_siblings() {
        let mut scopes = ScopeChain::new();

        scopes.push("anon0");
        scopes.define("inner", ());
        scopes.pop();

        scopes.push("anon1");
        assert!(scopes.lookup("inner").is_none());
        assert_eq!(scopes.depth(), 1);
    }

    #[test]
    fn redefinition_is_only_detected_in_current_scope() {
        let mut scopes = ScopeChain::new();
        scopes.define("x", ());

        scopes.push("anon0");
        assert!(!scopes.is_defined_here("x"));
        assert!(scopes.define("x", ()).is_none());
        assert!(scopes.is_defined_here("x"));
    }

    #[test]
    fn root_is_never_popped() {
        let mut scopes: ScopeChain<()> = ScopeChain::new();
        scopes.pop();
        scopes.pop();
        assert_eq!(scopes.depth(), 0);
        assert_eq!(scopes.path(), ROOT_SCOPE);
    }
}
