use std::collections::HashMap;
use std::ffi::{CStr, CString};

/// Keeps the C strings handed to LLVM alive and deduplicated.
#[derive(Default)]
pub struct CStringInternPool {
    pool: HashMap<String, CString>,
}

impl CStringInternPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, value: &str) -> &CStr {
        self.pool
            .entry(value.to_owned())
            // Interior NULs cannot be represented and are dropped.
            .or_insert_with(|| CString::new(value.replace('\0', "")).unwrap_or_default())
            .as_c_str()
    }

    pub fn len(&self) -> usize {
        self.pool.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_deduplicates() {
        let mut pool = CStringInternPool::new();

        let first = pool.intern("anonymous").as_ptr();
        let second = pool.intern("anonymous").as_ptr();

        assert_eq!(first, second);
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.intern("entry").to_str(), Ok("entry"));
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn interior_nul_is_dropped() {
        let mut pool = CStringInternPool::new();
        assert_eq!(pool.intern("a\0b").to_str(), Ok("ab"));
    }
}
