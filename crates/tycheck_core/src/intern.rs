//! Interned identifier and member-name strings.
//!
//! Every name the checker compares (identifiers, property names, module
//! specifiers) is interned once, so that equality is an integer compare and
//! names can key hash tables without carrying string data around.

use lasso::{Key, Spur, ThreadedRodeo};
use std::fmt;
use std::sync::Arc;

/// Handle to an interned string. Copyable, order- and hash-stable for the
/// lifetime of the owning [`StringInterner`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct InternedString(Spur);

impl InternedString {
    #[inline]
    pub fn from_spur(spur: Spur) -> Self {
        Self(spur)
    }

    #[inline]
    pub fn as_spur(self) -> Spur {
        self.0
    }

    /// Placeholder handle for synthesized nodes whose name is irrelevant.
    #[inline]
    pub fn dummy() -> Self {
        Self(Spur::try_from_usize(0).unwrap())
    }
}

impl fmt::Debug for InternedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InternedString({:?})", self.0)
    }
}

/// Shared, thread-safe string interner. Cloning is cheap; all clones view
/// the same pool.
#[derive(Clone)]
pub struct StringInterner {
    rodeo: Arc<ThreadedRodeo>,
}

impl StringInterner {
    pub fn new() -> Self {
        Self {
            rodeo: Arc::new(ThreadedRodeo::new()),
        }
    }

    /// Intern `s`, returning the existing handle if it was seen before.
    #[inline]
    pub fn intern(&self, s: &str) -> InternedString {
        InternedString::from_spur(self.rodeo.get_or_intern(s))
    }

    /// Intern a static string without copying it into the pool.
    #[inline]
    pub fn intern_static(&self, s: &'static str) -> InternedString {
        InternedString::from_spur(self.rodeo.get_or_intern_static(s))
    }

    /// Look up a string without interning it when absent.
    #[inline]
    pub fn get(&self, s: &str) -> Option<InternedString> {
        self.rodeo.get(s).map(InternedString::from_spur)
    }

    /// Resolve a handle back to its text.
    #[inline]
    pub fn resolve(&self, key: InternedString) -> &str {
        self.rodeo.resolve(&key.as_spur())
    }

    pub fn len(&self) -> usize {
        self.rodeo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rodeo.is_empty()
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StringInterner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StringInterner")
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_returns_stable_handles() {
        let interner = StringInterner::new();
        let a = interner.intern("value");
        let b = interner.intern("value");
        let c = interner.intern("other");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(interner.resolve(a), "value");
        assert_eq!(interner.resolve(c), "other");
    }

    #[test]
    fn get_does_not_intern() {
        let interner = StringInterner::new();
        assert!(interner.get("missing").is_none());
        let a = interner.intern("missing");
        assert_eq!(interner.get("missing"), Some(a));
    }
}
