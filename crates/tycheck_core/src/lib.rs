//! tycheck_core: shared primitives for the tycheck type checker.
//!
//! String interning, source text positions, and the small collection types
//! the binder and checker build their tables out of.

pub mod collections;
pub mod intern;
pub mod text;

pub use intern::{InternedString, StringInterner};
pub use text::{LineMap, TextRange, TextSpan};
