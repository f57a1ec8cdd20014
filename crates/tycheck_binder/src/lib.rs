//! tycheck_binder: symbol construction and declaration merging.
//!
//! The binder walks each source file once, creating a `Symbol` for every
//! declaration and merging multiple declarations of one name into a single
//! symbol. Conflicting declarations produce "duplicate identifier"
//! diagnostics with cross-linked related locations. The checker consumes
//! the resulting symbol arena, per-container locals, and export tables.

mod binder;
mod symbol;

pub use binder::{AliasDeclInfo, AliasKind, Binder, DeclRef};
pub use symbol::{Symbol, SymbolArena, SymbolTable};
