//! tycheck_checker: the type system engine.
//!
//! Given bound source files, the checker resolves every identifier to a
//! symbol, computes the static type of every expression, verifies the
//! typing rules, and reports diagnostics. Types live in an interned,
//! id-addressed universe owned by one `Checker`; ids from different
//! checkers are never comparable.

mod calls;
mod checker;
mod construct;
mod expr;
mod infer;
mod instantiate;
mod narrow;
mod relate;
mod resolve;
mod types;

pub use checker::{CancellationToken, CheckAborted, CheckMode, Checker};
pub use relate::RelationKind;
pub use types::{
    IndexInfo, ResolvedMembers, Signature, SignatureParameter, Type, TypeKind, TypeMapper,
    TypeTable, UnionReduction,
};
