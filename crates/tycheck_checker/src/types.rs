//! The type universe.
//!
//! Types are stored in a `TypeTable` and addressed by `TypeId`. Ids are
//! assigned monotonically; the total order over ids gives unions and
//! intersections their canonical constituent order and carries no other
//! meaning. Structural identity implies id identity for every interned
//! category: the factory methods in `construct.rs` compute a key, consult
//! the table's caches, and only allocate on a miss. Once interned, a
//! type's defining data is never mutated; derived results (resolved
//! members, base constraints) are memoized in side tables that fill in
//! exactly once.

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use tycheck_ast::types::{
    ElementFlags, NodeId, ObjectFlags, SignatureFlags, SignatureId, SymbolId, TypeFlags, TypeId,
};
use tycheck_core::intern::InternedString;

/// How far union construction reduces its constituents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnionReduction {
    None,
    Literal,
    Subtype,
}

/// Records that a type was produced through a named alias reference, for
/// display and identity only.
#[derive(Debug, Clone)]
pub struct AliasReference {
    pub symbol: SymbolId,
    pub type_arguments: Vec<TypeId>,
}

#[derive(Debug, Clone)]
pub struct Type {
    pub id: TypeId,
    pub flags: TypeFlags,
    pub object_flags: ObjectFlags,
    pub symbol: Option<SymbolId>,
    pub alias: Option<AliasReference>,
    pub kind: TypeKind,
}

#[derive(Debug, Clone)]
pub enum TypeKind {
    /// any, unknown, string, ... plus the sentinel intrinsics (`error`,
    /// `auto`, `circular`, `silentNever`), distinguished by id, never by
    /// structure.
    Intrinsic { name: &'static str },
    StringLiteral { value: String },
    NumberLiteral { value: f64 },
    BigIntLiteral { value: String },
    BooleanLiteral { value: bool },
    Object(ObjectKind),
    Union { types: Vec<TypeId> },
    Intersection { types: Vec<TypeId> },
    TypeParameter { name: String, is_this: bool },
    /// `keyof T`.
    Index { target: TypeId },
    /// `T[K]`, kept symbolic while either operand is generic.
    IndexedAccess { object_type: TypeId, index_type: TypeId },
    /// `C extends E ? T : F`, kept symbolic while the check type is
    /// generic. `distributive` is set when the check type was a naked
    /// type parameter.
    Conditional {
        check_type: TypeId,
        extends_type: TypeId,
        true_type: TypeId,
        false_type: TypeId,
        distributive: bool,
        infer_params: Vec<TypeId>,
    },
    /// Alternating literal text and embedded types; `texts` is one longer
    /// than `types`.
    TemplateLiteral { texts: Vec<String>, types: Vec<TypeId> },
    /// A type variable with a narrowed substitute, produced by
    /// conditional-type distribution.
    Substitution { base_type: TypeId, constraint: TypeId },
}

#[derive(Debug, Clone)]
pub enum ObjectKind {
    /// Declared class or interface type. Members come from the symbol and
    /// resolved base types; `this_type` is present for classes, generic
    /// interfaces, and interfaces that mention `this`.
    Interface {
        type_params: Vec<TypeId>,
        this_type: Option<TypeId>,
    },
    /// Instantiation of a generic interface or tuple target.
    Reference { target: TypeId, type_args: Vec<TypeId> },
    /// Structurally listed members: object literals, type literals,
    /// function types, synthesized shapes.
    Anonymous(Box<AnonymousMembers>),
    /// A tuple *target* type; tuples of a given shape share one target and
    /// instantiate it by reference.
    Tuple {
        element_flags: Vec<ElementFlags>,
        readonly: bool,
        type_params: Vec<TypeId>,
    },
    /// `{ [K in C]: T }`, pending application.
    Mapped {
        type_param: TypeId,
        constraint: TypeId,
        template: Option<TypeId>,
        readonly_modifier: Option<bool>,
        question_modifier: Option<bool>,
    },
}

#[derive(Debug, Clone, Default)]
pub struct AnonymousMembers {
    pub properties: IndexMap<InternedString, SymbolId>,
    pub call_signatures: Vec<SignatureId>,
    pub construct_signatures: Vec<SignatureId>,
    pub index_infos: Vec<IndexInfo>,
}

/// Fully resolved member set of an object-like type, with inherited and
/// instantiated members folded in. Cached per type id.
#[derive(Debug, Clone, Default)]
pub struct ResolvedMembers {
    pub properties: IndexMap<InternedString, SymbolId>,
    pub call_signatures: Vec<SignatureId>,
    pub construct_signatures: Vec<SignatureId>,
    pub index_infos: Vec<IndexInfo>,
}

/// An index signature.
#[derive(Debug, Clone)]
pub struct IndexInfo {
    pub key_type: TypeId,
    pub value_type: TypeId,
    pub is_readonly: bool,
    pub declaration: Option<NodeId>,
}

#[derive(Debug, Clone)]
pub struct SignatureParameter {
    pub name: InternedString,
    pub name_text: String,
    pub ty: TypeId,
    pub optional: bool,
    pub rest: bool,
}

/// A callable shape.
#[derive(Debug, Clone)]
pub struct Signature {
    pub flags: SignatureFlags,
    pub type_params: Vec<TypeId>,
    pub params: Vec<SignatureParameter>,
    pub min_argument_count: u32,
    pub return_type: TypeId,
    pub declaration: Option<NodeId>,
    /// Set when this signature is an instantiation of another.
    pub target: Option<SignatureId>,
    pub mapper: Option<TypeMapper>,
}

impl Signature {
    pub fn has_rest_parameter(&self) -> bool {
        self.flags.contains(SignatureFlags::HAS_REST_PARAMETER)
    }

    /// Maximum accepted argument count, `u32::MAX` with a rest parameter.
    pub fn max_argument_count(&self) -> u32 {
        if self.has_rest_parameter() {
            u32::MAX
        } else {
            self.params.len() as u32
        }
    }
}

/// Maps type parameters to replacement types. Composed mappers apply the
/// first mapping, then the second over its output.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeMapper {
    Simple {
        sources: Vec<TypeId>,
        targets: Vec<TypeId>,
    },
    Merged(Box<TypeMapper>, Box<TypeMapper>),
}

impl TypeMapper {
    pub fn new(sources: Vec<TypeId>, targets: Vec<TypeId>) -> Self {
        TypeMapper::Simple { sources, targets }
    }

    /// Direct replacement for a type parameter, if any.
    pub fn mapped(&self, ty: TypeId) -> Option<TypeId> {
        match self {
            TypeMapper::Simple { sources, targets } => sources
                .iter()
                .position(|&s| s == ty)
                .map(|i| targets.get(i).copied().unwrap_or(ty)),
            TypeMapper::Merged(first, second) => match first.mapped(ty) {
                Some(mapped) => Some(second.mapped(mapped).unwrap_or(mapped)),
                None => second.mapped(ty),
            },
        }
    }

    /// An identity mapper maps every source to itself.
    pub fn is_identity(&self) -> bool {
        match self {
            TypeMapper::Simple { sources, targets } => sources == targets,
            TypeMapper::Merged(first, second) => first.is_identity() && second.is_identity(),
        }
    }

    pub fn combine(first: TypeMapper, second: TypeMapper) -> TypeMapper {
        TypeMapper::Merged(Box::new(first), Box::new(second))
    }
}

/// Owns every type of one compilation, plus the interning caches.
pub struct TypeTable {
    types: Vec<Type>,

    // Intrinsics.
    pub any_type: TypeId,
    pub unknown_type: TypeId,
    pub string_type: TypeId,
    pub number_type: TypeId,
    pub boolean_type: TypeId,
    pub bigint_type: TypeId,
    pub es_symbol_type: TypeId,
    pub void_type: TypeId,
    pub undefined_type: TypeId,
    pub null_type: TypeId,
    pub never_type: TypeId,
    pub non_primitive_type: TypeId,
    pub true_type: TypeId,
    pub false_type: TypeId,

    // Sentinels. Checked by id, never by structure.
    pub error_type: TypeId,
    pub auto_type: TypeId,
    pub silent_never_type: TypeId,
    pub circular_constraint_type: TypeId,
    pub empty_object_type: TypeId,

    // Interning caches.
    pub string_literal_cache: FxHashMap<String, TypeId>,
    pub number_literal_cache: FxHashMap<u64, TypeId>,
    pub bigint_literal_cache: FxHashMap<String, TypeId>,
    pub enum_literal_cache: FxHashMap<SymbolId, TypeId>,
    pub union_cache: FxHashMap<String, TypeId>,
    pub intersection_cache: FxHashMap<String, TypeId>,
    pub reference_cache: FxHashMap<String, TypeId>,
    pub tuple_target_cache: FxHashMap<String, TypeId>,
    pub index_type_cache: FxHashMap<TypeId, TypeId>,
    pub indexed_access_cache: FxHashMap<(TypeId, TypeId), TypeId>,
    pub template_literal_cache: FxHashMap<String, TypeId>,
    pub conditional_cache: FxHashMap<String, TypeId>,
    /// regular literal -> fresh counterpart
    pub fresh_types: FxHashMap<TypeId, TypeId>,
    /// fresh literal -> regular counterpart
    pub regular_types: FxHashMap<TypeId, TypeId>,
}

impl TypeTable {
    pub fn new() -> Self {
        let mut table = Self {
            types: Vec::with_capacity(1024),
            any_type: TypeId(0),
            unknown_type: TypeId(0),
            string_type: TypeId(0),
            number_type: TypeId(0),
            boolean_type: TypeId(0),
            bigint_type: TypeId(0),
            es_symbol_type: TypeId(0),
            void_type: TypeId(0),
            undefined_type: TypeId(0),
            null_type: TypeId(0),
            never_type: TypeId(0),
            non_primitive_type: TypeId(0),
            true_type: TypeId(0),
            false_type: TypeId(0),
            error_type: TypeId(0),
            auto_type: TypeId(0),
            silent_never_type: TypeId(0),
            circular_constraint_type: TypeId(0),
            empty_object_type: TypeId(0),
            string_literal_cache: FxHashMap::default(),
            number_literal_cache: FxHashMap::default(),
            bigint_literal_cache: FxHashMap::default(),
            enum_literal_cache: FxHashMap::default(),
            union_cache: FxHashMap::default(),
            intersection_cache: FxHashMap::default(),
            reference_cache: FxHashMap::default(),
            tuple_target_cache: FxHashMap::default(),
            index_type_cache: FxHashMap::default(),
            indexed_access_cache: FxHashMap::default(),
            template_literal_cache: FxHashMap::default(),
            conditional_cache: FxHashMap::default(),
            fresh_types: FxHashMap::default(),
            regular_types: FxHashMap::default(),
        };

        table.any_type = table.intrinsic(TypeFlags::ANY, "any");
        table.unknown_type = table.intrinsic(TypeFlags::UNKNOWN, "unknown");
        table.string_type = table.intrinsic(TypeFlags::STRING, "string");
        table.number_type = table.intrinsic(TypeFlags::NUMBER, "number");
        table.boolean_type = table.intrinsic(TypeFlags::BOOLEAN, "boolean");
        table.bigint_type = table.intrinsic(TypeFlags::BIG_INT, "bigint");
        table.es_symbol_type = table.intrinsic(TypeFlags::ES_SYMBOL, "symbol");
        table.void_type = table.intrinsic(TypeFlags::VOID, "void");
        table.undefined_type = table.intrinsic(TypeFlags::UNDEFINED, "undefined");
        table.null_type = table.intrinsic(TypeFlags::NULL, "null");
        table.never_type = table.intrinsic(TypeFlags::NEVER, "never");
        table.non_primitive_type = table.intrinsic(TypeFlags::NON_PRIMITIVE, "object");
        table.true_type = table.new_type(
            TypeFlags::BOOLEAN_LITERAL,
            ObjectFlags::NONE,
            TypeKind::BooleanLiteral { value: true },
        );
        table.false_type = table.new_type(
            TypeFlags::BOOLEAN_LITERAL,
            ObjectFlags::NONE,
            TypeKind::BooleanLiteral { value: false },
        );
        // `error` composes like `any` so failures do not cascade.
        table.error_type = table.intrinsic(TypeFlags::ANY, "error");
        table.auto_type = table.intrinsic(TypeFlags::ANY, "auto");
        table.silent_never_type = table.intrinsic(TypeFlags::NEVER, "never");
        table.circular_constraint_type = table.intrinsic(TypeFlags::UNKNOWN, "circular");
        table.empty_object_type = table.new_type(
            TypeFlags::OBJECT,
            ObjectFlags::ANONYMOUS,
            TypeKind::Object(ObjectKind::Anonymous(Box::new(AnonymousMembers::default()))),
        );
        table
    }

    fn intrinsic(&mut self, flags: TypeFlags, name: &'static str) -> TypeId {
        self.new_type(flags, ObjectFlags::NONE, TypeKind::Intrinsic { name })
    }

    /// Allocate a fresh type. Never deduplicates; factories consult their
    /// caches first.
    pub fn new_type(&mut self, flags: TypeFlags, object_flags: ObjectFlags, kind: TypeKind) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        self.types.push(Type {
            id,
            flags,
            object_flags,
            symbol: None,
            alias: None,
            kind,
        });
        id
    }

    pub fn get(&self, id: TypeId) -> &Type {
        &self.types[id.index()]
    }

    pub fn get_mut(&mut self, id: TypeId) -> &mut Type {
        &mut self.types[id.index()]
    }

    pub fn flags(&self, id: TypeId) -> TypeFlags {
        self.types[id.index()].flags
    }

    pub fn object_flags(&self, id: TypeId) -> ObjectFlags {
        self.types[id.index()].object_flags
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn is_error(&self, id: TypeId) -> bool {
        id == self.error_type
    }

    /// Union constituents, or a single-element view of any other type.
    pub fn union_members(&self, id: TypeId) -> Vec<TypeId> {
        match &self.get(id).kind {
            TypeKind::Union { types } => types.clone(),
            _ => vec![id],
        }
    }
}

impl Default for TypeTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Canonical ordering key used when sorting union and intersection
/// constituents.
pub fn compare_type_ids(a: TypeId, b: TypeId) -> std::cmp::Ordering {
    a.0.cmp(&b.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intrinsics_have_distinct_ids() {
        let table = TypeTable::new();
        assert_ne!(table.any_type, table.unknown_type);
        assert_ne!(table.never_type, table.silent_never_type);
        assert_ne!(table.any_type, table.error_type);
        assert_ne!(table.any_type, table.auto_type);
    }

    #[test]
    fn sentinels_share_flags_but_not_identity() {
        let table = TypeTable::new();
        assert_eq!(table.flags(table.error_type), TypeFlags::ANY);
        assert_eq!(table.flags(table.silent_never_type), TypeFlags::NEVER);
        assert_ne!(table.error_type, table.any_type);
        assert_ne!(table.silent_never_type, table.never_type);
    }

    #[test]
    fn identity_mapper_detected() {
        let mapper = TypeMapper::new(vec![TypeId(5)], vec![TypeId(5)]);
        assert!(mapper.is_identity());
        let mapper = TypeMapper::new(vec![TypeId(5)], vec![TypeId(6)]);
        assert!(!mapper.is_identity());
    }
}
