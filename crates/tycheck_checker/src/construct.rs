//! Type construction: factories with reduction and normalization rules.
//!
//! Every constructor funnels into the same interning discipline: compute a
//! key over the defining attributes, consult the cache, construct on miss.
//! Union and intersection constituents are kept sorted by type id, which
//! is the canonical form; the order has no semantic meaning.

use tycheck_ast::types::{ElementFlags, ObjectFlags, TypeFlags, TypeId};
use tycheck_core::text::TextRange;
use tycheck_diagnostics::messages;

use crate::checker::Checker;
use crate::types::{compare_type_ids, AnonymousMembers, ObjectKind, TypeKind, TypeMapper, UnionReduction};

/// Hard cap on pairwise comparisons during subtype reduction.
const SUBTYPE_REDUCTION_LIMIT: usize = 1_000_000;
/// Hard cap on cross-product expansion of intersections over unions and of
/// template literal distribution.
const CROSS_PRODUCT_LIMIT: usize = 100_000;
/// Hard cap on normalized tuple arity.
const TUPLE_EXPANSION_LIMIT: usize = 10_000;

impl<'a> Checker<'a> {
    // ========================================================================
    // Literal types
    // ========================================================================

    pub fn get_string_literal_type(&mut self, value: &str) -> TypeId {
        if let Some(&id) = self.types.string_literal_cache.get(value) {
            return id;
        }
        let id = self.types.new_type(
            TypeFlags::STRING_LITERAL,
            ObjectFlags::NONE,
            TypeKind::StringLiteral {
                value: value.to_string(),
            },
        );
        self.types.string_literal_cache.insert(value.to_string(), id);
        id
    }

    pub fn get_number_literal_type(&mut self, value: f64) -> TypeId {
        let bits = value.to_bits();
        if let Some(&id) = self.types.number_literal_cache.get(&bits) {
            return id;
        }
        let id = self.types.new_type(
            TypeFlags::NUMBER_LITERAL,
            ObjectFlags::NONE,
            TypeKind::NumberLiteral { value },
        );
        self.types.number_literal_cache.insert(bits, id);
        id
    }

    pub fn get_bigint_literal_type(&mut self, text: &str) -> TypeId {
        if let Some(&id) = self.types.bigint_literal_cache.get(text) {
            return id;
        }
        let id = self.types.new_type(
            TypeFlags::BIG_INT_LITERAL,
            ObjectFlags::NONE,
            TypeKind::BigIntLiteral {
                value: text.to_string(),
            },
        );
        self.types.bigint_literal_cache.insert(text.to_string(), id);
        id
    }

    pub fn get_boolean_literal_type(&mut self, value: bool) -> TypeId {
        if value {
            self.types.true_type
        } else {
            self.types.false_type
        }
    }

    /// The fresh counterpart of a regular literal type. Fresh literals
    /// widen in mutable positions; regular ones do not.
    pub fn get_fresh_literal_type(&mut self, regular: TypeId) -> TypeId {
        if !self.types.flags(regular).intersects(TypeFlags::STRING_OR_NUMBER_LITERAL | TypeFlags::BIG_INT_LITERAL) {
            return regular;
        }
        if self.types.regular_types.contains_key(&regular) {
            return regular;
        }
        if let Some(&fresh) = self.types.fresh_types.get(&regular) {
            return fresh;
        }
        let source = self.types.get(regular);
        let fresh = self.types.new_type(source.flags, source.object_flags, source.kind.clone());
        self.types.fresh_types.insert(regular, fresh);
        self.types.regular_types.insert(fresh, regular);
        fresh
    }

    pub fn get_regular_type(&mut self, t: TypeId) -> TypeId {
        if let Some(&regular) = self.types.regular_types.get(&t) {
            return regular;
        }
        if self
            .types
            .object_flags(t)
            .contains(ObjectFlags::FRESH_LITERAL)
        {
            return self.get_regular_object_literal_type(t);
        }
        t
    }

    fn get_regular_object_literal_type(&mut self, t: TypeId) -> TypeId {
        let source = self.types.get(t);
        let TypeKind::Object(ObjectKind::Anonymous(members)) = &source.kind else {
            return t;
        };
        let kind = TypeKind::Object(ObjectKind::Anonymous(members.clone()));
        let object_flags = source.object_flags & !ObjectFlags::FRESH_LITERAL;
        let symbol = source.symbol;
        let flags = source.flags;
        let id = self.types.new_type(flags, object_flags, kind);
        self.types.get_mut(id).symbol = symbol;
        id
    }

    fn is_fresh_literal(&self, t: TypeId) -> bool {
        self.types.regular_types.contains_key(&t)
            || self.types.object_flags(t).contains(ObjectFlags::FRESH_LITERAL)
    }

    /// Base primitive of a literal type.
    pub(crate) fn get_base_type_of_literal_type(&mut self, t: TypeId) -> TypeId {
        let flags = self.types.flags(t);
        if flags.contains(TypeFlags::ENUM_LITERAL) {
            // The declared enum type.
            if let Some(symbol) = self.types.get(t).symbol {
                if let Some(parent) = self.binder.symbols.get(symbol).parent {
                    return self.get_declared_type_of_symbol(parent);
                }
            }
            return self.types.number_type;
        }
        if flags.contains(TypeFlags::STRING_LITERAL) {
            self.types.string_type
        } else if flags.contains(TypeFlags::NUMBER_LITERAL) {
            self.types.number_type
        } else if flags.contains(TypeFlags::BIG_INT_LITERAL) {
            self.types.bigint_type
        } else if flags.contains(TypeFlags::BOOLEAN_LITERAL) {
            self.types.boolean_type
        } else if flags.contains(TypeFlags::UNION) {
            let members = self.types.union_members(t);
            let widened: Vec<TypeId> = members
                .into_iter()
                .map(|m| self.get_base_type_of_literal_type(m))
                .collect();
            self.get_union_type(widened)
        } else {
            t
        }
    }

    /// Widening applied to a freshly produced expression type when it
    /// flows into a mutable position.
    pub fn get_widened_literal_type(&mut self, t: TypeId) -> TypeId {
        if self.is_fresh_literal(t) {
            let regular = self.get_regular_type(t);
            return self.get_base_type_of_literal_type(regular);
        }
        let flags = self.types.flags(t);
        if flags.contains(TypeFlags::UNION) {
            let members = self.types.union_members(t);
            let widened: Vec<TypeId> = members
                .into_iter()
                .map(|m| self.get_widened_literal_type(m))
                .collect();
            return self.get_union_type(widened);
        }
        t
    }

    pub(crate) fn get_widened_type(&mut self, t: TypeId) -> TypeId {
        let widened = self.get_widened_literal_type(t);
        if self
            .types
            .object_flags(widened)
            .contains(ObjectFlags::FRESH_LITERAL)
        {
            return self.get_regular_type(widened);
        }
        widened
    }

    /// Keep literal types when the relation target wants literals;
    /// otherwise compare with the widened form.
    pub(crate) fn get_widened_literal_like_type_for_relation(
        &mut self,
        source: TypeId,
        target: TypeId,
    ) -> TypeId {
        if self.is_fresh_literal(source) {
            let regular = self.get_regular_type(source);
            if self.is_type_assignable_to(regular, target) {
                return regular;
            }
            let widened = self.get_base_type_of_literal_type(regular);
            if self.is_type_assignable_to(widened, target) {
                return regular;
            }
            return regular;
        }
        source
    }

    // ========================================================================
    // Unions
    // ========================================================================

    pub fn get_union_type(&mut self, types: Vec<TypeId>) -> TypeId {
        self.get_union_type_ex(types, UnionReduction::Literal)
    }

    pub fn get_union_type_ex(&mut self, types: Vec<TypeId>, reduction: UnionReduction) -> TypeId {
        if types.is_empty() {
            return self.types.never_type;
        }
        if types.len() == 1 {
            return types[0];
        }
        let mut set: Vec<TypeId> = Vec::new();
        let mut includes = TypeFlags::NONE;
        let mut saw_error = false;
        self.add_types_to_union(&mut set, &mut includes, &mut saw_error, &types);

        if saw_error {
            return self.types.error_type;
        }
        if includes.contains(TypeFlags::ANY) {
            return self.types.any_type;
        }
        if includes.contains(TypeFlags::UNKNOWN) {
            return self.types.unknown_type;
        }

        if reduction != UnionReduction::None {
            self.remove_redundant_literal_types(&mut set, includes);
            if reduction == UnionReduction::Subtype && set.len() > 1 {
                if !self.remove_subtypes(&mut set) {
                    return self.types.error_type;
                }
            }
        }

        match set.len() {
            0 => self.types.never_type,
            1 => set[0],
            _ => {
                let key = type_list_key("u", &set);
                if let Some(&cached) = self.types.union_cache.get(&key) {
                    return cached;
                }
                let id = self.types.new_type(
                    TypeFlags::UNION,
                    ObjectFlags::NONE,
                    TypeKind::Union { types: set },
                );
                self.types.union_cache.insert(key, id);
                id
            }
        }
    }

    fn add_types_to_union(
        &mut self,
        set: &mut Vec<TypeId>,
        includes: &mut TypeFlags,
        saw_error: &mut bool,
        types: &[TypeId],
    ) {
        for &t in types {
            if t == self.types.error_type {
                *saw_error = true;
                continue;
            }
            let flags = self.types.flags(t);
            if flags.contains(TypeFlags::UNION) {
                let nested = self.types.union_members(t);
                self.add_types_to_union(set, includes, saw_error, &nested);
                continue;
            }
            if flags.contains(TypeFlags::NEVER) {
                continue;
            }
            *includes |= flags;
            // Sorted insertion by id gives the canonical constituent order.
            match set.binary_search_by(|&probe| compare_type_ids(probe, t)) {
                Ok(_) => {}
                Err(index) => set.insert(index, t),
            }
        }
    }

    /// Remove literal types subsumed by a wider type in the same union:
    /// `"a" | string` reduces to `string`, string literals matched by a
    /// template literal pattern drop out, and `true | false` collapses to
    /// `boolean`.
    fn remove_redundant_literal_types(&mut self, set: &mut Vec<TypeId>, includes: TypeFlags) {
        let has_string = includes.contains(TypeFlags::STRING);
        let has_number = includes.contains(TypeFlags::NUMBER);
        let has_bigint = includes.contains(TypeFlags::BIG_INT);
        let has_boolean = includes.contains(TypeFlags::BOOLEAN);

        let templates: Vec<TypeId> = if includes.contains(TypeFlags::TEMPLATE_LITERAL) {
            set.iter()
                .copied()
                .filter(|&t| self.types.flags(t).contains(TypeFlags::TEMPLATE_LITERAL))
                .collect()
        } else {
            Vec::new()
        };

        set.retain(|&t| {
            let flags = self.types.flags(t);
            if flags.contains(TypeFlags::STRING_LITERAL) {
                if has_string {
                    return false;
                }
                if !templates.is_empty() {
                    let value = match &self.types.get(t).kind {
                        TypeKind::StringLiteral { value } => value.clone(),
                        _ => return true,
                    };
                    for &template in &templates {
                        if let TypeKind::TemplateLiteral { texts, types } =
                            self.types.get(template).kind.clone()
                        {
                            if template_matches_string(self, &texts, &types, &value) {
                                return false;
                            }
                        }
                    }
                }
                return true;
            }
            if flags.contains(TypeFlags::TEMPLATE_LITERAL) && has_string {
                return false;
            }
            if flags.contains(TypeFlags::NUMBER_LITERAL) && has_number {
                return !flags.contains(TypeFlags::ENUM_LITERAL);
            }
            if flags.contains(TypeFlags::BIG_INT_LITERAL) && has_bigint {
                return false;
            }
            if flags.contains(TypeFlags::BOOLEAN_LITERAL) && has_boolean {
                return false;
            }
            true
        });

        // true | false reduces to boolean.
        let true_type = self.types.true_type;
        let false_type = self.types.false_type;
        if set.contains(&true_type) && set.contains(&false_type) {
            set.retain(|&t| t != true_type && t != false_type);
            let boolean = self.types.boolean_type;
            match set.binary_search_by(|&probe| compare_type_ids(probe, boolean)) {
                Ok(_) => {}
                Err(index) => set.insert(index, boolean),
            }
        }
    }

    /// Full pairwise strict-subtype elimination, with an explosion guard.
    /// Returns false when the union is too complex to represent.
    fn remove_subtypes(&mut self, set: &mut Vec<TypeId>) -> bool {
        let estimated = set.len().saturating_mul(set.len());
        if estimated > SUBTYPE_REDUCTION_LIMIT {
            self.diagnostics.add(tycheck_diagnostics::Diagnostic::new(
                &messages::EXPRESSION_PRODUCES_A_UNION_TYPE_THAT_IS_TOO_COMPLEX_TO_REPRESENT,
                &[],
            ));
            return false;
        }
        let mut index = set.len();
        while index > 0 {
            index -= 1;
            let candidate = set[index];
            let subsumed = set.iter().enumerate().any(|(j, &other)| {
                if j == index || other == candidate {
                    return false;
                }
                if !self.is_type_subtype_of(candidate, other) {
                    return false;
                }
                // Mutual subtypes keep the earlier constituent.
                !self.is_type_subtype_of(other, candidate) || j < index
            });
            if subsumed {
                set.remove(index);
            }
        }
        true
    }

    // ========================================================================
    // Intersections
    // ========================================================================

    pub fn get_intersection_type(&mut self, types: Vec<TypeId>) -> TypeId {
        let mut set: Vec<TypeId> = Vec::new();
        let mut includes = TypeFlags::NONE;
        let mut saw_error = false;
        self.add_types_to_intersection(&mut set, &mut includes, &mut saw_error, &types);

        if saw_error {
            return self.types.error_type;
        }
        if includes.contains(TypeFlags::NEVER) {
            return self.types.never_type;
        }
        if includes.contains(TypeFlags::ANY) {
            return self.types.any_type;
        }
        // unknown is the identity of intersection.
        let unknown = self.types.unknown_type;
        set.retain(|&t| t != unknown);

        if self.intersection_is_empty(&set, includes) {
            return self.types.never_type;
        }
        self.remove_redundant_supertypes(&mut set);

        match set.len() {
            0 => self.types.unknown_type,
            1 => set[0],
            _ => {
                // X & (A | B) distributes to X & A | X & B.
                if set.iter().any(|&t| self.types.flags(t).contains(TypeFlags::UNION)) {
                    return self.distribute_intersection_over_union(&set);
                }
                let key = type_list_key("i", &set);
                if let Some(&cached) = self.types.intersection_cache.get(&key) {
                    return cached;
                }
                // A type variable intersected with compatible primitives is
                // kept irreducible so later instantiation can refine it.
                let object_flags = if set
                    .iter()
                    .any(|&t| self.types.flags(t).intersects(TypeFlags::TYPE_VARIABLE))
                {
                    ObjectFlags::IS_CONSTRAINED_TYPE_VARIABLE
                } else {
                    ObjectFlags::NONE
                };
                let id = self.types.new_type(
                    TypeFlags::INTERSECTION,
                    object_flags,
                    TypeKind::Intersection { types: set },
                );
                self.types.intersection_cache.insert(key, id);
                id
            }
        }
    }

    fn add_types_to_intersection(
        &mut self,
        set: &mut Vec<TypeId>,
        includes: &mut TypeFlags,
        saw_error: &mut bool,
        types: &[TypeId],
    ) {
        for &t in types {
            if t == self.types.error_type {
                *saw_error = true;
                continue;
            }
            let flags = self.types.flags(t);
            if flags.contains(TypeFlags::INTERSECTION) {
                if let TypeKind::Intersection { types: nested } = self.types.get(t).kind.clone() {
                    self.add_types_to_intersection(set, includes, saw_error, &nested);
                }
                continue;
            }
            *includes |= flags;
            match set.binary_search_by(|&probe| compare_type_ids(probe, t)) {
                Ok(_) => {}
                Err(index) => set.insert(index, t),
            }
        }
    }

    /// Provably empty intersections reduce to `never`: disjoint primitive
    /// domains, conflicting unit types, and nullable-with-object under
    /// strict null checks.
    fn intersection_is_empty(&mut self, set: &[TypeId], includes: TypeFlags) -> bool {
        // Conflicting unit types in the same domain: "a" & "b", 1 & 2.
        let units: Vec<TypeId> = set
            .iter()
            .copied()
            .filter(|&t| self.types.flags(t).intersects(TypeFlags::UNIT))
            .collect();
        for (i, &a) in units.iter().enumerate() {
            for &b in &units[i + 1..] {
                let fa = self.types.flags(a);
                let fb = self.types.flags(b);
                let same_domain = (fa & TypeFlags::DISJOINT_DOMAINS) == (fb & TypeFlags::DISJOINT_DOMAINS);
                if same_domain && a != b {
                    return true;
                }
            }
        }
        // Disjoint primitive domains.
        let domains = [
            TypeFlags::STRING_LIKE,
            TypeFlags::NUMBER_LIKE,
            TypeFlags::BIG_INT_LIKE,
            TypeFlags::BOOLEAN_LIKE,
            TypeFlags::ES_SYMBOL,
            TypeFlags::VOID_LIKE,
            TypeFlags::NULL,
        ];
        let mut seen = 0usize;
        for &domain in &domains {
            if includes.intersects(domain) {
                seen += 1;
            }
        }
        if seen > 1 {
            return true;
        }
        // Nullable intersected with an object domain under strict null
        // checks.
        if self.options.strict_null_checks()
            && includes.intersects(TypeFlags::NULLABLE)
            && includes.intersects(TypeFlags::OBJECT | TypeFlags::NON_PRIMITIVE)
        {
            return true;
        }
        false
    }

    /// `"a" & string` keeps only `"a"`.
    fn remove_redundant_supertypes(&mut self, set: &mut Vec<TypeId>) {
        let snapshot = set.clone();
        set.retain(|&t| {
            let flags = self.types.flags(t);
            let is_base_primitive = flags.intersects(
                TypeFlags::STRING | TypeFlags::NUMBER | TypeFlags::BIG_INT | TypeFlags::BOOLEAN,
            ) && !flags.intersects(TypeFlags::LITERAL);
            if !is_base_primitive {
                return true;
            }
            let covering_literal = snapshot.iter().any(|&other| {
                other != t
                    && self.types.flags(other).intersects(TypeFlags::LITERAL)
                    && self.is_type_assignable_to(other, t)
            });
            !covering_literal
        });
    }

    fn distribute_intersection_over_union(&mut self, set: &[TypeId]) -> TypeId {
        let mut size = 1usize;
        for &t in set {
            if self.types.flags(t).contains(TypeFlags::UNION) {
                size = size.saturating_mul(self.types.union_members(t).len());
                if size > CROSS_PRODUCT_LIMIT {
                    self.diagnostics.add(tycheck_diagnostics::Diagnostic::new(
                        &messages::EXPRESSION_PRODUCES_A_UNION_TYPE_THAT_IS_TOO_COMPLEX_TO_REPRESENT,
                        &[],
                    ));
                    return self.types.error_type;
                }
            }
        }
        // Distribute over the first union constituent; recursion handles
        // the rest pairwise, bounding intermediate growth.
        let union_index = set
            .iter()
            .position(|&t| self.types.flags(t).contains(TypeFlags::UNION))
            .unwrap();
        let members = self.types.union_members(set[union_index]);
        let mut results = Vec::with_capacity(members.len());
        for member in members {
            let mut parts: Vec<TypeId> = set.to_vec();
            parts[union_index] = member;
            results.push(self.get_intersection_type(parts));
        }
        self.get_union_type(results)
    }

    // ========================================================================
    // Arrays and tuples
    // ========================================================================

    /// The `Array<T>` target interface and its element type parameter,
    /// synthesized once per checker.
    pub(crate) fn global_array_target(&mut self) -> (TypeId, TypeId) {
        if let Some(pair) = self.array_target {
            return pair;
        }
        let element = self.types.new_type(
            TypeFlags::TYPE_PARAMETER,
            ObjectFlags::NONE,
            TypeKind::TypeParameter {
                name: "T".to_string(),
                is_this: false,
            },
        );
        self.param_constraints.insert(element, None);
        let target = self.types.new_type(
            TypeFlags::OBJECT,
            ObjectFlags::INTERFACE | ObjectFlags::REFERENCE,
            TypeKind::Object(ObjectKind::Interface {
                type_params: vec![element],
                this_type: None,
            }),
        );
        self.array_target = Some((target, element));
        (target, element)
    }

    pub fn create_array_type(&mut self, element: TypeId) -> TypeId {
        let (target, _) = self.global_array_target();
        self.create_type_reference(target, vec![element])
    }

    /// Array type produced by an array literal; distinct in identity from
    /// the plain array type of the same element type.
    pub fn create_array_literal_type(&mut self, element: TypeId) -> TypeId {
        let (target, _) = self.global_array_target();
        let key = format!("al:{}:{}", target.0, element.0);
        if let Some(&cached) = self.types.reference_cache.get(&key) {
            return cached;
        }
        let id = self.types.new_type(
            TypeFlags::OBJECT,
            ObjectFlags::REFERENCE | ObjectFlags::ARRAY_LITERAL,
            TypeKind::Object(ObjectKind::Reference {
                target,
                type_args: vec![element],
            }),
        );
        self.types.reference_cache.insert(key, id);
        id
    }

    pub(crate) fn is_array_type(&self, t: TypeId) -> bool {
        let Some((target, _)) = self.array_target else {
            return false;
        };
        matches!(
            &self.types.get(t).kind,
            TypeKind::Object(ObjectKind::Reference { target: rt, .. }) if *rt == target
        )
    }

    pub(crate) fn is_tuple_type(&self, t: TypeId) -> bool {
        match &self.types.get(t).kind {
            TypeKind::Object(ObjectKind::Reference { target, .. }) => matches!(
                &self.types.get(*target).kind,
                TypeKind::Object(ObjectKind::Tuple { .. })
            ),
            _ => false,
        }
    }

    pub(crate) fn tuple_element_info(&self, t: TypeId) -> Option<(Vec<TypeId>, Vec<ElementFlags>, bool)> {
        let TypeKind::Object(ObjectKind::Reference { target, type_args }) = &self.types.get(t).kind
        else {
            return None;
        };
        let TypeKind::Object(ObjectKind::Tuple {
            element_flags,
            readonly,
            ..
        }) = &self.types.get(*target).kind
        else {
            return None;
        };
        Some((type_args.clone(), element_flags.clone(), *readonly))
    }

    /// One target per distinct (element-flags, readonly) shape.
    pub(crate) fn get_tuple_target(&mut self, flags: &[ElementFlags], readonly: bool) -> TypeId {
        let mut key = String::with_capacity(flags.len() + 2);
        for f in flags {
            key.push(if f.contains(ElementFlags::VARIADIC) {
                '*'
            } else if f.contains(ElementFlags::REST) {
                '.'
            } else if f.contains(ElementFlags::OPTIONAL) {
                '?'
            } else {
                '#'
            });
        }
        if readonly {
            key.push('R');
        }
        if let Some(&cached) = self.types.tuple_target_cache.get(&key) {
            return cached;
        }
        let type_params: Vec<TypeId> = flags
            .iter()
            .enumerate()
            .map(|(i, _)| {
                let param = self.types.new_type(
                    TypeFlags::TYPE_PARAMETER,
                    ObjectFlags::NONE,
                    TypeKind::TypeParameter {
                        name: format!("T{}", i),
                        is_this: false,
                    },
                );
                self.param_constraints.insert(param, None);
                param
            })
            .collect();
        let id = self.types.new_type(
            TypeFlags::OBJECT,
            ObjectFlags::TUPLE | ObjectFlags::REFERENCE,
            TypeKind::Object(ObjectKind::Tuple {
                element_flags: flags.to_vec(),
                readonly,
                type_params,
            }),
        );
        self.types.tuple_target_cache.insert(key, id);
        id
    }

    /// Build a tuple type from element types and flags, normalizing the
    /// element sequence first. Normalization is a fixed point: an already
    /// normal sequence maps to the same target and reference.
    pub fn create_tuple_type(
        &mut self,
        element_types: Vec<TypeId>,
        element_flags: Vec<ElementFlags>,
        readonly: bool,
        error_range: Option<TextRange>,
    ) -> TypeId {
        debug_assert_eq!(element_types.len(), element_flags.len());
        let mut expanded_types: Vec<TypeId> = Vec::with_capacity(element_types.len());
        let mut expanded_flags: Vec<ElementFlags> = Vec::with_capacity(element_flags.len());

        for (&t, &f) in element_types.iter().zip(element_flags.iter()) {
            if f.contains(ElementFlags::VARIADIC) {
                if self.is_tuple_type(t) {
                    // Splice a concrete tuple spread element-wise.
                    let (args, flags, _) = self.tuple_element_info(t).unwrap();
                    expanded_types.extend(args);
                    expanded_flags.extend(flags);
                } else if self.is_array_type(t) {
                    let element = self.get_type_arguments(t)[0];
                    expanded_types.push(element);
                    expanded_flags.push(ElementFlags::REST);
                } else if self.types.flags(t).intersects(TypeFlags::INSTANTIABLE) {
                    expanded_types.push(t);
                    expanded_flags.push(ElementFlags::VARIADIC);
                } else {
                    expanded_types.push(t);
                    expanded_flags.push(ElementFlags::REST);
                }
            } else {
                expanded_types.push(t);
                expanded_flags.push(f);
            }
            if expanded_types.len() > TUPLE_EXPANSION_LIMIT {
                if let Some(range) = error_range {
                    self.error(
                        range,
                        &messages::TYPE_PRODUCES_A_TUPLE_TYPE_THAT_IS_TOO_LARGE_TO_REPRESENT,
                        &[],
                    );
                }
                return self.types.error_type;
            }
        }

        // A rest element absorbs everything after it.
        if let Some(rest_index) = expanded_flags
            .iter()
            .position(|f| f.contains(ElementFlags::REST))
        {
            if rest_index + 1 < expanded_flags.len() {
                let mut rest_members = vec![expanded_types[rest_index]];
                for (&t, f) in expanded_types[rest_index + 1..]
                    .iter()
                    .zip(&expanded_flags[rest_index + 1..])
                {
                    let member = if f.contains(ElementFlags::VARIADIC) && self.is_array_type(t) {
                        self.get_type_arguments(t)[0]
                    } else {
                        t
                    };
                    rest_members.push(member);
                }
                let rest_type = self.get_union_type(rest_members);
                expanded_types.truncate(rest_index);
                expanded_flags.truncate(rest_index);
                expanded_types.push(rest_type);
                expanded_flags.push(ElementFlags::REST);
            }
        }

        // An optional element before a required one is effectively
        // required: a tuple cannot have a hole before a guaranteed slot.
        if let Some(last_required) = expanded_flags
            .iter()
            .rposition(|f| f.contains(ElementFlags::REQUIRED))
        {
            for f in expanded_flags[..last_required].iter_mut() {
                if f.contains(ElementFlags::OPTIONAL) {
                    *f = ElementFlags::REQUIRED;
                }
            }
        }

        let target = self.get_tuple_target(&expanded_flags, readonly);
        if expanded_types.is_empty() {
            return target;
        }
        self.create_type_reference(target, expanded_types)
    }

    // ========================================================================
    // Type references
    // ========================================================================

    pub(crate) fn create_type_reference(&mut self, target: TypeId, type_args: Vec<TypeId>) -> TypeId {
        let key = {
            let mut key = format!("r:{}", target.0);
            for arg in &type_args {
                key.push(',');
                key.push_str(&arg.0.to_string());
            }
            key
        };
        if let Some(&cached) = self.types.reference_cache.get(&key) {
            return cached;
        }
        let id = self.types.new_type(
            TypeFlags::OBJECT,
            ObjectFlags::REFERENCE,
            TypeKind::Object(ObjectKind::Reference { target, type_args }),
        );
        let symbol = self.types.get(target).symbol;
        self.types.get_mut(id).symbol = symbol;
        self.types.reference_cache.insert(key, id);
        id
    }

    pub(crate) fn get_type_arguments(&self, t: TypeId) -> Vec<TypeId> {
        match &self.types.get(t).kind {
            TypeKind::Object(ObjectKind::Reference { type_args, .. }) => type_args.clone(),
            _ => Vec::new(),
        }
    }

    // ========================================================================
    // keyof and indexed access
    // ========================================================================

    pub fn get_index_type(&mut self, t: TypeId) -> TypeId {
        let flags = self.types.flags(t);
        if flags.contains(TypeFlags::ANY) {
            let string = self.types.string_type;
            let number = self.types.number_type;
            let symbol = self.types.es_symbol_type;
            return self.get_union_type(vec![string, number, symbol]);
        }
        if flags.contains(TypeFlags::UNION) {
            // keyof (A | B) = keyof A & keyof B.
            let members = self.types.union_members(t);
            let keyofs: Vec<TypeId> = members.into_iter().map(|m| self.get_index_type(m)).collect();
            return self.get_intersection_type(keyofs);
        }
        if flags.intersects(TypeFlags::INSTANTIABLE) {
            if let Some(&cached) = self.types.index_type_cache.get(&t) {
                return cached;
            }
            let id = self.types.new_type(
                TypeFlags::INDEX,
                ObjectFlags::NONE,
                TypeKind::Index { target: t },
            );
            self.types.index_type_cache.insert(t, id);
            return id;
        }
        let apparent = self.get_apparent_type(t);
        let members = self.resolve_structured_members(apparent);
        let mut keys: Vec<TypeId> = Vec::new();
        for name in members.properties.keys() {
            let text = self.interner.resolve(*name).to_string();
            let key = if let Ok(value) = text.parse::<f64>() {
                self.get_number_literal_type(value)
            } else {
                self.get_string_literal_type(&text)
            };
            keys.push(key);
        }
        for info in members.index_infos.iter() {
            keys.push(info.key_type);
        }
        self.get_union_type(keys)
    }

    pub fn get_indexed_access_type(
        &mut self,
        object_type: TypeId,
        index_type: TypeId,
        error_range: Option<TextRange>,
    ) -> TypeId {
        if self.types.is_error(object_type) || self.types.is_error(index_type) {
            return self.types.error_type;
        }
        let object_flags = self.types.flags(object_type);
        let index_flags = self.types.flags(index_type);
        if object_flags.contains(TypeFlags::ANY) {
            return self.types.any_type;
        }
        if index_flags.contains(TypeFlags::ANY) {
            return self.types.any_type;
        }
        if index_flags.contains(TypeFlags::UNION) {
            let members = self.types.union_members(index_type);
            let parts: Vec<TypeId> = members
                .into_iter()
                .map(|m| self.get_indexed_access_type(object_type, m, error_range))
                .collect();
            return self.get_union_type(parts);
        }
        // Generic operands defer into a symbolic node.
        if object_flags.intersects(TypeFlags::INSTANTIABLE)
            || index_flags.intersects(TypeFlags::INSTANTIABLE)
        {
            if let Some(&cached) = self
                .types
                .indexed_access_cache
                .get(&(object_type, index_type))
            {
                return cached;
            }
            let id = self.types.new_type(
                TypeFlags::INDEXED_ACCESS,
                ObjectFlags::NONE,
                TypeKind::IndexedAccess {
                    object_type,
                    index_type,
                },
            );
            self.types
                .indexed_access_cache
                .insert((object_type, index_type), id);
            return id;
        }
        if object_flags.contains(TypeFlags::UNION) {
            let members = self.types.union_members(object_type);
            let parts: Vec<TypeId> = members
                .into_iter()
                .map(|m| self.get_indexed_access_type(m, index_type, error_range))
                .collect();
            return self.get_union_type(parts);
        }

        // Tuple element access by numeric literal.
        if self.is_tuple_type(object_type)
            && index_flags.contains(TypeFlags::NUMBER_LITERAL)
        {
            let (elements, flags, _) = self.tuple_element_info(object_type).unwrap();
            if let TypeKind::NumberLiteral { value } = self.types.get(index_type).kind {
                let index = value as usize;
                if value >= 0.0 && value.fract() == 0.0 && index < elements.len() {
                    let mut element = elements[index];
                    if flags[index].contains(ElementFlags::OPTIONAL) {
                        let undefined = self.types.undefined_type;
                        element = self.get_union_type(vec![element, undefined]);
                    }
                    return element;
                }
                if let Some(range) = error_range {
                    let name = self.type_to_string(object_type);
                    let len = elements.len().to_string();
                    let idx = format!("{}", value);
                    self.error(
                        range,
                        &messages::TUPLE_TYPE_0_OF_LENGTH_1_HAS_NO_ELEMENT_AT_INDEX_2,
                        &[&name, &len, &idx],
                    );
                }
                return self.types.error_type;
            }
        }

        let apparent = self.get_apparent_type(object_type);
        // Named property access.
        if index_flags.contains(TypeFlags::STRING_LITERAL) {
            if let TypeKind::StringLiteral { value } = self.types.get(index_type).kind.clone() {
                let name = self.interner.intern(&value);
                if let Some(prop) = self.get_property_of_type(apparent, name) {
                    return self.get_type_of_symbol(prop);
                }
            }
        }
        if index_flags.contains(TypeFlags::NUMBER_LITERAL) {
            if let TypeKind::NumberLiteral { value } = self.types.get(index_type).kind {
                let text = if value.fract() == 0.0 {
                    format!("{}", value as i64)
                } else {
                    format!("{}", value)
                };
                let name = self.interner.intern(&text);
                if let Some(prop) = self.get_property_of_type(apparent, name) {
                    return self.get_type_of_symbol(prop);
                }
            }
        }
        // Index signatures.
        let members = self.resolve_structured_members(apparent);
        let infos = members.index_infos.clone();
        for info in &infos {
            if self.is_type_assignable_to(index_type, info.key_type) {
                let mut value = info.value_type;
                if self.options.no_unchecked_indexed_access()
                    && !index_flags.intersects(TypeFlags::LITERAL)
                {
                    let undefined = self.types.undefined_type;
                    value = self.get_union_type(vec![value, undefined]);
                }
                return value;
            }
        }
        if let Some(range) = error_range {
            if index_flags.intersects(TypeFlags::STRING_OR_NUMBER_LITERAL) {
                let key = self.type_to_string(index_type);
                let object_name = self.type_to_string(object_type);
                self.error(
                    range,
                    &messages::PROPERTY_0_DOES_NOT_EXIST_ON_TYPE_1,
                    &[key.trim_matches('"'), &object_name],
                );
            } else if index_flags.intersects(TypeFlags::STRING_LIKE | TypeFlags::NUMBER_LIKE) {
                let index_name = self.type_to_string(index_type);
                let object_name = self.type_to_string(object_type);
                self.error(
                    range,
                    &messages::ELEMENT_IMPLICITLY_HAS_AN_ANY_TYPE_BECAUSE_EXPRESSION_OF_TYPE_0_CANT_BE_USED_TO_INDEX_TYPE_1,
                    &[&index_name, &object_name],
                );
            } else {
                let index_name = self.type_to_string(index_type);
                self.error(
                    range,
                    &messages::TYPE_0_CANNOT_BE_USED_AS_AN_INDEX_TYPE,
                    &[&index_name],
                );
            }
        }
        self.types.error_type
    }

    // ========================================================================
    // Template literal types
    // ========================================================================

    pub fn get_template_literal_type(&mut self, texts: &[String], types: &[TypeId]) -> TypeId {
        debug_assert_eq!(texts.len(), types.len() + 1);
        // Distribute over a union constituent first.
        if let Some(index) = types
            .iter()
            .position(|&t| self.types.flags(t).contains(TypeFlags::UNION))
        {
            let members = self.types.union_members(types[index]);
            if members.len().saturating_mul(types.len().max(1)) > CROSS_PRODUCT_LIMIT {
                self.diagnostics.add(tycheck_diagnostics::Diagnostic::new(
                    &messages::EXPRESSION_PRODUCES_A_UNION_TYPE_THAT_IS_TOO_COMPLEX_TO_REPRESENT,
                    &[],
                ));
                return self.types.error_type;
            }
            let mut results = Vec::with_capacity(members.len());
            for member in members {
                let mut replaced: Vec<TypeId> = types.to_vec();
                replaced[index] = member;
                results.push(self.get_template_literal_type(texts, &replaced));
            }
            return self.get_union_type(results);
        }

        let mut new_texts: Vec<String> = vec![texts[0].clone()];
        let mut new_types: Vec<TypeId> = Vec::new();
        for (i, &t) in types.iter().enumerate() {
            let flags = self.types.flags(t);
            if flags.contains(TypeFlags::NEVER) {
                return self.types.never_type;
            }
            if let Some(text) = self.literal_text(t) {
                // Literal spans fold into the surrounding text.
                let last = new_texts.last_mut().unwrap();
                last.push_str(&text);
                last.push_str(&texts[i + 1]);
            } else {
                new_types.push(t);
                new_texts.push(texts[i + 1].clone());
            }
        }
        if new_types.is_empty() {
            // Everything folded; the result is a plain string literal.
            return self.get_string_literal_type(&new_texts[0]);
        }
        let mut key = String::from("t:");
        for text in &new_texts {
            key.push_str(&text.len().to_string());
            key.push(':');
            key.push_str(text);
            key.push('|');
        }
        for t in &new_types {
            key.push_str(&t.0.to_string());
            key.push(',');
        }
        if let Some(&cached) = self.types.template_literal_cache.get(&key) {
            return cached;
        }
        let id = self.types.new_type(
            TypeFlags::TEMPLATE_LITERAL,
            ObjectFlags::NONE,
            TypeKind::TemplateLiteral {
                texts: new_texts,
                types: new_types,
            },
        );
        self.types.template_literal_cache.insert(key, id);
        id
    }

    pub(crate) fn literal_text(&self, t: TypeId) -> Option<String> {
        match &self.types.get(t).kind {
            TypeKind::StringLiteral { value } => Some(value.clone()),
            TypeKind::NumberLiteral { value } => Some(if value.fract() == 0.0 {
                format!("{}", *value as i64)
            } else {
                format!("{}", value)
            }),
            TypeKind::BigIntLiteral { value } => Some(value.trim_end_matches('n').to_string()),
            TypeKind::BooleanLiteral { value } => Some(value.to_string()),
            TypeKind::Intrinsic { name } if *name == "null" || *name == "undefined" => {
                Some(name.to_string())
            }
            _ => None,
        }
    }

    // ========================================================================
    // Spread
    // ========================================================================

    /// Merge for object spread. Later required properties override earlier
    /// ones; later optional properties union with the earlier type since
    /// the spread may or may not supply them at runtime.
    pub(crate) fn get_spread_type(&mut self, left: TypeId, right: TypeId) -> TypeId {
        let left_flags = self.types.flags(left);
        let right_flags = self.types.flags(right);
        if left_flags.contains(TypeFlags::ANY) || right_flags.contains(TypeFlags::ANY) {
            return self.types.any_type;
        }
        if right_flags.intersects(TypeFlags::NULLABLE | TypeFlags::NEVER) {
            return left;
        }
        if left_flags.contains(TypeFlags::UNION) {
            let members = self.types.union_members(left);
            let parts: Vec<TypeId> = members
                .into_iter()
                .map(|m| self.get_spread_type(m, right))
                .collect();
            return self.get_union_type(parts);
        }
        if right_flags.contains(TypeFlags::UNION) {
            let members = self.types.union_members(right);
            let parts: Vec<TypeId> = members
                .into_iter()
                .map(|m| self.get_spread_type(left, m))
                .collect();
            return self.get_union_type(parts);
        }
        if right_flags.intersects(TypeFlags::PRIMITIVE) {
            return left;
        }

        let left_apparent = self.get_apparent_type(left);
        let right_apparent = self.get_apparent_type(right);
        let left_members = self.resolve_structured_members(left_apparent);
        let right_members = self.resolve_structured_members(right_apparent);

        let mut result = AnonymousMembers::default();
        result.index_infos = left_members
            .index_infos
            .iter()
            .chain(right_members.index_infos.iter())
            .cloned()
            .collect();

        let left_props: Vec<_> = left_members
            .properties
            .iter()
            .map(|(n, s)| (*n, *s))
            .collect();
        let right_props: Vec<_> = right_members
            .properties
            .iter()
            .map(|(n, s)| (*n, *s))
            .collect();

        for (name, symbol) in left_props.iter() {
            result.properties.insert(*name, *symbol);
        }
        for (name, symbol) in right_props {
            let right_optional = self.binder.symbols.get(symbol).is_optional();
            match result.properties.get(&name).copied() {
                Some(existing) if right_optional => {
                    let existing_type = self.get_type_of_symbol(existing);
                    let right_type = self.get_type_of_symbol(symbol);
                    let merged = self.get_union_type(vec![existing_type, right_type]);
                    // The spread may or may not supply the key at runtime,
                    // so presence is only guaranteed when the earlier
                    // property already guaranteed it.
                    let merged_optional = self.binder.symbols.get(existing).is_optional();
                    let name_text = self.binder.symbols.get(symbol).name_text.clone();
                    let merged_symbol =
                        self.create_transient_property(name, &name_text, merged, merged_optional);
                    result.properties.insert(name, merged_symbol);
                }
                _ => {
                    result.properties.insert(name, symbol);
                }
            }
        }

        self.types.new_type(
            TypeFlags::OBJECT,
            ObjectFlags::ANONYMOUS | ObjectFlags::OBJECT_LITERAL,
            TypeKind::Object(ObjectKind::Anonymous(Box::new(result))),
        )
    }

    // ========================================================================
    // Conditional types
    // ========================================================================

    /// Evaluate or defer a conditional type.
    pub(crate) fn get_conditional_type(
        &mut self,
        check_type: TypeId,
        extends_type: TypeId,
        true_type: TypeId,
        false_type: TypeId,
        distributive: bool,
        infer_params: Vec<TypeId>,
    ) -> TypeId {
        // Distribution applies when the check type was written as a naked
        // type parameter and is instantiated with a union.
        if distributive && self.types.flags(check_type).contains(TypeFlags::UNION) {
            let members = self.types.union_members(check_type);
            let parts: Vec<TypeId> = members
                .into_iter()
                .map(|m| {
                    self.get_conditional_type(
                        m,
                        extends_type,
                        true_type,
                        false_type,
                        false,
                        infer_params.clone(),
                    )
                })
                .collect();
            return self.get_union_type(parts);
        }
        if self.types.flags(check_type).intersects(TypeFlags::INSTANTIABLE) {
            let key = format!(
                "c:{}:{}:{}:{}:{}",
                check_type.0, extends_type.0, true_type.0, false_type.0, distributive as u8
            );
            if let Some(&cached) = self.types.conditional_cache.get(&key) {
                return cached;
            }
            let id = self.types.new_type(
                TypeFlags::CONDITIONAL,
                ObjectFlags::NONE,
                TypeKind::Conditional {
                    check_type,
                    extends_type,
                    true_type,
                    false_type,
                    distributive,
                    infer_params,
                },
            );
            self.types.conditional_cache.insert(key, id);
            return id;
        }

        if !infer_params.is_empty() {
            let mut context = crate::infer::InferenceContext::new(infer_params.clone());
            self.infer_types(&mut context, check_type, extends_type);
            let inferred = self.get_inferred_types(&mut context);
            let mapper = TypeMapper::new(infer_params.clone(), inferred);
            let instantiated_extends = self.instantiate_type(extends_type, &mapper);
            if self.is_type_assignable_to(check_type, instantiated_extends) {
                return self.instantiate_type(true_type, &mapper);
            }
            // The false branch never sees the inferred bindings.
            let unknown = self.types.unknown_type;
            let fallback = TypeMapper::new(
                infer_params.clone(),
                infer_params.iter().map(|_| unknown).collect(),
            );
            return self.instantiate_type(false_type, &fallback);
        }

        if self.is_type_assignable_to(check_type, extends_type) {
            true_type
        } else {
            false_type
        }
    }
}

/// Greedy match of a string value against a template literal pattern.
pub(crate) fn template_matches_string(
    checker: &Checker<'_>,
    texts: &[String],
    types: &[TypeId],
    value: &str,
) -> bool {
    if types.is_empty() {
        return texts[0] == value;
    }
    let first = &texts[0];
    let last = &texts[texts.len() - 1];
    if !value.starts_with(first.as_str()) {
        return false;
    }
    let mut rest = &value[first.len()..];
    if !rest.ends_with(last.as_str()) || rest.len() < last.len() {
        return false;
    }
    rest = &rest[..rest.len() - last.len()];
    // Middle texts must appear in order; placeholders match greedily.
    for middle in &texts[1..texts.len() - 1] {
        match rest.find(middle.as_str()) {
            Some(index) => rest = &rest[index + middle.len()..],
            None => return false,
        }
    }
    // Number placeholders must hold numeric text in the single-span case.
    if types.len() == 1 && checker.types.flags(types[0]).intersects(TypeFlags::NUMBER_LIKE) {
        let span = &value[first.len()..value.len() - last.len()];
        return span.parse::<f64>().is_ok();
    }
    true
}

fn type_list_key(prefix: &str, types: &[TypeId]) -> String {
    let mut key = String::with_capacity(types.len() * 4 + 2);
    key.push_str(prefix);
    key.push(':');
    for t in types {
        key.push_str(&t.0.to_string());
        key.push(',');
    }
    key
}
