//! Generic instantiation: type parameter substitution, constraint
//! resolution, and the apparent-type computation built on it.
//!
//! `instantiate_type` is the central substitution function. It
//! short-circuits on identity mappers and on types that provably contain
//! no type variables, and defends against runaway expansions with a depth
//! counter and a total instantiation count.

use tycheck_ast::types::{CheckFlags, ObjectFlags, SymbolFlags, TypeFlags, TypeId};
use tycheck_diagnostics::messages;

use crate::checker::{Checker, ResolutionKey};
use crate::types::{AnonymousMembers, IndexInfo, ObjectKind, Signature, TypeKind, TypeMapper};
use tycheck_ast::types::SignatureId;

/// Nesting limit for instantiation; past this the expansion is reported as
/// excessively deep and possibly infinite.
const MAX_INSTANTIATION_DEPTH: u32 = 100;
/// Total instantiation budget for one checker.
const MAX_INSTANTIATION_COUNT: u64 = 5_000_000;

impl<'a> Checker<'a> {
    pub(crate) fn mapper_key(&self, mapper: &TypeMapper) -> String {
        fn walk(mapper: &TypeMapper, out: &mut String) {
            match mapper {
                TypeMapper::Simple { sources, targets } => {
                    for (s, t) in sources.iter().zip(targets.iter()) {
                        out.push_str(&s.0.to_string());
                        out.push('>');
                        out.push_str(&t.0.to_string());
                        out.push(';');
                    }
                }
                TypeMapper::Merged(first, second) => {
                    walk(first, out);
                    out.push('+');
                    walk(second, out);
                }
            }
        }
        let mut key = String::new();
        walk(mapper, &mut key);
        key
    }

    /// Whether `t` could mention a type variable. Memoized on the type's
    /// object flags; conservative for structurally deep shapes.
    pub(crate) fn could_contain_type_variables(&mut self, t: TypeId) -> bool {
        let flags = self.types.flags(t);
        if flags.intersects(TypeFlags::INSTANTIABLE) {
            return true;
        }
        let object_flags = self.types.object_flags(t);
        if object_flags.contains(ObjectFlags::COULD_CONTAIN_TYPE_VARIABLES_COMPUTED) {
            return object_flags.contains(ObjectFlags::COULD_CONTAIN_TYPE_VARIABLES);
        }
        let result = match &self.types.get(t).kind {
            TypeKind::Union { types } | TypeKind::Intersection { types } => {
                let members = types.clone();
                members.iter().any(|&m| self.could_contain_type_variables(m))
            }
            TypeKind::TemplateLiteral { types, .. } => {
                let members = types.clone();
                members.iter().any(|&m| self.could_contain_type_variables(m))
            }
            TypeKind::Object(ObjectKind::Reference { type_args, .. }) => {
                let args = type_args.clone();
                args.iter().any(|&m| self.could_contain_type_variables(m))
            }
            TypeKind::Object(ObjectKind::Anonymous(_)) | TypeKind::Object(ObjectKind::Mapped { .. }) => true,
            TypeKind::Object(ObjectKind::Interface { .. })
            | TypeKind::Object(ObjectKind::Tuple { .. }) => false,
            _ => false,
        };
        let entry = self.types.get_mut(t);
        entry.object_flags |= ObjectFlags::COULD_CONTAIN_TYPE_VARIABLES_COMPUTED;
        if result {
            entry.object_flags |= ObjectFlags::COULD_CONTAIN_TYPE_VARIABLES;
        }
        result
    }

    /// Create a free type parameter outside any declaration. Hosts and
    /// tests use this to drive the instantiation machinery directly.
    pub fn create_type_parameter(&mut self, name: &str, constraint: Option<TypeId>) -> TypeId {
        let param = self.types.new_type(
            TypeFlags::TYPE_PARAMETER,
            ObjectFlags::NONE,
            TypeKind::TypeParameter {
                name: name.to_string(),
                is_this: false,
            },
        );
        self.param_constraints.insert(param, constraint);
        param
    }

    pub fn instantiate_type(&mut self, t: TypeId, mapper: &TypeMapper) -> TypeId {
        if mapper.is_identity() {
            return t;
        }
        if !self.could_contain_type_variables(t) {
            return t;
        }
        if self.instantiation_depth >= MAX_INSTANTIATION_DEPTH
            || self.instantiation_count >= MAX_INSTANTIATION_COUNT
        {
            self.diagnostics.add(tycheck_diagnostics::Diagnostic::new(
                &messages::TYPE_INSTANTIATION_IS_EXCESSIVELY_DEEP_AND_POSSIBLY_INFINITE,
                &[],
            ));
            return self.types.error_type;
        }
        self.instantiation_count += 1;
        self.instantiation_depth += 1;
        let result = self.instantiate_type_worker(t, mapper);
        self.instantiation_depth -= 1;
        result
    }

    fn instantiate_type_worker(&mut self, t: TypeId, mapper: &TypeMapper) -> TypeId {
        match self.types.get(t).kind.clone() {
            TypeKind::TypeParameter { .. } => mapper.mapped(t).unwrap_or(t),
            TypeKind::Union { types } => {
                let mapped: Vec<TypeId> =
                    types.iter().map(|&m| self.instantiate_type(m, mapper)).collect();
                self.get_union_type(mapped)
            }
            TypeKind::Intersection { types } => {
                let mapped: Vec<TypeId> =
                    types.iter().map(|&m| self.instantiate_type(m, mapper)).collect();
                self.get_intersection_type(mapped)
            }
            TypeKind::Index { target } => {
                let mapped = self.instantiate_type(target, mapper);
                self.get_index_type(mapped)
            }
            TypeKind::IndexedAccess {
                object_type,
                index_type,
            } => {
                let object_type = self.instantiate_type(object_type, mapper);
                let index_type = self.instantiate_type(index_type, mapper);
                self.get_indexed_access_type(object_type, index_type, None)
            }
            TypeKind::Conditional {
                check_type,
                extends_type,
                true_type,
                false_type,
                distributive,
                infer_params,
            } => {
                let check_type = self.instantiate_type(check_type, mapper);
                let extends_type = self.instantiate_type(extends_type, mapper);
                let true_type = self.instantiate_type(true_type, mapper);
                let false_type = self.instantiate_type(false_type, mapper);
                self.get_conditional_type(
                    check_type,
                    extends_type,
                    true_type,
                    false_type,
                    distributive,
                    infer_params,
                )
            }
            TypeKind::TemplateLiteral { texts, types } => {
                let mapped: Vec<TypeId> =
                    types.iter().map(|&m| self.instantiate_type(m, mapper)).collect();
                self.get_template_literal_type(&texts, &mapped)
            }
            TypeKind::Substitution { base_type, .. } => self.instantiate_type(base_type, mapper),
            TypeKind::Object(ObjectKind::Reference { target, type_args }) => {
                let mapped: Vec<TypeId> = type_args
                    .iter()
                    .map(|&m| self.instantiate_type(m, mapper))
                    .collect();
                if let TypeKind::Object(ObjectKind::Tuple {
                    element_flags,
                    readonly,
                    ..
                }) = self.types.get(target).kind.clone()
                {
                    // Re-normalize: a variadic slot may have received a
                    // concrete tuple.
                    self.create_tuple_type(mapped, element_flags, readonly, None)
                } else {
                    self.create_type_reference(target, mapped)
                }
            }
            TypeKind::Object(ObjectKind::Anonymous(members)) => {
                let key = (t, self.mapper_key(mapper));
                if let Some(&cached) = self.instantiation_cache.get(&key) {
                    return cached;
                }
                let mut instantiated = AnonymousMembers::default();
                for (name, symbol) in members.properties.iter() {
                    let mapped_symbol = self.instantiate_symbol(*symbol, mapper);
                    instantiated.properties.insert(*name, mapped_symbol);
                }
                for &signature in &members.call_signatures {
                    let mapped = self.instantiate_signature(signature, mapper);
                    instantiated.call_signatures.push(mapped);
                }
                for &signature in &members.construct_signatures {
                    let mapped = self.instantiate_signature(signature, mapper);
                    instantiated.construct_signatures.push(mapped);
                }
                for info in &members.index_infos {
                    let value_type = self.instantiate_type(info.value_type, mapper);
                    instantiated.index_infos.push(IndexInfo {
                        key_type: info.key_type,
                        value_type,
                        is_readonly: info.is_readonly,
                        declaration: info.declaration,
                    });
                }
                let source = self.types.get(t);
                let object_flags = source.object_flags | ObjectFlags::INSTANTIATED;
                let flags = source.flags;
                let symbol = source.symbol;
                let id = self.types.new_type(
                    flags,
                    object_flags,
                    TypeKind::Object(ObjectKind::Anonymous(Box::new(instantiated))),
                );
                self.types.get_mut(id).symbol = symbol;
                self.instantiation_cache.insert(key, id);
                id
            }
            TypeKind::Object(ObjectKind::Mapped {
                type_param,
                constraint,
                template,
                readonly_modifier,
                question_modifier,
            }) => {
                let key = (t, self.mapper_key(mapper));
                if let Some(&cached) = self.instantiation_cache.get(&key) {
                    return cached;
                }
                let constraint = self.instantiate_type(constraint, mapper);
                let template = template.map(|tpl| self.instantiate_type(tpl, mapper));
                let result = self.get_mapped_type(
                    type_param,
                    constraint,
                    template,
                    readonly_modifier,
                    question_modifier,
                );
                self.instantiation_cache.insert(key, result);
                result
            }
            _ => t,
        }
    }

    // ========================================================================
    // Signature and symbol instantiation
    // ========================================================================

    pub(crate) fn instantiate_signature(
        &mut self,
        signature: SignatureId,
        mapper: &TypeMapper,
    ) -> SignatureId {
        if mapper.is_identity() {
            return signature;
        }
        let key = (signature, self.mapper_key(mapper));
        if let Some(&cached) = self.instantiated_signatures.get(&key) {
            return cached;
        }
        let source = self.signature(signature).clone();
        let params = source
            .params
            .iter()
            .map(|p| {
                let ty = self.instantiate_type(p.ty, mapper);
                crate::types::SignatureParameter {
                    name: p.name,
                    name_text: p.name_text.clone(),
                    ty,
                    optional: p.optional,
                    rest: p.rest,
                }
            })
            .collect();
        let return_type = self.instantiate_type(source.return_type, mapper);
        // Type parameters substituted by the mapper drop out of the
        // instantiated signature.
        let type_params: Vec<TypeId> = source
            .type_params
            .iter()
            .copied()
            .filter(|&p| mapper.mapped(p).is_none())
            .collect();
        let instantiated = Signature {
            flags: source.flags,
            type_params,
            params,
            min_argument_count: source.min_argument_count,
            return_type,
            declaration: source.declaration,
            target: Some(signature),
            mapper: Some(mapper.clone()),
        };
        let id = self.alloc_signature(instantiated);
        self.instantiated_signatures.insert(key, id);
        id
    }

    /// Transient symbol whose type is the instantiation of the original's.
    pub(crate) fn instantiate_symbol(
        &mut self,
        symbol: tycheck_ast::types::SymbolId,
        mapper: &TypeMapper,
    ) -> tycheck_ast::types::SymbolId {
        let key = (symbol, self.mapper_key(mapper));
        if let Some(&cached) = self.instantiated_symbols.get(&key) {
            return cached;
        }
        let source = self.binder.symbols.get(symbol);
        let name = source.name;
        let name_text = source.name_text.clone();
        let flags = source.flags | SymbolFlags::TRANSIENT;
        let parent = source.parent;
        let declarations = source.declarations.clone();
        let value_declaration = source.value_declaration;
        let fresh = self.binder.symbols.alloc(name, name_text, flags);
        {
            let fresh_symbol = self.binder.symbols.get_mut(fresh);
            fresh_symbol.check_flags = CheckFlags::INSTANTIATED;
            fresh_symbol.parent = parent;
            fresh_symbol.declarations = declarations;
            fresh_symbol.value_declaration = value_declaration;
        }
        self.links(fresh).target = Some((symbol, mapper.clone()));
        self.instantiated_symbols.insert(key, fresh);
        fresh
    }

    // ========================================================================
    // Base constraints
    // ========================================================================

    /// The concrete upper bound a possibly-instantiable type is guaranteed
    /// assignable to, or `None` when there is no constraint at all.
    pub fn get_base_constraint_of_type(&mut self, t: TypeId) -> Option<TypeId> {
        let flags = self.types.flags(t);
        if !flags.intersects(TypeFlags::INSTANTIABLE | TypeFlags::UNION_OR_INTERSECTION) {
            return Some(t);
        }
        if let Some(&cached) = self.resolved_base_constraints.get(&t) {
            return if cached == self.types.circular_constraint_type {
                None
            } else {
                Some(cached)
            };
        }
        if !self.push_type_resolution(ResolutionKey::BaseConstraint(t)) {
            // Circular constraint; report on named type parameters.
            if let TypeKind::TypeParameter { name, .. } = &self.types.get(t).kind {
                let name = name.clone();
                self.diagnostics.add(tycheck_diagnostics::Diagnostic::new(
                    &messages::TYPE_PARAMETER_0_HAS_A_CIRCULAR_CONSTRAINT,
                    &[&name],
                ));
            }
            return None;
        }
        let computed = self.compute_base_constraint(t);
        let succeeded = self.pop_type_resolution();
        let result = if succeeded { computed } else { None };
        let stored = result.unwrap_or(self.types.circular_constraint_type);
        self.resolved_base_constraints.insert(t, stored);
        result
    }

    fn compute_base_constraint(&mut self, t: TypeId) -> Option<TypeId> {
        match self.types.get(t).kind.clone() {
            TypeKind::TypeParameter { .. } => {
                let declared = self.param_constraints.get(&t).copied().flatten()?;
                if declared == t {
                    if let TypeKind::TypeParameter { name, .. } = &self.types.get(t).kind {
                        let name = name.clone();
                        self.diagnostics.add(tycheck_diagnostics::Diagnostic::new(
                            &messages::TYPE_PARAMETER_0_HAS_A_CIRCULAR_CONSTRAINT,
                            &[&name],
                        ));
                    }
                    return None;
                }
                self.get_base_constraint_of_type(declared).or(Some(declared))
            }
            TypeKind::Substitution { constraint, .. } => {
                self.get_base_constraint_of_type(constraint)
            }
            TypeKind::Index { .. } => {
                let string = self.types.string_type;
                let number = self.types.number_type;
                Some(self.get_union_type(vec![string, number]))
            }
            TypeKind::IndexedAccess {
                object_type,
                index_type,
            } => {
                let object_constraint = self.get_base_constraint_of_type(object_type)?;
                let index_constraint = self.get_base_constraint_of_type(index_type)?;
                if object_constraint == object_type && index_constraint == index_type {
                    return None;
                }
                Some(self.get_indexed_access_type(object_constraint, index_constraint, None))
            }
            TypeKind::Conditional {
                true_type,
                false_type,
                ..
            } => {
                let true_constraint = self.get_base_constraint_of_type(true_type)?;
                let false_constraint = self.get_base_constraint_of_type(false_type)?;
                Some(self.get_union_type(vec![true_constraint, false_constraint]))
            }
            TypeKind::TemplateLiteral { .. } => Some(self.types.string_type),
            TypeKind::Union { types } => {
                let mut constraints = Vec::with_capacity(types.len());
                for member in types {
                    constraints.push(self.get_base_constraint_of_type(member)?);
                }
                Some(self.get_union_type(constraints))
            }
            TypeKind::Intersection { types } => {
                let mut constraints = Vec::with_capacity(types.len());
                for member in types {
                    match self.get_base_constraint_of_type(member) {
                        Some(c) => constraints.push(c),
                        None => constraints.push(member),
                    }
                }
                Some(self.get_intersection_type(constraints))
            }
            _ => Some(t),
        }
    }

    // ========================================================================
    // Apparent types
    // ========================================================================

    /// The type whose members are visible on `t`: instantiable types map
    /// to their base constraint, primitives to their synthesized wrapper
    /// shapes.
    pub(crate) fn get_apparent_type(&mut self, t: TypeId) -> TypeId {
        let flags = self.types.flags(t);
        let t = if flags.intersects(TypeFlags::INSTANTIABLE) {
            self.get_base_constraint_of_type(t)
                .unwrap_or(self.types.empty_object_type)
        } else {
            t
        };
        let flags = self.types.flags(t);
        if flags.intersects(TypeFlags::STRING_LIKE) {
            return self.global_string_members_type();
        }
        if flags.intersects(TypeFlags::NUMBER_LIKE) && !flags.contains(TypeFlags::ENUM) {
            return self.global_number_members_type();
        }
        t
    }
}
