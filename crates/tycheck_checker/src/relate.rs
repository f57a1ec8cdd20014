//! The relation engine: identity, subtype, assignability, comparability.
//!
//! Checks are memoized per (source, target, relation) and tolerate cycles
//! by assuming relatedness for pairs already in progress; recursive types
//! therefore terminate. `error` relates to and from everything so one
//! failure does not cascade.

use tycheck_ast::types::{ElementFlags, ObjectFlags, SignatureId, TypeFlags, TypeId};
use tycheck_core::text::TextRange;
use tycheck_diagnostics::messages;

use crate::checker::Checker;
use crate::construct::template_matches_string;
use crate::types::{ObjectKind, TypeKind};
use tycheck_ast::node::{Expression, ObjectLiteralElement};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationKind {
    Identity,
    Subtype,
    Assignable,
    Comparable,
}

impl<'a> Checker<'a> {
    pub fn is_type_assignable_to(&mut self, source: TypeId, target: TypeId) -> bool {
        self.is_type_related_to(source, target, RelationKind::Assignable)
    }

    pub fn is_type_subtype_of(&mut self, source: TypeId, target: TypeId) -> bool {
        self.is_type_related_to(source, target, RelationKind::Subtype)
    }

    /// Comparability: either direction may hold; used by equality operators
    /// and case clauses.
    pub fn is_type_comparable_to(&mut self, source: TypeId, target: TypeId) -> bool {
        self.is_type_related_to(source, target, RelationKind::Comparable)
    }

    pub fn is_type_identical_to(&mut self, source: TypeId, target: TypeId) -> bool {
        self.is_type_related_to(source, target, RelationKind::Identity)
    }

    pub fn is_type_related_to(
        &mut self,
        source: TypeId,
        target: TypeId,
        relation: RelationKind,
    ) -> bool {
        let source = self.get_regular_type(source);
        let target = self.get_regular_type(target);
        if source == target {
            return true;
        }
        if self.types.is_error(source) || self.types.is_error(target) {
            return true;
        }
        if relation == RelationKind::Identity {
            return self.types_identical(source, target);
        }

        let source_flags = self.types.flags(source);
        let target_flags = self.types.flags(target);

        if target_flags.intersects(TypeFlags::ANY_OR_UNKNOWN) {
            return true;
        }
        if source_flags.contains(TypeFlags::ANY) {
            // `any` is assignable everywhere but is not a proper subtype.
            return relation != RelationKind::Subtype || target_flags.contains(TypeFlags::ANY);
        }
        if source_flags.contains(TypeFlags::NEVER) {
            return true;
        }
        if target_flags.contains(TypeFlags::NEVER) {
            return false;
        }
        if !self.options.strict_null_checks()
            && source_flags.intersects(TypeFlags::NULLABLE)
        {
            return true;
        }
        if source_flags.contains(TypeFlags::UNDEFINED)
            && target_flags.intersects(TypeFlags::VOID)
        {
            return true;
        }

        let key = (source, target, relation);
        if let Some(&cached) = self.relation_cache.get(&key) {
            return cached;
        }
        if self.relation_stack.contains(&key) {
            // In-progress pair: assume related so recursive types resolve.
            return true;
        }
        self.relation_stack.push(key);
        let result = self.type_related_to_worker(source, target, relation);
        self.relation_stack.pop();
        self.relation_cache.insert(key, result);
        result
    }

    fn type_related_to_worker(
        &mut self,
        source: TypeId,
        target: TypeId,
        relation: RelationKind,
    ) -> bool {
        let source_flags = self.types.flags(source);
        let target_flags = self.types.flags(target);

        // Literal types against their base primitives.
        if source_flags.contains(TypeFlags::STRING_LITERAL) && target_flags.contains(TypeFlags::STRING) {
            return true;
        }
        if source_flags.contains(TypeFlags::NUMBER_LITERAL) && target_flags.contains(TypeFlags::NUMBER) {
            return true;
        }
        if source_flags.contains(TypeFlags::BIG_INT_LITERAL) && target_flags.contains(TypeFlags::BIG_INT) {
            return true;
        }
        if source_flags.contains(TypeFlags::BOOLEAN_LITERAL) && target_flags.contains(TypeFlags::BOOLEAN) {
            return true;
        }
        if source_flags.contains(TypeFlags::ENUM_LITERAL) && target_flags.contains(TypeFlags::NUMBER) {
            return true;
        }
        // Comparability overlaps in the reverse direction too.
        if relation == RelationKind::Comparable
            && target_flags.intersects(TypeFlags::LITERAL)
            && self.is_type_related_to(target, source, RelationKind::Assignable)
        {
            return true;
        }

        // A string literal matches a template literal pattern.
        if source_flags.contains(TypeFlags::STRING_LITERAL)
            && target_flags.contains(TypeFlags::TEMPLATE_LITERAL)
        {
            if let (TypeKind::StringLiteral { value }, TypeKind::TemplateLiteral { texts, types }) = (
                self.types.get(source).kind.clone(),
                self.types.get(target).kind.clone(),
            ) {
                return template_matches_string(self, &texts, &types, &value);
            }
        }
        if source_flags.contains(TypeFlags::TEMPLATE_LITERAL)
            && target_flags.contains(TypeFlags::STRING)
        {
            return true;
        }

        // Unions decompose first.
        if source_flags.contains(TypeFlags::UNION) {
            let members = self.types.union_members(source);
            if relation == RelationKind::Comparable {
                return members
                    .into_iter()
                    .any(|m| self.is_type_related_to(m, target, relation));
            }
            return members
                .into_iter()
                .all(|m| self.is_type_related_to(m, target, relation));
        }
        if target_flags.contains(TypeFlags::UNION) {
            let members = self.types.union_members(target);
            return members
                .into_iter()
                .any(|m| self.is_type_related_to(source, m, relation));
        }
        if target_flags.contains(TypeFlags::INTERSECTION) {
            if let TypeKind::Intersection { types } = self.types.get(target).kind.clone() {
                return types
                    .into_iter()
                    .all(|m| self.is_type_related_to(source, m, relation));
            }
        }
        if source_flags.contains(TypeFlags::INTERSECTION) {
            if let TypeKind::Intersection { types } = self.types.get(source).kind.clone() {
                return types
                    .into_iter()
                    .any(|m| self.is_type_related_to(m, target, relation));
            }
        }

        // Instantiable sources relate through their constraints.
        if source_flags.intersects(TypeFlags::INSTANTIABLE) {
            if source_flags.contains(TypeFlags::TYPE_PARAMETER) {
                if let Some(constraint) = self.get_base_constraint_of_type(source) {
                    if constraint != source
                        && constraint != self.types.circular_constraint_type
                        && self.is_type_related_to(constraint, target, relation)
                    {
                        return true;
                    }
                }
                return false;
            }
            if let Some(constraint) = self.get_base_constraint_of_type(source) {
                if constraint != source {
                    return self.is_type_related_to(constraint, target, relation);
                }
            }
            return false;
        }

        // Nominal enums.
        if source_flags.contains(TypeFlags::ENUM) || target_flags.contains(TypeFlags::ENUM) {
            return self.types.get(source).symbol == self.types.get(target).symbol
                && self.types.get(source).symbol.is_some();
        }

        // Primitives never relate structurally to other primitives.
        if target_flags.intersects(TypeFlags::PRIMITIVE) {
            return false;
        }
        // A primitive source against an object target relates through the
        // empty-shape rule only.
        if source_flags.intersects(TypeFlags::PRIMITIVE) {
            if target_flags.contains(TypeFlags::NON_PRIMITIVE) {
                return false;
            }
            if target_flags.contains(TypeFlags::OBJECT) {
                let members = self.resolve_structured_members(target);
                return members.properties.is_empty()
                    && members.call_signatures.is_empty()
                    && members.construct_signatures.is_empty()
                    && members.index_infos.is_empty();
            }
            return false;
        }
        if target_flags.contains(TypeFlags::NON_PRIMITIVE) {
            return source_flags.contains(TypeFlags::OBJECT);
        }

        if source_flags.contains(TypeFlags::OBJECT) && target_flags.contains(TypeFlags::OBJECT) {
            return self.object_type_related_to(source, target, relation);
        }
        false
    }

    fn object_type_related_to(
        &mut self,
        source: TypeId,
        target: TypeId,
        relation: RelationKind,
    ) -> bool {
        // Same generic target: relate type arguments pairwise (covariant
        // approximation; full variance is declaration-driven upstream).
        if let (
            TypeKind::Object(ObjectKind::Reference {
                target: source_target,
                type_args: source_args,
            }),
            TypeKind::Object(ObjectKind::Reference {
                target: target_target,
                type_args: target_args,
            }),
        ) = (
            self.types.get(source).kind.clone(),
            self.types.get(target).kind.clone(),
        ) {
            if source_target == target_target && source_args.len() == target_args.len() {
                if source_args
                    .iter()
                    .zip(target_args.iter())
                    .all(|(&s, &t)| self.is_type_related_to(s, t, relation))
                {
                    return true;
                }
            }
        }

        // Tuples.
        if self.is_tuple_type(source) && self.is_tuple_type(target) {
            return self.tuple_related_to(source, target, relation);
        }
        if self.is_tuple_type(source) && self.is_array_type(target) {
            let element = self.get_type_arguments(target)[0];
            let (members, _, _) = self.tuple_element_info(source).unwrap();
            return members
                .into_iter()
                .all(|m| self.is_type_related_to(m, element, relation));
        }
        if self.is_array_type(source) && self.is_tuple_type(target) {
            return false;
        }

        let source_members = self.resolve_structured_members(source);
        let target_members = self.resolve_structured_members(target);

        // Properties.
        let target_props: Vec<_> = target_members
            .properties
            .iter()
            .map(|(n, s)| (*n, *s))
            .collect();
        for (name, target_prop) in target_props {
            let target_optional = self.binder.symbols.get(target_prop).is_optional();
            match source_members.properties.get(&name).copied() {
                Some(source_prop) => {
                    let source_optional = self.binder.symbols.get(source_prop).is_optional();
                    if source_optional && !target_optional && self.options.strict_null_checks() {
                        return false;
                    }
                    let source_type = self.get_type_of_symbol(source_prop);
                    let target_type = self.get_type_of_symbol(target_prop);
                    if !self.is_type_related_to(source_type, target_type, relation) {
                        return false;
                    }
                }
                None => {
                    if target_optional {
                        continue;
                    }
                    // Fall back to a matching source index signature.
                    let name_text = self.interner.resolve(name).to_string();
                    let key_type = if name_text.parse::<f64>().is_ok() {
                        self.types.number_type
                    } else {
                        self.types.string_type
                    };
                    let mut covered = false;
                    let infos = source_members.index_infos.clone();
                    for info in infos {
                        if self.is_type_assignable_to(key_type, info.key_type) {
                            let target_type = self.get_type_of_symbol(target_prop);
                            if self.is_type_related_to(info.value_type, target_type, relation) {
                                covered = true;
                                break;
                            }
                        }
                    }
                    if !covered {
                        return false;
                    }
                }
            }
        }

        // Call and construct signatures.
        for &target_signature in &target_members.call_signatures {
            let matched = source_members.call_signatures.iter().any(|&source_signature| {
                self.signature_related_to(source_signature, target_signature)
            });
            if !matched {
                return false;
            }
        }
        for &target_signature in &target_members.construct_signatures {
            let matched = source_members
                .construct_signatures
                .iter()
                .any(|&source_signature| {
                    self.signature_related_to(source_signature, target_signature)
                });
            if !matched {
                return false;
            }
        }

        // Index signatures.
        let target_infos = target_members.index_infos.clone();
        for target_info in target_infos {
            let mut satisfied = false;
            let source_infos = source_members.index_infos.clone();
            for source_info in source_infos {
                if self.is_type_assignable_to(target_info.key_type, source_info.key_type)
                    && self.is_type_related_to(
                        source_info.value_type,
                        target_info.value_type,
                        relation,
                    )
                {
                    satisfied = true;
                    break;
                }
            }
            if !satisfied {
                // Every named property must satisfy the target index.
                let props: Vec<_> = source_members.properties.values().copied().collect();
                if props.is_empty() {
                    return false;
                }
                for prop in props {
                    let prop_type = self.get_type_of_symbol(prop);
                    if !self.is_type_related_to(prop_type, target_info.value_type, relation) {
                        return false;
                    }
                }
            }
        }
        true
    }

    fn tuple_related_to(&mut self, source: TypeId, target: TypeId, relation: RelationKind) -> bool {
        let (source_elements, source_flags, _) = self.tuple_element_info(source).unwrap();
        let (target_elements, target_flags, _) = self.tuple_element_info(target).unwrap();
        let target_has_rest = target_flags
            .last()
            .map_or(false, |f| f.contains(ElementFlags::REST));
        let target_min = target_flags
            .iter()
            .filter(|f| f.contains(ElementFlags::REQUIRED))
            .count();
        if source_elements.len() < target_min {
            return false;
        }
        if !target_has_rest && source_elements.len() > target_elements.len() {
            return false;
        }
        for (i, &source_element) in source_elements.iter().enumerate() {
            let (target_element, optional) = if i < target_elements.len() {
                (
                    target_elements[i],
                    target_flags[i].contains(ElementFlags::OPTIONAL),
                )
            } else if target_has_rest {
                (*target_elements.last().unwrap(), false)
            } else {
                return false;
            };
            let mut target_element_type = target_element;
            if optional && self.options.strict_null_checks() {
                let undefined = self.types.undefined_type;
                target_element_type = self.get_union_type(vec![target_element, undefined]);
            }
            if !self.is_type_related_to(source_element, target_element_type, relation) {
                return false;
            }
            let _ = source_flags;
        }
        true
    }

    /// Source signature usable where the target signature is expected.
    pub(crate) fn signature_related_to(
        &mut self,
        source: SignatureId,
        target: SignatureId,
    ) -> bool {
        let source_sig = self.signature(source).clone();
        let target_sig = self.signature(target).clone();
        // The source must not require more arguments than the target
        // supplies.
        if source_sig.min_argument_count > target_sig.max_argument_count() {
            return false;
        }
        let strict = self.options.strict_function_types();
        let pairs = source_sig.params.len().min(target_sig.params.len());
        for i in 0..pairs {
            let source_param = source_sig.params[i].ty;
            let target_param = target_sig.params[i].ty;
            let contravariant = self.is_type_assignable_to(target_param, source_param);
            let related = if strict {
                contravariant
            } else {
                contravariant || self.is_type_assignable_to(source_param, target_param)
            };
            if !related {
                return false;
            }
        }
        // Return types are covariant; a void-returning target accepts any
        // source return.
        if self.types.flags(target_sig.return_type).intersects(TypeFlags::VOID | TypeFlags::ANY) {
            return true;
        }
        self.is_type_assignable_to(source_sig.return_type, target_sig.return_type)
    }

    fn types_identical(&mut self, source: TypeId, target: TypeId) -> bool {
        if source == target {
            return true;
        }
        // Interning gives structurally identical types identical ids for
        // every interned category; remaining cases compare member sets.
        let source_flags = self.types.flags(source);
        let target_flags = self.types.flags(target);
        if source_flags != target_flags {
            return false;
        }
        if source_flags.contains(TypeFlags::OBJECT) && target_flags.contains(TypeFlags::OBJECT) {
            let source_members = self.resolve_structured_members(source);
            let target_members = self.resolve_structured_members(target);
            if source_members.properties.len() != target_members.properties.len() {
                return false;
            }
            let pairs: Vec<_> = source_members
                .properties
                .iter()
                .map(|(n, s)| (*n, *s))
                .collect();
            for (name, source_prop) in pairs {
                let Some(target_prop) = target_members.properties.get(&name).copied() else {
                    return false;
                };
                let source_type = self.get_type_of_symbol(source_prop);
                let target_type = self.get_type_of_symbol(target_prop);
                if !self.is_type_identical_to(source_type, target_type) {
                    return false;
                }
            }
            return true;
        }
        false
    }

    // ========================================================================
    // Reporting
    // ========================================================================

    /// Assignability check that reports on failure, including the excess
    /// property check for fresh object literals and a property-focused
    /// elaboration when one is missing.
    pub(crate) fn check_type_assignable_to_and_report(
        &mut self,
        source: TypeId,
        target: TypeId,
        range: TextRange,
        expr: Option<&Expression<'a>>,
    ) -> bool {
        if let Some(expr) = expr {
            if self.check_excess_properties(source, target, expr) {
                return false;
            }
        }
        if self.is_type_assignable_to(source, target) {
            return true;
        }
        if let Some((name, target_name)) = self.find_missing_property(source, target) {
            let source_name = self.type_to_string(source);
            self.error(
                range,
                &messages::PROPERTY_0_IS_MISSING_IN_TYPE_1_BUT_REQUIRED_IN_TYPE_2,
                &[&name, &source_name, &target_name],
            );
            return false;
        }
        let source_name = self.type_to_string(source);
        let target_name = self.type_to_string(target);
        self.error(
            range,
            &messages::TYPE_0_IS_NOT_ASSIGNABLE_TO_TYPE_1,
            &[&source_name, &target_name],
        );
        false
    }

    /// Fresh object literals may only specify known properties of a
    /// non-index-signature target. Returns true when a violation was
    /// reported.
    fn check_excess_properties(
        &mut self,
        source: TypeId,
        target: TypeId,
        expr: &Expression<'a>,
    ) -> bool {
        if !self
            .types
            .object_flags(source)
            .contains(ObjectFlags::FRESH_LITERAL)
        {
            return false;
        }
        let target_flags = self.types.flags(target);
        if !target_flags.intersects(TypeFlags::OBJECT | TypeFlags::UNION)
            || target_flags.intersects(TypeFlags::ANY_OR_UNKNOWN)
        {
            return false;
        }
        let constituents = self.types.union_members(target);
        let mut target_names = Vec::new();
        for constituent in &constituents {
            if !self.types.flags(*constituent).contains(TypeFlags::OBJECT) {
                return false;
            }
            let members = self.resolve_structured_members(*constituent);
            if !members.index_infos.is_empty() {
                return false;
            }
            target_names.extend(members.properties.keys().copied());
        }
        let source_members = self.resolve_structured_members(source);
        let source_names: Vec<_> = source_members.properties.keys().copied().collect();
        for name in source_names {
            if !target_names.contains(&name) {
                let name_text = self.interner.resolve(name).to_string();
                let target_text = self.type_to_string(target);
                let prop_range = excess_property_range(expr, &name_text).unwrap_or(expr.data().range);
                self.error(
                    prop_range,
                    &messages::OBJECT_LITERAL_MAY_ONLY_SPECIFY_KNOWN_PROPERTIES_AND_0_DOES_NOT_EXIST_IN_TYPE_1,
                    &[&name_text, &target_text],
                );
                return true;
            }
        }
        false
    }

    fn find_missing_property(&mut self, source: TypeId, target: TypeId) -> Option<(String, String)> {
        if !self.types.flags(source).contains(TypeFlags::OBJECT)
            || !self.types.flags(target).contains(TypeFlags::OBJECT)
        {
            return None;
        }
        let source_members = self.resolve_structured_members(source);
        let target_members = self.resolve_structured_members(target);
        let names: Vec<_> = target_members
            .properties
            .iter()
            .map(|(n, s)| (*n, *s))
            .collect();
        for (name, prop) in names {
            if self.binder.symbols.get(prop).is_optional() {
                continue;
            }
            if !source_members.properties.contains_key(&name) {
                let name_text = self.interner.resolve(name).to_string();
                let target_text = self.type_to_string(target);
                return Some((name_text, target_text));
            }
        }
        None
    }

    /// Check an argument list's expression against a parameter type,
    /// reporting with the argument-focused message.
    pub(crate) fn check_argument_assignable(
        &mut self,
        arg_type: TypeId,
        param_type: TypeId,
        range: TextRange,
        expr: Option<&Expression<'a>>,
    ) -> bool {
        if let Some(expr) = expr {
            if self.check_excess_properties(arg_type, param_type, expr) {
                return false;
            }
        }
        let widened = self.get_widened_literal_like_type_for_relation(arg_type, param_type);
        if self.is_type_assignable_to(widened, param_type) {
            return true;
        }
        let source_name = self.type_to_string(widened);
        let target_name = self.type_to_string(param_type);
        self.error(
            range,
            &messages::ARGUMENT_OF_TYPE_0_IS_NOT_ASSIGNABLE_TO_PARAMETER_OF_TYPE_1,
            &[&source_name, &target_name],
        );
        false
    }

    /// Types with no overlap make relational and equality comparisons
    /// always false; used by the comparison heuristics.
    pub(crate) fn has_no_overlap(&mut self, left: TypeId, right: TypeId) -> bool {
        let left_flags = self.types.flags(left);
        let right_flags = self.types.flags(right);
        if left_flags.intersects(TypeFlags::ANY_OR_UNKNOWN)
            || right_flags.intersects(TypeFlags::ANY_OR_UNKNOWN)
        {
            return false;
        }
        !self.is_type_comparable_to(left, right) && !self.is_type_comparable_to(right, left)
    }
}

fn excess_property_range(expr: &Expression<'_>, name: &str) -> Option<TextRange> {
    let Expression::Object(object) = *expr.skip_parens() else {
        return None;
    };
    for property in object.properties.iter() {
        match property {
            ObjectLiteralElement::Property(p) if p.name.text() == name => {
                return Some(p.data.range);
            }
            ObjectLiteralElement::Shorthand(s) if s.name.text_name == name => {
                return Some(s.data.range);
            }
            _ => {}
        }
    }
    None
}
