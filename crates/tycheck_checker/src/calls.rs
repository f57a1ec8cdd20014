//! Call and overload resolution.
//!
//! The pipeline: untyped-call short circuit, candidate reordering, arity
//! pre-filters, two-pass matching (subtype relation first, assignable
//! second), generic inference with context-sensitive arguments excluded
//! from the first applicability pass and re-included in a guaranteed
//! second pass, and graded failure evidence. Resolution always returns a
//! signature — the closest candidate or a synthesized union shape — so
//! downstream consumers have something to work with in error programs.

use tycheck_ast::node::*;
use tycheck_ast::types::{SignatureFlags, SignatureId, TypeFlags, TypeId};
use tycheck_core::text::TextRange;
use tycheck_diagnostics::{messages, Diagnostic};

use crate::checker::{CheckMode, Checker};
use crate::infer::{InferenceContext, InferencePriority};
use crate::relate::RelationKind;
use crate::types::{Signature, SignatureParameter, TypeMapper};

/// The two-phase protocol for context-sensitive arguments: the first
/// applicability pass excludes them, the second includes them once a
/// candidate has been found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArgumentCheckMode {
    Exclusive,
    Inclusive,
}

impl<'a> Checker<'a> {
    pub(crate) fn resolve_call_expression(
        &mut self,
        node: &'a CallExpression<'a>,
        mode: CheckMode,
    ) -> TypeId {
        let callee = self.check_expression(node.expression, CheckMode::NORMAL);
        let callee = if node.question_dot {
            self.get_non_nullable_type(callee)
        } else {
            callee
        };
        if self.types.is_error(callee) {
            self.check_arguments_for_side_effects(node.arguments);
            return self.types.error_type;
        }
        let callee_flags = self.types.flags(callee);
        // Untyped call: arguments are still checked, no matching occurs.
        if callee_flags.contains(TypeFlags::ANY) {
            self.check_arguments_for_side_effects(node.arguments);
            return self.types.any_type;
        }
        let apparent = self.get_apparent_type(callee);
        let members = self.resolve_structured_members(apparent);
        let signatures = members.call_signatures.clone();
        if signatures.is_empty() {
            // An object with no call signatures that is still assignable
            // to the Function shape is an untyped call.
            let function_shape = self.global_function_type();
            if self.is_type_assignable_to(apparent, function_shape)
                && members.construct_signatures.is_empty()
            {
                self.check_arguments_for_side_effects(node.arguments);
                return self.types.any_type;
            }
            self.check_arguments_for_side_effects(node.arguments);
            self.error(
                node.expression.data().range,
                &messages::THIS_EXPRESSION_IS_NOT_CALLABLE,
                &[],
            );
            return self.types.error_type;
        }
        let resolved = self.resolve_call(
            node.data.range,
            signatures,
            node.arguments,
            node.type_arguments,
            mode,
        );
        self.resolved_signatures.insert(node.data.id, resolved);
        let mut result = self.signature(resolved).return_type;
        if node.question_dot && !self.types.is_error(result) {
            // The outermost link of an optional chain unions `undefined`
            // into the result exactly once.
            let undefined = self.types.undefined_type;
            result = self.get_union_type(vec![result, undefined]);
        }
        result
    }

    pub(crate) fn resolve_new_expression(
        &mut self,
        node: &'a NewExpression<'a>,
        mode: CheckMode,
    ) -> TypeId {
        let callee = self.check_expression(node.expression, CheckMode::NORMAL);
        if self.types.is_error(callee) {
            if let Some(args) = node.arguments {
                self.check_arguments_for_side_effects(args);
            }
            return self.types.error_type;
        }
        if self.types.flags(callee).contains(TypeFlags::ANY) {
            if let Some(args) = node.arguments {
                self.check_arguments_for_side_effects(args);
            }
            return self.types.any_type;
        }
        let apparent = self.get_apparent_type(callee);
        let members = self.resolve_structured_members(apparent);
        let signatures = members.construct_signatures.clone();
        if signatures.is_empty() {
            if let Some(args) = node.arguments {
                self.check_arguments_for_side_effects(args);
            }
            self.error(
                node.expression.data().range,
                &messages::THIS_EXPRESSION_IS_NOT_CONSTRUCTABLE,
                &[],
            );
            return self.types.error_type;
        }
        let arguments: &[Expression<'a>] = node.arguments.unwrap_or(&[]);
        let resolved = self.resolve_call(
            node.data.range,
            signatures,
            arguments,
            node.type_arguments,
            mode,
        );
        self.resolved_signatures.insert(node.data.id, resolved);
        self.signature(resolved).return_type
    }

    fn check_arguments_for_side_effects(&mut self, args: &'a [Expression<'a>]) {
        for arg in args.iter() {
            self.check_expression(arg, CheckMode::NORMAL);
        }
    }

    // ========================================================================
    // The resolution engine
    // ========================================================================

    fn resolve_call(
        &mut self,
        range: TextRange,
        signatures: Vec<SignatureId>,
        args: &'a [Expression<'a>],
        type_args: Option<&'a [TypeNode<'a>]>,
        mode: CheckMode,
    ) -> SignatureId {
        let candidates = self.reorder_candidates(signatures);

        // Explicit type arguments resolve once.
        let explicit_type_args: Option<Vec<TypeId>> = type_args.map(|nodes| {
            nodes
                .iter()
                .map(|n| self.get_type_from_type_node(n))
                .collect()
        });

        // Pre-check every argument once. The first phase is exclusive:
        // context-sensitive arguments stay open so their parameter types
        // can come from the selected overload.
        let phase = ArgumentCheckMode::Exclusive;
        let has_spread = args.iter().any(|a| matches!(a, Expression::Spread(_)));
        let context_sensitive: Vec<bool> = args
            .iter()
            .map(|a| self.is_context_sensitive_expression(a))
            .collect();
        let arg_types: Vec<TypeId> = args
            .iter()
            .zip(context_sensitive.iter())
            .map(|(arg, &sensitive)| {
                if sensitive && phase == ArgumentCheckMode::Exclusive {
                    self.check_expression(arg, CheckMode::SKIP_CONTEXT_SENSITIVE)
                } else {
                    self.check_expression(arg, CheckMode::NORMAL)
                }
            })
            .collect();
        let arg_count = args.len() as u32;

        // Cheap rejection: filter by value-argument arity first.
        let mut arity_candidates: Vec<SignatureId> = Vec::new();
        let mut type_arg_arity_failure: Option<SignatureId> = None;
        for &candidate in &candidates {
            let signature = self.signature(candidate);
            if !has_spread
                && (arg_count < signature.min_argument_count
                    || arg_count > signature.max_argument_count())
            {
                continue;
            }
            if let Some(explicit) = &explicit_type_args {
                if explicit.len() != self.signature(candidate).type_params.len() {
                    type_arg_arity_failure = Some(candidate);
                    continue;
                }
            }
            arity_candidates.push(candidate);
        }

        // Two-pass matching: a subtype pass, then an assignable pass.
        for relation in [RelationKind::Subtype, RelationKind::Assignable] {
            for &candidate in &arity_candidates {
                if let Some(applied) = self.try_apply_signature(
                    candidate,
                    args,
                    &arg_types,
                    explicit_type_args.as_deref(),
                    relation,
                    mode,
                ) {
                    // Guaranteed second pass: context-sensitive arguments
                    // re-enter with the chosen parameter types as context,
                    // and inference reruns over their resolved types.
                    return self.finish_resolved_call(
                        candidate,
                        applied,
                        args,
                        &arg_types,
                        &context_sensitive,
                        explicit_type_args.as_deref(),
                        mode,
                    );
                }
            }
        }

        // Failure evidence, in priority order: argument-type errors on an
        // arity-correct candidate beat type-argument arity errors beat
        // bare arity mismatches.
        if let Some(&best) = arity_candidates.first() {
            let applied = self
                .instantiate_candidate(best, args, &arg_types, explicit_type_args.as_deref(), mode)
                .unwrap_or(best);
            if arity_candidates.len() > 1 {
                self.error(range, &messages::NO_OVERLOAD_MATCHES_THIS_CALL, &[]);
            }
            self.apply_contextual_arguments(
                applied,
                args,
                &context_sensitive,
                ArgumentCheckMode::Inclusive,
                mode,
            );
            self.report_argument_errors(applied, args, &arg_types, false);
            return applied;
        }
        if let Some(candidate) = type_arg_arity_failure {
            let expected = self.signature(candidate).type_params.len().to_string();
            let got = explicit_type_args.map(|a| a.len()).unwrap_or(0).to_string();
            self.error(
                range,
                &messages::EXPECTED_0_TYPE_ARGUMENTS_BUT_GOT_1,
                &[&expected, &got],
            );
            return candidate;
        }

        self.report_arity_error(range, &candidates, arg_count);

        // Even on total failure a signature comes back: the closest
        // candidate by arity, or a synthesized union of the overloads.
        let closest = self.closest_arity_candidate(&candidates, arg_count);
        if candidates.len() > 1
            && candidates
                .iter()
                .all(|&c| self.signature(c).type_params.is_empty())
        {
            return self.combine_signatures_of_candidates(&candidates);
        }
        closest
    }

    /// The inclusive second phase of the two-phase argument protocol:
    /// context-sensitive arguments are checked with the selected
    /// signature's parameter types as context, and for generic candidates
    /// the inference is redone with the now-fully-typed arguments.
    fn finish_resolved_call(
        &mut self,
        candidate: SignatureId,
        applied: SignatureId,
        args: &'a [Expression<'a>],
        arg_types: &[TypeId],
        context_sensitive: &[bool],
        explicit_type_args: Option<&[TypeId]>,
        mode: CheckMode,
    ) -> SignatureId {
        if !context_sensitive.iter().any(|&sensitive| sensitive) {
            self.report_argument_errors(applied, args, arg_types, true);
            return applied;
        }
        let applied_signature = self.signature(applied).clone();
        let mut resolved_args: Vec<TypeId> = arg_types.to_vec();
        for (i, (arg, &sensitive)) in args.iter().zip(context_sensitive.iter()).enumerate() {
            if !sensitive {
                continue;
            }
            resolved_args[i] = match self.parameter_type_at(&applied_signature, i) {
                Some(param_type) => {
                    self.check_expression_with_contextual_type(arg, param_type, mode)
                }
                None => self.check_expression(arg, CheckMode::NORMAL),
            };
        }
        let is_generic = !self.signature(candidate).type_params.is_empty();
        let final_applied = if is_generic && explicit_type_args.is_none() {
            self.instantiate_candidate(candidate, args, &resolved_args, None, mode)
                .unwrap_or(applied)
        } else {
            applied
        };
        self.report_argument_errors(final_applied, args, &resolved_args, true);
        final_applied
    }

    /// Specialized (literal-typed-parameter) overloads are hoisted before
    /// their group's insertion point; relative order is otherwise stable,
    /// so declaration groups never interleave.
    fn reorder_candidates(&mut self, signatures: Vec<SignatureId>) -> Vec<SignatureId> {
        let mut specialized: Vec<SignatureId> = Vec::new();
        let mut general: Vec<SignatureId> = Vec::new();
        for signature in signatures {
            if self
                .signature(signature)
                .flags
                .contains(SignatureFlags::HAS_LITERAL_TYPES)
            {
                specialized.push(signature);
            } else {
                general.push(signature);
            }
        }
        specialized.extend(general);
        specialized
    }

    /// One applicability attempt: instantiate generics (explicitly or by
    /// inference), then relate every argument to its parameter.
    fn try_apply_signature(
        &mut self,
        candidate: SignatureId,
        args: &'a [Expression<'a>],
        arg_types: &[TypeId],
        explicit_type_args: Option<&[TypeId]>,
        relation: RelationKind,
        mode: CheckMode,
    ) -> Option<SignatureId> {
        let applied = self.instantiate_candidate(candidate, args, arg_types, explicit_type_args, mode)?;
        let signature = self.signature(applied).clone();
        for (i, (&arg_type, arg)) in arg_types.iter().zip(args.iter()).enumerate() {
            if matches!(arg, Expression::Spread(_)) {
                continue;
            }
            let Some(param_type) = self.parameter_type_at(&signature, i) else {
                continue;
            };
            let widened = self.get_widened_literal_like_type_for_relation(arg_type, param_type);
            if !self.is_type_related_to(widened, param_type, relation) {
                return None;
            }
        }
        Some(applied)
    }

    /// Generic candidates get a fresh inference context; explicit type
    /// arguments are checked against constraints instead.
    fn instantiate_candidate(
        &mut self,
        candidate: SignatureId,
        args: &'a [Expression<'a>],
        arg_types: &[TypeId],
        explicit_type_args: Option<&[TypeId]>,
        mode: CheckMode,
    ) -> Option<SignatureId> {
        let signature = self.signature(candidate).clone();
        if signature.type_params.is_empty() {
            return Some(candidate);
        }
        if let Some(explicit) = explicit_type_args {
            if explicit.len() != signature.type_params.len() {
                return None;
            }
            for (&param, &arg) in signature.type_params.iter().zip(explicit.iter()) {
                if let Some(Some(constraint)) = self.param_constraints.get(&param).copied() {
                    if !self.is_type_assignable_to(arg, constraint) {
                        let arg_name = self.type_to_string(arg);
                        let constraint_name = self.type_to_string(constraint);
                        self.diagnostics.add(Diagnostic::new(
                            &messages::TYPE_0_DOES_NOT_SATISFY_THE_CONSTRAINT_1,
                            &[&arg_name, &constraint_name],
                        ));
                    }
                }
            }
            let mapper = TypeMapper::new(signature.type_params.clone(), explicit.to_vec());
            return Some(self.instantiate_signature(candidate, &mapper));
        }

        let mut context = InferenceContext::new(signature.type_params.clone());
        // The contextual return expectation contributes at a weaker
        // priority than argument inferences.
        if let Some(contextual) = self.get_contextual_type(mode) {
            self.infer_types_with_priority(
                &mut context,
                contextual,
                signature.return_type,
                InferencePriority::ReturnType,
            );
        }
        for (i, (&arg_type, arg)) in arg_types.iter().zip(args.iter()).enumerate() {
            if matches!(arg, Expression::Spread(_)) {
                continue;
            }
            if let Some(param_type) = self.parameter_type_at(&signature, i) {
                self.infer_types(&mut context, arg_type, param_type);
            }
        }
        let inferred = self.get_inferred_types(&mut context);
        let mapper = TypeMapper::new(signature.type_params.clone(), inferred);
        Some(self.instantiate_signature(candidate, &mapper))
    }

    fn parameter_type_at(&self, signature: &Signature, index: usize) -> Option<TypeId> {
        if index < signature.params.len() {
            let param = &signature.params[index];
            if param.rest {
                return Some(self.rest_element_type(param));
            }
            return Some(param.ty);
        }
        let last = signature.params.last()?;
        if last.rest {
            Some(self.rest_element_type(last))
        } else {
            None
        }
    }

    fn rest_element_type(&self, param: &SignatureParameter) -> TypeId {
        // A rest parameter is declared as an array; arguments relate to
        // its element type.
        if let crate::types::TypeKind::Object(crate::types::ObjectKind::Reference {
            type_args,
            ..
        }) = &self.types.get(param.ty).kind
        {
            if let Some(&element) = type_args.first() {
                return element;
            }
        }
        param.ty
    }

    /// Re-check context-sensitive arguments with their parameter types as
    /// context so lambdas get parameter types and their bodies check.
    fn apply_contextual_arguments(
        &mut self,
        applied: SignatureId,
        args: &'a [Expression<'a>],
        context_sensitive: &[bool],
        check_mode: ArgumentCheckMode,
        mode: CheckMode,
    ) {
        if check_mode != ArgumentCheckMode::Inclusive {
            return;
        }
        let signature = self.signature(applied).clone();
        for (i, (arg, &sensitive)) in args.iter().zip(context_sensitive.iter()).enumerate() {
            if !sensitive {
                continue;
            }
            if let Some(param_type) = self.parameter_type_at(&signature, i) {
                self.check_expression_with_contextual_type(arg, param_type, mode);
            } else {
                self.check_expression(arg, CheckMode::NORMAL);
            }
        }
    }

    /// Report per-argument mismatches against the (possibly instantiated)
    /// candidate. With `only_if_failing` set, arguments that relate are
    /// silent; this is the success path, where context-sensitive
    /// re-checks may still surface errors.
    fn report_argument_errors(
        &mut self,
        applied: SignatureId,
        args: &'a [Expression<'a>],
        arg_types: &[TypeId],
        only_if_failing: bool,
    ) {
        let signature = self.signature(applied).clone();
        for (i, (&arg_type, arg)) in arg_types.iter().zip(args.iter()).enumerate() {
            if matches!(arg, Expression::Spread(_)) {
                continue;
            }
            let Some(param_type) = self.parameter_type_at(&signature, i) else {
                continue;
            };
            let widened = self.get_widened_literal_like_type_for_relation(arg_type, param_type);
            if self.is_type_assignable_to(widened, param_type) {
                continue;
            }
            if only_if_failing {
                continue;
            }
            self.check_argument_assignable(arg_type, param_type, arg.data().range, Some(arg));
        }
    }

    /// Arity diagnostics: an exact expectation when every candidate
    /// agrees, an at-least form for rest parameters, and a three-way
    /// undershoot/overshoot message when the call falls strictly between
    /// two overloads' arities.
    fn report_arity_error(
        &mut self,
        range: TextRange,
        candidates: &[SignatureId],
        arg_count: u32,
    ) {
        let mut arities: Vec<(u32, u32, SignatureId)> = candidates
            .iter()
            .map(|&c| {
                let signature = self.signature(c);
                (signature.min_argument_count, signature.max_argument_count(), c)
            })
            .collect();
        arities.sort_by_key(|&(min, _, _)| min);

        if arities.len() == 1 {
            let (min, max, candidate) = arities[0];
            if max == u32::MAX {
                self.error(
                    range,
                    &messages::EXPECTED_AT_LEAST_0_ARGUMENTS_BUT_GOT_1,
                    &[&min.to_string(), &arg_count.to_string()],
                );
            } else {
                let expected = if min == max {
                    min.to_string()
                } else {
                    format!("{}-{}", min, max)
                };
                let mut diagnostic = Diagnostic::with_location(
                    self.current_file_name.clone(),
                    range.to_span(),
                    &messages::EXPECTED_0_ARGUMENTS_BUT_GOT_1,
                    &[&expected, &arg_count.to_string()],
                );
                // Point at the first unfilled parameter.
                let signature = self.signature(candidate).clone();
                if let Some(param) = signature.params.get(arg_count as usize) {
                    if !param.optional && !param.rest {
                        diagnostic.add_related(Diagnostic::new(
                            &messages::AN_ARGUMENT_FOR_0_WAS_NOT_PROVIDED,
                            &[&param.name_text],
                        ));
                    }
                }
                self.diagnostics.add(diagnostic);
            }
            return;
        }

        // Closest undershoot and overshoot across the overloads.
        let below = arities
            .iter()
            .filter(|&&(_, max, _)| max < arg_count)
            .map(|&(_, max, _)| max)
            .max();
        let above = arities
            .iter()
            .filter(|&&(min, _, _)| min > arg_count)
            .map(|&(min, _, _)| min)
            .min();
        match (below, above) {
            (Some(below), Some(above)) => {
                self.error(
                    range,
                    &messages::NO_OVERLOAD_EXPECTS_0_ARGUMENTS,
                    &[
                        &arg_count.to_string(),
                        &below.to_string(),
                        &above.to_string(),
                    ],
                );
            }
            _ => {
                let (min, max, _) = arities[0];
                let expected = if max == u32::MAX {
                    format!("at least {}", min)
                } else {
                    min.to_string()
                };
                self.error(
                    range,
                    &messages::EXPECTED_0_ARGUMENTS_BUT_GOT_1,
                    &[&expected, &arg_count.to_string()],
                );
            }
        }
    }

    fn closest_arity_candidate(&self, candidates: &[SignatureId], arg_count: u32) -> SignatureId {
        let mut best = candidates[0];
        let mut best_distance = u32::MAX;
        for &candidate in candidates {
            let signature = self.signature(candidate);
            let distance = if arg_count < signature.min_argument_count {
                signature.min_argument_count - arg_count
            } else if arg_count > signature.max_argument_count() {
                arg_count - signature.max_argument_count()
            } else {
                0
            };
            if distance < best_distance {
                best_distance = distance;
                best = candidate;
            }
        }
        best
    }

    /// Union the candidates into one coherent (if imprecise) signature:
    /// per-position parameter types union pairwise, return types union.
    fn combine_signatures_of_candidates(&mut self, candidates: &[SignatureId]) -> SignatureId {
        let signatures: Vec<Signature> = candidates
            .iter()
            .map(|&c| self.signature(c).clone())
            .collect();
        let max_params = signatures.iter().map(|s| s.params.len()).max().unwrap_or(0);
        let mut params: Vec<SignatureParameter> = Vec::with_capacity(max_params);
        for i in 0..max_params {
            let mut types: Vec<TypeId> = Vec::new();
            let mut optional = false;
            let mut name = None;
            for signature in &signatures {
                match signature.params.get(i) {
                    Some(param) => {
                        types.push(param.ty);
                        optional |= param.optional;
                        if name.is_none() {
                            name = Some((param.name, param.name_text.clone()));
                        }
                    }
                    None => optional = true,
                }
            }
            let unioned = self.get_union_type(types);
            let (name, name_text) =
                name.unwrap_or((self.interner.intern_static("arg"), "arg".to_string()));
            params.push(SignatureParameter {
                name,
                name_text,
                ty: unioned,
                optional,
                rest: false,
            });
        }
        let min_argument_count = signatures
            .iter()
            .map(|s| s.min_argument_count)
            .min()
            .unwrap_or(0);
        let return_types: Vec<TypeId> = signatures.iter().map(|s| s.return_type).collect();
        let return_type = self.get_union_type(return_types);
        let flags = if signatures
            .iter()
            .all(|s| s.flags.contains(SignatureFlags::CONSTRUCT))
        {
            SignatureFlags::CONSTRUCT
        } else {
            SignatureFlags::NONE
        };
        self.alloc_signature(Signature {
            flags,
            type_params: Vec::new(),
            params,
            min_argument_count,
            return_type,
            declaration: None,
            target: None,
            mapper: None,
        })
    }
}
