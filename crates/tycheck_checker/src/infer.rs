//! Generic type argument inference.
//!
//! An `InferenceContext` is the working state of one resolution attempt:
//! one `InferenceInfo` per type parameter, accumulating covariant and
//! contravariant candidates at prioritized strengths. Contexts are cheap
//! to create and are discarded after the call is resolved.

use tycheck_ast::types::{TypeFlags, TypeId};

use crate::checker::Checker;
use crate::types::{ObjectKind, TypeKind};

/// Lower numeric priority wins; return-type expectations contribute at a
/// weaker priority than argument inferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum InferencePriority {
    Normal,
    ReturnType,
}

#[derive(Debug, Clone)]
pub struct InferenceInfo {
    pub type_param: TypeId,
    pub candidates: Vec<TypeId>,
    pub contra_candidates: Vec<TypeId>,
    pub priority: InferencePriority,
    pub inferred: Option<TypeId>,
}

#[derive(Debug, Clone)]
pub struct InferenceContext {
    pub infos: Vec<InferenceInfo>,
    pub priority: InferencePriority,
}

impl InferenceContext {
    pub fn new(type_params: Vec<TypeId>) -> Self {
        Self {
            infos: type_params
                .into_iter()
                .map(|type_param| InferenceInfo {
                    type_param,
                    candidates: Vec::new(),
                    contra_candidates: Vec::new(),
                    priority: InferencePriority::ReturnType,
                    inferred: None,
                })
                .collect(),
            priority: InferencePriority::Normal,
        }
    }

    fn info_mut(&mut self, type_param: TypeId) -> Option<&mut InferenceInfo> {
        self.infos.iter_mut().find(|i| i.type_param == type_param)
    }
}

impl<'a> Checker<'a> {
    /// Collect inference candidates for the context's type parameters by
    /// structurally matching `source` against `target`.
    pub(crate) fn infer_types(
        &mut self,
        context: &mut InferenceContext,
        source: TypeId,
        target: TypeId,
    ) {
        self.infer_types_depth(context, source, target, 0, false)
    }

    pub(crate) fn infer_types_with_priority(
        &mut self,
        context: &mut InferenceContext,
        source: TypeId,
        target: TypeId,
        priority: InferencePriority,
    ) {
        let saved = context.priority;
        context.priority = priority;
        self.infer_types_depth(context, source, target, 0, false);
        context.priority = saved;
    }

    fn infer_types_depth(
        &mut self,
        context: &mut InferenceContext,
        source: TypeId,
        target: TypeId,
        depth: u32,
        contravariant: bool,
    ) {
        if depth > 16 || source == target {
            return;
        }
        // A bare inference target accumulates the source as a candidate.
        if context.infos.iter().any(|i| i.type_param == target) {
            let source = if self.types.flags(source).intersects(TypeFlags::LITERAL) {
                // Literal arguments infer their widened form unless the
                // parameter expects literals.
                self.get_widened_literal_type(source)
            } else {
                self.get_regular_type(source)
            };
            if self.types.is_error(source) {
                return;
            }
            let priority = context.priority;
            if let Some(info) = context.info_mut(target) {
                if priority < info.priority {
                    // Stronger inferences supersede weaker ones.
                    info.candidates.clear();
                    info.contra_candidates.clear();
                    info.priority = priority;
                } else if priority > info.priority {
                    return;
                }
                if contravariant {
                    if !info.contra_candidates.contains(&source) {
                        info.contra_candidates.push(source);
                    }
                } else if !info.candidates.contains(&source) {
                    info.candidates.push(source);
                }
            }
            return;
        }

        let target_kind = self.types.get(target).kind.clone();
        match target_kind {
            TypeKind::Union { types } => {
                // Prefer the constituent the source is already related to;
                // otherwise spread inference across all of them.
                for &member in &types {
                    if self.is_type_assignable_to(source, member) {
                        return;
                    }
                }
                for &member in &types {
                    self.infer_types_depth(context, source, member, depth + 1, contravariant);
                }
            }
            TypeKind::Intersection { types } => {
                for &member in &types {
                    self.infer_types_depth(context, source, member, depth + 1, contravariant);
                }
            }
            TypeKind::Object(ObjectKind::Reference {
                target: target_target,
                type_args: target_args,
            }) => {
                let source_kind = self.types.get(source).kind.clone();
                if let TypeKind::Object(ObjectKind::Reference {
                    target: source_target,
                    type_args: source_args,
                }) = source_kind
                {
                    if source_target == target_target && source_args.len() == target_args.len() {
                        for (&s, &t) in source_args.iter().zip(target_args.iter()) {
                            self.infer_types_depth(context, s, t, depth + 1, contravariant);
                        }
                        return;
                    }
                    // Tuple source against array target infers from the
                    // element union.
                    if self.is_tuple_type(source) && self.is_array_type(target) {
                        let (elements, _, _) = self.tuple_element_info(source).unwrap();
                        let element = self.get_union_type(elements);
                        self.infer_types_depth(
                            context,
                            element,
                            target_args[0],
                            depth + 1,
                            contravariant,
                        );
                        return;
                    }
                }
            }
            TypeKind::Object(ObjectKind::Anonymous(target_members)) => {
                if !self.types.flags(source).contains(TypeFlags::OBJECT) {
                    return;
                }
                let source_members = self.resolve_structured_members(source);
                // Signatures: parameters are contravariant, returns
                // covariant.
                for (&source_sig, &target_sig) in source_members
                    .call_signatures
                    .iter()
                    .zip(target_members.call_signatures.iter())
                {
                    let source_sig = self.signature(source_sig).clone();
                    let target_sig = self.signature(target_sig).clone();
                    for (source_param, target_param) in
                        source_sig.params.iter().zip(target_sig.params.iter())
                    {
                        self.infer_types_depth(
                            context,
                            source_param.ty,
                            target_param.ty,
                            depth + 1,
                            !contravariant,
                        );
                    }
                    self.infer_types_depth(
                        context,
                        source_sig.return_type,
                        target_sig.return_type,
                        depth + 1,
                        contravariant,
                    );
                }
                // Matching properties.
                let target_props: Vec<_> = target_members
                    .properties
                    .iter()
                    .map(|(n, s)| (*n, *s))
                    .collect();
                for (name, target_prop) in target_props {
                    if let Some(source_prop) = source_members.properties.get(&name).copied() {
                        let source_type = self.get_type_of_symbol(source_prop);
                        let target_type = self.get_type_of_symbol(target_prop);
                        self.infer_types_depth(
                            context,
                            source_type,
                            target_type,
                            depth + 1,
                            contravariant,
                        );
                    }
                }
                for target_info in &target_members.index_infos {
                    let source_infos = source_members.index_infos.clone();
                    for source_info in source_infos {
                        self.infer_types_depth(
                            context,
                            source_info.value_type,
                            target_info.value_type,
                            depth + 1,
                            contravariant,
                        );
                    }
                }
            }
            TypeKind::IndexedAccess {
                object_type,
                index_type,
            } => {
                let _ = (object_type, index_type);
            }
            TypeKind::TemplateLiteral { texts, types } => {
                // A single-placeholder pattern binds the matched middle.
                if types.len() == 1 {
                    if let TypeKind::StringLiteral { value } = self.types.get(source).kind.clone() {
                        let first = &texts[0];
                        let last = &texts[1];
                        if value.starts_with(first.as_str()) && value.ends_with(last.as_str()) {
                            let middle = &value[first.len()..value.len() - last.len()];
                            let literal = self.get_string_literal_type(middle);
                            self.infer_types_depth(
                                context,
                                literal,
                                types[0],
                                depth + 1,
                                contravariant,
                            );
                        }
                    }
                }
            }
            _ => {}
        }
    }

    /// Final inferences: the union of covariant candidates, the first
    /// contravariant candidate as a fallback, then the parameter's
    /// constraint or default, then `unknown`.
    pub(crate) fn get_inferred_types(&mut self, context: &mut InferenceContext) -> Vec<TypeId> {
        let infos = context.infos.clone();
        let mut results = Vec::with_capacity(infos.len());
        for info in infos {
            let inferred = if !info.candidates.is_empty() {
                self.get_union_type(info.candidates.clone())
            } else if let Some(&first) = info.contra_candidates.first() {
                first
            } else if let Some(Some(constraint)) =
                self.param_constraints.get(&info.type_param).copied()
            {
                constraint
            } else if let Some(&default) = self.param_defaults.get(&info.type_param) {
                default
            } else {
                self.types.unknown_type
            };
            // Constraint violations fall back to the constraint itself.
            let inferred = match self.param_constraints.get(&info.type_param).copied() {
                Some(Some(constraint)) if !self.is_type_assignable_to(inferred, constraint) => {
                    constraint
                }
                _ => inferred,
            };
            results.push(inferred);
        }
        for (info, &result) in context.infos.iter_mut().zip(results.iter()) {
            info.inferred = Some(result);
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tycheck_ast::types::ObjectFlags;

    fn test_checker() -> Checker<'static> {
        let interner = tycheck_core::intern::StringInterner::new();
        let binder = tycheck_binder::Binder::new(&interner);
        Checker::new(binder, Default::default())
    }

    fn fresh_param(checker: &mut Checker<'_>, name: &str) -> TypeId {
        let param = checker.types.new_type(
            TypeFlags::TYPE_PARAMETER,
            ObjectFlags::NONE,
            TypeKind::TypeParameter {
                name: name.to_string(),
                is_this: false,
            },
        );
        checker.param_constraints.insert(param, None);
        param
    }

    #[test]
    fn infers_from_direct_match() {
        let mut checker = test_checker();
        let t = fresh_param(&mut checker, "T");
        let mut context = InferenceContext::new(vec![t]);
        let string = checker.types.string_type;
        checker.infer_types(&mut context, string, t);
        let inferred = checker.get_inferred_types(&mut context);
        assert_eq!(inferred, vec![string]);
    }

    #[test]
    fn literal_candidates_widen() {
        let mut checker = test_checker();
        let t = fresh_param(&mut checker, "T");
        let mut context = InferenceContext::new(vec![t]);
        let literal = checker.get_number_literal_type(42.0);
        checker.infer_types(&mut context, literal, t);
        let inferred = checker.get_inferred_types(&mut context);
        assert_eq!(inferred, vec![checker.types.number_type]);
    }

    #[test]
    fn no_candidates_falls_back_to_unknown() {
        let mut checker = test_checker();
        let t = fresh_param(&mut checker, "T");
        let mut context = InferenceContext::new(vec![t]);
        let inferred = checker.get_inferred_types(&mut context);
        assert_eq!(inferred, vec![checker.types.unknown_type]);
    }

    #[test]
    fn array_element_inference() {
        let mut checker = test_checker();
        let t = fresh_param(&mut checker, "T");
        let string = checker.types.string_type;
        let source = checker.create_array_type(string);
        let target = checker.create_array_type(t);
        let mut context = InferenceContext::new(vec![t]);
        checker.infer_types(&mut context, source, target);
        let inferred = checker.get_inferred_types(&mut context);
        assert_eq!(inferred, vec![string]);
    }
}
