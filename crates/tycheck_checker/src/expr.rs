//! The expression checker.
//!
//! `check_expression` dispatches on the expression kind and returns its
//! type, emitting diagnostics as a side effect. Contextual types and
//! narrowing frames are strictly stack-disciplined: every sub-check pops
//! exactly what it pushed.

use tycheck_ast::node::*;
use tycheck_ast::syntax_kind::SyntaxKind;
use tycheck_ast::types::{
    CheckFlags, ModifierFlags, ObjectFlags, SignatureFlags, SymbolFlags, SymbolId, TypeFlags,
    TypeId,
};
use tycheck_core::intern::InternedString;
use tycheck_core::text::TextRange;
use tycheck_diagnostics::messages;

use crate::checker::{CheckMode, Checker};
use crate::types::{
    AnonymousMembers, ObjectKind, Signature, SignatureParameter, TypeKind,
};
use tycheck_ast::types::SignatureId;

impl<'a> Checker<'a> {
    pub fn check_expression(&mut self, expr: &Expression<'a>, mode: CheckMode) -> TypeId {
        self.check_expression_worker(expr, mode)
    }

    pub(crate) fn check_expression_with_contextual_type(
        &mut self,
        expr: &Expression<'a>,
        contextual: TypeId,
        mode: CheckMode,
    ) -> TypeId {
        self.contextual_types.push(contextual);
        let result = self.check_expression(expr, mode | CheckMode::CONTEXTUAL);
        self.contextual_types.pop();
        result
    }

    pub(crate) fn get_contextual_type(&self, mode: CheckMode) -> Option<TypeId> {
        if mode.contains(CheckMode::CONTEXTUAL) {
            self.contextual_types.last().copied()
        } else {
            None
        }
    }

    fn check_expression_worker(&mut self, expr: &Expression<'a>, mode: CheckMode) -> TypeId {
        match *expr {
            Expression::Identifier(node) => self.check_identifier(node),
            Expression::NumericLiteral(node) => {
                let regular = self.get_number_literal_type(node.value);
                self.get_fresh_literal_type(regular)
            }
            Expression::StringLiteral(node) | Expression::NoSubstitutionTemplate(node) => {
                let regular = self.get_string_literal_type(&node.value);
                self.get_fresh_literal_type(regular)
            }
            Expression::BigIntLiteral(node) => {
                let regular = self.get_bigint_literal_type(&node.text);
                self.get_fresh_literal_type(regular)
            }
            Expression::True(_) => self.types.true_type,
            Expression::False(_) => self.types.false_type,
            Expression::Null(_) => self.types.null_type,
            Expression::This(node) => self.check_this_expression(node),
            Expression::Super(_) => {
                // Conservative placeholder; full `super` semantics are an
                // extension point.
                self.types.any_type
            }
            Expression::Template(node) => {
                for span in node.spans.iter() {
                    self.check_expression(span.expression, CheckMode::NORMAL);
                }
                self.types.string_type
            }
            Expression::Array(node) => self.check_array_literal(node, mode),
            Expression::Object(node) => self.check_object_literal(node, mode),
            Expression::PropertyAccess(node) => self.check_property_access(node, mode),
            Expression::ElementAccess(node) => self.check_element_access(node, mode),
            Expression::Call(node) => self.resolve_call_expression(node, mode),
            Expression::New(node) => self.resolve_new_expression(node, mode),
            Expression::Paren(node) => self.check_expression(node.expression, mode),
            Expression::Arrow(node) => self.check_arrow_function(node, mode),
            Expression::FunctionExpr(node) => self.check_function_expression(node, mode),
            Expression::PrefixUnary(node) => self.check_prefix_unary(node),
            Expression::PostfixUnary(node) => self.check_postfix_unary(node),
            Expression::Binary(node) => self.check_binary_expression(node, mode),
            Expression::Conditional(node) => self.check_conditional_expression(node, mode),
            Expression::TypeOf(node) => {
                self.check_expression(node.expression, CheckMode::NORMAL);
                self.types.string_type
            }
            Expression::Void(node) => {
                self.check_expression(node.expression, CheckMode::NORMAL);
                self.types.undefined_type
            }
            Expression::Delete(node) => {
                self.check_expression(node.expression, CheckMode::NORMAL);
                self.types.boolean_type
            }
            Expression::Await(node) => {
                let operand = self.check_expression(node.expression, CheckMode::NORMAL);
                self.get_awaited_type(operand)
            }
            Expression::Spread(node) => self.check_expression(node.expression, mode),
            Expression::As(node) => {
                self.check_expression(node.expression, CheckMode::NORMAL);
                self.get_type_from_type_node(node.type_node)
            }
            Expression::Satisfies(node) => {
                let target = self.get_type_from_type_node(node.type_node);
                let source =
                    self.check_expression_with_contextual_type(node.expression, target, mode);
                let widened = self.get_widened_literal_like_type_for_relation(source, target);
                self.check_type_assignable_to_and_report(
                    widened,
                    target,
                    node.expression.data().range,
                    Some(node.expression),
                );
                source
            }
            Expression::NonNull(node) => {
                let operand = self.check_expression(node.expression, mode);
                self.get_non_nullable_type(operand)
            }
        }
    }

    // ========================================================================
    // Identifiers
    // ========================================================================

    fn check_identifier(&mut self, node: &'a Identifier) -> TypeId {
        if node.text_name.is_empty() {
            return self.types.error_type;
        }
        let Some(symbol) = self.resolve_name(node.text) else {
            if let Some(t) = self.builtin_value_global(&node.text_name, node.data.range) {
                return t;
            }
            if let Some(suggestion) = self.suggest_name(&node.text_name) {
                self.error(
                    node.data.range,
                    &messages::CANNOT_FIND_NAME_0_DID_YOU_MEAN_1,
                    &[&node.text_name, &suggestion],
                );
            } else {
                self.error(node.data.range, &messages::CANNOT_FIND_NAME_0, &[&node.text_name]);
            }
            return self.types.error_type;
        };

        let flags = self.symbol_flags(symbol);
        if flags.contains(SymbolFlags::ALIAS) {
            if flags.contains(SymbolFlags::TYPE_ONLY) {
                self.error(
                    node.data.range,
                    &messages::_0_CANNOT_BE_USED_AS_A_VALUE_BECAUSE_IT_WAS_IMPORTED_USING_IMPORT_TYPE,
                    &[&node.text_name],
                );
                return self.types.error_type;
            }
            let Some(target) = self.resolve_alias(symbol) else {
                return self.types.error_type;
            };
            return self.check_symbol_as_value(target, node);
        }
        self.check_symbol_as_value(symbol, node)
    }

    fn check_symbol_as_value(&mut self, symbol: SymbolId, node: &'a Identifier) -> TypeId {
        let flags = self.symbol_flags(symbol);
        if flags.intersects(SymbolFlags::TYPE) && !flags.intersects(SymbolFlags::VALUE) {
            self.error(
                node.data.range,
                &messages::_0_ONLY_REFERS_TO_A_TYPE_BUT_IS_BEING_USED_AS_A_VALUE_HERE,
                &[&node.text_name],
            );
            return self.types.error_type;
        }
        // Block-scoped read before the declaration site.
        if flags.contains(SymbolFlags::BLOCK_SCOPED_VARIABLE) {
            let first_decl = self.binder.symbols.get(symbol).declarations.first().copied();
            let decl_pos = first_decl
                .and_then(|d| self.binder.decls.get(&d).copied())
                .and_then(|decl| match decl {
                    tycheck_binder::DeclRef::Variable(v, _) => Some(v.data.range.pos),
                    _ => None,
                });
            if let Some(decl_pos) = decl_pos {
                if node.data.range.pos < decl_pos {
                    self.error(
                        node.data.range,
                        &messages::BLOCK_SCOPED_VARIABLE_0_USED_BEFORE_ITS_DECLARATION,
                        &[&node.text_name],
                    );
                }
            }
        }

        let declared = self.get_type_of_symbol(symbol);
        // `auto` placeholders resolve through assignment analysis.
        if declared == self.types.auto_type {
            if let Some(&flow) = self.flow_types.get(&symbol) {
                return flow;
            }
            if self.options.no_implicit_any() {
                self.error(
                    node.data.range,
                    &messages::VARIABLE_0_IMPLICITLY_HAS_AN_1_TYPE,
                    &[&node.text_name, "any"],
                );
            }
            return self.types.any_type;
        }
        // Control-flow narrowing, innermost frame first.
        for frame in self.narrow_frames.iter().rev() {
            if let Some(&narrowed) = frame.get(&symbol) {
                return narrowed;
            }
        }
        declared
    }

    fn check_this_expression(&mut self, node: &'a Token) -> TypeId {
        match self.class_stack.last().copied() {
            Some(class_symbol) => self.get_declared_type_of_symbol(class_symbol),
            None => {
                if self.options.no_implicit_any() {
                    self.error(
                        node.data.range,
                        &messages::THIS_CANNOT_BE_REFERENCED_IN_CURRENT_LOCATION,
                        &[],
                    );
                }
                self.types.any_type
            }
        }
    }

    // ========================================================================
    // Literals
    // ========================================================================

    fn check_array_literal(&mut self, node: &'a ArrayLiteral<'a>, mode: CheckMode) -> TypeId {
        let contextual = self.get_contextual_type(mode);
        // A tuple contextual type turns the literal into a tuple.
        let tuple_context = contextual.filter(|&c| self.is_tuple_type(c));

        let mut element_types: Vec<TypeId> = Vec::new();
        let mut element_flags: Vec<tycheck_ast::types::ElementFlags> = Vec::new();
        for (i, element) in node.elements.iter().enumerate() {
            match *element {
                Expression::Spread(spread) => {
                    let spread_type = self.check_expression(spread.expression, CheckMode::NORMAL);
                    element_types.push(spread_type);
                    element_flags.push(tycheck_ast::types::ElementFlags::VARIADIC);
                }
                _ => {
                    let contextual_element = tuple_context.and_then(|c| {
                        let (elements, _, _) = self.tuple_element_info(c)?;
                        elements.get(i).copied()
                    });
                    let t = match contextual_element {
                        Some(ce) => self.check_expression_with_contextual_type(element, ce, mode),
                        None => self.check_expression(element, mode),
                    };
                    element_types.push(t);
                    element_flags.push(tycheck_ast::types::ElementFlags::REQUIRED);
                }
            }
        }

        if tuple_context.is_some() {
            let regular: Vec<TypeId> = element_types
                .iter()
                .map(|&t| self.get_regular_type(t))
                .collect();
            return self.create_tuple_type(regular, element_flags, false, Some(node.data.range));
        }

        // Spreads of arrays contribute their element type.
        let mut members: Vec<TypeId> = Vec::new();
        for (&t, &f) in element_types.iter().zip(element_flags.iter()) {
            if f.contains(tycheck_ast::types::ElementFlags::VARIADIC) {
                if self.is_array_type(t) || self.is_tuple_type(t) {
                    let element = self.get_iterated_element_type(t, node.data.range);
                    members.push(element);
                } else {
                    members.push(t);
                }
            } else {
                // Elements sit in mutable positions, so fresh literals
                // widen to their base primitives.
                let widened = self.get_widened_literal_type(t);
                members.push(widened);
            }
        }
        let element = if members.is_empty() {
            match contextual.and_then(|c| self.contextual_array_element(c)) {
                Some(e) => e,
                None => {
                    if self.options.strict_null_checks() {
                        self.types.never_type
                    } else {
                        self.types.any_type
                    }
                }
            }
        } else {
            self.get_union_type(members)
        };
        self.create_array_literal_type(element)
    }

    fn contextual_array_element(&mut self, contextual: TypeId) -> Option<TypeId> {
        if self.is_array_type(contextual) {
            return self.get_type_arguments(contextual).first().copied();
        }
        None
    }

    fn check_object_literal(&mut self, node: &'a ObjectLiteral<'a>, mode: CheckMode) -> TypeId {
        let contextual = self.get_contextual_type(mode);
        let mut members = AnonymousMembers::default();
        let mut result: Option<TypeId> = None;

        for element in node.properties.iter() {
            match *element {
                ObjectLiteralElement::Property(property) => {
                    let name_text = property.name.text();
                    let name = self.interner.intern(&name_text);
                    let contextual_property =
                        contextual.and_then(|c| self.get_type_of_property_of_type(c, name));
                    let t = match contextual_property {
                        Some(cp) => self.check_expression_with_contextual_type(
                            property.initializer,
                            cp,
                            mode,
                        ),
                        None => self.check_expression(property.initializer, mode),
                    };
                    if members.properties.contains_key(&name) {
                        self.error(
                            property.data.range,
                            &messages::_0_IS_SPECIFIED_MORE_THAN_ONCE_SO_THIS_USAGE_WILL_BE_OVERWRITTEN,
                            &[&name_text],
                        );
                    }
                    let symbol = self.create_transient_property(name, &name_text, t, false);
                    members.properties.insert(name, symbol);
                }
                ObjectLiteralElement::Shorthand(shorthand) => {
                    let t = self.check_identifier(shorthand.name);
                    let name = shorthand.name.text;
                    let symbol =
                        self.create_transient_property(name, &shorthand.name.text_name, t, false);
                    members.properties.insert(name, symbol);
                }
                ObjectLiteralElement::Spread(spread) => {
                    let spread_type = self.check_expression(spread.expression, CheckMode::NORMAL);
                    // Fold accumulated members, then merge the spread.
                    let accumulated = self.types.new_type(
                        TypeFlags::OBJECT,
                        ObjectFlags::ANONYMOUS | ObjectFlags::OBJECT_LITERAL,
                        TypeKind::Object(ObjectKind::Anonymous(Box::new(std::mem::take(
                            &mut members,
                        )))),
                    );
                    let base = match result {
                        Some(prior) => self.get_spread_type(prior, accumulated),
                        None => accumulated,
                    };
                    result = Some(self.get_spread_type(base, spread_type));
                }
            }
        }

        let own = self.types.new_type(
            TypeFlags::OBJECT,
            ObjectFlags::ANONYMOUS | ObjectFlags::OBJECT_LITERAL | ObjectFlags::FRESH_LITERAL,
            TypeKind::Object(ObjectKind::Anonymous(Box::new(members))),
        );
        match result {
            Some(prior) => {
                let merged = self.get_spread_type(prior, own);
                let flags = self.types.get(merged).object_flags | ObjectFlags::FRESH_LITERAL;
                self.types.get_mut(merged).object_flags = flags;
                merged
            }
            None => own,
        }
    }

    pub(crate) fn get_type_of_property_of_type(
        &mut self,
        t: TypeId,
        name: InternedString,
    ) -> Option<TypeId> {
        let flags = self.types.flags(t);
        if flags.contains(TypeFlags::UNION) {
            let members = self.types.union_members(t);
            let mut parts = Vec::new();
            for member in members {
                if let Some(part) = self.get_type_of_property_of_type(member, name) {
                    parts.push(part);
                }
            }
            if parts.is_empty() {
                return None;
            }
            return Some(self.get_union_type(parts));
        }
        let apparent = self.get_apparent_type(t);
        if let Some(prop) = self.get_property_of_type(apparent, name) {
            return Some(self.get_type_of_symbol(prop));
        }
        let members = self.resolve_structured_members(apparent);
        let infos = members.index_infos.clone();
        let string = self.types.string_type;
        for info in infos {
            if self.is_type_assignable_to(string, info.key_type) {
                return Some(info.value_type);
            }
        }
        None
    }

    // ========================================================================
    // Property and element access
    // ========================================================================

    fn check_property_access(&mut self, node: &'a PropertyAccess<'a>, mode: CheckMode) -> TypeId {
        let object_type = self.check_expression(node.expression, CheckMode::NORMAL);
        if self.types.is_error(object_type) {
            return self.types.error_type;
        }
        let object_flags = self.types.flags(object_type);

        // Nullability of the receiver.
        let lookup_type = if node.question_dot {
            self.get_non_nullable_type(object_type)
        } else {
            if self.options.strict_null_checks()
                && object_flags.intersects(TypeFlags::NULLABLE)
            {
                let message = if object_flags.contains(TypeFlags::NULL)
                    && object_flags.contains(TypeFlags::UNDEFINED)
                {
                    &messages::OBJECT_IS_POSSIBLY_NULL_OR_UNDEFINED
                } else if object_flags.contains(TypeFlags::NULL) {
                    &messages::OBJECT_IS_POSSIBLY_NULL
                } else {
                    &messages::OBJECT_IS_POSSIBLY_UNDEFINED
                };
                self.error(node.expression.data().range, message, &[]);
                self.get_non_nullable_type(object_type)
            } else {
                object_type
            }
        };

        let result = if node.name.is_private() {
            self.check_private_property_access(lookup_type, node)
        } else {
            self.check_named_property_access(lookup_type, node, mode)
        };

        if node.question_dot && !self.types.is_error(result) {
            let undefined = self.types.undefined_type;
            return self.get_union_type(vec![result, undefined]);
        }
        result
    }

    /// Private names are lexically scoped: the `#name` must be declared by
    /// an enclosing class, not merely present structurally.
    fn check_private_property_access(
        &mut self,
        object_type: TypeId,
        node: &'a PropertyAccess<'a>,
    ) -> TypeId {
        let name = node.name.text;
        for &class_symbol in self.class_stack.iter().rev() {
            let members = self.binder.symbols.get(class_symbol).members.clone();
            if let Some(members) = members {
                if let Some(member) = members.get(&name) {
                    return self.get_type_of_symbol(member);
                }
            }
        }
        let type_name = self.type_to_string(object_type);
        self.error(
            node.name.data.range,
            &messages::PROPERTY_0_DOES_NOT_EXIST_ON_TYPE_1,
            &[&node.name.text_name, &type_name],
        );
        self.types.error_type
    }

    fn check_named_property_access(
        &mut self,
        object_type: TypeId,
        node: &'a PropertyAccess<'a>,
        _mode: CheckMode,
    ) -> TypeId {
        if self.types.flags(object_type).contains(TypeFlags::ANY) {
            return self.types.any_type;
        }
        let apparent = self.get_apparent_type(object_type);
        let name = node.name.text;

        if let Some(prop) = self.get_property_of_type(apparent, name) {
            self.check_property_accessibility(prop, object_type, node);
            if self
                .binder
                .symbols
                .get(prop)
                .check_flags
                .contains(CheckFlags::DEPRECATED)
            {
                let suggestion = tycheck_diagnostics::Diagnostic::with_location(
                    self.current_file_name.clone(),
                    node.name.data.range.to_span(),
                    &messages::_0_IS_DEPRECATED,
                    &[&node.name.text_name],
                );
                self.diagnostics.add(suggestion);
            }
            return self.get_type_of_symbol(prop);
        }

        // Index-signature fallback.
        let members = self.resolve_structured_members(apparent);
        let infos = members.index_infos.clone();
        let string = self.types.string_type;
        for info in infos {
            if self.is_type_assignable_to(string, info.key_type) {
                if self.options.no_property_access_from_index_signature() {
                    self.error(
                        node.name.data.range,
                        &messages::PROPERTY_0_COMES_FROM_AN_INDEX_SIGNATURE,
                        &[&node.name.text_name],
                    );
                }
                return info.value_type;
            }
        }

        // Suggestion machinery: a missing `await`, then spelling.
        if let Some(promised) = self.get_promised_type(object_type) {
            let promised_apparent = self.get_apparent_type(promised);
            if self.get_property_of_type(promised_apparent, name).is_some() {
                let type_name = self.type_to_string(object_type);
                self.error(
                    node.name.data.range,
                    &messages::PROPERTY_0_DOES_NOT_EXIST_ON_TYPE_1_DID_YOU_FORGET_TO_USE_AWAIT,
                    &[&node.name.text_name, &type_name],
                );
                return self.types.error_type;
            }
        }
        let members = self.resolve_structured_members(apparent);
        let candidates: Vec<String> = members
            .properties
            .keys()
            .map(|n| self.interner.resolve(*n).to_string())
            .collect();
        let suggestion = best_spelling_match(&node.name.text_name, &candidates);
        let type_name = self.type_to_string(object_type);
        match suggestion {
            Some(candidate) => self.error(
                node.name.data.range,
                &messages::PROPERTY_0_DOES_NOT_EXIST_ON_TYPE_1_DID_YOU_MEAN_2,
                &[&node.name.text_name, &type_name, &candidate],
            ),
            None => self.error(
                node.name.data.range,
                &messages::PROPERTY_0_DOES_NOT_EXIST_ON_TYPE_1,
                &[&node.name.text_name, &type_name],
            ),
        }
        self.types.error_type
    }

    /// Private members are visible only within their class; protected
    /// members within the declaring class and its subclasses, and then
    /// only through a receiver of the accessing class.
    fn check_property_accessibility(
        &mut self,
        prop: SymbolId,
        receiver_type: TypeId,
        node: &'a PropertyAccess<'a>,
    ) {
        let Some(value_decl) = self.binder.symbols.get(prop).value_declaration else {
            return;
        };
        let Some(decl) = self.binder.decls.get(&value_decl).copied() else {
            return;
        };
        let modifier_flags = match decl {
            tycheck_binder::DeclRef::Property(p) => p.data.modifier_flags,
            tycheck_binder::DeclRef::Method(m) => m.data.modifier_flags,
            _ => return,
        };
        let Some(declaring_class) = self.binder.symbols.get(prop).parent else {
            return;
        };
        if modifier_flags.contains(ModifierFlags::PRIVATE) {
            if !self.class_stack.contains(&declaring_class) {
                let class_name = self.symbol_name(declaring_class);
                self.error(
                    node.name.data.range,
                    &messages::PROPERTY_0_IS_PRIVATE_AND_ONLY_ACCESSIBLE_WITHIN_CLASS_1,
                    &[&node.name.text_name, &class_name],
                );
            }
            return;
        }
        if modifier_flags.contains(ModifierFlags::PROTECTED) {
            let Some(&enclosing) = self.class_stack.last() else {
                let class_name = self.symbol_name(declaring_class);
                self.error(
                    node.name.data.range,
                    &messages::PROPERTY_0_IS_PROTECTED_AND_ONLY_ACCESSIBLE_WITHIN_CLASS_1_AND_ITS_SUBCLASSES,
                    &[&node.name.text_name, &class_name],
                );
                return;
            };
            let enclosing_type = self.get_declared_type_of_symbol(enclosing);
            let declaring_type = self.get_declared_type_of_symbol(declaring_class);
            if !self.is_type_assignable_to(enclosing_type, declaring_type) {
                let class_name = self.symbol_name(declaring_class);
                self.error(
                    node.name.data.range,
                    &messages::PROPERTY_0_IS_PROTECTED_AND_ONLY_ACCESSIBLE_WITHIN_CLASS_1_AND_ITS_SUBCLASSES,
                    &[&node.name.text_name, &class_name],
                );
                return;
            }
            // The receiver must be of (or derived from) the accessing
            // class, not just any subclass of the declaring class.
            if !self.is_type_assignable_to(receiver_type, enclosing_type) {
                let receiver_name = self.type_to_string(receiver_type);
                let class_name = self.symbol_name(enclosing);
                self.error(
                    node.name.data.range,
                    &messages::PROPERTY_0_IS_PROTECTED_BUT_TYPE_1_IS_NOT_A_CLASS_DERIVED_FROM_2,
                    &[&node.name.text_name, &receiver_name, &class_name],
                );
            }
        }
    }

    fn check_element_access(&mut self, node: &'a ElementAccess<'a>, _mode: CheckMode) -> TypeId {
        let object_type = self.check_expression(node.expression, CheckMode::NORMAL);
        let index_type = self.check_expression(node.argument, CheckMode::NORMAL);
        if self.types.is_error(object_type) {
            return self.types.error_type;
        }
        let lookup_type = if node.question_dot {
            self.get_non_nullable_type(object_type)
        } else {
            object_type
        };
        let index_regular = self.get_regular_type(index_type);
        let result =
            self.get_indexed_access_type(lookup_type, index_regular, Some(node.argument.data().range));
        if node.question_dot && !self.types.is_error(result) {
            let undefined = self.types.undefined_type;
            return self.get_union_type(vec![result, undefined]);
        }
        result
    }

    // ========================================================================
    // Function-like expressions
    // ========================================================================

    pub(crate) fn is_context_sensitive_expression(&self, expr: &Expression<'a>) -> bool {
        match *expr.skip_parens() {
            Expression::Arrow(arrow) => arrow
                .parameters
                .iter()
                .any(|p| p.type_annotation.is_none() && p.initializer.is_none()),
            Expression::FunctionExpr(func) => func
                .parameters
                .iter()
                .any(|p| p.type_annotation.is_none() && p.initializer.is_none()),
            Expression::Object(object) => object.properties.iter().any(|p| match p {
                ObjectLiteralElement::Property(p) => {
                    self.is_context_sensitive_expression(p.initializer)
                }
                _ => false,
            }),
            _ => false,
        }
    }

    fn check_arrow_function(&mut self, node: &'a ArrowFunction<'a>, mode: CheckMode) -> TypeId {
        self.check_function_like_expression(
            node.data.id,
            node.type_parameters,
            node.parameters,
            node.return_type,
            FunctionBody::Arrow(&node.body),
            mode,
        )
    }

    fn check_function_expression(
        &mut self,
        node: &'a FunctionExpression<'a>,
        mode: CheckMode,
    ) -> TypeId {
        self.check_function_like_expression(
            node.data.id,
            node.type_parameters,
            node.parameters,
            node.return_type,
            FunctionBody::Block(node.body),
            mode,
        )
    }

    fn check_function_like_expression(
        &mut self,
        node_id: tycheck_ast::types::NodeId,
        type_parameters: Option<&'a [TypeParameterDeclaration<'a>]>,
        parameters: &'a [ParameterDeclaration<'a>],
        return_type: Option<&'a TypeNode<'a>>,
        body: FunctionBody<'a>,
        mode: CheckMode,
    ) -> TypeId {
        let context_sensitive = parameters
            .iter()
            .any(|p| p.type_annotation.is_none() && p.initializer.is_none());
        if mode.contains(CheckMode::SKIP_CONTEXT_SENSITIVE) && context_sensitive {
            // Excluded from the first applicability pass; the guaranteed
            // second pass re-checks with context included.
            return self.types.any_type;
        }

        // Contextual parameter types flow from the contextual signature.
        if context_sensitive {
            if let Some(contextual) = self.get_contextual_type(mode) {
                if let Some(signature) = self.single_call_signature(contextual) {
                    let contextual_params = self.signature(signature).params.clone();
                    for (i, param) in parameters.iter().enumerate() {
                        if param.type_annotation.is_none() && param.initializer.is_none() {
                            let t = contextual_params
                                .get(i)
                                .map(|p| p.ty)
                                .unwrap_or(self.types.any_type);
                            if let Some(symbol) =
                                self.binder.node_symbols.get(&param.data.id).copied()
                            {
                                let links = self.links(symbol);
                                if links.resolved_type.is_none() {
                                    links.resolved_type = Some(t);
                                }
                            }
                        }
                    }
                }
            }
        }

        let pushed = self.push_type_parameters(type_parameters);
        let type_params = pushed.clone().unwrap_or_default();

        let mut flags = SignatureFlags::NONE;
        let mut min_argument_count = 0u32;
        let mut params: Vec<SignatureParameter> = Vec::new();
        for param in parameters.iter() {
            let ty = match param.type_annotation {
                Some(annotation) => self.get_type_from_type_node(annotation),
                None => {
                    let from_links = self
                        .binder
                        .node_symbols
                        .get(&param.data.id)
                        .copied()
                        .and_then(|s| self.links(s).resolved_type);
                    match from_links {
                        Some(t) => t,
                        None => match param.initializer {
                            Some(init) => {
                                let t = self.check_expression(init, CheckMode::NORMAL);
                                self.get_widened_type(t)
                            }
                            None => {
                                if self.options.no_implicit_any() {
                                    self.error(
                                        param.data.range,
                                        &messages::PARAMETER_0_IMPLICITLY_HAS_AN_1_TYPE,
                                        &[&param.name.text_name, "any"],
                                    );
                                }
                                self.types.any_type
                            }
                        },
                    }
                }
            };
            let optional = param.question || param.initializer.is_some();
            if param.dot_dot_dot {
                flags |= SignatureFlags::HAS_REST_PARAMETER;
            } else if !optional {
                min_argument_count += 1;
            }
            if let Some(symbol) = self.binder.node_symbols.get(&param.data.id).copied() {
                let links = self.links(symbol);
                if links.resolved_type.is_none() {
                    links.resolved_type = Some(ty);
                }
            }
            params.push(SignatureParameter {
                name: param.name.text,
                name_text: param.name.text_name.clone(),
                ty,
                optional,
                rest: param.dot_dot_dot,
            });
        }

        let declared_return = return_type.map(|r| self.get_type_from_type_node(r));
        let return_type_id = match declared_return {
            Some(r) => {
                self.check_function_expression_body(node_id, &body, Some(r));
                r
            }
            None => self.infer_function_expression_return(node_id, &body),
        };

        self.pop_type_parameters(pushed);

        let signature = self.alloc_signature(Signature {
            flags,
            type_params,
            params,
            min_argument_count,
            return_type: return_type_id,
            declaration: Some(node_id),
            target: None,
            mapper: None,
        });
        let mut members = AnonymousMembers::default();
        members.call_signatures.push(signature);
        self.types.new_type(
            TypeFlags::OBJECT,
            ObjectFlags::ANONYMOUS,
            TypeKind::Object(ObjectKind::Anonymous(Box::new(members))),
        )
    }

    fn check_function_expression_body(
        &mut self,
        node_id: tycheck_ast::types::NodeId,
        body: &FunctionBody<'a>,
        expected_return: Option<TypeId>,
    ) {
        self.scope_stack.push(node_id);
        self.return_types.push(expected_return);
        match body {
            FunctionBody::Arrow(ArrowBody::Expression(expr)) => {
                let t = match expected_return {
                    Some(expected) => {
                        self.check_expression_with_contextual_type(expr, expected, CheckMode::NORMAL)
                    }
                    None => self.check_expression(expr, CheckMode::NORMAL),
                };
                if let Some(expected) = expected_return {
                    let widened = self.get_widened_literal_like_type_for_relation(t, expected);
                    self.check_type_assignable_to_and_report(
                        widened,
                        expected,
                        expr.data().range,
                        Some(expr),
                    );
                }
            }
            FunctionBody::Arrow(ArrowBody::Block(block)) => {
                for statement in block.statements.iter() {
                    self.check_statement(statement);
                }
            }
            FunctionBody::Block(block) => {
                for statement in block.statements.iter() {
                    self.check_statement(statement);
                }
            }
        }
        self.return_types.pop();
        self.scope_stack.pop();
    }

    fn infer_function_expression_return(
        &mut self,
        node_id: tycheck_ast::types::NodeId,
        body: &FunctionBody<'a>,
    ) -> TypeId {
        self.scope_stack.push(node_id);
        let result = match body {
            FunctionBody::Arrow(ArrowBody::Expression(expr)) => {
                let t = self.check_expression(expr, CheckMode::NORMAL);
                self.get_widened_type(t)
            }
            FunctionBody::Arrow(ArrowBody::Block(block)) => {
                self.infer_return_from_block(block)
            }
            FunctionBody::Block(block) => self.infer_return_from_block(block),
        };
        self.scope_stack.pop();
        result
    }

    fn infer_return_from_block(&mut self, block: &'a Block<'a>) -> TypeId {
        let mut returns: Vec<TypeId> = Vec::new();
        collect_returns(block, &mut |expr| {
            let t = self.check_expression(expr, CheckMode::NORMAL);
            let widened = self.get_widened_type(t);
            returns.push(widened);
        });
        // The statements themselves still need checking for side effects.
        // The return expectation is this body's own (inferred) type, not
        // the enclosing function's.
        self.return_types.push(None);
        for statement in block.statements.iter() {
            self.check_statement(statement);
        }
        self.return_types.pop();
        if returns.is_empty() {
            self.types.void_type
        } else {
            self.get_union_type(returns)
        }
    }

    pub(crate) fn single_call_signature(&mut self, t: TypeId) -> Option<SignatureId> {
        let members = self.resolve_structured_members(t);
        if members.call_signatures.len() == 1 {
            Some(members.call_signatures[0])
        } else {
            None
        }
    }

    // ========================================================================
    // Unary operators
    // ========================================================================

    fn check_prefix_unary(&mut self, node: &'a PrefixUnary<'a>) -> TypeId {
        let operand_type = self.check_expression(node.operand, CheckMode::NORMAL);
        match node.operator {
            SyntaxKind::ExclamationToken => self.types.boolean_type,
            SyntaxKind::PlusToken | SyntaxKind::MinusToken | SyntaxKind::TildeToken => {
                let flags = self.types.flags(operand_type);
                if flags.intersects(TypeFlags::BIG_INT_LIKE) {
                    return self.types.bigint_type;
                }
                if node.operator == SyntaxKind::MinusToken {
                    // -1 stays a literal type.
                    let regular = self.get_regular_type(operand_type);
                    if let TypeKind::NumberLiteral { value } = self.types.get(regular).kind {
                        let regular = self.get_number_literal_type(-value);
                        return self.get_fresh_literal_type(regular);
                    }
                }
                self.types.number_type
            }
            SyntaxKind::PlusPlusToken | SyntaxKind::MinusMinusToken => {
                self.check_increment_target(node.operand);
                self.types.number_type
            }
            _ => self.types.any_type,
        }
    }

    fn check_postfix_unary(&mut self, node: &'a PostfixUnary<'a>) -> TypeId {
        self.check_expression(node.operand, CheckMode::NORMAL);
        self.check_increment_target(node.operand);
        self.types.number_type
    }

    fn check_increment_target(&mut self, operand: &'a Expression<'a>) {
        if !matches!(
            *operand.skip_parens(),
            Expression::Identifier(_) | Expression::PropertyAccess(_) | Expression::ElementAccess(_)
        ) {
            self.error(
                operand.data().range,
                &messages::THE_OPERAND_OF_AN_INCREMENT_OR_DECREMENT_OPERATOR_MUST_BE_A_VARIABLE_OR_A_PROPERTY_ACCESS,
                &[],
            );
        }
    }

    // ========================================================================
    // Binary operators
    // ========================================================================

    fn check_binary_expression(&mut self, node: &'a BinaryExpression<'a>, mode: CheckMode) -> TypeId {
        if node.operator.is_assignment_operator() {
            return self.check_assignment_expression(node, mode);
        }
        use SyntaxKind::*;
        match node.operator {
            AmpersandAmpersandToken => {
                let left = self.check_expression(node.left, CheckMode::NORMAL);
                let frame = self.facts_from_condition(node.left, left, true);
                self.narrow_frames.push(frame);
                let right = self.check_expression(node.right, mode);
                self.narrow_frames.pop();
                // The result keeps the left's possibly-falsy constituents.
                let left_falsy = self.falsy_part(left);
                if self.types.flags(left_falsy).contains(TypeFlags::NEVER) {
                    right
                } else {
                    self.get_union_type(vec![left_falsy, right])
                }
            }
            BarBarToken => {
                let left = self.check_expression(node.left, CheckMode::NORMAL);
                let frame = self.facts_from_condition(node.left, left, false);
                self.narrow_frames.push(frame);
                let right = self.check_expression(node.right, mode);
                self.narrow_frames.pop();
                let left_truthy = self.truthy_part(left);
                if self.types.flags(left_truthy).contains(TypeFlags::NEVER) {
                    right
                } else {
                    self.get_union_type(vec![left_truthy, right])
                }
            }
            QuestionQuestionToken => {
                let left = self.check_expression(node.left, CheckMode::NORMAL);
                let right = self.check_expression(node.right, mode);
                let non_nullable = self.get_non_nullable_type(left);
                if self.types.flags(non_nullable).contains(TypeFlags::NEVER) {
                    right
                } else {
                    self.get_union_type(vec![non_nullable, right])
                }
            }
            CommaToken => {
                self.check_expression(node.left, CheckMode::NORMAL);
                self.check_expression(node.right, mode)
            }
            PlusToken => self.check_plus_expression(node),
            MinusToken | AsteriskToken | SlashToken | PercentToken | AsteriskAsteriskToken
            | LessThanLessThanToken | GreaterThanGreaterThanToken
            | GreaterThanGreaterThanGreaterThanToken | AmpersandToken | BarToken | CaretToken => {
                self.check_arithmetic_expression(node)
            }
            LessThanToken | GreaterThanToken | LessThanEqualsToken | GreaterThanEqualsToken => {
                self.check_relational_expression(node)
            }
            EqualsEqualsToken
            | ExclamationEqualsToken
            | EqualsEqualsEqualsToken
            | ExclamationEqualsEqualsToken => self.check_equality_expression(node),
            InstanceOfKeyword => {
                self.check_expression(node.left, CheckMode::NORMAL);
                self.check_expression(node.right, CheckMode::NORMAL);
                self.types.boolean_type
            }
            InKeyword => {
                let left = self.check_expression(node.left, CheckMode::NORMAL);
                let right = self.check_expression(node.right, CheckMode::NORMAL);
                let left_flags = self.types.flags(left);
                if !left_flags.intersects(
                    TypeFlags::STRING_LIKE
                        | TypeFlags::NUMBER_LIKE
                        | TypeFlags::ES_SYMBOL
                        | TypeFlags::ANY,
                ) {
                    self.error(
                        node.left.data().range,
                        &messages::THE_LEFT_HAND_SIDE_OF_AN_IN_EXPRESSION_MUST_BE_OF_TYPE_STRING_NUMBER_OR_SYMBOL,
                        &[],
                    );
                }
                let right_flags = self.types.flags(right);
                if right_flags.intersects(TypeFlags::PRIMITIVE) {
                    self.error(
                        node.right.data().range,
                        &messages::THE_RIGHT_HAND_SIDE_OF_AN_IN_EXPRESSION_MUST_NOT_BE_A_PRIMITIVE,
                        &[],
                    );
                }
                self.types.boolean_type
            }
            _ => {
                self.check_expression(node.left, CheckMode::NORMAL);
                self.check_expression(node.right, CheckMode::NORMAL);
                self.types.any_type
            }
        }
    }

    /// `+` picks string concatenation, numeric addition, or bigint
    /// addition by operand domains; number and bigint never mix.
    fn check_plus_expression(&mut self, node: &'a BinaryExpression<'a>) -> TypeId {
        let left = self.check_expression(node.left, CheckMode::NORMAL);
        let right = self.check_expression(node.right, CheckMode::NORMAL);
        let left_flags = self.types.flags(left);
        let right_flags = self.types.flags(right);

        if left_flags.intersects(TypeFlags::STRING_LIKE)
            || right_flags.intersects(TypeFlags::STRING_LIKE)
        {
            return self.types.string_type;
        }
        let left_bigint = left_flags.intersects(TypeFlags::BIG_INT_LIKE);
        let right_bigint = right_flags.intersects(TypeFlags::BIG_INT_LIKE);
        let left_number = left_flags.intersects(TypeFlags::NUMBER_LIKE);
        let right_number = right_flags.intersects(TypeFlags::NUMBER_LIKE);
        if (left_bigint && right_number) || (left_number && right_bigint) {
            self.error(
                node.data.range,
                &messages::OPERATOR_0_CANNOT_BE_APPLIED_TO_TYPES_BIGINT_AND_NUMBER,
                &["+"],
            );
            return self.types.error_type;
        }
        if left_bigint && right_bigint {
            return self.types.bigint_type;
        }
        if left_number && right_number {
            return self.types.number_type;
        }
        if left_flags.contains(TypeFlags::ANY) || right_flags.contains(TypeFlags::ANY) {
            return self.types.any_type;
        }
        let left_name = self.type_to_string(left);
        let right_name = self.type_to_string(right);
        self.error(
            node.data.range,
            &messages::OPERATOR_0_CANNOT_BE_APPLIED_TO_TYPES_1_AND_2,
            &["+", &left_name, &right_name],
        );
        self.types.any_type
    }

    fn check_arithmetic_expression(&mut self, node: &'a BinaryExpression<'a>) -> TypeId {
        let left = self.check_expression(node.left, CheckMode::NORMAL);
        let right = self.check_expression(node.right, CheckMode::NORMAL);
        let left_flags = self.types.flags(left);
        let right_flags = self.types.flags(right);
        let left_ok = left_flags.intersects(
            TypeFlags::NUMBER_LIKE | TypeFlags::BIG_INT_LIKE | TypeFlags::ANY | TypeFlags::ENUM_LIKE,
        );
        let right_ok = right_flags.intersects(
            TypeFlags::NUMBER_LIKE | TypeFlags::BIG_INT_LIKE | TypeFlags::ANY | TypeFlags::ENUM_LIKE,
        );
        if !left_ok {
            self.error(
                node.left.data().range,
                &messages::THE_LEFT_HAND_SIDE_OF_AN_ARITHMETIC_OPERATION_MUST_BE_OF_TYPE_ANY_NUMBER_BIGINT_OR_AN_ENUM_TYPE,
                &[],
            );
        }
        if !right_ok {
            self.error(
                node.right.data().range,
                &messages::THE_RIGHT_HAND_SIDE_OF_AN_ARITHMETIC_OPERATION_MUST_BE_OF_TYPE_ANY_NUMBER_BIGINT_OR_AN_ENUM_TYPE,
                &[],
            );
        }
        let left_bigint = left_flags.intersects(TypeFlags::BIG_INT_LIKE);
        let right_bigint = right_flags.intersects(TypeFlags::BIG_INT_LIKE);
        if left_bigint != right_bigint && left_ok && right_ok
            && !left_flags.contains(TypeFlags::ANY)
            && !right_flags.contains(TypeFlags::ANY)
        {
            self.error(
                node.data.range,
                &messages::OPERATOR_0_CANNOT_BE_APPLIED_TO_TYPES_BIGINT_AND_NUMBER,
                &[node.operator.text()],
            );
        }
        if left_bigint && right_bigint {
            self.types.bigint_type
        } else {
            self.types.number_type
        }
    }

    /// `<`, `>`, `<=`, `>=`: operands without overlap make the comparison
    /// self-evidently always false, and ordering is only defined over
    /// primitive operands.
    fn check_relational_expression(&mut self, node: &'a BinaryExpression<'a>) -> TypeId {
        let left = self.check_expression(node.left, CheckMode::NORMAL);
        let right = self.check_expression(node.right, CheckMode::NORMAL);
        // Fresh literals widen first so `i < 10` compares number against
        // number, not 10 against the loop variable's exact value.
        let left_widened = self.get_widened_literal_type(left);
        let right_widened = self.get_widened_literal_type(right);
        if self.types.is_error(left_widened) || self.types.is_error(right_widened) {
            return self.types.boolean_type;
        }
        if self.has_no_overlap(left_widened, right_widened) {
            let left_name = self.type_to_string(left_widened);
            let right_name = self.type_to_string(right_widened);
            self.error(
                node.data.range,
                &messages::THIS_COMPARISON_APPEARS_TO_BE_UNINTENTIONAL_BECAUSE_THE_TYPES_0_AND_1_HAVE_NO_OVERLAP,
                &[&left_name, &right_name],
            );
            return self.types.boolean_type;
        }
        let string = self.types.string_type;
        let number = self.types.number_type;
        let bigint = self.types.bigint_type;
        let boolean = self.types.boolean_type;
        let orderable = self.get_union_type(vec![string, number, bigint, boolean]);
        let left_ok = self.is_type_assignable_to(left_widened, orderable);
        let right_ok = self.is_type_assignable_to(right_widened, orderable);
        if !left_ok || !right_ok {
            let left_name = self.type_to_string(left_widened);
            let right_name = self.type_to_string(right_widened);
            self.error(
                node.data.range,
                &messages::OPERATOR_0_CANNOT_BE_APPLIED_TO_TYPES_1_AND_2,
                &[node.operator.text(), &left_name, &right_name],
            );
        }
        self.types.boolean_type
    }

    fn check_equality_expression(&mut self, node: &'a BinaryExpression<'a>) -> TypeId {
        let left = self.check_expression(node.left, CheckMode::NORMAL);
        let right = self.check_expression(node.right, CheckMode::NORMAL);

        // NaN is never equal to anything, itself included.
        let negated = matches!(
            node.operator,
            SyntaxKind::ExclamationEqualsToken | SyntaxKind::ExclamationEqualsEqualsToken
        );
        if is_nan_expression(node.left) || is_nan_expression(node.right) {
            self.error(
                node.data.range,
                &messages::THIS_CONDITION_WILL_ALWAYS_RETURN_0_SINCE_NAN_IS_NOT_EQUAL_TO_ANYTHING,
                &[if negated { "true" } else { "false" }],
            );
            return self.types.boolean_type;
        }
        let left_regular = self.get_regular_type(left);
        let right_regular = self.get_regular_type(right);
        if !self.types.is_error(left_regular)
            && !self.types.is_error(right_regular)
            && self.has_no_overlap(left_regular, right_regular)
        {
            let left_name = self.type_to_string(left_regular);
            let right_name = self.type_to_string(right_regular);
            self.error(
                node.data.range,
                &messages::THIS_COMPARISON_APPEARS_TO_BE_UNINTENTIONAL_BECAUSE_THE_TYPES_0_AND_1_HAVE_NO_OVERLAP,
                &[&left_name, &right_name],
            );
        }
        self.types.boolean_type
    }

    fn check_assignment_expression(
        &mut self,
        node: &'a BinaryExpression<'a>,
        mode: CheckMode,
    ) -> TypeId {
        let left = self.check_expression(node.left, CheckMode::NORMAL);
        self.check_assignment_target(node.left);

        if node.operator == SyntaxKind::EqualsToken {
            let right = self.check_expression_with_contextual_type(node.right, left, mode);
            // Assignments feed definite-assignment analysis for `auto`
            // variables.
            if let Expression::Identifier(ident) = *node.left.skip_parens() {
                if let Some(symbol) = self.resolve_name(ident.text) {
                    let declared = self
                        .links(symbol)
                        .resolved_type
                        .unwrap_or(self.types.error_type);
                    if declared == self.types.auto_type {
                        let widened = self.get_widened_type(right);
                        let merged = match self.flow_types.get(&symbol).copied() {
                            Some(existing) => self.get_union_type(vec![existing, widened]),
                            None => widened,
                        };
                        self.flow_types.insert(symbol, merged);
                        return right;
                    }
                }
            }
            if !self.types.is_error(left) {
                let widened = self.get_widened_literal_like_type_for_relation(right, left);
                self.check_type_assignable_to_and_report(
                    widened,
                    left,
                    node.right.data().range,
                    Some(node.right),
                );
            }
            return right;
        }

        // Compound assignments reuse the operator result.
        let result = match node.operator {
            SyntaxKind::AmpersandAmpersandEqualsToken
            | SyntaxKind::BarBarEqualsToken
            | SyntaxKind::QuestionQuestionEqualsToken => {
                self.check_expression(node.right, CheckMode::NORMAL)
            }
            SyntaxKind::PlusEqualsToken => {
                let right = self.check_expression(node.right, CheckMode::NORMAL);
                let left_flags = self.types.flags(left);
                let right_flags = self.types.flags(right);
                if left_flags.intersects(TypeFlags::STRING_LIKE)
                    || right_flags.intersects(TypeFlags::STRING_LIKE)
                {
                    self.types.string_type
                } else {
                    self.types.number_type
                }
            }
            _ => {
                self.check_expression(node.right, CheckMode::NORMAL);
                self.types.number_type
            }
        };
        if !self.types.is_error(left) {
            let widened = self.get_widened_literal_like_type_for_relation(result, left);
            if !self.is_type_assignable_to(widened, left) {
                let source_name = self.type_to_string(widened);
                let target_name = self.type_to_string(left);
                self.error(
                    node.data.range,
                    &messages::TYPE_0_IS_NOT_ASSIGNABLE_TO_TYPE_1,
                    &[&source_name, &target_name],
                );
            }
        }
        result
    }

    fn check_assignment_target(&mut self, target: &'a Expression<'a>) {
        match *target.skip_parens() {
            Expression::Identifier(ident) => {
                if let Some(symbol) = self.resolve_name(ident.text) {
                    let is_const = self
                        .binder
                        .symbols
                        .get(symbol)
                        .value_declaration
                        .and_then(|d| self.binder.decls.get(&d))
                        .map_or(false, |d| matches!(d, tycheck_binder::DeclRef::Variable(_, true)));
                    if is_const {
                        self.error(
                            ident.data.range,
                            &messages::CANNOT_ASSIGN_TO_0_BECAUSE_IT_IS_A_CONSTANT,
                            &[&ident.text_name],
                        );
                    }
                }
            }
            Expression::PropertyAccess(access) => {
                // Readonly properties reject writes.
                let object_type = self.check_expression(access.expression, CheckMode::NORMAL);
                let apparent = self.get_apparent_type(object_type);
                if let Some(prop) = self.get_property_of_type(apparent, access.name.text) {
                    let readonly = self
                        .binder
                        .symbols
                        .get(prop)
                        .check_flags
                        .contains(CheckFlags::READONLY)
                        || self
                            .binder
                            .symbols
                            .get(prop)
                            .value_declaration
                            .and_then(|d| self.binder.decls.get(&d))
                            .map_or(false, |d| match d {
                                tycheck_binder::DeclRef::Property(p) => {
                                    p.data.modifier_flags.contains(ModifierFlags::READONLY)
                                }
                                tycheck_binder::DeclRef::PropertySig(p) => p
                                    .data
                                    .modifier_flags
                                    .contains(ModifierFlags::READONLY),
                                _ => false,
                            });
                    if readonly {
                        self.error(
                            access.name.data.range,
                            &messages::CANNOT_ASSIGN_TO_0_BECAUSE_IT_IS_A_READ_ONLY_PROPERTY,
                            &[&access.name.text_name],
                        );
                    }
                }
            }
            Expression::ElementAccess(access) => {
                // Writes through a readonly index signature reject.
                let object_type = self.check_expression(access.expression, CheckMode::NORMAL);
                let apparent = self.get_apparent_type(object_type);
                let members = self.resolve_structured_members(apparent);
                if members.index_infos.iter().all(|i| i.is_readonly)
                    && !members.index_infos.is_empty()
                {
                    let type_name = self.type_to_string(object_type);
                    self.error(
                        access.data.range,
                        &messages::INDEX_SIGNATURE_IN_TYPE_0_ONLY_PERMITS_READING,
                        &[&type_name],
                    );
                }
            }
            _ => {
                self.error(
                    target.data().range,
                    &messages::THE_LEFT_HAND_SIDE_OF_AN_ASSIGNMENT_EXPRESSION_MUST_BE_A_VARIABLE,
                    &[],
                );
            }
        }
    }

    fn check_conditional_expression(
        &mut self,
        node: &'a ConditionalExpression<'a>,
        mode: CheckMode,
    ) -> TypeId {
        let condition = self.check_expression(node.condition, CheckMode::NORMAL);
        let true_frame = self.facts_from_condition(node.condition, condition, true);
        self.narrow_frames.push(true_frame);
        let when_true = self.check_expression(node.when_true, mode);
        self.narrow_frames.pop();
        let false_frame = self.facts_from_condition(node.condition, condition, false);
        self.narrow_frames.push(false_frame);
        let when_false = self.check_expression(node.when_false, mode);
        self.narrow_frames.pop();
        self.get_union_type(vec![when_true, when_false])
    }

    // ========================================================================
    // Iteration
    // ========================================================================

    pub(crate) fn get_iterated_element_type(&mut self, t: TypeId, range: TextRange) -> TypeId {
        let flags = self.types.flags(t);
        if flags.contains(TypeFlags::ANY) {
            return self.types.any_type;
        }
        if flags.intersects(TypeFlags::STRING_LIKE) {
            return self.types.string_type;
        }
        if flags.contains(TypeFlags::UNION) {
            let members = self.types.union_members(t);
            let elements: Vec<TypeId> = members
                .into_iter()
                .map(|m| self.get_iterated_element_type(m, range))
                .collect();
            return self.get_union_type(elements);
        }
        if self.is_array_type(t) {
            return self.get_type_arguments(t)[0];
        }
        if self.is_tuple_type(t) {
            let (elements, _, _) = self.tuple_element_info(t).unwrap();
            return self.get_union_type(elements);
        }
        let name = self.type_to_string(t);
        self.error(range, &messages::TYPE_0_IS_NOT_AN_ARRAY_TYPE, &[&name]);
        self.types.error_type
    }

    /// The part of a type that remains when it is known falsy.
    pub(crate) fn falsy_part(&mut self, t: TypeId) -> TypeId {
        let members = self.types.union_members(t);
        let falsy: Vec<TypeId> = members
            .into_iter()
            .filter(|&m| {
                let flags = self.types.flags(m);
                if flags.intersects(TypeFlags::DEFINITELY_FALSY) {
                    return true;
                }
                if flags.intersects(TypeFlags::LITERAL) {
                    return self.is_falsy_literal(m);
                }
                flags.intersects(
                    TypeFlags::STRING
                        | TypeFlags::NUMBER
                        | TypeFlags::BIG_INT
                        | TypeFlags::BOOLEAN
                        | TypeFlags::ANY_OR_UNKNOWN,
                )
            })
            .collect();
        self.get_union_type(falsy)
    }

    /// The part of a type that remains when it is known truthy.
    pub(crate) fn truthy_part(&mut self, t: TypeId) -> TypeId {
        let members = self.types.union_members(t);
        let truthy: Vec<TypeId> = members
            .into_iter()
            .filter(|&m| {
                let flags = self.types.flags(m);
                if flags.intersects(TypeFlags::DEFINITELY_FALSY) {
                    return false;
                }
                if flags.intersects(TypeFlags::LITERAL) {
                    return !self.is_falsy_literal(m);
                }
                true
            })
            .collect();
        self.get_union_type(truthy)
    }

    fn is_falsy_literal(&mut self, t: TypeId) -> bool {
        let regular = self.get_regular_type(t);
        match &self.types.get(regular).kind {
            TypeKind::StringLiteral { value } => value.is_empty(),
            TypeKind::NumberLiteral { value } => *value == 0.0,
            TypeKind::BigIntLiteral { value } => value.trim_end_matches('n') == "0",
            TypeKind::BooleanLiteral { value } => !*value,
            _ => false,
        }
    }
}

enum FunctionBody<'a> {
    Arrow(&'a ArrowBody<'a>),
    Block(&'a Block<'a>),
}

fn is_nan_expression(expr: &Expression<'_>) -> bool {
    match *expr.skip_parens() {
        Expression::Identifier(ident) => ident.text_name == "NaN",
        Expression::PropertyAccess(access) => {
            access.name.text_name == "NaN"
                && matches!(
                    *access.expression.skip_parens(),
                    Expression::Identifier(object) if object.text_name == "Number"
                )
        }
        _ => false,
    }
}

fn best_spelling_match(name: &str, candidates: &[String]) -> Option<String> {
    let cutoff = (name.len() / 3).max(1).min(3);
    let mut best: Option<(usize, &String)> = None;
    for candidate in candidates {
        let distance = spelling_distance(name, candidate);
        if distance > 0 && distance <= cutoff {
            if best.map_or(true, |(d, _)| distance < d) {
                best = Some((distance, candidate));
            }
        }
    }
    best.map(|(_, candidate)| candidate.clone())
}

fn spelling_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=b.len()).collect();
    for (i, &ca) in a.iter().enumerate() {
        let mut previous = row[0];
        row[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let insert_or_delete = row[j].min(row[j + 1]) + 1;
            let substitute = previous + usize::from(ca != cb);
            previous = row[j + 1];
            row[j + 1] = insert_or_delete.min(substitute);
        }
    }
    row[b.len()]
}

fn collect_returns<'n>(block: &'n Block<'n>, f: &mut impl FnMut(&'n Expression<'n>)) {
    fn walk<'n>(statement: &'n Statement<'n>, f: &mut impl FnMut(&'n Expression<'n>)) {
        match statement {
            Statement::Return(r) => {
                if let Some(expr) = r.expression {
                    f(expr);
                }
            }
            Statement::Block(b) => {
                for s in b.statements.iter() {
                    walk(s, f);
                }
            }
            Statement::If(i) => {
                walk(i.then_statement, f);
                if let Some(e) = i.else_statement {
                    walk(e, f);
                }
            }
            Statement::While(w) => walk(w.statement, f),
            Statement::For(x) => walk(x.statement, f),
            Statement::ForOf(x) => walk(x.statement, f),
            Statement::ForIn(x) => walk(x.statement, f),
            Statement::Switch(s) => {
                for clause in s.clauses.iter() {
                    match clause {
                        CaseOrDefaultClause::Case(c) => {
                            for s in c.statements.iter() {
                                walk(s, f);
                            }
                        }
                        CaseOrDefaultClause::Default(d) => {
                            for s in d.statements.iter() {
                                walk(s, f);
                            }
                        }
                    }
                }
            }
            _ => {}
        }
    }
    for statement in block.statements.iter() {
        walk(statement, f);
    }
}
