//! Declaration-to-type resolvers and name resolution.
//!
//! Everything here follows the same idempotent memoization discipline:
//! check the cache, push a resolution marker, compute, and on circular
//! failure substitute the designated fallback plus one diagnostic so the
//! rest of the check proceeds.

use std::rc::Rc;

use tycheck_ast::node::*;
use tycheck_ast::syntax_kind::SyntaxKind;
use tycheck_ast::types::{
    CheckFlags, ElementFlags, NodeId, ObjectFlags, SignatureFlags, SignatureId, SourceFileId,
    SymbolFlags, SymbolId, TypeFlags, TypeId,
};
use tycheck_core::intern::InternedString;
use tycheck_core::text::TextRange;
use tycheck_diagnostics::messages;

use crate::checker::{Checker, EnumValue, ResolutionKey};
use crate::types::{
    AnonymousMembers, IndexInfo, ObjectKind, ResolvedMembers, Signature, SignatureParameter,
    TypeKind, TypeMapper,
};

/// Well-known ambient value globals; references to them type as `any`
/// rather than erroring.
const BUILTIN_VALUE_GLOBALS: &[&str] = &[
    "console", "setTimeout", "setInterval", "clearTimeout", "clearInterval", "parseInt",
    "parseFloat", "isNaN", "isFinite", "NaN", "Infinity", "undefined", "JSON", "Math", "Date",
    "Object", "Array", "String", "Number", "Boolean", "Symbol", "Map", "Set", "WeakMap",
    "WeakSet", "Promise", "Proxy", "Reflect", "Error", "TypeError", "RangeError", "SyntaxError",
    "ReferenceError", "RegExp", "Function", "globalThis", "fetch", "URL", "structuredClone",
    "queueMicrotask", "eval", "encodeURIComponent", "decodeURIComponent",
];

/// Globals with well-known type packages, for the install-types hint.
const TYPES_PACKAGE_GLOBALS: &[(&str, &str)] = &[
    ("process", "node"),
    ("require", "node"),
    ("module", "node"),
    ("__dirname", "node"),
    ("Buffer", "node"),
    ("describe", "jest"),
    ("it", "jest"),
    ("expect", "jest"),
    ("$", "jquery"),
];

impl<'a> Checker<'a> {
    // ========================================================================
    // Name resolution
    // ========================================================================

    /// Resolve a name through the active scope chain.
    pub(crate) fn resolve_name(&mut self, name: InternedString) -> Option<SymbolId> {
        for &container in self.scope_stack.iter().rev() {
            if let Some(table) = self.binder.container_locals.get(&container) {
                if let Some(symbol) = table.get(&name) {
                    return Some(symbol);
                }
            }
        }
        None
    }

    pub(crate) fn resolve_alias_if_needed(&mut self, symbol: SymbolId) -> SymbolId {
        if self.symbol_flags(symbol).contains(SymbolFlags::ALIAS) {
            self.resolve_alias(symbol).unwrap_or(symbol)
        } else {
            symbol
        }
    }

    /// Resolve an alias symbol to its ultimate target, following chains of
    /// imports and re-exports. Circular aliasing reports once and yields
    /// `None` (the unknown-symbol sentinel).
    pub(crate) fn resolve_alias(&mut self, symbol: SymbolId) -> Option<SymbolId> {
        if let Some(cached) = self.links(symbol).alias_target {
            return cached;
        }
        if !self.push_type_resolution(ResolutionKey::AliasTarget(symbol)) {
            let name = self.symbol_name(symbol);
            self.diagnostics.add(tycheck_diagnostics::Diagnostic::new(
                &messages::CIRCULAR_DEFINITION_OF_IMPORT_ALIAS_0,
                &[&name],
            ));
            self.links(symbol).alias_target = Some(None);
            return None;
        }
        let target = self.resolve_alias_worker(symbol);
        let ok = self.pop_type_resolution();
        let result = if ok { target } else { None };
        self.links(symbol).alias_target = Some(result);
        result
    }

    fn resolve_alias_worker(&mut self, symbol: SymbolId) -> Option<SymbolId> {
        let info = self.binder.alias_decls.get(&symbol)?.clone();
        use tycheck_binder::AliasKind::*;
        match info.kind {
            Named { export_name } | ReExport { export_name } => {
                let file = self.resolve_module_specifier(&info.specifier)?;
                let exports = self.get_exports_of_module(file);
                let target = exports
                    .iter()
                    .find(|(name, _)| *name == export_name)
                    .map(|(_, symbol)| *symbol);
                match target {
                    Some(target) => {
                        let resolved = self.resolve_alias_if_needed(target);
                        Some(resolved)
                    }
                    None => {
                        let range = self.alias_declaration_range(symbol);
                        let export_text = self.interner.resolve(export_name).to_string();
                        if let Some(range) = range {
                            self.error(
                                range,
                                &messages::MODULE_0_HAS_NO_EXPORTED_MEMBER_1,
                                &[&info.specifier, &export_text],
                            );
                        }
                        None
                    }
                }
            }
            Default => {
                let file = self.resolve_module_specifier(&info.specifier)?;
                let exports = self.get_exports_of_module(file);
                let default_name = self.interner.intern_static("default");
                exports
                    .iter()
                    .find(|(name, _)| *name == default_name)
                    .map(|(_, symbol)| *symbol)
                    .map(|t| self.resolve_alias_if_needed(t))
            }
            Namespace => {
                // The namespace object is modeled by the module itself; a
                // transient symbol carries its exports.
                let file = self.resolve_module_specifier(&info.specifier)?;
                Some(self.get_module_namespace_symbol(file))
            }
            LocalExport { local_name } => {
                let root = self.binder.file_roots.get(&info.from_file).copied()?;
                let local = self
                    .binder
                    .container_locals
                    .get(&root)
                    .and_then(|t| t.get(&local_name))?;
                Some(self.resolve_alias_if_needed(local))
            }
        }
    }

    fn alias_declaration_range(&self, symbol: SymbolId) -> Option<TextRange> {
        let decl = self.binder.symbols.get(symbol).declarations.first()?;
        self.binder.decls.get(decl).map(|d| match d {
            tycheck_binder::DeclRef::ImportSpec(n, _) => n.data.range,
            tycheck_binder::DeclRef::ImportDefault(n) => n.data.range,
            tycheck_binder::DeclRef::ImportNamespace(n) => n.data.range,
            tycheck_binder::DeclRef::ExportSpec(n, _) => n.data.range,
            _ => TextRange::empty(0),
        })
    }

    fn resolve_module_specifier(&mut self, specifier: &str) -> Option<SourceFileId> {
        let trimmed = specifier.trim_start_matches("./");
        self.module_map
            .get(specifier)
            .or_else(|| self.module_map.get(trimmed))
            .copied()
    }

    /// A module's exports: its own export table plus everything arriving
    /// through `export *`, first exporter wins; a name exported by two
    /// star targets without a local export is ambiguous.
    pub(crate) fn get_exports_of_module(
        &mut self,
        file: SourceFileId,
    ) -> Vec<(InternedString, SymbolId)> {
        if let Some(cached) = self.module_exports.get(&file) {
            return cached.clone();
        }
        // Seed the cache to terminate `export *` cycles.
        self.module_exports.insert(file, Vec::new());

        let mut exports: Vec<(InternedString, SymbolId)> = Vec::new();
        if let Some(table) = self.binder.file_exports.get(&file) {
            exports = table.iter().map(|(n, s)| (*n, *s)).collect();
        }
        let own_names: Vec<InternedString> = exports.iter().map(|(n, _)| *n).collect();
        let star_specs = self
            .binder
            .star_exports
            .get(&file)
            .cloned()
            .unwrap_or_default();
        let mut star_seen: Vec<InternedString> = Vec::new();
        for specifier in star_specs {
            let Some(target) = self.resolve_module_specifier(&specifier) else {
                continue;
            };
            let target_exports = self.get_exports_of_module(target);
            for (name, symbol) in target_exports {
                if own_names.contains(&name) {
                    // A local export of the same name shadows star
                    // re-exports.
                    continue;
                }
                if star_seen.contains(&name) {
                    let name_text = self.interner.resolve(name).to_string();
                    self.diagnostics.add(tycheck_diagnostics::Diagnostic::new(
                        &messages::MODULE_0_HAS_ALREADY_EXPORTED_A_MEMBER_NAMED_1,
                        &[&specifier, &name_text],
                    ));
                    continue;
                }
                star_seen.push(name);
                exports.push((name, symbol));
            }
        }
        self.module_exports.insert(file, exports.clone());
        exports
    }

    fn get_module_namespace_symbol(&mut self, file: SourceFileId) -> SymbolId {
        let name = self.interner.intern_static("__module");
        let symbol = self.binder.symbols.alloc(
            name,
            "__module".to_string(),
            SymbolFlags::VALUE_MODULE | SymbolFlags::TRANSIENT,
        );
        let exports = self.get_exports_of_module(file);
        let mut table = tycheck_binder::SymbolTable::new();
        for (export_name, export_symbol) in exports {
            table.set(export_name, export_symbol);
        }
        self.binder.symbols.get_mut(symbol).exports = Some(table);
        symbol
    }

    // ========================================================================
    // Value types of symbols
    // ========================================================================

    pub fn get_type_of_symbol(&mut self, symbol: SymbolId) -> TypeId {
        if let Some(t) = self.links(symbol).resolved_type {
            return t;
        }
        // Instantiated transient symbols substitute through their mapper.
        if let Some((target, mapper)) = self.links(symbol).target.clone() {
            let base = self.get_type_of_symbol(target);
            let instantiated = self.instantiate_type(base, &mapper);
            self.links(symbol).resolved_type = Some(instantiated);
            return instantiated;
        }
        if !self.push_type_resolution(ResolutionKey::TypeOfSymbol(symbol)) {
            // Circular initializer or annotation.
            let name = self.symbol_name(symbol);
            self.diagnostics.add(tycheck_diagnostics::Diagnostic::new(
                &messages::_0_IS_REFERENCED_DIRECTLY_OR_INDIRECTLY_IN_ITS_OWN_INITIALIZER,
                &[&name],
            ));
            let any = self.types.any_type;
            self.links(symbol).resolved_type = Some(any);
            return any;
        }
        let captured = self.links(symbol).deferred_scopes.clone();
        let saved_scopes = captured.map(|scopes| {
            std::mem::replace(&mut self.type_param_scopes, scopes)
        });
        let computed = self.compute_type_of_symbol(symbol);
        if let Some(saved) = saved_scopes {
            self.type_param_scopes = saved;
        }
        let ok = self.pop_type_resolution();
        let result = if ok { computed } else { self.types.any_type };
        let links = self.links(symbol);
        if links.resolved_type.is_none() {
            links.resolved_type = Some(result);
        }
        links.resolved_type.unwrap()
    }

    fn compute_type_of_symbol(&mut self, symbol: SymbolId) -> TypeId {
        let flags = self.symbol_flags(symbol);
        if flags.contains(SymbolFlags::ALIAS) {
            return match self.resolve_alias(symbol) {
                Some(target) => self.get_type_of_symbol(target),
                None => self.types.error_type,
            };
        }
        let decl_id = {
            let s = self.binder.symbols.get(symbol);
            s.value_declaration.or_else(|| s.declarations.first().copied())
        };
        let Some(decl_id) = decl_id else {
            if flags.intersects(SymbolFlags::MODULE | SymbolFlags::ENUM) {
                return self.get_container_object_type(symbol);
            }
            return self.types.any_type;
        };
        let Some(decl) = self.binder.decls.get(&decl_id).copied() else {
            return self.types.any_type;
        };
        use tycheck_binder::DeclRef::*;
        match decl {
            Variable(node, is_const) => self.get_type_of_variable_like(
                node.type_annotation,
                node.initializer,
                is_const,
                symbol,
            ),
            CatchVariable(_) => {
                if self.options.use_unknown_in_catch_variables() {
                    self.types.unknown_type
                } else {
                    self.types.any_type
                }
            }
            Param(node) => {
                let annotated = node
                    .type_annotation
                    .map(|t| self.with_member_scope(symbol, |c| c.get_type_from_type_node(t)));
                match annotated {
                    Some(t) => {
                        if node.question {
                            let undefined = self.types.undefined_type;
                            self.get_union_type(vec![t, undefined])
                        } else {
                            t
                        }
                    }
                    None => match node.initializer {
                        Some(init) => {
                            let t = self.check_expression(init, crate::checker::CheckMode::NORMAL);
                            self.get_widened_type(t)
                        }
                        None => self.types.any_type,
                    },
                }
            }
            Function(_) => self.get_type_of_function_symbol(symbol, false),
            Method(_) | MethodSig(_) => self.get_type_of_function_symbol(symbol, true),
            Class(node) => self.get_type_of_class_symbol(symbol, node),
            Enum(_) => self.get_container_object_type(symbol),
            EnumMember(member, parent) => {
                let _ = member;
                let _ = parent;
                self.get_enum_member_type(symbol)
            }
            Namespace(_) => self.get_container_object_type(symbol),
            Property(node) => {
                let declared = node
                    .type_annotation
                    .map(|t| self.with_member_scope(symbol, |c| c.get_type_from_type_node(t)));
                let base = match declared {
                    Some(t) => t,
                    None => match node.initializer {
                        Some(init) => {
                            let t = self.check_expression(init, crate::checker::CheckMode::NORMAL);
                            self.get_widened_type(t)
                        }
                        None => self.types.any_type,
                    },
                };
                if node.question && self.options.strict_null_checks() {
                    let undefined = self.types.undefined_type;
                    self.get_union_type(vec![base, undefined])
                } else {
                    base
                }
            }
            PropertySig(node) => {
                let declared = node
                    .type_annotation
                    .map(|t| self.with_member_scope(symbol, |c| c.get_type_from_type_node(t)))
                    .unwrap_or(self.types.any_type);
                if node.question && self.options.strict_null_checks() {
                    let undefined = self.types.undefined_type;
                    self.get_union_type(vec![declared, undefined])
                } else {
                    declared
                }
            }
            TypeAlias(_) | Interface(_) => {
                // A type-only meaning has no value type.
                self.types.error_type
            }
            Arrow(_) | FunctionExpr(_) => self.types.any_type,
            CallSig(_) | CtorSig(_) | IndexSig(_) | Ctor(_) => self.types.any_type,
            ImportSpec(..) | ImportDefault(_) | ImportNamespace(_) | ExportSpec(..) => {
                match self.resolve_alias(symbol) {
                    Some(target) => self.get_type_of_symbol(target),
                    None => self.types.error_type,
                }
            }
        }
    }

    fn get_type_of_variable_like(
        &mut self,
        annotation: Option<&'a TypeNode<'a>>,
        initializer: Option<&'a Expression<'a>>,
        is_const: bool,
        _symbol: SymbolId,
    ) -> TypeId {
        if let Some(annotation) = annotation {
            return self.get_type_from_type_node(annotation);
        }
        if let Some(init) = initializer {
            let t = self.check_expression(init, crate::checker::CheckMode::NORMAL);
            return if is_const {
                self.get_regular_type(t)
            } else {
                self.get_widened_type(t)
            };
        }
        self.types.auto_type
    }

    /// Push the owning declaration's type parameters while resolving a
    /// member's annotation, so `T` in `interface A<T> { x: T }` resolves
    /// on demand.
    pub(crate) fn with_member_scope<R>(
        &mut self,
        member: SymbolId,
        f: impl FnOnce(&mut Self) -> R,
    ) -> R {
        let parent = self.binder.symbols.get(member).parent;
        let params = parent.and_then(|p| {
            let declared = self.get_declared_type_of_symbol(p);
            match &self.types.get(declared).kind {
                TypeKind::Object(ObjectKind::Interface { type_params, .. })
                    if !type_params.is_empty() =>
                {
                    Some(type_params.clone())
                }
                _ => None,
            }
        });
        match params {
            Some(params) => {
                let mut scope = rustc_hash::FxHashMap::default();
                for &param in &params {
                    if let TypeKind::TypeParameter { name, .. } = &self.types.get(param).kind {
                        let interned = self.interner.intern(name);
                        scope.insert(interned, param);
                    }
                }
                self.type_param_scopes.push(scope);
                let result = f(self);
                self.type_param_scopes.pop();
                result
            }
            None => f(self),
        }
    }

    /// Function/method value type: an anonymous type carrying the call
    /// signatures of every overload declaration (body-less declarations
    /// are the overloads; with none, the implementation's signature is
    /// the only one).
    fn get_type_of_function_symbol(&mut self, symbol: SymbolId, _is_method: bool) -> TypeId {
        let declarations = self.binder.symbols.get(symbol).declarations.clone();
        let mut overloads: Vec<SignatureId> = Vec::new();
        let mut implementations: Vec<SignatureId> = Vec::new();
        for decl_id in declarations {
            let Some(decl) = self.binder.decls.get(&decl_id).copied() else {
                continue;
            };
            use tycheck_binder::DeclRef::*;
            let (type_params, params, return_type, body, node_id) = match decl {
                Function(f) => (f.type_parameters, f.parameters, f.return_type, f.body, f.data.id),
                Method(m) => (m.type_parameters, m.parameters, m.return_type, m.body, m.data.id),
                MethodSig(m) => (m.type_parameters, m.parameters, m.return_type, None, m.data.id),
                _ => continue,
            };
            let signature = self.with_member_scope(symbol, |c| {
                c.get_signature_from_declaration(type_params, params, return_type, body, node_id)
            });
            if body.is_some() {
                implementations.push(signature);
            } else {
                overloads.push(signature);
            }
        }
        let call_signatures = if overloads.is_empty() {
            implementations
        } else {
            overloads
        };
        let mut members = AnonymousMembers::default();
        members.call_signatures = call_signatures;
        let id = self.types.new_type(
            TypeFlags::OBJECT,
            ObjectFlags::ANONYMOUS,
            TypeKind::Object(ObjectKind::Anonymous(Box::new(members))),
        );
        self.types.get_mut(id).symbol = Some(symbol);
        id
    }

    pub(crate) fn get_signature_from_declaration(
        &mut self,
        type_parameters: Option<&'a [TypeParameterDeclaration<'a>]>,
        parameters: &'a [ParameterDeclaration<'a>],
        return_type: Option<&'a TypeNode<'a>>,
        body: Option<&'a Block<'a>>,
        node_id: NodeId,
    ) -> SignatureId {
        let pushed = self.push_type_parameters(type_parameters);
        let type_params = pushed.clone().unwrap_or_default();

        let mut flags = SignatureFlags::NONE;
        let mut min_argument_count = 0u32;
        let mut params: Vec<SignatureParameter> = Vec::with_capacity(parameters.len());
        for param in parameters.iter() {
            let ty = match param.type_annotation {
                Some(annotation) => self.get_type_from_type_node(annotation),
                None => match param.initializer {
                    Some(init) => {
                        let t = self.check_expression(init, crate::checker::CheckMode::NORMAL);
                        self.get_widened_type(t)
                    }
                    None => {
                        let pre_assigned = self
                            .binder
                            .node_symbols
                            .get(&param.data.id)
                            .copied()
                            .and_then(|s| self.links(s).resolved_type);
                        match pre_assigned {
                            Some(t) => t,
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
                        }
                    }
                },
            };
            if self.types.flags(ty).intersects(TypeFlags::LITERAL) {
                flags |= SignatureFlags::HAS_LITERAL_TYPES;
            }
            let optional = param.question || param.initializer.is_some();
            if param.dot_dot_dot {
                flags |= SignatureFlags::HAS_REST_PARAMETER;
            } else if !optional {
                min_argument_count += 1;
            }
            if let Some(symbol) = self.binder.node_symbols.get(&param.data.id).copied() {
                let resolved = if param.question {
                    let undefined = self.types.undefined_type;
                    self.get_union_type(vec![ty, undefined])
                } else {
                    ty
                };
                let links = self.links(symbol);
                if links.resolved_type.is_none() {
                    links.resolved_type = Some(resolved);
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

        let return_type = match return_type {
            Some(annotation) => self.get_type_from_type_node(annotation),
            None => match body {
                Some(body) => self.infer_return_type_from_body(body, node_id),
                None => self.types.any_type,
            },
        };

        self.pop_type_parameters(pushed);
        let signature = self.alloc_signature(Signature {
            flags,
            type_params,
            params,
            min_argument_count,
            return_type,
            declaration: Some(node_id),
            target: None,
            mapper: None,
        });
        self.node_signatures.insert(node_id, signature);
        signature
    }

    /// Infer a function's return type from its return expressions, guarded
    /// against recursion through calls to the function itself.
    fn infer_return_type_from_body(&mut self, body: &'a Block<'a>, node_id: NodeId) -> TypeId {
        if !self.push_type_resolution(ResolutionKey::ReturnType(node_id)) {
            return self.types.any_type;
        }
        self.scope_stack.push(node_id);
        let mut returns: Vec<TypeId> = Vec::new();
        collect_return_expressions(body, &mut |expr| {
            let t = self.check_expression(expr, crate::checker::CheckMode::NORMAL);
            let widened = self.get_widened_type(t);
            returns.push(widened);
        });
        self.scope_stack.pop();
        let ok = self.pop_type_resolution();
        if !ok {
            return self.types.any_type;
        }
        if returns.is_empty() {
            self.types.void_type
        } else {
            self.get_union_type(returns)
        }
    }

    /// Class value (constructor-side) type: construct signatures returning
    /// the instance type, plus static members.
    fn get_type_of_class_symbol(&mut self, symbol: SymbolId, node: &'a ClassDeclaration<'a>) -> TypeId {
        let instance = self.get_declared_type_of_symbol(symbol);
        let mut construct_signatures: Vec<SignatureId> = Vec::new();
        for member in node.members.iter() {
            if let ClassElement::Constructor(ctor) = member {
                let pushed = self.push_symbol_type_param_scope(symbol);
                let mut min_argument_count = 0u32;
                let mut flags = SignatureFlags::CONSTRUCT;
                let mut params = Vec::new();
                for param in ctor.parameters.iter() {
                    let ty = param
                        .type_annotation
                        .map(|t| self.get_type_from_type_node(t))
                        .unwrap_or(self.types.any_type);
                    let optional = param.question || param.initializer.is_some();
                    if param.dot_dot_dot {
                        flags |= SignatureFlags::HAS_REST_PARAMETER;
                    } else if !optional {
                        min_argument_count += 1;
                    }
                    if let Some(param_symbol) =
                        self.binder.node_symbols.get(&param.data.id).copied()
                    {
                        let links = self.links(param_symbol);
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
                if pushed {
                    self.type_param_scopes.pop();
                }
                construct_signatures.push(self.alloc_signature(Signature {
                    flags,
                    type_params: Vec::new(),
                    params,
                    min_argument_count,
                    return_type: instance,
                    declaration: Some(ctor.data.id),
                    target: None,
                    mapper: None,
                }));
            }
        }
        // A derived class without its own constructor inherits the base
        // class's construct signatures, retargeted at this instance type.
        if construct_signatures.is_empty() {
            if let Some(extends) = node.extends {
                if let Expression::Identifier(ident) = *extends.expression.skip_parens() {
                    if let Some(base_symbol) = self.resolve_name(ident.text) {
                        let base_symbol = self.resolve_alias_if_needed(base_symbol);
                        if self.symbol_flags(base_symbol).contains(SymbolFlags::CLASS) {
                            let base_value = self.get_type_of_symbol(base_symbol);
                            let base_members = self.resolve_structured_members(base_value);
                            let base_signatures = base_members.construct_signatures.clone();
                            for base_signature in base_signatures {
                                let mut inherited = self.signature(base_signature).clone();
                                inherited.return_type = instance;
                                construct_signatures.push(self.alloc_signature(inherited));
                            }
                        }
                    }
                }
            }
        }
        if construct_signatures.is_empty() {
            // Implicit default constructor.
            construct_signatures.push(self.alloc_signature(Signature {
                flags: SignatureFlags::CONSTRUCT,
                type_params: Vec::new(),
                params: Vec::new(),
                min_argument_count: 0,
                return_type: instance,
                declaration: None,
                target: None,
                mapper: None,
            }));
        }
        let mut members = AnonymousMembers::default();
        members.construct_signatures = construct_signatures;
        if let Some(exports) = self.binder.symbols.get(symbol).exports.clone() {
            for (name, static_symbol) in exports.iter() {
                members.properties.insert(*name, *static_symbol);
            }
        }
        let id = self.types.new_type(
            TypeFlags::OBJECT,
            ObjectFlags::ANONYMOUS,
            TypeKind::Object(ObjectKind::Anonymous(Box::new(members))),
        );
        self.types.get_mut(id).symbol = Some(symbol);
        id
    }

    /// Enum and namespace value types: an object whose properties are the
    /// container's exports.
    fn get_container_object_type(&mut self, symbol: SymbolId) -> TypeId {
        let mut members = AnonymousMembers::default();
        if let Some(exports) = self.binder.symbols.get(symbol).exports.clone() {
            for (name, export) in exports.iter() {
                members.properties.insert(*name, *export);
            }
        }
        let id = self.types.new_type(
            TypeFlags::OBJECT,
            ObjectFlags::ANONYMOUS,
            TypeKind::Object(ObjectKind::Anonymous(Box::new(members))),
        );
        self.types.get_mut(id).symbol = Some(symbol);
        id
    }

    // ========================================================================
    // Enum machinery
    // ========================================================================

    pub(crate) fn compute_enum_member_values(&mut self, enum_symbol: SymbolId) {
        if self.links(enum_symbol).enum_value.is_some() {
            return;
        }
        if !self.push_type_resolution(ResolutionKey::EnumValues(enum_symbol)) {
            return;
        }
        let declarations = self.binder.symbols.get(enum_symbol).declarations.clone();
        for decl_id in declarations {
            let Some(tycheck_binder::DeclRef::Enum(node)) =
                self.binder.decls.get(&decl_id).copied()
            else {
                continue;
            };
            let mut previous: Option<EnumValue> = None;
            for member in node.members.iter() {
                let value = match member.initializer {
                    Some(init) => self.evaluate_enum_initializer(init, enum_symbol),
                    None => match &previous {
                        None => EnumValue::Number(0.0),
                        Some(EnumValue::Number(n)) => EnumValue::Number(n + 1.0),
                        Some(_) => {
                            // Auto-increment after a non-numeric member.
                            self.error(
                                member.data.range,
                                &messages::ENUM_MEMBER_MUST_HAVE_INITIALIZER,
                                &[],
                            );
                            EnumValue::Unknown
                        }
                    },
                };
                previous = Some(value.clone());
                if let Some(member_symbol) =
                    self.binder.node_symbols.get(&member.data.id).copied()
                {
                    self.links(member_symbol).enum_value = Some(value);
                }
            }
        }
        self.pop_type_resolution();
        self.links(enum_symbol).enum_value = Some(EnumValue::Unknown);
    }

    fn evaluate_enum_initializer(
        &mut self,
        expr: &'a Expression<'a>,
        enum_symbol: SymbolId,
    ) -> EnumValue {
        match *expr.skip_parens() {
            Expression::NumericLiteral(n) => EnumValue::Number(n.value),
            Expression::StringLiteral(s) => EnumValue::String(s.value.clone()),
            Expression::PrefixUnary(u) if u.operator == SyntaxKind::MinusToken => {
                if let Expression::NumericLiteral(n) = *u.operand.skip_parens() {
                    EnumValue::Number(-n.value)
                } else {
                    EnumValue::Unknown
                }
            }
            Expression::Identifier(ident) => {
                // Reference to a previously evaluated member of this enum.
                let exports = self.binder.symbols.get(enum_symbol).exports.clone();
                if let Some(exports) = exports {
                    if let Some(member) = exports.get(&ident.text) {
                        if let Some(value) = self.links(member).enum_value.clone() {
                            return value;
                        }
                    }
                }
                EnumValue::Unknown
            }
            Expression::Binary(b) => {
                let left = self.evaluate_enum_initializer(b.left, enum_symbol);
                let right = self.evaluate_enum_initializer(b.right, enum_symbol);
                match (left, right) {
                    (EnumValue::Number(l), EnumValue::Number(r)) => match b.operator {
                        SyntaxKind::PlusToken => EnumValue::Number(l + r),
                        SyntaxKind::MinusToken => EnumValue::Number(l - r),
                        SyntaxKind::AsteriskToken => EnumValue::Number(l * r),
                        SyntaxKind::SlashToken => EnumValue::Number(l / r),
                        SyntaxKind::LessThanLessThanToken => {
                            EnumValue::Number((((l as i64) << (r as i64)) & 0xFFFF_FFFF) as f64)
                        }
                        SyntaxKind::BarToken => EnumValue::Number(((l as i64) | (r as i64)) as f64),
                        SyntaxKind::AmpersandToken => {
                            EnumValue::Number(((l as i64) & (r as i64)) as f64)
                        }
                        _ => EnumValue::Unknown,
                    },
                    (EnumValue::String(l), EnumValue::String(r))
                        if b.operator == SyntaxKind::PlusToken =>
                    {
                        EnumValue::String(format!("{}{}", l, r))
                    }
                    _ => EnumValue::Unknown,
                }
            }
            _ => EnumValue::Unknown,
        }
    }

    fn get_enum_member_type(&mut self, member_symbol: SymbolId) -> TypeId {
        if let Some(parent) = self.binder.symbols.get(member_symbol).parent {
            self.compute_enum_member_values(parent);
        }
        let value = self
            .links(member_symbol)
            .enum_value
            .clone()
            .unwrap_or(EnumValue::Unknown);
        if let Some(&cached) = self.types.enum_literal_cache.get(&member_symbol) {
            return cached;
        }
        let kind = match value {
            EnumValue::Number(n) => TypeKind::NumberLiteral { value: n },
            EnumValue::String(s) => TypeKind::StringLiteral { value: s },
            EnumValue::Unknown => TypeKind::NumberLiteral { value: f64::NAN },
        };
        let flags = match &kind {
            TypeKind::StringLiteral { .. } => TypeFlags::STRING_LITERAL | TypeFlags::ENUM_LITERAL,
            _ => TypeFlags::NUMBER_LITERAL | TypeFlags::ENUM_LITERAL,
        };
        let id = self.types.new_type(flags, ObjectFlags::NONE, kind);
        self.types.get_mut(id).symbol = Some(member_symbol);
        self.types.enum_literal_cache.insert(member_symbol, id);
        id
    }

    // ========================================================================
    // Declared types
    // ========================================================================

    pub fn get_declared_type_of_symbol(&mut self, symbol: SymbolId) -> TypeId {
        let symbol = self.resolve_alias_if_needed(symbol);
        if let Some(t) = self.links(symbol).declared_type {
            return t;
        }
        let flags = self.symbol_flags(symbol);
        if flags.intersects(SymbolFlags::CLASS | SymbolFlags::INTERFACE) {
            return self.get_declared_type_of_class_or_interface(symbol);
        }
        if flags.contains(SymbolFlags::TYPE_ALIAS) {
            return self.get_declared_type_of_type_alias(symbol);
        }
        if flags.intersects(SymbolFlags::ENUM) {
            return self.get_declared_type_of_enum(symbol);
        }
        if flags.contains(SymbolFlags::ENUM_MEMBER) {
            return self.get_enum_member_type(symbol);
        }
        self.types.error_type
    }

    /// Class/interface declared types are self-referential placeholders:
    /// the interface type is created and cached on the symbol before any
    /// base or member resolution, so recursive shapes resolve.
    fn get_declared_type_of_class_or_interface(&mut self, symbol: SymbolId) -> TypeId {
        let declarations = self.binder.symbols.get(symbol).declarations.clone();
        let mut param_decls: Option<&'a [TypeParameterDeclaration<'a>]> = None;
        let mut is_class = false;
        let mut param_counts: Vec<usize> = Vec::new();
        for decl_id in &declarations {
            match self.binder.decls.get(decl_id).copied() {
                Some(tycheck_binder::DeclRef::Class(node)) => {
                    is_class = true;
                    param_counts.push(node.type_parameters.map_or(0, |p| p.len()));
                    if param_decls.is_none() {
                        param_decls = node.type_parameters;
                    }
                }
                Some(tycheck_binder::DeclRef::Interface(node)) => {
                    param_counts.push(node.type_parameters.map_or(0, |p| p.len()));
                    if param_decls.is_none() {
                        param_decls = node.type_parameters;
                    }
                }
                _ => {}
            }
        }
        // Merged declarations must agree on their type parameter lists; a
        // single shared list serves every declaration.
        if param_counts.windows(2).any(|w| w[0] != w[1]) {
            let name = self.symbol_name(symbol);
            self.diagnostics.add(tycheck_diagnostics::Diagnostic::new(
                &messages::ALL_DECLARATIONS_OF_0_MUST_HAVE_IDENTICAL_TYPE_PARAMETERS,
                &[&name],
            ));
        }

        let type_params: Vec<TypeId> = match param_decls {
            Some(decls) => {
                let params = self.create_type_parameters(decls);
                self.type_param_scopes.pop();
                params
            }
            None => Vec::new(),
        };
        let this_type = if is_class || !type_params.is_empty() {
            let this = self.types.new_type(
                TypeFlags::TYPE_PARAMETER,
                ObjectFlags::NONE,
                TypeKind::TypeParameter {
                    name: "this".to_string(),
                    is_this: true,
                },
            );
            self.param_constraints.insert(this, None);
            Some(this)
        } else {
            None
        };
        let object_flags = if is_class {
            ObjectFlags::CLASS
        } else {
            ObjectFlags::INTERFACE
        };
        let declared = self.types.new_type(
            TypeFlags::OBJECT,
            object_flags,
            TypeKind::Object(ObjectKind::Interface {
                type_params: type_params.clone(),
                this_type,
            }),
        );
        self.types.get_mut(declared).symbol = Some(symbol);
        // Cache before touching bases or members.
        self.links(symbol).declared_type = Some(declared);
        self.links(symbol).type_params = Some(type_params);
        declared
    }

    fn get_declared_type_of_type_alias(&mut self, symbol: SymbolId) -> TypeId {
        if !self.push_type_resolution(ResolutionKey::DeclaredType(symbol)) {
            let name = self.symbol_name(symbol);
            self.diagnostics.add(tycheck_diagnostics::Diagnostic::new(
                &messages::TYPE_ALIAS_0_CIRCULARLY_REFERENCES_ITSELF,
                &[&name],
            ));
            let error = self.types.error_type;
            self.links(symbol).declared_type = Some(error);
            return error;
        }
        let decl = self
            .binder
            .symbols
            .get(symbol)
            .declarations
            .first()
            .and_then(|id| self.binder.decls.get(id).copied());
        let result = match decl {
            Some(tycheck_binder::DeclRef::TypeAlias(node)) => {
                let pushed = self.push_type_parameters(node.type_parameters);
                if let Some(params) = &pushed {
                    self.links(symbol).type_params = Some(params.clone());
                }
                let body = self.get_type_from_type_node(node.type_node);
                self.pop_type_parameters(pushed);
                body
            }
            _ => self.types.error_type,
        };
        let ok = self.pop_type_resolution();
        let result = if ok { result } else { self.types.error_type };
        let links = self.links(symbol);
        if links.declared_type.is_none() {
            links.declared_type = Some(result);
        }
        links.declared_type.unwrap()
    }

    /// An enum's declared type is the union of its member literal types
    /// when every member value is statically known, an opaque enum type
    /// otherwise.
    fn get_declared_type_of_enum(&mut self, symbol: SymbolId) -> TypeId {
        self.compute_enum_member_values(symbol);
        let exports = self.binder.symbols.get(symbol).exports.clone();
        let mut member_types: Vec<TypeId> = Vec::new();
        let mut all_known = true;
        if let Some(exports) = &exports {
            for (_, member) in exports.iter() {
                match self.links(*member).enum_value.clone() {
                    Some(EnumValue::Unknown) | None => {
                        all_known = false;
                    }
                    Some(_) => {}
                }
                member_types.push(self.get_enum_member_type(*member));
            }
        }
        let declared = if all_known && !member_types.is_empty() {
            self.get_union_type_ex(member_types, crate::types::UnionReduction::None)
        } else {
            let opaque = self.types.new_type(
                TypeFlags::ENUM,
                ObjectFlags::NONE,
                TypeKind::Intrinsic { name: "enum" },
            );
            self.types.get_mut(opaque).symbol = Some(symbol);
            opaque
        };
        self.links(symbol).declared_type = Some(declared);
        declared
    }

    // ========================================================================
    // Structured member resolution
    // ========================================================================

    pub(crate) fn resolve_structured_members(&mut self, t: TypeId) -> Rc<ResolvedMembers> {
        if let Some(cached) = self.resolved_members.get(&t) {
            return Rc::clone(cached);
        }
        // Seed with an empty entry so self-referential member resolution
        // terminates; the final value replaces it below.
        self.resolved_members.insert(t, Rc::new(ResolvedMembers::default()));
        let resolved = self.resolve_structured_members_worker(t);
        let rc = Rc::new(resolved);
        self.resolved_members.insert(t, Rc::clone(&rc));
        rc
    }

    fn resolve_structured_members_worker(&mut self, t: TypeId) -> ResolvedMembers {
        match self.types.get(t).kind.clone() {
            TypeKind::Object(ObjectKind::Anonymous(members)) => ResolvedMembers {
                properties: members.properties.clone(),
                call_signatures: members.call_signatures.clone(),
                construct_signatures: members.construct_signatures.clone(),
                index_infos: members.index_infos.clone(),
            },
            TypeKind::Object(ObjectKind::Interface { .. }) => {
                let Some(symbol) = self.types.get(t).symbol else {
                    return ResolvedMembers::default();
                };
                self.resolve_interface_members(symbol)
            }
            TypeKind::Object(ObjectKind::Reference { target, type_args }) => {
                self.resolve_reference_members(t, target, type_args)
            }
            TypeKind::Object(ObjectKind::Mapped {
                type_param,
                constraint,
                template,
                readonly_modifier,
                question_modifier,
            }) => {
                let applied = self.get_mapped_type(
                    type_param,
                    constraint,
                    template,
                    readonly_modifier,
                    question_modifier,
                );
                if applied == t {
                    ResolvedMembers::default()
                } else {
                    (*self.resolve_structured_members(applied)).clone()
                }
            }
            TypeKind::Union { types } => self.resolve_union_members(&types),
            TypeKind::Intersection { types } => self.resolve_intersection_members(&types),
            _ => ResolvedMembers::default(),
        }
    }

    fn resolve_interface_members(&mut self, symbol: SymbolId) -> ResolvedMembers {
        let mut resolved = ResolvedMembers::default();
        let member_table = self.binder.symbols.get(symbol).members.clone();
        if let Some(table) = member_table {
            for (name, member) in table.iter() {
                let name_text = self.interner.resolve(*name);
                match name_text {
                    "__call" | "__new" | "__index" | "__constructor" => {}
                    _ => {
                        resolved.properties.insert(*name, *member);
                    }
                }
            }
            // Call/construct/index pseudo-members expand into signatures.
            let call_name = self.interner.intern_static("__call");
            let new_name = self.interner.intern_static("__new");
            let index_name = self.interner.intern_static("__index");
            if let Some(call_symbol) = table.get(&call_name) {
                resolved.call_signatures = self.signatures_of_signature_symbol(call_symbol);
            }
            if let Some(new_symbol) = table.get(&new_name) {
                resolved.construct_signatures = self.signatures_of_signature_symbol(new_symbol);
            }
            if let Some(index_symbol) = table.get(&index_name) {
                resolved.index_infos = self.index_infos_of_symbol(index_symbol);
            }
        }
        // Base interfaces/classes contribute members the declaration does
        // not redeclare.
        let bases = self.resolve_base_types(symbol);
        for base in bases {
            let base_members = self.resolve_structured_members(base);
            let base_props: Vec<_> = base_members
                .properties
                .iter()
                .map(|(n, s)| (*n, *s))
                .collect();
            for (name, prop) in base_props {
                resolved.properties.entry(name).or_insert(prop);
            }
            resolved
                .call_signatures
                .extend(base_members.call_signatures.iter().copied());
            resolved
                .construct_signatures
                .extend(base_members.construct_signatures.iter().copied());
            for info in base_members.index_infos.iter() {
                resolved.index_infos.push(info.clone());
            }
        }
        resolved
    }

    /// Base types of a class/interface symbol, guarded against a type
    /// recursively extending itself.
    fn resolve_base_types(&mut self, symbol: SymbolId) -> Vec<TypeId> {
        let declarations = self.binder.symbols.get(symbol).declarations.clone();
        let own_declared = self.links(symbol).declared_type;
        let mut bases = Vec::new();
        for decl_id in declarations {
            let heritage: Vec<&'a ExpressionWithTypeArguments<'a>> =
                match self.binder.decls.get(&decl_id).copied() {
                    Some(tycheck_binder::DeclRef::Interface(node)) => node.extends.iter().collect(),
                    Some(tycheck_binder::DeclRef::Class(node)) => {
                        node.extends.into_iter().collect()
                    }
                    _ => continue,
                };
            for entry in heritage {
                let pushed = self.push_symbol_type_param_scope(symbol);
                let base = self.resolve_heritage_type(entry, symbol);
                if pushed {
                    self.type_param_scopes.pop();
                }
                if Some(base) == own_declared {
                    let name = self.symbol_name(symbol);
                    self.error(
                        entry.data.range,
                        &messages::TYPE_0_RECURSIVELY_REFERENCES_ITSELF_AS_A_BASE_TYPE,
                        &[&name],
                    );
                    continue;
                }
                if !self.types.is_error(base) {
                    bases.push(base);
                }
            }
        }
        bases
    }

    fn resolve_heritage_type(
        &mut self,
        entry: &'a ExpressionWithTypeArguments<'a>,
        _owner: SymbolId,
    ) -> TypeId {
        let Expression::Identifier(ident) = *entry.expression.skip_parens() else {
            return self.types.error_type;
        };
        let Some(symbol) = self.resolve_name(ident.text) else {
            return self.types.error_type;
        };
        let symbol = self.resolve_alias_if_needed(symbol);
        let declared = self.get_declared_type_of_symbol(symbol);
        match entry.type_arguments {
            Some(args) => {
                let arg_types: Vec<TypeId> = args
                    .iter()
                    .map(|a| self.get_type_from_type_node(a))
                    .collect();
                self.instantiate_generic_declared_type(symbol, declared, arg_types, entry.data.range)
            }
            None => declared,
        }
    }

    fn signatures_of_signature_symbol(&mut self, symbol: SymbolId) -> Vec<SignatureId> {
        let declarations = self.binder.symbols.get(symbol).declarations.clone();
        let mut signatures = Vec::new();
        for decl_id in declarations {
            match self.binder.decls.get(&decl_id).copied() {
                Some(tycheck_binder::DeclRef::CallSig(node)) => {
                    let signature = self.with_member_scope(symbol, |c| {
                        c.get_signature_from_declaration(
                            node.type_parameters,
                            node.parameters,
                            node.return_type,
                            None,
                            node.data.id,
                        )
                    });
                    signatures.push(signature);
                }
                Some(tycheck_binder::DeclRef::CtorSig(node)) => {
                    let signature = self.with_member_scope(symbol, |c| {
                        c.get_signature_from_declaration(
                            node.type_parameters,
                            node.parameters,
                            node.return_type,
                            None,
                            node.data.id,
                        )
                    });
                    let id = signature;
                    self.signatures[id.index()].flags |= SignatureFlags::CONSTRUCT;
                    signatures.push(id);
                }
                _ => {}
            }
        }
        signatures
    }

    fn index_infos_of_symbol(&mut self, symbol: SymbolId) -> Vec<IndexInfo> {
        let declarations = self.binder.symbols.get(symbol).declarations.clone();
        let mut infos = Vec::new();
        for decl_id in declarations {
            if let Some(tycheck_binder::DeclRef::IndexSig(node)) =
                self.binder.decls.get(&decl_id).copied()
            {
                let key_type = node
                    .parameter
                    .type_annotation
                    .map(|t| self.with_member_scope(symbol, |c| c.get_type_from_type_node(t)))
                    .unwrap_or(self.types.string_type);
                let value_type =
                    self.with_member_scope(symbol, |c| c.get_type_from_type_node(node.type_annotation));
                infos.push(IndexInfo {
                    key_type,
                    value_type,
                    is_readonly: node.readonly,
                    declaration: Some(node.data.id),
                });
            }
        }
        infos
    }

    fn resolve_reference_members(
        &mut self,
        reference: TypeId,
        target: TypeId,
        type_args: Vec<TypeId>,
    ) -> ResolvedMembers {
        // Arrays and tuples synthesize their members.
        if let Some((array_target, element_param)) = self.array_target {
            if target == array_target {
                let element = type_args.first().copied().unwrap_or(self.types.any_type);
                return self.array_members(element, element_param);
            }
        }
        if let TypeKind::Object(ObjectKind::Tuple {
            element_flags,
            type_params,
            ..
        }) = self.types.get(target).kind.clone()
        {
            let _ = type_params;
            return self.tuple_members(reference, &type_args, &element_flags);
        }
        let target_params: Vec<TypeId> = match &self.types.get(target).kind {
            TypeKind::Object(ObjectKind::Interface { type_params, .. }) => type_params.clone(),
            _ => Vec::new(),
        };
        let base = self.resolve_structured_members(target);
        if target_params.is_empty() {
            return (*base).clone();
        }
        let mapper = TypeMapper::new(target_params, type_args);
        let mut resolved = ResolvedMembers::default();
        let props: Vec<_> = base.properties.iter().map(|(n, s)| (*n, *s)).collect();
        for (name, prop) in props {
            let instantiated = self.instantiate_symbol(prop, &mapper);
            resolved.properties.insert(name, instantiated);
        }
        for &signature in &base.call_signatures {
            resolved
                .call_signatures
                .push(self.instantiate_signature(signature, &mapper));
        }
        for &signature in &base.construct_signatures {
            resolved
                .construct_signatures
                .push(self.instantiate_signature(signature, &mapper));
        }
        let infos = base.index_infos.clone();
        for info in infos {
            let value_type = self.instantiate_type(info.value_type, &mapper);
            resolved.index_infos.push(IndexInfo {
                key_type: info.key_type,
                value_type,
                is_readonly: info.is_readonly,
                declaration: info.declaration,
            });
        }
        resolved
    }

    /// Properties present on every constituent surface on the union, with
    /// their types unioned; one missing occurrence hides the property.
    fn resolve_union_members(&mut self, constituents: &[TypeId]) -> ResolvedMembers {
        let mut resolved = ResolvedMembers::default();
        let Some((&first, rest)) = constituents.split_first() else {
            return resolved;
        };
        let first_apparent = self.get_apparent_type(first);
        let first_members = self.resolve_structured_members(first_apparent);
        let names: Vec<InternedString> = first_members.properties.keys().copied().collect();
        'names: for name in names {
            let mut types = Vec::with_capacity(constituents.len());
            let mut optional = false;
            for &constituent in std::iter::once(&first).chain(rest.iter()) {
                let apparent = self.get_apparent_type(constituent);
                let members = self.resolve_structured_members(apparent);
                match members.properties.get(&name).copied() {
                    Some(prop) => {
                        optional |= self.binder.symbols.get(prop).is_optional();
                        types.push(self.get_type_of_symbol(prop));
                    }
                    None => continue 'names,
                }
            }
            let unioned = self.get_union_type(types);
            let name_text = self.interner.resolve(name).to_string();
            let synthesized = self.create_transient_property(name, &name_text, unioned, optional);
            self.binder.symbols.get_mut(synthesized).check_flags |= CheckFlags::SYNTHETIC_PROPERTY;
            resolved.properties.insert(name, synthesized);
        }
        resolved
    }

    fn resolve_intersection_members(&mut self, constituents: &[TypeId]) -> ResolvedMembers {
        let mut resolved = ResolvedMembers::default();
        for &constituent in constituents {
            let apparent = self.get_apparent_type(constituent);
            let members = self.resolve_structured_members(apparent);
            let props: Vec<_> = members.properties.iter().map(|(n, s)| (*n, *s)).collect();
            for (name, prop) in props {
                match resolved.properties.get(&name).copied() {
                    Some(existing) => {
                        let left = self.get_type_of_symbol(existing);
                        let right = self.get_type_of_symbol(prop);
                        let merged = self.get_intersection_type(vec![left, right]);
                        let name_text = self.interner.resolve(name).to_string();
                        let synthesized =
                            self.create_transient_property(name, &name_text, merged, false);
                        resolved.properties.insert(name, synthesized);
                    }
                    None => {
                        resolved.properties.insert(name, prop);
                    }
                }
            }
            resolved
                .call_signatures
                .extend(members.call_signatures.iter().copied());
            resolved
                .construct_signatures
                .extend(members.construct_signatures.iter().copied());
            for info in members.index_infos.iter() {
                resolved.index_infos.push(info.clone());
            }
        }
        resolved
    }

    pub(crate) fn create_transient_property(
        &mut self,
        name: InternedString,
        name_text: &str,
        ty: TypeId,
        optional: bool,
    ) -> SymbolId {
        let mut flags = SymbolFlags::PROPERTY | SymbolFlags::TRANSIENT;
        if optional {
            flags |= SymbolFlags::OPTIONAL;
        }
        let symbol = self.binder.symbols.alloc(name, name_text.to_string(), flags);
        self.links(symbol).resolved_type = Some(ty);
        symbol
    }

    pub(crate) fn get_property_of_type(
        &mut self,
        t: TypeId,
        name: InternedString,
    ) -> Option<SymbolId> {
        let members = self.resolve_structured_members(t);
        members.properties.get(&name).copied()
    }

    // ========================================================================
    // Synthesized globals
    // ========================================================================

    fn array_members(&mut self, element: TypeId, _element_param: TypeId) -> ResolvedMembers {
        let mut resolved = ResolvedMembers::default();
        let number = self.types.number_type;
        let string = self.types.string_type;
        let boolean = self.types.boolean_type;
        let undefined = self.types.undefined_type;
        let void = self.types.void_type;
        let array_of_element = self.create_array_type(element);
        let element_or_undefined = self.get_union_type(vec![element, undefined]);

        let mut add_prop = |checker: &mut Self, name: &str, ty: TypeId| {
            let interned = checker.interner.intern(name);
            let symbol = checker.create_transient_property(interned, name, ty, false);
            resolved.properties.insert(interned, symbol);
        };
        add_prop(self, "length", number);

        let mut add_method =
            |checker: &mut Self,
             name: &str,
             params: Vec<(&str, TypeId, bool)>,
             rest: Option<(&str, TypeId)>,
             return_type: TypeId| {
                let mut signature_params: Vec<SignatureParameter> = Vec::new();
                let mut min_args = 0u32;
                let mut flags = SignatureFlags::NONE;
                for (param_name, ty, optional) in &params {
                    if !optional {
                        min_args += 1;
                    }
                    signature_params.push(SignatureParameter {
                        name: checker.interner.intern(param_name),
                        name_text: param_name.to_string(),
                        ty: *ty,
                        optional: *optional,
                        rest: false,
                    });
                }
                if let Some((rest_name, rest_ty)) = rest {
                    flags |= SignatureFlags::HAS_REST_PARAMETER;
                    signature_params.push(SignatureParameter {
                        name: checker.interner.intern(rest_name),
                        name_text: rest_name.to_string(),
                        ty: rest_ty,
                        optional: false,
                        rest: true,
                    });
                }
                let signature = checker.alloc_signature(Signature {
                    flags,
                    type_params: Vec::new(),
                    params: signature_params,
                    min_argument_count: min_args,
                    return_type,
                    declaration: None,
                    target: None,
                    mapper: None,
                });
                let mut members = AnonymousMembers::default();
                members.call_signatures.push(signature);
                let method_type = checker.types.new_type(
                    TypeFlags::OBJECT,
                    ObjectFlags::ANONYMOUS,
                    TypeKind::Object(ObjectKind::Anonymous(Box::new(members))),
                );
                let interned = checker.interner.intern(name);
                let symbol = checker.create_transient_property(interned, name, method_type, false);
                resolved.properties.insert(interned, symbol);
            };

        add_method(self, "push", vec![], Some(("items", array_of_element)), number);
        add_method(self, "pop", vec![], None, element_or_undefined);
        add_method(self, "indexOf", vec![("searchElement", element, false)], None, number);
        add_method(self, "includes", vec![("searchElement", element, false)], None, boolean);
        add_method(
            self,
            "slice",
            vec![("start", number, true), ("end", number, true)],
            None,
            array_of_element,
        );
        add_method(self, "concat", vec![], Some(("items", array_of_element)), array_of_element);
        add_method(self, "join", vec![("separator", string, true)], None, string);

        // forEach/map/filter take callbacks; map is generic over its
        // result type.
        let callback_void = self.make_function_type(vec![("value", element)], void);
        add_method(self, "forEach", vec![("callbackfn", callback_void, false)], None, void);
        let predicate = self.make_function_type(vec![("value", element)], boolean);
        add_method(self, "filter", vec![("predicate", predicate, false)], None, array_of_element);
        let map_result = self.types.new_type(
            TypeFlags::TYPE_PARAMETER,
            ObjectFlags::NONE,
            TypeKind::TypeParameter {
                name: "U".to_string(),
                is_this: false,
            },
        );
        self.param_constraints.insert(map_result, None);
        let mapper_fn = self.make_function_type(vec![("value", element)], map_result);
        let mapped_array = self.create_array_type(map_result);
        let map_signature = self.alloc_signature(Signature {
            flags: SignatureFlags::NONE,
            type_params: vec![map_result],
            params: vec![SignatureParameter {
                name: self.interner.intern_static("callbackfn"),
                name_text: "callbackfn".to_string(),
                ty: mapper_fn,
                optional: false,
                rest: false,
            }],
            min_argument_count: 1,
            return_type: mapped_array,
            declaration: None,
            target: None,
            mapper: None,
        });
        let mut map_members = AnonymousMembers::default();
        map_members.call_signatures.push(map_signature);
        let map_type = self.types.new_type(
            TypeFlags::OBJECT,
            ObjectFlags::ANONYMOUS,
            TypeKind::Object(ObjectKind::Anonymous(Box::new(map_members))),
        );
        let map_name = self.interner.intern_static("map");
        let map_symbol = self.create_transient_property(map_name, "map", map_type, false);
        resolved.properties.insert(map_name, map_symbol);

        resolved.index_infos.push(IndexInfo {
            key_type: number,
            value_type: element,
            is_readonly: false,
            declaration: None,
        });
        resolved
    }

    pub(crate) fn make_function_type(
        &mut self,
        params: Vec<(&str, TypeId)>,
        return_type: TypeId,
    ) -> TypeId {
        let signature_params: Vec<SignatureParameter> = params
            .iter()
            .map(|(name, ty)| SignatureParameter {
                name: self.interner.intern(name),
                name_text: name.to_string(),
                ty: *ty,
                optional: false,
                rest: false,
            })
            .collect();
        let min = signature_params.len() as u32;
        let signature = self.alloc_signature(Signature {
            flags: SignatureFlags::NONE,
            type_params: Vec::new(),
            params: signature_params,
            min_argument_count: min,
            return_type,
            declaration: None,
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

    fn tuple_members(
        &mut self,
        _reference: TypeId,
        type_args: &[TypeId],
        element_flags: &[ElementFlags],
    ) -> ResolvedMembers {
        let mut resolved = ResolvedMembers::default();
        let number = self.types.number_type;
        for (i, &element) in type_args.iter().enumerate() {
            if element_flags
                .get(i)
                .map_or(false, |f| f.intersects(ElementFlags::VARIABLE))
            {
                continue;
            }
            let name_text = i.to_string();
            let name = self.interner.intern(&name_text);
            let optional = element_flags
                .get(i)
                .map_or(false, |f| f.contains(ElementFlags::OPTIONAL));
            let symbol = self.create_transient_property(name, &name_text, element, optional);
            resolved.properties.insert(name, symbol);
        }
        let fixed_count = element_flags
            .iter()
            .filter(|f| f.contains(ElementFlags::REQUIRED))
            .count();
        let has_variable = element_flags
            .iter()
            .any(|f| f.intersects(ElementFlags::VARIABLE));
        let length_type = if has_variable {
            number
        } else if element_flags.iter().all(|f| f.contains(ElementFlags::REQUIRED)) {
            self.get_number_literal_type(type_args.len() as f64)
        } else {
            let lengths: Vec<TypeId> = (fixed_count..=type_args.len())
                .map(|n| self.get_number_literal_type(n as f64))
                .collect();
            self.get_union_type(lengths)
        };
        let length_name = self.interner.intern_static("length");
        let length_symbol = self.create_transient_property(length_name, "length", length_type, false);
        resolved.properties.insert(length_name, length_symbol);

        if !type_args.is_empty() {
            let element_union = self.get_union_type(type_args.to_vec());
            resolved.index_infos.push(IndexInfo {
                key_type: number,
                value_type: element_union,
                is_readonly: false,
                declaration: None,
            });
        }
        resolved
    }

    pub(crate) fn global_string_members_type(&mut self) -> TypeId {
        if let Some(t) = self.string_members_type {
            return t;
        }
        let string = self.types.string_type;
        let number = self.types.number_type;
        let boolean = self.types.boolean_type;
        let mut members = AnonymousMembers::default();
        let length_name = self.interner.intern_static("length");
        let length = self.create_transient_property(length_name, "length", number, false);
        members.properties.insert(length_name, length);
        let methods: Vec<(&str, Vec<(&str, TypeId)>, TypeId)> = vec![
            ("charAt", vec![("pos", number)], string),
            ("indexOf", vec![("searchString", string)], number),
            ("includes", vec![("searchString", string)], boolean),
            ("startsWith", vec![("searchString", string)], boolean),
            ("endsWith", vec![("searchString", string)], boolean),
            ("toUpperCase", vec![], string),
            ("toLowerCase", vec![], string),
            ("trim", vec![], string),
        ];
        for (name, params, return_type) in methods {
            let method = self.make_function_type(params, return_type);
            let interned = self.interner.intern(name);
            let symbol = self.create_transient_property(interned, name, method, false);
            members.properties.insert(interned, symbol);
        }
        // slice takes optional bounds.
        let slice_signature = self.alloc_signature(Signature {
            flags: SignatureFlags::NONE,
            type_params: Vec::new(),
            params: vec![
                SignatureParameter {
                    name: self.interner.intern_static("start"),
                    name_text: "start".to_string(),
                    ty: number,
                    optional: true,
                    rest: false,
                },
                SignatureParameter {
                    name: self.interner.intern_static("end"),
                    name_text: "end".to_string(),
                    ty: number,
                    optional: true,
                    rest: false,
                },
            ],
            min_argument_count: 0,
            return_type: string,
            declaration: None,
            target: None,
            mapper: None,
        });
        let mut slice_members = AnonymousMembers::default();
        slice_members.call_signatures.push(slice_signature);
        let slice_type = self.types.new_type(
            TypeFlags::OBJECT,
            ObjectFlags::ANONYMOUS,
            TypeKind::Object(ObjectKind::Anonymous(Box::new(slice_members))),
        );
        let slice_name = self.interner.intern_static("slice");
        let slice_symbol = self.create_transient_property(slice_name, "slice", slice_type, false);
        members.properties.insert(slice_name, slice_symbol);

        let t = self.types.new_type(
            TypeFlags::OBJECT,
            ObjectFlags::ANONYMOUS,
            TypeKind::Object(ObjectKind::Anonymous(Box::new(members))),
        );
        self.string_members_type = Some(t);
        t
    }

    pub(crate) fn global_number_members_type(&mut self) -> TypeId {
        if let Some(t) = self.number_members_type {
            return t;
        }
        let string = self.types.string_type;
        let number = self.types.number_type;
        let mut members = AnonymousMembers::default();
        let methods: Vec<(&str, Vec<(&str, TypeId)>, TypeId)> = vec![
            ("toString", vec![], string),
            ("toFixed", vec![("fractionDigits", number)], string),
        ];
        for (name, params, return_type) in methods {
            let method = self.make_function_type(params, return_type);
            let interned = self.interner.intern(name);
            let symbol = self.create_transient_property(interned, name, method, false);
            members.properties.insert(interned, symbol);
        }
        let t = self.types.new_type(
            TypeFlags::OBJECT,
            ObjectFlags::ANONYMOUS,
            TypeKind::Object(ObjectKind::Anonymous(Box::new(members))),
        );
        self.number_members_type = Some(t);
        t
    }

    /// The `Function` interface shape used for untyped-call detection.
    pub(crate) fn global_function_type(&mut self) -> TypeId {
        if let Some(t) = self.global_function_type {
            return t;
        }
        let any = self.types.any_type;
        let string = self.types.string_type;
        let mut members = AnonymousMembers::default();
        for name in ["apply", "call", "bind"] {
            let interned = self.interner.intern(name);
            let symbol = self.create_transient_property(interned, name, any, false);
            members.properties.insert(interned, symbol);
        }
        let to_string = self.make_function_type(vec![], string);
        let interned = self.interner.intern_static("toString");
        let symbol = self.create_transient_property(interned, "toString", to_string, false);
        members.properties.insert(interned, symbol);
        let t = self.types.new_type(
            TypeFlags::OBJECT,
            ObjectFlags::ANONYMOUS,
            TypeKind::Object(ObjectKind::Anonymous(Box::new(members))),
        );
        self.global_function_type = Some(t);
        t
    }

    /// Synthesized `Promise<T>` with a `then` member; enough for awaited
    /// types and the missing-await heuristic.
    pub(crate) fn global_promise_target(&mut self) -> (TypeId, TypeId) {
        if let Some(pair) = self.promise_target {
            return pair;
        }
        let param = self.types.new_type(
            TypeFlags::TYPE_PARAMETER,
            ObjectFlags::NONE,
            TypeKind::TypeParameter {
                name: "T".to_string(),
                is_this: false,
            },
        );
        self.param_constraints.insert(param, None);
        let target = self.types.new_type(
            TypeFlags::OBJECT,
            ObjectFlags::INTERFACE | ObjectFlags::REFERENCE,
            TypeKind::Object(ObjectKind::Interface {
                type_params: vec![param],
                this_type: None,
            }),
        );
        // then(onfulfilled: (value: T) => any): Promise<T>
        let any = self.types.any_type;
        let callback = self.make_function_type(vec![("value", param)], any);
        let result = self.create_type_reference(target, vec![param]);
        let then_type = self.make_function_type(vec![("onfulfilled", callback)], result);
        let then_name = self.interner.intern_static("then");
        let then_symbol = self.create_transient_property(then_name, "then", then_type, false);
        let mut members = ResolvedMembers::default();
        members.properties.insert(then_name, then_symbol);
        self.resolved_members.insert(target, Rc::new(members));
        self.promise_target = Some((target, param));
        (target, param)
    }

    /// The type a `Promise`-shaped value resolves to, if it is one.
    pub(crate) fn get_promised_type(&mut self, t: TypeId) -> Option<TypeId> {
        if let Some((target, _)) = self.promise_target {
            if let TypeKind::Object(ObjectKind::Reference {
                target: reference_target,
                type_args,
            }) = &self.types.get(t).kind
            {
                if *reference_target == target {
                    return type_args.first().copied();
                }
            }
        }
        // A user-declared Promise-shaped reference with one argument.
        if let Some(symbol) = self.types.get(t).symbol {
            if self.symbol_name(symbol) == "Promise" {
                let args = self.get_type_arguments(t);
                return args.first().copied();
            }
        }
        None
    }

    pub(crate) fn get_awaited_type(&mut self, t: TypeId) -> TypeId {
        let mut current = t;
        // Unwrap nested promise layers.
        for _ in 0..10 {
            match self.get_promised_type(current) {
                Some(inner) => current = inner,
                None => break,
            }
        }
        current
    }

    // ========================================================================
    // Mapped types
    // ========================================================================

    /// Apply a mapped type when its constraint is concrete; defer it as a
    /// symbolic mapped object type otherwise.
    pub(crate) fn get_mapped_type(
        &mut self,
        type_param: TypeId,
        constraint: TypeId,
        template: Option<TypeId>,
        readonly_modifier: Option<bool>,
        question_modifier: Option<bool>,
    ) -> TypeId {
        if self
            .types
            .flags(constraint)
            .intersects(TypeFlags::INSTANTIABLE)
        {
            return self.types.new_type(
                TypeFlags::OBJECT,
                ObjectFlags::MAPPED,
                TypeKind::Object(ObjectKind::Mapped {
                    type_param,
                    constraint,
                    template,
                    readonly_modifier,
                    question_modifier,
                }),
            );
        }
        let keys = self.types.union_members(constraint);
        let mut members = AnonymousMembers::default();
        for key in keys {
            let key_flags = self.types.flags(key);
            if key_flags.contains(TypeFlags::NEVER) {
                continue;
            }
            let Some(name_text) = self.literal_text(key) else {
                // A non-literal key contributes an index signature.
                if key_flags.intersects(TypeFlags::STRING_LIKE | TypeFlags::NUMBER_LIKE) {
                    let value_type = match template {
                        Some(template) => {
                            let mapper = TypeMapper::new(vec![type_param], vec![key]);
                            self.instantiate_type(template, &mapper)
                        }
                        None => self.types.any_type,
                    };
                    members.index_infos.push(IndexInfo {
                        key_type: if key_flags.intersects(TypeFlags::NUMBER_LIKE) {
                            self.types.number_type
                        } else {
                            self.types.string_type
                        },
                        value_type,
                        is_readonly: readonly_modifier.unwrap_or(false),
                        declaration: None,
                    });
                }
                continue;
            };
            let property_type = match template {
                Some(template) => {
                    let mapper = TypeMapper::new(vec![type_param], vec![key]);
                    self.instantiate_type(template, &mapper)
                }
                None => self.types.any_type,
            };
            let optional = question_modifier == Some(true);
            let property_type = if optional && self.options.strict_null_checks() {
                let undefined = self.types.undefined_type;
                self.get_union_type(vec![property_type, undefined])
            } else {
                property_type
            };
            let name = self.interner.intern(&name_text);
            let symbol = self.create_transient_property(name, &name_text, property_type, optional);
            if readonly_modifier == Some(true) {
                self.binder.symbols.get_mut(symbol).check_flags |= CheckFlags::READONLY;
            }
            members.properties.insert(name, symbol);
        }
        self.types.new_type(
            TypeFlags::OBJECT,
            ObjectFlags::ANONYMOUS | ObjectFlags::MAPPED,
            TypeKind::Object(ObjectKind::Anonymous(Box::new(members))),
        )
    }

    // ========================================================================
    // Type nodes
    // ========================================================================

    pub fn get_type_from_type_node(&mut self, node: &'a TypeNode<'a>) -> TypeId {
        match *node {
            TypeNode::Keyword(keyword) => self.get_type_from_keyword(keyword),
            TypeNode::Literal(literal) => match &literal.literal {
                LiteralTypeKind::String(s) => self.get_string_literal_type(&s.value),
                LiteralTypeKind::Number(n) => self.get_number_literal_type(n.value),
                LiteralTypeKind::BigInt(b) => self.get_bigint_literal_type(&b.text),
                LiteralTypeKind::True => self.types.true_type,
                LiteralTypeKind::False => self.types.false_type,
                LiteralTypeKind::Null => self.types.null_type,
            },
            TypeNode::TypeReference(reference) => self.get_type_from_type_reference(reference),
            TypeNode::Union(union) => {
                let members: Vec<TypeId> = union
                    .types
                    .iter()
                    .map(|t| self.get_type_from_type_node(t))
                    .collect();
                self.get_union_type(members)
            }
            TypeNode::Intersection(intersection) => {
                let members: Vec<TypeId> = intersection
                    .types
                    .iter()
                    .map(|t| self.get_type_from_type_node(t))
                    .collect();
                self.get_intersection_type(members)
            }
            TypeNode::Array(array) => {
                let element = self.get_type_from_type_node(array.element_type);
                self.create_array_type(element)
            }
            TypeNode::Tuple(tuple) => self.get_type_from_tuple_node(tuple),
            TypeNode::Optional(optional) => self.get_type_from_type_node(optional.type_node),
            TypeNode::Rest(rest) => self.get_type_from_type_node(rest.type_node),
            TypeNode::NamedTupleMember(member) => self.get_type_from_type_node(member.type_node),
            TypeNode::Paren(paren) => self.get_type_from_type_node(paren.type_node),
            TypeNode::Function(function) => {
                let signature = self.get_signature_from_declaration(
                    function.type_parameters,
                    function.parameters,
                    Some(function.return_type),
                    None,
                    function.data.id,
                );
                let mut members = AnonymousMembers::default();
                members.call_signatures.push(signature);
                self.types.new_type(
                    TypeFlags::OBJECT,
                    ObjectFlags::ANONYMOUS,
                    TypeKind::Object(ObjectKind::Anonymous(Box::new(members))),
                )
            }
            TypeNode::Constructor(ctor) => {
                let signature = self.get_signature_from_declaration(
                    ctor.type_parameters,
                    ctor.parameters,
                    Some(ctor.return_type),
                    None,
                    ctor.data.id,
                );
                self.signatures[signature.index()].flags |= SignatureFlags::CONSTRUCT;
                let mut members = AnonymousMembers::default();
                members.construct_signatures.push(signature);
                self.types.new_type(
                    TypeFlags::OBJECT,
                    ObjectFlags::ANONYMOUS,
                    TypeKind::Object(ObjectKind::Anonymous(Box::new(members))),
                )
            }
            TypeNode::TypeLiteral(literal) => self.get_type_from_type_literal(literal),
            TypeNode::TypeQuery(query) => {
                // typeof x resolves the value side.
                let terminal = query.expr_name.terminal();
                match self.resolve_name(terminal.text) {
                    Some(symbol) => {
                        let symbol = self.resolve_alias_if_needed(symbol);
                        self.get_type_of_symbol(symbol)
                    }
                    None => {
                        self.error(
                            query.data.range,
                            &messages::CANNOT_FIND_NAME_0,
                            &[&terminal.text_name],
                        );
                        self.types.error_type
                    }
                }
            }
            TypeNode::Operator(operator) => match operator.operator {
                SyntaxKind::KeyOfKeyword => {
                    let target = self.get_type_from_type_node(operator.type_node);
                    self.get_index_type(target)
                }
                SyntaxKind::ReadonlyKeyword => {
                    let inner = self.get_type_from_type_node(operator.type_node);
                    if let Some((elements, flags, _)) = self.tuple_element_info(inner) {
                        self.create_tuple_type(elements, flags, true, None)
                    } else {
                        inner
                    }
                }
                _ => self.get_type_from_type_node(operator.type_node),
            },
            TypeNode::IndexedAccess(access) => {
                let object_type = self.get_type_from_type_node(access.object_type);
                let index_type = self.get_type_from_type_node(access.index_type);
                self.get_indexed_access_type(object_type, index_type, Some(access.data.range))
            }
            TypeNode::Conditional(conditional) => self.get_type_from_conditional_node(conditional),
            TypeNode::Infer(infer) => {
                // Bound by the enclosing conditional's extends clause.
                self.lookup_type_parameter(infer.type_parameter.name.text)
                    .unwrap_or(self.types.error_type)
            }
            TypeNode::Mapped(mapped) => self.get_type_from_mapped_node(mapped),
            TypeNode::TemplateLiteral(template) => {
                let mut texts = vec![template.head.clone()];
                let mut types = Vec::new();
                for span in template.spans.iter() {
                    types.push(self.get_type_from_type_node(span.type_node));
                    texts.push(span.literal.clone());
                }
                self.get_template_literal_type(&texts, &types)
            }
            TypeNode::This(this_node) => {
                if let Some(&class_symbol) = self.class_stack.last() {
                    self.get_declared_type_of_symbol(class_symbol)
                } else {
                    let _ = this_node;
                    self.types.any_type
                }
            }
        }
    }

    fn get_type_from_keyword(&mut self, keyword: &KeywordTypeNode) -> TypeId {
        match keyword.data.kind {
            SyntaxKind::AnyKeyword => self.types.any_type,
            SyntaxKind::UnknownKeyword => self.types.unknown_type,
            SyntaxKind::StringKeyword => self.types.string_type,
            SyntaxKind::NumberKeyword => self.types.number_type,
            SyntaxKind::BooleanKeyword => self.types.boolean_type,
            SyntaxKind::BigIntKeyword => self.types.bigint_type,
            SyntaxKind::SymbolKeyword => self.types.es_symbol_type,
            SyntaxKind::ObjectKeyword => self.types.non_primitive_type,
            SyntaxKind::VoidKeyword => self.types.void_type,
            SyntaxKind::UndefinedKeyword => self.types.undefined_type,
            SyntaxKind::NeverKeyword => self.types.never_type,
            _ => self.types.error_type,
        }
    }

    fn get_type_from_tuple_node(&mut self, tuple: &'a TupleTypeNode<'a>) -> TypeId {
        let mut element_types = Vec::with_capacity(tuple.elements.len());
        let mut element_flags = Vec::with_capacity(tuple.elements.len());
        for element in tuple.elements.iter() {
            match element {
                TypeNode::Optional(optional) => {
                    element_types.push(self.get_type_from_type_node(optional.type_node));
                    element_flags.push(ElementFlags::OPTIONAL);
                }
                TypeNode::Rest(rest) => {
                    let inner = self.get_type_from_type_node(rest.type_node);
                    element_types.push(inner);
                    element_flags.push(ElementFlags::VARIADIC);
                }
                TypeNode::NamedTupleMember(member) => {
                    element_types.push(self.get_type_from_type_node(member.type_node));
                    element_flags.push(if member.dot_dot_dot {
                        ElementFlags::VARIADIC
                    } else if member.question {
                        ElementFlags::OPTIONAL
                    } else {
                        ElementFlags::REQUIRED
                    });
                }
                other => {
                    element_types.push(self.get_type_from_type_node(other));
                    element_flags.push(ElementFlags::REQUIRED);
                }
            }
        }
        self.create_tuple_type(element_types, element_flags, false, Some(tuple.data.range))
    }

    fn get_type_from_type_literal(&mut self, literal: &'a TypeLiteralNode<'a>) -> TypeId {
        let mut members = AnonymousMembers::default();
        for member in literal.members.iter() {
            match *member {
                TypeElement::PropertySignature(prop) => {
                    // Members resolve lazily so self-referential aliases
                    // like `type L<T> = T & { next: L<T> }` terminate; the
                    // active type-parameter scopes are captured for the
                    // eventual resolution.
                    let name_text = prop.name.text();
                    let name = self.interner.intern(&name_text);
                    let mut flags = SymbolFlags::PROPERTY | SymbolFlags::TRANSIENT;
                    if prop.question {
                        flags |= SymbolFlags::OPTIONAL;
                    }
                    let symbol = self.binder.symbols.alloc(name, name_text, flags);
                    self.binder.symbols.get_mut(symbol).value_declaration = Some(prop.data.id);
                    self.binder
                        .decls
                        .insert(prop.data.id, tycheck_binder::DeclRef::PropertySig(prop));
                    self.links(symbol).deferred_scopes = Some(self.type_param_scopes.clone());
                    if prop
                        .data
                        .modifier_flags
                        .contains(tycheck_ast::types::ModifierFlags::READONLY)
                    {
                        self.binder.symbols.get_mut(symbol).check_flags |= CheckFlags::READONLY;
                    }
                    members.properties.insert(name, symbol);
                }
                TypeElement::MethodSignature(method) => {
                    let name_text = method.name.text();
                    let name = self.interner.intern(&name_text);
                    let mut flags = SymbolFlags::METHOD | SymbolFlags::TRANSIENT;
                    if method.question {
                        flags |= SymbolFlags::OPTIONAL;
                    }
                    let symbol = self.binder.symbols.alloc(name, name_text, flags);
                    self.binder.symbols.get_mut(symbol).value_declaration = Some(method.data.id);
                    self.binder.symbols.get_mut(symbol).declarations.push(method.data.id);
                    self.binder
                        .decls
                        .insert(method.data.id, tycheck_binder::DeclRef::MethodSig(method));
                    self.links(symbol).deferred_scopes = Some(self.type_param_scopes.clone());
                    members.properties.insert(name, symbol);
                }
                TypeElement::CallSignature(call) => {
                    let signature = self.get_signature_from_declaration(
                        call.type_parameters,
                        call.parameters,
                        call.return_type,
                        None,
                        call.data.id,
                    );
                    members.call_signatures.push(signature);
                }
                TypeElement::ConstructSignature(ctor) => {
                    let signature = self.get_signature_from_declaration(
                        ctor.type_parameters,
                        ctor.parameters,
                        ctor.return_type,
                        None,
                        ctor.data.id,
                    );
                    self.signatures[signature.index()].flags |= SignatureFlags::CONSTRUCT;
                    members.construct_signatures.push(signature);
                }
                TypeElement::IndexSignature(index) => {
                    let key_type = index
                        .parameter
                        .type_annotation
                        .map(|t| self.get_type_from_type_node(t))
                        .unwrap_or(self.types.string_type);
                    let value_type = self.get_type_from_type_node(index.type_annotation);
                    members.index_infos.push(IndexInfo {
                        key_type,
                        value_type,
                        is_readonly: index.readonly,
                        declaration: Some(index.data.id),
                    });
                }
            }
        }
        self.types.new_type(
            TypeFlags::OBJECT,
            ObjectFlags::ANONYMOUS,
            TypeKind::Object(ObjectKind::Anonymous(Box::new(members))),
        )
    }

    fn get_type_from_conditional_node(&mut self, node: &'a ConditionalTypeNode<'a>) -> TypeId {
        // `infer` declarations in the extends clause scope over the
        // extends clause and the true branch.
        let mut infer_declarations: Vec<&'a TypeParameterDeclaration<'a>> = Vec::new();
        collect_infer_declarations(node.extends_type, &mut infer_declarations);
        let infer_params: Vec<TypeId> = infer_declarations
            .iter()
            .map(|decl| {
                let param = self.types.new_type(
                    TypeFlags::TYPE_PARAMETER,
                    ObjectFlags::NONE,
                    TypeKind::TypeParameter {
                        name: decl.name.text_name.clone(),
                        is_this: false,
                    },
                );
                self.param_constraints.insert(param, None);
                param
            })
            .collect();
        let check_type = self.get_type_from_type_node(node.check_type);
        let distributive = self
            .types
            .flags(check_type)
            .contains(TypeFlags::TYPE_PARAMETER);

        let mut scope = rustc_hash::FxHashMap::default();
        for (decl, &param) in infer_declarations.iter().zip(infer_params.iter()) {
            scope.insert(decl.name.text, param);
        }
        self.type_param_scopes.push(scope);
        let extends_type = self.get_type_from_type_node(node.extends_type);
        let true_type = self.get_type_from_type_node(node.true_type);
        self.type_param_scopes.pop();
        let false_type = self.get_type_from_type_node(node.false_type);

        self.get_conditional_type(
            check_type,
            extends_type,
            true_type,
            false_type,
            distributive,
            infer_params,
        )
    }

    fn get_type_from_mapped_node(&mut self, node: &'a MappedTypeNode<'a>) -> TypeId {
        let param = self.types.new_type(
            TypeFlags::TYPE_PARAMETER,
            ObjectFlags::NONE,
            TypeKind::TypeParameter {
                name: node.type_parameter.name.text_name.clone(),
                is_this: false,
            },
        );
        self.param_constraints.insert(param, None);
        let constraint = node
            .type_parameter
            .constraint
            .map(|c| self.get_type_from_type_node(c))
            .unwrap_or(self.types.error_type);
        let mut scope = rustc_hash::FxHashMap::default();
        scope.insert(node.type_parameter.name.text, param);
        self.type_param_scopes.push(scope);
        let template = node.type_node.map(|t| self.get_type_from_type_node(t));
        self.type_param_scopes.pop();
        self.get_mapped_type(
            param,
            constraint,
            template,
            node.readonly_modifier,
            node.question_modifier,
        )
    }

    fn get_type_from_type_reference(&mut self, node: &'a TypeReferenceNode<'a>) -> TypeId {
        let terminal = node.type_name.terminal();
        let name = terminal.text;
        let name_text = terminal.text_name.clone();

        // Innermost type parameter scope first.
        if let Some(param) = self.lookup_type_parameter(name) {
            if node.type_arguments.is_some() {
                self.error(node.data.range, &messages::TYPE_0_IS_NOT_GENERIC, &[&name_text]);
            }
            return param;
        }

        let arg_types: Option<Vec<TypeId>> = node.type_arguments.map(|args| {
            args.iter()
                .map(|a| self.get_type_from_type_node(a))
                .collect()
        });

        // Qualified names resolve through their namespace chain.
        if let EntityName::Qualified(qualified) = node.type_name {
            return self.resolve_qualified_type_name(qualified, arg_types, node.data.range);
        }

        if let Some(symbol) = self.resolve_name(name) {
            let symbol = self.resolve_alias_if_needed(symbol);
            let flags = self.symbol_flags(symbol);
            if flags.intersects(SymbolFlags::TYPE) {
                let declared = self.get_declared_type_of_symbol(symbol);
                return match arg_types {
                    Some(args) => self.instantiate_generic_declared_type(
                        symbol,
                        declared,
                        args,
                        node.data.range,
                    ),
                    None => self.reference_or_declared(symbol, declared, node.data.range),
                };
            }
        }

        if let Some(builtin) =
            self.try_builtin_type_reference(&name_text, arg_types.as_deref(), node.data.range)
        {
            return builtin;
        }

        self.error(node.data.range, &messages::CANNOT_FIND_NAME_0, &[&name_text]);
        self.types.error_type
    }

    fn resolve_qualified_type_name(
        &mut self,
        qualified: &'a QualifiedName<'a>,
        arg_types: Option<Vec<TypeId>>,
        range: TextRange,
    ) -> TypeId {
        // Resolve the leftmost identifier, then walk exports.
        fn leftmost<'n>(name: &EntityName<'n>) -> &'n Identifier {
            match *name {
                EntityName::Identifier(ident) => ident,
                EntityName::Qualified(q) => leftmost(q.left),
            }
        }
        let mut segments: Vec<&'a Identifier> = Vec::new();
        fn collect_segments<'n>(name: &EntityName<'n>, out: &mut Vec<&'n Identifier>) {
            match *name {
                EntityName::Identifier(ident) => out.push(ident),
                EntityName::Qualified(q) => {
                    collect_segments(q.left, out);
                    out.push(q.right);
                }
            }
        }
        collect_segments(&EntityName::Qualified(qualified), &mut segments);
        let root = leftmost(&EntityName::Qualified(qualified));
        let Some(mut symbol) = self.resolve_name(root.text) else {
            self.error(range, &messages::CANNOT_FIND_NAME_0, &[&root.text_name]);
            return self.types.error_type;
        };
        symbol = self.resolve_alias_if_needed(symbol);
        for segment in &segments[1..] {
            let exports = self.binder.symbols.get(symbol).exports.clone();
            let next = exports.and_then(|table| table.get(&segment.text));
            match next {
                Some(next) => symbol = self.resolve_alias_if_needed(next),
                None => {
                    self.error(range, &messages::CANNOT_FIND_NAME_0, &[&segment.text_name]);
                    return self.types.error_type;
                }
            }
        }
        let declared = self.get_declared_type_of_symbol(symbol);
        match arg_types {
            Some(args) => self.instantiate_generic_declared_type(symbol, declared, args, range),
            None => self.reference_or_declared(symbol, declared, range),
        }
    }

    /// A bare reference to a generic type needs its arguments unless
    /// every parameter has a default.
    fn reference_or_declared(
        &mut self,
        symbol: SymbolId,
        declared: TypeId,
        range: TextRange,
    ) -> TypeId {
        let params = self.links(symbol).type_params.clone().unwrap_or_default();
        if params.is_empty() {
            return declared;
        }
        let defaults: Vec<Option<TypeId>> = params
            .iter()
            .map(|p| self.param_defaults.get(p).copied())
            .collect();
        if defaults.iter().all(|d| d.is_some()) {
            let args: Vec<TypeId> = defaults.into_iter().map(|d| d.unwrap()).collect();
            return self.instantiate_generic_declared_type(symbol, declared, args, range);
        }
        let name = self.symbol_name(symbol);
        let count = params.len().to_string();
        self.error(
            range,
            &messages::GENERIC_TYPE_0_REQUIRES_1_TYPE_ARGUMENT_S,
            &[&name, &count],
        );
        self.types.error_type
    }

    /// Instantiate a generic class/interface (by reference) or type alias
    /// (by substitution, cached per argument list).
    pub(crate) fn instantiate_generic_declared_type(
        &mut self,
        symbol: SymbolId,
        declared: TypeId,
        mut args: Vec<TypeId>,
        range: TextRange,
    ) -> TypeId {
        let params = self.links(symbol).type_params.clone().unwrap_or_default();
        if params.is_empty() {
            if !args.is_empty() {
                let name = self.symbol_name(symbol);
                self.error(range, &messages::TYPE_0_IS_NOT_GENERIC, &[&name]);
            }
            return declared;
        }
        // Fill trailing defaults, then check arity.
        while args.len() < params.len() {
            match self.param_defaults.get(&params[args.len()]).copied() {
                Some(default) => args.push(default),
                None => break,
            }
        }
        if args.len() != params.len() {
            let expected = params.len().to_string();
            let got = args.len().to_string();
            self.error(
                range,
                &messages::EXPECTED_0_TYPE_ARGUMENTS_BUT_GOT_1,
                &[&expected, &got],
            );
            return self.types.error_type;
        }
        // Arguments must satisfy declared constraints.
        for (&param, &arg) in params.iter().zip(args.iter()) {
            if let Some(Some(constraint)) = self.param_constraints.get(&param).copied() {
                if !self.is_type_assignable_to(arg, constraint) {
                    let arg_name = self.type_to_string(arg);
                    let constraint_name = self.type_to_string(constraint);
                    self.error(
                        range,
                        &messages::TYPE_0_DOES_NOT_SATISFY_THE_CONSTRAINT_1,
                        &[&arg_name, &constraint_name],
                    );
                }
            }
        }
        let flags = self.symbol_flags(symbol);
        if flags.intersects(SymbolFlags::CLASS | SymbolFlags::INTERFACE) {
            return self.create_type_reference(declared, args);
        }
        // Generic alias: cache the instantiation under its argument key
        // before the body fully resolves, so self-referential aliases
        // terminate.
        let key = args.iter().map(|a| a.0.to_string()).collect::<Vec<_>>().join(",");
        if let Some(&cached) = self.links(symbol).instantiations.get(&key) {
            return cached;
        }
        let mapper = TypeMapper::new(params, args.clone());
        let result = self.instantiate_type(declared, &mapper);
        self.types.get_mut(result).alias = Some(crate::types::AliasReference {
            symbol,
            type_arguments: args,
        });
        self.links(symbol).instantiations.insert(key, result);
        result
    }

    // ========================================================================
    // Built-in type references
    // ========================================================================

    fn try_builtin_type_reference(
        &mut self,
        name: &str,
        args: Option<&[TypeId]>,
        range: TextRange,
    ) -> Option<TypeId> {
        let args = args.unwrap_or(&[]);
        let arg = |i: usize| args.get(i).copied();
        Some(match name {
            "Array" | "ReadonlyArray" => {
                let element = arg(0).unwrap_or(self.types.any_type);
                self.create_array_type(element)
            }
            "Promise" => {
                let value = arg(0).unwrap_or(self.types.any_type);
                let (target, _) = self.global_promise_target();
                self.create_type_reference(target, vec![value])
            }
            "Function" => self.global_function_type(),
            "Partial" | "Required" | "Readonly" => {
                let source = arg(0)?;
                let keys = self.get_index_type(source);
                let param = self.types.new_type(
                    TypeFlags::TYPE_PARAMETER,
                    ObjectFlags::NONE,
                    TypeKind::TypeParameter {
                        name: "K".to_string(),
                        is_this: false,
                    },
                );
                self.param_constraints.insert(param, Some(keys));
                let template = self.get_indexed_access_type(source, param, None);
                let question = match name {
                    "Partial" => Some(true),
                    "Required" => Some(false),
                    _ => None,
                };
                let readonly = if name == "Readonly" { Some(true) } else { None };
                self.get_mapped_type(param, keys, Some(template), readonly, question)
            }
            "Record" => {
                let keys = arg(0)?;
                let value = arg(1)?;
                let param = self.types.new_type(
                    TypeFlags::TYPE_PARAMETER,
                    ObjectFlags::NONE,
                    TypeKind::TypeParameter {
                        name: "K".to_string(),
                        is_this: false,
                    },
                );
                self.param_constraints.insert(param, Some(keys));
                self.get_mapped_type(param, keys, Some(value), None, None)
            }
            "Pick" => {
                let source = arg(0)?;
                let keys = arg(1)?;
                let param = self.types.new_type(
                    TypeFlags::TYPE_PARAMETER,
                    ObjectFlags::NONE,
                    TypeKind::TypeParameter {
                        name: "K".to_string(),
                        is_this: false,
                    },
                );
                self.param_constraints.insert(param, Some(keys));
                let template = self.get_indexed_access_type(source, param, None);
                self.get_mapped_type(param, keys, Some(template), None, None)
            }
            "Omit" => {
                let source = arg(0)?;
                let omitted = arg(1)?;
                let all_keys = self.get_index_type(source);
                let kept: Vec<TypeId> = self
                    .types
                    .union_members(all_keys)
                    .into_iter()
                    .filter(|&k| !self.is_type_assignable_to(k, omitted))
                    .collect();
                let keys = self.get_union_type(kept);
                let param = self.types.new_type(
                    TypeFlags::TYPE_PARAMETER,
                    ObjectFlags::NONE,
                    TypeKind::TypeParameter {
                        name: "K".to_string(),
                        is_this: false,
                    },
                );
                self.param_constraints.insert(param, Some(keys));
                let template = self.get_indexed_access_type(source, param, None);
                self.get_mapped_type(param, keys, Some(template), None, None)
            }
            "NonNullable" => {
                let source = arg(0)?;
                self.get_non_nullable_type(source)
            }
            "ReturnType" => {
                let source = arg(0)?;
                let members = self.resolve_structured_members(source);
                match members.call_signatures.first() {
                    Some(&signature) => self.signature(signature).return_type,
                    None => {
                        self.error(range, &messages::TYPE_0_IS_NOT_GENERIC, &["ReturnType"]);
                        self.types.error_type
                    }
                }
            }
            "Parameters" => {
                let source = arg(0)?;
                let members = self.resolve_structured_members(source);
                match members.call_signatures.first() {
                    Some(&signature) => {
                        let params = self.signature(signature).params.clone();
                        let types: Vec<TypeId> = params.iter().map(|p| p.ty).collect();
                        let flags: Vec<ElementFlags> = params
                            .iter()
                            .map(|p| {
                                if p.rest {
                                    ElementFlags::REST
                                } else if p.optional {
                                    ElementFlags::OPTIONAL
                                } else {
                                    ElementFlags::REQUIRED
                                }
                            })
                            .collect();
                        self.create_tuple_type(types, flags, false, None)
                    }
                    None => self.types.error_type,
                }
            }
            _ => return None,
        })
    }

    pub(crate) fn get_non_nullable_type(&mut self, t: TypeId) -> TypeId {
        let members = self.types.union_members(t);
        let filtered: Vec<TypeId> = members
            .into_iter()
            .filter(|&m| !self.types.flags(m).intersects(TypeFlags::NULLABLE))
            .collect();
        self.get_union_type(filtered)
    }

    // ========================================================================
    // Value-global heuristics
    // ========================================================================

    pub(crate) fn builtin_value_global(&mut self, name: &str, range: TextRange) -> Option<TypeId> {
        if BUILTIN_VALUE_GLOBALS.contains(&name) {
            return Some(self.types.any_type);
        }
        if let Some((_, package)) = TYPES_PACKAGE_GLOBALS.iter().find(|(n, _)| *n == name) {
            self.error(
                range,
                &messages::CANNOT_FIND_NAME_0_TRY_INSTALLING_TYPES,
                &[name, package],
            );
            return Some(self.types.any_type);
        }
        None
    }

    /// Closest in-scope spelling for a misspelled name, by edit distance.
    pub(crate) fn suggest_name(&mut self, name: &str) -> Option<String> {
        let mut best: Option<(usize, String)> = None;
        let cutoff = (name.len() / 3).max(1).min(3);
        for &container in self.scope_stack.iter().rev() {
            if let Some(table) = self.binder.container_locals.get(&container) {
                for (candidate, _) in table.iter() {
                    let candidate = self.interner.resolve(*candidate).to_string();
                    let distance = levenshtein(name, &candidate);
                    if distance > 0 && distance <= cutoff {
                        if best.as_ref().map_or(true, |(d, _)| distance < *d) {
                            best = Some((distance, candidate));
                        }
                    }
                }
            }
        }
        best.map(|(_, candidate)| candidate)
    }

    // ========================================================================
    // Display
    // ========================================================================

    pub fn type_to_string(&mut self, t: TypeId) -> String {
        self.type_to_string_depth(t, 0)
    }

    fn type_to_string_depth(&mut self, t: TypeId, depth: u32) -> String {
        if depth > 6 {
            return "...".to_string();
        }
        if let Some(alias) = self.types.get(t).alias.clone() {
            let name = self.symbol_name(alias.symbol);
            if alias.type_arguments.is_empty() {
                return name;
            }
            let args: Vec<String> = alias
                .type_arguments
                .iter()
                .map(|&a| self.type_to_string_depth(a, depth + 1))
                .collect();
            return format!("{}<{}>", name, args.join(", "));
        }
        match self.types.get(t).kind.clone() {
            TypeKind::Intrinsic { name } => name.to_string(),
            TypeKind::StringLiteral { value } => format!("\"{}\"", value),
            TypeKind::NumberLiteral { value } => {
                if value.fract() == 0.0 && value.abs() < 1e21 {
                    format!("{}", value as i64)
                } else {
                    format!("{}", value)
                }
            }
            TypeKind::BigIntLiteral { value } => value,
            TypeKind::BooleanLiteral { value } => value.to_string(),
            TypeKind::Union { types } => {
                let parts: Vec<String> = types
                    .iter()
                    .map(|&m| self.type_to_string_depth(m, depth + 1))
                    .collect();
                parts.join(" | ")
            }
            TypeKind::Intersection { types } => {
                let parts: Vec<String> = types
                    .iter()
                    .map(|&m| self.type_to_string_depth(m, depth + 1))
                    .collect();
                parts.join(" & ")
            }
            TypeKind::TypeParameter { name, .. } => name,
            TypeKind::Index { target } => {
                format!("keyof {}", self.type_to_string_depth(target, depth + 1))
            }
            TypeKind::IndexedAccess {
                object_type,
                index_type,
            } => format!(
                "{}[{}]",
                self.type_to_string_depth(object_type, depth + 1),
                self.type_to_string_depth(index_type, depth + 1)
            ),
            TypeKind::Conditional {
                check_type,
                extends_type,
                ..
            } => format!(
                "{} extends {} ? ... : ...",
                self.type_to_string_depth(check_type, depth + 1),
                self.type_to_string_depth(extends_type, depth + 1)
            ),
            TypeKind::TemplateLiteral { texts, types } => {
                let mut out = String::from("`");
                out.push_str(&texts[0]);
                for (i, &span_type) in types.iter().enumerate() {
                    out.push_str("${");
                    out.push_str(&self.type_to_string_depth(span_type, depth + 1));
                    out.push('}');
                    out.push_str(&texts[i + 1]);
                }
                out.push('`');
                out
            }
            TypeKind::Substitution { base_type, .. } => {
                self.type_to_string_depth(base_type, depth + 1)
            }
            TypeKind::Object(object) => self.object_to_string(t, object, depth),
        }
    }

    fn object_to_string(&mut self, t: TypeId, object: ObjectKind, depth: u32) -> String {
        match object {
            ObjectKind::Interface { .. } => match self.types.get(t).symbol {
                Some(symbol) => self.symbol_name(symbol),
                None => "object".to_string(),
            },
            ObjectKind::Reference { target, type_args } => {
                if self.is_array_type(t) {
                    let element = self.type_to_string_depth(type_args[0], depth + 1);
                    return if element.contains(' ') {
                        format!("({})[]", element)
                    } else {
                        format!("{}[]", element)
                    };
                }
                if self.is_tuple_type(t) {
                    let parts: Vec<String> = type_args
                        .iter()
                        .map(|&a| self.type_to_string_depth(a, depth + 1))
                        .collect();
                    return format!("[{}]", parts.join(", "));
                }
                let base = match self.types.get(target).symbol {
                    Some(symbol) => self.symbol_name(symbol),
                    None => self.type_to_string_depth(target, depth + 1),
                };
                if type_args.is_empty() {
                    base
                } else {
                    let args: Vec<String> = type_args
                        .iter()
                        .map(|&a| self.type_to_string_depth(a, depth + 1))
                        .collect();
                    format!("{}<{}>", base, args.join(", "))
                }
            }
            ObjectKind::Anonymous(members) => {
                // Pure call shapes render as function types.
                if members.properties.is_empty()
                    && members.call_signatures.len() == 1
                    && members.construct_signatures.is_empty()
                {
                    return self.signature_to_string(members.call_signatures[0], depth);
                }
                if let Some(symbol) = self.types.get(t).symbol {
                    let name = self.symbol_name(symbol);
                    if !name.is_empty() && !name.starts_with("__") {
                        let flags = self.symbol_flags(symbol);
                        if flags
                            .intersects(SymbolFlags::CLASS | SymbolFlags::ENUM | SymbolFlags::MODULE)
                        {
                            return format!("typeof {}", name);
                        }
                    }
                }
                let mut parts: Vec<String> = Vec::new();
                let props: Vec<_> = members.properties.iter().map(|(n, s)| (*n, *s)).collect();
                for (name, prop) in props.iter().take(5) {
                    let name_text = self.interner.resolve(*name).to_string();
                    let optional = self.binder.symbols.get(*prop).is_optional();
                    let prop_type = self.get_type_of_symbol(*prop);
                    let rendered = self.type_to_string_depth(prop_type, depth + 1);
                    parts.push(format!(
                        "{}{}: {};",
                        name_text,
                        if optional { "?" } else { "" },
                        rendered
                    ));
                }
                if props.len() > 5 {
                    parts.push("...".to_string());
                }
                if parts.is_empty() {
                    "{}".to_string()
                } else {
                    format!("{{ {} }}", parts.join(" "))
                }
            }
            ObjectKind::Tuple { .. } => "[...]".to_string(),
            ObjectKind::Mapped { .. } => "{ [mapped] }".to_string(),
        }
    }

    fn signature_to_string(&mut self, signature: SignatureId, depth: u32) -> String {
        let sig = self.signature(signature).clone();
        let params: Vec<String> = sig
            .params
            .iter()
            .map(|p| {
                let rendered = self.type_to_string_depth(p.ty, depth + 1);
                format!(
                    "{}{}{}: {}",
                    if p.rest { "..." } else { "" },
                    p.name_text,
                    if p.optional { "?" } else { "" },
                    rendered
                )
            })
            .collect();
        let return_type = self.type_to_string_depth(sig.return_type, depth + 1);
        format!("({}) => {}", params.join(", "), return_type)
    }
}

fn collect_infer_declarations<'n>(
    node: &'n TypeNode<'n>,
    out: &mut Vec<&'n TypeParameterDeclaration<'n>>,
) {
    match node {
        TypeNode::Infer(infer) => out.push(infer.type_parameter),
        TypeNode::Array(array) => collect_infer_declarations(array.element_type, out),
        TypeNode::Union(union) => {
            for member in union.types.iter() {
                collect_infer_declarations(member, out);
            }
        }
        TypeNode::Intersection(intersection) => {
            for member in intersection.types.iter() {
                collect_infer_declarations(member, out);
            }
        }
        TypeNode::Paren(paren) => collect_infer_declarations(paren.type_node, out),
        TypeNode::Tuple(tuple) => {
            for element in tuple.elements.iter() {
                collect_infer_declarations(element, out);
            }
        }
        TypeNode::Optional(optional) => collect_infer_declarations(optional.type_node, out),
        TypeNode::Rest(rest) => collect_infer_declarations(rest.type_node, out),
        TypeNode::Function(function) => {
            for param in function.parameters.iter() {
                if let Some(annotation) = param.type_annotation {
                    collect_infer_declarations(annotation, out);
                }
            }
            collect_infer_declarations(function.return_type, out);
        }
        TypeNode::TypeReference(reference) => {
            if let Some(args) = reference.type_arguments {
                for arg in args.iter() {
                    collect_infer_declarations(arg, out);
                }
            }
        }
        TypeNode::IndexedAccess(access) => {
            collect_infer_declarations(access.object_type, out);
            collect_infer_declarations(access.index_type, out);
        }
        _ => {}
    }
}

fn collect_return_expressions<'n>(
    body: &'n Block<'n>,
    f: &mut impl FnMut(&'n Expression<'n>),
) {
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
            Statement::Try(t) => {
                for s in t.try_block.statements.iter() {
                    walk(s, f);
                }
                if let Some(c) = t.catch_clause {
                    for s in c.block.statements.iter() {
                        walk(s, f);
                    }
                }
                if let Some(b) = t.finally_block {
                    for s in b.statements.iter() {
                        walk(s, f);
                    }
                }
            }
            _ => {}
        }
    }
    for statement in body.statements.iter() {
        walk(statement, f);
    }
}

/// Edit distance for the did-you-mean machinery.
fn levenshtein(a: &str, b: &str) -> usize {
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
