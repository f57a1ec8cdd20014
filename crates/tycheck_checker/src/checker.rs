//! The `Checker` aggregate and the statement-level walk.
//!
//! One `Checker` owns the type table, the bound symbol universe, every
//! memoization cache, and the diagnostics for one compilation. All state
//! is unsynchronized and single-threaded; independent compilations get
//! independent checkers. The walk is source-ordered per file, but symbol
//! and type resolution is demand-driven: checking statement N may resolve
//! a symbol declared later. Function and method bodies are queued and
//! drained after the top-level walk so order-independent references
//! resolve fully.

use rustc_hash::FxHashMap;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tycheck_ast::node::*;
use tycheck_ast::types::{
    ModifierFlags, NodeId, SignatureId, SourceFileId, SymbolFlags, SymbolId, TypeFlags, TypeId,
};
use tycheck_binder::Binder;
use tycheck_core::intern::{InternedString, StringInterner};
use tycheck_core::text::TextRange;
use tycheck_diagnostics::{messages, Diagnostic, DiagnosticCollection, DiagnosticMessage};
use tycheck_tsoptions::CompilerOptions;

use crate::relate::RelationKind;
use crate::types::{ResolvedMembers, Signature, TypeMapper, TypeTable};

/// Cooperative cancellation handle. Checked once per top-level statement;
/// never inside expression recursion.
#[derive(Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Distinguished "the check was aborted" result. Not a diagnostic; caches
/// filled before the abort stay valid for a retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckAborted;

bitflags::bitflags! {
    /// Alters how an expression check proceeds without altering the tree.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CheckMode: u8 {
        const NORMAL = 0;
        const CONTEXTUAL = 1 << 0;
        const INFERENTIAL = 1 << 1;
        const SKIP_CONTEXT_SENSITIVE = 1 << 2;
    }
}

/// Key for the shared circularity-detection stack. Every lazily resolved
/// property pushes its key before computing; re-entering a key already on
/// the stack marks everything from the cycle point onward as failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionKey {
    TypeOfSymbol(SymbolId),
    DeclaredType(SymbolId),
    AliasTarget(SymbolId),
    BaseConstraint(TypeId),
    ReturnType(NodeId),
    EnumValues(SymbolId),
}

/// Lazily computed facts about a symbol. Fields fill in exactly once.
#[derive(Debug, Default)]
pub struct SymbolLinks {
    pub resolved_type: Option<TypeId>,
    pub declared_type: Option<TypeId>,
    pub alias_target: Option<Option<SymbolId>>,
    pub type_params: Option<Vec<TypeId>>,
    /// Generic alias/interface instantiations, keyed by type-argument list.
    pub instantiations: FxHashMap<String, TypeId>,
    /// For instantiated transient symbols: the original and its mapper.
    pub target: Option<(SymbolId, TypeMapper)>,
    pub enum_value: Option<EnumValue>,
    /// Type-parameter scopes captured at declaration time, restored when a
    /// lazily resolved member's annotation finally resolves.
    pub deferred_scopes: Option<Vec<FxHashMap<InternedString, TypeId>>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EnumValue {
    Number(f64),
    String(String),
    /// Not statically evaluable.
    Unknown,
}

pub(crate) enum DeferredKind<'a> {
    FunctionBody(&'a FunctionDeclaration<'a>),
    MethodBody(&'a MethodDeclaration<'a>),
    CtorBody(&'a ConstructorDeclaration<'a>),
}

pub(crate) struct DeferredCheck<'a> {
    pub scope: Vec<NodeId>,
    pub class: Option<SymbolId>,
    pub kind: DeferredKind<'a>,
}

pub struct Checker<'a> {
    pub types: TypeTable,
    pub binder: Binder<'a>,
    pub(crate) interner: StringInterner,
    pub options: CompilerOptions,
    pub diagnostics: DiagnosticCollection,
    pub(crate) signatures: Vec<Signature>,

    pub(crate) symbol_links: FxHashMap<SymbolId, SymbolLinks>,
    pub(crate) resolved_members: FxHashMap<TypeId, Rc<ResolvedMembers>>,
    pub(crate) resolved_base_constraints: FxHashMap<TypeId, TypeId>,
    pub(crate) param_constraints: FxHashMap<TypeId, Option<TypeId>>,
    pub(crate) param_defaults: FxHashMap<TypeId, TypeId>,
    pub(crate) instantiation_cache: FxHashMap<(TypeId, String), TypeId>,
    pub(crate) instantiated_symbols: FxHashMap<(SymbolId, String), SymbolId>,
    pub(crate) instantiated_signatures: FxHashMap<(SignatureId, String), SignatureId>,
    pub(crate) relation_cache: FxHashMap<(TypeId, TypeId, RelationKind), bool>,
    pub(crate) relation_stack: Vec<(TypeId, TypeId, RelationKind)>,

    pub(crate) type_resolutions: Vec<(ResolutionKey, bool)>,
    pub(crate) instantiation_depth: u32,
    pub(crate) instantiation_count: u64,

    pub(crate) scope_stack: Vec<NodeId>,
    pub(crate) type_param_scopes: Vec<FxHashMap<InternedString, TypeId>>,
    pub(crate) narrow_frames: Vec<FxHashMap<SymbolId, TypeId>>,
    pub(crate) flow_types: FxHashMap<SymbolId, TypeId>,
    pub(crate) contextual_types: Vec<TypeId>,
    pub(crate) return_types: Vec<Option<TypeId>>,
    pub(crate) class_stack: Vec<SymbolId>,
    pub(crate) resolved_signatures: FxHashMap<NodeId, SignatureId>,
    /// Declaration node -> the signature built from it, so body checks
    /// reuse the signature's type parameters.
    pub(crate) node_signatures: FxHashMap<NodeId, SignatureId>,

    pub(crate) deferred: Vec<DeferredCheck<'a>>,

    pub(crate) module_map: FxHashMap<String, SourceFileId>,
    pub(crate) module_exports: FxHashMap<SourceFileId, Vec<(InternedString, SymbolId)>>,
    pub(crate) current_file: SourceFileId,
    pub(crate) current_file_name: String,
    cancellation: Option<CancellationToken>,

    // Lazily synthesized globals.
    pub(crate) array_target: Option<(TypeId, TypeId)>,
    pub(crate) promise_target: Option<(TypeId, TypeId)>,
    pub(crate) string_members_type: Option<TypeId>,
    pub(crate) number_members_type: Option<TypeId>,
    pub(crate) global_function_type: Option<TypeId>,
}

impl<'a> Checker<'a> {
    pub fn new(binder: Binder<'a>, options: CompilerOptions) -> Self {
        let interner = binder.interner().clone();
        Self {
            types: TypeTable::new(),
            binder,
            interner,
            options,
            diagnostics: DiagnosticCollection::new(),
            signatures: Vec::new(),
            symbol_links: FxHashMap::default(),
            resolved_members: FxHashMap::default(),
            resolved_base_constraints: FxHashMap::default(),
            param_constraints: FxHashMap::default(),
            param_defaults: FxHashMap::default(),
            instantiation_cache: FxHashMap::default(),
            instantiated_symbols: FxHashMap::default(),
            instantiated_signatures: FxHashMap::default(),
            relation_cache: FxHashMap::default(),
            relation_stack: Vec::new(),
            type_resolutions: Vec::new(),
            instantiation_depth: 0,
            instantiation_count: 0,
            scope_stack: Vec::new(),
            type_param_scopes: Vec::new(),
            narrow_frames: Vec::new(),
            flow_types: FxHashMap::default(),
            contextual_types: Vec::new(),
            return_types: Vec::new(),
            class_stack: Vec::new(),
            resolved_signatures: FxHashMap::default(),
            node_signatures: FxHashMap::default(),
            deferred: Vec::new(),
            module_map: FxHashMap::default(),
            module_exports: FxHashMap::default(),
            current_file: SourceFileId(0),
            current_file_name: String::new(),
            cancellation: None,
            array_target: None,
            promise_target: None,
            string_members_type: None,
            number_members_type: None,
            global_function_type: None,
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Make `file` importable under its module name.
    pub fn register_module(&mut self, module_name: &str, file: SourceFileId) {
        self.module_map.insert(module_name.to_string(), file);
    }

    pub fn diagnostics(&self) -> &DiagnosticCollection {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> DiagnosticCollection {
        let mut all = std::mem::take(&mut self.diagnostics);
        all.extend(std::mem::take(&mut self.binder.diagnostics));
        all.sort();
        all
    }

    // ========================================================================
    // Diagnostics plumbing
    // ========================================================================

    pub(crate) fn error(&mut self, range: TextRange, message: &DiagnosticMessage, args: &[&str]) {
        let diagnostic = Diagnostic::with_location(
            self.current_file_name.clone(),
            range.to_span(),
            message,
            args,
        );
        self.diagnostics.add(diagnostic);
    }

    pub(crate) fn error_with_related(
        &mut self,
        range: TextRange,
        message: &DiagnosticMessage,
        args: &[&str],
        related: Vec<Diagnostic>,
    ) {
        let mut diagnostic = Diagnostic::with_location(
            self.current_file_name.clone(),
            range.to_span(),
            message,
            args,
        );
        for r in related {
            diagnostic.add_related(r);
        }
        self.diagnostics.add(diagnostic);
    }

    // ========================================================================
    // Circularity-detection stack
    // ========================================================================

    /// Returns false when `key` is already being resolved; in that case
    /// every entry from the cycle point onward is marked failed.
    pub(crate) fn push_type_resolution(&mut self, key: ResolutionKey) -> bool {
        if let Some(index) = self.type_resolutions.iter().position(|(k, _)| *k == key) {
            for entry in self.type_resolutions[index..].iter_mut() {
                entry.1 = true;
            }
            return false;
        }
        self.type_resolutions.push((key, false));
        true
    }

    /// Pops the top entry; returns false when it was marked failed by a
    /// cycle discovered underneath it.
    pub(crate) fn pop_type_resolution(&mut self) -> bool {
        let (_, failed) = self.type_resolutions.pop().unwrap_or((
            ResolutionKey::BaseConstraint(TypeId::INVALID),
            false,
        ));
        !failed
    }

    pub(crate) fn links(&mut self, symbol: SymbolId) -> &mut SymbolLinks {
        self.symbol_links.entry(symbol).or_default()
    }

    // ========================================================================
    // Signature arena
    // ========================================================================

    pub(crate) fn alloc_signature(&mut self, signature: Signature) -> SignatureId {
        let id = SignatureId(self.signatures.len() as u32);
        self.signatures.push(signature);
        id
    }

    pub(crate) fn signature(&self, id: SignatureId) -> &Signature {
        &self.signatures[id.index()]
    }

    // ========================================================================
    // Driver
    // ========================================================================

    /// Check one source file: top-level statements in order, then the
    /// deferred function bodies.
    pub fn check_source_file(
        &mut self,
        file: &SourceFile<'a>,
        file_id: SourceFileId,
    ) -> Result<(), CheckAborted> {
        self.current_file = file_id;
        self.current_file_name = file.file_name.clone();
        self.module_map
            .entry(file.module_name.clone())
            .or_insert(file_id);
        self.scope_stack.clear();
        self.scope_stack.push(file.data.id);

        for statement in file.statements.iter() {
            if let Some(token) = &self.cancellation {
                if token.is_cancelled() {
                    return Err(CheckAborted);
                }
            }
            self.check_statement(statement);
        }
        self.check_deferred_nodes()?;
        Ok(())
    }

    pub(crate) fn check_node_deferred(&mut self, kind: DeferredKind<'a>) {
        self.deferred.push(DeferredCheck {
            scope: self.scope_stack.clone(),
            class: self.class_stack.last().copied(),
            kind,
        });
    }

    fn check_deferred_nodes(&mut self) -> Result<(), CheckAborted> {
        while !self.deferred.is_empty() {
            let batch = std::mem::take(&mut self.deferred);
            for deferred in batch {
                if let Some(token) = &self.cancellation {
                    if token.is_cancelled() {
                        return Err(CheckAborted);
                    }
                }
                let saved_scope = std::mem::replace(&mut self.scope_stack, deferred.scope);
                let saved_class = self.class_stack.clone();
                let mut pushed_class_scope = false;
                if let Some(class) = deferred.class {
                    self.class_stack.push(class);
                    pushed_class_scope = self.push_symbol_type_param_scope(class);
                }
                match deferred.kind {
                    DeferredKind::FunctionBody(decl) => self.check_function_body(decl),
                    DeferredKind::MethodBody(decl) => self.check_method_body(decl),
                    DeferredKind::CtorBody(decl) => self.check_ctor_body(decl),
                }
                if pushed_class_scope {
                    self.type_param_scopes.pop();
                }
                self.scope_stack = saved_scope;
                self.class_stack = saved_class;
            }
        }
        Ok(())
    }

    // ========================================================================
    // Statements
    // ========================================================================

    pub(crate) fn check_statement(&mut self, statement: &Statement<'a>) {
        match *statement {
            Statement::Variable(n) => self.check_variable_statement(n),
            Statement::Function(n) => self.check_function_declaration(n),
            Statement::Class(n) => self.check_class_declaration(n),
            Statement::Interface(n) => self.check_interface_declaration(n),
            Statement::TypeAlias(n) => self.check_type_alias_declaration(n),
            Statement::Enum(n) => self.check_enum_declaration(n),
            Statement::Namespace(n) => self.check_namespace_declaration(n),
            Statement::Import(n) => self.check_import_declaration(n),
            Statement::Export(n) => self.check_export_declaration(n),
            Statement::Expression(n) => {
                self.check_expression(n.expression, CheckMode::NORMAL);
            }
            Statement::Return(n) => self.check_return_statement(n),
            Statement::If(n) => self.check_if_statement(n),
            Statement::While(n) => {
                let condition = self.check_expression(n.expression, CheckMode::NORMAL);
                let frame = self.facts_from_condition(n.expression, condition, true);
                self.narrow_frames.push(frame);
                self.check_statement(n.statement);
                self.narrow_frames.pop();
            }
            Statement::For(n) => self.check_for_statement(n),
            Statement::ForOf(n) => self.check_for_of_statement(n),
            Statement::ForIn(n) => self.check_for_in_statement(n),
            Statement::Switch(n) => self.check_switch_statement(n),
            Statement::Throw(n) => {
                self.check_expression(n.expression, CheckMode::NORMAL);
            }
            Statement::Try(n) => self.check_try_statement(n),
            Statement::Block(n) => self.check_block(n),
            Statement::Break(_) | Statement::Continue(_) | Statement::Empty(_) => {}
        }
    }

    pub(crate) fn check_block(&mut self, block: &Block<'a>) {
        self.scope_stack.push(block.data.id);
        for statement in block.statements.iter() {
            self.check_statement(statement);
        }
        self.scope_stack.pop();
    }

    fn check_if_statement(&mut self, node: &IfStatement<'a>) {
        let condition = self.check_expression(node.expression, CheckMode::NORMAL);
        let true_frame = self.facts_from_condition(node.expression, condition, true);
        self.narrow_frames.push(true_frame);
        self.check_statement(node.then_statement);
        self.narrow_frames.pop();
        if let Some(else_statement) = node.else_statement {
            let false_frame = self.facts_from_condition(node.expression, condition, false);
            self.narrow_frames.push(false_frame);
            self.check_statement(else_statement);
            self.narrow_frames.pop();
        }
    }

    fn check_for_statement(&mut self, node: &ForStatement<'a>) {
        if let Some(init) = &node.initializer {
            match init {
                ForInitializer::VariableDeclarationList(list) => {
                    let is_const = list.is_const();
                    for decl in list.declarations.iter() {
                        self.check_variable_declaration(decl, is_const);
                    }
                }
                ForInitializer::Expression(expr) => {
                    self.check_expression(expr, CheckMode::NORMAL);
                }
            }
        }
        if let Some(condition) = node.condition {
            self.check_expression(condition, CheckMode::NORMAL);
        }
        if let Some(incrementor) = node.incrementor {
            self.check_expression(incrementor, CheckMode::NORMAL);
        }
        self.check_statement(node.statement);
    }

    fn check_for_of_statement(&mut self, node: &ForOfStatement<'a>) {
        let iterable = self.check_expression(node.expression, CheckMode::NORMAL);
        let element = self.get_iterated_element_type(iterable, node.expression.data().range);
        match &node.initializer {
            ForInitializer::VariableDeclarationList(list) => {
                for decl in list.declarations.iter() {
                    if let Some(symbol) = self.binder.node_symbols.get(&decl.data.id).copied() {
                        self.links(symbol).resolved_type = Some(element);
                    }
                }
            }
            ForInitializer::Expression(expr) => {
                self.check_expression(expr, CheckMode::NORMAL);
            }
        }
        self.check_statement(node.statement);
    }

    fn check_for_in_statement(&mut self, node: &ForInStatement<'a>) {
        self.check_expression(node.expression, CheckMode::NORMAL);
        // The for-in target is always `string`.
        match &node.initializer {
            ForInitializer::VariableDeclarationList(list) => {
                for decl in list.declarations.iter() {
                    if let Some(symbol) = self.binder.node_symbols.get(&decl.data.id).copied() {
                        let string_type = self.types.string_type;
                        self.links(symbol).resolved_type = Some(string_type);
                    }
                }
            }
            ForInitializer::Expression(expr) => {
                self.check_expression(expr, CheckMode::NORMAL);
            }
        }
        self.check_statement(node.statement);
    }

    fn check_switch_statement(&mut self, node: &SwitchStatement<'a>) {
        let switch_type = self.check_expression(node.expression, CheckMode::NORMAL);
        for clause in node.clauses.iter() {
            match clause {
                CaseOrDefaultClause::Case(c) => {
                    let case_type = self.check_expression(c.expression, CheckMode::NORMAL);
                    if !self.is_type_comparable_to(case_type, switch_type)
                        && !self.is_type_comparable_to(switch_type, case_type)
                    {
                        let source = self.type_to_string(case_type);
                        let target = self.type_to_string(switch_type);
                        self.error(
                            c.expression.data().range,
                            &messages::TYPE_0_IS_NOT_ASSIGNABLE_TO_TYPE_1,
                            &[&source, &target],
                        );
                    }
                    let frame =
                        self.facts_from_switch_case(node.expression, switch_type, case_type);
                    self.narrow_frames.push(frame);
                    for statement in c.statements.iter() {
                        self.check_statement(statement);
                    }
                    self.narrow_frames.pop();
                }
                CaseOrDefaultClause::Default(d) => {
                    for statement in d.statements.iter() {
                        self.check_statement(statement);
                    }
                }
            }
        }
    }

    fn check_try_statement(&mut self, node: &TryStatement<'a>) {
        self.check_block(node.try_block);
        if let Some(catch) = node.catch_clause {
            if let Some(variable) = catch.variable {
                // Catch variables are `unknown` under
                // useUnknownInCatchVariables, `any` otherwise.
                let catch_type = if self.options.use_unknown_in_catch_variables() {
                    self.types.unknown_type
                } else {
                    self.types.any_type
                };
                if let Some(symbol) = self.binder.node_symbols.get(&variable.data.id).copied() {
                    self.links(symbol).resolved_type = Some(catch_type);
                }
            }
            self.check_block(catch.block);
        }
        if let Some(finally_block) = node.finally_block {
            self.check_block(finally_block);
        }
    }

    fn check_return_statement(&mut self, node: &ReturnStatement<'a>) {
        let expected = self.return_types.last().copied().flatten();
        let actual = match node.expression {
            Some(expr) => {
                let mode = CheckMode::NORMAL;
                if let Some(expected) = expected {
                    self.check_expression_with_contextual_type(expr, expected, mode)
                } else {
                    self.check_expression(expr, mode)
                }
            }
            None => self.types.undefined_type,
        };
        if let Some(expected) = expected {
            let expected_flags = self.types.flags(expected);
            if !expected_flags.intersects(TypeFlags::ANY | TypeFlags::VOID_LIKE) {
                let range = node
                    .expression
                    .map(|e| e.data().range)
                    .unwrap_or(node.data.range);
                let widened = self.get_widened_literal_like_type_for_relation(actual, expected);
                self.check_type_assignable_to_and_report(widened, expected, range, node.expression);
            }
        }
    }

    // ========================================================================
    // Variable declarations
    // ========================================================================

    fn check_variable_statement(&mut self, node: &VariableStatement<'a>) {
        let is_const = node.declaration_list.is_const();
        for decl in node.declaration_list.declarations.iter() {
            self.check_variable_declaration(decl, is_const);
        }
    }

    pub(crate) fn check_variable_declaration(
        &mut self,
        decl: &VariableDeclaration<'a>,
        is_const: bool,
    ) {
        let symbol = self.binder.node_symbols.get(&decl.data.id).copied();
        let declared = decl
            .type_annotation
            .map(|annotation| self.get_type_from_type_node(annotation));

        if let Some(init) = decl.initializer {
            let init_type = match declared {
                Some(declared) => {
                    let t = self.check_expression_with_contextual_type(init, declared, CheckMode::NORMAL);
                    let widened = self.get_widened_literal_like_type_for_relation(t, declared);
                    self.check_type_assignable_to_and_report(
                        widened,
                        declared,
                        init.data().range,
                        Some(init),
                    );
                    declared
                }
                None => {
                    let t = self.check_expression(init, CheckMode::NORMAL);
                    if is_const {
                        self.get_regular_type(t)
                    } else {
                        self.get_widened_type(t)
                    }
                }
            };
            if let Some(symbol) = symbol {
                let links = self.links(symbol);
                if links.resolved_type.is_none() {
                    links.resolved_type = Some(init_type);
                }
            }
        } else if let Some(declared) = declared {
            if let Some(symbol) = symbol {
                let links = self.links(symbol);
                if links.resolved_type.is_none() {
                    links.resolved_type = Some(declared);
                }
            }
        } else if let Some(symbol) = symbol {
            // No annotation and no initializer: the variable starts as the
            // `auto` placeholder and assignment analysis fills it in.
            let auto = self.types.auto_type;
            let links = self.links(symbol);
            if links.resolved_type.is_none() {
                links.resolved_type = Some(auto);
            }
        }
    }

    // ========================================================================
    // Functions
    // ========================================================================

    fn check_function_declaration(&mut self, node: &'a FunctionDeclaration<'a>) {
        // Resolving the symbol's type builds and caches the signature.
        if let Some(symbol) = self.binder.node_symbols.get(&node.data.id).copied() {
            self.get_type_of_symbol(symbol);
        }
        if node.body.is_some() {
            self.check_node_deferred(DeferredKind::FunctionBody(node));
        }
    }

    fn check_function_body(&mut self, node: &'a FunctionDeclaration<'a>) {
        let type_params = self.push_signature_scope(node.data.id, node.type_parameters);
        self.check_function_like_body(
            node.data.id,
            node.parameters,
            node.return_type,
            node.body,
            node.data.range,
        );
        self.pop_type_parameters(type_params);
    }

    fn check_method_body(&mut self, node: &'a MethodDeclaration<'a>) {
        let type_params = self.push_signature_scope(node.data.id, node.type_parameters);
        self.check_function_like_body(
            node.data.id,
            node.parameters,
            node.return_type,
            node.body,
            node.data.range,
        );
        self.pop_type_parameters(type_params);
    }

    fn check_ctor_body(&mut self, node: &'a ConstructorDeclaration<'a>) {
        self.check_function_like_body(node.data.id, node.parameters, None, node.body, node.data.range);
    }

    pub(crate) fn check_function_like_body(
        &mut self,
        container: NodeId,
        parameters: &'a [ParameterDeclaration<'a>],
        return_type: Option<&'a TypeNode<'a>>,
        body: Option<&'a Block<'a>>,
        range: TextRange,
    ) {
        for param in parameters.iter() {
            self.check_parameter(param);
        }
        let declared_return = return_type.map(|node| self.get_type_from_type_node(node));
        let Some(body) = body else { return };

        self.scope_stack.push(container);
        self.return_types.push(declared_return);
        for statement in body.statements.iter() {
            self.check_statement(statement);
        }
        self.return_types.pop();
        self.scope_stack.pop();

        if let Some(declared_return) = declared_return {
            let flags = self.types.flags(declared_return);
            if !flags.intersects(TypeFlags::ANY | TypeFlags::VOID_LIKE | TypeFlags::NEVER)
                && !self.body_has_return_value(body)
            {
                self.error(
                    range,
                    &messages::A_FUNCTION_WHOSE_DECLARED_TYPE_IS_NEITHER_UNDEFINED_NOR_VOID_MUST_RETURN_A_VALUE,
                    &[],
                );
            }
        }
    }

    pub(crate) fn check_parameter(&mut self, param: &ParameterDeclaration<'a>) {
        let declared = param
            .type_annotation
            .map(|annotation| self.get_type_from_type_node(annotation));
        if let Some(init) = param.initializer {
            let init_type = self.check_expression(init, CheckMode::NORMAL);
            if let Some(declared) = declared {
                let widened = self.get_widened_literal_like_type_for_relation(init_type, declared);
                self.check_type_assignable_to_and_report(
                    widened,
                    declared,
                    init.data().range,
                    Some(init),
                );
            }
        }
        if declared.is_none() && param.initializer.is_none() && self.options.no_implicit_any() {
            // Parameters of context-typed function expressions get their
            // types from the contextual signature instead; those are
            // resolved before this check runs.
            if let Some(symbol) = self.binder.node_symbols.get(&param.data.id).copied() {
                if self.links(symbol).resolved_type.is_none() {
                    self.error(
                        param.data.range,
                        &messages::PARAMETER_0_IMPLICITLY_HAS_AN_1_TYPE,
                        &[&param.name.text_name, "any"],
                    );
                    let any = self.types.any_type;
                    self.links(symbol).resolved_type = Some(any);
                }
            }
        }
    }

    pub(crate) fn body_has_return_value(&self, body: &Block<'a>) -> bool {
        fn statement_returns(statement: &Statement<'_>) -> bool {
            match statement {
                Statement::Return(r) => r.expression.is_some(),
                Statement::Block(b) => b.statements.iter().any(statement_returns),
                Statement::If(i) => {
                    statement_returns(i.then_statement)
                        || i.else_statement.map_or(false, statement_returns)
                }
                Statement::While(w) => statement_returns(w.statement),
                Statement::For(f) => statement_returns(f.statement),
                Statement::ForOf(f) => statement_returns(f.statement),
                Statement::ForIn(f) => statement_returns(f.statement),
                Statement::Switch(s) => s.clauses.iter().any(|c| match c {
                    CaseOrDefaultClause::Case(c) => c.statements.iter().any(statement_returns),
                    CaseOrDefaultClause::Default(d) => d.statements.iter().any(statement_returns),
                }),
                Statement::Try(t) => {
                    t.try_block.statements.iter().any(statement_returns)
                        || t.catch_clause
                            .map_or(false, |c| c.block.statements.iter().any(statement_returns))
                        || t.finally_block
                            .map_or(false, |f| f.statements.iter().any(statement_returns))
                }
                Statement::Throw(_) => true,
                _ => false,
            }
        }
        body.statements.iter().any(statement_returns)
    }

    // ========================================================================
    // Classes, interfaces, aliases, enums, namespaces
    // ========================================================================

    fn check_class_declaration(&mut self, node: &'a ClassDeclaration<'a>) {
        let Some(symbol) = self.binder.node_symbols.get(&node.data.id).copied() else {
            return;
        };
        let instance_type = self.get_declared_type_of_symbol(symbol);
        self.class_stack.push(symbol);
        let pushed_scope = self.push_symbol_type_param_scope(symbol);

        if let Some(extends) = node.extends {
            let base = self.check_heritage_entry(extends);
            if !self.types.is_error(base) && !self.types.is_error(instance_type) {
                // Base members must be compatible with the derived type's
                // own members; structural assignability covers it.
                let assignable = self.is_type_assignable_to(instance_type, base);
                if !assignable {
                    let derived_name = self.symbol_name(symbol);
                    let base_name = self.type_to_string(base);
                    self.error(
                        extends.data.range,
                        &messages::CLASS_0_INCORRECTLY_EXTENDS_BASE_CLASS_1,
                        &[&derived_name, &base_name],
                    );
                }
            }
        }
        for implements in node.implements.iter() {
            let target = self.check_heritage_entry(implements);
            if !self.types.is_error(target)
                && !self.types.is_error(instance_type)
                && !self.is_type_assignable_to(instance_type, target)
            {
                let class_name = self.symbol_name(symbol);
                let target_name = self.type_to_string(target);
                self.error(
                    implements.data.range,
                    &messages::CLASS_0_INCORRECTLY_IMPLEMENTS_INTERFACE_1,
                    &[&class_name, &target_name],
                );
            }
        }

        for member in node.members.iter() {
            match *member {
                ClassElement::Property(p) => self.check_property_declaration(p),
                ClassElement::Method(m) => {
                    if let Some(member_symbol) =
                        self.binder.node_symbols.get(&m.data.id).copied()
                    {
                        self.get_type_of_symbol(member_symbol);
                    }
                    if m.body.is_some() {
                        self.check_node_deferred(DeferredKind::MethodBody(m));
                    }
                }
                ClassElement::Constructor(c) => {
                    if c.body.is_some() {
                        self.check_node_deferred(DeferredKind::CtorBody(c));
                    }
                }
                ClassElement::IndexSignature(_) => {}
            }
        }

        if pushed_scope {
            self.type_param_scopes.pop();
        }
        self.class_stack.pop();
    }

    fn check_property_declaration(&mut self, node: &PropertyDeclaration<'a>) {
        let declared = node
            .type_annotation
            .map(|annotation| self.get_type_from_type_node(annotation));
        if let Some(init) = node.initializer {
            let init_type = match declared {
                Some(declared) => {
                    let t = self.check_expression_with_contextual_type(init, declared, CheckMode::NORMAL);
                    let widened = self.get_widened_literal_like_type_for_relation(t, declared);
                    self.check_type_assignable_to_and_report(
                        widened,
                        declared,
                        init.data().range,
                        Some(init),
                    );
                    declared
                }
                None => self.check_expression(init, CheckMode::NORMAL),
            };
            let _ = init_type;
        } else if declared.is_none()
            && self.options.no_implicit_any()
            && !node.data.modifier_flags.contains(ModifierFlags::AMBIENT)
        {
            let name = node.name.text();
            self.error(
                node.data.range,
                &messages::MEMBER_0_IMPLICITLY_HAS_AN_1_TYPE,
                &[&name, "any"],
            );
        }
    }

    fn check_heritage_entry(&mut self, entry: &ExpressionWithTypeArguments<'a>) -> TypeId {
        // The heritage expression names a class or interface; resolve it
        // on the type side.
        let Expression::Identifier(ident) = *entry.expression.skip_parens() else {
            return self.check_expression(entry.expression, CheckMode::NORMAL);
        };
        let Some(symbol) = self.resolve_name(ident.text) else {
            self.error(
                ident.data.range,
                &messages::CANNOT_FIND_NAME_0,
                &[&ident.text_name],
            );
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

    fn check_interface_declaration(&mut self, node: &'a InterfaceDeclaration<'a>) {
        let Some(symbol) = self.binder.node_symbols.get(&node.data.id).copied() else {
            return;
        };
        // Resolving the declared type checks bases and member types.
        let declared = self.get_declared_type_of_symbol(symbol);
        let pushed_scope = self.push_symbol_type_param_scope(symbol);
        for entry in node.extends.iter() {
            self.check_heritage_entry(entry);
        }
        // Force member types so annotation errors surface here.
        let members = self.resolve_structured_members(declared);
        let props: Vec<SymbolId> = members.properties.values().copied().collect();
        for prop in props {
            self.get_type_of_symbol(prop);
        }
        if pushed_scope {
            self.type_param_scopes.pop();
        }
    }

    fn check_type_alias_declaration(&mut self, node: &'a TypeAliasDeclaration<'a>) {
        if let Some(symbol) = self.binder.node_symbols.get(&node.data.id).copied() {
            self.get_declared_type_of_symbol(symbol);
        }
    }

    fn check_enum_declaration(&mut self, node: &'a EnumDeclaration<'a>) {
        if let Some(symbol) = self.binder.node_symbols.get(&node.data.id).copied() {
            self.compute_enum_member_values(symbol);
            self.get_declared_type_of_symbol(symbol);
        }
    }

    fn check_namespace_declaration(&mut self, node: &'a NamespaceDeclaration<'a>) {
        self.scope_stack.push(node.data.id);
        for statement in node.statements.iter() {
            self.check_statement(statement);
        }
        self.scope_stack.pop();
    }

    fn check_import_declaration(&mut self, node: &'a ImportDeclaration<'a>) {
        if !self.module_map.contains_key(&node.specifier) {
            self.error(
                node.data.range,
                &messages::CANNOT_FIND_MODULE_0,
                &[&node.specifier],
            );
            return;
        }
        // Resolving each alias surfaces missing-export diagnostics.
        let mut alias_nodes: Vec<NodeId> = Vec::new();
        if let Some(default_name) = node.default_name {
            alias_nodes.push(default_name.data.id);
        }
        if let Some(namespace_name) = node.namespace_name {
            alias_nodes.push(namespace_name.data.id);
        }
        for spec in node.named.iter() {
            alias_nodes.push(spec.data.id);
        }
        for alias_node in alias_nodes {
            if let Some(symbol) = self.binder.node_symbols.get(&alias_node).copied() {
                self.resolve_alias(symbol);
            }
        }
    }

    fn check_export_declaration(&mut self, node: &'a ExportDeclaration<'a>) {
        if let Some(specifier) = &node.specifier {
            if !self.module_map.contains_key(specifier) {
                self.error(
                    node.data.range,
                    &messages::CANNOT_FIND_MODULE_0,
                    &[specifier],
                );
                return;
            }
        }
        for spec in node.named.iter() {
            if let Some(symbol) = self.binder.node_symbols.get(&spec.data.id).copied() {
                self.resolve_alias(symbol);
            }
        }
    }

    // ========================================================================
    // Type parameter scopes
    // ========================================================================

    /// Create type parameter types for a declaration's parameter list and
    /// push them into scope. Constraints and defaults resolve after all
    /// parameters exist so they may refer to one another.
    pub(crate) fn push_type_parameters(
        &mut self,
        declarations: Option<&'a [TypeParameterDeclaration<'a>]>,
    ) -> Option<Vec<TypeId>> {
        let declarations = declarations?;
        let params = self.create_type_parameters(declarations);
        Some(params)
    }

    pub(crate) fn create_type_parameters(
        &mut self,
        declarations: &'a [TypeParameterDeclaration<'a>],
    ) -> Vec<TypeId> {
        let mut scope = FxHashMap::default();
        let mut params = Vec::with_capacity(declarations.len());
        for decl in declarations.iter() {
            let param = self.types.new_type(
                tycheck_ast::types::TypeFlags::TYPE_PARAMETER,
                tycheck_ast::types::ObjectFlags::NONE,
                crate::types::TypeKind::TypeParameter {
                    name: decl.name.text_name.clone(),
                    is_this: false,
                },
            );
            if let Some(symbol) = self.binder.node_symbols.get(&decl.data.id).copied() {
                self.types.get_mut(param).symbol = Some(symbol);
            }
            scope.insert(decl.name.text, param);
            params.push(param);
        }
        self.type_param_scopes.push(scope);
        for (decl, &param) in declarations.iter().zip(params.iter()) {
            let constraint = decl.constraint.map(|c| self.get_type_from_type_node(c));
            self.param_constraints.insert(param, constraint);
            if let Some(default) = decl.default {
                let default_type = self.get_type_from_type_node(default);
                self.param_defaults.insert(param, default_type);
            }
        }
        params
    }

    pub(crate) fn pop_type_parameters(&mut self, params: Option<Vec<TypeId>>) {
        if params.is_some() {
            self.type_param_scopes.pop();
        }
    }

    /// Push the scope of a declaration's own type parameters, as created
    /// when its declared type resolved. Returns whether a scope was pushed.
    pub(crate) fn push_symbol_type_param_scope(&mut self, symbol: SymbolId) -> bool {
        let params = self.links(symbol).type_params.clone().unwrap_or_default();
        if params.is_empty() {
            return false;
        }
        self.push_param_list_scope(&params);
        true
    }

    pub(crate) fn push_param_list_scope(&mut self, params: &[TypeId]) {
        let mut scope = FxHashMap::default();
        for &param in params {
            if let crate::types::TypeKind::TypeParameter { name, .. } = &self.types.get(param).kind
            {
                let interned = self.interner.intern(name);
                scope.insert(interned, param);
            }
        }
        self.type_param_scopes.push(scope);
    }

    /// Re-enter the type parameters a declaration's signature was built
    /// with; falls back to fresh parameters when no signature was cached.
    pub(crate) fn push_signature_scope(
        &mut self,
        node_id: NodeId,
        fallback: Option<&'a [TypeParameterDeclaration<'a>]>,
    ) -> Option<Vec<TypeId>> {
        if let Some(&signature) = self.node_signatures.get(&node_id) {
            let params = self.signature(signature).type_params.clone();
            if params.is_empty() {
                return None;
            }
            self.push_param_list_scope(&params);
            return Some(params);
        }
        self.push_type_parameters(fallback)
    }

    pub(crate) fn lookup_type_parameter(&self, name: InternedString) -> Option<TypeId> {
        for scope in self.type_param_scopes.iter().rev() {
            if let Some(&param) = scope.get(&name) {
                return Some(param);
            }
        }
        None
    }

    pub(crate) fn symbol_name(&self, symbol: SymbolId) -> String {
        self.binder.symbols.get(symbol).name_text.clone()
    }

    pub(crate) fn symbol_flags(&self, symbol: SymbolId) -> SymbolFlags {
        self.binder.symbols.get(symbol).flags
    }
}

