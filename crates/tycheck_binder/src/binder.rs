//! The binder walk.

use crate::symbol::{SymbolArena, SymbolTable};
use rustc_hash::FxHashMap;
use tycheck_ast::node::*;
use tycheck_ast::types::{ModifierFlags, NodeId, SourceFileId, SymbolFlags, SymbolId};
use tycheck_core::intern::{InternedString, StringInterner};
use tycheck_diagnostics::{messages, Diagnostic, DiagnosticCollection};

/// Back-reference from a declaration's node id to its AST node, so the
/// checker can resolve symbol types on demand.
#[derive(Debug, Clone, Copy)]
pub enum DeclRef<'a> {
    Variable(&'a VariableDeclaration<'a>, bool),
    CatchVariable(&'a VariableDeclaration<'a>),
    Function(&'a FunctionDeclaration<'a>),
    Class(&'a ClassDeclaration<'a>),
    Interface(&'a InterfaceDeclaration<'a>),
    TypeAlias(&'a TypeAliasDeclaration<'a>),
    Enum(&'a EnumDeclaration<'a>),
    EnumMember(&'a EnumMember<'a>, &'a EnumDeclaration<'a>),
    Namespace(&'a NamespaceDeclaration<'a>),
    Param(&'a ParameterDeclaration<'a>),
    Property(&'a PropertyDeclaration<'a>),
    Method(&'a MethodDeclaration<'a>),
    Ctor(&'a ConstructorDeclaration<'a>),
    PropertySig(&'a PropertySignatureNode<'a>),
    MethodSig(&'a MethodSignatureNode<'a>),
    CallSig(&'a CallSignatureNode<'a>),
    CtorSig(&'a ConstructSignatureNode<'a>),
    IndexSig(&'a IndexSignatureNode<'a>),
    ImportSpec(&'a ImportSpecifier<'a>, &'a ImportDeclaration<'a>),
    ImportDefault(&'a ImportDeclaration<'a>),
    ImportNamespace(&'a ImportDeclaration<'a>),
    ExportSpec(&'a ExportSpecifier<'a>, &'a ExportDeclaration<'a>),
    Arrow(&'a ArrowFunction<'a>),
    FunctionExpr(&'a FunctionExpression<'a>),
}

/// Where an alias declaration points.
#[derive(Debug, Clone)]
pub enum AliasKind {
    /// `import { name } from specifier` (or renamed).
    Named { export_name: InternedString },
    /// `import d from specifier`.
    Default,
    /// `import * as ns from specifier`.
    Namespace,
    /// `export { local }` — alias to a symbol of the same file.
    LocalExport { local_name: InternedString },
    /// `export { name } from specifier`.
    ReExport { export_name: InternedString },
}

#[derive(Debug, Clone)]
pub struct AliasDeclInfo {
    pub kind: AliasKind,
    /// Module specifier; empty for `LocalExport`.
    pub specifier: String,
    pub from_file: SourceFileId,
}

/// Destination for a declaration.
enum Target {
    Locals(NodeId),
    Members(SymbolId),
    Exports(SymbolId),
    FileExports,
}

pub struct Binder<'a> {
    interner: StringInterner,
    pub symbols: SymbolArena,
    pub diagnostics: DiagnosticCollection,
    /// Root container node of each file; top-level locals live in
    /// `container_locals` under this id.
    pub file_roots: FxHashMap<SourceFileId, NodeId>,
    /// Locals declared directly inside a container node (function body,
    /// block, namespace body). Keyed by the container's node id.
    pub container_locals: FxHashMap<NodeId, SymbolTable>,
    /// Export table per file.
    pub file_exports: FxHashMap<SourceFileId, SymbolTable>,
    /// `export * from` specifiers per file.
    pub star_exports: FxHashMap<SourceFileId, Vec<String>>,
    /// Declaration node -> its merged symbol.
    pub node_symbols: FxHashMap<NodeId, SymbolId>,
    /// Declaration node -> AST back-reference.
    pub decls: FxHashMap<NodeId, DeclRef<'a>>,
    /// Alias symbol -> what it refers to.
    pub alias_decls: FxHashMap<SymbolId, AliasDeclInfo>,
    current_file: SourceFileId,
    file_name: String,
}

impl<'a> Binder<'a> {
    pub fn new(interner: &StringInterner) -> Self {
        Self {
            interner: interner.clone(),
            symbols: SymbolArena::new(),
            diagnostics: DiagnosticCollection::new(),
            file_roots: FxHashMap::default(),
            container_locals: FxHashMap::default(),
            file_exports: FxHashMap::default(),
            star_exports: FxHashMap::default(),
            node_symbols: FxHashMap::default(),
            decls: FxHashMap::default(),
            alias_decls: FxHashMap::default(),
            current_file: SourceFileId(0),
            file_name: String::new(),
        }
    }

    pub fn interner(&self) -> &StringInterner {
        &self.interner
    }

    pub fn bind_source_file(&mut self, file: &SourceFile<'a>, file_id: SourceFileId) {
        self.current_file = file_id;
        self.file_name = file.file_name.clone();
        self.file_exports.entry(file_id).or_default();
        let container = file.data.id;
        self.file_roots.insert(file_id, container);
        self.container_locals.entry(container).or_default();
        for statement in file.statements.iter() {
            self.bind_statement(statement, container, true);
        }
    }

    // ========================================================================
    // Symbol declaration and merging
    // ========================================================================

    fn error_at(&mut self, node: &NodeData, message: &tycheck_diagnostics::DiagnosticMessage, args: &[&str]) -> Diagnostic {
        Diagnostic::with_location(self.file_name.clone(), node.range.to_span(), message, args)
    }

    fn table_get(&self, target: &Target, name: &InternedString) -> Option<SymbolId> {
        match target {
            Target::Locals(container) => self
                .container_locals
                .get(container)
                .and_then(|t| t.get(name)),
            Target::Members(symbol) => self
                .symbols
                .get(*symbol)
                .members
                .as_ref()
                .and_then(|t| t.get(name)),
            Target::Exports(symbol) => self
                .symbols
                .get(*symbol)
                .exports
                .as_ref()
                .and_then(|t| t.get(name)),
            Target::FileExports => self
                .file_exports
                .get(&self.current_file)
                .and_then(|t| t.get(name)),
        }
    }

    fn table_set(&mut self, target: &Target, name: InternedString, symbol: SymbolId) {
        match target {
            Target::Locals(container) => {
                self.container_locals.entry(*container).or_default().set(name, symbol);
            }
            Target::Members(owner) => {
                self.symbols
                    .get_mut(*owner)
                    .members
                    .get_or_insert_with(SymbolTable::new)
                    .set(name, symbol);
            }
            Target::Exports(owner) => {
                self.symbols
                    .get_mut(*owner)
                    .exports
                    .get_or_insert_with(SymbolTable::new)
                    .set(name, symbol);
            }
            Target::FileExports => {
                self.file_exports
                    .entry(self.current_file)
                    .or_default()
                    .set(name, symbol);
            }
        }
    }

    /// Declare `name` in `target`, merging into an existing symbol when the
    /// flags are compatible and reporting a conflict otherwise.
    fn declare_symbol(
        &mut self,
        target: Target,
        name: InternedString,
        name_text: &str,
        flags: SymbolFlags,
        excludes: SymbolFlags,
        node: &NodeData,
        decl: DeclRef<'a>,
        is_value_decl: bool,
    ) -> SymbolId {
        let existing = self.table_get(&target, &name);
        let symbol_id = match existing {
            Some(existing_id) => {
                let existing_flags = self.symbols.get(existing_id).flags;
                if existing_flags.intersects(excludes) {
                    self.report_merge_conflict(existing_id, name_text, flags, node);
                    // Fresh symbol so downstream checking still has one.
                    let fresh = self.symbols.alloc(name, name_text.to_string(), flags);
                    self.table_set(&target, name, fresh);
                    fresh
                } else {
                    self.symbols.get_mut(existing_id).flags |= flags;
                    existing_id
                }
            }
            None => {
                let fresh = self.symbols.alloc(name, name_text.to_string(), flags);
                self.table_set(&target, name, fresh);
                fresh
            }
        };
        let symbol = self.symbols.get_mut(symbol_id);
        symbol.declarations.push(node.id);
        if is_value_decl && symbol.value_declaration.is_none() {
            symbol.value_declaration = Some(node.id);
        }
        if let Target::Members(owner) | Target::Exports(owner) = target {
            self.symbols.get_mut(symbol_id).parent = Some(owner);
        }
        self.node_symbols.insert(node.id, symbol_id);
        self.decls.insert(node.id, decl);
        symbol_id
    }

    fn report_merge_conflict(
        &mut self,
        existing: SymbolId,
        name_text: &str,
        incoming_flags: SymbolFlags,
        node: &NodeData,
    ) {
        let existing_flags = self.symbols.get(existing).flags;
        let message = if existing_flags.intersects(SymbolFlags::BLOCK_SCOPED_VARIABLE)
            || incoming_flags.intersects(SymbolFlags::BLOCK_SCOPED_VARIABLE)
        {
            &messages::CANNOT_REDECLARE_BLOCK_SCOPED_VARIABLE_0
        } else if existing_flags.intersects(SymbolFlags::ENUM)
            || incoming_flags.intersects(SymbolFlags::ENUM)
        {
            &messages::ENUM_DECLARATIONS_CAN_ONLY_MERGE_WITH_NAMESPACE_OR_OTHER_ENUM_DECLARATIONS
        } else {
            &messages::DUPLICATE_IDENTIFIER_0
        };
        let mut diagnostic = self.error_at(node, message, &[name_text]);
        let prior_decls: Vec<NodeId> = self.symbols.get(existing).declarations.clone();
        for prior in prior_decls {
            if let Some(decl) = self.decls.get(&prior) {
                let range = decl_range(decl);
                diagnostic.add_related(Diagnostic::with_location(
                    self.file_name.clone(),
                    range.to_span(),
                    &messages::_0_WAS_ALSO_DECLARED_HERE,
                    &[name_text],
                ));
            }
        }
        self.diagnostics.add(diagnostic);
    }

    /// Merge every entry of `source` into `target`, used for namespace and
    /// module augmentation shapes. With `unidirectional` set the source
    /// table is left untouched and conflicts only report on the target.
    pub fn merge_symbol_table(
        &mut self,
        target_owner: SymbolId,
        source: &SymbolTable,
        _unidirectional: bool,
    ) {
        let entries: Vec<(InternedString, SymbolId)> =
            source.iter().map(|(n, s)| (*n, *s)).collect();
        for (name, source_id) in entries {
            let existing = self
                .symbols
                .get(target_owner)
                .exports
                .as_ref()
                .and_then(|t| t.get(&name));
            match existing {
                Some(target_id) if target_id != source_id => {
                    self.merge_symbol(target_id, source_id);
                }
                Some(_) => {}
                None => {
                    self.symbols
                        .get_mut(target_owner)
                        .exports
                        .get_or_insert_with(SymbolTable::new)
                        .set(name, source_id);
                }
            }
        }
    }

    /// Merge `source` into `target`. Flags union, declarations concatenate,
    /// nested tables merge recursively; excluded-flag conflicts report a
    /// duplicate on every source declaration.
    pub fn merge_symbol(&mut self, target: SymbolId, source: SymbolId) {
        let source_flags = self.symbols.get(source).flags;
        let target_flags = self.symbols.get(target).flags;
        if target_flags.intersects(get_excluded_symbol_flags(source_flags)) {
            let name_text = self.symbols.get(source).name_text.clone();
            let decls: Vec<NodeId> = self.symbols.get(source).declarations.clone();
            for node_id in decls {
                if let Some(decl) = self.decls.get(&node_id).copied() {
                    let range = decl_range(&decl);
                    let diagnostic = Diagnostic::with_location(
                        self.file_name.clone(),
                        range.to_span(),
                        &messages::DUPLICATE_IDENTIFIER_0,
                        &[&name_text],
                    );
                    self.diagnostics.add(diagnostic);
                }
            }
            return;
        }
        let (source_decls, source_value_decl, source_members, source_exports) = {
            let s = self.symbols.get(source);
            (
                s.declarations.clone(),
                s.value_declaration,
                s.members.clone(),
                s.exports.clone(),
            )
        };
        let t = self.symbols.get_mut(target);
        t.flags |= source_flags;
        t.declarations.extend(source_decls.iter().copied());
        if t.value_declaration.is_none() {
            t.value_declaration = source_value_decl;
        }
        if let Some(members) = source_members {
            for (name, id) in members.iter() {
                let name = *name;
                let id = *id;
                let existing = self
                    .symbols
                    .get(target)
                    .members
                    .as_ref()
                    .and_then(|m| m.get(&name));
                match existing {
                    Some(existing_id) if existing_id != id => self.merge_symbol(existing_id, id),
                    Some(_) => {}
                    None => self
                        .symbols
                        .get_mut(target)
                        .members
                        .get_or_insert_with(SymbolTable::new)
                        .set(name, id),
                }
            }
        }
        if let Some(exports) = source_exports {
            self.merge_symbol_table(target, &exports, false);
        }
        for node_id in source_decls {
            self.node_symbols.insert(node_id, target);
        }
    }

    // ========================================================================
    // Statement binding
    // ========================================================================

    fn bind_statement(&mut self, statement: &Statement<'a>, container: NodeId, top_level: bool) {
        match *statement {
            Statement::Variable(n) => self.bind_variable_statement(n, container, top_level),
            Statement::Function(n) => self.bind_function_declaration(n, container, top_level),
            Statement::Class(n) => self.bind_class_declaration(n, container, top_level),
            Statement::Interface(n) => self.bind_interface_declaration(n, container, top_level),
            Statement::TypeAlias(n) => self.bind_type_alias(n, container, top_level),
            Statement::Enum(n) => self.bind_enum_declaration(n, container, top_level),
            Statement::Namespace(n) => self.bind_namespace_declaration(n, container, top_level),
            Statement::Import(n) => self.bind_import_declaration(n, container),
            Statement::Export(n) => self.bind_export_declaration(n),
            Statement::Expression(n) => self.bind_expression(n.expression, container),
            Statement::Return(n) => {
                if let Some(expr) = n.expression {
                    self.bind_expression(expr, container);
                }
            }
            Statement::If(n) => {
                self.bind_expression(n.expression, container);
                self.bind_statement(n.then_statement, container, false);
                if let Some(else_statement) = n.else_statement {
                    self.bind_statement(else_statement, container, false);
                }
            }
            Statement::While(n) => {
                self.bind_expression(n.expression, container);
                self.bind_statement(n.statement, container, false);
            }
            Statement::For(n) => {
                if let Some(init) = &n.initializer {
                    self.bind_for_initializer(init, container);
                }
                if let Some(cond) = n.condition {
                    self.bind_expression(cond, container);
                }
                if let Some(inc) = n.incrementor {
                    self.bind_expression(inc, container);
                }
                self.bind_statement(n.statement, container, false);
            }
            Statement::ForOf(n) => {
                self.bind_for_initializer(&n.initializer, container);
                self.bind_expression(n.expression, container);
                self.bind_statement(n.statement, container, false);
            }
            Statement::ForIn(n) => {
                self.bind_for_initializer(&n.initializer, container);
                self.bind_expression(n.expression, container);
                self.bind_statement(n.statement, container, false);
            }
            Statement::Switch(n) => {
                self.bind_expression(n.expression, container);
                for clause in n.clauses.iter() {
                    match clause {
                        CaseOrDefaultClause::Case(c) => {
                            self.bind_expression(c.expression, container);
                            for s in c.statements.iter() {
                                self.bind_statement(s, container, false);
                            }
                        }
                        CaseOrDefaultClause::Default(d) => {
                            for s in d.statements.iter() {
                                self.bind_statement(s, container, false);
                            }
                        }
                    }
                }
            }
            Statement::Throw(n) => self.bind_expression(n.expression, container),
            Statement::Try(n) => {
                self.bind_block(n.try_block);
                if let Some(catch) = n.catch_clause {
                    let catch_container = catch.block.data.id;
                    self.container_locals.entry(catch_container).or_default();
                    if let Some(variable) = catch.variable {
                        self.declare_symbol(
                            Target::Locals(catch_container),
                            variable.name.text,
                            &variable.name.text_name,
                            SymbolFlags::BLOCK_SCOPED_VARIABLE,
                            SymbolFlags::BLOCK_SCOPED_VARIABLE_EXCLUDES,
                            &variable.data,
                            DeclRef::CatchVariable(variable),
                            true,
                        );
                    }
                    for s in catch.block.statements.iter() {
                        self.bind_statement(s, catch_container, false);
                    }
                }
                if let Some(finally_block) = n.finally_block {
                    self.bind_block(finally_block);
                }
            }
            Statement::Block(n) => self.bind_block(n),
            Statement::Break(_) | Statement::Continue(_) | Statement::Empty(_) => {}
        }
    }

    fn bind_block(&mut self, block: &Block<'a>) {
        let container = block.data.id;
        self.container_locals.entry(container).or_default();
        for statement in block.statements.iter() {
            self.bind_statement(statement, container, false);
        }
    }

    fn bind_for_initializer(&mut self, init: &ForInitializer<'a>, container: NodeId) {
        match *init {
            ForInitializer::VariableDeclarationList(list) => {
                let block_scoped = list.is_block_scoped();
                for decl in list.declarations.iter() {
                    self.bind_variable_declaration(decl, container, block_scoped, list.is_const(), false);
                }
            }
            ForInitializer::Expression(expr) => self.bind_expression(expr, container),
        }
    }

    fn bind_variable_statement(
        &mut self,
        statement: &VariableStatement<'a>,
        container: NodeId,
        top_level: bool,
    ) {
        let list = statement.declaration_list;
        let exported = top_level
            && statement
                .data
                .modifier_flags
                .contains(ModifierFlags::EXPORT);
        for decl in list.declarations.iter() {
            let symbol = self.bind_variable_declaration(
                decl,
                container,
                list.is_block_scoped(),
                list.is_const(),
                exported,
            );
            let _ = symbol;
        }
    }

    fn bind_variable_declaration(
        &mut self,
        decl: &'a VariableDeclaration<'a>,
        container: NodeId,
        block_scoped: bool,
        is_const: bool,
        exported: bool,
    ) -> SymbolId {
        let (flags, excludes) = if block_scoped {
            (
                SymbolFlags::BLOCK_SCOPED_VARIABLE,
                SymbolFlags::BLOCK_SCOPED_VARIABLE_EXCLUDES,
            )
        } else {
            (
                SymbolFlags::FUNCTION_SCOPED_VARIABLE,
                SymbolFlags::FUNCTION_SCOPED_VARIABLE_EXCLUDES,
            )
        };
        let symbol = self.declare_symbol(
            Target::Locals(container),
            decl.name.text,
            &decl.name.text_name,
            flags,
            excludes,
            &decl.data,
            DeclRef::Variable(decl, is_const),
            true,
        );
        if exported {
            self.table_set(&Target::FileExports, decl.name.text, symbol);
        }
        if let Some(init) = decl.initializer {
            self.bind_expression(init, container);
        }
        symbol
    }

    fn bind_function_declaration(
        &mut self,
        decl: &'a FunctionDeclaration<'a>,
        container: NodeId,
        top_level: bool,
    ) {
        if let Some(name) = decl.name {
            let symbol = self.declare_symbol(
                Target::Locals(container),
                name.text,
                &name.text_name,
                SymbolFlags::FUNCTION,
                SymbolFlags::FUNCTION_EXCLUDES,
                &decl.data,
                DeclRef::Function(decl),
                true,
            );
            if top_level && decl.data.modifier_flags.contains(ModifierFlags::EXPORT) {
                self.table_set(&Target::FileExports, name.text, symbol);
            }
        }
        self.bind_function_like(decl.data.id, decl.parameters, decl.body);
    }

    /// Parameters and body locals live in a container keyed by the
    /// function-like node itself.
    fn bind_function_like(
        &mut self,
        node_id: NodeId,
        parameters: &'a [ParameterDeclaration<'a>],
        body: Option<&'a Block<'a>>,
    ) {
        self.container_locals.entry(node_id).or_default();
        for param in parameters.iter() {
            self.declare_symbol(
                Target::Locals(node_id),
                param.name.text,
                &param.name.text_name,
                SymbolFlags::FUNCTION_SCOPED_VARIABLE,
                SymbolFlags::FUNCTION_SCOPED_VARIABLE_EXCLUDES,
                &param.data,
                DeclRef::Param(param),
                true,
            );
            if let Some(init) = param.initializer {
                self.bind_expression(init, node_id);
            }
        }
        if let Some(body) = body {
            for statement in body.statements.iter() {
                self.bind_statement(statement, node_id, false);
            }
        }
    }

    fn bind_class_declaration(
        &mut self,
        decl: &'a ClassDeclaration<'a>,
        container: NodeId,
        top_level: bool,
    ) {
        let Some(name) = decl.name else { return };
        let class_symbol = self.declare_symbol(
            Target::Locals(container),
            name.text,
            &name.text_name,
            SymbolFlags::CLASS,
            SymbolFlags::CLASS_EXCLUDES,
            &decl.data,
            DeclRef::Class(decl),
            true,
        );
        if top_level && decl.data.modifier_flags.contains(ModifierFlags::EXPORT) {
            self.table_set(&Target::FileExports, name.text, class_symbol);
        }
        for member in decl.members.iter() {
            self.bind_class_member(member, class_symbol, decl.data.id);
        }
    }

    fn bind_class_member(
        &mut self,
        member: &ClassElement<'a>,
        class_symbol: SymbolId,
        class_container: NodeId,
    ) {
        match *member {
            ClassElement::Property(p) => {
                let is_static = p.data.modifier_flags.contains(ModifierFlags::STATIC);
                let target = if is_static {
                    Target::Exports(class_symbol)
                } else {
                    Target::Members(class_symbol)
                };
                let name_text = p.name.text();
                let name = self.interner.intern(&name_text);
                let mut flags = SymbolFlags::PROPERTY;
                if p.question {
                    flags |= SymbolFlags::OPTIONAL;
                }
                self.declare_symbol(
                    target,
                    name,
                    &name_text,
                    flags,
                    SymbolFlags::NONE,
                    &p.data,
                    DeclRef::Property(p),
                    true,
                );
                if let Some(init) = p.initializer {
                    self.container_locals.entry(class_container).or_default();
                    self.bind_expression(init, class_container);
                }
            }
            ClassElement::Method(m) => {
                let is_static = m.data.modifier_flags.contains(ModifierFlags::STATIC);
                let target = if is_static {
                    Target::Exports(class_symbol)
                } else {
                    Target::Members(class_symbol)
                };
                let name_text = m.name.text();
                let name = self.interner.intern(&name_text);
                let mut flags = SymbolFlags::METHOD;
                if m.question {
                    flags |= SymbolFlags::OPTIONAL;
                }
                self.declare_symbol(
                    target,
                    name,
                    &name_text,
                    flags,
                    SymbolFlags::NONE,
                    &m.data,
                    DeclRef::Method(m),
                    true,
                );
                self.bind_function_like(m.data.id, m.parameters, m.body);
            }
            ClassElement::Constructor(c) => {
                let name = self.interner.intern_static("__constructor");
                self.declare_symbol(
                    Target::Members(class_symbol),
                    name,
                    "__constructor",
                    SymbolFlags::CONSTRUCTOR,
                    SymbolFlags::NONE,
                    &c.data,
                    DeclRef::Ctor(c),
                    false,
                );
                self.bind_function_like(c.data.id, c.parameters, c.body);
            }
            ClassElement::IndexSignature(i) => {
                let name = self.interner.intern_static("__index");
                self.declare_symbol(
                    Target::Members(class_symbol),
                    name,
                    "__index",
                    SymbolFlags::SIGNATURE,
                    SymbolFlags::NONE,
                    &i.data,
                    DeclRef::IndexSig(i),
                    false,
                );
            }
        }
    }

    fn bind_interface_declaration(
        &mut self,
        decl: &'a InterfaceDeclaration<'a>,
        container: NodeId,
        top_level: bool,
    ) {
        let symbol = self.declare_symbol(
            Target::Locals(container),
            decl.name.text,
            &decl.name.text_name,
            SymbolFlags::INTERFACE,
            SymbolFlags::INTERFACE_EXCLUDES,
            &decl.data,
            DeclRef::Interface(decl),
            false,
        );
        if top_level && decl.data.modifier_flags.contains(ModifierFlags::EXPORT) {
            self.table_set(&Target::FileExports, decl.name.text, symbol);
        }
        for member in decl.members.iter() {
            self.bind_type_member(member, symbol);
        }
    }

    fn bind_type_member(&mut self, member: &TypeElement<'a>, owner: SymbolId) {
        match *member {
            TypeElement::PropertySignature(p) => {
                let name_text = p.name.text();
                let name = self.interner.intern(&name_text);
                let mut flags = SymbolFlags::PROPERTY;
                if p.question {
                    flags |= SymbolFlags::OPTIONAL;
                }
                self.declare_symbol(
                    Target::Members(owner),
                    name,
                    &name_text,
                    flags,
                    SymbolFlags::NONE,
                    &p.data,
                    DeclRef::PropertySig(p),
                    false,
                );
            }
            TypeElement::MethodSignature(m) => {
                let name_text = m.name.text();
                let name = self.interner.intern(&name_text);
                let mut flags = SymbolFlags::METHOD;
                if m.question {
                    flags |= SymbolFlags::OPTIONAL;
                }
                self.declare_symbol(
                    Target::Members(owner),
                    name,
                    &name_text,
                    flags,
                    SymbolFlags::NONE,
                    &m.data,
                    DeclRef::MethodSig(m),
                    false,
                );
            }
            TypeElement::CallSignature(c) => {
                let name = self.interner.intern_static("__call");
                self.declare_symbol(
                    Target::Members(owner),
                    name,
                    "__call",
                    SymbolFlags::SIGNATURE,
                    SymbolFlags::NONE,
                    &c.data,
                    DeclRef::CallSig(c),
                    false,
                );
            }
            TypeElement::ConstructSignature(c) => {
                let name = self.interner.intern_static("__new");
                self.declare_symbol(
                    Target::Members(owner),
                    name,
                    "__new",
                    SymbolFlags::SIGNATURE,
                    SymbolFlags::NONE,
                    &c.data,
                    DeclRef::CtorSig(c),
                    false,
                );
            }
            TypeElement::IndexSignature(i) => {
                let name = self.interner.intern_static("__index");
                self.declare_symbol(
                    Target::Members(owner),
                    name,
                    "__index",
                    SymbolFlags::SIGNATURE,
                    SymbolFlags::NONE,
                    &i.data,
                    DeclRef::IndexSig(i),
                    false,
                );
            }
        }
    }

    fn bind_type_alias(
        &mut self,
        decl: &'a TypeAliasDeclaration<'a>,
        container: NodeId,
        top_level: bool,
    ) {
        let symbol = self.declare_symbol(
            Target::Locals(container),
            decl.name.text,
            &decl.name.text_name,
            SymbolFlags::TYPE_ALIAS,
            SymbolFlags::TYPE_ALIAS_EXCLUDES,
            &decl.data,
            DeclRef::TypeAlias(decl),
            false,
        );
        if top_level && decl.data.modifier_flags.contains(ModifierFlags::EXPORT) {
            self.table_set(&Target::FileExports, decl.name.text, symbol);
        }
    }

    fn bind_enum_declaration(
        &mut self,
        decl: &'a EnumDeclaration<'a>,
        container: NodeId,
        top_level: bool,
    ) {
        let (flags, excludes) = if decl.is_const {
            (SymbolFlags::CONST_ENUM, SymbolFlags::CONST_ENUM_EXCLUDES)
        } else {
            (SymbolFlags::REGULAR_ENUM, SymbolFlags::REGULAR_ENUM_EXCLUDES)
        };
        let enum_symbol = self.declare_symbol(
            Target::Locals(container),
            decl.name.text,
            &decl.name.text_name,
            flags,
            excludes,
            &decl.data,
            DeclRef::Enum(decl),
            true,
        );
        if top_level && decl.data.modifier_flags.contains(ModifierFlags::EXPORT) {
            self.table_set(&Target::FileExports, decl.name.text, enum_symbol);
        }
        for member in decl.members.iter() {
            let name_text = member.name.text();
            if member.name.is_numeric() {
                let diagnostic = self.error_at(
                    member.name.data(),
                    &messages::AN_ENUM_MEMBER_CANNOT_HAVE_A_NUMERIC_NAME,
                    &[],
                );
                self.diagnostics.add(diagnostic);
            }
            let name = self.interner.intern(&name_text);
            self.declare_symbol(
                Target::Exports(enum_symbol),
                name,
                &name_text,
                SymbolFlags::ENUM_MEMBER,
                SymbolFlags::ENUM_MEMBER_EXCLUDES,
                &member.data,
                DeclRef::EnumMember(member, decl),
                true,
            );
        }
    }

    fn bind_namespace_declaration(
        &mut self,
        decl: &'a NamespaceDeclaration<'a>,
        container: NodeId,
        top_level: bool,
    ) {
        let symbol = self.declare_symbol(
            Target::Locals(container),
            decl.name.text,
            &decl.name.text_name,
            SymbolFlags::VALUE_MODULE,
            SymbolFlags::VALUE_MODULE_EXCLUDES,
            &decl.data,
            DeclRef::Namespace(decl),
            true,
        );
        if top_level && decl.data.modifier_flags.contains(ModifierFlags::EXPORT) {
            self.table_set(&Target::FileExports, decl.name.text, symbol);
        }
        // Namespace body declarations land in the namespace's container
        // locals; exported ones additionally land in its exports table.
        let ns_container = decl.data.id;
        self.container_locals.entry(ns_container).or_default();
        for statement in decl.statements.iter() {
            self.bind_statement(statement, ns_container, false);
        }
        let exported: Vec<(InternedString, SymbolId)> = decl
            .statements
            .iter()
            .filter(|s| s.data().modifier_flags.contains(ModifierFlags::EXPORT))
            .filter_map(|s| self.statement_name_symbol(s, ns_container))
            .collect();
        for (name, member) in exported {
            self.symbols
                .get_mut(symbol)
                .exports
                .get_or_insert_with(SymbolTable::new)
                .set(name, member);
            self.symbols.get_mut(member).parent = Some(symbol);
        }
    }

    fn statement_name_symbol(
        &self,
        statement: &Statement<'a>,
        container: NodeId,
    ) -> Option<(InternedString, SymbolId)> {
        let name = match *statement {
            Statement::Variable(v) => v.declaration_list.declarations.first()?.name.text,
            Statement::Function(f) => f.name?.text,
            Statement::Class(c) => c.name?.text,
            Statement::Interface(i) => i.name.text,
            Statement::TypeAlias(t) => t.name.text,
            Statement::Enum(e) => e.name.text,
            Statement::Namespace(n) => n.name.text,
            _ => return None,
        };
        let symbol = self.container_locals.get(&container)?.get(&name)?;
        Some((name, symbol))
    }

    fn bind_import_declaration(&mut self, decl: &'a ImportDeclaration<'a>, container: NodeId) {
        let file = self.current_file;
        if let Some(default_name) = decl.default_name {
            let mut flags = SymbolFlags::ALIAS;
            if decl.type_only {
                flags |= SymbolFlags::TYPE_ONLY;
            }
            let symbol = self.declare_symbol(
                Target::Locals(container),
                default_name.text,
                &default_name.text_name,
                flags,
                SymbolFlags::ALIAS_EXCLUDES,
                &default_name.data,
                DeclRef::ImportDefault(decl),
                false,
            );
            self.alias_decls.insert(
                symbol,
                AliasDeclInfo {
                    kind: AliasKind::Default,
                    specifier: decl.specifier.clone(),
                    from_file: file,
                },
            );
        }
        if let Some(namespace_name) = decl.namespace_name {
            let mut flags = SymbolFlags::ALIAS;
            if decl.type_only {
                flags |= SymbolFlags::TYPE_ONLY;
            }
            let symbol = self.declare_symbol(
                Target::Locals(container),
                namespace_name.text,
                &namespace_name.text_name,
                flags,
                SymbolFlags::ALIAS_EXCLUDES,
                &namespace_name.data,
                DeclRef::ImportNamespace(decl),
                false,
            );
            self.alias_decls.insert(
                symbol,
                AliasDeclInfo {
                    kind: AliasKind::Namespace,
                    specifier: decl.specifier.clone(),
                    from_file: file,
                },
            );
        }
        for spec in decl.named.iter() {
            let mut flags = SymbolFlags::ALIAS;
            if decl.type_only || spec.type_only {
                flags |= SymbolFlags::TYPE_ONLY;
            }
            let symbol = self.declare_symbol(
                Target::Locals(container),
                spec.name.text,
                &spec.name.text_name,
                flags,
                SymbolFlags::ALIAS_EXCLUDES,
                &spec.data,
                DeclRef::ImportSpec(spec, decl),
                false,
            );
            let export_name = spec.property_name.map(|p| p.text).unwrap_or(spec.name.text);
            self.alias_decls.insert(
                symbol,
                AliasDeclInfo {
                    kind: AliasKind::Named { export_name },
                    specifier: decl.specifier.clone(),
                    from_file: file,
                },
            );
        }
    }

    fn bind_export_declaration(&mut self, decl: &'a ExportDeclaration<'a>) {
        let file = self.current_file;
        if decl.is_star {
            if let Some(specifier) = &decl.specifier {
                self.star_exports
                    .entry(file)
                    .or_default()
                    .push(specifier.clone());
            }
            return;
        }
        for spec in decl.named.iter() {
            let local_name = spec.property_name.map(|p| p.text).unwrap_or(spec.name.text);
            let export_name = spec.name.text;
            let mut flags = SymbolFlags::ALIAS;
            if decl.type_only {
                flags |= SymbolFlags::TYPE_ONLY;
            }
            let symbol = self.symbols.alloc(
                export_name,
                spec.name.text_name.clone(),
                flags,
            );
            self.symbols.get_mut(symbol).declarations.push(spec.data.id);
            self.node_symbols.insert(spec.data.id, symbol);
            self.decls.insert(spec.data.id, DeclRef::ExportSpec(spec, decl));
            self.table_set(&Target::FileExports, export_name, symbol);
            let info = match &decl.specifier {
                Some(specifier) => AliasDeclInfo {
                    kind: AliasKind::ReExport {
                        export_name: local_name,
                    },
                    specifier: specifier.clone(),
                    from_file: file,
                },
                None => AliasDeclInfo {
                    kind: AliasKind::LocalExport { local_name },
                    specifier: String::new(),
                    from_file: file,
                },
            };
            self.alias_decls.insert(symbol, info);
        }
    }

    // ========================================================================
    // Expression binding (nested function-likes declare locals)
    // ========================================================================

    fn bind_expression(&mut self, expression: &Expression<'a>, container: NodeId) {
        match *expression {
            Expression::Arrow(arrow) => {
                self.container_locals.entry(arrow.data.id).or_default();
                for param in arrow.parameters.iter() {
                    self.declare_symbol(
                        Target::Locals(arrow.data.id),
                        param.name.text,
                        &param.name.text_name,
                        SymbolFlags::FUNCTION_SCOPED_VARIABLE,
                        SymbolFlags::FUNCTION_SCOPED_VARIABLE_EXCLUDES,
                        &param.data,
                        DeclRef::Param(param),
                        true,
                    );
                    if let Some(init) = param.initializer {
                        self.bind_expression(init, container);
                    }
                }
                match &arrow.body {
                    ArrowBody::Expression(e) => self.bind_expression(e, arrow.data.id),
                    ArrowBody::Block(b) => {
                        for s in b.statements.iter() {
                            self.bind_statement(s, arrow.data.id, false);
                        }
                    }
                }
                self.decls.insert(arrow.data.id, DeclRef::Arrow(arrow));
            }
            Expression::FunctionExpr(func) => {
                self.decls.insert(func.data.id, DeclRef::FunctionExpr(func));
                self.bind_function_like(func.data.id, func.parameters, Some(func.body));
            }
            Expression::Binary(n) => {
                self.bind_expression(n.left, container);
                self.bind_expression(n.right, container);
            }
            Expression::Conditional(n) => {
                self.bind_expression(n.condition, container);
                self.bind_expression(n.when_true, container);
                self.bind_expression(n.when_false, container);
            }
            Expression::Call(n) => {
                self.bind_expression(n.expression, container);
                for arg in n.arguments.iter() {
                    self.bind_expression(arg, container);
                }
            }
            Expression::New(n) => {
                self.bind_expression(n.expression, container);
                if let Some(args) = n.arguments {
                    for arg in args.iter() {
                        self.bind_expression(arg, container);
                    }
                }
            }
            Expression::PropertyAccess(n) => self.bind_expression(n.expression, container),
            Expression::ElementAccess(n) => {
                self.bind_expression(n.expression, container);
                self.bind_expression(n.argument, container);
            }
            Expression::Paren(n) => self.bind_expression(n.expression, container),
            Expression::PrefixUnary(n) => self.bind_expression(n.operand, container),
            Expression::PostfixUnary(n) => self.bind_expression(n.operand, container),
            Expression::TypeOf(n)
            | Expression::Void(n)
            | Expression::Delete(n)
            | Expression::Await(n)
            | Expression::Spread(n)
            | Expression::NonNull(n) => self.bind_expression(n.expression, container),
            Expression::As(n) | Expression::Satisfies(n) => {
                self.bind_expression(n.expression, container)
            }
            Expression::Array(n) => {
                for element in n.elements.iter() {
                    self.bind_expression(element, container);
                }
            }
            Expression::Object(n) => {
                for property in n.properties.iter() {
                    match property {
                        ObjectLiteralElement::Property(p) => {
                            self.bind_expression(p.initializer, container)
                        }
                        ObjectLiteralElement::Spread(s) => {
                            self.bind_expression(s.expression, container)
                        }
                        ObjectLiteralElement::Shorthand(_) => {}
                    }
                }
            }
            Expression::Template(n) => {
                for span in n.spans.iter() {
                    self.bind_expression(span.expression, container);
                }
            }
            _ => {}
        }
    }
}

/// Flags a symbol with `flags` cannot merge with.
pub fn get_excluded_symbol_flags(flags: SymbolFlags) -> SymbolFlags {
    let mut result = SymbolFlags::NONE;
    if flags.contains(SymbolFlags::BLOCK_SCOPED_VARIABLE) {
        result |= SymbolFlags::BLOCK_SCOPED_VARIABLE_EXCLUDES;
    }
    if flags.contains(SymbolFlags::FUNCTION_SCOPED_VARIABLE) {
        result |= SymbolFlags::FUNCTION_SCOPED_VARIABLE_EXCLUDES;
    }
    if flags.contains(SymbolFlags::FUNCTION) {
        result |= SymbolFlags::FUNCTION_EXCLUDES;
    }
    if flags.contains(SymbolFlags::CLASS) {
        result |= SymbolFlags::CLASS_EXCLUDES;
    }
    if flags.contains(SymbolFlags::INTERFACE) {
        result |= SymbolFlags::INTERFACE_EXCLUDES;
    }
    if flags.contains(SymbolFlags::REGULAR_ENUM) {
        result |= SymbolFlags::REGULAR_ENUM_EXCLUDES;
    }
    if flags.contains(SymbolFlags::CONST_ENUM) {
        result |= SymbolFlags::CONST_ENUM_EXCLUDES;
    }
    if flags.contains(SymbolFlags::VALUE_MODULE) {
        result |= SymbolFlags::VALUE_MODULE_EXCLUDES;
    }
    if flags.contains(SymbolFlags::TYPE_ALIAS) {
        result |= SymbolFlags::TYPE_ALIAS_EXCLUDES;
    }
    if flags.contains(SymbolFlags::ALIAS) {
        result |= SymbolFlags::ALIAS_EXCLUDES;
    }
    result
}

fn decl_range(decl: &DeclRef<'_>) -> tycheck_core::text::TextRange {
    match decl {
        DeclRef::Variable(n, _) => n.data.range,
        DeclRef::CatchVariable(n) => n.data.range,
        DeclRef::Function(n) => n.data.range,
        DeclRef::Class(n) => n.data.range,
        DeclRef::Interface(n) => n.data.range,
        DeclRef::TypeAlias(n) => n.data.range,
        DeclRef::Enum(n) => n.data.range,
        DeclRef::EnumMember(n, _) => n.data.range,
        DeclRef::Namespace(n) => n.data.range,
        DeclRef::Param(n) => n.data.range,
        DeclRef::Property(n) => n.data.range,
        DeclRef::Method(n) => n.data.range,
        DeclRef::Ctor(n) => n.data.range,
        DeclRef::PropertySig(n) => n.data.range,
        DeclRef::MethodSig(n) => n.data.range,
        DeclRef::CallSig(n) => n.data.range,
        DeclRef::CtorSig(n) => n.data.range,
        DeclRef::IndexSig(n) => n.data.range,
        DeclRef::ImportSpec(n, _) => n.data.range,
        DeclRef::ImportDefault(n) => n.data.range,
        DeclRef::ImportNamespace(n) => n.data.range,
        DeclRef::ExportSpec(n, _) => n.data.range,
        DeclRef::Arrow(n) => n.data.range,
        DeclRef::FunctionExpr(n) => n.data.range,
    }
}
