//! The parser.
//!
//! One `parse_*` method per production, allocating nodes into a bump arena
//! and returning `&'a` references. Ambiguous prefixes (arrow functions,
//! call type arguments, function types) are resolved by speculative
//! parsing with full scanner rollback.

use bumpalo::Bump;
use tycheck_ast::node::*;
use tycheck_ast::syntax_kind::SyntaxKind;
use tycheck_ast::types::{ModifierFlags, NodeFlags, NodeId};
use tycheck_core::intern::StringInterner;
use tycheck_core::text::TextSpan;
use tycheck_diagnostics::{messages, Diagnostic, DiagnosticMessage};
use tycheck_scanner::Scanner;

use SyntaxKind::*;

pub struct Parser<'a, 'src> {
    arena: &'a Bump,
    interner: StringInterner,
    scanner: Scanner<'src>,
    token: SyntaxKind,
    last_token_end: u32,
    file_name: String,
    next_node_id: u32,
    diagnostics: Vec<Diagnostic>,
}

struct SavedState<'src> {
    scanner: Scanner<'src>,
    token: SyntaxKind,
    last_token_end: u32,
    diagnostic_count: usize,
    next_node_id: u32,
}

impl<'a, 'src> Parser<'a, 'src> {
    pub fn new(
        arena: &'a Bump,
        interner: &StringInterner,
        file_name: &str,
        source: &'src str,
    ) -> Self {
        let mut scanner = Scanner::new(source);
        let token = scanner.scan();
        Self {
            arena,
            interner: interner.clone(),
            scanner,
            token,
            last_token_end: 0,
            file_name: file_name.to_string(),
            next_node_id: 0,
            diagnostics: Vec::new(),
        }
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    // ========================================================================
    // Token plumbing
    // ========================================================================

    fn next(&mut self) {
        self.last_token_end = self.scanner.token_end();
        self.token = self.scanner.scan();
    }

    fn token_pos(&self) -> u32 {
        self.scanner.token_pos()
    }

    fn node_id(&mut self) -> NodeId {
        let id = NodeId(self.next_node_id);
        self.next_node_id += 1;
        id
    }

    fn finish(&mut self, kind: SyntaxKind, pos: u32) -> NodeData {
        let id = self.node_id();
        NodeData::new(kind, pos, self.last_token_end.max(pos), id)
    }

    fn error(&mut self, message: &DiagnosticMessage, args: &[&str]) {
        let span = TextSpan::from_bounds(self.token_pos(), self.scanner.token_end());
        self.diagnostics.push(Diagnostic::with_location(
            self.file_name.clone(),
            span,
            message,
            args,
        ));
    }

    fn expect(&mut self, kind: SyntaxKind) -> bool {
        if self.token == kind {
            self.next();
            true
        } else {
            self.error(&messages::_0_EXPECTED, &[kind.text()]);
            false
        }
    }

    fn optional(&mut self, kind: SyntaxKind) -> bool {
        if self.token == kind {
            self.next();
            true
        } else {
            false
        }
    }

    fn save(&self) -> SavedState<'src> {
        SavedState {
            scanner: self.scanner.clone(),
            token: self.token,
            last_token_end: self.last_token_end,
            diagnostic_count: self.diagnostics.len(),
            next_node_id: self.next_node_id,
        }
    }

    fn restore(&mut self, state: SavedState<'src>) {
        self.scanner = state.scanner;
        self.token = state.token;
        self.last_token_end = state.last_token_end;
        self.diagnostics.truncate(state.diagnostic_count);
        self.next_node_id = state.next_node_id;
    }

    fn peek(&mut self) -> SyntaxKind {
        let state = self.save();
        self.next();
        let t = self.token;
        self.restore(state);
        t
    }

    fn alloc<T>(&self, value: T) -> &'a T {
        self.arena.alloc(value)
    }

    fn alloc_slice<T>(&self, values: Vec<T>) -> &'a [T] {
        self.arena.alloc_slice_fill_iter(values)
    }

    /// Accept `>` where the scanner may have merged it into a longer token.
    fn expect_type_arg_close(&mut self) -> bool {
        self.token = self.scanner.re_scan_greater_than();
        self.expect(GreaterThanToken)
    }

    // ========================================================================
    // Identifiers
    // ========================================================================

    fn is_identifier(&self) -> bool {
        matches!(
            self.token,
            Identifier
                | FromKeyword
                | OfKeyword
                | TypeKeyword
                | NamespaceKeyword
                | GetKeyword
                | SetKeyword
                | AsKeyword
                | InferKeyword
                | KeyOfKeyword
                | UniqueKeyword
                | SatisfiesKeyword
                | AbstractKeyword
                | DeclareKeyword
                | ReadonlyKeyword
                | AsyncKeyword
                | AwaitKeyword
        )
    }

    fn make_identifier(&mut self, pos: u32) -> &'a tycheck_ast::node::Identifier {
        let text_name = self.scanner.token_value().to_string();
        let text = self.interner.intern(&text_name);
        self.next();
        let data = self.finish(SyntaxKind::Identifier, pos);
        self.alloc(tycheck_ast::node::Identifier {
            data,
            text,
            text_name,
        })
    }

    fn parse_identifier(&mut self) -> &'a tycheck_ast::node::Identifier {
        let pos = self.token_pos();
        if self.is_identifier() {
            self.make_identifier(pos)
        } else {
            self.error(&messages::IDENTIFIER_EXPECTED, &[]);
            let text = self.interner.intern("");
            let data = self.finish(SyntaxKind::Identifier, pos);
            self.alloc(tycheck_ast::node::Identifier {
                data,
                text,
                text_name: String::new(),
            })
        }
    }

    /// After `.` any keyword is a valid member name.
    fn parse_member_name(&mut self) -> &'a tycheck_ast::node::Identifier {
        let pos = self.token_pos();
        if self.token == Identifier || self.token == PrivateIdentifier || self.token.is_keyword() {
            self.make_identifier(pos)
        } else {
            self.parse_identifier()
        }
    }

    fn parse_entity_name(&mut self) -> EntityName<'a> {
        let mut name = EntityName::Identifier(self.parse_identifier());
        while self.token == DotToken {
            let pos = name.data().range.pos;
            self.next();
            let right = self.parse_member_name();
            let left = self.alloc(name);
            let data = self.finish(SyntaxKind::QualifiedName, pos);
            name = EntityName::Qualified(self.alloc(QualifiedName { data, left, right }));
        }
        name
    }

    fn parse_property_name(&mut self) -> PropertyName<'a> {
        let pos = self.token_pos();
        match self.token {
            SyntaxKind::StringLiteral => {
                let value = self.scanner.token_value().to_string();
                self.next();
                let data = self.finish(SyntaxKind::StringLiteral, pos);
                PropertyName::String(self.alloc(tycheck_ast::node::StringLiteral { data, value }))
            }
            SyntaxKind::NumericLiteral => {
                let value = self.scanner.token_number();
                let text = self.scanner.token_value().to_string();
                self.next();
                let data = self.finish(SyntaxKind::NumericLiteral, pos);
                PropertyName::Numeric(self.alloc(tycheck_ast::node::NumericLiteral {
                    data,
                    value,
                    text,
                }))
            }
            SyntaxKind::PrivateIdentifier => PropertyName::Private(self.make_identifier(pos)),
            _ => PropertyName::Identifier(self.parse_member_name()),
        }
    }

    // ========================================================================
    // Source file
    // ========================================================================

    pub fn parse_source_file(&mut self) -> SourceFile<'a> {
        let pos = self.token_pos();
        let mut statements = Vec::new();
        while self.token != EndOfFile {
            let before = (self.token, self.token_pos());
            statements.push(self.parse_statement());
            // Recovery: if nothing advanced, skip the offending token.
            if (self.token, self.token_pos()) == before {
                self.next();
            }
        }
        let data = self.finish(SyntaxKind::SourceFile, pos);
        let module_name = self
            .file_name
            .trim_end_matches(".d.ts")
            .trim_end_matches(".ts")
            .to_string();
        SourceFile {
            data,
            statements: self.alloc_slice(statements),
            file_name: self.file_name.clone(),
            text: String::new(),
            module_name,
            is_declaration_file: self.file_name.ends_with(".d.ts"),
        }
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn parse_statement(&mut self) -> Statement<'a> {
        let mut modifiers = ModifierFlags::NONE;
        loop {
            let token = self.token;
            match token {
                ExportKeyword => {
                    let ahead = self.peek();
                    if ahead == OpenBraceToken || ahead == AsteriskToken {
                        return self.parse_export_declaration(false);
                    }
                    if ahead == TypeKeyword {
                        let state = self.save();
                        self.next(); // export
                        self.next(); // type
                        let shape = self.token;
                        self.restore(state);
                        if shape == OpenBraceToken || shape == AsteriskToken {
                            self.next();
                            self.next();
                            return self.parse_export_declaration(true);
                        }
                    }
                    modifiers |= ModifierFlags::EXPORT;
                    self.next();
                }
                DeclareKeyword => {
                    modifiers |= ModifierFlags::AMBIENT;
                    self.next();
                }
                AbstractKeyword if self.peek() == ClassKeyword => {
                    modifiers |= ModifierFlags::ABSTRACT;
                    self.next();
                }
                AsyncKeyword if self.peek() == FunctionKeyword => {
                    modifiers |= ModifierFlags::ASYNC;
                    self.next();
                }
                _ => break,
            }
        }

        let token = self.token;
        match token {
            OpenBraceToken => Statement::Block(self.parse_block()),
            SemicolonToken => {
                let pos = self.token_pos();
                self.next();
                let data = self.finish(EmptyStatement, pos);
                Statement::Empty(self.alloc(Token { data }))
            }
            VarKeyword | LetKeyword => self.parse_variable_statement(modifiers),
            ConstKeyword => {
                if self.peek() == EnumKeyword {
                    self.next();
                    self.parse_enum_declaration(modifiers, true)
                } else {
                    self.parse_variable_statement(modifiers)
                }
            }
            FunctionKeyword => self.parse_function_declaration(modifiers),
            ClassKeyword => self.parse_class_declaration(modifiers),
            InterfaceKeyword => self.parse_interface_declaration(modifiers),
            TypeKeyword if self.peek_is_identifier() => self.parse_type_alias(modifiers),
            EnumKeyword => self.parse_enum_declaration(modifiers, false),
            NamespaceKeyword if self.peek_is_identifier() => {
                self.parse_namespace_declaration(modifiers)
            }
            ImportKeyword => self.parse_import_declaration(),
            IfKeyword => self.parse_if_statement(),
            WhileKeyword => self.parse_while_statement(),
            ForKeyword => self.parse_for_statement(),
            ReturnKeyword => self.parse_return_statement(),
            SwitchKeyword => self.parse_switch_statement(),
            ThrowKeyword => self.parse_throw_statement(),
            TryKeyword => self.parse_try_statement(),
            BreakKeyword => {
                let pos = self.token_pos();
                self.next();
                self.optional(SemicolonToken);
                let data = self.finish(BreakStatement, pos);
                Statement::Break(self.alloc(Token { data }))
            }
            ContinueKeyword => {
                let pos = self.token_pos();
                self.next();
                self.optional(SemicolonToken);
                let data = self.finish(ContinueStatement, pos);
                Statement::Continue(self.alloc(Token { data }))
            }
            _ => self.parse_expression_statement(),
        }
    }

    fn peek_is_identifier(&mut self) -> bool {
        let state = self.save();
        self.next();
        let ok = self.is_identifier();
        self.restore(state);
        ok
    }

    fn parse_block(&mut self) -> &'a Block<'a> {
        let pos = self.token_pos();
        self.expect(OpenBraceToken);
        let mut statements = Vec::new();
        while self.token != CloseBraceToken && self.token != EndOfFile {
            let before = (self.token, self.token_pos());
            statements.push(self.parse_statement());
            if (self.token, self.token_pos()) == before {
                self.next();
            }
        }
        self.expect(CloseBraceToken);
        let data = self.finish(SyntaxKind::Block, pos);
        self.alloc(Block {
            data,
            statements: self.alloc_slice(statements),
        })
    }

    fn parse_variable_declaration(&mut self) -> VariableDeclaration<'a> {
        let pos = self.token_pos();
        let name = self.parse_identifier();
        self.optional(ExclamationToken);
        let type_annotation = if self.optional(ColonToken) {
            Some(self.parse_type())
        } else {
            None
        };
        let initializer = if self.optional(EqualsToken) {
            Some(self.parse_assignment_expression_alloc())
        } else {
            None
        };
        let data = self.finish(SyntaxKind::VariableDeclaration, pos);
        VariableDeclaration {
            data,
            name,
            type_annotation,
            initializer,
        }
    }

    fn parse_variable_declaration_list(&mut self) -> &'a VariableDeclarationList<'a> {
        let pos = self.token_pos();
        let flags = match self.token {
            LetKeyword => NodeFlags::LET,
            ConstKeyword => NodeFlags::CONST,
            _ => NodeFlags::NONE,
        };
        self.next(); // var/let/const
        let mut declarations = vec![self.parse_variable_declaration()];
        while self.optional(CommaToken) {
            declarations.push(self.parse_variable_declaration());
        }
        let mut data = self.finish(SyntaxKind::VariableDeclarationList, pos);
        data.flags |= flags;
        self.alloc(VariableDeclarationList {
            data,
            declarations: self.alloc_slice(declarations),
        })
    }

    fn parse_variable_statement(&mut self, modifiers: ModifierFlags) -> Statement<'a> {
        let pos = self.token_pos();
        let declaration_list = self.parse_variable_declaration_list();
        self.optional(SemicolonToken);
        let mut data = self.finish(SyntaxKind::VariableStatement, pos);
        data.modifier_flags = modifiers;
        Statement::Variable(self.alloc(VariableStatement {
            data,
            declaration_list,
        }))
    }

    fn parse_expression_statement(&mut self) -> Statement<'a> {
        let pos = self.token_pos();
        let expression = self.parse_expression_alloc();
        self.optional(SemicolonToken);
        let data = self.finish(SyntaxKind::ExpressionStatement, pos);
        Statement::Expression(self.alloc(ExpressionStatement { data, expression }))
    }

    fn parse_if_statement(&mut self) -> Statement<'a> {
        let pos = self.token_pos();
        self.next();
        self.expect(OpenParenToken);
        let expression = self.parse_expression_alloc();
        self.expect(CloseParenToken);
        let then_stmt = self.parse_statement();
        let then_statement = self.alloc(then_stmt);
        let else_statement = if self.optional(ElseKeyword) {
            let stmt = self.parse_statement();
            Some(&*self.alloc(stmt))
        } else {
            None
        };
        let data = self.finish(IfStatement, pos);
        Statement::If(self.alloc(tycheck_ast::node::IfStatement {
            data,
            expression,
            then_statement,
            else_statement,
        }))
    }

    fn parse_while_statement(&mut self) -> Statement<'a> {
        let pos = self.token_pos();
        self.next();
        self.expect(OpenParenToken);
        let expression = self.parse_expression_alloc();
        self.expect(CloseParenToken);
        let stmt = self.parse_statement();
        let statement = self.alloc(stmt);
        let data = self.finish(WhileStatement, pos);
        Statement::While(self.alloc(tycheck_ast::node::WhileStatement {
            data,
            expression,
            statement,
        }))
    }

    fn parse_for_statement(&mut self) -> Statement<'a> {
        let pos = self.token_pos();
        self.next();
        self.expect(OpenParenToken);
        let initializer = if self.token == SemicolonToken {
            None
        } else if matches!(self.token, VarKeyword | LetKeyword | ConstKeyword) {
            Some(ForInitializer::VariableDeclarationList(
                self.parse_variable_declaration_list(),
            ))
        } else {
            Some(ForInitializer::Expression(self.parse_expression_alloc()))
        };

        if self.token == OfKeyword {
            self.next();
            let expression = self.parse_assignment_expression_alloc();
            self.expect(CloseParenToken);
            let stmt = self.parse_statement();
            let statement = self.alloc(stmt);
            let data = self.finish(ForOfStatement, pos);
            let initializer = match initializer {
                Some(init) => init,
                None => ForInitializer::Expression(self.missing_expression(pos)),
            };
            return Statement::ForOf(self.alloc(tycheck_ast::node::ForOfStatement {
                data,
                initializer,
                expression,
                statement,
            }));
        }
        if self.token == InKeyword {
            self.next();
            let expression = self.parse_expression_alloc();
            self.expect(CloseParenToken);
            let stmt = self.parse_statement();
            let statement = self.alloc(stmt);
            let data = self.finish(ForInStatement, pos);
            let initializer = match initializer {
                Some(init) => init,
                None => ForInitializer::Expression(self.missing_expression(pos)),
            };
            return Statement::ForIn(self.alloc(tycheck_ast::node::ForInStatement {
                data,
                initializer,
                expression,
                statement,
            }));
        }

        self.expect(SemicolonToken);
        let condition = if self.token != SemicolonToken {
            Some(self.parse_expression_alloc())
        } else {
            None
        };
        self.expect(SemicolonToken);
        let incrementor = if self.token != CloseParenToken {
            Some(self.parse_expression_alloc())
        } else {
            None
        };
        self.expect(CloseParenToken);
        let stmt = self.parse_statement();
        let statement = self.alloc(stmt);
        let data = self.finish(ForStatement, pos);
        Statement::For(self.alloc(tycheck_ast::node::ForStatement {
            data,
            initializer,
            condition,
            incrementor,
            statement,
        }))
    }

    fn missing_expression(&mut self, pos: u32) -> &'a Expression<'a> {
        let text = self.interner.intern("");
        let data = self.finish(SyntaxKind::Identifier, pos);
        let ident = self.alloc(tycheck_ast::node::Identifier {
            data,
            text,
            text_name: String::new(),
        });
        self.alloc(Expression::Identifier(ident))
    }

    fn parse_return_statement(&mut self) -> Statement<'a> {
        let pos = self.token_pos();
        self.next();
        let expression = if matches!(
            self.token,
            SemicolonToken | CloseBraceToken | EndOfFile
        ) || self.scanner.has_preceding_line_break()
        {
            None
        } else {
            Some(self.parse_expression_alloc())
        };
        self.optional(SemicolonToken);
        let data = self.finish(ReturnStatement, pos);
        Statement::Return(self.alloc(tycheck_ast::node::ReturnStatement { data, expression }))
    }

    fn parse_switch_statement(&mut self) -> Statement<'a> {
        let pos = self.token_pos();
        self.next();
        self.expect(OpenParenToken);
        let expression = self.parse_expression_alloc();
        self.expect(CloseParenToken);
        self.expect(OpenBraceToken);
        let mut clauses = Vec::new();
        while self.token != CloseBraceToken && self.token != EndOfFile {
            if self.optional(CaseKeyword) {
                let cpos = self.token_pos();
                let case_expr = self.parse_expression_alloc();
                self.expect(ColonToken);
                let statements = self.parse_clause_statements();
                let data = self.finish(CaseClause, cpos);
                clauses.push(CaseOrDefaultClause::Case(self.alloc(
                    tycheck_ast::node::CaseClause {
                        data,
                        expression: case_expr,
                        statements,
                    },
                )));
            } else if self.optional(DefaultKeyword) {
                let cpos = self.token_pos();
                self.expect(ColonToken);
                let statements = self.parse_clause_statements();
                let data = self.finish(DefaultClause, cpos);
                clauses.push(CaseOrDefaultClause::Default(self.alloc(
                    tycheck_ast::node::DefaultClause { data, statements },
                )));
            } else {
                self.error(&messages::DECLARATION_OR_STATEMENT_EXPECTED, &[]);
                self.next();
            }
        }
        self.expect(CloseBraceToken);
        let data = self.finish(SwitchStatement, pos);
        Statement::Switch(self.alloc(tycheck_ast::node::SwitchStatement {
            data,
            expression,
            clauses: self.alloc_slice(clauses),
        }))
    }

    fn parse_clause_statements(&mut self) -> &'a [Statement<'a>] {
        let mut statements = Vec::new();
        while !matches!(
            self.token,
            CaseKeyword | DefaultKeyword | CloseBraceToken | EndOfFile
        ) {
            let before = (self.token, self.token_pos());
            statements.push(self.parse_statement());
            if (self.token, self.token_pos()) == before {
                self.next();
            }
        }
        self.alloc_slice(statements)
    }

    fn parse_throw_statement(&mut self) -> Statement<'a> {
        let pos = self.token_pos();
        self.next();
        let expression = self.parse_expression_alloc();
        self.optional(SemicolonToken);
        let data = self.finish(ThrowStatement, pos);
        Statement::Throw(self.alloc(tycheck_ast::node::ThrowStatement { data, expression }))
    }

    fn parse_try_statement(&mut self) -> Statement<'a> {
        let pos = self.token_pos();
        self.next();
        let try_block = self.parse_block();
        let catch_clause = if self.token == CatchKeyword {
            let cpos = self.token_pos();
            self.next();
            let variable = if self.optional(OpenParenToken) {
                let decl = self.parse_variable_declaration();
                self.expect(CloseParenToken);
                Some(&*self.alloc(decl))
            } else {
                None
            };
            let block = self.parse_block();
            let data = self.finish(CatchClause, cpos);
            Some(&*self.alloc(tycheck_ast::node::CatchClause {
                data,
                variable,
                block,
            }))
        } else {
            None
        };
        let finally_block = if self.optional(FinallyKeyword) {
            Some(self.parse_block())
        } else {
            None
        };
        let data = self.finish(TryStatement, pos);
        Statement::Try(self.alloc(tycheck_ast::node::TryStatement {
            data,
            try_block,
            catch_clause,
            finally_block,
        }))
    }

    // ========================================================================
    // Declarations
    // ========================================================================

    fn parse_type_parameters(&mut self) -> Option<&'a [TypeParameterDeclaration<'a>]> {
        if self.token != LessThanToken {
            return None;
        }
        self.next();
        let mut params = Vec::new();
        loop {
            let pos = self.token_pos();
            let name = self.parse_identifier();
            let constraint = if self.optional(ExtendsKeyword) {
                Some(self.parse_type())
            } else {
                None
            };
            let default = if self.optional(EqualsToken) {
                Some(self.parse_type())
            } else {
                None
            };
            let data = self.finish(TypeParameter, pos);
            params.push(TypeParameterDeclaration {
                data,
                name,
                constraint,
                default,
            });
            if !self.optional(CommaToken) {
                break;
            }
        }
        self.expect_type_arg_close();
        Some(self.alloc_slice(params))
    }

    fn parse_parameter(&mut self) -> ParameterDeclaration<'a> {
        let pos = self.token_pos();
        // Parameter property modifiers are accepted and folded into the
        // node's modifier flags.
        let mut modifiers = ModifierFlags::NONE;
        loop {
            let token = self.token;
            match token {
                PublicKeyword if self.peek_is_identifier() => {
                    modifiers |= ModifierFlags::PUBLIC;
                    self.next();
                }
                PrivateKeyword if self.peek_is_identifier() => {
                    modifiers |= ModifierFlags::PRIVATE;
                    self.next();
                }
                ProtectedKeyword if self.peek_is_identifier() => {
                    modifiers |= ModifierFlags::PROTECTED;
                    self.next();
                }
                ReadonlyKeyword if self.peek_is_identifier() => {
                    modifiers |= ModifierFlags::READONLY;
                    self.next();
                }
                _ => break,
            }
        }
        let dot_dot_dot = self.optional(DotDotDotToken);
        let name = self.parse_identifier();
        let question = self.optional(QuestionToken);
        let type_annotation = if self.optional(ColonToken) {
            Some(self.parse_type())
        } else {
            None
        };
        let initializer = if self.optional(EqualsToken) {
            Some(self.parse_assignment_expression_alloc())
        } else {
            None
        };
        if question && initializer.is_some() {
            self.error(&messages::PARAMETER_CANNOT_HAVE_QUESTION_MARK_AND_INITIALIZER, &[]);
        }
        let mut data = self.finish(Parameter, pos);
        data.modifier_flags = modifiers;
        ParameterDeclaration {
            data,
            dot_dot_dot,
            name,
            question,
            type_annotation,
            initializer,
        }
    }

    fn parse_parameter_list(&mut self) -> &'a [ParameterDeclaration<'a>] {
        self.expect(OpenParenToken);
        let mut params = Vec::new();
        while self.token != CloseParenToken && self.token != EndOfFile {
            let param = self.parse_parameter();
            if param.dot_dot_dot && self.token == CommaToken {
                self.error(&messages::A_REST_PARAMETER_MUST_BE_LAST, &[]);
            }
            params.push(param);
            if !self.optional(CommaToken) {
                break;
            }
        }
        self.expect(CloseParenToken);
        self.alloc_slice(params)
    }

    fn parse_function_declaration(&mut self, modifiers: ModifierFlags) -> Statement<'a> {
        let pos = self.token_pos();
        self.next(); // function
        let name = if self.is_identifier() {
            Some(self.parse_identifier())
        } else {
            None
        };
        let type_parameters = self.parse_type_parameters();
        let parameters = self.parse_parameter_list();
        let return_type = if self.optional(ColonToken) {
            Some(self.parse_type())
        } else {
            None
        };
        let body = if self.token == OpenBraceToken {
            Some(self.parse_block())
        } else {
            self.optional(SemicolonToken);
            None
        };
        let mut data = self.finish(FunctionDeclaration, pos);
        data.modifier_flags = modifiers;
        Statement::Function(self.alloc(tycheck_ast::node::FunctionDeclaration {
            data,
            name,
            type_parameters,
            parameters,
            return_type,
            body,
        }))
    }

    fn parse_heritage_entry(&mut self) -> ExpressionWithTypeArguments<'a> {
        let pos = self.token_pos();
        let mut expression = Expression::Identifier(self.parse_identifier());
        while self.token == DotToken {
            self.next();
            let name = self.parse_member_name();
            let inner = self.alloc(expression);
            let data = self.finish(PropertyAccessExpression, pos);
            expression = Expression::PropertyAccess(self.alloc(PropertyAccess {
                data,
                expression: inner,
                question_dot: false,
                name,
            }));
        }
        let type_arguments = if self.token == LessThanToken {
            self.next();
            let mut args = vec![*self.parse_type()];
            while self.optional(CommaToken) {
                args.push(*self.parse_type());
            }
            self.expect_type_arg_close();
            Some(self.alloc_slice(args))
        } else {
            None
        };
        let data = self.finish(SyntaxKind::ExpressionWithTypeArguments, pos);
        ExpressionWithTypeArguments {
            data,
            expression: self.alloc(expression),
            type_arguments,
        }
    }

    fn parse_class_declaration(&mut self, modifiers: ModifierFlags) -> Statement<'a> {
        let pos = self.token_pos();
        self.next(); // class
        let name = if self.is_identifier() {
            Some(self.parse_identifier())
        } else {
            None
        };
        let type_parameters = self.parse_type_parameters();
        let mut extends = None;
        let mut implements = Vec::new();
        while matches!(self.token, ExtendsKeyword | ImplementsKeyword) {
            if self.optional(ExtendsKeyword) {
                let entry = self.parse_heritage_entry();
                extends = Some(&*self.alloc(entry));
            } else {
                self.next(); // implements
                implements.push(self.parse_heritage_entry());
                while self.optional(CommaToken) {
                    implements.push(self.parse_heritage_entry());
                }
            }
        }
        self.expect(OpenBraceToken);
        let mut members = Vec::new();
        while self.token != CloseBraceToken && self.token != EndOfFile {
            if self.optional(SemicolonToken) {
                continue;
            }
            let before = (self.token, self.token_pos());
            if let Some(member) = self.parse_class_member() {
                members.push(member);
            }
            if (self.token, self.token_pos()) == before {
                self.next();
            }
        }
        self.expect(CloseBraceToken);
        let mut data = self.finish(ClassDeclaration, pos);
        data.modifier_flags = modifiers;
        Statement::Class(self.alloc(tycheck_ast::node::ClassDeclaration {
            data,
            name,
            type_parameters,
            extends,
            implements: self.alloc_slice(implements),
            members: self.alloc_slice(members),
        }))
    }

    fn parse_class_member(&mut self) -> Option<ClassElement<'a>> {
        let pos = self.token_pos();
        let mut modifiers = ModifierFlags::NONE;
        loop {
            let is_modifier = match self.token {
                PublicKeyword => Some(ModifierFlags::PUBLIC),
                PrivateKeyword => Some(ModifierFlags::PRIVATE),
                ProtectedKeyword => Some(ModifierFlags::PROTECTED),
                StaticKeyword => Some(ModifierFlags::STATIC),
                ReadonlyKeyword => Some(ModifierFlags::READONLY),
                AbstractKeyword => Some(ModifierFlags::ABSTRACT),
                AsyncKeyword => Some(ModifierFlags::ASYNC),
                _ => None,
            };
            match is_modifier {
                Some(flag) if self.member_name_follows() => {
                    modifiers |= flag;
                    self.next();
                }
                _ => break,
            }
        }

        if self.token == OpenBracketToken {
            let index = self.parse_index_signature(modifiers)?;
            return Some(ClassElement::IndexSignature(index));
        }

        if self.token == Identifier && self.scanner.token_value() == "constructor" {
            self.next();
            let parameters = self.parse_parameter_list();
            let body = if self.token == OpenBraceToken {
                Some(self.parse_block())
            } else {
                self.optional(SemicolonToken);
                None
            };
            let mut data = self.finish(Constructor, pos);
            data.modifier_flags = modifiers;
            return Some(ClassElement::Constructor(self.alloc(
                ConstructorDeclaration {
                    data,
                    parameters,
                    body,
                },
            )));
        }

        let name = self.parse_property_name();
        let question = self.optional(QuestionToken);
        let exclamation = !question && self.optional(ExclamationToken);

        if self.token == OpenParenToken || self.token == LessThanToken {
            let type_parameters = self.parse_type_parameters();
            let parameters = self.parse_parameter_list();
            let return_type = if self.optional(ColonToken) {
                Some(self.parse_type())
            } else {
                None
            };
            let body = if self.token == OpenBraceToken {
                Some(self.parse_block())
            } else {
                self.optional(SemicolonToken);
                None
            };
            let mut data = self.finish(MethodDeclaration, pos);
            data.modifier_flags = modifiers;
            return Some(ClassElement::Method(self.alloc(MethodDeclaration {
                data,
                name,
                question,
                type_parameters,
                parameters,
                return_type,
                body,
            })));
        }

        let type_annotation = if self.optional(ColonToken) {
            Some(self.parse_type())
        } else {
            None
        };
        let initializer = if self.optional(EqualsToken) {
            Some(self.parse_assignment_expression_alloc())
        } else {
            None
        };
        self.optional(SemicolonToken);
        let mut data = self.finish(PropertyDeclaration, pos);
        data.modifier_flags = modifiers;
        Some(ClassElement::Property(self.alloc(PropertyDeclaration {
            data,
            name,
            question,
            exclamation,
            type_annotation,
            initializer,
        })))
    }

    fn member_name_follows(&mut self) -> bool {
        let ahead = self.peek();
        matches!(
            ahead,
            Identifier
                | PrivateIdentifier
                | SyntaxKind::StringLiteral
                | SyntaxKind::NumericLiteral
                | OpenBracketToken
        ) || ahead.is_keyword()
    }

    fn parse_index_signature(
        &mut self,
        _modifiers: ModifierFlags,
    ) -> Option<&'a IndexSignatureNode<'a>> {
        let pos = self.token_pos();
        let readonly = false;
        self.expect(OpenBracketToken);
        let param = self.parse_parameter();
        let parameter = self.alloc(param);
        self.expect(CloseBracketToken);
        self.expect(ColonToken);
        let type_annotation = self.parse_type();
        self.optional(SemicolonToken);
        let data = self.finish(IndexSignature, pos);
        Some(self.alloc(IndexSignatureNode {
            data,
            readonly,
            parameter,
            type_annotation,
        }))
    }

    fn parse_interface_declaration(&mut self, modifiers: ModifierFlags) -> Statement<'a> {
        let pos = self.token_pos();
        self.next(); // interface
        let name = self.parse_identifier();
        let type_parameters = self.parse_type_parameters();
        let mut extends = Vec::new();
        if self.optional(ExtendsKeyword) {
            extends.push(self.parse_heritage_entry());
            while self.optional(CommaToken) {
                extends.push(self.parse_heritage_entry());
            }
        }
        let members = self.parse_type_member_list();
        let mut data = self.finish(InterfaceDeclaration, pos);
        data.modifier_flags = modifiers;
        Statement::Interface(self.alloc(tycheck_ast::node::InterfaceDeclaration {
            data,
            name,
            type_parameters,
            extends: self.alloc_slice(extends),
            members,
        }))
    }

    fn parse_type_member_list(&mut self) -> &'a [TypeElement<'a>] {
        self.expect(OpenBraceToken);
        let mut members = Vec::new();
        while self.token != CloseBraceToken && self.token != EndOfFile {
            if self.optional(SemicolonToken) || self.optional(CommaToken) {
                continue;
            }
            let before = (self.token, self.token_pos());
            if let Some(member) = self.parse_type_member() {
                members.push(member);
            }
            if (self.token, self.token_pos()) == before {
                self.next();
            }
        }
        self.expect(CloseBraceToken);
        self.alloc_slice(members)
    }

    fn parse_type_member(&mut self) -> Option<TypeElement<'a>> {
        let pos = self.token_pos();
        let readonly =
            self.token == ReadonlyKeyword && self.member_name_follows() && {
                self.next();
                true
            };

        if self.token == OpenBracketToken && !readonly {
            return self
                .parse_index_signature(ModifierFlags::NONE)
                .map(TypeElement::IndexSignature);
        }
        if self.token == OpenBracketToken && readonly {
            let pos2 = self.token_pos();
            self.expect(OpenBracketToken);
            let param = self.parse_parameter();
            let parameter = self.alloc(param);
            self.expect(CloseBracketToken);
            self.expect(ColonToken);
            let type_annotation = self.parse_type();
            self.optional(SemicolonToken);
            let data = self.finish(IndexSignature, pos2);
            return Some(TypeElement::IndexSignature(self.alloc(IndexSignatureNode {
                data,
                readonly: true,
                parameter,
                type_annotation,
            })));
        }

        if self.token == OpenParenToken || self.token == LessThanToken {
            let type_parameters = self.parse_type_parameters();
            let parameters = self.parse_parameter_list();
            let return_type = if self.optional(ColonToken) {
                Some(self.parse_type())
            } else {
                None
            };
            let data = self.finish(CallSignature, pos);
            return Some(TypeElement::CallSignature(self.alloc(CallSignatureNode {
                data,
                type_parameters,
                parameters,
                return_type,
            })));
        }

        if self.token == NewKeyword && matches!(self.peek(), OpenParenToken | LessThanToken) {
            self.next();
            let type_parameters = self.parse_type_parameters();
            let parameters = self.parse_parameter_list();
            let return_type = if self.optional(ColonToken) {
                Some(self.parse_type())
            } else {
                None
            };
            let data = self.finish(ConstructSignature, pos);
            return Some(TypeElement::ConstructSignature(self.alloc(
                ConstructSignatureNode {
                    data,
                    type_parameters,
                    parameters,
                    return_type,
                },
            )));
        }

        let name = self.parse_property_name();
        let question = self.optional(QuestionToken);

        if self.token == OpenParenToken || self.token == LessThanToken {
            let type_parameters = self.parse_type_parameters();
            let parameters = self.parse_parameter_list();
            let return_type = if self.optional(ColonToken) {
                Some(self.parse_type())
            } else {
                None
            };
            let data = self.finish(MethodSignature, pos);
            return Some(TypeElement::MethodSignature(self.alloc(
                MethodSignatureNode {
                    data,
                    name,
                    question,
                    type_parameters,
                    parameters,
                    return_type,
                },
            )));
        }

        let type_annotation = if self.optional(ColonToken) {
            Some(self.parse_type())
        } else {
            None
        };
        self.optional(SemicolonToken);
        let mut data = self.finish(PropertySignature, pos);
        if readonly {
            data.modifier_flags |= ModifierFlags::READONLY;
        }
        Some(TypeElement::PropertySignature(self.alloc(
            PropertySignatureNode {
                data,
                name,
                question,
                type_annotation,
            },
        )))
    }

    fn parse_type_alias(&mut self, modifiers: ModifierFlags) -> Statement<'a> {
        let pos = self.token_pos();
        self.next(); // type
        let name = self.parse_identifier();
        let type_parameters = self.parse_type_parameters();
        self.expect(EqualsToken);
        let type_node = self.parse_type();
        self.optional(SemicolonToken);
        let mut data = self.finish(TypeAliasDeclaration, pos);
        data.modifier_flags = modifiers;
        Statement::TypeAlias(self.alloc(tycheck_ast::node::TypeAliasDeclaration {
            data,
            name,
            type_parameters,
            type_node,
        }))
    }

    fn parse_enum_declaration(&mut self, modifiers: ModifierFlags, is_const: bool) -> Statement<'a> {
        let pos = self.token_pos();
        self.next(); // enum
        let name = self.parse_identifier();
        self.expect(OpenBraceToken);
        let mut members = Vec::new();
        while self.token != CloseBraceToken && self.token != EndOfFile {
            let mpos = self.token_pos();
            let member_name = self.parse_property_name();
            let initializer = if self.optional(EqualsToken) {
                Some(self.parse_assignment_expression_alloc())
            } else {
                None
            };
            let data = self.finish(EnumMember, mpos);
            members.push(tycheck_ast::node::EnumMember {
                data,
                name: member_name,
                initializer,
            });
            if !self.optional(CommaToken) {
                break;
            }
        }
        self.expect(CloseBraceToken);
        let mut data = self.finish(EnumDeclaration, pos);
        data.modifier_flags = modifiers;
        Statement::Enum(self.alloc(tycheck_ast::node::EnumDeclaration {
            data,
            name,
            is_const,
            members: self.alloc_slice(members),
        }))
    }

    fn parse_namespace_declaration(&mut self, modifiers: ModifierFlags) -> Statement<'a> {
        let pos = self.token_pos();
        self.next(); // namespace
        let name = self.parse_identifier();
        self.expect(OpenBraceToken);
        let mut statements = Vec::new();
        while self.token != CloseBraceToken && self.token != EndOfFile {
            let before = (self.token, self.token_pos());
            statements.push(self.parse_statement());
            if (self.token, self.token_pos()) == before {
                self.next();
            }
        }
        self.expect(CloseBraceToken);
        let mut data = self.finish(NamespaceDeclaration, pos);
        data.modifier_flags = modifiers;
        Statement::Namespace(self.alloc(tycheck_ast::node::NamespaceDeclaration {
            data,
            name,
            statements: self.alloc_slice(statements),
        }))
    }

    fn parse_string_literal_value(&mut self) -> String {
        if self.token == SyntaxKind::StringLiteral {
            let value = self.scanner.token_value().to_string();
            self.next();
            value
        } else {
            self.error(&messages::_0_EXPECTED, &["string literal"]);
            String::new()
        }
    }

    fn parse_import_declaration(&mut self) -> Statement<'a> {
        let pos = self.token_pos();
        self.next(); // import

        if self.token == SyntaxKind::StringLiteral {
            let specifier = self.parse_string_literal_value();
            self.optional(SemicolonToken);
            let data = self.finish(ImportDeclaration, pos);
            return Statement::Import(self.alloc(tycheck_ast::node::ImportDeclaration {
                data,
                type_only: false,
                default_name: None,
                namespace_name: None,
                named: &[],
                specifier,
            }));
        }

        let type_only = self.token == TypeKeyword
            && matches!(self.peek(), OpenBraceToken | Identifier | AsteriskToken)
            && {
                self.next();
                true
            };

        let mut default_name = None;
        let mut namespace_name = None;
        let mut named = Vec::new();

        if self.is_identifier() {
            default_name = Some(self.parse_identifier());
            self.optional(CommaToken);
        }
        if self.token == AsteriskToken {
            self.next();
            self.expect(AsKeyword);
            namespace_name = Some(self.parse_identifier());
        } else if self.token == OpenBraceToken {
            self.next();
            while self.token != CloseBraceToken && self.token != EndOfFile {
                let spos = self.token_pos();
                let spec_type_only = self.token == TypeKeyword
                    && self.peek_is_identifier()
                    && {
                        self.next();
                        true
                    };
                let first = self.parse_identifier();
                let (property_name, name) = if self.optional(AsKeyword) {
                    (Some(first), self.parse_identifier())
                } else {
                    (None, first)
                };
                let data = self.finish(ImportSpecifier, spos);
                named.push(tycheck_ast::node::ImportSpecifier {
                    data,
                    type_only: spec_type_only,
                    property_name,
                    name,
                });
                if !self.optional(CommaToken) {
                    break;
                }
            }
            self.expect(CloseBraceToken);
        }
        self.expect(FromKeyword);
        let specifier = self.parse_string_literal_value();
        self.optional(SemicolonToken);
        let data = self.finish(ImportDeclaration, pos);
        Statement::Import(self.alloc(tycheck_ast::node::ImportDeclaration {
            data,
            type_only,
            default_name,
            namespace_name,
            named: self.alloc_slice(named),
            specifier,
        }))
    }

    /// Assumes `export` (and `type`, when `type_only`) have been consumed
    /// or the caller verified the next tokens; handles `export * from` and
    /// `export { ... } [from]`.
    fn parse_export_declaration(&mut self, type_only_pre: bool) -> Statement<'a> {
        let pos = self.token_pos();
        if !type_only_pre {
            self.next(); // export
        }
        let type_only = type_only_pre
            || (self.token == TypeKeyword && self.peek() == OpenBraceToken && {
                self.next();
                true
            });

        if self.token == AsteriskToken {
            self.next();
            self.expect(FromKeyword);
            let specifier = self.parse_string_literal_value();
            self.optional(SemicolonToken);
            let data = self.finish(ExportDeclaration, pos);
            return Statement::Export(self.alloc(tycheck_ast::node::ExportDeclaration {
                data,
                type_only,
                is_star: true,
                named: &[],
                specifier: Some(specifier),
            }));
        }

        self.expect(OpenBraceToken);
        let mut named = Vec::new();
        while self.token != CloseBraceToken && self.token != EndOfFile {
            let spos = self.token_pos();
            let first = self.parse_identifier();
            let (property_name, name) = if self.optional(AsKeyword) {
                (Some(first), self.parse_identifier())
            } else {
                (None, first)
            };
            let data = self.finish(ExportSpecifier, spos);
            named.push(tycheck_ast::node::ExportSpecifier {
                data,
                property_name,
                name,
            });
            if !self.optional(CommaToken) {
                break;
            }
        }
        self.expect(CloseBraceToken);
        let specifier = if self.optional(FromKeyword) {
            Some(self.parse_string_literal_value())
        } else {
            None
        };
        self.optional(SemicolonToken);
        let data = self.finish(ExportDeclaration, pos);
        Statement::Export(self.alloc(tycheck_ast::node::ExportDeclaration {
            data,
            type_only,
            is_star: false,
            named: self.alloc_slice(named),
            specifier,
        }))
    }

    // ========================================================================
    // Types
    // ========================================================================

    pub fn parse_type(&mut self) -> &'a TypeNode<'a> {
        if self.token == NewKeyword {
            return self.parse_constructor_type();
        }
        if self.token == OpenParenToken && self.is_function_type_start() {
            return self.parse_function_type();
        }
        if self.token == LessThanToken {
            // Generic function type: <T>(x: T) => T
            return self.parse_function_type();
        }
        let check = self.parse_union_type();
        if self.token == ExtendsKeyword {
            let pos = check.data().range.pos;
            self.next();
            let extends_type = self.parse_non_conditional_type();
            self.expect(QuestionToken);
            let true_type = self.parse_type();
            self.expect(ColonToken);
            let false_type = self.parse_type();
            let data = self.finish(ConditionalType, pos);
            let node = self.alloc(ConditionalTypeNode {
                data,
                check_type: check,
                extends_type,
                true_type,
                false_type,
            });
            return self.alloc(TypeNode::Conditional(node));
        }
        check
    }

    /// The `extends` operand of a conditional type: everything but a
    /// top-level conditional.
    fn parse_non_conditional_type(&mut self) -> &'a TypeNode<'a> {
        if self.token == NewKeyword {
            return self.parse_constructor_type();
        }
        if self.token == OpenParenToken && self.is_function_type_start() {
            return self.parse_function_type();
        }
        self.parse_union_type()
    }

    fn is_function_type_start(&mut self) -> bool {
        let state = self.save();
        let mut depth = 0i32;
        let mut result = false;
        loop {
            match self.token {
                OpenParenToken => depth += 1,
                CloseParenToken => {
                    depth -= 1;
                    if depth == 0 {
                        self.next();
                        result = self.token == EqualsGreaterThanToken;
                        break;
                    }
                }
                EndOfFile => break,
                _ => {}
            }
            self.next();
        }
        self.restore(state);
        result
    }

    fn parse_function_type(&mut self) -> &'a TypeNode<'a> {
        let pos = self.token_pos();
        let type_parameters = self.parse_type_parameters();
        let parameters = self.parse_parameter_list();
        self.expect(EqualsGreaterThanToken);
        let return_type = self.parse_type();
        let data = self.finish(FunctionType, pos);
        let node = self.alloc(FunctionTypeNode {
            data,
            type_parameters,
            parameters,
            return_type,
        });
        self.alloc(TypeNode::Function(node))
    }

    fn parse_constructor_type(&mut self) -> &'a TypeNode<'a> {
        let pos = self.token_pos();
        self.next(); // new
        let type_parameters = self.parse_type_parameters();
        let parameters = self.parse_parameter_list();
        self.expect(EqualsGreaterThanToken);
        let return_type = self.parse_type();
        let data = self.finish(ConstructorType, pos);
        let node = self.alloc(ConstructorTypeNode {
            data,
            type_parameters,
            parameters,
            return_type,
        });
        self.alloc(TypeNode::Constructor(node))
    }

    fn parse_union_type(&mut self) -> &'a TypeNode<'a> {
        let pos = self.token_pos();
        self.optional(BarToken);
        let first = self.parse_intersection_type();
        if self.token != BarToken {
            return first;
        }
        let mut types = vec![*first];
        while self.optional(BarToken) {
            types.push(*self.parse_intersection_type());
        }
        let data = self.finish(UnionType, pos);
        let node = self.alloc(UnionTypeNode {
            data,
            types: self.alloc_slice(types),
        });
        self.alloc(TypeNode::Union(node))
    }

    fn parse_intersection_type(&mut self) -> &'a TypeNode<'a> {
        let pos = self.token_pos();
        self.optional(AmpersandToken);
        let first = self.parse_type_operator();
        if self.token != AmpersandToken {
            return first;
        }
        let mut types = vec![*first];
        while self.optional(AmpersandToken) {
            types.push(*self.parse_type_operator());
        }
        let data = self.finish(IntersectionType, pos);
        let node = self.alloc(IntersectionTypeNode {
            data,
            types: self.alloc_slice(types),
        });
        self.alloc(TypeNode::Intersection(node))
    }

    fn parse_type_operator(&mut self) -> &'a TypeNode<'a> {
        let pos = self.token_pos();
        match self.token {
            KeyOfKeyword | UniqueKeyword | ReadonlyKeyword => {
                let operator = self.token;
                self.next();
                let type_node = self.parse_type_operator();
                let data = self.finish(TypeOperator, pos);
                let node = self.alloc(TypeOperatorNode {
                    data,
                    operator,
                    type_node,
                });
                self.alloc(TypeNode::Operator(node))
            }
            InferKeyword => {
                self.next();
                let tp_pos = self.token_pos();
                let name = self.parse_identifier();
                let data = self.finish(TypeParameter, tp_pos);
                let type_parameter = self.alloc(TypeParameterDeclaration {
                    data,
                    name,
                    constraint: None,
                    default: None,
                });
                let data = self.finish(InferType, pos);
                let node = self.alloc(InferTypeNode {
                    data,
                    type_parameter,
                });
                self.alloc(TypeNode::Infer(node))
            }
            _ => self.parse_postfix_type(),
        }
    }

    fn parse_postfix_type(&mut self) -> &'a TypeNode<'a> {
        let mut ty = self.parse_primary_type();
        while self.token == OpenBracketToken && !self.scanner.has_preceding_line_break() {
            let pos = ty.data().range.pos;
            self.next();
            if self.token == CloseBracketToken {
                self.next();
                let data = self.finish(ArrayType, pos);
                let node = self.alloc(ArrayTypeNode {
                    data,
                    element_type: ty,
                });
                ty = self.alloc(TypeNode::Array(node));
            } else {
                let index_type = self.parse_type();
                self.expect(CloseBracketToken);
                let data = self.finish(IndexedAccessType, pos);
                let node = self.alloc(IndexedAccessTypeNode {
                    data,
                    object_type: ty,
                    index_type,
                });
                ty = self.alloc(TypeNode::IndexedAccess(node));
            }
        }
        ty
    }

    fn parse_primary_type(&mut self) -> &'a TypeNode<'a> {
        let pos = self.token_pos();
        match { self.token } {
            AnyKeyword | UnknownKeyword | StringKeyword | NumberKeyword | BooleanKeyword
            | BigIntKeyword | SymbolKeyword | ObjectKeyword | VoidKeyword | UndefinedKeyword
            | NeverKeyword => {
                let kind = self.token;
                self.next();
                let data = NodeData::new(kind, pos, self.last_token_end, self.node_id());
                let node = self.alloc(KeywordTypeNode { data });
                self.alloc(TypeNode::Keyword(node))
            }
            SyntaxKind::StringLiteral => {
                let value = self.scanner.token_value().to_string();
                self.next();
                let lit_data = self.finish(SyntaxKind::StringLiteral, pos);
                let lit = self.alloc(tycheck_ast::node::StringLiteral {
                    data: lit_data,
                    value,
                });
                let data = self.finish(LiteralType, pos);
                let node = self.alloc(LiteralTypeNode {
                    data,
                    literal: LiteralTypeKind::String(lit),
                });
                self.alloc(TypeNode::Literal(node))
            }
            SyntaxKind::NumericLiteral => {
                let value = self.scanner.token_number();
                let text = self.scanner.token_value().to_string();
                self.next();
                let lit_data = self.finish(SyntaxKind::NumericLiteral, pos);
                let lit = self.alloc(tycheck_ast::node::NumericLiteral {
                    data: lit_data,
                    value,
                    text,
                });
                let data = self.finish(LiteralType, pos);
                let node = self.alloc(LiteralTypeNode {
                    data,
                    literal: LiteralTypeKind::Number(lit),
                });
                self.alloc(TypeNode::Literal(node))
            }
            SyntaxKind::BigIntLiteral => {
                let text = self.scanner.token_value().to_string();
                self.next();
                let lit_data = self.finish(SyntaxKind::BigIntLiteral, pos);
                let lit = self.alloc(tycheck_ast::node::BigIntLiteral {
                    data: lit_data,
                    text,
                });
                let data = self.finish(LiteralType, pos);
                let node = self.alloc(LiteralTypeNode {
                    data,
                    literal: LiteralTypeKind::BigInt(lit),
                });
                self.alloc(TypeNode::Literal(node))
            }
            MinusToken if self.peek() == SyntaxKind::NumericLiteral => {
                self.next();
                let value = -self.scanner.token_number();
                let text = format!("-{}", self.scanner.token_value());
                self.next();
                let lit_data = self.finish(SyntaxKind::NumericLiteral, pos);
                let lit = self.alloc(tycheck_ast::node::NumericLiteral {
                    data: lit_data,
                    value,
                    text,
                });
                let data = self.finish(LiteralType, pos);
                let node = self.alloc(LiteralTypeNode {
                    data,
                    literal: LiteralTypeKind::Number(lit),
                });
                self.alloc(TypeNode::Literal(node))
            }
            TrueKeyword | FalseKeyword | NullKeyword => {
                let literal = match self.token {
                    TrueKeyword => LiteralTypeKind::True,
                    FalseKeyword => LiteralTypeKind::False,
                    _ => LiteralTypeKind::Null,
                };
                self.next();
                let data = self.finish(LiteralType, pos);
                let node = self.alloc(LiteralTypeNode { data, literal });
                self.alloc(TypeNode::Literal(node))
            }
            ThisKeyword => {
                self.next();
                let data = self.finish(ThisType, pos);
                let node = self.alloc(ThisTypeNode { data });
                self.alloc(TypeNode::This(node))
            }
            TypeOfKeyword => {
                self.next();
                let expr_name = self.parse_entity_name();
                let data = self.finish(TypeQuery, pos);
                let node = self.alloc(TypeQueryNode { data, expr_name });
                self.alloc(TypeNode::TypeQuery(node))
            }
            OpenBraceToken => self.parse_type_literal_or_mapped(),
            OpenBracketToken => self.parse_tuple_type(),
            OpenParenToken => {
                self.next();
                let type_node = self.parse_type();
                self.expect(CloseParenToken);
                let data = self.finish(ParenthesizedType, pos);
                let node = self.alloc(ParenthesizedTypeNode { data, type_node });
                self.alloc(TypeNode::Paren(node))
            }
            TemplateHead | NoSubstitutionTemplateLiteral => self.parse_template_literal_type(),
            _ if self.is_identifier() => {
                let type_name = self.parse_entity_name();
                let type_arguments = if self.token == LessThanToken {
                    self.next();
                    let mut args = vec![*self.parse_type()];
                    while self.optional(CommaToken) {
                        args.push(*self.parse_type());
                    }
                    self.expect_type_arg_close();
                    Some(self.alloc_slice(args))
                } else {
                    None
                };
                let data = self.finish(TypeReference, pos);
                let node = self.alloc(TypeReferenceNode {
                    data,
                    type_name,
                    type_arguments,
                });
                self.alloc(TypeNode::TypeReference(node))
            }
            _ => {
                self.error(&messages::TYPE_EXPECTED, &[]);
                self.next();
                let data = NodeData::new(AnyKeyword, pos, self.last_token_end, self.node_id());
                let node = self.alloc(KeywordTypeNode { data });
                self.alloc(TypeNode::Keyword(node))
            }
        }
    }

    fn parse_type_literal_or_mapped(&mut self) -> &'a TypeNode<'a> {
        let pos = self.token_pos();
        // `{ [K in C]: T }` vs a type literal. Look for `ident in` after `[`,
        // allowing a leading +/-readonly modifier.
        let state = self.save();
        self.next(); // {
        let mut readonly_modifier = None;
        if self.token == PlusToken || self.token == MinusToken {
            let positive = self.token == PlusToken;
            self.next();
            if self.token == ReadonlyKeyword {
                readonly_modifier = Some(positive);
                self.next();
            }
        } else if self.token == ReadonlyKeyword && self.peek() == OpenBracketToken {
            readonly_modifier = Some(true);
            self.next();
        }
        let is_mapped = self.token == OpenBracketToken && {
            let inner = self.save();
            self.next();
            let ok = self.is_identifier() && {
                self.next();
                self.token == InKeyword
            };
            self.restore(inner);
            ok
        };
        if !is_mapped {
            self.restore(state);
            let members = self.parse_type_member_list();
            let data = self.finish(TypeLiteral, pos);
            let node = self.alloc(TypeLiteralNode { data, members });
            return self.alloc(TypeNode::TypeLiteral(node));
        }

        self.expect(OpenBracketToken);
        let tp_pos = self.token_pos();
        let name = self.parse_identifier();
        self.expect(InKeyword);
        let constraint = Some(self.parse_type());
        let tp_data = self.finish(TypeParameter, tp_pos);
        let type_parameter = self.alloc(TypeParameterDeclaration {
            data: tp_data,
            name,
            constraint,
            default: None,
        });
        self.expect(CloseBracketToken);
        let question_modifier = if self.token == PlusToken || self.token == MinusToken {
            let positive = self.token == PlusToken;
            self.next();
            self.expect(QuestionToken);
            Some(positive)
        } else if self.optional(QuestionToken) {
            Some(true)
        } else {
            None
        };
        let type_node = if self.optional(ColonToken) {
            Some(self.parse_type())
        } else {
            None
        };
        self.optional(SemicolonToken);
        self.expect(CloseBraceToken);
        let data = self.finish(MappedType, pos);
        let node = self.alloc(MappedTypeNode {
            data,
            readonly_modifier,
            type_parameter,
            question_modifier,
            type_node,
        });
        self.alloc(TypeNode::Mapped(node))
    }

    fn parse_tuple_type(&mut self) -> &'a TypeNode<'a> {
        let pos = self.token_pos();
        self.next(); // [
        let mut elements = Vec::new();
        while self.token != CloseBracketToken && self.token != EndOfFile {
            elements.push(*self.parse_tuple_element());
            if !self.optional(CommaToken) {
                break;
            }
        }
        self.expect(CloseBracketToken);
        let data = self.finish(TupleType, pos);
        let node = self.alloc(TupleTypeNode {
            data,
            elements: self.alloc_slice(elements),
        });
        self.alloc(TypeNode::Tuple(node))
    }

    fn parse_tuple_element(&mut self) -> &'a TypeNode<'a> {
        let pos = self.token_pos();
        // Named members: `name: T`, `name?: T`, `...name: T`.
        let named = (self.is_identifier()
            && matches!(self.peek(), ColonToken | QuestionToken))
            || (self.token == DotDotDotToken && {
                let state = self.save();
                self.next();
                let ok = self.is_identifier() && {
                    self.next();
                    self.token == ColonToken
                };
                self.restore(state);
                ok
            });
        if named {
            let dot_dot_dot = self.optional(DotDotDotToken);
            let name = self.parse_identifier();
            let question = self.optional(QuestionToken);
            self.expect(ColonToken);
            let type_node = self.parse_type();
            let data = self.finish(NamedTupleMember, pos);
            let node = self.alloc(NamedTupleMemberNode {
                data,
                dot_dot_dot,
                name,
                question,
                type_node,
            });
            return self.alloc(TypeNode::NamedTupleMember(node));
        }
        if self.optional(DotDotDotToken) {
            let type_node = self.parse_type();
            let data = self.finish(RestType, pos);
            let node = self.alloc(RestTypeNode { data, type_node });
            return self.alloc(TypeNode::Rest(node));
        }
        let ty = self.parse_type();
        if self.optional(QuestionToken) {
            let data = self.finish(OptionalType, pos);
            let node = self.alloc(OptionalTypeNode {
                data,
                type_node: ty,
            });
            return self.alloc(TypeNode::Optional(node));
        }
        ty
    }

    fn parse_template_literal_type(&mut self) -> &'a TypeNode<'a> {
        let pos = self.token_pos();
        if self.token == NoSubstitutionTemplateLiteral {
            let value = self.scanner.token_value().to_string();
            self.next();
            let lit_data = self.finish(SyntaxKind::StringLiteral, pos);
            let lit = self.alloc(tycheck_ast::node::StringLiteral {
                data: lit_data,
                value,
            });
            let data = self.finish(LiteralType, pos);
            let node = self.alloc(LiteralTypeNode {
                data,
                literal: LiteralTypeKind::String(lit),
            });
            return self.alloc(TypeNode::Literal(node));
        }
        let head = self.scanner.token_value().to_string();
        self.next();
        let mut spans = Vec::new();
        loop {
            let spos = self.token_pos();
            let type_node = self.parse_type();
            if self.token != CloseBraceToken {
                self.error(&messages::_0_EXPECTED, &["}"]);
                break;
            }
            let part = self.scanner.re_scan_template_token();
            let literal = self.scanner.token_value().to_string();
            let is_tail = part == TemplateTail;
            self.next();
            let data = self.finish(TemplateLiteralTypeSpan, spos);
            spans.push(tycheck_ast::node::TemplateLiteralTypeSpan {
                data,
                type_node,
                literal,
            });
            if is_tail {
                break;
            }
        }
        let data = self.finish(TemplateLiteralType, pos);
        let node = self.alloc(TemplateLiteralTypeNode {
            data,
            head,
            spans: self.alloc_slice(spans),
        });
        self.alloc(TypeNode::TemplateLiteral(node))
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn parse_expression_alloc(&mut self) -> &'a Expression<'a> {
        let expr = self.parse_expression();
        self.alloc(expr)
    }

    fn parse_assignment_expression_alloc(&mut self) -> &'a Expression<'a> {
        let expr = self.parse_assignment_expression();
        self.alloc(expr)
    }

    pub fn parse_expression(&mut self) -> Expression<'a> {
        let mut expr = self.parse_assignment_expression();
        while self.token == CommaToken {
            let pos = expr.data().range.pos;
            self.next();
            let right = self.parse_assignment_expression();
            let data = self.finish(BinaryExpression, pos);
            expr = Expression::Binary(self.alloc(tycheck_ast::node::BinaryExpression {
                data,
                left: self.alloc(expr),
                operator: CommaToken,
                right: self.alloc(right),
            }));
        }
        expr
    }

    fn parse_assignment_expression(&mut self) -> Expression<'a> {
        // Arrow functions first: `x => ...` and `(params) => ...`.
        if self.token == Identifier && self.peek() == EqualsGreaterThanToken {
            return self.parse_simple_arrow();
        }
        if self.token == OpenParenToken || self.token == LessThanToken {
            let state = self.save();
            if let Some(arrow) = self.try_parse_parenthesized_arrow() {
                return arrow;
            }
            self.restore(state);
        }

        let expr = self.parse_conditional_expression();
        if self.token.is_assignment_operator() {
            let pos = expr.data().range.pos;
            let operator = self.token;
            self.next();
            let right = self.parse_assignment_expression();
            let data = self.finish(BinaryExpression, pos);
            return Expression::Binary(self.alloc(tycheck_ast::node::BinaryExpression {
                data,
                left: self.alloc(expr),
                operator,
                right: self.alloc(right),
            }));
        }
        expr
    }

    fn parse_simple_arrow(&mut self) -> Expression<'a> {
        let pos = self.token_pos();
        let ppos = self.token_pos();
        let name = self.parse_identifier();
        let pdata = self.finish(Parameter, ppos);
        let parameters = self.alloc_slice(vec![ParameterDeclaration {
            data: pdata,
            dot_dot_dot: false,
            name,
            question: false,
            type_annotation: None,
            initializer: None,
        }]);
        self.expect(EqualsGreaterThanToken);
        let body = self.parse_arrow_body();
        let data = self.finish(SyntaxKind::ArrowFunction, pos);
        Expression::Arrow(self.alloc(tycheck_ast::node::ArrowFunction {
            data,
            type_parameters: None,
            parameters,
            return_type: None,
            body,
        }))
    }

    fn try_parse_parenthesized_arrow(&mut self) -> Option<Expression<'a>> {
        let pos = self.token_pos();
        let type_parameters = if self.token == LessThanToken {
            self.parse_type_parameters()
        } else {
            None
        };
        if self.token != OpenParenToken {
            return None;
        }
        self.next();
        let mut params = Vec::new();
        while self.token != CloseParenToken && self.token != EndOfFile {
            let ppos = self.token_pos();
            let dot_dot_dot = self.optional(DotDotDotToken);
            if !self.is_identifier() {
                return None;
            }
            let name = self.parse_identifier();
            let question = self.optional(QuestionToken);
            let type_annotation = if self.optional(ColonToken) {
                Some(self.parse_type())
            } else {
                None
            };
            let initializer = if self.optional(EqualsToken) {
                Some(self.parse_assignment_expression_alloc())
            } else {
                None
            };
            let data = self.finish(Parameter, ppos);
            params.push(ParameterDeclaration {
                data,
                dot_dot_dot,
                name,
                question,
                type_annotation,
                initializer,
            });
            if !self.optional(CommaToken) {
                break;
            }
        }
        if self.token != CloseParenToken {
            return None;
        }
        self.next();
        let return_type = if self.token == ColonToken {
            self.next();
            Some(self.parse_type())
        } else {
            None
        };
        if self.token != EqualsGreaterThanToken {
            return None;
        }
        self.next();
        let body = self.parse_arrow_body();
        let data = self.finish(SyntaxKind::ArrowFunction, pos);
        Some(Expression::Arrow(self.alloc(
            tycheck_ast::node::ArrowFunction {
                data,
                type_parameters,
                parameters: self.alloc_slice(params),
                return_type,
                body,
            },
        )))
    }

    fn parse_arrow_body(&mut self) -> ArrowBody<'a> {
        if self.token == OpenBraceToken {
            ArrowBody::Block(self.parse_block())
        } else {
            ArrowBody::Expression(self.parse_assignment_expression_alloc())
        }
    }

    fn parse_conditional_expression(&mut self) -> Expression<'a> {
        let condition = self.parse_binary_expression(0);
        if self.token != QuestionToken {
            return condition;
        }
        let pos = condition.data().range.pos;
        self.next();
        let when_true = self.parse_assignment_expression();
        self.expect(ColonToken);
        let when_false = self.parse_assignment_expression();
        let data = self.finish(ConditionalExpression, pos);
        Expression::Conditional(self.alloc(tycheck_ast::node::ConditionalExpression {
            data,
            condition: self.alloc(condition),
            when_true: self.alloc(when_true),
            when_false: self.alloc(when_false),
        }))
    }

    fn binary_precedence(token: SyntaxKind) -> u8 {
        match token {
            QuestionQuestionToken | BarBarToken => 4,
            AmpersandAmpersandToken => 5,
            BarToken => 6,
            CaretToken => 7,
            AmpersandToken => 8,
            EqualsEqualsToken
            | ExclamationEqualsToken
            | EqualsEqualsEqualsToken
            | ExclamationEqualsEqualsToken => 9,
            LessThanToken
            | GreaterThanToken
            | LessThanEqualsToken
            | GreaterThanEqualsToken
            | InstanceOfKeyword
            | InKeyword
            | AsKeyword
            | SatisfiesKeyword => 10,
            LessThanLessThanToken
            | GreaterThanGreaterThanToken
            | GreaterThanGreaterThanGreaterThanToken => 11,
            PlusToken | MinusToken => 12,
            AsteriskToken | SlashToken | PercentToken => 13,
            AsteriskAsteriskToken => 14,
            _ => 0,
        }
    }

    fn parse_binary_expression(&mut self, min_precedence: u8) -> Expression<'a> {
        let mut left = self.parse_unary_expression();
        loop {
            let precedence = Self::binary_precedence(self.token);
            if precedence == 0 || precedence <= min_precedence {
                break;
            }
            let pos = left.data().range.pos;
            if self.token == AsKeyword || self.token == SatisfiesKeyword {
                let is_as = self.token == AsKeyword;
                self.next();
                let type_node = self.parse_type();
                let data = self.finish(
                    if is_as { AsExpression } else { SatisfiesExpression },
                    pos,
                );
                let node = self.alloc(AssertionExpression {
                    data,
                    expression: self.alloc(left),
                    type_node,
                });
                left = if is_as {
                    Expression::As(node)
                } else {
                    Expression::Satisfies(node)
                };
                continue;
            }
            let operator = self.token;
            self.next();
            // `**` is right-associative.
            let right = if operator == AsteriskAsteriskToken {
                self.parse_binary_expression(precedence - 1)
            } else {
                self.parse_binary_expression(precedence)
            };
            let data = self.finish(BinaryExpression, pos);
            left = Expression::Binary(self.alloc(tycheck_ast::node::BinaryExpression {
                data,
                left: self.alloc(left),
                operator,
                right: self.alloc(right),
            }));
        }
        left
    }

    fn parse_unary_expression(&mut self) -> Expression<'a> {
        let pos = self.token_pos();
        match self.token {
            PlusToken | MinusToken | ExclamationToken | TildeToken | PlusPlusToken
            | MinusMinusToken => {
                let operator = self.token;
                self.next();
                let operand = self.parse_unary_expression();
                let data = self.finish(PrefixUnaryExpression, pos);
                Expression::PrefixUnary(self.alloc(PrefixUnary {
                    data,
                    operator,
                    operand: self.alloc(operand),
                }))
            }
            TypeOfKeyword => {
                self.next();
                let operand = self.parse_unary_expression();
                let expression = self.alloc(operand);
                let data = self.finish(TypeOfExpression, pos);
                Expression::TypeOf(self.alloc(UnaryExpressionLike { data, expression }))
            }
            VoidKeyword => {
                self.next();
                let operand = self.parse_unary_expression();
                let expression = self.alloc(operand);
                let data = self.finish(VoidExpression, pos);
                Expression::Void(self.alloc(UnaryExpressionLike { data, expression }))
            }
            DeleteKeyword => {
                self.next();
                let operand = self.parse_unary_expression();
                let expression = self.alloc(operand);
                let data = self.finish(DeleteExpression, pos);
                Expression::Delete(self.alloc(UnaryExpressionLike { data, expression }))
            }
            AwaitKeyword => {
                self.next();
                let operand = self.parse_unary_expression();
                let expression = self.alloc(operand);
                let data = self.finish(AwaitExpression, pos);
                Expression::Await(self.alloc(UnaryExpressionLike { data, expression }))
            }
            _ => self.parse_postfix_expression(),
        }
    }

    fn parse_postfix_expression(&mut self) -> Expression<'a> {
        let expr = self.parse_call_expression();
        if (self.token == PlusPlusToken || self.token == MinusMinusToken)
            && !self.scanner.has_preceding_line_break()
        {
            let pos = expr.data().range.pos;
            let operator = self.token;
            self.next();
            let data = self.finish(PostfixUnaryExpression, pos);
            return Expression::PostfixUnary(self.alloc(PostfixUnary {
                data,
                operator,
                operand: self.alloc(expr),
            }));
        }
        expr
    }

    fn parse_call_expression(&mut self) -> Expression<'a> {
        let mut expr = self.parse_primary_expression();
        loop {
            let pos = expr.data().range.pos;
            match self.token {
                DotToken => {
                    self.next();
                    let name = self.parse_member_name();
                    let data = self.finish(PropertyAccessExpression, pos);
                    expr = Expression::PropertyAccess(self.alloc(PropertyAccess {
                        data,
                        expression: self.alloc(expr),
                        question_dot: false,
                        name,
                    }));
                }
                QuestionDotToken => {
                    self.next();
                    if self.token == OpenParenToken {
                        let arguments = self.parse_argument_list();
                        let data = self.finish(SyntaxKind::CallExpression, pos);
                        expr = Expression::Call(self.alloc(tycheck_ast::node::CallExpression {
                            data,
                            expression: self.alloc(expr),
                            question_dot: true,
                            type_arguments: None,
                            arguments,
                        }));
                    } else if self.token == OpenBracketToken {
                        self.next();
                        let argument = self.parse_expression_alloc();
                        self.expect(CloseBracketToken);
                        let data = self.finish(ElementAccessExpression, pos);
                        expr = Expression::ElementAccess(self.alloc(ElementAccess {
                            data,
                            expression: self.alloc(expr),
                            question_dot: true,
                            argument,
                        }));
                    } else {
                        let name = self.parse_member_name();
                        let data = self.finish(PropertyAccessExpression, pos);
                        expr = Expression::PropertyAccess(self.alloc(PropertyAccess {
                            data,
                            expression: self.alloc(expr),
                            question_dot: true,
                            name,
                        }));
                    }
                }
                OpenBracketToken => {
                    self.next();
                    let argument = self.parse_expression_alloc();
                    self.expect(CloseBracketToken);
                    let data = self.finish(ElementAccessExpression, pos);
                    expr = Expression::ElementAccess(self.alloc(ElementAccess {
                        data,
                        expression: self.alloc(expr),
                        question_dot: false,
                        argument,
                    }));
                }
                OpenParenToken => {
                    let arguments = self.parse_argument_list();
                    let data = self.finish(SyntaxKind::CallExpression, pos);
                    expr = Expression::Call(self.alloc(tycheck_ast::node::CallExpression {
                        data,
                        expression: self.alloc(expr),
                        question_dot: false,
                        type_arguments: None,
                        arguments,
                    }));
                }
                LessThanToken => {
                    // Possibly explicit call type arguments.
                    let state = self.save();
                    self.next();
                    let mut args = Vec::new();
                    let mut ok = true;
                    loop {
                        if !self.could_start_type() {
                            ok = false;
                            break;
                        }
                        args.push(*self.parse_type());
                        if self.optional(CommaToken) {
                            continue;
                        }
                        self.token = self.scanner.re_scan_greater_than();
                        if self.token == GreaterThanToken {
                            self.next();
                            break;
                        }
                        ok = false;
                        break;
                    }
                    if ok && self.token == OpenParenToken {
                        let type_arguments = Some(self.alloc_slice(args));
                        let arguments = self.parse_argument_list();
                        let data = self.finish(SyntaxKind::CallExpression, pos);
                        expr = Expression::Call(self.alloc(tycheck_ast::node::CallExpression {
                            data,
                            expression: self.alloc(expr),
                            question_dot: false,
                            type_arguments,
                            arguments,
                        }));
                    } else {
                        self.restore(state);
                        break;
                    }
                }
                ExclamationToken if !self.scanner.has_preceding_line_break() => {
                    self.next();
                    let data = self.finish(NonNullExpression, pos);
                    expr = Expression::NonNull(self.alloc(UnaryExpressionLike {
                        data,
                        expression: self.alloc(expr),
                    }));
                }
                _ => break,
            }
        }
        expr
    }

    fn could_start_type(&self) -> bool {
        matches!(
            self.token,
            Identifier
                | AnyKeyword
                | UnknownKeyword
                | StringKeyword
                | NumberKeyword
                | BooleanKeyword
                | BigIntKeyword
                | SymbolKeyword
                | ObjectKeyword
                | VoidKeyword
                | UndefinedKeyword
                | NeverKeyword
                | SyntaxKind::StringLiteral
                | SyntaxKind::NumericLiteral
                | OpenBraceToken
                | OpenBracketToken
                | OpenParenToken
                | TypeOfKeyword
                | KeyOfKeyword
                | NewKeyword
                | ThisKeyword
                | TrueKeyword
                | FalseKeyword
                | NullKeyword
        )
    }

    fn parse_argument_list(&mut self) -> &'a [Expression<'a>] {
        self.expect(OpenParenToken);
        let mut args = Vec::new();
        while self.token != CloseParenToken && self.token != EndOfFile {
            if self.token == DotDotDotToken {
                let pos = self.token_pos();
                self.next();
                let expression = self.parse_assignment_expression_alloc();
                let data = self.finish(SpreadElement, pos);
                args.push(Expression::Spread(
                    self.alloc(UnaryExpressionLike { data, expression }),
                ));
            } else {
                args.push(self.parse_assignment_expression());
            }
            if !self.optional(CommaToken) {
                break;
            }
        }
        self.expect(CloseParenToken);
        self.alloc_slice(args)
    }

    fn parse_primary_expression(&mut self) -> Expression<'a> {
        let pos = self.token_pos();
        let token = self.token;
        match token {
            SyntaxKind::NumericLiteral => {
                let value = self.scanner.token_number();
                let text = self.scanner.token_value().to_string();
                self.next();
                let data = self.finish(SyntaxKind::NumericLiteral, pos);
                Expression::NumericLiteral(self.alloc(tycheck_ast::node::NumericLiteral {
                    data,
                    value,
                    text,
                }))
            }
            SyntaxKind::BigIntLiteral => {
                let text = self.scanner.token_value().to_string();
                self.next();
                let data = self.finish(SyntaxKind::BigIntLiteral, pos);
                Expression::BigIntLiteral(
                    self.alloc(tycheck_ast::node::BigIntLiteral { data, text }),
                )
            }
            SyntaxKind::StringLiteral => {
                let value = self.scanner.token_value().to_string();
                self.next();
                let data = self.finish(SyntaxKind::StringLiteral, pos);
                Expression::StringLiteral(
                    self.alloc(tycheck_ast::node::StringLiteral { data, value }),
                )
            }
            NoSubstitutionTemplateLiteral => {
                let value = self.scanner.token_value().to_string();
                self.next();
                let data = self.finish(NoSubstitutionTemplateLiteral, pos);
                Expression::NoSubstitutionTemplate(
                    self.alloc(tycheck_ast::node::StringLiteral { data, value }),
                )
            }
            TemplateHead => self.parse_template_expression(),
            TrueKeyword => self.parse_token_expression(Expression::True),
            FalseKeyword => self.parse_token_expression(Expression::False),
            NullKeyword => self.parse_token_expression(Expression::Null),
            ThisKeyword => self.parse_token_expression(Expression::This),
            SuperKeyword => self.parse_token_expression(Expression::Super),
            OpenBracketToken => self.parse_array_literal(),
            OpenBraceToken => self.parse_object_literal(),
            OpenParenToken => {
                self.next();
                let expression = self.parse_expression_alloc();
                self.expect(CloseParenToken);
                let data = self.finish(ParenthesizedExpression, pos);
                Expression::Paren(self.alloc(ParenExpression { data, expression }))
            }
            NewKeyword => self.parse_new_expression(),
            FunctionKeyword => self.parse_function_expression(),
            AsyncKeyword if self.peek() == FunctionKeyword => {
                self.next();
                self.parse_function_expression()
            }
            _ if self.is_identifier() => Expression::Identifier(self.parse_identifier()),
            _ => {
                self.error(&messages::EXPRESSION_EXPECTED, &[]);
                let text = self.interner.intern("");
                let data = self.finish(SyntaxKind::Identifier, pos);
                Expression::Identifier(self.alloc(tycheck_ast::node::Identifier {
                    data,
                    text,
                    text_name: String::new(),
                }))
            }
        }
    }

    fn parse_token_expression(
        &mut self,
        make: fn(&'a Token) -> Expression<'a>,
    ) -> Expression<'a> {
        let pos = self.token_pos();
        let kind = self.token;
        self.next();
        let data = NodeData::new(kind, pos, self.last_token_end, self.node_id());
        make(self.alloc(Token { data }))
    }

    fn parse_template_expression(&mut self) -> Expression<'a> {
        let pos = self.token_pos();
        let head = self.scanner.token_value().to_string();
        self.next();
        let mut spans = Vec::new();
        loop {
            let spos = self.token_pos();
            let expression = self.parse_expression_alloc();
            if self.token != CloseBraceToken {
                self.error(&messages::_0_EXPECTED, &["}"]);
                break;
            }
            let part = self.scanner.re_scan_template_token();
            let literal = self.scanner.token_value().to_string();
            let is_tail = part == TemplateTail;
            self.next();
            let data = self.finish(TemplateSpan, spos);
            spans.push(tycheck_ast::node::TemplateSpan {
                data,
                expression,
                literal,
            });
            if is_tail {
                break;
            }
        }
        let data = self.finish(TemplateExpression, pos);
        Expression::Template(self.alloc(tycheck_ast::node::TemplateExpression {
            data,
            head,
            spans: self.alloc_slice(spans),
        }))
    }

    fn parse_array_literal(&mut self) -> Expression<'a> {
        let pos = self.token_pos();
        self.next(); // [
        let mut elements = Vec::new();
        while self.token != CloseBracketToken && self.token != EndOfFile {
            if self.token == DotDotDotToken {
                let spos = self.token_pos();
                self.next();
                let expression = self.parse_assignment_expression_alloc();
                let data = self.finish(SpreadElement, spos);
                elements.push(Expression::Spread(
                    self.alloc(UnaryExpressionLike { data, expression }),
                ));
            } else {
                elements.push(self.parse_assignment_expression());
            }
            if !self.optional(CommaToken) {
                break;
            }
        }
        self.expect(CloseBracketToken);
        let data = self.finish(ArrayLiteralExpression, pos);
        Expression::Array(self.alloc(ArrayLiteral {
            data,
            elements: self.alloc_slice(elements),
        }))
    }

    fn parse_object_literal(&mut self) -> Expression<'a> {
        let pos = self.token_pos();
        self.next(); // {
        let mut properties = Vec::new();
        while self.token != CloseBraceToken && self.token != EndOfFile {
            let ppos = self.token_pos();
            if self.token == DotDotDotToken {
                self.next();
                let expression = self.parse_assignment_expression_alloc();
                let data = self.finish(SpreadAssignment, ppos);
                properties.push(ObjectLiteralElement::Spread(
                    self.alloc(tycheck_ast::node::SpreadAssignment { data, expression }),
                ));
            } else {
                let name = self.parse_property_name();
                if self.optional(ColonToken) {
                    let initializer = self.parse_assignment_expression_alloc();
                    let data = self.finish(PropertyAssignment, ppos);
                    properties.push(ObjectLiteralElement::Property(self.alloc(
                        tycheck_ast::node::PropertyAssignment {
                            data,
                            name,
                            initializer,
                        },
                    )));
                } else if let PropertyName::Identifier(ident) = name {
                    let data = self.finish(ShorthandPropertyAssignment, ppos);
                    properties.push(ObjectLiteralElement::Shorthand(self.alloc(
                        tycheck_ast::node::ShorthandPropertyAssignment { data, name: ident },
                    )));
                } else {
                    self.error(&messages::_0_EXPECTED, &[":"]);
                }
            }
            if !self.optional(CommaToken) {
                break;
            }
        }
        self.expect(CloseBraceToken);
        let data = self.finish(ObjectLiteralExpression, pos);
        Expression::Object(self.alloc(ObjectLiteral {
            data,
            properties: self.alloc_slice(properties),
        }))
    }

    fn parse_new_expression(&mut self) -> Expression<'a> {
        let pos = self.token_pos();
        self.next(); // new
        let mut expression = self.parse_primary_expression();
        // Member chain on the constructor expression, but not calls.
        while self.token == DotToken {
            let mpos = expression.data().range.pos;
            self.next();
            let name = self.parse_member_name();
            let data = self.finish(PropertyAccessExpression, mpos);
            expression = Expression::PropertyAccess(self.alloc(PropertyAccess {
                data,
                expression: self.alloc(expression),
                question_dot: false,
                name,
            }));
        }
        let type_arguments = if self.token == LessThanToken {
            let state = self.save();
            self.next();
            let mut args = Vec::new();
            let mut ok = true;
            loop {
                if !self.could_start_type() {
                    ok = false;
                    break;
                }
                args.push(*self.parse_type());
                if self.optional(CommaToken) {
                    continue;
                }
                self.token = self.scanner.re_scan_greater_than();
                if self.token == GreaterThanToken {
                    self.next();
                    break;
                }
                ok = false;
                break;
            }
            if ok {
                Some(self.alloc_slice(args))
            } else {
                self.restore(state);
                None
            }
        } else {
            None
        };
        let arguments = if self.token == OpenParenToken {
            Some(self.parse_argument_list())
        } else {
            None
        };
        let data = self.finish(SyntaxKind::NewExpression, pos);
        Expression::New(self.alloc(tycheck_ast::node::NewExpression {
            data,
            expression: self.alloc(expression),
            type_arguments,
            arguments,
        }))
    }

    fn parse_function_expression(&mut self) -> Expression<'a> {
        let pos = self.token_pos();
        self.next(); // function
        let name = if self.is_identifier() {
            Some(self.parse_identifier())
        } else {
            None
        };
        let type_parameters = self.parse_type_parameters();
        let parameters = self.parse_parameter_list();
        let return_type = if self.optional(ColonToken) {
            Some(self.parse_type())
        } else {
            None
        };
        let body = self.parse_block();
        let data = self.finish(SyntaxKind::FunctionExpression, pos);
        Expression::FunctionExpr(self.alloc(tycheck_ast::node::FunctionExpression {
            data,
            name,
            type_parameters,
            parameters,
            return_type,
            body,
        }))
    }
}
