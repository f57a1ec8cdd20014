//! AST node definitions.
//!
//! Nodes live in a bump arena and reference each other by `&'a` borrows.
//! `NodeData` carries the kind, source range, flags, and a parse-time id
//! that the binder and checker use to key side tables.

use crate::syntax_kind::SyntaxKind;
use crate::types::*;
use tycheck_core::intern::InternedString;
use tycheck_core::text::TextRange;

// ============================================================================
// Core node wrapper
// ============================================================================

/// Data common to every node.
#[derive(Debug, Clone)]
pub struct NodeData {
    pub kind: SyntaxKind,
    pub range: TextRange,
    pub flags: NodeFlags,
    pub modifier_flags: ModifierFlags,
    /// Assigned sequentially at parse time; keys binder/checker side tables.
    pub id: NodeId,
}

impl NodeData {
    pub fn new(kind: SyntaxKind, pos: u32, end: u32, id: NodeId) -> Self {
        Self {
            kind,
            range: TextRange::new(pos, end),
            flags: NodeFlags::NONE,
            modifier_flags: ModifierFlags::NONE,
            id,
        }
    }
}

pub type NodeList<'a, T> = &'a [T];

// ============================================================================
// Source file
// ============================================================================

#[derive(Debug)]
pub struct SourceFile<'a> {
    pub data: NodeData,
    pub statements: NodeList<'a, Statement<'a>>,
    pub file_name: String,
    pub text: String,
    /// Module specifier other files may import this file under.
    pub module_name: String,
    pub is_declaration_file: bool,
}

// ============================================================================
// Identifier and tokens
// ============================================================================

#[derive(Debug, Clone)]
pub struct Identifier {
    pub data: NodeData,
    pub text: InternedString,
    pub text_name: String,
}

impl Identifier {
    pub fn is_private(&self) -> bool {
        self.text_name.starts_with('#')
    }
}

#[derive(Debug, Clone)]
pub struct Token {
    pub data: NodeData,
}

// ============================================================================
// Entity names and property names
// ============================================================================

#[derive(Debug, Clone, Copy)]
pub enum EntityName<'a> {
    Identifier(&'a Identifier),
    Qualified(&'a QualifiedName<'a>),
}

impl<'a> EntityName<'a> {
    pub fn data(&self) -> &NodeData {
        match self {
            EntityName::Identifier(n) => &n.data,
            EntityName::Qualified(n) => &n.data,
        }
    }

    /// The rightmost identifier.
    pub fn terminal(&self) -> &'a Identifier {
        match self {
            EntityName::Identifier(n) => n,
            EntityName::Qualified(n) => n.right,
        }
    }
}

#[derive(Debug)]
pub struct QualifiedName<'a> {
    pub data: NodeData,
    pub left: &'a EntityName<'a>,
    pub right: &'a Identifier,
}

#[derive(Debug, Clone, Copy)]
pub enum PropertyName<'a> {
    Identifier(&'a Identifier),
    String(&'a StringLiteral),
    Numeric(&'a NumericLiteral),
    Private(&'a Identifier),
}

impl PropertyName<'_> {
    pub fn data(&self) -> &NodeData {
        match self {
            PropertyName::Identifier(n) => &n.data,
            PropertyName::String(n) => &n.data,
            PropertyName::Numeric(n) => &n.data,
            PropertyName::Private(n) => &n.data,
        }
    }

    pub fn text(&self) -> String {
        match self {
            PropertyName::Identifier(n) => n.text_name.clone(),
            PropertyName::String(n) => n.value.clone(),
            PropertyName::Numeric(n) => {
                if n.value.fract() == 0.0 && n.value.abs() < 1e21 {
                    format!("{}", n.value as i64)
                } else {
                    format!("{}", n.value)
                }
            }
            PropertyName::Private(n) => n.text_name.clone(),
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, PropertyName::Numeric(_))
    }
}

// ============================================================================
// Type nodes
// ============================================================================

#[derive(Debug, Clone, Copy)]
pub enum TypeNode<'a> {
    Keyword(&'a KeywordTypeNode),
    TypeReference(&'a TypeReferenceNode<'a>),
    Function(&'a FunctionTypeNode<'a>),
    Constructor(&'a ConstructorTypeNode<'a>),
    TypeQuery(&'a TypeQueryNode<'a>),
    TypeLiteral(&'a TypeLiteralNode<'a>),
    Array(&'a ArrayTypeNode<'a>),
    Tuple(&'a TupleTypeNode<'a>),
    Optional(&'a OptionalTypeNode<'a>),
    Rest(&'a RestTypeNode<'a>),
    NamedTupleMember(&'a NamedTupleMemberNode<'a>),
    Union(&'a UnionTypeNode<'a>),
    Intersection(&'a IntersectionTypeNode<'a>),
    Conditional(&'a ConditionalTypeNode<'a>),
    Infer(&'a InferTypeNode<'a>),
    Paren(&'a ParenthesizedTypeNode<'a>),
    This(&'a ThisTypeNode),
    Operator(&'a TypeOperatorNode<'a>),
    IndexedAccess(&'a IndexedAccessTypeNode<'a>),
    Mapped(&'a MappedTypeNode<'a>),
    Literal(&'a LiteralTypeNode<'a>),
    TemplateLiteral(&'a TemplateLiteralTypeNode<'a>),
}

impl TypeNode<'_> {
    pub fn data(&self) -> &NodeData {
        match self {
            TypeNode::Keyword(n) => &n.data,
            TypeNode::TypeReference(n) => &n.data,
            TypeNode::Function(n) => &n.data,
            TypeNode::Constructor(n) => &n.data,
            TypeNode::TypeQuery(n) => &n.data,
            TypeNode::TypeLiteral(n) => &n.data,
            TypeNode::Array(n) => &n.data,
            TypeNode::Tuple(n) => &n.data,
            TypeNode::Optional(n) => &n.data,
            TypeNode::Rest(n) => &n.data,
            TypeNode::NamedTupleMember(n) => &n.data,
            TypeNode::Union(n) => &n.data,
            TypeNode::Intersection(n) => &n.data,
            TypeNode::Conditional(n) => &n.data,
            TypeNode::Infer(n) => &n.data,
            TypeNode::Paren(n) => &n.data,
            TypeNode::This(n) => &n.data,
            TypeNode::Operator(n) => &n.data,
            TypeNode::IndexedAccess(n) => &n.data,
            TypeNode::Mapped(n) => &n.data,
            TypeNode::Literal(n) => &n.data,
            TypeNode::TemplateLiteral(n) => &n.data,
        }
    }
}

#[derive(Debug)]
pub struct KeywordTypeNode {
    pub data: NodeData,
}

#[derive(Debug)]
pub struct TypeReferenceNode<'a> {
    pub data: NodeData,
    pub type_name: EntityName<'a>,
    pub type_arguments: Option<NodeList<'a, TypeNode<'a>>>,
}

#[derive(Debug)]
pub struct FunctionTypeNode<'a> {
    pub data: NodeData,
    pub type_parameters: Option<NodeList<'a, TypeParameterDeclaration<'a>>>,
    pub parameters: NodeList<'a, ParameterDeclaration<'a>>,
    pub return_type: &'a TypeNode<'a>,
}

#[derive(Debug)]
pub struct ConstructorTypeNode<'a> {
    pub data: NodeData,
    pub type_parameters: Option<NodeList<'a, TypeParameterDeclaration<'a>>>,
    pub parameters: NodeList<'a, ParameterDeclaration<'a>>,
    pub return_type: &'a TypeNode<'a>,
}

#[derive(Debug)]
pub struct TypeQueryNode<'a> {
    pub data: NodeData,
    pub expr_name: EntityName<'a>,
}

#[derive(Debug)]
pub struct TypeLiteralNode<'a> {
    pub data: NodeData,
    pub members: NodeList<'a, TypeElement<'a>>,
}

#[derive(Debug)]
pub struct ArrayTypeNode<'a> {
    pub data: NodeData,
    pub element_type: &'a TypeNode<'a>,
}

#[derive(Debug)]
pub struct TupleTypeNode<'a> {
    pub data: NodeData,
    pub elements: NodeList<'a, TypeNode<'a>>,
}

#[derive(Debug)]
pub struct OptionalTypeNode<'a> {
    pub data: NodeData,
    pub type_node: &'a TypeNode<'a>,
}

#[derive(Debug)]
pub struct RestTypeNode<'a> {
    pub data: NodeData,
    pub type_node: &'a TypeNode<'a>,
}

#[derive(Debug)]
pub struct NamedTupleMemberNode<'a> {
    pub data: NodeData,
    pub dot_dot_dot: bool,
    pub name: &'a Identifier,
    pub question: bool,
    pub type_node: &'a TypeNode<'a>,
}

#[derive(Debug)]
pub struct UnionTypeNode<'a> {
    pub data: NodeData,
    pub types: NodeList<'a, TypeNode<'a>>,
}

#[derive(Debug)]
pub struct IntersectionTypeNode<'a> {
    pub data: NodeData,
    pub types: NodeList<'a, TypeNode<'a>>,
}

#[derive(Debug)]
pub struct ConditionalTypeNode<'a> {
    pub data: NodeData,
    pub check_type: &'a TypeNode<'a>,
    pub extends_type: &'a TypeNode<'a>,
    pub true_type: &'a TypeNode<'a>,
    pub false_type: &'a TypeNode<'a>,
}

#[derive(Debug)]
pub struct InferTypeNode<'a> {
    pub data: NodeData,
    pub type_parameter: &'a TypeParameterDeclaration<'a>,
}

#[derive(Debug)]
pub struct ParenthesizedTypeNode<'a> {
    pub data: NodeData,
    pub type_node: &'a TypeNode<'a>,
}

#[derive(Debug)]
pub struct ThisTypeNode {
    pub data: NodeData,
}

#[derive(Debug)]
pub struct TypeOperatorNode<'a> {
    pub data: NodeData,
    /// `keyof`, `readonly`, or `unique`.
    pub operator: SyntaxKind,
    pub type_node: &'a TypeNode<'a>,
}

#[derive(Debug)]
pub struct IndexedAccessTypeNode<'a> {
    pub data: NodeData,
    pub object_type: &'a TypeNode<'a>,
    pub index_type: &'a TypeNode<'a>,
}

#[derive(Debug)]
pub struct MappedTypeNode<'a> {
    pub data: NodeData,
    /// `readonly` / `+readonly` is `Some(true)`, `-readonly` is `Some(false)`.
    pub readonly_modifier: Option<bool>,
    pub type_parameter: &'a TypeParameterDeclaration<'a>,
    /// `?` / `+?` is `Some(true)`, `-?` is `Some(false)`.
    pub question_modifier: Option<bool>,
    pub type_node: Option<&'a TypeNode<'a>>,
}

#[derive(Debug, Clone, Copy)]
pub enum LiteralTypeKind<'a> {
    String(&'a StringLiteral),
    Number(&'a NumericLiteral),
    BigInt(&'a BigIntLiteral),
    True,
    False,
    Null,
}

#[derive(Debug)]
pub struct LiteralTypeNode<'a> {
    pub data: NodeData,
    pub literal: LiteralTypeKind<'a>,
}

#[derive(Debug)]
pub struct TemplateLiteralTypeNode<'a> {
    pub data: NodeData,
    pub head: String,
    pub spans: NodeList<'a, TemplateLiteralTypeSpan<'a>>,
}

#[derive(Debug)]
pub struct TemplateLiteralTypeSpan<'a> {
    pub data: NodeData,
    pub type_node: &'a TypeNode<'a>,
    pub literal: String,
}

// ============================================================================
// Type members
// ============================================================================

#[derive(Debug, Clone, Copy)]
pub enum TypeElement<'a> {
    PropertySignature(&'a PropertySignatureNode<'a>),
    MethodSignature(&'a MethodSignatureNode<'a>),
    CallSignature(&'a CallSignatureNode<'a>),
    ConstructSignature(&'a ConstructSignatureNode<'a>),
    IndexSignature(&'a IndexSignatureNode<'a>),
}

impl TypeElement<'_> {
    pub fn data(&self) -> &NodeData {
        match self {
            TypeElement::PropertySignature(n) => &n.data,
            TypeElement::MethodSignature(n) => &n.data,
            TypeElement::CallSignature(n) => &n.data,
            TypeElement::ConstructSignature(n) => &n.data,
            TypeElement::IndexSignature(n) => &n.data,
        }
    }
}

#[derive(Debug)]
pub struct PropertySignatureNode<'a> {
    pub data: NodeData,
    pub name: PropertyName<'a>,
    pub question: bool,
    pub type_annotation: Option<&'a TypeNode<'a>>,
}

#[derive(Debug)]
pub struct MethodSignatureNode<'a> {
    pub data: NodeData,
    pub name: PropertyName<'a>,
    pub question: bool,
    pub type_parameters: Option<NodeList<'a, TypeParameterDeclaration<'a>>>,
    pub parameters: NodeList<'a, ParameterDeclaration<'a>>,
    pub return_type: Option<&'a TypeNode<'a>>,
}

#[derive(Debug)]
pub struct CallSignatureNode<'a> {
    pub data: NodeData,
    pub type_parameters: Option<NodeList<'a, TypeParameterDeclaration<'a>>>,
    pub parameters: NodeList<'a, ParameterDeclaration<'a>>,
    pub return_type: Option<&'a TypeNode<'a>>,
}

#[derive(Debug)]
pub struct ConstructSignatureNode<'a> {
    pub data: NodeData,
    pub type_parameters: Option<NodeList<'a, TypeParameterDeclaration<'a>>>,
    pub parameters: NodeList<'a, ParameterDeclaration<'a>>,
    pub return_type: Option<&'a TypeNode<'a>>,
}

#[derive(Debug)]
pub struct IndexSignatureNode<'a> {
    pub data: NodeData,
    pub readonly: bool,
    pub parameter: &'a ParameterDeclaration<'a>,
    pub type_annotation: &'a TypeNode<'a>,
}

// ============================================================================
// Declarations shared by functions and signatures
// ============================================================================

#[derive(Debug)]
pub struct TypeParameterDeclaration<'a> {
    pub data: NodeData,
    pub name: &'a Identifier,
    pub constraint: Option<&'a TypeNode<'a>>,
    pub default: Option<&'a TypeNode<'a>>,
}

#[derive(Debug)]
pub struct ParameterDeclaration<'a> {
    pub data: NodeData,
    pub dot_dot_dot: bool,
    pub name: &'a Identifier,
    pub question: bool,
    pub type_annotation: Option<&'a TypeNode<'a>>,
    pub initializer: Option<&'a Expression<'a>>,
}

// ============================================================================
// Expressions
// ============================================================================

#[derive(Debug, Clone, Copy)]
pub enum Expression<'a> {
    Identifier(&'a Identifier),
    NumericLiteral(&'a NumericLiteral),
    BigIntLiteral(&'a BigIntLiteral),
    StringLiteral(&'a StringLiteral),
    NoSubstitutionTemplate(&'a StringLiteral),
    Template(&'a TemplateExpression<'a>),
    True(&'a Token),
    False(&'a Token),
    Null(&'a Token),
    This(&'a Token),
    Super(&'a Token),
    Array(&'a ArrayLiteral<'a>),
    Object(&'a ObjectLiteral<'a>),
    PropertyAccess(&'a PropertyAccess<'a>),
    ElementAccess(&'a ElementAccess<'a>),
    Call(&'a CallExpression<'a>),
    New(&'a NewExpression<'a>),
    Paren(&'a ParenExpression<'a>),
    Arrow(&'a ArrowFunction<'a>),
    FunctionExpr(&'a FunctionExpression<'a>),
    PrefixUnary(&'a PrefixUnary<'a>),
    PostfixUnary(&'a PostfixUnary<'a>),
    Binary(&'a BinaryExpression<'a>),
    Conditional(&'a ConditionalExpression<'a>),
    TypeOf(&'a UnaryExpressionLike<'a>),
    Void(&'a UnaryExpressionLike<'a>),
    Delete(&'a UnaryExpressionLike<'a>),
    Await(&'a UnaryExpressionLike<'a>),
    Spread(&'a UnaryExpressionLike<'a>),
    As(&'a AssertionExpression<'a>),
    Satisfies(&'a AssertionExpression<'a>),
    NonNull(&'a UnaryExpressionLike<'a>),
}

impl Expression<'_> {
    pub fn data(&self) -> &NodeData {
        match self {
            Expression::Identifier(n) => &n.data,
            Expression::NumericLiteral(n) => &n.data,
            Expression::BigIntLiteral(n) => &n.data,
            Expression::StringLiteral(n) => &n.data,
            Expression::NoSubstitutionTemplate(n) => &n.data,
            Expression::Template(n) => &n.data,
            Expression::True(n)
            | Expression::False(n)
            | Expression::Null(n)
            | Expression::This(n)
            | Expression::Super(n) => &n.data,
            Expression::Array(n) => &n.data,
            Expression::Object(n) => &n.data,
            Expression::PropertyAccess(n) => &n.data,
            Expression::ElementAccess(n) => &n.data,
            Expression::Call(n) => &n.data,
            Expression::New(n) => &n.data,
            Expression::Paren(n) => &n.data,
            Expression::Arrow(n) => &n.data,
            Expression::FunctionExpr(n) => &n.data,
            Expression::PrefixUnary(n) => &n.data,
            Expression::PostfixUnary(n) => &n.data,
            Expression::Binary(n) => &n.data,
            Expression::Conditional(n) => &n.data,
            Expression::TypeOf(n)
            | Expression::Void(n)
            | Expression::Delete(n)
            | Expression::Await(n)
            | Expression::Spread(n)
            | Expression::NonNull(n) => &n.data,
            Expression::As(n) | Expression::Satisfies(n) => &n.data,
        }
    }

    /// Strip parentheses.
    pub fn skip_parens(&self) -> &Expression<'_> {
        let mut expr = self;
        while let Expression::Paren(p) = expr {
            expr = p.expression;
        }
        expr
    }
}

#[derive(Debug, Clone)]
pub struct NumericLiteral {
    pub data: NodeData,
    pub value: f64,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct BigIntLiteral {
    pub data: NodeData,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct StringLiteral {
    pub data: NodeData,
    pub value: String,
}

#[derive(Debug)]
pub struct TemplateExpression<'a> {
    pub data: NodeData,
    pub head: String,
    pub spans: NodeList<'a, TemplateSpan<'a>>,
}

#[derive(Debug)]
pub struct TemplateSpan<'a> {
    pub data: NodeData,
    pub expression: &'a Expression<'a>,
    pub literal: String,
}

#[derive(Debug)]
pub struct ArrayLiteral<'a> {
    pub data: NodeData,
    pub elements: NodeList<'a, Expression<'a>>,
}

#[derive(Debug)]
pub struct ObjectLiteral<'a> {
    pub data: NodeData,
    pub properties: NodeList<'a, ObjectLiteralElement<'a>>,
}

#[derive(Debug, Clone, Copy)]
pub enum ObjectLiteralElement<'a> {
    Property(&'a PropertyAssignment<'a>),
    Shorthand(&'a ShorthandPropertyAssignment<'a>),
    Spread(&'a SpreadAssignment<'a>),
}

impl ObjectLiteralElement<'_> {
    pub fn data(&self) -> &NodeData {
        match self {
            ObjectLiteralElement::Property(n) => &n.data,
            ObjectLiteralElement::Shorthand(n) => &n.data,
            ObjectLiteralElement::Spread(n) => &n.data,
        }
    }
}

#[derive(Debug)]
pub struct PropertyAssignment<'a> {
    pub data: NodeData,
    pub name: PropertyName<'a>,
    pub initializer: &'a Expression<'a>,
}

#[derive(Debug)]
pub struct ShorthandPropertyAssignment<'a> {
    pub data: NodeData,
    pub name: &'a Identifier,
}

#[derive(Debug)]
pub struct SpreadAssignment<'a> {
    pub data: NodeData,
    pub expression: &'a Expression<'a>,
}

#[derive(Debug)]
pub struct PropertyAccess<'a> {
    pub data: NodeData,
    pub expression: &'a Expression<'a>,
    pub question_dot: bool,
    pub name: &'a Identifier,
}

#[derive(Debug)]
pub struct ElementAccess<'a> {
    pub data: NodeData,
    pub expression: &'a Expression<'a>,
    pub question_dot: bool,
    pub argument: &'a Expression<'a>,
}

#[derive(Debug)]
pub struct CallExpression<'a> {
    pub data: NodeData,
    pub expression: &'a Expression<'a>,
    pub question_dot: bool,
    pub type_arguments: Option<NodeList<'a, TypeNode<'a>>>,
    pub arguments: NodeList<'a, Expression<'a>>,
}

#[derive(Debug)]
pub struct NewExpression<'a> {
    pub data: NodeData,
    pub expression: &'a Expression<'a>,
    pub type_arguments: Option<NodeList<'a, TypeNode<'a>>>,
    pub arguments: Option<NodeList<'a, Expression<'a>>>,
}

#[derive(Debug)]
pub struct ParenExpression<'a> {
    pub data: NodeData,
    pub expression: &'a Expression<'a>,
}

#[derive(Debug, Clone, Copy)]
pub enum ArrowBody<'a> {
    Expression(&'a Expression<'a>),
    Block(&'a Block<'a>),
}

#[derive(Debug)]
pub struct ArrowFunction<'a> {
    pub data: NodeData,
    pub type_parameters: Option<NodeList<'a, TypeParameterDeclaration<'a>>>,
    pub parameters: NodeList<'a, ParameterDeclaration<'a>>,
    pub return_type: Option<&'a TypeNode<'a>>,
    pub body: ArrowBody<'a>,
}

#[derive(Debug)]
pub struct FunctionExpression<'a> {
    pub data: NodeData,
    pub name: Option<&'a Identifier>,
    pub type_parameters: Option<NodeList<'a, TypeParameterDeclaration<'a>>>,
    pub parameters: NodeList<'a, ParameterDeclaration<'a>>,
    pub return_type: Option<&'a TypeNode<'a>>,
    pub body: &'a Block<'a>,
}

#[derive(Debug)]
pub struct PrefixUnary<'a> {
    pub data: NodeData,
    pub operator: SyntaxKind,
    pub operand: &'a Expression<'a>,
}

#[derive(Debug)]
pub struct PostfixUnary<'a> {
    pub data: NodeData,
    pub operator: SyntaxKind,
    pub operand: &'a Expression<'a>,
}

#[derive(Debug)]
pub struct BinaryExpression<'a> {
    pub data: NodeData,
    pub left: &'a Expression<'a>,
    pub operator: SyntaxKind,
    pub right: &'a Expression<'a>,
}

#[derive(Debug)]
pub struct ConditionalExpression<'a> {
    pub data: NodeData,
    pub condition: &'a Expression<'a>,
    pub when_true: &'a Expression<'a>,
    pub when_false: &'a Expression<'a>,
}

#[derive(Debug)]
pub struct UnaryExpressionLike<'a> {
    pub data: NodeData,
    pub expression: &'a Expression<'a>,
}

#[derive(Debug)]
pub struct AssertionExpression<'a> {
    pub data: NodeData,
    pub expression: &'a Expression<'a>,
    pub type_node: &'a TypeNode<'a>,
}

// ============================================================================
// Statements
// ============================================================================

#[derive(Debug, Clone, Copy)]
pub enum Statement<'a> {
    Variable(&'a VariableStatement<'a>),
    Function(&'a FunctionDeclaration<'a>),
    Class(&'a ClassDeclaration<'a>),
    Interface(&'a InterfaceDeclaration<'a>),
    TypeAlias(&'a TypeAliasDeclaration<'a>),
    Enum(&'a EnumDeclaration<'a>),
    Namespace(&'a NamespaceDeclaration<'a>),
    Import(&'a ImportDeclaration<'a>),
    Export(&'a ExportDeclaration<'a>),
    Expression(&'a ExpressionStatement<'a>),
    Return(&'a ReturnStatement<'a>),
    If(&'a IfStatement<'a>),
    While(&'a WhileStatement<'a>),
    For(&'a ForStatement<'a>),
    ForOf(&'a ForOfStatement<'a>),
    ForIn(&'a ForInStatement<'a>),
    Switch(&'a SwitchStatement<'a>),
    Throw(&'a ThrowStatement<'a>),
    Try(&'a TryStatement<'a>),
    Block(&'a Block<'a>),
    Break(&'a Token),
    Continue(&'a Token),
    Empty(&'a Token),
}

impl Statement<'_> {
    pub fn data(&self) -> &NodeData {
        match self {
            Statement::Variable(n) => &n.data,
            Statement::Function(n) => &n.data,
            Statement::Class(n) => &n.data,
            Statement::Interface(n) => &n.data,
            Statement::TypeAlias(n) => &n.data,
            Statement::Enum(n) => &n.data,
            Statement::Namespace(n) => &n.data,
            Statement::Import(n) => &n.data,
            Statement::Export(n) => &n.data,
            Statement::Expression(n) => &n.data,
            Statement::Return(n) => &n.data,
            Statement::If(n) => &n.data,
            Statement::While(n) => &n.data,
            Statement::For(n) => &n.data,
            Statement::ForOf(n) => &n.data,
            Statement::ForIn(n) => &n.data,
            Statement::Switch(n) => &n.data,
            Statement::Throw(n) => &n.data,
            Statement::Try(n) => &n.data,
            Statement::Block(n) => &n.data,
            Statement::Break(n) | Statement::Continue(n) | Statement::Empty(n) => &n.data,
        }
    }
}

#[derive(Debug)]
pub struct Block<'a> {
    pub data: NodeData,
    pub statements: NodeList<'a, Statement<'a>>,
}

#[derive(Debug)]
pub struct VariableStatement<'a> {
    pub data: NodeData,
    pub declaration_list: &'a VariableDeclarationList<'a>,
}

#[derive(Debug)]
pub struct VariableDeclarationList<'a> {
    pub data: NodeData,
    pub declarations: NodeList<'a, VariableDeclaration<'a>>,
}

impl VariableDeclarationList<'_> {
    pub fn is_const(&self) -> bool {
        self.data.flags.contains(NodeFlags::CONST)
    }

    pub fn is_block_scoped(&self) -> bool {
        self.data.flags.intersects(NodeFlags::BLOCK_SCOPED)
    }
}

#[derive(Debug)]
pub struct VariableDeclaration<'a> {
    pub data: NodeData,
    pub name: &'a Identifier,
    pub type_annotation: Option<&'a TypeNode<'a>>,
    pub initializer: Option<&'a Expression<'a>>,
}

#[derive(Debug)]
pub struct ExpressionStatement<'a> {
    pub data: NodeData,
    pub expression: &'a Expression<'a>,
}

#[derive(Debug)]
pub struct ReturnStatement<'a> {
    pub data: NodeData,
    pub expression: Option<&'a Expression<'a>>,
}

#[derive(Debug)]
pub struct IfStatement<'a> {
    pub data: NodeData,
    pub expression: &'a Expression<'a>,
    pub then_statement: &'a Statement<'a>,
    pub else_statement: Option<&'a Statement<'a>>,
}

#[derive(Debug)]
pub struct WhileStatement<'a> {
    pub data: NodeData,
    pub expression: &'a Expression<'a>,
    pub statement: &'a Statement<'a>,
}

#[derive(Debug, Clone, Copy)]
pub enum ForInitializer<'a> {
    VariableDeclarationList(&'a VariableDeclarationList<'a>),
    Expression(&'a Expression<'a>),
}

#[derive(Debug)]
pub struct ForStatement<'a> {
    pub data: NodeData,
    pub initializer: Option<ForInitializer<'a>>,
    pub condition: Option<&'a Expression<'a>>,
    pub incrementor: Option<&'a Expression<'a>>,
    pub statement: &'a Statement<'a>,
}

#[derive(Debug)]
pub struct ForOfStatement<'a> {
    pub data: NodeData,
    pub initializer: ForInitializer<'a>,
    pub expression: &'a Expression<'a>,
    pub statement: &'a Statement<'a>,
}

#[derive(Debug)]
pub struct ForInStatement<'a> {
    pub data: NodeData,
    pub initializer: ForInitializer<'a>,
    pub expression: &'a Expression<'a>,
    pub statement: &'a Statement<'a>,
}

#[derive(Debug)]
pub struct SwitchStatement<'a> {
    pub data: NodeData,
    pub expression: &'a Expression<'a>,
    pub clauses: NodeList<'a, CaseOrDefaultClause<'a>>,
}

#[derive(Debug, Clone, Copy)]
pub enum CaseOrDefaultClause<'a> {
    Case(&'a CaseClause<'a>),
    Default(&'a DefaultClause<'a>),
}

#[derive(Debug)]
pub struct CaseClause<'a> {
    pub data: NodeData,
    pub expression: &'a Expression<'a>,
    pub statements: NodeList<'a, Statement<'a>>,
}

#[derive(Debug)]
pub struct DefaultClause<'a> {
    pub data: NodeData,
    pub statements: NodeList<'a, Statement<'a>>,
}

#[derive(Debug)]
pub struct ThrowStatement<'a> {
    pub data: NodeData,
    pub expression: &'a Expression<'a>,
}

#[derive(Debug)]
pub struct TryStatement<'a> {
    pub data: NodeData,
    pub try_block: &'a Block<'a>,
    pub catch_clause: Option<&'a CatchClause<'a>>,
    pub finally_block: Option<&'a Block<'a>>,
}

#[derive(Debug)]
pub struct CatchClause<'a> {
    pub data: NodeData,
    pub variable: Option<&'a VariableDeclaration<'a>>,
    pub block: &'a Block<'a>,
}

// ============================================================================
// Declarations
// ============================================================================

#[derive(Debug)]
pub struct FunctionDeclaration<'a> {
    pub data: NodeData,
    pub name: Option<&'a Identifier>,
    pub type_parameters: Option<NodeList<'a, TypeParameterDeclaration<'a>>>,
    pub parameters: NodeList<'a, ParameterDeclaration<'a>>,
    pub return_type: Option<&'a TypeNode<'a>>,
    pub body: Option<&'a Block<'a>>,
}

#[derive(Debug)]
pub struct ExpressionWithTypeArguments<'a> {
    pub data: NodeData,
    pub expression: &'a Expression<'a>,
    pub type_arguments: Option<NodeList<'a, TypeNode<'a>>>,
}

#[derive(Debug)]
pub struct ClassDeclaration<'a> {
    pub data: NodeData,
    pub name: Option<&'a Identifier>,
    pub type_parameters: Option<NodeList<'a, TypeParameterDeclaration<'a>>>,
    pub extends: Option<&'a ExpressionWithTypeArguments<'a>>,
    pub implements: NodeList<'a, ExpressionWithTypeArguments<'a>>,
    pub members: NodeList<'a, ClassElement<'a>>,
}

#[derive(Debug, Clone, Copy)]
pub enum ClassElement<'a> {
    Property(&'a PropertyDeclaration<'a>),
    Method(&'a MethodDeclaration<'a>),
    Constructor(&'a ConstructorDeclaration<'a>),
    IndexSignature(&'a IndexSignatureNode<'a>),
}

impl ClassElement<'_> {
    pub fn data(&self) -> &NodeData {
        match self {
            ClassElement::Property(n) => &n.data,
            ClassElement::Method(n) => &n.data,
            ClassElement::Constructor(n) => &n.data,
            ClassElement::IndexSignature(n) => &n.data,
        }
    }
}

#[derive(Debug)]
pub struct PropertyDeclaration<'a> {
    pub data: NodeData,
    pub name: PropertyName<'a>,
    pub question: bool,
    pub exclamation: bool,
    pub type_annotation: Option<&'a TypeNode<'a>>,
    pub initializer: Option<&'a Expression<'a>>,
}

#[derive(Debug)]
pub struct MethodDeclaration<'a> {
    pub data: NodeData,
    pub name: PropertyName<'a>,
    pub question: bool,
    pub type_parameters: Option<NodeList<'a, TypeParameterDeclaration<'a>>>,
    pub parameters: NodeList<'a, ParameterDeclaration<'a>>,
    pub return_type: Option<&'a TypeNode<'a>>,
    pub body: Option<&'a Block<'a>>,
}

#[derive(Debug)]
pub struct ConstructorDeclaration<'a> {
    pub data: NodeData,
    pub parameters: NodeList<'a, ParameterDeclaration<'a>>,
    pub body: Option<&'a Block<'a>>,
}

#[derive(Debug)]
pub struct InterfaceDeclaration<'a> {
    pub data: NodeData,
    pub name: &'a Identifier,
    pub type_parameters: Option<NodeList<'a, TypeParameterDeclaration<'a>>>,
    pub extends: NodeList<'a, ExpressionWithTypeArguments<'a>>,
    pub members: NodeList<'a, TypeElement<'a>>,
}

#[derive(Debug)]
pub struct TypeAliasDeclaration<'a> {
    pub data: NodeData,
    pub name: &'a Identifier,
    pub type_parameters: Option<NodeList<'a, TypeParameterDeclaration<'a>>>,
    pub type_node: &'a TypeNode<'a>,
}

#[derive(Debug)]
pub struct EnumDeclaration<'a> {
    pub data: NodeData,
    pub name: &'a Identifier,
    pub is_const: bool,
    pub members: NodeList<'a, EnumMember<'a>>,
}

#[derive(Debug)]
pub struct EnumMember<'a> {
    pub data: NodeData,
    pub name: PropertyName<'a>,
    pub initializer: Option<&'a Expression<'a>>,
}

#[derive(Debug)]
pub struct NamespaceDeclaration<'a> {
    pub data: NodeData,
    pub name: &'a Identifier,
    pub statements: NodeList<'a, Statement<'a>>,
}

#[derive(Debug)]
pub struct ImportDeclaration<'a> {
    pub data: NodeData,
    pub type_only: bool,
    pub default_name: Option<&'a Identifier>,
    pub namespace_name: Option<&'a Identifier>,
    pub named: NodeList<'a, ImportSpecifier<'a>>,
    pub specifier: String,
}

#[derive(Debug)]
pub struct ImportSpecifier<'a> {
    pub data: NodeData,
    pub type_only: bool,
    /// `import { a as b }`: the exported name `a`; absent when unrenamed.
    pub property_name: Option<&'a Identifier>,
    pub name: &'a Identifier,
}

#[derive(Debug)]
pub struct ExportDeclaration<'a> {
    pub data: NodeData,
    pub type_only: bool,
    /// `export * from "m"`.
    pub is_star: bool,
    pub named: NodeList<'a, ExportSpecifier<'a>>,
    pub specifier: Option<String>,
}

#[derive(Debug)]
pub struct ExportSpecifier<'a> {
    pub data: NodeData,
    pub property_name: Option<&'a Identifier>,
    pub name: &'a Identifier,
}
