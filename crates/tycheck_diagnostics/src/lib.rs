//! tycheck_diagnostics: diagnostic messages and reporting infrastructure.
//!
//! The message catalog is an opaque registry of numbered templates; the
//! checker refers to entries by name and never builds message text inline.
//! Realized diagnostics carry a file, a span, interpolated text, and an
//! optional chain of related locations.

use tycheck_core::text::TextSpan;
use std::fmt;

/// Severity class of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCategory {
    Warning,
    Error,
    Suggestion,
    Message,
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticCategory::Warning => write!(f, "warning"),
            DiagnosticCategory::Error => write!(f, "error"),
            DiagnosticCategory::Suggestion => write!(f, "suggestion"),
            DiagnosticCategory::Message => write!(f, "message"),
        }
    }
}

/// A message template with a stable code. Templates use `{0}`, `{1}`, ...
/// placeholders.
#[derive(Debug, Clone)]
pub struct DiagnosticMessage {
    pub code: u32,
    pub category: DiagnosticCategory,
    pub message: &'static str,
}

/// Maximum number of related-information entries attached to one
/// diagnostic. Merge conflicts with many declarations would otherwise
/// produce unbounded chains.
pub const MAX_RELATED_INFORMATION: usize = 5;

/// A realized diagnostic.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub file: Option<String>,
    pub span: Option<TextSpan>,
    pub message_text: String,
    pub code: u32,
    pub category: DiagnosticCategory,
    pub related_information: Vec<Diagnostic>,
}

impl Diagnostic {
    /// A diagnostic with no location (whole-program).
    pub fn new(message: &DiagnosticMessage, args: &[&str]) -> Self {
        Self {
            file: None,
            span: None,
            message_text: format_message(message.message, args),
            code: message.code,
            category: message.category,
            related_information: Vec::new(),
        }
    }

    pub fn with_location(
        file: String,
        span: TextSpan,
        message: &DiagnosticMessage,
        args: &[&str],
    ) -> Self {
        Self {
            file: Some(file),
            span: Some(span),
            message_text: format_message(message.message, args),
            code: message.code,
            category: message.category,
            related_information: Vec::new(),
        }
    }

    /// Attach a related location. Entries past [`MAX_RELATED_INFORMATION`]
    /// are dropped.
    pub fn add_related(&mut self, related: Diagnostic) {
        if self.related_information.len() < MAX_RELATED_INFORMATION {
            self.related_information.push(related);
        }
    }

    pub fn with_related(mut self, related: Diagnostic) -> Self {
        self.add_related(related);
        self
    }

    pub fn is_error(&self) -> bool {
        self.category == DiagnosticCategory::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref file) = self.file {
            write!(f, "{}", file)?;
            if let Some(span) = self.span {
                write!(f, "({})", span.start)?;
            }
            write!(f, ": ")?;
        }
        write!(f, "{} TS{}: {}", self.category, self.code, self.message_text)
    }
}

/// Substitute `{0}`, `{1}`, ... placeholders.
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{}}}", i), arg);
    }
    result
}

/// Accumulated diagnostics for one check pass.
///
/// Insertion de-duplicates structurally equal entries (same code, file,
/// span, and text), so demand-driven resolution paths that run twice do
/// not double-report. Suggestion-category entries are kept in their own
/// list; consumers surface them separately from hard errors.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticCollection {
    diagnostics: Vec<Diagnostic>,
    suggestions: Vec<Diagnostic>,
}

impl DiagnosticCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add unless an equal diagnostic is already present. Returns whether
    /// the entry was inserted.
    pub fn add(&mut self, diagnostic: Diagnostic) -> bool {
        let list = if diagnostic.category == DiagnosticCategory::Suggestion {
            &mut self.suggestions
        } else {
            &mut self.diagnostics
        };
        if list.iter().any(|d| {
            d.code == diagnostic.code
                && d.file == diagnostic.file
                && d.span == diagnostic.span
                && d.message_text == diagnostic.message_text
        }) {
            return false;
        }
        list.push(diagnostic);
        true
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn suggestions(&self) -> &[Diagnostic] {
        &self.suggestions
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty() && self.suggestions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn extend(&mut self, other: DiagnosticCollection) {
        for d in other.diagnostics {
            self.add(d);
        }
        for s in other.suggestions {
            self.add(s);
        }
    }

    /// Sort by file then start position.
    pub fn sort(&mut self) {
        self.diagnostics.sort_by(|a, b| {
            let file_cmp = a.file.cmp(&b.file);
            if file_cmp != std::cmp::Ordering::Equal {
                return file_cmp;
            }
            let a_pos = a.span.map(|s| s.start).unwrap_or(0);
            let b_pos = b.span.map(|s| s.start).unwrap_or(0);
            a_pos.cmp(&b_pos)
        });
    }
}

// ============================================================================
// Message catalog
// ============================================================================

pub mod messages {
    use super::*;

    macro_rules! diag {
        ($code:expr, Error, $msg:expr) => {
            DiagnosticMessage { code: $code, category: DiagnosticCategory::Error, message: $msg }
        };
        ($code:expr, Warning, $msg:expr) => {
            DiagnosticMessage { code: $code, category: DiagnosticCategory::Warning, message: $msg }
        };
        ($code:expr, Suggestion, $msg:expr) => {
            DiagnosticMessage { code: $code, category: DiagnosticCategory::Suggestion, message: $msg }
        };
    }

    // Scanner and parser
    pub const UNTERMINATED_STRING_LITERAL: DiagnosticMessage = diag!(1002, Error, "Unterminated string literal.");
    pub const IDENTIFIER_EXPECTED: DiagnosticMessage = diag!(1003, Error, "Identifier expected.");
    pub const _0_EXPECTED: DiagnosticMessage = diag!(1005, Error, "'{0}' expected.");
    pub const UNEXPECTED_TOKEN: DiagnosticMessage = diag!(1012, Error, "Unexpected token.");
    pub const A_REST_PARAMETER_MUST_BE_LAST: DiagnosticMessage = diag!(1014, Error, "A rest parameter must be last in a parameter list.");
    pub const PARAMETER_CANNOT_HAVE_QUESTION_MARK_AND_INITIALIZER: DiagnosticMessage = diag!(1015, Error, "Parameter cannot have question mark and initializer.");
    pub const A_REQUIRED_PARAMETER_CANNOT_FOLLOW_AN_OPTIONAL_PARAMETER: DiagnosticMessage = diag!(1016, Error, "A required parameter cannot follow an optional parameter.");
    pub const EXPRESSION_EXPECTED: DiagnosticMessage = diag!(1109, Error, "Expression expected.");
    pub const TYPE_EXPECTED: DiagnosticMessage = diag!(1110, Error, "Type expected.");
    pub const DECLARATION_OR_STATEMENT_EXPECTED: DiagnosticMessage = diag!(1128, Error, "Declaration or statement expected.");
    pub const DIGIT_EXPECTED: DiagnosticMessage = diag!(1124, Error, "Digit expected.");
    pub const UNEXPECTED_END_OF_TEXT: DiagnosticMessage = diag!(1126, Error, "Unexpected end of text.");
    pub const INVALID_CHARACTER: DiagnosticMessage = diag!(1127, Error, "Invalid character.");
    pub const UNTERMINATED_TEMPLATE_LITERAL: DiagnosticMessage = diag!(1160, Error, "Unterminated template literal.");
    pub const A_REST_ELEMENT_CANNOT_FOLLOW_ANOTHER_REST_ELEMENT: DiagnosticMessage = diag!(1265, Error, "A rest element cannot follow another rest element.");
    pub const AN_OPTIONAL_ELEMENT_CANNOT_FOLLOW_A_REST_ELEMENT: DiagnosticMessage = diag!(1266, Error, "An optional element cannot follow a rest element.");

    // Name resolution
    pub const DUPLICATE_IDENTIFIER_0: DiagnosticMessage = diag!(2300, Error, "Duplicate identifier '{0}'.");
    pub const CANNOT_FIND_NAME_0: DiagnosticMessage = diag!(2304, Error, "Cannot find name '{0}'.");
    pub const MODULE_0_HAS_NO_EXPORTED_MEMBER_1: DiagnosticMessage = diag!(2305, Error, "Module '{0}' has no exported member '{1}'.");
    pub const CANNOT_FIND_MODULE_0: DiagnosticMessage = diag!(2307, Error, "Cannot find module '{0}' or its corresponding type declarations.");
    pub const MODULE_0_HAS_ALREADY_EXPORTED_A_MEMBER_NAMED_1: DiagnosticMessage = diag!(2308, Error, "Module {0} has already exported a member named '{1}'. Consider explicitly re-exporting to resolve the ambiguity.");
    pub const CANNOT_FIND_NAME_0_DID_YOU_MEAN_1: DiagnosticMessage = diag!(2552, Error, "Cannot find name '{0}'. Did you mean '{1}'?");
    pub const CANNOT_FIND_NAME_0_TRY_INSTALLING_TYPES: DiagnosticMessage = diag!(2591, Error, "Cannot find name '{0}'. Do you need to install type definitions for it? Try installing '@types/{1}'.");
    pub const BLOCK_SCOPED_VARIABLE_0_USED_BEFORE_ITS_DECLARATION: DiagnosticMessage = diag!(2448, Error, "Block-scoped variable '{0}' used before its declaration.");
    pub const CANNOT_REDECLARE_BLOCK_SCOPED_VARIABLE_0: DiagnosticMessage = diag!(2451, Error, "Cannot redeclare block-scoped variable '{0}'.");
    pub const VARIABLE_0_IS_USED_BEFORE_BEING_ASSIGNED: DiagnosticMessage = diag!(2454, Error, "Variable '{0}' is used before being assigned.");
    pub const _0_WAS_ALSO_DECLARED_HERE: DiagnosticMessage = diag!(6203, Error, "'{0}' was also declared here.");
    pub const _0_ONLY_REFERS_TO_A_TYPE_BUT_IS_BEING_USED_AS_A_VALUE_HERE: DiagnosticMessage = diag!(2693, Error, "'{0}' only refers to a type, but is being used as a value here.");
    pub const _0_CANNOT_BE_USED_AS_A_VALUE_BECAUSE_IT_WAS_IMPORTED_USING_IMPORT_TYPE: DiagnosticMessage = diag!(1361, Error, "'{0}' cannot be used as a value because it was imported using 'import type'.");
    pub const CIRCULAR_DEFINITION_OF_IMPORT_ALIAS_0: DiagnosticMessage = diag!(2303, Error, "Circular definition of import alias '{0}'.");
    pub const ENUM_DECLARATIONS_CAN_ONLY_MERGE_WITH_NAMESPACE_OR_OTHER_ENUM_DECLARATIONS: DiagnosticMessage = diag!(2567, Error, "Enum declarations can only merge with namespace or other enum declarations.");

    // Types and relations
    pub const GENERIC_TYPE_0_REQUIRES_1_TYPE_ARGUMENT_S: DiagnosticMessage = diag!(2314, Error, "Generic type '{0}' requires {1} type argument(s).");
    pub const TYPE_0_IS_NOT_GENERIC: DiagnosticMessage = diag!(2315, Error, "Type '{0}' is not generic.");
    pub const TYPE_0_IS_NOT_ASSIGNABLE_TO_TYPE_1: DiagnosticMessage = diag!(2322, Error, "Type '{0}' is not assignable to type '{1}'.");
    pub const PROPERTY_0_IS_MISSING_IN_TYPE_1_BUT_REQUIRED_IN_TYPE_2: DiagnosticMessage = diag!(2741, Error, "Property '{0}' is missing in type '{1}' but required in type '{2}'.");
    pub const PROPERTY_0_DOES_NOT_EXIST_ON_TYPE_1: DiagnosticMessage = diag!(2339, Error, "Property '{0}' does not exist on type '{1}'.");
    pub const PROPERTY_0_DOES_NOT_EXIST_ON_TYPE_1_DID_YOU_MEAN_2: DiagnosticMessage = diag!(2551, Error, "Property '{0}' does not exist on type '{1}'. Did you mean '{2}'?");
    pub const PROPERTY_0_DOES_NOT_EXIST_ON_TYPE_1_DID_YOU_FORGET_TO_USE_AWAIT: DiagnosticMessage = diag!(2570, Error, "Property '{0}' does not exist on type '{1}'. Did you forget to use 'await'?");
    pub const PROPERTY_0_IS_PRIVATE_AND_ONLY_ACCESSIBLE_WITHIN_CLASS_1: DiagnosticMessage = diag!(2341, Error, "Property '{0}' is private and only accessible within class '{1}'.");
    pub const PROPERTY_0_IS_PROTECTED_AND_ONLY_ACCESSIBLE_WITHIN_CLASS_1_AND_ITS_SUBCLASSES: DiagnosticMessage = diag!(2445, Error, "Property '{0}' is protected and only accessible within class '{1}' and its subclasses.");
    pub const PROPERTY_0_IS_PROTECTED_BUT_TYPE_1_IS_NOT_A_CLASS_DERIVED_FROM_2: DiagnosticMessage = diag!(2443, Error, "Property '{0}' is protected, but type '{1}' is not a class derived from '{2}'.");
    pub const THIS_EXPRESSION_IS_NOT_CALLABLE: DiagnosticMessage = diag!(2349, Error, "This expression is not callable.");
    pub const THIS_EXPRESSION_IS_NOT_CONSTRUCTABLE: DiagnosticMessage = diag!(2351, Error, "This expression is not constructable.");
    pub const OBJECT_LITERAL_MAY_ONLY_SPECIFY_KNOWN_PROPERTIES_AND_0_DOES_NOT_EXIST_IN_TYPE_1: DiagnosticMessage = diag!(2353, Error, "Object literal may only specify known properties, and '{0}' does not exist in type '{1}'.");
    pub const CANNOT_ASSIGN_TO_0_BECAUSE_IT_IS_A_READ_ONLY_PROPERTY: DiagnosticMessage = diag!(2540, Error, "Cannot assign to '{0}' because it is a read-only property.");
    pub const CANNOT_ASSIGN_TO_0_BECAUSE_IT_IS_A_CONSTANT: DiagnosticMessage = diag!(2588, Error, "Cannot assign to '{0}' because it is a constant.");
    pub const INDEX_SIGNATURE_IN_TYPE_0_ONLY_PERMITS_READING: DiagnosticMessage = diag!(2542, Error, "Index signature in type '{0}' only permits reading.");
    pub const PROPERTY_0_COMES_FROM_AN_INDEX_SIGNATURE: DiagnosticMessage = diag!(4111, Error, "Property '{0}' comes from an index signature, so it must be accessed with ['{0}'].");
    pub const ELEMENT_IMPLICITLY_HAS_AN_ANY_TYPE_BECAUSE_EXPRESSION_OF_TYPE_0_CANT_BE_USED_TO_INDEX_TYPE_1: DiagnosticMessage = diag!(7053, Error, "Element implicitly has an 'any' type because expression of type '{0}' can't be used to index type '{1}'.");
    pub const TUPLE_TYPE_0_OF_LENGTH_1_HAS_NO_ELEMENT_AT_INDEX_2: DiagnosticMessage = diag!(2493, Error, "Tuple type '{0}' of length '{1}' has no element at index '{2}'.");
    pub const TYPE_0_CANNOT_BE_USED_AS_AN_INDEX_TYPE: DiagnosticMessage = diag!(2538, Error, "Type '{0}' cannot be used as an index type.");
    pub const OBJECT_IS_POSSIBLY_NULL: DiagnosticMessage = diag!(2531, Error, "Object is possibly 'null'.");
    pub const OBJECT_IS_POSSIBLY_UNDEFINED: DiagnosticMessage = diag!(2532, Error, "Object is possibly 'undefined'.");
    pub const OBJECT_IS_POSSIBLY_NULL_OR_UNDEFINED: DiagnosticMessage = diag!(2533, Error, "Object is possibly 'null' or 'undefined'.");

    // Arity and overloads
    pub const ARGUMENT_OF_TYPE_0_IS_NOT_ASSIGNABLE_TO_PARAMETER_OF_TYPE_1: DiagnosticMessage = diag!(2345, Error, "Argument of type '{0}' is not assignable to parameter of type '{1}'.");
    pub const EXPECTED_0_ARGUMENTS_BUT_GOT_1: DiagnosticMessage = diag!(2554, Error, "Expected {0} arguments, but got {1}.");
    pub const EXPECTED_AT_LEAST_0_ARGUMENTS_BUT_GOT_1: DiagnosticMessage = diag!(2555, Error, "Expected at least {0} arguments, but got {1}.");
    pub const EXPECTED_0_TYPE_ARGUMENTS_BUT_GOT_1: DiagnosticMessage = diag!(2558, Error, "Expected {0} type arguments, but got {1}.");
    pub const NO_OVERLOAD_EXPECTS_0_ARGUMENTS: DiagnosticMessage = diag!(2575, Error, "No overload expects {0} arguments, but overloads do exist that expect either {1} or {2} arguments.");
    pub const NO_OVERLOAD_MATCHES_THIS_CALL: DiagnosticMessage = diag!(2769, Error, "No overload matches this call.");
    pub const AN_ARGUMENT_FOR_0_WAS_NOT_PROVIDED: DiagnosticMessage = diag!(6210, Error, "An argument for '{0}' was not provided.");
    pub const TYPE_0_DOES_NOT_SATISFY_THE_CONSTRAINT_1: DiagnosticMessage = diag!(2344, Error, "Type '{0}' does not satisfy the constraint '{1}'.");

    // Operators
    pub const THE_LEFT_HAND_SIDE_OF_AN_ARITHMETIC_OPERATION_MUST_BE_OF_TYPE_ANY_NUMBER_BIGINT_OR_AN_ENUM_TYPE: DiagnosticMessage = diag!(2362, Error, "The left-hand side of an arithmetic operation must be of type 'any', 'number', 'bigint' or an enum type.");
    pub const THE_RIGHT_HAND_SIDE_OF_AN_ARITHMETIC_OPERATION_MUST_BE_OF_TYPE_ANY_NUMBER_BIGINT_OR_AN_ENUM_TYPE: DiagnosticMessage = diag!(2363, Error, "The right-hand side of an arithmetic operation must be of type 'any', 'number', 'bigint' or an enum type.");
    pub const OPERATOR_0_CANNOT_BE_APPLIED_TO_TYPES_1_AND_2: DiagnosticMessage = diag!(2365, Error, "Operator '{0}' cannot be applied to types '{1}' and '{2}'.");
    pub const OPERATOR_0_CANNOT_BE_APPLIED_TO_TYPES_BIGINT_AND_NUMBER: DiagnosticMessage = diag!(2365, Error, "Operator '{0}' cannot be applied to types 'bigint' and 'number'. Use an explicit conversion.");
    pub const THIS_COMPARISON_APPEARS_TO_BE_UNINTENTIONAL_BECAUSE_THE_TYPES_0_AND_1_HAVE_NO_OVERLAP: DiagnosticMessage = diag!(2367, Error, "This comparison appears to be unintentional because the types '{0}' and '{1}' have no overlap.");
    pub const THIS_CONDITION_WILL_ALWAYS_RETURN_0_SINCE_NAN_IS_NOT_EQUAL_TO_ANYTHING: DiagnosticMessage = diag!(2845, Error, "This condition will always return '{0}', since 'NaN' is never equal to anything. Did you mean to use 'Number.isNaN'?");
    pub const THE_LEFT_HAND_SIDE_OF_AN_IN_EXPRESSION_MUST_BE_OF_TYPE_STRING_NUMBER_OR_SYMBOL: DiagnosticMessage = diag!(2360, Error, "The left-hand side of an 'in' expression must be a private identifier or of type 'string', 'number', or 'symbol'.");
    pub const THE_RIGHT_HAND_SIDE_OF_AN_IN_EXPRESSION_MUST_NOT_BE_A_PRIMITIVE: DiagnosticMessage = diag!(2361, Error, "The right-hand side of an 'in' expression must not be a primitive.");
    pub const THE_LEFT_HAND_SIDE_OF_AN_ASSIGNMENT_EXPRESSION_MUST_BE_A_VARIABLE: DiagnosticMessage = diag!(2364, Error, "The left-hand side of an assignment expression must be a variable or a property access.");
    pub const THE_OPERAND_OF_AN_INCREMENT_OR_DECREMENT_OPERATOR_MUST_BE_A_VARIABLE_OR_A_PROPERTY_ACCESS: DiagnosticMessage = diag!(2357, Error, "The operand of an increment or decrement operator must be a variable or a property access.");

    // Circularity
    pub const TYPE_ALIAS_0_CIRCULARLY_REFERENCES_ITSELF: DiagnosticMessage = diag!(2456, Error, "Type alias '{0}' circularly references itself.");
    pub const TYPE_PARAMETER_0_HAS_A_CIRCULAR_CONSTRAINT: DiagnosticMessage = diag!(2313, Error, "Type parameter '{0}' has a circular constraint.");
    pub const TYPE_0_RECURSIVELY_REFERENCES_ITSELF_AS_A_BASE_TYPE: DiagnosticMessage = diag!(2310, Error, "Type '{0}' recursively references itself as a base type.");
    pub const _0_IS_REFERENCED_DIRECTLY_OR_INDIRECTLY_IN_ITS_OWN_INITIALIZER: DiagnosticMessage = diag!(2502, Error, "'{0}' is referenced directly or indirectly in its own type annotation or initializer.");
    pub const TYPE_INSTANTIATION_IS_EXCESSIVELY_DEEP_AND_POSSIBLY_INFINITE: DiagnosticMessage = diag!(2589, Error, "Type instantiation is excessively deep and possibly infinite.");
    pub const EXPRESSION_PRODUCES_A_UNION_TYPE_THAT_IS_TOO_COMPLEX_TO_REPRESENT: DiagnosticMessage = diag!(2590, Error, "Expression produces a union type that is too complex to represent.");
    pub const TYPE_PRODUCES_A_TUPLE_TYPE_THAT_IS_TOO_LARGE_TO_REPRESENT: DiagnosticMessage = diag!(2799, Error, "Type produces a tuple type that is too large to represent.");

    // Declarations
    pub const VARIABLE_0_IMPLICITLY_HAS_AN_1_TYPE: DiagnosticMessage = diag!(7005, Error, "Variable '{0}' implicitly has an '{1}' type.");
    pub const PARAMETER_0_IMPLICITLY_HAS_AN_1_TYPE: DiagnosticMessage = diag!(7006, Error, "Parameter '{0}' implicitly has an '{1}' type.");
    pub const MEMBER_0_IMPLICITLY_HAS_AN_1_TYPE: DiagnosticMessage = diag!(7008, Error, "Member '{0}' implicitly has an '{1}' type.");
    pub const A_FUNCTION_WHOSE_DECLARED_TYPE_IS_NEITHER_UNDEFINED_NOR_VOID_MUST_RETURN_A_VALUE: DiagnosticMessage = diag!(2355, Error, "A function whose declared type is neither 'undefined', 'void', nor 'any' must return a value.");
    pub const ENUM_MEMBER_MUST_HAVE_INITIALIZER: DiagnosticMessage = diag!(1061, Error, "Enum member must have initializer.");
    pub const AN_ENUM_MEMBER_CANNOT_HAVE_A_NUMERIC_NAME: DiagnosticMessage = diag!(2452, Error, "An enum member cannot have a numeric name.");
    pub const ALL_DECLARATIONS_OF_0_MUST_HAVE_IDENTICAL_TYPE_PARAMETERS: DiagnosticMessage = diag!(2428, Error, "All declarations of '{0}' must have identical type parameters.");
    pub const DUPLICATE_PROPERTY_0: DiagnosticMessage = diag!(2718, Error, "Duplicate property '{0}'.");
    pub const _0_IS_SPECIFIED_MORE_THAN_ONCE_SO_THIS_USAGE_WILL_BE_OVERWRITTEN: DiagnosticMessage = diag!(2783, Error, "'{0}' is specified more than once, so this usage will be overwritten.");
    pub const A_TYPE_PREDICATE_IS_ONLY_ALLOWED_IN_RETURN_TYPE_POSITION: DiagnosticMessage = diag!(1228, Error, "A type predicate is only allowed in return type position for functions and methods.");
    pub const CLASS_0_INCORRECTLY_EXTENDS_BASE_CLASS_1: DiagnosticMessage = diag!(2415, Error, "Class '{0}' incorrectly extends base class '{1}'.");
    pub const CLASS_0_INCORRECTLY_IMPLEMENTS_INTERFACE_1: DiagnosticMessage = diag!(2420, Error, "Class '{0}' incorrectly implements interface '{1}'.");
    pub const TYPE_0_IS_NOT_AN_ARRAY_TYPE: DiagnosticMessage = diag!(2461, Error, "Type '{0}' is not an array type.");
    pub const THIS_CANNOT_BE_REFERENCED_IN_CURRENT_LOCATION: DiagnosticMessage = diag!(2332, Error, "'this' cannot be referenced in current location.");
    pub const _0_IS_DEPRECATED: DiagnosticMessage = diag!(6385, Suggestion, "'{0}' is deprecated.");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_substitutes_placeholders() {
        assert_eq!(
            format_message("Type '{0}' is not assignable to type '{1}'.", &["A", "B"]),
            "Type 'A' is not assignable to type 'B'."
        );
    }

    #[test]
    fn collection_deduplicates() {
        let mut diags = DiagnosticCollection::new();
        let d = Diagnostic::new(&messages::CANNOT_FIND_NAME_0, &["x"]);
        assert!(diags.add(d.clone()));
        assert!(!diags.add(d));
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn suggestions_are_kept_separate() {
        let mut diags = DiagnosticCollection::new();
        diags.add(Diagnostic::new(&messages::_0_IS_DEPRECATED, &["old"]));
        assert_eq!(diags.len(), 0);
        assert_eq!(diags.suggestions().len(), 1);
        assert!(!diags.has_errors());
    }

    #[test]
    fn related_information_is_capped() {
        let mut d = Diagnostic::new(&messages::DUPLICATE_IDENTIFIER_0, &["x"]);
        for _ in 0..10 {
            d.add_related(Diagnostic::new(&messages::_0_WAS_ALSO_DECLARED_HERE, &["x"]));
        }
        assert_eq!(d.related_information.len(), MAX_RELATED_INFORMATION);
    }
}
