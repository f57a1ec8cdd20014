//! Flag sets and id newtypes.
//!
//! The bitsets classify nodes, symbols, and types; the ids are lightweight
//! handles into the arenas that own the actual data. Ids are only
//! comparable within the compilation that issued them.

use std::fmt;

bitflags::bitflags! {
    /// Flags carried on AST nodes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct NodeFlags: u32 {
        const NONE              = 0;
        const LET               = 1 << 0;
        const CONST             = 1 << 1;
        const SYNTHESIZED       = 1 << 2;
        const OPTIONAL_CHAIN    = 1 << 3;
        const AMBIENT           = 1 << 4;
        const THIS_NODE_HAS_ERROR = 1 << 5;

        const BLOCK_SCOPED = Self::LET.bits() | Self::CONST.bits();
    }
}

bitflags::bitflags! {
    /// Modifier flags on declarations.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ModifierFlags: u32 {
        const NONE      = 0;
        const EXPORT    = 1 << 0;
        const AMBIENT   = 1 << 1;
        const PUBLIC    = 1 << 2;
        const PRIVATE   = 1 << 3;
        const PROTECTED = 1 << 4;
        const STATIC    = 1 << 5;
        const READONLY  = 1 << 6;
        const ABSTRACT  = 1 << 7;
        const ASYNC     = 1 << 8;
        const DEFAULT   = 1 << 9;
        const CONST     = 1 << 10;

        const ACCESSIBILITY_MODIFIER = Self::PUBLIC.bits() | Self::PRIVATE.bits() | Self::PROTECTED.bits();
        const NON_PUBLIC_ACCESSIBILITY_MODIFIER = Self::PRIVATE.bits() | Self::PROTECTED.bits();
    }
}

bitflags::bitflags! {
    /// Primary classification of a type.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TypeFlags: u32 {
        const NONE              = 0;
        const ANY               = 1 << 0;
        const UNKNOWN           = 1 << 1;
        const STRING            = 1 << 2;
        const NUMBER            = 1 << 3;
        const BOOLEAN           = 1 << 4;
        const ENUM              = 1 << 5;
        const BIG_INT           = 1 << 6;
        const STRING_LITERAL    = 1 << 7;
        const NUMBER_LITERAL    = 1 << 8;
        const BOOLEAN_LITERAL   = 1 << 9;
        const ENUM_LITERAL      = 1 << 10;
        const BIG_INT_LITERAL   = 1 << 11;
        const ES_SYMBOL         = 1 << 12;
        const VOID              = 1 << 13;
        const UNDEFINED         = 1 << 14;
        const NULL              = 1 << 15;
        const NEVER             = 1 << 16;
        const TYPE_PARAMETER    = 1 << 17;
        const OBJECT            = 1 << 18;
        const UNION             = 1 << 19;
        const INTERSECTION      = 1 << 20;
        const INDEX             = 1 << 21;
        const INDEXED_ACCESS    = 1 << 22;
        const CONDITIONAL       = 1 << 23;
        const SUBSTITUTION      = 1 << 24;
        const NON_PRIMITIVE     = 1 << 25;
        const TEMPLATE_LITERAL  = 1 << 26;

        const ANY_OR_UNKNOWN = Self::ANY.bits() | Self::UNKNOWN.bits();
        const NULLABLE = Self::UNDEFINED.bits() | Self::NULL.bits();
        const LITERAL = Self::STRING_LITERAL.bits()
            | Self::NUMBER_LITERAL.bits()
            | Self::BOOLEAN_LITERAL.bits()
            | Self::ENUM_LITERAL.bits()
            | Self::BIG_INT_LITERAL.bits();
        const UNIT = Self::LITERAL.bits() | Self::UNDEFINED.bits() | Self::NULL.bits();
        const STRING_OR_NUMBER_LITERAL = Self::STRING_LITERAL.bits() | Self::NUMBER_LITERAL.bits();
        const STRING_LIKE = Self::STRING.bits() | Self::STRING_LITERAL.bits() | Self::TEMPLATE_LITERAL.bits();
        const NUMBER_LIKE = Self::NUMBER.bits() | Self::NUMBER_LITERAL.bits() | Self::ENUM.bits();
        const BIG_INT_LIKE = Self::BIG_INT.bits() | Self::BIG_INT_LITERAL.bits();
        const BOOLEAN_LIKE = Self::BOOLEAN.bits() | Self::BOOLEAN_LITERAL.bits();
        const ENUM_LIKE = Self::ENUM.bits() | Self::ENUM_LITERAL.bits();
        const VOID_LIKE = Self::VOID.bits() | Self::UNDEFINED.bits();
        const PRIMITIVE = Self::STRING.bits()
            | Self::NUMBER.bits()
            | Self::BIG_INT.bits()
            | Self::BOOLEAN.bits()
            | Self::ENUM.bits()
            | Self::ES_SYMBOL.bits()
            | Self::VOID.bits()
            | Self::UNDEFINED.bits()
            | Self::NULL.bits()
            | Self::LITERAL.bits();
        const UNION_OR_INTERSECTION = Self::UNION.bits() | Self::INTERSECTION.bits();
        const STRUCTURED = Self::OBJECT.bits() | Self::UNION.bits() | Self::INTERSECTION.bits();
        const TYPE_VARIABLE = Self::TYPE_PARAMETER.bits() | Self::INDEXED_ACCESS.bits();
        const INSTANTIABLE_NON_PRIMITIVE = Self::TYPE_VARIABLE.bits()
            | Self::CONDITIONAL.bits()
            | Self::SUBSTITUTION.bits();
        const INSTANTIABLE_PRIMITIVE = Self::INDEX.bits() | Self::TEMPLATE_LITERAL.bits();
        const INSTANTIABLE = Self::INSTANTIABLE_NON_PRIMITIVE.bits() | Self::INSTANTIABLE_PRIMITIVE.bits();
        const STRUCTURED_OR_INSTANTIABLE = Self::STRUCTURED.bits() | Self::INSTANTIABLE.bits();

        const DEFINITELY_FALSY = Self::VOID.bits() | Self::UNDEFINED.bits() | Self::NULL.bits();
        const POSSIBLY_FALSY = Self::DEFINITELY_FALSY.bits()
            | Self::STRING.bits()
            | Self::NUMBER.bits()
            | Self::BIG_INT.bits()
            | Self::BOOLEAN.bits()
            | Self::LITERAL.bits();

        const DISJOINT_DOMAINS = Self::NON_PRIMITIVE.bits()
            | Self::STRING_LIKE.bits()
            | Self::NUMBER_LIKE.bits()
            | Self::BIG_INT_LIKE.bits()
            | Self::BOOLEAN_LIKE.bits()
            | Self::ES_SYMBOL.bits()
            | Self::VOID_LIKE.bits()
            | Self::NULL.bits();

        /// Categories a union `includes` summary can carry beyond the
        /// constituent flags themselves.
        const INCLUDES_MASK = Self::ANY.bits()
            | Self::UNKNOWN.bits()
            | Self::PRIMITIVE.bits()
            | Self::NEVER.bits()
            | Self::OBJECT.bits()
            | Self::UNION.bits()
            | Self::INTERSECTION.bits()
            | Self::NON_PRIMITIVE.bits()
            | Self::TEMPLATE_LITERAL.bits()
            | Self::INSTANTIABLE.bits();
    }
}

bitflags::bitflags! {
    /// Secondary classification for object types.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ObjectFlags: u32 {
        const NONE               = 0;
        const CLASS              = 1 << 0;
        const INTERFACE          = 1 << 1;
        const REFERENCE          = 1 << 2;
        const TUPLE              = 1 << 3;
        const ANONYMOUS          = 1 << 4;
        const MAPPED             = 1 << 5;
        const INSTANTIATED       = 1 << 6;
        const OBJECT_LITERAL     = 1 << 7;
        const FRESH_LITERAL      = 1 << 8;
        const ARRAY_LITERAL      = 1 << 9;
        const IS_CONSTRAINED_TYPE_VARIABLE = 1 << 10;
        const COULD_CONTAIN_TYPE_VARIABLES_COMPUTED = 1 << 11;
        const COULD_CONTAIN_TYPE_VARIABLES = 1 << 12;

        const CLASS_OR_INTERFACE = Self::CLASS.bits() | Self::INTERFACE.bits();
    }
}

bitflags::bitflags! {
    /// Symbol classification.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SymbolFlags: u32 {
        const NONE                     = 0;
        const FUNCTION_SCOPED_VARIABLE = 1 << 0;
        const BLOCK_SCOPED_VARIABLE    = 1 << 1;
        const PROPERTY                 = 1 << 2;
        const ENUM_MEMBER              = 1 << 3;
        const FUNCTION                 = 1 << 4;
        const CLASS                    = 1 << 5;
        const INTERFACE                = 1 << 6;
        const CONST_ENUM               = 1 << 7;
        const REGULAR_ENUM             = 1 << 8;
        const VALUE_MODULE             = 1 << 9;
        const NAMESPACE_MODULE         = 1 << 10;
        const TYPE_LITERAL             = 1 << 11;
        const OBJECT_LITERAL           = 1 << 12;
        const METHOD                   = 1 << 13;
        const CONSTRUCTOR              = 1 << 14;
        const SIGNATURE                = 1 << 15;
        const TYPE_PARAMETER           = 1 << 16;
        const TYPE_ALIAS               = 1 << 17;
        const ALIAS                    = 1 << 18;
        const OPTIONAL                 = 1 << 19;
        const TRANSIENT                = 1 << 20;
        const EXPORT_STAR              = 1 << 21;
        const TYPE_ONLY                = 1 << 22;

        const ENUM = Self::REGULAR_ENUM.bits() | Self::CONST_ENUM.bits();
        const VARIABLE = Self::FUNCTION_SCOPED_VARIABLE.bits() | Self::BLOCK_SCOPED_VARIABLE.bits();
        const VALUE = Self::VARIABLE.bits()
            | Self::PROPERTY.bits()
            | Self::ENUM_MEMBER.bits()
            | Self::OBJECT_LITERAL.bits()
            | Self::FUNCTION.bits()
            | Self::CLASS.bits()
            | Self::ENUM.bits()
            | Self::VALUE_MODULE.bits()
            | Self::METHOD.bits();
        const TYPE = Self::CLASS.bits()
            | Self::INTERFACE.bits()
            | Self::ENUM.bits()
            | Self::ENUM_MEMBER.bits()
            | Self::TYPE_LITERAL.bits()
            | Self::TYPE_PARAMETER.bits()
            | Self::TYPE_ALIAS.bits();
        const NAMESPACE = Self::VALUE_MODULE.bits() | Self::NAMESPACE_MODULE.bits() | Self::ENUM.bits();
        const MODULE = Self::VALUE_MODULE.bits() | Self::NAMESPACE_MODULE.bits();

        // Exclusion masks: a symbol with flags F cannot merge with a
        // symbol carrying any flag in F's exclusion set.
        const FUNCTION_SCOPED_VARIABLE_EXCLUDES = Self::VALUE.bits() & !Self::FUNCTION_SCOPED_VARIABLE.bits();
        const BLOCK_SCOPED_VARIABLE_EXCLUDES = Self::VALUE.bits();
        const PROPERTY_EXCLUDES = Self::NONE.bits();
        const ENUM_MEMBER_EXCLUDES = Self::VALUE.bits() | Self::TYPE.bits();
        const FUNCTION_EXCLUDES = Self::VALUE.bits() & !(Self::FUNCTION.bits() | Self::VALUE_MODULE.bits() | Self::CLASS.bits());
        const CLASS_EXCLUDES = (Self::VALUE.bits() | Self::TYPE.bits())
            & !(Self::VALUE_MODULE.bits() | Self::INTERFACE.bits() | Self::FUNCTION.bits());
        const INTERFACE_EXCLUDES = Self::TYPE.bits() & !(Self::INTERFACE.bits() | Self::CLASS.bits());
        const REGULAR_ENUM_EXCLUDES = (Self::VALUE.bits() | Self::TYPE.bits())
            & !(Self::REGULAR_ENUM.bits() | Self::VALUE_MODULE.bits());
        const CONST_ENUM_EXCLUDES = (Self::VALUE.bits() | Self::TYPE.bits()) & !Self::CONST_ENUM.bits();
        const VALUE_MODULE_EXCLUDES = Self::VALUE.bits()
            & !(Self::FUNCTION.bits() | Self::CLASS.bits() | Self::REGULAR_ENUM.bits() | Self::VALUE_MODULE.bits());
        const NAMESPACE_MODULE_EXCLUDES = 0;
        const METHOD_EXCLUDES = Self::VALUE.bits() & !Self::METHOD.bits();
        const TYPE_PARAMETER_EXCLUDES = Self::TYPE.bits() & !Self::TYPE_PARAMETER.bits();
        const TYPE_ALIAS_EXCLUDES = Self::TYPE.bits();
        const ALIAS_EXCLUDES = Self::ALIAS.bits();
    }
}

bitflags::bitflags! {
    /// Auxiliary bits for checker-synthesized symbols.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CheckFlags: u32 {
        const NONE          = 0;
        const INSTANTIATED  = 1 << 0;
        const SYNTHETIC_PROPERTY = 1 << 1;
        const READONLY      = 1 << 2;
        const LATE          = 1 << 3;
        const OPTIONAL_PARAMETER = 1 << 4;
        const REST_PARAMETER = 1 << 5;
        const DEPRECATED    = 1 << 6;
    }
}

bitflags::bitflags! {
    /// Per-element classification inside tuple types.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ElementFlags: u8 {
        const REQUIRED = 1 << 0;
        const OPTIONAL = 1 << 1;
        const REST     = 1 << 2;
        const VARIADIC = 1 << 3;

        const FIXED = Self::REQUIRED.bits() | Self::OPTIONAL.bits();
        const VARIABLE = Self::REST.bits() | Self::VARIADIC.bits();
        const NON_REQUIRED = Self::OPTIONAL.bits() | Self::REST.bits() | Self::VARIADIC.bits();
        const NON_REST = Self::REQUIRED.bits() | Self::OPTIONAL.bits() | Self::VARIADIC.bits();
    }
}

bitflags::bitflags! {
    /// Signature shape bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SignatureFlags: u8 {
        const NONE                 = 0;
        const HAS_REST_PARAMETER   = 1 << 0;
        const CONSTRUCT            = 1 << 1;
        const ABSTRACT             = 1 << 2;
        const HAS_LITERAL_TYPES    = 1 << 3;
        const IS_INNER_CALL_CHAIN  = 1 << 4;
        const IS_OUTER_CALL_CHAIN  = 1 << 5;

        const CALL_CHAIN_FLAGS = Self::IS_INNER_CALL_CHAIN.bits() | Self::IS_OUTER_CALL_CHAIN.bits();
    }
}

macro_rules! id_newtype {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
        pub struct $name(pub u32);

        impl $name {
            pub const INVALID: $name = $name(u32::MAX);

            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

id_newtype!(
    /// Handle to a type in the checker's type table. The total order over
    /// ids gives unions and intersections their canonical constituent
    /// order; it carries no other meaning.
    TypeId
);
id_newtype!(
    /// Handle to a symbol in the symbol arena.
    SymbolId
);
id_newtype!(
    /// Handle to an AST node, assigned at parse time.
    NodeId
);
id_newtype!(
    /// Handle to a signature in the checker's signature arena.
    SignatureId
);
id_newtype!(
    /// Handle to a source file in the program.
    SourceFileId
);
