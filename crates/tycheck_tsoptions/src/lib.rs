//! tycheck_tsoptions: compiler options.
//!
//! The checker consumes these as plain toggles; parsing from a
//! tsconfig-shaped JSON document is provided for hosts.

use serde::{Deserialize, Serialize};

/// Options that gate checker behavior. Every field is optional in the
/// serialized form; accessors apply the documented defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompilerOptions {
    pub target: Option<ScriptTarget>,
    pub module: Option<ModuleKind>,

    // Strict family
    pub strict: Option<bool>,
    pub no_implicit_any: Option<bool>,
    pub strict_null_checks: Option<bool>,
    pub strict_function_types: Option<bool>,
    pub strict_bind_call_apply: Option<bool>,
    pub strict_property_initialization: Option<bool>,
    pub no_implicit_this: Option<bool>,
    pub use_unknown_in_catch_variables: Option<bool>,

    // Additional checks
    pub exact_optional_property_types: Option<bool>,
    pub no_unchecked_indexed_access: Option<bool>,
    pub no_property_access_from_index_signature: Option<bool>,
    pub allow_umd_global_access: Option<bool>,

    // Module interop
    pub allow_synthetic_default_imports: Option<bool>,
    pub es_module_interop: Option<bool>,
    pub isolated_modules: Option<bool>,

    pub experimental_decorators: Option<bool>,
}

impl CompilerOptions {
    /// A member of the strict family defaults to the `strict` umbrella.
    fn strict_default(&self, value: Option<bool>) -> bool {
        value.unwrap_or_else(|| self.strict.unwrap_or(false))
    }

    pub fn strict_null_checks(&self) -> bool {
        self.strict_default(self.strict_null_checks)
    }

    pub fn no_implicit_any(&self) -> bool {
        self.strict_default(self.no_implicit_any)
    }

    pub fn strict_function_types(&self) -> bool {
        self.strict_default(self.strict_function_types)
    }

    pub fn strict_bind_call_apply(&self) -> bool {
        self.strict_default(self.strict_bind_call_apply)
    }

    pub fn strict_property_initialization(&self) -> bool {
        self.strict_default(self.strict_property_initialization)
    }

    pub fn use_unknown_in_catch_variables(&self) -> bool {
        self.strict_default(self.use_unknown_in_catch_variables)
    }

    pub fn exact_optional_property_types(&self) -> bool {
        self.exact_optional_property_types.unwrap_or(false)
    }

    pub fn no_unchecked_indexed_access(&self) -> bool {
        self.no_unchecked_indexed_access.unwrap_or(false)
    }

    pub fn no_property_access_from_index_signature(&self) -> bool {
        self.no_property_access_from_index_signature.unwrap_or(false)
    }

    pub fn isolated_modules(&self) -> bool {
        self.isolated_modules.unwrap_or(false)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScriptTarget {
    ES5,
    ES2015,
    ES2017,
    ES2020,
    ES2022,
    ESNext,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModuleKind {
    None,
    CommonJS,
    ES2015,
    ES2020,
    ESNext,
    NodeNext,
}

#[derive(Debug, thiserror::Error)]
pub enum OptionsError {
    #[error("failed to parse tsconfig: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read tsconfig: {0}")]
    Io(#[from] std::io::Error),
}

/// tsconfig.json shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TsConfig {
    pub compiler_options: Option<CompilerOptions>,
    pub include: Option<Vec<String>>,
    pub exclude: Option<Vec<String>>,
    pub files: Option<Vec<String>>,
}

pub fn parse_tsconfig(content: &str) -> Result<TsConfig, OptionsError> {
    Ok(serde_json::from_str(content)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_umbrella_applies() {
        let options: CompilerOptions =
            serde_json::from_str(r#"{ "strict": true }"#).unwrap();
        assert!(options.strict_null_checks());
        assert!(options.no_implicit_any());
        assert!(options.strict_function_types());
    }

    #[test]
    fn explicit_member_overrides_umbrella() {
        let options: CompilerOptions =
            serde_json::from_str(r#"{ "strict": true, "strictNullChecks": false }"#).unwrap();
        assert!(!options.strict_null_checks());
        assert!(options.no_implicit_any());
    }

    #[test]
    fn parses_tsconfig_shape() {
        let config = parse_tsconfig(
            r#"{ "compilerOptions": { "strict": true, "noUncheckedIndexedAccess": true } }"#,
        )
        .unwrap();
        let options = config.compiler_options.unwrap();
        assert!(options.no_unchecked_indexed_access());
    }
}
