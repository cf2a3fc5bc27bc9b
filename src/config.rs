//! Import configuration
//!
//! This module provides the options controlling how much of a foreign module the importer
//! materializes, and the limits guarding it against hostile or broken metadata.

/// Default guard on signature nesting depth
pub const DEFAULT_MAX_RECURSION_DEPTH: usize = 64;

/// Configuration for an [`crate::Importer`]
///
/// The importer always materializes records, bases, methods and fields; what can be switched
/// off are the passes that only decorate the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportConfig {
    /// Root namespace of the foreign standard library (default: `System`)
    /// Names the primitive set and the well-known types `ValueType`, `Enum`, `Array` and
    /// `ParamArrayAttribute`
    pub root_namespace: String,

    /// Maximum nesting of type imports within one signature (default: 64)
    /// Arrays of arrays and generic arguments nest; base and member chains do not. A signature
    /// nested deeper than this fails with [`crate::Error::RecursionLimit`]
    pub max_recursion_depth: usize,

    /// Reconstruct custom attributes on records, methods, parameters and properties
    pub import_custom_attributes: bool,

    /// Import properties (accessors are suppressed as plain methods either way)
    pub import_properties: bool,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            root_namespace: "System".to_string(),
            max_recursion_depth: DEFAULT_MAX_RECURSION_DEPTH,
            import_custom_attributes: true,
            import_properties: true,
        }
    }
}

impl ImportConfig {
    /// Creates a minimal configuration: shapes only
    ///
    /// Records, bases, methods and fields are imported; custom attributes and properties are not.
    #[must_use]
    pub fn minimal() -> Self {
        Self {
            import_custom_attributes: false,
            import_properties: false,
            ..Self::default()
        }
    }

    /// Creates a configuration importing everything the importer supports
    #[must_use]
    pub fn comprehensive() -> Self {
        Self::default()
    }

    /// Use a different root namespace for the primitive set and well-known types
    #[must_use]
    pub fn with_root_namespace(mut self, root_namespace: &str) -> Self {
        self.root_namespace = root_namespace.to_string();
        self
    }

    /// Use a different nesting limit
    #[must_use]
    pub fn with_max_recursion_depth(mut self, depth: usize) -> Self {
        self.max_recursion_depth = depth;
        self
    }

    /// Full name of a well-known type in the root namespace
    #[must_use]
    pub fn root_type(&self, name: &str) -> String {
        format!("{}.{name}", self.root_namespace)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_config_presets() {
        let minimal = ImportConfig::minimal();
        assert!(!minimal.import_custom_attributes);
        assert!(!minimal.import_properties);
        assert_eq!(minimal.root_namespace, "System");
        assert_eq!(minimal.max_recursion_depth, DEFAULT_MAX_RECURSION_DEPTH);

        let comprehensive = ImportConfig::comprehensive();
        assert!(comprehensive.import_custom_attributes);
        assert!(comprehensive.import_properties);
    }

    #[test]
    fn test_default_config() {
        assert_eq!(ImportConfig::default(), ImportConfig::comprehensive());
    }

    #[test]
    fn test_overrides() {
        let config = ImportConfig::default()
            .with_root_namespace("Mono")
            .with_max_recursion_depth(8);
        assert_eq!(config.root_type("Array"), "Mono.Array");
        assert_eq!(config.max_recursion_depth, 8);
    }
}
