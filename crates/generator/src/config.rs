//! Generator configuration
//!
//! # Example
//!
//! ```rust,ignore
//! use tapg::{GeneratorConfig, generate_files};
//!
//! let config = GeneratorConfig::new()
//!     .with_schema("catalog/ta_func_api.toml")
//!     .with_wrapper_output("src/ta_pg.c")
//!     .with_binding_output("src/ta_pg--1.0.sql");
//!
//! generate_files(&config)?;
//! ```

use crate::schema::CatalogFormat;
use std::path::PathBuf;

/// TA-Lib routine prefix (`TA_` + abbreviation)
pub const DEFAULT_ROUTINE_PREFIX: &str = "TA_";

/// Library path placeholder that `CREATE EXTENSION` substitutes
pub const DEFAULT_MODULE_PATHNAME: &str = "MODULE_PATHNAME";

/// Configuration for one generator run
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Function catalog to read
    pub schema_path: PathBuf,

    /// Destination of the C wrapper compilation unit
    pub wrapper_path: PathBuf,

    /// Destination of the SQL binding script
    pub binding_path: PathBuf,

    /// Prefix joined to each abbreviation to name the TA-Lib routine
    pub routine_prefix: String,

    /// Library path literal used in each `AS '...'` clause
    pub module_pathname: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            schema_path: PathBuf::from("catalog/ta_func_api.toml"),
            wrapper_path: PathBuf::from("src/ta_pg.c"),
            binding_path: PathBuf::from("src/ta_pg--1.0.sql"),
            routine_prefix: DEFAULT_ROUTINE_PREFIX.to_string(),
            module_pathname: DEFAULT_MODULE_PATHNAME.to_string(),
        }
    }
}

impl GeneratorConfig {
    /// Create a configuration with the default paths
    pub fn new() -> Self {
        GeneratorConfig::default()
    }

    /// Set the catalog path (builder pattern)
    pub fn with_schema(mut self, path: impl Into<PathBuf>) -> Self {
        self.schema_path = path.into();
        self
    }

    /// Set the C output path
    pub fn with_wrapper_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.wrapper_path = path.into();
        self
    }

    /// Document format of the catalog, chosen by its extension
    pub fn catalog_format(&self) -> CatalogFormat {
        CatalogFormat::from_path(&self.schema_path)
    }

    /// Set the SQL output path
    pub fn with_binding_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.binding_path = path.into();
        self
    }
}
