//! TA-Lib PostgreSQL Binding Generator
//!
//! Turns a TA function catalog into the two sources of a PostgreSQL
//! extension: C wrappers following the fmgr V1 convention, and the SQL script
//! that registers them.
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

pub mod codegen;
pub mod config;
pub mod error;
pub mod naming;
pub mod schema;
pub mod types;

pub use codegen::{Artifacts, CodeGen, ResolvedFunction, ReturnShape};
pub use config::GeneratorConfig;
pub use error::GenError;
pub use naming::FunctionNames;
pub use schema::{
    Catalog, CatalogFormat, DefaultValue, FunctionSpec, OptionalInput, OutputArg, RequiredInput,
};
pub use types::{ArgRole, Representation, StorageKind, TypeTag, classify, classify_tag};

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Generate both artifacts from catalog text using the default configuration
pub fn generate(catalog_text: &str) -> Result<Artifacts, GenError> {
    generate_with_config(catalog_text, &GeneratorConfig::default())
}

/// Generate both artifacts from catalog text
///
/// The catalog format follows the extension of `config.schema_path`.
pub fn generate_with_config(
    catalog_text: &str,
    config: &GeneratorConfig,
) -> Result<Artifacts, GenError> {
    let catalog = Catalog::parse_as(catalog_text, config.catalog_format())?;
    info!("Parsed {} function(s) from catalog", catalog.len());
    CodeGen::with_config(config).codegen_catalog(&catalog)
}

/// Read the catalog, generate, and write both artifacts
///
/// Nothing is written unless generation of the whole catalog succeeds.
pub fn generate_files(config: &GeneratorConfig) -> Result<Artifacts, GenError> {
    let catalog_text = fs::read_to_string(&config.schema_path)
        .map_err(|e| GenError::io(&config.schema_path, e))?;

    let artifacts = generate_with_config(&catalog_text, config)?;

    write_artifact(&config.wrapper_path, &artifacts.wrapper)?;
    write_artifact(&config.binding_path, &artifacts.binding)?;
    info!(
        "Wrote {} and {}",
        config.wrapper_path.display(),
        config.binding_path.display()
    );

    Ok(artifacts)
}

fn write_artifact(path: &Path, content: &str) -> Result<(), GenError> {
    let file = File::create(path).map_err(|e| GenError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(content.as_bytes())
        .map_err(|e| GenError::io(path, e))?;
    writer.flush().map_err(|e| GenError::io(path, e))?;
    Ok(())
}
