//! C and SQL Code Generation via Text
//!
//! Generates the PostgreSQL extension sources for a function catalog:
//!
//! - a C compilation unit with one fmgr V1 wrapper per function, and
//! - a SQL script registering each wrapper as a `ta_*` function.
//!
//! # Generation Strategy
//!
//! Every function is first resolved: each argument is classified once
//! through [`crate::types::classify_tag`], defaults are rendered, and the
//! generated names are fixed. Resolution of the whole catalog finishes
//! before any text is emitted, so a bad descriptor aborts the run with
//! nothing generated. The two emitters then read the same
//! [`ResolvedFunction`] and append to two owned buffers.

mod bindings;
mod preamble;
mod wrappers;

pub use preamble::{PREAMBLE_INCLUDES, emit_binding_header, emit_wrapper_preamble};

use crate::config::GeneratorConfig;
use crate::error::GenError;
use crate::naming::{self, FunctionNames};
use crate::schema::{Catalog, FunctionSpec};
use crate::types::{ArgRole, Representation, classify_tag};
use tracing::{debug, info};

/// Return shape, chosen by output count and shared by both emitters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnShape {
    /// One output, returned as a bare array
    Array,
    /// Several outputs, returned as a composite record
    Composite,
}

impl ReturnShape {
    pub fn for_output_count(count: usize) -> Self {
        if count > 1 {
            ReturnShape::Composite
        } else {
            ReturnShape::Array
        }
    }
}

/// A classified input argument
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedArg {
    /// Name as written in the catalog
    pub name: String,
    /// SQL parameter name
    pub param: String,
    pub rep: Representation,
    /// Rendered default literal (optional inputs only)
    pub default: Option<String>,
}

/// A classified output
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedOutput {
    /// Name as written in the catalog
    pub name: String,
    /// Composite-type field name
    pub field: String,
    pub rep: Representation,
}

/// A function with every argument classified and every name fixed
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedFunction {
    pub abbreviation: String,
    pub group: Option<String>,
    pub description: Option<String>,
    pub names: FunctionNames,
    pub required: Vec<ResolvedArg>,
    pub optional: Vec<ResolvedArg>,
    pub outputs: Vec<ResolvedOutput>,
    pub shape: ReturnShape,
}

impl ResolvedFunction {
    /// Classify and name every argument of `spec`
    pub fn resolve(spec: &FunctionSpec) -> Result<Self, GenError> {
        let func = spec.abbreviation.as_str();

        let required = spec
            .required_inputs
            .iter()
            .map(|arg| {
                let rep = classify_tag(func, &arg.name, &arg.tag, ArgRole::RequiredInput)?;
                Ok(ResolvedArg {
                    name: arg.name.clone(),
                    param: naming::sql_identifier(&arg.name),
                    rep,
                    default: None,
                })
            })
            .collect::<Result<Vec<_>, GenError>>()?;

        let optional = spec
            .optional_inputs
            .iter()
            .enumerate()
            .map(|(i, arg)| {
                let rep = classify_tag(func, &arg.name, &arg.tag, ArgRole::OptionalInput)?;
                let default = rep.render_default(&arg.default).map_err(|reason| {
                    GenError::structural(func, format!("optional_inputs[{}].default", i), reason)
                })?;
                Ok(ResolvedArg {
                    name: arg.name.clone(),
                    param: naming::sql_identifier(&arg.name),
                    rep,
                    default: Some(default),
                })
            })
            .collect::<Result<Vec<_>, GenError>>()?;

        let outputs = spec
            .outputs
            .iter()
            .enumerate()
            .map(|(i, arg)| {
                let rep = classify_tag(func, &arg.name, &arg.tag, ArgRole::Output)?;
                Ok(ResolvedOutput {
                    name: arg.name.clone(),
                    field: naming::output_field_name(&arg.name, i),
                    rep,
                })
            })
            .collect::<Result<Vec<_>, GenError>>()?;

        naming::check_unique(required.iter().chain(optional.iter()).map(|arg| {
            (
                arg.param.clone(),
                format!("parameter '{}' of '{}'", arg.name, func),
            )
        }))?;

        let shape = ReturnShape::for_output_count(outputs.len());
        if shape == ReturnShape::Composite {
            naming::check_unique(outputs.iter().map(|out| {
                (
                    out.field.clone(),
                    format!("output '{}' of '{}'", out.name, func),
                )
            }))?;
        }

        Ok(ResolvedFunction {
            abbreviation: spec.abbreviation.clone(),
            group: spec.group.clone(),
            description: spec.description.clone(),
            names: FunctionNames::for_abbreviation(func),
            required,
            optional,
            outputs,
            shape,
        })
    }

    /// One-line summary used in generated comments
    pub fn summary(&self) -> String {
        let mut line = self.abbreviation.clone();
        if let Some(desc) = &self.description {
            line.push_str(" - ");
            line.push_str(desc);
        }
        if let Some(group) = &self.group {
            line.push_str(&format!(" ({})", group));
        }
        line
    }
}

/// The two generated artifacts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifacts {
    /// C compilation unit
    pub wrapper: String,
    /// SQL registration script
    pub binding: String,
}

pub struct CodeGen {
    wrapper_code: String,
    binding_code: String,
    routine_prefix: String,
    module_pathname: String,
}

impl CodeGen {
    pub fn new() -> Self {
        Self::with_config(&GeneratorConfig::default())
    }

    pub fn with_config(config: &GeneratorConfig) -> Self {
        CodeGen {
            wrapper_code: String::new(),
            binding_code: String::new(),
            routine_prefix: config.routine_prefix.clone(),
            module_pathname: config.module_pathname.clone(),
        }
    }

    /// Generate both artifacts for the whole catalog
    ///
    /// Fails on the first invalid function; on failure nothing is returned.
    pub fn codegen_catalog(mut self, catalog: &Catalog) -> Result<Artifacts, GenError> {
        naming::check_collisions(catalog.functions.iter().map(|f| f.abbreviation.as_str()))?;

        let resolved = catalog
            .functions
            .iter()
            .map(ResolvedFunction::resolve)
            .collect::<Result<Vec<_>, GenError>>()?;

        emit_wrapper_preamble(&mut self.wrapper_code)?;
        emit_binding_header(&mut self.binding_code)?;

        for func in &resolved {
            debug!(
                abbreviation = %func.abbreviation,
                native = %func.names.native,
                outputs = func.outputs.len(),
                "generating function"
            );
            self.generate_wrapper(func)?;
            self.generate_binding(func)?;
        }

        info!("Generated {} function(s)", resolved.len());

        Ok(Artifacts {
            wrapper: self.wrapper_code,
            binding: self.binding_code,
        })
    }
}

impl Default for CodeGen {
    fn default() -> Self {
        Self::new()
    }
}
