//! Function Catalog Schema
//!
//! Parses the TA function catalog into an ordered list of [`FunctionSpec`]s.
//! Two document formats are read: the TOML catalog below, and the
//! `ta_func_api.xml` description that ships with TA-Lib (see [`xml`]).
//! Both are lowered to the same raw shape and checked by the same code.
//!
//! Parsing only checks structure: sections present, names usable as
//! identifiers, defaults present where required. Type tags are kept as
//! written and resolved later by [`crate::types::classify`], so an unknown
//! tag is reported against the argument that uses it.
//!
//! # Format
//!
//! ```toml
//! [[function]]
//! abbreviation = "RSI"
//! group = "Momentum Indicators"
//! description = "Relative Strength Index"
//! required_inputs = [{ name = "inReal", type = "Close" }]
//! optional_inputs = [{ name = "optInTimePeriod", type = "Integer", default = 14 }]
//! outputs = [{ name = "outReal", type = "Double" }]
//! ```

pub mod xml;

use crate::error::GenError;
use crate::naming;
use serde::Deserialize;
use std::fmt;
use std::path::Path;

/// A default value as written in the catalog.
///
/// Strings are only meaningful for moving-average kinds (`"SMA"`, `"EMA"`, ...).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum DefaultValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultValue::Integer(v) => write!(f, "{}", v),
            DefaultValue::Float(v) => write!(f, "{}", v),
            DefaultValue::Text(s) => write!(f, "\"{}\"", s),
        }
    }
}

/// A required (array) input
#[derive(Debug, Clone, PartialEq)]
pub struct RequiredInput {
    pub name: String,
    pub tag: String,
}

/// An optional (scalar) input with its default
#[derive(Debug, Clone, PartialEq)]
pub struct OptionalInput {
    pub name: String,
    pub tag: String,
    pub default: DefaultValue,
}

/// An output array
#[derive(Debug, Clone, PartialEq)]
pub struct OutputArg {
    pub name: String,
    pub tag: String,
}

/// One function signature from the catalog
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionSpec {
    /// Catalog abbreviation (e.g., "RSI"); also the TA-Lib routine suffix
    pub abbreviation: String,
    /// Catalog group (e.g., "Momentum Indicators")
    pub group: Option<String>,
    /// Human-readable name
    pub description: Option<String>,
    pub required_inputs: Vec<RequiredInput>,
    pub optional_inputs: Vec<OptionalInput>,
    pub outputs: Vec<OutputArg>,
}

/// The parsed catalog, in document order
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    pub functions: Vec<FunctionSpec>,
}

// ============================================================================
// Raw document shape
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawCatalog {
    #[serde(rename = "function", default)]
    functions: Vec<RawFunction>,
}

#[derive(Debug, Deserialize)]
struct RawFunction {
    abbreviation: Option<String>,
    group: Option<String>,
    description: Option<String>,
    required_inputs: Option<Vec<RawArgument>>,
    optional_inputs: Option<Vec<RawArgument>>,
    outputs: Option<Vec<RawArgument>>,
}

#[derive(Debug, Deserialize)]
struct RawArgument {
    name: Option<String>,
    #[serde(rename = "type")]
    type_tag: Option<String>,
    default: Option<DefaultValue>,
}

/// Document format of a catalog file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CatalogFormat {
    #[default]
    Toml,
    /// TA-Lib's `ta_func_api.xml`
    Xml,
}

impl CatalogFormat {
    /// Pick the format from the file extension; anything but `.xml` is TOML
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("xml") => CatalogFormat::Xml,
            _ => CatalogFormat::Toml,
        }
    }
}

impl Catalog {
    /// Parse a catalog from TOML content
    ///
    /// Fails with [`GenError::Parse`] on invalid TOML and with
    /// [`GenError::Structural`] on the first descriptor with a missing or
    /// malformed field.
    pub fn parse(content: &str) -> Result<Self, GenError> {
        let raw: RawCatalog = toml::from_str(content)?;
        raw.into_catalog()
    }

    /// Parse TA-Lib's XML function description
    pub fn parse_xml(content: &str) -> Result<Self, GenError> {
        xml::parse(content)?.into_catalog()
    }

    pub fn parse_as(content: &str, format: CatalogFormat) -> Result<Self, GenError> {
        match format {
            CatalogFormat::Toml => Self::parse(content),
            CatalogFormat::Xml => Self::parse_xml(content),
        }
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl FunctionSpec {
    /// Number of outputs; selects the composite or bare-array return shape
    pub fn output_count(&self) -> usize {
        self.outputs.len()
    }
}

impl RawCatalog {
    fn into_catalog(self) -> Result<Catalog, GenError> {
        if self.functions.is_empty() {
            return Err(GenError::structural(
                "<catalog>",
                "function",
                "catalog must define at least one function",
            ));
        }

        let functions = self
            .functions
            .into_iter()
            .enumerate()
            .map(|(idx, func)| func.into_spec(idx))
            .collect::<Result<Vec<_>, GenError>>()?;

        Ok(Catalog { functions })
    }
}

impl RawFunction {
    fn into_spec(self, idx: usize) -> Result<FunctionSpec, GenError> {
        let abbreviation = match self.abbreviation {
            Some(a) if !a.trim().is_empty() => a.trim().to_string(),
            Some(_) => {
                return Err(GenError::structural(
                    format!("#{}", idx + 1),
                    "abbreviation",
                    "abbreviation is empty",
                ));
            }
            None => {
                return Err(GenError::structural(
                    format!("#{}", idx + 1),
                    "abbreviation",
                    "missing abbreviation",
                ));
            }
        };
        let func = abbreviation.as_str();
        naming::validate_symbol(func)
            .map_err(|reason| GenError::structural(func, "abbreviation", reason))?;
        let group = self
            .group
            .map(|text| comment_text(func, "group", text))
            .transpose()?;
        let description = self
            .description
            .map(|text| comment_text(func, "description", text))
            .transpose()?;

        let required = self.required_inputs.ok_or_else(|| {
            GenError::structural(func, "required_inputs", "missing required_inputs section")
        })?;
        let required_inputs = required
            .into_iter()
            .enumerate()
            .map(|(i, arg)| {
                let field = format!("required_inputs[{}]", i);
                if arg.default.is_some() {
                    return Err(GenError::structural(
                        func,
                        format!("{}.default", field),
                        "required inputs take no default",
                    ));
                }
                let (name, tag) = arg.name_and_tag(func, &field)?;
                Ok(RequiredInput { name, tag })
            })
            .collect::<Result<Vec<_>, GenError>>()?;

        let optional_inputs = self
            .optional_inputs
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(i, arg)| {
                let field = format!("optional_inputs[{}]", i);
                let (name, tag) = arg.name_and_tag(func, &field)?;
                let default = arg.default.ok_or_else(|| {
                    GenError::structural(
                        func,
                        format!("{}.default", field),
                        "optional input has no default",
                    )
                })?;
                Ok(OptionalInput { name, tag, default })
            })
            .collect::<Result<Vec<_>, GenError>>()?;

        let outputs = self
            .outputs
            .ok_or_else(|| GenError::structural(func, "outputs", "missing outputs section"))?;
        if outputs.is_empty() {
            return Err(GenError::structural(
                func,
                "outputs",
                "function must have at least one output",
            ));
        }
        let outputs = outputs
            .into_iter()
            .enumerate()
            .map(|(i, arg)| {
                let (name, tag) = arg.name_and_tag(func, &format!("outputs[{}]", i))?;
                Ok(OutputArg { name, tag })
            })
            .collect::<Result<Vec<_>, GenError>>()?;

        Ok(FunctionSpec {
            abbreviation,
            group,
            description,
            required_inputs,
            optional_inputs,
            outputs,
        })
    }
}

impl RawArgument {
    fn name_and_tag(&self, func: &str, field: &str) -> Result<(String, String), GenError> {
        let name = match &self.name {
            Some(n) if !n.trim().is_empty() => n.trim().to_string(),
            _ => {
                return Err(GenError::structural(
                    func,
                    format!("{}.name", field),
                    "argument has no name",
                ));
            }
        };
        let tag = match &self.type_tag {
            Some(t) if !t.trim().is_empty() => t.trim().to_string(),
            _ => {
                return Err(GenError::structural(
                    func,
                    format!("{}.type", field),
                    format!("argument '{}' has no type", name),
                ));
            }
        };
        naming::validate_symbol(&naming::sql_identifier(&name))
            .map_err(|reason| GenError::structural(func, format!("{}.name", field), reason))?;
        Ok((name, tag))
    }
}

/// Free text copied into generated C and SQL comments
///
/// Must stay on one line and must not close a C comment.
fn comment_text(func: &str, field: &str, text: String) -> Result<String, GenError> {
    if text.contains("*/") {
        return Err(GenError::structural(
            func,
            field,
            "text must not contain '*/'",
        ));
    }
    if let Some(c) = text.chars().find(|c| c.is_control()) {
        return Err(GenError::structural(
            func,
            field,
            format!("text must not contain control character '{}'", c.escape_default()),
        ));
    }
    Ok(text.trim().to_string())
}
