//! Type Classifier
//!
//! Single lookup table from a catalog type tag to its representation in both
//! artifacts: the C storage kind used by the wrapper and the SQL type used by
//! the binding. Both emitters go through [`classify`]; neither inspects tag
//! text on its own.
//!
//! The price tags (`Price`, `High`, `Low`, `Close`, `Open`, `Volume`) only
//! document trading meaning. They classify exactly like `Double`.

use crate::error::GenError;
use crate::schema::DefaultValue;
use std::fmt;
use std::str::FromStr;

/// A recognized catalog type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Double,
    Price,
    High,
    Low,
    Close,
    Open,
    Volume,
    Integer,
    /// TA-Lib `TA_MAType` moving-average kind
    MovingAverageKind,
}

impl FromStr for TypeTag {
    type Err = ();

    /// Exact match on the canonical tag or one of the catalog's long-form
    /// spellings. No substring matching.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Double" | "Double Array" | "Real" => Ok(TypeTag::Double),
            "Price" => Ok(TypeTag::Price),
            "High" => Ok(TypeTag::High),
            "Low" => Ok(TypeTag::Low),
            "Close" => Ok(TypeTag::Close),
            "Open" => Ok(TypeTag::Open),
            "Volume" => Ok(TypeTag::Volume),
            "Integer" | "Integer Array" => Ok(TypeTag::Integer),
            "MAType" | "MA Type" => Ok(TypeTag::MovingAverageKind),
            _ => Err(()),
        }
    }
}

/// Where an argument appears in a function signature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgRole {
    RequiredInput,
    OptionalInput,
    Output,
}

impl fmt::Display for ArgRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgRole::RequiredInput => write!(f, "required input"),
            ArgRole::OptionalInput => write!(f, "optional input"),
            ArgRole::Output => write!(f, "output"),
        }
    }
}

/// How a value is stored on the C side
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    FloatArray,
    IntArray,
    FloatScalar,
    IntScalar,
    /// An `int` argument cast to `TA_MAType`
    EnumIntScalar,
}

/// Moving-average kinds in `TA_MAType` order
const MOVING_AVERAGE_KINDS: &[&str] = &[
    "SMA", "EMA", "WMA", "DEMA", "TEMA", "TRIMA", "KAMA", "MAMA", "T3",
];

/// The resolved representation of one tag in one role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Representation {
    pub storage: StorageKind,
}

impl Representation {
    /// SQL type used in the binding script
    pub fn sql_type(&self) -> &'static str {
        match self.storage {
            StorageKind::FloatArray => "double precision[]",
            StorageKind::IntArray => "integer[]",
            StorageKind::FloatScalar => "double precision",
            StorageKind::IntScalar | StorageKind::EnumIntScalar => "integer",
        }
    }

    /// C type of the local holding the value (element type for arrays)
    pub fn c_type(&self) -> &'static str {
        match self.storage {
            StorageKind::FloatArray | StorageKind::FloatScalar => "double",
            StorageKind::IntArray | StorageKind::IntScalar => "int",
            StorageKind::EnumIntScalar => "TA_MAType",
        }
    }

    /// Preamble helper that packages a result buffer as a PostgreSQL array
    pub fn array_builder(&self) -> Option<&'static str> {
        match self.storage {
            StorageKind::FloatArray => Some("tapg_float_array"),
            StorageKind::IntArray => Some("tapg_int_array"),
            _ => None,
        }
    }

    /// fmgr expression reading argument `index` as this scalar kind
    pub fn fmgr_getter(&self, index: usize) -> Option<String> {
        match self.storage {
            StorageKind::FloatScalar => Some(format!("PG_GETARG_FLOAT8({})", index)),
            StorageKind::IntScalar => Some(format!("PG_GETARG_INT32({})", index)),
            StorageKind::EnumIntScalar => Some(format!("(TA_MAType) PG_GETARG_INT32({})", index)),
            StorageKind::FloatArray | StorageKind::IntArray => None,
        }
    }

    /// Prefix for the wrapper's local variable names (`inReal0`, `outInt1`, ...)
    pub fn var_stem(&self) -> &'static str {
        match self.storage {
            StorageKind::FloatArray | StorageKind::FloatScalar => "Real",
            StorageKind::IntArray | StorageKind::IntScalar | StorageKind::EnumIntScalar => "Int",
        }
    }

    /// Render a catalog default as a literal valid in both C and SQL
    ///
    /// Returns a human-readable reason when the default does not fit the kind.
    pub fn render_default(&self, value: &DefaultValue) -> Result<String, String> {
        match (self.storage, value) {
            (StorageKind::IntScalar, DefaultValue::Integer(v)) if i32::try_from(*v).is_ok() => {
                Ok(v.to_string())
            }
            (StorageKind::IntScalar, DefaultValue::Float(v))
                if v.fract() == 0.0 && v.abs() <= i32::MAX as f64 =>
            {
                Ok(format!("{}", *v as i64))
            }
            (StorageKind::FloatScalar, DefaultValue::Integer(v)) => Ok(format!("{}.0", v)),
            (StorageKind::FloatScalar, DefaultValue::Float(v)) if v.is_finite() => {
                Ok(format!("{:?}", v))
            }
            (StorageKind::EnumIntScalar, DefaultValue::Integer(v))
                if (0..MOVING_AVERAGE_KINDS.len() as i64).contains(v) =>
            {
                Ok(v.to_string())
            }
            (StorageKind::EnumIntScalar, DefaultValue::Text(name)) => MOVING_AVERAGE_KINDS
                .iter()
                .position(|k| k.eq_ignore_ascii_case(name.trim()))
                .map(|idx| idx.to_string())
                .ok_or_else(|| {
                    format!(
                        "unknown moving average kind {}; expected one of {}",
                        value,
                        MOVING_AVERAGE_KINDS.join(", ")
                    )
                }),
            (StorageKind::FloatArray | StorageKind::IntArray, _) => {
                Err("array arguments take no default".to_string())
            }
            _ => Err(format!(
                "default {} does not fit a {} argument",
                value,
                self.sql_type()
            )),
        }
    }
}

/// Classify a tag in its argument role
///
/// Array-family tags are float arrays as required inputs; `Integer` is an
/// int array there and an int scalar as an optional input. Outputs are only
/// ever float or int arrays.
pub fn classify(tag: TypeTag, role: ArgRole) -> Option<Representation> {
    use TypeTag::*;
    let storage = match (role, tag) {
        (ArgRole::RequiredInput, Double | Price | High | Low | Close | Open | Volume) => {
            StorageKind::FloatArray
        }
        (ArgRole::RequiredInput, Integer) => StorageKind::IntArray,
        (ArgRole::OptionalInput, Double) => StorageKind::FloatScalar,
        (ArgRole::OptionalInput, Integer) => StorageKind::IntScalar,
        (ArgRole::OptionalInput, MovingAverageKind) => StorageKind::EnumIntScalar,
        (ArgRole::Output, Double) => StorageKind::FloatArray,
        (ArgRole::Output, Integer) => StorageKind::IntArray,
        _ => return None,
    };
    Some(Representation { storage })
}

/// Classify a tag as written in the catalog
///
/// Fails with [`GenError::UnknownType`] for any tag outside the closed set
/// for `role`.
pub fn classify_tag(
    function: &str,
    argument: &str,
    tag: &str,
    role: ArgRole,
) -> Result<Representation, GenError> {
    tag.parse::<TypeTag>()
        .ok()
        .and_then(|t| classify(t, role))
        .ok_or_else(|| GenError::UnknownType {
            function: function.to_string(),
            argument: argument.to_string(),
            tag: tag.to_string(),
            role: role.to_string(),
        })
}
