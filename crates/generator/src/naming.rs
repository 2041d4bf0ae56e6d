//! Naming contract shared by the C and SQL artifacts.
//!
//! The two artifacts only interoperate if these names match bit for bit:
//!
//! - C wrapper: `pg_` + lowercased abbreviation
//! - SQL function: `ta_` + lowercased abbreviation
//! - SQL composite type (multi-output only): `ta_` + lowercased abbreviation + `_type`

use crate::error::GenError;
use std::collections::HashMap;

/// Prefix of the C wrapper symbol
pub const NATIVE_PREFIX: &str = "pg_";

/// Prefix of the SQL function and composite type
pub const SQL_PREFIX: &str = "ta_";

/// Suffix of the composite return type
pub const COMPOSITE_SUFFIX: &str = "_type";

/// Structural output-name prefixes, stripped when naming composite fields
const OUTPUT_PREFIXES: &[&str] = &["outinteger", "outreal"];

/// Generated identifiers for one function
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionNames {
    /// C symbol (e.g., `pg_sma`)
    pub native: String,
    /// SQL function name (e.g., `ta_sma`)
    pub sql: String,
    /// SQL composite type name (e.g., `ta_macd_type`), used only for multi-output functions
    pub composite: String,
}

impl FunctionNames {
    pub fn for_abbreviation(abbreviation: &str) -> Self {
        let lower = abbreviation.to_lowercase();
        FunctionNames {
            native: format!("{}{}", NATIVE_PREFIX, lower),
            sql: format!("{}{}", SQL_PREFIX, lower),
            composite: format!("{}{}{}", SQL_PREFIX, lower, COMPOSITE_SUFFIX),
        }
    }
}

/// SQL parameter name for a catalog argument name
///
/// Lowercased, with spaces and hyphens turned into underscores.
pub fn sql_identifier(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| match c {
            ' ' | '-' => '_',
            c => c,
        })
        .collect()
}

/// Check that `symbol` can be spliced into C and SQL source as an identifier
///
/// Valid symbols contain only ASCII alphanumerics and underscores.
pub fn validate_symbol(symbol: &str) -> Result<(), String> {
    if symbol.is_empty() {
        return Err("symbol name cannot be empty".to_string());
    }
    match symbol
        .chars()
        .find(|c| !c.is_ascii_alphanumeric() && *c != '_')
    {
        Some(c) => Err(format!(
            "invalid character '{}' in symbol '{}'; symbols may only contain ASCII letters, digits and underscores",
            c.escape_default(),
            symbol
        )),
        None => Ok(()),
    }
}

/// Composite-type field name for output `index`
///
/// Strips the structural `outReal`/`outInteger` prefix; an output that is
/// nothing but the prefix becomes `out<index>`.
pub fn output_field_name(name: &str, index: usize) -> String {
    let ident = sql_identifier(name);
    let stripped = OUTPUT_PREFIXES
        .iter()
        .find_map(|prefix| ident.strip_prefix(prefix))
        .unwrap_or(ident.as_str());
    if stripped.is_empty() {
        format!("out{}", index)
    } else {
        stripped.to_string()
    }
}

/// Ensure every identifier in `entries` is distinct
///
/// Each entry is `(identifier, origin)`; the origin describes where the
/// identifier came from and is used in the error message.
pub fn check_unique<I>(entries: I) -> Result<(), GenError>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut seen: HashMap<String, String> = HashMap::new();
    for (identifier, origin) in entries {
        if let Some(first) = seen.get(&identifier) {
            return Err(GenError::NamingCollision {
                identifier,
                first: first.clone(),
                second: origin,
            });
        }
        seen.insert(identifier, origin);
    }
    Ok(())
}

/// Ensure no two functions share a C symbol or a SQL name
pub fn check_collisions<'a, I>(abbreviations: I) -> Result<(), GenError>
where
    I: IntoIterator<Item = &'a str>,
{
    let names: Vec<(&str, FunctionNames)> = abbreviations
        .into_iter()
        .map(|abbr| (abbr, FunctionNames::for_abbreviation(abbr)))
        .collect();

    check_unique(
        names
            .iter()
            .map(|(abbr, n)| (n.native.clone(), format!("function '{}'", abbr))),
    )?;
    check_unique(
        names
            .iter()
            .map(|(abbr, n)| (n.sql.clone(), format!("function '{}'", abbr))),
    )
}
