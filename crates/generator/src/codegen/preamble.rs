//! Fixed text that opens each artifact.
//!
//! The C preamble declares the PostgreSQL and TA-Lib integration points and
//! the static helpers every wrapper shares. Kept in one data-driven table so
//! the include list has a single home.

use super::GenError;
use std::fmt::Write as _;

/// Headers included by the generated C unit, in order
pub const PREAMBLE_INCLUDES: &[&str] = &[
    "postgres.h",
    "fmgr.h",
    "funcapi.h",
    "access/htup_details.h",
    "catalog/pg_type.h",
    "utils/array.h",
    "utils/lsyscache.h",
];

/// TA-Lib header, included after the PostgreSQL ones
const TA_LIB_INCLUDE: &str = "ta_func.h";

/// Shared helpers: input length/shape checks and result array construction
const HELPERS: &str = r#"/*
 * Number of elements in a required input array.
 *
 * TA-Lib reads the raw data buffer, so inputs must be one-dimensional and
 * free of NULL elements.
 */
static int
tapg_array_length(ArrayType *array)
{
    if (ARR_NDIM(array) > 1)
        ereport(ERROR,
                (errcode(ERRCODE_ARRAY_SUBSCRIPT_ERROR),
                 errmsg("input arrays must be one-dimensional")));
    if (ARR_HASNULL(array))
        ereport(ERROR,
                (errcode(ERRCODE_NULL_VALUE_NOT_ALLOWED),
                 errmsg("input arrays must not contain NULL elements")));
    return ArrayGetNItems(ARR_NDIM(array), ARR_DIMS(array));
}

static ArrayType *
tapg_float_array(const double *values, int count)
{
    Datum *elems = (Datum *) palloc(sizeof(Datum) * (count > 0 ? count : 1));
    int i;

    for (i = 0; i < count; i++)
        elems[i] = Float8GetDatum(values[i]);
    return construct_array(elems, count, FLOAT8OID, sizeof(float8), FLOAT8PASSBYVAL, 'd');
}

static ArrayType *
tapg_int_array(const int *values, int count)
{
    Datum *elems = (Datum *) palloc(sizeof(Datum) * (count > 0 ? count : 1));
    int i;

    for (i = 0; i < count; i++)
        elems[i] = Int32GetDatum(values[i]);
    return construct_array(elems, count, INT4OID, sizeof(int32), true, 'i');
}
"#;

/// Write the C preamble: banner, includes, module magic and helpers
pub fn emit_wrapper_preamble(out: &mut String) -> Result<(), GenError> {
    writeln!(out, "/*")?;
    writeln!(out, " * PostgreSQL wrappers for TA-Lib.")?;
    writeln!(out, " * Generated by tapg. Do not edit.")?;
    writeln!(out, " */")?;
    writeln!(out)?;
    for header in PREAMBLE_INCLUDES {
        writeln!(out, "#include \"{}\"", header)?;
    }
    writeln!(out)?;
    writeln!(out, "#include \"{}\"", TA_LIB_INCLUDE)?;
    writeln!(out)?;
    writeln!(out, "PG_MODULE_MAGIC;")?;
    writeln!(out)?;
    out.push_str(HELPERS);
    writeln!(out)?;
    Ok(())
}

/// Write the SQL script banner
pub fn emit_binding_header(out: &mut String) -> Result<(), GenError> {
    writeln!(out, "-- SQL bindings for the TA-Lib PostgreSQL wrappers.")?;
    writeln!(out, "-- Generated by tapg. Do not edit.")?;
    writeln!(out)?;
    Ok(())
}
