//! C Wrapper Code Generation
//!
//! Generates one fmgr V1 function per catalog entry that bridges PostgreSQL's
//! Datum calling convention and TA-Lib's pointer-based one.

use super::{CodeGen, GenError, ResolvedArg, ResolvedFunction, ReturnShape};
use std::fmt::Write as _;

impl CodeGen {
    // ─────────────────────────────────────────────────────────────────────────
    // Wrapper Helpers
    // ─────────────────────────────────────────────────────────────────────────

    /// Fetch each required input as an array argument
    fn write_array_args(&mut self, func: &ResolvedFunction) -> Result<(), GenError> {
        for (j, _) in func.required.iter().enumerate() {
            writeln!(
                &mut self.wrapper_code,
                "    ArrayType *inArray{} = PG_GETARG_ARRAYTYPE_P({});",
                j, j
            )?;
        }
        Ok(())
    }

    /// Fetch each optional input as a scalar, falling back to its default
    fn write_scalar_args(&mut self, func: &ResolvedFunction) -> Result<(), GenError> {
        let first_index = func.required.len();
        for (j, arg) in func.optional.iter().enumerate() {
            let index = first_index + j;
            let getter = arg.rep.fmgr_getter(index).ok_or_else(|| {
                GenError::structural(
                    &func.abbreviation,
                    format!("optional_inputs[{}]", j),
                    format!("'{}' is not a scalar", arg.name),
                )
            })?;
            let default = arg.default.as_deref().ok_or_else(|| {
                GenError::structural(
                    &func.abbreviation,
                    format!("optional_inputs[{}].default", j),
                    "optional input has no default",
                )
            })?;
            writeln!(
                &mut self.wrapper_code,
                "    {} optIn{} = PG_ARGISNULL({}) ? {} : {};",
                arg.rep.c_type(),
                j,
                index,
                default,
                getter
            )?;
        }
        Ok(())
    }

    /// Declare `num_elements` from the first input's length
    fn write_element_count(&mut self, required: &[ResolvedArg]) -> Result<(), GenError> {
        if required.is_empty() {
            writeln!(&mut self.wrapper_code, "    int num_elements = 1;")?;
        } else {
            writeln!(
                &mut self.wrapper_code,
                "    int num_elements = tapg_array_length(inArray0);"
            )?;
        }
        Ok(())
    }

    /// Check that every input shares `num_elements`
    ///
    /// Every input after the first is compared against the first input's
    /// length, so any two inputs of differing length fail.
    fn write_length_check(&mut self, required: &[ResolvedArg]) -> Result<(), GenError> {
        for j in 1..required.len() {
            writeln!(
                &mut self.wrapper_code,
                "    if (tapg_array_length(inArray{}) != num_elements)",
                j
            )?;
            writeln!(&mut self.wrapper_code, "        ereport(ERROR,")?;
            writeln!(
                &mut self.wrapper_code,
                "                (errcode(ERRCODE_ARRAY_SUBSCRIPT_ERROR),"
            )?;
            writeln!(
                &mut self.wrapper_code,
                "                 errmsg(\"Input arrays must have the same length\")));"
            )?;
        }
        if required.len() > 1 {
            writeln!(&mut self.wrapper_code)?;
        }
        Ok(())
    }

    /// Point typed locals at each input's data and allocate output buffers
    fn write_buffers(&mut self, func: &ResolvedFunction) -> Result<(), GenError> {
        for (j, arg) in func.required.iter().enumerate() {
            let c_type = arg.rep.c_type();
            writeln!(
                &mut self.wrapper_code,
                "    {} *in{}{} = ({} *) ARR_DATA_PTR(inArray{});",
                c_type,
                arg.rep.var_stem(),
                j,
                c_type,
                j
            )?;
        }
        for (j, out) in func.outputs.iter().enumerate() {
            let c_type = out.rep.c_type();
            writeln!(
                &mut self.wrapper_code,
                "    {} *out{}{} = ({} *) palloc(sizeof({}) * num_elements);",
                c_type,
                out.rep.var_stem(),
                j,
                c_type,
                c_type
            )?;
        }
        writeln!(&mut self.wrapper_code, "    int outBegIdx = 0;")?;
        writeln!(&mut self.wrapper_code, "    int outNBElement = 0;")?;
        writeln!(&mut self.wrapper_code, "    TA_RetCode retCode;")?;
        writeln!(&mut self.wrapper_code)?;
        Ok(())
    }

    /// Call the TA-Lib routine and raise on a non-success status
    fn write_computation_call(&mut self, func: &ResolvedFunction) -> Result<(), GenError> {
        let routine = format!("{}{}", self.routine_prefix, func.abbreviation);

        let mut args: Vec<String> = vec!["0".to_string(), "num_elements - 1".to_string()];
        args.extend(
            func.required
                .iter()
                .enumerate()
                .map(|(j, arg)| format!("in{}{}", arg.rep.var_stem(), j)),
        );
        args.extend((0..func.optional.len()).map(|j| format!("optIn{}", j)));
        args.push("&outBegIdx".to_string());
        args.push("&outNBElement".to_string());
        args.extend(
            func.outputs
                .iter()
                .enumerate()
                .map(|(j, out)| format!("out{}{}", out.rep.var_stem(), j)),
        );

        writeln!(
            &mut self.wrapper_code,
            "    retCode = {}({});",
            routine,
            args.join(", ")
        )?;
        writeln!(&mut self.wrapper_code, "    if (retCode != TA_SUCCESS)")?;
        writeln!(&mut self.wrapper_code, "        ereport(ERROR,")?;
        writeln!(
            &mut self.wrapper_code,
            "                (errcode(ERRCODE_EXTERNAL_ROUTINE_EXCEPTION),"
        )?;
        writeln!(
            &mut self.wrapper_code,
            "                 errmsg(\"TA-Lib {} function failed with error code: %d\", retCode)));",
            routine
        )?;
        writeln!(&mut self.wrapper_code)?;
        Ok(())
    }

    /// Package the output buffers as the function's return value
    fn write_return(&mut self, func: &ResolvedFunction) -> Result<(), GenError> {
        let mut results = Vec::with_capacity(func.outputs.len());
        for (j, out) in func.outputs.iter().enumerate() {
            let builder = out.rep.array_builder().ok_or_else(|| {
                GenError::structural(
                    &func.abbreviation,
                    format!("outputs[{}]", j),
                    format!("'{}' is not an array", out.name),
                )
            })?;
            results.push(format!(
                "{}(out{}{}, outNBElement)",
                builder,
                out.rep.var_stem(),
                j
            ));
        }

        match func.shape {
            ReturnShape::Array => {
                let result = results.first().ok_or_else(|| {
                    GenError::structural(&func.abbreviation, "outputs", "no outputs")
                })?;
                writeln!(
                    &mut self.wrapper_code,
                    "    PG_RETURN_ARRAYTYPE_P({});",
                    result
                )?;
            }
            ReturnShape::Composite => {
                let n = results.len();
                writeln!(&mut self.wrapper_code, "    {{")?;
                writeln!(&mut self.wrapper_code, "        TupleDesc tupdesc;")?;
                writeln!(&mut self.wrapper_code, "        Datum values[{}];", n)?;
                writeln!(&mut self.wrapper_code, "        bool nulls[{}];", n)?;
                writeln!(&mut self.wrapper_code, "        HeapTuple tuple;")?;
                writeln!(&mut self.wrapper_code)?;
                writeln!(
                    &mut self.wrapper_code,
                    "        if (get_call_result_type(fcinfo, NULL, &tupdesc) != TYPEFUNC_COMPOSITE)"
                )?;
                writeln!(&mut self.wrapper_code, "            ereport(ERROR,")?;
                writeln!(
                    &mut self.wrapper_code,
                    "                    (errcode(ERRCODE_FEATURE_NOT_SUPPORTED),"
                )?;
                writeln!(
                    &mut self.wrapper_code,
                    "                     errmsg(\"function returning record called in context that cannot accept type record\")));"
                )?;
                writeln!(
                    &mut self.wrapper_code,
                    "        tupdesc = BlessTupleDesc(tupdesc);"
                )?;
                writeln!(&mut self.wrapper_code)?;
                for (j, result) in results.iter().enumerate() {
                    writeln!(
                        &mut self.wrapper_code,
                        "        values[{}] = PointerGetDatum({});",
                        j, result
                    )?;
                    writeln!(&mut self.wrapper_code, "        nulls[{}] = false;", j)?;
                }
                writeln!(&mut self.wrapper_code)?;
                writeln!(
                    &mut self.wrapper_code,
                    "        tuple = heap_form_tuple(tupdesc, values, nulls);"
                )?;
                writeln!(
                    &mut self.wrapper_code,
                    "        PG_RETURN_DATUM(HeapTupleGetDatum(tuple));"
                )?;
                writeln!(&mut self.wrapper_code, "    }}")?;
            }
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Main Wrapper Generator
    // ─────────────────────────────────────────────────────────────────────────

    /// Generate a single C wrapper
    ///
    /// The wrapper:
    /// 1. Fetches required inputs as arrays, optional inputs as scalars
    /// 2. Allocates one buffer per output
    /// 3. Checks that all input arrays have one common length
    /// 4. Calls the TA-Lib routine
    /// 5. Raises on a failure status
    /// 6. Returns the trimmed output array, or a record of them
    ///
    /// Every local is declared before the first statement.
    pub(super) fn generate_wrapper(&mut self, func: &ResolvedFunction) -> Result<(), GenError> {
        let native = func.names.native.clone();

        writeln!(&mut self.wrapper_code, "/* {} */", func.summary())?;
        writeln!(&mut self.wrapper_code, "PG_FUNCTION_INFO_V1({});", native)?;
        writeln!(&mut self.wrapper_code, "Datum {}(PG_FUNCTION_ARGS);", native)?;
        writeln!(&mut self.wrapper_code, "Datum\n{}(PG_FUNCTION_ARGS)\n{{", native)?;

        self.write_array_args(func)?;
        self.write_scalar_args(func)?;
        self.write_element_count(&func.required)?;
        self.write_buffers(func)?;
        self.write_length_check(&func.required)?;
        self.write_computation_call(func)?;
        self.write_return(func)?;

        writeln!(&mut self.wrapper_code, "}}")?;
        writeln!(&mut self.wrapper_code)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::resolved;
    use super::*;
    use crate::schema::DefaultValue;

    fn wrapper_for(func: &ResolvedFunction) -> String {
        let mut codegen = CodeGen::new();
        codegen.generate_wrapper(func).unwrap();
        codegen.wrapper_code
    }

    #[test]
    fn test_wrapper_rsi() {
        let func = resolved(
            "RSI",
            &[("close", "Close")],
            &[("period", "Integer", DefaultValue::Integer(14))],
            &[("outReal", "Double")],
        );
        let c = wrapper_for(&func);

        assert!(c.contains("PG_FUNCTION_INFO_V1(pg_rsi);"));
        assert!(c.contains("Datum\npg_rsi(PG_FUNCTION_ARGS)\n{"));
        assert!(c.contains("ArrayType *inArray0 = PG_GETARG_ARRAYTYPE_P(0);"));
        assert!(c.contains("int optIn0 = PG_ARGISNULL(1) ? 14 : PG_GETARG_INT32(1);"));
        assert!(c.contains("double *inReal0 = (double *) ARR_DATA_PTR(inArray0);"));
        assert!(c.contains("double *outReal0 = (double *) palloc(sizeof(double) * num_elements);"));
        assert!(c.contains(
            "retCode = TA_RSI(0, num_elements - 1, inReal0, optIn0, &outBegIdx, &outNBElement, outReal0);"
        ));
        assert!(c.contains("TA-Lib TA_RSI function failed with error code: %d"));
        assert!(c.contains("PG_RETURN_ARRAYTYPE_P(tapg_float_array(outReal0, outNBElement));"));
        // Single input: no length comparison
        assert!(!c.contains("!= num_elements"));
        assert!(!c.contains("heap_form_tuple"));
    }

    #[test]
    fn test_wrapper_zero_required_inputs() {
        let func = resolved("NOW", &[], &[], &[("outInteger", "Integer")]);
        let c = wrapper_for(&func);

        assert!(c.contains("    int num_elements = 1;"));
        assert!(!c.contains("tapg_array_length"));
        assert!(!c.contains("ARR_DATA_PTR"));
        assert!(c.contains("int *outInt0 = (int *) palloc(sizeof(int) * num_elements);"));
        assert!(c.contains("retCode = TA_NOW(0, num_elements - 1, &outBegIdx, &outNBElement, outInt0);"));
        assert!(c.contains("PG_RETURN_ARRAYTYPE_P(tapg_int_array(outInt0, outNBElement));"));
    }

    #[test]
    fn test_wrapper_checks_every_input_length() {
        let func = resolved(
            "BOP",
            &[
                ("open", "Open"),
                ("high", "High"),
                ("low", "Low"),
                ("close", "Close"),
            ],
            &[],
            &[("outReal", "Double")],
        );
        let c = wrapper_for(&func);

        assert!(c.contains("int num_elements = tapg_array_length(inArray0);"));
        for j in 1..4 {
            assert!(
                c.contains(&format!("if (tapg_array_length(inArray{}) != num_elements)", j)),
                "input {} should be checked",
                j
            );
        }
        assert_eq!(c.matches("ERRCODE_ARRAY_SUBSCRIPT_ERROR").count(), 3);

        // Declarations all precede the first statement
        let last_decl = c.find("TA_RetCode retCode;").unwrap();
        let first_stmt = c.find("    if (").unwrap();
        assert!(last_decl < first_stmt);
        assert!(c.find("double *inReal3 = ").unwrap() < first_stmt);
        assert!(c.find("double *outReal0 = ").unwrap() < first_stmt);
        assert!(c.contains("TA_BOP(0, num_elements - 1, inReal0, inReal1, inReal2, inReal3, &outBegIdx"));
    }

    #[test]
    fn test_wrapper_optional_kinds() {
        let func = resolved(
            "BBANDS",
            &[("inReal", "Double")],
            &[
                ("optInTimePeriod", "Integer", DefaultValue::Integer(5)),
                ("optInNbDevUp", "Double", DefaultValue::Integer(2)),
                ("optInMAType", "MAType", DefaultValue::Text("SMA".to_string())),
            ],
            &[
                ("outRealUpperBand", "Double"),
                ("outRealMiddleBand", "Double"),
                ("outRealLowerBand", "Double"),
            ],
        );
        let c = wrapper_for(&func);

        assert!(c.contains("int optIn0 = PG_ARGISNULL(1) ? 5 : PG_GETARG_INT32(1);"));
        assert!(c.contains("double optIn1 = PG_ARGISNULL(2) ? 2.0 : PG_GETARG_FLOAT8(2);"));
        assert!(c.contains("TA_MAType optIn2 = PG_ARGISNULL(3) ? 0 : (TA_MAType) PG_GETARG_INT32(3);"));
        assert!(c.contains(
            "TA_BBANDS(0, num_elements - 1, inReal0, optIn0, optIn1, optIn2, &outBegIdx, &outNBElement, outReal0, outReal1, outReal2);"
        ));
    }

    #[test]
    fn test_wrapper_composite_return() {
        let func = resolved(
            "MINMAXINDEX",
            &[("inReal", "Double")],
            &[("optInTimePeriod", "Integer", DefaultValue::Integer(30))],
            &[("outMinIdx", "Integer"), ("outMaxIdx", "Integer")],
        );
        let c = wrapper_for(&func);

        assert!(c.contains("Datum values[2];"));
        assert!(c.contains("bool nulls[2];"));
        assert!(c.contains("get_call_result_type(fcinfo, NULL, &tupdesc) != TYPEFUNC_COMPOSITE"));
        assert!(c.contains("values[0] = PointerGetDatum(tapg_int_array(outInt0, outNBElement));"));
        assert!(c.contains("values[1] = PointerGetDatum(tapg_int_array(outInt1, outNBElement));"));
        assert!(c.contains("PG_RETURN_DATUM(HeapTupleGetDatum(tuple));"));
        assert!(!c.contains("PG_RETURN_ARRAYTYPE_P"));

        // Output order is preserved
        let first = c.find("values[0]").unwrap();
        let second = c.find("values[1]").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_wrapper_integer_input_array() {
        let func = resolved(
            "X",
            &[("inReal", "Double"), ("inFlags", "Integer")],
            &[],
            &[("outReal", "Double")],
        );
        let c = wrapper_for(&func);

        assert!(c.contains("int *inInt1 = (int *) ARR_DATA_PTR(inArray1);"));
        assert!(c.contains("TA_X(0, num_elements - 1, inReal0, inInt1, &outBegIdx"));
    }

    #[test]
    fn test_wrapper_summary_comment() {
        let mut func = resolved("SMA", &[("inReal", "Double")], &[], &[("outReal", "Double")]);
        func.description = Some("Simple Moving Average".to_string());
        func.group = Some("Overlap Studies".to_string());
        let c = wrapper_for(&func);

        assert!(c.starts_with("/* SMA - Simple Moving Average (Overlap Studies) */\n"));
    }
}
