//! SQL Binding Generation
//!
//! Emits the `CREATE TYPE` / `CREATE OR REPLACE FUNCTION` statements that
//! register each C wrapper with PostgreSQL.

use super::{CodeGen, GenError, ResolvedFunction, ReturnShape};
use std::fmt::Write as _;

impl CodeGen {
    /// Composite return type: one array field per output, in declared order
    fn write_composite_type(&mut self, func: &ResolvedFunction) -> Result<(), GenError> {
        writeln!(
            &mut self.binding_code,
            "CREATE TYPE {} AS (",
            func.names.composite
        )?;
        let fields: Vec<String> = func
            .outputs
            .iter()
            .map(|out| format!("    {} {}", out.field, out.rep.sql_type()))
            .collect();
        writeln!(&mut self.binding_code, "{}", fields.join(",\n"))?;
        writeln!(&mut self.binding_code, ");")?;
        writeln!(&mut self.binding_code)?;
        Ok(())
    }

    /// SQL parameter list: required arrays, then optional scalars with defaults
    fn binding_params(func: &ResolvedFunction) -> Vec<String> {
        let required = func
            .required
            .iter()
            .map(|arg| format!("    {} {}", arg.param, arg.rep.sql_type()));
        let optional = func.optional.iter().map(|arg| match &arg.default {
            Some(default) => format!(
                "    {} {} DEFAULT {}",
                arg.param,
                arg.rep.sql_type(),
                default
            ),
            None => format!("    {} {}", arg.param, arg.rep.sql_type()),
        });
        required.chain(optional).collect()
    }

    /// Generate the SQL registration for one function
    pub(super) fn generate_binding(&mut self, func: &ResolvedFunction) -> Result<(), GenError> {
        writeln!(&mut self.binding_code, "-- {}", func.summary())?;

        if func.shape == ReturnShape::Composite {
            self.write_composite_type(func)?;
        }

        let params = Self::binding_params(func);
        if params.is_empty() {
            writeln!(
                &mut self.binding_code,
                "CREATE OR REPLACE FUNCTION {}()",
                func.names.sql
            )?;
        } else {
            writeln!(
                &mut self.binding_code,
                "CREATE OR REPLACE FUNCTION {}(\n{})",
                func.names.sql,
                params.join(",\n")
            )?;
        }

        let returns = match (func.shape, func.outputs.first()) {
            (ReturnShape::Composite, _) => func.names.composite.as_str(),
            (ReturnShape::Array, Some(out)) => out.rep.sql_type(),
            (ReturnShape::Array, None) => {
                return Err(GenError::structural(
                    &func.abbreviation,
                    "outputs",
                    "no outputs",
                ));
            }
        };
        writeln!(&mut self.binding_code, "RETURNS {}", returns)?;
        writeln!(
            &mut self.binding_code,
            "AS '{}', '{}'",
            self.module_pathname, func.names.native
        )?;
        writeln!(&mut self.binding_code, "LANGUAGE C STRICT;")?;
        writeln!(&mut self.binding_code)?;

        Ok(())
    }
}
