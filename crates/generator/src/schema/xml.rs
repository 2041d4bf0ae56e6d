//! Reader for TA-Lib's `ta_func_api.xml`.
//!
//! Only the elements the generator needs are mapped. Flags, ranges and
//! display hints are skipped. Each `<FinancialFunction>` is lowered to the
//! same raw descriptor the TOML reader produces, so validation is shared.
//!
//! ```xml
//! <FinancialFunctions>
//!   <FinancialFunction>
//!     <Abbreviation>RSI</Abbreviation>
//!     <ShortDescription>Relative Strength Index</ShortDescription>
//!     <GroupId>Momentum Indicators</GroupId>
//!     <RequiredInputArguments>
//!       <RequiredInputArgument>
//!         <Type>Double Array</Type>
//!         <Name>inReal</Name>
//!       </RequiredInputArgument>
//!     </RequiredInputArguments>
//!     ...
//!   </FinancialFunction>
//! </FinancialFunctions>
//! ```

use super::{DefaultValue, RawArgument, RawCatalog, RawFunction};
use crate::error::GenError;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct XmlCatalog {
    #[serde(rename = "FinancialFunction", default)]
    functions: Vec<XmlFunction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct XmlFunction {
    abbreviation: Option<String>,
    short_description: Option<String>,
    group_id: Option<String>,
    required_input_arguments: Option<XmlRequiredInputs>,
    optional_input_arguments: Option<XmlOptionalInputs>,
    output_arguments: Option<XmlOutputs>,
}

#[derive(Debug, Deserialize)]
struct XmlRequiredInputs {
    #[serde(rename = "RequiredInputArgument", default)]
    arguments: Vec<XmlArgument>,
}

#[derive(Debug, Deserialize)]
struct XmlOptionalInputs {
    #[serde(rename = "OptionalInputArgument", default)]
    arguments: Vec<XmlArgument>,
}

#[derive(Debug, Deserialize)]
struct XmlOutputs {
    #[serde(rename = "OutputArgument", default)]
    arguments: Vec<XmlArgument>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct XmlArgument {
    name: Option<String>,
    #[serde(rename = "Type")]
    type_tag: Option<String>,
    default_value: Option<String>,
}

/// Parse the XML document into raw descriptors
pub(super) fn parse(content: &str) -> Result<RawCatalog, GenError> {
    let doc: XmlCatalog = quick_xml::de::from_str(content)?;
    Ok(RawCatalog {
        functions: doc.functions.into_iter().map(XmlFunction::into_raw).collect(),
    })
}

impl XmlFunction {
    fn into_raw(self) -> RawFunction {
        RawFunction {
            abbreviation: self.abbreviation,
            group: self.group_id,
            description: self.short_description,
            required_inputs: self
                .required_input_arguments
                .map(|section| lower_arguments(section.arguments)),
            optional_inputs: self
                .optional_input_arguments
                .map(|section| lower_arguments(section.arguments)),
            outputs: self
                .output_arguments
                .map(|section| lower_arguments(section.arguments)),
        }
    }
}

fn lower_arguments(arguments: Vec<XmlArgument>) -> Vec<RawArgument> {
    arguments
        .into_iter()
        .map(|arg| RawArgument {
            name: arg.name,
            type_tag: arg.type_tag,
            default: arg.default_value.as_deref().map(default_value),
        })
        .collect()
}

/// Read a `<DefaultValue>` element
///
/// TA-Lib writes doubles in C exponent form (`2.000000e+0`) and MA types
/// as their integer code.
fn default_value(text: &str) -> DefaultValue {
    let text = text.trim();
    if let Ok(v) = text.parse::<i64>() {
        DefaultValue::Integer(v)
    } else if let Ok(v) = text.parse::<f64>() {
        DefaultValue::Float(v)
    } else {
        DefaultValue::Text(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BBANDS: &str = r#"<?xml version="1.0" encoding="utf-8" ?>
<FinancialFunctions>
  <FinancialFunction>
    <Abbreviation>BBANDS</Abbreviation>
    <CamelCaseName>Bbands</CamelCaseName>
    <ShortDescription>Bollinger Bands</ShortDescription>
    <GroupId>Overlap Studies</GroupId>
    <Flags>
      <Flag>Overlap</Flag>
    </Flags>
    <RequiredInputArguments>
      <RequiredInputArgument>
        <Type>Double Array</Type>
        <Name>inReal</Name>
      </RequiredInputArgument>
    </RequiredInputArguments>
    <OptionalInputArguments>
      <OptionalInputArgument>
        <Name>Time Period</Name>
        <ShortDescription>Number of period</ShortDescription>
        <Type>Integer</Type>
        <Range>
          <Minimum>2</Minimum>
          <Maximum>100000</Maximum>
        </Range>
        <DefaultValue>5</DefaultValue>
      </OptionalInputArgument>
      <OptionalInputArgument>
        <Name>Deviations up</Name>
        <Type>Double</Type>
        <DefaultValue>2.000000e+0</DefaultValue>
      </OptionalInputArgument>
      <OptionalInputArgument>
        <Name>MA Type</Name>
        <Type>MA Type</Type>
        <DefaultValue>0</DefaultValue>
      </OptionalInputArgument>
    </OptionalInputArguments>
    <OutputArguments>
      <OutputArgument>
        <Type>Double Array</Type>
        <Name>outRealUpperBand</Name>
        <Flags>
          <Flag>Upper Limit</Flag>
        </Flags>
      </OutputArgument>
      <OutputArgument>
        <Type>Double Array</Type>
        <Name>outRealMiddleBand</Name>
      </OutputArgument>
    </OutputArguments>
  </FinancialFunction>
</FinancialFunctions>
"#;

    #[test]
    fn test_parse_financial_function() {
        let raw = parse(BBANDS).unwrap();
        assert_eq!(raw.functions.len(), 1);

        let func = &raw.functions[0];
        assert_eq!(func.abbreviation.as_deref(), Some("BBANDS"));
        assert_eq!(func.group.as_deref(), Some("Overlap Studies"));
        assert_eq!(func.description.as_deref(), Some("Bollinger Bands"));

        let required = func.required_inputs.as_ref().unwrap();
        assert_eq!(required.len(), 1);
        assert_eq!(required[0].type_tag.as_deref(), Some("Double Array"));

        let optional = func.optional_inputs.as_ref().unwrap();
        let names: Vec<_> = optional.iter().map(|a| a.name.as_deref().unwrap()).collect();
        assert_eq!(names, vec!["Time Period", "Deviations up", "MA Type"]);
        assert_eq!(optional[0].default, Some(DefaultValue::Integer(5)));
        assert_eq!(optional[1].default, Some(DefaultValue::Float(2.0)));

        assert_eq!(func.outputs.as_ref().unwrap().len(), 2);
    }

    #[test]
    fn test_missing_optional_section() {
        let content = r#"
<FinancialFunctions>
  <FinancialFunction>
    <Abbreviation>ACOS</Abbreviation>
    <RequiredInputArguments>
      <RequiredInputArgument>
        <Type>Double Array</Type>
        <Name>inReal</Name>
      </RequiredInputArgument>
    </RequiredInputArguments>
    <OutputArguments>
      <OutputArgument>
        <Type>Double Array</Type>
        <Name>outReal</Name>
      </OutputArgument>
    </OutputArguments>
  </FinancialFunction>
</FinancialFunctions>
"#;

        let raw = parse(content).unwrap();
        assert!(raw.functions[0].optional_inputs.is_none());
        assert!(raw.functions[0].description.is_none());
    }

    #[test]
    fn test_default_value_forms() {
        assert_eq!(default_value("14"), DefaultValue::Integer(14));
        assert_eq!(default_value(" 3.000000e-1 "), DefaultValue::Float(0.3));
        assert_eq!(default_value("-4.000000e+37"), DefaultValue::Float(-4e37));
        assert_eq!(default_value("SMA"), DefaultValue::Text("SMA".to_string()));
    }

    #[test]
    fn test_malformed_xml() {
        let err = parse("<FinancialFunctions><FinancialFunction>").unwrap_err();
        assert!(matches!(err, GenError::Xml(_)));
    }
}
