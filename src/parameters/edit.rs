//! # `name = value` edit grammar
//!
//! During the edit phase of an interactive session, the operator types one line at a time:
//!
//! ```text
//! rfluxmin = 20
//! fitgeometry = shift
//! threshold = none
//! run
//! ```
//!
//! Each line is lower-cased, then parsed into an [`EditCommand`]. Any line starting with
//! `run` ends the edit phase. Otherwise the line must contain `=`; the text before the first
//! `=` is the parameter name and the text up to the next `=` (if any) is the value.
//! Float fields accept a number, `none` (unset) or `nan`. `fitgeometry` keeps the raw text.
//!
//! Failures are reported as [`EditLineError`]; they never change the parameter set.
use nom::{
    bytes::complete::{tag, take_till},
    character::complete::char,
    sequence::separated_pair,
    IResult, Parser,
};
use thiserror::Error;

use super::{FitGeometry, FloatParam, ParamValue, FITGEOMETRY_NAME};

/// One accepted edit, touching exactly one field.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamEdit {
    Float(FloatParam, ParamValue),
    FitGeometry(FitGeometry),
}

#[derive(Debug, Clone, PartialEq)]
pub enum EditCommand {
    /// End the edit phase and re-run the registration preview.
    Run,
    Set(ParamEdit),
}

/// Line-level edit errors.
///
/// Variants
/// -----------------
/// * `MissingEquals` – the line has no `=`; payload is the offending line.
/// * `UnknownParameter` – the name is well-formed but not editable.
/// * `EmptyValue` – nothing after `=`.
/// * `InvalidNumber` – the value of a float field does not parse.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditLineError {
    #[error("Must use the \"parname = value\" syntax, got: {0}")]
    MissingEquals(String),
    #[error("Unknown parameter: {0}")]
    UnknownParameter(String),
    #[error("No value given for {0}")]
    EmptyValue(String),
    #[error("Invalid number for {name}: {value}")]
    InvalidNumber { name: String, value: String },
}

fn parse_run(input: &str) -> IResult<&str, &str> {
    tag("run").parse(input)
}

fn parse_assignment(input: &str) -> IResult<&str, (&str, &str)> {
    separated_pair(take_till(|c| c == '='), char('='), take_till(|c| c == '=')).parse(input)
}

fn parse_float_value(name: &str, value: &str) -> Result<ParamValue, EditLineError> {
    match value {
        "none" => Ok(ParamValue::Unset),
        "nan" => Ok(ParamValue::NotANumber),
        _ => value
            .parse::<f64>()
            .map(ParamValue::from)
            .map_err(|_| EditLineError::InvalidNumber {
                name: name.to_string(),
                value: value.to_string(),
            }),
    }
}

/// Parse one operator line into an [`EditCommand`].
///
/// Arguments
/// -----------------
/// * `line`: the raw line, as typed.
///
/// Return
/// ----------
/// * `EditCommand::Run` for any line starting with `run` (case-insensitive),
///   `EditCommand::Set` for a valid assignment, or an [`EditLineError`].
pub fn parse_edit_line(line: &str) -> Result<EditCommand, EditLineError> {
    let lowered = line.trim().to_lowercase();

    if parse_run(&lowered).is_ok() {
        return Ok(EditCommand::Run);
    }

    let (name, value) = match parse_assignment(&lowered) {
        Ok((_, (name, value))) => (name.trim(), value.trim()),
        Err(_) => return Err(EditLineError::MissingEquals(line.trim().to_string())),
    };

    let is_known = name == FITGEOMETRY_NAME || name.parse::<FloatParam>().is_ok();
    if !is_known {
        return Err(EditLineError::UnknownParameter(name.to_string()));
    }
    if value.is_empty() {
        return Err(EditLineError::EmptyValue(name.to_string()));
    }

    let edit = match name.parse::<FloatParam>() {
        Ok(param) => ParamEdit::Float(param, parse_float_value(name, value)?),
        Err(()) => ParamEdit::FitGeometry(FitGeometry::from(value)),
    };
    Ok(EditCommand::Set(edit))
}

#[cfg(test)]
mod test_edit_line {
    use super::*;

    #[test]
    fn test_float_assignment() {
        assert_eq!(
            parse_edit_line("rfluxmin = 20"),
            Ok(EditCommand::Set(ParamEdit::Float(
                FloatParam::RFluxMin,
                ParamValue::Number(20.0)
            )))
        );
        assert_eq!(
            parse_edit_line("  SearchRad=0.5 "),
            Ok(EditCommand::Set(ParamEdit::Float(
                FloatParam::SearchRad,
                ParamValue::Number(0.5)
            )))
        );
    }

    #[test]
    fn test_none_and_nan() {
        assert_eq!(
            parse_edit_line("peakmax = None"),
            Ok(EditCommand::Set(ParamEdit::Float(
                FloatParam::PeakMax,
                ParamValue::Unset
            )))
        );
        assert_eq!(
            parse_edit_line("peakmin = NaN"),
            Ok(EditCommand::Set(ParamEdit::Float(
                FloatParam::PeakMin,
                ParamValue::NotANumber
            )))
        );
    }

    #[test]
    fn test_fitgeometry_is_raw() {
        assert_eq!(
            parse_edit_line("fitgeometry = shift"),
            Ok(EditCommand::Set(ParamEdit::FitGeometry(FitGeometry::Shift)))
        );
        assert_eq!(
            parse_edit_line("fitgeometry = rotate"),
            Ok(EditCommand::Set(ParamEdit::FitGeometry(FitGeometry::Other(
                "rotate".into()
            ))))
        );
    }

    #[test]
    fn test_run_prefix() {
        assert_eq!(parse_edit_line("run"), Ok(EditCommand::Run));
        assert_eq!(parse_edit_line("RUN"), Ok(EditCommand::Run));
        assert_eq!(parse_edit_line("running"), Ok(EditCommand::Run));
    }

    #[test]
    fn test_malformed_lines() {
        assert_eq!(
            parse_edit_line("rfluxmin 20"),
            Err(EditLineError::MissingEquals("rfluxmin 20".into()))
        );
        assert_eq!(
            parse_edit_line("magzero = 25"),
            Err(EditLineError::UnknownParameter("magzero".into()))
        );
        assert_eq!(
            parse_edit_line("threshold ="),
            Err(EditLineError::EmptyValue("threshold".into()))
        );
        assert_eq!(
            parse_edit_line("threshold = high"),
            Err(EditLineError::InvalidNumber {
                name: "threshold".into(),
                value: "high".into()
            })
        );
    }

    #[test]
    fn test_extra_equals_ignored() {
        assert_eq!(
            parse_edit_line("peakmin = 3 = 4"),
            Ok(EditCommand::Set(ParamEdit::Float(
                FloatParam::PeakMin,
                ParamValue::Number(3.0)
            )))
        );
    }
}
