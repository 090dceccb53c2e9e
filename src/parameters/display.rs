//! # Parameter summary display
//!
//! Renders a [`ParameterSet`] for the operator between registration previews. Formatting is
//! a pure function of the [`ParamValue`] tag, so it never fails:
//!
//! - `Number(v)` uses the requested precision (one decimal in the summary), e.g. `20.0`
//! - `Unset` renders as `None`
//! - `NotANumber` renders as `NaN`
//!
//! ```rust
//! use wcsalign::parameters::{ParamValue, ParameterSet};
//!
//! assert_eq!(format!("{:.1}", ParamValue::Number(20.0)), "20.0");
//! assert_eq!(format!("{:.1}", ParamValue::Unset), "None");
//! assert_eq!(format!("{:.1}", ParamValue::NotANumber), "NaN");
//!
//! let summary = ParameterSet::default().summary().to_string();
//! assert!(summary.contains("rfluxmin    = None"));
//! ```
use std::fmt;

use super::{FloatParam, ParamValue, ParameterSet, FITGEOMETRY_NAME};

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Unset => f.write_str("None"),
            ParamValue::NotANumber => f.write_str("NaN"),
            ParamValue::Number(v) => match f.precision() {
                Some(p) => write!(f, "{v:.p$}"),
                None => write!(f, "{v}"),
            },
        }
    }
}

/// Short description printed next to each field.
fn describe(param: FloatParam) -> &'static str {
    match param {
        FloatParam::RFluxMin => "min mag for refcat sources",
        FloatParam::RFluxMax => "max mag for refcat sources",
        FloatParam::SearchRad => "matching search radius (arcsec)",
        FloatParam::PeakMin => "min peak flux for good sources",
        FloatParam::PeakMax => "max peak flux for good sources",
        FloatParam::Threshold => "detection threshold in sigma",
    }
}

/// Display adaptor borrowing a [`ParameterSet`]; one `name = value  # description` line per field.
pub struct ParameterSummary<'a> {
    params: &'a ParameterSet,
    precision: usize,
}

impl<'a> ParameterSummary<'a> {
    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }
}

impl fmt::Display for ParameterSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = self.precision;
        for param in FloatParam::ALL {
            writeln!(
                f,
                "   {:<11} = {:.p$}  # {}",
                param.name(),
                self.params.get(param),
                describe(param)
            )?;
        }
        writeln!(
            f,
            "   {:<11} = {}  # fitting geometry [shift,rscale]",
            FITGEOMETRY_NAME, self.params.fitgeometry
        )
    }
}

impl ParameterSet {
    pub fn summary(&self) -> ParameterSummary<'_> {
        ParameterSummary {
            params: self,
            precision: 1,
        }
    }
}

#[cfg(test)]
mod test_display {
    use super::*;

    #[test]
    fn test_value_rendering() {
        assert_eq!(format!("{:.1}", ParamValue::Number(3.27)), "3.3");
        assert_eq!(format!("{}", ParamValue::Number(0.5)), "0.5");
        assert_eq!(format!("{:.3}", ParamValue::Unset), "None");
        assert_eq!(format!("{:.1}", ParamValue::from(f64::NAN)), "NaN");
    }

    #[test]
    fn test_summary_lines() {
        let mut params = ParameterSet::default();
        params.rfluxmin = ParamValue::Number(20.0);
        params.peakmax = ParamValue::NotANumber;

        let text = params.summary().to_string();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 7);
        assert_eq!(
            lines[0],
            "   rfluxmin    = 20.0  # min mag for refcat sources"
        );
        assert!(lines[1].contains("rfluxmax    = None"));
        assert!(lines[4].contains("peakmax     = NaN"));
        assert!(lines[6].contains("fitgeometry = rscale"));
    }

    #[test]
    fn test_summary_precision() {
        let mut params = ParameterSet::default();
        params.searchrad = ParamValue::Number(0.25);
        let text = params.summary().with_precision(2).to_string();
        assert!(text.contains("searchrad   = 0.25"));
    }
}
