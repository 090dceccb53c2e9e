//! # Registration parameter model
//!
//! This module defines the **mutable parameter set** tuned by the operator during an
//! interactive registration session, and the value types it is made of.
//!
//! ## Public API
//!
//! - [`ParamValue`]: a tagged float, `Unset | NotANumber | Number(f64)`. `Unset` lets the
//!   registration engine apply its own default.
//! - [`FitGeometry`]: the fitting geometry (`shift`, `rscale`, `general`), keeping any other
//!   raw string the operator typed.
//! - [`FloatParam`]: the six editable float fields, addressable by name.
//! - [`ParameterSet`]: the full set handed to each registration run.
//!
//! Edits arrive through the `name = value` grammar of [`edit`], and the set is shown to the
//! operator through the renderers of [`display`].
//!
//! ## Invariants
//!
//! Every field is independently nullable; no cross-field validation happens here. The
//! registration engine validates on use.
pub mod display;
pub mod edit;

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::constants::{DEFAULT_SEARCHRAD, DEFAULT_THRESHOLD};
use edit::ParamEdit;

/// Optional float parameter.
///
/// Variants
/// -----------------
/// * `Unset` – no value; the registration engine uses its default. Rendered as `None`.
/// * `NotANumber` – an explicit not-a-number sentinel. Rendered as `NaN`.
/// * `Number` – a finite or infinite float.
///
/// Converting an `f64` NaN with [`From`] always yields `NotANumber`, so `Number` never holds NaN.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(from = "Option<f64>")]
pub enum ParamValue {
    #[default]
    Unset,
    NotANumber,
    Number(f64),
}

impl ParamValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Unset => None,
            ParamValue::NotANumber => Some(f64::NAN),
            ParamValue::Number(v) => Some(*v),
        }
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, ParamValue::Unset)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        if value.is_nan() {
            ParamValue::NotANumber
        } else {
            ParamValue::Number(value)
        }
    }
}

impl From<Option<f64>> for ParamValue {
    fn from(value: Option<f64>) -> Self {
        value.map_or(ParamValue::Unset, ParamValue::from)
    }
}

// JSON has no NaN literal, the bridge receives the string "nan" instead.
impl Serialize for ParamValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ParamValue::Unset => serializer.serialize_none(),
            ParamValue::NotANumber => serializer.serialize_str("nan"),
            ParamValue::Number(v) => serializer.serialize_f64(*v),
        }
    }
}

/// Geometry of the fit computed by the registration engine.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FitGeometry {
    Shift,
    #[default]
    RScale,
    General,
    /// Any other string; the engine decides whether it is valid.
    Other(String),
}

impl FitGeometry {
    pub fn as_str(&self) -> &str {
        match self {
            FitGeometry::Shift => "shift",
            FitGeometry::RScale => "rscale",
            FitGeometry::General => "general",
            FitGeometry::Other(raw) => raw,
        }
    }
}

impl FromStr for FitGeometry {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "shift" => FitGeometry::Shift,
            "rscale" => FitGeometry::RScale,
            "general" => FitGeometry::General,
            other => FitGeometry::Other(other.to_string()),
        })
    }
}

impl From<&str> for FitGeometry {
    fn from(value: &str) -> Self {
        match value.parse() {
            Ok(geometry) => geometry,
            Err(never) => match never {},
        }
    }
}

impl fmt::Display for FitGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for FitGeometry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FitGeometry {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(FitGeometry::from(raw.as_str()))
    }
}

/// The six float fields an operator can edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FloatParam {
    RFluxMin,
    RFluxMax,
    SearchRad,
    PeakMin,
    PeakMax,
    Threshold,
}

impl FloatParam {
    pub const ALL: [FloatParam; 6] = [
        FloatParam::RFluxMin,
        FloatParam::RFluxMax,
        FloatParam::SearchRad,
        FloatParam::PeakMin,
        FloatParam::PeakMax,
        FloatParam::Threshold,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            FloatParam::RFluxMin => "rfluxmin",
            FloatParam::RFluxMax => "rfluxmax",
            FloatParam::SearchRad => "searchrad",
            FloatParam::PeakMin => "peakmin",
            FloatParam::PeakMax => "peakmax",
            FloatParam::Threshold => "threshold",
        }
    }
}

impl FromStr for FloatParam {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FloatParam::ALL
            .into_iter()
            .find(|param| param.name() == s)
            .ok_or(())
    }
}

/// Name of the only non-float editable field.
pub const FITGEOMETRY_NAME: &str = "fitgeometry";

/// Parameters of one registration run.
///
/// # Fields
///
/// * `rfluxmin`, `rfluxmax` - magnitude bounds for reference catalog sources
/// * `searchrad` - cross-matching search radius (arcsec)
/// * `peakmin`, `peakmax` - peak flux bounds for detected sources
/// * `threshold` - detection threshold (sigma)
/// * `fitgeometry` - fit geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterSet {
    pub rfluxmin: ParamValue,
    pub rfluxmax: ParamValue,
    pub searchrad: ParamValue,
    pub peakmin: ParamValue,
    pub peakmax: ParamValue,
    pub threshold: ParamValue,
    pub fitgeometry: FitGeometry,
}

impl Default for ParameterSet {
    fn default() -> Self {
        ParameterSet {
            rfluxmin: ParamValue::Unset,
            rfluxmax: ParamValue::Unset,
            searchrad: ParamValue::Number(DEFAULT_SEARCHRAD),
            peakmin: ParamValue::Unset,
            peakmax: ParamValue::Unset,
            threshold: ParamValue::Number(DEFAULT_THRESHOLD),
            fitgeometry: FitGeometry::RScale,
        }
    }
}

impl ParameterSet {
    pub fn get(&self, param: FloatParam) -> ParamValue {
        match param {
            FloatParam::RFluxMin => self.rfluxmin,
            FloatParam::RFluxMax => self.rfluxmax,
            FloatParam::SearchRad => self.searchrad,
            FloatParam::PeakMin => self.peakmin,
            FloatParam::PeakMax => self.peakmax,
            FloatParam::Threshold => self.threshold,
        }
    }

    fn slot_mut(&mut self, param: FloatParam) -> &mut ParamValue {
        match param {
            FloatParam::RFluxMin => &mut self.rfluxmin,
            FloatParam::RFluxMax => &mut self.rfluxmax,
            FloatParam::SearchRad => &mut self.searchrad,
            FloatParam::PeakMin => &mut self.peakmin,
            FloatParam::PeakMax => &mut self.peakmax,
            FloatParam::Threshold => &mut self.threshold,
        }
    }

    pub fn set(&mut self, param: FloatParam, value: ParamValue) {
        *self.slot_mut(param) = value;
    }

    /// Apply one parsed edit. Exactly one field changes.
    pub fn apply(&mut self, edit: ParamEdit) {
        match edit {
            ParamEdit::Float(param, value) => self.set(param, value),
            ParamEdit::FitGeometry(geometry) => self.fitgeometry = geometry,
        }
    }
}

/// Partial parameter values layered over a target's defaults (configuration file, command
/// line). Absent fields leave the underlying value alone; a `null` field unsets it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ParameterOverrides {
    #[serde(deserialize_with = "present_value")]
    pub rfluxmin: Option<ParamValue>,
    #[serde(deserialize_with = "present_value")]
    pub rfluxmax: Option<ParamValue>,
    #[serde(deserialize_with = "present_value")]
    pub searchrad: Option<ParamValue>,
    #[serde(deserialize_with = "present_value")]
    pub peakmin: Option<ParamValue>,
    #[serde(deserialize_with = "present_value")]
    pub peakmax: Option<ParamValue>,
    #[serde(deserialize_with = "present_value")]
    pub threshold: Option<ParamValue>,
    pub fitgeometry: Option<FitGeometry>,
}

/// A field that is present overrides, even when it is `null` ([`ParamValue::Unset`]).
fn present_value<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<ParamValue>, D::Error> {
    ParamValue::deserialize(deserializer).map(Some)
}

impl ParameterOverrides {
    /// Overrides from `other` win over those of `self`.
    pub fn merged_with(mut self, other: &ParameterOverrides) -> Self {
        for param in FloatParam::ALL {
            if let Some(value) = other.get(param) {
                *self.slot_mut(param) = Some(value);
            }
        }
        if let Some(geometry) = &other.fitgeometry {
            self.fitgeometry = Some(geometry.clone());
        }
        self
    }

    pub fn get(&self, param: FloatParam) -> Option<ParamValue> {
        match param {
            FloatParam::RFluxMin => self.rfluxmin,
            FloatParam::RFluxMax => self.rfluxmax,
            FloatParam::SearchRad => self.searchrad,
            FloatParam::PeakMin => self.peakmin,
            FloatParam::PeakMax => self.peakmax,
            FloatParam::Threshold => self.threshold,
        }
    }

    fn slot_mut(&mut self, param: FloatParam) -> &mut Option<ParamValue> {
        match param {
            FloatParam::RFluxMin => &mut self.rfluxmin,
            FloatParam::RFluxMax => &mut self.rfluxmax,
            FloatParam::SearchRad => &mut self.searchrad,
            FloatParam::PeakMin => &mut self.peakmin,
            FloatParam::PeakMax => &mut self.peakmax,
            FloatParam::Threshold => &mut self.threshold,
        }
    }

    pub fn apply_to(&self, params: &mut ParameterSet) {
        for param in FloatParam::ALL {
            if let Some(value) = self.get(param) {
                params.set(param, value);
            }
        }
        if let Some(geometry) = &self.fitgeometry {
            params.fitgeometry = geometry.clone();
        }
    }
}
