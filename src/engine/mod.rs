//! # Registration engine boundary
//!
//! Source detection, cross-matching and the shift/rotation/scale fit all happen outside
//! this crate. A [`RegistrationEngine`] receives a [`RegistrationRequest`] describing one run
//! and either only reports the fit ([`RunMode::Preview`]) or also writes the new WCS under a
//! label ([`RunMode::Commit`]).
//!
//! ## Request layout
//!
//! ```text
//! RegistrationRequest
//! ├── files, refimage, refcat
//! ├── mode          Preview | Commit { wcsname }   (not serialized)
//! ├── updatehdr     true for commits
//! ├── wcsname       commit label, or TWEAK for previews
//! ├── params        ParameterSet (operator-tunable)
//! ├── conv_width    from the camera table
//! └── settings      fixed tweakreg settings (catalog columns, tolerance, plots, …)
//! ```
//!
//! The request serializes to the JSON object read by the bridge of
//! [`external::ExternalEngine`].
pub mod external;

use camino::Utf8PathBuf;
use serde::Serialize;

use crate::{
    constants::{
        ConvWidth, FileList, MIN_OBJ, PREVIEW_WCSNAME, REF_FLUX_COL, REF_FLUX_UNITS, REF_XY_UNITS,
        REF_X_COL, REF_Y_COL, SEPARATION, TOLERANCE,
    },
    parameters::ParameterSet,
    wcsalign_errors::WcsAlignError,
};

/// Whether a run persists its WCS solution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunMode {
    /// Compute the fit and diagnostics; headers are left untouched.
    Preview,
    /// Compute the fit and write it under `wcsname`.
    Commit { wcsname: String },
}

impl RunMode {
    pub fn is_commit(&self) -> bool {
        matches!(self, RunMode::Commit { .. })
    }

    /// Label handed to the engine: the scratch label for previews.
    pub fn wcsname(&self) -> &str {
        match self {
            RunMode::Preview => PREVIEW_WCSNAME,
            RunMode::Commit { wcsname } => wcsname,
        }
    }
}

/// Settings of a run that the operator never edits.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FixedSettings {
    pub refxcol: u32,
    pub refycol: u32,
    pub refxyunits: &'static str,
    pub rfluxcol: u32,
    pub rfluxunits: &'static str,
    pub separation: f64,
    pub tolerance: f64,
    pub minobj: u32,
    /// Remove intermediate files after the run.
    pub clean: bool,
    pub see2dplot: bool,
    pub residplot: &'static str,
}

impl FixedSettings {
    /// Settings for a run in `mode`; `debug` keeps the intermediate files.
    pub fn for_mode(mode: &RunMode, debug: bool) -> Self {
        let preview = !mode.is_commit();
        FixedSettings {
            refxcol: REF_X_COL,
            refycol: REF_Y_COL,
            refxyunits: REF_XY_UNITS,
            rfluxcol: REF_FLUX_COL,
            rfluxunits: REF_FLUX_UNITS,
            separation: SEPARATION,
            tolerance: TOLERANCE,
            minobj: MIN_OBJ,
            clean: !debug,
            see2dplot: preview,
            residplot: if preview { "both" } else { "No plot" },
        }
    }
}

/// One registration run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegistrationRequest {
    pub files: FileList,
    pub refimage: Option<Utf8PathBuf>,
    pub refcat: Option<Utf8PathBuf>,
    #[serde(skip)]
    pub mode: RunMode,
    /// Mirrors `mode` for the bridge: `true` only for commits.
    pub updatehdr: bool,
    pub wcsname: String,
    pub params: ParameterSet,
    pub conv_width: ConvWidth,
    pub settings: FixedSettings,
}

impl RegistrationRequest {
    /// Build a request, deriving the header-update flag, the label and the fixed
    /// settings from `mode`.
    pub fn new(
        files: FileList,
        refimage: Option<Utf8PathBuf>,
        refcat: Option<Utf8PathBuf>,
        mode: RunMode,
        params: ParameterSet,
        conv_width: ConvWidth,
        debug: bool,
    ) -> Self {
        RegistrationRequest {
            files,
            refimage,
            refcat,
            updatehdr: mode.is_commit(),
            wcsname: mode.wcsname().to_string(),
            settings: FixedSettings::for_mode(&mode, debug),
            mode,
            params,
            conv_width,
        }
    }
}

/// Diagnostics produced by one run, shown to the operator between previews.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegistrationReport {
    pub diagnostics: Vec<String>,
}

pub trait RegistrationEngine {
    /// Run the registration described by `request`.
    ///
    /// Implementations must not persist anything when `request.mode` is
    /// [`RunMode::Preview`]. Failures (non-convergence, I/O) are returned as is; the caller
    /// does not retry.
    fn register(
        &mut self,
        request: &RegistrationRequest,
    ) -> Result<RegistrationReport, WcsAlignError>;
}

impl<E: RegistrationEngine + ?Sized> RegistrationEngine for &mut E {
    fn register(
        &mut self,
        request: &RegistrationRequest,
    ) -> Result<RegistrationReport, WcsAlignError> {
        (**self).register(request)
    }
}
