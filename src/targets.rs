//! # Registration targets
//!
//! The three ways exposures are usually aligned, each with its own WCS label and starting
//! parameters:
//!
//! | Target                | Label                     | Defaults                                   |
//! |-----------------------|---------------------------|--------------------------------------------|
//! | [`IntraVisit`]        | `INTRAVIS`                | `fitgeometry = shift`, `searchrad = 1.0`   |
//! | [`FirstImage`]        | `FIRSTIM:<first file>`    | `fitgeometry = rscale`                     |
//! | [`ReferenceImage`]    | `REFIM:<reference image>` | `rfluxmin = 18`, `rfluxmax = 27`           |
//! | [`Custom`]            | given                     | library defaults                           |
//!
//! Labels use the base name of the file, without its directory.
//!
//! [`IntraVisit`]: RegistrationTarget::IntraVisit
//! [`FirstImage`]: RegistrationTarget::FirstImage
//! [`ReferenceImage`]: RegistrationTarget::ReferenceImage
//! [`Custom`]: RegistrationTarget::Custom
use camino::{Utf8Path, Utf8PathBuf};

use crate::{
    constants::{
        FileList, DEFAULT_REF_RFLUXMAX, DEFAULT_REF_RFLUXMIN, DEFAULT_SEARCHRAD,
        FIRSTIM_PREFIX, INTRAVISIT_WCSNAME, REFIM_PREFIX,
    },
    engine::RegistrationEngine,
    file_list::FileInput,
    header::HeaderStore,
    parameters::{FitGeometry, ParamValue, ParameterSet},
    session::{console::Console, RegistrationPlan, Session, SessionResult},
    wcsalign_errors::WcsAlignError,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationTarget {
    /// Align exposures of one visit on the first of them, shifts only.
    IntraVisit,
    /// Align exposures on the WCS of the first one.
    FirstImage,
    /// Align exposures on a drizzled, CR-cleaned reference image, optionally anchored to an
    /// absolute catalog (RA, DEC, MAG in columns 1, 2, 3).
    ReferenceImage {
        refimage: Utf8PathBuf,
        refcat: Option<Utf8PathBuf>,
    },
    Custom {
        wcsname: String,
        refimage: Option<Utf8PathBuf>,
        refcat: Option<Utf8PathBuf>,
    },
}

fn basename(path: &Utf8Path) -> &str {
    path.file_name().unwrap_or(path.as_str())
}

impl RegistrationTarget {
    /// WCS label written by this target for `files`.
    pub fn wcsname(&self, files: &[Utf8PathBuf]) -> Result<String, WcsAlignError> {
        Ok(match self {
            RegistrationTarget::IntraVisit => INTRAVISIT_WCSNAME.to_string(),
            RegistrationTarget::FirstImage => {
                let first = files
                    .first()
                    .ok_or_else(|| WcsAlignError::EmptyFileList(String::new()))?;
                format!("{FIRSTIM_PREFIX}:{}", basename(first))
            }
            RegistrationTarget::ReferenceImage { refimage, .. } => {
                format!("{REFIM_PREFIX}:{}", basename(refimage))
            }
            RegistrationTarget::Custom { wcsname, .. } => wcsname.clone(),
        })
    }

    pub fn default_params(&self) -> ParameterSet {
        let mut params = ParameterSet::default();
        match self {
            RegistrationTarget::IntraVisit => {
                params.fitgeometry = FitGeometry::Shift;
                params.searchrad = ParamValue::Number(DEFAULT_SEARCHRAD);
            }
            RegistrationTarget::ReferenceImage { .. } => {
                params.rfluxmin = ParamValue::Number(DEFAULT_REF_RFLUXMIN);
                params.rfluxmax = ParamValue::Number(DEFAULT_REF_RFLUXMAX);
            }
            RegistrationTarget::FirstImage | RegistrationTarget::Custom { .. } => {}
        }
        params
    }

    fn reference(&self) -> (Option<Utf8PathBuf>, Option<Utf8PathBuf>) {
        match self {
            RegistrationTarget::ReferenceImage { refimage, refcat } => {
                (Some(refimage.clone()), refcat.clone())
            }
            RegistrationTarget::Custom {
                refimage, refcat, ..
            } => (refimage.clone(), refcat.clone()),
            RegistrationTarget::IntraVisit | RegistrationTarget::FirstImage => (None, None),
        }
    }

    /// Build the session plan for `files`, starting from `params`.
    pub fn plan(
        &self,
        files: FileList,
        params: ParameterSet,
    ) -> Result<RegistrationPlan, WcsAlignError> {
        let wcsname = self.wcsname(&files)?;
        let (refimage, refcat) = self.reference();
        Ok(RegistrationPlan {
            files,
            refimage,
            refcat,
            wcsname,
            params,
        })
    }
}

/// Resolve `input`, then register it against `target` through `session`.
///
/// Arguments
/// -----------------
/// * `session`: the session performing the runs.
/// * `target`: where the exposures are aligned to.
/// * `input`: the exposures, as a pattern string or a list.
/// * `params`: starting parameters, usually `target.default_params()` with overrides.
///
/// Return
/// ----------
/// * The [`SessionResult`], including the label that was written or found.
pub fn register<S, E, C>(
    session: &mut Session<S, E, C>,
    target: &RegistrationTarget,
    input: &FileInput,
    params: ParameterSet,
) -> Result<SessionResult, WcsAlignError>
where
    S: HeaderStore,
    E: RegistrationEngine,
    C: Console,
{
    let files = input.resolve()?;
    session.run(target.plan(files, params)?)
}

/// Align the exposures of one visit on the first of them.
pub fn intra_visit<S, E, C>(
    session: &mut Session<S, E, C>,
    input: &FileInput,
) -> Result<SessionResult, WcsAlignError>
where
    S: HeaderStore,
    E: RegistrationEngine,
    C: Console,
{
    let target = RegistrationTarget::IntraVisit;
    let params = target.default_params();
    register(session, &target, input, params)
}

/// Align exposures on the WCS of the first one.
pub fn to_first_image<S, E, C>(
    session: &mut Session<S, E, C>,
    input: &FileInput,
) -> Result<SessionResult, WcsAlignError>
where
    S: HeaderStore,
    E: RegistrationEngine,
    C: Console,
{
    let target = RegistrationTarget::FirstImage;
    let params = target.default_params();
    register(session, &target, input, params)
}

/// Align exposures on a reference image, optionally anchored to a reference catalog.
pub fn to_reference_image<S, E, C>(
    session: &mut Session<S, E, C>,
    input: &FileInput,
    refimage: &Utf8Path,
    refcat: Option<&Utf8Path>,
) -> Result<SessionResult, WcsAlignError>
where
    S: HeaderStore,
    E: RegistrationEngine,
    C: Console,
{
    let target = RegistrationTarget::ReferenceImage {
        refimage: refimage.to_path_buf(),
        refcat: refcat.map(Utf8Path::to_path_buf),
    };
    let params = target.default_params();
    register(session, &target, input, params)
}
