//! # Header store
//!
//! The registration session never opens image files itself. It talks to a [`HeaderStore`],
//! which reads primary-header keywords (camera identification, existing WCS labels) and
//! performs the bulk removal of alternate WCS solutions.
//!
//! ## Implementations
//!
//! - [`memory::MemoryHeaderStore`] – in-memory headers, for dry runs and tests.
//! - `fits::FitsHeaderStore` – FITS files through `fitsio` (cargo feature `fits`).
//!
//! ## Alternate WCS keys
//!
//! A FITS header can carry up to 26 alternate WCS solutions next to the primary one, each
//! keyword suffixed with a letter `A`–`Z` (`CRVAL1A`, `WCSNAMEB`, …). The key `O` holds the
//! original solution written before any registration. [`split_alt_wcs_key`] recognizes these
//! keywords; [`clear_alt_wcs`] restores the primary solution from `O` and drops every other
//! alternate.
//!
//! ## Resource handling
//!
//! Implementations must open and release file handles inside each call: the session re-reads
//! headers between registration runs, after the engine may have rewritten them.
pub mod memory;

#[cfg(feature = "fits")]
pub mod fits;

use std::sync::LazyLock;

use camino::Utf8Path;
use log::{debug, info};
use regex::Regex;

use crate::{
    constants::{ORIGINAL_WCS_KEY, WCSNAME_KEY},
    wcsalign_errors::WcsAlignError,
};

/// Kind of value stored under a WCS keyword, used when copying keys between solutions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    Text,
    Real,
    Integer,
}

/// Primary WCS keywords that have per-solution alternates.
pub static WCS_BASE_KEYS: &[(&str, KeyKind)] = &[
    ("WCSNAME", KeyKind::Text),
    ("WCSAXES", KeyKind::Integer),
    ("CTYPE1", KeyKind::Text),
    ("CTYPE2", KeyKind::Text),
    ("CUNIT1", KeyKind::Text),
    ("CUNIT2", KeyKind::Text),
    ("CRPIX1", KeyKind::Real),
    ("CRPIX2", KeyKind::Real),
    ("CRVAL1", KeyKind::Real),
    ("CRVAL2", KeyKind::Real),
    ("CDELT1", KeyKind::Real),
    ("CDELT2", KeyKind::Real),
    ("CD1_1", KeyKind::Real),
    ("CD1_2", KeyKind::Real),
    ("CD2_1", KeyKind::Real),
    ("CD2_2", KeyKind::Real),
    ("PC1_1", KeyKind::Real),
    ("PC1_2", KeyKind::Real),
    ("PC2_1", KeyKind::Real),
    ("PC2_2", KeyKind::Real),
    ("LONPOLE", KeyKind::Real),
    ("LATPOLE", KeyKind::Real),
    ("RADESYS", KeyKind::Text),
    ("EQUINOX", KeyKind::Real),
];

static ALT_WCS_KEY: LazyLock<Regex> = LazyLock::new(|| {
    let bases = WCS_BASE_KEYS
        .iter()
        .map(|(base, _)| regex::escape(base))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!("^({bases})([A-Z])$")).expect("alternate WCS keyword pattern is valid")
});

/// Split an alternate WCS keyword into its primary keyword and solution letter.
///
/// ```rust
/// use wcsalign::header::split_alt_wcs_key;
///
/// assert_eq!(split_alt_wcs_key("CRVAL1A"), Some(("CRVAL1", 'A')));
/// assert_eq!(split_alt_wcs_key("WCSNAMEO"), Some(("WCSNAME", 'O')));
/// assert_eq!(split_alt_wcs_key("CRVAL1"), None);
/// assert_eq!(split_alt_wcs_key("EXPTIME"), None);
/// ```
pub fn split_alt_wcs_key(key: &str) -> Option<(&str, char)> {
    let caps = ALT_WCS_KEY.captures(key)?;
    let base = caps.get(1)?.as_str();
    let letter = caps.get(2)?.as_str().chars().next()?;
    Some((base, letter))
}

/// Every `WCSNAME` keyword a header may carry: the primary one, then `WCSNAMEA`..`WCSNAMEZ`.
pub fn wcsname_keys() -> impl Iterator<Item = String> {
    std::iter::once(WCSNAME_KEY.to_string())
        .chain(('A'..='Z').map(|letter| format!("{WCSNAME_KEY}{letter}")))
}

/// Access to image headers.
pub trait HeaderStore {
    /// Read a primary-header keyword as text, `None` if absent.
    fn keyword(&mut self, file: &Utf8Path, key: &str) -> Result<Option<String>, WcsAlignError>;

    /// Restore the primary WCS from the original (`O`) solution and remove every other
    /// alternate WCS, in each header unit that carries a `WCSNAME`.
    ///
    /// Return
    /// ----------
    /// * The number of header units cleaned.
    fn clear_alt_wcs(&mut self, file: &Utf8Path) -> Result<usize, WcsAlignError>;

    /// Labels of all WCS solutions stored in the primary header.
    fn wcs_names(&mut self, file: &Utf8Path) -> Result<Vec<String>, WcsAlignError> {
        let mut names = Vec::new();
        for key in wcsname_keys() {
            if let Some(name) = self.keyword(file, &key)? {
                names.push(name.trim().to_string());
            }
        }
        Ok(names)
    }
}

impl<S: HeaderStore + ?Sized> HeaderStore for &mut S {
    fn keyword(&mut self, file: &Utf8Path, key: &str) -> Result<Option<String>, WcsAlignError> {
        (**self).keyword(file, key)
    }

    fn clear_alt_wcs(&mut self, file: &Utf8Path) -> Result<usize, WcsAlignError> {
        (**self).clear_alt_wcs(file)
    }

    fn wcs_names(&mut self, file: &Utf8Path) -> Result<Vec<String>, WcsAlignError> {
        (**self).wcs_names(file)
    }
}

/// Pre-clean any alternate WCS solutions from a list of exposures.
///
/// Arguments
/// -----------------
/// * `store`: header store performing the update.
/// * `files`: exposures to clean, in order.
///
/// Return
/// ----------
/// * Total number of header units cleaned, or the first store error.
pub fn clear_alt_wcs<S, P>(store: &mut S, files: &[P]) -> Result<usize, WcsAlignError>
where
    S: HeaderStore + ?Sized,
    P: AsRef<Utf8Path>,
{
    let mut cleaned = 0;
    for file in files {
        let file = file.as_ref();
        let n = store.clear_alt_wcs(file)?;
        debug!("{file}: removed alternate WCS from {n} header unit(s)");
        cleaned += n;
    }
    info!(
        "Cleared alternate WCS solutions in {} file(s), {cleaned} header unit(s)",
        files.len()
    );
    Ok(cleaned)
}

/// Whether an alternate key must be dropped by [`clear_alt_wcs`].
pub(crate) fn is_removable_alt(key: &str) -> bool {
    matches!(split_alt_wcs_key(key), Some((_, letter)) if letter != ORIGINAL_WCS_KEY)
}
