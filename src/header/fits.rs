//! FITS-backed [`HeaderStore`] using `fitsio`.
//!
//! Each call opens the file, works on it, and drops the handle before returning, which
//! flushes and closes it.
use camino::Utf8Path;
use fitsio::{errors::Error as FitsioError, hdu::FitsHdu, FitsFile};
use log::debug;

use super::{HeaderStore, KeyKind, WCS_BASE_KEYS};
use crate::{
    constants::{ORIGINAL_WCS_KEY, WCSNAME_KEY},
    wcsalign_errors::WcsAlignError,
};

/// cfitsio status for a keyword that does not exist.
const KEY_NO_EXIST: i32 = 202;

#[derive(Debug, Clone, Copy, Default)]
pub struct FitsHeaderStore;

impl FitsHeaderStore {
    pub fn new() -> Self {
        FitsHeaderStore
    }
}

fn is_missing_key(err: &FitsioError) -> bool {
    matches!(err, FitsioError::Fits(e) if e.status == KEY_NO_EXIST)
}

fn read_optional(
    hdu: &FitsHdu,
    fptr: &mut FitsFile,
    key: &str,
) -> Result<Option<String>, WcsAlignError> {
    match hdu.read_key::<String>(fptr, key) {
        Ok(value) => Ok(Some(value)),
        Err(e) if is_missing_key(&e) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn has_key(hdu: &FitsHdu, fptr: &mut FitsFile, key: &str) -> Result<bool, WcsAlignError> {
    Ok(read_optional(hdu, fptr, key)?.is_some())
}

/// Copy `<base>O` into `<base>`, keeping the value type of the keyword.
fn restore_key(
    hdu: &FitsHdu,
    fptr: &mut FitsFile,
    base: &str,
    kind: KeyKind,
) -> Result<(), WcsAlignError> {
    let original = format!("{base}{ORIGINAL_WCS_KEY}");
    if !has_key(hdu, fptr, &original)? {
        return Ok(());
    }
    match kind {
        KeyKind::Text => {
            let value: String = hdu.read_key(fptr, &original)?;
            hdu.write_key(fptr, base, value)?;
        }
        KeyKind::Real => {
            let value: f64 = hdu.read_key(fptr, &original)?;
            hdu.write_key(fptr, base, value)?;
        }
        KeyKind::Integer => {
            let value: i64 = hdu.read_key(fptr, &original)?;
            hdu.write_key(fptr, base, value)?;
        }
    }
    Ok(())
}

/// Delete a keyword from the current header unit.
fn delete_key(fptr: &mut FitsFile, key: &str) -> Result<(), WcsAlignError> {
    let c_key = std::ffi::CString::new(key)
        .map_err(|e| WcsAlignError::Utf8PathError(e.to_string()))?;
    let mut status = 0;
    unsafe {
        fitsio::sys::ffdkey(fptr.as_raw(), c_key.as_ptr(), &mut status);
    }
    fitsio::errors::check_status(status)?;
    Ok(())
}

fn clean_hdu(hdu: &FitsHdu, fptr: &mut FitsFile) -> Result<bool, WcsAlignError> {
    if !has_key(hdu, fptr, WCSNAME_KEY)? {
        return Ok(false);
    }

    for (base, kind) in WCS_BASE_KEYS {
        restore_key(hdu, fptr, base, *kind)?;
    }

    for letter in ('A'..='Z').filter(|l| *l != ORIGINAL_WCS_KEY) {
        for (base, _) in WCS_BASE_KEYS {
            let key = format!("{base}{letter}");
            // reading also makes this unit current for the raw delete below
            if has_key(hdu, fptr, &key)? {
                delete_key(fptr, &key)?;
            }
        }
    }
    Ok(true)
}

impl HeaderStore for FitsHeaderStore {
    fn keyword(&mut self, file: &Utf8Path, key: &str) -> Result<Option<String>, WcsAlignError> {
        if !file.exists() {
            return Err(WcsAlignError::HeaderNotFound(file.to_string()));
        }
        let mut fptr = FitsFile::open(file.as_std_path())?;
        let hdu = fptr.primary_hdu()?;
        read_optional(&hdu, &mut fptr, key)
    }

    fn clear_alt_wcs(&mut self, file: &Utf8Path) -> Result<usize, WcsAlignError> {
        if !file.exists() {
            return Err(WcsAlignError::HeaderNotFound(file.to_string()));
        }
        let mut fptr = FitsFile::edit(file.as_std_path())?;

        let mut cleaned = 0;
        for index in 0..fptr.num_hdus()? {
            let hdu = fptr.hdu(index)?;
            if clean_hdu(&hdu, &mut fptr)? {
                debug!("{file}[{index}]: alternate WCS removed");
                cleaned += 1;
            }
        }
        Ok(cleaned)
    }
}
