//! # Constants and type definitions for wcsalign
//!
//! This module centralizes the **fixed registration settings**, the **default WCS labels**,
//! and the **common type aliases** used throughout the crate.
//!
//! ## Overview
//!
//! - Convolution widths used by source detection, per camera family
//! - The tweakreg settings that are never exposed for editing (reference catalog
//!   columns, matching tolerance, minimum object count)
//! - WCS labels written by the registration targets
//! - Header keywords read from the first exposure

use camino::Utf8PathBuf;

// -------------------------------------------------------------------------------------------------
// Convolution widths
// -------------------------------------------------------------------------------------------------

/// Convolution kernel width (pixels) for the wide-field optical detectors
pub const WIDE_FIELD_CONV_WIDTH: f64 = 3.5;

/// Convolution kernel width (pixels) for every other camera, including unknown ones
pub const FALLBACK_CONV_WIDTH: f64 = 2.5;

// -------------------------------------------------------------------------------------------------
// Fixed tweakreg settings
// -------------------------------------------------------------------------------------------------

/// Column of the reference catalog holding the first sky coordinate (RA)
pub const REF_X_COL: u32 = 1;

/// Column of the reference catalog holding the second sky coordinate (DEC)
pub const REF_Y_COL: u32 = 2;

/// Column of the reference catalog holding the source magnitude
pub const REF_FLUX_COL: u32 = 3;

pub const REF_XY_UNITS: &str = "degrees";
pub const REF_FLUX_UNITS: &str = "mag";

/// Minimum separation between sources (arcsec)
pub const SEPARATION: f64 = 0.0;

/// Matching tolerance (arcsec)
pub const TOLERANCE: f64 = 1.5;

/// Minimum number of matched objects for a fit
pub const MIN_OBJ: u32 = 10;

/// Default search radius for cross-matching (arcsec)
pub const DEFAULT_SEARCHRAD: f64 = 1.0;

/// Default detection threshold (sigma)
pub const DEFAULT_THRESHOLD: f64 = 4.0;

/// Default reference magnitude bounds when aligning to a reference image
pub const DEFAULT_REF_RFLUXMIN: f64 = 18.0;
pub const DEFAULT_REF_RFLUXMAX: f64 = 27.0;

// -------------------------------------------------------------------------------------------------
// WCS labels
// -------------------------------------------------------------------------------------------------

/// Scratch label used by preview runs, never persisted
pub const PREVIEW_WCSNAME: &str = "TWEAK";

/// Label used when no registration target names one
pub const DEFAULT_WCSNAME: &str = "SNDRIZZLE";

pub const INTRAVISIT_WCSNAME: &str = "INTRAVIS";
pub const FIRSTIM_PREFIX: &str = "FIRSTIM";
pub const REFIM_PREFIX: &str = "REFIM";

/// Alternate WCS key holding the original (pre-registration) solution
pub const ORIGINAL_WCS_KEY: char = 'O';

// -------------------------------------------------------------------------------------------------
// Header keywords
// -------------------------------------------------------------------------------------------------

pub const INSTRUMENT_KEY: &str = "INSTRUME";
pub const DETECTOR_KEY: &str = "DETECTOR";
pub const WCSNAME_KEY: &str = "WCSNAME";

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Ordered list of exposures handed to the registration engine
pub type FileList = Vec<Utf8PathBuf>;

/// Convolution kernel width in pixels
pub type ConvWidth = f64;
