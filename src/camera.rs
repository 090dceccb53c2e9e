//! # Camera identification and convolution width lookup
//!
//! The source-detection step of the registration engine smooths each exposure with a
//! kernel whose width depends on the camera that took it. The camera is identified
//! by the `INSTRUME` and `DETECTOR` keywords of the first exposure, joined with a dash
//! (e.g. `ACS-WFC`, `WFC3-UVIS`).
//!
//! The mapping is plain data: [`CONV_WIDTH_TABLE`] lists the known cameras, and any
//! identifier not found there gets [`FALLBACK_CONV_WIDTH`].
//!
//! ```rust
//! use wcsalign::camera::Camera;
//!
//! let cam = Camera::new("WFC3", "UVIS");
//! assert_eq!(cam.id(), "WFC3-UVIS");
//! assert_eq!(cam.conv_width(), 3.5);
//! assert_eq!(Camera::new("NICMOS", "NIC2").conv_width(), 2.5);
//! ```
use std::fmt;

use camino::Utf8Path;

use crate::{
    constants::{
        ConvWidth, DETECTOR_KEY, FALLBACK_CONV_WIDTH, INSTRUMENT_KEY, WIDE_FIELD_CONV_WIDTH,
    },
    header::HeaderStore,
    wcsalign_errors::WcsAlignError,
};

/// Camera identifier → convolution width (pixels).
pub static CONV_WIDTH_TABLE: &[(&str, ConvWidth)] = &[
    ("ACS-WFC", WIDE_FIELD_CONV_WIDTH),
    ("WFC3-UVIS", WIDE_FIELD_CONV_WIDTH),
    ("WFC3-IR", FALLBACK_CONV_WIDTH),
];

/// Look up the convolution width of a camera identifier, falling back to
/// [`FALLBACK_CONV_WIDTH`] for anything not in [`CONV_WIDTH_TABLE`].
pub fn conv_width_for(camera_id: &str) -> ConvWidth {
    CONV_WIDTH_TABLE
        .iter()
        .find(|(id, _)| *id == camera_id)
        .map(|(_, width)| *width)
        .unwrap_or(FALLBACK_CONV_WIDTH)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Camera {
    pub instrument: String,
    pub detector: String,
}

impl Camera {
    pub fn new(instrument: impl Into<String>, detector: impl Into<String>) -> Self {
        Camera {
            instrument: instrument.into(),
            detector: detector.into(),
        }
    }

    /// Read the camera of an exposure from its primary header.
    ///
    /// Arguments
    /// -----------------
    /// * `store`: the header store used to read the keywords.
    /// * `file`: the exposure to inspect.
    ///
    /// Return
    /// ----------
    /// * The [`Camera`], or [`WcsAlignError::MissingHeaderKeyword`] when `INSTRUME`
    ///   or `DETECTOR` is absent.
    pub fn from_header<S: HeaderStore + ?Sized>(
        store: &mut S,
        file: &Utf8Path,
    ) -> Result<Self, WcsAlignError> {
        let instrument = required_keyword(store, file, INSTRUMENT_KEY)?;
        let detector = required_keyword(store, file, DETECTOR_KEY)?;
        Ok(Camera::new(instrument, detector))
    }

    pub fn id(&self) -> String {
        format!("{}-{}", self.instrument.trim(), self.detector.trim())
    }

    pub fn conv_width(&self) -> ConvWidth {
        conv_width_for(&self.id())
    }
}

impl fmt::Display for Camera {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

fn required_keyword<S: HeaderStore + ?Sized>(
    store: &mut S,
    file: &Utf8Path,
    keyword: &str,
) -> Result<String, WcsAlignError> {
    store
        .keyword(file, keyword)?
        .ok_or_else(|| WcsAlignError::MissingHeaderKeyword {
            file: file.to_string(),
            keyword: keyword.to_string(),
        })
}
