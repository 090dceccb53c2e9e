//! # Source catalogs
//!
//! Detect sources on a single image, independently of any registration session. The camera of
//! the image selects the convolution width from the same table the registration uses; the
//! detection itself is done by a [`CatalogGenerator`].
pub mod external;

use camino::{Utf8Path, Utf8PathBuf};
use log::info;
use serde::{Deserialize, Serialize};

use crate::{
    camera::Camera,
    constants::{ConvWidth, DEFAULT_THRESHOLD},
    header::HeaderStore,
    parameters::ParamValue,
    wcsalign_errors::WcsAlignError,
};

/// Detection parameters.
///
/// # Fields
///
/// * `computesig` - estimate the sky noise from the image instead of using `skysigma`
/// * `skysigma` - sky noise, used when `computesig` is off
/// * `threshold` - detection threshold, in units of the sky noise
/// * `peakmin`, `peakmax` - bounds on the peak value of kept sources
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogParams {
    pub computesig: bool,
    pub skysigma: f64,
    pub threshold: f64,
    pub peakmin: ParamValue,
    pub peakmax: ParamValue,
}

impl Default for CatalogParams {
    fn default() -> Self {
        CatalogParams {
            computesig: true,
            skysigma: 0.0,
            threshold: DEFAULT_THRESHOLD,
            peakmin: ParamValue::Unset,
            peakmax: ParamValue::Unset,
        }
    }
}

/// What a [`CatalogGenerator`] receives.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogRequest {
    pub image: Utf8PathBuf,
    pub conv_width: ConvWidth,
    #[serde(flatten)]
    pub params: CatalogParams,
}

/// One detected source, in pixel coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub id: u64,
    pub x: f64,
    pub y: f64,
    pub flux: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceCatalog {
    pub image: Utf8PathBuf,
    pub sources: Vec<Source>,
}

impl SourceCatalog {
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Write the table as CSV with an `id,x,y,flux` header.
    pub fn write_csv<W: std::io::Write>(&self, writer: W) -> Result<(), WcsAlignError> {
        let mut wtr = csv::Writer::from_writer(writer);
        for source in &self.sources {
            wtr.serialize(source)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

pub trait CatalogGenerator {
    fn generate(&mut self, request: &CatalogRequest) -> Result<SourceCatalog, WcsAlignError>;
}

impl<G: CatalogGenerator + ?Sized> CatalogGenerator for &mut G {
    fn generate(&mut self, request: &CatalogRequest) -> Result<SourceCatalog, WcsAlignError> {
        (**self).generate(request)
    }
}

/// Detect the sources of `imfile`.
///
/// Arguments
/// -----------------
/// * `store`: header access, to read `INSTRUME` and `DETECTOR`.
/// * `generator`: the detection backend.
/// * `imfile`: the image.
/// * `params`: detection parameters.
///
/// Return
/// ----------
/// * The detected sources, or [`WcsAlignError::MissingHeaderKeyword`] if the camera cannot be
///   read, or the generator's error.
pub fn make_source_catalog<S, G>(
    store: &mut S,
    generator: &mut G,
    imfile: &Utf8Path,
    params: CatalogParams,
) -> Result<SourceCatalog, WcsAlignError>
where
    S: HeaderStore + ?Sized,
    G: CatalogGenerator + ?Sized,
{
    let camera = Camera::from_header(store, imfile)?;
    let request = CatalogRequest {
        image: imfile.to_path_buf(),
        conv_width: camera.conv_width(),
        params,
    };
    let catalog = generator.generate(&request)?;
    info!("{imfile}: {} source(s) detected ({camera})", catalog.len());
    Ok(catalog)
}
