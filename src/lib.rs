//! Interactive WCS registration of space-telescope exposures.
//!
//! `wcsalign` drives an external tweakreg-style registration toolkit: it picks the source
//! detection kernel width from the camera, lets an operator tune the fit parameters over
//! preview runs, and commits a single WCS solution under a label. Helpers remove alternate
//! WCS solutions from headers and build source catalogs through the same toolkit.
pub mod bridge;
pub mod camera;
pub mod catalog;
pub mod config;
pub mod constants;
pub mod engine;
pub mod file_list;
pub mod header;
pub mod log_setup;
pub mod parameters;
pub mod session;
pub mod targets;
pub mod wcsalign_errors;

pub use session::{RegistrationPlan, Session, SessionOptions, SessionResult};
pub use wcsalign_errors::WcsAlignError;
