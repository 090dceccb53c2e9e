//! # Configuration file
//!
//! A YAML file with every field optional:
//!
//! ```yaml
//! engine:
//!   program: python
//!   args: [-m, tweakreg_bridge]
//! catalog:
//!   program: catalog-bridge
//! log_level: debug
//! log_dir: logs
//! initial_preview: true
//! parameters:
//!   threshold: 5.0
//!   peakmax: 50000
//!   fitgeometry: general
//! ```
//!
//! `parameters` overrides the starting values of every registration target; values given on
//! the command line take precedence over it.
use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    bridge::BridgeCommand, parameters::ParameterOverrides, wcsalign_errors::WcsAlignError,
};

pub const DEFAULT_ENGINE_PROGRAM: &str = "tweakreg-bridge";
pub const DEFAULT_CATALOG_PROGRAM: &str = "catalog-bridge";
pub const DEFAULT_LOG_LEVEL: &str = "info";

fn default_engine() -> BridgeCommand {
    BridgeCommand::new(DEFAULT_ENGINE_PROGRAM)
}

fn default_catalog() -> BridgeCommand {
    BridgeCommand::new(DEFAULT_CATALOG_PROGRAM)
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WcsAlignConfig {
    #[serde(default = "default_engine")]
    pub engine: BridgeCommand,
    #[serde(default = "default_catalog")]
    pub catalog: BridgeCommand,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Also write the log to files in this directory.
    #[serde(default)]
    pub log_dir: Option<Utf8PathBuf>,
    #[serde(default)]
    pub initial_preview: bool,
    #[serde(default, skip_serializing)]
    pub parameters: ParameterOverrides,
}

impl Default for WcsAlignConfig {
    fn default() -> Self {
        WcsAlignConfig {
            engine: default_engine(),
            catalog: default_catalog(),
            log_level: default_log_level(),
            log_dir: None,
            initial_preview: false,
            parameters: ParameterOverrides::default(),
        }
    }
}

impl WcsAlignConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, WcsAlignError> {
        if yaml.trim().is_empty() {
            return Ok(WcsAlignConfig::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }

    pub fn load(path: &Utf8Path) -> Result<Self, WcsAlignError> {
        let yaml = fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&yaml)?;
        debug!("Configuration loaded from {path}");
        Ok(config)
    }

    /// Load `path` if given, the defaults otherwise.
    pub fn load_or_default(path: Option<&Utf8Path>) -> Result<Self, WcsAlignError> {
        path.map_or_else(|| Ok(WcsAlignConfig::default()), Self::load)
    }
}

#[cfg(test)]
mod test_config {
    use super::*;
    use crate::parameters::{FitGeometry, ParamValue, ParameterSet};

    #[test]
    fn test_defaults() {
        let config = WcsAlignConfig::from_yaml_str("").unwrap();
        assert_eq!(config, WcsAlignConfig::default());
        assert_eq!(config.engine.program, "tweakreg-bridge");
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_partial_file() {
        let yaml = r#"
engine:
  program: python
  args: [-m, tweakreg_bridge]
initial_preview: true
parameters:
  threshold: 5.0
  peakmin: null
  fitgeometry: general
"#;
        let config = WcsAlignConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.engine.display(), "python -m tweakreg_bridge");
        assert_eq!(config.catalog.program, "catalog-bridge");
        assert!(config.initial_preview);
        assert_eq!(config.log_dir, None);
        assert_eq!(config.parameters.peakmin, Some(ParamValue::Unset));
        assert_eq!(config.parameters.peakmax, None);

        let mut params = ParameterSet {
            peakmin: ParamValue::Number(10.0),
            ..Default::default()
        };
        config.parameters.apply_to(&mut params);
        assert_eq!(params.peakmin, ParamValue::Unset);
        assert_eq!(params.threshold, ParamValue::Number(5.0));
        assert_eq!(params.fitgeometry, FitGeometry::General);
        assert_eq!(params.searchrad, ParamValue::Number(1.0));
    }

    #[test]
    fn test_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::from_path_buf(dir.path().join("wcsalign.yaml")).unwrap();
        fs::write(&path, "log_level: debug\nlog_dir: /tmp/wcsalign\n").unwrap();

        let config = WcsAlignConfig::load_or_default(Some(path.as_path())).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.log_dir, Some(Utf8PathBuf::from("/tmp/wcsalign")));

        assert!(matches!(
            WcsAlignConfig::load(Utf8Path::new("/nonexistent/wcsalign.yaml")).unwrap_err(),
            WcsAlignError::IoError(_)
        ));
        assert!(matches!(
            WcsAlignConfig::from_yaml_str("engine: [").unwrap_err(),
            WcsAlignError::YamlError(_)
        ));
    }
}
