#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::domain::model::{MarkerPolicy, Markers, WriteMode};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{RouteError, Result};
use crate::utils::validation::{parse_port, validate_marker, validate_path, validate_service_name, Validate};
use std::path::{Path, PathBuf};

/// Fully resolved settings for one rewrite.
#[derive(Debug, Clone)]
pub struct Settings {
    pub config_path: PathBuf,
    pub service: String,
    pub port: String,
    pub markers: Markers,
    pub write_mode: WriteMode,
    pub marker_policy: MarkerPolicy,
}

impl Settings {
    pub fn new(config_path: impl Into<PathBuf>, service: impl Into<String>, port: impl Into<String>) -> Self {
        Self {
            config_path: config_path.into(),
            service: service.into(),
            port: port.into(),
            markers: Markers::default(),
            write_mode: WriteMode::default(),
            marker_policy: MarkerPolicy::default(),
        }
    }

    pub fn with_markers(mut self, markers: Markers) -> Self {
        self.markers = markers;
        self
    }

    pub fn with_write_mode(mut self, write_mode: WriteMode) -> Self {
        self.write_mode = write_mode;
        self
    }

    pub fn with_marker_policy(mut self, marker_policy: MarkerPolicy) -> Self {
        self.marker_policy = marker_policy;
        self
    }
}

impl ConfigProvider for Settings {
    fn config_path(&self) -> &Path {
        &self.config_path
    }

    fn service(&self) -> &str {
        &self.service
    }

    fn port(&self) -> Result<u16> {
        parse_port(&self.port)
    }

    fn markers(&self) -> Markers {
        self.markers.clone()
    }

    fn write_mode(&self) -> WriteMode {
        self.write_mode
    }

    fn marker_policy(&self) -> MarkerPolicy {
        self.marker_policy
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        parse_port(&self.port)?;
        validate_service_name(&self.service)?;
        validate_path("config_path", &self.config_path.to_string_lossy())?;
        validate_marker("start_marker", &self.markers.start)?;
        validate_marker("end_marker", &self.markers.end)?;

        if self.markers.start == self.markers.end {
            return Err(RouteError::Config {
                message: "start and end markers must differ".to_string(),
            });
        }
        Ok(())
    }
}
