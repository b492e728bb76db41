use crate::config::toml_config::TomlConfig;
use crate::config::Settings;
use crate::domain::model::{MarkerPolicy, Markers, WriteMode};
use crate::utils::error::Result;
use crate::utils::validation::{parse_port, Validate};
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "route-rewriter")]
#[command(about = "Maps a service to a port inside the managed routes region of an nginx config")]
pub struct CliConfig {
    /// Path to the nginx configuration file
    #[arg(value_name = "CONFIG_FILE")]
    pub config_path: Option<PathBuf>,

    /// Service name, also used as the location prefix and upstream host
    #[arg(value_name = "SERVICE")]
    pub service: Option<String>,

    /// Port the service listens on
    #[arg(value_name = "PORT", allow_hyphen_values = true)]
    pub port: Option<String>,

    /// TOML file with marker and write settings
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Override the start marker substring
    #[arg(long)]
    pub start_marker: Option<String>,

    /// Override the end marker substring
    #[arg(long)]
    pub end_marker: Option<String>,

    /// Truncate and rewrite the file in place instead of replacing it atomically
    #[arg(long)]
    pub in_place: bool,

    /// Tolerate a missing end marker: the region and the update are dropped
    #[arg(long)]
    pub lenient: bool,

    /// Print the rewritten file to stdout without modifying it
    #[arg(long)]
    pub dry_run: bool,

    /// Print a JSON report of the rewrite to stdout
    #[arg(long)]
    pub report: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,
}

impl CliConfig {
    /// 合併命令列與 TOML 設定；缺少位置參數時回傳 `None`
    pub fn resolve(&self) -> Result<Option<Settings>> {
        let (Some(config_path), Some(service), Some(port)) =
            (&self.config_path, &self.service, &self.port)
        else {
            return Ok(None);
        };

        // 在讀取任何檔案之前先驗證 port
        parse_port(port)?;

        let file_config = match &self.config {
            Some(path) => {
                tracing::debug!("Loading settings from {}", path.display());
                let config = TomlConfig::from_file(path)?;
                config.validate()?;
                config
            }
            None => TomlConfig::default(),
        };

        let defaults = Markers::default();
        let markers = Markers {
            start: self
                .start_marker
                .clone()
                .or_else(|| file_config.start_marker().map(str::to_string))
                .unwrap_or(defaults.start),
            end: self
                .end_marker
                .clone()
                .or_else(|| file_config.end_marker().map(str::to_string))
                .unwrap_or(defaults.end),
        };

        let write_mode = if self.in_place {
            WriteMode::InPlace
        } else {
            file_config.write_mode().unwrap_or_default()
        };

        let marker_policy = if self.lenient {
            MarkerPolicy::Lenient
        } else {
            file_config.marker_policy().unwrap_or_default()
        };

        let settings = Settings::new(config_path.clone(), service.clone(), port.clone())
            .with_markers(markers)
            .with_write_mode(write_mode)
            .with_marker_policy(marker_policy);
        settings.validate()?;

        Ok(Some(settings))
    }
}
