use crate::domain::model::{MarkerPolicy, WriteMode};
use crate::utils::error::{RouteError, Result};
use crate::utils::validation::{validate_marker, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Optional settings file; every field can also be given on the command line.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    pub markers: Option<MarkersConfig>,
    pub write: Option<WriteConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarkersConfig {
    pub start: Option<String>,
    pub end: Option<String>,
    pub policy: Option<MarkerPolicy>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WriteConfig {
    pub mode: Option<WriteMode>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| RouteError::io(path, e))?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);
        let config: TomlConfig = toml::from_str(&processed_content)?;
        Ok(config)
    }

    /// 替換環境變數 (例如 ${ROUTES_START})
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").expect("env pattern is valid");

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        result.to_string()
    }

    pub fn start_marker(&self) -> Option<&str> {
        self.markers.as_ref()?.start.as_deref()
    }

    pub fn end_marker(&self) -> Option<&str> {
        self.markers.as_ref()?.end.as_deref()
    }

    pub fn marker_policy(&self) -> Option<MarkerPolicy> {
        self.markers.as_ref()?.policy
    }

    pub fn write_mode(&self) -> Option<WriteMode> {
        self.write.as_ref()?.mode
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        if let Some(start) = self.start_marker() {
            validate_marker("markers.start", start)?;
        }
        if let Some(end) = self.end_marker() {
            validate_marker("markers.end", end)?;
        }
        if let (Some(start), Some(end)) = (self.start_marker(), self.end_marker()) {
            if start == end {
                return Err(RouteError::Config {
                    message: "markers.start and markers.end must differ".to_string(),
                });
            }
        }
        Ok(())
    }
}
