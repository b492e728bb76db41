use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RouteError {
    #[error("Invalid port '{value}': {reason}")]
    Format { value: String, reason: String },

    #[error("Invalid service name '{name}': {reason}")]
    InvalidService { name: String, reason: String },

    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Route didn't match at line {line_number}: {reason}\nline: {line}")]
    Parse {
        line_number: usize,
        line: String,
        reason: String,
    },

    #[error("End marker '{marker}' not found before end of file")]
    MissingEndMarker { marker: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Failed to replace {}: {source}", .path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: tempfile::PersistError,
    },
}

impl RouteError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RouteError::Io {
            path: path.into(),
            source,
        }
    }

    /// 提供給使用者的修復建議
    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            RouteError::Format { .. } => "Pass the port as a decimal number between 1 and 65535",
            RouteError::InvalidService { .. } => {
                "Use a service name made of letters, digits or '_' that does not contain a marker"
            }
            RouteError::Io { .. } => {
                "Check that the file exists and is readable and writable"
            }
            RouteError::Parse { .. } => {
                "Fix or remove the offending line inside the routes region; the file was not modified"
            }
            RouteError::MissingEndMarker { .. } => {
                "Add the end marker line after the routes region, or rerun with --lenient"
            }
            RouteError::Config { .. } | RouteError::TomlError(_) => {
                "Check the configuration file and command line options"
            }
            RouteError::Persist { .. } => {
                "Check directory permissions, or rerun with --in-place"
            }
            RouteError::SerializationError(_) => "Rerun without --report",
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            RouteError::Format { .. }
            | RouteError::InvalidService { .. }
            | RouteError::Config { .. }
            | RouteError::TomlError(_) => 2,
            RouteError::Parse { .. }
            | RouteError::MissingEndMarker { .. } => 3,
            RouteError::Io { .. }
            | RouteError::Persist { .. }
            | RouteError::SerializationError(_) => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, RouteError>;
