use crate::utils::error::{RouteError, Result};

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Parses the port argument. Runs before the target file is touched.
pub fn parse_port(value: &str) -> Result<u16> {
    let port: u16 = value.parse().map_err(|e| RouteError::Format {
        value: value.to_string(),
        reason: format!("not a valid port number ({})", e),
    })?;

    if port == 0 {
        return Err(RouteError::Format {
            value: value.to_string(),
            reason: "port must be between 1 and 65535".to_string(),
        });
    }
    Ok(port)
}

/// Service names end up in `http://<name>:<port>;`, which is read back with `\w+`.
pub fn validate_service_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_');

    if !valid {
        return Err(RouteError::InvalidService {
            name: name.to_string(),
            reason: "only letters, digits and '_' are allowed".to_string(),
        });
    }
    Ok(())
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(RouteError::Config {
            message: format!("{}: path cannot be empty", field_name),
        });
    }

    if path.contains('\0') {
        return Err(RouteError::Config {
            message: format!("{}: path contains null bytes", field_name),
        });
    }

    Ok(())
}

pub fn validate_marker(field_name: &str, marker: &str) -> Result<()> {
    if marker.trim().is_empty() {
        return Err(RouteError::Config {
            message: format!("{}: marker cannot be empty or whitespace-only", field_name),
        });
    }
    if marker.contains('\n') {
        return Err(RouteError::Config {
            message: format!("{}: marker must fit on a single line", field_name),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_port() {
        assert_eq!(parse_port("8080").unwrap(), 8080);
        assert_eq!(parse_port("65535").unwrap(), 65535);
        assert!(matches!(parse_port("abc"), Err(RouteError::Format { .. })));
        assert!(matches!(parse_port("-1"), Err(RouteError::Format { .. })));
        assert!(matches!(parse_port("0"), Err(RouteError::Format { .. })));
        assert!(matches!(parse_port("70000"), Err(RouteError::Format { .. })));
        assert!(parse_port("").is_err());
        assert!(matches!(parse_port(" 80 "), Err(RouteError::Format { .. })));
        assert!(matches!(parse_port("80\n"), Err(RouteError::Format { .. })));
    }

    #[test]
    fn test_validate_service_name() {
        assert!(validate_service_name("api").is_ok());
        assert!(validate_service_name("user_service2").is_ok());
        assert!(validate_service_name("").is_err());
        assert!(validate_service_name("my-service").is_err());
        assert!(validate_service_name("a b").is_err());
    }

    #[test]
    fn test_validate_marker() {
        assert!(validate_marker("markers.start", "#routes_start").is_ok());
        assert!(validate_marker("markers.start", "   ").is_err());
        assert!(validate_marker("markers.end", "a\nb").is_err());
    }

    #[test]
    fn test_validate_path() {
        assert!(validate_path("config_path", "/etc/nginx/nginx.conf").is_ok());
        assert!(validate_path("config_path", "").is_err());
        assert!(validate_path("config_path", "a\0b").is_err());
    }
}
