//! Reads one route entry back out of the managed region.
//!
//! The only shape recognised is the `proxy_pass http://<name>:<port>;` target
//! written by [`crate::core::emitter::render_route`]. Anything before or after
//! it on the line is ignored.

use crate::domain::model::Route;
use crate::utils::error::{RouteError, Result};
use once_cell::sync::Lazy;
use regex::Regex;

static ROUTE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"http://(\w+):(\d+);").expect("route pattern is valid"));

/// `line` is expected to be trimmed, non-blank and not a comment.
pub fn parse_route(line_number: usize, line: &str) -> Result<Route> {
    let caps = ROUTE_PATTERN
        .captures(line)
        .ok_or_else(|| RouteError::Parse {
            line_number,
            line: line.to_string(),
            reason: "expected a `http://<service>:<port>;` target".to_string(),
        })?;

    let service = caps[1].to_string();
    let port = caps[2].parse::<u16>().map_err(|e| RouteError::Parse {
        line_number,
        line: line.to_string(),
        reason: format!("invalid port '{}': {}", &caps[2], e),
    })?;

    Ok(Route { service, port })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::emitter::render_route;

    #[test]
    fn test_parse_generated_route() {
        let line = "location /api/ {rewrite /api/(.*) /$1 break; proxy_pass http://api:8080;} #api_route";
        let route = parse_route(1, line).unwrap();
        assert_eq!(route, Route::new("api", 8080));
    }

    #[test]
    fn test_parse_ignores_prefix_and_suffix() {
        let route = parse_route(1, "proxy_pass http://user_svc2:3000; # hand written").unwrap();
        assert_eq!(route, Route::new("user_svc2", 3000));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let err = parse_route(7, "garbage text with no pattern").unwrap_err();
        match err {
            RouteError::Parse {
                line_number, line, ..
            } => {
                assert_eq!(line_number, 7);
                assert_eq!(line, "garbage text with no pattern");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_parse_requires_semicolon() {
        assert!(parse_route(1, "proxy_pass http://api:8080").is_err());
    }

    #[test]
    fn test_parse_rejects_port_overflow() {
        let err = parse_route(2, "proxy_pass http://api:99999999999;").unwrap_err();
        assert!(matches!(err, RouteError::Parse { line_number: 2, .. }));
    }

    #[test]
    fn test_emitted_line_parses_back() {
        let line = render_route("foo", 8080);
        let route = parse_route(1, line.trim()).unwrap();
        assert_eq!(route, Route::new("foo", 8080));
    }
}
