use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_START_MARKER: &str = "#routes_start";
pub const DEFAULT_END_MARKER: &str = "#routes_end";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub service: String,
    pub port: u16,
}

impl Route {
    pub fn new(service: impl Into<String>, port: u16) -> Self {
        Self {
            service: service.into(),
            port,
        }
    }
}

/// Service name -> port. Keys are unique; iteration is sorted by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RouteTable {
    routes: BTreeMap<String, u16>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last writer wins. Returns the previous port, if any.
    pub fn insert(&mut self, route: Route) -> Option<u16> {
        self.routes.insert(route.service, route.port)
    }

    pub fn get(&self, service: &str) -> Option<u16> {
        self.routes.get(service).copied()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u16)> {
        self.routes.iter().map(|(name, port)| (name.as_str(), *port))
    }
}

impl FromIterator<Route> for RouteTable {
    fn from_iter<I: IntoIterator<Item = Route>>(iter: I) -> Self {
        let mut table = RouteTable::new();
        for route in iter {
            table.insert(route);
        }
        table
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Markers {
    pub start: String,
    pub end: String,
}

impl Default for Markers {
    fn default() -> Self {
        Self {
            start: DEFAULT_START_MARKER.to_string(),
            end: DEFAULT_END_MARKER.to_string(),
        }
    }
}

impl Markers {
    pub fn is_start(&self, line: &[u8]) -> bool {
        contains_bytes(line, self.start.as_bytes())
    }

    pub fn is_end(&self, line: &[u8]) -> bool {
        contains_bytes(line, self.end.as_bytes())
    }

    /// True when `text` would be taken for a marker line.
    pub fn matches_any(&self, text: &str) -> bool {
        self.is_start(text.as_bytes()) || self.is_end(text.as_bytes())
    }
}

fn contains_bytes(haystack: &[u8], needle: &[u8]) -> bool {
    needle.is_empty() || haystack.windows(needle.len()).any(|window| window == needle)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    /// Write a sibling temp file and rename it over the original.
    #[default]
    Atomic,
    /// Truncate the open file, seek to the start and write.
    InPlace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerPolicy {
    /// A missing end marker is an error and nothing is written.
    #[default]
    Strict,
    /// A missing end marker drops the region content and the update.
    Lenient,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateOutcome {
    Added,
    Updated { previous_port: u16 },
    Unchanged,
    Dropped,
}

/// Summary of one rewrite.
#[derive(Debug, Clone, Serialize)]
pub struct RewriteReport {
    pub path: String,
    pub route: Route,
    pub outcome: UpdateOutcome,
    pub routes: RouteTable,
    pub lines_preserved: usize,
    pub lines_discarded: usize,
    pub written: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_table_last_writer_wins() {
        let mut table = RouteTable::new();
        assert_eq!(table.insert(Route::new("a", 8080)), None);
        assert_eq!(table.insert(Route::new("a", 9999)), Some(8080));
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("a"), Some(9999));
    }

    #[test]
    fn test_route_table_iterates_sorted() {
        let table: RouteTable = vec![Route::new("b", 2), Route::new("a", 1)]
            .into_iter()
            .collect();
        let names: Vec<&str> = table.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_markers_match_by_substring() {
        let markers = Markers::default();
        assert!(markers.is_start(b"    #routes_start"));
        assert!(markers.is_end(b"#routes_end -- managed"));
        assert!(!markers.is_start(b"#routes_end"));
        assert!(markers.is_end(b"\xe9 #routes_end"));
        assert!(markers.matches_any("#routes_end_route"));
    }

    #[test]
    fn test_write_mode_deserializes_snake_case() {
        #[derive(Deserialize)]
        struct Wrapper {
            mode: WriteMode,
        }
        let wrapper: Wrapper = toml::from_str("mode = \"in_place\"").unwrap();
        assert_eq!(wrapper.mode, WriteMode::InPlace);
    }
}
