use crate::core::emitter::{emit_routes, push_line};
use crate::core::parser::parse_route;
use crate::domain::model::{Markers, Route, RouteTable, UpdateOutcome};
use crate::utils::error::{RouteError, Result};
use std::io::BufRead;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    BeforeRegion,
    InRegion,
    AfterRegion,
}

/// Result of folding every line of a document through [`RegionScan`].
#[derive(Debug, Clone)]
pub struct ScanOutput {
    pub state: ScanState,
    pub content: Vec<u8>,
    pub routes: RouteTable,
    /// `None` when the end marker was never reached.
    pub outcome: Option<UpdateOutcome>,
    pub lines_preserved: usize,
    pub lines_discarded: usize,
}

pub struct RegionScan<'a> {
    markers: &'a Markers,
    update: &'a Route,
    state: ScanState,
    routes: RouteTable,
    output: Vec<u8>,
    outcome: Option<UpdateOutcome>,
    lines_preserved: usize,
    lines_discarded: usize,
}

impl<'a> RegionScan<'a> {
    pub fn new(markers: &'a Markers, update: &'a Route) -> Self {
        Self {
            markers,
            update,
            state: ScanState::BeforeRegion,
            routes: RouteTable::new(),
            output: Vec::new(),
            outcome: None,
            lines_preserved: 0,
            lines_discarded: 0,
        }
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Feeds one line (without its terminator). `line_number` is 1-based.
    /// Lines outside the region are kept byte for byte, whatever their encoding.
    pub fn step(mut self, line_number: usize, line: &[u8]) -> Result<Self> {
        match self.state {
            ScanState::BeforeRegion => {
                if self.markers.is_start(line) {
                    tracing::debug!("Routes region starts at line {}", line_number);
                    self.state = ScanState::InRegion;
                }
                self.copy(line);
            }
            ScanState::InRegion => {
                if self.markers.is_end(line) {
                    tracing::debug!("Routes region ends at line {}", line_number);
                    self.close_region();
                    self.copy(line);
                    self.state = ScanState::AfterRegion;
                } else {
                    self.collect(line_number, line)?;
                }
            }
            ScanState::AfterRegion => {
                if self.markers.is_start(line) || self.markers.is_end(line) {
                    tracing::warn!(
                        "Ignoring marker at line {}: only one routes region is managed",
                        line_number
                    );
                }
                self.copy(line);
            }
        }
        Ok(self)
    }

    pub fn finish(self) -> ScanOutput {
        ScanOutput {
            state: self.state,
            content: self.output,
            routes: self.routes,
            outcome: self.outcome,
            lines_preserved: self.lines_preserved,
            lines_discarded: self.lines_discarded,
        }
    }

    fn copy(&mut self, line: &[u8]) {
        push_line(&mut self.output, line);
        self.lines_preserved += 1;
    }

    fn collect(&mut self, line_number: usize, line: &[u8]) -> Result<()> {
        let trimmed = line.trim_ascii();
        if trimmed.is_empty() || trimmed.starts_with(b"#") {
            self.lines_discarded += 1;
            return Ok(());
        }

        let text = std::str::from_utf8(trimmed).map_err(|e| RouteError::Parse {
            line_number,
            line: String::from_utf8_lossy(trimmed).into_owned(),
            reason: format!("route line is not valid UTF-8 ({})", e),
        })?;

        let route = parse_route(line_number, text.trim())?;
        if self.routes.insert(route.clone()).is_some() {
            tracing::debug!("Duplicate route for '{}' at line {}", route.service, line_number);
        }
        Ok(())
    }

    fn close_region(&mut self) {
        let previous = self.routes.insert(self.update.clone());
        self.outcome = Some(match previous {
            None => UpdateOutcome::Added,
            Some(port) if port == self.update.port => UpdateOutcome::Unchanged,
            Some(port) => UpdateOutcome::Updated {
                previous_port: port,
            },
        });
        tracing::debug!("Emitting {} routes", self.routes.len());
        emit_routes(&self.routes, &mut self.output);
    }
}

/// Splits on `\n` and drops one trailing `\r`; read errors are reported against `path`.
pub fn scan_document<R: BufRead>(
    reader: R,
    path: &Path,
    markers: &Markers,
    update: &Route,
) -> Result<ScanOutput> {
    reader
        .split(b'\n')
        .enumerate()
        .try_fold(RegionScan::new(markers, update), |scan, (index, line)| {
            let mut line = line.map_err(|e| RouteError::io(path, e))?;
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            scan.step(index + 1, &line)
        })
        .map(RegionScan::finish)
}
