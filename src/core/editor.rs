use crate::adapters::storage::open_storage;
use crate::core::emitter::render_route;
use crate::core::scanner::{scan_document, ScanOutput, ScanState};
use crate::domain::model::{MarkerPolicy, Markers, Route, RewriteReport, UpdateOutcome};
use crate::domain::ports::{ConfigProvider, Storage};
use crate::utils::error::{RouteError, Result};
use crate::utils::validation::validate_service_name;

/// The reconstructed document together with what happened to it.
#[derive(Debug, Clone)]
pub struct Rewrite {
    pub content: Vec<u8>,
    pub report: RewriteReport,
}

pub struct RouteEditor<S: Storage> {
    storage: S,
    markers: Markers,
    policy: MarkerPolicy,
    dry_run: bool,
}

impl<S: Storage> RouteEditor<S> {
    pub fn new(storage: S, markers: Markers, policy: MarkerPolicy) -> Self {
        Self {
            storage,
            markers,
            policy,
            dry_run: false,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Reads the whole document, then writes it back once. Nothing is
    /// written if reading or parsing fails.
    pub fn run(&mut self, update: &Route) -> Result<Rewrite> {
        let file_path = self.storage.path().to_path_buf();
        let path = file_path.display().to_string();
        tracing::info!("Setting route {} -> {} in {}", update.service, update.port, path);

        let scan = {
            let reader = self.storage.reader()?;
            scan_document(reader, &file_path, &self.markers, update)?
        };
        let outcome = self.check_markers(&scan)?;

        let written = if self.dry_run {
            tracing::info!("Dry run: {} left untouched", path);
            false
        } else {
            self.storage.replace(&scan.content)?;
            true
        };

        tracing::info!("Route {} {:?}, {} routes in region", update.service, outcome, scan.routes.len());

        Ok(Rewrite {
            report: RewriteReport {
                path,
                route: update.clone(),
                outcome,
                routes: scan.routes,
                lines_preserved: scan.lines_preserved,
                lines_discarded: scan.lines_discarded,
                written,
            },
            content: scan.content,
        })
    }

    fn check_markers(&self, scan: &ScanOutput) -> Result<UpdateOutcome> {
        match (scan.state, self.policy) {
            (ScanState::AfterRegion, _) => Ok(scan.outcome.clone().unwrap_or(UpdateOutcome::Dropped)),
            (ScanState::InRegion, MarkerPolicy::Strict) => Err(RouteError::MissingEndMarker {
                marker: self.markers.end.clone(),
            }),
            // No region at all: the file is copied as is under either policy.
            (ScanState::BeforeRegion, _) => {
                tracing::warn!(
                    "Start marker '{}' not found, file copied unchanged and update dropped",
                    self.markers.start
                );
                Ok(UpdateOutcome::Dropped)
            }
            (ScanState::InRegion, MarkerPolicy::Lenient) => {
                tracing::warn!(
                    "End marker '{}' not found, {} existing routes and the update are dropped",
                    self.markers.end,
                    scan.routes.len()
                );
                Ok(UpdateOutcome::Dropped)
            }
        }
    }
}

/// Validates the update, opens the target file and rewrites its routes region.
pub fn rewrite_routes<C: ConfigProvider>(config: &C, dry_run: bool) -> Result<Rewrite> {
    let port = config.port()?;
    validate_service_name(config.service())?;
    let update = Route::new(config.service(), port);

    let markers = config.markers();
    validate_route_line(&update, &markers)?;

    let storage = open_storage(config.config_path(), config.write_mode())?;
    RouteEditor::new(storage, markers, config.marker_policy())
        .with_dry_run(dry_run)
        .run(&update)
}

/// A generated route line must never be mistaken for a marker on the next run.
pub fn validate_route_line(update: &Route, markers: &Markers) -> Result<()> {
    if markers.matches_any(&render_route(&update.service, update.port)) {
        return Err(RouteError::InvalidService {
            name: update.service.clone(),
            reason: format!(
                "its route line would contain the marker '{}' or '{}'",
                markers.start, markers.end
            ),
        });
    }
    Ok(())
}
