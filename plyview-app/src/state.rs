//! Viewer state: selection, load lifecycle, and the displayed-mesh slot.

use plyview_data::PlyGeometry;
use plyview_fetch::{LoadEvent, LoadMessage, progress_percent};
use tracing::{debug, error};

/// Asset host the viewer fetches models from by default.
pub const DEFAULT_BASE_URL: &str =
    "https://raw.githubusercontent.com/PelissierCombescure/PelissierCombescure.github.io/main/graphics/visapp/3d";

/// Parameter identifier for the eye-surface visibility overlay, the one
/// parameter that opts out of the orientation flip.
pub const EYE_SURFACE_PARAMETER: &str = "eyes";

/// The (model, parameter) pair naming the remote file to display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub model: String,
    pub parameter: String,
}

impl Selection {
    pub fn new(model: impl Into<String>, parameter: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            parameter: parameter.into(),
        }
    }

    /// Remote URL for this selection. Rebuilt fresh on every call, never
    /// cached across selection changes.
    pub fn resource_url(&self, base_url: &str) -> String {
        format!(
            "{}/{}/{}.ply",
            base_url.trim_end_matches('/'),
            self.model,
            self.parameter
        )
    }
}

/// Whether a model/parameter pair is displayed rotated 180° about X.
///
/// Everything flips except the eye-surface overlay. The bimba +
/// saliency_limper branch is subsumed by that rule (the pair never names
/// the eye overlay) but is kept explicit.
pub fn orientation_flip(model: &str, parameter: &str) -> bool {
    let mut flip = parameter != EYE_SURFACE_PARAMETER;

    if model == "bimba" && parameter == "saliency_limper" {
        flip = true;
    }

    flip
}

/// Lifecycle of the active load.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadStatus {
    /// Nothing requested yet.
    Idle,
    /// A download is in flight.
    Loading { received: u64, total: Option<u64> },
    /// The last load completed and its mesh is displayed.
    Ready,
    /// The last load failed; the diagnostic goes to the log, the status
    /// line shows a fixed message.
    Failed(String),
}

impl LoadStatus {
    /// Text for the status line, or `None` when the indicator is hidden.
    pub fn indicator_text(&self) -> Option<String> {
        match self {
            Self::Idle | Self::Ready => None,
            Self::Loading { received, total } => {
                let percent = progress_percent(*received, *total);
                if percent.is_finite() {
                    Some(format!("Loading 3D model… {percent:.0}%"))
                } else {
                    // Total size unknown; show the indicator without a
                    // percentage.
                    Some("Loading 3D model…".to_owned())
                }
            }
            Self::Failed(_) => Some("Error loading model!".to_owned()),
        }
    }
}

/// A reload issued by [`ViewerState`]: the URL to fetch and the generation
/// that must still be current when the result arrives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReloadRequest {
    pub generation: u64,
    pub url: String,
}

/// Single owner of the selection and load lifecycle.
///
/// Loads are tagged with a generation number; events from a superseded
/// generation are discarded, so overlapping loads cannot race the
/// displayed mesh.
pub struct ViewerState {
    base_url: String,
    selection: Selection,
    generation: u64,
    status: LoadStatus,
}

impl ViewerState {
    pub fn new(base_url: impl Into<String>, selection: Selection) -> Self {
        Self {
            base_url: base_url.into(),
            selection,
            generation: 0,
            status: LoadStatus::Idle,
        }
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    pub fn set_status(&mut self, status: LoadStatus) {
        self.status = status;
    }

    /// Whether the currently selected pair displays flipped.
    pub fn orientation_flip(&self) -> bool {
        orientation_flip(&self.selection.model, &self.selection.parameter)
    }

    /// Update the named selection field(s), leaving the others at their
    /// prior values, then reload.
    pub fn select(&mut self, model: Option<&str>, parameter: Option<&str>) -> ReloadRequest {
        if let Some(model) = model {
            self.selection.model = model.to_owned();
        }
        if let Some(parameter) = parameter {
            self.selection.parameter = parameter.to_owned();
        }
        self.reload()
    }

    /// Recompute the resource URL from the full current selection and start
    /// a new load generation.
    pub fn reload(&mut self) -> ReloadRequest {
        self.generation += 1;
        self.status = LoadStatus::Loading {
            received: 0,
            total: None,
        };
        ReloadRequest {
            generation: self.generation,
            url: self.selection.resource_url(&self.base_url),
        }
    }

    /// Invalidate in-flight loads without starting a new one, e.g. when a
    /// local file takes over the display.
    pub fn invalidate_loads(&mut self) {
        self.generation += 1;
    }

    /// Apply a load message. Returns geometry to install when a
    /// current-generation load completed successfully.
    pub fn apply(&mut self, message: LoadMessage) -> Option<PlyGeometry> {
        if message.generation != self.generation {
            debug!(
                "Dropping event from superseded load generation {}",
                message.generation
            );
            return None;
        }

        match message.event {
            LoadEvent::Progress { received, total } => {
                if matches!(self.status, LoadStatus::Loading { .. }) {
                    self.status = LoadStatus::Loading { received, total };
                }
                None
            }
            LoadEvent::Loaded(geometry) => {
                self.status = LoadStatus::Ready;
                Some(geometry)
            }
            LoadEvent::Failed(diagnostic) => {
                error!("Load failed: {diagnostic}");
                self.status = LoadStatus::Failed(diagnostic);
                None
            }
        }
    }
}

/// Holder of the single displayed mesh.
///
/// Installing a replacement drops the previous mesh here, releasing its
/// resources exactly once; a failed load never touches the slot.
#[derive(Default)]
pub struct MeshSlot<M> {
    current: Option<M>,
}

impl<M> MeshSlot<M> {
    pub fn new() -> Self {
        Self { current: None }
    }

    pub fn install(&mut self, mesh: M) {
        self.current = Some(mesh);
    }

    pub fn current(&self) -> Option<&M> {
        self.current.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn state() -> ViewerState {
        ViewerState::new(
            "https://example.com/3d",
            Selection::new("gorgoile", "sommets_visibles_centered"),
        )
    }

    fn loaded(generation: u64) -> LoadMessage {
        LoadMessage {
            generation,
            event: LoadEvent::Loaded(PlyGeometry::default()),
        }
    }

    #[test]
    fn test_select_updates_only_named_field() {
        let mut state = state();

        state.select(Some("bimba"), None);
        assert_eq!(state.selection().model, "bimba");
        assert_eq!(state.selection().parameter, "sommets_visibles_centered");

        state.select(None, Some("eyes"));
        assert_eq!(state.selection().model, "bimba");
        assert_eq!(state.selection().parameter, "eyes");
    }

    #[test]
    fn test_reload_rebuilds_url_from_current_selection() {
        let mut state = state();
        let request = state.reload();
        assert_eq!(
            request.url,
            "https://example.com/3d/gorgoile/sommets_visibles_centered.ply"
        );

        let request = state.select(Some("bimba"), Some("eyes"));
        assert_eq!(request.url, "https://example.com/3d/bimba/eyes.ply");
    }

    #[test]
    fn test_every_reload_advances_the_generation() {
        let mut state = state();
        let first = state.reload();
        let second = state.select(Some("bimba"), None);
        assert!(second.generation > first.generation);
    }

    #[test]
    fn test_stale_completion_is_discarded() {
        let mut state = state();
        let stale = state.reload();
        let current = state.select(Some("bimba"), None);

        assert!(state.apply(loaded(stale.generation)).is_none());
        assert!(matches!(state.status(), LoadStatus::Loading { .. }));

        assert!(state.apply(loaded(current.generation)).is_some());
        assert_eq!(state.status(), &LoadStatus::Ready);
    }

    #[test]
    fn test_failure_sets_status_and_delivers_no_geometry() {
        let mut state = state();
        let request = state.reload();

        let installed = state.apply(LoadMessage {
            generation: request.generation,
            event: LoadEvent::Failed("HTTP 404 Not Found".to_owned()),
        });
        assert!(installed.is_none());
        assert!(matches!(state.status(), LoadStatus::Failed(_)));
        assert_eq!(
            state.status().indicator_text().as_deref(),
            Some("Error loading model!")
        );
    }

    #[test]
    fn test_progress_updates_status_while_loading() {
        let mut state = state();
        let request = state.reload();

        state.apply(LoadMessage {
            generation: request.generation,
            event: LoadEvent::Progress {
                received: 50,
                total: Some(200),
            },
        });
        assert_eq!(
            state.status().indicator_text().as_deref(),
            Some("Loading 3D model… 25%")
        );
    }

    #[test]
    fn test_indicator_tolerates_unknown_total() {
        let status = LoadStatus::Loading {
            received: 1024,
            total: None,
        };
        assert_eq!(
            status.indicator_text().as_deref(),
            Some("Loading 3D model…")
        );
    }

    #[test]
    fn test_indicator_hidden_when_idle_or_ready() {
        assert!(LoadStatus::Idle.indicator_text().is_none());
        assert!(LoadStatus::Ready.indicator_text().is_none());
    }

    #[test]
    fn test_orientation_flip_rule() {
        // The eye overlay is the only pair that displays unflipped.
        assert!(!orientation_flip("gorgoile", "eyes"));
        assert!(!orientation_flip("bimba", "eyes"));

        assert!(orientation_flip("gorgoile", "sommets_visibles_centered"));
        assert!(orientation_flip("gorgoile", "saliency_limper"));
        assert!(orientation_flip("bimba", "saliency_limper"));
        assert!(orientation_flip("C", "sommets_visibles_centered"));
    }

    struct ReleaseCounter(Rc<Cell<u32>>);

    impl Drop for ReleaseCounter {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn test_mesh_slot_releases_previous_mesh_exactly_once() {
        let releases = Rc::new(Cell::new(0));
        let mut slot = MeshSlot::new();

        slot.install(ReleaseCounter(releases.clone()));
        assert_eq!(releases.get(), 0);

        slot.install(ReleaseCounter(releases.clone()));
        assert_eq!(releases.get(), 1);
        assert!(slot.current().is_some());

        slot.install(ReleaseCounter(releases.clone()));
        assert_eq!(releases.get(), 2);
    }
}
