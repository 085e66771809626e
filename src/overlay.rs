//! The overlay runtime: three cooperating loops sharing two cells.
//!
//! - camera resolution retries until the overlay camera exists, then stops;
//! - the target scan latches the marker type and then re-selects the nearest
//!   target on every tick;
//! - the frame handler checks the chords each frame and clicks the selection.
//!
//! The camera handle and the selection each have exactly one writer (their
//! task) and one reader (the frame handler), carried over `watch` channels.
//! Run everything on a current-thread runtime to keep the loops interleaved on
//! one thread.

use crate::bindings::ChordBindings;
use crate::click::{ClickSimulator, Pointer};
use crate::config::OverlayConfig;
use crate::error::OverlayError;
use crate::input::{FrameInput, InputState};
use crate::pause::PauseState;
use crate::projector;
use crate::registry::TargetRegistry;
use crate::scene::{CameraView, ObjectId, Scene};
use crate::selector::{NearestTargetSelector, TargetEntity};
use glam::IVec2;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

/// Weak reference to the overlay camera. The camera view is looked up again
/// on every use, so a camera that has since vanished simply yields nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraHandle {
    object: ObjectId,
}

impl CameraHandle {
    pub fn object(&self) -> ObjectId {
        self.object
    }

    pub fn view(&self, scene: &impl Scene) -> Option<CameraView> {
        scene.camera(self.object)
    }
}

#[derive(Debug, Clone)]
pub struct CameraResolver {
    path: String,
}

impl CameraResolver {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    pub fn try_resolve(&self, scene: &impl Scene) -> Option<CameraHandle> {
        let object = scene.find_by_path(&self.path)?;
        scene.camera(object)?;
        Some(CameraHandle { object })
    }

    /// Retry every `retry` until the camera resolves, publish it, and return.
    pub async fn run<S: Scene>(
        self,
        scene: Arc<S>,
        retry: Duration,
        camera: watch::Sender<Option<CameraHandle>>,
    ) {
        loop {
            if let Some(handle) = self.try_resolve(&*scene) {
                info!("Found overlay camera at '{}'", self.path);
                camera.send_replace(Some(handle));
                return;
            }
            debug!("Overlay camera '{}' not available yet", self.path);
            tokio::time::sleep(retry).await;
        }
    }
}

/// Marker discovery followed by periodic nearest-target selection.
#[derive(Debug, Clone)]
pub struct TargetScanner {
    parent: Option<ObjectId>,
    registry: TargetRegistry,
    selector: NearestTargetSelector,
    discovery_interval: Duration,
    selection_interval: Duration,
}

impl TargetScanner {
    /// `parent` is the targets container; without it selection stays inert.
    pub fn new(
        parent: Option<ObjectId>,
        registry: TargetRegistry,
        discovery_interval: Duration,
        selection_interval: Duration,
    ) -> Self {
        Self {
            parent,
            registry,
            selector: NearestTargetSelector::new(),
            discovery_interval,
            selection_interval,
        }
    }

    pub fn selection(&self) -> Option<TargetEntity> {
        self.selector.selection()
    }

    pub fn registry(&self) -> &TargetRegistry {
        &self.registry
    }

    /// Run one scan and return how long to wait before the next one.
    pub fn tick(&mut self, scene: &impl Scene) -> Duration {
        let Some(marker) = self.registry.marker() else {
            self.registry.discover(scene);
            return self.discovery_interval;
        };

        if let Some(parent) = self.parent {
            self.selector.select_nearest(scene, parent, marker);
        }
        self.selection_interval
    }

    pub async fn run<S: Scene>(
        mut self,
        scene: Arc<S>,
        selection: watch::Sender<Option<TargetEntity>>,
    ) {
        loop {
            let wait = self.tick(&*scene);
            let current = self.selection();
            selection.send_if_modified(|published| {
                if *published == current {
                    return false;
                }
                *published = current;
                true
            });
            tokio::time::sleep(wait).await;
        }
    }
}

/// Per-frame chord check and click.
pub struct FrameHandler<P> {
    bindings: ChordBindings,
    camera: watch::Receiver<Option<CameraHandle>>,
    selection: watch::Receiver<Option<TargetEntity>>,
    clicker: ClickSimulator<P>,
}

impl<P: Pointer> FrameHandler<P> {
    pub fn new(
        bindings: ChordBindings,
        camera: watch::Receiver<Option<CameraHandle>>,
        selection: watch::Receiver<Option<TargetEntity>>,
        clicker: ClickSimulator<P>,
    ) -> Self {
        Self {
            bindings,
            camera,
            selection,
            clicker,
        }
    }

    pub fn clicker(&self) -> &ClickSimulator<P> {
        &self.clicker
    }

    /// Click the selected target if either chord fired this frame. Returns
    /// the desktop point that was clicked.
    pub fn on_frame(
        &self,
        scene: &impl Scene,
        input: &impl InputState,
        pause: &impl PauseState,
    ) -> Option<IVec2> {
        if !self.bindings.triggered(input) {
            return None;
        }
        self.click_next_target(scene, pause)
    }

    /// Project the selected target and click it, unless there is no
    /// selection, no camera, or the host is paused.
    pub fn click_next_target(&self, scene: &impl Scene, pause: &impl PauseState) -> Option<IVec2> {
        let target = (*self.selection.borrow())?;
        if pause.is_paused() {
            return None;
        }
        let camera = (*self.camera.borrow())?;

        let view = camera.view(scene)?;
        let world = scene.world_position(target.id)?;
        let desktop = match self.clicker.pointer().desktop_size() {
            Ok(desktop) => desktop,
            Err(e) => {
                debug!("No desktop size available: {}", e);
                return None;
            }
        };

        let point = projector::project(world, &view, desktop);
        debug!("Clicking target {:?} at {}", target.id, point);
        self.clicker.click(point);
        Some(point)
    }
}

/// Background tasks of a running overlay. Dropping this cancels them.
pub struct OverlayTasks {
    camera: JoinHandle<()>,
    scanner: JoinHandle<()>,
}

impl OverlayTasks {
    pub fn is_camera_resolution_finished(&self) -> bool {
        self.camera.is_finished()
    }
}

impl Drop for OverlayTasks {
    fn drop(&mut self) {
        self.camera.abort();
        self.scanner.abort();
    }
}

/// Long-lived context owning the scene, configuration and chords.
pub struct Overlay<S> {
    scene: Arc<S>,
    config: OverlayConfig,
    bindings: ChordBindings,
}

impl<S: Scene + 'static> Overlay<S> {
    pub fn new(scene: Arc<S>, config: OverlayConfig, bindings: ChordBindings) -> Self {
        Self {
            scene,
            config,
            bindings,
        }
    }

    pub fn scene(&self) -> &Arc<S> {
        &self.scene
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    /// Resolve the targets container and spawn the camera and scan tasks.
    /// Must be called from within a tokio runtime.
    pub fn start<P: Pointer>(&self, pointer: P) -> (FrameHandler<P>, OverlayTasks) {
        let parent = self.scene.find_by_path(&self.config.targets_path);
        match parent {
            Some(_) => info!("Found targets container '{}'", self.config.targets_path),
            None => {
                let err = OverlayError::missing_collaborator(&self.config.targets_path);
                error!("{}; target selection disabled", err);
            }
        }

        let (camera_tx, camera_rx) = watch::channel(None);
        let (selection_tx, selection_rx) = watch::channel(None);

        let resolver = CameraResolver::new(self.config.camera_path.clone());
        let camera = tokio::spawn(resolver.run(
            self.scene.clone(),
            self.config.camera_retry_interval,
            camera_tx,
        ));

        let scanner = TargetScanner::new(
            parent,
            TargetRegistry::new(self.config.marker_name.clone()),
            self.config.discovery_interval,
            self.config.selection_interval,
        );
        let scanner = tokio::spawn(scanner.run(self.scene.clone(), selection_tx));

        let handler = FrameHandler::new(
            self.bindings.clone(),
            camera_rx,
            selection_rx,
            ClickSimulator::new(pointer),
        );
        (handler, OverlayTasks { camera, scanner })
    }

    /// Start the overlay and drive the frame loop until `shutdown` resolves.
    pub async fn run<P, I, Z>(
        &self,
        pointer: P,
        input: &mut I,
        pause: &Z,
        shutdown: impl Future<Output = ()>,
    ) where
        P: Pointer,
        I: FrameInput,
        Z: PauseState,
    {
        let (handler, tasks) = self.start(pointer);

        let mut frames = tokio::time::interval(self.config.frame_interval);
        frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = frames.tick() => {
                    input.begin_frame();
                    if let Some(point) = handler.on_frame(&*self.scene, &*input, pause) {
                        info!("Clicked next target at {}", point);
                    }
                }
            }
        }

        drop(tasks);
        info!("Overlay stopped");
    }
}
