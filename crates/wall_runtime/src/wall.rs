//! Wall - imperative handle over a running scene
//!
//! Four tokio tasks serve one wall:
//!
//! - stepper: advances the simulation at `step_hz`
//! - renderer: repaints the canvas at `refresh_hz`
//! - input: applies pointer events sent through [`Wall::pointer`]
//! - release: places rearrange batches every period while a schedule drains
//!
//! The scene sits behind a mutex that no task holds across an `.await`.
//! Superseding a rearrange or disposing the wall aborts the tasks it owns.

use crate::config::WallConfig;
use crate::error::Result;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use wall_asset::ImageLoader;
use wall_layout::{
    ContextMenu, Item, MenuAction, PointerEvent, RearrangePlan, ReconcileReport, RotationState,
    Scene,
};
use wall_physics::{BodyHandle, Point};
use wall_render::ScreenshotCompositor;

type SharedScene = Arc<Mutex<Scene>>;

#[derive(Default)]
struct WallTasks {
    stepper: Option<JoinHandle<()>>,
    renderer: Option<JoinHandle<()>>,
    input: Option<JoinHandle<()>>,
    release: Option<JoinHandle<()>>,
}

impl WallTasks {
    fn abort_release(&mut self) {
        if let Some(task) = self.release.take() {
            task.abort();
        }
    }

    fn abort_all(&mut self) {
        for task in [
            self.stepper.take(),
            self.renderer.take(),
            self.input.take(),
            self.release.take(),
        ]
        .into_iter()
        .flatten()
        {
            task.abort();
        }
    }
}

/// Handle to a live wall
pub struct Wall {
    scene: SharedScene,
    compositor: ScreenshotCompositor,
    config: WallConfig,
    tasks: Mutex<WallTasks>,
    pointer_tx: mpsc::UnboundedSender<PointerEvent>,
    disposed: AtomicBool,
}

impl Wall {
    /// Build the scene and start its tasks. Must be called inside a tokio runtime.
    pub fn create(config: WallConfig, loader: Arc<dyn ImageLoader>) -> Result<Self> {
        config.validate()?;
        let scene = Scene::new(config.layout.clone(), config.physics.clone())?;
        Ok(Self::with_scene(scene, config, loader))
    }

    /// Start tasks around an existing scene
    pub fn with_scene(scene: Scene, config: WallConfig, loader: Arc<dyn ImageLoader>) -> Self {
        let scene = Arc::new(Mutex::new(scene));
        let (pointer_tx, pointer_rx) = mpsc::unbounded_channel();

        let tasks = WallTasks {
            stepper: Some(spawn_stepper(scene.clone(), config.step_interval())),
            renderer: Some(spawn_renderer(scene.clone(), config.render_interval())),
            input: Some(spawn_input(scene.clone(), pointer_rx)),
            release: None,
        };

        log::info!(
            "Wall started: step {:?}, render {:?}",
            config.step_interval(),
            config.render_interval()
        );

        Self {
            compositor: ScreenshotCompositor::new(loader).with_timeout(config.image_timeout()),
            scene,
            config,
            tasks: Mutex::new(tasks),
            pointer_tx,
            disposed: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &WallConfig {
        &self.config
    }

    /// Run `f` with the scene locked
    pub fn with_scene_mut<R>(&self, f: impl FnOnce(&mut Scene) -> R) -> R {
        f(&mut self.scene.lock())
    }

    // ==================== Items ====================

    /// Bring the wall in line with `items`, cancelling a draining rearrange
    pub fn reconcile(&self, items: &[Item]) -> Result<ReconcileReport> {
        self.tasks.lock().abort_release();
        Ok(self.scene.lock().reconcile(items)?)
    }

    /// Restage every item; later batches fall in every `period`
    pub fn rearrange(&self, period: Duration) -> Result<RearrangePlan> {
        let mut tasks = self.tasks.lock();
        tasks.abort_release();

        let plan = self.scene.lock().rearrange()?;
        if let Some(id) = plan.schedule {
            tasks.release = Some(spawn_release(self.scene.clone(), id, period));
        }
        Ok(plan)
    }

    /// Rearrange with the configured period
    pub fn rearrange_default(&self) -> Result<RearrangePlan> {
        self.rearrange(self.config.rearrange_period())
    }

    // ==================== Background & capture ====================

    pub fn set_background(&self, reference: &str) {
        self.scene.lock().set_background(reference);
    }

    /// PNG of the wall. The foreground is copied before any background load
    /// starts; flat-colour backgrounds never wait.
    pub async fn capture_screenshot(&self) -> Result<Vec<u8>> {
        let (foreground, background) = {
            let mut scene = self.scene.lock();
            scene.render();
            (scene.snapshot_canvas(), scene.background().clone())
        };
        Ok(self.compositor.capture(foreground, &background).await?)
    }

    // ==================== Interaction ====================

    /// Queue a pointer event for the input task
    pub fn pointer(&self, event: PointerEvent) {
        if self.pointer_tx.send(event).is_err() {
            log::trace!("Pointer event dropped after dispose");
        }
    }

    pub fn pick(&self, point: Point) -> Option<BodyHandle> {
        self.scene.lock().pick(point)
    }

    pub fn menu(&self) -> Option<ContextMenu> {
        self.scene.lock().menu().cloned()
    }

    pub fn menu_action(&self, action: MenuAction) -> bool {
        self.scene.lock().menu_action(action)
    }

    pub fn toggle_rotation(&self, body: BodyHandle) -> Option<RotationState> {
        self.scene.lock().toggle_rotation(body)
    }

    pub fn set_scale(&self, body: BodyHandle, factor: f32) -> Result<()> {
        Ok(self.scene.lock().set_scale(body, factor)?)
    }

    pub fn set_scale_input(&self, input: &str) {
        self.scene.lock().set_scale_input(input);
    }

    pub fn submit_scale(&self) -> bool {
        self.scene.lock().submit_scale()
    }

    pub fn cancel_scale(&self) {
        self.scene.lock().cancel_scale();
    }

    // ==================== Lifecycle ====================

    /// Stop every task and tear the scene down. Later calls do nothing.
    pub fn dispose(&self) {
        if self.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.tasks.lock().abort_all();
        self.scene.lock().dispose();
        log::info!("Wall disposed");
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }
}

impl Drop for Wall {
    fn drop(&mut self) {
        self.dispose();
    }
}

// ==================== Tasks ====================

fn spawn_stepper(scene: SharedScene, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut last = Instant::now();
        loop {
            interval.tick().await;
            let now = Instant::now();
            let dt = now.duration_since(last).as_secs_f32();
            last = now;
            scene.lock().step(dt);
        }
    })
}

fn spawn_renderer(scene: SharedScene, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            scene.lock().render();
        }
    })
}

fn spawn_input(scene: SharedScene, mut events: mpsc::UnboundedReceiver<PointerEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            scene.lock().pointer(event);
        }
    })
}

fn spawn_release(scene: SharedScene, id: u64, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        loop {
            interval.tick().await;
            let tick = scene.lock().release_next(id);
            match tick {
                Ok(tick) if tick.is_final() => break,
                Ok(_) => {}
                Err(e) => {
                    log::warn!("Schedule {} stopped: {}", id, e);
                    break;
                }
            }
        }
    })
}
