//! Scene - the synchronous core of the wall
//!
//! Owns the physics world, the registry, the draining rearrange schedule,
//! pointer state and the canvas. Timers live outside: callers step the
//! world, render, and release batches on their own cadence.

use crate::config::LayoutConfig;
use crate::error::{LayoutError, Result};
use crate::interaction::{ContextMenu, InteractionController, MenuAction, PointerEvent, ScaleEdit};
use crate::item::Item;
use crate::registry::{ItemRegistry, RegistryEntry};
use crate::scheduler::{BatchScheduler, ReleaseSchedule};
use crate::transform::{self, RotationState};
use image::RgbaImage;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use wall_physics::{BodyDesc, BodyHandle, BodyShape, PhysicsConfig, PhysicsWorld, Point};
use wall_render::{Background, Canvas, Sprite};

/// Outcome of [`Scene::reconcile`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub added: usize,
    pub removed: usize,
}

/// Outcome of [`Scene::rearrange`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RearrangePlan {
    /// Schedule still holding batches, `None` if everything went in at once
    pub schedule: Option<u64>,
    /// Non-empty batch sizes in release order; the first is already placed
    pub batch_sizes: Vec<usize>,
}

impl RearrangePlan {
    pub fn total(&self) -> usize {
        self.batch_sizes.iter().sum()
    }
}

/// Result of one timer tick of a release schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseTick {
    /// A batch went in; `remaining` batches are still pending
    Released { count: usize, remaining: usize },
    /// The schedule is no longer the active one
    Superseded,
}

impl ReleaseTick {
    /// Whether the timer driving this schedule should stop
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Superseded | Self::Released { remaining: 0, .. })
    }
}

pub struct Scene {
    config: LayoutConfig,
    world: PhysicsWorld,
    registry: ItemRegistry,
    scheduler: BatchScheduler,
    interaction: InteractionController,
    boundaries: Vec<BodyHandle>,
    canvas: Canvas,
    background: Background,
    rng: StdRng,
    disposed: bool,
}

impl Scene {
    /// Create a scene with its boundary walls in place
    pub fn new(config: LayoutConfig, physics: PhysicsConfig) -> Result<Self> {
        Self::with_rng(config, physics, StdRng::from_entropy())
    }

    /// Create a scene with deterministic spawn positions and shuffles
    pub fn with_seed(config: LayoutConfig, physics: PhysicsConfig, seed: u64) -> Result<Self> {
        Self::with_rng(config, physics, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: LayoutConfig, physics: PhysicsConfig, rng: StdRng) -> Result<Self> {
        physics.validate()?;
        let mut world = PhysicsWorld::new(physics);
        world.set_drag_stiffness(config.drag_stiffness);

        let boundaries = Self::build_boundaries(&mut world, &config)?;
        let (width, height) = config.canvas_size();

        log::info!(
            "Scene created: {}x{} container, {} segments, sigma {}",
            config.width,
            config.height,
            config.segments,
            config.sigma
        );

        Ok(Self {
            scheduler: BatchScheduler::new(config.segments, config.sigma),
            world,
            registry: ItemRegistry::new(),
            interaction: InteractionController::new(),
            boundaries,
            canvas: Canvas::new(width, height),
            background: Background::default(),
            rng,
            disposed: false,
            config,
        })
    }

    /// Floor and side walls whose inner edges sit on the container edges
    fn build_boundaries(world: &mut PhysicsWorld, config: &LayoutConfig) -> Result<Vec<BodyHandle>> {
        let (w, h) = (config.width, config.height);
        let t = config.wall_thickness;
        let pad = config.wall_pad();

        let walls = [
            ("floor", [w / 2.0, h + pad], (w, t)),
            ("left-wall", [-pad, h / 2.0], (t, h)),
            ("right-wall", [w + pad, h / 2.0], (t - 1.0, h)),
        ];

        let mut handles = Vec::with_capacity(walls.len());
        for (label, position, (width, height)) in walls {
            let handle = world.create_body(
                BodyDesc::fixed(BodyShape::rectangle(width, height))
                    .with_label(label)
                    .with_position(position[0], position[1]),
            )?;
            handles.push(handle);
        }
        Ok(handles)
    }

    // ==================== Items ====================

    /// Add a body for `item` unless one with the same name exists.
    /// Returns whether a body was created.
    pub fn add_body(&mut self, item: Item) -> Result<bool> {
        self.ensure_live()?;
        if self.registry.contains(&item.name) {
            return Ok(false);
        }

        let x = self.spawn_x();
        let material = self.world.config().material;
        let body = self.world.create_body(
            BodyDesc::dynamic(item.shape())
                .with_label(item.name.clone())
                .with_position(x, 0.0)
                .with_material(material),
        )?;

        let saved_inertia = self.world.inertia(body)?;
        let sprite = Sprite::new(item.texture.clone(), self.config.sprite_scale);
        let (scale, locked) = (item.scale, item.rotation_locked);
        let name = item.name.clone();
        self.registry.insert(RegistryEntry {
            item,
            body,
            saved_inertia,
            sprite,
        });

        // Carry transforms over from a previous life of the item
        if let Some(entry) = self.registry.get_mut(&name) {
            if scale != 1.0 {
                if let Err(e) = transform::set_scale(&mut self.world, entry, scale, &self.config) {
                    log::debug!("Item '{}' keeps scale 1: {}", name, e);
                    entry.item.scale = 1.0;
                }
            }
            if locked {
                transform::toggle_rotation(&mut self.world, entry)?;
            }
        }

        log::debug!("Added '{}' at x = {:.1}", name, x);
        Ok(true)
    }

    /// Remove the body for `name`. Returns whether one existed.
    pub fn remove_body(&mut self, name: &str) -> bool {
        let Some(entry) = self.registry.remove(name) else {
            return false;
        };
        self.interaction.forget(entry.body);
        self.world.remove_body(entry.body);
        log::debug!("Removed '{}'", name);
        true
    }

    /// Make the registered set equal to `desired`, keeping bodies for names
    /// that stay. Cancels any draining rearrange.
    pub fn reconcile(&mut self, desired: &[Item]) -> Result<ReconcileReport> {
        self.ensure_live()?;
        self.scheduler.cancel();

        let mut report = ReconcileReport::default();
        for name in self.registry.stale_names(desired) {
            if self.remove_body(&name) {
                report.removed += 1;
            }
        }
        for item in desired {
            if self.add_body(item.clone())? {
                report.added += 1;
            }
        }

        log::info!(
            "Reconciled: {} added, {} removed, {} on wall",
            report.added,
            report.removed,
            self.registry.len()
        );
        Ok(report)
    }

    // ==================== Rearrange ====================

    /// Empty the wall and schedule every current item to fall back in.
    ///
    /// Items still pending in a superseded schedule are planned again with
    /// the rest, so each item lands exactly once. The first batch is placed
    /// immediately; the rest wait for [`Scene::release_next`] calls with the
    /// returned schedule id.
    pub fn rearrange(&mut self) -> Result<RearrangePlan> {
        self.ensure_live()?;
        let pending = self
            .scheduler
            .cancel()
            .map(ReleaseSchedule::into_items)
            .unwrap_or_default();

        let entries = self.registry.drain();
        let mut items = Vec::with_capacity(entries.len() + pending.len());
        for entry in entries {
            self.interaction.forget(entry.body);
            self.world.remove_body(entry.body);
            items.push(entry.item);
        }
        let placed: HashSet<String> = items.iter().map(|item| item.name.clone()).collect();
        items.extend(pending.into_iter().filter(|item| !placed.contains(&item.name)));

        let mut schedule = self.scheduler.plan(items, &mut self.rng);
        let batch_sizes = schedule.batch_sizes();

        let Some(first) = schedule.pop_batch() else {
            return Ok(RearrangePlan {
                schedule: None,
                batch_sizes,
            });
        };
        for item in first {
            self.add_body(item)?;
        }

        let pending = if schedule.is_drained() {
            None
        } else {
            let id = schedule.id;
            self.scheduler.activate(schedule);
            Some(id)
        };

        log::info!("Rearrange: batches {:?}", batch_sizes);
        Ok(RearrangePlan {
            schedule: pending,
            batch_sizes,
        })
    }

    /// Place the next batch of schedule `id`
    pub fn release_next(&mut self, id: u64) -> Result<ReleaseTick> {
        if self.disposed {
            return Ok(ReleaseTick::Superseded);
        }
        let Some(batch) = self.scheduler.next_batch(id) else {
            return Ok(ReleaseTick::Superseded);
        };

        let count = batch.len();
        for item in batch {
            self.add_body(item)?;
        }
        let remaining = match self.scheduler.active() {
            Some(schedule) if schedule.id == id => schedule.remaining_batches(),
            _ => 0,
        };
        if remaining == 0 {
            log::debug!("Schedule {} drained", id);
        }
        Ok(ReleaseTick::Released { count, remaining })
    }

    /// Id of the schedule still draining
    pub fn active_schedule(&self) -> Option<u64> {
        self.scheduler.active_id()
    }

    /// Drop the draining schedule; its pending items are not placed
    pub fn cancel_schedule(&mut self) -> Option<u64> {
        self.scheduler.cancel().map(|s| s.id)
    }

    // ==================== Simulation ====================

    pub fn step(&mut self, delta_time: f32) {
        if !self.disposed {
            self.world.step(delta_time);
        }
    }

    /// Repaint the canvas from the current body states
    pub fn render(&mut self) {
        if self.disposed {
            return;
        }
        self.canvas.clear(self.background.canvas_fill());

        for entry in self.registry.entries() {
            let Ok(state) = self.world.body_state(entry.body) else {
                continue;
            };
            match &entry.sprite.texture {
                Some(texture) => self.canvas.draw_sprite(
                    texture,
                    state.position,
                    state.angle,
                    entry.sprite.x_scale,
                    entry.sprite.y_scale,
                ),
                None => {
                    if let Ok(hull) = self.world.world_hull(entry.body) {
                        self.canvas.fill_polygon(&hull, entry.sprite.fill);
                    }
                }
            }
        }
    }

    // ==================== Interaction ====================

    /// Body under `point`, see [`InteractionController::pick`]
    pub fn pick(&self, point: Point) -> Option<BodyHandle> {
        InteractionController::pick(&self.world, point)
    }

    pub fn pointer(&mut self, event: PointerEvent) {
        if !self.disposed {
            self.interaction.handle_pointer(&mut self.world, event);
        }
    }

    pub fn menu(&self) -> Option<&ContextMenu> {
        self.interaction.menu()
    }

    pub fn dismiss_menu(&mut self) {
        self.interaction.take_menu();
    }

    /// Run a menu action on the menu's body and close the menu.
    /// Returns false when no menu was open.
    pub fn menu_action(&mut self, action: MenuAction) -> bool {
        let Some(menu) = self.interaction.take_menu() else {
            return false;
        };
        match action {
            MenuAction::Rotate => {
                self.toggle_rotation(menu.body);
            }
            MenuAction::Scale => self.interaction.open_scale_edit(menu.body),
        }
        true
    }

    pub fn scale_edit(&self) -> Option<&ScaleEdit> {
        self.interaction.scale_edit()
    }

    pub fn set_scale_input(&mut self, input: impl Into<String>) {
        self.interaction.set_scale_input(input);
    }

    /// Apply the pending scale input. Invalid input leaves the dialog open
    /// and the body untouched. Returns whether the scale was applied.
    pub fn submit_scale(&mut self) -> bool {
        let Some(edit) = self.interaction.scale_edit() else {
            return false;
        };
        let body = edit.body;
        let Some(factor) = edit.value() else {
            return false;
        };

        match self.set_scale(body, factor) {
            Ok(()) => {
                self.interaction.close_scale_edit();
                true
            }
            Err(LayoutError::ScaleRejected { .. }) => false,
            Err(e) => {
                log::warn!("Scale dialog closed: {}", e);
                self.interaction.close_scale_edit();
                false
            }
        }
    }

    pub fn cancel_scale(&mut self) {
        self.interaction.close_scale_edit();
    }

    // ==================== Transforms ====================

    /// Toggle the rotation lock of `body`; `None` if it is not an item body
    pub fn toggle_rotation(&mut self, body: BodyHandle) -> Option<RotationState> {
        let name = self.registry.name_of(body)?.to_string();
        let entry = self.registry.get_mut(&name)?;
        match transform::toggle_rotation(&mut self.world, entry) {
            Ok(state) => Some(state),
            Err(e) => {
                log::warn!("Rotation toggle on '{}' failed: {}", name, e);
                None
            }
        }
    }

    pub fn rotation_state(&self, body: BodyHandle) -> Option<RotationState> {
        let entry = self.registry.get(self.registry.name_of(body)?)?;
        transform::rotation_state(&self.world, entry).ok()
    }

    /// Rescale `body` to `factor` times its base geometry
    pub fn set_scale(&mut self, body: BodyHandle, factor: f32) -> Result<()> {
        let name = self
            .registry
            .name_of(body)
            .map(str::to_string)
            .ok_or_else(|| LayoutError::UnknownItem(format!("{:?}", body)))?;
        let entry = self
            .registry
            .get_mut(&name)
            .ok_or_else(|| LayoutError::UnknownItem(name.clone()))?;
        transform::set_scale(&mut self.world, entry, factor, &self.config)
    }

    // ==================== Background & capture ====================

    pub fn set_background(&mut self, reference: &str) {
        self.background = Background::parse(reference);
        log::debug!("Background set to {:?}", self.background);
    }

    pub fn background(&self) -> &Background {
        &self.background
    }

    /// Copy of the live canvas
    pub fn snapshot_canvas(&self) -> RgbaImage {
        self.canvas.snapshot()
    }

    /// PNG of the live canvas
    pub fn encode_canvas(&self) -> Result<Vec<u8>> {
        Ok(self.canvas.encode_png()?)
    }

    // ==================== Lifecycle ====================

    /// Tear everything down. Safe to call more than once.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.scheduler.cancel();
        self.interaction.reset();
        self.world.end_drag();
        self.registry.clear();
        self.world.clear();
        self.boundaries.clear();
        self.canvas.release();
        self.disposed = true;
        log::info!("Scene disposed");
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    fn ensure_live(&self) -> Result<()> {
        if self.disposed {
            Err(LayoutError::Disposed)
        } else {
            Ok(())
        }
    }

    fn spawn_x(&mut self) -> f32 {
        let margin = self.config.spawn_margin;
        let max = self.config.width - margin;
        if max > margin {
            self.rng.gen_range(margin..=max)
        } else {
            self.config.width / 2.0
        }
    }

    // ==================== Accessors ====================

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn world(&self) -> &PhysicsWorld {
        &self.world
    }

    pub fn registry(&self) -> &ItemRegistry {
        &self.registry
    }

    pub fn boundaries(&self) -> &[BodyHandle] {
        &self.boundaries
    }

    /// Body currently simulating `name`
    pub fn body_of(&self, name: &str) -> Option<BodyHandle> {
        self.registry.get(name).map(|entry| entry.body)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.registry.names().map(str::to_string).collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use wall_physics::BodyKind;

    fn scene() -> Scene {
        Scene::with_seed(LayoutConfig::default(), PhysicsConfig::default(), 42).unwrap()
    }

    #[test]
    fn test_boundaries_line_up_with_container() {
        let scene = scene();
        let world = scene.world();
        assert_eq!(scene.boundaries().len(), 3);

        let floor = world.bounds(scene.boundaries()[0]).unwrap();
        let left = world.bounds(scene.boundaries()[1]).unwrap();
        let right = world.bounds(scene.boundaries()[2]).unwrap();
        assert!((floor.min[1] - 499.0).abs() < 1e-3);
        assert!((left.max[0] - 1.0).abs() < 1e-3);
        assert!((right.min[0] - 1199.5).abs() < 1e-3);
        for handle in scene.boundaries() {
            assert_eq!(world.body_state(*handle).unwrap().kind, BodyKind::Static);
        }
    }

    #[test]
    fn test_add_body_spawns_at_top_within_margin() {
        let mut scene = scene();
        assert!(scene.add_body(Item::new("rust", 40.0, 40.0)).unwrap());
        assert!(!scene.add_body(Item::new("rust", 80.0, 80.0)).unwrap());

        let body = scene.body_of("rust").unwrap();
        let [x, y] = scene.world().body_position(body).unwrap();
        assert!((50.0..=1150.0).contains(&x));
        assert_eq!(y, 0.0);
        assert_eq!(
            scene.registry().get("rust").unwrap().saved_inertia,
            scene.world().inertia(body).unwrap()
        );
    }

    #[test]
    fn test_render_paints_background_and_bodies() {
        let mut scene = scene();
        scene.set_background("#102030");
        scene.add_body(Item::new("box", 60.0, 60.0)).unwrap();
        scene.render();

        let body = scene.body_of("box").unwrap();
        let [x, _] = scene.world().body_position(body).unwrap();
        let canvas = scene.snapshot_canvas();
        assert_eq!(canvas.get_pixel(5, 400).0, [0x10, 0x20, 0x30, 255]);
        assert_ne!(canvas.get_pixel(x as u32, 10).0, [0x10, 0x20, 0x30, 255]);
    }

    #[test]
    fn test_later_items_paint_over_earlier_ones() {
        let physics = PhysicsConfig {
            gravity: [0.0, 0.0],
            ..PhysicsConfig::default()
        };
        let mut scene = Scene::with_seed(LayoutConfig::default(), physics, 7).unwrap();
        let colours = [
            ("red", [255, 0, 0, 255]),
            ("green", [0, 255, 0, 255]),
            ("blue", [0, 0, 255, 255]),
            ("yellow", [255, 255, 0, 255]),
            ("cyan", [0, 255, 255, 255]),
        ];
        for (name, rgba) in colours {
            let texture = Arc::new(RgbaImage::from_pixel(40, 40, image::Rgba(rgba)));
            scene
                .add_body(Item::new(name, 40.0, 40.0).with_texture(texture))
                .unwrap();
            let body = scene.body_of(name).unwrap();
            scene.world.set_body_position(body, 600.0, 250.0).unwrap();
        }

        // Stable across repeated renders and independent of name hashing
        for _ in 0..3 {
            scene.render();
            assert_eq!(scene.snapshot_canvas().get_pixel(600, 250).0, [0, 255, 255, 255]);
        }

        scene.remove_body("cyan");
        scene.render();
        assert_eq!(scene.snapshot_canvas().get_pixel(600, 250).0, [255, 255, 0, 255]);
    }

    #[test]
    fn test_menu_actions() {
        let mut scene = Scene::with_seed(
            LayoutConfig::default(),
            PhysicsConfig::default().with_gravity(0.0, 0.0),
            3,
        )
        .unwrap();
        scene.add_body(Item::new("box", 40.0, 40.0)).unwrap();
        let body = scene.body_of("box").unwrap();
        let at = scene.world().body_position(body).unwrap();

        use crate::interaction::{PointerButton, PointerKind};
        let open = PointerEvent::new(PointerKind::Down(PointerButton::Secondary), at);

        scene.pointer(open);
        assert!(scene.menu_action(MenuAction::Rotate));
        assert_eq!(scene.rotation_state(body), Some(RotationState::Locked));
        assert!(scene.menu().is_none());

        scene.pointer(open);
        assert!(scene.menu_action(MenuAction::Scale));
        scene.set_scale_input("5");
        assert!(!scene.submit_scale());
        assert!(scene.scale_edit().is_some());

        scene.set_scale_input("2");
        assert!(scene.submit_scale());
        assert!(scene.scale_edit().is_none());
        assert_eq!(scene.registry().get("box").unwrap().item.scale, 2.0);

        assert!(!scene.menu_action(MenuAction::Rotate));
    }

    #[test]
    fn test_dispose_is_idempotent() {
        let mut scene = scene();
        scene.add_body(Item::new("a", 10.0, 10.0)).unwrap();
        scene.dispose();
        scene.dispose();

        assert!(scene.is_disposed());
        assert_eq!(scene.world().body_count(), 0);
        assert!(scene.registry().is_empty());
        assert!(matches!(scene.add_body(Item::new("b", 10.0, 10.0)), Err(LayoutError::Disposed)));
        assert_eq!(scene.release_next(1).unwrap(), ReleaseTick::Superseded);
    }
}
