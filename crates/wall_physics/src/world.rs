//! The simulated container: Rapier sets plus per-body geometry records

use crate::body::{BodyDesc, BodyHandle, BodyKind, BodyState};
use crate::config::PhysicsConfig;
use crate::constraint::DragConstraint;
use crate::error::{PhysicsError, Result};
use crate::query::BodyQuery;
use crate::shape::{self, Aabb, Point};
use rapier2d::prelude as rapier;
use std::collections::HashMap;
use std::num::NonZeroUsize;

/// Inertia value reserved to mark a body as rotation-locked
pub const LOCKED_INERTIA: f32 = f32::INFINITY;

/// Per-body data kept next to the Rapier sets
#[derive(Debug, Clone)]
pub(crate) struct BodyRecord {
    pub(crate) kind: BodyKind,
    pub(crate) label: String,
    pub(crate) collider: rapier::ColliderHandle,
    /// Centred hull at scale 1
    pub(crate) base_hull: Vec<Point>,
    /// Centred hull at the current scale
    pub(crate) hull: Vec<Point>,
    pub(crate) scale: f32,
    pub(crate) density: f32,
    pub(crate) mass: f32,
    pub(crate) inertia: f32,
}

/// Mass properties handed to the solver. Dynamic colliders carry no density,
/// so these are the body's whole mass and inertia.
fn solver_mass(mass: f32, inertia: f32) -> rapier::MassProperties {
    rapier::MassProperties::new(rapier::Point::origin(), mass, inertia)
}

/// Icon container simulation
pub struct PhysicsWorld {
    config: PhysicsConfig,
    pipeline: rapier::PhysicsPipeline,
    gravity: rapier::Vector<f32>,
    integration_params: rapier::IntegrationParameters,
    islands: rapier::IslandManager,
    broad_phase: rapier::DefaultBroadPhase,
    narrow_phase: rapier::NarrowPhase,
    impulse_joints: rapier::ImpulseJointSet,
    multibody_joints: rapier::MultibodyJointSet,
    ccd_solver: rapier::CCDSolver,
    bodies: rapier::RigidBodySet,
    colliders: rapier::ColliderSet,
    /// Geometry, label and inertia per body
    records: HashMap<BodyHandle, BodyRecord>,
    drag: DragConstraint,
    /// Unsimulated time carried to the next `step`
    accumulated_time: f32,
}

impl PhysicsWorld {
    pub fn new(config: PhysicsConfig) -> Self {
        let gravity = rapier::Vector::new(config.gravity[0], config.gravity[1]);

        let mut integration_params = rapier::IntegrationParameters::default();
        integration_params.dt = config.timestep;
        integration_params.num_solver_iterations =
            NonZeroUsize::new(config.velocity_iterations).unwrap_or(NonZeroUsize::MIN);

        Self {
            config,
            pipeline: rapier::PhysicsPipeline::new(),
            gravity,
            integration_params,
            islands: rapier::IslandManager::new(),
            broad_phase: rapier::DefaultBroadPhase::new(),
            narrow_phase: rapier::NarrowPhase::new(),
            impulse_joints: rapier::ImpulseJointSet::new(),
            multibody_joints: rapier::MultibodyJointSet::new(),
            ccd_solver: rapier::CCDSolver::new(),
            bodies: rapier::RigidBodySet::new(),
            colliders: rapier::ColliderSet::new(),
            records: HashMap::new(),
            drag: DragConstraint::default(),
            accumulated_time: 0.0,
        }
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Gravity in px/s²
    pub fn set_gravity(&mut self, x: f32, y: f32) {
        self.gravity = rapier::Vector::new(x, y);
    }

    pub fn gravity(&self) -> [f32; 2] {
        [self.gravity.x, self.gravity.y]
    }

    // ==================== Bodies ====================

    /// Create a rigid body with a single hull collider
    pub fn create_body(&mut self, desc: BodyDesc) -> Result<BodyHandle> {
        let hull = desc.shape.local_hull()?;
        let mass = shape::polygon_area(&hull) * desc.material.density;
        let (inertia, collider_density, builder) = match desc.kind {
            BodyKind::Static => (LOCKED_INERTIA, desc.material.density, desc.rigid_body()),
            BodyKind::Dynamic => {
                let inertia = shape::polygon_inertia(&hull, mass);
                let builder = desc
                    .rigid_body()
                    .additional_mass_properties(solver_mass(mass, inertia));
                (inertia, 0.0, builder)
            }
        };

        let collider = rapier::ColliderBuilder::new(shape::to_rapier(&hull)?)
            .friction(desc.material.friction)
            .restitution(desc.material.restitution)
            .density(collider_density)
            .build();

        let raw = self.bodies.insert(builder);
        let collider = self
            .colliders
            .insert_with_parent(collider, raw, &mut self.bodies);
        if let Some(body) = self.bodies.get_mut(raw) {
            body.recompute_mass_properties_from_colliders(&self.colliders);
        }

        let handle = BodyHandle(raw);

        log::trace!("Created {:?} body '{}' ({} hull points)", desc.kind, desc.label, hull.len());

        self.records.insert(
            handle,
            BodyRecord {
                kind: desc.kind,
                label: desc.label,
                collider,
                base_hull: hull.clone(),
                hull,
                scale: 1.0,
                density: desc.material.density,
                mass,
                inertia,
            },
        );
        Ok(handle)
    }

    /// Remove a rigid body and its collider. Returns false if it was absent.
    pub fn remove_body(&mut self, handle: BodyHandle) -> bool {
        if self.drag.body() == Some(handle) {
            self.drag.release();
        }
        self.records.remove(&handle);
        self.bodies
            .remove(
                handle.0,
                &mut self.islands,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                true, // Remove attached colliders
            )
            .is_some()
    }

    /// Remove every body, static ones included
    pub fn clear(&mut self) {
        let handles: Vec<BodyHandle> = self.records.keys().copied().collect();
        for handle in handles {
            self.remove_body(handle);
        }
        self.accumulated_time = 0.0;
    }

    /// Check whether a body is still in the world
    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.records.contains_key(&handle)
    }

    /// All body handles, in unspecified order
    pub fn handles(&self) -> impl Iterator<Item = BodyHandle> + '_ {
        self.records.keys().copied()
    }

    /// Label of a body
    pub fn label(&self, handle: BodyHandle) -> Option<&str> {
        self.records.get(&handle).map(|r| r.label.as_str())
    }

    /// Snapshot of a body's state
    pub fn body_state(&self, handle: BodyHandle) -> Result<BodyState> {
        let record = self.record(handle)?;
        let body = self
            .bodies
            .get(handle.0)
            .ok_or(PhysicsError::BodyNotFound(handle))?;
        let pos = body.translation();
        let vel = body.linvel();
        Ok(BodyState {
            kind: record.kind,
            label: record.label.clone(),
            position: [pos.x, pos.y],
            angle: body.rotation().angle(),
            linear_velocity: [vel.x, vel.y],
            angular_velocity: body.angvel(),
            inertia: record.inertia,
            scale: record.scale,
        })
    }

    /// Centroid position
    pub fn body_position(&self, handle: BodyHandle) -> Result<Point> {
        self.bodies
            .get(handle.0)
            .map(|b| {
                let pos = b.translation();
                [pos.x, pos.y]
            })
            .ok_or(PhysicsError::BodyNotFound(handle))
    }

    /// Teleport the centroid
    pub fn set_body_position(&mut self, handle: BodyHandle, x: f32, y: f32) -> Result<()> {
        self.bodies
            .get_mut(handle.0)
            .map(|b| b.set_translation(rapier::Vector::new(x, y), true))
            .ok_or(PhysicsError::BodyNotFound(handle))
    }

    /// Angle in radians
    pub fn body_angle(&self, handle: BodyHandle) -> Result<f32> {
        self.bodies
            .get(handle.0)
            .map(|b| b.rotation().angle())
            .ok_or(PhysicsError::BodyNotFound(handle))
    }

    pub fn set_body_angle(&mut self, handle: BodyHandle, angle: f32) -> Result<()> {
        self.bodies
            .get_mut(handle.0)
            .map(|b| b.set_rotation(rapier::Rotation::new(angle), true))
            .ok_or(PhysicsError::BodyNotFound(handle))
    }

    pub fn set_body_linear_velocity(&mut self, handle: BodyHandle, x: f32, y: f32) -> Result<()> {
        self.bodies
            .get_mut(handle.0)
            .map(|b| b.set_linvel(rapier::Vector::new(x, y), true))
            .ok_or(PhysicsError::BodyNotFound(handle))
    }

    // ==================== Inertia ====================

    /// Current moment of inertia
    pub fn inertia(&self, handle: BodyHandle) -> Result<f32> {
        self.record(handle).map(|r| r.inertia)
    }

    /// Set the moment of inertia.
    ///
    /// [`LOCKED_INERTIA`] locks rotation in the solver; any finite value
    /// unlocks it and becomes the solver's inertia. The stored value is
    /// returned verbatim by [`Self::inertia`].
    pub fn set_inertia(&mut self, handle: BodyHandle, inertia: f32) -> Result<()> {
        let body = self
            .bodies
            .get_mut(handle.0)
            .ok_or(PhysicsError::BodyNotFound(handle))?;
        let record = self
            .records
            .get_mut(&handle)
            .ok_or(PhysicsError::BodyNotFound(handle))?;

        if inertia == LOCKED_INERTIA {
            body.lock_rotations(true, true);
            body.set_angvel(0.0, true);
        } else {
            if record.kind == BodyKind::Dynamic {
                body.set_additional_mass_properties(solver_mass(record.mass, inertia), true);
                body.recompute_mass_properties_from_colliders(&self.colliders);
            }
            body.lock_rotations(false, true);
        }
        record.inertia = inertia;
        Ok(())
    }

    /// Angular inertia the solver integrates with, ignoring rotation locks
    pub fn solver_inertia(&self, handle: BodyHandle) -> Result<f32> {
        self.bodies
            .get(handle.0)
            .map(|b| b.mass_properties().local_mprops.principal_inertia())
            .ok_or(PhysicsError::BodyNotFound(handle))
    }

    // ==================== Geometry ====================

    /// Rescale the body's geometry to `factor` times its base hull
    pub fn scale_body(&mut self, handle: BodyHandle, factor: f32) -> Result<()> {
        let record = self
            .records
            .get_mut(&handle)
            .ok_or(PhysicsError::BodyNotFound(handle))?;

        let hull = shape::scale_points(&record.base_hull, factor);
        let shared = shape::to_rapier(&hull)?;
        if let Some(collider) = self.colliders.get_mut(record.collider) {
            collider.set_shape(shared);
        }

        record.mass = shape::polygon_area(&hull) * record.density;
        let geometric = shape::polygon_inertia(&hull, record.mass);
        if record.inertia != LOCKED_INERTIA {
            record.inertia = geometric;
        }
        record.hull = hull;
        record.scale = factor;

        if let Some(body) = self.bodies.get_mut(handle.0) {
            if record.kind == BodyKind::Dynamic {
                body.set_additional_mass_properties(solver_mass(record.mass, geometric), true);
                body.recompute_mass_properties_from_colliders(&self.colliders);
            }
            body.wake_up(true);
        }
        Ok(())
    }

    /// Hull of a body in world coordinates
    pub fn world_hull(&self, handle: BodyHandle) -> Result<Vec<Point>> {
        let record = self.record(handle)?;
        let body = self
            .bodies
            .get(handle.0)
            .ok_or(PhysicsError::BodyNotFound(handle))?;
        let pos = body.translation();
        Ok(shape::transform_points(
            &record.hull,
            [pos.x, pos.y],
            body.rotation().angle(),
        ))
    }

    /// Axis-aligned bounds of a body in world coordinates
    pub fn bounds(&self, handle: BodyHandle) -> Result<Aabb> {
        let hull = self.world_hull(handle)?;
        Aabb::from_points(&hull).ok_or(PhysicsError::BodyNotFound(handle))
    }

    // ==================== Drag ====================

    /// Set the drag spring stiffness
    pub fn set_drag_stiffness(&mut self, stiffness: f32) {
        self.drag.stiffness = stiffness.clamp(0.0, 1.0);
    }

    /// Grab `handle` at world point `at`
    pub fn begin_drag(&mut self, handle: BodyHandle, at: Point) -> Result<()> {
        let body = self
            .bodies
            .get(handle.0)
            .ok_or(PhysicsError::BodyNotFound(handle))?;
        let pos = body.translation();
        let anchor = shape::to_local(at, [pos.x, pos.y], body.rotation().angle());
        self.drag.attach(handle, anchor, at);
        Ok(())
    }

    /// Move the pointer end of an active drag
    pub fn drag_to(&mut self, at: Point) {
        self.drag.set_target(at);
    }

    /// Drop the grabbed body
    pub fn end_drag(&mut self) {
        self.drag.release();
    }

    /// Body currently grabbed
    pub fn dragged_body(&self) -> Option<BodyHandle> {
        self.drag.body()
    }

    fn apply_drag(&mut self) {
        let Some((handle, anchor, target)) = self.drag.anchor() else {
            return;
        };
        let Some(body) = self.bodies.get_mut(handle.0) else {
            self.drag.release();
            return;
        };

        let pos = body.translation();
        let grabbed = shape::transform_points(&[anchor], [pos.x, pos.y], body.rotation().angle())[0];
        let k = self.drag.stiffness / self.config.timestep;
        body.set_linvel(
            rapier::Vector::new((target[0] - grabbed[0]) * k, (target[1] - grabbed[1]) * k),
            true,
        );
    }

    // ==================== Simulation ====================

    /// Advance by `delta_time` seconds in fixed steps, at most `max_substeps` of them
    pub fn step(&mut self, delta_time: f32) {
        self.accumulated_time += delta_time;

        let mut steps = 0;
        while self.accumulated_time >= self.config.timestep && steps < self.config.max_substeps {
            self.step_internal();
            self.accumulated_time -= self.config.timestep;
            steps += 1;
        }

        // Drop backlog the substep cap could not absorb
        if steps == self.config.max_substeps {
            self.accumulated_time = self.accumulated_time.min(self.config.timestep);
        }
    }

    fn step_internal(&mut self) {
        self.apply_drag();

        self.pipeline.step(
            &self.gravity,
            &self.integration_params,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            None,
            &(),
            &(),
        );
    }

    // ==================== Queries ====================

    /// Bounds picking
    pub fn query(&self) -> BodyQuery<'_> {
        BodyQuery { world: self }
    }

    pub(crate) fn records(&self) -> &HashMap<BodyHandle, BodyRecord> {
        &self.records
    }

    fn record(&self, handle: BodyHandle) -> Result<&BodyRecord> {
        self.records
            .get(&handle)
            .ok_or(PhysicsError::BodyNotFound(handle))
    }

    // ==================== Counts ====================

    /// Bodies in the world, boundaries included
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn dynamic_body_count(&self) -> usize {
        self.records
            .values()
            .filter(|r| r.kind == BodyKind::Dynamic)
            .count()
    }

    pub fn collider_count(&self) -> usize {
        self.colliders.len()
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new(PhysicsConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::BodyShape;
    use approx::assert_relative_eq;

    fn square(world: &mut PhysicsWorld, x: f32, y: f32) -> BodyHandle {
        world
            .create_body(
                BodyDesc::dynamic(BodyShape::rectangle(40.0, 40.0))
                    .with_label("square")
                    .with_position(x, y),
            )
            .unwrap()
    }

    #[test]
    fn test_create_world() {
        let world = PhysicsWorld::new(PhysicsConfig::default());
        assert_eq!(world.body_count(), 0);
        assert_eq!(world.collider_count(), 0);
    }

    #[test]
    fn test_create_and_remove_body() {
        let mut world = PhysicsWorld::new(PhysicsConfig::default());
        let body = square(&mut world, 100.0, 0.0);

        assert_eq!(world.body_count(), 1);
        assert_eq!(world.collider_count(), 1);
        assert_eq!(world.label(body), Some("square"));

        assert!(world.remove_body(body));
        assert!(!world.remove_body(body));
        assert_eq!(world.body_count(), 0);
        assert_eq!(world.collider_count(), 0);
    }

    #[test]
    fn test_gravity_fall() {
        let mut world = PhysicsWorld::new(PhysicsConfig::default());
        let body = square(&mut world, 100.0, 0.0);

        let initial_y = world.body_position(body).unwrap()[1];
        for _ in 0..60 {
            world.step(1.0 / 60.0);
        }
        let final_y = world.body_position(body).unwrap()[1];

        assert!(final_y > initial_y, "Body should fall toward +y");
    }

    #[test]
    fn test_floor_stops_body() {
        let mut world = PhysicsWorld::new(PhysicsConfig::default());
        world
            .create_body(BodyDesc::fixed(BodyShape::rectangle(400.0, 100.0)).with_position(200.0, 250.0))
            .unwrap();
        let body = square(&mut world, 200.0, 0.0);

        for _ in 0..240 {
            world.step(1.0 / 60.0);
        }

        // Floor top edge is at y = 200; the square's centre rests 20 above it.
        let y = world.body_position(body).unwrap()[1];
        assert!(y < 200.0, "Body fell through the floor: y = {}", y);
    }

    #[test]
    fn test_inertia_sentinel_round_trip() {
        let mut world = PhysicsWorld::new(PhysicsConfig::default());
        let body = square(&mut world, 100.0, 0.0);
        let original = world.inertia(body).unwrap();
        assert!(original.is_finite() && original > 0.0);

        world.set_inertia(body, LOCKED_INERTIA).unwrap();
        assert_eq!(world.inertia(body).unwrap(), LOCKED_INERTIA);

        world.set_inertia(body, original).unwrap();
        assert_eq!(world.inertia(body).unwrap().to_bits(), original.to_bits());
    }

    #[test]
    fn test_finite_inertia_reaches_solver() {
        let mut world = PhysicsWorld::new(PhysicsConfig::default());
        let body = square(&mut world, 100.0, 0.0);
        let original = world.inertia(body).unwrap();
        assert_relative_eq!(world.solver_inertia(body).unwrap(), original, max_relative = 1e-4);

        world.set_inertia(body, 120.0).unwrap();
        assert_eq!(world.inertia(body).unwrap(), 120.0);
        assert_relative_eq!(world.solver_inertia(body).unwrap(), 120.0, max_relative = 1e-4);

        world.set_inertia(body, LOCKED_INERTIA).unwrap();
        world.set_inertia(body, original).unwrap();
        assert_relative_eq!(world.solver_inertia(body).unwrap(), original, max_relative = 1e-4);

        world.scale_body(body, 2.0).unwrap();
        assert_relative_eq!(world.solver_inertia(body).unwrap(), original * 16.0, max_relative = 1e-3);
    }

    #[test]
    fn test_scale_is_absolute_from_base() {
        let mut world = PhysicsWorld::new(PhysicsConfig::default());
        let body = square(&mut world, 100.0, 100.0);
        let base = world.bounds(body).unwrap();

        world.scale_body(body, 2.0).unwrap();
        world.scale_body(body, 2.0).unwrap();
        let scaled = world.bounds(body).unwrap();

        assert_relative_eq!(scaled.width(), base.width() * 2.0, epsilon = 1e-3);
        assert_relative_eq!(scaled.height(), base.height() * 2.0, epsilon = 1e-3);
        assert_relative_eq!(world.body_state(body).unwrap().scale, 2.0);
    }

    #[test]
    fn test_drag_pulls_body_toward_pointer() {
        let mut world = PhysicsWorld::new(PhysicsConfig::default().with_gravity(0.0, 0.0));
        let body = square(&mut world, 100.0, 100.0);

        world.begin_drag(body, [100.0, 100.0]).unwrap();
        world.drag_to([200.0, 100.0]);
        for _ in 0..30 {
            world.step(1.0 / 60.0);
        }

        let x = world.body_position(body).unwrap()[0];
        assert!(x > 150.0, "Drag should move the body toward the pointer, x = {}", x);

        world.remove_body(body);
        assert_eq!(world.dragged_body(), None);
    }

    #[test]
    fn test_clear_removes_everything() {
        let mut world = PhysicsWorld::new(PhysicsConfig::default());
        square(&mut world, 10.0, 10.0);
        square(&mut world, 60.0, 10.0);
        world
            .create_body(BodyDesc::fixed(BodyShape::rectangle(100.0, 10.0)))
            .unwrap();

        world.clear();
        assert_eq!(world.body_count(), 0);
        assert_eq!(world.handles().count(), 0);
    }
}
