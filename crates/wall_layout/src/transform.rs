//! Per-body transforms: rotation lock and rescale

use crate::config::LayoutConfig;
use crate::error::{LayoutError, Result};
use crate::registry::RegistryEntry;
use wall_physics::{PhysicsWorld, LOCKED_INERTIA};

/// Rotation state of a body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationState {
    Free,
    Locked,
}

/// Current rotation state, read from the body's inertia alone
pub fn rotation_state(world: &PhysicsWorld, entry: &RegistryEntry) -> Result<RotationState> {
    if world.inertia(entry.body)? == LOCKED_INERTIA {
        Ok(RotationState::Locked)
    } else {
        Ok(RotationState::Free)
    }
}

/// Flip the rotation lock of `entry`'s body and return the new state.
///
/// Locking saves the current inertia, levels the body and installs the
/// sentinel. Unlocking puts the saved inertia back unchanged.
pub fn toggle_rotation(world: &mut PhysicsWorld, entry: &mut RegistryEntry) -> Result<RotationState> {
    let state = match rotation_state(world, entry)? {
        RotationState::Locked => {
            world.set_inertia(entry.body, entry.saved_inertia)?;
            RotationState::Free
        }
        RotationState::Free => {
            entry.saved_inertia = world.inertia(entry.body)?;
            world.set_body_angle(entry.body, 0.0)?;
            world.set_inertia(entry.body, LOCKED_INERTIA)?;
            RotationState::Locked
        }
    };
    entry.item.rotation_locked = state == RotationState::Locked;
    log::debug!("Item '{}' rotation {:?}", entry.item.name, state);
    Ok(state)
}

/// Rescale `entry`'s body to `factor` times its base geometry.
///
/// Factors outside the configured range are refused without touching the
/// body or its sprite.
pub fn set_scale(
    world: &mut PhysicsWorld,
    entry: &mut RegistryEntry,
    factor: f32,
    config: &LayoutConfig,
) -> Result<()> {
    if !(config.min_scale..=config.max_scale).contains(&factor) {
        return Err(LayoutError::ScaleRejected {
            factor,
            min: config.min_scale,
            max: config.max_scale,
        });
    }

    let previous = world.body_state(entry.body)?.scale;
    world.scale_body(entry.body, factor)?;

    // A locked body keeps the sentinel; rescale what unlocking will restore
    if rotation_state(world, entry)? == RotationState::Locked && previous > 0.0 {
        entry.saved_inertia *= (factor / previous).powi(4);
    }

    entry.sprite.set_scale(config.sprite_scale * factor);
    entry.item.scale = factor;
    Ok(())
}
