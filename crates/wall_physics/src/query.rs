//! Physics queries (point picking)

use crate::body::{BodyHandle, BodyKind};
use crate::shape::{self, Aabb, Point};
use crate::world::PhysicsWorld;

/// Result of a point query
#[derive(Debug, Clone, PartialEq)]
pub struct PointHit {
    /// The body whose bounds contain the point
    pub body: BodyHandle,
    /// Body label
    pub label: String,
    /// World-space bounds at query time
    pub bounds: Aabb,
    /// Query point in body-local coordinates
    pub local_point: Point,
}

/// Query interface for the physics world
pub struct BodyQuery<'a> {
    pub(crate) world: &'a PhysicsWorld,
}

impl<'a> BodyQuery<'a> {
    /// Every body whose bounds contain `point`, in unspecified order
    pub fn bodies_at(&self, point: Point) -> Vec<PointHit> {
        self.world
            .records()
            .keys()
            .filter_map(|&handle| self.hit(handle, point))
            .collect()
    }

    /// The first non-static body whose bounds contain `point`.
    ///
    /// Bodies can overlap; which one wins is not specified.
    pub fn first_dynamic_at(&self, point: Point) -> Option<PointHit> {
        self.world
            .records()
            .iter()
            .filter(|(_, record)| record.kind == BodyKind::Dynamic)
            .find_map(|(&handle, _)| self.hit(handle, point))
    }

    /// Find a body by label
    pub fn find_by_label(&self, label: &str) -> Option<BodyHandle> {
        self.world
            .records()
            .iter()
            .find(|(_, record)| record.label == label)
            .map(|(&handle, _)| handle)
    }

    fn hit(&self, handle: BodyHandle, point: Point) -> Option<PointHit> {
        let bounds = self.world.bounds(handle).ok()?;
        if !bounds.contains(point) {
            return None;
        }
        let position = self.world.body_position(handle).ok()?;
        let angle = self.world.body_angle(handle).ok()?;
        Some(PointHit {
            body: handle,
            label: self.world.label(handle)?.to_string(),
            bounds,
            local_point: shape::to_local(point, position, angle),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::body::BodyDesc;
    use crate::config::PhysicsConfig;
    use crate::shape::BodyShape;
    use crate::world::PhysicsWorld;

    #[test]
    fn test_static_bodies_are_not_picked() {
        let mut world = PhysicsWorld::new(PhysicsConfig::default());
        world
            .create_body(BodyDesc::fixed(BodyShape::rectangle(100.0, 100.0)).with_position(50.0, 50.0))
            .unwrap();

        let query = world.query();
        assert_eq!(query.bodies_at([50.0, 50.0]).len(), 1);
        assert!(query.first_dynamic_at([50.0, 50.0]).is_none());
    }

    #[test]
    fn test_pick_dynamic_inside_bounds() {
        let mut world = PhysicsWorld::new(PhysicsConfig::default());
        let body = world
            .create_body(
                BodyDesc::dynamic(BodyShape::rectangle(20.0, 20.0))
                    .with_label("rust")
                    .with_position(100.0, 100.0),
            )
            .unwrap();

        let query = world.query();
        let hit = query.first_dynamic_at([105.0, 95.0]).unwrap();
        assert_eq!(hit.body, body);
        assert_eq!(hit.label, "rust");
        assert!(query.first_dynamic_at([150.0, 100.0]).is_none());
        assert_eq!(query.find_by_label("rust"), Some(body));
    }
}
