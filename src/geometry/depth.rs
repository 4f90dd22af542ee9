//! Depth estimation along the camera's optical axis.

use std::collections::HashMap;

use crate::geometry::model::GeometryModel;
use crate::tracker::{IdentityRegistry, ObjectId};
use crate::{Error, Result};

/// Source of per-identity depth (z) estimates.
///
/// Implement this trait to plug stereo disparity, a monocular depth model,
/// or fused range sensors into the tracker.
///
/// # Example
///
/// ```ignore
/// use obstacle_track::{DepthEstimator, IdentityRegistry, ObjectId, Result};
///
/// struct LidarDepth { /* ... */ }
///
/// impl DepthEstimator for LidarDepth {
///     fn find_depth(&self, id: ObjectId, registry: &IdentityRegistry) -> Result<f64> {
///         // Look up the range return inside the identity's box
///         Ok(12.0)
///     }
/// }
/// ```
pub trait DepthEstimator {
    /// Finite, non-negative depth for an identity present in `registry`.
    ///
    /// Returns [`Error::UnknownIdentity`] if `id` is not in the registry.
    fn find_depth(&self, id: ObjectId, registry: &IdentityRegistry) -> Result<f64>;
}

impl<T: DepthEstimator + ?Sized> DepthEstimator for &T {
    fn find_depth(&self, id: ObjectId, registry: &IdentityRegistry) -> Result<f64> {
        (**self).find_depth(id, registry)
    }
}

impl<T: DepthEstimator + ?Sized> DepthEstimator for Box<T> {
    fn find_depth(&self, id: ObjectId, registry: &IdentityRegistry) -> Result<f64> {
        (**self).find_depth(id, registry)
    }
}

/// Same depth for every tracked identity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedDepth {
    depth: f64,
}

impl FixedDepth {
    pub fn new(depth: f64) -> Self {
        Self { depth }
    }
}

impl DepthEstimator for FixedDepth {
    fn find_depth(&self, id: ObjectId, registry: &IdentityRegistry) -> Result<f64> {
        if !registry.contains(id) {
            return Err(Error::UnknownIdentity(id));
        }
        Ok(self.depth)
    }
}

/// Depth readings pushed in from an external sensor.
#[derive(Debug, Clone, Default)]
pub struct SensorDepth {
    readings: HashMap<ObjectId, f64>,
}

impl SensorDepth {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the latest reading for `id`, replacing any earlier one.
    pub fn set(&mut self, id: ObjectId, depth: f64) {
        self.readings.insert(id, depth);
    }

    pub fn remove(&mut self, id: ObjectId) -> Option<f64> {
        self.readings.remove(&id)
    }

    pub fn clear(&mut self) {
        self.readings.clear();
    }

    /// Drop readings for identities no longer in `registry`.
    ///
    /// Ids are never reused within a session, so readings for evicted ids
    /// can never be looked up again.
    pub fn retain_registry(&mut self, registry: &IdentityRegistry) {
        self.readings.retain(|id, _| registry.contains(*id));
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }
}

impl DepthEstimator for SensorDepth {
    fn find_depth(&self, id: ObjectId, registry: &IdentityRegistry) -> Result<f64> {
        if !registry.contains(id) {
            return Err(Error::UnknownIdentity(id));
        }
        self.readings
            .get(&id)
            .copied()
            .ok_or(Error::MissingDepth(id))
    }
}

/// Monocular depth from an assumed real-world object height.
///
/// `z = real_height * fy / box_height`, where `fy` is the vertical focal
/// length in pixels implied by the camera's vertical field of view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KnownHeightDepth {
    real_height: f64,
    focal_y: f64,
}

impl KnownHeightDepth {
    pub fn new(real_height: f64, focal_y: f64) -> Self {
        Self {
            real_height,
            focal_y,
        }
    }

    /// Take the focal length from `geometry` for frames of `frame_height` pixels.
    pub fn from_geometry(
        real_height: f64,
        geometry: &GeometryModel,
        frame_width: u32,
        frame_height: u32,
    ) -> Result<Self> {
        let (_, focal_y) = geometry.focal_lengths(frame_width, frame_height)?;
        Ok(Self::new(real_height, focal_y))
    }
}

impl DepthEstimator for KnownHeightDepth {
    fn find_depth(&self, id: ObjectId, registry: &IdentityRegistry) -> Result<f64> {
        let bbox = registry.bbox(id).ok_or(Error::UnknownIdentity(id))?;
        let height = bbox.height as f64;
        if height <= 0.0 || !height.is_finite() {
            return Err(Error::InvalidDepth {
                id,
                depth: f64::INFINITY,
            });
        }
        Ok(self.real_height * self.focal_y / height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::GeometryConfig;
    use crate::tracker::{BoundingBox, IdentityAssigner};
    use approx::assert_relative_eq;

    fn registry_with(boxes: &[BoundingBox]) -> IdentityRegistry {
        let mut registry = IdentityRegistry::new();
        let next = IdentityAssigner::default().assign(boxes, &registry);
        registry.replace(next);
        registry
    }

    #[test]
    fn test_fixed_depth() {
        let registry = registry_with(&[BoundingBox::new(0.0, 0.0, 10.0, 10.0)]);
        let depth = FixedDepth::new(4.2);
        assert_eq!(depth.find_depth(ObjectId(0), &registry), Ok(4.2));
        assert_eq!(
            depth.find_depth(ObjectId(1), &registry),
            Err(Error::UnknownIdentity(ObjectId(1)))
        );
    }

    #[test]
    fn test_sensor_depth() {
        let registry = registry_with(&[
            BoundingBox::new(0.0, 0.0, 10.0, 10.0),
            BoundingBox::new(50.0, 0.0, 10.0, 10.0),
        ]);
        let mut depth = SensorDepth::new();
        depth.set(ObjectId(0), 8.0);
        depth.set(ObjectId(7), 3.0);

        assert_eq!(depth.find_depth(ObjectId(0), &registry), Ok(8.0));
        assert_eq!(
            depth.find_depth(ObjectId(1), &registry),
            Err(Error::MissingDepth(ObjectId(1)))
        );
        // A reading alone does not make an identity valid.
        assert_eq!(
            depth.find_depth(ObjectId(7), &registry),
            Err(Error::UnknownIdentity(ObjectId(7)))
        );

        depth.clear();
        assert!(depth.find_depth(ObjectId(0), &registry).is_err());
    }

    #[test]
    fn test_sensor_depth_retain_registry() {
        let registry = registry_with(&[BoundingBox::new(0.0, 0.0, 10.0, 10.0)]);
        let mut depth = SensorDepth::new();
        depth.set(ObjectId(0), 8.0);
        depth.set(ObjectId(3), 5.0);
        depth.set(ObjectId(9), 1.0);

        depth.retain_registry(&registry);
        assert_eq!(depth.len(), 1);
        assert_eq!(depth.find_depth(ObjectId(0), &registry), Ok(8.0));

        depth.retain_registry(&IdentityRegistry::new());
        assert!(depth.is_empty());
    }

    #[test]
    fn test_known_height_depth() {
        let registry = registry_with(&[
            BoundingBox::new(0.0, 0.0, 30.0, 120.0),
            BoundingBox::new(100.0, 0.0, 30.0, 60.0),
        ]);
        let geometry = GeometryModel::new(GeometryConfig {
            horizontal_fov_deg: 90.0,
            vertical_fov_deg: 90.0,
            ..Default::default()
        })
        .unwrap();
        // fy = 240 px for a 480 px tall frame.
        let depth = KnownHeightDepth::from_geometry(1.5, &geometry, 640, 480).unwrap();

        let near = depth.find_depth(ObjectId(0), &registry).unwrap();
        let far = depth.find_depth(ObjectId(1), &registry).unwrap();
        assert_relative_eq!(near, 3.0, epsilon = 1e-9);
        // Half the apparent height, twice as far away.
        assert_relative_eq!(far, 6.0, epsilon = 1e-9);
    }

    #[test]
    fn test_known_height_degenerate_box() {
        let registry = registry_with(&[BoundingBox::new(0.0, 0.0, 30.0, 0.0)]);
        let depth = KnownHeightDepth::new(1.5, 500.0);
        assert!(matches!(
            depth.find_depth(ObjectId(0), &registry),
            Err(Error::InvalidDepth { .. })
        ));
    }

    #[test]
    fn test_boxed_estimator() {
        let registry = registry_with(&[BoundingBox::new(0.0, 0.0, 10.0, 10.0)]);
        let depth: Box<dyn DepthEstimator> = Box::new(FixedDepth::new(2.0));
        assert_eq!(depth.find_depth(ObjectId(0), &registry), Ok(2.0));
    }
}
