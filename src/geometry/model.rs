//! Pinhole projection from pixel boxes to camera and vehicle frame offsets.

use std::collections::BTreeMap;

use nalgebra::{Point3, Translation3};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::geometry::depth::DepthEstimator;
use crate::tracker::{IdentityRegistry, ObjectId};
use crate::{Error, Result};

/// 3D offset in a consistent linear unit (metres by convention).
pub type Position3D = Point3<f64>;

/// Camera and rig parameters, set once at construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryConfig {
    /// Horizontal field of view in degrees
    pub horizontal_fov_deg: f64,
    /// Vertical field of view in degrees
    pub vertical_fov_deg: f64,
    /// Camera position relative to the vehicle reference point
    pub x_offset: f64,
    pub y_offset: f64,
    pub z_offset: f64,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            horizontal_fov_deg: 60.0,
            vertical_fov_deg: 45.0,
            x_offset: 0.0,
            y_offset: 0.0,
            z_offset: 0.0,
        }
    }
}

/// Angular extent of the camera, in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldOfView {
    pub horizontal: f64,
    pub vertical: f64,
}

impl FieldOfView {
    pub fn from_degrees(horizontal: f64, vertical: f64) -> Result<Self> {
        check_angle("horizontal", horizontal, 180.0)?;
        check_angle("vertical", vertical, 180.0)?;
        Ok(Self {
            horizontal: horizontal.to_radians(),
            vertical: vertical.to_radians(),
        })
    }

    pub fn from_radians(horizontal: f64, vertical: f64) -> Result<Self> {
        check_angle("horizontal", horizontal, std::f64::consts::PI)?;
        check_angle("vertical", vertical, std::f64::consts::PI)?;
        Ok(Self {
            horizontal,
            vertical,
        })
    }

    #[inline]
    fn half_tangents(&self) -> (f64, f64) {
        ((self.horizontal / 2.0).tan(), (self.vertical / 2.0).tan())
    }
}

/// Rigid offset of the camera from the vehicle reference point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraRigOffsets {
    translation: Translation3<f64>,
}

impl CameraRigOffsets {
    pub fn new(x: f64, y: f64, z: f64) -> Result<Self> {
        if !(x.is_finite() && y.is_finite() && z.is_finite()) {
            return Err(Error::geometry_config(format!(
                "camera offsets must be finite, got ({x}, {y}, {z})"
            )));
        }
        Ok(Self {
            translation: Translation3::new(x, y, z),
        })
    }

    pub fn translation(&self) -> &Translation3<f64> {
        &self.translation
    }
}

/// Converts tracked boxes into camera-frame and vehicle-frame positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometryModel {
    fov: FieldOfView,
    offsets: CameraRigOffsets,
}

impl GeometryModel {
    pub fn new(config: GeometryConfig) -> Result<Self> {
        Ok(Self {
            fov: FieldOfView::from_degrees(config.horizontal_fov_deg, config.vertical_fov_deg)?,
            offsets: CameraRigOffsets::new(config.x_offset, config.y_offset, config.z_offset)?,
        })
    }

    pub fn from_parts(fov: FieldOfView, offsets: CameraRigOffsets) -> Self {
        Self { fov, offsets }
    }

    pub fn fov(&self) -> &FieldOfView {
        &self.fov
    }

    pub fn offsets(&self) -> &CameraRigOffsets {
        &self.offsets
    }

    /// Focal lengths in pixels `(fx, fy)` implied by the field of view.
    pub fn focal_lengths(&self, frame_width: u32, frame_height: u32) -> Result<(f64, f64)> {
        check_frame(frame_width, frame_height)?;
        let (tan_h, tan_v) = self.fov.half_tangents();
        Ok((
            frame_width as f64 / 2.0 / tan_h,
            frame_height as f64 / 2.0 / tan_v,
        ))
    }

    /// Camera-frame position of a single tracked identity.
    pub fn camera_position<D>(
        &self,
        id: ObjectId,
        registry: &IdentityRegistry,
        depth: &D,
        frame_width: u32,
        frame_height: u32,
    ) -> Result<Position3D>
    where
        D: DepthEstimator + ?Sized,
    {
        check_frame(frame_width, frame_height)?;
        let bbox = registry.bbox(id).ok_or(Error::UnknownIdentity(id))?;

        let z = depth.find_depth(id, registry)?;
        if !z.is_finite() || z < 0.0 {
            return Err(Error::InvalidDepth { id, depth: z });
        }

        let (cx, cy) = bbox.center();
        let half_w = frame_width as f64 / 2.0;
        let half_h = frame_height as f64 / 2.0;
        let (tan_h, tan_v) = self.fov.half_tangents();

        let x = z * tan_h * (cx - half_w) / half_w;
        let y = z * tan_v * (cy - half_h) / half_h;
        Ok(Position3D::new(x, y, z))
    }

    /// Camera-frame positions for every identity in the registry.
    pub fn dist_from_camera<D>(
        &self,
        registry: &IdentityRegistry,
        depth: &D,
        frame_width: u32,
        frame_height: u32,
    ) -> Result<BTreeMap<ObjectId, Position3D>>
    where
        D: DepthEstimator + ?Sized,
    {
        registry
            .ids()
            .map(|id| {
                let position =
                    self.camera_position(id, registry, depth, frame_width, frame_height)?;
                trace!(%id, x = position.x, y = position.y, z = position.z, "camera frame");
                Ok((id, position))
            })
            .collect()
    }

    /// Shift one camera-frame point into the vehicle frame.
    #[inline]
    pub fn to_vehicle_frame(&self, camera: &Position3D) -> Position3D {
        self.offsets.translation.transform_point(camera)
    }

    /// Shift every camera-frame position into the vehicle frame.
    pub fn dist_from_car(
        &self,
        camera_frame: &BTreeMap<ObjectId, Position3D>,
    ) -> BTreeMap<ObjectId, Position3D> {
        camera_frame
            .iter()
            .map(|(&id, p)| (id, self.to_vehicle_frame(p)))
            .collect()
    }
}

fn check_angle(name: &str, angle: f64, straight: f64) -> Result<()> {
    if !angle.is_finite() || angle <= 0.0 || angle >= straight {
        return Err(Error::geometry_config(format!(
            "{name} field of view must be a finite angle strictly between 0 and {straight}, got {angle}"
        )));
    }
    Ok(())
}

fn check_frame(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(Error::InvalidFrameSize { width, height });
    }
    Ok(())
}
