//! Camera geometry: depth estimation and pixel-to-vehicle-frame projection.

mod depth;
mod model;

pub use depth::{DepthEstimator, FixedDepth, KnownHeightDepth, SensorDepth};
pub use model::{CameraRigOffsets, FieldOfView, GeometryConfig, GeometryModel, Position3D};
