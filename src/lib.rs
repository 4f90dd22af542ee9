//! Obstacle identity tracking and localization.
//!
//! Detections from any [`DetectionSource`] are given persistent integer
//! identities frame over frame by nearest-centroid matching, then projected
//! through a pinhole camera model into 3D offsets relative to the vehicle.
//!
//! ```ignore
//! use obstacle_track::{FixedDepth, PipelineConfig, TrackingPipeline};
//!
//! let mut pipeline = TrackingPipeline::new(detector, FixedDepth::new(5.0), PipelineConfig::default())?;
//! let output = pipeline.process_frame(&frame_bytes, 640, 480)?;
//! for (id, position) in &output.positions {
//!     println!("{id}: {position}");
//! }
//! ```

mod error;
pub mod geometry;
pub mod integration;
pub mod tracker;

pub use error::{Error, Result};
pub use geometry::{
    CameraRigOffsets, DepthEstimator, FieldOfView, FixedDepth, GeometryConfig, GeometryModel,
    KnownHeightDepth, Position3D, SensorDepth,
};
pub use integration::{
    DetectionBuilder, DetectionSource, FrameOutput, IntoDetections, PipelineConfig,
    PipelineError, TrackingPipeline,
};
pub use tracker::{
    AssignerConfig, BoundingBox, Detection, IdentityAssigner, IdentityRegistry, MatchingStrategy,
    ObjectId, Track, TrackState,
};
