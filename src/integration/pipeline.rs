//! TrackingPipeline: detection, identity assignment and localization per frame.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::geometry::{DepthEstimator, GeometryConfig, GeometryModel, Position3D};
use crate::tracker::{
    AssignerConfig, BoundingBox, Detection, IdentityAssigner, IdentityRegistry, ObjectId,
};

use super::DetectionSource;

/// Configuration for the [`TrackingPipeline`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub geometry: GeometryConfig,
    pub assigner: AssignerConfig,
    /// Detections scoring below this are ignored.
    pub min_score: f32,
}

/// Vehicle-frame positions of every tracked identity after one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameOutput {
    /// Number of frames processed so far, this one included
    pub frame: u64,
    pub positions: BTreeMap<ObjectId, Position3D>,
}

/// Failure of one pipeline step.
#[derive(Error, Debug)]
pub enum PipelineError<E> {
    #[error("Detection failed: {0}")]
    Detection(#[source] E),

    #[error(transparent)]
    Tracking(#[from] crate::Error),
}

/// Bundles a detector, a depth estimator and the tracking core.
///
/// Frames are processed strictly one after another. The registry is only
/// replaced once a frame has been fully localized, so a failed frame leaves
/// the previous state in place.
pub struct TrackingPipeline<D: DetectionSource, E: DepthEstimator> {
    detector: D,
    depth: E,
    assigner: IdentityAssigner,
    geometry: GeometryModel,
    registry: IdentityRegistry,
    min_score: f32,
}

impl<D: DetectionSource, E: DepthEstimator> TrackingPipeline<D, E> {
    /// Create a new tracking pipeline; fails on an invalid camera configuration.
    pub fn new(detector: D, depth: E, config: PipelineConfig) -> crate::Result<Self> {
        Ok(Self {
            detector,
            depth,
            assigner: IdentityAssigner::new(config.assigner),
            geometry: GeometryModel::new(config.geometry)?,
            registry: IdentityRegistry::new(),
            min_score: config.min_score,
        })
    }

    /// Create a new tracking pipeline with default configuration.
    pub fn with_default_config(detector: D, depth: E) -> crate::Result<Self> {
        Self::new(detector, depth, PipelineConfig::default())
    }

    /// Process a single frame and return vehicle-frame positions.
    ///
    /// # Arguments
    /// * `input` - Raw frame bytes, handed to the detector untouched
    /// * `width` - Frame width in pixels
    /// * `height` - Frame height in pixels
    pub fn process_frame(
        &mut self,
        input: &[u8],
        width: u32,
        height: u32,
    ) -> Result<FrameOutput, PipelineError<D::Error>> {
        let detections = self
            .detector
            .detect(input, width, height)
            .map_err(PipelineError::Detection)?;
        Ok(self.track(&detections, width, height)?)
    }

    /// Run assignment and localization on detections obtained elsewhere.
    pub fn track(
        &mut self,
        detections: &[Detection],
        width: u32,
        height: u32,
    ) -> crate::Result<FrameOutput> {
        let boxes: Vec<BoundingBox> = detections
            .iter()
            .filter(|d| d.score >= self.min_score)
            .map(|d| d.bbox)
            .collect();

        let next = self.assigner.assign(&boxes, &self.registry);
        let camera = self
            .geometry
            .dist_from_camera(&next, &self.depth, width, height)?;
        let positions = self.geometry.dist_from_car(&camera);

        self.registry.replace(next);
        debug!(
            frame = self.registry.version(),
            detections = boxes.len(),
            dropped = detections.len() - boxes.len(),
            tracked = self.registry.len(),
            "frame processed"
        );

        Ok(FrameOutput {
            frame: self.registry.version(),
            positions,
        })
    }

    /// Forget every identity and start a fresh session.
    pub fn reset(&mut self) {
        self.registry = IdentityRegistry::new();
    }

    /// Current identities and their last known boxes.
    pub fn registry(&self) -> &IdentityRegistry {
        &self.registry
    }

    pub fn geometry(&self) -> &GeometryModel {
        &self.geometry
    }

    pub fn assigner(&self) -> &IdentityAssigner {
        &self.assigner
    }

    /// Get a reference to the underlying detector.
    pub fn detector(&self) -> &D {
        &self.detector
    }

    /// Get a mutable reference to the underlying detector.
    pub fn detector_mut(&mut self) -> &mut D {
        &mut self.detector
    }

    pub fn depth(&self) -> &E {
        &self.depth
    }

    /// Mutable access to the depth estimator, e.g. to push sensor readings.
    pub fn depth_mut(&mut self) -> &mut E {
        &mut self.depth
    }
}
