//! Trait for the external detector feeding the tracker.

use crate::tracker::{BoundingBox, Detection};

/// Trait for object detection backends.
///
/// Implement this trait to connect any obstacle detector to the
/// [`TrackingPipeline`](super::TrackingPipeline).
///
/// # Example
///
/// ```ignore
/// use obstacle_track::{DetectionSource, Detection};
///
/// struct MyDetector {
///     // Your model here
/// }
///
/// impl DetectionSource for MyDetector {
///     type Error = std::io::Error;
///
///     fn detect(&mut self, input: &[u8], width: u32, height: u32) -> Result<Vec<Detection>, Self::Error> {
///         // Run inference and return detections
///         Ok(vec![])
///     }
/// }
/// ```
pub trait DetectionSource {
    /// Error type for detection failures.
    type Error;

    /// Run the detector on one frame.
    ///
    /// # Arguments
    /// * `input` - Raw frame bytes (format depends on implementation)
    /// * `width` - Frame width in pixels
    /// * `height` - Frame height in pixels
    fn detect(
        &mut self,
        input: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Vec<Detection>, Self::Error>;
}

/// Helper trait for converting model-specific outputs to `Detection`.
pub trait IntoDetections {
    /// Convert the output into a vector of detections.
    fn into_detections(self) -> Vec<Detection>;
}

impl IntoDetections for Vec<Detection> {
    fn into_detections(self) -> Vec<Detection> {
        self
    }
}

/// Bare boxes carry full confidence.
impl IntoDetections for Vec<BoundingBox> {
    fn into_detections(self) -> Vec<Detection> {
        self.into_iter()
            .map(|bbox| Detection::from_bbox(bbox, 1.0))
            .collect()
    }
}
