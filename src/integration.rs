//! Integration module for connecting obstacle detectors with the tracker.
//!
//! This module provides the detector trait and the per-frame pipeline that
//! runs detection, identity assignment and localization in sequence.

mod builder;
mod detector;
mod pipeline;

pub use builder::DetectionBuilder;
pub use detector::{DetectionSource, IntoDetections};
pub use pipeline::{FrameOutput, PipelineConfig, PipelineError, TrackingPipeline};
