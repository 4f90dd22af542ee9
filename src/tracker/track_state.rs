use serde::{Deserialize, Serialize};

/// How a registry entry came to be in the current frame's registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TrackState {
    /// Identity minted this frame for an unmatched detection
    #[default]
    New,
    /// Matched to a detection this frame
    Tracked,
    /// No detection this frame; box carried forward from an earlier frame
    Missed,
}
