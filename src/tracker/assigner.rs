//! Frame-to-frame identity assignment.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::tracker::bbox::BoundingBox;
use crate::tracker::matching::{self, AssignmentResult, MatchingStrategy};
use crate::tracker::registry::{IdentityRegistry, ObjectId, Track};

/// Configuration for the [`IdentityAssigner`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AssignerConfig {
    pub strategy: MatchingStrategy,
    /// Evict an identity once it has gone this many consecutive frames
    /// without a detection. `None` keeps stale identities forever.
    pub max_misses: Option<u32>,
}

/// Matches each frame's detections against the current registry.
#[derive(Debug, Clone, Default)]
pub struct IdentityAssigner {
    config: AssignerConfig,
}

impl IdentityAssigner {
    pub fn new(config: AssignerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AssignerConfig {
        &self.config
    }

    /// Compute the registry for the next frame.
    ///
    /// Matched identities take the detection's box, unmatched detections are
    /// given fresh ids in input order, and identities without a detection
    /// are carried forward (or evicted once past `max_misses`). `registry`
    /// itself is left untouched.
    pub fn assign(
        &self,
        detections: &[BoundingBox],
        registry: &IdentityRegistry,
    ) -> IdentityRegistry {
        let ids: Vec<ObjectId> = registry.ids().collect();
        let track_boxes: Vec<BoundingBox> = registry.iter().map(|(_, t)| t.bbox).collect();

        let AssignmentResult {
            matches,
            unmatched_tracks,
            unmatched_detections,
        } = if registry.is_empty() {
            AssignmentResult {
                unmatched_detections: (0..detections.len()).collect(),
                ..Default::default()
            }
        } else {
            let dists = matching::centroid_distance(&track_boxes, detections);
            matching::assign(&dists, self.config.strategy)
        };

        let mut next = BTreeMap::new();

        for (itrack, idet) in matches {
            trace!(id = %ids[itrack], detection = idet, "matched");
            next.insert(ids[itrack], Track::matched(detections[idet]));
        }

        for itrack in unmatched_tracks {
            let id = ids[itrack];
            let Some(track) = registry.get(id) else {
                continue;
            };
            let stale = track.missed();
            match self.config.max_misses {
                Some(max) if stale.misses > max => {
                    debug!(%id, misses = stale.misses, "evicting stale identity");
                }
                _ => {
                    next.insert(id, stale);
                }
            }
        }

        let mut next_id = registry.next_id();
        for idet in unmatched_detections {
            // Only reachable once the id space is used up.
            if next.contains_key(&next_id) {
                warn!(detection = idet, "identity space exhausted, dropping detection");
                continue;
            }
            debug!(id = %next_id, detection = idet, "new identity");
            next.insert(next_id, Track::new(detections[idet]));
            next_id = next_id.next();
        }

        IdentityRegistry::from_tracks(next, next_id)
    }
}
