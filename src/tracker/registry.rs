//! Identity registry: the tracker state carried from one frame to the next.

use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::tracker::bbox::BoundingBox;
use crate::tracker::track_state::TrackState;

/// Stable identity of a tracked obstacle.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ObjectId(pub u32);

impl ObjectId {
    /// Raw numeric value of the id.
    #[inline]
    pub fn get(self) -> u32 {
        self.0
    }

    /// The following id. Saturates at `u32::MAX`, the last id a session
    /// can hand out.
    #[inline]
    pub(crate) fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u32> for ObjectId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// Registry entry for one identity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Last bounding box associated with this identity
    pub bbox: BoundingBox,
    /// How the entry got into the current registry
    pub state: TrackState,
    /// Consecutive frames without a matching detection
    pub misses: u32,
}

impl Track {
    /// Entry for an identity first seen in this frame.
    pub fn new(bbox: BoundingBox) -> Self {
        Self {
            bbox,
            state: TrackState::New,
            misses: 0,
        }
    }

    /// Re-anchor the track on a fresh detection.
    pub(crate) fn matched(bbox: BoundingBox) -> Self {
        Self {
            bbox,
            state: TrackState::Tracked,
            misses: 0,
        }
    }

    /// Carry the track forward through a frame without a detection.
    pub(crate) fn missed(&self) -> Self {
        Self {
            bbox: self.bbox,
            state: TrackState::Missed,
            misses: self.misses.saturating_add(1),
        }
    }
}

/// Mapping from [`ObjectId`] to the object's last known [`Track`].
///
/// Iteration is ordered by id. The registry is only ever replaced
/// wholesale, once per frame, by [`IdentityRegistry::replace`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IdentityRegistry {
    tracks: BTreeMap<ObjectId, Track>,
    /// Next id to hand out; never decreases within a session.
    next_id: ObjectId,
    version: u64,
}

impl IdentityRegistry {
    /// Empty registry for a fresh session; the first id handed out is 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the next-state registry from already computed entries.
    ///
    /// `next_id` is raised past every id in `tracks` so fresh ids never
    /// collide with existing ones.
    pub(crate) fn from_tracks(tracks: BTreeMap<ObjectId, Track>, next_id: ObjectId) -> Self {
        let floor = tracks
            .keys()
            .next_back()
            .map(|id| id.next())
            .unwrap_or_default();
        Self {
            tracks,
            next_id: next_id.max(floor),
            version: 0,
        }
    }

    /// Install `next` as the current state.
    ///
    /// The version counts installed frames and is owned by the live
    /// registry, so it keeps increasing regardless of what `next` carries.
    pub fn replace(&mut self, next: IdentityRegistry) {
        let version = self.version + 1;
        *self = IdentityRegistry { version, ..next };
    }

    /// Entry for `id`, if it is currently tracked.
    pub fn get(&self, id: ObjectId) -> Option<&Track> {
        self.tracks.get(&id)
    }

    /// Last known bounding box of `id`.
    pub fn bbox(&self, id: ObjectId) -> Option<&BoundingBox> {
        self.tracks.get(&id).map(|t| &t.bbox)
    }

    /// Whether `id` is currently tracked.
    pub fn contains(&self, id: ObjectId) -> bool {
        self.tracks.contains_key(&id)
    }

    /// Tracked ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.tracks.keys().copied()
    }

    /// Entries in ascending id order.
    pub fn iter(&self) -> btree_map::Iter<'_, ObjectId, Track> {
        self.tracks.iter()
    }

    /// Number of tracked identities, stale ones included.
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Returns `true` if no identity has been seen yet (or all were evicted).
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Number of frames installed into this registry.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Largest id currently in use.
    pub fn max_id(&self) -> Option<ObjectId> {
        self.tracks.keys().next_back().copied()
    }

    /// Id the next unmatched detection will receive.
    pub fn next_id(&self) -> ObjectId {
        self.next_id
    }
}

impl<'a> IntoIterator for &'a IdentityRegistry {
    type Item = (&'a ObjectId, &'a Track);
    type IntoIter = btree_map::Iter<'a, ObjectId, Track>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
