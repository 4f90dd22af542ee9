mod assigner;
mod bbox;
mod matching;
mod registry;
mod track_state;

pub use assigner::{AssignerConfig, IdentityAssigner};
pub use bbox::BoundingBox;
pub use matching::{
    AssignmentResult, Detection, MatchingStrategy, centroid_distance, greedy_assignment,
    linear_assignment,
};
pub use registry::{IdentityRegistry, ObjectId, Track};
pub use track_state::TrackState;
