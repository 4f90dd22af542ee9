//! Matching utilities for nearest-centroid identity assignment.

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::tracker::bbox::BoundingBox;

/// Detection input for the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Bounding box in pixel coordinates
    pub bbox: BoundingBox,
    /// Detection confidence score
    pub score: f32,
}

impl Detection {
    /// Create a detection from TLBR coordinates.
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32, score: f32) -> Self {
        Self {
            bbox: BoundingBox::from_tlbr(x1, y1, x2, y2),
            score,
        }
    }

    pub fn from_bbox(bbox: BoundingBox, score: f32) -> Self {
        Self { bbox, score }
    }
}

/// How detections are paired with existing identities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchingStrategy {
    /// Pairs are claimed closest first; equal distances go to the lower
    /// track, then to the earlier detection.
    #[default]
    Greedy,
    /// Minimise the summed centroid distance over all pairs.
    Optimal,
}

/// Centroid distance matrix of shape (tracks, detections).
pub fn centroid_distance(track_boxes: &[BoundingBox], det_boxes: &[BoundingBox]) -> Array2<f64> {
    let mut dists = Array2::zeros((track_boxes.len(), det_boxes.len()));
    for (i, t) in track_boxes.iter().enumerate() {
        for (j, d) in det_boxes.iter().enumerate() {
            dists[[i, j]] = t.centroid_distance(d);
        }
    }
    dists
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentResult {
    /// (track row, detection column) pairs
    pub matches: Vec<(usize, usize)>,
    pub unmatched_tracks: Vec<usize>,
    pub unmatched_detections: Vec<usize>,
}

impl AssignmentResult {
    fn from_row_assignment(row_for_col: &[Option<usize>], num_rows: usize) -> Self {
        let mut claimed = vec![false; num_rows];
        let mut matches = Vec::new();
        let mut unmatched_detections = Vec::new();

        for (col, row) in row_for_col.iter().enumerate() {
            match row {
                Some(row) => {
                    claimed[*row] = true;
                    matches.push((*row, col));
                }
                None => unmatched_detections.push(col),
            }
        }

        let unmatched_tracks = claimed
            .iter()
            .enumerate()
            .filter_map(|(i, &c)| if c { None } else { Some(i) })
            .collect();

        Self {
            matches,
            unmatched_tracks,
            unmatched_detections,
        }
    }
}

/// Dispatch to the solver selected by `strategy`.
pub fn assign(cost_matrix: &Array2<f64>, strategy: MatchingStrategy) -> AssignmentResult {
    match strategy {
        MatchingStrategy::Greedy => greedy_assignment(cost_matrix),
        MatchingStrategy::Optimal => linear_assignment(cost_matrix),
    }
}

/// Greedy one-to-one assignment.
///
/// Every (row, column) pair is visited in order of increasing cost and
/// claimed if neither its row (track) nor its column (detection) is taken
/// yet. Equal costs resolve to the lower row, then the lower column, so
/// rows must be ordered by identity.
pub fn greedy_assignment(cost_matrix: &Array2<f64>) -> AssignmentResult {
    let (num_rows, num_cols) = cost_matrix.dim();

    let mut pairs: Vec<(usize, usize)> = (0..num_rows)
        .flat_map(|row| (0..num_cols).map(move |col| (row, col)))
        .collect();
    pairs.sort_by(|&(ra, ca), &(rb, cb)| {
        cost_matrix[[ra, ca]]
            .total_cmp(&cost_matrix[[rb, cb]])
            .then(ra.cmp(&rb))
            .then(ca.cmp(&cb))
    });

    let mut claimed = vec![false; num_rows];
    let mut row_for_col = vec![None; num_cols];
    let mut remaining = num_rows.min(num_cols);

    for (row, col) in pairs {
        if remaining == 0 {
            break;
        }
        if claimed[row] || row_for_col[col].is_some() {
            continue;
        }
        claimed[row] = true;
        row_for_col[col] = Some(row);
        remaining -= 1;
    }

    AssignmentResult::from_row_assignment(&row_for_col, num_rows)
}

/// Minimum-total-cost one-to-one assignment (Jonker-Volgenant).
///
/// Every row or every column ends up matched, whichever is fewer. Falls
/// back to [`greedy_assignment`] if the solver rejects the matrix.
pub fn linear_assignment(cost_matrix: &Array2<f64>) -> AssignmentResult {
    let (num_rows, num_cols) = cost_matrix.dim();

    if num_rows == 0 || num_cols == 0 {
        return AssignmentResult {
            matches: vec![],
            unmatched_tracks: (0..num_rows).collect(),
            unmatched_detections: (0..num_cols).collect(),
        };
    }

    // Dummy rows/cols share one cost so they never bias the real pairs.
    let size = num_rows.max(num_cols);
    let mut padded = Array2::<f64>::zeros((size, size));
    for i in 0..num_rows {
        for j in 0..num_cols {
            padded[[i, j]] = cost_matrix[[i, j]];
        }
    }

    match lapjv::lapjv(&padded) {
        Ok((row_to_col, _)) => {
            let mut row_for_col = vec![None; num_cols];
            for (row, &col) in row_to_col.iter().enumerate().take(num_rows) {
                if col < num_cols {
                    row_for_col[col] = Some(row);
                }
            }
            AssignmentResult::from_row_assignment(&row_for_col, num_rows)
        }
        Err(_) => {
            warn!(
                rows = num_rows,
                cols = num_cols,
                "linear assignment failed, falling back to greedy matching"
            );
            greedy_assignment(cost_matrix)
        }
    }
}
