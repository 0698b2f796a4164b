//! Candidate selection and pruning.
//!
//! Includes the confidence filter and IoU-based non-maximum suppression.

pub(crate) mod filter;
pub(crate) mod nms;

/// Per-candidate class scores.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ClassProbabilities {
    /// Confidence that the candidate is background.
    pub background: f32,
    /// Confidence that the candidate is a face.
    pub foreground: f32,
}

impl ClassProbabilities {
    /// Creates a probability pair.
    pub const fn new(background: f32, foreground: f32) -> Self {
        Self {
            background,
            foreground,
        }
    }
}

/// Index into the decoded views paired with its foreground probability.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candidate {
    /// Shared index into the box, class and landmark views.
    pub index: usize,
    /// Foreground probability of the candidate.
    pub probability: f32,
}

impl Candidate {
    /// Creates a candidate.
    pub const fn new(index: usize, probability: f32) -> Self {
        Self { index, probability }
    }
}
