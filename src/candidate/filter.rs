//! Confidence thresholding.

use crate::candidate::Candidate;
use crate::tensor::ProbView;

/// Returns every candidate whose foreground probability is strictly above
/// `threshold`, in index order.
pub fn filter_candidates(probs: ProbView<'_>, threshold: f32) -> Vec<Candidate> {
    probs
        .iter()
        .enumerate()
        .filter(|(_, p)| p.foreground > threshold)
        .map(|(index, p)| Candidate::new(index, p.foreground))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::filter_candidates;
    use crate::candidate::Candidate;
    use crate::tensor::ProbView;

    #[test]
    fn keeps_strictly_greater_in_index_order() {
        let data = [0.1, 0.9, 0.5, 0.5, 0.4, 0.6, 0.0, 0.75];
        let kept = filter_candidates(ProbView::from_slice(&data), 0.5);
        assert_eq!(
            kept,
            vec![
                Candidate::new(0, 0.9),
                Candidate::new(2, 0.6),
                Candidate::new(3, 0.75)
            ]
        );
    }

    #[test]
    fn nan_scores_never_pass() {
        let data = [0.0, f32::NAN, 0.0, 0.3];
        let kept = filter_candidates(ProbView::from_slice(&data), f32::NEG_INFINITY);
        assert_eq!(kept, vec![Candidate::new(1, 0.3)]);
    }
}
