//! Greedy IoU non-maximum suppression.
//!
//! The default mode walks candidates in their input order. The first remaining
//! candidate becomes the anchor, every remaining candidate overlapping the
//! anchor joins its cluster, and the most probable member of the cluster
//! survives. The anchor is not the most confident candidate, so chains of
//! partially overlapping boxes can collapse into a single cluster where
//! score-ordered NMS would keep several.

use std::cmp::Ordering;

use crate::candidate::Candidate;
use crate::geometry::{overlaps, BoundingBox};
use crate::tensor::BoxView;
use crate::trace::{trace_event, trace_span};
use crate::util::{RetinaParseError, RetinaParseResult};

/// Suppression strategy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SuppressionMode {
    /// Anchor on the first remaining candidate in input order.
    #[default]
    AnchorOrder,
    /// Visit candidates by descending probability and drop any that overlap a
    /// kept one.
    ScoreOrder,
}

fn with_boxes(
    candidates: &[Candidate],
    boxes: BoxView<'_>,
) -> RetinaParseResult<Vec<(Candidate, BoundingBox)>> {
    candidates
        .iter()
        .map(|&candidate| {
            let bbox = boxes
                .get(candidate.index)
                .ok_or(RetinaParseError::IndexOutOfBounds {
                    index: candidate.index,
                    len: boxes.len(),
                    context: "boxes",
                })?;
            Ok((candidate, bbox))
        })
        .collect()
}

/// Most probable member; among equal maxima the last one wins.
fn strongest(cluster: &[Candidate]) -> Option<Candidate> {
    cluster.iter().copied().max_by(|a, b| {
        a.probability
            .partial_cmp(&b.probability)
            .unwrap_or(Ordering::Equal)
    })
}

fn candidate_cmp_desc(a: &Candidate, b: &Candidate) -> Ordering {
    b.probability
        .total_cmp(&a.probability)
        .then_with(|| a.index.cmp(&b.index))
}

/// Anchor-ordered suppression.
///
/// Returns one candidate per cluster, in the order the clusters were formed.
pub fn nms_anchor_order(
    candidates: &[Candidate],
    boxes: BoxView<'_>,
    iou_threshold: f32,
) -> RetinaParseResult<Vec<Candidate>> {
    let _span = trace_span!("nms_anchor_order", candidates = candidates.len()).entered();

    let mut remaining = with_boxes(candidates, boxes)?;
    let mut kept = Vec::new();
    let mut cluster = Vec::new();

    while !remaining.is_empty() {
        let (anchor, anchor_box) = remaining.remove(0);

        cluster.clear();
        remaining.retain(|(candidate, bbox)| {
            if overlaps(&anchor_box, bbox, iou_threshold) {
                cluster.push(*candidate);
                false
            } else {
                true
            }
        });
        cluster.push(anchor);

        if let Some(best) = strongest(&cluster) {
            kept.push(best);
        }
    }

    trace_event!("nms_done", kept = kept.len());
    Ok(kept)
}

/// Score-ordered suppression.
///
/// Candidates are sorted by descending probability with ties broken by index
/// and kept if they do not overlap any previously kept candidate.
pub fn nms_score_order(
    candidates: &[Candidate],
    boxes: BoxView<'_>,
    iou_threshold: f32,
) -> RetinaParseResult<Vec<Candidate>> {
    let _span = trace_span!("nms_score_order", candidates = candidates.len()).entered();

    let mut ranked = with_boxes(candidates, boxes)?;
    ranked.sort_by(|a, b| candidate_cmp_desc(&a.0, &b.0));

    let mut kept: Vec<(Candidate, BoundingBox)> = Vec::new();
    'outer: for (candidate, bbox) in ranked {
        for (_, kept_box) in kept.iter() {
            if overlaps(kept_box, &bbox, iou_threshold) {
                continue 'outer;
            }
        }
        kept.push((candidate, bbox));
    }

    trace_event!("nms_done", kept = kept.len());
    Ok(kept.into_iter().map(|(candidate, _)| candidate).collect())
}

/// Runs suppression with the given strategy.
pub fn suppress(
    mode: SuppressionMode,
    candidates: &[Candidate],
    boxes: BoxView<'_>,
    iou_threshold: f32,
) -> RetinaParseResult<Vec<Candidate>> {
    match mode {
        SuppressionMode::AnchorOrder => nms_anchor_order(candidates, boxes, iou_threshold),
        SuppressionMode::ScoreOrder => nms_score_order(candidates, boxes, iou_threshold),
    }
}
