//! Conversion of surviving candidates into pixel-space detections.
//!
//! Face boxes are scaled by the network width on both axes, then grown by a
//! padding factor of their own extent on every side and truncated to integer
//! pixel rectangles. Landmarks attached to a face use the same width-only
//! scaling. Debug landmark markers scale x by the network width and y by the
//! network height.

pub mod palette;

use crate::candidate::Candidate;
use crate::geometry::{BoundingBox, Landmark5, Point2D};
use crate::tensor::TensorViews;
use crate::util::math::{trunc_coord, trunc_extent};
use crate::util::{RetinaParseError, RetinaParseResult};
use palette::Color;

/// Class id reported for faces.
pub const FACE_CLASS_ID: u32 = 0;
/// Class id reported for debug landmark markers.
pub const LANDMARK_CLASS_ID: u32 = 1;

/// Network input resolution in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NetworkInfo {
    pub width: u32,
    pub height: u32,
}

impl NetworkInfo {
    /// Creates a resolution.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for NetworkInfo {
    fn default() -> Self {
        Self::new(640, 640)
    }
}

/// Integer pixel rectangle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PixelRect {
    pub left: i32,
    pub top: i32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    /// Truncates a pixel-space box toward zero.
    pub fn from_box(bbox: &BoundingBox) -> Self {
        Self {
            left: trunc_coord(bbox.top_left.x),
            top: trunc_coord(bbox.top_left.y),
            width: trunc_extent(bbox.width()),
            height: trunc_extent(bbox.height()),
        }
    }
}

/// What a detection represents.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DetectionKind {
    /// A face box.
    Face,
    /// A 1x1 debug marker for one landmark point of the preceding face.
    LandmarkMarker { point_index: usize },
}

/// A final detection in pixel space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DetectionOutput {
    pub kind: DetectionKind,
    /// Pixel-space box before truncation.
    pub bbox: BoundingBox,
    /// Truncated integer rectangle.
    pub rect: PixelRect,
    pub confidence: f32,
    /// Pixel-space landmarks, present on faces when attachment is enabled.
    pub landmarks: Option<Landmark5>,
}

impl DetectionOutput {
    /// Numeric class id (`0` for faces, `1` for landmark markers).
    pub fn class_id(&self) -> u32 {
        match self.kind {
            DetectionKind::Face => FACE_CLASS_ID,
            DetectionKind::LandmarkMarker { .. } => LANDMARK_CLASS_ID,
        }
    }

    /// Returns true for face detections.
    pub fn is_face(&self) -> bool {
        self.kind == DetectionKind::Face
    }

    /// Colour associated with the detection.
    pub fn colour(&self) -> Color {
        match self.kind {
            DetectionKind::Face => palette::FACE_BORDER,
            DetectionKind::LandmarkMarker { point_index } => palette::colour(point_index),
        }
    }
}

/// Parameters for the output stage.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AssemblyParams {
    pub network: NetworkInfo,
    /// Fraction of the box extent added on each side.
    pub padding_factor: f32,
    /// Attach scaled landmarks to each face.
    pub attach_landmarks: bool,
    /// Emit a 1x1 marker detection for every landmark point.
    pub landmark_markers: bool,
}

fn out_of_bounds(index: usize, len: usize, context: &'static str) -> RetinaParseError {
    RetinaParseError::IndexOutOfBounds {
        index,
        len,
        context,
    }
}

/// Builds the ordered detection list for `survivors`.
///
/// Each face is followed by its landmark markers when those are enabled.
pub fn assemble(
    survivors: &[Candidate],
    views: &TensorViews<'_>,
    params: &AssemblyParams,
) -> RetinaParseResult<Vec<DetectionOutput>> {
    let width = params.network.width as f32;
    let box_scale = Point2D::splat(width);
    let marker_scale = Point2D::new(width, params.network.height as f32);
    let need_landmarks = params.attach_landmarks || params.landmark_markers;

    let per_face = if params.landmark_markers {
        1 + Landmark5::SIZE
    } else {
        1
    };
    let mut out = Vec::with_capacity(survivors.len() * per_face);

    for candidate in survivors {
        let bbox = views
            .boxes
            .get(candidate.index)
            .ok_or_else(|| out_of_bounds(candidate.index, views.boxes.len(), "boxes"))?;
        let landmark = if need_landmarks {
            Some(views.landmarks.get(candidate.index).ok_or_else(|| {
                out_of_bounds(candidate.index, views.landmarks.len(), "landmarks")
            })?)
        } else {
            None
        };

        let pixel_box = bbox.scaled(box_scale).padded(params.padding_factor);
        out.push(DetectionOutput {
            kind: DetectionKind::Face,
            bbox: pixel_box,
            rect: PixelRect::from_box(&pixel_box),
            confidence: candidate.probability,
            landmarks: landmark
                .filter(|_| params.attach_landmarks)
                .map(|lm| lm * box_scale),
        });

        if let Some(lm) = landmark.filter(|_| params.landmark_markers) {
            let scaled = lm * marker_scale;
            for (point_index, point) in scaled.iter().enumerate() {
                let marker = BoundingBox::new(*point, *point + Point2D::splat(1.0));
                out.push(DetectionOutput {
                    kind: DetectionKind::LandmarkMarker { point_index },
                    bbox: marker,
                    rect: PixelRect {
                        left: trunc_coord(point.x),
                        top: trunc_coord(point.y),
                        width: 1,
                        height: 1,
                    },
                    confidence: candidate.probability,
                    landmarks: None,
                });
            }
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::{assemble, AssemblyParams, DetectionKind, NetworkInfo, PixelRect};
    use crate::candidate::Candidate;
    use crate::geometry::{BoundingBox, Point2D};
    use crate::tensor::{BoxView, LandmarkView, ProbView, TensorViews};

    const BOXES: [f32; 8] = [0.25, 0.25, 0.75, 0.5, 0.0, 0.0, 0.1, 0.1];
    const PROBS: [f32; 4] = [0.1, 0.9, 0.2, 0.8];
    const MARKS: [f32; 20] = [
        0.25, 0.5, 0.5, 0.5, 0.375, 0.625, 0.25, 0.75, 0.5, 0.75, //
        0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0,
    ];

    fn views() -> TensorViews<'static> {
        TensorViews {
            boxes: BoxView::from_slice(&BOXES),
            probs: ProbView::from_slice(&PROBS),
            landmarks: LandmarkView::from_slice(&MARKS),
        }
    }

    fn params() -> AssemblyParams {
        AssemblyParams {
            network: NetworkInfo::new(640, 320),
            padding_factor: 0.1,
            attach_landmarks: false,
            landmark_markers: false,
        }
    }

    #[test]
    fn face_box_uses_width_for_both_axes_and_pads() {
        let out = assemble(&[Candidate::new(0, 0.9)], &views(), &params()).unwrap();
        assert_eq!(out.len(), 1);
        let det = out[0];
        assert_eq!(det.kind, DetectionKind::Face);
        assert_eq!(det.class_id(), 0);
        assert_eq!(det.confidence, 0.9);
        assert!(det.landmarks.is_none());

        // 640 * [0.25, 0.25, 0.75, 0.5] = [160, 160, 480, 320]; pad 32 / 16.
        assert_eq!(
            det.rect,
            PixelRect {
                left: 128,
                top: 144,
                width: 384,
                height: 192,
            }
        );
    }

    #[test]
    fn attached_landmarks_are_width_scaled() {
        let params = AssemblyParams {
            attach_landmarks: true,
            ..params()
        };
        let out = assemble(&[Candidate::new(0, 0.9)], &views(), &params).unwrap();
        let lm = out[0].landmarks.unwrap();
        assert_eq!(lm.points[0], Point2D::new(160.0, 320.0));
        assert_eq!(lm.points[4], Point2D::new(320.0, 480.0));
    }

    #[test]
    fn markers_follow_their_face() {
        let params = AssemblyParams {
            landmark_markers: true,
            ..params()
        };
        let out = assemble(
            &[Candidate::new(0, 0.9), Candidate::new(1, 0.8)],
            &views(),
            &params,
        )
        .unwrap();
        assert_eq!(out.len(), 12);
        assert!(out[0].is_face());
        assert!(out[6].is_face());

        let marker = out[3];
        assert_eq!(marker.kind, DetectionKind::LandmarkMarker { point_index: 2 });
        assert_eq!(marker.class_id(), 1);
        assert_eq!(marker.confidence, 0.9);
        // x scales by width, y by height: (0.375 * 640, 0.625 * 320).
        assert_eq!(
            marker.rect,
            PixelRect {
                left: 240,
                top: 200,
                width: 1,
                height: 1,
            }
        );
        assert_eq!(marker.colour(), super::palette::colour(2));
    }

    #[test]
    fn negative_extents_saturate_to_zero() {
        let inverted = BoundingBox::from_corners([50.0, 50.0, 10.0, 10.0]);
        let rect = PixelRect::from_box(&inverted);
        assert_eq!(rect.left, 50);
        assert_eq!(rect.width, 0);
        assert_eq!(rect.height, 0);
    }
}
