//! Auswertung eines Segments zwischen zwei Kontrollpunkten.
//!
//! Der Grad (linear/quadratisch/kubisch) hängt davon ab, welche der beiden
//! zugewandten Handles ungleich Null sind, und wird bei jedem Aufruf neu bestimmt.

use super::ControlPoint;
use crate::shared::bezier_geometry::{cubic_point, linear_point, quadratic_point};
use glam::{Affine3A, Vec3};

/// Geometrische Form eines Segments (in Weltkoordinaten).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SegmentShape {
    /// Beide zugewandten Handles sind Null
    Linear { start: Vec3, end: Vec3 },
    /// Genau ein zugewandtes Handle ist gesetzt
    Quadratic { start: Vec3, control: Vec3, end: Vec3 },
    /// Beide zugewandten Handles sind gesetzt
    Cubic {
        start: Vec3,
        control1: Vec3,
        control2: Vec3,
        end: Vec3,
    },
}

impl SegmentShape {
    /// Bestimmt die Form zwischen `a` (Handle 2) und `b` (Handle 1).
    pub fn between(a: &ControlPoint, b: &ControlPoint, frame: &Affine3A) -> Self {
        let start = a.global_position(frame);
        let end = b.global_position(frame);
        match (a.handle2() != Vec3::ZERO, b.handle1() != Vec3::ZERO) {
            (true, true) => Self::Cubic {
                start,
                control1: a.global_handle2(frame),
                control2: b.global_handle1(frame),
                end,
            },
            (true, false) => Self::Quadratic {
                start,
                control: a.global_handle2(frame),
                end,
            },
            (false, true) => Self::Quadratic {
                start,
                control: b.global_handle1(frame),
                end,
            },
            (false, false) => Self::Linear { start, end },
        }
    }

    /// Punkt bei `t` ∈ [0, 1] (geklemmt).
    pub fn point(&self, t: f32) -> Vec3 {
        match *self {
            Self::Linear { start, end } => linear_point(start, end, t),
            Self::Quadratic {
                start,
                control,
                end,
            } => quadratic_point(start, control, end, t),
            Self::Cubic {
                start,
                control1,
                control2,
                end,
            } => cubic_point(start, control1, control2, end, t),
        }
    }
}

/// Weltposition bei `t` auf dem Segment `a` → `b`.
pub fn evaluate_anchor_pair(a: &ControlPoint, b: &ControlPoint, frame: &Affine3A, t: f32) -> Vec3 {
    SegmentShape::between(a, b, frame).point(t)
}

/// Tastet das Segment mit `resolution + 1` Punkten ab (inklusive beider Enden).
pub fn sample_anchor_pair(
    a: &ControlPoint,
    b: &ControlPoint,
    frame: &Affine3A,
    resolution: u32,
) -> Vec<Vec3> {
    let resolution = resolution.max(1);
    let shape = SegmentShape::between(a, b, frame);
    (0..=resolution)
        .map(|i| shape.point(i as f32 / resolution as f32))
        .collect()
}

/// Approximierte Segmentlänge als Summe der Sehnen über `resolution` Schritte.
///
/// Unterschätzt die echte Bogenlänge und wächst monoton mit der Auflösung.
pub fn approximate_length(
    a: &ControlPoint,
    b: &ControlPoint,
    frame: &Affine3A,
    resolution: u32,
) -> f32 {
    let shape = SegmentShape::between(a, b, frame);
    crate::shared::bezier_geometry::approx_length(|t| shape.point(t), resolution.max(1) as usize)
}
