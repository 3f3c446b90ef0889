//! Reine Geometrie-Funktionen für Bézier-Segmente (linear, quadratisch, kubisch).
//!
//! Layer-neutral: wird von Kurve, Spline und Nearest-Point-Suche gemeinsam genutzt,
//! ohne Zirkel-Abhängigkeiten zu erzeugen. Alle Funktionen klemmen `t` auf [0, 1].

use glam::Vec3;

/// P(t) = P0 + (P1 − P0)·t
pub fn linear_point(p0: Vec3, p1: Vec3, t: f32) -> Vec3 {
    let t = t.clamp(0.0, 1.0);
    p0 + (p1 - p0) * t
}

/// B(t) = (1-t)²·P0 + 2(1-t)t·P1 + t²·P2
pub fn quadratic_point(p0: Vec3, p1: Vec3, p2: Vec3, t: f32) -> Vec3 {
    let t = t.clamp(0.0, 1.0);
    let inv = 1.0 - t;
    inv * inv * p0 + 2.0 * inv * t * p1 + t * t * p2
}

/// B(t) = (1-t)³·P0 + 3(1-t)²t·P1 + 3(1-t)t²·P2 + t³·P3
pub fn cubic_point(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3, t: f32) -> Vec3 {
    let t = t.clamp(0.0, 1.0);
    let inv = 1.0 - t;
    let inv2 = inv * inv;
    let t2 = t * t;
    inv2 * inv * p0 + 3.0 * inv2 * t * p1 + 3.0 * inv * t2 * p2 + t2 * t * p3
}

/// B'(t) = 3(1-t)²·(P1−P0) + 6(1-t)t·(P2−P1) + 3t²·(P3−P2)
///
/// Nicht normiert. Wird für Tangenten entlang des Splines verwendet.
pub fn cubic_derivative(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3, t: f32) -> Vec3 {
    let t = t.clamp(0.0, 1.0);
    let inv = 1.0 - t;
    3.0 * inv * inv * (p1 - p0) + 6.0 * inv * t * (p2 - p1) + 3.0 * t * t * (p3 - p2)
}

/// Approximierte Länge einer Polyline.
pub fn polyline_length(points: &[Vec3]) -> f32 {
    points.windows(2).map(|w| w[0].distance(w[1])).sum()
}

/// Approximierte Kurvenlänge über `samples` gleichmäßige Parameter-Schritte.
pub fn approx_length(eval: impl Fn(f32) -> Vec3, samples: usize) -> f32 {
    let samples = samples.max(1);
    let mut length = 0.0;
    let mut prev = eval(0.0);
    for i in 1..=samples {
        let t = i as f32 / samples as f32;
        let p = eval(t);
        length += prev.distance(p);
        prev = p;
    }
    length
}
