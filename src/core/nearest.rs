//! Brute-Force-Suche des nächsten Kurvenpunkts zu einem Punkt oder Strahl.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Strahl mit normierter Richtung.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Erstellt einen Strahl; die Richtung wird normiert.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Abstand eines Punkts zur Trägergeraden des Strahls.
    pub fn distance_to_point(&self, point: Vec3) -> f32 {
        self.direction.cross(point - self.origin).length()
    }
}

/// Ergebnis einer Nearest-Point-Suche.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClosestPoint {
    /// Gefundene Weltposition auf der Kurve
    pub position: Vec3,
    /// Globaler Parameter der Position
    pub t: f32,
    /// Index des Abtastschritts (0..=steps)
    pub step: usize,
}

/// Tastet `eval` in `steps + 1` gleichmäßigen Schritten ab und minimiert `metric`.
///
/// Bei Gleichstand gewinnt der kleinere Parameter.
pub fn closest_sample(
    eval: impl Fn(f32) -> Vec3,
    steps: u32,
    metric: impl Fn(Vec3) -> f32,
) -> ClosestPoint {
    let steps = steps.max(1);
    let mut best = ClosestPoint {
        position: eval(0.0),
        t: 0.0,
        step: 0,
    };
    let mut best_score = f32::MAX;
    for i in 0..=steps {
        let t = i as f32 / steps as f32;
        let position = eval(t);
        let score = metric(position);
        if score < best_score {
            best_score = score;
            best = ClosestPoint {
                position,
                t,
                step: i as usize,
            };
        }
    }
    best
}

/// Nächster Abtastpunkt zu `target` (quadrierte euklidische Distanz).
pub fn closest_sample_to_point(
    eval: impl Fn(f32) -> Vec3,
    steps: u32,
    target: Vec3,
) -> ClosestPoint {
    closest_sample(eval, steps, |p| p.distance_squared(target))
}

/// Nächster Abtastpunkt zur Trägergeraden von `ray`.
pub fn closest_sample_to_ray(eval: impl Fn(f32) -> Vec3, steps: u32, ray: &Ray) -> ClosestPoint {
    closest_sample(eval, steps, |p| ray.distance_to_point(p))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn line(t: f32) -> Vec3 {
        Vec3::new(10.0 * t, 0.0, 0.0)
    }

    #[test]
    fn test_ray_distance_is_perpendicular() {
        let ray = Ray::new(Vec3::new(5.0, 10.0, 0.0), Vec3::new(0.0, -3.0, 0.0));
        assert_relative_eq!(ray.direction.length(), 1.0);
        assert_relative_eq!(ray.distance_to_point(Vec3::new(8.0, 0.0, 0.0)), 3.0);
    }

    #[test]
    fn test_closest_to_point_on_line() {
        let hit = closest_sample_to_point(line, 10, Vec3::new(3.1, 4.0, 0.0));
        assert_eq!(hit.step, 3);
        assert_relative_eq!(hit.t, 0.3);
        assert_relative_eq!(hit.position.x, 3.0, epsilon = 1e-5);
    }

    #[test]
    fn test_closest_to_perpendicular_ray_hits_midpoint() {
        let ray = Ray::new(Vec3::new(5.0, 0.0, 7.0), Vec3::new(0.0, 0.0, -1.0));
        let steps = 50;
        let hit = closest_sample_to_ray(line, steps, &ray);
        assert!((hit.t - 0.5).abs() <= 1.0 / steps as f32);
    }

    #[test]
    fn test_zero_steps_treated_as_one() {
        let hit = closest_sample_to_point(line, 0, Vec3::new(9.0, 0.0, 0.0));
        assert_eq!(hit.step, 1);
        assert_eq!(hit.position, Vec3::new(10.0, 0.0, 0.0));
    }
}
