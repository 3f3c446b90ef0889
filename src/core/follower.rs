//! Objekt-Platzierung entlang einer `CurvePath`.
//!
//! Der Follower hält nur seinen Parameter `delta` und liest die Kurve bei
//! Bedarf; Animation über die Zeit ist Sache des Aufrufers (`advance`).

use super::curve::CurvePath;
use glam::Vec3;

/// Wie der Follower seine Position bestimmt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkMode {
    /// Keine Kopplung an die Kurve
    #[default]
    NotLinked,
    /// Position = Kurvenwert bei `delta`
    Delta,
    /// Position = nächster Anker zu `delta`
    SnapPoint,
}

#[derive(Debug, Clone)]
pub struct PathFollower {
    delta: f32,
    link_mode: LinkMode,
    /// Weltversatz, auf jede aufgelöste Position addiert
    offset: Vec3,
    snap_point: Option<usize>,
    snap_dirty: bool,
}

impl Default for PathFollower {
    fn default() -> Self {
        Self::new(LinkMode::Delta)
    }
}

impl PathFollower {
    pub fn new(link_mode: LinkMode) -> Self {
        Self {
            delta: 0.0,
            link_mode,
            offset: Vec3::ZERO,
            snap_point: None,
            snap_dirty: true,
        }
    }

    pub fn delta(&self) -> f32 {
        self.delta
    }

    pub fn link_mode(&self) -> LinkMode {
        self.link_mode
    }

    pub fn set_link_mode(&mut self, mode: LinkMode) {
        self.link_mode = mode;
    }

    pub fn offset(&self) -> Vec3 {
        self.offset
    }

    pub fn set_offset(&mut self, offset: Vec3) {
        self.offset = offset;
    }

    /// Setzt `delta`: geschlossene Kurven wickeln auf [0, 1), offene werden geklemmt.
    ///
    /// Nicht-endliche Werte werden verworfen.
    pub fn set_delta(&mut self, path: &CurvePath, delta: f32) {
        if !delta.is_finite() {
            log::warn!("Ungültiges delta {} verworfen", delta);
            return;
        }
        self.delta = if path.closed() {
            delta.rem_euclid(1.0)
        } else {
            delta.clamp(0.0, 1.0)
        };
        self.snap_dirty = true;
    }

    /// Verschiebt `delta` um `step` (gleiche Wickel-/Klemmregeln wie `set_delta`).
    pub fn advance(&mut self, path: &CurvePath, step: f32) {
        self.set_delta(path, self.delta + step);
    }

    /// Kurvenwert bei `delta` plus Versatz.
    pub fn position(&self, path: &CurvePath) -> Vec3 {
        path.value_at(self.delta) + self.offset
    }

    /// Index des Ankers, der `delta` am nächsten liegt (nach Änderungen neu bestimmt).
    pub fn snap_point(&mut self, path: &CurvePath) -> Option<usize> {
        if self.snap_dirty {
            self.snap_point = path.point_at_delta(self.delta);
            self.snap_dirty = false;
        }
        self.snap_point
    }

    /// Springt auf den Anker `index` (geklemmt auf die letzte Position).
    pub fn snap_to(&mut self, path: &CurvePath, index: usize) -> bool {
        let count = path.point_count();
        if count == 0 {
            return false;
        }
        let index = index.min(count - 1);
        self.delta = path.delta_of(index);
        self.snap_point = Some(index);
        self.snap_dirty = false;
        true
    }

    /// Aufgelöste Weltposition gemäß `LinkMode`; `None` ohne Kopplung.
    pub fn resolve(&mut self, path: &CurvePath) -> Option<Vec3> {
        match self.link_mode {
            LinkMode::NotLinked => None,
            LinkMode::Delta => Some(self.position(path)),
            LinkMode::SnapPoint => {
                let index = self.snap_point(path)?;
                let point = path.point(index)?;
                Some(point.global_position(path.transform()) + self.offset)
            }
        }
    }
}
