//! Bézier-Kurve variabler Länge über Kontrollpunkten.
//!
//! Länge und abgetastete Polyline werden lazy berechnet: jede Änderung setzt
//! die Kurve auf "dirty", der nächste lesende Zugriff rechnet alles in einem
//! Durchlauf neu. Der globale Parameter `t` ist proportional zur Bogenlänge.

use super::control_point::{ControlPoint, CurveId, HandleStyle};
use super::nearest::{self, ClosestPoint, Ray};
use super::segment::{evaluate_anchor_pair, sample_anchor_pair};
use crate::shared::bezier_geometry::polyline_length;
use crate::shared::options::CurveOptions;
use glam::{Affine3A, Vec3};
use serde::{Deserialize, Serialize, Serializer};
use std::cell::{Ref, RefCell};

/// Ein Teilstück der abgetasteten Polyline (Weltkoordinaten).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampledSegment {
    pub start: Vec3,
    pub end: Vec3,
    /// Index des Ankers, an dem das Kurvensegment beginnt
    pub from_anchor: usize,
    /// Index des Ankers, an dem das Kurvensegment endet
    pub to_anchor: usize,
}

/// Abgeleiteter Zustand, konsistent mit den Punkten sobald `dirty == false`.
#[derive(Debug, Clone)]
struct CurveCache {
    dirty: bool,
    length: f32,
    segment_lengths: Vec<f32>,
    samples: Vec<SampledSegment>,
}

impl Default for CurveCache {
    fn default() -> Self {
        Self {
            dirty: true,
            length: 0.0,
            segment_lengths: Vec::new(),
            samples: Vec::new(),
        }
    }
}

/// Offene oder geschlossene Bézier-Kurve.
///
/// Ein `clone()` ist eine eigenständige Kurve mit neuer `CurveId`.
#[derive(Debug, Deserialize)]
#[serde(from = "CurveData")]
pub struct CurvePath {
    id: CurveId,
    points: Vec<ControlPoint>,
    closed: bool,
    transform: Affine3A,
    options: CurveOptions,
    cache: RefCell<CurveCache>,
}

/// Persistierte Felder einer Kurve (ohne Cache und Rück-Referenzen).
#[derive(Debug, Deserialize)]
struct CurveData {
    points: Vec<ControlPoint>,
    #[serde(default)]
    closed: bool,
    #[serde(default)]
    transform: Affine3A,
    #[serde(default)]
    options: CurveOptions,
}

/// Geliehene Sicht auf dieselben Felder zum Schreiben.
#[derive(Serialize)]
struct CurveDataRef<'a> {
    points: &'a [ControlPoint],
    closed: bool,
    transform: &'a Affine3A,
    options: &'a CurveOptions,
}

impl From<CurveData> for CurvePath {
    fn from(data: CurveData) -> Self {
        let mut curve = Self::with_options(data.options);
        curve.points = data.points;
        curve.closed = data.closed;
        curve.transform = data.transform;
        curve.options.resolution = curve.options.resolution.max(1);
        curve.relink();
        curve
    }
}

impl Serialize for CurvePath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        CurveDataRef {
            points: &self.points,
            closed: self.closed,
            transform: &self.transform,
            options: &self.options,
        }
        .serialize(serializer)
    }
}

impl Clone for CurvePath {
    fn clone(&self) -> Self {
        let id = CurveId::next();
        let mut points = self.points.clone();
        for point in &mut points {
            point.set_owner(Some(id));
        }
        Self {
            id,
            points,
            closed: self.closed,
            transform: self.transform,
            options: self.options,
            cache: self.cache.clone(),
        }
    }
}

impl Default for CurvePath {
    fn default() -> Self {
        Self::new()
    }
}

impl CurvePath {
    /// Erstellt eine leere, offene Kurve mit Standard-Optionen.
    pub fn new() -> Self {
        Self::with_options(CurveOptions::default())
    }

    /// Erstellt eine leere, offene Kurve.
    pub fn with_options(options: CurveOptions) -> Self {
        Self {
            id: CurveId::next(),
            points: Vec::new(),
            closed: false,
            transform: Affine3A::IDENTITY,
            options: CurveOptions {
                resolution: options.resolution.max(1),
                ..options
            },
            cache: RefCell::new(CurveCache::default()),
        }
    }

    /// Erstellt eine Kurve aus lokalen Anker-Positionen (ohne Handles).
    pub fn from_positions(positions: &[Vec3], closed: bool) -> Self {
        let mut curve = Self::new();
        curve.closed = closed;
        for &pos in positions {
            curve.add_point(ControlPoint::new(pos), None);
        }
        curve
    }

    pub fn id(&self) -> CurveId {
        self.id
    }

    pub fn points(&self) -> &[ControlPoint] {
        &self.points
    }

    /// Punkt am Index, `None` falls ungültig.
    pub fn point(&self, index: usize) -> Option<&ControlPoint> {
        self.points.get(index)
    }

    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// `closed ? n : n - 1`, 0 bei weniger als zwei Punkten.
    pub fn segment_count(&self) -> usize {
        match self.points.len() {
            0 | 1 => 0,
            n if self.closed => n,
            n => n - 1,
        }
    }

    pub fn closed(&self) -> bool {
        self.closed
    }

    pub fn set_closed(&mut self, closed: bool) {
        if self.closed == closed {
            return;
        }
        self.closed = closed;
        self.mark_dirty();
    }

    pub fn resolution(&self) -> u32 {
        self.options.resolution
    }

    /// Setzt die Abtastauflösung; 0 wird ignoriert.
    pub fn set_resolution(&mut self, resolution: u32) -> bool {
        if resolution == 0 {
            log::warn!("Kurven-Auflösung 0 ignoriert");
            return false;
        }
        self.options.resolution = resolution;
        self.mark_dirty();
        true
    }

    pub fn transform(&self) -> &Affine3A {
        &self.transform
    }

    pub fn set_transform(&mut self, transform: Affine3A) {
        self.transform = transform;
        self.mark_dirty();
    }

    pub fn options(&self) -> &CurveOptions {
        &self.options
    }

    pub fn set_auto_smooth(&mut self, enabled: bool) {
        if enabled != self.options.auto_smooth {
            self.mark_dirty();
        }
        self.options.auto_smooth = enabled;
    }

    pub fn set_auto_smooth_factor(&mut self, factor: f32) {
        if factor != self.options.auto_smooth_factor {
            self.mark_dirty();
        }
        self.options.auto_smooth_factor = factor;
    }

    pub fn is_dirty(&self) -> bool {
        self.cache.borrow().dirty
    }

    /// Erzwingt eine Neuberechnung beim nächsten lesenden Zugriff.
    pub fn mark_dirty(&mut self) {
        self.cache.get_mut().dirty = true;
    }

    // ── Punkt-Verwaltung ───────────────────────────────────────────

    /// Entfernt alle Punkte.
    pub fn clear(&mut self) {
        for point in &mut self.points {
            point.set_owner(None);
        }
        self.points.clear();
        self.mark_dirty();
    }

    /// Fügt einen Punkt ein (ungültiger/fehlender Index → am Ende).
    ///
    /// Der Punkt gehört danach dieser Kurve. Gibt den tatsächlichen Index zurück.
    pub fn add_point(&mut self, mut point: ControlPoint, index: Option<usize>) -> usize {
        if let Some(previous) = point.owner().filter(|&owner| owner != self.id) {
            log::debug!(
                "Punkt wechselt Besitzer: Kurve {} → Kurve {}",
                previous.raw(),
                self.id.raw()
            );
        }
        point.set_owner(Some(self.id));
        let idx = match index {
            Some(i) if i < self.points.len() => {
                self.points.insert(i, point);
                i
            }
            _ => {
                self.points.push(point);
                self.points.len() - 1
            }
        };
        self.mark_dirty();
        idx
    }

    /// Fügt einen Punkt an einer Weltposition ein (Umrechnung ins lokale Frame).
    pub fn add_point_world(&mut self, world_position: Vec3, index: Option<usize>) -> usize {
        let local = self.transform.inverse().transform_point3(world_position);
        self.add_point(ControlPoint::new(local), index)
    }

    /// Entfernt den Punkt am Index (ungültiger/fehlender Index → letzter Punkt).
    ///
    /// Markiert die Kurve als dirty. Ob das Entfernen die Kurve dirty setzen soll,
    /// ist offen; das Verhalten ist durch Tests festgeschrieben.
    pub fn remove_point(&mut self, index: Option<usize>) -> Option<ControlPoint> {
        if self.points.is_empty() {
            return None;
        }
        let idx = match index {
            Some(i) if i < self.points.len() => i,
            _ => self.points.len() - 1,
        };
        let mut removed = self.points.remove(idx);
        removed.set_owner(None);
        self.mark_dirty();
        Some(removed)
    }

    /// Verschiebt einen Punkt in eine andere Kurve (Besitzerwechsel).
    ///
    /// Beide Kurven werden dirty. `false` bei ungültigem Index.
    pub fn transfer_point(&mut self, index: usize, target: &mut CurvePath, at: Option<usize>) -> bool {
        if index >= self.points.len() {
            log::warn!("Punkt-Transfer: Index {} ungültig", index);
            return false;
        }
        let point = self.points.remove(index);
        self.mark_dirty();
        target.add_point(point, at);
        true
    }

    /// Setzt die Besitzer-Referenz aller Punkte neu (nach dem Laden).
    pub fn relink(&mut self) {
        let id = self.id;
        for point in &mut self.points {
            point.set_owner(Some(id));
        }
        self.mark_dirty();
    }

    // ── Punkt-Bearbeitung ──────────────────────────────────────────

    fn edit_point(&mut self, index: usize, edit: impl FnOnce(&mut ControlPoint) -> bool) -> bool {
        let Some(point) = self.points.get_mut(index) else {
            return false;
        };
        let applied = edit(point);
        if applied {
            self.mark_dirty();
        }
        applied
    }

    pub fn set_point_position(&mut self, index: usize, position: Vec3) -> bool {
        self.edit_point(index, |p| p.set_position(position))
    }

    pub fn set_point_handle1(&mut self, index: usize, handle: Vec3) -> bool {
        self.edit_point(index, |p| p.set_handle1(handle))
    }

    pub fn set_point_handle2(&mut self, index: usize, handle: Vec3) -> bool {
        self.edit_point(index, |p| p.set_handle2(handle))
    }

    pub fn set_point_handle_style(&mut self, index: usize, style: HandleStyle) -> bool {
        self.edit_point(index, |p| p.set_handle_style(style))
    }

    /// Sperren ändert die Geometrie nicht, die Kurve bleibt sauber.
    pub fn set_point_locked(&mut self, index: usize, locked: bool) -> bool {
        let Some(point) = self.points.get_mut(index) else {
            return false;
        };
        point.set_locked(locked);
        true
    }

    // ── Abgeleiteter Zustand ───────────────────────────────────────

    fn ensure_fresh(&self) {
        if self.cache.borrow().dirty {
            self.recompute();
        }
    }

    /// Länge und Polyline in einem Durchlauf neu berechnen.
    fn recompute(&self) {
        let mut cache = CurveCache {
            dirty: false,
            ..CurveCache::default()
        };
        let n = self.points.len();
        let resolution = self.options.resolution;
        for i in 0..self.segment_count() {
            let j = (i + 1) % n;
            let samples = sample_anchor_pair(&self.points[i], &self.points[j], &self.transform, resolution);
            let segment_length = polyline_length(&samples);
            for w in samples.windows(2) {
                cache.samples.push(SampledSegment {
                    start: w[0],
                    end: w[1],
                    from_anchor: i,
                    to_anchor: j,
                });
            }
            cache.segment_lengths.push(segment_length);
            cache.length += segment_length;
        }
        log::debug!(
            "Kurve {}: {} Segmente neu berechnet, Länge {:.3}",
            self.id.raw(),
            cache.segment_lengths.len(),
            cache.length
        );
        *self.cache.borrow_mut() = cache;
    }

    /// Approximierte Gesamtlänge (0 bei weniger als zwei Punkten).
    pub fn length(&self) -> f32 {
        self.ensure_fresh();
        self.cache.borrow().length
    }

    /// Approximierte Länge jedes Segments in Segment-Reihenfolge.
    pub fn segment_lengths(&self) -> Ref<'_, [f32]> {
        self.ensure_fresh();
        Ref::map(self.cache.borrow(), |c| c.segment_lengths.as_slice())
    }

    /// Abgetastete Polyline (`resolution` Teilstücke pro Segment).
    pub fn sampled_segments(&self) -> Ref<'_, [SampledSegment]> {
        self.ensure_fresh();
        Ref::map(self.cache.borrow(), |c| c.samples.as_slice())
    }

    /// Per-Frame-Aktualisierung: glättet (falls aktiv) und rechnet neu, wenn dirty.
    ///
    /// Gibt `true` zurück, wenn neu berechnet wurde.
    pub fn update(&mut self) -> bool {
        if !self.is_dirty() {
            return false;
        }
        if self.options.auto_smooth {
            self.auto_smooth(self.options.auto_smooth_factor);
        }
        self.recompute();
        true
    }

    // ── Navigation ─────────────────────────────────────────────────

    /// Weltposition bei `t` ∈ [0, 1] (Bogenlängen-proportional).
    ///
    /// `t ≥ 1` liefert den letzten Punkt, bei geschlossener Kurve den ersten.
    pub fn value_at(&self, t: f32) -> Vec3 {
        let Some(first) = self.points.first() else {
            return Vec3::ZERO;
        };
        let n = self.points.len();
        if n == 1 || t <= 0.0 {
            return first.global_position(&self.transform);
        }
        if t >= 1.0 {
            return if self.closed {
                first.global_position(&self.transform)
            } else {
                self.points[n - 1].global_position(&self.transform)
            };
        }

        self.ensure_fresh();
        let cache = self.cache.borrow();
        if cache.length <= f32::EPSILON {
            return first.global_position(&self.transform);
        }

        let mut processed = 0.0;
        let mut selected = None;
        for i in 0..n - 1 {
            let share = cache.segment_lengths[i] / cache.length;
            if processed + share >= t {
                selected = Some((i, share));
                break;
            }
            processed += share;
        }

        let (i, share) = match selected {
            Some(found) => found,
            // Rest gehört zum schließenden Segment (letzter → erster Punkt)
            None if self.closed => (n - 1, cache.segment_lengths[n - 1] / cache.length),
            // Rundungsrest knapp unter 1
            None => return self.points[n - 1].global_position(&self.transform),
        };

        let local_t = if share > f32::EPSILON {
            (t - processed) / share
        } else {
            0.0
        };
        evaluate_anchor_pair(&self.points[i], &self.points[(i + 1) % n], &self.transform, local_t)
    }

    /// Kumulierte Länge bis zum Anker geteilt durch Gesamtlänge.
    ///
    /// 0 für Index 0, 1 für Index ≥ Punktanzahl.
    pub fn delta_of(&self, point_index: usize) -> f32 {
        if point_index == 0 {
            return 0.0;
        }
        if point_index >= self.points.len() {
            return 1.0;
        }
        self.ensure_fresh();
        let cache = self.cache.borrow();
        if cache.length <= f32::EPSILON {
            return 0.0;
        }
        let upto: f32 = cache.segment_lengths[..point_index].iter().sum();
        upto / cache.length
    }

    /// Index des Ankers, der `t` am nächsten liegt (Umkehrung von `delta_of`).
    pub fn point_at_delta(&self, t: f32) -> Option<usize> {
        let n = self.points.len();
        if n == 0 {
            return None;
        }
        if t <= 0.0 {
            return Some(0);
        }
        if t >= 1.0 {
            return Some(if self.closed { 0 } else { n - 1 });
        }

        let mut d2 = self.delta_of(0);
        for i in 1..n {
            let d1 = d2;
            d2 = self.delta_of(i);
            if t >= d1 && t < d2 {
                return Some(if t - d1 < d2 - t { i - 1 } else { i });
            }
        }

        if self.closed {
            // Schließendes Segment: letzter Punkt → erster Punkt (Delta 1)
            let d1 = d2;
            return Some(if t - d1 < 1.0 - t { n - 1 } else { 0 });
        }
        Some(n - 1)
    }

    // ── Glättung ───────────────────────────────────────────────────

    /// Setzt alle Handles automatisch für eine glatte Kurve.
    ///
    /// Offene Enden erhalten ein einseitiges Handle (`Independent`), alle anderen
    /// Punkte gespiegelte Handles entlang der Nachbar-Sehne. Sperren werden
    /// umgangen, der Sperr-Status bleibt unverändert.
    pub fn auto_smooth(&mut self, factor: f32) {
        let n = self.points.len();
        if n == 0 {
            return;
        }
        let positions: Vec<Vec3> = self.points.iter().map(|p| p.position()).collect();
        let closed = self.closed;

        for i1 in 0..n {
            let i0 = (i1 + n - 1) % n;
            let i2 = (i1 + 1) % n;
            let (p0, p1, p2) = (positions[i0], positions[i1], positions[i2]);

            let point = &mut self.points[i1];
            let was_locked = point.locked();
            point.set_locked(false);

            if i1 == 0 && !closed {
                point.set_handle_style(HandleStyle::Independent);
                point.set_handle1(factor * (p2 - p1));
                point.set_handle2(Vec3::ZERO);
            } else if i1 == n - 1 && !closed {
                point.set_handle_style(HandleStyle::Independent);
                point.set_handle1(-factor * (p1 - p0));
                point.set_handle2(Vec3::ZERO);
            } else {
                point.set_handle_style(HandleStyle::Mirrored);
                let tangent = (p2 - p0).normalize_or_zero();
                point.set_handle1(-factor * tangent * (p1 - p0).length());
            }

            point.set_locked(was_locked);
        }
        self.mark_dirty();
    }

    // ── Nearest-Point ──────────────────────────────────────────────

    /// Nächster Kurvenpunkt zu `target` per gleichmäßiger Abtastung von `t`.
    pub fn closest_point_to_point(&self, target: Vec3, steps: u32) -> ClosestPoint {
        nearest::closest_sample_to_point(|t| self.value_at(t), steps, target)
    }

    /// Nächster Kurvenpunkt zur Trägergeraden von `ray`.
    pub fn closest_point_to_ray(&self, ray: &Ray, steps: u32) -> ClosestPoint {
        nearest::closest_sample_to_ray(|t| self.value_at(t), steps, ray)
    }
}

#[cfg(test)]
mod tests;
