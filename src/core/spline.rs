//! Kubischer Bézier-Spline auf einem flachen Punkt-Array.
//!
//! Layout: `[A0, H, H, A1, H, H, A2, …]`, also `3k + 1` Punkte für `k` Teilkurven.
//! Anker liegen auf Indizes mit `i % 3 == 0`, jeder Anker hat einen
//! `ConstraintMode`, der die beiden angrenzenden Handles koppelt.
//! Punkte sind lokal, alle Ausgaben in Weltkoordinaten.
//!
//! Nach jeder Änderung wird die Distanz-Tabelle sofort neu aufgebaut.

pub mod lookup;

use super::nearest::{self, ClosestPoint, Ray};
use crate::shared::bezier_geometry::{cubic_derivative, cubic_point};
use crate::shared::options::SplineOptions;
use anyhow::bail;
use glam::{Affine3A, Vec3};
use lookup::{build_distance_table, DistanceEntry};
use serde::{Deserialize, Serialize, Serializer};

/// Kopplung der beiden Handles an einem Anker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConstraintMode {
    /// Handles sind unabhängig
    #[default]
    Free,
    /// Gegenüberliegendes Handle kollinear, eigene Länge bleibt
    Aligned,
    /// Gegenüberliegendes Handle gespiegelt (gleiche Länge)
    Mirrored,
}

/// Ergebnis einer Strahl-Abfrage auf dem Spline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub closest: ClosestPoint,
    /// Index der Teilkurve, in der der Treffer liegt
    pub last_anchor: usize,
}

/// Mehrteiliger kubischer Bézier-Spline.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "SplineData")]
pub struct SplinePath {
    points: Vec<Vec3>,
    modes: Vec<ConstraintMode>,
    transform: Affine3A,
    options: SplineOptions,
    lookup: Vec<DistanceEntry>,
}

/// Persistierte Felder eines Splines (ohne Distanz-Tabelle).
#[derive(Debug, Deserialize)]
struct SplineData {
    points: Vec<Vec3>,
    modes: Vec<ConstraintMode>,
    #[serde(default)]
    transform: Affine3A,
    #[serde(default)]
    options: SplineOptions,
}

/// Geliehene Sicht auf dieselben Felder zum Schreiben.
#[derive(Serialize)]
struct SplineDataRef<'a> {
    points: &'a [Vec3],
    modes: &'a [ConstraintMode],
    transform: &'a Affine3A,
    options: &'a SplineOptions,
}

impl TryFrom<SplineData> for SplinePath {
    type Error = anyhow::Error;

    fn try_from(data: SplineData) -> anyhow::Result<Self> {
        validate_layout(data.points.len(), data.modes.len())?;
        let mut spline = Self {
            points: data.points,
            modes: data.modes,
            transform: data.transform,
            options: data.options.sanitized(),
            lookup: Vec::new(),
        };
        spline.refresh();
        Ok(spline)
    }
}

impl Serialize for SplinePath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        SplineDataRef {
            points: &self.points,
            modes: &self.modes,
            transform: &self.transform,
            options: &self.options,
        }
        .serialize(serializer)
    }
}

/// Prüft das Punkt-Layout: `3k + 1` Punkte (k ≥ 1) und `k + 1` Modi.
pub fn validate_layout(point_count: usize, mode_count: usize) -> anyhow::Result<()> {
    if point_count < 4 || (point_count - 1) % 3 != 0 {
        bail!(
            "Ungültige Punktanzahl {}: erwartet 3k + 1 mit k ≥ 1",
            point_count
        );
    }
    let curves = (point_count - 1) / 3;
    if mode_count != curves + 1 {
        bail!(
            "Ungültige Modus-Anzahl {}: erwartet {} für {} Teilkurven",
            mode_count,
            curves + 1,
            curves
        );
    }
    Ok(())
}

impl Default for SplinePath {
    fn default() -> Self {
        Self::new()
    }
}

impl SplinePath {
    /// Standard-Spline: eine Teilkurve mit vier Punkten auf der X-Achse.
    pub fn new() -> Self {
        Self::with_options(SplineOptions::default())
    }

    pub fn with_options(options: SplineOptions) -> Self {
        Self::from_parts(
            vec![
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(2.0, 0.0, 0.0),
                Vec3::new(3.0, 0.0, 0.0),
                Vec3::new(4.0, 0.0, 0.0),
            ],
            vec![ConstraintMode::Free; 2],
            options,
        )
    }

    /// Erstellt einen Spline aus lokalen Punkten und Modi.
    ///
    /// Das Layout muss `validate_layout` erfüllen; für ungeprüfte Eingaben
    /// den Weg über `TryFrom`/Deserialisierung nehmen.
    pub fn from_parts(points: Vec<Vec3>, modes: Vec<ConstraintMode>, options: SplineOptions) -> Self {
        debug_assert!(
            validate_layout(points.len(), modes.len()).is_ok(),
            "ungültiges Spline-Layout: {} Punkte, {} Modi",
            points.len(),
            modes.len()
        );
        let mut spline = Self {
            points,
            modes,
            transform: Affine3A::IDENTITY,
            options: options.sanitized(),
            lookup: Vec::new(),
        };
        spline.refresh();
        spline
    }

    // ── Zugriff ─────────────────────────────────────────────────────

    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// Lokale Kontrollpunkte (Anker und Handles).
    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    pub fn modes(&self) -> &[ConstraintMode] {
        &self.modes
    }

    /// Anzahl der kubischen Teilkurven.
    pub fn curve_count(&self) -> usize {
        self.points.len().saturating_sub(1) / 3
    }

    pub fn options(&self) -> &SplineOptions {
        &self.options
    }

    /// Ersetzt die Optionen und baut die Distanz-Tabelle neu auf.
    pub fn set_options(&mut self, options: SplineOptions) {
        self.options = options.sanitized();
        self.refresh();
    }

    pub fn transform(&self) -> &Affine3A {
        &self.transform
    }

    pub fn set_transform(&mut self, transform: Affine3A) {
        self.transform = transform;
        self.refresh();
    }

    /// Lokale Position des Kontrollpunkts `index`.
    pub fn control_point(&self, index: usize) -> Option<Vec3> {
        self.points.get(index).copied()
    }

    /// Setzt einen Kontrollpunkt (lokal).
    ///
    /// Ein verschobener Anker nimmt seine Nachbar-Handles mit; danach wird der
    /// Modus des zugehörigen Ankers erzwungen. Gibt `false` bei ungültigem Index.
    pub fn set_control_point(&mut self, index: usize, point: Vec3) -> bool {
        if index >= self.points.len() {
            log::warn!("Kontrollpunkt {} existiert nicht", index);
            return false;
        }
        if index % 3 == 0 {
            let delta = point - self.points[index];
            if index > 0 {
                self.points[index - 1] += delta;
            }
            if index + 1 < self.points.len() {
                self.points[index + 1] += delta;
            }
        }
        self.points[index] = point;
        self.enforce_mode(index);
        self.refresh();
        true
    }

    /// Modus des Ankers, zu dem `index` gehört.
    pub fn control_point_mode(&self, index: usize) -> Option<ConstraintMode> {
        self.modes.get((index + 1) / 3).copied()
    }

    /// Setzt den Modus des Ankers, zu dem `index` gehört, und erzwingt ihn.
    pub fn set_control_point_mode(&mut self, index: usize, mode: ConstraintMode) -> bool {
        let mode_index = (index + 1) / 3;
        let Some(slot) = self.modes.get_mut(mode_index) else {
            log::warn!("Kein Modus für Kontrollpunkt {}", index);
            return false;
        };
        *slot = mode;
        self.enforce_mode(index);
        self.refresh();
        true
    }

    /// Koppelt das gegenüberliegende Handle des Ankers von `index` an das fixierte.
    ///
    /// Erster und letzter Anker werden nie erzwungen. Bei `Aligned` mit
    /// zusammenfallendem Anker und Handle bleibt das Gegen-Handle unverändert.
    fn enforce_mode(&mut self, index: usize) {
        let mode_index = (index + 1) / 3;
        let Some(&mode) = self.modes.get(mode_index) else {
            return;
        };
        if mode == ConstraintMode::Free || mode_index == 0 || mode_index + 1 == self.modes.len() {
            return;
        }

        let middle = mode_index * 3;
        let (fixed, enforced) = if index <= middle {
            (middle - 1, middle + 1)
        } else {
            (middle + 1, middle - 1)
        };

        let anchor = self.points[middle];
        let mut tangent = anchor - self.points[fixed];
        if mode == ConstraintMode::Aligned {
            if tangent.length_squared() <= f32::EPSILON * f32::EPSILON {
                return;
            }
            tangent = tangent.normalize() * anchor.distance(self.points[enforced]);
        }
        self.points[enforced] = anchor + tangent;
    }

    // ── Auswertung ──────────────────────────────────────────────────

    /// Teilkurven-Basisindex und lokales `t` zum globalen `t`.
    fn locate(&self, t: f32) -> (usize, f32) {
        let curves = self.curve_count();
        if t >= 1.0 {
            return (self.points.len() - 4, 1.0);
        }
        let scaled = t.clamp(0.0, 1.0) * curves as f32;
        let curve = (scaled as usize).min(curves - 1);
        (curve * 3, scaled - curve as f32)
    }

    /// Weltposition bei globalem `t` ∈ [0, 1] (geklemmt).
    ///
    /// `t` verteilt sich gleichmäßig auf die Teilkurven, nicht nach Bogenlänge.
    pub fn point_at(&self, t: f32) -> Vec3 {
        if self.points.len() < 4 {
            let first = self.points.first().copied().unwrap_or(Vec3::ZERO);
            return self.transform.transform_point3(first);
        }
        let (base, local_t) = self.locate(t);
        let p = &self.points[base..base + 4];
        self.transform
            .transform_point3(cubic_point(p[0], p[1], p[2], p[3], local_t))
    }

    /// Normierte Tangente (Weltkoordinaten) bei globalem `t`.
    pub fn tangent_at(&self, t: f32) -> Vec3 {
        if self.points.len() < 4 {
            return Vec3::ZERO;
        }
        let (base, local_t) = self.locate(t);
        let p = &self.points[base..base + 4];
        self.transform
            .transform_vector3(cubic_derivative(p[0], p[1], p[2], p[3], local_t))
            .normalize_or_zero()
    }

    /// Gesamtlänge laut Distanz-Tabelle.
    pub fn length(&self) -> f32 {
        self.lookup.last().map_or(0.0, |e| e.distance)
    }

    pub fn distance_table(&self) -> &[DistanceEntry] {
        &self.lookup
    }

    /// Weltposition zur Bogenlänge `distance` (geklemmt auf [0, Länge]).
    pub fn pos_for_distance(&self, distance: f32) -> Vec3 {
        lookup::pos_for_distance(&self.lookup, distance).unwrap_or_else(|| self.point_at(0.0))
    }

    /// Baut die Distanz-Tabelle neu auf.
    pub fn refresh(&mut self) {
        let table = build_distance_table(|t| self.point_at(t), self.curve_count(), &self.options);
        self.lookup = table;
    }

    // ── Struktur ────────────────────────────────────────────────────

    /// Hängt eine Teilkurve an: drei Punkte in +X-Abständen von 2.0.
    pub fn add_curve(&mut self) {
        let mut point = self.points.last().copied().unwrap_or(Vec3::ZERO);
        for _ in 0..3 {
            point.x += 2.0;
            self.points.push(point);
        }
        let mode = self.modes.last().copied().unwrap_or_default();
        self.modes.push(mode);
        self.enforce_mode(self.points.len() - 4);
        self.refresh();
    }

    /// Entfernt die letzte Teilkurve. Eine Teilkurve bleibt immer erhalten.
    pub fn remove_last_curve(&mut self) -> bool {
        if self.curve_count() <= 1 {
            log::warn!("Letzte Teilkurve kann nicht entfernt werden");
            return false;
        }
        self.points.truncate(self.points.len() - 3);
        self.modes.pop();
        self.refresh();
        true
    }

    /// Entfernt die erste Teilkurve. Eine Teilkurve bleibt immer erhalten.
    pub fn remove_first_curve(&mut self) -> bool {
        if self.curve_count() <= 1 {
            log::warn!("Letzte Teilkurve kann nicht entfernt werden");
            return false;
        }
        self.points.drain(0..3);
        self.modes.remove(0);
        self.refresh();
        true
    }

    /// Löscht einen Anker samt seiner beiden Handles.
    ///
    /// Erster/letzter Anker entfernen die erste/letzte Teilkurve.
    /// Handles können nicht gelöscht werden.
    pub fn delete_control_point(&mut self, index: usize) -> bool {
        if index >= self.points.len() || index % 3 != 0 {
            log::warn!("Nur Anker können gelöscht werden (Index {})", index);
            return false;
        }
        if index == 0 {
            return self.remove_first_curve();
        }
        if index + 1 == self.points.len() {
            return self.remove_last_curve();
        }
        self.points.drain(index - 1..=index + 1);
        self.modes.remove(index / 3);
        self.refresh();
        true
    }

    // ── Abfragen ────────────────────────────────────────────────────

    /// Nächster Abtastpunkt zu `target` (Brute Force über `steps + 1` Schritte).
    pub fn closest_point_to_point(&self, target: Vec3, steps: u32) -> ClosestPoint {
        nearest::closest_sample_to_point(|t| self.point_at(t), steps, target)
    }

    /// Nächster Abtastpunkt zur Trägergeraden von `ray`, mit Teilkurven-Index.
    pub fn closest_point_to_ray(&self, ray: &Ray, steps: u32) -> RayHit {
        let closest = nearest::closest_sample_to_ray(|t| self.point_at(t), steps, ray);
        let last_anchor = ((closest.t.clamp(0.0, 1.0) * self.curve_count() as f32) as usize)
            .min(self.curve_count().saturating_sub(1));
        RayHit {
            closest,
            last_anchor,
        }
    }

    /// Fügt am strahlnächsten Punkt einen neuen Anker mit zwei Handles ein.
    ///
    /// Die Handles liegen `handle_offset` entlang der Richtung der umgebenden
    /// Anker. Der neue Anker erhält `ConstraintMode::Free`.
    /// Gibt den Index des neuen Ankers zurück.
    pub fn insert_point_closest_to_ray(&mut self, ray: &Ray, steps: u32, handle_offset: f32) -> usize {
        let hit = self.closest_point_to_ray(ray, steps);
        let lesser = hit.last_anchor * 3;
        let greater = lesser + 3;

        let direction = (self.points[greater] - self.points[lesser]).normalize_or_zero();
        let offset = self.transform.transform_vector3(direction * handle_offset);
        let world = hit.closest.position;
        let to_local = self.transform.inverse();
        let inserted = [
            to_local.transform_point3(world - offset),
            to_local.transform_point3(world),
            to_local.transform_point3(world + offset),
        ];

        for (i, point) in inserted.into_iter().enumerate() {
            self.points.insert(greater - 1 + i, point);
        }
        self.modes.insert(greater / 3, ConstraintMode::Free);
        self.enforce_mode(greater);
        self.refresh();
        log::debug!(
            "Anker {} bei t={:.3} eingefügt ({} Teilkurven)",
            greater,
            hit.closest.t,
            self.curve_count()
        );
        greater
    }
}
