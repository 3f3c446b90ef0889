//! Distanz-Tabelle (kumulierte Bogenlänge → Position) für Splines.

use crate::shared::options::SplineOptions;
use glam::Vec3;

/// Ein Stützpunkt der Distanz-Tabelle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceEntry {
    /// Weltposition
    pub position: Vec3,
    /// Kumulierte Sehnenlänge vom Start bis zu `position`
    pub distance: f32,
}

impl DistanceEntry {
    pub fn new(position: Vec3, distance: f32) -> Self {
        Self { position, distance }
    }
}

/// Baut die Distanz-Tabelle durch gleichmäßiges Abtasten von `eval` über [0, 1].
///
/// - `steps_per_curve * curve_count` Schritte, Distanz = Summe der Sehnen.
/// - Ohne `optimize` wird jeder Schritt gespeichert. Mit `optimize` nur der
///   vorherige Schritt, sobald die Richtung gegenüber dem letzten Stützpunkt
///   unter `optimize_dot_check` fällt; gerade Läufe schrumpfen auf ihre Enden.
/// - Beim Überqueren einer Anker-Grenze `k / curve_count` wird der Anker selbst
///   eingetragen, unabhängig von `optimize`. Liegt ein Abtastschritt exakt auf
///   der Grenze, steht der Anker doppelt in der Tabelle.
/// - Start (Distanz 0) und Endpunkt werden immer eingetragen.
///
/// Die Distanzen sind monoton nicht fallend.
pub fn build_distance_table(
    eval: impl Fn(f32) -> Vec3,
    curve_count: usize,
    options: &SplineOptions,
) -> Vec<DistanceEntry> {
    let options = options.sanitized();
    let curve_count = curve_count.max(1);
    let total_steps = options.steps_per_curve as usize * curve_count;

    let start = eval(0.0);
    let mut table = vec![DistanceEntry::new(start, 0.0)];

    let mut ref_start = start;
    let mut ref_end = eval(1.0 / total_steps as f32);
    let mut line_end = ref_end;
    let mut distance = start.distance(ref_end);
    if !options.optimize {
        table.push(DistanceEntry::new(line_end, distance));
    }

    let t_per_anchor = 1.0 / curve_count as f32;
    let mut anchors_passed = 1usize;
    let mut t = 0.0f32;

    for i in 2..=total_steps {
        let prev_t = t;
        t = i as f32 / total_steps as f32;

        let prev_point = line_end;
        line_end = eval(t);
        let prev_distance = distance;
        distance += prev_point.distance(line_end);

        if options.optimize {
            let ref_dir = (ref_end - ref_start).normalize_or_zero();
            let step_dir = (line_end - ref_end).normalize_or_zero();
            if step_dir.dot(ref_dir) < options.optimize_dot_check {
                ref_start = ref_end;
                table.push(DistanceEntry::new(prev_point, prev_distance));
            }
            ref_end = line_end;
        }

        let check_t = t_per_anchor * anchors_passed as f32;
        if prev_t < check_t && check_t <= t && t < 1.0 {
            let anchor = eval(check_t);
            // Anker liegt zwischen prev_point und line_end
            let anchor_distance = (prev_distance + prev_point.distance(anchor)).min(distance);
            table.push(DistanceEntry::new(anchor, anchor_distance));
            anchors_passed += 1;
            ref_start = anchor;
        }

        if !options.optimize {
            table.push(DistanceEntry::new(line_end, distance));
        }
    }

    table.push(DistanceEntry::new(line_end, distance));
    log::debug!(
        "Distanz-Tabelle: {} Einträge aus {} Schritten (optimize={}), Länge {:.3}",
        table.len(),
        total_steps,
        options.optimize,
        distance
    );
    table
}

/// Position zur kumulierten Distanz `distance` per linearer Interpolation.
///
/// Distanzen ≤ 0 liefern den ersten, ≥ Gesamtlänge den letzten Eintrag.
/// `None` bei leerer Tabelle.
pub fn pos_for_distance(table: &[DistanceEntry], distance: f32) -> Option<Vec3> {
    let first = table.first()?;
    let last = table.last()?;
    if distance <= first.distance {
        return Some(first.position);
    }
    if distance >= last.distance {
        return Some(last.position);
    }
    for w in table.windows(2) {
        let (prev, next) = (w[0], w[1]);
        if distance >= prev.distance && distance < next.distance {
            let ratio = (distance - prev.distance) / (next.distance - prev.distance);
            return Some(prev.position + (next.position - prev.position) * ratio);
        }
    }
    Some(last.position)
}
