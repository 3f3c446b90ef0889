use super::*;
use approx::assert_relative_eq;

fn straight_line() -> CurvePath {
    CurvePath::from_positions(&[Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0)], false)
}

/// Quadrat mit Kantenlänge 10 in der XY-Ebene.
fn square(closed: bool) -> CurvePath {
    CurvePath::from_positions(
        &[
            Vec3::ZERO,
            Vec3::new(10.0, 0.0, 0.0),
            Vec3::new(10.0, 10.0, 0.0),
            Vec3::new(0.0, 10.0, 0.0),
        ],
        closed,
    )
}

fn s_curve() -> CurvePath {
    let mut curve = CurvePath::new();
    curve.add_point(
        ControlPoint::with_handles(Vec3::ZERO, Vec3::ZERO, Vec3::new(3.0, 6.0, 0.0)),
        None,
    );
    curve.add_point(
        ControlPoint::with_handles(
            Vec3::new(10.0, 0.0, 0.0),
            Vec3::new(-3.0, -6.0, 0.0),
            Vec3::new(3.0, 6.0, 0.0),
        ),
        None,
    );
    curve.add_point(ControlPoint::new(Vec3::new(20.0, 5.0, 0.0)), None);
    curve
}

// ── Länge und Cache ──

#[test]
fn test_straight_line_midpoint_is_exact() {
    let curve = straight_line();
    assert_eq!(curve.value_at(0.5), Vec3::new(5.0, 0.0, 0.0));
    assert_relative_eq!(curve.length(), 10.0, epsilon = 1e-4);
}

#[test]
fn test_too_few_points_have_zero_length() {
    let empty = CurvePath::new();
    assert_eq!(empty.length(), 0.0);
    assert_eq!(empty.value_at(0.5), Vec3::ZERO);
    assert_eq!(empty.point_at_delta(0.5), None);

    let single = CurvePath::from_positions(&[Vec3::new(1.0, 2.0, 3.0)], false);
    assert_eq!(single.length(), 0.0);
    assert_eq!(single.value_at(0.7), Vec3::new(1.0, 2.0, 3.0));
    assert_eq!(single.segment_count(), 0);
}

#[test]
fn test_segment_count_depends_on_closed() {
    assert_eq!(square(false).segment_count(), 3);
    assert_eq!(square(true).segment_count(), 4);
    assert_relative_eq!(square(false).length(), 30.0, epsilon = 1e-3);
    assert_relative_eq!(square(true).length(), 40.0, epsilon = 1e-3);
}

#[test]
fn test_read_clears_dirty_and_mutation_sets_it() {
    let mut curve = straight_line();
    assert!(curve.is_dirty());
    let _ = curve.length();
    assert!(!curve.is_dirty());

    assert!(curve.set_point_position(1, Vec3::new(20.0, 0.0, 0.0)));
    assert!(curve.is_dirty());
    assert_relative_eq!(curve.length(), 20.0, epsilon = 1e-4);
    assert!(!curve.is_dirty());
}

#[test]
fn test_locked_edit_keeps_curve_clean() {
    let mut curve = straight_line();
    let _ = curve.length();
    curve.set_point_locked(1, true);
    assert!(!curve.set_point_position(1, Vec3::new(50.0, 0.0, 0.0)));
    assert!(!curve.is_dirty());
    assert_relative_eq!(curve.length(), 10.0, epsilon = 1e-4);
}

#[test]
fn test_sampled_segments_are_tagged_with_anchor_pairs() {
    let mut curve = square(true);
    curve.set_resolution(5);
    let samples = curve.sampled_segments();
    assert_eq!(samples.len(), 4 * 5);
    assert_eq!(samples[0].from_anchor, 0);
    assert_eq!(samples[0].to_anchor, 1);
    let last = samples[samples.len() - 1];
    assert_eq!((last.from_anchor, last.to_anchor), (3, 0));
    assert_eq!(last.end, Vec3::ZERO);
}

#[test]
fn test_sample_lengths_sum_to_curve_length() {
    let curve = s_curve();
    let sum: f32 = curve
        .sampled_segments()
        .iter()
        .map(|s| s.start.distance(s.end))
        .sum();
    assert_relative_eq!(sum, curve.length(), epsilon = 1e-3);
}

#[test]
fn test_set_resolution_zero_is_ignored() {
    let mut curve = straight_line();
    assert!(!curve.set_resolution(0));
    assert_eq!(curve.resolution(), 30);
}

// ── value_at ──

#[test]
fn test_value_at_endpoints_open_and_closed() {
    let open = s_curve();
    assert_eq!(open.value_at(0.0), Vec3::ZERO);
    assert_eq!(open.value_at(1.0), Vec3::new(20.0, 5.0, 0.0));
    assert_eq!(open.value_at(-3.0), Vec3::ZERO);

    let closed = square(true);
    assert_eq!(closed.value_at(1.0), Vec3::ZERO);
    assert_eq!(closed.value_at(2.0), Vec3::ZERO);
}

#[test]
fn test_value_at_is_proportional_to_arc_length() {
    // Segmente 10 und 30 lang → t = 0.25 liegt genau am mittleren Anker
    let curve = CurvePath::from_positions(
        &[Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0), Vec3::new(40.0, 0.0, 0.0)],
        false,
    );
    let at_anchor = curve.value_at(0.25);
    assert_relative_eq!(at_anchor.x, 10.0, epsilon = 1e-3);
    let in_second = curve.value_at(0.625);
    assert_relative_eq!(in_second.x, 25.0, epsilon = 1e-3);
}

#[test]
fn test_value_at_closed_uses_closing_segment() {
    let curve = square(true);
    // 3.5 von 4 Kanten → Mitte der Kante (0,10) → (0,0)
    let p = curve.value_at(0.875);
    assert_relative_eq!(p.x, 0.0, epsilon = 1e-3);
    assert_relative_eq!(p.y, 5.0, epsilon = 1e-3);
}

#[test]
fn test_value_at_applies_transform() {
    let mut curve = straight_line();
    curve.set_transform(Affine3A::from_translation(Vec3::new(0.0, 0.0, 5.0)));
    assert_eq!(curve.value_at(0.0), Vec3::new(0.0, 0.0, 5.0));
    assert_eq!(curve.value_at(0.5), Vec3::new(5.0, 0.0, 5.0));
}

#[test]
fn test_coincident_points_do_not_produce_nan() {
    let curve = CurvePath::from_positions(&[Vec3::ONE, Vec3::ONE], false);
    let p = curve.value_at(0.5);
    assert!(p.is_finite());
    assert_eq!(p, Vec3::ONE);
    assert_eq!(curve.delta_of(1), 0.0);
}

// ── delta_of / point_at_delta ──

#[test]
fn test_delta_is_monotonic_and_ends_at_one() {
    let curve = s_curve();
    let n = curve.point_count();
    for i in 0..n {
        assert!(curve.delta_of(i + 1) - curve.delta_of(i) >= 0.0);
    }
    assert_eq!(curve.delta_of(0), 0.0);
    assert_eq!(curve.delta_of(n - 1), 1.0);
    assert_eq!(curve.delta_of(n + 4), 1.0);
}

#[test]
fn test_delta_closed_wraps_to_one() {
    let curve = square(true);
    assert_relative_eq!(curve.delta_of(1), 0.25, epsilon = 1e-4);
    assert_relative_eq!(curve.delta_of(3), 0.75, epsilon = 1e-4);
    assert_eq!(curve.delta_of(4), 1.0);
}

#[test]
fn test_value_at_delta_of_anchor_hits_anchor() {
    let curve = square(false);
    for i in 0..curve.point_count() {
        let p = curve.value_at(curve.delta_of(i));
        let expected = curve.point(i).expect("Punkt").position();
        assert!((p - expected).length() < 1e-3, "Anker {}: {:?}", i, p);
    }
}

#[test]
fn test_point_at_delta_picks_closer_anchor() {
    let curve = square(false);
    // Anker-Deltas: 0, 1/3, 2/3, 1
    assert_eq!(curve.point_at_delta(0.0), Some(0));
    assert_eq!(curve.point_at_delta(0.1), Some(0));
    assert_eq!(curve.point_at_delta(0.2), Some(1));
    assert_eq!(curve.point_at_delta(0.6), Some(2));
    assert_eq!(curve.point_at_delta(0.9), Some(3));
    assert_eq!(curve.point_at_delta(1.0), Some(3));
}

#[test]
fn test_point_at_delta_closed_checks_wrap_segment() {
    let curve = square(true);
    // Anker-Deltas: 0, .25, .5, .75 und der Schluss bei 1
    assert_eq!(curve.point_at_delta(0.8), Some(3));
    assert_eq!(curve.point_at_delta(0.95), Some(0));
    assert_eq!(curve.point_at_delta(1.0), Some(0));
}

// ── Punkt-Verwaltung ──

#[test]
fn test_add_point_sets_owner_and_index() {
    let mut curve = straight_line();
    let idx = curve.add_point(ControlPoint::new(Vec3::new(5.0, 5.0, 0.0)), Some(1));
    assert_eq!(idx, 1);
    assert_eq!(curve.point(1).and_then(|p| p.owner()), Some(curve.id()));
    let idx = curve.add_point(ControlPoint::new(Vec3::ONE), Some(99));
    assert_eq!(idx, 3);
}

#[test]
fn test_add_point_world_converts_to_local() {
    let mut curve = CurvePath::new();
    curve.set_transform(Affine3A::from_translation(Vec3::new(100.0, 0.0, 0.0)));
    let idx = curve.add_point_world(Vec3::new(101.0, 2.0, 0.0), None);
    let p = curve.point(idx).expect("Punkt");
    assert!((p.position() - Vec3::new(1.0, 2.0, 0.0)).length() < 1e-4);
}

#[test]
fn test_remove_point_marks_dirty() {
    // Festgeschrieben: Entfernen setzt die Kurve dirty
    let mut curve = square(false);
    let _ = curve.length();
    let removed = curve.remove_point(Some(3)).expect("Punkt erwartet");
    assert_eq!(removed.owner(), None);
    assert!(curve.is_dirty());
    assert_relative_eq!(curve.length(), 20.0, epsilon = 1e-3);
}

#[test]
fn test_remove_point_invalid_index_removes_last() {
    let mut curve = square(false);
    let removed = curve.remove_point(Some(42)).expect("Punkt erwartet");
    assert_eq!(removed.position(), Vec3::new(0.0, 10.0, 0.0));
    assert_eq!(curve.point_count(), 3);
    let mut empty = CurvePath::new();
    assert!(empty.remove_point(None).is_none());
}

#[test]
fn test_transfer_point_moves_membership() {
    let mut a = square(false);
    let mut b = straight_line();
    let _ = a.length();
    let _ = b.length();

    assert!(a.transfer_point(0, &mut b, None));
    assert_eq!(a.point_count(), 3);
    assert_eq!(b.point_count(), 3);
    assert_eq!(b.point(2).and_then(|p| p.owner()), Some(b.id()));
    assert!(a.is_dirty());
    assert!(b.is_dirty());

    assert!(!a.transfer_point(10, &mut b, None));
}

#[test]
fn test_clear_detaches_points() {
    let mut curve = square(false);
    curve.clear();
    assert_eq!(curve.point_count(), 0);
    assert_eq!(curve.length(), 0.0);
}

// ── Auto-Smooth ──

#[test]
fn test_auto_smooth_open_curve() {
    let mut curve = square(false);
    curve.auto_smooth(0.5);

    let first = curve.point(0).expect("Punkt");
    assert_eq!(first.handle_style(), HandleStyle::Independent);
    assert_eq!(first.handle1(), Vec3::new(5.0, 0.0, 0.0));
    assert_eq!(first.handle2(), Vec3::ZERO);

    let last = curve.point(3).expect("Punkt");
    assert_eq!(last.handle_style(), HandleStyle::Independent);
    // -factor * (p1 - p0) mit p0 = (10,10), p1 = (0,10)
    assert_eq!(last.handle1(), Vec3::new(5.0, 0.0, 0.0));
    assert_eq!(last.handle2(), Vec3::ZERO);

    let middle = curve.point(1).expect("Punkt");
    assert_eq!(middle.handle_style(), HandleStyle::Mirrored);
    assert_eq!(middle.handle2(), -middle.handle1());
    // Tangente entlang (p2 - p0) = (10,10), Länge = factor * |p1 - p0| = 5
    assert_relative_eq!(middle.handle1().length(), 5.0, epsilon = 1e-4);
    assert!(middle.handle1().x < 0.0 && middle.handle1().y < 0.0);
}

#[test]
fn test_auto_smooth_closed_curve_mirrors_every_point() {
    let mut curve = square(true);
    curve.auto_smooth(0.33);
    for p in curve.points() {
        assert_eq!(p.handle_style(), HandleStyle::Mirrored);
        assert_eq!(p.handle2(), -p.handle1());
    }
}

#[test]
fn test_auto_smooth_bypasses_lock_and_restores_it() {
    let mut curve = square(false);
    curve.set_point_locked(1, true);
    curve.auto_smooth(0.33);
    let p = curve.point(1).expect("Punkt");
    assert!(p.locked());
    assert_ne!(p.handle1(), Vec3::ZERO);
}

#[test]
fn test_update_applies_auto_smooth_only_when_dirty() {
    let mut curve = square(false);
    assert!(curve.update());
    assert!(!curve.is_dirty());
    assert_eq!(curve.point(1).expect("Punkt").handle_style(), HandleStyle::Mirrored);
    assert!(!curve.update());

    let mut plain = square(false);
    plain.set_auto_smooth(false);
    plain.update();
    assert_eq!(plain.point(1).expect("Punkt").handle_style(), HandleStyle::None);
}

// ── Nearest-Point ──

#[test]
fn test_closest_point_to_ray_on_straight_curve() {
    let curve = straight_line();
    let ray = Ray::new(Vec3::new(5.0, 8.0, 0.0), Vec3::new(0.0, -1.0, 0.0));
    let steps = 40;
    let hit = curve.closest_point_to_ray(&ray, steps);
    assert!((hit.t - 0.5).abs() <= 1.0 / steps as f32);
    assert!((hit.position - Vec3::new(5.0, 0.0, 0.0)).length() < 0.5);
}

#[test]
fn test_closest_point_to_point_on_square() {
    let curve = square(false);
    let hit = curve.closest_point_to_point(Vec3::new(12.0, 5.0, 0.0), 300);
    assert!((hit.position - Vec3::new(10.0, 5.0, 0.0)).length() < 0.2);
}

// ── Serialisierung ──

#[test]
fn test_serde_roundtrip_relinks_owner() {
    let mut curve = s_curve();
    curve.set_closed(true);
    let json = serde_json::to_string(&curve).expect("Serialisierung");
    let back: CurvePath = serde_json::from_str(&json).expect("Deserialisierung");

    assert_ne!(back.id(), curve.id());
    assert!(back.closed());
    assert_eq!(back.point_count(), 3);
    for p in back.points() {
        assert_eq!(p.owner(), Some(back.id()));
    }
    assert_relative_eq!(back.length(), curve.length(), epsilon = 1e-4);
}

#[test]
fn test_loaded_curve_has_consistent_handles() {
    let json = r#"{
        "points": [
            {"position": [0, 0, 0], "handle2": [0, 5, 0], "handle_style": "None", "locked": true},
            {"position": [10, 0, 0], "handle1": [1, 0, 0], "handle2": [1, 0, 0], "handle_style": "Mirrored"}
        ]
    }"#;
    let curve: CurvePath = serde_json::from_str(json).expect("Deserialisierung");

    let first = curve.point(0).expect("Punkt 0");
    assert_eq!(first.handle2(), Vec3::ZERO);
    assert!(first.locked());
    let second = curve.point(1).expect("Punkt 1");
    assert_eq!(second.handle2(), -second.handle1());
    assert_eq!(second.owner(), Some(curve.id()));
}

#[test]
fn test_clone_is_independent_curve() {
    let curve = s_curve();
    let length = curve.length();
    let copy = curve.clone();

    assert_ne!(copy.id(), curve.id());
    for p in copy.points() {
        assert_eq!(p.owner(), Some(copy.id()));
    }
    for p in curve.points() {
        assert_eq!(p.owner(), Some(curve.id()));
    }
    assert_relative_eq!(copy.length(), length, epsilon = 1e-5);
}

#[test]
fn test_serialize_leaves_curve_untouched() {
    let curve = s_curve();
    let id = curve.id();
    let json = serde_json::to_string(&curve).expect("Serialisierung");

    assert!(json.contains("\"points\""));
    assert!(!json.contains("\"id\""));
    assert_eq!(curve.id(), id);
    for p in curve.points() {
        assert_eq!(p.owner(), Some(id));
    }
}

#[test]
fn test_empty_options_object_uses_default_resolution() {
    let json = r#"{"points": [{"position": [0, 0, 0]}], "options": {}}"#;
    let curve: CurvePath = serde_json::from_str(json).expect("Deserialisierung");
    assert_eq!(curve.options().resolution, 30);
    assert_eq!(*curve.options(), CurveOptions::default());
}
