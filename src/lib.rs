//! Bézier Path Engine Library.
//!
//! Zwei Pfad-Modelle über `glam::Vec3`:
//! - `CurvePath`: Kette von Kontrollpunkten mit Handles, Grad pro Segment
//!   (linear/quadratisch/kubisch), Parameter proportional zur Bogenlänge.
//! - `SplinePath`: flaches Array kubischer Teilkurven mit Constraint-Modi
//!   und Distanz-Tabelle für Abfragen nach Bogenlänge.

pub mod core;
pub mod io;
pub mod shared;

pub use core::{
    ClosestPoint, ConstraintMode, ControlPoint, CurveId, CurvePath, DistanceEntry, HandleStyle,
    LinkMode, PathFollower, Ray, RayHit, SampledSegment, SegmentShape, SplinePath,
};
pub use io::{load_curve, load_path_document, load_spline, save_curve, save_spline, PathDocument};
pub use shared::{CurveOptions, PathOptions, QueryOptions, SplineOptions};
