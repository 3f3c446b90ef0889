//! Geteilte Bausteine ohne Abhängigkeit zu `core`.
//!
//! Enthält die reine Bézier-Geometrie und die serialisierbaren Laufzeit-Optionen.

pub mod bezier_geometry;
pub mod options;

pub use options::{CurveOptions, PathOptions, QueryOptions, SplineOptions};
