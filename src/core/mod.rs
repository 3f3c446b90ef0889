//! Core-Domänentypen: Kontrollpunkte, Kurven, Splines, Nearest-Point-Suche, Follower.

pub mod control_point;
pub mod curve;
pub mod follower;
pub mod nearest;
pub mod segment;
/// Mehrteiliger kubischer Spline mit Distanz-Tabelle
pub mod spline;

pub use control_point::{ControlPoint, CurveId, HandleStyle};
pub use curve::{CurvePath, SampledSegment};
pub use follower::{LinkMode, PathFollower};
pub use nearest::{ClosestPoint, Ray};
pub use segment::SegmentShape;
pub use spline::lookup::DistanceEntry;
pub use spline::{ConstraintMode, RayHit, SplinePath};
