//! Writer für JSON-Pfad-Dokumente (eingerückt, stabil diff-bar).

use super::PathDocument;
use crate::core::{CurvePath, SplinePath};
use anyhow::Result;

/// Schreibt eine Kurve ohne Cache und Rück-Referenzen.
pub fn write_curve(curve: &CurvePath) -> Result<String> {
    Ok(serde_json::to_string_pretty(curve)?)
}

/// Schreibt einen Spline; die Distanz-Tabelle wird nicht persistiert.
pub fn write_spline(spline: &SplinePath) -> Result<String> {
    Ok(serde_json::to_string_pretty(spline)?)
}

pub fn write_path_document(document: &PathDocument) -> Result<String> {
    Ok(serde_json::to_string_pretty(document)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_spline_output_has_no_distance_table() {
        let text = write_spline(&SplinePath::new()).expect("Serialisierung");
        assert!(text.contains("\"modes\""));
        assert!(!text.contains("lookup"));
        assert!(!text.contains("distance"));
    }

    #[test]
    fn test_curve_output_has_no_owner() {
        let curve = CurvePath::from_positions(&[Vec3::ZERO, Vec3::X], false);
        let text = write_curve(&curve).expect("Serialisierung");
        assert!(text.contains("\"points\""));
        assert!(!text.contains("owner"));
        assert!(!text.contains("cache"));
    }

    #[test]
    fn test_document_carries_kind_tag() {
        let text = write_path_document(&PathDocument::Curve(CurvePath::new())).expect("Serialisierung");
        assert!(text.contains("\"kind\": \"curve\""));
    }
}
