//! Parser für JSON-Pfad-Dokumente.

use super::PathDocument;
use crate::core::{CurvePath, SplinePath};
use anyhow::{Context, Result};

/// Parsed eine Kurve; Rück-Referenzen der Punkte werden neu gesetzt.
pub fn parse_curve(json: &str) -> Result<CurvePath> {
    serde_json::from_str(json).context("Kurven-JSON konnte nicht gelesen werden")
}

/// Parsed einen Spline und prüft das Punkt-Layout (`3k + 1` Punkte, `k + 1` Modi).
pub fn parse_spline(json: &str) -> Result<SplinePath> {
    serde_json::from_str(json).context("Spline-JSON konnte nicht gelesen werden")
}

/// Parsed ein Dokument mit `kind`-Feld (`"curve"` oder `"spline"`).
pub fn parse_path_document(json: &str) -> Result<PathDocument> {
    serde_json::from_str(json).context("Pfad-Dokument konnte nicht gelesen werden")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_curve_without_optional_fields() {
        let json = r#"{"points":[
            {"position":[0,0,0],"handle1":[0,0,0],"handle2":[0,0,0],"handle_style":"None","locked":false},
            {"position":[4,0,0],"handle1":[0,0,0],"handle2":[0,0,0],"handle_style":"None","locked":false}
        ]}"#;
        let curve = parse_curve(json).expect("Kurve muss parsbar sein");
        assert_eq!(curve.point_count(), 2);
        assert!(!curve.closed());
        assert!((curve.length() - 4.0).abs() < 1e-4);
        for point in curve.points() {
            assert_eq!(point.owner(), Some(curve.id()));
        }
    }

    #[test]
    fn test_parse_spline_rejects_bad_layout() {
        let err = parse_spline(r#"{"points":[[0,0,0],[1,0,0]],"modes":["Free"]}"#)
            .expect_err("zwei Punkte sind kein Spline");
        assert!(format!("{:#}", err).contains("3k + 1"));
    }

    #[test]
    fn test_parse_document_dispatches_on_kind() {
        let json = r#"{"kind":"spline","points":[[0,0,0],[1,0,0],[2,0,0],[3,0,0]],"modes":["Free","Mirrored"]}"#;
        match parse_path_document(json).expect("Dokument") {
            PathDocument::Spline(spline) => assert_eq!(spline.curve_count(), 1),
            other => panic!("Spline erwartet, bekam {:?}", other),
        }
        assert!(parse_path_document(r#"{"kind":"circle"}"#).is_err());
    }
}
