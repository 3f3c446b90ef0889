//! JSON Import/Export für Kurven und Splines.
//!
//! `parser`/`writer` arbeiten auf Strings, die Datei-Funktionen hier
//! ergänzen nur Lesen/Schreiben mit Kontext für Fehlermeldungen.

pub mod parser;
pub mod writer;

pub use parser::{parse_curve, parse_path_document, parse_spline};
pub use writer::{write_curve, write_path_document, write_spline};

use crate::core::{CurvePath, SplinePath};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Ein Pfad-Dokument: Kurve oder Spline, unterschieden über das Feld `kind`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PathDocument {
    Curve(CurvePath),
    Spline(SplinePath),
}

impl PathDocument {
    /// Gesamtlänge des enthaltenen Pfads.
    pub fn length(&self) -> f32 {
        match self {
            Self::Curve(curve) => curve.length(),
            Self::Spline(spline) => spline.length(),
        }
    }

    /// Weltposition bei globalem `t` ∈ [0, 1].
    pub fn point_at(&self, t: f32) -> glam::Vec3 {
        match self {
            Self::Curve(curve) => curve.value_at(t),
            Self::Spline(spline) => spline.point_at(t),
        }
    }
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("Datei konnte nicht gelesen werden: {}", path.display()))
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content)
        .with_context(|| format!("Datei konnte nicht geschrieben werden: {}", path.display()))?;
    log::info!("Gespeichert nach: {}", path.display());
    Ok(())
}

/// Lädt eine Kurve aus einer JSON-Datei.
pub fn load_curve(path: &Path) -> Result<CurvePath> {
    let curve = parse_curve(&read_file(path)?)
        .with_context(|| format!("Ungültige Kurve in {}", path.display()))?;
    log::info!("Kurve geladen: {} Punkte aus {}", curve.point_count(), path.display());
    Ok(curve)
}

pub fn save_curve(path: &Path, curve: &CurvePath) -> Result<()> {
    write_file(path, &write_curve(curve)?)
}

/// Lädt einen Spline aus einer JSON-Datei (Distanz-Tabelle wird neu aufgebaut).
pub fn load_spline(path: &Path) -> Result<SplinePath> {
    let spline = parse_spline(&read_file(path)?)
        .with_context(|| format!("Ungültiger Spline in {}", path.display()))?;
    log::info!(
        "Spline geladen: {} Teilkurven aus {}",
        spline.curve_count(),
        path.display()
    );
    Ok(spline)
}

pub fn save_spline(path: &Path, spline: &SplinePath) -> Result<()> {
    write_file(path, &write_spline(spline)?)
}

/// Lädt ein getaggtes Pfad-Dokument (Kurve oder Spline).
pub fn load_path_document(path: &Path) -> Result<PathDocument> {
    let document = parse_path_document(&read_file(path)?)
        .with_context(|| format!("Ungültiges Pfad-Dokument in {}", path.display()))?;
    log::info!("Pfad-Dokument geladen aus: {}", path.display());
    Ok(document)
}

pub fn save_path_document(path: &Path, document: &PathDocument) -> Result<()> {
    write_file(path, &write_path_document(document)?)
}
