//! Zentrale Konfiguration für Kurven-, Spline- und Abfrage-Parameter.
//!
//! `PathOptions` enthält alle zur Laufzeit änderbaren Werte.
//! Die `const`-Werte bleiben als Fallback/Default erhalten.

use serde::{Deserialize, Serialize};

// ── Kurve ───────────────────────────────────────────────────────────

/// Zwischenpunkte pro Segment für Längenberechnung und Polyline-Sampling.
pub const CURVE_RESOLUTION: u32 = 30;
/// Auto-Smooth ist standardmäßig aktiv.
pub const CURVE_AUTO_SMOOTH: bool = true;
/// Auto-Smooth-Faktor; 0.33 liefert ausgewogene Tangenten.
pub const CURVE_AUTO_SMOOTH_FACTOR: f32 = 0.33;

// ── Spline ──────────────────────────────────────────────────────────

/// Abtastschritte pro kubischem Teilstück beim Aufbau der Distanz-Tabelle.
pub const SPLINE_STEPS_PER_CURVE: u32 = 500;
/// Distanz-Tabelle komprimieren (nur Richtungswechsel speichern).
pub const SPLINE_OPTIMIZE: bool = true;
/// Dot-Schwelle für Richtungswechsel bei komprimierter Distanz-Tabelle.
pub const SPLINE_OPTIMIZE_DOT_CHECK: f32 = 0.7;

// ── Abfragen ────────────────────────────────────────────────────────

/// Standard-Schrittzahl für Brute-Force-Nearest-Point-Suchen.
pub const CLOSEST_POINT_STEPS: u32 = 200;
/// Abstand der Tangenten-Punkte beim Einfügen eines Ankers per Strahl.
pub const RAY_INSERT_HANDLE_OFFSET: f32 = 2.0;

/// Konfiguration einer `CurvePath`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CurveOptions {
    /// Samples pro Segment (muss > 0 sein)
    #[serde(default = "default_resolution")]
    pub resolution: u32,
    /// Tangenten beim `update()` automatisch glätten
    #[serde(default = "default_auto_smooth")]
    pub auto_smooth: bool,
    /// Stärke der automatischen Glättung
    #[serde(default = "default_auto_smooth_factor")]
    pub auto_smooth_factor: f32,
}

impl Default for CurveOptions {
    fn default() -> Self {
        Self {
            resolution: CURVE_RESOLUTION,
            auto_smooth: CURVE_AUTO_SMOOTH,
            auto_smooth_factor: CURVE_AUTO_SMOOTH_FACTOR,
        }
    }
}

/// Konfiguration einer `SplinePath` und ihrer Distanz-Tabelle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SplineOptions {
    /// Abtastdichte pro kubischem Teilstück (muss > 0 sein)
    #[serde(default = "default_steps_per_curve")]
    pub steps_per_curve: u32,
    /// Gerade Abschnitte in der Distanz-Tabelle auf ihre Endpunkte reduzieren
    #[serde(default = "default_optimize")]
    pub optimize: bool,
    /// Schwelle ∈ [-1, 1]: unterhalb wird ein neuer Stützpunkt gesetzt
    #[serde(default = "default_optimize_dot_check")]
    pub optimize_dot_check: f32,
}

impl Default for SplineOptions {
    fn default() -> Self {
        Self {
            steps_per_curve: SPLINE_STEPS_PER_CURVE,
            optimize: SPLINE_OPTIMIZE,
            optimize_dot_check: SPLINE_OPTIMIZE_DOT_CHECK,
        }
    }
}

impl SplineOptions {
    /// Gibt eine Kopie mit gültigen Werten zurück (Schritte ≥ 1, Dot-Schwelle in [-1, 1]).
    pub fn sanitized(self) -> Self {
        Self {
            steps_per_curve: self.steps_per_curve.max(1),
            optimize: self.optimize,
            optimize_dot_check: self.optimize_dot_check.clamp(-1.0, 1.0),
        }
    }
}

/// Parameter für Nearest-Point-Abfragen und Strahl-Einfügen.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct QueryOptions {
    /// Schrittzahl der Brute-Force-Suche
    #[serde(default = "default_closest_point_steps")]
    pub closest_point_steps: u32,
    /// Abstand der neuen Tangenten-Punkte beim Einfügen per Strahl
    #[serde(default = "default_ray_insert_handle_offset")]
    pub ray_insert_handle_offset: f32,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            closest_point_steps: CLOSEST_POINT_STEPS,
            ray_insert_handle_offset: RAY_INSERT_HANDLE_OFFSET,
        }
    }
}

// ── Laufzeit-Optionen (serialisierbar) ─────────────────────────────

/// Alle zur Laufzeit änderbaren Pfad-Optionen.
/// Wird als `bezier_path_engine.toml` gespeichert.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PathOptions {
    #[serde(default)]
    pub curve: CurveOptions,
    #[serde(default)]
    pub spline: SplineOptions,
    #[serde(default)]
    pub query: QueryOptions,
}

/// Serde-Default für `resolution`.
fn default_resolution() -> u32 {
    CURVE_RESOLUTION
}

/// Serde-Default für `auto_smooth` (Abwärtskompatibilität bestehender TOML-Dateien).
fn default_auto_smooth() -> bool {
    CURVE_AUTO_SMOOTH
}

/// Serde-Default für `auto_smooth_factor`.
fn default_auto_smooth_factor() -> f32 {
    CURVE_AUTO_SMOOTH_FACTOR
}

fn default_steps_per_curve() -> u32 {
    SPLINE_STEPS_PER_CURVE
}

fn default_optimize() -> bool {
    SPLINE_OPTIMIZE
}

fn default_optimize_dot_check() -> f32 {
    SPLINE_OPTIMIZE_DOT_CHECK
}

fn default_closest_point_steps() -> u32 {
    CLOSEST_POINT_STEPS
}

/// Serde-Default für `ray_insert_handle_offset`.
fn default_ray_insert_handle_offset() -> f32 {
    RAY_INSERT_HANDLE_OFFSET
}

impl PathOptions {
    /// Lädt Optionen aus einer TOML-Datei. Bei Fehler: Standardwerte.
    pub fn load_from_file(path: &std::path::Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match Self::from_toml_str(&content) {
                Ok(opts) => {
                    log::info!("Optionen geladen aus: {}", path.display());
                    opts
                }
                Err(e) => {
                    log::warn!("Optionen-Datei fehlerhaft, verwende Standardwerte: {}", e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Keine Optionen-Datei gefunden, verwende Standardwerte");
                Self::default()
            }
        }
    }

    /// Parsed Optionen aus einem TOML-String.
    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let mut opts: Self = toml::from_str(content)?;
        opts.curve.resolution = opts.curve.resolution.max(1);
        opts.spline = opts.spline.sanitized();
        opts.query.closest_point_steps = opts.query.closest_point_steps.max(1);
        Ok(opts)
    }

    /// Speichert Optionen als TOML-Datei.
    pub fn save_to_file(&self, path: &std::path::Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        log::info!("Optionen gespeichert nach: {}", path.display());
        Ok(())
    }
}
