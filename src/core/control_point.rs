//! Kontrollpunkt einer Bézier-Kurve: Anker plus zwei Tangenten-Handles.

use glam::{Affine3A, Vec3};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Prozessweit eindeutige Kennung einer `CurvePath`.
///
/// Ersetzt die Rück-Referenz Punkt → Kurve. Wird nicht serialisiert,
/// sondern nach dem Laden per `CurvePath::relink()` neu gesetzt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CurveId(u64);

static NEXT_CURVE_ID: AtomicU64 = AtomicU64::new(1);

impl CurveId {
    /// Vergibt die nächste freie ID.
    pub fn next() -> Self {
        Self(NEXT_CURVE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Rohwert (nur für Logging).
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Kopplung der beiden Handles eines Kontrollpunkts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HandleStyle {
    /// handle2 == -handle1
    Mirrored,
    /// Beide Handles frei
    Independent,
    /// Keine Handles (beide Null)
    #[default]
    None,
}

/// Ein Anker mit zwei Handles relativ zur Position.
///
/// Die Position liegt im lokalen Koordinatensystem der besitzenden Kurve.
/// Alle Mutatoren geben `true` zurück, wenn die Änderung übernommen wurde;
/// bei `locked` sind sie wirkungslos.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ControlPointData")]
pub struct ControlPoint {
    position: Vec3,
    handle1: Vec3,
    handle2: Vec3,
    handle_style: HandleStyle,
    locked: bool,
    #[serde(skip)]
    owner: Option<CurveId>,
}

/// Gelesene Rohdaten; die Handle-Invariante wird erst in `From` hergestellt.
#[derive(Deserialize)]
struct ControlPointData {
    position: Vec3,
    #[serde(default)]
    handle1: Vec3,
    #[serde(default)]
    handle2: Vec3,
    #[serde(default)]
    handle_style: HandleStyle,
    #[serde(default)]
    locked: bool,
}

impl From<ControlPointData> for ControlPoint {
    fn from(data: ControlPointData) -> Self {
        let mut point = Self {
            position: data.position,
            handle1: data.handle1,
            handle2: data.handle2,
            handle_style: data.handle_style,
            locked: data.locked,
            owner: None,
        };
        // gilt auch für gesperrte Punkte
        point.apply_handle_style(data.handle_style);
        point
    }
}

impl ControlPoint {
    /// Erstellt einen losgelösten Punkt ohne Handles.
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            handle1: Vec3::ZERO,
            handle2: Vec3::ZERO,
            handle_style: HandleStyle::None,
            locked: false,
            owner: None,
        }
    }

    /// Erstellt einen Punkt mit zwei unabhängigen Handles.
    pub fn with_handles(position: Vec3, handle1: Vec3, handle2: Vec3) -> Self {
        let mut point = Self::new(position);
        point.set_handle_style(HandleStyle::Independent);
        point.set_handle1(handle1);
        point.set_handle2(handle2);
        point
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn handle1(&self) -> Vec3 {
        self.handle1
    }

    pub fn handle2(&self) -> Vec3 {
        self.handle2
    }

    pub fn handle_style(&self) -> HandleStyle {
        self.handle_style
    }

    pub fn locked(&self) -> bool {
        self.locked
    }

    /// Besitzende Kurve (falls zugeordnet).
    pub fn owner(&self) -> Option<CurveId> {
        self.owner
    }

    pub(crate) fn set_owner(&mut self, owner: Option<CurveId>) {
        self.owner = owner;
    }

    /// Weltposition des Ankers im Frame der Kurve.
    pub fn global_position(&self, frame: &Affine3A) -> Vec3 {
        frame.transform_point3(self.position)
    }

    /// Weltposition von Handle 1.
    pub fn global_handle1(&self, frame: &Affine3A) -> Vec3 {
        frame.transform_point3(self.position + self.handle1)
    }

    /// Weltposition von Handle 2.
    pub fn global_handle2(&self, frame: &Affine3A) -> Vec3 {
        frame.transform_point3(self.position + self.handle2)
    }

    /// Verschiebt den Anker; Handles bleiben relativ erhalten.
    pub fn set_position(&mut self, position: Vec3) -> bool {
        if self.locked {
            return false;
        }
        self.position = position;
        true
    }

    /// Setzt Handle 1. Bei `Mirrored` folgt Handle 2 gespiegelt,
    /// bei `None` wird auf `Independent` hochgestuft.
    pub fn set_handle1(&mut self, handle: Vec3) -> bool {
        if self.locked {
            return false;
        }
        if self.handle_style == HandleStyle::None {
            self.handle_style = HandleStyle::Independent;
        }
        self.handle1 = handle;
        if self.handle_style == HandleStyle::Mirrored {
            self.handle2 = -handle;
        }
        true
    }

    /// Setzt Handle 2 (symmetrisch zu `set_handle1`).
    pub fn set_handle2(&mut self, handle: Vec3) -> bool {
        if self.locked {
            return false;
        }
        if self.handle_style == HandleStyle::None {
            self.handle_style = HandleStyle::Independent;
        }
        self.handle2 = handle;
        if self.handle_style == HandleStyle::Mirrored {
            self.handle1 = -handle;
        }
        true
    }

    /// Ändert die Handle-Kopplung und stellt deren Invariante sofort her.
    pub fn set_handle_style(&mut self, style: HandleStyle) -> bool {
        if self.locked {
            return false;
        }
        self.apply_handle_style(style);
        true
    }

    fn apply_handle_style(&mut self, style: HandleStyle) {
        self.handle_style = style;
        match style {
            HandleStyle::None => {
                self.handle1 = Vec3::ZERO;
                self.handle2 = Vec3::ZERO;
            }
            HandleStyle::Mirrored => self.handle2 = -self.handle1,
            HandleStyle::Independent => {}
        }
    }

    /// Sperre setzen/aufheben. Wirkt immer.
    pub fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
    }
}
