use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Rock composition read from the cockpit scan panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RockComposition {
    pub category: RockCategory,
    pub mass: i64,
    pub resistance: i64,
    pub instability: f32,
}

impl RockComposition {
    pub fn new(category: RockCategory, mass: i64, resistance: i64, instability: f32) -> Self {
        Self {
            category,
            mass,
            resistance,
            instability,
        }
    }
}

impl fmt::Display for RockComposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} mass={} resistance={}% instability={}",
            self.category, self.mass, self.resistance, self.instability
        )
    }
}

/// Asteroid classes the scanner can report. The set is closed: anything the
/// HUD shows outside of it is treated as unreadable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RockCategory {
    #[serde(rename = "ASTEROID (C-TYPE)")]
    CType,
    #[serde(rename = "ASTEROID (E-TYPE)")]
    EType,
    #[serde(rename = "ASTEROID (Q-TYPE)")]
    QType,
    #[serde(rename = "ASTEROID (M-TYPE)")]
    MType,
    #[serde(rename = "ASTEROID (P-TYPE)")]
    PType,
    #[serde(rename = "ASTEROID (S-TYPE)")]
    SType,
}

impl RockCategory {
    pub const ALL: [RockCategory; 6] = [
        RockCategory::CType,
        RockCategory::EType,
        RockCategory::QType,
        RockCategory::MType,
        RockCategory::PType,
        RockCategory::SType,
    ];

    /// Label exactly as the HUD renders it
    pub fn label(self) -> &'static str {
        match self {
            RockCategory::CType => "ASTEROID (C-TYPE)",
            RockCategory::EType => "ASTEROID (E-TYPE)",
            RockCategory::QType => "ASTEROID (Q-TYPE)",
            RockCategory::MType => "ASTEROID (M-TYPE)",
            RockCategory::PType => "ASTEROID (P-TYPE)",
            RockCategory::SType => "ASTEROID (S-TYPE)",
        }
    }

    /// Exact, case-sensitive membership test against the known labels.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.label() == label)
    }
}

impl fmt::Display for RockCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown rock category: {0:?}")]
pub struct UnknownCategory(pub String);

impl FromStr for RockCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s).ok_or_else(|| UnknownCategory(s.to_string()))
    }
}
