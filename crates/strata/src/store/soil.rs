//! USCS soil classification.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unified Soil Classification System group symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SoilClass {
    /// Well-graded gravel.
    Gw,
    /// Poorly graded gravel.
    Gp,
    /// Silty gravel.
    Gm,
    /// Clayey gravel.
    Gc,
    /// Well-graded sand.
    Sw,
    /// Poorly graded sand.
    Sp,
    /// Silty sand.
    Sm,
    /// Clayey sand.
    Sc,
    /// Inorganic silt.
    Ml,
    /// Inorganic clay.
    Cl,
    /// Organic silt/clay.
    Ol,
    /// Inorganic silt, high plasticity.
    Mh,
    /// Inorganic clay, high plasticity.
    Ch,
    /// Organic clay/silt, high plasticity.
    Oh,
    /// Peat.
    Pt,
}

impl SoilClass {
    /// USCS group symbol.
    pub fn symbol(&self) -> &'static str {
        match self {
            SoilClass::Gw => "GW",
            SoilClass::Gp => "GP",
            SoilClass::Gm => "GM",
            SoilClass::Gc => "GC",
            SoilClass::Sw => "SW",
            SoilClass::Sp => "SP",
            SoilClass::Sm => "SM",
            SoilClass::Sc => "SC",
            SoilClass::Ml => "ML",
            SoilClass::Cl => "CL",
            SoilClass::Ol => "OL",
            SoilClass::Mh => "MH",
            SoilClass::Ch => "CH",
            SoilClass::Oh => "OH",
            SoilClass::Pt => "PT",
        }
    }

    /// Coarse-grained (gravel/sand) groups. SPT strength correlations
    /// apply to these.
    pub fn is_granular(&self) -> bool {
        matches!(
            self,
            SoilClass::Gw
                | SoilClass::Gp
                | SoilClass::Gm
                | SoilClass::Gc
                | SoilClass::Sw
                | SoilClass::Sp
                | SoilClass::Sm
                | SoilClass::Sc
        )
    }

    /// Fine-grained (silt/clay) groups.
    pub fn is_fine_grained(&self) -> bool {
        matches!(
            self,
            SoilClass::Ml
                | SoilClass::Cl
                | SoilClass::Ol
                | SoilClass::Mh
                | SoilClass::Ch
                | SoilClass::Oh
        )
    }

    /// Typical porosity for the group, used when no measurement exists
    /// (Kozeny-Carman estimation).
    pub fn typical_porosity(&self) -> f64 {
        match self {
            SoilClass::Gw => 0.25,
            SoilClass::Gp => 0.30,
            SoilClass::Gm => 0.30,
            SoilClass::Gc => 0.25,
            SoilClass::Sw => 0.35,
            SoilClass::Sp => 0.40,
            SoilClass::Sm => 0.35,
            SoilClass::Sc => 0.30,
            SoilClass::Ml => 0.45,
            SoilClass::Cl => 0.40,
            SoilClass::Mh => 0.50,
            SoilClass::Ch => 0.45,
            SoilClass::Ol => 0.55,
            SoilClass::Oh => 0.60,
            SoilClass::Pt => 0.80,
        }
    }
}

impl fmt::Display for SoilClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
