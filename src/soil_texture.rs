use crate::error::{Result, RhemError};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

// Bundled lookup, used when the configuration names no table
const DEFAULT_TABLE: &str = include_str!("../soil_textures.toml");

// Soil texture row, particle classes ordered clay, silt, small aggregates,
// large aggregates, sand
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SoilTextureRow {
    pub diameters: [f64; 5],          // Particle diameters [mm]
    pub specific_gravities: [f64; 5], // Particle densities [g/cc]
    pub fractions: [f64; 5],          // Mass fractions [-], sum to 1 by convention
    pub mean_matric_potential: f64,   // G [mm]
    pub pore_size_distribution: f64,  // DIST [-]
    pub mean_porosity: f64,           // POR [-]
}

/// Soil texture rows keyed by texture class label.
#[derive(Debug, Clone)]
pub struct SoilTextureTable {
    rows: BTreeMap<String, SoilTextureRow>,
}

impl SoilTextureTable {
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let rows: BTreeMap<String, SoilTextureRow> = toml::from_str(toml_str)?;
        Ok(SoilTextureTable { rows })
    }

    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let toml_str = fs::read_to_string(path).map_err(|e| {
            RhemError::io(
                format!("Failed to read soil texture table {}", path.display()),
                e,
            )
        })?;
        Self::from_toml_str(&toml_str)
    }

    /// Table shipped with the crate.
    pub fn bundled() -> Result<Self> {
        Self::from_toml_str(DEFAULT_TABLE)
    }

    pub fn lookup(&self, texture: &str) -> Result<&SoilTextureRow> {
        self.rows
            .get(texture)
            .ok_or_else(|| RhemError::UnknownSoilTexture(texture.to_string()))
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.rows.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::site::SoilTextureClass;
    use approx::assert_abs_diff_eq;

    #[test]
    fn bundled_table_covers_every_class() {
        let table = SoilTextureTable::bundled().unwrap();
        for class in SoilTextureClass::ALL {
            let row = table.lookup(class.label()).unwrap();
            assert_abs_diff_eq!(row.fractions.iter().sum::<f64>(), 1.0, epsilon = 1e-9);
            assert!(row.mean_porosity > 0.0 && row.mean_porosity < 1.0);
        }
    }

    #[test]
    fn unknown_class_is_an_error() {
        let table = SoilTextureTable::bundled().unwrap();
        assert!(matches!(
            table.lookup("Peat"),
            Err(RhemError::UnknownSoilTexture(name)) if name == "Peat"
        ));
    }

    #[test]
    fn custom_table_parses() {
        let table = SoilTextureTable::from_toml_str(
            r#"
["Loamy Fine Sand"]
diameters = [0.002, 0.010, 0.030, 0.300, 0.150]
specific_gravities = [2.60, 2.65, 1.80, 1.60, 2.65]
fractions = [0.05, 0.15, 0.05, 0.05, 0.70]
mean_matric_potential = 70.0
pore_size_distribution = 0.5
mean_porosity = 0.44
"#,
        )
        .unwrap();
        assert_eq!(table.classes().collect::<Vec<_>>(), vec!["Loamy Fine Sand"]);
        assert_eq!(table.lookup("Loamy Fine Sand").unwrap().diameters[4], 0.150);
    }

    #[test]
    fn malformed_table_is_config_error() {
        let err = SoilTextureTable::from_toml_str("[Sand]\ndiameters = 3").unwrap_err();
        assert!(matches!(err, RhemError::Config(_)));
    }
}
