use crate::error::{Result, RhemError};
use crate::site::SiteInput;
use crate::soil_texture::SoilTextureTable;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

fn default_workspace() -> PathBuf {
    PathBuf::from(".")
}

/// Locations of the executables, archives and working directory.
#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    #[serde(default = "default_workspace")]
    pub workspace: PathBuf,
    pub rhem_executable: PathBuf,
    pub risk_executable: PathBuf,
    pub cligen_dir: PathBuf,
    pub soil_texture_table: Option<PathBuf>,
}

impl RunConfig {
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self> {
        Self::from_toml_str(&read_toml(path)?)
    }

    /// Soil texture table named in the config, or the bundled one.
    pub fn soil_textures(&self) -> Result<SoilTextureTable> {
        match &self.soil_texture_table {
            Some(path) => SoilTextureTable::from_toml_file(path),
            None => SoilTextureTable::bundled(),
        }
    }
}

/// One scenario to run: the site description and the long-term
/// precipitation of its climate station.
#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioFile {
    pub avg_yearly_precip_mm: f64,
    pub site: SiteInput,
}

impl ScenarioFile {
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self> {
        Self::from_toml_str(&read_toml(path)?)
    }
}

fn read_toml(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .map_err(|e| RhemError::io(format!("Failed to read {}", path.display()), e))
}
