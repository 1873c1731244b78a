pub mod conductivity;
pub mod config;
pub mod deck;
pub mod erodibility;
pub mod error;
pub mod hydraulics;
pub mod interpolate;
pub mod model;
pub mod parameters;
pub mod risk;
pub mod runner;
pub mod site;
pub mod soil_texture;
pub mod storm;
pub mod summary;

pub use config::{RunConfig, ScenarioFile};
pub use error::{Result, RhemError};
pub use model::{RhemModel, ScenarioFiles};
pub use parameters::Parameters;
pub use risk::RiskAssessment;
pub use runner::{Executable, ModelRunner};
pub use site::{SiteAttributes, SiteInput};
pub use soil_texture::SoilTextureTable;
