use crate::error::{Result, RhemError};
use serde::Deserialize;

// Feet to meters
const FT_TO_M: f64 = 0.3048;

// Default hillslope lengths used when the request carries none
const DEFAULT_SLOPE_LENGTH_M: f64 = 50.0;
const DEFAULT_SLOPE_LENGTH_FT: f64 = 164.04;

// Default soil moisture [%]
const DEFAULT_MOISTURE_PERCENT: f64 = 25.0;

/// Unit system of the incoming request. Decks are always written in metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitSystem {
    Metric = 1,
    English = 2,
}

impl TryFrom<i32> for UnitSystem {
    type Error = RhemError;

    fn try_from(value: i32) -> Result<Self> {
        match value {
            1 => Ok(UnitSystem::Metric),
            2 => Ok(UnitSystem::English),
            other => Err(RhemError::InvalidUnit(other)),
        }
    }
}

/// Hillslope profile shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlopeShape {
    Uniform,
    Convex,
    Concave,
    SShaped,
}

impl SlopeShape {
    pub const ALL: [SlopeShape; 4] = [
        SlopeShape::Uniform,
        SlopeShape::Convex,
        SlopeShape::Concave,
        SlopeShape::SShaped,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SlopeShape::Uniform => "Uniform",
            SlopeShape::Convex => "Convex",
            SlopeShape::Concave => "Concave",
            SlopeShape::SShaped => "S-shaped",
        }
    }

    /// Exact, case-sensitive match on the label.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|shape| shape.label() == label)
    }
}

/// Surface soil texture classes with an infiltration regression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoilTextureClass {
    Sand,
    LoamySand,
    SandyLoam,
    Loam,
    SiltLoam,
    Silt,
    SandyClayLoam,
    ClayLoam,
    SiltyClayLoam,
    SandyClay,
    SiltyClay,
    Clay,
}

impl SoilTextureClass {
    pub const ALL: [SoilTextureClass; 12] = [
        SoilTextureClass::Sand,
        SoilTextureClass::LoamySand,
        SoilTextureClass::SandyLoam,
        SoilTextureClass::Loam,
        SoilTextureClass::SiltLoam,
        SoilTextureClass::Silt,
        SoilTextureClass::SandyClayLoam,
        SoilTextureClass::ClayLoam,
        SoilTextureClass::SiltyClayLoam,
        SoilTextureClass::SandyClay,
        SoilTextureClass::SiltyClay,
        SoilTextureClass::Clay,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SoilTextureClass::Sand => "Sand",
            SoilTextureClass::LoamySand => "Loamy Sand",
            SoilTextureClass::SandyLoam => "Sandy Loam",
            SoilTextureClass::Loam => "Loam",
            SoilTextureClass::SiltLoam => "Silt Loam",
            SoilTextureClass::Silt => "Silt",
            SoilTextureClass::SandyClayLoam => "Sandy Clay Loam",
            SoilTextureClass::ClayLoam => "Clay Loam",
            SoilTextureClass::SiltyClayLoam => "Silty Clay Loam",
            SoilTextureClass::SandyClay => "Sandy Clay",
            SoilTextureClass::SiltyClay => "Silty Clay",
            SoilTextureClass::Clay => "Clay",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|class| class.label() == label)
    }
}

/// Site description as received from the service layer. Cover and
/// steepness values are percentages.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteInput {
    #[serde(default)]
    pub aoa_id: i32,
    #[serde(default)]
    pub rhem_site_id: i32,
    pub scenario_name: String,
    #[serde(default)]
    pub scenario_description: String,
    pub units: i32,
    pub state_id: String,
    pub climate_station_id: String,
    pub soil_texture: String,
    pub slope_length: Option<f64>,
    pub slope_shape: String,
    pub slope_steepness: f64,
    #[serde(default)]
    pub bunchgrass_canopy_cover: f64,
    #[serde(default)]
    pub forbs_canopy_cover: f64,
    #[serde(default)]
    pub shrubs_canopy_cover: f64,
    #[serde(default)]
    pub sodgrass_canopy_cover: f64,
    #[serde(default)]
    pub basal_cover: f64,
    #[serde(default)]
    pub rock_cover: f64,
    #[serde(default)]
    pub litter_cover: f64,
    #[serde(default)]
    pub cryptogams_cover: f64,
    pub moisture_content: Option<f64>,
}

/// Normalized attributes of one area of analysis.
///
/// Percentages are stored as fractions and the slope length in meters;
/// both conversions happen once, in [`SiteAttributes::new`].
#[derive(Debug, Clone)]
pub struct SiteAttributes {
    pub aoa_id: i32,
    pub rhem_site_id: i32,
    pub scenario_name: String,
    pub scenario_description: String,
    pub unit: UnitSystem,
    pub state_id: String,
    pub climate_station_id: String,
    pub soil_texture: String,
    pub slope_length: f64, // Slope length [m]
    pub slope_shape: String,
    pub slope_steepness: f64, // [-]
    pub bunchgrass_canopy_cover: f64,
    pub forbs_canopy_cover: f64,
    pub shrubs_canopy_cover: f64,
    pub sodgrass_canopy_cover: f64,
    pub basal_cover: f64,
    pub rock_cover: f64,
    pub litter_cover: f64,
    pub cryptogams_cover: f64,
    pub moisture_content: f64,
}

impl SiteAttributes {
    pub fn new(input: SiteInput) -> Result<Self> {
        let unit = UnitSystem::try_from(input.units)?;
        let slope_length = match unit {
            UnitSystem::Metric => input.slope_length.unwrap_or(DEFAULT_SLOPE_LENGTH_M),
            UnitSystem::English => {
                input.slope_length.unwrap_or(DEFAULT_SLOPE_LENGTH_FT) * FT_TO_M
            }
        };
        let pct = |v: f64| v / 100.0;

        Ok(SiteAttributes {
            aoa_id: input.aoa_id,
            rhem_site_id: input.rhem_site_id,
            scenario_name: input.scenario_name,
            scenario_description: input.scenario_description,
            unit,
            state_id: input.state_id,
            climate_station_id: input.climate_station_id,
            soil_texture: input.soil_texture,
            slope_length,
            slope_shape: input.slope_shape,
            slope_steepness: pct(input.slope_steepness),
            bunchgrass_canopy_cover: pct(input.bunchgrass_canopy_cover),
            forbs_canopy_cover: pct(input.forbs_canopy_cover),
            shrubs_canopy_cover: pct(input.shrubs_canopy_cover),
            sodgrass_canopy_cover: pct(input.sodgrass_canopy_cover),
            basal_cover: pct(input.basal_cover),
            rock_cover: pct(input.rock_cover),
            litter_cover: pct(input.litter_cover),
            cryptogams_cover: pct(input.cryptogams_cover),
            moisture_content: pct(input.moisture_content.unwrap_or(DEFAULT_MOISTURE_PERCENT)),
        })
    }

    // Total foliar cover of the four vegetation types [-]
    pub fn total_canopy_cover(&self) -> f64 {
        self.bunchgrass_canopy_cover
            + self.forbs_canopy_cover
            + self.shrubs_canopy_cover
            + self.sodgrass_canopy_cover
    }

    // Total ground cover: rock + basal + litter + cryptogams [-]
    pub fn total_ground_cover(&self) -> f64 {
        self.rock_cover + self.basal_cover + self.litter_cover + self.cryptogams_cover
    }

    pub fn slope_shape(&self) -> Option<SlopeShape> {
        SlopeShape::from_label(&self.slope_shape)
    }

    pub fn texture_class(&self) -> Option<SoilTextureClass> {
        SoilTextureClass::from_label(&self.soil_texture)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use approx::assert_relative_eq;

    pub(crate) fn sample_input() -> SiteInput {
        SiteInput {
            aoa_id: 1,
            rhem_site_id: 7,
            scenario_name: "Baseline".to_string(),
            scenario_description: "Grazed shrubland".to_string(),
            units: 1,
            state_id: "AZ".to_string(),
            climate_station_id: "026180".to_string(),
            soil_texture: "Sandy Loam".to_string(),
            slope_length: None,
            slope_shape: "Uniform".to_string(),
            slope_steepness: 10.0,
            bunchgrass_canopy_cover: 10.0,
            forbs_canopy_cover: 5.0,
            shrubs_canopy_cover: 20.0,
            sodgrass_canopy_cover: 5.0,
            basal_cover: 10.0,
            rock_cover: 5.0,
            litter_cover: 25.0,
            cryptogams_cover: 5.0,
            moisture_content: None,
        }
    }

    #[test]
    fn percentages_become_fractions() {
        let site = SiteAttributes::new(sample_input()).unwrap();
        assert_relative_eq!(site.slope_steepness, 0.10);
        assert_relative_eq!(site.shrubs_canopy_cover, 0.20);
        assert_relative_eq!(site.litter_cover, 0.25);
        assert_relative_eq!(site.moisture_content, 0.25);
        assert_relative_eq!(site.total_canopy_cover(), 0.40, max_relative = 1e-12);
        assert_relative_eq!(site.total_ground_cover(), 0.45, max_relative = 1e-12);
    }

    #[test]
    fn metric_default_slope_length() {
        let site = SiteAttributes::new(sample_input()).unwrap();
        assert_eq!(site.unit, UnitSystem::Metric);
        assert_relative_eq!(site.slope_length, 50.0);
    }

    #[test]
    fn english_length_converted_to_meters() {
        let mut input = sample_input();
        input.units = 2;
        let site = SiteAttributes::new(input.clone()).unwrap();
        assert_relative_eq!(site.slope_length, 164.04 * 0.3048);

        input.slope_length = Some(100.0);
        let site = SiteAttributes::new(input).unwrap();
        assert_relative_eq!(site.slope_length, 30.48, max_relative = 1e-12);
    }

    #[test]
    fn invalid_unit_rejected() {
        let mut input = sample_input();
        input.units = 3;
        assert!(matches!(
            SiteAttributes::new(input),
            Err(RhemError::InvalidUnit(3))
        ));
    }

    #[test]
    fn labels_round_trip() {
        for shape in SlopeShape::ALL {
            assert_eq!(SlopeShape::from_label(shape.label()), Some(shape));
        }
        for class in SoilTextureClass::ALL {
            assert_eq!(SoilTextureClass::from_label(class.label()), Some(class));
        }
        assert_eq!(SlopeShape::from_label("Terraced"), None);
        assert_eq!(SoilTextureClass::from_label("Loamy Fine Sand"), None);
    }
}
