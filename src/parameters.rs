use crate::conductivity::{base_conductivity, effective_conductivity};
use crate::erodibility::soil_erodibility;
use crate::error::Result;
use crate::hydraulics::{Roughness, SlopeProfile, characteristic_length, roughness, site_slope_profile};
use crate::site::SiteAttributes;
use crate::soil_texture::{SoilTextureRow, SoilTextureTable};
use log::{debug, info};

// Fixed plane constants written to every deck
pub const CV: f64 = 1.00; // Coefficient of variation of Ke [-]
pub const SAT: f64 = 0.25; // Initial relative saturation [-]
pub const KOMEGA: f64 = 0.000007747; // Concentrated flow erodibility [s^2/m^2]
pub const KCM: f64 = 0.00029936430000; // Concentrated flow erodibility coefficient [s^2/m^2]
pub const ADF: f64 = 0.0; // Decay factor for detachment [-]
pub const ALF: f64 = 0.8; // Initial depth of water in micro-topography [-]
pub const BARE: f64 = 0.23; // Bare fraction of the surface [-]

// Deck spelling of the constants above whose shortest float form differs
pub const CV_TEXT: &str = "1.00";
pub const KOMEGA_TEXT: &str = "0.000007747";
pub const KCM_TEXT: &str = "0.00029936430000";

/// RHEM plane parameters, as written to the parameter deck.
///
/// Built either by [`Parameters::derive`] from site attributes or read back
/// from an existing deck. Once built it is not modified.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameters {
    pub len: f64,  // Plane length [m]
    pub clen: f64, // Characteristic length [m]
    pub chezy: f64,
    pub rchezy: f64,
    pub slope_profile: Option<SlopeProfile>, // Unset for unknown slope shapes
    pub cv: f64,
    pub sat: f64,
    pub kss: f64,
    pub komega: f64,
    pub kcm: f64,
    pub ke: f64, // Effective hydraulic conductivity [mm/h]
    pub adf: f64,
    pub alf: f64,
    pub bare: f64,
    pub g: f64,    // Mean matric potential [mm]
    pub dist: f64, // Pore size distribution index [-]
    pub por: f64,  // Mean porosity [-]
    pub diams: [f64; 5],
    pub density: [f64; 5],
    pub fract: [f64; 5],
}

// Plane length and characteristic length, in meters
#[derive(Debug, Clone, Copy)]
struct Geometry {
    len: f64,
    clen: f64,
}

// Infiltration and erodibility coefficients
#[derive(Debug, Clone, Copy)]
struct SoilResponse {
    ke: f64,
    kss: f64,
}

fn geometry(site: &SiteAttributes) -> Geometry {
    Geometry {
        len: site.slope_length,
        clen: characteristic_length(site.slope_length),
    }
}

fn soil_response(site: &SiteAttributes) -> SoilResponse {
    let keb = base_conductivity(site);
    SoilResponse {
        ke: effective_conductivity(site, keb),
        kss: soil_erodibility(site),
    }
}

impl Parameters {
    /// Derive all plane parameters for a site.
    ///
    /// Order: roughness, slope profile, lengths, texture row, KE, KSS.
    pub fn derive(site: &SiteAttributes, textures: &SoilTextureTable) -> Result<Self> {
        info!(
            "deriving parameters for scenario '{}' (AoA {})",
            site.scenario_name, site.aoa_id
        );
        let roughness = roughness(site);
        let profile = site_slope_profile(site);
        let geometry = geometry(site);
        let row = textures.lookup(&site.soil_texture)?;
        let response = soil_response(site);
        debug!(
            "chezy={} clen={} ke={} kss={}",
            roughness.chezy, geometry.clen, response.ke, response.kss
        );
        Ok(Self::assemble(geometry, roughness, profile, row, response))
    }

    fn assemble(
        geometry: Geometry,
        roughness: Roughness,
        slope_profile: Option<SlopeProfile>,
        row: &SoilTextureRow,
        response: SoilResponse,
    ) -> Self {
        Parameters {
            len: geometry.len,
            clen: geometry.clen,
            chezy: roughness.chezy,
            rchezy: roughness.rchezy,
            slope_profile,
            cv: CV,
            sat: SAT,
            kss: response.kss,
            komega: KOMEGA,
            kcm: KCM,
            ke: response.ke,
            adf: ADF,
            alf: ALF,
            bare: BARE,
            g: row.mean_matric_potential,
            dist: row.pore_size_distribution,
            por: row.mean_porosity,
            diams: row.diameters,
            density: row.specific_gravities,
            fract: row.fractions,
        }
    }
}
