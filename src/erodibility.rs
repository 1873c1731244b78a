/*!
Splash and sheet erodibility (KSS).

Each vegetation type has its own log-linear regression on steepness, total
ground cover and total canopy cover. The regression constants switch at
a ground cover of 0.475. Sparse canopy (below 0.02) ramps toward the
zero-canopy shrub value, and ground cover below 0.475 ramps toward the
shrub value.
*/
use crate::site::SiteAttributes;

// Ground cover where the regression switches branch
pub const GROUND_COVER_BREAK: f64 = 0.475;

// Canopy cover below which the zero-canopy shrub value is blended in
pub const SPARSE_CANOPY: f64 = 0.02;

const SLOPE_COEFF: f64 = 2.5535;
const CANOPY_COEFF: f64 = 0.7822;

// Final scaling applied to the blended value
const KSS_SCALE: f64 = 1.3;
const KSS_CALIBRATION: f64 = 2.0;

// Intercepts per vegetation type and the ground cover slope of one branch
struct Branch {
    bunch: f64,
    sod: f64,
    shrub: f64,
    forbs: f64,
    ground_coeff: f64,
}

const LOW_GROUND_COVER: Branch = Branch {
    bunch: 4.154,
    sod: 4.2169,
    shrub: 4.2587,
    forbs: 4.1106,
    ground_coeff: 2.547,
};

const HIGH_GROUND_COVER: Branch = Branch {
    bunch: 3.1726975,
    sod: 3.2355975,
    shrub: 3.2773975,
    forbs: 3.1292975,
    ground_coeff: 0.4811,
};

/// Per-vegetation KSS values of one site, before blending.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VegetationKss {
    pub bunch: f64,
    pub sod: f64,
    pub shrub: f64,
    pub forbs: f64,
    pub shrub_zero_canopy: f64,
}

impl VegetationKss {
    pub fn new(slope: f64, ground_cover: f64, canopy_cover: f64) -> Self {
        let branch = if ground_cover < GROUND_COVER_BREAK {
            &LOW_GROUND_COVER
        } else {
            &HIGH_GROUND_COVER
        };
        let bare = |a: f64| a + SLOPE_COEFF * slope - branch.ground_coeff * ground_cover;
        let with_canopy = |a: f64| 10f64.powf(bare(a) - CANOPY_COEFF * canopy_cover);

        VegetationKss {
            bunch: with_canopy(branch.bunch),
            sod: with_canopy(branch.sod),
            shrub: with_canopy(branch.shrub),
            forbs: with_canopy(branch.forbs),
            shrub_zero_canopy: 10f64.powf(bare(branch.shrub)),
        }
    }
}

// Canopy-weighted average; only called with a positive total canopy cover
fn canopy_weighted(site: &SiteAttributes, kss: &VegetationKss, canopy: f64) -> f64 {
    let weighted = (site.shrubs_canopy_cover / canopy) * kss.shrub
        + (site.sodgrass_canopy_cover / canopy) * kss.sod
        + (site.bunchgrass_canopy_cover / canopy) * kss.bunch
        + (site.forbs_canopy_cover / canopy) * kss.forbs;
    if canopy < SPARSE_CANOPY {
        canopy / SPARSE_CANOPY * weighted
            + (SPARSE_CANOPY - canopy) / SPARSE_CANOPY * kss.shrub_zero_canopy
    } else {
        weighted
    }
}

/// KSS for the parameter deck.
pub fn soil_erodibility(site: &SiteAttributes) -> f64 {
    let canopy = site.total_canopy_cover();
    let ground = site.total_ground_cover();
    let kss = VegetationKss::new(site.slope_steepness, ground, canopy);

    let blended = if canopy == 0.0 {
        kss.shrub_zero_canopy
    } else {
        let average = canopy_weighted(site, &kss, canopy);
        if ground < GROUND_COVER_BREAK {
            ground / GROUND_COVER_BREAK * average
                + (GROUND_COVER_BREAK - ground) / GROUND_COVER_BREAK * kss.shrub
        } else {
            average
        }
    };
    blended * KSS_SCALE * KSS_CALIBRATION
}
