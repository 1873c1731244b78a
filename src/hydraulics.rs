use crate::site::{SiteAttributes, SlopeShape};
use log::warn;

// Gravity term of the Darcy-Weisbach to Chezy conversion, 8 * g
const EIGHT_G: f64 = 8.0 * 9.8;

// Slope value used for the flat ends of curved profiles [-]
const FLAT_SLOPE: f64 = 0.001;

// Characteristic length multiplier
const CLEN_FACTOR: f64 = 2.5;

/// Overland flow roughness. CHEZY and RCHEZY are always the same value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Roughness {
    pub chezy: f64,
    pub rchezy: f64,
}

/// Slope profile: normalized positions `sx` and the slope at each position `sl`.
#[derive(Debug, Clone, PartialEq)]
pub struct SlopeProfile {
    pub sl: Vec<f64>,
    pub sx: Vec<f64>,
}

/// Chezy coefficient from the Darcy-Weisbach friction factor regression
/// on ground cover and steepness.
pub fn roughness(site: &SiteAttributes) -> Roughness {
    let log_ft = -0.109
        + 1.425 * site.litter_cover
        + 0.442 * site.rock_cover
        + 1.764 * (site.basal_cover + site.cryptogams_cover)
        + 2.068 * site.slope_steepness;
    let ft = 10f64.powf(log_ft);
    let chezy = (EIGHT_G / ft).sqrt();
    Roughness {
        chezy,
        rchezy: chezy,
    }
}

pub fn slope_profile(shape: SlopeShape, steepness: f64) -> SlopeProfile {
    match shape {
        SlopeShape::Uniform => SlopeProfile {
            sl: vec![steepness, steepness],
            sx: vec![0.0, 1.0],
        },
        SlopeShape::Convex => SlopeProfile {
            sl: vec![FLAT_SLOPE, steepness * 2.0],
            sx: vec![0.0, 1.0],
        },
        SlopeShape::Concave => SlopeProfile {
            sl: vec![steepness * 2.0, FLAT_SLOPE],
            sx: vec![0.0, 1.0],
        },
        SlopeShape::SShaped => SlopeProfile {
            sl: vec![FLAT_SLOPE, steepness * 2.0, FLAT_SLOPE],
            sx: vec![0.0, 0.5, 1.0],
        },
    }
}

/// Profile for the site's slope shape label. An unrecognized label leaves
/// SL/SX unset.
pub fn site_slope_profile(site: &SiteAttributes) -> Option<SlopeProfile> {
    match site.slope_shape() {
        Some(shape) => Some(slope_profile(shape, site.slope_steepness)),
        None => {
            warn!(
                "slope shape '{}' is not one of Uniform, Convex, Concave, S-shaped; SL/SX left unset",
                site.slope_shape
            );
            None
        }
    }
}

pub fn characteristic_length(slope_length: f64) -> f64 {
    slope_length * CLEN_FACTOR
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::site::SiteAttributes;
    use crate::site::tests::sample_input;
    use approx::assert_relative_eq;

    #[test]
    fn chezy_equals_rchezy() {
        let site = SiteAttributes::new(sample_input()).unwrap();
        let r = roughness(&site);
        assert_eq!(r.chezy, r.rchezy);
    }

    #[test]
    fn chezy_on_bare_flat_ground() {
        let mut input = sample_input();
        input.slope_steepness = 0.0;
        input.litter_cover = 0.0;
        input.rock_cover = 0.0;
        input.basal_cover = 0.0;
        input.cryptogams_cover = 0.0;
        let site = SiteAttributes::new(input).unwrap();
        let expected = (78.4 / 10f64.powf(-0.109)).sqrt();
        assert_relative_eq!(roughness(&site).chezy, expected, max_relative = 1e-12);
    }

    #[test]
    fn more_cover_means_rougher_flow() {
        let site = SiteAttributes::new(sample_input()).unwrap();
        let mut input = sample_input();
        input.litter_cover = 60.0;
        let littered = SiteAttributes::new(input).unwrap();
        assert!(roughness(&littered).chezy < roughness(&site).chezy);
    }

    #[test]
    fn profiles_are_consistent() {
        for shape in SlopeShape::ALL {
            let p = slope_profile(shape, 0.12);
            assert_eq!(p.sl.len(), p.sx.len());
            assert!(p.sl.len() == 2 || p.sl.len() == 3);
            assert!(p.sx.windows(2).all(|w| w[0] <= w[1]));
            assert_eq!(*p.sx.last().unwrap(), 1.0);
        }
    }

    #[test]
    fn profile_values_per_shape() {
        assert_eq!(slope_profile(SlopeShape::Uniform, 0.1).sl, vec![0.1, 0.1]);
        assert_eq!(slope_profile(SlopeShape::Convex, 0.1).sl, vec![0.001, 0.2]);
        assert_eq!(slope_profile(SlopeShape::Concave, 0.1).sl, vec![0.2, 0.001]);
        let s = slope_profile(SlopeShape::SShaped, 0.1);
        assert_eq!(s.sl, vec![0.001, 0.2, 0.001]);
        assert_eq!(s.sx, vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn unknown_shape_leaves_profile_unset() {
        let mut input = sample_input();
        input.slope_shape = "Terraced".to_string();
        let site = SiteAttributes::new(input).unwrap();
        assert!(site_slope_profile(&site).is_none());
    }

    #[test]
    fn clen_is_two_and_a_half_lengths() {
        assert_relative_eq!(characteristic_length(50.0), 125.0);
    }
}
