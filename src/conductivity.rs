/*!
Effective saturated hydraulic conductivity (KE) for the parameter deck.

The base value depends on surface soil texture and on the basal + litter
cover fraction, `Keb = coeff * exp(exponent * (basal + litter))`. The base
value is then weighted by the foliar cover of each vegetation type.
*/
use crate::site::{SiteAttributes, SoilTextureClass};
use log::warn;

// Vegetation multipliers on Keb
const SHRUB_KE_FACTOR: f64 = 1.2;
const SOD_KE_FACTOR: f64 = 0.8;
const BUNCH_KE_FACTOR: f64 = 1.0;
const FORBS_KE_FACTOR: f64 = 1.0;

/**
Regression coefficients `(coeff, exponent)` of the base conductivity for a
texture class. Silt shares the Silt Loam regression.
*/
pub fn keb_coefficients(class: SoilTextureClass) -> (f64, f64) {
    match class {
        SoilTextureClass::Sand => (24.0, 0.3483),
        SoilTextureClass::LoamySand => (10.0, 0.8755),
        SoilTextureClass::SandyLoam => (5.0, 1.1632),
        SoilTextureClass::Loam => (2.5, 1.5686),
        SoilTextureClass::SiltLoam => (1.2, 2.0149),
        SoilTextureClass::Silt => (1.2, 2.0149),
        SoilTextureClass::SandyClayLoam => (0.80, 2.1691),
        SoilTextureClass::ClayLoam => (0.50, 2.3026),
        SoilTextureClass::SiltyClayLoam => (0.40, 2.1691),
        SoilTextureClass::SandyClay => (0.30, 2.1203),
        SoilTextureClass::SiltyClay => (0.25, 1.7918),
        SoilTextureClass::Clay => (0.2, 1.3218),
    }
}

/**
Base conductivity Keb [mm/h] for the site.

A texture label outside the twelve regression classes yields 0 and a
warning; the lookup table may still carry a row for it.
*/
pub fn base_conductivity(site: &SiteAttributes) -> f64 {
    match site.texture_class() {
        Some(class) => {
            let (coeff, exponent) = keb_coefficients(class);
            coeff * (exponent * (site.basal_cover + site.litter_cover)).exp()
        }
        None => {
            warn!(
                "soil texture '{}' has no conductivity regression; Keb set to 0",
                site.soil_texture
            );
            0.0
        }
    }
}

/// Canopy-weighted KE. With no canopy cover, KE is Keb unchanged.
pub fn effective_conductivity(site: &SiteAttributes, keb: f64) -> f64 {
    let total = site.total_canopy_cover();
    if total == 0.0 {
        return keb;
    }
    (site.shrubs_canopy_cover / total) * (keb * SHRUB_KE_FACTOR)
        + (site.sodgrass_canopy_cover / total) * (keb * SOD_KE_FACTOR)
        + (site.bunchgrass_canopy_cover / total) * (keb * BUNCH_KE_FACTOR)
        + (site.forbs_canopy_cover / total) * (keb * FORBS_KE_FACTOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::site::tests::sample_input;
    use approx::assert_relative_eq;

    fn site_with(f: impl FnOnce(&mut crate::site::SiteInput)) -> SiteAttributes {
        let mut input = sample_input();
        f(&mut input);
        SiteAttributes::new(input).unwrap()
    }

    #[test]
    fn keb_for_sandy_loam() {
        let site = site_with(|_| {});
        // basal 0.10 + litter 0.25
        assert_relative_eq!(
            base_conductivity(&site),
            5.0 * (1.1632f64 * 0.35).exp(),
            max_relative = 1e-12
        );
    }

    #[test]
    fn silt_uses_silt_loam_regression() {
        assert_eq!(
            keb_coefficients(SoilTextureClass::Silt),
            keb_coefficients(SoilTextureClass::SiltLoam)
        );
    }

    #[test]
    fn unmatched_texture_gives_zero() {
        let site = site_with(|i| i.soil_texture = "Gravelly Loam".to_string());
        assert_eq!(base_conductivity(&site), 0.0);
    }

    #[test]
    fn no_canopy_keeps_keb() {
        let site = site_with(|i| {
            i.bunchgrass_canopy_cover = 0.0;
            i.forbs_canopy_cover = 0.0;
            i.shrubs_canopy_cover = 0.0;
            i.sodgrass_canopy_cover = 0.0;
        });
        let keb = base_conductivity(&site);
        assert_eq!(effective_conductivity(&site, keb), keb);
    }

    #[test]
    fn pure_stands_scale_keb() {
        let shrub = site_with(|i| {
            i.bunchgrass_canopy_cover = 0.0;
            i.forbs_canopy_cover = 0.0;
            i.shrubs_canopy_cover = 30.0;
            i.sodgrass_canopy_cover = 0.0;
        });
        assert_relative_eq!(effective_conductivity(&shrub, 2.0), 2.4);

        let sod = site_with(|i| {
            i.bunchgrass_canopy_cover = 0.0;
            i.forbs_canopy_cover = 0.0;
            i.shrubs_canopy_cover = 0.0;
            i.sodgrass_canopy_cover = 30.0;
        });
        assert_relative_eq!(effective_conductivity(&sod, 2.0), 1.6);
    }

    #[test]
    fn mixed_canopy_is_weighted() {
        // shrub 0.20, sod 0.05, bunch 0.10, forbs 0.05 of total 0.40
        let site = site_with(|_| {});
        let expected = 0.5 * 1.2 + 0.125 * 0.8 + 0.25 + 0.125;
        assert_relative_eq!(effective_conductivity(&site, 1.0), expected, max_relative = 1e-12);
    }
}
