//! Project risk rate
//!
//! Fraction of sequestration withheld to cover loss events (fire, pests,
//! drought mortality). Starts from a base rate for the project type, adds site
//! and species adjustments, then clips to the accepted range.

use afforest_core::constants::RISK_RATE;
use afforest_core::inputs::{ProjectType, Rainfall, SiteConditions, SiteQuality, SoilType};
use afforest_core::species::SpeciesTraits;
use afforest_core::FloatValue;

const DIVERSITY_BONUS_PER_SPECIES: FloatValue = 0.01;
const MAX_DIVERSITY_BONUS: FloatValue = 0.05;

/// Everything the risk rate depends on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskContext {
    pub project_type: ProjectType,
    pub site: SiteConditions,
    pub species_count: usize,
    pub traits: SpeciesTraits,
}

fn base_rate(project_type: ProjectType) -> FloatValue {
    match project_type {
        ProjectType::Forest => 0.10,
        ProjectType::Water => 0.05,
        ProjectType::Other => 0.10,
    }
}

/// Clip a risk rate to the accepted range.
pub fn clamp_risk_rate(rate: FloatValue) -> FloatValue {
    if rate.is_nan() {
        return *RISK_RATE.start();
    }
    rate.clamp(*RISK_RATE.start(), *RISK_RATE.end())
}

/// Risk rate for a project.
pub fn calculate_risk_rate(context: &RiskContext) -> FloatValue {
    let mut rate = base_rate(context.project_type);

    if context.project_type == ProjectType::Forest {
        rate += match context.site.site_quality {
            SiteQuality::Poor => 0.05,
            SiteQuality::Good => -0.03,
            SiteQuality::Medium => 0.0,
        };
        if context.site.avg_rainfall == Rainfall::Low {
            rate += 0.03;
        }
        if context.site.soil_type == SoilType::Degraded {
            rate += 0.04;
        }
        rate -= (context.species_count as FloatValue * DIVERSITY_BONUS_PER_SPECIES)
            .min(MAX_DIVERSITY_BONUS);
        if context.traits.drought_tolerant {
            rate -= 0.02;
        }
    }

    clamp_risk_rate(rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use is_close::is_close;

    fn forest(site: SiteConditions, species_count: usize, traits: SpeciesTraits) -> RiskContext {
        RiskContext {
            project_type: ProjectType::Forest,
            site,
            species_count,
            traits,
        }
    }

    fn harsh_site() -> SiteConditions {
        SiteConditions {
            site_quality: SiteQuality::Poor,
            avg_rainfall: Rainfall::Low,
            soil_type: SoilType::Degraded,
        }
    }

    #[test]
    fn single_species_on_default_site() {
        let rate = calculate_risk_rate(&forest(
            SiteConditions::default(),
            1,
            SpeciesTraits::default(),
        ));
        assert!(is_close!(rate, 0.09));
    }

    #[test]
    fn harsh_site_adds_risk() {
        let rate = calculate_risk_rate(&forest(harsh_site(), 1, SpeciesTraits::default()));
        assert!(is_close!(rate, 0.10 + 0.05 + 0.03 + 0.04 - 0.01));
    }

    #[test]
    fn drought_tolerance_reduces_risk() {
        let traits = SpeciesTraits {
            drought_tolerant: true,
            ..SpeciesTraits::default()
        };
        let rate = calculate_risk_rate(&forest(harsh_site(), 1, traits));
        assert!(is_close!(rate, 0.19));
    }

    #[test]
    fn diversity_bonus_is_capped() {
        let five = calculate_risk_rate(&forest(
            SiteConditions::default(),
            5,
            SpeciesTraits::default(),
        ));
        let fifty = calculate_risk_rate(&forest(
            SiteConditions::default(),
            50,
            SpeciesTraits::default(),
        ));
        assert!(is_close!(five, 0.05));
        assert!(is_close!(five, fifty));
    }

    #[test]
    fn clipped_to_lower_bound() {
        let site = SiteConditions {
            site_quality: SiteQuality::Good,
            ..SiteConditions::default()
        };
        let traits = SpeciesTraits {
            drought_tolerant: true,
            ..SpeciesTraits::default()
        };
        assert_eq!(calculate_risk_rate(&forest(site, 10, traits)), 0.05);
    }

    #[test]
    fn water_projects_skip_forest_adjustments() {
        let context = RiskContext {
            project_type: ProjectType::Water,
            site: harsh_site(),
            species_count: 1,
            traits: SpeciesTraits::default(),
        };
        assert_eq!(calculate_risk_rate(&context), 0.05);
    }

    #[test]
    fn always_within_range() {
        for quality in [SiteQuality::Good, SiteQuality::Medium, SiteQuality::Poor] {
            for rainfall in [Rainfall::High, Rainfall::Medium, Rainfall::Low] {
                for soil in [
                    SoilType::Loam,
                    SoilType::Sandy,
                    SoilType::Clay,
                    SoilType::Degraded,
                ] {
                    for species_count in [0, 1, 3, 10] {
                        let site = SiteConditions {
                            site_quality: quality,
                            avg_rainfall: rainfall,
                            soil_type: soil,
                        };
                        let rate =
                            calculate_risk_rate(&forest(site, species_count, SpeciesTraits::default()));
                        assert!((0.05..=0.25).contains(&rate), "risk rate {rate} out of range");
                    }
                }
            }
        }
    }

    #[test]
    fn clamp_handles_nan() {
        assert_eq!(clamp_risk_rate(FloatValue::NAN), 0.05);
        assert_eq!(clamp_risk_rate(0.9), 0.25);
    }
}
