//! Site growth modifiers
//!
//! Multiplicative adjustment of the growth curve for site quality, rainfall
//! and soil. Species traits can soften or sharpen the rainfall and soil
//! factors before the three are combined.

use afforest_core::constants::GROWTH_MODIFIER;
use afforest_core::inputs::{Rainfall, SiteConditions, SiteQuality, SoilType};
use afforest_core::species::SpeciesTraits;
use afforest_core::FloatValue;
use serde::{Deserialize, Serialize};

/// Per-axis growth modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SiteModifiers {
    pub site_quality: FloatValue,
    pub rainfall: FloatValue,
    pub soil: FloatValue,
}

impl SiteModifiers {
    /// Product of the three modifiers clipped to the growth modifier range.
    pub fn combined(&self) -> FloatValue {
        (self.site_quality * self.rainfall * self.soil)
            .clamp(*GROWTH_MODIFIER.start(), *GROWTH_MODIFIER.end())
    }
}

fn site_quality_modifier(quality: SiteQuality) -> FloatValue {
    match quality {
        SiteQuality::Good => 1.2,
        SiteQuality::Medium => 1.0,
        SiteQuality::Poor => 0.7,
    }
}

fn rainfall_modifier(rainfall: Rainfall, traits: &SpeciesTraits) -> FloatValue {
    match rainfall {
        Rainfall::High if traits.water_sensitive => 0.95,
        Rainfall::High => 1.05,
        Rainfall::Medium => 1.0,
        Rainfall::Low if traits.drought_tolerant => 0.9,
        Rainfall::Low => 0.8,
    }
}

fn soil_modifier(soil: SoilType, traits: &SpeciesTraits) -> FloatValue {
    match soil {
        SoilType::Loam => 1.0,
        SoilType::Sandy if traits.prefers_sandy => 1.0,
        SoilType::Sandy => 0.9,
        SoilType::Clay if traits.water_sensitive => 0.8,
        SoilType::Clay => 0.9,
        SoilType::Degraded => 0.65,
    }
}

/// Growth modifiers for a species planted on a site.
pub fn get_site_modifiers(site: &SiteConditions, traits: &SpeciesTraits) -> SiteModifiers {
    SiteModifiers {
        site_quality: site_quality_modifier(site.site_quality),
        rainfall: rainfall_modifier(site.avg_rainfall, traits),
        soil: soil_modifier(site.soil_type, traits),
    }
}
