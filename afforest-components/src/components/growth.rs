//! Growth model
//!
//! Periodic annual increment (PAI) of stem volume as a function of stand age.
//! The curve rises as a power law to its peak at the age of peak mean annual
//! increment, then declines linearly towards a floor for the rest of the project.

use afforest_core::species::SpeciesGrowthParams;
use afforest_core::FloatValue;

/// Ratio of the peak periodic annual increment to the peak MAI.
const PEAK_PAI_FACTOR: FloatValue = 1.8;
/// Ratio of the floor of the declining phase to the peak MAI.
const END_PAI_FACTOR: FloatValue = 0.1;
/// Exponent of the rising phase. Values above 1 give an accelerating rise.
const RISE_EXPONENT: FloatValue = 1.5;

/// Annual volume increment for a stand of a given age.
pub trait GrowthCurve {
    /// unit: m^3 / ha / yr
    fn annual_increment(&self, age: FloatValue, total_duration: FloatValue) -> FloatValue;
}

/// Rise-to-peak then linear decline growth curve
///
/// With $P = 1.8 \cdot MAI_{peak}$ and $E = 0.1 \cdot MAI_{peak}$:
///
/// $$ PAI(a) = P \left(\frac{a}{a_{peak}}\right)^{1.5}, \quad a \le a_{peak} $$
/// $$ PAI(a) = \max\left(E, P - (P - E) \frac{a - a_{peak}}{\max(1, T - a_{peak})}\right), \quad a > a_{peak} $$
///
/// where $T$ is the project duration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiseDeclineCurve {
    parameters: SpeciesGrowthParams,
}

impl RiseDeclineCurve {
    pub fn from_parameters(parameters: SpeciesGrowthParams) -> Self {
        Self { parameters }
    }

    pub fn parameters(&self) -> &SpeciesGrowthParams {
        &self.parameters
    }

    /// unit: m^3 / ha / yr
    pub fn peak_pai(&self) -> FloatValue {
        PEAK_PAI_FACTOR * self.parameters.peak_mai
    }

    /// unit: m^3 / ha / yr
    pub fn end_pai(&self) -> FloatValue {
        END_PAI_FACTOR * self.parameters.peak_mai
    }
}

impl GrowthCurve for RiseDeclineCurve {
    fn annual_increment(&self, age: FloatValue, total_duration: FloatValue) -> FloatValue {
        if age <= 0.0 {
            return 0.0;
        }

        let age_at_peak = self.parameters.age_at_peak_mai;
        let peak_pai = self.peak_pai();
        let end_pai = self.end_pai();

        let pai = if age <= age_at_peak {
            peak_pai * (age / age_at_peak).powf(RISE_EXPONENT)
        } else {
            let decline_duration = (total_duration - age_at_peak).max(1.0);
            let age_past_peak = age - age_at_peak;
            (peak_pai - (peak_pai - end_pai) * age_past_peak / decline_duration).max(end_pai)
        };

        pai.max(0.0)
    }
}

/// Annual volume increment of the rise-decline curve for `params`.
pub fn annual_increment(
    params: &SpeciesGrowthParams,
    age: FloatValue,
    total_duration: FloatValue,
) -> FloatValue {
    RiseDeclineCurve::from_parameters(*params).annual_increment(age, total_duration)
}
