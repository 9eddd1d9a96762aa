// src/rng.rs
//! Seeded market scenarios for benchmarks and randomized tests
//!
//! # Reproducibility
//!
//! Same seed → same scenarios. `RngFactory` derives an independent
//! `StdRng` per scenario index, so a batch generated in parallel matches
//! one generated sequentially.
//!
//! # Scenario Shape
//!
//! Spot is drawn log-normally around the reference level, everything else
//! uniformly within `ScenarioRanges`:
//! ```text
//! S = S_ref * exp(N(0, spot_dispersion))
//! K = S * m,  m ~ U(moneyness)
//! ```

use crate::analytics::types::{ContractType, MarketParameters};
use crate::error::{BsmError, BsmResult};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, LogNormal, Uniform};
use std::ops::Range;

/// Sampling ranges for random market scenarios
#[derive(Clone, Debug, PartialEq)]
pub struct ScenarioRanges {
    pub reference_spot: f64,
    pub spot_dispersion: f64,
    pub moneyness: Range<f64>,
    pub time_to_expiry: Range<f64>,
    pub volatility: Range<f64>,
    pub risk_free_rate: Range<f64>,
    pub dividend_yield: Range<f64>,
}

impl Default for ScenarioRanges {
    fn default() -> Self {
        ScenarioRanges {
            reference_spot: 100.0,
            spot_dispersion: 0.25,
            moneyness: 0.7..1.3,
            time_to_expiry: 0.05..2.0,
            volatility: 0.05..1.0,
            risk_free_rate: 0.0..0.08,
            dividend_yield: 0.0..0.04,
        }
    }
}

/// Draws random `(ContractType, MarketParameters)` pairs
pub struct ScenarioSampler {
    spot: LogNormal<f64>,
    moneyness: Uniform<f64>,
    time_to_expiry: Uniform<f64>,
    volatility: Uniform<f64>,
    risk_free_rate: Uniform<f64>,
    dividend_yield: Uniform<f64>,
    reference_spot: f64,
}

impl ScenarioSampler {
    pub fn new(ranges: &ScenarioRanges) -> BsmResult<Self> {
        let spot = LogNormal::new(0.0, ranges.spot_dispersion).map_err(|e| {
            BsmError::InvalidConfiguration {
                field: "spot_dispersion".to_string(),
                reason: e.to_string(),
            }
        })?;
        Ok(ScenarioSampler {
            spot,
            moneyness: uniform("moneyness", &ranges.moneyness)?,
            time_to_expiry: uniform("time_to_expiry", &ranges.time_to_expiry)?,
            volatility: uniform("volatility", &ranges.volatility)?,
            risk_free_rate: uniform("risk_free_rate", &ranges.risk_free_rate)?,
            dividend_yield: uniform("dividend_yield", &ranges.dividend_yield)?,
            reference_spot: ranges.reference_spot,
        })
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> BsmResult<(ContractType, MarketParameters)> {
        let contract = if rng.gen_bool(0.5) {
            ContractType::Call
        } else {
            ContractType::Put
        };
        let s = self.reference_spot * self.spot.sample(rng);
        let params = MarketParameters::new(
            s,
            s * self.moneyness.sample(rng),
            self.time_to_expiry.sample(rng),
            self.volatility.sample(rng),
            self.risk_free_rate.sample(rng),
            self.dividend_yield.sample(rng),
        )?;
        Ok((contract, params))
    }
}

fn uniform(field: &str, range: &Range<f64>) -> BsmResult<Uniform<f64>> {
    if !(range.start < range.end) || !range.start.is_finite() || !range.end.is_finite() {
        return Err(BsmError::InvalidConfiguration {
            field: field.to_string(),
            reason: format!("empty or non-finite range {:?}", range),
        });
    }
    Ok(Uniform::new(range.start, range.end))
}

/// RNG factory for reproducible parallel scenario generation
pub struct RngFactory {
    base_seed: u64,
}

impl RngFactory {
    pub fn new(base_seed: u64) -> Self {
        Self { base_seed }
    }

    /// Create a standard RNG for a specific scenario index
    pub fn create_std_rng(&self, index: u64) -> StdRng {
        StdRng::seed_from_u64(self.base_seed.wrapping_add(index))
    }
}

pub fn seed_rng_from_u64(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}
