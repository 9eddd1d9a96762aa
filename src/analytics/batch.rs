// src/analytics/batch.rs
//! Parallel valuation of independent contracts
//!
//! Every formula is referentially transparent, so a batch is a plain rayon
//! `par_iter` over the inputs. Results keep input order; a bad contract
//! yields an `Err` in its slot without affecting the others.

use super::bs_analytic::{greeks_from, premium_from};
use super::types::{ContractType, Greeks, MarketParameters, ThetaConvention, D1D2};
use crate::error::BsmResult;
use rayon::prelude::*;
use tracing::debug;

/// One contract to value
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OptionContract {
    pub contract_type: ContractType,
    pub params: MarketParameters,
}

impl OptionContract {
    pub fn new(contract_type: ContractType, params: MarketParameters) -> Self {
        OptionContract {
            contract_type,
            params,
        }
    }

    pub fn value(&self) -> BsmResult<Valuation> {
        value(self.contract_type, &self.params)
    }
}

/// Premium and Greeks for a single contract
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Valuation {
    pub premium: f64,
    pub greeks: Greeks,
}

/// Premium and all Greeks from one d₁/d₂ evaluation
pub fn value(contract: ContractType, params: &MarketParameters) -> BsmResult<Valuation> {
    value_with_convention(contract, params, ThetaConvention::Textbook)
}

pub fn value_with_convention(
    contract: ContractType,
    params: &MarketParameters,
    convention: ThetaConvention,
) -> BsmResult<Valuation> {
    let d = D1D2::compute(params)?;
    Ok(Valuation {
        premium: premium_from(contract, params, &d),
        greeks: greeks_from(contract, params, &d, convention),
    })
}

/// Value many contracts in parallel
pub fn value_batch(contracts: &[OptionContract]) -> Vec<BsmResult<Valuation>> {
    debug!(contracts = contracts.len(), "valuing batch");
    contracts.par_iter().map(OptionContract::value).collect()
}

/// Premia only, in parallel
pub fn premium_batch(contracts: &[OptionContract]) -> Vec<BsmResult<f64>> {
    contracts
        .par_iter()
        .map(|c| {
            let d = D1D2::compute(&c.params)?;
            Ok(premium_from(c.contract_type, &c.params, &d))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::bs_analytic;

    #[test]
    fn test_batch_matches_sequential() {
        let contracts: Vec<OptionContract> = (0..64)
            .map(|i| {
                let strike = 80.0 + i as f64;
                let contract_type = if i % 2 == 0 {
                    ContractType::Call
                } else {
                    ContractType::Put
                };
                let params = MarketParameters::new(100.0, strike, 0.75, 0.25, 0.04, 0.01).unwrap();
                OptionContract::new(contract_type, params)
            })
            .collect();

        let batch = value_batch(&contracts);
        let premia = premium_batch(&contracts);
        assert_eq!(batch.len(), contracts.len());

        for ((contract, valuation), price) in contracts.iter().zip(&batch).zip(&premia) {
            let valuation = valuation.as_ref().unwrap();
            let expected = bs_analytic::premium(contract.contract_type, &contract.params).unwrap();
            assert_eq!(valuation.premium, expected);
            assert_eq!(*price.as_ref().unwrap(), expected);
            assert_eq!(
                valuation.greeks,
                bs_analytic::greeks(contract.contract_type, &contract.params).unwrap()
            );
        }
    }

    #[test]
    fn test_bad_contract_does_not_poison_batch() {
        let good = MarketParameters::new(100.0, 100.0, 1.0, 0.2, 0.05, 0.0).unwrap();
        let bad = MarketParameters {
            volatility: 0.0,
            ..good
        };
        let results = value_batch(&[
            OptionContract::new(ContractType::Call, good),
            OptionContract::new(ContractType::Call, bad),
            OptionContract::new(ContractType::Put, good),
        ]);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
        assert!(results[2].is_ok());
    }
}
