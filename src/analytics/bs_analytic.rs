// src/analytics/bs_analytic.rs
//! Analytical Black-Scholes-Merton formulas for European options and Greeks
//!
//! # Mathematical Foundation
//!
//! Under the Black-Scholes-Merton model with continuous dividend yield q,
//! the underlying asset follows:
//! ```text
//! dS_t = (r - q) S_t dt + σ S_t dW_t
//! ```
//!
//! European premia have closed-form solutions involving the cumulative
//! normal distribution Φ(x) and density φ(x), through
//! ```text
//! d₁ = [ln(S/K) + (r - q + σ²/2)T] / (σ√T)
//! d₂ = d₁ - σ√T
//! ```
//!
//! Every public function validates its [`MarketParameters`] and computes
//! d₁/d₂ once before deriving the requested quantity.

use super::types::{ContractType, Greeks, MarketParameters, ThetaConvention, D1D2};
use crate::error::BsmResult;
use crate::math_utils::{norm_cdf, norm_pdf};
use tracing::debug;

/// Calendar days used to express theta per day
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Vega is quoted per 1 percentage point of volatility
pub const VEGA_SCALE: f64 = 100.0;

/// Raw d₁, no input checks
pub fn d1(s: f64, k: f64, t: f64, sigma: f64, r: f64, q: f64) -> f64 {
    ((s / k).ln() + (r - q + 0.5 * sigma * sigma) * t) / (sigma * t.sqrt())
}

/// Raw d₂ from d₁, no input checks
pub fn d2(t: f64, sigma: f64, d1: f64) -> f64 {
    d1 - sigma * t.sqrt()
}

/// Black-Scholes-Merton European option price
///
/// # Formula
/// ```text
/// C = S*e^(-qT)*Φ(d₁) - K*e^(-rT)*Φ(d₂)
/// P = K*e^(-rT)*Φ(-d₂) - S*e^(-qT)*Φ(-d₁)
/// ```
///
/// # Errors
/// `InvalidParameters` when S, K, T or sigma is not strictly positive.
pub fn premium(contract: ContractType, params: &MarketParameters) -> BsmResult<f64> {
    let d = D1D2::compute(params)?;
    Ok(premium_from(contract, params, &d))
}

/// Black-Scholes-Merton Delta (∂V/∂S)
///
/// # Formula
/// ```text
/// Δ_call = e^(-rT) * Φ(d₁)
/// Δ_put  = -e^(-rT) * Φ(-d₁)
/// ```
///
/// Both legs are discounted at the risk-free rate, so
/// `Δ_call - Δ_put = e^(-rT)` holds exactly.
pub fn delta(contract: ContractType, params: &MarketParameters) -> BsmResult<f64> {
    let d = D1D2::compute(params)?;
    Ok(delta_from(contract, params, &d))
}

/// Black-Scholes-Merton Gamma (∂²V/∂S²)
///
/// # Formula
/// ```text
/// Γ = e^(-qT) * φ(d₁) / (S * σ * √T)
/// ```
///
/// Same for calls and puts.
pub fn gamma(params: &MarketParameters) -> BsmResult<f64> {
    let d = D1D2::compute(params)?;
    Ok(gamma_from(params, &d))
}

/// Black-Scholes-Merton Vega per 1% volatility move
///
/// # Formula
/// ```text
/// ν = S * e^(-qT) * φ(d₁) * √T / 100
/// ```
///
/// # Interpretation
/// - Price change for a one percentage point move in volatility
/// - Always positive for T > 0, σ > 0
/// - Maximum near the forward
pub fn vega(params: &MarketParameters) -> BsmResult<f64> {
    let d = D1D2::compute(params)?;
    Ok(vega_per_unit_from(params, &d) / VEGA_SCALE)
}

/// Black-Scholes-Merton Theta per calendar day, textbook convention
///
/// # Formula
/// ```text
/// Θ_call = [-e^(-qT)*S*φ(d₁)*σ/(2√T) - r*K*e^(-rT)*Φ(d₂) + q*S*e^(-qT)*Φ(d₁)] / 365
/// Θ_put  = [-e^(-qT)*S*φ(d₁)*σ/(2√T) + r*K*e^(-rT)*Φ(-d₂) - q*S*e^(-qT)*Φ(-d₁)] / 365
/// ```
pub fn theta(contract: ContractType, params: &MarketParameters) -> BsmResult<f64> {
    theta_with_convention(contract, params, ThetaConvention::Textbook)
}

/// Theta per calendar day with an explicit put discount convention
///
/// Calls are unaffected by `convention`.
pub fn theta_with_convention(
    contract: ContractType,
    params: &MarketParameters,
    convention: ThetaConvention,
) -> BsmResult<f64> {
    let d = D1D2::compute(params)?;
    if convention != ThetaConvention::Textbook {
        debug!(?contract, ?convention, "theta with non-default convention");
    }
    Ok(theta_from(contract, params, &d, convention))
}

/// Black-Scholes-Merton Rho (∂V/∂r)
///
/// # Formula
/// ```text
/// ρ_call = K * T * e^(-rT) * Φ(d₂)
/// ρ_put  = -K * T * e^(-rT) * Φ(-d₂)
/// ```
///
/// Units: price change per unit (100%) change in the rate.
pub fn rho(contract: ContractType, params: &MarketParameters) -> BsmResult<f64> {
    let d = D1D2::compute(params)?;
    Ok(rho_from(contract, params, &d))
}

/// All five Greeks from a single d₁/d₂ evaluation
pub fn greeks(contract: ContractType, params: &MarketParameters) -> BsmResult<Greeks> {
    greeks_with_convention(contract, params, ThetaConvention::Textbook)
}

pub fn greeks_with_convention(
    contract: ContractType,
    params: &MarketParameters,
    convention: ThetaConvention,
) -> BsmResult<Greeks> {
    let d = D1D2::compute(params)?;
    Ok(greeks_from(contract, params, &d, convention))
}

pub(crate) fn greeks_from(
    contract: ContractType,
    params: &MarketParameters,
    d: &D1D2,
    convention: ThetaConvention,
) -> Greeks {
    Greeks {
        delta: delta_from(contract, params, d),
        gamma: gamma_from(params, d),
        vega: vega_per_unit_from(params, d) / VEGA_SCALE,
        theta: theta_from(contract, params, d, convention),
        rho: rho_from(contract, params, d),
    }
}

/// Premium and per-unit-sigma vega (not scaled by 100) in one pass
///
/// This is the derivative the implied volatility solver steps with.
pub(crate) fn premium_and_raw_vega(
    contract: ContractType,
    params: &MarketParameters,
) -> BsmResult<(f64, f64)> {
    let d = D1D2::compute(params)?;
    Ok((
        premium_from(contract, params, &d),
        vega_per_unit_from(params, &d),
    ))
}

pub(crate) fn premium_from(contract: ContractType, params: &MarketParameters, d: &D1D2) -> f64 {
    let s = params.underlying_price;
    let k = params.strike_price;
    let dq = params.dividend_discount();
    let dr = params.rate_discount();
    match contract {
        ContractType::Call => s * dq * norm_cdf(d.d1) - k * dr * norm_cdf(d.d2),
        ContractType::Put => k * dr * norm_cdf(-d.d2) - s * dq * norm_cdf(-d.d1),
    }
}

fn delta_from(contract: ContractType, params: &MarketParameters, d: &D1D2) -> f64 {
    let dr = params.rate_discount();
    match contract {
        ContractType::Call => dr * norm_cdf(d.d1),
        ContractType::Put => -dr * norm_cdf(-d.d1),
    }
}

fn gamma_from(params: &MarketParameters, d: &D1D2) -> f64 {
    params.dividend_discount() * norm_pdf(d.d1)
        / (params.underlying_price * params.volatility * params.time_to_expiry.sqrt())
}

fn vega_per_unit_from(params: &MarketParameters, d: &D1D2) -> f64 {
    params.underlying_price
        * params.dividend_discount()
        * norm_pdf(d.d1)
        * params.time_to_expiry.sqrt()
}

fn theta_from(
    contract: ContractType,
    params: &MarketParameters,
    d: &D1D2,
    convention: ThetaConvention,
) -> f64 {
    let s = params.underlying_price;
    let k = params.strike_price;
    let r = params.risk_free_rate;
    let q = params.dividend_yield;
    let sqrt_t = params.time_to_expiry.sqrt();
    let dq = params.dividend_discount();
    let dr = params.rate_discount();

    let decay = -dq * s * norm_pdf(d.d1) * params.volatility / (2.0 * sqrt_t);
    let annual = match contract {
        ContractType::Call => decay - r * k * dr * norm_cdf(d.d2) + q * s * dq * norm_cdf(d.d1),
        ContractType::Put => {
            let strike_weight = match convention {
                ThetaConvention::Textbook => norm_cdf(-d.d2),
                ThetaConvention::DensityDiscount => norm_pdf(-d.d2),
            };
            decay + r * k * dr * strike_weight - q * s * dq * norm_cdf(-d.d1)
        }
    };
    annual / DAYS_PER_YEAR
}

fn rho_from(contract: ContractType, params: &MarketParameters, d: &D1D2) -> f64 {
    let kt_dr = params.strike_price * params.time_to_expiry * params.rate_discount();
    match contract {
        ContractType::Call => kt_dr * norm_cdf(d.d2),
        ContractType::Put => -kt_dr * norm_cdf(-d.d2),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BsmError;

    fn atm() -> MarketParameters {
        MarketParameters::new(100.0, 100.0, 1.0, 0.2, 0.05, 0.0).unwrap()
    }

    #[test]
    fn test_textbook_call_premium() {
        let price = premium(ContractType::Call, &atm()).unwrap();
        assert!((price - 10.4506).abs() < 1e-4, "call premium {}", price);
    }

    #[test]
    fn test_put_premium() {
        let price = premium(ContractType::Put, &atm()).unwrap();
        assert!((price - 5.573526022256971).abs() < 1e-9, "put premium {}", price);
    }

    #[test]
    fn test_zero_expiry_is_rejected_not_nan() {
        let params = MarketParameters {
            time_to_expiry: 0.0,
            ..atm()
        };
        let result = premium(ContractType::Call, &params);
        assert!(matches!(result, Err(BsmError::InvalidParameters { .. })));
    }

    #[test]
    fn test_greeks_match_individual_functions() {
        let params = MarketParameters::new(110.0, 100.0, 0.5, 0.3, 0.03, 0.02).unwrap();
        for contract in [ContractType::Call, ContractType::Put] {
            let g = greeks(contract, &params).unwrap();
            assert_eq!(g.delta, delta(contract, &params).unwrap());
            assert_eq!(g.gamma, gamma(&params).unwrap());
            assert_eq!(g.vega, vega(&params).unwrap());
            assert_eq!(g.theta, theta(contract, &params).unwrap());
            assert_eq!(g.rho, rho(contract, &params).unwrap());
        }
    }

    #[test]
    fn test_raw_vega_is_unscaled() {
        let params = atm();
        let (price, raw_vega) = premium_and_raw_vega(ContractType::Call, &params).unwrap();
        assert_eq!(price, premium(ContractType::Call, &params).unwrap());
        assert!((raw_vega - VEGA_SCALE * vega(&params).unwrap()).abs() < 1e-12);
    }

    #[test]
    fn test_call_theta_ignores_convention() {
        let params = atm();
        let textbook = theta(ContractType::Call, &params).unwrap();
        let density =
            theta_with_convention(ContractType::Call, &params, ThetaConvention::DensityDiscount)
                .unwrap();
        assert_eq!(textbook, density);
    }
}
