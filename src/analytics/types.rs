// src/analytics/types.rs
//! Value types shared by the analytic formulas and the implied-volatility solver.

use crate::analytics::expiry::ExpiryClock;
use crate::error::{validation::*, BsmError, BsmResult};
use std::fmt;
use std::str::FromStr;

/// European contract direction.
///
/// Exactly two variants: every formula matches on both, so a third kind of
/// contract cannot reach the pricing code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContractType {
    /// Right to buy the underlying at the strike
    Call,
    /// Right to sell the underlying at the strike
    Put,
}

impl fmt::Display for ContractType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContractType::Call => write!(f, "call"),
            ContractType::Put => write!(f, "put"),
        }
    }
}

impl FromStr for ContractType {
    type Err = BsmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "call" | "c" => Ok(ContractType::Call),
            "put" | "p" => Ok(ContractType::Put),
            _ => Err(BsmError::ParseContractType {
                value: s.to_string(),
            }),
        }
    }
}

/// Black-Scholes-Merton market state for a single contract
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MarketParameters {
    pub underlying_price: f64, // S
    pub strike_price: f64,     // K
    pub time_to_expiry: f64,   // T, in years
    pub volatility: f64,       // sigma, annualized
    pub risk_free_rate: f64,   // r, continuously compounded
    pub dividend_yield: f64,   // q, continuously compounded
}

impl MarketParameters {
    pub fn new(
        underlying_price: f64,
        strike_price: f64,
        time_to_expiry: f64,
        volatility: f64,
        risk_free_rate: f64,
        dividend_yield: f64,
    ) -> BsmResult<Self> {
        let params = MarketParameters {
            underlying_price,
            strike_price,
            time_to_expiry,
            volatility,
            risk_free_rate,
            dividend_yield,
        };
        params.validate()?;
        Ok(params)
    }

    /// Build parameters with `T` taken from an expiry clock
    pub fn from_clock(
        underlying_price: f64,
        strike_price: f64,
        clock: &ExpiryClock,
        volatility: f64,
        risk_free_rate: f64,
        dividend_yield: f64,
    ) -> BsmResult<Self> {
        let time_to_expiry = clock.time_to_expiry()?;
        Self::new(
            underlying_price,
            strike_price,
            time_to_expiry,
            volatility,
            risk_free_rate,
            dividend_yield,
        )
    }

    /// Validate the market parameters
    ///
    /// S, K, T and sigma feed a logarithm, a square root and a division, so
    /// they are rejected here rather than turning into NaN downstream.
    pub fn validate(&self) -> BsmResult<()> {
        validate_positive("underlying_price", self.underlying_price)?;
        validate_positive("strike_price", self.strike_price)?;
        validate_positive("time_to_expiry", self.time_to_expiry)?;
        validate_positive("volatility", self.volatility)?;
        validate_finite("risk_free_rate", self.risk_free_rate)?;
        validate_finite("dividend_yield", self.dividend_yield)?;
        Ok(())
    }

    /// Copy of these parameters with a different volatility
    pub fn with_volatility(&self, volatility: f64) -> Self {
        MarketParameters { volatility, ..*self }
    }

    /// `e^(-qT)`
    pub fn dividend_discount(&self) -> f64 {
        (-self.dividend_yield * self.time_to_expiry).exp()
    }

    /// `e^(-rT)`
    pub fn rate_discount(&self) -> f64 {
        (-self.risk_free_rate * self.time_to_expiry).exp()
    }
}

/// Standardized log-moneyness pair, computed once per request
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct D1D2 {
    pub d1: f64,
    pub d2: f64,
}

impl D1D2 {
    pub fn compute(params: &MarketParameters) -> BsmResult<Self> {
        params.validate()?;
        let d1 = super::bs_analytic::d1(
            params.underlying_price,
            params.strike_price,
            params.time_to_expiry,
            params.volatility,
            params.risk_free_rate,
            params.dividend_yield,
        );
        let d2 = super::bs_analytic::d2(params.time_to_expiry, params.volatility, d1);
        Ok(D1D2 { d1, d2 })
    }
}

/// Option sensitivities in market units
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Greeks {
    /// ∂V/∂S
    pub delta: f64,
    /// ∂²V/∂S²
    pub gamma: f64,
    /// ∂V/∂σ per 1 percentage point of volatility
    pub vega: f64,
    /// Time decay per calendar day
    pub theta: f64,
    /// ∂V/∂r per unit rate
    pub rho: f64,
}

/// Discount term used by the put theta
///
/// `Textbook` discounts the strike leg with Φ(-d₂). `DensityDiscount` uses
/// the density φ(-d₂) in that term instead, for reconciling against figures
/// produced with that formula.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ThetaConvention {
    #[default]
    Textbook,
    DensityDiscount,
}
