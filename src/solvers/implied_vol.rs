// src/solvers/implied_vol.rs
//! Implied volatility by safeguarded Newton-Raphson
//!
//! # Algorithm
//!
//! Solves `f(σ) = premium(σ) - observed = 0` on a bounded volatility domain
//! (default `[0, 100]`). The premium is strictly increasing in σ, so the
//! root is unique and every evaluation tightens a bracket `[lo, hi]`:
//! ```text
//! f(σ) > 0  =>  hi = σ
//! f(σ) < 0  =>  lo = σ
//! ```
//! The Newton step uses `f'(σ) = S e^(-qT) φ(d₁) √T`, i.e. the public vega
//! multiplied back by 100. A step that leaves the open bracket, or a
//! derivative that has collapsed (deep in/out of the money, short expiry),
//! is replaced by bisection of the bracket.
//!
//! # Termination
//!
//! - `ConvergenceCriteria::PRICE`: `|f(σ)| < tolerance`
//! - `ConvergenceCriteria::STEP`: `|σₙ₊₁ - σₙ| < tolerance`
//!
//! All selected criteria must hold. The default selects both. A price test
//! alone accepts any σ whose premium is within `tolerance` of the quote, and
//! for low-premium or deep in-the-money quotes that is a wide σ interval.
//! The step test pins σ itself.
//!
//! The iteration cap and the optional time budget bound the worst case;
//! exceeding either is `NoConvergence`.

use crate::analytics::bs_analytic::premium_and_raw_vega;
use crate::analytics::types::{ContractType, MarketParameters};
use crate::error::{validation::*, BsmError, BsmResult};
use crate::math_utils::Timer;
use bitflags::bitflags;
use rayon::prelude::*;
use std::f64::consts::PI;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Widest volatility domain the solver will search
pub const MAX_VOLATILITY: f64 = 100.0;

const MIN_DERIVATIVE: f64 = 1e-12;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ConvergenceCriteria: u32 {
        const PRICE = 1 << 0;
        const STEP  = 1 << 1;
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SolverConfig {
    pub tolerance: f64,
    pub max_iterations: usize,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub initial_guess: Option<f64>, // Seed volatility (default: moneyness-scaled guess)
    pub criteria: ConvergenceCriteria,
    pub time_budget: Option<Duration>,
}

impl SolverConfig {
    /// Validate the solver configuration
    pub fn validate(&self) -> BsmResult<()> {
        if !(self.tolerance > 0.0) || !self.tolerance.is_finite() {
            return Err(BsmError::InvalidConfiguration {
                field: "tolerance".to_string(),
                reason: format!("must be positive and finite, got {}", self.tolerance),
            });
        }
        if self.max_iterations == 0 || self.max_iterations > 10_000 {
            return Err(BsmError::InvalidConfiguration {
                field: "max_iterations".to_string(),
                reason: format!("must be in 1..=10000, got {}", self.max_iterations),
            });
        }
        let in_domain = |field: &str, value: f64| {
            validate_range(field, value, 0.0, MAX_VOLATILITY).map_err(|e| {
                BsmError::InvalidConfiguration {
                    field: field.to_string(),
                    reason: e.to_string(),
                }
            })
        };
        in_domain("lower_bound", self.lower_bound)?;
        in_domain("upper_bound", self.upper_bound)?;
        if self.lower_bound >= self.upper_bound {
            return Err(BsmError::InvalidConfiguration {
                field: "bounds".to_string(),
                reason: format!(
                    "need lower < upper, got [{}, {}]",
                    self.lower_bound, self.upper_bound
                ),
            });
        }
        if let Some(guess) = self.initial_guess {
            if !(guess > self.lower_bound && guess < self.upper_bound) {
                return Err(BsmError::InvalidConfiguration {
                    field: "initial_guess".to_string(),
                    reason: format!(
                        "{} lies outside ({}, {})",
                        guess, self.lower_bound, self.upper_bound
                    ),
                });
            }
        }
        if self.criteria.is_empty() {
            return Err(BsmError::InvalidConfiguration {
                field: "criteria".to_string(),
                reason: "at least one convergence criterion is required".to_string(),
            });
        }
        if self.time_budget == Some(Duration::ZERO) {
            return Err(BsmError::InvalidConfiguration {
                field: "time_budget".to_string(),
                reason: "must be non-zero when set".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            tolerance: 0.001,
            max_iterations: 100,
            lower_bound: 0.0,
            upper_bound: MAX_VOLATILITY,
            initial_guess: None,
            criteria: ConvergenceCriteria::PRICE | ConvergenceCriteria::STEP,
            time_budget: None,
        }
    }
}

/// A market-observed premium to invert
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ImpliedVolQuote {
    pub contract_type: ContractType,
    pub underlying_price: f64,
    pub strike_price: f64,
    pub time_to_expiry: f64,
    pub risk_free_rate: f64,
    pub dividend_yield: f64,
    pub observed_price: f64,
}

impl ImpliedVolQuote {
    pub fn solve(&self, config: &SolverConfig) -> BsmResult<f64> {
        solve(self, config)
    }

    fn validate(&self) -> BsmResult<()> {
        validate_positive("underlying_price", self.underlying_price)?;
        validate_positive("strike_price", self.strike_price)?;
        validate_positive("time_to_expiry", self.time_to_expiry)?;
        validate_finite("risk_free_rate", self.risk_free_rate)?;
        validate_finite("dividend_yield", self.dividend_yield)?;
        validate_non_negative("observed_price", self.observed_price)?;
        Ok(())
    }

    fn params_at(&self, volatility: f64) -> MarketParameters {
        MarketParameters {
            underlying_price: self.underlying_price,
            strike_price: self.strike_price,
            time_to_expiry: self.time_to_expiry,
            volatility,
            risk_free_rate: self.risk_free_rate,
            dividend_yield: self.dividend_yield,
        }
    }
}

/// Implied volatility with the default solver configuration
///
/// # Errors
/// - `InvalidParameters` for non-positive S, K, T or a negative price
/// - `OutOfDomain` when no volatility in `[0, 100]` reproduces the price
/// - `NoConvergence` after 100 iterations
pub fn implied_volatility(
    contract: ContractType,
    s: f64,
    k: f64,
    t: f64,
    r: f64,
    q: f64,
    observed_price: f64,
) -> BsmResult<f64> {
    implied_volatility_with_config(
        contract,
        s,
        k,
        t,
        r,
        q,
        observed_price,
        &SolverConfig::default(),
    )
}

#[allow(clippy::too_many_arguments)]
pub fn implied_volatility_with_config(
    contract: ContractType,
    s: f64,
    k: f64,
    t: f64,
    r: f64,
    q: f64,
    observed_price: f64,
    config: &SolverConfig,
) -> BsmResult<f64> {
    let quote = ImpliedVolQuote {
        contract_type: contract,
        underlying_price: s,
        strike_price: k,
        time_to_expiry: t,
        risk_free_rate: r,
        dividend_yield: q,
        observed_price,
    };
    solve(&quote, config)
}

/// Solve many quotes in parallel, results in input order
pub fn implied_volatility_batch(
    quotes: &[ImpliedVolQuote],
    config: &SolverConfig,
) -> Vec<BsmResult<f64>> {
    debug!(quotes = quotes.len(), "solving implied volatility batch");
    quotes.par_iter().map(|quote| quote.solve(config)).collect()
}

/// Model-free price window `(lower, upper)` for a European option
///
/// ```text
/// call: [max(S e^(-qT) - K e^(-rT), 0), S e^(-qT)]
/// put:  [max(K e^(-rT) - S e^(-qT), 0), K e^(-rT)]
/// ```
/// The lower end is the premium in the σ → 0 limit.
pub fn no_arbitrage_bounds(
    contract: ContractType,
    s: f64,
    k: f64,
    t: f64,
    r: f64,
    q: f64,
) -> (f64, f64) {
    let spot_pv = s * (-q * t).exp();
    let strike_pv = k * (-r * t).exp();
    match contract {
        ContractType::Call => ((spot_pv - strike_pv).max(0.0), spot_pv),
        ContractType::Put => ((strike_pv - spot_pv).max(0.0), strike_pv),
    }
}

/// Seed volatility from time value and moneyness
///
/// Brenner-Subrahmanyam at the money, widened with log-moneyness.
/// Clamped to `[1e-4, 5]`.
pub fn initial_guess(
    contract: ContractType,
    s: f64,
    k: f64,
    t: f64,
    r: f64,
    q: f64,
    observed_price: f64,
) -> f64 {
    let (intrinsic, _) = no_arbitrage_bounds(contract, s, k, t, r, q);
    let spot_pv = s * (-q * t).exp();
    let strike_pv = k * (-r * t).exp();

    let time_value = (observed_price - intrinsic).max(1e-10);
    let atm_guess = ((2.0 * PI) / t).sqrt() * (time_value / spot_pv.max(1e-10));
    let m = (spot_pv / strike_pv).ln().abs();

    (atm_guess * (1.0 + 0.5 * m + 0.125 * m * m)).clamp(1e-4, 5.0)
}

fn solve(quote: &ImpliedVolQuote, config: &SolverConfig) -> BsmResult<f64> {
    config.validate()?;
    quote.validate()?;

    let contract = quote.contract_type;
    let observed = quote.observed_price;
    let (s, k, t, r, q) = (
        quote.underlying_price,
        quote.strike_price,
        quote.time_to_expiry,
        quote.risk_free_rate,
        quote.dividend_yield,
    );

    let (intrinsic, ceiling) = no_arbitrage_bounds(contract, s, k, t, r, q);
    let slack = 32.0 * f64::EPSILON * (1.0 + ceiling);
    if observed < intrinsic - slack || observed > ceiling + slack {
        return Err(BsmError::OutOfDomain {
            observed_price: observed,
            lower: intrinsic,
            upper: ceiling,
        });
    }

    let mut lo = config.lower_bound;
    let mut hi = config.upper_bound;

    // Price at the lower end of the domain; σ = 0 is the intrinsic limit.
    let lower_price = if lo > 0.0 {
        premium_and_raw_vega(contract, &quote.params_at(lo))?.0
    } else {
        if observed <= intrinsic + slack {
            return Ok(0.0);
        }
        intrinsic
    };
    let upper_price = premium_and_raw_vega(contract, &quote.params_at(hi))?.0;

    if observed < lower_price || observed > upper_price {
        return Err(BsmError::OutOfDomain {
            observed_price: observed,
            lower: lower_price,
            upper: upper_price,
        });
    }
    if observed == lower_price {
        return Ok(lo);
    }
    if observed == upper_price {
        return Ok(hi);
    }

    let mut sigma = config
        .initial_guess
        .unwrap_or_else(|| initial_guess(contract, s, k, t, r, q, observed))
        .clamp(lo, hi);
    if sigma <= lo || sigma >= hi {
        sigma = 0.5 * (lo + hi);
    }

    let check_price = config.criteria.contains(ConvergenceCriteria::PRICE);
    let check_step = config.criteria.contains(ConvergenceCriteria::STEP);
    let timer = Timer::new();
    let mut residual = f64::NAN;

    for iteration in 1..=config.max_iterations {
        if let Some(budget) = config.time_budget {
            if timer.elapsed() >= budget {
                warn!(
                    iteration,
                    sigma,
                    budget_ms = budget.as_secs_f64() * 1000.0,
                    "implied volatility time budget exhausted"
                );
                return Err(BsmError::NoConvergence {
                    iterations: iteration - 1,
                    last_sigma: sigma,
                    residual,
                });
            }
        }

        let (price, derivative) = premium_and_raw_vega(contract, &quote.params_at(sigma))?;
        residual = price - observed;

        if residual == 0.0 {
            debug!(iteration, sigma, "implied volatility hit exact root");
            return Ok(sigma);
        }
        if residual > 0.0 {
            hi = sigma;
        } else {
            lo = sigma;
        }

        let price_converged = residual.abs() < config.tolerance;
        if price_converged && !check_step {
            debug!(iteration, sigma, residual, "implied volatility converged");
            return Ok(sigma);
        }

        let next = match (derivative > MIN_DERIVATIVE).then(|| sigma - residual / derivative) {
            Some(newton) if newton > lo && newton < hi => newton,
            _ => {
                debug!(iteration, sigma, derivative, lo, hi, "bisection fallback");
                0.5 * (lo + hi)
            }
        };
        trace!(iteration, sigma, residual, next, "implied volatility step");

        if check_step && (next - sigma).abs() < config.tolerance && (!check_price || price_converged)
        {
            let root = if check_price { sigma } else { next };
            debug!(iteration, sigma = root, residual, "implied volatility converged");
            return Ok(root);
        }
        sigma = next;
    }

    warn!(
        iterations = config.max_iterations,
        sigma,
        residual,
        "implied volatility did not converge"
    );
    Err(BsmError::NoConvergence {
        iterations: config.max_iterations,
        last_sigma: sigma,
        residual,
    })
}
