//! # fast-bsm: Black-Scholes-Merton Analytics for European Options
//!
//! Closed-form premia and Greeks for European vanilla options with a
//! continuous dividend yield, plus a safeguarded implied-volatility solver.
//!
//! ## Key Features
//!
//! - **Closed-form pricing**: Call and Put premia under Black-Scholes-Merton
//! - **Complete Greeks**: Delta, Gamma, Vega (per vol point), Theta (per day), Rho
//! - **Implied volatility**: Newton-Raphson on Vega with bisection fallback,
//!   bounded to `[0, 100]`
//! - **Batch evaluation**: Parallel valuation and inversion with Rayon
//! - **Validated inputs**: Non-positive spot, strike, expiry or volatility are
//!   rejected before any logarithm or square root is taken
//!
//! ## Quick Start
//!
//! ```rust
//! use fast_bsm::analytics::{premium, greeks, ContractType, MarketParameters};
//! use fast_bsm::solvers::implied_volatility;
//!
//! let params = MarketParameters::new(100.0, 100.0, 1.0, 0.2, 0.05, 0.0)
//!     .expect("Valid parameters");
//!
//! let price = premium(ContractType::Call, &params).expect("Valid parameters");
//! assert!((price - 10.4506).abs() < 1e-4);
//!
//! let g = greeks(ContractType::Call, &params).expect("Valid parameters");
//! println!("delta {:.4} gamma {:.4} vega {:.4}", g.delta, g.gamma, g.vega);
//!
//! let iv = implied_volatility(ContractType::Call, 100.0, 100.0, 1.0, 0.05, 0.0, price)
//!     .expect("Root in range");
//! assert!((iv - 0.2).abs() < 1e-3);
//! ```
//!
//! ## Mathematical Foundation
//!
//! With `d₁ = [ln(S/K) + (r - q + σ²/2)T] / (σ√T)` and `d₂ = d₁ - σ√T`,
//! every premium and Greek is a closed-form expression in Φ(d₁), Φ(d₂)
//! and φ(d₁). The premium is strictly increasing in σ, which makes the
//! implied volatility unique when it exists.

// Module declarations
pub mod analytics;
pub mod error;
pub mod math_utils;
pub mod rng;
pub mod solvers;

// Re-export commonly used types for convenience
pub use analytics::{ContractType, Greeks, MarketParameters};
pub use error::{BsmError, BsmResult};
