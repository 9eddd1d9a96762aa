pub mod batch;
pub mod bs_analytic;
pub mod expiry;
pub mod types;

pub use batch::{value, value_batch, OptionContract, Valuation};
pub use bs_analytic::{
    delta, gamma, greeks, greeks_with_convention, premium, rho, theta, theta_with_convention, vega,
};
pub use expiry::{time_to_expiry, time_to_expiry_from_dates, ExpiryClock};
pub use types::{ContractType, Greeks, MarketParameters, ThetaConvention, D1D2};
