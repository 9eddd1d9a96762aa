pub mod implied_vol;

pub use implied_vol::{
    implied_volatility, implied_volatility_batch, implied_volatility_with_config,
    ConvergenceCriteria, ImpliedVolQuote, SolverConfig,
};
