// demos/pricing_demo.rs
use chrono::{Duration, Utc};
use fast_bsm::analytics::batch::{value_batch, OptionContract};
use fast_bsm::analytics::bs_analytic;
use fast_bsm::analytics::expiry::ExpiryClock;
use fast_bsm::analytics::{ContractType, MarketParameters, ThetaConvention};
use fast_bsm::error::BsmError;
use fast_bsm::solvers::implied_vol::{implied_volatility, SolverConfig};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("fast-bsm Pricing Demo");
    println!("=====================\n");

    // 1. Textbook contract
    let params =
        MarketParameters::new(100.0, 100.0, 1.0, 0.2, 0.05, 0.0).expect("Valid parameters");
    println!("1. S=100 K=100 T=1 σ=20% r=5% q=0");
    for contract in [ContractType::Call, ContractType::Put] {
        let price = bs_analytic::premium(contract, &params).expect("Valid parameters");
        let g = bs_analytic::greeks(contract, &params).expect("Valid parameters");
        println!(
            "   {:<4} premium {:>8.4}  Δ {:>7.4}  Γ {:.5}  ν {:.4}  Θ/day {:>8.5}  ρ {:>8.4}",
            contract, price, g.delta, g.gamma, g.vega, g.theta, g.rho
        );
    }

    let density = bs_analytic::theta_with_convention(
        ContractType::Put,
        &params,
        ThetaConvention::DensityDiscount,
    )
    .expect("Valid parameters");
    println!("   put Θ/day with density discount term: {:.5}", density);

    // 2. Expiry from a clock
    println!("\n2. Contract expiring in 45 days...");
    let clock = ExpiryClock::from_now(Utc::now() + Duration::days(45));
    match MarketParameters::from_clock(100.0, 105.0, &clock, 0.3, 0.04, 0.01) {
        Ok(p) => println!(
            "   T = {:.4}y, call premium = {:.4}",
            p.time_to_expiry,
            bs_analytic::premium(ContractType::Call, &p).expect("Valid parameters")
        ),
        Err(e) => println!("   Error: {}", e),
    }

    // 3. Implied volatility
    println!("\n3. Implied volatility from market quotes...");
    for (contract, strike, observed) in [
        (ContractType::Call, 90.0, 16.70),
        (ContractType::Call, 100.0, 10.45),
        (ContractType::Put, 110.0, 10.20),
        (ContractType::Put, 100.0, 120.0),
    ] {
        match implied_volatility(contract, 100.0, strike, 1.0, 0.05, 0.0, observed) {
            Ok(iv) => println!("   {:<4} K={:<5} price {:>7.2} -> σ = {:.4}", contract, strike, observed, iv),
            Err(BsmError::OutOfDomain { lower, upper, .. }) => println!(
                "   {:<4} K={:<5} price {:>7.2} -> outside [{:.4}, {:.4}]",
                contract, strike, observed, lower, upper
            ),
            Err(e) => println!("   Error: {}", e),
        }
    }
    println!("   default solver: {:?}", SolverConfig::default());

    // 4. Batch valuation
    println!("\n4. Strike ladder in parallel...");
    let ladder: Vec<OptionContract> = (0..9)
        .map(|i| {
            let strike = 80.0 + 5.0 * i as f64;
            OptionContract::new(
                ContractType::Call,
                MarketParameters::new(100.0, strike, 0.5, 0.25, 0.05, 0.0)
                    .expect("Valid parameters"),
            )
        })
        .collect();
    for (contract, result) in ladder.iter().zip(value_batch(&ladder)) {
        match result {
            Ok(v) => println!(
                "   K={:>5.1}  premium {:>7.4}  Δ {:.4}",
                contract.params.strike_price, v.premium, v.greeks.delta
            ),
            Err(e) => println!("   Error: {}", e),
        }
    }

    // 5. Input validation
    println!("\n5. Zero time to expiry...");
    let expired = MarketParameters {
        time_to_expiry: 0.0,
        ..params
    };
    match bs_analytic::premium(ContractType::Call, &expired) {
        Ok(p) => println!("   Unexpected: priced at {}", p),
        Err(e) => println!("   ✓ Caught error: {}", e),
    }

    println!("\n✓ Demo complete!");
}
